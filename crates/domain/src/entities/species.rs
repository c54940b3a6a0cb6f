//! Species reference data loaded from the Pokédex file.

use serde::{Deserialize, Serialize};

use crate::ids::DexNumber;

/// A move a species can know. Source data carries either bare names or
/// objects with type/power metadata; both collapse into this shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Move {
    pub name: String,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub move_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub power: Option<i32>,
}

impl Move {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            move_type: None,
            power: None,
        }
    }
}

/// Read-only reference entry for one species.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Species {
    pub dex: DexNumber,
    pub name: Option<String>,
    pub types: Vec<String>,
    pub quick_moves: Vec<Move>,
    pub charge_moves: Vec<Move>,
}

impl Species {
    pub fn new(dex: DexNumber) -> Self {
        Self {
            dex,
            name: None,
            types: Vec::new(),
            quick_moves: Vec::new(),
            charge_moves: Vec::new(),
        }
    }

    pub fn knows_quick_move(&self, name: &str) -> bool {
        self.quick_moves.iter().any(|m| m.name == name)
    }

    pub fn knows_charge_move(&self, name: &str) -> bool {
        self.charge_moves.iter().any(|m| m.name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn move_lookup_is_exact_match() {
        let mut species = Species::new(DexNumber::new(25));
        species.quick_moves.push(Move::named("Thunder Shock"));
        assert!(species.knows_quick_move("Thunder Shock"));
        assert!(!species.knows_quick_move("thunder shock"));
    }
}
