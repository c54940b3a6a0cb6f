//! File-backed Pokédex catalog.
//!
//! The reference file has grown several shapes over time: a top-level array
//! of species entries, or a `{"pokedex_sample": [...]}` wrapper; ids under
//! `poke_id`, `dexNr`, `dex`, `dex_nr` or `id`; moves as bare names or
//! objects; legacy `quickMoves`/`cinematicMoves` keyed maps. The loader
//! accepts all of them and skips entries it cannot index. A missing or
//! unparseable file yields an empty catalog.

use std::collections::HashMap;
use std::path::Path;
use std::sync::OnceLock;

use pokebox_domain::{DexNumber, Move, Species};
use regex_lite::Regex;
use serde_json::Value;

use crate::infrastructure::ports::CatalogPort;

/// Extract the first run of digits from a sprite filename.
///
/// `pokemon_icon_025_00.png` -> 25
pub fn extract_dex_from_filename(filename: &str) -> Option<DexNumber> {
    static FIRST_NUMBER: OnceLock<Regex> = OnceLock::new();
    let re = FIRST_NUMBER.get_or_init(|| Regex::new(r"\d+").expect("static regex"));
    let digits = re.find(filename)?.as_str();
    digits.parse::<u32>().ok().map(DexNumber::new)
}

/// Normalize type tokens: `POKEMON_TYPE_FIRE` and `fire` both become `FIRE`.
fn normalize_type_token(raw: &str) -> Option<String> {
    let token = raw
        .trim()
        .to_ascii_uppercase()
        .trim_start_matches("POKEMON_TYPE_")
        .to_string();
    if token.is_empty() {
        None
    } else {
        Some(token)
    }
}

fn parse_move(value: &Value) -> Option<Move> {
    match value {
        Value::String(name) if !name.is_empty() => Some(Move::named(name)),
        Value::Object(obj) => {
            let name = obj.get("name")?.as_str()?.to_string();
            Some(Move {
                name,
                move_type: obj
                    .get("type")
                    .and_then(Value::as_str)
                    .and_then(normalize_type_token),
                power: obj
                    .get("power")
                    .and_then(Value::as_i64)
                    .and_then(|p| i32::try_from(p).ok()),
            })
        }
        _ => None,
    }
}

/// Moves appear as an array of names/objects under the canonical key, or as
/// a legacy `{name: {...}}` map whose keys are the move names.
fn parse_moves(entry: &Value, canonical: &str, legacy: &str) -> Vec<Move> {
    if let Some(list) = entry.get(canonical).and_then(Value::as_array) {
        return list.iter().filter_map(parse_move).collect();
    }
    if let Some(map) = entry.get(legacy).and_then(Value::as_object) {
        return map.keys().map(Move::named).collect();
    }
    Vec::new()
}

fn parse_dex(entry: &Value) -> Option<DexNumber> {
    for key in ["dexNr", "dex", "dex_nr", "poke_id", "id"] {
        let Some(raw) = entry.get(key) else { continue };
        let parsed = match raw {
            Value::Number(n) => n.as_u64().and_then(|v| u32::try_from(v).ok()),
            Value::String(s) => s.parse::<u32>().ok(),
            _ => None,
        };
        if let Some(dex) = parsed {
            return Some(DexNumber::new(dex));
        }
    }
    None
}

fn parse_types(entry: &Value) -> Vec<String> {
    if let Some(list) = entry.get("types").and_then(Value::as_array) {
        return list
            .iter()
            .filter_map(Value::as_str)
            .filter_map(normalize_type_token)
            .collect();
    }
    entry
        .get("primaryType")
        .and_then(|p| p.get("type"))
        .and_then(Value::as_str)
        .and_then(normalize_type_token)
        .into_iter()
        .collect()
}

fn parse_name(entry: &Value) -> Option<String> {
    entry
        .get("names")
        .and_then(|n| n.get("English"))
        .and_then(Value::as_str)
        .or_else(|| entry.get("name").and_then(Value::as_str))
        .map(str::to_string)
}

fn parse_species(entry: &Value) -> Option<Species> {
    let dex = parse_dex(entry)?;
    Some(Species {
        dex,
        name: parse_name(entry),
        types: parse_types(entry),
        quick_moves: parse_moves(entry, "quick_moves", "quickMoves"),
        charge_moves: parse_moves(entry, "charge_moves", "cinematicMoves"),
    })
}

/// In-memory registry of species, indexed by dex number.
pub struct Pokedex {
    by_dex: HashMap<u32, Species>,
}

impl Pokedex {
    pub fn empty() -> Self {
        Self {
            by_dex: HashMap::new(),
        }
    }

    pub fn from_species(species: impl IntoIterator<Item = Species>) -> Self {
        Self {
            by_dex: species
                .into_iter()
                .map(|s| (s.dex.value(), s))
                .collect(),
        }
    }

    /// Load the catalog from a JSON file. Never fails: absence of reference
    /// data degrades to an empty catalog and the service skips move checks.
    pub fn from_file(path: &Path) -> Self {
        let bytes = match std::fs::read(path) {
            Ok(bytes) => bytes,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "No pokedex file, catalog is empty");
                return Self::empty();
            }
        };
        let data: Value = match serde_json::from_slice(&bytes) {
            Ok(data) => data,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Unparseable pokedex file, catalog is empty");
                return Self::empty();
            }
        };

        let entries = match &data {
            Value::Array(entries) => entries.as_slice(),
            Value::Object(obj) => obj
                .get("pokedex_sample")
                .and_then(Value::as_array)
                .map(Vec::as_slice)
                .unwrap_or_default(),
            _ => &[],
        };

        let catalog = Self::from_species(entries.iter().filter_map(parse_species));
        tracing::info!(
            path = %path.display(),
            species = catalog.by_dex.len(),
            "Loaded pokedex catalog"
        );
        catalog
    }

    pub fn len(&self) -> usize {
        self.by_dex.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_dex.is_empty()
    }
}

impl CatalogPort for Pokedex {
    fn lookup(&self, dex: DexNumber) -> Option<Species> {
        self.by_dex.get(&dex.value()).cloned()
    }

    fn all(&self) -> Vec<Species> {
        let mut all: Vec<Species> = self.by_dex.values().cloned().collect();
        all.sort_by_key(|s| s.dex);
        all
    }

    fn is_empty(&self) -> bool {
        self.by_dex.is_empty()
    }
}
