//! Box operations: validation and persistence of box entries.
//!
//! All domain rules live here. Handlers stay thin and the repositories only
//! persist what this service hands them.

use std::sync::Arc;

use pokebox_domain::{BoxEntry, DexNumber, EntryDraft, EntryId, Species, UserId};

use crate::infrastructure::pokedex::extract_dex_from_filename;
use crate::infrastructure::ports::{BoxRepo, CatalogPort, ClockPort, RepoError};
use crate::use_cases::validation::{require_non_empty, require_present, ValidationError};

/// Errors surfaced to the API layer.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("{0}")]
    Validation(String),

    #[error("{entity_type} not found: {id}")]
    NotFound {
        entity_type: &'static str,
        id: String,
    },

    #[error("entry already exists: {0}")]
    Duplicate(String),

    #[error("storage failure: {0}")]
    Storage(String),
}

impl From<ValidationError> for ServiceError {
    fn from(e: ValidationError) -> Self {
        Self::Validation(e.to_string())
    }
}

impl From<RepoError> for ServiceError {
    fn from(e: RepoError) -> Self {
        match e {
            RepoError::NotFound { entity_type, id } => Self::NotFound { entity_type, id },
            RepoError::DuplicateKey { id, .. } => Self::Duplicate(id),
            RepoError::Storage { .. } | RepoError::Serialization(_) => {
                Self::Storage(e.to_string())
            }
        }
    }
}

/// Fields of a draft that survived validation.
struct ValidatedDraft {
    dex: DexNumber,
    nickname: Option<String>,
    sprite: String,
    cp: u32,
    quick_move: Option<String>,
    charge_moves: Vec<String>,
}

/// Service layer providing business logic around box operations.
pub struct BoxService {
    repo: Arc<dyn BoxRepo>,
    catalog: Arc<dyn CatalogPort>,
    clock: Arc<dyn ClockPort>,
}

impl BoxService {
    pub fn new(
        repo: Arc<dyn BoxRepo>,
        catalog: Arc<dyn CatalogPort>,
        clock: Arc<dyn ClockPort>,
    ) -> Self {
        Self {
            repo,
            catalog,
            clock,
        }
    }

    /// Validate a raw draft into entry fields, or reject it.
    ///
    /// Nothing partially validated ever escapes this function.
    fn validate(&self, draft: &EntryDraft) -> Result<ValidatedDraft, ServiceError> {
        let sprite = require_present(draft.sprite.clone(), "sprite")?;
        require_non_empty(&sprite, "sprite")?;

        let cp_raw = require_present(draft.cp, "cp")?;
        let cp = u32::try_from(cp_raw)
            .map_err(|_| ValidationError::invalid("cp", "must be a non-negative integer"))?;

        let dex = extract_dex_from_filename(&sprite).ok_or_else(|| {
            ValidationError::invalid("sprite", "no species number found in filename")
        })?;

        let charge_moves = draft.normalized_charge_moves();
        self.check_moves(dex, draft.quick_move.as_deref(), &charge_moves)?;

        Ok(ValidatedDraft {
            dex,
            nickname: draft.name.clone().filter(|n| !n.trim().is_empty()),
            sprite,
            cp,
            quick_move: draft.quick_move.clone(),
            charge_moves,
        })
    }

    /// Validate the selected moves against the catalog.
    ///
    /// With no catalog loaded there is nothing to check against, so moves
    /// pass through unvalidated.
    fn check_moves(
        &self,
        dex: DexNumber,
        quick_move: Option<&str>,
        charge_moves: &[String],
    ) -> Result<(), ServiceError> {
        if self.catalog.is_empty() {
            return Ok(());
        }

        let species: Species = self.catalog.lookup(dex).ok_or_else(|| {
            ServiceError::Validation(format!("unknown species: dex {dex}"))
        })?;

        if !species.quick_moves.is_empty() {
            let quick = quick_move.filter(|m| !m.is_empty()).ok_or_else(|| {
                ServiceError::Validation(format!("A quick move must be provided for dex {dex}"))
            })?;
            if !species.knows_quick_move(quick) {
                return Err(ServiceError::Validation(format!(
                    "quick_move '{quick}' is not valid for dex {dex}"
                )));
            }
        }

        if !species.charge_moves.is_empty() {
            if charge_moves.is_empty() {
                return Err(ServiceError::Validation(format!(
                    "At least one charge move must be provided for dex {dex}"
                )));
            }
            if charge_moves.len() > 2 {
                return Err(ServiceError::Validation(
                    "At most 2 charge moves may be selected".to_string(),
                ));
            }
            for m in charge_moves {
                if !species.knows_charge_move(m) {
                    return Err(ServiceError::Validation(format!(
                        "charge_move '{m}' is not valid for dex {dex}"
                    )));
                }
            }
        }

        Ok(())
    }

    /// Enforce that an entry belongs to the requesting user. Entries owned by
    /// someone else look exactly like missing entries from the outside.
    fn owned(&self, entry: BoxEntry, user_id: &UserId) -> Result<BoxEntry, ServiceError> {
        if &entry.user_id != user_id {
            return Err(ServiceError::NotFound {
                entity_type: "BoxEntry",
                id: entry.id.to_string(),
            });
        }
        Ok(entry)
    }

    pub async fn add_entry(
        &self,
        user_id: &UserId,
        draft: &EntryDraft,
    ) -> Result<BoxEntry, ServiceError> {
        let valid = self.validate(draft)?;
        let now = self.clock.now();
        let entry = BoxEntry {
            id: EntryId::new(),
            user_id: user_id.clone(),
            dex: valid.dex,
            nickname: valid.nickname,
            sprite: valid.sprite,
            cp: valid.cp,
            quick_move: valid.quick_move,
            charge_moves: valid.charge_moves,
            created_at: now,
            updated_at: now,
        };
        self.repo.add(&entry).await?;
        tracing::info!(user_id = %user_id, entry_id = %entry.id, dex = %entry.dex, "Added box entry");
        Ok(entry)
    }

    pub async fn get_entry(
        &self,
        user_id: &UserId,
        id: EntryId,
    ) -> Result<BoxEntry, ServiceError> {
        let entry = self.repo.get(id).await?;
        self.owned(entry, user_id)
    }

    pub async fn list_entries(&self, user_id: &UserId) -> Result<Vec<BoxEntry>, ServiceError> {
        Ok(self.repo.list(user_id).await?)
    }

    pub async fn update_entry(
        &self,
        user_id: &UserId,
        id: EntryId,
        draft: &EntryDraft,
    ) -> Result<BoxEntry, ServiceError> {
        let valid = self.validate(draft)?;
        let existing = self.owned(self.repo.get(id).await?, user_id)?;

        let entry = BoxEntry {
            id: existing.id,
            user_id: existing.user_id,
            dex: valid.dex,
            nickname: valid.nickname,
            sprite: valid.sprite,
            cp: valid.cp,
            quick_move: valid.quick_move,
            charge_moves: valid.charge_moves,
            created_at: existing.created_at,
            updated_at: self.clock.now(),
        };
        self.repo.update(&entry).await?;
        tracing::info!(user_id = %user_id, entry_id = %entry.id, "Updated box entry");
        Ok(entry)
    }

    pub async fn remove_entry(
        &self,
        user_id: &UserId,
        id: EntryId,
    ) -> Result<BoxEntry, ServiceError> {
        self.owned(self.repo.get(id).await?, user_id)?;
        let removed = self.repo.remove(id).await?;
        tracing::info!(user_id = %user_id, entry_id = %id, "Removed box entry");
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use pokebox_domain::Move;

    use crate::infrastructure::clock::FixedClock;
    use crate::infrastructure::pokedex::Pokedex;
    use crate::infrastructure::ports::MockBoxRepo;

    fn pikachu_catalog() -> Arc<Pokedex> {
        let mut pikachu = Species::new(DexNumber::new(25));
        pikachu.name = Some("Pikachu".into());
        pikachu.quick_moves = vec![Move::named("Thunder Shock"), Move::named("Quick Attack")];
        pikachu.charge_moves = vec![
            Move::named("Thunderbolt"),
            Move::named("Thunder"),
            Move::named("Wild Charge"),
        ];
        Arc::new(Pokedex::from_species([pikachu]))
    }

    fn service(repo: MockBoxRepo, catalog: Arc<Pokedex>) -> BoxService {
        let clock = Arc::new(FixedClock(
            Utc.timestamp_opt(1_700_000_000, 0).single().expect("timestamp"),
        ));
        BoxService::new(Arc::new(repo), catalog, clock)
    }

    fn pikachu_draft() -> EntryDraft {
        EntryDraft {
            name: Some("Sparky".into()),
            sprite: Some("pokemon_icon_025_00.png".into()),
            cp: Some(1500),
            quick_move: Some("Thunder Shock".into()),
            charge_moves: Some(vec!["Thunderbolt".into()]),
            charge_move: None,
        }
    }

    fn user() -> UserId {
        UserId::new("local_user").expect("user id")
    }

    #[tokio::test]
    async fn add_entry_persists_validated_fields() {
        let mut repo = MockBoxRepo::new();
        repo.expect_add()
            .withf(|e: &BoxEntry| {
                e.dex == DexNumber::new(25)
                    && e.cp == 1500
                    && e.nickname.as_deref() == Some("Sparky")
                    && e.charge_moves == vec!["Thunderbolt".to_string()]
            })
            .times(1)
            .returning(|_| Ok(()));

        let service = service(repo, pikachu_catalog());
        let entry = service
            .add_entry(&user(), &pikachu_draft())
            .await
            .expect("add");
        assert_eq!(entry.user_id, user());
        assert_eq!(entry.created_at, entry.updated_at);
    }

    #[tokio::test]
    async fn add_entry_rejects_negative_cp_without_touching_storage() {
        let repo = MockBoxRepo::new(); // no expectations: any repo call panics
        let service = service(repo, pikachu_catalog());

        let draft = EntryDraft {
            cp: Some(-1),
            ..pikachu_draft()
        };
        let err = service.add_entry(&user(), &draft).await.expect_err("cp");
        assert!(matches!(err, ServiceError::Validation(_)));
    }

    #[tokio::test]
    async fn add_entry_requires_cp_and_sprite() {
        let service = service(MockBoxRepo::new(), pikachu_catalog());

        let no_cp = EntryDraft {
            cp: None,
            ..pikachu_draft()
        };
        assert!(matches!(
            service.add_entry(&user(), &no_cp).await,
            Err(ServiceError::Validation(msg)) if msg.contains("cp")
        ));

        let no_sprite = EntryDraft {
            sprite: None,
            ..pikachu_draft()
        };
        assert!(matches!(
            service.add_entry(&user(), &no_sprite).await,
            Err(ServiceError::Validation(msg)) if msg.contains("sprite")
        ));
    }

    #[tokio::test]
    async fn add_entry_rejects_unknown_species_when_catalog_loaded() {
        let service = service(MockBoxRepo::new(), pikachu_catalog());
        let draft = EntryDraft {
            sprite: Some("pokemon_icon_999_00.png".into()),
            ..pikachu_draft()
        };
        assert!(matches!(
            service.add_entry(&user(), &draft).await,
            Err(ServiceError::Validation(msg)) if msg.contains("unknown species")
        ));
    }

    #[tokio::test]
    async fn add_entry_validates_moves_against_catalog() {
        let service = service(MockBoxRepo::new(), pikachu_catalog());

        let bad_quick = EntryDraft {
            quick_move: Some("Splash".into()),
            ..pikachu_draft()
        };
        assert!(matches!(
            service.add_entry(&user(), &bad_quick).await,
            Err(ServiceError::Validation(msg)) if msg.contains("quick_move")
        ));

        let no_quick = EntryDraft {
            quick_move: None,
            ..pikachu_draft()
        };
        assert!(matches!(
            service.add_entry(&user(), &no_quick).await,
            Err(ServiceError::Validation(msg)) if msg.contains("quick move")
        ));

        let no_charge = EntryDraft {
            charge_moves: Some(vec![]),
            ..pikachu_draft()
        };
        assert!(matches!(
            service.add_entry(&user(), &no_charge).await,
            Err(ServiceError::Validation(msg)) if msg.contains("charge move")
        ));

        let three_charges = EntryDraft {
            charge_moves: Some(vec![
                "Thunderbolt".into(),
                "Thunder".into(),
                "Wild Charge".into(),
            ]),
            ..pikachu_draft()
        };
        assert!(matches!(
            service.add_entry(&user(), &three_charges).await,
            Err(ServiceError::Validation(msg)) if msg.contains("At most 2")
        ));

        let bad_charge = EntryDraft {
            charge_moves: Some(vec!["Hydro Pump".into()]),
            ..pikachu_draft()
        };
        assert!(matches!(
            service.add_entry(&user(), &bad_charge).await,
            Err(ServiceError::Validation(msg)) if msg.contains("charge_move")
        ));
    }

    #[tokio::test]
    async fn empty_catalog_skips_move_validation() {
        let mut repo = MockBoxRepo::new();
        repo.expect_add().times(1).returning(|_| Ok(()));
        let service = service(repo, Arc::new(Pokedex::empty()));

        let draft = EntryDraft {
            quick_move: Some("Made Up Move".into()),
            charge_moves: Some(vec!["Also Made Up".into()]),
            ..pikachu_draft()
        };
        service.add_entry(&user(), &draft).await.expect("add");
    }

    #[tokio::test]
    async fn update_missing_entry_is_not_found() {
        let mut repo = MockBoxRepo::new();
        repo.expect_get()
            .returning(|id| Err(RepoError::not_found("BoxEntry", id)));
        let service = service(repo, pikachu_catalog());

        let err = service
            .update_entry(&user(), EntryId::new(), &pikachu_draft())
            .await
            .expect_err("update");
        assert!(matches!(err, ServiceError::NotFound { .. }));
    }

    #[tokio::test]
    async fn foreign_entry_reads_as_not_found() {
        let other = UserId::new("someone_else").expect("user id");
        let theirs = BoxEntry {
            id: EntryId::new(),
            user_id: other,
            dex: DexNumber::new(25),
            nickname: None,
            sprite: "pokemon_icon_025_00.png".into(),
            cp: 10,
            quick_move: Some("Thunder Shock".into()),
            charge_moves: vec!["Thunderbolt".into()],
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        let id = theirs.id;

        let mut repo = MockBoxRepo::new();
        repo.expect_get()
            .returning(move |_| Ok(theirs.clone()));
        let service = service(repo, pikachu_catalog());

        let err = service.get_entry(&user(), id).await.expect_err("get");
        assert!(matches!(err, ServiceError::NotFound { .. }));
    }

    #[tokio::test]
    async fn duplicate_key_from_repo_maps_to_duplicate() {
        let mut repo = MockBoxRepo::new();
        repo.expect_add()
            .returning(|e| Err(RepoError::duplicate("BoxEntry", e.id)));
        let service = service(repo, pikachu_catalog());

        let err = service
            .add_entry(&user(), &pikachu_draft())
            .await
            .expect_err("add");
        assert!(matches!(err, ServiceError::Duplicate(_)));
    }
}
