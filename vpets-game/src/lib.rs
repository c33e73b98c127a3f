//! Virtual Pets Game Engine
//!
//! Platform-agnostic core logic for a turn-based pet care game.
//! This crate provides all game mechanics without UI or platform-specific dependencies.

pub mod catalog;
pub mod constants;
pub mod error;
pub mod inventory;
pub mod numbers;
pub mod pet;
pub mod player;
pub mod result;
pub mod session;
pub mod snapshot;
pub mod store;

// Re-export commonly used types
pub use catalog::{
    Catalog, CatalogEntry, CatalogError, CatalogJson, CatalogKind, CatalogName, CatalogSection,
    FoodType, MergeReport, Species, ToyType,
};
pub use constants::{
    CURE_PRICE, MAX_ACTION_POINTS, MAX_PETS_PER_PLAYER, MAX_PLAYERS, REVIVE_PRICE,
    SNAPSHOT_VERSION,
};
pub use error::{GameError, PetActionError};
pub use inventory::{Inventory, Toy};
pub use pet::{Pet, PetEvent, PetStats, PetTurnReport, Stat};
pub use player::{PetList, Player};
pub use result::{RankedEntry, StandingEntry, Standings};
pub use session::{
    GameSession, PetSetup, PlayerSetup, RngState, RoundOverview, SessionConfig, SessionPhase,
    SessionState, SetupError, TurnOutcome, TurnRng, TurnState, TurnTransition,
};
pub use snapshot::{SessionSnapshot, SnapshotError};
pub use store::{ShopItem, ShopListing};

/// Trait for abstracting catalog loading operations
/// Platform-specific implementations should provide this
pub trait CatalogLoader {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Load the base catalog.
    ///
    /// # Errors
    ///
    /// Returns an error if the catalog cannot be loaded or parsed.
    fn load_catalog(&self) -> Result<Catalog, Self::Error>;

    /// Load optional custom assets to merge over the base catalog.
    ///
    /// # Errors
    ///
    /// Returns an error if custom assets exist but cannot be loaded.
    fn load_custom_assets(&self) -> Result<Option<Catalog>, Self::Error> {
        Ok(None)
    }
}

/// Trait for abstracting save/load operations
/// Platform-specific implementations should provide this
pub trait SessionStorage {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Save a session snapshot
    ///
    /// # Errors
    ///
    /// Returns an error if the snapshot cannot be saved.
    fn save_session(&self, slot: &str, snapshot: &SessionSnapshot) -> Result<(), Self::Error>;

    /// Load a session snapshot
    ///
    /// # Errors
    ///
    /// Returns an error if the snapshot cannot be loaded.
    fn load_session(&self, slot: &str) -> Result<Option<SessionSnapshot>, Self::Error>;

    /// Delete a saved session
    ///
    /// # Errors
    ///
    /// Returns an error if the save cannot be deleted.
    fn delete_session(&self, slot: &str) -> Result<(), Self::Error>;
}

/// Main game engine binding a catalog source to a save store
pub struct GameEngine<L, S>
where
    L: CatalogLoader,
    S: SessionStorage,
{
    loader: L,
    storage: S,
    catalog: Catalog,
}

impl<L, S> GameEngine<L, S>
where
    L: CatalogLoader,
    S: SessionStorage,
{
    /// Create an engine, loading the base catalog and merging any custom assets
    ///
    /// # Errors
    ///
    /// Returns an error if the catalog or custom assets cannot be loaded.
    pub fn new(loader: L, storage: S) -> Result<Self, L::Error> {
        let catalog = loader.load_catalog()?;
        let mut engine = Self {
            loader,
            storage,
            catalog,
        };
        if let Some(custom) = engine.loader.load_custom_assets()? {
            engine.merge_custom_assets(custom);
        }
        Ok(engine)
    }

    #[must_use]
    pub const fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Merge custom assets into the engine catalog. Existing names win.
    pub fn merge_custom_assets(&mut self, custom: Catalog) -> MergeReport {
        let report = self.catalog.merge(custom);
        log::info!(
            "merged custom assets: {} added, {} discarded",
            report.added.len(),
            report.discarded.len()
        );
        report
    }

    /// Start a new session over a copy of the engine catalog
    ///
    /// # Errors
    ///
    /// Returns an error if the setup is invalid.
    pub fn new_session(
        &self,
        setups: &[PlayerSetup],
        config: &SessionConfig,
    ) -> Result<GameSession, SetupError> {
        GameSession::initialise(self.catalog.clone(), setups, config)
    }

    /// Save a session snapshot
    ///
    /// # Errors
    ///
    /// Returns an error if the snapshot cannot be saved.
    pub fn save_session(&self, slot: &str, session: &GameSession) -> Result<(), S::Error> {
        self.storage.save_session(slot, &session.capture_snapshot())
    }

    /// Load and validate a session snapshot
    ///
    /// # Errors
    ///
    /// Returns an error if the snapshot cannot be loaded or fails validation.
    pub fn load_session(&self, slot: &str) -> Result<Option<GameSession>, anyhow::Error>
    where
        S::Error: Into<anyhow::Error>,
    {
        let Some(snapshot) = self.storage.load_session(slot).map_err(Into::into)? else {
            return Ok(None);
        };
        Ok(Some(GameSession::from_snapshot(snapshot)?))
    }

    /// Delete a saved session
    ///
    /// # Errors
    ///
    /// Returns an error if the save cannot be deleted.
    pub fn delete_session(&self, slot: &str) -> Result<(), S::Error> {
        self.storage.delete_session(slot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::collections::HashMap;
    use std::convert::Infallible;
    use std::rc::Rc;

    #[derive(Clone, Default)]
    struct FixtureLoader {
        custom: Option<Catalog>,
    }

    impl CatalogLoader for FixtureLoader {
        type Error = Infallible;

        fn load_catalog(&self) -> Result<Catalog, Self::Error> {
            Ok(Catalog::load_from_static())
        }

        fn load_custom_assets(&self) -> Result<Option<Catalog>, Self::Error> {
            Ok(self.custom.clone())
        }
    }

    #[derive(Clone, Default)]
    struct MemoryStorage {
        saves: Rc<RefCell<HashMap<String, SessionSnapshot>>>,
    }

    impl SessionStorage for MemoryStorage {
        type Error = Infallible;

        fn save_session(&self, slot: &str, snapshot: &SessionSnapshot) -> Result<(), Self::Error> {
            self.saves
                .borrow_mut()
                .insert(slot.to_string(), snapshot.clone());
            Ok(())
        }

        fn load_session(&self, slot: &str) -> Result<Option<SessionSnapshot>, Self::Error> {
            Ok(self.saves.borrow().get(slot).cloned())
        }

        fn delete_session(&self, slot: &str) -> Result<(), Self::Error> {
            self.saves.borrow_mut().remove(slot);
            Ok(())
        }
    }

    fn setups() -> Vec<PlayerSetup> {
        vec![
            PlayerSetup::new("Alice", vec![PetSetup::new("Tom", "Cat")]),
            PlayerSetup::new("Bob", vec![PetSetup::new("Rex", "Dog")]),
        ]
    }

    #[test]
    fn engine_saves_and_restores_sessions() {
        let engine = GameEngine::new(FixtureLoader::default(), MemoryStorage::default()).unwrap();
        let mut session = engine
            .new_session(&setups(), &SessionConfig::default().with_seed(0xABCD))
            .unwrap();
        session.buy_food("Fish").unwrap();
        session.feed("Fish").unwrap();
        session.end_turn().unwrap();

        engine.save_session("slot-1", &session).unwrap();
        let restored = engine.load_session("slot-1").unwrap().unwrap();
        assert_eq!(restored.capture_snapshot(), session.capture_snapshot());
        assert_eq!(restored.turn_state(), session.turn_state());

        engine.delete_session("slot-1").unwrap();
        assert!(engine.load_session("slot-1").unwrap().is_none());
    }

    #[test]
    fn engine_reports_setup_problems_directly() {
        let engine = GameEngine::new(FixtureLoader::default(), MemoryStorage::default()).unwrap();
        let err = engine
            .new_session(
                &[PlayerSetup::new("Alice", vec![PetSetup::new("Tom", "Dragon")])],
                &SessionConfig::default(),
            )
            .unwrap_err();
        assert_eq!(
            err,
            SetupError::UnknownSpecies {
                pet: String::from("Tom"),
                species: String::from("Dragon"),
            }
        );
    }

    #[test]
    fn engine_merges_custom_assets_without_overwriting() {
        let mut custom = Catalog::default();
        let mut cat = Catalog::load_from_static().species("Cat").cloned().unwrap();
        cat.optimum_weight = 59;
        custom.species.insert_if_absent(cat);
        custom.species.insert_if_absent(Species {
            name: String::from("Axolotl"),
            optimum_weight: 4,
            icon: String::new(),
            hunger_decay: 10,
            energy_decay: 10,
            happiness_decay: 10,
        });

        let loader = FixtureLoader {
            custom: Some(custom),
        };
        let engine = GameEngine::new(loader, MemoryStorage::default()).unwrap();
        assert_eq!(engine.catalog().species("Cat").unwrap().optimum_weight, 30);
        assert!(engine.catalog().species("Axolotl").is_some());
    }
}
