//! Session configuration and the player/pet roster entered before a game.
use rand::Rng;
use rand::seq::IteratorRandom;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::collections::HashSet;
use thiserror::Error;

use crate::catalog::{Catalog, CatalogKind};
use crate::constants::{
    DEFAULT_INCOME_PER_TURN, DEFAULT_NUMBER_OF_DAYS, DEFAULT_STARTING_MONEY, MAX_PETS_PER_PLAYER,
    MAX_PLAYERS,
};
use crate::numbers::usize_to_u32;
use crate::pet::Pet;
use crate::player::{PetList, Player};

/// Errors raised when a session cannot be started from the given setup.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SetupError {
    #[error("a game needs between 1 and {max} players (got {count})")]
    PlayerCount { count: usize, max: usize },
    #[error("player names cannot be empty")]
    EmptyPlayerName,
    #[error("player name '{0}' is used more than once")]
    DuplicatePlayerName(String),
    #[error("{player} must have between 1 and {max} pets (got {count})")]
    PetCount {
        player: String,
        count: usize,
        max: usize,
    },
    #[error("{player} has a pet without a name")]
    EmptyPetName { player: String },
    #[error("pet '{pet}' has unknown species '{species}'")]
    UnknownSpecies { pet: String, species: String },
    #[error("pet '{pet}' has unknown favourite {kind} '{name}'")]
    UnknownFavourite {
        pet: String,
        kind: CatalogKind,
        name: String,
    },
    #[error("number of days must be at least 1")]
    NoDays,
    #[error("income per turn cannot be negative (got {0})")]
    NegativeIncome(i64),
    #[error("starting money cannot be negative (got {0})")]
    NegativeStartingMoney(i64),
}

/// Tunable session parameters entered on the setup screen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionConfig {
    #[serde(default = "SessionConfig::default_number_of_days")]
    pub number_of_days: u32,
    #[serde(default = "SessionConfig::default_income_per_turn")]
    pub income_per_turn: i64,
    #[serde(default = "SessionConfig::default_starting_money")]
    pub starting_money: i64,
    #[serde(default)]
    pub seed: u64,
}

impl SessionConfig {
    const fn default_number_of_days() -> u32 {
        DEFAULT_NUMBER_OF_DAYS
    }

    const fn default_income_per_turn() -> i64 {
        DEFAULT_INCOME_PER_TURN
    }

    const fn default_starting_money() -> i64 {
        DEFAULT_STARTING_MONEY
    }

    /// Parse a configuration, filling absent fields with defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is malformed.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    #[must_use]
    pub const fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// # Errors
    ///
    /// Returns the first violated constraint.
    pub const fn validate(&self) -> Result<(), SetupError> {
        if self.number_of_days == 0 {
            return Err(SetupError::NoDays);
        }
        if self.income_per_turn < 0 {
            return Err(SetupError::NegativeIncome(self.income_per_turn));
        }
        if self.starting_money < 0 {
            return Err(SetupError::NegativeStartingMoney(self.starting_money));
        }
        Ok(())
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            number_of_days: Self::default_number_of_days(),
            income_per_turn: Self::default_income_per_turn(),
            starting_money: Self::default_starting_money(),
            seed: 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PetSetup {
    pub name: String,
    pub species: String,
    #[serde(default)]
    pub favourite_food: Option<String>,
    #[serde(default)]
    pub favourite_toy: Option<String>,
}

impl PetSetup {
    #[must_use]
    pub fn new(name: impl Into<String>, species: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            species: species.into(),
            favourite_food: None,
            favourite_toy: None,
        }
    }

    #[must_use]
    pub fn with_favourites(mut self, food: Option<&str>, toy: Option<&str>) -> Self {
        self.favourite_food = food.map(str::to_string);
        self.favourite_toy = toy.map(str::to_string);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerSetup {
    pub name: String,
    pub pets: Vec<PetSetup>,
}

impl PlayerSetup {
    #[must_use]
    pub fn new(name: impl Into<String>, pets: Vec<PetSetup>) -> Self {
        Self {
            name: name.into(),
            pets,
        }
    }
}

/// Validate the roster against the catalog.
///
/// # Errors
///
/// Returns the first violated constraint.
pub fn validate_roster(catalog: &Catalog, setups: &[PlayerSetup]) -> Result<(), SetupError> {
    if setups.is_empty() || setups.len() > MAX_PLAYERS {
        return Err(SetupError::PlayerCount {
            count: setups.len(),
            max: MAX_PLAYERS,
        });
    }
    let mut seen = HashSet::new();
    for setup in setups {
        let name = setup.name.trim();
        if name.is_empty() {
            return Err(SetupError::EmptyPlayerName);
        }
        if !seen.insert(name) {
            return Err(SetupError::DuplicatePlayerName(name.to_string()));
        }
        if setup.pets.is_empty() || setup.pets.len() > MAX_PETS_PER_PLAYER {
            return Err(SetupError::PetCount {
                player: name.to_string(),
                count: setup.pets.len(),
                max: MAX_PETS_PER_PLAYER,
            });
        }
        for pet in &setup.pets {
            validate_pet(catalog, name, pet)?;
        }
    }
    Ok(())
}

fn validate_pet(catalog: &Catalog, player: &str, pet: &PetSetup) -> Result<(), SetupError> {
    if pet.name.trim().is_empty() {
        return Err(SetupError::EmptyPetName {
            player: player.to_string(),
        });
    }
    if catalog.species(&pet.species).is_none() {
        return Err(SetupError::UnknownSpecies {
            pet: pet.name.clone(),
            species: pet.species.clone(),
        });
    }
    if let Some(food) = &pet.favourite_food
        && catalog.food(food).is_none()
    {
        return Err(SetupError::UnknownFavourite {
            pet: pet.name.clone(),
            kind: CatalogKind::Food,
            name: food.clone(),
        });
    }
    if let Some(toy) = &pet.favourite_toy
        && catalog.toy(toy).is_none()
    {
        return Err(SetupError::UnknownFavourite {
            pet: pet.name.clone(),
            kind: CatalogKind::Toy,
            name: toy.clone(),
        });
    }
    Ok(())
}

/// Build the players for a validated roster. Missing favourites are drawn
/// from the catalog with `rng`.
///
/// # Errors
///
/// Returns the first violated constraint.
pub(crate) fn build_players<R: Rng + ?Sized>(
    catalog: &Catalog,
    setups: &[PlayerSetup],
    config: &SessionConfig,
    rng: &mut R,
) -> Result<Vec<Player>, SetupError> {
    config.validate()?;
    validate_roster(catalog, setups)?;

    let mut next_pet_id = 1_u32;
    let mut players = Vec::with_capacity(setups.len());
    for (index, setup) in setups.iter().enumerate() {
        let mut pets: PetList = SmallVec::new();
        for pet in &setup.pets {
            let Some(species) = catalog.species(&pet.species) else {
                return Err(SetupError::UnknownSpecies {
                    pet: pet.name.clone(),
                    species: pet.species.clone(),
                });
            };
            let favourite_food = pet.favourite_food.clone().or_else(|| {
                catalog
                    .food_types
                    .names()
                    .choose(rng)
                    .map(str::to_string)
            });
            let favourite_toy = pet.favourite_toy.clone().or_else(|| {
                catalog
                    .toy_types
                    .names()
                    .choose(rng)
                    .map(str::to_string)
            });
            pets.push(Pet::new(
                next_pet_id,
                pet.name.trim(),
                species.clone(),
                favourite_food,
                favourite_toy,
            ));
            next_pet_id += 1;
        }
        players.push(Player::new(
            usize_to_u32(index + 1),
            setup.name.trim(),
            pets,
            config.starting_money,
        ));
    }
    Ok(players)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha20Rng;

    fn roster() -> Vec<PlayerSetup> {
        vec![
            PlayerSetup::new("Alice", vec![PetSetup::new("Tom", "Cat")]),
            PlayerSetup::new(
                "Bob",
                vec![
                    PetSetup::new("Rex", "Dog").with_favourites(Some("Steak"), Some("Ball")),
                    PetSetup::new("Nibbles", "Hamster"),
                ],
            ),
        ]
    }

    #[test]
    fn config_defaults_fill_missing_fields() {
        let config = SessionConfig::from_json(r#"{"number_of_days": 3}"#).unwrap();
        assert_eq!(config.number_of_days, 3);
        assert_eq!(config.income_per_turn, 25);
        assert_eq!(config.starting_money, 100);
        assert_eq!(config.seed, 0);
        assert_eq!(SessionConfig::default().validate(), Ok(()));
    }

    #[test]
    fn config_rejects_bad_values() {
        let mut config = SessionConfig::default();
        config.number_of_days = 0;
        assert_eq!(config.validate(), Err(SetupError::NoDays));
        config.number_of_days = 1;
        config.income_per_turn = -1;
        assert_eq!(config.validate(), Err(SetupError::NegativeIncome(-1)));
    }

    #[test]
    fn roster_rules_are_enforced() {
        let catalog = Catalog::load_from_static();
        assert!(validate_roster(&catalog, &roster()).is_ok());
        assert!(matches!(
            validate_roster(&catalog, &[]),
            Err(SetupError::PlayerCount { count: 0, .. })
        ));

        let mut duplicate = roster();
        duplicate[1].name = String::from(" Alice ");
        assert_eq!(
            validate_roster(&catalog, &duplicate),
            Err(SetupError::DuplicatePlayerName(String::from("Alice")))
        );

        let mut crowded = roster();
        crowded[0].pets = vec![PetSetup::new("A", "Cat"); 4];
        assert!(matches!(
            validate_roster(&catalog, &crowded),
            Err(SetupError::PetCount { count: 4, .. })
        ));

        let mut unknown = roster();
        unknown[0].pets[0].species = String::from("Dragon");
        assert!(matches!(
            validate_roster(&catalog, &unknown),
            Err(SetupError::UnknownSpecies { .. })
        ));

        let mut picky = roster();
        picky[0].pets[0].favourite_food = Some(String::from("Caviar"));
        assert!(matches!(
            validate_roster(&catalog, &picky),
            Err(SetupError::UnknownFavourite {
                kind: CatalogKind::Food,
                ..
            })
        ));
    }

    #[test]
    fn players_get_ids_and_favourites() {
        let catalog = Catalog::load_from_static();
        let mut rng = ChaCha20Rng::seed_from_u64(5);
        let players =
            build_players(&catalog, &roster(), &SessionConfig::default(), &mut rng).unwrap();
        assert_eq!(players.len(), 2);
        assert_eq!(players[0].id, 1);
        assert_eq!(players[1].id, 2);
        assert_eq!(players[1].pets[1].id, 3);
        assert_eq!(players[0].money, 100);
        assert_eq!(players[1].pets[0].favourite_food.as_deref(), Some("Steak"));
        let drawn = players[0].pets[0].favourite_food.as_deref().unwrap();
        assert!(catalog.food(drawn).is_some());
        assert!(players[0].pets[0].favourite_toy.is_some());
    }
}
