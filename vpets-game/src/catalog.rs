//! Asset catalog: species, food types and toy types.
//!
//! Catalog data is reference data. It is loaded once, optionally extended with
//! custom assets, and then only read. Each kind is keyed by name; merging
//! never overwrites an existing entry, the incoming duplicate is discarded.
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::hash::Hasher;
use std::sync::OnceLock;
use thiserror::Error;
use twox_hash::XxHash64;

use crate::constants::{
    DEFAULT_ENERGY_DECAY, DEFAULT_HAPPINESS_DECAY, DEFAULT_HUNGER_DECAY, MAX_OPTIMUM_WEIGHT,
    STAT_MAX,
};

const DEFAULT_SPECIES_DATA: &str = include_str!("../assets/data/species.json");
const DEFAULT_FOOD_DATA: &str = include_str!("../assets/data/foods.json");
const DEFAULT_TOY_DATA: &str = include_str!("../assets/data/toys.json");

/// The three catalog kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CatalogKind {
    Species,
    Food,
    Toy,
}

impl CatalogKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Species => "species",
            Self::Food => "food",
            Self::Toy => "toy",
        }
    }
}

impl fmt::Display for CatalogKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors raised while parsing or validating catalog definitions.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("failed to parse {kind} definitions: {source}")]
    Parse {
        kind: CatalogKind,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid {kind} '{name}': {reason}")]
    Invalid {
        kind: CatalogKind,
        name: String,
        reason: String,
    },
}

/// Behaviour shared by every catalog entry kind.
pub trait CatalogEntry: Clone + Serialize + DeserializeOwned {
    const KIND: CatalogKind;

    /// Unique name within the entry's kind.
    fn name(&self) -> &str;

    /// Check numeric attributes, returning a human readable reason on failure.
    ///
    /// # Errors
    ///
    /// Returns the reason the entry cannot be used in a game.
    fn check(&self) -> Result<(), String>;
}

/// A kind of pet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Species {
    pub name: String,
    pub optimum_weight: i32,
    #[serde(default)]
    pub icon: String,
    #[serde(default = "Species::default_hunger_decay")]
    pub hunger_decay: i32,
    #[serde(default = "Species::default_energy_decay")]
    pub energy_decay: i32,
    #[serde(default = "Species::default_happiness_decay")]
    pub happiness_decay: i32,
}

impl Species {
    const fn default_hunger_decay() -> i32 {
        DEFAULT_HUNGER_DECAY
    }

    const fn default_energy_decay() -> i32 {
        DEFAULT_ENERGY_DECAY
    }

    const fn default_happiness_decay() -> i32 {
        DEFAULT_HAPPINESS_DECAY
    }

    /// Range shown on the weight gauge: one third to five thirds of optimum.
    #[must_use]
    pub const fn weight_band(&self) -> (i32, i32) {
        (self.optimum_weight / 3, self.optimum_weight * 5 / 3)
    }

    /// Weights that count as healthy when scoring.
    #[must_use]
    pub const fn healthy_weight_range(&self) -> (i32, i32) {
        (self.optimum_weight * 2 / 3, self.optimum_weight * 4 / 3)
    }
}

impl CatalogEntry for Species {
    const KIND: CatalogKind = CatalogKind::Species;

    fn name(&self) -> &str {
        &self.name
    }

    fn check(&self) -> Result<(), String> {
        if !(1..=MAX_OPTIMUM_WEIGHT).contains(&self.optimum_weight) {
            return Err(format!(
                "optimum weight must be between 1 and {MAX_OPTIMUM_WEIGHT} (got {})",
                self.optimum_weight
            ));
        }
        for (field, value) in [
            ("hunger_decay", self.hunger_decay),
            ("energy_decay", self.energy_decay),
            ("happiness_decay", self.happiness_decay),
        ] {
            if !(0..=STAT_MAX).contains(&value) {
                return Err(format!("{field} must be between 0 and {STAT_MAX} (got {value})"));
            }
        }
        Ok(())
    }
}

/// A food that can be bought and fed to a pet. Consumed on use.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FoodType {
    pub name: String,
    pub price: i64,
    /// Hunger restored per serving.
    pub nutrition: i32,
    /// Happiness change per serving.
    #[serde(default)]
    pub tastiness: i32,
    #[serde(default)]
    pub weight_gain: i32,
}

impl CatalogEntry for FoodType {
    const KIND: CatalogKind = CatalogKind::Food;

    fn name(&self) -> &str {
        &self.name
    }

    fn check(&self) -> Result<(), String> {
        if self.price < 0 {
            return Err(format!("price cannot be negative (got {})", self.price));
        }
        check_delta("nutrition", self.nutrition)?;
        check_delta("tastiness", self.tastiness)?;
        check_delta("weight_gain", self.weight_gain)
    }
}

/// A toy that can be bought and played with until it wears out.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToyType {
    pub name: String,
    pub price: i64,
    /// Happiness gained per play.
    pub fun: i32,
    /// Energy spent per play.
    #[serde(default)]
    pub energy_cost: i32,
    #[serde(default = "ToyType::default_durability")]
    pub durability: u32,
}

impl ToyType {
    const fn default_durability() -> u32 {
        1
    }
}

impl CatalogEntry for ToyType {
    const KIND: CatalogKind = CatalogKind::Toy;

    fn name(&self) -> &str {
        &self.name
    }

    fn check(&self) -> Result<(), String> {
        if self.price < 0 {
            return Err(format!("price cannot be negative (got {})", self.price));
        }
        if self.durability == 0 {
            return Err(String::from("durability must be at least 1"));
        }
        check_delta("fun", self.fun)?;
        check_delta("energy_cost", self.energy_cost)
    }
}

fn check_delta(field: &str, value: i32) -> Result<(), String> {
    if (-STAT_MAX..=STAT_MAX).contains(&value) {
        Ok(())
    } else {
        Err(format!(
            "{field} must be between -{STAT_MAX} and {STAT_MAX} (got {value})"
        ))
    }
}

/// Name-keyed collection of one catalog kind with insert-if-absent semantics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CatalogSection<T> {
    entries: BTreeMap<String, T>,
}

impl<T> Default for CatalogSection<T> {
    fn default() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }
}

impl<T: CatalogEntry> CatalogSection<T> {
    /// Insert `entry` unless an entry with the same name already exists.
    /// Returns `false` when the entry was discarded.
    pub fn insert_if_absent(&mut self, entry: T) -> bool {
        if self.entries.contains_key(entry.name()) {
            return false;
        }
        self.entries.insert(entry.name().to_string(), entry);
        true
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&T> {
        self.entries.get(name)
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.entries.values()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// True when every key matches the name of the entry stored under it.
    #[must_use]
    pub fn is_consistent(&self) -> bool {
        self.entries.iter().all(|(key, entry)| key == entry.name())
    }

    /// Run the entry checks over every stored entry.
    fn validate(&self) -> Result<(), CatalogError> {
        self.entries.values().try_for_each(validate_entry)
    }

    fn from_json(json: &str) -> Result<(Self, Vec<String>), CatalogError> {
        let parsed: Vec<T> = serde_json::from_str(json).map_err(|source| CatalogError::Parse {
            kind: T::KIND,
            source,
        })?;
        let mut section = Self::default();
        let mut discarded = Vec::new();
        for entry in parsed {
            validate_entry(&entry)?;
            let name = entry.name().to_string();
            if !section.insert_if_absent(entry) {
                discarded.push(name);
            }
        }
        Ok((section, discarded))
    }

    fn to_json(&self) -> Result<String, serde_json::Error> {
        let entries: Vec<&T> = self.entries.values().collect();
        serde_json::to_string_pretty(&entries)
    }
}

fn validate_entry<T: CatalogEntry>(entry: &T) -> Result<(), CatalogError> {
    if entry.name().trim().is_empty() {
        return Err(CatalogError::Invalid {
            kind: T::KIND,
            name: entry.name().to_string(),
            reason: String::from("name cannot be empty"),
        });
    }
    entry.check().map_err(|reason| CatalogError::Invalid {
        kind: T::KIND,
        name: entry.name().to_string(),
        reason,
    })
}

/// A catalog entry that was skipped or accepted during a merge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogName {
    pub kind: CatalogKind,
    pub name: String,
}

/// Outcome of merging custom assets into a catalog.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MergeReport {
    pub added: Vec<CatalogName>,
    pub discarded: Vec<CatalogName>,
}

impl MergeReport {
    fn record(&mut self, kind: CatalogKind, name: String, inserted: bool) {
        let entry = CatalogName { kind, name };
        if inserted {
            self.added.push(entry);
        } else {
            self.discarded.push(entry);
        }
    }
}

/// Serialized catalog definitions, one JSON array per kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogJson {
    pub species: String,
    pub foods: String,
    pub toys: String,
}

/// Complete reference data for a game.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Catalog {
    pub species: CatalogSection<Species>,
    pub food_types: CatalogSection<FoodType>,
    pub toy_types: CatalogSection<ToyType>,
}

impl Catalog {
    /// Build a catalog from the three JSON definition arrays.
    ///
    /// Duplicate names inside one array keep the first definition.
    ///
    /// # Errors
    ///
    /// Returns an error if any array cannot be parsed or holds an invalid entry.
    pub fn from_json_parts(species: &str, foods: &str, toys: &str) -> Result<Self, CatalogError> {
        let (species, dup_species) = CatalogSection::<Species>::from_json(species)?;
        let (food_types, dup_foods) = CatalogSection::<FoodType>::from_json(foods)?;
        let (toy_types, dup_toys) = CatalogSection::<ToyType>::from_json(toys)?;
        for (kind, names) in [
            (CatalogKind::Species, dup_species),
            (CatalogKind::Food, dup_foods),
            (CatalogKind::Toy, dup_toys),
        ] {
            for name in names {
                log::warn!("discarding duplicate {kind} definition '{name}'");
            }
        }
        Ok(Self {
            species,
            food_types,
            toy_types,
        })
    }

    /// Load the bundled default catalog.
    #[must_use]
    pub fn load_from_static() -> Self {
        Self::from_json_parts(DEFAULT_SPECIES_DATA, DEFAULT_FOOD_DATA, DEFAULT_TOY_DATA)
            .unwrap_or_default()
    }

    /// Shared instance of the bundled default catalog.
    #[must_use]
    pub fn default_catalog() -> &'static Self {
        static CATALOG: OnceLock<Catalog> = OnceLock::new();
        CATALOG.get_or_init(Self::load_from_static)
    }

    /// Export the catalog as three JSON arrays, the same shape it loads from.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json_parts(&self) -> Result<CatalogJson, serde_json::Error> {
        Ok(CatalogJson {
            species: self.species.to_json()?,
            foods: self.food_types.to_json()?,
            toys: self.toy_types.to_json()?,
        })
    }

    /// Merge custom assets. Entries whose name already exists are discarded,
    /// never overwritten.
    pub fn merge(&mut self, other: Self) -> MergeReport {
        let mut report = MergeReport::default();
        for entry in other.species.entries.into_values() {
            let name = entry.name.clone();
            let inserted = self.species.insert_if_absent(entry);
            report.record(CatalogKind::Species, name, inserted);
        }
        for entry in other.food_types.entries.into_values() {
            let name = entry.name.clone();
            let inserted = self.food_types.insert_if_absent(entry);
            report.record(CatalogKind::Food, name, inserted);
        }
        for entry in other.toy_types.entries.into_values() {
            let name = entry.name.clone();
            let inserted = self.toy_types.insert_if_absent(entry);
            report.record(CatalogKind::Toy, name, inserted);
        }
        for skipped in &report.discarded {
            log::warn!(
                "custom {} '{}' conflicts with an existing entry; keeping the original",
                skipped.kind,
                skipped.name
            );
        }
        report
    }

    #[must_use]
    pub fn species(&self, name: &str) -> Option<&Species> {
        self.species.get(name)
    }

    #[must_use]
    pub fn food(&self, name: &str) -> Option<&FoodType> {
        self.food_types.get(name)
    }

    #[must_use]
    pub fn toy(&self, name: &str) -> Option<&ToyType> {
        self.toy_types.get(name)
    }

    /// Stable content hash used to detect tampered or mismatched snapshots.
    #[must_use]
    pub fn fingerprint(&self) -> u64 {
        let bytes = serde_json::to_vec(self).unwrap_or_default();
        let mut hasher = XxHash64::with_seed(0);
        hasher.write(&bytes);
        hasher.finish()
    }

    /// True when every section is keyed by its entries' names.
    #[must_use]
    pub fn is_consistent(&self) -> bool {
        self.species.is_consistent()
            && self.food_types.is_consistent()
            && self.toy_types.is_consistent()
    }

    /// Check every entry as if it had just been loaded from JSON.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Invalid`] for the first entry that fails.
    pub fn validate(&self) -> Result<(), CatalogError> {
        self.species.validate()?;
        self.food_types.validate()?;
        self.toy_types.validate()
    }
}
