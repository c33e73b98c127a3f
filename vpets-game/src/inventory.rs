//! Per-player stock of food servings and owned toys.
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::catalog::{FoodType, ToyType};

/// An owned toy. Wears out after `remaining_uses` plays.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Toy {
    pub kind: ToyType,
    pub remaining_uses: u32,
}

impl Toy {
    #[must_use]
    pub fn new(kind: ToyType) -> Self {
        let remaining_uses = kind.durability.max(1);
        Self {
            kind,
            remaining_uses,
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.kind.name
    }

    /// Use the toy once. Returns `true` when it is now worn out.
    pub const fn wear(&mut self) -> bool {
        self.remaining_uses = self.remaining_uses.saturating_sub(1);
        self.remaining_uses == 0
    }
}

/// Food servings keyed by food name plus an ordered toy box.
///
/// Food entries are removed when their count reaches zero, so every key maps
/// to at least one serving.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Inventory {
    #[serde(default)]
    food: BTreeMap<String, u32>,
    #[serde(default)]
    toys: Vec<Toy>,
}

impl Inventory {
    pub fn add_food(&mut self, food: &FoodType) {
        let count = self.food.entry(food.name.clone()).or_insert(0);
        *count = count.saturating_add(1);
    }

    #[must_use]
    pub fn food_count(&self, name: &str) -> u32 {
        self.food.get(name).copied().unwrap_or(0)
    }

    /// Remove one serving. Returns `false` if none was stocked.
    pub fn take_food(&mut self, name: &str) -> bool {
        let Some(count) = self.food.get_mut(name) else {
            return false;
        };
        *count -= 1;
        if *count == 0 {
            self.food.remove(name);
        }
        true
    }

    pub fn food(&self) -> impl Iterator<Item = (&str, u32)> {
        self.food.iter().map(|(name, count)| (name.as_str(), *count))
    }

    pub fn add_toy(&mut self, toy: Toy) {
        self.toys.push(toy);
    }

    #[must_use]
    pub fn toy(&self, index: usize) -> Option<&Toy> {
        self.toys.get(index)
    }

    #[must_use]
    pub fn toys(&self) -> &[Toy] {
        &self.toys
    }

    /// Wear the toy at `index`, dropping it from the box once worn out.
    /// Returns the removed toy, if any.
    pub fn wear_toy(&mut self, index: usize) -> Option<Toy> {
        let worn_out = self.toys.get_mut(index)?.wear();
        worn_out.then(|| self.toys.remove(index))
    }

    /// Stocked food names, for validation against a catalog.
    pub(crate) fn food_names(&self) -> impl Iterator<Item = &str> {
        self.food.keys().map(String::as_str)
    }

    /// True when no food entry holds a zero count and every toy has uses left.
    pub(crate) fn is_well_formed(&self) -> bool {
        self.food.values().all(|count| *count > 0)
            && self.toys.iter().all(|toy| toy.remaining_uses > 0)
    }
}
