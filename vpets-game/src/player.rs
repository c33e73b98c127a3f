//! Players own their pets, money, score and inventory.
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::catalog::{FoodType, ToyType};
use crate::constants::{CURE_PRICE, REVIVE_PRICE};
use crate::error::GameError;
use crate::inventory::{Inventory, Toy};
use crate::pet::{Pet, PetTurnReport};

pub type PetList = SmallVec<[Pet; 3]>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    pub id: u32,
    pub name: String,
    pub pets: PetList,
    pub money: i64,
    pub score: i64,
    #[serde(default)]
    pub inventory: Inventory,
}

impl Player {
    #[must_use]
    pub fn new(id: u32, name: impl Into<String>, pets: PetList, money: i64) -> Self {
        Self {
            id,
            name: name.into(),
            pets,
            money,
            score: 0,
            inventory: Inventory::default(),
        }
    }

    #[must_use]
    pub fn pets(&self) -> &[Pet] {
        &self.pets
    }

    /// # Panics
    ///
    /// Panics if `index` does not name one of this player's pets.
    #[must_use]
    pub fn pet(&self, index: usize) -> &Pet {
        self.pets.get(index).unwrap_or_else(|| {
            panic!(
                "pet index {index} is not owned by {} ({} pets)",
                self.name,
                self.pets.len()
            )
        })
    }

    fn pet_mut(&mut self, index: usize) -> &mut Pet {
        let owned = self.pets.len();
        let name = &self.name;
        match self.pets.get_mut(index) {
            Some(pet) => pet,
            None => panic!("pet index {index} is not owned by {name} ({owned} pets)"),
        }
    }

    pub fn add_food(&mut self, food: &FoodType) {
        self.inventory.add_food(food);
    }

    pub fn add_toy(&mut self, toy: Toy) {
        self.inventory.add_toy(toy);
    }

    #[must_use]
    pub fn food_count(&self, name: &str) -> u32 {
        self.inventory.food_count(name)
    }

    #[must_use]
    pub fn toys(&self) -> &[Toy] {
        self.inventory.toys()
    }

    fn missing(&self, item: &str) -> GameError {
        GameError::MissingItem {
            player: self.name.clone(),
            item: item.to_string(),
        }
    }

    /// Feed one serving of `food` from the inventory to a pet.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::MissingItem`] when no serving is stocked, or the
    /// pet's refusal. The serving is only consumed on success.
    ///
    /// # Panics
    ///
    /// Panics if `pet_index` does not name one of this player's pets.
    pub fn feed(&mut self, pet_index: usize, food: &FoodType) -> Result<(), GameError> {
        if self.inventory.food_count(&food.name) == 0 {
            return Err(self.missing(&food.name));
        }
        let pet = self.pet_mut(pet_index);
        pet.feed(food)
            .map_err(|reason| GameError::pet(&pet.name, reason))?;
        self.inventory.take_food(&food.name);
        Ok(())
    }

    /// Play with the toy in slot `toy_index`. Returns the toy if it wore out.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::MissingItem`] for an empty slot, or the pet's
    /// refusal. The toy only wears on success.
    ///
    /// # Panics
    ///
    /// Panics if `pet_index` does not name one of this player's pets.
    pub fn play_with(&mut self, pet_index: usize, toy_index: usize) -> Result<Option<Toy>, GameError> {
        let Some(kind) = self.inventory.toy(toy_index).map(|toy| toy.kind.clone()) else {
            return Err(self.missing(&format!("toy #{toy_index}")));
        };
        let pet = self.pet_mut(pet_index);
        pet.play_with(&kind)
            .map_err(|reason| GameError::pet(&pet.name, reason))?;
        Ok(self.inventory.wear_toy(toy_index))
    }

    fn ensure_funds(&self, needed: i64) -> Result<(), GameError> {
        if self.money < needed {
            return Err(GameError::InsufficientFunds {
                needed,
                available: self.money,
            });
        }
        Ok(())
    }

    /// Pay for and apply a cure. Eligibility and funds are checked before
    /// anything changes.
    ///
    /// # Errors
    ///
    /// Returns the pet's refusal or [`GameError::InsufficientFunds`].
    ///
    /// # Panics
    ///
    /// Panics if `pet_index` does not name one of this player's pets.
    pub fn cure_pet(&mut self, pet_index: usize) -> Result<(), GameError> {
        let pet = self.pet(pet_index);
        pet.can_cure()
            .map_err(|reason| GameError::pet(&pet.name, reason))?;
        self.ensure_funds(CURE_PRICE)?;
        self.money -= CURE_PRICE;
        let pet = self.pet_mut(pet_index);
        pet.cure()
            .map_err(|reason| GameError::pet(&pet.name, reason))
    }

    /// Pay for and apply a revival.
    ///
    /// # Errors
    ///
    /// Returns the pet's refusal or [`GameError::InsufficientFunds`].
    ///
    /// # Panics
    ///
    /// Panics if `pet_index` does not name one of this player's pets.
    pub fn revive_pet(&mut self, pet_index: usize) -> Result<(), GameError> {
        let pet = self.pet(pet_index);
        pet.can_revive()
            .map_err(|reason| GameError::pet(&pet.name, reason))?;
        self.ensure_funds(REVIVE_PRICE)?;
        self.money -= REVIVE_PRICE;
        let pet = self.pet_mut(pet_index);
        pet.revive()
            .map_err(|reason| GameError::pet(&pet.name, reason))
    }

    /// Buy one serving of food.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::InsufficientFunds`] if the price exceeds the balance.
    pub fn buy_food(&mut self, food: &FoodType) -> Result<(), GameError> {
        self.ensure_funds(food.price)?;
        self.money -= food.price;
        self.add_food(food);
        Ok(())
    }

    /// Buy a new toy.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::InsufficientFunds`] if the price exceeds the balance.
    pub fn buy_toy(&mut self, toy: &ToyType) -> Result<(), GameError> {
        self.ensure_funds(toy.price)?;
        self.money -= toy.price;
        self.add_toy(Toy::new(toy.clone()));
        Ok(())
    }

    /// Raw balance change. Callers decide whether a negative balance is allowed.
    pub const fn change_money(&mut self, delta: i64) {
        self.money = self.money.saturating_add(delta);
    }

    pub const fn change_score(&mut self, delta: i64) {
        self.score = self.score.saturating_add(delta);
    }

    /// Resolve every pet for the end of this player's turn and bank the score.
    pub(crate) fn finish_turn<R: rand::Rng + ?Sized>(&mut self, rng: &mut R) -> Vec<PetTurnReport> {
        let reports: Vec<PetTurnReport> = self
            .pets
            .iter_mut()
            .map(|pet| pet.finish_turn(rng))
            .collect();
        let delta = reports.iter().map(|report| report.score_delta).sum();
        self.change_score(delta);
        reports
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Species;
    use crate::error::PetActionError;
    use smallvec::smallvec;

    fn player(money: i64) -> Player {
        let species = Species {
            name: String::from("Dog"),
            optimum_weight: 45,
            icon: String::new(),
            hunger_decay: 18,
            energy_decay: 12,
            happiness_decay: 8,
        };
        Player::new(
            1,
            "Alice",
            smallvec![Pet::new(1, "Rex", species, None, None)],
            money,
        )
    }

    fn kibble() -> FoodType {
        FoodType {
            name: String::from("Kibble"),
            price: 5,
            nutrition: 25,
            tastiness: 2,
            weight_gain: 1,
        }
    }

    fn ball() -> ToyType {
        ToyType {
            name: String::from("Ball"),
            price: 10,
            fun: 15,
            energy_cost: 10,
            durability: 1,
        }
    }

    #[test]
    fn feeding_consumes_stock_only_on_success() {
        let mut player = player(0);
        assert!(matches!(
            player.feed(0, &kibble()),
            Err(GameError::MissingItem { .. })
        ));

        player.add_food(&kibble());
        player.pets[0].action_points = 0;
        let err = player.feed(0, &kibble()).unwrap_err();
        assert_eq!(
            err.pet_reason(),
            Some(PetActionError::InsufficientActionPoints)
        );
        assert_eq!(player.food_count("Kibble"), 1);

        player.pets[0].action_points = 2;
        player.feed(0, &kibble()).unwrap();
        assert_eq!(player.food_count("Kibble"), 0);
        assert_eq!(player.pet(0).hunger(), 95);
    }

    #[test]
    fn toys_wear_out_after_play() {
        let mut player = player(0);
        player.add_toy(Toy::new(ball()));
        let worn = player.play_with(0, 0).unwrap();
        assert!(worn.is_some());
        assert!(player.toys().is_empty());
        assert!(matches!(
            player.play_with(0, 0),
            Err(GameError::MissingItem { .. })
        ));
    }

    #[test]
    fn cure_charges_exactly_once() {
        let mut player = player(100);
        player.pets[0].healthy = false;
        player.cure_pet(0).unwrap();
        assert_eq!(player.money, 50);
        assert!(player.pet(0).is_healthy());

        let mut poor = self::player(10);
        poor.pets[0].healthy = false;
        let err = poor.cure_pet(0).unwrap_err();
        assert_eq!(
            err,
            GameError::InsufficientFunds {
                needed: 50,
                available: 10
            }
        );
        assert_eq!(poor.money, 10);
        assert!(!poor.pet(0).is_healthy());
    }

    #[test]
    fn revive_checks_before_charging() {
        let mut player = player(500);
        let err = player.revive_pet(0).unwrap_err();
        assert_eq!(err.pet_reason(), Some(PetActionError::NotDead));
        assert_eq!(player.money, 500);

        player.pets[0].alive = false;
        player.revive_pet(0).unwrap();
        assert_eq!(player.money, 400);
        assert!(player.pet(0).is_alive());
    }

    #[test]
    fn purchases_never_overdraw() {
        let mut player = player(12);
        player.buy_toy(&ball()).unwrap();
        assert_eq!(player.money, 2);
        assert!(player.buy_food(&kibble()).is_err());
        assert_eq!(player.money, 2);
        assert_eq!(player.food_count("Kibble"), 0);
    }

    #[test]
    #[should_panic(expected = "not owned")]
    fn foreign_pet_index_panics() {
        let mut player = player(0);
        player.add_food(&kibble());
        let _ = player.feed(3, &kibble());
    }
}
