//! Pet state machine: stats, status flags and the per-turn action budget.
//!
//! Every interactive operation checks eligibility first and only mutates on
//! success. All four stats stay inside `[0, 100]` after every mutation.
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::catalog::{FoodType, Species, ToyType};
use crate::constants::{
    DEATH_CHANCE, DISCIPLINE_HAPPINESS_PENALTY, EXHAUSTION_ENERGY, FASTING_WEIGHT_LOSS,
    FAVOURITE_BONUS, ILLNESS_CHANCE, INITIAL_STAT, LOG_PET_DIED, LOG_PET_FELL_ILL,
    LOG_PET_MISBEHAVING, LOG_PET_STARVING, MAX_ACTION_POINTS, MISBEHAVE_CHANCE_MAX,
    MISBEHAVE_HAPPINESS, REVIVE_HAPPINESS, REVIVE_STAT, SCORE_BEHAVING, SCORE_DEAD,
    SCORE_DIED_THIS_TURN, SCORE_HAPPINESS_DIVISOR, SCORE_HEALTHY, SCORE_MISBEHAVING, SCORE_SICK,
    SCORE_WEIGHT_IN_RANGE, SCORE_WEIGHT_OUT_OF_RANGE, SICK_DEATH_BONUS, SLEEP_ENERGY_RECOVERY,
    STARVATION_HUNGER, STAT_MAX, STAT_MIN, TOILET_HAPPINESS_GAIN, TOILET_WEIGHT_LOSS,
};
use crate::error::PetActionError;
use crate::numbers::{apply_stat_delta, clamp_stat, ramp_chance};

/// The four bounded pet stats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stat {
    /// Satiety; low means starving.
    Hunger,
    Energy,
    Happiness,
    Weight,
}

impl Stat {
    pub const ALL: [Self; 4] = [Self::Hunger, Self::Energy, Self::Happiness, Self::Weight];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PetStats {
    pub hunger: i32,
    pub energy: i32,
    pub happiness: i32,
    pub weight: i32,
}

impl PetStats {
    #[must_use]
    pub const fn new(weight: i32) -> Self {
        Self {
            hunger: INITIAL_STAT,
            energy: INITIAL_STAT,
            happiness: INITIAL_STAT,
            weight: clamp_stat(weight),
        }
    }

    #[must_use]
    pub const fn get(&self, stat: Stat) -> i32 {
        match stat {
            Stat::Hunger => self.hunger,
            Stat::Energy => self.energy,
            Stat::Happiness => self.happiness,
            Stat::Weight => self.weight,
        }
    }

    /// Apply a signed delta to one stat, clamping the result.
    pub const fn adjust(&mut self, stat: Stat, delta: i32) {
        let slot = match stat {
            Stat::Hunger => &mut self.hunger,
            Stat::Energy => &mut self.energy,
            Stat::Happiness => &mut self.happiness,
            Stat::Weight => &mut self.weight,
        };
        *slot = apply_stat_delta(*slot, delta);
    }

    pub const fn clamp(&mut self) {
        self.hunger = clamp_stat(self.hunger);
        self.energy = clamp_stat(self.energy);
        self.happiness = clamp_stat(self.happiness);
        self.weight = clamp_stat(self.weight);
    }

    #[must_use]
    pub fn in_bounds(&self) -> bool {
        Stat::ALL
            .iter()
            .all(|stat| (STAT_MIN..=STAT_MAX).contains(&self.get(*stat)))
    }
}

/// Something notable that happened to a pet at the end of a turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PetEvent {
    Starving,
    FellIll,
    Died,
    StartedMisbehaving,
}

impl PetEvent {
    #[must_use]
    pub const fn log_key(self) -> &'static str {
        match self {
            Self::Starving => LOG_PET_STARVING,
            Self::FellIll => LOG_PET_FELL_ILL,
            Self::Died => LOG_PET_DIED,
            Self::StartedMisbehaving => LOG_PET_MISBEHAVING,
        }
    }
}

/// Result of resolving one pet at the end of its owner's turn.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PetTurnReport {
    pub pet_id: u32,
    pub score_delta: i64,
    pub events: Vec<PetEvent>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pet {
    pub id: u32,
    pub name: String,
    pub species: Species,
    pub stats: PetStats,
    pub healthy: bool,
    pub behaving: bool,
    pub alive: bool,
    pub action_points: u8,
    #[serde(default)]
    pub favourite_food: Option<String>,
    #[serde(default)]
    pub favourite_toy: Option<String>,
    #[serde(default)]
    pub meals_this_turn: u8,
    #[serde(default)]
    pub toileted_this_turn: bool,
}

impl Pet {
    #[must_use]
    pub fn new(
        id: u32,
        name: impl Into<String>,
        species: Species,
        favourite_food: Option<String>,
        favourite_toy: Option<String>,
    ) -> Self {
        let stats = PetStats::new(species.optimum_weight);
        Self {
            id,
            name: name.into(),
            species,
            stats,
            healthy: true,
            behaving: true,
            alive: true,
            action_points: MAX_ACTION_POINTS,
            favourite_food,
            favourite_toy,
            meals_this_turn: 0,
            toileted_this_turn: false,
        }
    }

    #[must_use]
    pub const fn hunger(&self) -> i32 {
        self.stats.hunger
    }

    #[must_use]
    pub const fn energy(&self) -> i32 {
        self.stats.energy
    }

    #[must_use]
    pub const fn happiness(&self) -> i32 {
        self.stats.happiness
    }

    #[must_use]
    pub const fn weight(&self) -> i32 {
        self.stats.weight
    }

    #[must_use]
    pub const fn is_alive(&self) -> bool {
        self.alive
    }

    #[must_use]
    pub const fn is_healthy(&self) -> bool {
        self.healthy
    }

    #[must_use]
    pub const fn is_behaving(&self) -> bool {
        self.behaving
    }

    #[must_use]
    pub const fn action_points(&self) -> u8 {
        self.action_points
    }

    /// Slider range for the weight gauge.
    #[must_use]
    pub const fn weight_band(&self) -> (i32, i32) {
        self.species.weight_band()
    }

    #[must_use]
    pub const fn healthy_weight_range(&self) -> (i32, i32) {
        self.species.healthy_weight_range()
    }

    const fn ensure_alive(&self) -> Result<(), PetActionError> {
        if self.alive {
            Ok(())
        } else {
            Err(PetActionError::Dead)
        }
    }

    /// Check that an action point-consuming action is allowed right now.
    ///
    /// # Errors
    ///
    /// Returns [`PetActionError::Dead`] or
    /// [`PetActionError::InsufficientActionPoints`].
    pub const fn ensure_can_act(&self) -> Result<(), PetActionError> {
        if let Err(err) = self.ensure_alive() {
            return Err(err);
        }
        if self.action_points == 0 {
            return Err(PetActionError::InsufficientActionPoints);
        }
        Ok(())
    }

    const fn spend_action_point(&mut self) {
        self.action_points -= 1;
    }

    fn favourite_bonus(favourite: Option<&String>, name: &str) -> i32 {
        if favourite.is_some_and(|fav| fav == name) {
            FAVOURITE_BONUS
        } else {
            0
        }
    }

    /// # Errors
    ///
    /// Fails if the pet is dead or out of action points.
    pub fn feed(&mut self, food: &FoodType) -> Result<(), PetActionError> {
        self.ensure_can_act()?;
        let bonus = Self::favourite_bonus(self.favourite_food.as_ref(), &food.name);
        self.stats.adjust(Stat::Hunger, food.nutrition);
        self.stats
            .adjust(Stat::Happiness, food.tastiness.saturating_add(bonus));
        self.stats.adjust(Stat::Weight, food.weight_gain);
        self.meals_this_turn = self.meals_this_turn.saturating_add(1);
        self.spend_action_point();
        Ok(())
    }

    /// Play with a toy. Wear on the toy itself is tracked by the owner.
    ///
    /// # Errors
    ///
    /// Fails if the pet is dead or out of action points.
    pub fn play_with(&mut self, toy: &ToyType) -> Result<(), PetActionError> {
        self.ensure_can_act()?;
        let bonus = Self::favourite_bonus(self.favourite_toy.as_ref(), &toy.name);
        self.stats
            .adjust(Stat::Happiness, toy.fun.saturating_add(bonus));
        self.stats.adjust(Stat::Energy, -toy.energy_cost);
        self.spend_action_point();
        Ok(())
    }

    /// # Errors
    ///
    /// Fails if the pet is dead or out of action points.
    pub fn sleep(&mut self) -> Result<(), PetActionError> {
        self.ensure_can_act()?;
        self.stats.adjust(Stat::Energy, SLEEP_ENERGY_RECOVERY);
        self.spend_action_point();
        Ok(())
    }

    /// # Errors
    ///
    /// Fails if the pet is dead or out of action points.
    pub fn go_to_toilet(&mut self) -> Result<(), PetActionError> {
        self.ensure_can_act()?;
        self.stats.adjust(Stat::Weight, -TOILET_WEIGHT_LOSS);
        self.stats.adjust(Stat::Happiness, TOILET_HAPPINESS_GAIN);
        self.toileted_this_turn = true;
        self.spend_action_point();
        Ok(())
    }

    /// # Errors
    ///
    /// Fails if the pet is dead, out of action points, or already behaving.
    pub fn discipline(&mut self) -> Result<(), PetActionError> {
        self.ensure_can_act()?;
        if self.behaving {
            return Err(PetActionError::AlreadyBehaving);
        }
        self.behaving = true;
        self.stats
            .adjust(Stat::Happiness, -DISCIPLINE_HAPPINESS_PENALTY);
        self.spend_action_point();
        Ok(())
    }

    /// Whether [`Pet::cure`] would succeed.
    ///
    /// # Errors
    ///
    /// Returns [`PetActionError::Dead`] for a dead pet.
    pub const fn can_cure(&self) -> Result<(), PetActionError> {
        self.ensure_alive()
    }

    /// Restore health. Costs no action points; the price is charged by the owner.
    ///
    /// # Errors
    ///
    /// Returns [`PetActionError::Dead`] for a dead pet.
    pub fn cure(&mut self) -> Result<(), PetActionError> {
        self.can_cure()?;
        self.healthy = true;
        Ok(())
    }

    /// Whether [`Pet::revive`] would succeed.
    ///
    /// # Errors
    ///
    /// Returns [`PetActionError::NotDead`] for a living pet.
    pub const fn can_revive(&self) -> Result<(), PetActionError> {
        if self.alive {
            Err(PetActionError::NotDead)
        } else {
            Ok(())
        }
    }

    /// Bring a dead pet back with reduced stats and a fresh action budget.
    ///
    /// # Errors
    ///
    /// Returns [`PetActionError::NotDead`] for a living pet.
    pub fn revive(&mut self) -> Result<(), PetActionError> {
        self.can_revive()?;
        self.alive = true;
        self.healthy = true;
        self.behaving = true;
        self.stats = PetStats {
            hunger: REVIVE_STAT,
            energy: REVIVE_STAT,
            happiness: REVIVE_HAPPINESS,
            weight: self.species.optimum_weight,
        };
        self.stats.clamp();
        self.action_points = MAX_ACTION_POINTS;
        Ok(())
    }

    /// Resolve passive decay, random risks and scoring at the end of the
    /// owner's turn. Dead pets draw nothing from `rng`.
    pub fn finish_turn<R: Rng + ?Sized>(&mut self, rng: &mut R) -> PetTurnReport {
        let mut report = PetTurnReport {
            pet_id: self.id,
            ..PetTurnReport::default()
        };

        if self.alive {
            self.decay();
            self.resolve_risks(rng, &mut report.events);
            report.score_delta = if self.alive {
                self.turn_score()
            } else {
                SCORE_DIED_THIS_TURN
            };
        } else {
            report.score_delta = SCORE_DEAD;
        }

        self.action_points = MAX_ACTION_POINTS;
        self.meals_this_turn = 0;
        self.toileted_this_turn = false;

        if !report.events.is_empty() {
            log::debug!("pet {} ({}) events: {:?}", self.id, self.name, report.events);
        }
        report
    }

    fn decay(&mut self) {
        self.stats.adjust(Stat::Hunger, -self.species.hunger_decay);
        self.stats.adjust(Stat::Energy, -self.species.energy_decay);
        self.stats
            .adjust(Stat::Happiness, -self.species.happiness_decay);
        if self.meals_this_turn == 0 {
            self.stats.adjust(Stat::Weight, -FASTING_WEIGHT_LOSS);
        }
    }

    fn resolve_risks<R: Rng + ?Sized>(&mut self, rng: &mut R, events: &mut Vec<PetEvent>) {
        if self.stats.hunger < STARVATION_HUNGER {
            events.push(PetEvent::Starving);
            if self.healthy {
                self.healthy = false;
                events.push(PetEvent::FellIll);
            }
        } else if self.healthy && !self.toileted_this_turn && rng.gen_bool(ILLNESS_CHANCE) {
            self.healthy = false;
            events.push(PetEvent::FellIll);
        }

        if self.stats.energy < EXHAUSTION_ENERGY {
            let bonus = if self.healthy { 0.0 } else { SICK_DEATH_BONUS };
            if rng.gen_bool((DEATH_CHANCE + bonus).min(1.0)) {
                self.alive = false;
                events.push(PetEvent::Died);
                return;
            }
        }

        if self.behaving && self.stats.happiness < MISBEHAVE_HAPPINESS {
            let chance = ramp_chance(
                self.stats.happiness,
                MISBEHAVE_HAPPINESS,
                MISBEHAVE_CHANCE_MAX,
            );
            if rng.gen_bool(chance) {
                self.behaving = false;
                events.push(PetEvent::StartedMisbehaving);
            }
        }
    }

    fn turn_score(&self) -> i64 {
        let mut score = i64::from(self.stats.happiness / SCORE_HAPPINESS_DIVISOR);
        score += if self.healthy {
            SCORE_HEALTHY
        } else {
            SCORE_SICK
        };
        score += if self.behaving {
            SCORE_BEHAVING
        } else {
            SCORE_MISBEHAVING
        };
        let (low, high) = self.healthy_weight_range();
        score += if (low..=high).contains(&self.stats.weight) {
            SCORE_WEIGHT_IN_RANGE
        } else {
            SCORE_WEIGHT_OUT_OF_RANGE
        };
        score
    }
}
