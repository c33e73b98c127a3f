use std::fmt;

use rand::seq::IteratorRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;
use vpets_game::{
    CURE_PRICE, Catalog, GameError, GameSession, Pet, Player, REVIVE_PRICE, ShopItem,
};

/// Happiness below which a careful owner reaches for a toy.
const PLAY_THRESHOLD: i32 = 70;
/// Hunger below which a careful owner feeds.
const FEED_THRESHOLD: i32 = 60;
const REST_THRESHOLD: i32 = 40;
/// Energy kept in hand after playing so a toy never exhausts the pet.
const PLAY_ENERGY_MARGIN: i32 = 20;
/// Misbehaving pets are only disciplined while they can absorb the happiness hit.
const DISCIPLINE_MIN_HAPPINESS: i32 = 40;

/// A single thing an automated player does during their turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CareAction {
    SelectPet(usize),
    Feed(String),
    PlayWith(usize),
    Sleep,
    Toilet,
    Discipline,
    Cure,
    Revive,
    Buy(ShopItem),
}

impl CareAction {
    /// Perform the action on the active player's turn.
    ///
    /// # Errors
    ///
    /// Propagates the session's refusal unchanged.
    pub fn apply(&self, session: &mut GameSession) -> Result<(), GameError> {
        match self {
            Self::SelectPet(index) => session.select_pet(*index),
            Self::Feed(food) => session.feed(food),
            Self::PlayWith(toy) => session.play_with(*toy).map(|_| ()),
            Self::Sleep => session.sleep(),
            Self::Toilet => session.go_to_toilet(),
            Self::Discipline => session.discipline(),
            Self::Cure => session.cure(),
            Self::Revive => session.revive(),
            Self::Buy(item) => session.buy(item),
        }
    }
}

impl fmt::Display for CareAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SelectPet(index) => write!(f, "select pet #{index}"),
            Self::Feed(food) => write!(f, "feed {food}"),
            Self::PlayWith(toy) => write!(f, "play with toy #{toy}"),
            Self::Sleep => f.write_str("sleep"),
            Self::Toilet => f.write_str("toilet"),
            Self::Discipline => f.write_str("discipline"),
            Self::Cure => f.write_str("cure"),
            Self::Revive => f.write_str("revive"),
            Self::Buy(item) => write!(f, "buy {} {}", item.kind(), item.name()),
        }
    }
}

/// Policy interface for automated players.
pub trait CarePolicy {
    /// Name used for logging/debug output.
    fn name(&self) -> &'static str;

    /// Called once when the owner's turn starts.
    fn begin_turn(&mut self) {}

    /// Next action for the active player, or `None` to end the turn.
    fn next_action(&mut self, session: &GameSession) -> Option<CareAction>;
}

/// Built-in care strategies for automated runs.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CareStrategy {
    Attentive,
    Thrifty,
    Neglectful,
    Chaotic,
}

impl CareStrategy {
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Attentive => "Attentive",
            Self::Thrifty => "Thrifty",
            Self::Neglectful => "Neglectful",
            Self::Chaotic => "Chaotic",
        }
    }

    #[must_use]
    pub fn create_policy(self, seed: u64) -> Box<dyn CarePolicy + Send> {
        match self {
            Self::Attentive => Box::new(RoutinePolicy::new("attentive", CareBudget::ATTENTIVE)),
            Self::Thrifty => Box::new(RoutinePolicy::new("thrifty", CareBudget::THRIFTY)),
            Self::Neglectful => Box::new(NeglectfulPolicy),
            Self::Chaotic => Box::new(ChaoticPolicy::new(seed)),
        }
    }
}

impl fmt::Display for CareStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Spending rules for the routine policies.
#[derive(Debug, Clone, Copy)]
struct CareBudget {
    /// Money left untouched by cures and toy purchases.
    reserve: i64,
    revive: bool,
    toys: bool,
    /// Prefer the best food over the best value.
    treats: bool,
}

impl CareBudget {
    const ATTENTIVE: Self = Self {
        reserve: 0,
        revive: true,
        toys: true,
        treats: true,
    };
    const THRIFTY: Self = Self {
        reserve: 40,
        revive: false,
        toys: false,
        treats: false,
    };
}

/// Walks the pets in order and applies a fixed care routine to each.
struct RoutinePolicy {
    name: &'static str,
    budget: CareBudget,
    cursor: usize,
}

impl RoutinePolicy {
    const fn new(name: &'static str, budget: CareBudget) -> Self {
        Self {
            name,
            budget,
            cursor: 0,
        }
    }
}

impl CarePolicy for RoutinePolicy {
    fn name(&self) -> &'static str {
        self.name
    }

    fn begin_turn(&mut self) {
        self.cursor = 0;
    }

    fn next_action(&mut self, session: &GameSession) -> Option<CareAction> {
        let player = session.active_player();
        while self.cursor < player.pets().len() {
            if session.turn_state().active_pet_index != self.cursor {
                return Some(CareAction::SelectPet(self.cursor));
            }
            if let Some(action) = care_for(player, session.active_pet(), session.catalog(), self.budget)
            {
                return Some(action);
            }
            self.cursor += 1;
        }
        None
    }
}

fn care_for(player: &Player, pet: &Pet, catalog: &Catalog, budget: CareBudget) -> Option<CareAction> {
    if !pet.is_alive() {
        return (budget.revive && player.money >= REVIVE_PRICE).then_some(CareAction::Revive);
    }
    if !pet.is_healthy() && player.money >= CURE_PRICE + budget.reserve {
        return Some(CareAction::Cure);
    }
    if pet.action_points() == 0 {
        return None;
    }
    if !pet.is_behaving() && pet.happiness() >= DISCIPLINE_MIN_HAPPINESS {
        return Some(CareAction::Discipline);
    }

    let (low, high) = pet.healthy_weight_range();
    if pet.hunger() < FEED_THRESHOLD || pet.weight() < low {
        if let Some(food) = pick_owned_food(player, pet, catalog, budget) {
            return Some(CareAction::Feed(food));
        }
        if let Some(food) = pick_food_to_buy(player, pet, catalog, budget) {
            return Some(CareAction::Buy(ShopItem::Food(food)));
        }
    }
    if pet.energy() < REST_THRESHOLD {
        return Some(CareAction::Sleep);
    }
    if pet.weight() > high {
        return Some(CareAction::Toilet);
    }
    if budget.toys
        && pet.happiness() < PLAY_THRESHOLD
        && let Some(action) = pick_play(player, pet, catalog, budget)
    {
        return Some(action);
    }
    if !pet.toileted_this_turn && pet.weight() > low + 2 {
        return Some(CareAction::Toilet);
    }
    None
}

fn food_rank(pet: &Pet, food: &vpets_game::FoodType, treats: bool) -> (bool, i64) {
    let favourite = pet.favourite_food.as_deref() == Some(food.name.as_str());
    let value = if treats {
        i64::from(food.nutrition)
    } else {
        i64::from(food.nutrition) * 100 / food.price.max(1)
    };
    (favourite, value)
}

fn pick_owned_food(player: &Player, pet: &Pet, catalog: &Catalog, budget: CareBudget) -> Option<String> {
    catalog
        .food_types
        .iter()
        .filter(|food| player.food_count(&food.name) > 0)
        .max_by_key(|food| food_rank(pet, food, budget.treats))
        .map(|food| food.name.clone())
}

fn pick_food_to_buy(player: &Player, pet: &Pet, catalog: &Catalog, budget: CareBudget) -> Option<String> {
    catalog
        .food_types
        .iter()
        .filter(|food| food.price <= player.money)
        .max_by_key(|food| food_rank(pet, food, budget.treats))
        .map(|food| food.name.clone())
}

fn pick_play(player: &Player, pet: &Pet, catalog: &Catalog, budget: CareBudget) -> Option<CareAction> {
    let playable = |cost: i32| pet.energy() > cost + PLAY_ENERGY_MARGIN;
    let owned = player
        .toys()
        .iter()
        .enumerate()
        .filter(|(_, toy)| playable(toy.kind.energy_cost))
        .max_by_key(|(_, toy)| {
            (
                pet.favourite_toy.as_deref() == Some(toy.name()),
                toy.kind.fun,
            )
        });
    if let Some((index, _)) = owned {
        return Some(CareAction::PlayWith(index));
    }
    catalog
        .toy_types
        .iter()
        .filter(|toy| playable(toy.energy_cost) && toy.price + budget.reserve <= player.money)
        .min_by_key(|toy| toy.price)
        .map(|toy| CareAction::Buy(ShopItem::Toy(toy.name.clone())))
}

/// Ends every turn without touching the pets.
struct NeglectfulPolicy;

impl CarePolicy for NeglectfulPolicy {
    fn name(&self) -> &'static str {
        "neglectful"
    }

    fn next_action(&mut self, _session: &GameSession) -> Option<CareAction> {
        None
    }
}

/// Random actions with random arguments, including out-of-range ones.
struct ChaoticPolicy {
    rng: ChaCha20Rng,
    remaining: u32,
}

impl ChaoticPolicy {
    const MAX_ACTIONS: u32 = 6;

    fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha20Rng::seed_from_u64(seed),
            remaining: 0,
        }
    }
}

impl CarePolicy for ChaoticPolicy {
    fn name(&self) -> &'static str {
        "chaotic"
    }

    fn begin_turn(&mut self) {
        self.remaining = self.rng.gen_range(0..=Self::MAX_ACTIONS);
    }

    fn next_action(&mut self, session: &GameSession) -> Option<CareAction> {
        if self.remaining == 0 {
            return None;
        }
        self.remaining -= 1;
        let player = session.active_player();
        let catalog = session.catalog();
        let action = match self.rng.gen_range(0..10) {
            0 => CareAction::SelectPet(self.rng.gen_range(0..=player.pets().len())),
            1 => {
                let food = catalog.food_types.names().choose(&mut self.rng)?;
                CareAction::Feed(food.to_string())
            }
            2 => CareAction::PlayWith(self.rng.gen_range(0..=player.toys().len())),
            3 => CareAction::Sleep,
            4 => CareAction::Toilet,
            5 => CareAction::Discipline,
            6 => CareAction::Cure,
            7 => CareAction::Revive,
            8 => {
                let food = catalog.food_types.names().choose(&mut self.rng)?;
                CareAction::Buy(ShopItem::Food(food.to_string()))
            }
            _ => {
                let toy = catalog.toy_types.names().choose(&mut self.rng)?;
                CareAction::Buy(ShopItem::Toy(toy.to_string()))
            }
        };
        Some(action)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vpets_game::{PetSetup, PlayerSetup, SessionConfig, SessionState};

    fn session_with(edit: impl FnOnce(&mut SessionState)) -> GameSession {
        let setups = vec![PlayerSetup::new(
            "Ann",
            vec![PetSetup::new("Tom", "Cat"), PetSetup::new("Rex", "Dog")],
        )];
        let session = GameSession::initialise(
            Catalog::load_from_static(),
            &setups,
            &SessionConfig::default().with_seed(11),
        )
        .unwrap();
        let mut snapshot = session.capture_snapshot();
        edit(&mut snapshot.state);
        GameSession::from_snapshot(snapshot).unwrap()
    }

    #[test]
    fn hungry_pet_gets_food_bought_then_fed() {
        let mut session = session_with(|state| state.players[0].pets[0].stats.hunger = 20);
        let mut policy = CareStrategy::Attentive.create_policy(1);
        policy.begin_turn();

        let first = policy.next_action(&session).unwrap();
        assert!(matches!(first, CareAction::Buy(ShopItem::Food(_))));
        first.apply(&mut session).unwrap();

        let second = policy.next_action(&session).unwrap();
        assert!(matches!(second, CareAction::Feed(_)));
        second.apply(&mut session).unwrap();
        assert!(session.active_pet().hunger() > 20);
    }

    #[test]
    fn routine_moves_on_to_the_next_pet() {
        let mut session = session_with(|state| {
            state.players[0].pets[0].action_points = 0;
        });
        let mut policy = CareStrategy::Attentive.create_policy(1);
        policy.begin_turn();
        let action = policy.next_action(&session).unwrap();
        assert_eq!(action, CareAction::SelectPet(1));
        action.apply(&mut session).unwrap();
        assert_eq!(session.turn_state().active_pet_index, 1);
    }

    #[test]
    fn thrifty_owner_keeps_a_reserve_before_curing() {
        let session = session_with(|state| {
            state.players[0].money = CURE_PRICE + 10;
            state.players[0].pets[0].healthy = false;
        });
        let mut thrifty = CareStrategy::Thrifty.create_policy(1);
        thrifty.begin_turn();
        assert_ne!(thrifty.next_action(&session), Some(CareAction::Cure));

        let mut attentive = CareStrategy::Attentive.create_policy(1);
        attentive.begin_turn();
        assert_eq!(attentive.next_action(&session), Some(CareAction::Cure));
    }

    #[test]
    fn dead_pet_is_revived_only_when_affordable() {
        let rich = session_with(|state| {
            state.players[0].money = REVIVE_PRICE;
            state.players[0].pets[0].alive = false;
        });
        let mut policy = CareStrategy::Attentive.create_policy(1);
        policy.begin_turn();
        assert_eq!(policy.next_action(&rich), Some(CareAction::Revive));

        let poor = session_with(|state| {
            state.players[0].money = REVIVE_PRICE - 1;
            state.players[0].pets[0].alive = false;
        });
        policy.begin_turn();
        assert_eq!(policy.next_action(&poor), Some(CareAction::SelectPet(1)));
    }

    #[test]
    fn neglectful_policy_never_acts() {
        let session = session_with(|_| {});
        let mut policy = CareStrategy::Neglectful.create_policy(1);
        policy.begin_turn();
        assert!(policy.next_action(&session).is_none());
    }

    #[test]
    fn chaotic_policy_is_reproducible() {
        let session = session_with(|_| {});
        let draw = |seed| {
            let mut policy = CareStrategy::Chaotic.create_policy(seed);
            let mut actions = Vec::new();
            for _ in 0..5 {
                policy.begin_turn();
                while let Some(action) = policy.next_action(&session) {
                    actions.push(action);
                }
            }
            actions
        };
        assert_eq!(draw(99), draw(99));
        assert!(draw(99).len() <= 5 * ChaoticPolicy::MAX_ACTIONS as usize);
    }

    #[test]
    fn labels_are_distinct() {
        let all = [
            CareStrategy::Attentive,
            CareStrategy::Thrifty,
            CareStrategy::Neglectful,
            CareStrategy::Chaotic,
        ];
        let labels: std::collections::HashSet<_> = all.iter().map(|s| s.label()).collect();
        assert_eq!(labels.len(), all.len());
        assert_eq!(CareStrategy::Thrifty.to_string(), "Thrifty");
    }
}
