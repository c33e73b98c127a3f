//! Centralized balance and tuning constants for Virtual Pets game logic.
//!
//! These values define the deterministic math for the pet simulation.
//! Keeping them together ensures that gameplay can only be adjusted via
//! code changes reviewed in version control, rather than through external
//! JSON assets.

// Logging keys -------------------------------------------------------------
pub(crate) const LOG_SESSION_START: &str = "log.session.start";
pub(crate) const LOG_TURN_END: &str = "log.turn.end";
pub(crate) const LOG_ROUND_COMPLETE: &str = "log.round.complete";
pub(crate) const LOG_GAME_OVER: &str = "log.game.over";
pub(crate) const LOG_PET_STARVING: &str = "log.pet.starving";
pub(crate) const LOG_PET_FELL_ILL: &str = "log.pet.fell-ill";
pub(crate) const LOG_PET_DIED: &str = "log.pet.died";
pub(crate) const LOG_PET_MISBEHAVING: &str = "log.pet.misbehaving";
pub(crate) const LOG_PET_CURED: &str = "log.pet.cured";
pub(crate) const LOG_PET_REVIVED: &str = "log.pet.revived";
pub(crate) const LOG_SHOP_FOOD: &str = "log.shop.food";
pub(crate) const LOG_SHOP_TOY: &str = "log.shop.toy";

// Stat bounds --------------------------------------------------------------
pub(crate) const STAT_MIN: i32 = 0;
pub(crate) const STAT_MAX: i32 = 100;
pub(crate) const INITIAL_STAT: i32 = 70;
pub const MAX_ACTION_POINTS: u8 = 2;

// Interaction tuning -------------------------------------------------------
pub(crate) const SLEEP_ENERGY_RECOVERY: i32 = 40;
pub(crate) const TOILET_WEIGHT_LOSS: i32 = 2;
pub(crate) const TOILET_HAPPINESS_GAIN: i32 = 5;
pub(crate) const DISCIPLINE_HAPPINESS_PENALTY: i32 = 30;
pub(crate) const FAVOURITE_BONUS: i32 = 10;
pub(crate) const REVIVE_STAT: i32 = 60;
pub(crate) const REVIVE_HAPPINESS: i32 = 50;

// Prices -------------------------------------------------------------------
pub const CURE_PRICE: i64 = 50;
pub const REVIVE_PRICE: i64 = 100;

// End-of-turn risk tuning --------------------------------------------------
pub(crate) const STARVATION_HUNGER: i32 = 10;
pub(crate) const ILLNESS_CHANCE: f64 = 0.08;
pub(crate) const EXHAUSTION_ENERGY: i32 = 10;
pub(crate) const DEATH_CHANCE: f64 = 0.30;
pub(crate) const SICK_DEATH_BONUS: f64 = 0.20;
pub(crate) const MISBEHAVE_HAPPINESS: i32 = 30;
pub(crate) const MISBEHAVE_CHANCE_MAX: f64 = 0.6;
pub(crate) const FASTING_WEIGHT_LOSS: i32 = 2;

// Species decay defaults ---------------------------------------------------
pub(crate) const DEFAULT_HUNGER_DECAY: i32 = 15;
pub(crate) const DEFAULT_ENERGY_DECAY: i32 = 10;
pub(crate) const DEFAULT_HAPPINESS_DECAY: i32 = 8;
pub(crate) const MAX_OPTIMUM_WEIGHT: i32 = 60;

// Scoring ------------------------------------------------------------------
pub(crate) const SCORE_HAPPINESS_DIVISOR: i32 = 10;
pub(crate) const SCORE_HEALTHY: i64 = 5;
pub(crate) const SCORE_SICK: i64 = -5;
pub(crate) const SCORE_BEHAVING: i64 = 2;
pub(crate) const SCORE_MISBEHAVING: i64 = -3;
pub(crate) const SCORE_WEIGHT_IN_RANGE: i64 = 3;
pub(crate) const SCORE_WEIGHT_OUT_OF_RANGE: i64 = -2;
pub(crate) const SCORE_DIED_THIS_TURN: i64 = -20;
pub(crate) const SCORE_DEAD: i64 = -10;

// Session setup ------------------------------------------------------------
pub const MAX_PETS_PER_PLAYER: usize = 3;
pub const MAX_PLAYERS: usize = 8;
pub(crate) const DEFAULT_NUMBER_OF_DAYS: u32 = 10;
pub(crate) const DEFAULT_INCOME_PER_TURN: i64 = 25;
pub(crate) const DEFAULT_STARTING_MONEY: i64 = 100;

// Persistence --------------------------------------------------------------
pub const SNAPSHOT_VERSION: u32 = 1;
pub(crate) const RNG_TURN_DOMAIN: &[u8] = b"turns";
pub(crate) const RNG_SETUP_DOMAIN: &[u8] = b"setup";
