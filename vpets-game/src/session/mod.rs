//! Game session: the single mutation surface and the turn/round controller.
//!
//! A session owns the catalog, the players in fixed turn order and one seeded
//! randomness stream. The active player and pet are tracked by index; every
//! action resolves against them.
pub mod rng;
pub mod setup;

pub use rng::{RngState, TurnRng};
pub use setup::{PetSetup, PlayerSetup, SessionConfig, SetupError, validate_roster};

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::catalog::Catalog;
use crate::constants::{
    LOG_GAME_OVER, LOG_PET_CURED, LOG_PET_REVIVED, LOG_ROUND_COMPLETE, LOG_SESSION_START,
    LOG_SHOP_FOOD, LOG_SHOP_TOY, LOG_TURN_END, RNG_SETUP_DOMAIN, RNG_TURN_DOMAIN,
};
use crate::error::{GameError, PetActionError};
use crate::inventory::Toy;
use crate::pet::{Pet, PetTurnReport};
use crate::player::Player;
use crate::result::Standings;
use crate::store::{self, ShopItem, ShopListing};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionPhase {
    #[default]
    InProgress,
    GameOver,
}

/// Scores captured when a round wraps, for the between-rounds summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundOverview {
    /// The day that just finished.
    pub day: u32,
    pub standings: Standings,
    pub previous: Standings,
}

/// Read-only turn status for the view layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TurnState {
    pub active_player_id: u32,
    pub active_player_index: usize,
    pub active_pet_index: usize,
    pub day: u32,
    pub number_of_days: u32,
    pub round_over: bool,
    pub game_over: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TurnTransition {
    NextPlayer,
    RoundComplete { day: u32 },
    GameOver,
}

/// Everything that happened when a player ended their turn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TurnOutcome {
    pub player_id: u32,
    pub income: i64,
    pub pet_reports: Vec<PetTurnReport>,
    pub score_delta: i64,
    pub transition: TurnTransition,
}

/// Persistable session data. The active player is stored by id and the
/// randomness stream by position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionState {
    pub catalog: Catalog,
    pub players: Vec<Player>,
    pub number_of_days: u32,
    pub income_per_turn: i64,
    pub current_day: u32,
    pub active_player: u32,
    #[serde(default)]
    pub active_pet_index: usize,
    #[serde(default)]
    pub previous_round_scores: Standings,
    #[serde(default)]
    pub round_overview: Option<RoundOverview>,
    #[serde(default)]
    pub phase: SessionPhase,
    #[serde(default)]
    pub logs: Vec<String>,
    pub rng: RngState,
}

#[derive(Debug, Clone)]
pub struct GameSession {
    state: SessionState,
    active_player_index: usize,
    rng: TurnRng,
}

impl GameSession {
    /// Start a new game on day 1 with the first player active.
    ///
    /// # Errors
    ///
    /// Returns a [`SetupError`] if the config or roster is invalid.
    pub fn initialise(
        catalog: Catalog,
        setups: &[PlayerSetup],
        config: &SessionConfig,
    ) -> Result<Self, SetupError> {
        let mut setup_rng = TurnRng::from_user_seed(config.seed, RNG_SETUP_DOMAIN);
        let players = setup::build_players(&catalog, setups, config, &mut setup_rng)?;
        let rng = TurnRng::from_user_seed(config.seed, RNG_TURN_DOMAIN);
        let active_player = players.first().map_or(0, |player| player.id);
        let previous_round_scores = Standings::from_players(&players);

        log::info!(
            "starting session: {} players, {} days, seed {}",
            players.len(),
            config.number_of_days,
            config.seed
        );
        let state = SessionState {
            catalog,
            players,
            number_of_days: config.number_of_days,
            income_per_turn: config.income_per_turn,
            current_day: 1,
            active_player,
            active_pet_index: 0,
            previous_round_scores,
            round_overview: None,
            phase: SessionPhase::InProgress,
            logs: vec![String::from(LOG_SESSION_START)],
            rng: rng.state(),
        };
        Ok(Self {
            state,
            active_player_index: 0,
            rng,
        })
    }

    /// Install already-validated state.
    pub(crate) fn from_parts(state: SessionState, active_player_index: usize) -> Self {
        let rng = TurnRng::restore(state.rng, RNG_TURN_DOMAIN);
        Self {
            state,
            active_player_index,
            rng,
        }
    }

    /// Session data with the randomness position brought up to date.
    #[must_use]
    pub fn state(&self) -> SessionState {
        let mut state = self.state.clone();
        state.rng = self.rng.state();
        state
    }

    #[must_use]
    pub fn catalog(&self) -> &Catalog {
        &self.state.catalog
    }

    #[must_use]
    pub fn players(&self) -> &[Player] {
        &self.state.players
    }

    #[must_use]
    pub fn active_player(&self) -> &Player {
        &self.state.players[self.active_player_index]
    }

    #[must_use]
    pub fn active_pet(&self) -> &Pet {
        self.active_player().pet(self.state.active_pet_index)
    }

    #[must_use]
    pub const fn current_day(&self) -> u32 {
        self.state.current_day
    }

    #[must_use]
    pub const fn number_of_days(&self) -> u32 {
        self.state.number_of_days
    }

    #[must_use]
    pub const fn income_per_turn(&self) -> i64 {
        self.state.income_per_turn
    }

    #[must_use]
    pub const fn phase(&self) -> SessionPhase {
        self.state.phase
    }

    #[must_use]
    pub fn is_game_over(&self) -> bool {
        self.state.phase == SessionPhase::GameOver
    }

    #[must_use]
    pub fn logs(&self) -> &[String] {
        &self.state.logs
    }

    #[must_use]
    pub const fn previous_round_scores(&self) -> &Standings {
        &self.state.previous_round_scores
    }

    #[must_use]
    pub const fn round_overview(&self) -> Option<&RoundOverview> {
        self.state.round_overview.as_ref()
    }

    pub fn dismiss_round_overview(&mut self) {
        self.state.round_overview = None;
    }

    #[must_use]
    pub fn turn_state(&self) -> TurnState {
        TurnState {
            active_player_id: self.state.active_player,
            active_player_index: self.active_player_index,
            active_pet_index: self.state.active_pet_index,
            day: self.state.current_day,
            number_of_days: self.state.number_of_days,
            round_over: self.state.round_overview.is_some(),
            game_over: self.is_game_over(),
        }
    }

    /// Current scores of every player in turn order.
    #[must_use]
    pub fn standings(&self) -> Standings {
        Standings::from_players(&self.state.players)
    }

    /// Final scores, available once the game is over.
    #[must_use]
    pub fn final_standings(&self) -> Option<Standings> {
        self.is_game_over().then(|| self.standings())
    }

    /// Shop rows priced against the active player's balance.
    #[must_use]
    pub fn shop_listings(&self) -> Vec<ShopListing> {
        store::shop_listings(&self.state.catalog, self.active_player().money)
    }

    fn begin_action(&mut self) -> Result<(), GameError> {
        if self.is_game_over() {
            return Err(GameError::GameOver);
        }
        self.state.round_overview = None;
        Ok(())
    }

    /// Choose which of the active player's pets receives actions.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::NoSuchPet`] for an index the player does not own.
    pub fn select_pet(&mut self, index: usize) -> Result<(), GameError> {
        self.begin_action()?;
        let owned = self.active_player().pets.len();
        if index >= owned {
            return Err(GameError::NoSuchPet { index, owned });
        }
        self.state.active_pet_index = index;
        Ok(())
    }

    fn with_active_pet(
        &mut self,
        action: impl FnOnce(&mut Pet) -> Result<(), PetActionError>,
    ) -> Result<(), GameError> {
        self.begin_action()?;
        let pet_index = self.state.active_pet_index;
        let player = &mut self.state.players[self.active_player_index];
        let pet = &mut player.pets[pet_index];
        action(&mut *pet).map_err(|reason| GameError::pet(&pet.name, reason))
    }

    /// Feed the active pet one serving from the active player's inventory.
    ///
    /// # Errors
    ///
    /// Fails for unknown or unstocked food, or if the pet refuses.
    pub fn feed(&mut self, food_name: &str) -> Result<(), GameError> {
        self.begin_action()?;
        let food = self
            .state
            .catalog
            .food(food_name)
            .ok_or_else(|| GameError::UnknownFood(food_name.to_string()))?;
        self.state.players[self.active_player_index].feed(self.state.active_pet_index, food)
    }

    /// Play with the toy in slot `toy_index`. Returns the toy if it wore out.
    ///
    /// # Errors
    ///
    /// Fails for an empty toy slot, or if the pet refuses.
    pub fn play_with(&mut self, toy_index: usize) -> Result<Option<Toy>, GameError> {
        self.begin_action()?;
        let pet_index = self.state.active_pet_index;
        self.state.players[self.active_player_index].play_with(pet_index, toy_index)
    }

    /// # Errors
    ///
    /// Fails if the pet is dead or out of action points.
    pub fn sleep(&mut self) -> Result<(), GameError> {
        self.with_active_pet(Pet::sleep)
    }

    /// # Errors
    ///
    /// Fails if the pet is dead or out of action points.
    pub fn go_to_toilet(&mut self) -> Result<(), GameError> {
        self.with_active_pet(Pet::go_to_toilet)
    }

    /// # Errors
    ///
    /// Fails if the pet is dead, out of action points, or already behaving.
    pub fn discipline(&mut self) -> Result<(), GameError> {
        self.with_active_pet(Pet::discipline)
    }

    /// Pay to cure the active pet.
    ///
    /// # Errors
    ///
    /// Fails for a dead pet or a short balance. Nothing is charged on failure.
    pub fn cure(&mut self) -> Result<(), GameError> {
        self.begin_action()?;
        let pet_index = self.state.active_pet_index;
        self.state.players[self.active_player_index].cure_pet(pet_index)?;
        self.state.logs.push(String::from(LOG_PET_CURED));
        Ok(())
    }

    /// Pay to revive the active pet.
    ///
    /// # Errors
    ///
    /// Fails for a living pet or a short balance. Nothing is charged on failure.
    pub fn revive(&mut self) -> Result<(), GameError> {
        self.begin_action()?;
        let pet_index = self.state.active_pet_index;
        self.state.players[self.active_player_index].revive_pet(pet_index)?;
        self.state.logs.push(String::from(LOG_PET_REVIVED));
        Ok(())
    }

    /// # Errors
    ///
    /// Fails for unknown food or a short balance.
    pub fn buy_food(&mut self, name: &str) -> Result<(), GameError> {
        self.buy(&ShopItem::Food(name.to_string()))
    }

    /// # Errors
    ///
    /// Fails for an unknown toy or a short balance.
    pub fn buy_toy(&mut self, name: &str) -> Result<(), GameError> {
        self.buy(&ShopItem::Toy(name.to_string()))
    }

    /// Buy any shop item for the active player.
    ///
    /// # Errors
    ///
    /// Fails for items outside the catalog or a short balance.
    pub fn buy(&mut self, item: &ShopItem) -> Result<(), GameError> {
        self.begin_action()?;
        let player = &mut self.state.players[self.active_player_index];
        store::purchase(&self.state.catalog, player, item)?;
        let key = match item {
            ShopItem::Food(_) => LOG_SHOP_FOOD,
            ShopItem::Toy(_) => LOG_SHOP_TOY,
        };
        self.state.logs.push(String::from(key));
        Ok(())
    }

    /// Close the active player's turn: pay income, resolve every pet, bank the
    /// score and pass to the next player. Wrapping to the first player
    /// completes the day, or the game after the last day.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::GameOver`] once the game has ended.
    pub fn end_turn(&mut self) -> Result<TurnOutcome, GameError> {
        self.begin_action()?;
        Ok(resolve_turn(
            &mut self.state,
            &mut self.active_player_index,
            &mut self.rng,
        ))
    }

    /// [`GameSession::end_turn`] with an injected randomness source in place
    /// of the session stream, for callers that need to force outcomes.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::GameOver`] once the game has ended.
    pub fn end_turn_with<R: Rng + ?Sized>(
        &mut self,
        rng: &mut R,
    ) -> Result<TurnOutcome, GameError> {
        self.begin_action()?;
        Ok(resolve_turn(
            &mut self.state,
            &mut self.active_player_index,
            rng,
        ))
    }

    /// Draws taken from the turn stream so far.
    #[must_use]
    pub const fn rng_draws(&self) -> u64 {
        self.rng.draws()
    }
}

fn resolve_turn<R: Rng + ?Sized>(
    state: &mut SessionState,
    active_player_index: &mut usize,
    rng: &mut R,
) -> TurnOutcome {
    let income = state.income_per_turn;
    let player = &mut state.players[*active_player_index];
    player.change_money(income);
    let pet_reports = player.finish_turn(rng);
    let player_id = player.id;
    let score_delta = pet_reports.iter().map(|report| report.score_delta).sum();

    for report in &pet_reports {
        state
            .logs
            .extend(report.events.iter().map(|event| event.log_key().to_string()));
    }
    state.logs.push(String::from(LOG_TURN_END));
    log::debug!(
        "player {player_id} ended turn on day {}: income {income}, score {score_delta:+}",
        state.current_day
    );

    let next = (*active_player_index + 1) % state.players.len();
    *active_player_index = next;
    state.active_player = state.players[next].id;
    state.active_pet_index = 0;

    let transition = if next == 0 {
        complete_round(state)
    } else {
        TurnTransition::NextPlayer
    };
    TurnOutcome {
        player_id,
        income,
        pet_reports,
        score_delta,
        transition,
    }
}

fn complete_round(state: &mut SessionState) -> TurnTransition {
    let day = state.current_day;
    let standings = Standings::from_players(&state.players);
    let previous = std::mem::replace(&mut state.previous_round_scores, standings.clone());
    state.round_overview = Some(RoundOverview {
        day,
        standings,
        previous,
    });

    if day >= state.number_of_days {
        state.phase = SessionPhase::GameOver;
        state.logs.push(String::from(LOG_GAME_OVER));
        log::info!("game over after day {day}");
        TurnTransition::GameOver
    } else {
        state.current_day += 1;
        state.logs.push(String::from(LOG_ROUND_COMPLETE));
        log::info!("day {day} complete");
        TurnTransition::RoundComplete { day }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::mock::StepRng;

    fn session(players: &[&str], days: u32) -> GameSession {
        let setups: Vec<PlayerSetup> = players
            .iter()
            .map(|name| PlayerSetup::new(*name, vec![PetSetup::new("Tom", "Cat")]))
            .collect();
        let config = SessionConfig {
            number_of_days: days,
            ..SessionConfig::default()
        };
        GameSession::initialise(Catalog::load_from_static(), &setups, &config).unwrap()
    }

    #[test]
    fn fresh_session_starts_on_day_one() {
        let session = session(&["Alice", "Bob"], 3);
        let turn = session.turn_state();
        assert_eq!(turn.day, 1);
        assert_eq!(turn.active_player_index, 0);
        assert_eq!(turn.active_player_id, session.players()[0].id);
        assert!(!turn.round_over && !turn.game_over);
        assert_eq!(session.logs(), [String::from(LOG_SESSION_START)]);
    }

    #[test]
    fn select_pet_rejects_foreign_slots() {
        let mut session = session(&["Alice"], 1);
        assert_eq!(
            session.select_pet(1),
            Err(GameError::NoSuchPet { index: 1, owned: 1 })
        );
        session.select_pet(0).unwrap();
    }

    #[test]
    fn wrapping_turn_stores_round_overview() {
        let mut session = session(&["Alice", "Bob"], 3);
        let first = session.end_turn_with(&mut StepRng::new(u64::MAX, 0)).unwrap();
        assert_eq!(first.transition, TurnTransition::NextPlayer);
        assert!(session.round_overview().is_none());

        let second = session.end_turn_with(&mut StepRng::new(u64::MAX, 0)).unwrap();
        assert_eq!(second.transition, TurnTransition::RoundComplete { day: 1 });
        let overview = session.round_overview().unwrap();
        assert_eq!(overview.day, 1);
        assert_eq!(overview.previous.score_of(1), Some(0));
        assert_eq!(overview.standings.score_of(1), Some(first.score_delta));
        assert_eq!(session.current_day(), 2);
        assert_eq!(session.previous_round_scores(), &overview.standings.clone());

        session.sleep().unwrap();
        assert!(session.round_overview().is_none());
    }

    #[test]
    fn finished_game_rejects_every_action() {
        let mut session = session(&["Alice"], 1);
        let outcome = session.end_turn().unwrap();
        assert_eq!(outcome.transition, TurnTransition::GameOver);
        assert!(session.final_standings().is_some());
        assert_eq!(session.end_turn(), Err(GameError::GameOver));
        assert_eq!(session.sleep(), Err(GameError::GameOver));
        assert_eq!(session.buy_food("Kibble"), Err(GameError::GameOver));
        assert_eq!(session.select_pet(0), Err(GameError::GameOver));
        assert!(session.round_overview().is_some());
        session.dismiss_round_overview();
        assert!(session.turn_state().game_over);
    }
}
