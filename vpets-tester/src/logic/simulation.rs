use std::fmt;
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use colored::Colorize;
use vpets_game::{
    GameEngine, GameSession, MAX_ACTION_POINTS, MAX_PETS_PER_PLAYER, PetEvent, PetSetup,
    PlayerSetup, SessionConfig, SessionSnapshot, Standings, TurnOutcome, TurnTransition,
};

use super::policy::{CarePolicy, CareStrategy};
use crate::storage::{AssetLoader, FileStorage};

pub type TesterEngine = GameEngine<AssetLoader, FileStorage>;

/// Actions a policy may attempt in one turn before the turn is forced to end.
pub const MAX_ACTIONS_PER_TURN: usize = 24;

/// One seat at the table.
#[derive(Debug, Clone)]
pub struct PlayerPlan {
    pub name: String,
    pub strategy: CareStrategy,
    pub pets: Vec<PetSetup>,
}

impl PlayerPlan {
    #[must_use]
    pub fn new(name: impl Into<String>, strategy: CareStrategy, pets: Vec<PetSetup>) -> Self {
        Self {
            name: name.into(),
            strategy,
            pets,
        }
    }
}

/// Everything needed to play one automated game.
#[derive(Debug, Clone, Default)]
pub struct SimulationPlan {
    pub players: Vec<PlayerPlan>,
    pub days: Option<u32>,
    pub setup: Option<fn(&mut SessionConfig)>,
    /// Save and reload through storage at every round boundary.
    pub round_checkpoints: bool,
    /// Play the game twice and require identical final snapshots.
    pub replay_check: bool,
    pub expectations: Vec<SimulationExpectation>,
}

impl SimulationPlan {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_player(mut self, player: PlayerPlan) -> Self {
        self.players.push(player);
        self
    }

    #[must_use]
    pub const fn with_days(mut self, days: u32) -> Self {
        self.days = Some(days);
        self
    }

    #[must_use]
    pub fn with_setup(mut self, setup: fn(&mut SessionConfig)) -> Self {
        self.setup = Some(setup);
        self
    }

    #[must_use]
    pub const fn with_round_checkpoints(mut self) -> Self {
        self.round_checkpoints = true;
        self
    }

    #[must_use]
    pub const fn with_replay_check(mut self) -> Self {
        self.replay_check = true;
        self
    }

    #[must_use]
    pub fn with_expectation(mut self, expectation: impl Into<SimulationExpectation>) -> Self {
        self.expectations.push(expectation.into());
        self
    }

    fn setups(&self) -> Vec<PlayerSetup> {
        self.players
            .iter()
            .map(|player| PlayerSetup::new(player.name.clone(), player.pets.clone()))
            .collect()
    }
}

/// Assertion hook run after a simulation completes.
type SimulationExpectationFn =
    Arc<dyn Fn(&SimulationSummary) -> Result<()> + Send + Sync + 'static>;

#[derive(Clone)]
pub struct SimulationExpectation(SimulationExpectationFn);

impl fmt::Debug for SimulationExpectation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SimulationExpectation").finish()
    }
}

impl SimulationExpectation {
    /// # Errors
    ///
    /// Returns the expectation's failure message.
    pub fn evaluate(&self, summary: &SimulationSummary) -> Result<()> {
        (self.0)(summary)
    }
}

impl<F> From<F> for SimulationExpectation
where
    F: Fn(&SimulationSummary) -> Result<()> + Send + Sync + 'static,
{
    fn from(f: F) -> Self {
        Self(Arc::new(f))
    }
}

/// Per-player tallies over a whole game.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlayerSummary {
    pub player_id: u32,
    pub name: String,
    pub strategy: String,
    pub score: i64,
    pub money: i64,
    pub income: i64,
    pub pets_alive: usize,
    pub illnesses: u32,
    pub starvations: u32,
    pub deaths: u32,
    pub misbehaviours: u32,
}

impl PlayerSummary {
    /// Money that left the wallet through the shop and the vet.
    #[must_use]
    pub const fn spent(&self, starting_money: i64) -> i64 {
        starting_money + self.income - self.money
    }
}

/// Complete record of a simulation run.
#[derive(Debug, Clone)]
pub struct SimulationSummary {
    pub seed: u64,
    pub number_of_days: u32,
    pub starting_money: i64,
    pub income_per_turn: i64,
    pub turns: Vec<TurnOutcome>,
    pub players: Vec<PlayerSummary>,
    pub final_standings: Standings,
    pub actions_applied: usize,
    pub actions_rejected: usize,
    pub checkpoints_verified: usize,
    pub invariant_violations: Vec<String>,
    pub rng_draws: u64,
    pub game_over: bool,
}

impl SimulationSummary {
    #[must_use]
    pub fn player(&self, name: &str) -> Option<&PlayerSummary> {
        self.players.iter().find(|player| player.name == name)
    }

    #[must_use]
    pub fn rounds_completed(&self) -> usize {
        self.turns
            .iter()
            .filter(|turn| matches!(turn.transition, TurnTransition::RoundComplete { .. }))
            .count()
    }

    #[must_use]
    pub fn winner(&self) -> Option<&str> {
        self.final_standings
            .winners()
            .first()
            .map(|entry| entry.name.as_str())
    }

    #[must_use]
    pub fn top_score(&self) -> i64 {
        self.final_standings
            .entries
            .iter()
            .map(|entry| entry.score)
            .max()
            .unwrap_or(0)
    }

    #[must_use]
    pub fn total_deaths(&self) -> u32 {
        self.players.iter().map(|player| player.deaths).sum()
    }

    #[must_use]
    pub fn total_illnesses(&self) -> u32 {
        self.players.iter().map(|player| player.illnesses).sum()
    }
}

/// Plays [`SimulationPlan`]s against a shared engine.
#[derive(Clone)]
pub struct GameTester {
    engine: Arc<TesterEngine>,
    base_config: SessionConfig,
    verbose: bool,
}

impl GameTester {
    #[must_use]
    pub const fn new(engine: Arc<TesterEngine>, base_config: SessionConfig, verbose: bool) -> Self {
        Self {
            engine,
            base_config,
            verbose,
        }
    }

    fn config_for(&self, plan: &SimulationPlan, seed: u64) -> SessionConfig {
        let mut config = self.base_config.clone().with_seed(seed);
        if let Some(days) = plan.days {
            config.number_of_days = days;
        }
        if let Some(setup) = plan.setup {
            setup(&mut config);
        }
        config
    }

    /// Play `plan` to the end with `seed`.
    ///
    /// # Errors
    ///
    /// Returns an error if the plan cannot start a session or a checkpoint
    /// cannot be written or read back.
    pub fn run_plan(&self, plan: &SimulationPlan, seed: u64) -> Result<SimulationSummary> {
        let (mut summary, snapshot) = self.play(plan, seed)?;
        if plan.replay_check {
            let (_, replayed) = self.play(plan, seed)?;
            if replayed != snapshot {
                summary
                    .invariant_violations
                    .push(format!("replay of seed {seed} diverged"));
            }
        }
        Ok(summary)
    }

    fn play(&self, plan: &SimulationPlan, seed: u64) -> Result<(SimulationSummary, SessionSnapshot)> {
        let config = self.config_for(plan, seed);
        let mut session = self
            .engine
            .new_session(&plan.setups(), &config)
            .context("plan does not describe a valid game")?;
        let mut policies: Vec<Box<dyn CarePolicy + Send>> = plan
            .players
            .iter()
            .zip(0_u64..)
            .map(|(player, offset)| player.strategy.create_policy(seed.wrapping_add(offset)))
            .collect();

        let mut summary = SimulationSummary {
            seed,
            number_of_days: config.number_of_days,
            starting_money: config.starting_money,
            income_per_turn: config.income_per_turn,
            turns: Vec::new(),
            players: session
                .players()
                .iter()
                .zip(&plan.players)
                .map(|(player, seat)| PlayerSummary {
                    player_id: player.id,
                    name: player.name.clone(),
                    strategy: seat.strategy.label().to_string(),
                    ..PlayerSummary::default()
                })
                .collect(),
            final_standings: Standings::default(),
            actions_applied: 0,
            actions_rejected: 0,
            checkpoints_verified: 0,
            invariant_violations: Vec::new(),
            rng_draws: 0,
            game_over: false,
        };
        let slot = format!("checkpoint-{seed:016x}");

        while !session.is_game_over() {
            let seat = session.turn_state().active_player_index;
            let policy = policies
                .get_mut(seat)
                .context("session seated more players than the plan")?;
            play_turn(&mut session, policy.as_mut(), &mut summary);

            let outcome = session.end_turn()?;
            if outcome.player_id != summary.players[seat].player_id {
                summary.invariant_violations.push(format!(
                    "turn ended for player {} while seat {seat} was active",
                    outcome.player_id
                ));
            }
            tally(&mut summary.players[seat], &outcome);
            check_invariants(&session, &mut summary.invariant_violations);

            if self.verbose {
                println!(
                    "     ↳ day {} {} {:+} points {:?}",
                    session.current_day(),
                    summary.players[seat].name.bright_white(),
                    outcome.score_delta,
                    outcome.transition
                );
            }

            let round_complete = matches!(outcome.transition, TurnTransition::RoundComplete { .. });
            summary.turns.push(outcome);

            if plan.round_checkpoints && round_complete {
                session = self.checkpoint(&slot, &session, &mut summary)?;
            }
        }
        if plan.round_checkpoints {
            self.engine.delete_session(&slot)?;
        }

        for (entry, player) in summary.players.iter_mut().zip(session.players()) {
            entry.score = player.score;
            entry.money = player.money;
            entry.pets_alive = player.pets().iter().filter(|pet| pet.is_alive()).count();
        }
        summary.final_standings = session
            .final_standings()
            .context("game ended without final standings")?;
        summary.rng_draws = session.rng_draws();
        summary.game_over = session.is_game_over();
        Ok((summary, session.capture_snapshot()))
    }

    fn checkpoint(
        &self,
        slot: &str,
        session: &GameSession,
        summary: &mut SimulationSummary,
    ) -> Result<GameSession> {
        self.engine.save_session(slot, session)?;
        let Some(restored) = self.engine.load_session(slot)? else {
            bail!("checkpoint {slot} vanished after saving");
        };
        if restored.capture_snapshot() == session.capture_snapshot() {
            summary.checkpoints_verified += 1;
        } else {
            summary.invariant_violations.push(format!(
                "checkpoint on day {} did not restore the same session",
                session.current_day()
            ));
        }
        Ok(restored)
    }
}

fn play_turn(session: &mut GameSession, policy: &mut dyn CarePolicy, summary: &mut SimulationSummary) {
    policy.begin_turn();
    for _ in 0..MAX_ACTIONS_PER_TURN {
        let Some(action) = policy.next_action(session) else {
            return;
        };
        match action.apply(session) {
            Ok(()) => summary.actions_applied += 1,
            Err(err) => {
                log::debug!("{} policy: {action} refused: {err}", policy.name());
                summary.actions_rejected += 1;
            }
        }
        check_invariants(session, &mut summary.invariant_violations);
    }
    log::debug!("{} policy hit the action limit", policy.name());
}

fn tally(player: &mut PlayerSummary, outcome: &TurnOutcome) {
    player.income += outcome.income;
    for event in outcome.pet_reports.iter().flat_map(|report| &report.events) {
        let counter = match event {
            PetEvent::Starving => &mut player.starvations,
            PetEvent::FellIll => &mut player.illnesses,
            PetEvent::Died => &mut player.deaths,
            PetEvent::StartedMisbehaving => &mut player.misbehaviours,
        };
        *counter += 1;
    }
}

fn check_invariants(session: &GameSession, violations: &mut Vec<String>) {
    for player in session.players() {
        if player.money < 0 {
            violations.push(format!("{} has negative money {}", player.name, player.money));
        }
        if player.pets().is_empty() || player.pets().len() > MAX_PETS_PER_PLAYER {
            violations.push(format!("{} owns {} pets", player.name, player.pets().len()));
        }
        for pet in player.pets() {
            if !pet.stats.in_bounds() {
                violations.push(format!("{} has out-of-range stats {:?}", pet.name, pet.stats));
            }
            if pet.action_points() > MAX_ACTION_POINTS {
                violations.push(format!("{} has {} action points", pet.name, pet.action_points()));
            }
        }
        if player.toys().iter().any(|toy| toy.remaining_uses == 0) {
            violations.push(format!("{} kept a worn-out toy", player.name));
        }
    }
    let turn = session.turn_state();
    if !(1..=turn.number_of_days).contains(&turn.day) {
        violations.push(format!("day {} outside 1..={}", turn.day, turn.number_of_days));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tester() -> GameTester {
        let dir = std::env::temp_dir().join(format!("vpets-sim-{}", std::process::id()));
        let engine = GameEngine::new(AssetLoader::default(), FileStorage::new(dir)).unwrap();
        GameTester::new(Arc::new(engine), SessionConfig::default(), false)
    }

    fn table(strategies: &[CareStrategy]) -> SimulationPlan {
        strategies
            .iter()
            .enumerate()
            .fold(SimulationPlan::new(), |plan, (i, strategy)| {
                plan.with_player(PlayerPlan::new(
                    format!("P{i}"),
                    *strategy,
                    vec![PetSetup::new(format!("Pet{i}"), "Cat")],
                ))
            })
    }

    #[test]
    fn plays_every_turn_of_every_day() {
        let plan = table(&[CareStrategy::Attentive, CareStrategy::Thrifty]).with_days(4);
        let summary = tester().run_plan(&plan, 3).unwrap();
        assert!(summary.game_over);
        assert_eq!(summary.turns.len(), 8);
        assert_eq!(summary.rounds_completed(), 3);
        assert!(summary.invariant_violations.is_empty(), "{:?}", summary.invariant_violations);
        assert_eq!(summary.final_standings.entries.len(), 2);
    }

    #[test]
    fn neglect_spends_nothing() {
        let plan = table(&[CareStrategy::Neglectful]).with_days(3);
        let summary = tester().run_plan(&plan, 8).unwrap();
        let player = &summary.players[0];
        assert_eq!(summary.actions_applied + summary.actions_rejected, 0);
        assert_eq!(player.income, 3 * summary.income_per_turn);
        assert_eq!(player.spent(summary.starting_money), 0);
    }

    #[test]
    fn setup_hook_adjusts_the_config() {
        let plan = table(&[CareStrategy::Attentive])
            .with_days(2)
            .with_setup(|config| config.starting_money = 0);
        let summary = tester().run_plan(&plan, 1).unwrap();
        assert_eq!(summary.starting_money, 0);
        assert!(summary.players[0].money >= 0);
    }

    #[test]
    fn checkpoints_round_trip_each_round() {
        let plan = table(&[CareStrategy::Attentive, CareStrategy::Chaotic])
            .with_days(3)
            .with_round_checkpoints();
        let summary = tester().run_plan(&plan, 21).unwrap();
        assert_eq!(summary.checkpoints_verified, 2);
        assert!(summary.invariant_violations.is_empty(), "{:?}", summary.invariant_violations);
    }

    #[test]
    fn replays_agree() {
        let plan = table(&[CareStrategy::Chaotic, CareStrategy::Attentive])
            .with_days(3)
            .with_replay_check();
        let summary = tester().run_plan(&plan, 77).unwrap();
        assert!(summary.invariant_violations.is_empty(), "{:?}", summary.invariant_violations);
    }

    #[test]
    fn invalid_plan_is_an_error() {
        let plan = SimulationPlan::new().with_days(2);
        assert!(tester().run_plan(&plan, 1).is_err());
    }

    #[test]
    fn expectations_see_the_summary() {
        let expectation: SimulationExpectation = (|summary: &SimulationSummary| {
            anyhow::ensure!(summary.seed == 5, "wrong seed");
            Ok(())
        })
        .into();
        let plan = table(&[CareStrategy::Neglectful]).with_days(1);
        let summary = tester().run_plan(&plan, 5).unwrap();
        assert!(expectation.evaluate(&summary).is_ok());
    }
}
