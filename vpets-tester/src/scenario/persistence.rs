use anyhow::{Result, ensure};
use vpets_game::PetSetup;

use super::TestScenario;
use crate::logic::{CareStrategy, PlayerPlan, SimulationPlan, SimulationSummary};

fn checkpoint_expectation(summary: &SimulationSummary) -> Result<()> {
    let rounds = summary.rounds_completed();
    ensure!(rounds > 0 || summary.number_of_days == 1, "no round boundary was reached");
    ensure!(
        summary.checkpoints_verified == rounds,
        "verified {} checkpoints over {rounds} round boundaries",
        summary.checkpoints_verified
    );
    Ok(())
}

fn table() -> SimulationPlan {
    SimulationPlan::new()
        .with_player(PlayerPlan::new(
            "Ava",
            CareStrategy::Attentive,
            vec![PetSetup::new("Tom", "Cat"), PetSetup::new("Polly", "Parrot")],
        ))
        .with_player(PlayerPlan::new(
            "Ben",
            CareStrategy::Thrifty,
            vec![PetSetup::new("Rex", "Dog")],
        ))
        .with_player(PlayerPlan::new(
            "Cy",
            CareStrategy::Chaotic,
            vec![PetSetup::new("Nib", "Hamster"), PetSetup::new("Flop", "Bunny")],
        ))
}

pub fn save_resume_scenario() -> TestScenario {
    TestScenario::simulation(
        "Save and Resume Every Round",
        table()
            .with_round_checkpoints()
            .with_expectation(checkpoint_expectation),
    )
}

fn replay_expectation(summary: &SimulationSummary) -> Result<()> {
    ensure!(summary.game_over, "game should finish");
    ensure!(summary.rng_draws > 0, "turn resolution never drew randomness");
    Ok(())
}

pub fn deterministic_replay_scenario() -> TestScenario {
    TestScenario::simulation(
        "Deterministic Replay Verification",
        table().with_replay_check().with_expectation(replay_expectation),
    )
}
