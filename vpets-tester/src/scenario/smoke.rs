use anyhow::{Result, ensure};
use vpets_game::PetSetup;

use super::TestScenario;
use crate::logic::{CareStrategy, PlayerPlan, SimulationPlan, SimulationSummary};

const SMOKE_DAYS: u32 = 2;

fn smoke_expectation(summary: &SimulationSummary) -> Result<()> {
    ensure!(summary.game_over, "game should finish");
    ensure!(
        summary.turns.len() == SMOKE_DAYS as usize,
        "expected {SMOKE_DAYS} turns, played {}",
        summary.turns.len()
    );
    ensure!(summary.actions_applied > 0, "attentive owner never acted");
    ensure!(
        summary.final_standings.entries.len() == 1,
        "final standings should list the single player"
    );
    Ok(())
}

pub fn smoke_scenario() -> TestScenario {
    TestScenario::simulation(
        "Smoke Test",
        SimulationPlan::new()
            .with_player(PlayerPlan::new(
                "Solo",
                CareStrategy::Attentive,
                vec![PetSetup::new("Tom", "Cat")],
            ))
            .with_days(SMOKE_DAYS)
            .with_expectation(smoke_expectation),
    )
}
