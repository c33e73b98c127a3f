use anyhow::{Context, Result, ensure};
use vpets_game::{PetSetup, SessionConfig};

use super::TestScenario;
use crate::logic::{CareStrategy, PlayerPlan, SimulationPlan, SimulationSummary};

/// Long enough for neglect to starve every bundled species.
const LONG_GAME_DAYS: u32 = 10;

fn full_length_expectation(summary: &SimulationSummary) -> Result<()> {
    ensure!(summary.game_over, "game should finish");
    let days = summary.number_of_days as usize;
    let expected_turns = days * summary.players.len();
    ensure!(
        summary.turns.len() == expected_turns,
        "expected {expected_turns} turns, played {}",
        summary.turns.len()
    );
    ensure!(
        summary.rounds_completed() == days.saturating_sub(1),
        "expected {} round boundaries before the final one, saw {}",
        days.saturating_sub(1),
        summary.rounds_completed()
    );
    ensure!(
        summary.final_standings.entries.len() == summary.players.len(),
        "final standings should list every player"
    );
    Ok(())
}

fn routine_owners_are_never_refused(summary: &SimulationSummary) -> Result<()> {
    ensure!(
        summary.actions_rejected == 0,
        "{} care actions were refused",
        summary.actions_rejected
    );
    Ok(())
}

pub fn mixed_table_scenario() -> TestScenario {
    TestScenario::simulation(
        "Full Game - Mixed Table",
        SimulationPlan::new()
            .with_player(PlayerPlan::new(
                "Ava",
                CareStrategy::Attentive,
                vec![
                    PetSetup::new("Tom", "Cat").with_favourites(Some("Fish"), Some("Yarn")),
                    PetSetup::new("Nib", "Hamster"),
                ],
            ))
            .with_player(PlayerPlan::new(
                "Ben",
                CareStrategy::Thrifty,
                vec![PetSetup::new("Rex", "Dog"), PetSetup::new("Flop", "Bunny")],
            ))
            .with_player(PlayerPlan::new(
                "Cas",
                CareStrategy::Neglectful,
                vec![PetSetup::new("Shelly", "Turtle")],
            ))
            .with_player(PlayerPlan::new(
                "Dee",
                CareStrategy::Chaotic,
                vec![
                    PetSetup::new("Polly", "Parrot"),
                    PetSetup::new("Mo", "Cat"),
                    PetSetup::new("Bo", "Dog"),
                ],
            ))
            .with_expectation(full_length_expectation),
    )
}

fn care_beats_neglect(summary: &SimulationSummary) -> Result<()> {
    let carer = summary.player("Carer").context("missing attentive player")?;
    let absent = summary.player("Absent").context("missing neglectful player")?;
    ensure!(
        carer.score > absent.score,
        "attentive score {} should beat neglected score {}",
        carer.score,
        absent.score
    );
    ensure!(
        carer.pets_alive >= absent.pets_alive,
        "attentive owner lost more pets ({} alive vs {})",
        carer.pets_alive,
        absent.pets_alive
    );
    Ok(())
}

fn cat_and_dog(owner: &str) -> Vec<PetSetup> {
    vec![
        PetSetup::new(format!("{owner}'s cat"), "Cat"),
        PetSetup::new(format!("{owner}'s dog"), "Dog"),
    ]
}

pub fn care_matters_scenario() -> TestScenario {
    TestScenario::simulation(
        "Attentive Care Beats Neglect",
        SimulationPlan::new()
            .with_player(PlayerPlan::new("Carer", CareStrategy::Attentive, cat_and_dog("Carer")))
            .with_player(PlayerPlan::new("Absent", CareStrategy::Neglectful, cat_and_dog("Absent")))
            .with_days(LONG_GAME_DAYS)
            .with_expectation(care_beats_neglect),
    )
}

fn neglect_expectation(summary: &SimulationSummary) -> Result<()> {
    let player = summary.players.first().context("no players")?;
    ensure!(
        summary.actions_applied + summary.actions_rejected == 0,
        "neglectful owner should never act"
    );
    let expected = summary.starting_money + summary.income_per_turn * i64::from(summary.number_of_days);
    ensure!(
        player.money == expected,
        "untouched wallet should hold {expected}, holds {}",
        player.money
    );
    ensure!(player.starvations > 0, "unfed pets should starve");
    ensure!(player.illnesses > 0, "starving pets should fall ill");
    Ok(())
}

pub fn neglect_scenario() -> TestScenario {
    TestScenario::simulation(
        "Neglect Consequences",
        SimulationPlan::new()
            .with_player(PlayerPlan::new("Absent", CareStrategy::Neglectful, cat_and_dog("Absent")))
            .with_days(LONG_GAME_DAYS)
            .with_expectation(neglect_expectation),
    )
}

fn tight_budget(config: &mut SessionConfig) {
    config.starting_money = 0;
    config.income_per_turn = 5;
}

fn budget_expectation(summary: &SimulationSummary) -> Result<()> {
    for player in &summary.players {
        let spent = player.spent(summary.starting_money);
        ensure!(
            spent <= player.income,
            "{} spent {spent} from an income of {}",
            player.name,
            player.income
        );
    }
    Ok(())
}

pub fn shop_budget_scenario() -> TestScenario {
    TestScenario::simulation(
        "Shop Budget Stress Test",
        SimulationPlan::new()
            .with_player(PlayerPlan::new("Ava", CareStrategy::Attentive, cat_and_dog("Ava")))
            .with_player(PlayerPlan::new("Ben", CareStrategy::Thrifty, cat_and_dog("Ben")))
            .with_setup(tight_budget)
            .with_expectation(budget_expectation)
            .with_expectation(routine_owners_are_never_refused),
    )
}

pub fn chaos_scenario() -> TestScenario {
    TestScenario::simulation(
        "Chaotic Input Robustness",
        SimulationPlan::new()
            .with_player(PlayerPlan::new(
                "Ann",
                CareStrategy::Chaotic,
                vec![PetSetup::new("Tom", "Cat"), PetSetup::new("Nib", "Hamster")],
            ))
            .with_player(PlayerPlan::new(
                "Bob",
                CareStrategy::Chaotic,
                vec![PetSetup::new("Rex", "Dog")],
            ))
            .with_player(PlayerPlan::new(
                "Cy",
                CareStrategy::Chaotic,
                vec![
                    PetSetup::new("Polly", "Parrot"),
                    PetSetup::new("Shelly", "Turtle"),
                    PetSetup::new("Flop", "Bunny"),
                ],
            ))
            .with_expectation(full_length_expectation),
    )
}
