use colored::Colorize;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

use super::simulation::{GameTester, SimulationPlan, SimulationSummary};
use crate::scenario::TestScenario;

/// Outcome of one scenario across all iterations of one seed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioResult {
    pub scenario_name: String,
    pub seed: u64,
    pub passed: bool,
    pub iterations_run: usize,
    pub successful_iterations: usize,
    pub failures: Vec<String>,
    #[serde(with = "duration_serde")]
    pub average_duration: Duration,
    #[serde(with = "duration_vec_serde")]
    pub performance_data: Vec<Duration>,
    pub runs: Vec<RunRecord>,
}

/// Flat per-iteration record, one CSV row each.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunRecord {
    pub scenario: String,
    pub seed: u64,
    pub iteration: usize,
    pub passed: bool,
    pub turns: usize,
    pub winner: String,
    pub top_score: i64,
    pub deaths: u32,
    pub illnesses: u32,
    pub actions_applied: usize,
    pub actions_rejected: usize,
    pub duration_ms: u64,
}

impl RunRecord {
    fn from_summary(
        scenario: &str,
        iteration: usize,
        summary: &SimulationSummary,
        passed: bool,
        duration: Duration,
    ) -> Self {
        Self {
            scenario: scenario.to_string(),
            seed: summary.seed,
            iteration,
            passed,
            turns: summary.turns.len(),
            winner: summary.winner().unwrap_or("-").to_string(),
            top_score: summary.top_score(),
            deaths: summary.total_deaths(),
            illnesses: summary.total_illnesses(),
            actions_applied: summary.actions_applied,
            actions_rejected: summary.actions_rejected,
            duration_ms: u64::try_from(duration.as_millis()).unwrap_or(u64::MAX),
        }
    }
}

pub struct LogicTester {
    tester: GameTester,
    verbose: bool,
}

impl LogicTester {
    #[must_use]
    pub const fn new(tester: GameTester, verbose: bool) -> Self {
        Self { tester, verbose }
    }

    pub fn run_scenario(
        &self,
        scenario: &TestScenario,
        seeds: &[u64],
        iterations: usize,
    ) -> Vec<ScenarioResult> {
        let mut results = Vec::new();

        for &seed in seeds {
            if self.verbose {
                println!(
                    "🧪 Testing scenario: {} (players: {} seed: {})",
                    scenario.name.bright_white(),
                    scenario.plan.players.len(),
                    seed
                );
            }

            results.push(self.run_single_scenario(scenario, seed, iterations));
        }

        results
    }

    fn run_single_scenario(
        &self,
        scenario: &TestScenario,
        seed: u64,
        iterations: usize,
    ) -> ScenarioResult {
        let mut successes = 0;
        let mut failures = Vec::new();
        let mut performance_data = Vec::new();
        let mut runs = Vec::new();

        for i in 0..iterations {
            let start_time = Instant::now();
            let iteration_seed = seed.wrapping_add(u64::try_from(i).unwrap_or(u64::MAX));

            let summary = match self.tester.run_plan(&scenario.plan, iteration_seed) {
                Ok(summary) => summary,
                Err(err) => {
                    failures.push(format!(
                        "Iteration {} (seed {iteration_seed}): could not run: {err:#}",
                        i + 1
                    ));
                    if self.verbose {
                        println!(
                            "  ❌ Iteration {}/{} aborted: {}",
                            i + 1,
                            iterations,
                            format!("{err:#}").red()
                        );
                    }
                    continue;
                }
            };
            let duration = start_time.elapsed();

            if let Some(err) = evaluate_expectations(&scenario.plan, &summary) {
                failures.push(format!(
                    "Iteration {} (seed {}, turns {}, winner {}): {} | {}",
                    i + 1,
                    summary.seed,
                    summary.turns.len(),
                    summary.winner().unwrap_or("-"),
                    err,
                    describe_players(&summary)
                ));
                if self.verbose {
                    println!(
                        "  ❌ Iteration {}/{} failed: {}",
                        i + 1,
                        iterations,
                        err.clone().red()
                    );
                    println!("     ↳ {}", describe_players(&summary));
                }
                runs.push(RunRecord::from_summary(&scenario.name, i, &summary, false, duration));
            } else {
                successes += 1;
                performance_data.push(duration);
                if self.verbose {
                    println!(
                        "  ✅ Iteration {}/{} passed ({duration:?}) turns:{} winner:{} top:{}",
                        i + 1,
                        iterations,
                        summary.turns.len(),
                        summary.winner().unwrap_or("-"),
                        summary.top_score()
                    );
                }
                runs.push(RunRecord::from_summary(&scenario.name, i, &summary, true, duration));
            }
        }

        let average_duration = if performance_data.is_empty() {
            Duration::ZERO
        } else {
            performance_data.iter().sum::<Duration>()
                / u32::try_from(performance_data.len()).unwrap_or(1)
        };

        ScenarioResult {
            scenario_name: scenario.name.clone(),
            seed,
            passed: failures.is_empty(),
            iterations_run: iterations,
            successful_iterations: successes,
            failures,
            average_duration,
            performance_data,
            runs,
        }
    }
}

/// Invariant violations fail a run before any scenario expectation is checked.
fn evaluate_expectations(plan: &SimulationPlan, summary: &SimulationSummary) -> Option<String> {
    if let Some(violation) = summary.invariant_violations.first() {
        return Some(format!(
            "{} invariant violation(s), first: {violation}",
            summary.invariant_violations.len()
        ));
    }
    plan.expectations
        .iter()
        .find_map(|expectation| expectation.evaluate(summary).err())
        .map(|err| err.to_string())
}

fn describe_players(summary: &SimulationSummary) -> String {
    summary
        .players
        .iter()
        .map(|player| {
            format!(
                "{} [{}] score {} money {} alive {} ill {} starved {} misbehaved {} died {}",
                player.name,
                player.strategy,
                player.score,
                player.money,
                player.pets_alive,
                player.illnesses,
                player.starvations,
                player.misbehaviours,
                player.deaths
            )
        })
        .collect::<Vec<_>>()
        .join(" | ")
}

mod duration_serde {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        duration.as_millis().serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let millis = u64::deserialize(deserializer)?;
        Ok(Duration::from_millis(millis))
    }
}

mod duration_vec_serde {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(durations: &[Duration], serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let millis: Vec<u128> = durations.iter().map(Duration::as_millis).collect();
        millis.serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Vec<Duration>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let millis = Vec::<u64>::deserialize(deserializer)?;
        Ok(millis.into_iter().map(Duration::from_millis).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scenario::get_scenario;
    use crate::storage::{AssetLoader, FileStorage};
    use std::sync::Arc;
    use vpets_game::{GameEngine, SessionConfig};

    fn logic_tester() -> LogicTester {
        let dir = std::env::temp_dir().join(format!("vpets-logic-{}", std::process::id()));
        let engine = GameEngine::new(AssetLoader::default(), FileStorage::new(dir)).unwrap();
        LogicTester::new(
            GameTester::new(Arc::new(engine), SessionConfig::default(), false),
            false,
        )
    }

    #[test]
    fn smoke_scenario_passes_for_each_seed() {
        let scenario = get_scenario("smoke").unwrap();
        let results = logic_tester().run_scenario(&scenario, &[1, 2], 2);
        assert_eq!(results.len(), 2);
        for result in &results {
            assert!(result.passed, "{:?}", result.failures);
            assert_eq!(result.successful_iterations, 2);
            assert_eq!(result.runs.len(), 2);
            assert_eq!(result.performance_data.len(), 2);
        }
        assert_eq!(results[1].runs[1].seed, 3);
    }

    #[test]
    fn failing_expectation_is_reported() {
        let mut scenario = get_scenario("smoke").unwrap();
        scenario.plan = scenario
            .plan
            .with_expectation(|_: &SimulationSummary| -> anyhow::Result<()> {
                anyhow::bail!("always fails")
            });
        let results = logic_tester().run_scenario(&scenario, &[9], 1);
        assert!(!results[0].passed);
        assert!(results[0].failures[0].contains("always fails"));
        assert!(!results[0].runs[0].passed);
        assert_eq!(results[0].average_duration, Duration::ZERO);
    }

    #[test]
    fn results_serialize_durations_as_millis() {
        let result = ScenarioResult {
            scenario_name: String::from("x"),
            seed: 1,
            passed: true,
            iterations_run: 1,
            successful_iterations: 1,
            failures: Vec::new(),
            average_duration: Duration::from_millis(12),
            performance_data: vec![Duration::from_millis(12)],
            runs: Vec::new(),
        };
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["average_duration"], 12);
        assert_eq!(json["performance_data"][0], 12);
        let back: ScenarioResult = serde_json::from_value(json).unwrap();
        assert_eq!(back.average_duration, result.average_duration);
    }
}
