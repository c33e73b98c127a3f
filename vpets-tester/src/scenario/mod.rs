use crate::logic::SimulationPlan;

pub mod full_game;
pub mod persistence;
pub mod smoke;

/// A named plan runnable by the logic tester.
#[derive(Debug, Clone)]
pub struct TestScenario {
    pub name: String,
    pub plan: SimulationPlan,
}

impl TestScenario {
    #[must_use]
    pub fn simulation(name: impl Into<String>, plan: SimulationPlan) -> Self {
        Self {
            name: name.into(),
            plan,
        }
    }
}

pub fn get_scenario(name: &str) -> Option<TestScenario> {
    let scenario = match name.to_lowercase().as_str() {
        "smoke" => smoke::smoke_scenario(),
        "full-game" | "full" => full_game::mixed_table_scenario(),
        "care-matters" | "care" => full_game::care_matters_scenario(),
        "neglect" => full_game::neglect_scenario(),
        "shop-budget" | "budget" => full_game::shop_budget_scenario(),
        "chaos" | "chaotic" => full_game::chaos_scenario(),
        "save-resume" | "checkpoint" => persistence::save_resume_scenario(),
        "deterministic" | "replay" => persistence::deterministic_replay_scenario(),
        _ => return None,
    };
    Some(scenario)
}

pub fn list_scenarios() -> Vec<(&'static str, &'static str)> {
    vec![
        ("smoke", "Smoke Test"),
        ("full-game", "Full Game - Mixed Table"),
        ("care-matters", "Attentive Care Beats Neglect"),
        ("neglect", "Neglect Consequences"),
        ("shop-budget", "Shop Budget Stress Test"),
        ("chaos", "Chaotic Input Robustness"),
        ("save-resume", "Save and Resume Every Round"),
        ("deterministic", "Deterministic Replay Verification"),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_listed_scenario_resolves() {
        for (key, description) in list_scenarios() {
            let scenario = get_scenario(key).unwrap_or_else(|| panic!("{key} missing"));
            assert_eq!(scenario.name, description);
            assert!(!scenario.plan.players.is_empty());
        }
    }

    #[test]
    fn aliases_and_case_are_accepted() {
        assert_eq!(get_scenario("FULL").unwrap().name, "Full Game - Mixed Table");
        assert_eq!(get_scenario("replay").unwrap().name, "Deterministic Replay Verification");
        assert!(get_scenario("nope").is_none());
    }
}
