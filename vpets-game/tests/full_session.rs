use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use vpets_game::{
    Catalog, GameSession, MAX_ACTION_POINTS, PetSetup, PlayerSetup, SessionConfig, SessionPhase,
    Standings, TurnTransition,
};

fn roster() -> Vec<PlayerSetup> {
    vec![
        PlayerSetup::new(
            "Alice",
            vec![
                PetSetup::new("Tom", "Cat").with_favourites(Some("Fish"), Some("Yarn")),
                PetSetup::new("Nib", "Hamster"),
            ],
        ),
        PlayerSetup::new("Bob", vec![PetSetup::new("Rex", "Dog")]),
        PlayerSetup::new(
            "Cleo",
            vec![
                PetSetup::new("Polly", "Parrot"),
                PetSetup::new("Shelly", "Turtle"),
                PetSetup::new("Flop", "Bunny"),
            ],
        ),
    ]
}

/// Plays a whole game with random but seeded choices and returns the
/// standings plus every turn transition.
fn play_game(seed: u64) -> (Standings, Vec<TurnTransition>) {
    let config = SessionConfig::default().with_seed(seed);
    let mut session = GameSession::initialise(Catalog::load_from_static(), &roster(), &config)
        .expect("valid roster");
    let mut chooser = SmallRng::seed_from_u64(seed ^ 0x5EED);
    let mut transitions = Vec::new();

    while !session.is_game_over() {
        let pets = session.active_player().pets().len();
        for pet_index in 0..pets {
            session.select_pet(pet_index).unwrap();
            for _ in 0..MAX_ACTION_POINTS {
                let _ = match chooser.gen_range(0..6) {
                    0 => session.buy_food("Kibble").and_then(|()| session.feed("Kibble")),
                    1 => session.sleep(),
                    2 => session.go_to_toilet(),
                    3 => session.discipline(),
                    4 => session.buy_toy("Ball").and_then(|()| {
                        let slot = session.active_player().toys().len() - 1;
                        session.play_with(slot).map(|_| ())
                    }),
                    _ => {
                        if session.active_pet().is_alive() {
                            session.cure()
                        } else {
                            session.revive()
                        }
                    }
                };
            }
        }
        let outcome = session.end_turn().unwrap();
        transitions.push(outcome.transition);
        assert_invariants(&session);
    }
    (session.final_standings().unwrap(), transitions)
}

fn assert_invariants(session: &GameSession) {
    for player in session.players() {
        assert!(!player.pets().is_empty() && player.pets().len() <= 3);
        for pet in player.pets() {
            assert!(pet.stats.in_bounds(), "{} out of bounds", pet.name);
            assert!(pet.action_points() <= MAX_ACTION_POINTS);
        }
        for toy in player.toys() {
            assert!(toy.remaining_uses > 0);
        }
    }
    let turn = session.turn_state();
    assert!((1..=turn.number_of_days).contains(&turn.day));
}

#[test]
fn same_seed_same_game() {
    let first = play_game(0xD15EA5E);
    let second = play_game(0xD15EA5E);
    assert_eq!(first, second);
}

#[test]
fn full_games_respect_invariants_across_seeds() {
    for seed in 0..12_u64 {
        let (standings, transitions) = play_game(seed);
        assert_eq!(standings.entries.len(), 3);
        // 10 days, 3 players
        assert_eq!(transitions.len(), 30);
        let completed = transitions
            .iter()
            .filter(|t| matches!(t, TurnTransition::RoundComplete { .. }))
            .count();
        assert_eq!(completed, 9);
        assert_eq!(transitions.last(), Some(&TurnTransition::GameOver));
    }
}

#[test]
fn money_never_goes_negative_through_the_session_api() {
    let config = SessionConfig {
        starting_money: 0,
        income_per_turn: 7,
        number_of_days: 3,
        seed: 99,
    };
    let mut session =
        GameSession::initialise(Catalog::load_from_static(), &roster(), &config).unwrap();
    while session.phase() == SessionPhase::InProgress {
        for name in ["Steak", "Kibble", "Seeds"] {
            let _ = session.buy_food(name);
        }
        let _ = session.buy_toy("Laser Pointer");
        let _ = session.cure();
        assert!(session.active_player().money >= 0);
        session.end_turn().unwrap();
    }
    assert!(session.players().iter().all(|player| player.money >= 0));
}
