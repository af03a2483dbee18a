//! Whole games played by the random moderator, from a setup file to a verdict.

use std::io::Write;

use rand::rngs::StdRng;
use rand::SeedableRng;

use grimoire_engine::engine::arena::{play_seeded, run_arena};
use grimoire_engine::engine::config::load_setup;
use grimoire_engine::engine::moderator::RandomModerator;
use grimoire_engine::engine::simulator::{play_game, MAX_STEPS};
use grimoire_engine::grimoire::roles::Category;
use grimoire_engine::grimoire::{assign_roles, create_initial_state, GameStatus, RolePools};

#[test]
fn role_counts_hold_for_every_table_size() {
    for players in 5..=15 {
        for seed in 0..5 {
            let mut rng = StdRng::seed_from_u64(seed);
            let roster = create_initial_state(players, &[], &mut rng);
            let dealt = assign_roles(&roster, &RolePools::default(), &mut rng).unwrap().state;

            let count = |category| {
                dealt
                    .players
                    .iter()
                    .filter(|p| p.true_category() == Some(category))
                    .count()
            };
            assert_eq!(count(Category::Werewolf), 1, "{players} players, seed {seed}");
            assert_eq!(count(Category::Minion) > 0, players >= 6, "{players} players, seed {seed}");
            assert!(count(Category::Villager) > 0);
            assert!(count(Category::Outsider) > 0);
            assert!(dealt.players.iter().all(|p| p.role.is_some() && p.true_role.is_some()));
            assert_eq!(dealt.status, GameStatus::Playing);
        }
    }
}

#[test]
fn games_from_a_setup_file_finish() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(
        file,
        r#"
[table]
players = 8
seed = 77

[pools]
villagers = ["Seer", "Doctor", "Soldier", "Mayor", "Farmer", "Hunter", "Gambler", "Undertaker"]
outsiders = ["Saint", "Butler", "Drunk", "Fool"]
werewolves = ["Werewolf", "Alpha Wolf"]
minions = ["Poisoner", "Scarlet Woman", "Puppet"]
"#
    )
    .unwrap();

    let setup = load_setup(file.path()).unwrap();
    let moderator = RandomModerator::default();
    let result = run_arena(&setup, &moderator, 24, setup.table.seed.unwrap_or(0)).unwrap();

    assert_eq!(result.num_games, 24);
    assert_eq!(result.draws, 0, "{}", result.summary());
    assert_eq!(result.wins.values().sum::<usize>(), 24);
}

#[test]
fn a_seeded_game_replays_exactly() {
    let setup = Default::default();
    let moderator = RandomModerator::default();
    let a = play_seeded(&setup, &moderator, 1234).unwrap();
    let b = play_seeded(&setup, &moderator, 1234).unwrap();
    assert_eq!(a.log, b.log);
    assert_eq!(a.winner, b.winner);
    assert!(!a.log.is_empty());
}

#[test]
fn large_tables_play_out() {
    let moderator = RandomModerator::default();
    for seed in 0..5 {
        let mut rng = StdRng::seed_from_u64(seed);
        let roster = create_initial_state(15, &[], &mut rng);
        let sim = play_game(&roster, &RolePools::default(), &moderator, &mut rng, MAX_STEPS).unwrap();
        assert!(sim.is_over(), "seed {seed} stalled on day {}", sim.state.day);
        assert!(sim.events > 0);
    }
}
