//! End-to-end table scenarios driven only through the public operations.

use rand::rngs::StdRng;
use rand::SeedableRng;

use grimoire_engine::engine::models::{Answer, PromptKind, Winner};
use grimoire_engine::grimoire::roles::find_role;
use grimoire_engine::grimoire::types::RoleInstance;
use grimoire_engine::grimoire::{
    advance_time, enact_vote, handle_action, player_view, resolve_decision, turn_order,
    GameState, GameStatus, Nominee, Time, Transition,
};

fn rng() -> StdRng {
    StdRng::seed_from_u64(2024)
}

/// A dealt table sitting in the first vote, so one advance reaches night 2.
fn table(roles: &[&str]) -> GameState {
    let names: Vec<String> = (0..roles.len()).map(|i| format!("p{i}")).collect();
    let mut state = GameState::new(&names);
    for (player, role) in state.players.iter_mut().zip(roles) {
        player.set_role(find_role(role).unwrap());
    }
    state.status = GameStatus::Playing;
    state.time = Time::Vote;
    state.day = 1;
    state.turn_order = turn_order(&state);
    state
}

fn advance(state: &GameState, rng: &mut StdRng) -> Transition {
    advance_time(state, rng)
}

/// Step the night until `seat` is the one acting.
fn until_turn_of(mut state: GameState, seat: usize, rng: &mut StdRng) -> GameState {
    for _ in 0..state.players.len() + 1 {
        if state.time == Time::Night && state.current_player == Some(seat) {
            return state;
        }
        state = advance(&state, rng).state;
    }
    panic!("seat {seat} never got a turn");
}

/// Step until the night is over and dawn has been resolved.
fn until_dawn(mut state: GameState, rng: &mut StdRng) -> Transition {
    for _ in 0..state.players.len() + 1 {
        let t = advance(&state, rng);
        if t.state.time == Time::Day || t.state.status != GameStatus::Playing {
            return t;
        }
        state = t.state;
    }
    panic!("the night never ended");
}

#[test]
fn soldier_shrugs_off_the_werewolf() {
    let mut rng = rng();
    let state = advance(&table(&["Werewolf", "Soldier", "Seer", "Saint", "Hermit"]), &mut rng).state;
    assert_eq!(state.day, 2);
    assert_eq!(state.time, Time::Night);

    let state = until_turn_of(state, 0, &mut rng);
    let state = handle_action(&state, 0, 1, &mut rng).state;
    let dawn = until_dawn(state, &mut rng);

    assert!(dawn.state.players[1].alive);
    let report = dawn.state.last_dawn.unwrap();
    assert!(!report.murder);
    assert_eq!(report.reason.tag(), "soldier");
    assert_eq!(dawn.state.status, GameStatus::Playing);
    assert!(dawn.outcome.is_none());
}

#[test]
fn doctor_protection_blocks_the_kill() {
    let mut rng = rng();
    let state = advance(&table(&["Werewolf", "Doctor", "Seer", "Saint", "Hermit"]), &mut rng).state;

    let state = until_turn_of(state, 1, &mut rng);
    let state = handle_action(&state, 1, 2, &mut rng).state;
    let state = until_turn_of(state, 0, &mut rng);
    let state = handle_action(&state, 0, 2, &mut rng).state;
    let dawn = until_dawn(state, &mut rng);

    assert!(dawn.state.players[2].alive);
    assert_eq!(dawn.state.last_dawn.unwrap().reason.tag(), "protected");
}

#[test]
fn poisoned_doctor_protects_nobody() {
    let mut rng = rng();
    let roles = ["Werewolf", "Poisoner", "Doctor", "Seer", "Saint", "Hermit"];
    let state = advance(&table(&roles), &mut rng).state;

    let state = until_turn_of(state, 1, &mut rng);
    let state = handle_action(&state, 1, 2, &mut rng).state;
    let state = until_turn_of(state, 2, &mut rng);
    let state = handle_action(&state, 2, 3, &mut rng).state;
    let state = until_turn_of(state, 0, &mut rng);
    let state = handle_action(&state, 0, 3, &mut rng).state;
    let dawn = until_dawn(state, &mut rng);

    assert!(!dawn.state.players[3].alive);
    let report = dawn.state.last_dawn.unwrap();
    assert!(report.murder);
    assert_eq!(report.reason.tag(), "");
}

#[test]
fn mayor_redirect_waits_for_the_moderator() {
    let mut rng = rng();
    let state = advance(&table(&["Werewolf", "Mayor", "Seer", "Saint", "Hermit"]), &mut rng).state;
    let state = until_turn_of(state, 0, &mut rng);
    let state = handle_action(&state, 0, 1, &mut rng).state;
    let dawn = until_dawn(state, &mut rng);

    assert_eq!(dawn.state.status, GameStatus::Special);
    let prompt = dawn.prompt.expect("the Mayor's redirect needs a prompt");
    assert_eq!(prompt.kind, PromptKind::Select);
    assert!(prompt.select_options.contains(&"p4".to_string()));

    // Nothing else moves while the decision is pending.
    let stalled = advance(&dawn.state, &mut rng);
    assert_eq!(stalled.state.status, GameStatus::Special);

    let resolved = resolve_decision(&dawn.state, Some(Answer::Text("p4".into())), &mut rng);
    assert_eq!(resolved.state.status, GameStatus::Playing);
    assert_eq!(resolved.state.time, Time::Day);
    assert!(resolved.state.players[1].alive);
    assert!(!resolved.state.players[4].alive);
}

#[test]
fn tea_lady_next_to_the_recluse_waits_for_a_ruling() {
    let mut rng = rng();
    let roles = ["Werewolf", "Seer", "Tea Lady", "Recluse", "Hermit"];
    let state = advance(&table(&roles), &mut rng).state;
    let state = until_turn_of(state, 0, &mut rng);
    let state = handle_action(&state, 0, 1, &mut rng).state;
    let dawn = until_dawn(state, &mut rng);

    assert_eq!(dawn.state.status, GameStatus::Special);
    assert!(dawn.state.players[1].alive);
    let prompt = dawn.prompt.expect("the Recluse's alignment needs a ruling");
    assert_eq!(prompt.kind, PromptKind::Bool);

    let evil = resolve_decision(&dawn.state, Some(Answer::Bool(true)), &mut rng);
    assert_eq!(evil.state.time, Time::Day);
    assert!(!evil.state.players[1].alive);

    let good = resolve_decision(&dawn.state, Some(Answer::Bool(false)), &mut rng);
    assert!(good.state.players[1].alive);
    assert!(!good.state.last_dawn.unwrap().murder);
}

#[test]
fn lynching_the_saint_loses_the_game() {
    let mut rng = rng();
    let state = table(&["Werewolf", "Seer", "Soldier", "Saint", "Hermit"]);
    let voted = enact_vote(&state, 1, Nominee::Player(3), &[true, true, true, false, false]).state;
    let dusk = advance(&voted, &mut rng);

    assert!(!dusk.state.players[3].alive);
    assert_eq!(dusk.state.status, GameStatus::Defeat);
    assert_eq!(dusk.outcome.map(|o| o.winner), Some(Winner::Evil));

    // Terminal states stop the clock.
    let after = advance(&dusk.state, &mut rng);
    assert_eq!(after.state.status, GameStatus::Defeat);
    assert!(after.events.is_empty());
}

#[test]
fn lynching_the_werewolf_wins_the_game() {
    let mut rng = rng();
    let state = table(&["Werewolf", "Seer", "Soldier", "Saint", "Hermit"]);
    let voted = enact_vote(&state, 1, Nominee::Player(0), &[false, true, true, true, false]).state;
    let dusk = advance(&voted, &mut rng);

    assert_eq!(dusk.state.status, GameStatus::Victory);
    let outcome = dusk.outcome.unwrap();
    assert_eq!(outcome.winner, Winner::Good);
    assert!(dusk.events.iter().any(|e| e.event_type == "game_ended"));
}

#[test]
fn snapshots_survive_a_json_round_trip() {
    let mut rng = rng();
    let state = advance(&table(&["Werewolf", "Seer", "Soldier", "Drunk", "Hermit"]), &mut rng).state;
    let json = serde_json::to_string(&state).unwrap();
    let restored: GameState = serde_json::from_str(&json).unwrap();

    assert_eq!(serde_json::to_value(&restored).unwrap(), serde_json::to_value(&state).unwrap());
    assert_eq!(restored.players[3].true_role_name(), "Drunk");

    let (a, b) = (
        advance(&state, &mut StdRng::seed_from_u64(1)),
        advance(&restored, &mut StdRng::seed_from_u64(1)),
    );
    assert_eq!(a.state.log, b.state.log);
    assert_eq!(a.state.current_player, b.state.current_player);
}

#[test]
fn player_view_hides_the_true_role() {
    let mut state = table(&["Werewolf", "Seer", "Soldier", "Drunk", "Hermit"]);
    state.players[3].role = Some(RoleInstance::new(find_role("Seer").unwrap()));
    let view = player_view(&state, 3).unwrap();
    assert_eq!(view.role.as_deref(), Some("Seer"));
    assert!(player_view(&state, 9).is_none());
}
