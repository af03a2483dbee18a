//! Suspend/resume protocol for moderator decisions.
//!
//! A resolution that needs the moderator stores a [`Decision`] in
//! `state.special` and returns. The host shows the prompt built by
//! [`prompt_for`] and calls [`resolve_decision`] with the answer, which picks
//! the resolution back up exactly where it stopped. A dismissed prompt
//! (`None`) always selects the second option.

use rand::Rng;

use crate::engine::models::{Answer, Prompt};

use super::death::{KillResolution, PendingKill};
use super::roles::{Team, ROLE_CATALOG};
use super::table::{Table, Transition};
use super::types::{DawnCursor, Decision, GameState, GameStatus};

impl PendingKill {
    pub(crate) fn into_decision(self, cursor: DawnCursor) -> Decision {
        match self {
            PendingKill::MayorRedirect { mayor } => Decision::MayorRedirect { mayor, cursor },
            PendingKill::FarmerSuccession { farmer } => Decision::FarmerSuccession { farmer, cursor },
            PendingKill::TeaLadyCheck {
                tea_lady,
                victim,
                suspect,
            } => Decision::TeaLadyCheck {
                tea_lady,
                victim,
                suspect,
                cursor,
            },
        }
    }
}

fn name_of(state: &GameState, index: usize) -> &str {
    state.players.get(index).map(|p| p.name.as_str()).unwrap_or("?")
}

/// The prompt the host should show for a pending decision. Aiming the
/// Hunter's shot has none: the host picks a target through `handle_action`.
pub fn prompt_for(state: &GameState, decision: &Decision) -> Option<Prompt> {
    match decision {
        Decision::MayorRedirect { mayor, .. } => {
            let options = state
                .living()
                .filter(|(i, _)| i != mayor)
                .map(|(_, p)| p.name.clone())
                .collect();
            Some(Prompt::select(
                "Mayor",
                format!(
                    "The werewolves attacked {}. Choose who dies instead, or let the Mayor die.",
                    name_of(state, *mayor)
                ),
                options,
                "Let the Mayor die",
            ))
        }
        Decision::FarmerSuccession { farmer, .. } => {
            let options = state
                .living()
                .filter(|(i, p)| i != farmer && p.true_team() == Some(Team::Good))
                .map(|(_, p)| p.name.clone())
                .collect();
            Some(Prompt::select(
                "Farmer",
                format!(
                    "{} dies tonight. Choose a good player to become the new Farmer.",
                    name_of(state, *farmer)
                ),
                options,
                "No successor",
            ))
        }
        Decision::TeaLadyCheck {
            tea_lady,
            victim,
            suspect,
            ..
        } => Some(Prompt::boolean(
            "Tea Lady",
            format!(
                "{} shelters {}. Does {} register as evil to the Tea Lady?",
                name_of(state, *tea_lady),
                name_of(state, *victim),
                name_of(state, *suspect)
            ),
            "Evil",
            "Good",
        )),
        Decision::GamblerGuess { actor, target } => Some(Prompt::select(
            "Gambler",
            format!(
                "Which role does {} guess for {}?",
                name_of(state, *actor),
                name_of(state, *target)
            ),
            ROLE_CATALOG.iter().map(|r| r.name.to_string()).collect(),
            "No guess",
        )),
        Decision::SeerReading { pending, .. } => Some(Prompt::boolean(
            "Seer",
            format!("Does {} register as evil to the Seer?", name_of(state, *pending)),
            "Evil",
            "Good",
        )),
        Decision::HunterAim { .. } => None,
        Decision::HunterVerdict { target, .. } => Some(Prompt::boolean(
            "Hunter",
            format!("Does {} register as a werewolf?", name_of(state, *target)),
            "Werewolf",
            "Not a werewolf",
        )),
    }
}

fn chosen_player(state: &GameState, answer: Option<&Answer>) -> Option<usize> {
    answer
        .and_then(Answer::as_text)
        .and_then(|name| state.index_of(name))
}

/// Feed the moderator's answer into the pending decision and continue.
pub fn resolve_decision<R: Rng + ?Sized>(
    state: &GameState,
    answer: Option<Answer>,
    rng: &mut R,
) -> Transition {
    let Some(special) = state.special.as_ref().filter(|_| state.status == GameStatus::Special)
    else {
        tracing::debug!(status = ?state.status, "no decision pending");
        return Transition::unchanged(state);
    };
    let decision = special.decision.clone();
    let answer = answer.as_ref();

    let mut table = Table::new(state);
    table.resume();
    match decision {
        Decision::MayorRedirect { mayor, cursor } => {
            table.rulings = cursor.rulings.clone();
            let target = chosen_player(&table.state, answer);
            let resolution = table.redirect_mayor_kill(mayor, target, rng);
            table.continue_dawn(resolution, cursor, rng);
        }
        Decision::FarmerSuccession { farmer, cursor } => {
            table.rulings = cursor.rulings.clone();
            let heir = chosen_player(&table.state, answer);
            let outcome = table.pass_on_farm(farmer, heir);
            table.continue_dawn(KillResolution::Resolved(outcome), cursor, rng);
        }
        Decision::TeaLadyCheck {
            victim,
            suspect,
            cursor,
            ..
        } => {
            let evil = answer.and_then(Answer::as_bool).unwrap_or(false);
            table.rulings = cursor.rulings.clone();
            table.rulings.push((suspect, evil));
            let resolution = table.handle_night_kill(victim, rng);
            table.continue_dawn(resolution, cursor, rng);
        }
        Decision::GamblerGuess { actor, target } => {
            let guess = answer.and_then(Answer::as_text);
            table.settle_gamble(actor, target, guess, rng);
        }
        Decision::SeerReading { actor, pending } => {
            let evil = answer.and_then(Answer::as_bool).unwrap_or(false);
            table.settle_seer_reading(actor, pending, evil);
        }
        Decision::HunterAim { hunter } => match chosen_player(&table.state, answer) {
            Some(target) => table.shoot(hunter, target),
            None => table.lower_weapon(hunter),
        },
        Decision::HunterVerdict { hunter, target } => {
            let hit = answer.and_then(Answer::as_bool).unwrap_or(false);
            table.settle_hunter(hunter, target, hit);
        }
    }
    table.finish()
}

/// Back out of a pending decision. Aiming the Hunter's shot is abandoned
/// without spending the ability; anything else resolves with its default.
pub fn cancel_special<R: Rng + ?Sized>(state: &GameState, rng: &mut R) -> Transition {
    match state.special.as_ref().map(|s| &s.decision) {
        Some(Decision::HunterAim { hunter }) if state.status == GameStatus::Special => {
            let mut table = Table::new(state);
            table.resume();
            table.lower_weapon(*hunter);
            table.finish()
        }
        Some(_) => resolve_decision(state, None, rng),
        None => Transition::unchanged(state),
    }
}
