//! The working copy every public operation mutates, and the transition it
//! hands back to the host.

use crate::engine::models::{Event, Outcome, Prompt, Winner};

use super::decisions::prompt_for;
use super::types::{Decision, GameState, GameStatus, Special};
use super::voting::evaluate_win;

/// Result of one engine operation: the new snapshot, what happened, and
/// whether the moderator must answer something before play continues.
#[derive(Debug, Clone)]
pub struct Transition {
    pub state: GameState,
    pub events: Vec<Event>,
    pub prompt: Option<Prompt>,
    pub outcome: Option<Outcome>,
}

impl Transition {
    pub fn unchanged(state: &GameState) -> Self {
        Self {
            state: state.clone(),
            events: vec![],
            prompt: None,
            outcome: None,
        }
    }
}

pub(crate) struct Table {
    pub state: GameState,
    pub events: Vec<Event>,
    /// Moderator rulings on ambiguous players for the dawn being resolved.
    pub rulings: Vec<(usize, bool)>,
    ended: Option<&'static str>,
}

impl Table {
    pub fn new(state: &GameState) -> Self {
        Self {
            state: state.clone(),
            events: vec![],
            rulings: vec![],
            ended: None,
        }
    }

    pub fn name(&self, index: usize) -> String {
        self.state
            .players
            .get(index)
            .map(|p| p.name.clone())
            .unwrap_or_default()
    }

    pub fn emit(&mut self, event_type: &str, player: Option<usize>, payload: serde_json::Value) {
        let name = player.map(|i| self.name(i));
        self.events.push(Event::new(event_type, name.as_deref(), payload));
    }

    /// Pause the current resolution until the moderator answers.
    pub fn suspend(&mut self, decision: Decision) {
        let previous = match &self.state.special {
            Some(special) => special.previous,
            None => self.state.status,
        };
        self.state.special = Some(Special { previous, decision });
        self.state.status = GameStatus::Special;
    }

    /// Leave the `Special` sub-state, restoring whatever it interrupted.
    pub fn resume(&mut self) {
        if let Some(special) = self.state.special.take() {
            if self.state.status == GameStatus::Special {
                self.state.status = special.previous;
            }
        }
    }

    pub fn is_suspended(&self) -> bool {
        self.state.special.is_some()
    }

    pub fn end_game(&mut self, status: GameStatus, reason: &'static str) {
        if self.state.status.is_over() {
            return;
        }
        self.state.special = None;
        self.state.status = status;
        self.state.current_player = None;
        self.ended = Some(reason);
        let line = match status {
            GameStatus::Victory => format!("The village wins ({reason})."),
            _ => format!("The werewolves win ({reason})."),
        };
        self.state.public_log(line);
        tracing::info!(?status, reason, day = self.state.day, "game over");
    }

    pub fn finish(mut self) -> Transition {
        if self.state.status == GameStatus::Playing {
            if let Some((status, reason)) = evaluate_win(&self.state) {
                self.end_game(status, reason);
            }
        }

        let outcome = self.ended.map(|reason| Outcome {
            winner: if self.state.status == GameStatus::Victory {
                Winner::Good
            } else {
                Winner::Evil
            },
            day: self.state.day,
            reason: reason.to_string(),
        });
        if let Some(o) = &outcome {
            self.emit(
                "game_ended",
                None,
                serde_json::json!({ "winner": o.winner, "reason": o.reason }),
            );
        }

        let prompt = self
            .state
            .special
            .as_ref()
            .and_then(|s| prompt_for(&self.state, &s.decision));

        Transition {
            state: self.state,
            events: self.events,
            prompt,
            outcome,
        }
    }
}
