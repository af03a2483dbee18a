//! Night actions, day abilities and per-player views.
//!
//! Dispatch goes through the acting player's apparent role: a Drunk who
//! believes they are the Seer acts as a Seer, but intoxicated.

use rand::seq::SliceRandom;
use rand::Rng;
use serde::Serialize;

use super::oracle::{intoxication, is_evil, is_intoxicated, is_werewolf, QueryOptions, Verdict};
use super::roles::{Capability, Category, Condition, ROLE_CATALOG};
use super::statuses::{Status, StatusKind};
use super::table::{Table, Transition};
use super::types::{Decision, GameState, GameStatus, Player, Time};
use super::voting::evaluate_win;

/// How many players the Seer reads at once.
pub const SEER_PICKS: usize = 2;

/// Whether the player gets to use their night ability tonight.
pub fn can_act_tonight(player: &Player, state: &GameState) -> bool {
    let Some(role) = &player.role else {
        return false;
    };
    let template = role.template;
    if template.night.is_none() || player.modified_tonight {
        return false;
    }
    if state.day < template.delay + 1 || !player.has_uses_left() {
        return false;
    }
    match template.condition {
        Some(Condition::WhileDead) => !player.alive,
        _ if !player.alive => false,
        Some(Condition::AfterExecution) => state
            .last_lynch
            .is_some_and(|lynch| lynch.day + 1 == state.day),
        Some(Condition::NoDeathYesterday) => !state
            .last_death
            .is_some_and(|day| day + 1 == state.day),
        None => true,
    }
}

/// A random catalog role, for answers given to intoxicated players.
pub(crate) fn false_role_name<R: Rng + ?Sized>(rng: &mut R) -> &'static str {
    ROLE_CATALOG.choose(rng).map(|r| r.name).unwrap_or_default()
}

/// The current night seat acts on `target`. While the Hunter is aiming, this
/// is also how the shot is fired.
pub fn handle_action<R: Rng + ?Sized>(
    state: &GameState,
    actor: usize,
    target: usize,
    rng: &mut R,
) -> Transition {
    if target >= state.players.len() {
        return Transition::unchanged(state);
    }

    if let Some(special) = &state.special {
        return match special.decision {
            Decision::HunterAim { hunter }
                if hunter == actor && state.status == GameStatus::Special =>
            {
                let mut table = Table::new(state);
                table.resume();
                table.shoot(hunter, target);
                table.finish()
            }
            _ => {
                tracing::debug!(actor, "action ignored while a decision is pending");
                Transition::unchanged(state)
            }
        };
    }

    if state.status != GameStatus::Playing
        || state.time != Time::Night
        || state.current_player != Some(actor)
    {
        tracing::debug!(actor, "action ignored: not this player's turn");
        return Transition::unchanged(state);
    }
    let Some(player) = state.players.get(actor) else {
        return Transition::unchanged(state);
    };
    if !can_act_tonight(player, state) {
        tracing::debug!(player = %player.name, "action ignored: cannot act tonight");
        return Transition::unchanged(state);
    }

    let mut table = Table::new(state);
    if player.can(Capability::KillsAtNight) {
        table.apply_status(actor, target, StatusKind::Targeted);
    } else if player.can(Capability::Poisons) {
        table.apply_status(actor, target, StatusKind::Poisoned);
    } else if player.can(Capability::Protects) {
        if target == actor {
            return Transition::unchanged(state);
        }
        table.apply_status(actor, target, StatusKind::Protected);
    } else if player.can(Capability::ChoosesPatron) {
        if target == actor {
            return Transition::unchanged(state);
        }
        table.apply_status(actor, target, StatusKind::Patron);
    } else if player.can(Capability::ReadsPair) {
        table.seer_select(target);
        table.seer_preview(actor);
    } else if player.can(Capability::GuessesRoles) {
        table.state.selection = vec![target];
        table.suspend(Decision::GamblerGuess { actor, target });
    } else if player.can(Capability::LearnsRole) {
        table.learn_role(actor, target, rng);
    } else {
        return Transition::unchanged(state);
    }
    table.finish()
}

/// Public day abilities: the Hunter starts aiming, the Goblin claims.
pub fn use_day_ability(state: &GameState, actor: usize) -> Transition {
    if state.status != GameStatus::Playing || state.time == Time::Night {
        return Transition::unchanged(state);
    }
    let Some(player) = state.players.get(actor) else {
        return Transition::unchanged(state);
    };
    let has_day_ability = player.role.as_ref().is_some_and(|r| r.template.day.is_some());
    if !player.alive || !has_day_ability || !player.has_uses_left() {
        return Transition::unchanged(state);
    }

    let mut table = Table::new(state);
    let name = player.name.clone();
    if player.can(Capability::PublicKill) {
        table.state.current_player = Some(actor);
        table.state.selection.clear();
        table.suspend(Decision::HunterAim { hunter: actor });
        table.state.public_log(format!("{name} raises their weapon."));
    } else if player.can(Capability::ClaimsExecution) {
        if player.has_status(StatusKind::Claimed) {
            return Transition::unchanged(state);
        }
        let affliction = intoxication(player);
        table.state.players[actor].statuses.push(Status::applied(
            StatusKind::Claimed,
            &name,
            affliction.as_deref(),
        ));
        table.state.public_log(format!("{name} claims to be the Goblin."));
        table.emit("goblin_claim", Some(actor), serde_json::json!({}));
    } else {
        return Transition::unchanged(state);
    }
    table.finish()
}

impl Table {
    /// Put `kind` on the target, replacing this actor's previous pick.
    /// Choosing the same target again takes the status back off.
    fn apply_status(&mut self, actor: usize, target: usize, kind: StatusKind) {
        let actor_name = self.name(actor);
        let mine = |s: &Status| s.kind == kind && s.applied_by.as_deref() == Some(actor_name.as_str());
        let reselected = self.state.players[target].statuses.iter().any(|s| mine(s));
        for player in &mut self.state.players {
            player.statuses.retain(|s| !mine(s));
        }
        if reselected {
            self.state.selection.clear();
            return;
        }

        let affliction = intoxication(&self.state.players[actor]);
        self.state.players[target].statuses.push(Status::applied(
            kind,
            &actor_name,
            affliction.as_deref(),
        ));
        self.state.selection = vec![target];
        self.emit(
            "status_applied",
            Some(target),
            serde_json::json!({
                "status": kind.template().name,
                "by": actor_name,
                "intoxicated": affliction.is_some(),
            }),
        );
    }

    fn seer_select(&mut self, target: usize) {
        let selection = &mut self.state.selection;
        if let Some(pos) = selection.iter().position(|&i| i == target) {
            selection.remove(pos);
        } else {
            if selection.len() >= SEER_PICKS {
                selection.remove(0);
            }
            selection.push(target);
        }
    }

    /// Live "x of N are evil" reading for the current picks. Ambiguous
    /// players are put to the moderator one at a time, once per turn.
    fn seer_preview(&mut self, actor: usize) {
        let picks = self.state.selection.clone();
        if picks.is_empty() {
            self.state.turn_note = None;
            return;
        }
        let affliction = intoxication(&self.state.players[actor]);

        let mut evil = 0;
        for &i in &picks {
            match is_evil(&self.state.players[i], QueryOptions::seer()) {
                Verdict::True => evil += 1,
                Verdict::Storyteller if affliction.is_none() => {
                    let answered = self
                        .state
                        .seer_readings
                        .iter()
                        .find(|(j, _)| *j == i)
                        .map(|&(_, e)| e);
                    let Some(reads_evil) = answered else {
                        self.suspend(Decision::SeerReading { actor, pending: i });
                        return;
                    };
                    evil += usize::from(reads_evil);
                }
                _ => {}
            }
        }

        let mut note = format!("{evil} of {} are evil.", picks.len());
        if let Some(affliction) = affliction {
            note.push_str(&format!(" (The Seer is {affliction}.)"));
        }
        self.state.turn_note = Some(note);
    }

    pub(crate) fn settle_seer_reading(&mut self, actor: usize, pending: usize, reads_evil: bool) {
        self.state.seer_readings.retain(|(j, _)| *j != pending);
        self.state.seer_readings.push((pending, reads_evil));
        self.seer_preview(actor);
    }

    pub(crate) fn settle_gamble<R: Rng + ?Sized>(
        &mut self,
        actor: usize,
        target: usize,
        guess: Option<&str>,
        rng: &mut R,
    ) {
        let Some(guess) = guess else {
            self.state.turn_note = Some("No guess.".to_string());
            return;
        };
        let target_name = self.name(target);
        let correct = self.state.players[target].true_role_name() == guess;
        self.state.turn_note = Some(format!("Guessed {target_name} is the {guess}."));
        self.emit(
            "gamble",
            Some(actor),
            serde_json::json!({ "target": target_name, "guess": guess, "correct": correct }),
        );
        if correct || is_intoxicated(&self.state.players[actor]) {
            return;
        }
        if self.kill_player_by_index(actor) && evaluate_win(&self.state).is_none() {
            self.advance(rng);
        }
    }

    fn learn_role<R: Rng + ?Sized>(&mut self, actor: usize, target: usize, rng: &mut R) {
        let role = if is_intoxicated(&self.state.players[actor]) {
            false_role_name(rng)
        } else {
            self.state.players[target].true_role_name()
        };
        self.state.selection = vec![target];
        self.state.turn_note = Some(format!("{} is the {role}.", self.name(target)));
    }

    pub(crate) fn shoot(&mut self, hunter: usize, target: usize) {
        self.state.players[hunter].ability_uses += 1;
        self.state.current_player = None;
        self.state.selection.clear();
        let (hunter_name, target_name) = (self.name(hunter), self.name(target));
        self.state
            .public_log(format!("{hunter_name} shoots at {target_name}."));

        if let Some(affliction) = intoxication(&self.state.players[hunter]) {
            tracing::debug!(hunter = %hunter_name, %affliction, "hunter shot has no effect");
            self.miss(target);
            return;
        }
        match is_werewolf(&self.state.players[target], QueryOptions::default()) {
            Verdict::True => self.settle_hunter(hunter, target, true),
            Verdict::Storyteller => self.suspend(Decision::HunterVerdict { hunter, target }),
            Verdict::False | Verdict::Null => self.miss(target),
        }
    }

    pub(crate) fn settle_hunter(&mut self, hunter: usize, target: usize, hit: bool) {
        if !hit {
            self.miss(target);
            return;
        }
        let died = self.kill_player_by_index(target);
        self.emit(
            "hunter_shot",
            Some(hunter),
            serde_json::json!({ "target": self.name(target), "killed": died }),
        );
    }

    fn miss(&mut self, target: usize) {
        let name = self.name(target);
        self.state.public_log(format!("Nothing happens to {name}."));
    }

    pub(crate) fn lower_weapon(&mut self, hunter: usize) {
        self.state.current_player = None;
        self.state.selection.clear();
        tracing::debug!(hunter = %self.name(hunter), "hunter lowered their weapon");
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SeatView {
    pub name: String,
    pub alive: bool,
}

/// What one player is allowed to see.
#[derive(Debug, Clone, Serialize)]
pub struct PlayerView {
    pub name: String,
    pub role: Option<String>,
    pub description: Option<String>,
    pub alive: bool,
    pub ghost_votes: u8,
    pub knowledge: Vec<String>,
    /// Only werewolves are shown the bluffs.
    pub bluffs: Vec<String>,
    pub seats: Vec<SeatView>,
}

pub fn player_view(state: &GameState, index: usize) -> Option<PlayerView> {
    let player = state.players.get(index)?;
    let bluffs = if player.true_category() == Some(Category::Werewolf) {
        state.bluffs.clone()
    } else {
        vec![]
    };
    Some(PlayerView {
        name: player.name.clone(),
        role: player.role.as_ref().map(|r| r.name().to_string()),
        description: player.role.as_ref().map(|r| r.template.description.to_string()),
        alive: player.alive,
        ghost_votes: player.ghost_votes,
        knowledge: player.knowledge.clone(),
        bluffs,
        seats: state
            .players
            .iter()
            .map(|p| SeatView {
                name: p.name.clone(),
                alive: p.alive,
            })
            .collect(),
    })
}
