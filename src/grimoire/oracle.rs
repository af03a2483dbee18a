//! Alignment and category queries.
//!
//! All queries are pure. An ambiguous answer is `Verdict::Storyteller`: the
//! caller asks the moderator, the oracle never does.

use serde::{Deserialize, Serialize};

use super::roles::{Capability, Category, Team};
use super::statuses::StatusKind;
use super::types::{GameState, Player, RoleInstance};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Verdict {
    True,
    False,
    /// No role assigned yet.
    Null,
    /// The moderator decides.
    Storyteller,
}

impl From<bool> for Verdict {
    fn from(value: bool) -> Self {
        if value {
            Verdict::True
        } else {
            Verdict::False
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct QueryOptions {
    /// The query comes from a role that the Red Herring fools.
    pub fooled_by_red_herring: bool,
}

impl QueryOptions {
    pub fn seer() -> Self {
        Self { fooled_by_red_herring: true }
    }
}

/// Why the player's ability is currently fake, if it is.
pub fn intoxication(player: &Player) -> Option<String> {
    for status in player.statuses.iter().filter(|s| s.is_active()) {
        match status.kind {
            StatusKind::Poisoned => return Some("poisoned".into()),
            StatusKind::Marionette => return Some("a marionette".into()),
            _ => {}
        }
    }
    match &player.true_role {
        Some(role) if role.has(Capability::Decoy) => Some(format!("the {}", role.name())),
        _ => None,
    }
}

pub fn is_intoxicated(player: &Player) -> bool {
    intoxication(player).is_some()
}

fn registers(
    player: &Player,
    herring_counts: bool,
    nominal: impl Fn(&RoleInstance) -> bool,
) -> Verdict {
    let Some(role) = &player.true_role else {
        return Verdict::Null;
    };
    if herring_counts && player.has_active_status(StatusKind::RedHerring) {
        return Verdict::True;
    }
    if role.has(Capability::MisreadsAlignment) && !is_intoxicated(player) {
        return Verdict::Storyteller;
    }
    nominal(role).into()
}

pub fn is_evil(player: &Player, opts: QueryOptions) -> Verdict {
    if player.truly(Capability::ReadsEvil) {
        return Verdict::True;
    }
    registers(player, opts.fooled_by_red_herring, |r| r.team() == Team::Evil)
}

pub fn is_werewolf(player: &Player, opts: QueryOptions) -> Verdict {
    registers(player, opts.fooled_by_red_herring, |r| r.category() == Category::Werewolf)
}

pub fn is_minion(player: &Player) -> Verdict {
    registers(player, false, |r| r.category() == Category::Minion)
}

pub fn is_villager(player: &Player) -> Verdict {
    registers(player, false, |r| r.category() == Category::Villager)
}

pub fn is_outsider(player: &Player) -> Verdict {
    registers(player, false, |r| r.category() == Category::Outsider)
}

/// Nearest living players counter-clockwise and clockwise, skipping the dead
/// and never the player themself. With one other survivor both sides are that
/// survivor; with none there are no neighbours.
pub fn find_neighbours(state: &GameState, index: usize) -> Option<(usize, usize)> {
    let n = state.players.len();
    if index >= n {
        return None;
    }
    let clockwise = (1..n)
        .map(|step| (index + step) % n)
        .find(|&i| state.players[i].alive)?;
    let counter = (1..n)
        .map(|step| (index + n - step) % n)
        .find(|&i| state.players[i].alive)?;
    Some((counter, clockwise))
}

/// Seat neighbours ignoring death, used while seating the table.
pub fn seat_neighbours(len: usize, index: usize) -> (usize, usize) {
    ((index + len - 1) % len, (index + 1) % len)
}

/// Counts definite evil readings and ambiguous ones among `indices`.
pub fn count_evil(state: &GameState, indices: &[usize], opts: QueryOptions) -> (usize, usize) {
    indices
        .iter()
        .filter_map(|&i| state.players.get(i))
        .fold((0, 0), |(evil, unsure), p| match is_evil(p, opts) {
            Verdict::True => (evil + 1, unsure),
            Verdict::Storyteller => (evil, unsure + 1),
            Verdict::False | Verdict::Null => (evil, unsure),
        })
}
