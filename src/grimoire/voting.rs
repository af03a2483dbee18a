//! Nominations, the chopping block and win evaluation.

use super::oracle::is_intoxicated;
use super::roles::{Capability, Category, Team};
use super::statuses::StatusKind;
use super::table::{Table, Transition};
use super::types::{ChoppingBlock, GameState, GameStatus, Nominee, Time};

/// Votes needed to put someone on the block: half the living, rounded up.
pub fn vote_threshold(living: usize) -> usize {
    living.div_ceil(2)
}

/// Record a nomination and its show of hands. `votes` is indexed by seat.
///
/// Dead players without a ghost vote are ignored. A sober Butler's hand only
/// counts when their Patron's hand is up too.
pub fn enact_vote(
    state: &GameState,
    nominator: usize,
    nominee: Nominee,
    votes: &[bool],
) -> Transition {
    if state.status != GameStatus::Playing || state.time != Time::Vote {
        tracing::debug!(status = ?state.status, time = ?state.time, "vote ignored outside the vote phase");
        return Transition::unchanged(state);
    }
    if nominator >= state.players.len() {
        return Transition::unchanged(state);
    }
    if let Nominee::Player(i) = nominee {
        if i >= state.players.len() {
            return Transition::unchanged(state);
        }
    }

    let mut table = Table::new(state);
    table.tally(nominator, nominee, votes);
    table.finish()
}

impl Table {
    fn counted_voters(&self, votes: &[bool]) -> Vec<usize> {
        let players = &self.state.players;
        let raised = |i: usize| votes.get(i).copied().unwrap_or(false);
        (0..players.len())
            .filter(|&i| raised(i))
            .filter(|&i| players[i].alive || players[i].ghost_votes > 0)
            .filter(|&i| {
                let voter = &players[i];
                if !voter.can(Capability::ChoosesPatron) || is_intoxicated(voter) {
                    return true;
                }
                let mut patrons = players
                    .iter()
                    .enumerate()
                    .filter(|(_, p)| {
                        p.statuses.iter().any(|s| {
                            s.kind == StatusKind::Patron
                                && s.is_active()
                                && s.applied_by.as_deref() == Some(voter.name.as_str())
                        })
                    })
                    .map(|(j, _)| j)
                    .peekable();
                patrons.peek().is_none() || patrons.any(|j| raised(j))
            })
            .collect()
    }

    fn tally(&mut self, nominator: usize, nominee: Nominee, votes: &[bool]) {
        let voters = self.counted_voters(votes);
        let cast = voters.len();
        let threshold = vote_threshold(self.state.living_count());

        let nominator_name = self.name(nominator);
        let nominee_name = match nominee {
            Nominee::Player(i) => self.name(i),
            Nominee::Storyteller => "the Storyteller".to_string(),
        };
        self.state.nominations.push(nominee);
        self.state.nominators.push(nominator_name.clone());

        for &i in &voters {
            let voter = &mut self.state.players[i];
            if !voter.alive {
                voter.ghost_votes = voter.ghost_votes.saturating_sub(1);
            }
        }

        let leading = self.state.chopping_block.map(|b| b.votes).unwrap_or(0);
        let verdict = if cast < threshold {
            "not enough votes"
        } else if self.state.chopping_block.is_none() || cast > leading {
            self.state.chopping_block = Some(ChoppingBlock {
                nominee: Some(nominee),
                votes: cast,
            });
            "on the block"
        } else if cast == leading {
            self.state.chopping_block = Some(ChoppingBlock {
                nominee: None,
                votes: cast,
            });
            "tied, the block is cleared"
        } else {
            "fewer votes than the block"
        };

        self.state.public_log(format!(
            "{nominator_name} nominated {nominee_name}: {cast} of {threshold} needed, {verdict}."
        ));
        self.emit(
            "vote_enacted",
            Some(nominator),
            serde_json::json!({
                "nominee": nominee_name,
                "votes": cast,
                "threshold": threshold,
                "voters": voters.iter().map(|&i| self.name(i)).collect::<Vec<_>>(),
            }),
        );
        tracing::debug!(nominator = %nominator_name, nominee = %nominee_name, cast, threshold, verdict, "vote enacted");
    }
}

/// Terminal check, run after every mutation while the game is playing.
pub fn evaluate_win(state: &GameState) -> Option<(GameStatus, &'static str)> {
    if state.living_in_category(Category::Werewolf).is_empty() {
        if state.in_play(Capability::StorytellerNominable) {
            return None;
        }
        return Some((GameStatus::Victory, "no werewolf remains"));
    }

    let living_good = state
        .living()
        .filter(|(_, p)| p.true_team() == Some(Team::Good))
        .count();
    if living_good == 0 {
        return Some((GameStatus::Defeat, "no good player remains"));
    }

    let ghost_votes: usize = state
        .players
        .iter()
        .filter(|p| !p.alive)
        .map(|p| p.ghost_votes as usize)
        .sum();
    let total_votes = state.living_count() + ghost_votes;
    let evil_votes = state
        .living()
        .filter(|(_, p)| p.true_team() == Some(Team::Evil))
        .count();
    if evil_votes >= vote_threshold(total_votes) {
        return Some((GameStatus::Defeat, "evil controls the vote"));
    }
    None
}
