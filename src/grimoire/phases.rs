//! The phase clock: night turns, dawn, the vote and dusk.

use rand::seq::SliceRandom;
use rand::Rng;

use super::abilities::{can_act_tonight, false_role_name};
use super::death::{KillResolution, PendingKill};
use super::oracle::{count_evil, find_neighbours, is_intoxicated, QueryOptions};
use super::roles::{Capability, Category, Team};
use super::statuses::StatusKind;
use super::table::{Table, Transition};
use super::types::{
    DawnCursor, GameState, GameStatus, KillOutcome, KillReason, Lynch, Nominee, RoleInstance,
    Time,
};

/// Move the clock forward one step: next night seat, dawn, the vote, or dusk.
pub fn advance_time<R: Rng + ?Sized>(state: &GameState, rng: &mut R) -> Transition {
    if state.status != GameStatus::Playing {
        tracing::debug!(status = ?state.status, "advance ignored");
        return Transition::unchanged(state);
    }
    let mut table = Table::new(state);
    table.advance(rng);
    table.finish()
}

/// Moderator override: kill a living player outright or revive a dead one.
pub fn toggle_player_alive(state: &GameState, name: &str) -> Transition {
    let Some(index) = state.index_of(name) else {
        tracing::debug!(player = name, "toggle ignored for unknown player");
        return Transition::unchanged(state);
    };
    if state.status.is_over() {
        return Transition::unchanged(state);
    }
    let mut table = Table::new(state);
    if table.state.players[index].alive {
        table.mark_dead(index);
    } else {
        table.state.players[index].alive = true;
        table.state.public_log(format!("{name} was brought back to life."));
        table.emit("player_revived", Some(index), serde_json::json!({}));
    }
    table.finish()
}

/// Drain the lines gathered for the next popup.
pub fn take_popup(state: &GameState) -> (GameState, Vec<String>) {
    let mut state = state.clone();
    let lines = std::mem::take(&mut state.log_buffer);
    (state, lines)
}

/// Fold one kill into the dawn summary. The first landed kill fixes the tag.
fn absorb(report: &mut KillOutcome, outcome: KillOutcome) {
    if !report.murder {
        report.reason = outcome.reason;
    }
    report.murder |= outcome.murder;
}

fn dawn_flavour(report: KillOutcome) -> &'static str {
    match (report.murder, report.reason) {
        (true, _) => "Someone did not survive the night.",
        (false, KillReason::Protected) => "The werewolves struck, but their victim was protected.",
        (false, KillReason::Soldier) => "The werewolves struck, but their victim shrugged it off.",
        (false, KillReason::Dead) => "The werewolves prowled among the dead.",
        (false, _) => "Nobody died in the night.",
    }
}

impl Table {
    pub(crate) fn advance<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        match self.state.time {
            Time::Night => {
                let next = self.state.turn + 1;
                let last_seat = self.seat_at(next).is_none();
                if let Some(actor) = self.state.current_player {
                    self.end_turn(actor, last_seat);
                }
                if let Some(seat) = self.seat_at(next) {
                    self.state.turn = next;
                    self.prepare_turn(seat, rng);
                } else {
                    self.begin_day(rng);
                }
            }
            Time::Day => {
                self.state.time = Time::Vote;
                self.state.public_log("Nominations are open.".to_string());
                self.expire(Time::Vote);
            }
            Time::Vote => self.dusk(rng),
        }
    }

    /// Seat for position `turn` of the night. Without a computed order the
    /// seating order is used.
    fn seat_at(&self, turn: usize) -> Option<usize> {
        if self.state.turn_order.is_empty() {
            (turn < self.state.players.len()).then_some(turn)
        } else {
            self.state.turn_order.get(turn).copied()
        }
    }

    /// Close the active seat's turn. The last seat of the night spends no use.
    fn end_turn(&mut self, actor: usize, last_seat: bool) {
        let day = self.state.day;
        if let Some(note) = self.state.turn_note.take() {
            let name = self.name(actor);
            self.state.log.push(format!("{name}: {note}"));
            self.state.players[actor]
                .knowledge
                .push(format!("Night {day}: {note}"));
        }
        let player = &self.state.players[actor];
        if !last_seat
            && can_act_tonight(player, &self.state)
            && player.true_category() != Some(Category::Werewolf)
        {
            self.state.players[actor].ability_uses += 1;
        }
        self.state.selection.clear();
        self.state.seer_readings.clear();
    }

    pub(crate) fn prepare_turn<R: Rng + ?Sized>(&mut self, seat: usize, rng: &mut R) {
        self.state.current_player = Some(seat);
        self.state.selection.clear();
        self.state.seer_readings.clear();
        self.state.turn_note = None;
        let Some(player) = self.state.players.get(seat) else {
            return;
        };

        let mut notes = vec![];
        if self.state.day == 1
            && player.true_category() == Some(Category::Werewolf)
            && !self.state.bluffs.is_empty()
        {
            notes.push(format!("Bluffs: {}.", self.state.bluffs.join(", ")));
        }
        if can_act_tonight(player, &self.state) {
            notes.extend(self.night_information(seat, rng));
        }
        if !notes.is_empty() {
            self.state.turn_note = Some(notes.join(" "));
        }
    }

    /// Information a passive role wakes up to. Intoxicated players get
    /// made-up answers.
    fn night_information<R: Rng + ?Sized>(&self, seat: usize, rng: &mut R) -> Option<String> {
        let state = &self.state;
        let player = &state.players[seat];
        let sober = !is_intoxicated(player);

        if player.can(Capability::LearnsExecuted) {
            let lynched = state.last_lynch?.player;
            let role = if sober {
                state.players[lynched].true_role_name()
            } else {
                false_role_name(rng)
            };
            return Some(format!("{} was the {role}.", self.name(lynched)));
        }

        if player.can(Capability::TracksGrandchild) {
            let grandchild = state
                .players
                .iter()
                .position(|p| p.has_status(StatusKind::Grandchild))
                .filter(|_| sober);
            return Some(match grandchild {
                Some(i) => format!(
                    "Your grandchild is {}, the {}.",
                    self.name(i),
                    state.players[i].true_role_name()
                ),
                None => {
                    let others: Vec<usize> =
                        (0..state.players.len()).filter(|&i| i != seat).collect();
                    let pick = *others.choose(rng)?;
                    format!("Your grandchild is {}, the {}.", self.name(pick), false_role_name(rng))
                }
            });
        }

        if player.can(Capability::SensesNeighbours) {
            let (left, right) = find_neighbours(state, seat)?;
            let pair = if left == right { vec![left] } else { vec![left, right] };
            if !sober {
                let evil = rng.gen_range(0..=pair.len());
                return Some(format!("{evil} of your living neighbours are evil."));
            }
            let (evil, unsure) = count_evil(state, &pair, QueryOptions::default());
            let mut note = format!("{evil} of your living neighbours are evil.");
            if unsure > 0 {
                note.push_str(&format!(" ({unsure} more at the Storyteller's discretion.)"));
            }
            return Some(note);
        }

        None
    }

    /// Opens night `day`: heading, status expiry and the first seat.
    pub(crate) fn open_night<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        self.state.time = Time::Night;
        self.state.turn = 0;
        let day = self.state.day;
        self.state.public_log(format!("Day {day}"));
        self.expire(Time::Night);
        match self.seat_at(0) {
            Some(seat) => self.prepare_turn(seat, rng),
            None => self.state.current_player = None,
        }
    }

    fn begin_day<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        self.state.current_player = None;
        self.state.selection.clear();
        self.state.turn_note = None;
        self.state.time = Time::Day;
        let remaining = self
            .state
            .players
            .iter()
            .enumerate()
            .filter(|(_, p)| p.has_active_status(StatusKind::Targeted))
            .map(|(i, _)| i)
            .collect();
        self.run_dawn(
            DawnCursor {
                remaining,
                report: KillOutcome::default(),
                rulings: vec![],
            },
            rng,
        );
    }

    /// Resolve the remaining night kills in seating order, stopping at the
    /// first one that needs the moderator.
    pub(crate) fn run_dawn<R: Rng + ?Sized>(&mut self, mut cursor: DawnCursor, rng: &mut R) {
        for ruling in cursor.rulings.drain(..) {
            if !self.rulings.iter().any(|(seat, _)| *seat == ruling.0) {
                self.rulings.push(ruling);
            }
        }
        while !cursor.remaining.is_empty() {
            let victim = cursor.remaining.remove(0);
            match self.handle_night_kill(victim, rng) {
                KillResolution::Resolved(outcome) => absorb(&mut cursor.report, outcome),
                KillResolution::NeedsDecision(pending) => {
                    self.pause_dawn(pending, cursor);
                    return;
                }
            }
        }
        self.close_dawn(cursor.report);
    }

    /// Suspend dawn, keeping the rulings made so far for when it resumes.
    fn pause_dawn(&mut self, pending: PendingKill, mut cursor: DawnCursor) {
        cursor.rulings = self.rulings.clone();
        self.suspend(pending.into_decision(cursor));
    }

    /// Pick dawn back up after a moderator decision.
    pub(crate) fn continue_dawn<R: Rng + ?Sized>(
        &mut self,
        resolution: KillResolution,
        mut cursor: DawnCursor,
        rng: &mut R,
    ) {
        match resolution {
            KillResolution::Resolved(outcome) => {
                absorb(&mut cursor.report, outcome);
                self.run_dawn(cursor, rng);
            }
            KillResolution::NeedsDecision(pending) => self.pause_dawn(pending, cursor),
        }
    }

    fn close_dawn(&mut self, report: KillOutcome) {
        for player in &mut self.state.players {
            player.modified_tonight = false;
        }
        let day = self.state.day;
        let lines = [format!("Dawn of day {day}."), dawn_flavour(report).to_string()];
        self.state.log_buffer.extend(lines.iter().cloned());
        self.state.log.extend(lines);
        self.state.last_dawn = Some(report);
        self.expire(Time::Day);
        self.emit(
            "dawn",
            None,
            serde_json::json!({ "day": day, "murder": report.murder, "reason": report.reason.tag() }),
        );
        tracing::info!(day, murder = report.murder, reason = report.reason.tag(), "dawn resolved");
    }

    fn dusk<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        self.revert_borrowed_roles();

        match self.state.chopping_block.take().and_then(|b| b.nominee) {
            Some(Nominee::Storyteller) => {
                if self.state.in_play(Capability::StorytellerNominable) {
                    self.end_game(GameStatus::Victory, "the Storyteller was executed");
                } else {
                    self.end_game(GameStatus::Defeat, "the Storyteller was executed");
                }
                return;
            }
            Some(Nominee::Player(index)) => self.execute(index),
            None => self.no_execution(),
        }
        if self.state.status.is_over() {
            return;
        }

        self.state.nominations.clear();
        self.state.nominators.clear();
        self.state.day += 1;
        self.open_night(rng);
    }

    fn execute(&mut self, index: usize) {
        let name = self.name(index);
        self.state.public_log(format!("{name} was executed."));
        self.emit("executed", Some(index), serde_json::json!({}));
        let died = self.kill_player_by_index(index);
        self.state.last_lynch = Some(Lynch {
            player: index,
            day: self.state.day,
        });
        if !died {
            return;
        }

        let executed = &self.state.players[index];
        let sober = !is_intoxicated(executed);
        if sober && executed.can(Capability::LosesIfExecuted) {
            self.end_game(GameStatus::Defeat, "the Saint was executed");
            return;
        }
        if sober && executed.has_active_status(StatusKind::Claimed) {
            self.end_game(GameStatus::Defeat, "the Goblin was executed");
            return;
        }
        self.devour(index);
    }

    /// A sober Cannibal takes on the executed player's role, keeping their
    /// own alignment.
    fn devour(&mut self, executed: usize) {
        let Some(template) = self.state.players[executed].true_role.as_ref().map(|r| r.template)
        else {
            return;
        };
        let Some(cannibal) = self
            .state
            .living()
            .find(|(i, p)| {
                *i != executed && p.can(Capability::DevoursExecuted) && !is_intoxicated(p)
            })
            .map(|(i, _)| i)
        else {
            return;
        };

        let player = &mut self.state.players[cannibal];
        if let Some(current) = player.true_role.take() {
            player.old_roles.push(current);
        }
        let borrowed = RoleInstance {
            template,
            team: Some(Team::Good),
            category: Some(Category::Villager),
            inherited: true,
        };
        player.role = Some(borrowed.clone());
        player.true_role = Some(borrowed);
        let name = player.name.clone();
        self.emit(
            "role_borrowed",
            Some(cannibal),
            serde_json::json!({ "role": template.name }),
        );
        tracing::debug!(player = %name, role = template.name, "cannibal borrowed a role");
    }

    fn revert_borrowed_roles(&mut self) {
        for player in &mut self.state.players {
            if !player.true_role.as_ref().is_some_and(|r| r.inherited) {
                continue;
            }
            if let Some(original) = player.old_roles.pop() {
                player.role = Some(original.clone());
                player.true_role = Some(original);
            }
        }
    }

    fn no_execution(&mut self) {
        self.state.public_log("Nobody was lynched today.".to_string());
        if self.state.living_count() != 3 {
            return;
        }
        let Some(mayor) = self
            .state
            .living()
            .find(|(_, p)| p.can(Capability::WinsWithThreeAlive))
            .map(|(i, _)| i)
        else {
            return;
        };
        if is_intoxicated(&self.state.players[mayor]) {
            let name = self.name(mayor);
            self.state
                .public_log(format!("{name}'s ability fails: the village does not win."));
            return;
        }
        self.end_game(GameStatus::Victory, "the Mayor's peaceful end");
    }

    /// Drop statuses that run out when the clock reaches `time`.
    fn expire(&mut self, time: Time) {
        for player in &mut self.state.players {
            player.statuses.retain(|s| s.expiration != Some(time));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grimoire::roles::find_role;
    use crate::grimoire::statuses::Status;
    use crate::grimoire::types::ChoppingBlock;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn game(roles: &[&str], time: Time, day: u32) -> GameState {
        let names: Vec<String> = (0..roles.len()).map(|i| format!("p{i}")).collect();
        let mut state = GameState::new(&names);
        for (p, r) in state.players.iter_mut().zip(roles) {
            p.set_role(find_role(r).unwrap());
        }
        state.status = GameStatus::Playing;
        state.time = time;
        state.day = day;
        state.turn_order = (0..roles.len()).collect();
        if time == Time::Night {
            state.current_player = Some(0);
        }
        state
    }

    fn rng() -> StdRng {
        StdRng::seed_from_u64(3)
    }

    fn block(index: usize) -> Option<ChoppingBlock> {
        Some(ChoppingBlock {
            nominee: Some(Nominee::Player(index)),
            votes: 3,
        })
    }

    #[test]
    fn test_night_visits_every_seat_before_day() {
        let mut state = game(&["Werewolf", "Seer", "Soldier", "Saint", "Hermit"], Time::Night, 1);
        for seat in 1..5 {
            state = advance_time(&state, &mut rng()).state;
            assert_eq!(state.time, Time::Night);
            assert_eq!(state.current_player, Some(seat));
        }
        state = advance_time(&state, &mut rng()).state;
        assert_eq!(state.time, Time::Day);
        assert_eq!(state.current_player, None);
        assert_eq!(state.last_dawn, Some(KillOutcome::default()));
        assert!(!state.log_buffer.is_empty());
    }

    #[test]
    fn test_eligible_seats_spend_uses() {
        let mut state = game(&["Werewolf", "Seer", "Soldier", "Saint", "Hermit"], Time::Night, 2);
        state.current_player = Some(1);
        state.turn = 1;
        let t = advance_time(&state, &mut rng());
        assert_eq!(t.state.players[1].ability_uses, 1);

        // Werewolves are not counted; passive roles have nothing to spend.
        let mut state = game(&["Werewolf", "Seer", "Soldier", "Saint", "Hermit"], Time::Night, 2);
        state = advance_time(&state, &mut rng()).state;
        assert_eq!(state.players[0].ability_uses, 0);
    }

    #[test]
    fn test_last_seat_spends_no_use() {
        let mut state = game(&["Werewolf", "Seer", "Soldier", "Saint", "Butler"], Time::Night, 2);
        state.current_player = Some(4);
        state.turn = 4;
        let t = advance_time(&state, &mut rng());
        assert_eq!(t.state.time, Time::Day);
        assert_eq!(t.state.players[4].ability_uses, 0);

        // The same Butler one seat earlier does spend it.
        let mut state = game(&["Werewolf", "Seer", "Soldier", "Butler", "Saint"], Time::Night, 2);
        state.current_player = Some(3);
        state.turn = 3;
        let t = advance_time(&state, &mut rng());
        assert_eq!(t.state.players[3].ability_uses, 1);
    }

    #[test]
    fn test_turn_note_flushes_into_knowledge() {
        let mut state = game(&["Werewolf", "Seer", "Soldier", "Saint", "Hermit"], Time::Night, 1);
        state.turn_note = Some("hello".into());
        let t = advance_time(&state, &mut rng());
        assert_eq!(t.state.players[0].knowledge, vec!["Night 1: hello".to_string()]);
        assert!(t.state.log.iter().any(|l| l == "p0: hello"));
    }

    #[test]
    fn test_dawn_soldier_scenario() {
        let mut state = game(&["Werewolf", "Seer", "Soldier", "Saint", "Hermit"], Time::Night, 2);
        state.players[2]
            .statuses
            .push(Status::applied(StatusKind::Targeted, "p0", None));
        state.turn = 4;
        state.current_player = Some(4);
        let t = advance_time(&state, &mut rng());
        assert!(t.state.players[2].alive);
        let report = t.state.last_dawn.unwrap();
        assert!(!report.murder);
        assert_eq!(report.reason, KillReason::Soldier);
        assert_eq!(t.state.status, GameStatus::Playing);
        assert!(t.outcome.is_none());
        assert!(!t.state.players[2].has_status(StatusKind::Targeted));
    }

    #[test]
    fn test_dawn_suspends_on_mayor() {
        let mut state = game(&["Werewolf", "Mayor", "Soldier", "Saint", "Hermit"], Time::Night, 2);
        state.players[1]
            .statuses
            .push(Status::applied(StatusKind::Targeted, "p0", None));
        state.turn = 4;
        let t = advance_time(&state, &mut rng());
        assert_eq!(t.state.status, GameStatus::Special);
        assert_eq!(t.state.time, Time::Day);
        assert!(t.prompt.is_some());
        assert!(t.state.last_dawn.is_none());
        assert!(t.state.players[1].has_status(StatusKind::Targeted));

        let again = advance_time(&t.state, &mut rng());
        assert_eq!(again.state.status, GameStatus::Special);
    }

    #[test]
    fn test_day_to_vote_expires_nothing_timed_for_night() {
        let mut state = game(&["Werewolf", "Seer", "Soldier", "Saint", "Hermit"], Time::Day, 1);
        state.players[1].statuses.push(Status::new(StatusKind::Poisoned));
        let t = advance_time(&state, &mut rng());
        assert_eq!(t.state.time, Time::Vote);
        assert!(t.state.players[1].has_status(StatusKind::Poisoned));
    }

    #[test]
    fn test_dusk_opens_next_night() {
        let mut state = game(&["Werewolf", "Seer", "Soldier", "Saint", "Hermit"], Time::Vote, 1);
        state.players[1].statuses.push(Status::new(StatusKind::Poisoned));
        state.players[2].statuses.push(Status::new(StatusKind::RedHerring));
        state.nominations.push(Nominee::Player(0));
        state.nominators.push("p1".into());
        let t = advance_time(&state, &mut rng());
        assert_eq!(t.state.day, 2);
        assert_eq!(t.state.time, Time::Night);
        assert_eq!(t.state.turn, 0);
        assert_eq!(t.state.current_player, Some(0));
        assert!(t.state.nominations.is_empty());
        assert!(t.state.nominators.is_empty());
        assert!(!t.state.players[1].has_status(StatusKind::Poisoned));
        assert!(t.state.players[2].has_status(StatusKind::RedHerring));
        assert!(t.state.log.iter().any(|l| l == "Nobody was lynched today."));
        assert!(t.state.log.iter().any(|l| l == "Day 2"));
    }

    #[test]
    fn test_execution_records_lynch() {
        let mut state = game(
            &["Werewolf", "Seer", "Soldier", "Saint", "Hermit", "Poisoner", "Doctor"],
            Time::Vote,
            2,
        );
        state.chopping_block = block(1);
        let t = advance_time(&state, &mut rng());
        assert!(!t.state.players[1].alive);
        assert_eq!(t.state.last_lynch, Some(Lynch { player: 1, day: 2 }));
        assert!(t.state.chopping_block.is_none());
        assert_eq!(t.state.status, GameStatus::Playing);
    }

    #[test]
    fn test_saint_lynch_is_defeat_unless_poisoned() {
        let mut state = game(&["Werewolf", "Seer", "Soldier", "Saint", "Hermit"], Time::Vote, 1);
        state.chopping_block = block(3);
        let t = advance_time(&state, &mut rng());
        assert_eq!(t.state.status, GameStatus::Defeat);
        assert!(t.outcome.is_some());

        state.players[3].statuses.push(Status::new(StatusKind::Poisoned));
        let t = advance_time(&state, &mut rng());
        assert_eq!(t.state.status, GameStatus::Playing);
        assert!(!t.state.players[3].alive);
    }

    #[test]
    fn test_goblin_claim_is_defeat() {
        let mut state = game(
            &["Werewolf", "Goblin", "Soldier", "Saint", "Hermit", "Seer", "Doctor"],
            Time::Vote,
            1,
        );
        state.players[1]
            .statuses
            .push(Status::applied(StatusKind::Claimed, "p1", None));
        state.chopping_block = block(1);
        let t = advance_time(&state, &mut rng());
        assert_eq!(t.state.status, GameStatus::Defeat);
    }

    #[test]
    fn test_storyteller_nomination() {
        let mut state = game(&["Werewolf", "Atheist", "Soldier", "Saint", "Hermit"], Time::Vote, 1);
        state.chopping_block = Some(ChoppingBlock {
            nominee: Some(Nominee::Storyteller),
            votes: 3,
        });
        assert_eq!(advance_time(&state, &mut rng()).state.status, GameStatus::Victory);

        state.players[1].set_role(find_role("Seer").unwrap());
        assert_eq!(advance_time(&state, &mut rng()).state.status, GameStatus::Defeat);
    }

    #[test]
    fn test_mayor_wins_with_three_alive() {
        let mut state = game(&["Werewolf", "Mayor", "Soldier", "Saint", "Hermit"], Time::Vote, 3);
        state.players[3].alive = false;
        state.players[4].alive = false;
        let t = advance_time(&state, &mut rng());
        assert_eq!(t.state.status, GameStatus::Victory);

        state.players[1].statuses.push(Status::new(StatusKind::Poisoned));
        let t = advance_time(&state, &mut rng());
        assert_eq!(t.state.status, GameStatus::Playing);
        assert!(t.state.log.iter().any(|l| l.contains("ability fails")));
    }

    #[test]
    fn test_cannibal_borrows_until_next_dusk() {
        let mut state = game(
            &["Werewolf", "Cannibal", "Soldier", "Poisoner", "Hermit", "Seer", "Doctor"],
            Time::Vote,
            1,
        );
        state.chopping_block = block(3);
        let t = advance_time(&state, &mut rng());
        let cannibal = &t.state.players[1];
        assert_eq!(cannibal.true_role_name(), "Poisoner");
        assert_eq!(cannibal.true_team(), Some(Team::Good));
        assert!(cannibal.true_role.as_ref().unwrap().inherited);

        let mut next = t.state;
        next.time = Time::Vote;
        let t = advance_time(&next, &mut rng());
        assert_eq!(t.state.players[1].true_role_name(), "Cannibal");
        assert_eq!(t.state.players[1].role_name(), "Cannibal");
    }

    #[test]
    fn test_werewolves_learn_bluffs_on_first_night() {
        let mut state = game(&["Seer", "Werewolf", "Soldier", "Saint", "Hermit"], Time::Night, 1);
        state.bluffs = vec!["Doctor".into(), "Mayor".into(), "Hunter".into()];
        let t = advance_time(&state, &mut rng());
        assert_eq!(t.state.current_player, Some(1));
        assert_eq!(t.state.turn_note.as_deref(), Some("Bluffs: Doctor, Mayor, Hunter."));
    }

    #[test]
    fn test_undertaker_learns_executed_role() {
        let mut state = game(&["Seer", "Undertaker", "Soldier", "Saint", "Hermit"], Time::Night, 3);
        state.players[3].alive = false;
        state.last_lynch = Some(Lynch { player: 3, day: 2 });
        let t = advance_time(&state, &mut rng());
        assert_eq!(t.state.turn_note.as_deref(), Some("p3 was the Saint."));
    }

    #[test]
    fn test_toggle_player_alive() {
        let state = game(
            &["Werewolf", "Seer", "Soldier", "Saint", "Hermit", "Poisoner", "Doctor"],
            Time::Day,
            2,
        );
        let t = toggle_player_alive(&state, "p2");
        assert!(!t.state.players[2].alive);
        assert_eq!(t.state.last_death, Some(2));
        let t = toggle_player_alive(&t.state, "p2");
        assert!(t.state.players[2].alive);
        let t = toggle_player_alive(&t.state, "nobody");
        assert!(t.events.is_empty());
    }

    #[test]
    fn test_toggling_the_werewolf_ends_the_game() {
        let state = game(&["Werewolf", "Seer", "Soldier", "Saint", "Hermit"], Time::Day, 2);
        let t = toggle_player_alive(&state, "p0");
        assert_eq!(t.state.status, GameStatus::Victory);
        assert!(t.events.iter().any(|e| e.event_type == "game_ended"));
        let after = advance_time(&t.state, &mut rng());
        assert_eq!(after.state.time, Time::Day);
    }

    #[test]
    fn test_take_popup_drains_buffer() {
        let mut state = game(&["Werewolf", "Seer", "Soldier", "Saint", "Hermit"], Time::Day, 2);
        state.log_buffer = vec!["a".into(), "b".into()];
        let (state, lines) = take_popup(&state);
        assert_eq!(lines, vec!["a", "b"]);
        assert!(state.log_buffer.is_empty());
    }
}
