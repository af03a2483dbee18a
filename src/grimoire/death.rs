//! Deaths: the shared kill primitive and night-kill resolution.

use rand::seq::SliceRandom;
use rand::Rng;

use super::oracle::{find_neighbours, is_evil, is_intoxicated, QueryOptions, Verdict};
use super::roles::{Capability, Category, RoleTemplate, Team};
use super::statuses::StatusKind;
use super::table::Table;
use super::types::{KillOutcome, KillReason};

/// Outsiders the Alpha Wolf can turn in one game.
pub const MAX_INFECTIONS: u32 = 2;

/// Werewolf deaths only promote the Scarlet Woman at tables this large.
pub const SCARLET_WOMAN_MIN_PLAYERS: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PendingKill {
    MayorRedirect { mayor: usize },
    FarmerSuccession { farmer: usize },
    TeaLadyCheck { tea_lady: usize, victim: usize, suspect: usize },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TeaCover {
    None,
    Saviour(usize),
    /// Saved only if the suspect registers as good.
    Unclear { tea_lady: usize, suspect: usize },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KillResolution {
    Resolved(KillOutcome),
    NeedsDecision(PendingKill),
}

impl Table {
    /// Kill a player, honouring cheat-death roles, the Tea Lady and the
    /// Scarlet Woman. Returns whether the player actually died.
    pub fn kill_player_by_index(&mut self, index: usize) -> bool {
        let Some(victim) = self.state.players.get(index) else {
            return false;
        };
        if !victim.alive {
            return false;
        }
        let name = victim.name.clone();

        if victim.can(Capability::CheatsDeath) && victim.has_uses_left() {
            let sober = !is_intoxicated(victim);
            self.state.players[index].ability_uses += 1;
            if sober {
                self.state.public_log(format!("{name} should have died, but did not."));
                self.emit("death_cheated", Some(index), serde_json::json!({}));
                tracing::debug!(player = %name, "cheated death");
                return false;
            }
        }

        if let Some(saviour) = self.neighbour_saviour(index) {
            let saviour_name = self.name(saviour);
            self.state
                .public_log(format!("{name} was spared thanks to {saviour_name}'s tea."));
            self.emit(
                "death_prevented",
                Some(index),
                serde_json::json!({ "by": saviour_name }),
            );
            return false;
        }

        self.mark_dead(index);

        let dead_role = self.state.players[index].true_role.as_ref().map(|r| r.template);
        if let Some(template) = dead_role.filter(|t| t.category == Category::Werewolf) {
            self.inherit_werewolf(template);
        }
        true
    }

    /// Record a death with no further checks.
    pub fn mark_dead(&mut self, index: usize) {
        let day = self.state.day;
        let player = &mut self.state.players[index];
        player.alive = false;
        let name = player.name.clone();
        self.state.last_death = Some(day);
        self.state.public_log(format!("{name} died."));
        self.emit("player_died", Some(index), serde_json::json!({ "day": day }));
        tracing::info!(player = %name, day, "player died");
    }

    pub fn transform(&mut self, index: usize, template: &'static RoleTemplate, ability_uses: u32) {
        let player = &mut self.state.players[index];
        let from = player.true_role_name();
        player.update_role(template, ability_uses);
        let name = player.name.clone();
        self.state
            .public_log(format!("{name} is now the {} (was {from}).", template.name));
        self.emit(
            "role_changed",
            Some(index),
            serde_json::json!({ "from": from, "to": template.name }),
        );
        tracing::info!(player = %name, from, to = template.name, "role changed");
    }

    /// A sober Tea Lady next to the victim whose neighbours both read good.
    /// Without a ruling an ambiguous neighbour reads good, as a dismissed
    /// prompt would; night kills ask the moderator before getting here.
    fn neighbour_saviour(&self, victim: usize) -> Option<usize> {
        match self.tea_lady_cover(victim) {
            TeaCover::Saviour(tea_lady) | TeaCover::Unclear { tea_lady, .. } => Some(tea_lady),
            TeaCover::None => None,
        }
    }

    fn tea_lady_cover(&self, victim: usize) -> TeaCover {
        let state = &self.state;
        let mut unclear = TeaCover::None;
        let tea_ladies = state.living().filter(|(i, p)| {
            *i != victim && p.can(Capability::ProtectsNeighbours) && !is_intoxicated(p)
        });
        for (tea_lady, _) in tea_ladies {
            let Some((left, right)) = find_neighbours(state, tea_lady) else {
                continue;
            };
            if left != victim && right != victim {
                continue;
            }
            let mut suspect = None;
            let mut clean = true;
            for n in [left, right] {
                match is_evil(&state.players[n], QueryOptions::default()) {
                    Verdict::True => clean = false,
                    Verdict::Storyteller => match self.ruling(n) {
                        Some(evil) => clean &= !evil,
                        None => suspect = suspect.or(Some(n)),
                    },
                    Verdict::False | Verdict::Null => {}
                }
            }
            match (clean, suspect) {
                (true, None) => return TeaCover::Saviour(tea_lady),
                (true, Some(suspect)) if unclear == TeaCover::None => {
                    unclear = TeaCover::Unclear { tea_lady, suspect };
                }
                _ => {}
            }
        }
        unclear
    }

    fn ruling(&self, seat: usize) -> Option<bool> {
        self.rulings
            .iter()
            .find(|(s, _)| *s == seat)
            .map(|&(_, evil)| evil)
    }

    fn inherit_werewolf(&mut self, template: &'static RoleTemplate) {
        if self.state.players.len() < SCARLET_WOMAN_MIN_PLAYERS
            || !self.state.living_in_category(Category::Werewolf).is_empty()
        {
            return;
        }
        let Some(heir) = self.state.living_holder(Capability::InheritsWerewolf) else {
            return;
        };
        if is_intoxicated(&self.state.players[heir]) {
            tracing::debug!(player = %self.name(heir), "scarlet woman is intoxicated");
            return;
        }
        let uses = self.state.players[heir].ability_uses;
        self.transform(heir, template, uses);
    }

    /// Resolve a werewolf kill on `index`. May stop for a moderator decision.
    pub fn handle_night_kill<R: Rng + ?Sized>(&mut self, index: usize, rng: &mut R) -> KillResolution {
        let Some(victim) = self.state.players.get(index) else {
            return KillResolution::Resolved(KillOutcome::spared(KillReason::Dead));
        };
        if !victim.alive {
            return KillResolution::Resolved(KillOutcome::spared(KillReason::Dead));
        }
        if victim.has_active_status(StatusKind::Protected) {
            return KillResolution::Resolved(KillOutcome::spared(KillReason::Protected));
        }

        let sober = !is_intoxicated(victim);
        let mut reason = KillReason::None;
        if victim.can(Capability::ImmuneToNightKill) {
            if sober {
                return KillResolution::Resolved(KillOutcome::spared(KillReason::Soldier));
            }
            reason = KillReason::SoldierNull;
        }

        let self_target = victim.true_category() == Some(Category::Werewolf)
            && victim.statuses.iter().any(|s| {
                s.kind == StatusKind::Targeted && s.applied_by.as_deref() == Some(victim.name.as_str())
            });
        if self_target {
            return KillResolution::Resolved(self.werewolf_suicide(index, reason, rng));
        }

        if victim.true_category() == Some(Category::Outsider)
            && self.state.infections < MAX_INFECTIONS
        {
            let infector = self
                .state
                .living()
                .find(|(i, p)| {
                    *i != index && p.truly(Capability::InfectsOutsiders) && !is_intoxicated(p)
                })
                .map(|(i, _)| i);
            if let Some(infector) = infector {
                return KillResolution::Resolved(self.infect(index, infector, reason));
            }
        }

        let cheats = victim.can(Capability::CheatsDeath) && victim.has_uses_left() && sober;
        if !cheats {
            if let TeaCover::Unclear { tea_lady, suspect } = self.tea_lady_cover(index) {
                return KillResolution::NeedsDecision(PendingKill::TeaLadyCheck {
                    tea_lady,
                    victim: index,
                    suspect,
                });
            }
        }

        if victim.can(Capability::RedirectsKills) && sober {
            return KillResolution::NeedsDecision(PendingKill::MayorRedirect { mayor: index });
        }
        if victim.can(Capability::PassesOnRole) && sober {
            return KillResolution::NeedsDecision(PendingKill::FarmerSuccession { farmer: index });
        }

        KillResolution::Resolved(self.finish_kill(index, reason))
    }

    /// The werewolf chose themself: a living Minion takes over.
    fn werewolf_suicide<R: Rng + ?Sized>(
        &mut self,
        index: usize,
        reason: KillReason,
        rng: &mut R,
    ) -> KillOutcome {
        let template = self.state.players[index].true_role.as_ref().map(|r| r.template);
        let died = self.kill_player_by_index(index);
        if let Some(template) = template.filter(|_| died) {
            if self.state.living_in_category(Category::Werewolf).is_empty() {
                let minions = self.state.living_in_category(Category::Minion);
                if let Some(&heir) = minions.choose(rng) {
                    let uses = self.state.players[heir].ability_uses;
                    self.transform(heir, template, uses);
                }
            }
        }
        KillOutcome {
            murder: died,
            reason,
        }
    }

    /// The Alpha Wolf dies in the Outsider's place and the Outsider turns.
    fn infect(&mut self, target: usize, infector: usize, reason: KillReason) -> KillOutcome {
        let Some(template) = self.state.players[infector].true_role.as_ref().map(|r| r.template)
        else {
            return KillOutcome::spared(reason);
        };
        let uses = self.state.players[infector].ability_uses;
        self.transform(target, template, uses);
        self.state.infections += 1;
        let died = self.kill_player_by_index(infector);
        KillOutcome {
            murder: died,
            reason,
        }
    }

    /// The kill goes through: death, then the Nain's grief.
    pub fn finish_kill(&mut self, index: usize, reason: KillReason) -> KillOutcome {
        let died = self.kill_player_by_index(index);
        if died && self.state.players[index].has_active_status(StatusKind::Grandchild) {
            let nain = self
                .state
                .living()
                .find(|(_, p)| p.can(Capability::TracksGrandchild) && !is_intoxicated(p))
                .map(|(i, _)| i);
            if let Some(nain) = nain {
                let name = self.name(nain);
                self.state.public_log(format!("{name} died of grief."));
                self.mark_dead(nain);
            }
        }
        KillOutcome {
            murder: died,
            reason,
        }
    }

    /// Continue a Mayor kill once the moderator picked a redirect (or not).
    pub fn redirect_mayor_kill<R: Rng + ?Sized>(
        &mut self,
        mayor: usize,
        redirect: Option<usize>,
        rng: &mut R,
    ) -> KillResolution {
        match redirect {
            Some(target)
                if target != mayor
                    && self.state.players.get(target).is_some_and(|p| p.alive) =>
            {
                let (from, to) = (self.name(mayor), self.name(target));
                self.emit(
                    "kill_redirected",
                    Some(mayor),
                    serde_json::json!({ "to": to }),
                );
                tracing::debug!(%from, %to, "mayor kill redirected");
                self.handle_night_kill(target, rng)
            }
            _ => KillResolution::Resolved(self.finish_kill(mayor, KillReason::None)),
        }
    }

    /// Hand the Farmer role on (if an heir was picked), then kill the Farmer.
    pub fn pass_on_farm(&mut self, farmer: usize, heir: Option<usize>) -> KillOutcome {
        let template = self.state.players[farmer].role.as_ref().map(|r| r.template);
        let eligible = heir.filter(|&h| {
            h != farmer
                && self.state.players.get(h).is_some_and(|p| {
                    p.alive && p.true_team() == Some(Team::Good)
                })
        });
        if let (Some(heir), Some(template)) = (eligible, template) {
            self.transform(heir, template, 0);
        }
        self.finish_kill(farmer, KillReason::None)
    }
}
