//! Synchronous game simulator: drives one game from setup to a verdict
//! through the public grimoire operations. Used by the arena, the CLI and
//! the integration tests.

use rand::RngCore;

use crate::engine::error::Result;
use crate::engine::models::{Outcome, Winner};
use crate::engine::moderator::ModeratorStrategy;
use crate::grimoire::abilities::SEER_PICKS;
use crate::grimoire::roles::Capability;
use crate::grimoire::types::{Decision, GameState, GameStatus, Time};
use crate::grimoire::{
    advance_time, assign_roles, can_act_tonight, cancel_special, enact_vote, handle_action,
    prompt_for, resolve_decision, take_popup, use_day_ability, RolePools, Transition,
};

/// Upper bound on clock steps before a game is called a draw.
pub const MAX_STEPS: usize = 2_000;

/// Pending decisions settled in a row before giving up on one.
const MAX_SETTLE: usize = 16;

/// A game in progress, plus running totals.
#[derive(Debug, Clone)]
pub struct SimulationState {
    pub state: GameState,
    pub outcome: Option<Outcome>,
    pub steps: usize,
    pub events: usize,
    pub prompts: usize,
}

impl SimulationState {
    pub fn new(state: GameState) -> Self {
        Self {
            state,
            outcome: None,
            steps: 0,
            events: 0,
            prompts: 0,
        }
    }

    pub fn apply(&mut self, transition: Transition) {
        self.events += transition.events.len();
        self.prompts += usize::from(transition.prompt.is_some());
        if transition.outcome.is_some() {
            self.outcome = transition.outcome;
        }
        self.state = transition.state;
    }

    pub fn is_over(&self) -> bool {
        self.outcome.is_some() || self.state.status.is_over()
    }

    pub fn winner(&self) -> Option<Winner> {
        self.outcome.as_ref().map(|o| o.winner)
    }
}

/// Answer pending decisions until the game is back in play.
pub fn settle_pending(
    sim: &mut SimulationState,
    strategy: &dyn ModeratorStrategy,
    rng: &mut dyn RngCore,
) {
    for _ in 0..MAX_SETTLE {
        if sim.state.status != GameStatus::Special || sim.is_over() {
            return;
        }
        let Some(special) = sim.state.special.clone() else {
            return;
        };
        let transition = match special.decision {
            Decision::HunterAim { hunter } => match strategy.choose_target(&sim.state, hunter, rng) {
                Some(target) => handle_action(&sim.state, hunter, target, rng),
                None => cancel_special(&sim.state, rng),
            },
            decision => match prompt_for(&sim.state, &decision) {
                Some(prompt) => {
                    let answer = strategy.answer(&sim.state, &prompt, rng);
                    resolve_decision(&sim.state, answer, rng)
                }
                None => cancel_special(&sim.state, rng),
            },
        };
        sim.apply(transition);
    }
    tracing::warn!(special = ?sim.state.special, "decision left unsettled");
}

fn night_turn(sim: &mut SimulationState, strategy: &dyn ModeratorStrategy, rng: &mut dyn RngCore) {
    let Some(actor) = sim.state.current_player else {
        return;
    };
    let player = &sim.state.players[actor];
    if !can_act_tonight(player, &sim.state) {
        return;
    }
    let picks = if player.can(Capability::ReadsPair) { SEER_PICKS } else { 1 };
    for _ in 0..picks {
        let Some(target) = strategy.choose_target(&sim.state, actor, rng) else {
            return;
        };
        let transition = handle_action(&sim.state, actor, target, rng);
        sim.apply(transition);
        settle_pending(sim, strategy, rng);
        if sim.is_over() || sim.state.current_player != Some(actor) {
            return;
        }
    }
}

fn day(sim: &mut SimulationState, strategy: &dyn ModeratorStrategy, rng: &mut dyn RngCore) {
    let (state, popup) = take_popup(&sim.state);
    sim.state = state;
    for line in popup {
        tracing::trace!(day = sim.state.day, %line, "dawn");
    }
    for actor in strategy.day_abilities(&sim.state, rng) {
        let transition = use_day_ability(&sim.state, actor);
        sim.apply(transition);
        settle_pending(sim, strategy, rng);
        if sim.is_over() {
            return;
        }
    }
}

fn nominations(sim: &mut SimulationState, strategy: &dyn ModeratorStrategy, rng: &mut dyn RngCore) {
    while let Some((nominator, nominee)) = strategy.nominate(&sim.state, rng) {
        let before = sim.state.nominations.len();
        let votes = strategy.vote(&sim.state, nominee, rng);
        let transition = enact_vote(&sim.state, nominator, nominee, &votes);
        sim.apply(transition);
        if sim.is_over() || sim.state.nominations.len() == before {
            return;
        }
    }
}

/// Run the clock one step, giving the strategy its say first.
pub fn step(sim: &mut SimulationState, strategy: &dyn ModeratorStrategy, rng: &mut dyn RngCore) {
    sim.steps += 1;
    if sim.state.status == GameStatus::Special {
        settle_pending(sim, strategy, rng);
        return;
    }
    let (time, turn) = (sim.state.time, sim.state.turn);
    match time {
        Time::Night => night_turn(sim, strategy, rng),
        Time::Day => day(sim, strategy, rng),
        Time::Vote => nominations(sim, strategy, rng),
    }
    if sim.is_over() || sim.state.status != GameStatus::Playing {
        return;
    }
    // A lost gamble already moved the clock on.
    if sim.state.time == time && sim.state.turn == turn {
        let transition = advance_time(&sim.state, rng);
        sim.apply(transition);
    }
}

/// Deal roles on a roster in Setup and play until someone wins or the step
/// budget runs out.
pub fn play_game(
    roster: &GameState,
    pools: &RolePools,
    strategy: &dyn ModeratorStrategy,
    rng: &mut dyn RngCore,
    max_steps: usize,
) -> Result<SimulationState> {
    let transition = assign_roles(roster, pools, rng)?;
    let mut sim = SimulationState::new(roster.clone());
    sim.apply(transition);

    while !sim.is_over() && sim.steps < max_steps {
        step(&mut sim, strategy, rng);
    }
    if !sim.is_over() {
        tracing::debug!(steps = sim.steps, day = sim.state.day, "game hit the step limit");
    }
    Ok(sim)
}
