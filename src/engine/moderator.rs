//! Moderator strategies for autoplay: who acts on whom, how prompts are
//! answered and how the table votes.

use rand::seq::{IteratorRandom, SliceRandom};
use rand::{Rng, RngCore};

use crate::engine::models::{Answer, Prompt, PromptKind};
use crate::grimoire::roles::Capability;
use crate::grimoire::types::{GameState, Nominee};

/// Everything a simulated game asks of the people at the table. The random
/// source is passed in so a seeded game replays exactly.
pub trait ModeratorStrategy: Send + Sync {
    /// Target for `actor`'s night ability, or for an aimed Hunter shot.
    /// `None` skips the action.
    fn choose_target(&self, state: &GameState, actor: usize, rng: &mut dyn RngCore)
        -> Option<usize>;

    /// Reply to a pending prompt. `None` dismisses it.
    fn answer(&self, state: &GameState, prompt: &Prompt, rng: &mut dyn RngCore) -> Option<Answer>;

    /// Players who use their public day ability this day.
    fn day_abilities(&self, state: &GameState, rng: &mut dyn RngCore) -> Vec<usize>;

    /// Next nomination, or `None` to close nominations.
    fn nominate(&self, state: &GameState, rng: &mut dyn RngCore) -> Option<(usize, Nominee)>;

    /// Raised hands by seat for the current nomination.
    fn vote(&self, state: &GameState, nominee: Nominee, rng: &mut dyn RngCore) -> Vec<bool>;
}

/// Makes every choice uniformly at random, with a few knobs so games
/// neither stall nor end on day one.
#[derive(Debug, Clone)]
pub struct RandomModerator {
    /// Chance that a prompt is dismissed instead of answered.
    pub dismiss_rate: f64,
    /// Chance that a day-ability holder uses it on a given day.
    pub day_ability_rate: f64,
    pub max_nominations: usize,
    pub vote_rate: f64,
}

impl Default for RandomModerator {
    fn default() -> Self {
        Self {
            dismiss_rate: 0.2,
            day_ability_rate: 0.25,
            max_nominations: 2,
            vote_rate: 0.5,
        }
    }
}

impl ModeratorStrategy for RandomModerator {
    fn choose_target(
        &self,
        state: &GameState,
        actor: usize,
        rng: &mut dyn RngCore,
    ) -> Option<usize> {
        state
            .living()
            .map(|(i, _)| i)
            .filter(|&i| i != actor)
            .choose(rng)
    }

    fn answer(&self, _state: &GameState, prompt: &Prompt, rng: &mut dyn RngCore) -> Option<Answer> {
        if rng.gen_bool(self.dismiss_rate) {
            return None;
        }
        match prompt.kind {
            PromptKind::Bool => Some(Answer::Bool(rng.gen())),
            PromptKind::Select => prompt
                .select_options
                .choose(rng)
                .map(|option| Answer::Text(option.clone())),
            PromptKind::Text => None,
        }
    }

    fn day_abilities(&self, state: &GameState, rng: &mut dyn RngCore) -> Vec<usize> {
        state
            .living()
            .filter(|(_, p)| {
                p.role
                    .as_ref()
                    .is_some_and(|r| r.template.day.is_some() && p.has_uses_left())
            })
            .map(|(i, _)| i)
            .filter(|_| rng.gen_bool(self.day_ability_rate))
            .collect()
    }

    fn nominate(&self, state: &GameState, rng: &mut dyn RngCore) -> Option<(usize, Nominee)> {
        if state.nominations.len() >= self.max_nominations {
            return None;
        }
        let nominator = state.living().map(|(i, _)| i).choose(rng)?;
        if state.in_play(Capability::StorytellerNominable) && rng.gen_bool(0.1) {
            return Some((nominator, Nominee::Storyteller));
        }
        let nominee = state
            .living()
            .map(|(i, _)| i)
            .filter(|&i| i != nominator)
            .choose(rng)?;
        Some((nominator, Nominee::Player(nominee)))
    }

    fn vote(&self, state: &GameState, _nominee: Nominee, rng: &mut dyn RngCore) -> Vec<bool> {
        state
            .players
            .iter()
            .map(|p| (p.alive || p.ghost_votes > 0) && rng.gen_bool(self.vote_rate))
            .collect()
    }
}
