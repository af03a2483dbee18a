//! Batch runner: plays many seeded games in parallel and aggregates who won.

use std::collections::HashMap;
use std::time::Instant;

use rand::rngs::StdRng;
use rand::SeedableRng;
use rayon::prelude::*;

use crate::engine::config::SetupFile;
use crate::engine::error::Result;
use crate::engine::models::Winner;
use crate::engine::moderator::ModeratorStrategy;
use crate::engine::simulator::{play_game, MAX_STEPS};
use crate::grimoire::create_initial_state;

/// How one game went.
#[derive(Debug, Clone)]
pub struct GameSummary {
    pub seed: u64,
    pub winner: Option<Winner>,
    pub reason: Option<String>,
    pub days: u32,
    pub steps: usize,
    pub prompts: usize,
    pub duration_ms: f64,
    /// The public game log.
    pub log: Vec<String>,
}

/// Aggregated results from an arena run.
#[derive(Debug, Clone, Default)]
pub struct ArenaResult {
    pub num_games: usize,
    pub wins: HashMap<Winner, usize>,
    /// Games that hit the step limit.
    pub draws: usize,
    pub reasons: HashMap<String, usize>,
    pub game_days: Vec<u32>,
    pub game_durations_ms: Vec<f64>,
}

impl ArenaResult {
    fn record(&mut self, game: &GameSummary) {
        match game.winner {
            Some(winner) => *self.wins.entry(winner).or_insert(0) += 1,
            None => self.draws += 1,
        }
        if let Some(reason) = &game.reason {
            *self.reasons.entry(reason.clone()).or_insert(0) += 1;
        }
        self.game_days.push(game.days);
        self.game_durations_ms.push(game.duration_ms);
    }

    pub fn win_rate(&self, winner: Winner) -> f64 {
        *self.wins.get(&winner).unwrap_or(&0) as f64 / self.num_games.max(1) as f64
    }

    pub fn avg_days(&self) -> f64 {
        if self.game_days.is_empty() {
            return 0.0;
        }
        self.game_days.iter().map(|&d| d as f64).sum::<f64>() / self.game_days.len() as f64
    }

    /// Wilson score interval for the win rate.
    pub fn confidence_interval_95(&self, winner: Winner) -> (f64, f64) {
        let n = self.num_games;
        if n == 0 {
            return (0.0, 0.0);
        }
        let p = self.win_rate(winner);
        let z = 1.96_f64;
        let denom = 1.0 + z * z / n as f64;
        let center = (p + z * z / (2.0 * n as f64)) / denom;
        let margin = z * ((p * (1.0 - p) + z * z / (4.0 * n as f64)) / n as f64).sqrt() / denom;
        ((center - margin).max(0.0), (center + margin).min(1.0))
    }

    pub fn summary(&self) -> String {
        let mut lines = vec![format!("Arena Results ({} games)", self.num_games)];
        lines.push("=".repeat(60));
        for (label, winner) in [("Village", Winner::Good), ("Werewolves", Winner::Evil)] {
            let (ci_lo, ci_hi) = self.confidence_interval_95(winner);
            lines.push(format!(
                "  {:>12}: {:3} wins ({:5.1}%)  [95% CI: {:.1}%-{:.1}%]",
                label,
                self.wins.get(&winner).copied().unwrap_or(0),
                self.win_rate(winner) * 100.0,
                ci_lo * 100.0,
                ci_hi * 100.0,
            ));
        }
        lines.push(format!("  {:>12}: {}", "Unfinished", self.draws));
        lines.push(format!("  Avg length: {:.1} days", self.avg_days()));

        let mut reasons: Vec<_> = self.reasons.iter().collect();
        reasons.sort_by(|a, b| b.1.cmp(a.1).then_with(|| a.0.cmp(b.0)));
        for (reason, count) in reasons {
            lines.push(format!("    {count:4}  {reason}"));
        }
        if !self.game_durations_ms.is_empty() {
            let avg_ms =
                self.game_durations_ms.iter().sum::<f64>() / self.game_durations_ms.len() as f64;
            let total_s = self.game_durations_ms.iter().sum::<f64>() / 1000.0;
            lines.push(format!("  Avg game: {:.2}ms  |  Total: {:.1}s", avg_ms, total_s));
        }
        lines.join("\n")
    }
}

/// Play one game of the given setup with a seed of its own.
pub fn play_seeded(
    setup: &SetupFile,
    strategy: &dyn ModeratorStrategy,
    seed: u64,
) -> Result<GameSummary> {
    let pools = setup.to_pools()?;
    let names: Vec<&str> = setup.table.names.iter().map(String::as_str).collect();
    let mut rng = StdRng::seed_from_u64(seed);

    let t0 = Instant::now();
    let roster = create_initial_state(setup.table.players, &names, &mut rng);
    let sim = play_game(&roster, &pools, strategy, &mut rng, MAX_STEPS)?;
    let duration_ms = t0.elapsed().as_secs_f64() * 1000.0;

    Ok(GameSummary {
        seed,
        winner: sim.winner(),
        reason: sim.outcome.map(|o| o.reason),
        days: sim.state.day,
        steps: sim.steps,
        prompts: sim.prompts,
        duration_ms,
        log: sim.state.log,
    })
}

/// Run `num_games` of the same setup, seeds `base_seed..base_seed + num_games`.
/// Games run in parallel; results are aggregated in seed order.
pub fn run_arena(
    setup: &SetupFile,
    strategy: &dyn ModeratorStrategy,
    num_games: usize,
    base_seed: u64,
) -> Result<ArenaResult> {
    setup.validate()?;
    let games: Vec<GameSummary> = (0..num_games as u64)
        .into_par_iter()
        .map(|i| play_seeded(setup, strategy, base_seed + i))
        .collect::<Result<_>>()?;

    let mut result = ArenaResult {
        num_games,
        ..Default::default()
    };
    for game in &games {
        tracing::debug!(seed = game.seed, winner = ?game.winner, days = game.days, "game finished");
        result.record(game);
    }
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::moderator::RandomModerator;

    #[test]
    fn test_arena_random_moderator() {
        let setup = SetupFile::default();
        let result = run_arena(&setup, &RandomModerator::default(), 8, 42).unwrap();
        assert_eq!(result.num_games, 8);
        let total = result.wins.values().sum::<usize>() + result.draws;
        assert_eq!(total, 8);
        assert_eq!(result.game_days.len(), 8);
    }

    #[test]
    fn test_arena_is_reproducible() {
        let setup = SetupFile::default();
        let moderator = RandomModerator::default();
        let a = run_arena(&setup, &moderator, 6, 7).unwrap();
        let b = run_arena(&setup, &moderator, 6, 7).unwrap();
        assert_eq!(a.wins, b.wins);
        assert_eq!(a.game_days, b.game_days);
    }

    #[test]
    fn test_confidence_interval_bounds() {
        let mut result = ArenaResult {
            num_games: 10,
            ..Default::default()
        };
        result.wins.insert(Winner::Good, 10);
        let (lo, hi) = result.confidence_interval_95(Winner::Good);
        assert!(lo > 0.6 && lo < 1.0);
        assert!(hi > 0.999);
        assert!(result.confidence_interval_95(Winner::Evil).0 < 1e-9);
        assert!(result.summary().contains("Village"));
    }

    #[test]
    fn test_invalid_setup_fails_before_playing() {
        let mut setup = SetupFile::default();
        setup.table.players = 3;
        assert!(run_arena(&setup, &RandomModerator::default(), 2, 0).is_err());
    }
}
