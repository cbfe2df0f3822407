use anyhow::Result;
use common::{Config, ConfigLoader};
use mcts::{MCTSOptions, UCB1};
use tictactoe::{Perspective, Player};

#[derive(Debug, Clone, PartialEq)]
pub struct ClientOptions {
    pub exploration_constant: f64,
    pub flip_sign: bool,
    pub best_candidate_threshold: f64,
    pub search_time_ms: u64,
    pub iterations: usize,
    pub perspective: Perspective,
    pub human_player: Player,
    pub games: usize,
}

impl ClientOptions {
    pub fn selection_strategy(&self) -> UCB1 {
        UCB1::new(self.exploration_constant)
    }

    pub fn mcts_options(&self) -> MCTSOptions {
        MCTSOptions::new(self.flip_sign, self.best_candidate_threshold)
    }
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            exploration_constant: 2.0,
            flip_sign: true,
            best_candidate_threshold: 0.1,
            search_time_ms: 1000,
            iterations: 5000,
            perspective: Perspective::LastMover,
            human_player: Player::X,
            games: 10,
        }
    }
}

impl Config for ClientOptions {
    fn load(config: &ConfigLoader) -> Result<Self> {
        let defaults = Self::default();

        Ok(Self {
            exploration_constant: config
                .get("exploration_constant")
                .and_then(|v| v.as_f64())
                .unwrap_or(defaults.exploration_constant),
            flip_sign: config
                .get("flip_sign")
                .and_then(|v| v.as_bool())
                .unwrap_or(defaults.flip_sign),
            best_candidate_threshold: config
                .get("best_candidate_threshold")
                .and_then(|v| v.as_f64())
                .unwrap_or(defaults.best_candidate_threshold),
            search_time_ms: config
                .get("search_time_ms")
                .and_then(|v| v.as_u64())
                .unwrap_or(defaults.search_time_ms),
            iterations: config
                .get("iterations")
                .and_then(|v| v.as_usize())
                .unwrap_or(defaults.iterations),
            perspective: config
                .get("perspective")
                .and_then(|v| v.as_string())
                .map(|v| v.parse::<Perspective>())
                .transpose()?
                .unwrap_or(defaults.perspective),
            human_player: config
                .get("human_player")
                .and_then(|v| v.as_string())
                .map(|v| v.parse::<Player>())
                .transpose()?
                .unwrap_or(defaults.human_player),
            games: config
                .get("games")
                .and_then(|v| v.as_usize())
                .unwrap_or(defaults.games),
        })
    }
}
