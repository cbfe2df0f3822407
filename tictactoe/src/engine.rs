use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

use anyhow::anyhow;
use engine::GameEngine;
use rand::seq::SliceRandom;
use rand::thread_rng;

use super::{Action, GameState};

/// Whose point of view a rollout outcome is scored from.
#[derive(Debug, Clone, Copy, Default, Eq, PartialEq)]
pub enum Perspective {
    /// The player to move in the reference state. Values mean the same at every depth, so the
    /// search should not flip signs.
    Reference,
    /// The player who moved into the simulated state. Pair with sign flipping.
    #[default]
    LastMover,
}

impl FromStr for Perspective {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "reference" => Ok(Perspective::Reference),
            "last_mover" => Ok(Perspective::LastMover),
            _ => Err(anyhow!("Unknown perspective {}", s)),
        }
    }
}

impl Display for Perspective {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        match self {
            Perspective::Reference => write!(f, "reference"),
            Perspective::LastMover => write!(f, "last_mover"),
        }
    }
}

#[derive(Default)]
pub struct Engine {
    perspective: Perspective,
}

impl Engine {
    pub fn new(perspective: Perspective) -> Self {
        Self { perspective }
    }

    pub fn perspective(&self) -> Perspective {
        self.perspective
    }
}

impl GameEngine for Engine {
    type Action = Action;
    type State = GameState;

    fn possible_actions(&self, game_state: &Self::State) -> Vec<Self::Action> {
        if game_state.outcome().is_some() {
            return Vec::new();
        }

        game_state.empty_cells().map(Action).collect()
    }

    fn take_action(&self, game_state: &Self::State, action: &Self::Action) -> Self::State {
        game_state.take_action(action)
    }

    fn is_terminal_state(&self, game_state: &Self::State) -> bool {
        game_state.outcome().is_some()
    }

    fn simulate(&self, game_state: &Self::State, reference_state: &Self::State) -> f64 {
        let player = match self.perspective {
            Perspective::Reference => reference_state.player_to_move(),
            Perspective::LastMover => game_state.last_mover(),
        };

        let mut rng = thread_rng();
        let mut state = game_state.clone();

        loop {
            if let Some(outcome) = state.outcome() {
                return outcome.score_for(player);
            }

            let cells: Vec<u8> = state.empty_cells().collect();
            match cells.choose(&mut rng) {
                Some(cell) => state = state.take_action(&Action(*cell)),
                None => return 0.0,
            }
        }
    }
}
