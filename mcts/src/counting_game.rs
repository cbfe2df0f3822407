use std::sync::atomic::{AtomicUsize, Ordering};

use engine::{GameEngine, GameState};

#[derive(Hash, PartialEq, Eq, Clone, Debug)]
pub struct CountingGameState {
    pub p1_turn: bool,
    pub count: usize,
}

impl CountingGameState {
    pub fn from_starting_count(p1_turn: bool, count: usize) -> Self {
        Self { p1_turn, count }
    }

    pub fn is_terminal_state(&self) -> bool {
        self.count == 100 || self.count == 0
    }
}

impl GameState for CountingGameState {
    fn initial() -> Self {
        Self {
            p1_turn: true,
            count: 50,
        }
    }
}

#[derive(PartialEq, Eq, Clone, Debug)]
pub enum CountingAction {
    Increment,
    Decrement,
    Stay,
}

/// P1 wants the count to go up, P2 wants it to go down. Simulation is deterministic and scores
/// the distance from 50 for whoever moves in the reference state.
#[derive(Default)]
pub struct CountingGameEngine {
    expansions: AtomicUsize,
    simulations: AtomicUsize,
}

impl CountingGameEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn expansions(&self) -> usize {
        self.expansions.load(Ordering::SeqCst)
    }

    pub fn simulations(&self) -> usize {
        self.simulations.load(Ordering::SeqCst)
    }
}

impl GameEngine for CountingGameEngine {
    type Action = CountingAction;
    type State = CountingGameState;

    fn possible_actions(&self, game_state: &Self::State) -> Vec<Self::Action> {
        self.expansions.fetch_add(1, Ordering::SeqCst);

        if game_state.is_terminal_state() {
            return Vec::new();
        }

        vec![
            CountingAction::Increment,
            CountingAction::Decrement,
            CountingAction::Stay,
        ]
    }

    fn take_action(&self, game_state: &Self::State, action: &Self::Action) -> Self::State {
        let count = game_state.count;

        let new_count = match action {
            CountingAction::Increment => count + 1,
            CountingAction::Decrement => count - 1,
            CountingAction::Stay => count,
        };

        Self::State {
            p1_turn: !game_state.p1_turn,
            count: new_count,
        }
    }

    fn is_terminal_state(&self, game_state: &Self::State) -> bool {
        game_state.is_terminal_state()
    }

    fn simulate(&self, game_state: &Self::State, reference_state: &Self::State) -> f64 {
        self.simulations.fetch_add(1, Ordering::SeqCst);

        let score = game_state.count as f64 - 50.0;
        if reference_state.p1_turn {
            score
        } else {
            -score
        }
    }
}
