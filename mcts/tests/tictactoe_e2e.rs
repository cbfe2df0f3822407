use std::time::Duration;

use mcts::{MCTSOptions, MCTS, UCB1};
use tictactoe::{Action, Engine, GameState, Perspective};

fn mcts(state: GameState) -> MCTS<Engine> {
    MCTS::with_strategy(
        state,
        Engine::new(Perspective::LastMover),
        UCB1::default(),
        MCTSOptions::new(true, 0.1),
    )
}

#[test]
fn test_x_finds_win_in_one() {
    // X: 0 1, O: 3 4
    let mcts = mcts(GameState::from_moves(&[0, 3, 1, 4]));

    let results = mcts.search_iterations(2_000).unwrap().unwrap();

    assert_eq!(results.best_action(), Some(&Action(2)));
    assert_eq!(results.children[0].action, Some(Action(2)));
    assert_eq!(results.children.len(), 5);
}

#[test]
fn test_o_prefers_own_win_over_block() {
    // X: 0 1 8, O: 3 4
    let mcts = mcts(GameState::from_moves(&[0, 3, 1, 4, 8]));

    let results = mcts.search_iterations(2_000).unwrap().unwrap();

    assert_eq!(results.best_action(), Some(&Action(5)));
}

#[test]
fn test_time_bounded_search_finds_win() {
    let mcts = mcts(GameState::from_moves(&[0, 3, 1, 4]));

    let results = mcts
        .search_time(Duration::from_millis(300))
        .unwrap()
        .unwrap();

    assert_eq!(results.best_action(), Some(&Action(2)));
    assert!(results.visits > 0);
}

#[test]
fn test_tree_is_reused_across_moves() {
    let state = GameState::from_moves(&[4]);
    let mcts = mcts(state.clone());

    let results = mcts.search_iterations(1_000).unwrap().unwrap();
    let action = *results.best_action().unwrap();
    let next_state = state.take_action(&action);

    assert!(mcts.update_root_state(next_state.clone()).unwrap());
    assert_eq!(mcts.root_metrics().state, next_state);
    assert_eq!(mcts.root_metrics().visits, results.best.visits);

    let unseen = GameState::from_moves(&[0, 1, 2]);
    assert!(!mcts.update_root_state(unseen).unwrap());
    assert_eq!(mcts.root_metrics().visits, 0);
}
