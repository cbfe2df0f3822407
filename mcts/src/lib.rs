#[cfg(test)]
mod counting_game;
pub mod mcts;
mod node;
pub mod node_details;
pub mod options;
pub mod selection_strategy;
pub mod tree;

pub use mcts::*;
pub use node::*;
pub use node_details::*;
pub use options::*;
pub use selection_strategy::*;
pub use tree::*;
