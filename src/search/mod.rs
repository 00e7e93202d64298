pub mod budget;
pub mod mcts;
pub mod minimax;
pub mod tree;

pub use budget::*;
pub use mcts::*;
pub use minimax::*;
pub use tree::{ucb1, NodeId, SearchNode, SearchTree};
