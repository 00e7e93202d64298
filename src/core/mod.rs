pub mod board;
pub mod game_state;
pub mod types;

pub use board::*;
pub use game_state::*;
pub use types::*;
