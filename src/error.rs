// Erros devolvidos pelas buscas e pela seleção de esquemas/motores.

use crate::core::GameError;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SearchError {
    #[error("Unknown evaluation scheme: '{0}'")]
    InvalidScheme(String),

    #[error("Unknown engine kind: '{0}'")]
    InvalidEngine(String),

    #[error("No legal moves available")]
    NoLegalMoves,

    #[error("MCTS needs a time limit or an iteration cap")]
    UnboundedBudget,

    /// O playout não terminou dentro do limite de segurança: indica um defeito
    /// no motor de regras, não uma partida longa.
    #[error("Rollout exceeded {plies} plies without reaching a terminal position")]
    RolloutOverflow { plies: usize },

    #[error(transparent)]
    Game(#[from] GameError),
}
