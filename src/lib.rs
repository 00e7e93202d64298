// Bispo - seleção de lances por minimax e MCTS com avaliação composta

pub mod core;
pub mod engine;
pub mod error;
pub mod evaluation;
pub mod puzzle;
pub mod search;

pub use core::*;
pub use engine::{Decision, Engine, EngineConfig, EngineKind};
pub use error::SearchError;
pub use evaluation::{evaluate, EvaluationScheme, Evaluator, EvaluatorConfig, ScoreTerm};
pub use search::{MctsConfig, MctsResult, MctsSearch, MinimaxConfig, MinimaxSearch, SearchBudget, SearchResult};
