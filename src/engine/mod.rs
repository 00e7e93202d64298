// Ficheiro: src/engine/mod.rs
// Descrição: Fachada que escolhe o motor (minimax ou MCTS) pelo nome e o corre
// com um esquema de avaliação e um orçamento.

use crate::core::GameState;
use crate::error::SearchError;
use crate::evaluation::{EvaluationScheme, Evaluator, EvaluatorConfig};
use crate::search::{MctsConfig, MctsSearch, MinimaxConfig, MinimaxSearch, SearchBudget, SearchResult};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum EngineKind {
    #[default]
    Minimax,
    Mcts,
}

impl EngineKind {
    pub const ALL: [EngineKind; 2] = [EngineKind::Minimax, EngineKind::Mcts];

    pub fn name(self) -> &'static str {
        match self {
            EngineKind::Minimax => "minimax",
            EngineKind::Mcts => "mcts",
        }
    }
}

impl FromStr for EngineKind {
    type Err = SearchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "minimax" | "alphabeta" | "alpha_beta" => Ok(EngineKind::Minimax),
            "mcts" => Ok(EngineKind::Mcts),
            _ => Err(SearchError::InvalidEngine(s.to_string())),
        }
    }
}

impl fmt::Display for EngineKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Configuração completa de um motor.
#[derive(Debug, Clone, Default)]
pub struct EngineConfig {
    pub kind: EngineKind,
    pub scheme: EvaluationScheme,
    pub evaluator: EvaluatorConfig,
    pub minimax: MinimaxConfig,
    pub mcts: MctsConfig,
}

impl EngineConfig {
    pub fn new(kind: EngineKind, scheme: EvaluationScheme) -> Self {
        EngineConfig {
            kind,
            scheme,
            ..Default::default()
        }
    }

    /// Constrói a partir dos nomes do motor e do esquema.
    pub fn from_names(kind: &str, scheme: &str) -> Result<Self, SearchError> {
        Ok(Self::new(kind.parse()?, scheme.parse()?))
    }

    pub fn with_evaluator(mut self, evaluator: EvaluatorConfig) -> Self {
        self.evaluator = evaluator;
        self
    }

    pub fn with_minimax(mut self, minimax: MinimaxConfig) -> Self {
        self.minimax = minimax;
        self
    }

    pub fn with_mcts(mut self, mcts: MctsConfig) -> Self {
        self.mcts = mcts;
        self
    }
}

/// Decisão de um motor, independente do algoritmo.
#[derive(Debug, Clone)]
pub struct Decision<M> {
    pub best_move: M,
    /// Pontuação para quem joga; o MCTS não produz pontuação.
    pub score: Option<i32>,
    /// Profundidade completa (minimax) ou 0 (MCTS).
    pub depth: u8,
    /// Nós visitados (minimax) ou simulações (MCTS).
    pub work: u64,
    pub time_elapsed: Duration,
    pub degraded: bool,
}

impl<M> From<SearchResult<M>> for Decision<M> {
    fn from(result: SearchResult<M>) -> Self {
        let degraded = result.is_degraded();
        Decision {
            best_move: result.best_move,
            score: Some(result.score),
            depth: result.depth,
            work: result.nodes_searched,
            time_elapsed: result.time_elapsed,
            degraded,
        }
    }
}

enum Backend {
    Minimax(MinimaxSearch),
    Mcts(MctsSearch),
}

pub struct Engine {
    config: EngineConfig,
    backend: Backend,
}

impl Engine {
    pub fn new(config: EngineConfig) -> Self {
        let evaluator = Evaluator::with_config(config.scheme, config.evaluator.clone());
        let backend = match config.kind {
            EngineKind::Minimax => {
                Backend::Minimax(MinimaxSearch::with_evaluator(evaluator).with_config(config.minimax.clone()))
            }
            EngineKind::Mcts => Backend::Mcts(MctsSearch::with_evaluator(evaluator).with_config(config.mcts.clone())),
        };
        Engine { config, backend }
    }

    pub fn from_names(kind: &str, scheme: &str) -> Result<Self, SearchError> {
        Ok(Self::new(EngineConfig::from_names(kind, scheme)?))
    }

    pub fn kind(&self) -> EngineKind {
        self.config.kind
    }

    pub fn scheme(&self) -> EvaluationScheme {
        self.config.scheme
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Escolhe um lance para `position`, que volta intacta.
    pub fn choose_move<G: GameState>(
        &mut self,
        position: &mut G,
        budget: SearchBudget,
    ) -> Result<Decision<G::Move>, SearchError> {
        match &mut self.backend {
            Backend::Minimax(search) => Ok(search.find_best_move(position, budget)?.into()),
            Backend::Mcts(search) => {
                let result = search.select_best_move(position, budget)?;
                Ok(Decision {
                    best_move: result.best_move,
                    score: None,
                    depth: 0,
                    work: result.simulations as u64,
                    time_elapsed: result.time_elapsed,
                    degraded: result.is_degraded(),
                })
            }
        }
    }
}
