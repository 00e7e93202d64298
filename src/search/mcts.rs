// Ficheiro: src/search/mcts.rs
// Descrição: Monte-Carlo Tree Search com seleção UCB1 e simulações guiadas
// pelo avaliador (lance guloso a um meio-lance de distância).

use super::budget::SearchBudget;
use super::tree::SearchTree;
use crate::core::*;
use crate::error::SearchError;
use crate::evaluation::{EvaluationScheme, Evaluator};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::time::Duration;
use tracing::{info, trace, warn};

/// Limite de segurança das simulações. As regras dos 75 lances e da
/// quíntupla repetição terminam qualquer partida muito antes disto.
pub const MAX_ROLLOUT_PLIES: usize = 20_000;

#[derive(Debug, Clone)]
pub struct MctsConfig {
    /// Constante de exploração do UCB1.
    pub exploration: f64,
    /// Número máximo de iterações; `None` deixa só o tempo decidir.
    pub max_iterations: Option<u32>,
    /// Semente do gerador. `None` usa entropia do sistema.
    pub seed: Option<u64>,
    pub max_rollout_plies: usize,
}

impl Default for MctsConfig {
    fn default() -> Self {
        MctsConfig {
            exploration: std::f64::consts::SQRT_2,
            max_iterations: None,
            seed: None,
            max_rollout_plies: MAX_ROLLOUT_PLIES,
        }
    }
}

impl MctsConfig {
    pub fn with_exploration(mut self, exploration: f64) -> Self {
        self.exploration = exploration;
        self
    }

    pub fn with_max_iterations(mut self, iterations: u32) -> Self {
        self.max_iterations = Some(iterations);
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_max_rollout_plies(mut self, plies: usize) -> Self {
        self.max_rollout_plies = plies;
        self
    }
}

/// Estatísticas de um filho da raiz.
#[derive(Debug, Clone)]
pub struct ChildStats<M> {
    pub mv: M,
    pub visits: u32,
    pub wins: u32,
}

#[derive(Debug, Clone)]
pub struct MctsResult<M> {
    pub best_move: M,
    /// Iterações completas (seleção até retropropagação).
    pub simulations: u32,
    pub root_visits: u32,
    /// Filhos da raiz pela ordem de expansão.
    pub children: Vec<ChildStats<M>>,
    pub time_elapsed: Duration,
}

impl<M> MctsResult<M> {
    pub fn is_degraded(&self) -> bool {
        self.simulations == 0
    }

    /// Soma das visitas dos filhos da raiz.
    pub fn child_visits(&self) -> u32 {
        self.children.iter().map(|child| child.visits).sum()
    }
}

/// Motor MCTS. A árvore é construída e descartada em cada chamada.
pub struct MctsSearch {
    evaluator: Evaluator,
    config: MctsConfig,
    rng: StdRng,
}

impl MctsSearch {
    pub fn new(scheme: EvaluationScheme) -> Self {
        Self::with_evaluator(Evaluator::new(scheme))
    }

    pub fn with_evaluator(evaluator: Evaluator) -> Self {
        MctsSearch {
            evaluator,
            config: MctsConfig::default(),
            rng: StdRng::from_entropy(),
        }
    }

    pub fn with_config(mut self, config: MctsConfig) -> Self {
        self.rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        self.config = config;
        self
    }

    pub fn evaluator(&self) -> &Evaluator {
        &self.evaluator
    }

    pub fn config(&self) -> &MctsConfig {
        &self.config
    }

    /// Lance do filho da raiz mais visitado.
    ///
    /// Corre pelo menos uma iteração mesmo com o tempo já esgotado. Sem
    /// limite de tempo é obrigatório um teto de iterações.
    pub fn select_best_move<G: GameState>(
        &mut self,
        position: &G,
        budget: SearchBudget,
    ) -> Result<MctsResult<G::Move>, SearchError> {
        if budget.time_limit.is_none() && self.config.max_iterations.is_none() {
            return Err(SearchError::UnboundedBudget);
        }

        let mut tree = SearchTree::new(position.clone());
        let root = tree.root();
        let first = *tree
            .get(root)
            .untried_moves
            .first()
            .ok_or(SearchError::NoLegalMoves)?;

        let deadline = budget.start();
        let mut simulations: u32 = 0;

        loop {
            self.iterate(&mut tree)?;
            simulations += 1;

            if simulations % 100 == 0 {
                trace!(simulations, nodes = tree.len(), "mcts progress");
            }

            if let Some(cap) = self.config.max_iterations {
                if simulations >= cap {
                    break;
                }
            }
            if deadline.expired() {
                break;
            }
        }

        let root_node = tree.get(root);
        let children: Vec<ChildStats<G::Move>> = root_node
            .children
            .iter()
            .filter_map(|&id| {
                let child = tree.get(id);
                child.mv.map(|mv| ChildStats {
                    mv,
                    visits: child.visits,
                    wins: child.wins,
                })
            })
            .collect();

        let best_move = tree
            .most_visited_child()
            .and_then(|id| tree.get(id).mv)
            .unwrap_or(first);

        let result = MctsResult {
            best_move,
            simulations,
            root_visits: root_node.visits,
            children,
            time_elapsed: deadline.elapsed(),
        };

        if result.is_degraded() {
            warn!(best_move = %result.best_move, "mcts finished without a completed simulation");
        } else {
            info!(
                best_move = %result.best_move,
                simulations = result.simulations,
                nodes = tree.len(),
                "mcts finished"
            );
        }
        Ok(result)
    }

    // Seleção, expansão, simulação e retropropagação
    fn iterate<G: GameState>(&mut self, tree: &mut SearchTree<G>) -> Result<(), SearchError> {
        let mut node = tree.root();

        // Seleção
        while tree.get(node).is_fully_expanded() && !tree.get(node).children.is_empty() {
            match tree.select_child(node, self.config.exploration) {
                Some(child) => node = child,
                None => break,
            }
        }

        // Expansão
        let untried = &tree.get(node).untried_moves;
        if !untried.is_empty() {
            let mv = untried[self.rng.gen_range(0..untried.len())];
            node = tree.expand(node, mv);
        }

        // Simulação
        let result = self.rollout(tree.get(node).state.clone())?;

        tree.backpropagate(node, result.winner());
        Ok(())
    }

    /// Joga até ao fim a partir de `state`, escolhendo em cada meio-lance o
    /// lance com a melhor avaliação absoluta para quem joga.
    fn rollout<G: GameState>(&mut self, mut state: G) -> Result<GameResult, SearchError> {
        for _ in 0..self.config.max_rollout_plies {
            let status = state.terminal_status();
            if status.is_terminal() {
                return Ok(GameResult::from_status(status, state.side_to_move()));
            }

            match self.rollout_move(&mut state) {
                Some(mv) => state.apply(mv),
                None => return Ok(state.result()),
            }
        }

        Err(SearchError::RolloutOverflow {
            plies: self.config.max_rollout_plies,
        })
    }

    // Todas as avaliações ficam em ±MATE_VALUE, dentro dos extremos iniciais:
    // o primeiro lance melhora sempre e só uma posição sem lances devolve None.
    fn rollout_move<G: GameState>(&mut self, state: &mut G) -> Option<G::Move> {
        let maximizing = state.side_to_move() == Side::White;
        let mut best_move = None;
        let mut best_score = if maximizing { i32::MIN } else { i32::MAX };

        for mv in state.legal_moves() {
            let score = {
                let child = AppliedMove::new(state, mv);
                self.evaluator.evaluate_absolute(&*child)
            };
            let improves = if maximizing { score > best_score } else { score < best_score };
            if improves {
                best_score = score;
                best_move = Some(mv);
            }
        }

        best_move
    }
}
