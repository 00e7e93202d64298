// Ficheiro: src/search/minimax.rs
// Descrição: Minimax com poda alfa-beta e aprofundamento iterativo.
// As pontuações internas são absolutas (brancas maximizam, pretas minimizam).

use super::budget::SearchBudget;
use crate::core::*;
use crate::error::SearchError;
use crate::evaluation::{is_mate_score, EvaluationScheme, Evaluator, DRAW_VALUE, MATE_VALUE};
use std::time::Duration;
use tracing::{debug, info, warn};

const INFINITY: i32 = 1_000_000;

/// Profundidade máxima quando só há limite de tempo.
pub const TIME_ONLY_MAX_DEPTH: u8 = 64;

/// Resultado da busca Alpha-Beta
#[derive(Debug, Clone)]
pub struct SearchResult<M> {
    pub best_move: M,
    /// Pontuação do ponto de vista de quem joga na raiz.
    pub score: i32,
    /// Última profundidade completa; 0 se nenhuma terminou.
    pub depth: u8,
    pub nodes_searched: u64,
    pub time_elapsed: Duration,
}

impl<M> SearchResult<M> {
    /// O lance não foi validado por nenhuma profundidade completa.
    pub fn is_degraded(&self) -> bool {
        self.depth == 0
    }

    pub fn is_mate(&self) -> bool {
        is_mate_score(self.score)
    }
}

#[derive(Debug, Clone)]
pub struct MinimaxConfig {
    /// Profundidade usada quando o orçamento não indica nenhuma.
    pub max_depth: u8,
    /// Pára o aprofundamento assim que encontra uma pontuação de mate.
    pub stop_on_mate: bool,
}

impl Default for MinimaxConfig {
    fn default() -> Self {
        MinimaxConfig {
            max_depth: 4,
            stop_on_mate: true,
        }
    }
}

impl MinimaxConfig {
    pub fn with_max_depth(mut self, depth: u8) -> Self {
        self.max_depth = depth;
        self
    }

    pub fn with_stop_on_mate(mut self, stop: bool) -> Self {
        self.stop_on_mate = stop;
        self
    }
}

/// Motor minimax. Um avaliador fixo por instância.
pub struct MinimaxSearch {
    evaluator: Evaluator,
    config: MinimaxConfig,
    nodes_searched: u64,
}

impl MinimaxSearch {
    pub fn new(scheme: EvaluationScheme) -> Self {
        Self::with_evaluator(Evaluator::new(scheme))
    }

    pub fn with_evaluator(evaluator: Evaluator) -> Self {
        MinimaxSearch {
            evaluator,
            config: MinimaxConfig::default(),
            nodes_searched: 0,
        }
    }

    pub fn with_config(mut self, config: MinimaxConfig) -> Self {
        self.config = config;
        self
    }

    pub fn evaluator(&self) -> &Evaluator {
        &self.evaluator
    }

    pub fn config(&self) -> &MinimaxConfig {
        &self.config
    }

    fn depth_limit(&self, budget: &SearchBudget) -> u8 {
        match budget.max_depth {
            Some(depth) => depth,
            None if budget.is_time_only() => TIME_ONLY_MAX_DEPTH,
            None => self.config.max_depth,
        }
    }

    /// Melhor lance para quem joga em `position`.
    ///
    /// A posição é devolvida intacta. O tempo só é verificado entre
    /// profundidades: uma profundidade começada termina sempre.
    pub fn find_best_move<G: GameState>(
        &mut self,
        position: &mut G,
        budget: SearchBudget,
    ) -> Result<SearchResult<G::Move>, SearchError> {
        self.find_best_move_with(position, budget, |_| {})
    }

    /// Igual a `find_best_move`, chamando `on_depth` no fim de cada profundidade.
    pub fn find_best_move_with<G, F>(
        &mut self,
        position: &mut G,
        budget: SearchBudget,
        mut on_depth: F,
    ) -> Result<SearchResult<G::Move>, SearchError>
    where
        G: GameState,
        F: FnMut(&SearchResult<G::Move>),
    {
        let moves = position.legal_moves();
        let first = *moves.first().ok_or(SearchError::NoLegalMoves)?;

        let deadline = budget.start();
        let max_depth = self.depth_limit(&budget);
        let sign = position.side_to_move().sign();
        self.nodes_searched = 0;

        let mut best = SearchResult {
            best_move: first,
            score: self.evaluator.evaluate(position),
            depth: 0,
            nodes_searched: 0,
            time_elapsed: deadline.elapsed(),
        };

        for depth in 1..=max_depth {
            if deadline.expired() {
                break;
            }

            let (best_move, absolute) = self.search_root(position, &moves, depth);

            best = SearchResult {
                best_move,
                score: absolute * sign,
                depth,
                nodes_searched: self.nodes_searched,
                time_elapsed: deadline.elapsed(),
            };

            debug!(
                depth,
                score = best.score,
                nodes = best.nodes_searched,
                remaining_ms = ?deadline.remaining().map(|left| left.as_millis()),
                best_move = %best.best_move,
                "minimax depth complete"
            );
            on_depth(&best);

            if self.config.stop_on_mate && is_mate_score(absolute) {
                break;
            }
        }

        best.time_elapsed = deadline.elapsed();
        if best.is_degraded() {
            warn!(best_move = %best.best_move, "minimax budget exhausted before depth 1");
        } else {
            info!(
                best_move = %best.best_move,
                score = best.score,
                depth = best.depth,
                nodes = best.nodes_searched,
                "minimax finished"
            );
        }
        Ok(best)
    }

    // Cada lance da raiz com a janela completa; o primeiro ganha os empates
    fn search_root<G: GameState>(&mut self, position: &mut G, moves: &[G::Move], depth: u8) -> (G::Move, i32) {
        let maximizing = position.side_to_move() == Side::White;
        let mut best_move = moves[0];
        let mut best_score = if maximizing { -INFINITY } else { INFINITY };

        for &mv in moves {
            let score = {
                let mut child = AppliedMove::new(position, mv);
                self.alpha_beta(&mut *child, depth - 1, -INFINITY, INFINITY)
            };

            let better = if maximizing { score > best_score } else { score < best_score };
            if better {
                best_score = score;
                best_move = mv;
            }
        }

        (best_move, best_score)
    }

    fn alpha_beta<G: GameState>(&mut self, position: &mut G, depth: u8, mut alpha: i32, mut beta: i32) -> i32 {
        self.nodes_searched += 1;

        let side = position.side_to_move();
        match position.terminal_status() {
            TerminalStatus::CheckmateAgainstSideToMove => return -MATE_VALUE * side.sign(),
            TerminalStatus::None => {}
            _ => return DRAW_VALUE,
        }

        if depth == 0 {
            return self.evaluator.static_score(position);
        }

        let moves = position.legal_moves();
        if side == Side::White {
            let mut value = -INFINITY;
            for mv in moves {
                let score = {
                    let mut child = AppliedMove::new(position, mv);
                    self.alpha_beta(&mut *child, depth - 1, alpha, beta)
                };
                value = value.max(score);
                alpha = alpha.max(value);
                if beta <= alpha {
                    break; // Beta cutoff
                }
            }
            value
        } else {
            let mut value = INFINITY;
            for mv in moves {
                let score = {
                    let mut child = AppliedMove::new(position, mv);
                    self.alpha_beta(&mut *child, depth - 1, alpha, beta)
                };
                value = value.min(score);
                beta = beta.min(value);
                if beta <= alpha {
                    break; // Alpha cutoff
                }
            }
            value
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::evaluation::MATE_THRESHOLD;

    fn game(fen: &str) -> ChessGame {
        ChessGame::from_fen(fen).unwrap()
    }

    // Minimax sem poda, para comparar valores
    fn plain_minimax(position: &mut ChessGame, evaluator: &Evaluator, depth: u8) -> i32 {
        let side = position.side_to_move();
        match position.terminal_status() {
            TerminalStatus::CheckmateAgainstSideToMove => return -MATE_VALUE * side.sign(),
            TerminalStatus::None => {}
            _ => return DRAW_VALUE,
        }
        if depth == 0 {
            return evaluator.static_score(position);
        }
        let scores = position.legal_moves().into_iter().map(|mv| {
            position.apply(mv);
            let score = plain_minimax(position, evaluator, depth - 1);
            position.undo();
            score
        });
        let scores: Vec<i32> = scores.collect();
        if side == Side::White {
            scores.into_iter().max().unwrap()
        } else {
            scores.into_iter().min().unwrap()
        }
    }

    #[test]
    fn test_single_legal_move_is_returned() {
        let mut position = game("7k/8/8/8/8/8/8/K5R1 b - - 0 1");
        let only = position.legal_moves();
        assert_eq!(only.len(), 1);

        let mut search = MinimaxSearch::new(EvaluationScheme::Combined);
        let result = search.find_best_move(&mut position, SearchBudget::depth(3)).unwrap();
        assert_eq!(result.best_move, only[0]);
    }

    #[test]
    fn test_depth_one_picks_best_static_reply() {
        let mut position = game("4k3/8/8/3p4/4P3/8/8/4K3 w - - 0 1");
        let evaluator = Evaluator::new(EvaluationScheme::MaterialCount);

        let mut expected = None;
        let mut expected_score = i32::MIN;
        for mv in position.legal_moves() {
            position.apply(mv);
            let score = evaluator.evaluate_absolute(&position);
            position.undo();
            if score > expected_score {
                expected_score = score;
                expected = Some(mv);
            }
        }

        let mut search = MinimaxSearch::with_evaluator(evaluator);
        let result = search.find_best_move(&mut position, SearchBudget::depth(1)).unwrap();
        assert_eq!(Some(result.best_move), expected);
        assert_eq!(result.score, expected_score);
        assert_eq!(position.format_uci(result.best_move), "e4d5");
    }

    #[test]
    fn test_depth_one_minimises_for_black() {
        let mut position = game("4k3/8/8/3p4/4P3/8/8/4K3 b - - 0 1");
        let mut search = MinimaxSearch::new(EvaluationScheme::MaterialCount);
        let result = search.find_best_move(&mut position, SearchBudget::depth(1)).unwrap();
        assert_eq!(position.format_uci(result.best_move), "d5e4");
        // Do ponto de vista das pretas, ganharam um peão
        assert_eq!(result.score, 100);
    }

    #[test]
    fn test_alpha_beta_matches_plain_minimax() {
        let fen = "r1bqkbnr/pppp1ppp/2n5/4p3/4P3/5N2/PPPP1PPP/RNBQKB1R w KQkq - 2 3";
        let mut position = game(fen);
        let evaluator = Evaluator::new(EvaluationScheme::MaterialCount);
        let expected = plain_minimax(&mut position, &evaluator, 3);

        let mut search = MinimaxSearch::with_evaluator(evaluator);
        let result = search.find_best_move(&mut position, SearchBudget::depth(3)).unwrap();
        assert_eq!(result.depth, 3);
        assert_eq!(result.score * position.side_to_move().sign(), expected);
        assert_eq!(position.fen(), game(fen).fen());
    }

    #[test]
    fn test_startpos_depth_three_material_is_level() {
        let mut position = ChessGame::startpos();
        let mut search = MinimaxSearch::new(EvaluationScheme::MaterialCount);
        let result = search.find_best_move(&mut position, SearchBudget::depth(3)).unwrap();
        assert_eq!(result.score, 0);
        assert_eq!(result.depth, 3);
        assert!(result.nodes_searched > 0);
        assert_eq!(position.ply(), 0);
    }

    #[test]
    fn test_finds_back_rank_mate() {
        let mut white = game("6k1/5ppp/8/8/8/8/8/R5K1 w - - 0 1");
        let mut search = MinimaxSearch::new(EvaluationScheme::MaterialCount);
        let result = search.find_best_move(&mut white, SearchBudget::depth(2)).unwrap();
        assert_eq!(white.format_uci(result.best_move), "a1a8");
        assert!(result.score >= MATE_THRESHOLD);
        assert!(result.is_mate());

        let mut black = game("r5k1/8/8/8/8/8/5PPP/6K1 b - - 0 1");
        let result = search.find_best_move(&mut black, SearchBudget::depth(2)).unwrap();
        assert_eq!(black.format_uci(result.best_move), "a8a1");
        assert!(result.score >= MATE_THRESHOLD);
    }

    #[test]
    fn test_expired_budget_returns_first_move_degraded() {
        let mut position = ChessGame::startpos();
        let first = position.legal_moves()[0];
        let mut search = MinimaxSearch::new(EvaluationScheme::MaterialCount);
        let result = search
            .find_best_move(&mut position, SearchBudget::time(Duration::ZERO))
            .unwrap();
        assert!(result.is_degraded());
        assert_eq!(result.best_move, first);
        assert_eq!(result.depth, 0);
    }

    #[test]
    fn test_no_legal_moves_is_an_error() {
        let mut stalemate = game("7k/5Q2/6K1/8/8/8/8/8 b - - 0 1");
        let mut search = MinimaxSearch::new(EvaluationScheme::MaterialCount);
        let result = search.find_best_move(&mut stalemate, SearchBudget::depth(2));
        assert_eq!(result.unwrap_err(), SearchError::NoLegalMoves);
    }

    #[test]
    fn test_on_depth_reports_each_iteration() {
        let mut position = ChessGame::startpos();
        let mut search = MinimaxSearch::new(EvaluationScheme::MaterialCount);
        let mut depths = Vec::new();
        search
            .find_best_move_with(&mut position, SearchBudget::depth(3), |r| depths.push(r.depth))
            .unwrap();
        assert_eq!(depths, vec![1, 2, 3]);
    }

    #[test]
    fn test_config_depth_used_without_budget_depth() {
        let mut position = ChessGame::startpos();
        let mut search = MinimaxSearch::new(EvaluationScheme::MaterialCount)
            .with_config(MinimaxConfig::default().with_max_depth(2));
        let result = search.find_best_move(&mut position, SearchBudget::default()).unwrap();
        assert_eq!(result.depth, 2);
    }
}
