// Ficheiro: src/puzzle/mod.rs
// Descrição: Problemas táticos. O primeiro lance da lista é do adversário; o
// motor tem de encontrar o segundo.

pub mod suite;

use crate::core::{ChessGame, GameError};
use crate::engine::{Engine, EngineKind};
use crate::error::SearchError;
use crate::search::SearchBudget;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

pub use suite::*;

#[derive(Debug, Error)]
pub enum PuzzleError {
    #[error("Invalid puzzle record: {0}")]
    InvalidRecord(String),

    #[error(transparent)]
    Game(#[from] GameError),

    #[error(transparent)]
    Search(#[from] SearchError),

    #[error("Failed to build worker pool: {0}")]
    ThreadPool(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Puzzle {
    pub id: String,
    pub fen: String,
    /// Lances UCI: adversário, resposta esperada, ...
    pub moves: Vec<String>,
    pub rating: u32,
    pub themes: Vec<String>,
}

impl Puzzle {
    pub fn new(fen: &str, moves: &str, rating: u32) -> Self {
        Puzzle {
            id: String::new(),
            fen: fen.trim().to_string(),
            moves: moves.split_whitespace().map(str::to_string).collect(),
            rating,
            themes: Vec::new(),
        }
    }

    pub fn with_id(mut self, id: &str) -> Self {
        self.id = id.to_string();
        self
    }

    pub fn with_themes(mut self, themes: &str) -> Self {
        self.themes = themes.split_whitespace().map(str::to_string).collect();
        self
    }

    pub fn opponent_move(&self) -> Option<&str> {
        self.moves.first().map(String::as_str)
    }

    pub fn expected_reply(&self) -> Option<&str> {
        self.moves.get(1).map(String::as_str)
    }

    /// Posição depois do lance do adversário, pronta para o motor.
    pub fn start_position(&self) -> Result<ChessGame, PuzzleError> {
        let mut game = ChessGame::from_fen(&self.fen)?;
        let opponent = self
            .opponent_move()
            .ok_or_else(|| PuzzleError::InvalidRecord(format!("puzzle '{}' has no moves", self.id)))?;
        game.play_uci(opponent)?;
        Ok(game)
    }
}

/// Linha CSV no formato da base de problemas do lichess:
/// `PuzzleId,FEN,Moves,Rating,RatingDeviation,Popularity,NbPlays,Themes,...`
impl FromStr for Puzzle {
    type Err = PuzzleError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let fields: Vec<&str> = line.trim().split(',').collect();
        if fields.len() < 4 {
            return Err(PuzzleError::InvalidRecord(line.to_string()));
        }

        let rating = fields[3]
            .trim()
            .parse::<u32>()
            .map_err(|_| PuzzleError::InvalidRecord(line.to_string()))?;

        let mut puzzle = Puzzle::new(fields[1], fields[2], rating).with_id(fields[0].trim());
        if let Some(themes) = fields.get(7) {
            puzzle = puzzle.with_themes(themes);
        }
        if puzzle.moves.len() < 2 {
            return Err(PuzzleError::InvalidRecord(line.to_string()));
        }
        Ok(puzzle)
    }
}

/// Tempo dado a um problema conforme a dificuldade.
pub fn time_for_rating(rating: u32) -> Duration {
    if rating > 2000 {
        Duration::from_secs(15)
    } else {
        Duration::from_secs(10)
    }
}

/// Orçamento por omissão: o minimax recebe profundidade e tempo, o MCTS só tempo.
pub fn puzzle_budget(kind: EngineKind, rating: u32, max_depth: u8) -> SearchBudget {
    let limit = time_for_rating(rating);
    match kind {
        EngineKind::Minimax => SearchBudget::depth_and_time(max_depth, limit),
        EngineKind::Mcts => SearchBudget::time(limit),
    }
}

#[derive(Debug, Clone)]
pub struct PuzzleOutcome {
    pub puzzle_id: String,
    pub rating: u32,
    pub expected: String,
    pub played: String,
    pub solved: bool,
    pub time_elapsed: Duration,
    pub degraded: bool,
}

/// Aplica o lance do adversário, pede a resposta ao motor e compara-a com a
/// resposta esperada.
pub fn solve_puzzle(engine: &mut Engine, puzzle: &Puzzle, budget: SearchBudget) -> Result<PuzzleOutcome, PuzzleError> {
    let expected = puzzle
        .expected_reply()
        .ok_or_else(|| PuzzleError::InvalidRecord(format!("puzzle '{}' has no expected reply", puzzle.id)))?
        .to_string();

    let mut position = puzzle.start_position()?;
    let decision = engine.choose_move(&mut position, budget)?;
    let played = position.format_uci(decision.best_move);
    let solved = played == expected;

    debug!(
        puzzle = %puzzle.id,
        engine = %engine.kind(),
        scheme = %engine.scheme(),
        %played,
        %expected,
        solved,
        "puzzle attempted"
    );

    Ok(PuzzleOutcome {
        puzzle_id: puzzle.id.clone(),
        rating: puzzle.rating,
        expected,
        played,
        solved,
        time_elapsed: decision.time_elapsed,
        degraded: decision.degraded,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::GameState;

    // Torre contra peões, brancas a jogar
    const BACK_RANK: &str = "6k1/5pp1/8/7p/8/8/8/R5K1 w - - 0 1";

    #[test]
    fn test_time_for_rating() {
        assert_eq!(time_for_rating(900), Duration::from_secs(10));
        assert_eq!(time_for_rating(1500), Duration::from_secs(10));
        assert_eq!(time_for_rating(2000), Duration::from_secs(10));
        assert_eq!(time_for_rating(2001), Duration::from_secs(15));
    }

    #[test]
    fn test_parse_lichess_line() {
        let line = "00sHx,q3k1nr/1pp1nQpp/3p4/1P2p3/4P3/B1PP1b2/B5PP/5K2 b k - 0 17,e8d7 a2e6 d7d8 f7f8,1760,80,83,72,mate mateIn2 middlegame short,https://lichess.org/yyznGmXs/black#34";
        let puzzle: Puzzle = line.parse().unwrap();
        assert_eq!(puzzle.id, "00sHx");
        assert_eq!(puzzle.rating, 1760);
        assert_eq!(puzzle.opponent_move(), Some("e8d7"));
        assert_eq!(puzzle.expected_reply(), Some("a2e6"));
        assert_eq!(puzzle.themes.len(), 4);
        assert!("bad,line".parse::<Puzzle>().is_err());
    }

    #[test]
    fn test_start_position_applies_opponent_move() {
        let puzzle = Puzzle::new(BACK_RANK, "g1h1 a1a8", 800);
        let position = puzzle.start_position().unwrap();
        assert_eq!(position.ply(), 1);
        assert!(matches!(
            Puzzle::new(BACK_RANK, "e2e4 a1a8", 800).start_position(),
            Err(PuzzleError::Game(GameError::IllegalMove { .. }))
        ));
    }

    #[test]
    fn test_minimax_solves_mate_in_one() {
        // As pretas metem o rei em h8 e sofrem mate de corredor
        let puzzle = Puzzle::new("6k1/5ppp/8/8/8/8/8/R6K b - - 0 1", "g8h8 a1a8", 600).with_id("mate1");
        let position = puzzle.start_position().unwrap();
        assert_eq!(position.side_to_move(), crate::core::Side::White);

        let mut engine = Engine::from_names("minimax", "material_count").unwrap();
        let outcome = solve_puzzle(&mut engine, &puzzle, SearchBudget::depth(2)).unwrap();
        assert!(outcome.solved, "played {}", outcome.played);
        assert_eq!(outcome.puzzle_id, "mate1");
    }

    #[test]
    fn test_puzzle_budget_by_engine() {
        let minimax = puzzle_budget(EngineKind::Minimax, 2100, 4);
        assert_eq!(minimax.max_depth, Some(4));
        assert_eq!(minimax.time_limit, Some(Duration::from_secs(15)));
        let mcts = puzzle_budget(EngineKind::Mcts, 1200, 4);
        assert_eq!(mcts.max_depth, None);
    }
}
