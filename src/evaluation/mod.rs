// Ficheiro: src/evaluation/mod.rs
// Descrição: Avaliador composto. Um esquema escolhe que termos somar; o
// material está sempre presente e "combined" soma todos os termos uma vez.

pub mod tables;
pub mod terms;

use crate::core::*;
use crate::error::SearchError;
use std::fmt;
use std::str::FromStr;

/// Valor de xeque-mate. Nenhuma avaliação estática chega perto disto.
pub const MATE_VALUE: i32 = 99_999;

/// Pontuações a partir daqui são tratadas como mate.
pub const MATE_THRESHOLD: i32 = 90_000;

pub const DRAW_VALUE: i32 = 0;

/// Termo de avaliação independente.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScoreTerm {
    Material,
    PiecePosition,
    SquareControl,
    PawnStructure,
    KingSafety,
}

impl ScoreTerm {
    pub fn name(self) -> &'static str {
        match self {
            ScoreTerm::Material => "material",
            ScoreTerm::PiecePosition => "piece_position",
            ScoreTerm::SquareControl => "square_control",
            ScoreTerm::PawnStructure => "pawn_structure",
            ScoreTerm::KingSafety => "king_safety",
        }
    }

    /// Pontuação do termo do ponto de vista das brancas.
    pub fn score<G: GameState>(self, game: &G, config: &EvaluatorConfig) -> i32 {
        match self {
            ScoreTerm::Material => terms::material(game),
            ScoreTerm::PiecePosition => terms::piece_position(game, config.mask_bishops),
            ScoreTerm::SquareControl => terms::square_control(game),
            ScoreTerm::PawnStructure => terms::pawn_structure(game),
            ScoreTerm::KingSafety => terms::king_safety(game),
        }
    }
}

impl fmt::Display for ScoreTerm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Esquema de avaliação escolhido por nome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum EvaluationScheme {
    #[default]
    MaterialCount,
    PiecePosition,
    SquareControl,
    PawnStructure,
    KingSafety,
    Combined,
}

impl EvaluationScheme {
    pub const ALL: [EvaluationScheme; 6] = [
        EvaluationScheme::MaterialCount,
        EvaluationScheme::PiecePosition,
        EvaluationScheme::SquareControl,
        EvaluationScheme::PawnStructure,
        EvaluationScheme::KingSafety,
        EvaluationScheme::Combined,
    ];

    /// Termos ativos, por ordem. O material é sempre o primeiro.
    pub fn terms(self) -> &'static [ScoreTerm] {
        match self {
            EvaluationScheme::MaterialCount => &[ScoreTerm::Material],
            EvaluationScheme::PiecePosition => &[ScoreTerm::Material, ScoreTerm::PiecePosition],
            EvaluationScheme::SquareControl => &[ScoreTerm::Material, ScoreTerm::SquareControl],
            EvaluationScheme::PawnStructure => &[ScoreTerm::Material, ScoreTerm::PawnStructure],
            EvaluationScheme::KingSafety => &[ScoreTerm::Material, ScoreTerm::KingSafety],
            EvaluationScheme::Combined => &[
                ScoreTerm::Material,
                ScoreTerm::KingSafety,
                ScoreTerm::PiecePosition,
                ScoreTerm::SquareControl,
                ScoreTerm::PawnStructure,
            ],
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            EvaluationScheme::MaterialCount => "material_count",
            EvaluationScheme::PiecePosition => "piece_position",
            EvaluationScheme::SquareControl => "square_control",
            EvaluationScheme::PawnStructure => "pawn_structure",
            EvaluationScheme::KingSafety => "king_safety",
            EvaluationScheme::Combined => "combined",
        }
    }
}

impl FromStr for EvaluationScheme {
    type Err = SearchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace('-', "_");
        match normalized.as_str() {
            "" | "default" | "material" | "material_count" => Ok(EvaluationScheme::MaterialCount),
            "piece_position" => Ok(EvaluationScheme::PiecePosition),
            "square_control" => Ok(EvaluationScheme::SquareControl),
            "pawn_structure" => Ok(EvaluationScheme::PawnStructure),
            "king_safety" => Ok(EvaluationScheme::KingSafety),
            "combined" => Ok(EvaluationScheme::Combined),
            _ => Err(SearchError::InvalidScheme(s.to_string())),
        }
    }
}

impl fmt::Display for EvaluationScheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, Default)]
pub struct EvaluatorConfig {
    /// Bispos brancos só pontuam em casas claras, pretos só em escuras.
    pub mask_bishops: bool,
}

impl EvaluatorConfig {
    pub fn with_bishop_mask(mut self, mask: bool) -> Self {
        self.mask_bishops = mask;
        self
    }
}

/// Avaliador fixado num esquema durante toda uma busca.
#[derive(Debug, Clone, Default)]
pub struct Evaluator {
    scheme: EvaluationScheme,
    config: EvaluatorConfig,
}

impl Evaluator {
    pub fn new(scheme: EvaluationScheme) -> Self {
        Evaluator {
            scheme,
            config: EvaluatorConfig::default(),
        }
    }

    pub fn with_config(scheme: EvaluationScheme, config: EvaluatorConfig) -> Self {
        Evaluator { scheme, config }
    }

    /// Constrói a partir do nome do esquema; nomes desconhecidos são erro.
    pub fn from_name(name: &str) -> Result<Self, SearchError> {
        Ok(Self::new(name.parse()?))
    }

    pub fn scheme(&self) -> EvaluationScheme {
        self.scheme
    }

    pub fn config(&self) -> &EvaluatorConfig {
        &self.config
    }

    /// Pontuação do ponto de vista de quem vai jogar.
    pub fn evaluate<G: GameState>(&self, game: &G) -> i32 {
        self.evaluate_absolute(game) * game.side_to_move().sign()
    }

    /// Pontuação do ponto de vista das brancas. Mate e empates têm prioridade
    /// sobre qualquer termo.
    pub fn evaluate_absolute<G: GameState>(&self, game: &G) -> i32 {
        match game.terminal_status() {
            TerminalStatus::CheckmateAgainstSideToMove => -MATE_VALUE * game.side_to_move().sign(),
            TerminalStatus::None => self.static_score(game),
            _ => DRAW_VALUE,
        }
    }

    /// Soma dos termos do esquema, sem olhar para o estado terminal.
    pub fn static_score<G: GameState>(&self, game: &G) -> i32 {
        self.scheme
            .terms()
            .iter()
            .map(|term| term.score(game, &self.config))
            .sum()
    }

    /// Contribuição de cada termo (ponto de vista das brancas).
    pub fn breakdown<G: GameState>(&self, game: &G) -> Vec<(ScoreTerm, i32)> {
        self.scheme
            .terms()
            .iter()
            .map(|&term| (term, term.score(game, &self.config)))
            .collect()
    }
}

/// Avalia `game` com `scheme`, do ponto de vista de quem joga.
pub fn evaluate<G: GameState>(game: &G, scheme: EvaluationScheme) -> i32 {
    Evaluator::new(scheme).evaluate(game)
}

pub fn is_mate_score(score: i32) -> bool {
    score.abs() >= MATE_THRESHOLD
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scheme_parsing() {
        assert_eq!("combined".parse::<EvaluationScheme>().unwrap(), EvaluationScheme::Combined);
        assert_eq!("".parse::<EvaluationScheme>().unwrap(), EvaluationScheme::MaterialCount);
        assert_eq!("Pawn-Structure".parse::<EvaluationScheme>().unwrap(), EvaluationScheme::PawnStructure);
        assert_eq!(
            "mobility".parse::<EvaluationScheme>(),
            Err(SearchError::InvalidScheme("mobility".to_string()))
        );
    }

    #[test]
    fn test_every_scheme_includes_material() {
        for scheme in EvaluationScheme::ALL {
            assert_eq!(scheme.terms()[0], ScoreTerm::Material);
        }
        assert_eq!(EvaluationScheme::Combined.terms().len(), 5);
        for scheme in EvaluationScheme::ALL {
            let expected = if scheme == EvaluationScheme::MaterialCount { 1 } else if scheme == EvaluationScheme::Combined { 5 } else { 2 };
            assert_eq!(scheme.terms().len(), expected, "{}", scheme);
        }
    }

    #[test]
    fn test_score_is_from_side_to_move() {
        let white = ChessGame::from_fen("4k3/8/8/8/8/8/8/3QK3 w - - 0 1").unwrap();
        let black = ChessGame::from_fen("4k3/8/8/8/8/8/8/3QK3 b - - 0 1").unwrap();
        let evaluator = Evaluator::new(EvaluationScheme::MaterialCount);
        assert_eq!(evaluator.evaluate(&white), 900);
        assert_eq!(evaluator.evaluate(&black), -900);
        assert_eq!(evaluator.evaluate_absolute(&black), 900);
    }

    #[test]
    fn test_combined_is_sum_of_terms() {
        let game = ChessGame::from_fen("r1bqk2r/pp2bppp/2n1pn2/3p4/2PP4/2N1PN2/PP3PPP/R1BQKB1R w KQkq - 0 7").unwrap();
        let config = EvaluatorConfig::default();
        let expected = terms::material(&game)
            + terms::piece_position(&game, false)
            + terms::square_control(&game)
            + terms::pawn_structure(&game)
            + terms::king_safety(&game);
        let combined = Evaluator::new(EvaluationScheme::Combined);
        assert_eq!(combined.evaluate_absolute(&game), expected);

        let breakdown_sum: i32 = combined.breakdown(&game).iter().map(|(_, s)| s).sum();
        assert_eq!(breakdown_sum, expected);
        assert_eq!(ScoreTerm::Material.score(&game, &config), terms::material(&game));
    }

    #[test]
    fn test_checkmate_overrides_scheme() {
        let mated = ChessGame::from_fen("r1bqkb1r/pppp1Qpp/2n2n2/4p3/2B1P3/8/PPPP1PPP/RNB1K1NR b KQkq - 0 4").unwrap();
        for scheme in EvaluationScheme::ALL {
            assert_eq!(evaluate(&mated, scheme), -MATE_VALUE);
        }
        assert_eq!(Evaluator::new(EvaluationScheme::Combined).evaluate_absolute(&mated), MATE_VALUE);
    }

    #[test]
    fn test_draws_short_circuit() {
        // Rei e bispo contra rei: empate por material, mesmo com vantagem material
        let game = ChessGame::from_fen("8/8/4k3/8/8/3K4/5B2/8 w - - 0 1").unwrap();
        for scheme in EvaluationScheme::ALL {
            assert_eq!(evaluate(&game, scheme), DRAW_VALUE);
        }
        let stalemate = ChessGame::from_fen("7k/5Q2/6K1/8/8/8/8/8 b - - 0 1").unwrap();
        assert_eq!(evaluate(&stalemate, EvaluationScheme::Combined), DRAW_VALUE);
    }
}
