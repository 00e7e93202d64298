// Ficheiro: src/core/board.rs
// Descrição: Adaptador `ChessGame` sobre o cozy-chess. As regras (geração de
// lances, legalidade, xeque) ficam no cozy-chess; aqui só se acrescenta a pilha
// de desfazer, o histórico para repetições e a classificação de empates.

use super::game_state::GameState;
use super::types::*;
use cozy_chess::{
    get_bishop_moves, get_king_moves, get_knight_moves, get_pawn_attacks, get_rook_moves, Board,
    Color, File, Move, Piece,
};
use thiserror::Error;

pub const START_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

// 75 lances de cada lado sem captura nem avanço de peão
const SEVENTY_FIVE_MOVE_PLIES: u16 = 150;
const FIVEFOLD: usize = 5;
// Maior relógio de meios-lances que o cozy-chess aceita num FEN
const COZY_MAX_HALFMOVE: u16 = 100;

/// Erros do adaptador de regras.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GameError {
    #[error("Invalid FEN '{fen}': {reason}")]
    InvalidFen { fen: String, reason: String },

    #[error("Malformed move: {0}")]
    MalformedMove(String),

    #[error("Illegal move {mv} in position {fen}")]
    IllegalMove { mv: String, fen: String },
}

// Estado guardado antes de cada lance (copy-make)
#[derive(Debug, Clone)]
struct UndoInfo {
    board: Board,
    halfmove_clock: u16,
}

/// Posição de xadrez com desfazer e histórico.
#[derive(Debug, Clone)]
pub struct ChessGame {
    board: Board,
    // O cozy-chess não conta para além de 100 meios-lances
    halfmove_clock: u16,
    history: Vec<UndoInfo>,
}

impl ChessGame {
    /// Posição inicial padrão.
    pub fn startpos() -> Self {
        ChessGame {
            board: Board::default(),
            halfmove_clock: 0,
            history: Vec::new(),
        }
    }

    /// Cria uma posição a partir de uma string FEN. Relógios entre 101 e 149
    /// são legais (janela dos 75 lances): o cozy-chess recebe 100 e o valor
    /// real fica em `halfmove_clock`.
    pub fn from_fen(fen: &str) -> Result<Self, GameError> {
        let mut fields: Vec<&str> = fen.split_whitespace().collect();
        let mut clock_override = None;
        if let Some(clock) = fields.get(4).and_then(|field| field.parse::<u16>().ok()) {
            if clock > COZY_MAX_HALFMOVE {
                fields[4] = "100";
                clock_override = Some(clock);
            }
        }

        let board = Board::from_fen(&fields.join(" "), false).map_err(|e| GameError::InvalidFen {
            fen: fen.to_string(),
            reason: format!("{:?}", e),
        })?;
        let halfmove_clock = clock_override.unwrap_or(board.halfmove_clock() as u16);
        Ok(ChessGame {
            board,
            halfmove_clock,
            history: Vec::new(),
        })
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn fen(&self) -> String {
        let fen = self.board.to_string();
        if self.halfmove_clock <= COZY_MAX_HALFMOVE {
            return fen;
        }
        let mut fields: Vec<String> = fen.split_whitespace().map(str::to_string).collect();
        if let Some(clock) = fields.get_mut(4) {
            *clock = self.halfmove_clock.to_string();
        }
        fields.join(" ")
    }

    pub fn halfmove_clock(&self) -> u16 {
        self.halfmove_clock
    }

    /// Número de lances aplicados desde a posição de origem.
    pub fn ply(&self) -> usize {
        self.history.len()
    }

    /// Interpreta um lance em notação UCI (roque como e1g1).
    pub fn parse_uci(&self, text: &str) -> Result<Move, GameError> {
        let text = text.trim();
        let mut mv: Move = text
            .parse()
            .map_err(|_| GameError::MalformedMove(text.to_string()))?;

        // O cozy-chess codifica o roque como "rei captura a própria torre"
        let is_king = self.board.piece_on(mv.from) == Some(Piece::King);
        if is_king && mv.from.rank() == mv.to.rank() && mv.from.file() == File::E {
            let rook_file = match mv.to.file() {
                File::G => Some(File::H),
                File::C => Some(File::A),
                _ => None,
            };
            if let Some(rook_file) = rook_file {
                let castle = Move {
                    from: mv.from,
                    to: cozy_chess::Square::new(rook_file, mv.from.rank()),
                    promotion: None,
                };
                if self.board.is_legal(castle) {
                    mv = castle;
                }
            }
        }

        if !self.board.is_legal(mv) {
            return Err(GameError::IllegalMove {
                mv: text.to_string(),
                fen: self.fen(),
            });
        }
        Ok(mv)
    }

    /// Formata um lance legal desta posição em notação UCI padrão.
    pub fn format_uci(&self, mv: Move) -> String {
        let mut mv = mv;
        let side = self.board.side_to_move();
        if self.board.piece_on(mv.from) == Some(Piece::King) && self.board.color_on(mv.to) == Some(side) {
            let file = if mv.to.file() as usize > mv.from.file() as usize { File::G } else { File::C };
            mv.to = cozy_chess::Square::new(file, mv.from.rank());
        }
        mv.to_string()
    }

    /// Aplica um lance verificando a legalidade.
    pub fn play(&mut self, mv: Move) -> Result<(), GameError> {
        if !self.board.is_legal(mv) {
            return Err(GameError::IllegalMove {
                mv: self.format_uci(mv),
                fen: self.fen(),
            });
        }
        self.apply(mv);
        Ok(())
    }

    /// Interpreta e aplica um lance UCI.
    pub fn play_uci(&mut self, text: &str) -> Result<Move, GameError> {
        let mv = self.parse_uci(text)?;
        self.apply(mv);
        Ok(mv)
    }

    fn has_legal_moves(&self) -> bool {
        // generate_moves devolve true quando o listener interrompe
        self.board.generate_moves(|_| true)
    }

    fn in_check(&self) -> bool {
        !self.board.checkers().is_empty()
    }

    fn is_irreversible(&self, mv: Move) -> bool {
        let side = self.board.side_to_move();
        self.board.piece_on(mv.from) == Some(Piece::Pawn) || self.board.color_on(mv.to) == Some(!side)
    }

    /// Material insuficiente para qualquer um dos lados dar mate.
    pub fn is_insufficient_material(&self) -> bool {
        self.side_has_insufficient_material(Color::White)
            && self.side_has_insufficient_material(Color::Black)
    }

    fn side_has_insufficient_material(&self, color: Color) -> bool {
        let board = &self.board;
        let own = board.colors(color);
        let enemy = board.colors(!color);
        let heavy = board.pieces(Piece::Pawn) | board.pieces(Piece::Rook) | board.pieces(Piece::Queen);

        if !(own & heavy).is_empty() {
            return false;
        }

        if !(own & board.pieces(Piece::Knight)).is_empty() {
            // Cavalo só mata com bloqueadores do adversário
            let enemy_blockers = enemy & !board.pieces(Piece::King) & !board.pieces(Piece::Queen);
            return own.len() <= 2 && enemy_blockers.is_empty();
        }

        let bishops = board.pieces(Piece::Bishop);
        if !(own & bishops).is_empty() {
            // Bispos todos na mesma cor de casa e sem peões/cavalos adversários
            let same_colour = (bishops.0 & DARK_SQUARES) == 0 || (bishops.0 & LIGHT_SQUARES) == 0;
            let enemy_helpers = enemy & (board.pieces(Piece::Pawn) | board.pieces(Piece::Knight));
            return same_colour && enemy_helpers.is_empty();
        }

        // Só o rei
        true
    }

    fn is_fivefold_repetition(&self) -> bool {
        let key = self.board.hash();
        let reversible = (self.halfmove_clock as usize).min(self.history.len());
        let repeats = self.history[self.history.len() - reversible..]
            .iter()
            .filter(|undo| undo.board.hash() == key)
            .count();
        repeats + 1 >= FIVEFOLD
    }
}

impl Default for ChessGame {
    fn default() -> Self {
        Self::startpos()
    }
}

#[inline]
fn to_cozy(sq: Square) -> cozy_chess::Square {
    cozy_chess::Square::index(sq as usize)
}

impl GameState for ChessGame {
    type Move = Move;

    fn legal_moves(&self) -> Vec<Move> {
        let mut moves = Vec::with_capacity(64);
        self.board.generate_moves(|piece_moves| {
            moves.extend(piece_moves);
            false
        });
        moves
    }

    fn apply(&mut self, mv: Move) {
        debug_assert!(self.board.is_legal(mv), "illegal move {} applied", mv);
        let irreversible = self.is_irreversible(mv);
        self.history.push(UndoInfo {
            board: self.board.clone(),
            halfmove_clock: self.halfmove_clock,
        });
        self.board.play_unchecked(mv);
        self.halfmove_clock = if irreversible { 0 } else { self.halfmove_clock + 1 };
    }

    fn undo(&mut self) {
        // Undo sem apply correspondente é um erro de lógica fatal
        let undo = self.history.pop().expect("undo without a matching apply");
        self.board = undo.board;
        self.halfmove_clock = undo.halfmove_clock;
    }

    fn side_to_move(&self) -> Side {
        self.board.side_to_move().into()
    }

    fn terminal_status(&self) -> TerminalStatus {
        if !self.has_legal_moves() {
            return if self.in_check() {
                TerminalStatus::CheckmateAgainstSideToMove
            } else {
                TerminalStatus::Stalemate
            };
        }
        if self.is_insufficient_material() {
            return TerminalStatus::InsufficientMaterial;
        }
        if self.halfmove_clock >= SEVENTY_FIVE_MOVE_PLIES {
            return TerminalStatus::SeventyFiveMove;
        }
        if self.is_fivefold_repetition() {
            return TerminalStatus::FivefoldRepetition;
        }
        TerminalStatus::None
    }

    fn pieces(&self, kind: PieceKind, side: Side) -> Bitboard {
        self.board.colored_pieces(side.into(), kind.into()).0
    }

    fn king_location(&self, side: Side) -> Option<Square> {
        let kings = self.board.colored_pieces(side.into(), Piece::King);
        kings.into_iter().next().map(|sq| sq as u8)
    }

    fn attackers(&self, side: Side, sq: Square) -> Bitboard {
        let board = &self.board;
        let color: Color = side.into();
        let square = to_cozy(sq);
        let occupied = board.occupied();
        let own = |piece: Piece| board.colored_pieces(color, piece);

        let diagonal = own(Piece::Bishop) | own(Piece::Queen);
        let orthogonal = own(Piece::Rook) | own(Piece::Queen);

        // Peões de `side` que atacam a casa estão onde um peão adversário nela atacaria
        let attackers = (get_pawn_attacks(square, !color) & own(Piece::Pawn))
            | (get_knight_moves(square) & own(Piece::Knight))
            | (get_king_moves(square) & own(Piece::King))
            | (get_bishop_moves(square, occupied) & diagonal)
            | (get_rook_moves(square, occupied) & orthogonal);
        attackers.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_startpos_has_twenty_moves() {
        let game = ChessGame::startpos();
        assert_eq!(game.legal_moves().len(), 20);
        assert_eq!(game.side_to_move(), Side::White);
        assert_eq!(game.terminal_status(), TerminalStatus::None);
    }

    #[test]
    fn test_apply_undo_restores_position() {
        let mut game = ChessGame::startpos();
        let before = game.fen();
        let mv = game.parse_uci("e2e4").unwrap();
        game.apply(mv);
        assert_eq!(game.side_to_move(), Side::Black);
        game.undo();
        assert_eq!(game.fen(), before);
        assert_eq!(game.ply(), 0);
    }

    #[test]
    fn test_invalid_fen_is_rejected() {
        assert!(matches!(ChessGame::from_fen("not a fen"), Err(GameError::InvalidFen { .. })));
    }

    #[test]
    fn test_castling_uses_standard_uci() {
        let game = ChessGame::from_fen("r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1").unwrap();
        let mv = game.parse_uci("e1g1").unwrap();
        assert_eq!(game.format_uci(mv), "e1g1");
        let long = game.parse_uci("e1c1").unwrap();
        assert_eq!(game.format_uci(long), "e1c1");
    }

    #[test]
    fn test_illegal_move_is_rejected() {
        let game = ChessGame::startpos();
        assert!(matches!(game.parse_uci("e2e5"), Err(GameError::IllegalMove { .. })));
        assert!(matches!(game.parse_uci("zz"), Err(GameError::MalformedMove(_))));
    }

    #[test]
    fn test_checkmate_detected() {
        // Mate do pastor
        let game = ChessGame::from_fen("r1bqkb1r/pppp1Qpp/2n2n2/4p3/2B1P3/8/PPPP1PPP/RNB1K1NR b KQkq - 0 4").unwrap();
        assert_eq!(game.terminal_status(), TerminalStatus::CheckmateAgainstSideToMove);
        assert_eq!(game.result(), GameResult::FirstPlayerWins);
    }

    #[test]
    fn test_stalemate_detected() {
        let game = ChessGame::from_fen("7k/5Q2/6K1/8/8/8/8/8 b - - 0 1").unwrap();
        assert_eq!(game.terminal_status(), TerminalStatus::Stalemate);
    }

    #[test]
    fn test_insufficient_material() {
        let kk = ChessGame::from_fen("8/8/4k3/8/8/3K4/8/8 w - - 0 1").unwrap();
        assert_eq!(kk.terminal_status(), TerminalStatus::InsufficientMaterial);

        let knight = ChessGame::from_fen("8/8/4k3/8/8/3K4/5N2/8 w - - 0 1").unwrap();
        assert!(knight.is_insufficient_material());

        let rook = ChessGame::from_fen("8/8/4k3/8/8/3K4/5R2/8 w - - 0 1").unwrap();
        assert!(!rook.is_insufficient_material());
    }

    #[test]
    fn test_fivefold_repetition() {
        let mut game = ChessGame::from_fen("4k3/8/8/8/8/8/8/R3K3 w - - 0 1").unwrap();
        // Torre e rei vão e voltam: a posição inicial repete-se a cada 4 meios-lances
        for _ in 0..4 {
            for uci in ["a1a2", "e8d8", "a2a1", "d8e8"] {
                game.play_uci(uci).unwrap();
            }
        }
        assert_eq!(game.terminal_status(), TerminalStatus::FivefoldRepetition);
        game.undo();
        assert_eq!(game.terminal_status(), TerminalStatus::None);
    }

    #[test]
    fn test_clock_above_one_hundred_is_kept() {
        let game = ChessGame::from_fen("4k3/8/8/8/8/8/8/R3K3 w - - 120 100").unwrap();
        assert_eq!(game.halfmove_clock(), 120);
        assert_eq!(game.fen(), "4k3/8/8/8/8/8/8/R3K3 w - - 120 100");
        assert_eq!(game.terminal_status(), TerminalStatus::None);
    }

    #[test]
    fn test_seventy_five_move_rule() {
        let mut game = ChessGame::from_fen("4k3/8/8/8/8/8/8/R3K3 w - - 149 100").unwrap();
        assert_eq!(game.terminal_status(), TerminalStatus::None);

        game.play_uci("a1a2").unwrap();
        assert_eq!(game.halfmove_clock(), 150);
        assert_eq!(game.terminal_status(), TerminalStatus::SeventyFiveMove);
        assert_eq!(game.result(), GameResult::Draw);

        game.undo();
        assert_eq!(game.halfmove_clock(), 149);

        let reached = ChessGame::from_fen("4k3/8/8/8/8/8/8/R3K3 b - - 150 100").unwrap();
        assert_eq!(reached.terminal_status(), TerminalStatus::SeventyFiveMove);
    }

    #[test]
    fn test_attackers_include_defenders() {
        let game = ChessGame::startpos();
        // e2 é defendido pelo rei, dama, bispo f1 e cavalo g1
        let e2 = make_square(4, 1);
        assert_eq!(game.attackers(Side::White, e2).count_ones(), 4);
        assert!(!game.is_attacked(Side::Black, e2));
        // f6 é atacado pelos peões e7/g7 e pelo cavalo g8
        let f6 = make_square(5, 5);
        assert_eq!(game.attackers(Side::Black, f6).count_ones(), 3);
    }

    #[test]
    fn test_king_location() {
        let game = ChessGame::startpos();
        assert_eq!(game.king_location(Side::White), Some(4));
        assert_eq!(game.king_location(Side::Black), Some(60));
    }
}
