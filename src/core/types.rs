// Ficheiro: src/core/types.rs
// Descrição: Tipos fundamentais partilhados entre o avaliador e as buscas.

// Um Bitboard é um inteiro de 64 bits sem sinal. Cada bit representa uma casa.
// Bit 0 = a1, Bit 1 = b1, ..., Bit 63 = h8.
pub type Bitboard = u64;

// Índice de casa 0..64, mesma ordem dos bits do Bitboard.
pub type Square = u8;

pub const LIGHT_SQUARES: Bitboard = 0x55AA_55AA_55AA_55AA;
pub const DARK_SQUARES: Bitboard = !LIGHT_SQUARES;

#[inline]
pub fn square_file(sq: Square) -> u8 {
    sq % 8
}

#[inline]
pub fn square_rank(sq: Square) -> u8 {
    sq / 8
}

#[inline]
pub fn make_square(file: u8, rank: u8) -> Square {
    rank * 8 + file
}

/// Lado do jogo. `White` é o primeiro jogador, `Black` o segundo.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    White,
    Black,
}

impl Side {
    /// +1 para o primeiro jogador, -1 para o segundo.
    /// Converte pontuações absolutas para a perspetiva de quem joga.
    #[inline]
    pub fn sign(self) -> i32 {
        match self {
            Side::White => 1,
            Side::Black => -1,
        }
    }
}

impl std::ops::Not for Side {
    type Output = Side;

    fn not(self) -> Self::Output {
        match self {
            Side::White => Side::Black,
            Side::Black => Side::White,
        }
    }
}

impl From<cozy_chess::Color> for Side {
    fn from(color: cozy_chess::Color) -> Self {
        match color {
            cozy_chess::Color::White => Side::White,
            cozy_chess::Color::Black => Side::Black,
        }
    }
}

impl From<Side> for cozy_chess::Color {
    fn from(side: Side) -> Self {
        match side {
            Side::White => cozy_chess::Color::White,
            Side::Black => cozy_chess::Color::Black,
        }
    }
}

// Enum para representar o tipo de uma peça de xadrez.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PieceKind {
    Pawn,
    Knight,
    Bishop,
    Rook,
    Queen,
    King,
}

impl PieceKind {
    pub const ALL: [PieceKind; 6] = [
        PieceKind::Pawn,
        PieceKind::Knight,
        PieceKind::Bishop,
        PieceKind::Rook,
        PieceKind::Queen,
        PieceKind::King,
    ];

    /// Valor material em centipawns. O rei não entra na contagem.
    pub fn value(&self) -> i32 {
        match self {
            PieceKind::Pawn   => 100,
            PieceKind::Knight => 320,
            PieceKind::Bishop => 330,
            PieceKind::Rook   => 500,
            PieceKind::Queen  => 900,
            PieceKind::King   => 0,
        }
    }
}

impl From<PieceKind> for cozy_chess::Piece {
    fn from(kind: PieceKind) -> Self {
        match kind {
            PieceKind::Pawn => cozy_chess::Piece::Pawn,
            PieceKind::Knight => cozy_chess::Piece::Knight,
            PieceKind::Bishop => cozy_chess::Piece::Bishop,
            PieceKind::Rook => cozy_chess::Piece::Rook,
            PieceKind::Queen => cozy_chess::Piece::Queen,
            PieceKind::King => cozy_chess::Piece::King,
        }
    }
}

/// Classificação de fim de jogo reportada pelo motor de regras.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TerminalStatus {
    None,
    /// O lado a jogar está em xeque-mate.
    CheckmateAgainstSideToMove,
    Stalemate,
    InsufficientMaterial,
    SeventyFiveMove,
    FivefoldRepetition,
}

impl TerminalStatus {
    pub fn is_terminal(self) -> bool {
        self != TerminalStatus::None
    }

    pub fn is_draw(self) -> bool {
        matches!(
            self,
            TerminalStatus::Stalemate
                | TerminalStatus::InsufficientMaterial
                | TerminalStatus::SeventyFiveMove
                | TerminalStatus::FivefoldRepetition
        )
    }
}

/// Resultado de uma partida do ponto de vista do primeiro jogador.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameResult {
    FirstPlayerWins,
    SecondPlayerWins,
    Draw,
    Ongoing,
}

impl GameResult {
    /// Lado vencedor, se houver.
    pub fn winner(self) -> Option<Side> {
        match self {
            GameResult::FirstPlayerWins => Some(Side::White),
            GameResult::SecondPlayerWins => Some(Side::Black),
            GameResult::Draw | GameResult::Ongoing => None,
        }
    }

    pub fn from_status(status: TerminalStatus, side_to_move: Side) -> Self {
        match status {
            TerminalStatus::None => GameResult::Ongoing,
            TerminalStatus::CheckmateAgainstSideToMove => match side_to_move {
                Side::White => GameResult::SecondPlayerWins,
                Side::Black => GameResult::FirstPlayerWins,
            },
            status if status.is_draw() => GameResult::Draw,
            _ => GameResult::Ongoing,
        }
    }
}

impl std::fmt::Display for GameResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let text = match self {
            GameResult::FirstPlayerWins => "1-0",
            GameResult::SecondPlayerWins => "0-1",
            GameResult::Draw => "1/2-1/2",
            GameResult::Ongoing => "*",
        };
        f.write_str(text)
    }
}
