// Termos de avaliação. Cada termo é puro e devolve a pontuação do ponto de
// vista das brancas, independentemente de quem joga.

use super::tables;
use crate::core::*;

pub const DOUBLED_PAWN_PENALTY: i32 = -10;
pub const ISOLATED_PAWN_PENALTY: i32 = -20;
pub const MISSING_SHIELD_PENALTY: i32 = -1;

const FILE_A: Bitboard = 0x0101_0101_0101_0101;

#[inline]
fn file_mask(file: u8) -> Bitboard {
    FILE_A << file
}

/// Material: Σ (brancas − pretas) × valor. O rei vale 0.
pub fn material<G: GameState>(game: &G) -> i32 {
    PieceKind::ALL
        .iter()
        .map(|&kind| {
            let white = game.pieces(kind, Side::White).count_ones() as i32;
            let black = game.pieces(kind, Side::Black).count_ones() as i32;
            (white - black) * kind.value()
        })
        .sum()
}

/// Tabelas peça-casa: a mesma casa da tabela para as duas cores, subtraída
/// para as pretas. Com `mask_bishops`, os bispos brancos só pontuam em casas
/// claras e os pretos só em casas escuras.
pub fn piece_position<G: GameState>(game: &G, mask_bishops: bool) -> i32 {
    let mut score = 0;

    for side in [Side::White, Side::Black] {
        for kind in PieceKind::ALL {
            let mut bb = game.pieces(kind, side);
            if mask_bishops && kind == PieceKind::Bishop {
                bb &= match side {
                    Side::White => LIGHT_SQUARES,
                    Side::Black => DARK_SQUARES,
                };
            }

            while bb != 0 {
                let sq = bb.trailing_zeros() as Square;
                bb &= bb - 1;
                score += side.sign() * tables::lookup(kind, sq);
            }
        }
    }

    score
}

/// Controlo de casas: número de atacantes (brancas − pretas) em cada casa,
/// mais o termo de presença, que soma 1 por casa atacada pelas pretas e
/// subtrai 1 por casa atacada pelas brancas.
pub fn square_control<G: GameState>(game: &G) -> i32 {
    let mut reinforcement = 0;
    let mut weakening = 0;

    for sq in 0..64u8 {
        let white = game.attackers(Side::White, sq);
        let black = game.attackers(Side::Black, sq);

        reinforcement += white.count_ones() as i32 - black.count_ones() as i32;
        if white != 0 {
            weakening -= 1;
        }
        if black != 0 {
            weakening += 1;
        }
    }

    reinforcement + weakening
}

/// Peões dobrados: por coluna com n ≥ 2 peões conta n − 1.
pub fn count_doubled_pawns(pawns: Bitboard) -> i32 {
    (0..8u8)
        .map(|file| (pawns & file_mask(file)).count_ones() as i32)
        .filter(|&n| n > 1)
        .map(|n| n - 1)
        .sum()
}

/// Peões isolados: peões sem peão amigo nas colunas adjacentes.
pub fn count_isolated_pawns(pawns: Bitboard) -> i32 {
    (0..8u8)
        .map(|file| {
            let mut neighbours = 0;
            if file > 0 {
                neighbours |= file_mask(file - 1);
            }
            if file < 7 {
                neighbours |= file_mask(file + 1);
            }
            if pawns & neighbours == 0 {
                (pawns & file_mask(file)).count_ones() as i32
            } else {
                0
            }
        })
        .sum()
}

pub fn pawn_structure<G: GameState>(game: &G) -> i32 {
    let white = game.pieces(PieceKind::Pawn, Side::White);
    let black = game.pieces(PieceKind::Pawn, Side::Black);

    let doubled = count_doubled_pawns(white) - count_doubled_pawns(black);
    let isolated = count_isolated_pawns(white) - count_isolated_pawns(black);

    doubled * DOUBLED_PAWN_PENALTY + isolated * ISOLATED_PAWN_PENALTY
}

/// Casas do escudo de peões em falta à volta do rei de `side`: colunas do rei
/// ±1 e as filas do rei e a seguinte no sentido do avanço.
pub fn missing_shield_squares<G: GameState>(game: &G, side: Side) -> i32 {
    let king = match game.king_location(side) {
        Some(sq) => sq,
        None => return 0,
    };
    let pawns = game.pieces(PieceKind::Pawn, side);

    let king_file = square_file(king) as i32;
    let king_rank = square_rank(king) as i32;
    let forward = match side {
        Side::White => 1,
        Side::Black => -1,
    };

    let mut missing = 0;
    for file in (king_file - 1).max(0)..=(king_file + 1).min(7) {
        for rank in [king_rank, king_rank + forward] {
            if !(0..8).contains(&rank) {
                continue;
            }
            let sq = make_square(file as u8, rank as u8);
            if pawns & (1u64 << sq) == 0 {
                missing += 1;
            }
        }
    }
    missing
}

pub fn king_safety<G: GameState>(game: &G) -> i32 {
    let white = missing_shield_squares(game, Side::White) * MISSING_SHIELD_PENALTY;
    let black = missing_shield_squares(game, Side::Black) * MISSING_SHIELD_PENALTY;
    white - black
}
