// Ficheiro: src/core/game_state.rs
// Descrição: Contrato que as buscas e o avaliador exigem do motor de regras.

use super::types::*;
use std::fmt;
use std::hash::Hash;
use std::ops::{Deref, DerefMut};

/// Capacidade de jogo consumida pelo núcleo de busca.
///
/// O núcleo nunca altera a posição diretamente: pede `apply`/`undo` e lê o
/// resto através destes métodos. `legal_moves` tem de devolver uma ordem
/// estável para a mesma posição, senão os desempates deixam de ser
/// reprodutíveis.
pub trait GameState: Clone {
    type Move: Copy + Eq + Hash + fmt::Debug + fmt::Display;

    fn legal_moves(&self) -> Vec<Self::Move>;

    /// Executa um lance legal. Cada `apply` tem de ser seguido de exatamente
    /// um `undo` antes de a posição voltar a ser usada pelo chamador.
    fn apply(&mut self, mv: Self::Move);

    fn undo(&mut self);

    fn side_to_move(&self) -> Side;

    fn terminal_status(&self) -> TerminalStatus;

    fn pieces(&self, kind: PieceKind, side: Side) -> Bitboard;

    fn king_location(&self, side: Side) -> Option<Square>;

    /// Casas de origem das peças de `side` que atacam `sq`.
    fn attackers(&self, side: Side, sq: Square) -> Bitboard;

    fn is_attacked(&self, side: Side, sq: Square) -> bool {
        self.attackers(side, sq) != 0
    }

    fn result(&self) -> GameResult {
        GameResult::from_status(self.terminal_status(), self.side_to_move())
    }

    fn is_game_over(&self) -> bool {
        self.terminal_status().is_terminal()
    }
}

/// Lance aplicado com desfazer garantido.
///
/// O `undo` corre no `Drop`, portanto qualquer saída antecipada (corte
/// alfa-beta, posição terminal, `?`) devolve a posição intacta ao chamador.
pub struct AppliedMove<'a, G: GameState> {
    state: &'a mut G,
}

impl<'a, G: GameState> AppliedMove<'a, G> {
    pub fn new(state: &'a mut G, mv: G::Move) -> Self {
        state.apply(mv);
        AppliedMove { state }
    }
}

impl<G: GameState> Deref for AppliedMove<'_, G> {
    type Target = G;

    fn deref(&self) -> &G {
        self.state
    }
}

impl<G: GameState> DerefMut for AppliedMove<'_, G> {
    fn deref_mut(&mut self) -> &mut G {
        self.state
    }
}

impl<G: GameState> Drop for AppliedMove<'_, G> {
    fn drop(&mut self) {
        self.state.undo();
    }
}
