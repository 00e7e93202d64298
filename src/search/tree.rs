// Ficheiro: src/search/tree.rs
// Descrição: Árvore MCTS em arena. Os nós ficam num Vec contíguo e referem-se
// uns aos outros por índice; o pai é só uma referência para a retropropagação.

use crate::core::*;

/// Índice de um nó na arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(pub usize);

/// Nó da árvore de busca.
#[derive(Debug, Clone)]
pub struct SearchNode<G: GameState> {
    pub state: G,
    pub parent: Option<NodeId>,
    /// Lance que levou do pai a este nó (None na raiz).
    pub mv: Option<G::Move>,
    pub children: Vec<NodeId>,
    /// Lances legais ainda sem filho. Com `children` particiona os lances legais.
    pub untried_moves: Vec<G::Move>,
    pub visits: u32,
    pub wins: u32,
}

impl<G: GameState> SearchNode<G> {
    fn new(state: G, parent: Option<NodeId>, mv: Option<G::Move>) -> Self {
        let untried_moves = state.legal_moves();
        SearchNode {
            state,
            parent,
            mv,
            children: Vec::new(),
            untried_moves,
            visits: 0,
            wins: 0,
        }
    }

    pub fn is_fully_expanded(&self) -> bool {
        self.untried_moves.is_empty()
    }
}

/// UCB1 = wins/visits + c·√(ln(parent_visits)/visits).
/// Um filho nunca visitado vale +∞ para ser escolhido primeiro.
#[inline]
pub fn ucb1(wins: u32, visits: u32, parent_visits: u32, exploration: f64) -> f64 {
    if visits == 0 {
        return f64::INFINITY;
    }
    let visits = visits as f64;
    let exploit = wins as f64 / visits;
    let explore = exploration * ((parent_visits.max(1) as f64).ln() / visits).sqrt();
    exploit + explore
}

#[derive(Debug)]
pub struct SearchTree<G: GameState> {
    nodes: Vec<SearchNode<G>>,
}

impl<G: GameState> SearchTree<G> {
    pub fn new(root_state: G) -> Self {
        SearchTree {
            nodes: vec![SearchNode::new(root_state, None, None)],
        }
    }

    #[inline]
    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    #[inline]
    pub fn get(&self, id: NodeId) -> &SearchNode<G> {
        &self.nodes[id.0]
    }

    #[inline]
    pub fn get_mut(&mut self, id: NodeId) -> &mut SearchNode<G> {
        &mut self.nodes[id.0]
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Filho com maior UCB1; o primeiro ganha os empates.
    pub fn select_child(&self, id: NodeId, exploration: f64) -> Option<NodeId> {
        let node = self.get(id);
        let mut best: Option<(NodeId, f64)> = None;

        for &child_id in &node.children {
            let child = self.get(child_id);
            let value = ucb1(child.wins, child.visits, node.visits, exploration);
            match best {
                Some((_, best_value)) if value <= best_value => {}
                _ => best = Some((child_id, value)),
            }
        }

        best.map(|(child_id, _)| child_id)
    }

    /// Tira `mv` dos lances por tentar de `parent` e cria o filho correspondente.
    pub fn expand(&mut self, parent: NodeId, mv: G::Move) -> NodeId {
        let node = self.get_mut(parent);
        if let Some(pos) = node.untried_moves.iter().position(|&m| m == mv) {
            node.untried_moves.remove(pos);
        }

        let mut state = node.state.clone();
        state.apply(mv);

        let child_id = NodeId(self.nodes.len());
        self.nodes.push(SearchNode::new(state, Some(parent), Some(mv)));
        self.get_mut(parent).children.push(child_id);
        child_id
    }

    /// Sobe da folha até à raiz: +1 visita em todos os nós e +1 vitória nos
    /// nós cujo lado a jogar é o vencedor. Empates não dão vitórias.
    pub fn backpropagate(&mut self, leaf: NodeId, winner: Option<Side>) {
        let mut current = Some(leaf);
        while let Some(id) = current {
            let node = self.get_mut(id);
            node.visits += 1;
            if winner == Some(node.state.side_to_move()) {
                node.wins += 1;
            }
            current = node.parent;
        }
    }

    /// Filho da raiz mais visitado; o primeiro ganha os empates.
    pub fn most_visited_child(&self) -> Option<NodeId> {
        let root = self.get(self.root());
        let mut best: Option<NodeId> = None;
        for &child_id in &root.children {
            match best {
                Some(current) if self.get(child_id).visits <= self.get(current).visits => {}
                _ => best = Some(child_id),
            }
        }
        best
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ucb1_prefers_unvisited() {
        assert_eq!(ucb1(0, 0, 10, 1.41), f64::INFINITY);
        let a = ucb1(5, 10, 20, 1.41);
        let b = ucb1(2, 10, 20, 1.41);
        assert!(a > b);
        // Sem exploração só conta a taxa de vitórias
        assert!((ucb1(3, 4, 100, 0.0) - 0.75).abs() < 1e-12);
    }

    #[test]
    fn test_expand_partitions_moves() {
        let mut tree = SearchTree::new(ChessGame::startpos());
        let root = tree.root();
        let first = tree.get(root).untried_moves[0];
        let child = tree.expand(root, first);

        assert_eq!(tree.len(), 2);
        assert_eq!(tree.get(root).untried_moves.len(), 19);
        assert_eq!(tree.get(root).children, vec![child]);
        assert_eq!(tree.get(child).parent, Some(root));
        assert_eq!(tree.get(child).mv, Some(first));
        assert_eq!(tree.get(child).state.side_to_move(), Side::Black);
        assert!(!tree.get(root).untried_moves.contains(&first));
    }

    #[test]
    fn test_backpropagate_credits_side_to_move() {
        let mut tree = SearchTree::new(ChessGame::startpos());
        let root = tree.root();
        let mv = tree.get(root).untried_moves[0];
        let child = tree.expand(root, mv);

        tree.backpropagate(child, Some(Side::White));
        assert_eq!(tree.get(root).visits, 1);
        assert_eq!(tree.get(root).wins, 1);
        assert_eq!(tree.get(child).visits, 1);
        assert_eq!(tree.get(child).wins, 0);

        tree.backpropagate(child, None);
        assert_eq!(tree.get(root).visits, 2);
        assert_eq!(tree.get(root).wins, 1);
        assert_eq!(tree.get(child).wins, 0);
    }

    #[test]
    fn test_most_visited_keeps_first_on_ties() {
        let mut tree = SearchTree::new(ChessGame::startpos());
        let root = tree.root();
        let moves: Vec<_> = tree.get(root).untried_moves[..3].to_vec();
        let ids: Vec<_> = moves.iter().map(|&mv| tree.expand(root, mv)).collect();

        tree.backpropagate(ids[1], None);
        tree.backpropagate(ids[2], None);
        assert_eq!(tree.most_visited_child(), Some(ids[1]));

        tree.backpropagate(ids[2], None);
        assert_eq!(tree.most_visited_child(), Some(ids[2]));
    }
}
