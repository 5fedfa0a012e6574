//! Perft (performance test) for move generation correctness verification.

use crate::movegen::{MoveList, legal_moves, pseudo_legal_moves, remove_illegal};
use crate::position::Position;

/// Count the number of leaf nodes at the given depth.
///
/// Depth 0 returns 1. Depth 1 returns the number of legal moves without
/// playing them.
pub fn perft(pos: &mut Position, depth: usize) -> u64 {
    if depth == 0 {
        return 1;
    }
    let mut moves = MoveList::new();
    pseudo_legal_moves(pos, &mut moves);
    remove_illegal(pos, &mut moves);
    if depth == 1 {
        return moves.len() as u64;
    }

    let mut nodes = 0u64;
    for &mv in &moves {
        let undo = pos.make_move(mv);
        nodes += perft(pos, depth - 1);
        pos.unmake_move(mv, &undo);
    }
    nodes
}

/// Run perft with per-move breakdown.
///
/// Returns `(uci_move, node_count)` pairs sorted alphabetically.
pub fn divide(pos: &mut Position, depth: usize) -> Vec<(String, u64)> {
    let moves = legal_moves(pos);
    let mut results: Vec<(String, u64)> = moves
        .iter()
        .map(|&mv| {
            let undo = pos.make_move(mv);
            let count = if depth <= 1 { 1 } else { perft(pos, depth - 1) };
            pos.unmake_move(mv, &undo);
            (mv.to_uci(), count)
        })
        .collect();
    results.sort_by(|a, b| a.0.cmp(&b.0));
    results
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fen::START_FEN;
    use crate::tables::Tables;

    fn position(fen: &str) -> Position {
        Position::from_fen(fen, Tables::shared().unwrap()).unwrap()
    }

    // --- Position 1: Starting position ---

    #[test]
    fn perft_startpos_shallow() {
        let mut pos = position(START_FEN);
        assert_eq!(perft(&mut pos, 1), 20);
        assert_eq!(perft(&mut pos, 2), 400);
        assert_eq!(perft(&mut pos, 3), 8_902);
    }

    #[test]
    fn perft_startpos_depth_4() {
        let mut pos = position(START_FEN);
        assert_eq!(perft(&mut pos, 4), 197_281);
    }

    #[test]
    fn perft_startpos_depth_5() {
        let mut pos = position(START_FEN);
        assert_eq!(perft(&mut pos, 5), 4_865_609);
    }

    // --- Position 2: Kiwipete ---

    fn kiwipete() -> Position {
        position("r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1")
    }

    #[test]
    fn perft_kiwipete_shallow() {
        let mut pos = kiwipete();
        assert_eq!(perft(&mut pos, 1), 48);
        assert_eq!(perft(&mut pos, 2), 2_039);
    }

    #[test]
    fn perft_kiwipete_depth_3() {
        assert_eq!(perft(&mut kiwipete(), 3), 97_862);
    }

    // Slow in debug builds; run with `cargo test --release -- --ignored`.
    #[test]
    #[ignore]
    fn perft_kiwipete_depth_4() {
        assert_eq!(perft(&mut kiwipete(), 4), 4_085_603);
    }

    // --- Position 3 ---

    #[test]
    fn perft_pos3() {
        let mut pos = position("8/2p5/3p4/KP5r/1R3p1k/8/4P1P1/8 w - - 0 1");
        assert_eq!(perft(&mut pos, 1), 14);
        assert_eq!(perft(&mut pos, 2), 191);
        assert_eq!(perft(&mut pos, 3), 2_812);
        assert_eq!(perft(&mut pos, 4), 43_238);
    }

    // --- Position 4 ---

    #[test]
    fn perft_pos4() {
        let mut pos = position("r3k2r/Pppp1ppp/1b3nbN/nP6/BBP1P3/q4N2/Pp1P2PP/R2Q1RK1 w kq - 0 1");
        assert_eq!(perft(&mut pos, 1), 6);
        assert_eq!(perft(&mut pos, 2), 264);
        assert_eq!(perft(&mut pos, 3), 9_467);
    }

    // --- Position 5 ---

    #[test]
    fn perft_pos5() {
        let mut pos = position("rnbq1k1r/pp1Pbppp/2p5/8/2B5/8/PPP1NnPP/RNBQK2R w KQ - 1 8");
        assert_eq!(perft(&mut pos, 1), 44);
        assert_eq!(perft(&mut pos, 2), 1_486);
        assert_eq!(perft(&mut pos, 3), 62_379);
    }

    // --- divide test ---

    #[test]
    fn divide_sums_to_perft() {
        let mut pos = position(START_FEN);
        let results = divide(&mut pos, 3);
        assert_eq!(results.len(), 20);
        let total: u64 = results.iter().map(|(_, n)| n).sum();
        assert_eq!(total, 8_902);
        assert_eq!(results[0].0, "a2a3");
    }

    #[test]
    fn perft_restores_position() {
        let mut pos = kiwipete();
        let before = pos.clone();
        perft(&mut pos, 2);
        assert_eq!(pos, before);
        assert_eq!(pos.to_fen(), before.to_fen());
    }
}
