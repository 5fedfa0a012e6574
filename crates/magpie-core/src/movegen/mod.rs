//! Pseudo-legal move generation, legality filtering and check detection.
//!
//! Every generator stops early when the side to move can capture the
//! enemy king: the list is then reduced to that single capture, which lets
//! the search refute the previous (illegal) move immediately.

mod check;
mod generator;
mod pawns;

use crate::bitboard::Bitboard;
use crate::chess_move::Move;
use crate::color::Color;
use crate::piece_kind::PieceKind;
use crate::position::Position;

use self::generator::Generator;

pub use self::check::gives_check;

/// Capacity of a [`MoveList`]. The most moves known in a legal position is
/// 218.
pub const MAX_MOVES: usize = 256;

/// Stack-allocated buffer for generated moves.
#[derive(Clone)]
pub struct MoveList {
    moves: [Move; MAX_MOVES],
    len: u16,
}

impl MoveList {
    /// Create an empty move list.
    pub fn new() -> MoveList {
        MoveList {
            moves: [Move::EMPTY; MAX_MOVES],
            len: 0,
        }
    }

    /// Push a move onto the list.
    #[inline]
    pub fn push(&mut self, mv: Move) {
        debug_assert!((self.len as usize) < MAX_MOVES);
        self.moves[self.len as usize] = mv;
        self.len += 1;
    }

    /// Return the number of moves in the list.
    #[inline]
    pub fn len(&self) -> usize {
        self.len as usize
    }

    /// Return `true` if the list is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[inline]
    pub fn clear(&mut self) {
        self.len = 0;
    }

    /// Return a slice of the moves.
    #[inline]
    pub fn as_slice(&self) -> &[Move] {
        &self.moves[..self.len as usize]
    }

    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [Move] {
        &mut self.moves[..self.len as usize]
    }

    #[inline]
    pub fn iter(&self) -> std::slice::Iter<'_, Move> {
        self.as_slice().iter()
    }

    #[inline]
    pub fn swap(&mut self, a: usize, b: usize) {
        self.as_mut_slice().swap(a, b);
    }

    /// Return `true` if the list holds `mv`, ignoring scores.
    pub fn contains(&self, mv: Move) -> bool {
        self.iter().any(|m| *m == mv)
    }

    /// Keep only the moves for which `keep` returns `true`, preserving
    /// their order.
    pub fn retain(&mut self, mut keep: impl FnMut(&Move) -> bool) {
        let mut kept = 0;
        for i in 0..self.len() {
            if keep(&self.moves[i]) {
                self.moves[kept] = self.moves[i];
                kept += 1;
            }
        }
        self.len = kept as u16;
    }
}

impl Default for MoveList {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for MoveList {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.iter().map(|m| m.to_uci())).finish()
    }
}

impl std::ops::Index<usize> for MoveList {
    type Output = Move;
    #[inline]
    fn index(&self, index: usize) -> &Move {
        &self.as_slice()[index]
    }
}

impl std::ops::IndexMut<usize> for MoveList {
    #[inline]
    fn index_mut(&mut self, index: usize) -> &mut Move {
        &mut self.as_mut_slice()[index]
    }
}

impl<'a> IntoIterator for &'a MoveList {
    type Item = &'a Move;
    type IntoIter = std::slice::Iter<'a, Move>;
    fn into_iter(self) -> Self::IntoIter {
        self.as_slice().iter()
    }
}

/// Generate all pseudo-legal moves into `list`, replacing its contents.
/// Moves may leave the own king in check.
pub fn pseudo_legal_moves(pos: &Position, list: &mut MoveList) {
    list.clear();
    let _ = Generator::new(pos, list).all_moves();
}

/// Generate pseudo-legal replies to a check into `list`. Only king moves
/// and moves that capture or block a single checker are produced, plus en
/// passant captures.
pub fn check_evasions(pos: &Position, list: &mut MoveList) {
    list.clear();
    let _ = Generator::new(pos, list).evasions();
}

/// Generate captures, checking moves and a few quiet moves that are too
/// expensive to filter out. Promotions are limited to queen and knight.
pub fn pseudo_legal_captures_and_checks(pos: &Position, list: &mut MoveList) {
    list.clear();
    let _ = Generator::new(pos, list).captures_and_checks();
}

/// Generate captures and queen/knight push promotions.
pub fn pseudo_legal_captures(pos: &Position, list: &mut MoveList) {
    list.clear();
    let _ = Generator::new(pos, list).captures();
}

/// Remove the moves that leave the mover's king attacked.
///
/// Most moves are classified without being played: when not in check, a
/// move whose source is off every line through the king cannot expose it;
/// when in check, a move that neither starts on the king nor lands on a
/// line through the king or on a checking knight cannot parry the check.
/// Everything else, en passant and king moves included, is played and
/// tested.
pub fn remove_illegal(pos: &mut Position, list: &mut MoveList) {
    let in_check = pos.in_check();
    let us = pos.side_to_move();
    let king_sq = pos.king_square(us);
    let occupied = pos.occupied();
    let mut king_lines = pos.attacks().queen(king_sq, occupied);
    let ep = pos.ep_square();
    if in_check {
        king_lines |= pos.pieces_of(PieceKind::Knight, !us);
    }

    let mut kept = 0;
    for i in 0..list.len() {
        let m = list[i];
        let must_test = m.from() == king_sq || Some(m.to()) == ep;
        let legal = if in_check {
            if !must_test && !king_lines.contains(m.to()) {
                false
            } else {
                leaves_king_safe(pos, m)
            }
        } else if !must_test && !king_lines.contains(m.from()) {
            true
        } else {
            leaves_king_safe(pos, m)
        };
        if legal {
            list.moves[kept] = m;
            kept += 1;
        }
    }
    list.len = kept as u16;
}

fn leaves_king_safe(pos: &mut Position, m: Move) -> bool {
    let undo = pos.make_move(m);
    let safe = !pos.can_take_king();
    pos.unmake_move(m, &undo);
    safe
}

/// All legal moves in `pos`. The position is restored before returning.
pub fn legal_moves(pos: &mut Position) -> MoveList {
    let mut list = MoveList::new();
    pseudo_legal_moves(pos, &mut list);
    remove_illegal(pos, &mut list);
    list
}

/// Squares holding a piece of `color` that attacks `sq`.
pub fn attackers_of(pos: &Position, sq: crate::square::Square, color: Color) -> Bitboard {
    let atk = pos.attacks();
    let occ = pos.occupied();
    let of = |kind| pos.pieces_of(kind, color);
    let queens = of(PieceKind::Queen);
    (atk.knight(sq) & of(PieceKind::Knight))
        | (atk.king(sq) & of(PieceKind::King))
        | (atk.pawn(!color, sq) & of(PieceKind::Pawn))
        | (atk.rook(sq, occ) & (of(PieceKind::Rook) | queens))
        | (atk.bishop(sq, occ) & (of(PieceKind::Bishop) | queens))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::square::Square;
    use crate::tables::Tables;

    fn pos(fen: &str) -> Position {
        Position::from_fen(fen, Tables::shared().unwrap()).unwrap()
    }

    fn uci(list: &MoveList) -> Vec<String> {
        let mut v: Vec<String> = list.iter().map(|m| m.to_uci()).collect();
        v.sort();
        v
    }

    #[test]
    fn start_position_has_twenty_moves() {
        let mut p = pos(crate::fen::START_FEN);
        assert_eq!(legal_moves(&mut p).len(), 20);
    }

    #[test]
    fn king_capture_short_circuits() {
        // White to move with the black king exposed to the rook.
        let mut p = Position::empty(Tables::shared().unwrap());
        p.set_piece(Square::E1, Some(crate::piece::Piece::WHITE_KING));
        p.set_piece(Square::A8, Some(crate::piece::Piece::WHITE_ROOK));
        p.set_piece(Square::H8, Some(crate::piece::Piece::BLACK_KING));
        p.set_piece(Square::D2, Some(crate::piece::Piece::WHITE_PAWN));
        let mut list = MoveList::new();
        pseudo_legal_moves(&p, &mut list);
        assert_eq!(uci(&list), vec!["a8h8"]);
        pseudo_legal_captures(&p, &mut list);
        assert_eq!(uci(&list), vec!["a8h8"]);
    }

    #[test]
    fn castling_requires_safe_transit() {
        let mut p = pos("r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1");
        let moves = uci(&legal_moves(&mut p));
        assert!(moves.contains(&"e1g1".to_string()));
        assert!(moves.contains(&"e1c1".to_string()));

        // Bishop on c4 covers f1.
        let mut p = pos("r3k2r/8/8/8/2b5/8/8/R3K2R w KQkq - 0 1");
        let moves = uci(&legal_moves(&mut p));
        assert!(!moves.contains(&"e1g1".to_string()));
        assert!(moves.contains(&"e1c1".to_string()));

        // Rook missing from its corner.
        let mut p = pos("r3k2r/8/8/8/8/8/8/R3K1R1 w KQkq - 0 1");
        assert!(!uci(&legal_moves(&mut p)).contains(&"e1g1".to_string()));
    }

    #[test]
    fn evasions_block_capture_or_run() {
        let mut p = pos("4k3/8/8/8/8/8/3P4/r3K2R w K - 0 1");
        assert!(p.in_check());
        let mut list = MoveList::new();
        check_evasions(&p, &mut list);
        remove_illegal(&mut p, &mut list);
        let moves = uci(&list);
        assert_eq!(moves, vec!["e1e2", "e1f2"]);
    }

    #[test]
    fn evasion_generator_agrees_with_full_generator() {
        for fen in [
            "4k3/8/8/8/8/8/3P4/r3K2R w K - 0 1",
            "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R b KQkq - 0 1",
            "8/8/8/2k5/3Pp3/8/8/4K3 b - d3 0 1",
            "4k3/8/5n2/8/8/8/8/4K3 w - - 0 1",
            "4k3/8/8/8/1b6/8/8/4K3 w - - 0 1",
        ] {
            let mut p = pos(fen);
            let mut full = MoveList::new();
            pseudo_legal_moves(&p, &mut full);
            remove_illegal(&mut p, &mut full);
            if p.in_check() {
                let mut ev = MoveList::new();
                check_evasions(&p, &mut ev);
                remove_illegal(&mut p, &mut ev);
                assert_eq!(uci(&full), uci(&ev), "{fen}");
            }
        }
    }

    #[test]
    fn captures_and_checks_cover_all_checking_moves() {
        for fen in [
            "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1",
            "4k3/8/8/8/8/8/4P3/R3K2R w KQ - 0 1",
            "8/8/3k4/8/8/3B4/3R4/3K4 w - - 0 1",
            "2k5/8/8/8/8/8/3P4/3Q2K1 w - - 0 1",
        ] {
            let mut p = pos(fen);
            let legal = legal_moves(&mut p);
            let mut cc = MoveList::new();
            pseudo_legal_captures_and_checks(&p, &mut cc);
            for m in legal.iter() {
                let is_capture = p.piece_at(m.to()).is_some();
                let undo = p.make_move(*m);
                let checks = p.in_check();
                p.unmake_move(*m, &undo);
                let underpromotion = matches!(m.promotion(), Some(PieceKind::Rook | PieceKind::Bishop));
                if (is_capture || checks) && !underpromotion {
                    assert!(cc.contains(*m), "{fen}: {m} missing");
                }
            }
        }
    }

    #[test]
    fn captures_include_push_promotions() {
        let p = pos("4k3/P7/8/8/8/8/8/4K3 w - - 0 1");
        let mut list = MoveList::new();
        pseudo_legal_captures(&p, &mut list);
        assert_eq!(uci(&list), vec!["a7a8n", "a7a8q"]);
    }

    #[test]
    fn retain_keeps_order() {
        let mut p = pos(crate::fen::START_FEN);
        let mut list = legal_moves(&mut p);
        let first = list[0];
        list.retain(|m| m.from() == first.from());
        assert!(!list.is_empty());
        assert_eq!(list[0], first);
        assert!(list.iter().all(|m| m.from() == first.from()));
    }
}
