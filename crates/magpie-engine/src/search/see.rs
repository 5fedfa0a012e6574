//! Static Exchange Evaluation (SEE).
//!
//! Determines the material outcome of a sequence of captures on a single square,
//! assuming both sides use their least valuable attacker at each step.

use magpie_core::{Bitboard, Color, Move, PieceKind, Position, Square};

/// Value of whatever stands on `sq`, 0 when empty.
fn value_on(pos: &Position, sq: Square) -> i32 {
    pos.piece_at(sq).map_or(0, |p| p.kind().value())
}

/// Least valuable piece of `side` that attacks `sq` through `occupied`.
/// Pieces removed from `occupied` no longer attack and no longer block.
fn least_valuable_attacker(pos: &Position, sq: Square, side: Color, occupied: Bitboard) -> Option<(Square, i32)> {
    let atk = pos.attacks();
    let own = |kind| pos.pieces_of(kind, side) & occupied;
    let bishop_rays = atk.bishop(sq, occupied);
    let rook_rays = atk.rook(sq, occupied);
    let candidates = [
        (PieceKind::Pawn, atk.pawn(!side, sq)),
        (PieceKind::Knight, atk.knight(sq)),
        (PieceKind::Bishop, bishop_rays),
        (PieceKind::Rook, rook_rays),
        (PieceKind::Queen, bishop_rays | rook_rays),
        (PieceKind::King, atk.king(sq)),
    ];
    candidates
        .into_iter()
        .find_map(|(kind, reach)| (reach & own(kind)).lsb().map(|from| (from, kind.value())))
}

/// Static exchange score of `m`. Positive values are good for the side that
/// moves first.
///
/// The first capture is played on the board with
/// [`Position::make_see_move`]; the rest of the exchange only removes
/// attackers from an occupancy mask, which exposes x-ray attackers behind
/// them.
pub fn see(pos: &mut Position, m: Move) -> i32 {
    let king = PieceKind::King.value();
    let square = m.to();
    let mut gains = [0i32; 64];
    gains[0] = if Some(square) == pos.ep_square() && pos.piece_at(m.from()).is_some_and(|p| p.kind() == PieceKind::Pawn)
    {
        PieceKind::Pawn.value()
    } else {
        let captured = value_on(pos, square);
        if captured == king {
            return king;
        }
        captured
    };
    let mut count = 1;

    let undo = pos.make_see_move(m);
    let mut side = pos.side_to_move();
    let mut on_square = value_on(pos, square);
    let mut occupied = pos.occupied();
    while let Some((from, value)) = least_valuable_attacker(pos, square, side, occupied) {
        gains[count] = on_square;
        count += 1;
        if on_square == king || count == gains.len() {
            break;
        }
        on_square = value;
        occupied = occupied.without(from);
        side = !side;
    }
    pos.unmake_see_move(m, &undo);

    let mut score = 0;
    for &gain in gains[1..count].iter().rev() {
        score = (gain - score).max(0);
    }
    gains[0] - score
}

/// Positive, zero or negative with the sign of [`see`]. Capturing a more
/// valuable piece is positive without running the exchange.
pub fn sign_see(pos: &mut Position, m: Move) -> i32 {
    if value_on(pos, m.from()) < value_on(pos, m.to()) {
        return 1;
    }
    see(pos, m)
}

/// Return `true` if [`see`] is negative. Capturing an equal or more valuable
/// piece never is.
pub fn neg_see(pos: &mut Position, m: Move) -> bool {
    if value_on(pos, m.to()) >= value_on(pos, m.from()) {
        return false;
    }
    see(pos, m) < 0
}

#[cfg(test)]
mod tests {
    use super::*;
    use magpie_core::{MoveList, Tables, movegen};

    fn position(fen: &str) -> Position {
        Position::from_fen(fen, Tables::shared().unwrap()).unwrap()
    }

    /// Coordinate move without a legality check; exchanges may start with
    /// a king walking into a defended square.
    fn uci(text: &str) -> Move {
        let from = Square::from_algebraic(&text[0..2]).unwrap();
        let to = Square::from_algebraic(&text[2..4]).unwrap();
        Move::new(from, to, None)
    }

    /// Best result for the side to move of continuing the exchange on `sq`
    /// with any capture, or stopping.
    fn exchange_minimax(pos: &mut Position, sq: Square) -> i32 {
        let mut captures = MoveList::new();
        movegen::pseudo_legal_captures(pos, &mut captures);
        let mut best = 0;
        for &m in captures.iter().filter(|m| m.to() == sq && !m.is_promotion()) {
            let gain = value_on(pos, sq);
            if gain == PieceKind::King.value() {
                return gain;
            }
            let undo = pos.make_move(m);
            let reply = exchange_minimax(pos, sq);
            pos.unmake_move(m, &undo);
            best = best.max(gain - reply);
        }
        best
    }

    fn brute_force(pos: &mut Position, m: Move) -> i32 {
        let gain = if Some(m.to()) == pos.ep_square() { PieceKind::Pawn.value() } else { value_on(pos, m.to()) };
        let undo = pos.make_move(m);
        let reply = exchange_minimax(pos, m.to());
        pos.unmake_move(m, &undo);
        gain - reply
    }

    const CASES: [(&str, &str, i32); 7] = [
        ("4k3/8/8/3n4/4P3/8/8/4K3 w - - 0 1", "e4d5", 385),
        ("4k3/2n5/8/3n4/4P3/8/8/4K3 w - - 0 1", "e4d5", 385 - 92),
        ("4k3/8/2p5/3p4/8/8/8/3QK3 w - - 0 1", "d1d5", 92 - 1244),
        ("3rk3/3r4/8/3p4/8/8/3R4/3RK3 w - - 0 1", "d2d5", 92 - 593),
        ("4k3/8/8/3pP3/8/8/8/4K3 w - d6 0 1", "e5d6", 92),
        ("4k3/8/8/8/8/2p5/3p4/4K3 w - - 0 1", "e1d2", 92 - 9900),
        ("4k3/8/4p3/3n4/8/4N3/8/4K3 w - - 0 1", "e3d5", 0),
    ];

    #[test]
    fn exchange_values() {
        for (fen, mv, expected) in CASES {
            let mut pos = position(fen);
            let m = uci(mv);
            assert_eq!(see(&mut pos, m), expected, "{fen} {mv}");
        }
    }

    #[test]
    fn sign_matches_brute_force() {
        for (fen, mv, _) in CASES {
            let mut pos = position(fen);
            let m = uci(mv);
            let fast = see(&mut pos, m);
            let slow = brute_force(&mut pos, m);
            assert_eq!(fast.signum(), slow.signum(), "{fen} {mv}: see {fast}, minimax {slow}");
        }
    }

    #[test]
    fn see_leaves_position_unchanged() {
        let mut pos = position("3rk3/3r4/8/3p4/8/8/3R4/3RK3 w - - 0 1");
        let before = pos.clone();
        let m = uci("d2d5");
        see(&mut pos, m);
        assert_eq!(pos, before);
    }

    #[test]
    fn king_capture_is_decisive() {
        let mut pos = position("k7/8/8/8/8/8/8/R3K3 b - - 0 1");
        pos.set_side_to_move(Color::White);
        let m = Move::new(Square::A1, Square::A8, None);
        assert_eq!(see(&mut pos, m), PieceKind::King.value());
    }

    #[test]
    fn cheap_tests_skip_the_exchange() {
        let mut pos = position("4k3/8/2p5/3p4/8/8/8/3QK3 w - - 0 1");
        let qxd5 = uci("d1d5");
        assert!(neg_see(&mut pos, qxd5));
        assert!(sign_see(&mut pos, qxd5) < 0);

        let mut pos = position("4k3/2n5/8/3n4/4P3/8/8/4K3 w - - 0 1");
        let pxn = uci("e4d5");
        assert_eq!(sign_see(&mut pos, pxn), 1);
        assert!(!neg_see(&mut pos, pxn));
    }
}
