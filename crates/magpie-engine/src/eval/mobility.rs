//! Slider mobility, attacks near the kings and threats against pieces.
//!
//! Mobility counts attacked squares not occupied by own pieces and not
//! covered by enemy pawns. Every slider also records its attack set and its
//! attacks on the enemy king zone in the [`EvalState`].

use magpie_core::{Bitboard, Color, Piece, PieceKind, Position};

use super::{EvalState, QUEEN_VALUE};

const ROOK_MOBILITY: [i32; 15] = [-10, -7, -4, -1, 2, 5, 7, 9, 11, 12, 13, 14, 14, 14, 14];
const BISHOP_MOBILITY: [i32; 14] = [-15, -10, -6, -2, 2, 6, 10, 13, 16, 18, 20, 22, 23, 24];
#[rustfmt::skip]
const QUEEN_MOBILITY: [i32; 28] = [
    -5, -4, -3, -2, -1, 0, 1, 2, 3, 4, 5, 6, 7, 8, 9, 9,
    10, 10, 10, 10, 10, 10, 10, 10, 10, 10, 10, 10,
];

/// Mobility of one slider kind for both sides, positive when good for White.
fn slider_mobility(
    pos: &Position,
    state: &mut EvalState,
    kind: PieceKind,
    table: &[i32],
    king_weight: i32,
) -> i32 {
    let occupied = pos.occupied();
    let attacks = pos.attacks();
    let attack_set = |sq| match kind {
        PieceKind::Bishop => attacks.bishop(sq, occupied),
        PieceKind::Rook => attacks.rook(sq, occupied),
        _ => attacks.queen(sq, occupied),
    };
    let mut score = 0;

    let white_safe = !(pos.side(Color::White) | state.black_pawn_attacks);
    for sq in pos.pieces(Piece::new(kind, Color::White)) {
        let atk = attack_set(sq);
        state.white_attacks |= atk;
        score += table[(atk & white_safe).count() as usize];
        state.black_king_attacks += (atk & state.black_king_zone).count() as i32 * king_weight;
    }

    let black_safe = !(pos.side(Color::Black) | state.white_pawn_attacks);
    for sq in pos.pieces(Piece::new(kind, Color::Black)) {
        let atk = attack_set(sq);
        state.black_attacks |= atk;
        score -= table[(atk & black_safe).count() as usize];
        state.white_king_attacks += (atk & state.white_king_zone).count() as i32 * king_weight;
    }
    score
}

pub(super) fn queens(pos: &Position, state: &mut EvalState) -> i32 {
    slider_mobility(pos, state, PieceKind::Queen, &QUEEN_MOBILITY, 2)
}

pub(super) fn rooks(pos: &Position, state: &mut EvalState) -> i32 {
    slider_mobility(pos, state, PieceKind::Rook, &ROOK_MOBILITY, 1)
}

pub(super) fn bishops(pos: &Position, state: &mut EvalState) -> i32 {
    slider_mobility(pos, state, PieceKind::Bishop, &BISHOP_MOBILITY, 1)
}

/// Sum of the values of `color`'s non-king pieces attacked by `attackers`.
fn attacked_value(pos: &Position, attackers: Bitboard, color: Color) -> i32 {
    let targets = attackers & pos.side(color) & !pos.pieces_of(PieceKind::King, color);
    targets.filter_map(|sq| pos.piece_at(sq)).map(|p| p.kind().value()).sum()
}

/// Bonus for pieces attacked by pawns, or attacked by sliders and knights
/// while not being pawns themselves.
///
/// Must run after every slider has recorded its attacks.
pub(super) fn threat_bonus(pos: &Position, state: &mut EvalState) -> i32 {
    let attacks = pos.attacks();
    let pieces = |color| {
        pos.pieces_of(PieceKind::Knight, color)
            | pos.pieces_of(PieceKind::Bishop, color)
            | pos.pieces_of(PieceKind::Rook, color)
            | pos.pieces_of(PieceKind::Queen, color)
    };

    for sq in pos.pieces_of(PieceKind::Knight, Color::White) {
        state.white_attacks |= attacks.knight(sq);
    }
    let white_threats = (state.white_attacks & pieces(Color::Black)) | state.white_pawn_attacks;
    let on_black = attacked_value(pos, white_threats, Color::Black);

    for sq in pos.pieces_of(PieceKind::Knight, Color::Black) {
        state.black_attacks |= attacks.knight(sq);
    }
    let black_threats = (state.black_attacks & pieces(Color::White)) | state.black_pawn_attacks;
    let on_white = attacked_value(pos, black_threats, Color::White);

    let weigh = |s: i32| s + s * s / QUEEN_VALUE;
    (weigh(on_black) - weigh(on_white)) / 64
}

#[cfg(test)]
mod tests {
    use super::*;
    use magpie_core::Tables;

    fn position(fen: &str) -> Position {
        Position::from_fen(fen, Tables::shared().unwrap()).unwrap()
    }

    #[test]
    fn open_rook_is_more_mobile() {
        let open = position("4k3/8/8/8/3R4/8/8/4K3 w - - 0 1");
        let boxed = position("4k3/8/8/8/8/8/1P6/RN2K3 w - - 0 1");
        let mobility = |pos: &Position| rooks(pos, &mut EvalState::new(pos));
        assert!(mobility(&open) > mobility(&boxed));
    }

    #[test]
    fn queen_near_king_counts_double() {
        let pos = position("6k1/8/6Q1/8/8/8/8/4K3 b - - 0 1");
        let mut state = EvalState::new(&pos);
        queens(&pos, &mut state);
        assert!(state.black_king_attacks > 0);
        assert_eq!(state.black_king_attacks % 2, 0);
        assert_eq!(state.white_king_attacks, 0);
    }

    #[test]
    fn pawn_fork_is_a_threat() {
        let pos = position("4k3/8/8/2n1b3/3P4/8/8/4K3 w - - 0 1");
        let mut state = EvalState::new(&pos);
        assert!(threat_bonus(&pos, &mut state) > 0);
    }
}
