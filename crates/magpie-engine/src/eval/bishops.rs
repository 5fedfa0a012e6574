//! Bishop pair, opposite-coloured bishops and trapped bishops.

use magpie_core::{Bitboard, Color, Piece, PieceKind, Position, Square};

use super::{BISHOP_VALUE, PAWN_VALUE, QUEEN_VALUE, ROOK_VALUE, interpolate};

/// Bishops on a2, h2, a7 and h7.
const TRAP_SQUARES: Bitboard = Bitboard::new(0x0081_0000_0000_8100);

fn pair_bonus(pos: &Position, color: Color) -> i32 {
    let pawns = pos.pawn_material(color) / PAWN_VALUE;
    28 + (8 - pawns) * 3
}

/// A bishop on `bishop_sq` shut in by enemy pawns on `pawn_sqs`.
fn trapped(pos: &Position, bishop: Piece, bishop_sq: Square, pawn_sqs: [Square; 2]) -> bool {
    let enemy_pawn = Some(Piece::new(PieceKind::Pawn, bishop.color().flip()));
    pos.piece_at(bishop_sq) == Some(bishop) && pawn_sqs.iter().all(|&sq| pos.piece_at(sq) == enemy_pawn)
}

/// Positive when good for White. `old_score` is the evaluation so far,
/// which opposite-coloured bishops pull towards a draw.
pub(super) fn bishop_eval(pos: &Position, old_score: i32) -> i32 {
    let white = pos.pieces(Piece::WHITE_BISHOP);
    let black = pos.pieces(Piece::BLACK_BISHOP);
    if (white | black).is_empty() {
        return 0;
    }
    let mut score = 0;

    let white_dark = (white & Bitboard::DARK_SQUARES).is_nonempty();
    let white_light = (white & Bitboard::LIGHT_SQUARES).is_nonempty();
    let black_dark = (black & Bitboard::DARK_SQUARES).is_nonempty();
    let black_light = (black & Bitboard::LIGHT_SQUARES).is_nonempty();
    let white_count = i32::from(white_dark) + i32::from(white_light);
    let black_count = i32::from(black_dark) + i32::from(black_light);

    if white_count == 2 {
        score += pair_bonus(pos, Color::White);
    }
    if black_count == 2 {
        score -= pair_bonus(pos, Color::Black);
    }

    let w_pieces = pos.piece_material(Color::White);
    let b_pieces = pos.piece_material(Color::Black);
    if white_count == 1 && black_count == 1 && white_dark != black_dark && w_pieces == b_pieces {
        let penalty = (old_score + score) / 2;
        let lo = 2 * BISHOP_VALUE;
        let hi = 2 * (QUEEN_VALUE + ROOK_VALUE + BISHOP_VALUE);
        score -= interpolate(w_pieces + b_pieces, lo, penalty, hi, 0);
    }

    if ((white | black) & TRAP_SQUARES).is_nonempty() {
        let full = PAWN_VALUE * 3 / 2;
        if trapped(pos, Piece::WHITE_BISHOP, Square::A7, [Square::B6, Square::C7]) {
            score -= full;
        }
        if trapped(pos, Piece::WHITE_BISHOP, Square::H7, [Square::G6, Square::F7]) {
            score -= if pos.pieces(Piece::WHITE_QUEEN).is_nonempty() { PAWN_VALUE } else { full };
        }
        if trapped(pos, Piece::BLACK_BISHOP, Square::A2, [Square::B3, Square::C2]) {
            score += full;
        }
        if trapped(pos, Piece::BLACK_BISHOP, Square::H2, [Square::G3, Square::F2]) {
            score += if pos.pieces(Piece::BLACK_QUEEN).is_nonempty() { PAWN_VALUE } else { full };
        }
    }
    score
}

#[cfg(test)]
mod tests {
    use super::*;
    use magpie_core::Tables;

    fn position(fen: &str) -> Position {
        Position::from_fen(fen, Tables::shared().unwrap()).unwrap()
    }

    #[test]
    fn bishop_pair_bonus() {
        let pos = position("4k3/8/8/8/8/8/8/2B1KB2 w - - 0 1");
        assert_eq!(bishop_eval(&pos, 0), 28 + 8 * 3);
    }

    #[test]
    fn opposite_bishops_halve_the_advantage() {
        // Dark-squared c1 bishop against light-squared c8 bishop.
        let pos = position("2b1k3/8/8/8/8/8/8/2B1K3 w - - 0 1");
        assert_eq!(bishop_eval(&pos, 200), -100);
    }

    #[test]
    fn trapped_bishop_on_a7() {
        let pos = position("4k3/B1p5/1p6/8/8/8/8/4K3 w - - 0 1");
        assert_eq!(bishop_eval(&pos, 0), -(PAWN_VALUE * 3 / 2));
    }
}
