//! Piece-square tables and the castling bonus.
//!
//! Tables are indexed by square as seen from Black's side of the board:
//! index 0 = A1 is Black's far corner. White reads them at the
//! point-symmetric square `63 - sq`. Middle game and end game tables are
//! blended by the opponent's remaining material.

use magpie_core::{Bitboard, CastleRights, Color, Piece, PieceKind, Position};

use super::{BISHOP_VALUE, KNIGHT_VALUE, PAWN_VALUE, QUEEN_VALUE, ROOK_VALUE, interpolate};

#[rustfmt::skip]
const KING_MG: [i32; 64] = [
    -22,-35,-40,-40,-40,-40,-35,-22,
    -22,-35,-40,-40,-40,-40,-35,-22,
    -25,-35,-40,-45,-45,-40,-35,-25,
    -15,-30,-35,-40,-40,-35,-30,-15,
    -10,-15,-20,-25,-25,-20,-15,-10,
      4, -2, -5,-15,-15, -5, -2,  4,
     16, 14,  7, -3, -3,  7, 14, 16,
     24, 24,  9,  0,  0,  9, 24, 24,
];

#[rustfmt::skip]
const KING_EG: [i32; 64] = [
     0,  8, 16, 24, 24, 16,  8,  0,
     8, 16, 24, 32, 32, 24, 16,  8,
    16, 24, 32, 40, 40, 32, 24, 16,
    24, 32, 40, 48, 48, 40, 32, 24,
    24, 32, 40, 48, 48, 40, 32, 24,
    16, 24, 32, 40, 40, 32, 24, 16,
     8, 16, 24, 32, 32, 24, 16,  8,
     0,  8, 16, 24, 24, 16,  8,  0,
];

#[rustfmt::skip]
const PAWN_MG: [i32; 64] = [
     0,  0,  0,  0,  0,  0,  0,  0,
     8, 16, 24, 32, 32, 24, 16,  8,
     3, 12, 20, 28, 28, 20, 12,  3,
    -5,  4, 10, 20, 20, 10,  4, -5,
    -6,  4,  5, 16, 16,  5,  4, -6,
    -6,  4,  2,  5,  5,  2,  4, -6,
    -6,  4,  4,-15,-15,  4,  4, -6,
     0,  0,  0,  0,  0,  0,  0,  0,
];

#[rustfmt::skip]
const PAWN_EG: [i32; 64] = [
      0,  0,  0,  0,  0,  0,  0,  0,
     25, 40, 45, 45, 45, 45, 40, 25,
     17, 32, 35, 35, 35, 35, 32, 17,
      5, 24, 24, 24, 24, 24, 24,  5,
     -9, 11, 11, 11, 11, 11, 11, -9,
    -17,  3,  3,  3,  3,  3,  3,-17,
    -20,  0,  0,  0,  0,  0,  0,-20,
      0,  0,  0,  0,  0,  0,  0,  0,
];

#[rustfmt::skip]
const KNIGHT_MG: [i32; 64] = [
    -53,-42,-32,-21,-21,-32,-42,-53,
    -42,-32,-10,  0,  0,-10,-32,-42,
    -21,  5, 10, 16, 16, 10,  5,-21,
    -18,  0, 10, 21, 21, 10,  0,-18,
    -18,  0,  3, 21, 21,  3,  0,-18,
    -21,-10,  0,  0,  0,  0,-10,-21,
    -42,-32,-10,  0,  0,-10,-32,-42,
    -53,-42,-32,-21,-21,-32,-42,-53,
];

#[rustfmt::skip]
const KNIGHT_EG: [i32; 64] = [
    -56,-44,-34,-22,-22,-34,-44,-56,
    -44,-34,-10,  0,  0,-10,-34,-44,
    -22,  5, 10, 17, 17, 10,  5,-22,
    -19,  0, 10, 22, 22, 10,  0,-19,
    -19,  0,  3, 22, 22,  3,  0,-19,
    -22,-10,  0,  0,  0,  0,-10,-22,
    -44,-34,-10,  0,  0,-10,-34,-44,
    -56,-44,-34,-22,-22,-34,-44,-56,
];

#[rustfmt::skip]
const BISHOP_MG: [i32; 64] = [
     0,  0,  0,  0,  0,  0,  0,  0,
     0,  4,  2,  2,  2,  2,  4,  0,
     0,  2,  4,  4,  4,  4,  2,  0,
     0,  2,  4,  4,  4,  4,  2,  0,
     0,  2,  4,  4,  4,  4,  2,  0,
     0,  3,  4,  4,  4,  4,  3,  0,
     0,  4,  2,  2,  2,  2,  4,  0,
    -5, -5, -7, -5, -5, -7, -5, -5,
];

#[rustfmt::skip]
const QUEEN_MG: [i32; 64] = [
    -10, -5,  0,  0,  0,  0, -5,-10,
     -5,  0,  5,  5,  5,  5,  0, -5,
      0,  5,  5,  6,  6,  5,  5,  0,
      0,  5,  6,  6,  6,  6,  5,  0,
      0,  5,  6,  6,  6,  6,  5,  0,
      0,  5,  5,  6,  6,  5,  5,  0,
     -5,  0,  5,  5,  5,  5,  0, -5,
    -10, -5,  0,  0,  0,  0, -5,-10,
];

#[rustfmt::skip]
const ROOK_MG: [i32; 64] = [
     8, 11, 13, 13, 13, 13, 11,  8,
    22, 27, 27, 27, 27, 27, 27, 22,
     0,  0,  0,  0,  0,  0,  0,  0,
     0,  0,  0,  0,  0,  0,  0,  0,
    -2,  0,  0,  0,  0,  0,  0, -2,
    -2,  0,  0,  2,  2,  0,  0, -2,
    -3,  2,  5,  5,  5,  5,  2, -3,
     0,  3,  5,  5,  5,  5,  3,  0,
];

/// Sum of `table` over the pieces of one kind and colour.
fn table_sum(pos: &Position, kind: PieceKind, color: Color, table: &[i32; 64]) -> i32 {
    pos.pieces(Piece::new(kind, color))
        .map(|sq| match color {
            Color::White => table[63 - sq.index()],
            Color::Black => table[sq.index()],
        })
        .sum()
}

/// Blend a middle game and an end game table for one side.
fn blended(
    pos: &Position,
    kind: PieceKind,
    color: Color,
    tables: (&[i32; 64], &[i32; 64]),
    x: i32,
    range: (i32, i32),
) -> i32 {
    let mg = table_sum(pos, kind, color, tables.0);
    let eg = table_sum(pos, kind, color, tables.1);
    interpolate(x, range.0, eg, range.1, mg)
}

/// Piece-square score for all pieces, positive when good for White.
pub(super) fn piece_square_eval(pos: &Position) -> i32 {
    let w_mtrl = pos.material(Color::White);
    let b_mtrl = pos.material(Color::Black);
    let w_pieces = pos.piece_material(Color::White);
    let b_pieces = pos.piece_material(Color::Black);
    let mut score = 0;

    let heavy = (ROOK_VALUE, QUEEN_VALUE + 2 * ROOK_VALUE + 2 * BISHOP_VALUE);
    score += blended(pos, PieceKind::King, Color::White, (&KING_MG, &KING_EG), b_pieces, heavy);
    score -= blended(pos, PieceKind::King, Color::Black, (&KING_MG, &KING_EG), w_pieces, heavy);
    score += blended(pos, PieceKind::Pawn, Color::White, (&PAWN_MG, &PAWN_EG), b_pieces, heavy);
    score -= blended(pos, PieceKind::Pawn, Color::Black, (&PAWN_MG, &PAWN_EG), w_pieces, heavy);

    let knight_range = (
        KNIGHT_VALUE + 8 * PAWN_VALUE,
        QUEEN_VALUE + 2 * ROOK_VALUE + BISHOP_VALUE + KNIGHT_VALUE + 6 * PAWN_VALUE,
    );
    score += blended(pos, PieceKind::Knight, Color::White, (&KNIGHT_MG, &KNIGHT_EG), b_mtrl, knight_range);
    score -= blended(pos, PieceKind::Knight, Color::Black, (&KNIGHT_MG, &KNIGHT_EG), w_mtrl, knight_range);

    score += table_sum(pos, PieceKind::Bishop, Color::White, &BISHOP_MG);
    score -= table_sum(pos, PieceKind::Bishop, Color::Black, &BISHOP_MG);
    score += table_sum(pos, PieceKind::Queen, Color::White, &QUEEN_MG);
    score -= table_sum(pos, PieceKind::Queen, Color::Black, &QUEEN_MG);

    // Rook squares matter less as the enemy pawns disappear.
    let w_rooks = table_sum(pos, PieceKind::Rook, Color::White, &ROOK_MG);
    let b_pawn_count = pos.pawn_material(Color::Black) / PAWN_VALUE;
    score += w_rooks * b_pawn_count.min(6) / 6;
    let b_rooks = table_sum(pos, PieceKind::Rook, Color::Black, &ROOK_MG);
    let w_pawn_count = pos.pawn_material(Color::White) / PAWN_VALUE;
    score -= b_rooks * w_pawn_count.min(6) / 6;

    score
}

/// 1024 divided by the number of moves needed to castle on the faster
/// side, where every piece still between king and rook costs one move.
fn castle_factor(back_rank: u64, queen_side: bool, king_side: bool) -> i32 {
    let king_side_dist = if king_side { 2 + (back_rank & 0x60).count_ones() } else { 100 };
    let queen_side_dist = if queen_side { 2 + (back_rank & 0x0E).count_ones() } else { 100 };
    1024 / queen_side_dist.min(king_side_dist) as i32
}

/// Bonus for keeping the right to castle.
pub(super) fn castle_bonus(pos: &Position) -> i32 {
    let rights = pos.castle_rights();
    if rights.is_empty() {
        return 0;
    }

    let k_mg = KING_MG[62] - KING_MG[60];
    let k_eg = KING_EG[62] - KING_EG[60];
    let ks = interpolate(
        pos.piece_material(Color::Black),
        ROOK_VALUE,
        k_eg,
        QUEEN_VALUE + 2 * ROOK_VALUE + 2 * BISHOP_VALUE,
        k_mg,
    );
    let castle_value = ks + ROOK_MG[61] - ROOK_MG[63];
    if castle_value <= 0 {
        return 0;
    }

    let occupied = pos.occupied().inner();
    let white = castle_factor(
        occupied & Bitboard::RANK_1.inner(),
        rights.contains(CastleRights::WHITE_QUEEN),
        rights.contains(CastleRights::WHITE_KING),
    );
    let black = castle_factor(
        occupied >> 56,
        rights.contains(CastleRights::BLACK_QUEEN),
        rights.contains(CastleRights::BLACK_KING),
    );
    ((castle_value * white) >> 10) - ((castle_value * black) >> 10)
}

#[cfg(test)]
mod tests {
    use super::*;
    use magpie_core::Tables;

    fn position(fen: &str) -> Position {
        Position::from_fen(fen, Tables::shared().unwrap()).unwrap()
    }

    #[test]
    fn centralised_knight_beats_rim_knight() {
        let centre = position("4k3/8/8/8/4N3/8/8/4K3 w - - 0 1");
        let rim = position("4k3/8/8/8/7N/8/8/4K3 w - - 0 1");
        assert!(piece_square_eval(&centre) > piece_square_eval(&rim));
    }

    #[test]
    fn white_and_black_tables_are_symmetric() {
        assert_eq!(piece_square_eval(&position(magpie_core::START_FEN)), 0);
    }

    #[test]
    fn cleared_back_rank_castles_sooner() {
        let start = position(magpie_core::START_FEN);
        let cleared = position("rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQK2R w KQkq - 0 1");
        assert_eq!(castle_bonus(&start), 0);
        assert!(castle_bonus(&cleared) > 0);
        let no_rights = position("rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQK2R w - - 0 1");
        assert_eq!(castle_bonus(&no_rights), 0);
    }
}
