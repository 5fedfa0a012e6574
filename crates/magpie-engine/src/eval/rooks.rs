//! Rooks on open files and on the seventh rank.

use magpie_core::{Bitboard, Color, PieceKind, Position};

const OPEN_FILE: i32 = 25;
const HALF_OPEN_FILE: i32 = 12;
const TWO_ROOKS_ON_SEVENTH: i32 = 30;

fn file_bonus(pos: &Position, color: Color) -> i32 {
    let own_pawns = pos.pieces_of(PieceKind::Pawn, color);
    let enemy_pawns = pos.pieces_of(PieceKind::Pawn, color.flip());
    pos.pieces_of(PieceKind::Rook, color)
        .map(|sq| {
            let file = Bitboard::file(sq.file());
            if (own_pawns & file).is_nonempty() {
                0
            } else if (enemy_pawns & file).is_nonempty() {
                HALF_OPEN_FILE
            } else {
                OPEN_FILE
            }
        })
        .sum()
}

/// Positive when good for White.
pub(super) fn rook_bonus(pos: &Position) -> i32 {
    let mut score = file_bonus(pos, Color::White) - file_bonus(pos, Color::Black);

    let white_on_7th = pos.pieces_of(PieceKind::Rook, Color::White) & Bitboard::RANK_7;
    if white_on_7th.more_than_one() && (pos.pieces_of(PieceKind::King, Color::Black) & Bitboard::RANK_8).is_nonempty() {
        score += TWO_ROOKS_ON_SEVENTH;
    }
    let black_on_2nd = pos.pieces_of(PieceKind::Rook, Color::Black) & Bitboard::RANK_2;
    if black_on_2nd.more_than_one() && (pos.pieces_of(PieceKind::King, Color::White) & Bitboard::RANK_1).is_nonempty() {
        score -= TWO_ROOKS_ON_SEVENTH;
    }
    score
}
