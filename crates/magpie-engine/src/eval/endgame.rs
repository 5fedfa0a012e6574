//! Knowledge about specific endgames.
//!
//! Only runs when little material is left. Recognised endings replace the
//! score; the general rules scale it towards a draw when the stronger side
//! lacks mating material.

use magpie_core::{Bitboard, Color, Piece, PieceKind, Position, Square, distance};

use super::bitbase::Bitbases;
use super::{BISHOP_VALUE, KNIGHT_VALUE, PAWN_VALUE, QUEEN_VALUE, ROOK_VALUE};

/// The square as seen by the other side: rotated 180 degrees.
fn rotate(sq: Square) -> Square {
    Square::new(63 - sq.index() as u8)
}

/// How near `king` is to a corner of the bishop's colour, 0..=7.
fn corner_drive(king: Square, dark_bishop: bool) -> i32 {
    let (x, y) = (king.file() as i32, king.rank() as i32);
    if dark_bishop { (x + y - 7).abs() } else { (x - y).abs() }
}

/// King and queen against king and pawn on the second rank. Drawn when
/// the defending king shelters a bishop or rook pawn and the attacking
/// king is too far away.
fn kqkp(w_king: Square, w_queen: Square, b_king: Square, b_pawn: Square, white_to_move: bool) -> i32 {
    let bk = b_king.index();
    let can_win = if (1u64 << bk) & 0xFFFF == 0 || (b_pawn.file() as i32 - b_king.file() as i32).abs() > 2 {
        true
    } else {
        let wk_bit = 1u64 << w_king.index();
        match b_pawn.index() {
            8 => wk_bit & 0x0F_1F1F_1F1F != 0 && !(bk == 0 && w_queen.file() == 1 && !white_to_move),
            10 => wk_bit & 0x071F_1F1F != 0,
            13 => wk_bit & 0xE0F8_F8F8 != 0,
            15 => wk_bit & 0xF0_F8F8_F8F8 != 0 && !(bk == 7 && w_queen.file() == 6 && !white_to_move),
            _ => true,
        }
    };
    let score = QUEEN_VALUE - PAWN_VALUE - 20 * distance(w_king, b_pawn);
    if can_win { score } else { score / 50 }
}

fn kpk(bitbases: &Bitbases, w_king: Square, b_king: Square, w_pawn: Square, white_to_move: bool) -> i32 {
    if bitbases.kpk_win(white_to_move, w_king, b_king, w_pawn) {
        QUEEN_VALUE - PAWN_VALUE / 4 * (7 - w_pawn.rank() as i32)
    } else {
        0
    }
}

fn krkp(bitbases: &Bitbases, w_king: Square, b_king: Square, b_pawn: Square, white_to_move: bool) -> i32 {
    let score = ROOK_VALUE - PAWN_VALUE + b_pawn.rank() as i32 * PAWN_VALUE / 4;
    if bitbases.krkp_win(white_to_move, w_king, b_king, b_pawn) { score + 150 } else { score / 50 }
}

fn single(pos: &Position, piece: Piece) -> Option<Square> {
    pos.pieces(piece).lsb()
}

/// KQKP, KRKP and KRKB from either side.
fn recognised(pos: &Position, score: i32, bitbases: &Bitbases) -> Option<i32> {
    let w_mtrl = pos.material(Color::White);
    let b_mtrl = pos.material(Color::Black);
    let wtm = pos.white_to_move();
    let wk = pos.king_square(Color::White);
    let bk = pos.king_square(Color::Black);

    if w_mtrl == QUEEN_VALUE && b_mtrl == PAWN_VALUE {
        if let (Some(wq), Some(bp)) = (single(pos, Piece::WHITE_QUEEN), single(pos, Piece::BLACK_PAWN)) {
            return Some(kqkp(wk, wq, bk, bp, wtm));
        }
    }
    if w_mtrl == ROOK_VALUE && single(pos, Piece::WHITE_ROOK).is_some() {
        if b_mtrl == PAWN_VALUE {
            if let Some(bp) = single(pos, Piece::BLACK_PAWN) {
                return Some(krkp(bitbases, wk, bk, bp, wtm));
            }
        } else if b_mtrl == BISHOP_VALUE {
            if let Some(bb) = single(pos, Piece::BLACK_BISHOP) {
                return Some(score / 8 + corner_drive(bk, bb.is_dark()) * 7);
            }
        }
    }
    if b_mtrl == QUEEN_VALUE && w_mtrl == PAWN_VALUE {
        if let (Some(bq), Some(wp)) = (single(pos, Piece::BLACK_QUEEN), single(pos, Piece::WHITE_PAWN)) {
            return Some(-kqkp(rotate(bk), rotate(bq), rotate(wk), rotate(wp), !wtm));
        }
    }
    if b_mtrl == ROOK_VALUE && single(pos, Piece::BLACK_ROOK).is_some() {
        if w_mtrl == PAWN_VALUE {
            if let Some(wp) = single(pos, Piece::WHITE_PAWN) {
                return Some(-krkp(bitbases, rotate(bk), rotate(wk), rotate(wp), !wtm));
            }
        } else if w_mtrl == BISHOP_VALUE {
            if let Some(wb) = single(pos, Piece::WHITE_BISHOP) {
                return Some(score / 8 - corner_drive(wk, wb.is_dark()) * 7);
            }
        }
    }
    None
}

/// A lone rook pawn with a bishop that does not control the promotion
/// square, and the defending king already in the corner.
fn wrong_rook_pawn(pos: &Position, color: Color) -> bool {
    let pawns = pos.pieces_of(PieceKind::Pawn, color);
    let bishops = pos.pieces_of(PieceKind::Bishop, color);
    let enemy_king = pos.pieces_of(PieceKind::King, color.flip()).inner();
    let (a_corner, h_corner, a_bishop_colour, h_bishop_colour) = match color {
        Color::White => (0x0303_0000_0000_0000, 0xC0C0_0000_0000_0000, Bitboard::LIGHT_SQUARES, Bitboard::DARK_SQUARES),
        Color::Black => (0x0303, 0xC0C0, Bitboard::DARK_SQUARES, Bitboard::LIGHT_SQUARES),
    };
    ((pawns & Bitboard::NOT_FILE_A).is_empty() && (bishops & a_bishop_colour).is_empty() && enemy_king & a_corner != 0)
        || ((pawns & Bitboard::NOT_FILE_H).is_empty()
            && (bishops & h_bishop_colour).is_empty()
            && enemy_king & h_corner != 0)
}

/// Score for `color` having a bare-king opponent short of pawns, from
/// `color`'s point of view. `None` when the rule does not apply.
fn excess_material(pos: &Position, score: i32, color: Color) -> Option<i32> {
    let enemy = color.flip();
    let own = pos.piece_material(color);
    let other = pos.piece_material(enemy);
    if own - other > BISHOP_VALUE {
        let knights = pos.pieces_of(PieceKind::Knight, color).count();
        let bishops = pos.pieces(Piece::new(PieceKind::Bishop, color));
        if knights == 2 && pos.material(color) == 2 * KNIGHT_VALUE && other == 0 {
            // KNNK cannot be forced.
            return Some(score / 50);
        }
        if knights == 1 && bishops.count() == 1 && own == KNIGHT_VALUE + BISHOP_VALUE && other == 0 {
            let dark = (bishops & Bitboard::DARK_SQUARES).is_nonempty();
            let drive = corner_drive(pos.king_square(enemy), dark);
            return Some(score / 10 + KNIGHT_VALUE + BISHOP_VALUE + 300 + drive * 10);
        }
        return Some(score + 300);
    }
    None
}

/// Adjust `old_score` (positive when good for White) for endgame knowledge.
pub(super) fn end_game_eval(pos: &Position, old_score: i32, bitbases: &Bitbases) -> i32 {
    let score = old_score;
    let w_mtrl = pos.material(Color::White);
    let b_mtrl = pos.material(Color::Black);
    if w_mtrl + b_mtrl > 6 * ROOK_VALUE {
        return score;
    }
    let w_pawns = pos.pawn_material(Color::White);
    let b_pawns = pos.pawn_material(Color::Black);
    let w_pieces = pos.piece_material(Color::White);
    let b_pieces = pos.piece_material(Color::Black);

    if w_pawns + b_pawns == 0 && w_pieces < ROOK_VALUE && b_pieces < ROOK_VALUE {
        return 0;
    }
    if let Some(s) = recognised(pos, score, bitbases) {
        return s;
    }

    let heavy_or_knight = |color| {
        pos.pieces_of(PieceKind::Rook, color) | pos.pieces_of(PieceKind::Knight, color) | pos.pieces_of(PieceKind::Queen, color)
    };

    if score > 0 {
        if w_pawns == 0 && w_pieces <= b_pieces + BISHOP_VALUE {
            return if w_pieces < ROOK_VALUE { -b_mtrl / 50 } else { score / 8 };
        }
        if heavy_or_knight(Color::White).is_empty() && wrong_rook_pawn(pos, Color::White) {
            return 0;
        }
    }
    if b_pawns == 0 {
        if let Some(s) = excess_material(pos, score, Color::White) {
            return s;
        }
        if w_pieces + b_pieces == 0 && w_pawns == PAWN_VALUE {
            if let Some(wp) = single(pos, Piece::WHITE_PAWN) {
                let wk = pos.king_square(Color::White);
                let bk = pos.king_square(Color::Black);
                return kpk(bitbases, wk, bk, wp, pos.white_to_move());
            }
        }
    }

    if score < 0 {
        if b_pawns == 0 && b_pieces <= w_pieces + BISHOP_VALUE {
            return if b_pieces < ROOK_VALUE { w_mtrl / 50 } else { score / 8 };
        }
        if heavy_or_knight(Color::Black).is_empty() && wrong_rook_pawn(pos, Color::Black) {
            return 0;
        }
    }
    if w_pawns == 0 {
        if let Some(s) = excess_material(pos, -score, Color::Black) {
            return -s;
        }
        if w_pieces + b_pieces == 0 && b_pawns == PAWN_VALUE {
            if let Some(bp) = single(pos, Piece::BLACK_PAWN) {
                let wk = pos.king_square(Color::White);
                let bk = pos.king_square(Color::Black);
                return -kpk(bitbases, rotate(bk), rotate(wk), rotate(bp), !pos.white_to_move());
            }
        }
    }
    score
}
