//! King safety: pawn shelter, half-open files near the king, castled kings
//! boxed in by their own rook, and attacks on the king zone.
//!
//! The pawn-and-king part is cached in a direct-mapped table keyed by the
//! pawn hash combined with the king hash.

use magpie_core::{Bitboard, Color, PieceKind, Position};

use super::{BISHOP_VALUE, EvalState, KNIGHT_VALUE, QUEEN_VALUE, ROOK_VALUE, interpolate};

const CACHE_SIZE: usize = 1 << 15;

#[derive(Debug, Clone, Copy)]
struct KingEntry {
    key: u64,
    score: i32,
}

pub(super) struct KingSafetyCache {
    entries: Vec<KingEntry>,
}

/// Penalty for half-open files in front of the king: outer files cost more
/// than the centre files.
fn half_open_penalty(open_files: u64) -> i32 {
    25 * (open_files & 0xe7).count_ones() as i32 + 10 * (open_files & 0x18).count_ones() as i32
}

/// Shelter score of a white king on rank 1 or 2, computed on bitboards
/// already mirrored so the king's side is White.
fn shelter_score(king_file: u8, own_pawns: u64, enemy_pawns: u64) -> i32 {
    let mut shelter = 1u64 << king_file;
    shelter |= ((shelter & Bitboard::NOT_FILE_A.inner()) >> 1) | ((shelter & Bitboard::NOT_FILE_H.inner()) << 1);
    shelter <<= 8;
    let mut safety = 3 * (own_pawns & shelter).count_ones() as i32;
    safety -= 2 * (enemy_pawns & (shelter | (shelter << 8))).count_ones() as i32;
    shelter <<= 8;
    safety += 2 * (own_pawns & shelter).count_ones() as i32;
    shelter <<= 8;
    safety -= (enemy_pawns & shelter).count_ones() as i32;

    let shelter_files = Bitboard::new(shelter).south_fill().inner() & 0xff;
    let own_files = Bitboard::new(own_pawns).south_fill().inner();
    let enemy_files = Bitboard::new(enemy_pawns).south_fill().inner();
    let half_open = half_open_penalty(shelter_files & !own_files & 0xff)
        + half_open_penalty(shelter_files & !enemy_files & 0xff);
    (safety.min(8) - 9) * 15 - half_open
}

fn compute_score(pos: &Position) -> i32 {
    let w_pawns = pos.pieces_of(PieceKind::Pawn, Color::White).inner();
    let b_pawns = pos.pieces_of(PieceKind::Pawn, Color::Black).inner();
    let mut score = 0;

    let wk = pos.king_square(Color::White);
    score += if wk.rank() < 2 { shelter_score(wk.file(), w_pawns, b_pawns) } else { -9 * 15 };

    let bk = pos.king_square(Color::Black);
    score -= if bk.rank() >= 6 {
        shelter_score(bk.file(), b_pawns.swap_bytes(), w_pawns.swap_bytes())
    } else {
        -9 * 15
    };
    score
}

/// A king on f1/g1 with its rook on g1/h1 behind the g and h pawns, or
/// the same on the queen side.
fn boxed_in(pos: &Position, color: Color) -> bool {
    let (king, rook, pawns) = (
        pos.pieces_of(PieceKind::King, color).inner(),
        pos.pieces_of(PieceKind::Rook, color).inner(),
        pos.pieces_of(PieceKind::Pawn, color),
    );
    let (king, rook) = match color {
        Color::White => (king, rook),
        Color::Black => (king.swap_bytes(), rook.swap_bytes()),
    };
    let has_pawns_on = |a: u8, b: u8| {
        (pawns & Bitboard::file(a)).is_nonempty() && (pawns & Bitboard::file(b)).is_nonempty()
    };
    (king & 0x60 != 0 && rook & 0xC0 != 0 && has_pawns_on(6, 7))
        || (king & 0x06 != 0 && rook & 0x03 != 0 && has_pawns_on(0, 1))
}

impl KingSafetyCache {
    pub(super) fn new() -> Self {
        Self { entries: vec![KingEntry { key: u64::MAX, score: 0 }; CACHE_SIZE] }
    }

    fn pawn_shelter(&mut self, pos: &Position) -> i32 {
        let key = pos.pawn_zobrist_hash() ^ pos.king_zobrist_hash();
        let slot = &mut self.entries[(key as usize) & (CACHE_SIZE - 1)];
        if slot.key != key {
            *slot = KingEntry { key, score: compute_score(pos) };
        }
        slot.score
    }

    /// Positive when White's king is the safer one. Fades out as the
    /// pieces come off.
    pub(super) fn king_safety(&mut self, pos: &Position, state: &EvalState) -> i32 {
        let min_m = ROOK_VALUE + BISHOP_VALUE;
        let m = (pos.piece_material(Color::White) + pos.piece_material(Color::Black)) / 2;
        if m <= min_m {
            return 0;
        }
        let max_m = QUEEN_VALUE + 2 * ROOK_VALUE + 2 * BISHOP_VALUE + 2 * KNIGHT_VALUE;

        let mut score = self.pawn_shelter(pos);
        if pos.king_square(Color::White).rank() == 0 && boxed_in(pos, Color::White) {
            score -= 6 * 15;
        }
        if pos.king_square(Color::Black).rank() == 7 && boxed_in(pos, Color::Black) {
            score += 6 * 15;
        }
        score += (state.black_king_attacks - state.white_king_attacks) * 4;
        interpolate(m, min_m, 0, max_m, score)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use magpie_core::Tables;

    fn position(fen: &str) -> Position {
        Position::from_fen(fen, Tables::shared().unwrap()).unwrap()
    }

    #[test]
    fn start_position_is_symmetric() {
        assert_eq!(compute_score(&position(magpie_core::START_FEN)), 0);
    }

    #[test]
    fn missing_shelter_pawns_hurt() {
        let intact = position("rnbq1rk1/ppppbppp/5n2/4p3/4P3/5N2/PPPPBPPP/RNBQ1RK1 w - - 0 1");
        let broken = position("rnbq1rk1/ppppbppp/5n2/4p3/4P3/5N2/PPPPBP2/RNBQ1RK1 w - - 0 1");
        assert!(compute_score(&intact) > compute_score(&broken));
    }

    #[test]
    fn boxed_in_rook() {
        let pos = position("4k3/8/8/8/8/8/6PP/5K1R w - - 0 1");
        assert!(boxed_in(&pos, Color::White));
        assert!(!boxed_in(&pos, Color::Black));
    }
}
