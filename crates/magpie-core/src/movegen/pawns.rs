//! Per-colour pawn geometry for set-wise pawn move generation.

use crate::bitboard::Bitboard;
use crate::color::Color;

/// Shifts and rank masks for the pawns of one colour. Shift amounts are
/// signed square deltas: positive moves toward rank 8.
pub(super) struct PawnGeometry {
    pub push: i8,
    /// Capture toward the a-file; the destination can never be on the h-file.
    pub west: i8,
    /// Capture toward the h-file; the destination can never be on the a-file.
    pub east: i8,
    /// Rank a single push lands on when a double push is still possible.
    pub double_rank: Bitboard,
    /// Rank the pawns promote from.
    pub seventh: Bitboard,
    /// Rank the pawns promote on.
    pub last: Bitboard,
}

impl PawnGeometry {
    pub const fn of(color: Color) -> PawnGeometry {
        match color {
            Color::White => PawnGeometry {
                push: 8,
                west: 7,
                east: 9,
                double_rank: Bitboard::RANK_3,
                seventh: Bitboard::RANK_7,
                last: Bitboard::RANK_8,
            },
            Color::Black => PawnGeometry {
                push: -8,
                west: -9,
                east: -7,
                double_rank: Bitboard::RANK_6,
                seventh: Bitboard::RANK_2,
                last: Bitboard::RANK_1,
            },
        }
    }

    #[inline]
    pub fn pushes(&self, pawns: Bitboard, empty: Bitboard) -> Bitboard {
        shift(pawns, self.push) & empty
    }

    #[inline]
    pub fn west_captures(&self, pawns: Bitboard, targets: Bitboard) -> Bitboard {
        shift(pawns, self.west) & Bitboard::NOT_FILE_H & targets
    }

    #[inline]
    pub fn east_captures(&self, pawns: Bitboard, targets: Bitboard) -> Bitboard {
        shift(pawns, self.east) & Bitboard::NOT_FILE_A & targets
    }
}

/// Shift every bit by a signed square delta.
#[inline]
pub(super) fn shift(bb: Bitboard, delta: i8) -> Bitboard {
    if delta >= 0 {
        bb << delta as u8
    } else {
        bb >> delta.unsigned_abs()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::square::Square;

    #[test]
    fn black_captures_do_not_wrap() {
        let g = PawnGeometry::of(Color::Black);
        let pawn = Square::A5.bitboard();
        assert!(g.west_captures(pawn, Bitboard::FULL).is_empty());
        assert_eq!(g.east_captures(pawn, Bitboard::FULL), Square::B4.bitboard());
    }

    #[test]
    fn white_pushes_stop_at_blockers() {
        let g = PawnGeometry::of(Color::White);
        let pawns = Square::E2.bitboard() | Square::D2.bitboard();
        let empty = !Square::E3.bitboard();
        assert_eq!(g.pushes(pawns, empty), Square::D3.bitboard());
    }
}
