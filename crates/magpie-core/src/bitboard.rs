//! 64-bit square sets in little-endian rank-file order (a1 = bit 0).

use std::fmt;
use std::ops::{BitAnd, BitAndAssign, BitOr, BitOrAssign, BitXor, BitXorAssign, Not, Shl, Shr};

use crate::square::Square;

/// A set of squares packed into a `u64`.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Bitboard(u64);

impl Bitboard {
    pub const EMPTY: Bitboard = Bitboard(0);
    pub const FULL: Bitboard = Bitboard(!0);

    pub const RANK_1: Bitboard = Bitboard(0x0000_0000_0000_00FF);
    pub const RANK_2: Bitboard = Bitboard(0x0000_0000_0000_FF00);
    pub const RANK_3: Bitboard = Bitboard(0x0000_0000_00FF_0000);
    pub const RANK_4: Bitboard = Bitboard(0x0000_0000_FF00_0000);
    pub const RANK_5: Bitboard = Bitboard(0x0000_00FF_0000_0000);
    pub const RANK_6: Bitboard = Bitboard(0x0000_FF00_0000_0000);
    pub const RANK_7: Bitboard = Bitboard(0x00FF_0000_0000_0000);
    pub const RANK_8: Bitboard = Bitboard(0xFF00_0000_0000_0000);

    /// Ranks 1 and 8, where pawns promote.
    pub const BACK_RANKS: Bitboard = Bitboard(0xFF00_0000_0000_00FF);

    pub const FILE_A: Bitboard = Bitboard(0x0101_0101_0101_0101);
    pub const FILE_H: Bitboard = Bitboard(0x8080_8080_8080_8080);

    /// Every file except H. Mask after a shift that moves pieces towards
    /// the a-file so nothing wraps onto the h-file.
    pub const NOT_FILE_H: Bitboard = Bitboard(0x7F7F_7F7F_7F7F_7F7F);
    /// Every file except A.
    pub const NOT_FILE_A: Bitboard = Bitboard(0xFEFE_FEFE_FEFE_FEFE);

    pub const DARK_SQUARES: Bitboard = Bitboard(0xAA55_AA55_AA55_AA55);
    pub const LIGHT_SQUARES: Bitboard = Bitboard(0x55AA_55AA_55AA_55AA);
    pub const CORNERS: Bitboard = Bitboard(0x8100_0000_0000_0081);

    /// The mask of the file with the given index (0 = a-file).
    #[inline]
    pub const fn file(file: u8) -> Bitboard {
        Bitboard(Self::FILE_A.0 << file)
    }

    /// The mask of the rank with the given index (0 = first rank).
    #[inline]
    pub const fn rank(rank: u8) -> Bitboard {
        Bitboard(Self::RANK_1.0 << (rank * 8))
    }

    #[inline]
    pub const fn new(bits: u64) -> Bitboard {
        Bitboard(bits)
    }

    #[inline]
    pub const fn inner(self) -> u64 {
        self.0
    }

    #[inline]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    #[inline]
    pub const fn is_nonempty(self) -> bool {
        self.0 != 0
    }

    /// Return `true` if two or more squares are set.
    #[inline]
    pub const fn more_than_one(self) -> bool {
        self.0 & self.0.wrapping_sub(1) != 0
    }

    #[inline]
    pub const fn count(self) -> u32 {
        self.0.count_ones()
    }

    #[inline]
    pub const fn contains(self, sq: Square) -> bool {
        (self.0 & (1u64 << sq.index())) != 0
    }

    #[inline]
    pub const fn with(self, sq: Square) -> Bitboard {
        Bitboard(self.0 | (1u64 << sq.index()))
    }

    #[inline]
    pub const fn without(self, sq: Square) -> Bitboard {
        Bitboard(self.0 & !(1u64 << sq.index()))
    }

    /// The lowest set square, or `None` if the set is empty.
    #[inline]
    pub const fn lsb(self) -> Option<Square> {
        if self.0 == 0 {
            None
        } else {
            Some(Square::from_index_unchecked(self.0.trailing_zeros() as u8))
        }
    }

    /// Smear every set bit towards rank 8.
    #[inline]
    pub const fn north_fill(self) -> Bitboard {
        let mut m = self.0;
        m |= m << 8;
        m |= m << 16;
        m |= m << 32;
        Bitboard(m)
    }

    /// Smear every set bit towards rank 1.
    #[inline]
    pub const fn south_fill(self) -> Bitboard {
        let mut m = self.0;
        m |= m >> 8;
        m |= m >> 16;
        m |= m >> 32;
        Bitboard(m)
    }

    /// Squares diagonally in front of these squares, from White's view.
    #[inline]
    pub const fn white_pawn_attacks(self) -> Bitboard {
        Bitboard(((self.0 << 7) & Self::NOT_FILE_H.0) | ((self.0 << 9) & Self::NOT_FILE_A.0))
    }

    /// Squares diagonally in front of these squares, from Black's view.
    #[inline]
    pub const fn black_pawn_attacks(self) -> Bitboard {
        Bitboard(((self.0 >> 9) & Self::NOT_FILE_H.0) | ((self.0 >> 7) & Self::NOT_FILE_A.0))
    }
}

impl BitAnd for Bitboard {
    type Output = Bitboard;
    #[inline]
    fn bitand(self, rhs: Bitboard) -> Bitboard {
        Bitboard(self.0 & rhs.0)
    }
}

impl BitAndAssign for Bitboard {
    #[inline]
    fn bitand_assign(&mut self, rhs: Bitboard) {
        self.0 &= rhs.0;
    }
}

impl BitOr for Bitboard {
    type Output = Bitboard;
    #[inline]
    fn bitor(self, rhs: Bitboard) -> Bitboard {
        Bitboard(self.0 | rhs.0)
    }
}

impl BitOrAssign for Bitboard {
    #[inline]
    fn bitor_assign(&mut self, rhs: Bitboard) {
        self.0 |= rhs.0;
    }
}

impl BitXor for Bitboard {
    type Output = Bitboard;
    #[inline]
    fn bitxor(self, rhs: Bitboard) -> Bitboard {
        Bitboard(self.0 ^ rhs.0)
    }
}

impl BitXorAssign for Bitboard {
    #[inline]
    fn bitxor_assign(&mut self, rhs: Bitboard) {
        self.0 ^= rhs.0;
    }
}

impl Not for Bitboard {
    type Output = Bitboard;
    #[inline]
    fn not(self) -> Bitboard {
        Bitboard(!self.0)
    }
}

impl Shl<u8> for Bitboard {
    type Output = Bitboard;
    #[inline]
    fn shl(self, rhs: u8) -> Bitboard {
        Bitboard(self.0 << rhs)
    }
}

impl Shr<u8> for Bitboard {
    type Output = Bitboard;
    #[inline]
    fn shr(self, rhs: u8) -> Bitboard {
        Bitboard(self.0 >> rhs)
    }
}

impl Iterator for Bitboard {
    type Item = Square;

    #[inline]
    fn next(&mut self) -> Option<Square> {
        let sq = self.lsb()?;
        self.0 &= self.0 - 1;
        Some(sq)
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        let count = self.count() as usize;
        (count, Some(count))
    }
}

impl ExactSizeIterator for Bitboard {}

impl fmt::Debug for Bitboard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f)?;
        for rank in (0..8u8).rev() {
            write!(f, "  {} ", rank + 1)?;
            for file in 0..8u8 {
                let mark = if (self.0 >> (rank * 8 + file)) & 1 == 1 { 'x' } else { '.' };
                write!(f, "{mark} ")?;
            }
            writeln!(f)?;
        }
        write!(f, "    a b c d e f g h")
    }
}

#[cfg(test)]
mod tests {
    use super::Bitboard;
    use crate::square::Square;

    #[test]
    fn with_without_contains() {
        let bb = Bitboard::EMPTY.with(Square::E4).with(Square::A1);
        assert!(bb.contains(Square::E4));
        assert!(!bb.contains(Square::D4));
        assert_eq!(bb.count(), 2);
        assert!(bb.more_than_one());
        assert!(!bb.without(Square::E4).more_than_one());
        assert!(bb.without(Square::E4).without(Square::A1).is_empty());
    }

    #[test]
    fn file_and_rank_masks() {
        for i in 0..8u8 {
            assert_eq!(Bitboard::file(i).count(), 8);
            assert_eq!(Bitboard::rank(i).count(), 8);
            assert_eq!((Bitboard::file(i) & Bitboard::rank(i)).count(), 1);
        }
        assert_eq!(Bitboard::file(7), Bitboard::FILE_H);
        assert_eq!(Bitboard::rank(7), Bitboard::RANK_8);
    }

    #[test]
    fn colour_masks_partition_the_board() {
        assert_eq!(Bitboard::DARK_SQUARES | Bitboard::LIGHT_SQUARES, Bitboard::FULL);
        assert!((Bitboard::DARK_SQUARES & Bitboard::LIGHT_SQUARES).is_empty());
        assert!(Bitboard::DARK_SQUARES.contains(Square::A1));
        assert!(Bitboard::LIGHT_SQUARES.contains(Square::H1));
    }

    #[test]
    fn fills() {
        let e4 = Square::E4.bitboard();
        let north = e4.north_fill();
        assert_eq!(north.count(), 5);
        assert!(north.contains(Square::E8));
        assert!(!north.contains(Square::E3));
        let south = e4.south_fill();
        assert_eq!(south.count(), 4);
        assert!(south.contains(Square::E1));
    }

    #[test]
    fn pawn_attack_shifts_do_not_wrap() {
        let a4 = Square::A4.bitboard();
        assert_eq!(a4.white_pawn_attacks(), Square::B5.bitboard());
        assert_eq!(a4.black_pawn_attacks(), Square::B3.bitboard());
        let h4 = Square::H4.bitboard();
        assert_eq!(h4.white_pawn_attacks(), Square::G5.bitboard());
    }

    #[test]
    fn iterates_in_index_order() {
        let bb = Bitboard::EMPTY.with(Square::H8).with(Square::A1).with(Square::E4);
        assert_eq!(bb.len(), 3);
        let squares: Vec<_> = bb.collect();
        assert_eq!(squares, vec![Square::A1, Square::E4, Square::H8]);
    }

    #[test]
    fn shifts() {
        assert_eq!(Bitboard::RANK_1 << 8, Bitboard::RANK_2);
        assert_eq!(Bitboard::RANK_2 >> 8, Bitboard::RANK_1);
    }
}
