//! Board squares, indexed a1 = 0 through h8 = 63.

use std::fmt;

use crate::bitboard::Bitboard;

/// A square on the board. The index is `rank * 8 + file`.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Square(u8);

macro_rules! square_consts {
    (@rank $rank:literal, $file:expr, $name:ident $(, $rest:ident)*) => {
        pub const $name: Square = Square($rank * 8 + $file);
        square_consts!(@rank $rank, $file + 1, $($rest),*);
    };
    (@rank $rank:literal, $file:expr,) => {};
    (@rank $rank:literal, $file:expr) => {};
    ($($rank:literal => [$($name:ident),*]),* $(,)?) => {
        impl Square {
            $(square_consts!(@rank $rank, 0, $($name),*);)*
        }
    };
}

square_consts! {
    0 => [A1, B1, C1, D1, E1, F1, G1, H1],
    1 => [A2, B2, C2, D2, E2, F2, G2, H2],
    2 => [A3, B3, C3, D3, E3, F3, G3, H3],
    3 => [A4, B4, C4, D4, E4, F4, G4, H4],
    4 => [A5, B5, C5, D5, E5, F5, G5, H5],
    5 => [A6, B6, C6, D6, E6, F6, G6, H6],
    6 => [A7, B7, C7, D7, E7, F7, G7, H7],
    7 => [A8, B8, C8, D8, E8, F8, G8, H8],
}

impl Square {
    pub const COUNT: usize = 64;

    /// Build a square from an index that the caller knows is below 64.
    #[inline]
    pub const fn new(index: u8) -> Square {
        debug_assert!(index < 64);
        Square(index)
    }

    #[inline]
    pub const fn from_index(index: u8) -> Option<Square> {
        if index < 64 { Some(Square(index)) } else { None }
    }

    #[inline]
    pub(crate) const fn from_index_unchecked(index: u8) -> Square {
        Square(index)
    }

    /// Build a square from zero-based file and rank numbers.
    #[inline]
    pub const fn from_coords(file: u8, rank: u8) -> Square {
        debug_assert!(file < 8 && rank < 8);
        Square(rank * 8 + file)
    }

    /// Parse a lowercase coordinate such as `e4`.
    pub fn from_algebraic(s: &str) -> Option<Square> {
        match s.as_bytes() {
            &[f @ b'a'..=b'h', r @ b'1'..=b'8'] => Some(Square::from_coords(f - b'a', r - b'1')),
            _ => None,
        }
    }

    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    /// Zero-based file, 0 = a-file.
    #[inline]
    pub const fn file(self) -> u8 {
        self.0 & 7
    }

    /// Zero-based rank, 0 = first rank.
    #[inline]
    pub const fn rank(self) -> u8 {
        self.0 >> 3
    }

    /// The square reflected across the horizontal centre line.
    #[inline]
    pub const fn flip_rank(self) -> Square {
        Square(self.0 ^ 56)
    }

    /// The square `delta` steps away in index space. The caller guarantees
    /// the result is on the board.
    #[inline]
    pub const fn offset(self, delta: i8) -> Square {
        let idx = self.0 as i8 + delta;
        debug_assert!(idx >= 0 && idx < 64);
        Square(idx as u8)
    }

    /// Return `true` for a1, c1, ... (the colour of a1).
    #[inline]
    pub const fn is_dark(self) -> bool {
        (self.file() & 1) == (self.rank() & 1)
    }

    #[inline]
    pub const fn bitboard(self) -> Bitboard {
        Bitboard::new(1u64 << self.0)
    }

    pub fn all() -> impl Iterator<Item = Square> {
        (0u8..64).map(Square)
    }
}

impl fmt::Display for Square {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", (b'a' + self.file()) as char, self.rank() + 1)
    }
}

impl fmt::Debug for Square {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Square({self})")
    }
}

#[cfg(test)]
mod tests {
    use super::Square;

    #[test]
    fn named_constants_match_coordinates() {
        assert_eq!(Square::A1.index(), 0);
        assert_eq!(Square::H1.index(), 7);
        assert_eq!(Square::E4, Square::from_coords(4, 3));
        assert_eq!(Square::H8.index(), 63);
    }

    #[test]
    fn algebraic_round_trip() {
        for sq in Square::all() {
            assert_eq!(Square::from_algebraic(&sq.to_string()), Some(sq));
        }
        assert_eq!(Square::from_algebraic("i1"), None);
        assert_eq!(Square::from_algebraic("a9"), None);
        assert_eq!(Square::from_algebraic("e"), None);
    }

    #[test]
    fn flip_and_offset() {
        assert_eq!(Square::E2.flip_rank(), Square::E7);
        assert_eq!(Square::E2.offset(16), Square::E4);
        assert_eq!(Square::E4.offset(-9), Square::D3);
    }

    #[test]
    fn square_colour() {
        assert!(Square::A1.is_dark());
        assert!(!Square::B1.is_dark());
        assert!(Square::H8.is_dark());
    }
}
