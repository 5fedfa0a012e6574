//! Castling rights as a 4-bit mask, one bit per rook corner.

use std::fmt;

use crate::color::Color;
use crate::error::FenError;
use crate::square::Square;

/// Which side of the board to castle toward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CastleSide {
    KingSide,
    QueenSide,
}

/// Castling rights. Bit 0 = a1 (white long), 1 = h1 (white short),
/// 2 = a8 (black long), 3 = h8 (black short). The raw value indexes the
/// castling Zobrist keys.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct CastleRights(u8);

impl CastleRights {
    pub const NONE: CastleRights = CastleRights(0);
    pub const ALL: CastleRights = CastleRights(0b1111);

    pub const WHITE_QUEEN: CastleRights = CastleRights(0b0001);
    pub const WHITE_KING: CastleRights = CastleRights(0b0010);
    pub const BLACK_QUEEN: CastleRights = CastleRights(0b0100);
    pub const BLACK_KING: CastleRights = CastleRights(0b1000);

    #[inline]
    pub const fn new(bits: u8) -> CastleRights {
        CastleRights(bits & 0b1111)
    }

    #[inline]
    pub const fn bits(self) -> u8 {
        self.0
    }

    #[inline]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    #[inline]
    pub const fn contains(self, other: CastleRights) -> bool {
        (self.0 & other.0) == other.0
    }

    #[inline]
    pub const fn insert(self, other: CastleRights) -> CastleRights {
        CastleRights(self.0 | other.0)
    }

    #[inline]
    pub const fn remove(self, other: CastleRights) -> CastleRights {
        CastleRights(self.0 & !other.0)
    }

    #[inline]
    pub const fn has(self, color: Color, side: CastleSide) -> bool {
        self.contains(Self::flag(color, side))
    }

    /// Both rights of `color`.
    #[inline]
    pub const fn both(color: Color) -> CastleRights {
        match color {
            Color::White => CastleRights(0b0011),
            Color::Black => CastleRights(0b1100),
        }
    }

    #[inline]
    pub const fn flag(color: Color, side: CastleSide) -> CastleRights {
        match (color, side) {
            (Color::White, CastleSide::QueenSide) => Self::WHITE_QUEEN,
            (Color::White, CastleSide::KingSide) => Self::WHITE_KING,
            (Color::Black, CastleSide::QueenSide) => Self::BLACK_QUEEN,
            (Color::Black, CastleSide::KingSide) => Self::BLACK_KING,
        }
    }

    /// The right tied to the rook standing on corner `sq`, or no rights for
    /// any other square.
    #[inline]
    pub const fn for_corner(sq: Square) -> CastleRights {
        match sq.index() {
            0 => Self::WHITE_QUEEN,
            7 => Self::WHITE_KING,
            56 => Self::BLACK_QUEEN,
            63 => Self::BLACK_KING,
            _ => Self::NONE,
        }
    }

    /// Parse the FEN castling field ("KQkq", "-", ...).
    pub fn from_fen(s: &str) -> Result<CastleRights, FenError> {
        if s == "-" {
            return Ok(CastleRights::NONE);
        }
        s.chars().try_fold(CastleRights::NONE, |rights, c| {
            let flag = match c {
                'K' => Self::WHITE_KING,
                'Q' => Self::WHITE_QUEEN,
                'k' => Self::BLACK_KING,
                'q' => Self::BLACK_QUEEN,
                _ => return Err(FenError::InvalidCastlingChar { character: c }),
            };
            Ok(rights.insert(flag))
        })
    }

    pub fn to_fen(self) -> String {
        if self.is_empty() {
            return "-".to_string();
        }
        [
            (Self::WHITE_KING, 'K'),
            (Self::WHITE_QUEEN, 'Q'),
            (Self::BLACK_KING, 'k'),
            (Self::BLACK_QUEEN, 'q'),
        ]
        .iter()
        .filter(|(flag, _)| self.contains(*flag))
        .map(|&(_, c)| c)
        .collect()
    }
}

impl fmt::Display for CastleRights {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_fen())
    }
}

impl fmt::Debug for CastleRights {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CastleRights({})", self.to_fen())
    }
}
