//! Moves packed into 16 bits, with a transient ordering score.

use std::fmt;
use std::hash::{Hash, Hasher};

use crate::error::MoveParseError;
use crate::movegen;
use crate::piece_kind::PieceKind;
use crate::position::Position;
use crate::square::Square;

const FROM_MASK: u16 = 0x003F;
const TO_SHIFT: u32 = 6;
const PROMO_SHIFT: u32 = 12;

/// A move encoded as
///
/// ```text
/// bits  0-5:  source square
/// bits  6-11: destination square
/// bits 12-15: promotion kind (0 = none, otherwise PieceKind index)
/// ```
///
/// plus a `score` used only for move ordering. Two moves are equal when
/// their encodings match, regardless of score.
#[derive(Clone, Copy, Default)]
pub struct Move {
    bits: u16,
    pub score: i32,
}

impl Move {
    /// The "no move" value (a1a1). Never produced by move generation.
    pub const EMPTY: Move = Move { bits: 0, score: 0 };

    #[inline]
    pub const fn new(from: Square, to: Square, promotion: Option<PieceKind>) -> Move {
        let promo = match promotion {
            Some(kind) => kind as u16,
            None => 0,
        };
        Move {
            bits: from.index() as u16 | (to.index() as u16) << TO_SHIFT | promo << PROMO_SHIFT,
            score: 0,
        }
    }

    /// Rebuild a move from [`Move::raw`]. Invalid promotion codes decode as
    /// no promotion.
    #[inline]
    pub const fn from_raw(bits: u16) -> Move {
        let promo = bits >> PROMO_SHIFT;
        let bits = if promo == 0 || promo >= PieceKind::King as u16 { bits & 0x0FFF } else { bits };
        Move { bits, score: 0 }
    }

    #[inline]
    pub const fn raw(self) -> u16 {
        self.bits
    }

    #[inline]
    pub const fn from(self) -> Square {
        Square::new((self.bits & FROM_MASK) as u8)
    }

    #[inline]
    pub const fn to(self) -> Square {
        Square::new(((self.bits >> TO_SHIFT) & FROM_MASK) as u8)
    }

    #[inline]
    pub const fn promotion(self) -> Option<PieceKind> {
        match self.bits >> PROMO_SHIFT {
            1 => Some(PieceKind::Knight),
            2 => Some(PieceKind::Bishop),
            3 => Some(PieceKind::Rook),
            4 => Some(PieceKind::Queen),
            _ => None,
        }
    }

    #[inline]
    pub const fn is_promotion(self) -> bool {
        self.bits >> PROMO_SHIFT != 0
    }

    /// Return `true` for [`Move::EMPTY`] and any other move with
    /// identical source and destination.
    #[inline]
    pub const fn is_empty(self) -> bool {
        self.bits & FROM_MASK == (self.bits >> TO_SHIFT) & FROM_MASK
    }

    #[inline]
    pub const fn with_score(mut self, score: i32) -> Move {
        self.score = score;
        self
    }

    /// Coordinate notation, e.g. `e2e4` or `e7e8q`. The empty move prints
    /// as `0000`.
    pub fn to_uci(self) -> String {
        if self.is_empty() {
            return "0000".to_string();
        }
        let mut s = format!("{}{}", self.from(), self.to());
        if let Some(kind) = self.promotion() {
            s.push(kind.char());
        }
        s
    }

    /// Parse coordinate notation and check that the move is legal in `pos`.
    /// The returned move carries the generator's encoding.
    pub fn from_uci(pos: &mut Position, text: &str) -> Result<Move, MoveParseError> {
        let malformed = || MoveParseError::Malformed(text.to_string());
        if !(4..=5).contains(&text.len()) || !text.is_ascii() {
            return Err(malformed());
        }
        let from = Square::from_algebraic(&text[0..2]).ok_or_else(malformed)?;
        let to = Square::from_algebraic(&text[2..4]).ok_or_else(malformed)?;
        let promotion = match text[4..].chars().next() {
            None => None,
            Some(c) => match PieceKind::from_char(c) {
                Some(k @ (PieceKind::Knight | PieceKind::Bishop | PieceKind::Rook | PieceKind::Queen)) => Some(k),
                _ => return Err(malformed()),
            },
        };
        let wanted = Move::new(from, to, promotion);
        movegen::legal_moves(pos)
            .iter()
            .copied()
            .find(|m| *m == wanted)
            .ok_or_else(|| MoveParseError::Illegal(text.to_string()))
    }
}

impl PartialEq for Move {
    #[inline]
    fn eq(&self, other: &Move) -> bool {
        self.bits == other.bits
    }
}

impl Eq for Move {}

impl Hash for Move {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.bits.hash(state);
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_uci())
    }
}

impl fmt::Debug for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Move({}, score={})", self.to_uci(), self.score)
    }
}

#[cfg(test)]
mod tests {
    use super::Move;
    use crate::piece_kind::PieceKind;
    use crate::square::Square;

    #[test]
    fn fields_round_trip() {
        let m = Move::new(Square::E7, Square::E8, Some(PieceKind::Queen));
        assert_eq!(m.from(), Square::E7);
        assert_eq!(m.to(), Square::E8);
        assert_eq!(m.promotion(), Some(PieceKind::Queen));
        assert_eq!(Move::from_raw(m.raw()), m);
        assert_eq!(m.to_uci(), "e7e8q");
    }

    #[test]
    fn equality_ignores_score() {
        let a = Move::new(Square::G1, Square::F3, None).with_score(50);
        let b = Move::new(Square::G1, Square::F3, None);
        assert_eq!(a, b);
        assert_ne!(a, Move::new(Square::G1, Square::H3, None));
    }

    #[test]
    fn empty_move() {
        assert!(Move::EMPTY.is_empty());
        assert!(!Move::new(Square::A1, Square::A2, None).is_empty());
        assert_eq!(Move::EMPTY.to_uci(), "0000");
    }
}
