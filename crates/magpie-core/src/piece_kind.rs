//! Piece kinds and their material values.

/// A piece kind without colour, ordered from pawn to king.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum PieceKind {
    Pawn = 0,
    Knight = 1,
    Bishop = 2,
    Rook = 3,
    Queen = 4,
    King = 5,
}

impl PieceKind {
    pub const COUNT: usize = 6;

    pub const ALL: [PieceKind; 6] = [
        PieceKind::Pawn,
        PieceKind::Knight,
        PieceKind::Bishop,
        PieceKind::Rook,
        PieceKind::Queen,
        PieceKind::King,
    ];

    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Material value in centipawn-like units. The king carries a large
    /// value so that exchange and ordering code can treat a king capture as
    /// decisive.
    #[inline]
    pub const fn value(self) -> i32 {
        match self {
            PieceKind::Pawn => 92,
            PieceKind::Knight => 385,
            PieceKind::Bishop => 385,
            PieceKind::Rook => 593,
            PieceKind::Queen => 1244,
            PieceKind::King => 9900,
        }
    }

    #[inline]
    pub const fn is_slider(self) -> bool {
        matches!(self, PieceKind::Bishop | PieceKind::Rook | PieceKind::Queen)
    }

    /// Lowercase letter used for this kind in FEN and UCI promotions.
    pub const fn char(self) -> char {
        match self {
            PieceKind::Pawn => 'p',
            PieceKind::Knight => 'n',
            PieceKind::Bishop => 'b',
            PieceKind::Rook => 'r',
            PieceKind::Queen => 'q',
            PieceKind::King => 'k',
        }
    }

    /// Parse a piece letter in either case.
    pub const fn from_char(c: char) -> Option<PieceKind> {
        match c.to_ascii_lowercase() {
            'p' => Some(PieceKind::Pawn),
            'n' => Some(PieceKind::Knight),
            'b' => Some(PieceKind::Bishop),
            'r' => Some(PieceKind::Rook),
            'q' => Some(PieceKind::Queen),
            'k' => Some(PieceKind::King),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::PieceKind;

    #[test]
    fn char_round_trip() {
        for kind in PieceKind::ALL {
            assert_eq!(PieceKind::from_char(kind.char()), Some(kind));
            assert_eq!(PieceKind::from_char(kind.char().to_ascii_uppercase()), Some(kind));
        }
        assert_eq!(PieceKind::from_char('x'), None);
    }

    #[test]
    fn values_are_ordered() {
        let values: Vec<i32> = PieceKind::ALL.iter().map(|k| k.value()).collect();
        assert!(values.windows(2).all(|w| w[0] <= w[1]));
        assert_eq!(PieceKind::Knight.value(), PieceKind::Bishop.value());
    }
}
