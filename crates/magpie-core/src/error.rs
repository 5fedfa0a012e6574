//! Error types for table construction, FEN parsing and move text.

use thiserror::Error;

/// Failure while building the precomputed attack tables.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TableError {
    /// Two occupancy subsets of one square hash to the same slot but have
    /// different attack sets, so the magic constant is unusable.
    #[error("{slider} magic for square {square} maps distinct attack sets to one slot")]
    MagicCollision { square: u8, slider: &'static str },
}

/// Errors that occur when parsing a FEN string.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FenError {
    #[error("expected at least 4 FEN fields, found {found}")]
    WrongFieldCount { found: usize },
    #[error("expected 8 ranks in piece placement, found {found}")]
    WrongRankCount { found: usize },
    #[error("rank {rank_index} describes {length} squares, expected 8")]
    BadRankLength { rank_index: usize, length: usize },
    #[error("invalid piece character: '{character}'")]
    InvalidPieceChar { character: char },
    #[error("invalid active color: \"{found}\"")]
    InvalidColor { found: String },
    #[error("invalid castling character: '{character}'")]
    InvalidCastlingChar { character: char },
    #[error("invalid en passant square: \"{found}\"")]
    InvalidEnPassant { found: String },
    #[error("invalid {field}: \"{found}\"")]
    InvalidMoveCounter { field: &'static str, found: String },
    #[error("invalid position: {0}")]
    InvalidPosition(#[from] PositionError),
}

/// Structural problems that make a position unusable for search.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PositionError {
    #[error("expected 1 king for {color}, found {count}")]
    InvalidKingCount { color: &'static str, count: u32 },
    #[error("pawns found on back rank")]
    PawnsOnBackRank,
    #[error("the side not to move is in check")]
    OpponentInCheck,
}

/// Errors from parsing coordinate move text such as `e7e8q`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MoveParseError {
    #[error("malformed move text: \"{0}\"")]
    Malformed(String),
    #[error("move {0} is not legal in this position")]
    Illegal(String),
}

#[cfg(test)]
mod tests {
    use super::{FenError, PositionError, TableError};

    #[test]
    fn messages() {
        let err = FenError::WrongFieldCount { found: 2 };
        assert_eq!(err.to_string(), "expected at least 4 FEN fields, found 2");
        let err = TableError::MagicCollision { square: 9, slider: "rook" };
        assert_eq!(err.to_string(), "rook magic for square 9 maps distinct attack sets to one slot");
    }

    #[test]
    fn position_error_converts_into_fen_error() {
        let err: FenError = PositionError::PawnsOnBackRank.into();
        assert!(matches!(err, FenError::InvalidPosition(PositionError::PawnsOnBackRank)));
    }
}
