//! Engine error types.

use std::path::PathBuf;

use magpie_core::TableError;

/// Failure to load endgame bitbases.
#[derive(Debug, thiserror::Error)]
pub enum BitbaseError {
    #[error("cannot read bitbase {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{name} bitbase has {found} bytes, expected {expected}")]
    WrongSize { name: &'static str, expected: usize, found: usize },
}

/// Failure to load or build an opening book.
#[derive(Debug, thiserror::Error)]
pub enum BookError {
    #[error("cannot read opening book {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Records are two bytes each.
    #[error("opening book has odd length {len}")]
    OddLength { len: usize },

    /// A binary record does not encode a legal move in its line.
    #[error("opening book record {index} is not a legal move")]
    CorruptRecord { index: usize },

    /// A text book line contains a move that is not legal.
    #[error("opening book line {line}: illegal move \"{text}\"")]
    IllegalLine { line: usize, text: String },
}

/// Errors from building an [`Engine`](crate::Engine).
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error(transparent)]
    Tables(#[from] TableError),

    #[error(transparent)]
    Bitbase(#[from] BitbaseError),

    #[error(transparent)]
    Book(#[from] BookError),
}
