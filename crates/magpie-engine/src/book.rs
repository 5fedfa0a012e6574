//! Opening book.
//!
//! The binary format is a sequence of big-endian 16-bit records, each one
//! move of an opening line played from the start position:
//!
//! ```text
//! bits  0-5   from square
//! bits  6-11  to square
//! bits 12-14  promotion: 0 none, 1 queen, 2 rook, 3 bishop, 4 knight
//! bit  15     bad move: played to reach later moves, never suggested
//! ```
//!
//! A zero record ends a line; the next record starts from the initial
//! position again. The text format has one line of space-separated
//! coordinate moves per opening, `?` marking a bad move and `#` starting a
//! comment line.

use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::sync::Arc;

use magpie_core::{Move, PieceKind, Position, Square, Tables, movegen};
use rand::Rng;
use tracing::debug;

use crate::error::BookError;

/// A book move and how many lines contain it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BookEntry {
    pub mv: Move,
    pub count: u32,
}

impl BookEntry {
    /// Selection weight, growing slower than the count so rare lines are
    /// still played now and then.
    pub fn weight(&self) -> u32 {
        let root = f64::from(self.count).sqrt();
        (root * root.sqrt() * 100.0 + 1.0) as u32
    }
}

/// Book moves keyed by position hash.
#[derive(Debug, Default)]
pub struct Book {
    entries: HashMap<u64, Vec<BookEntry>>,
    move_count: usize,
}

fn promotion_code(kind: Option<PieceKind>) -> u16 {
    match kind {
        Some(PieceKind::Queen) => 1,
        Some(PieceKind::Rook) => 2,
        Some(PieceKind::Bishop) => 3,
        Some(PieceKind::Knight) => 4,
        _ => 0,
    }
}

fn promotion_kind(code: u16) -> Option<PieceKind> {
    match code {
        1 => Some(PieceKind::Queen),
        2 => Some(PieceKind::Rook),
        3 => Some(PieceKind::Bishop),
        4 => Some(PieceKind::Knight),
        _ => None,
    }
}

fn encode(mv: Move, bad: bool) -> u16 {
    mv.from().index() as u16
        | (mv.to().index() as u16) << 6
        | promotion_code(mv.promotion()) << 12
        | u16::from(bad) << 15
}

fn decode(record: u16) -> (Move, bool) {
    let from = Square::new((record & 63) as u8);
    let to = Square::new(((record >> 6) & 63) as u8);
    let mv = Move::new(from, to, promotion_kind((record >> 12) & 7));
    (mv, record >> 15 != 0)
}

impl Book {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse the binary format. Every record must be a legal move in its
    /// line.
    pub fn from_bytes(bytes: &[u8], tables: Arc<Tables>) -> Result<Self, BookError> {
        if bytes.len() % 2 != 0 {
            return Err(BookError::OddLength { len: bytes.len() });
        }
        let start = Position::start(tables);
        let mut book = Self::new();
        let mut pos = start.clone();
        for (index, pair) in bytes.chunks_exact(2).enumerate() {
            let record = u16::from_be_bytes([pair[0], pair[1]]);
            if record == 0 {
                pos = start.clone();
                continue;
            }
            let (mv, bad) = decode(record);
            if !movegen::legal_moves(&mut pos).contains(mv) {
                return Err(BookError::CorruptRecord { index });
            }
            if !bad {
                book.add(&pos, mv);
            }
            pos.make_move(mv);
        }
        debug!(positions = book.entries.len(), moves = book.move_count, "opening book parsed");
        Ok(book)
    }

    pub fn load(path: &Path, tables: Arc<Tables>) -> Result<Self, BookError> {
        let bytes = fs::read(path).map_err(|source| BookError::Io { path: path.to_path_buf(), source })?;
        Self::from_bytes(&bytes, tables)
    }

    /// Compile text lines into the binary format.
    pub fn compile_text(text: &str, tables: Arc<Tables>) -> Result<Vec<u8>, BookError> {
        let start = Position::start(tables);
        let mut out = Vec::new();
        for (number, line) in text.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let mut pos = start.clone();
            for word in line.split_whitespace() {
                let (text, bad) = match word.strip_suffix('?') {
                    Some(text) => (text, true),
                    None => (word, false),
                };
                let mv = Move::from_uci(&mut pos, text)
                    .map_err(|_| BookError::IllegalLine { line: number + 1, text: word.to_string() })?;
                out.extend_from_slice(&encode(mv, bad).to_be_bytes());
                pos.make_move(mv);
            }
            out.extend_from_slice(&[0, 0]);
        }
        Ok(out)
    }

    /// Build a book from text lines.
    pub fn from_text(text: &str, tables: Arc<Tables>) -> Result<Self, BookError> {
        let bytes = Self::compile_text(text, tables.clone())?;
        Self::from_bytes(&bytes, tables)
    }

    fn add(&mut self, pos: &Position, mv: Move) {
        let moves = self.entries.entry(pos.zobrist_hash()).or_default();
        match moves.iter_mut().find(|e| e.mv == mv) {
            Some(entry) => entry.count += 1,
            None => {
                moves.push(BookEntry { mv, count: 1 });
                self.move_count += 1;
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of distinct (position, move) pairs.
    pub fn move_count(&self) -> usize {
        self.move_count
    }

    /// All book moves for `pos` with their counts.
    pub fn all_book_moves(&self, pos: &Position) -> &[BookEntry] {
        self.entries.get(&pos.zobrist_hash()).map_or(&[], Vec::as_slice)
    }

    /// A weighted random book move, or `None` out of book. A stored move
    /// that is not legal means the hash collided with a book position, and
    /// the book is not used.
    pub fn book_move<R: Rng>(&self, pos: &mut Position, rng: &mut R) -> Option<Move> {
        let entries = self.all_book_moves(pos);
        if entries.is_empty() {
            return None;
        }
        let legal = movegen::legal_moves(pos);
        if entries.iter().any(|e| !legal.contains(e.mv)) {
            return None;
        }
        let total: u32 = entries.iter().map(BookEntry::weight).sum();
        let mut pick = rng.random_range(0..total);
        for entry in entries {
            let w = entry.weight();
            if pick < w {
                return Some(entry.mv);
            }
            pick -= w;
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    const LINES: &str = "\
# two openings
e2e4 e7e5 g1f3
e2e4 c7c5
d2d4? d7d5
";

    fn tables() -> Arc<Tables> {
        Tables::shared().unwrap()
    }

    #[test]
    fn weights() {
        assert_eq!(BookEntry { mv: Move::EMPTY, count: 1 }.weight(), 101);
        assert_eq!(BookEntry { mv: Move::EMPTY, count: 16 }.weight(), 801);
    }

    #[test]
    fn records_round_trip() {
        let mv = Move::new(Square::B7, Square::A8, Some(PieceKind::Knight));
        assert_eq!(decode(encode(mv, true)), (mv, true));
        assert_eq!(encode(Move::new(Square::E2, Square::E4, None), false), 12 | 28 << 6);
    }

    #[test]
    fn counts_repeated_moves() {
        let book = Book::from_text(LINES, tables()).unwrap();
        let mut pos = Position::start(tables());
        let moves = book.all_book_moves(&pos);
        // d2d4 is marked bad.
        assert_eq!(moves.len(), 1);
        assert_eq!(moves[0].mv.to_uci(), "e2e4");
        assert_eq!(moves[0].count, 2);

        let e4 = Move::from_uci(&mut pos, "e2e4").unwrap();
        pos.make_move(e4);
        let replies: Vec<String> = book.all_book_moves(&pos).iter().map(|e| e.mv.to_uci()).collect();
        assert_eq!(replies, ["e7e5", "c7c5"]);
    }

    #[test]
    fn moves_after_bad_move_are_kept() {
        let book = Book::from_text(LINES, tables()).unwrap();
        let mut pos = Position::start(tables());
        let d4 = Move::from_uci(&mut pos, "d2d4").unwrap();
        pos.make_move(d4);
        assert_eq!(book.all_book_moves(&pos).len(), 1);
    }

    #[test]
    fn book_move_is_legal() {
        let book = Book::from_text(LINES, tables()).unwrap();
        let mut pos = Position::start(tables());
        let mut rng = StdRng::seed_from_u64(9);
        let mv = book.book_move(&mut pos, &mut rng).unwrap();
        assert_eq!(mv.to_uci(), "e2e4");

        let mut out_of_book = Position::from_fen("4k3/8/8/8/8/8/8/4K3 w - - 0 1", tables()).unwrap();
        assert!(book.book_move(&mut out_of_book, &mut rng).is_none());
    }

    #[test]
    fn bad_input() {
        assert!(matches!(Book::from_bytes(&[1, 2, 3], tables()), Err(BookError::OddLength { len: 3 })));
        // e2e5 is not a legal first move.
        let bogus = encode(Move::new(Square::E2, Square::E5, None), false).to_be_bytes();
        assert!(matches!(Book::from_bytes(&bogus, tables()), Err(BookError::CorruptRecord { index: 0 })));
        let err = Book::from_text("e2e4 e2e4", tables()).unwrap_err();
        assert!(matches!(err, BookError::IllegalLine { line: 1, .. }));
    }
}
