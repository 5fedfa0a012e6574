//! Core chess types: board representation, move generation, and game rules.

pub mod attacks;
mod bitboard;
mod castle_rights;
mod chess_move;
mod color;
mod error;
mod fen;
pub mod movegen;
mod perft;
mod piece;
mod piece_kind;
mod position;
mod square;
mod tables;
mod zobrist;

pub use attacks::{AttackTables, direction, distance};
pub use bitboard::Bitboard;
pub use castle_rights::{CastleRights, CastleSide};
pub use chess_move::Move;
pub use color::Color;
pub use error::{FenError, MoveParseError, PositionError, TableError};
pub use fen::START_FEN;
pub use movegen::{MAX_MOVES, MoveList};
pub use perft::{divide, perft};
pub use piece::Piece;
pub use piece_kind::PieceKind;
pub use position::{Position, UndoInfo};
pub use square::Square;
pub use tables::Tables;
pub use zobrist::ZobristKeys;
