//! Search, evaluation and game-level decisions for magpie.

pub mod book;
pub mod config;
pub mod context;
pub mod engine;
pub mod error;
pub mod eval;
pub mod search;
pub mod time;

pub use book::{Book, BookEntry};
pub use config::{EngineConfig, SearchLimits, SearchParams};
pub use context::EngineContext;
pub use engine::{Engine, MoveSource, ThinkResult};
pub use error::{BitbaseError, BookError, EngineError};
pub use eval::{Bitbases, Evaluator};
pub use search::control::{Aborted, StopToken};
pub use search::draw::{DrawClaim, claim_draw};
pub use search::listener::{NoListener, PvInfo, SearchListener};
pub use search::tt::TranspositionTable;
pub use search::weak::WeakMode;
pub use search::{SearchOutcome, Searcher};
pub use time::TimeControl;
