//! The engine facade: owns the transposition table, history and book, and
//! turns a position plus a budget into a move.

use std::sync::Arc;

use magpie_core::{Move, Position, Tables, movegen};
use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::{debug, info};

use crate::book::Book;
use crate::config::{EngineConfig, SearchLimits};
use crate::context::EngineContext;
use crate::error::EngineError;
use crate::eval::Evaluator;
use crate::search::control::StopToken;
use crate::search::draw::{DrawClaim, claim_draw};
use crate::search::heuristics::History;
use crate::search::listener::SearchListener;
use crate::search::tt::{TranspositionTable, TtStats};
use crate::search::weak::{WeakMode, pick_semi_random};
use crate::search::{SearchOutcome, Searcher};

/// Where the chosen move came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveSource {
    Book,
    /// The only legal move, played without searching.
    Forced,
    Search,
    /// One-ply search followed by a weighted random pick.
    Random,
}

/// Everything [`Engine::think_full`] decided.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThinkResult {
    /// `None` when the side to move has no legal move.
    pub best_move: Option<Move>,
    pub source: MoveSource,
    /// Search score from the side to move, when a search ran.
    pub score: Option<i32>,
    pub depth: u32,
    pub nodes: u64,
    /// A draw claimable now or after `best_move`.
    pub draw_claim: Option<DrawClaim>,
}

/// A single-threaded chess engine.
///
/// Searches run on the calling thread. [`Engine::stop_token`] hands out a
/// token another thread can use to end a running search early.
pub struct Engine {
    config: EngineConfig,
    context: EngineContext,
    tt: TranspositionTable,
    history: History,
    eval: Evaluator,
    book: Option<Book>,
    rng: StdRng,
    stop: StopToken,
}

impl Engine {
    /// Build the shared tables, the transposition table and, when
    /// configured, load the opening book.
    pub fn new(config: EngineConfig) -> Result<Self, EngineError> {
        let context = EngineContext::new(&config)?;
        let book = match &config.book_path {
            Some(path) => {
                let book = Book::load(path, context.tables.clone())?;
                info!(path = %path.display(), moves = book.move_count(), "opening book loaded");
                Some(book)
            }
            None => None,
        };
        let rng = if config.random_seed == 0 {
            StdRng::from_os_rng()
        } else {
            StdRng::seed_from_u64(config.random_seed)
        };
        Ok(Self {
            tt: TranspositionTable::new(config.hash_bits),
            history: History::new(),
            eval: Evaluator::new(context.bitbases.clone()),
            book,
            rng,
            stop: StopToken::new(),
            context,
            config,
        })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn context(&self) -> &EngineContext {
        &self.context
    }

    pub fn tables(&self) -> &Arc<Tables> {
        &self.context.tables
    }

    /// Replace the opening book.
    pub fn set_book(&mut self, book: Option<Book>) {
        self.book = book;
    }

    /// A token that stops the current or next search.
    pub fn stop_token(&self) -> StopToken {
        self.stop.clone()
    }

    /// Forget everything learned in earlier searches.
    pub fn clear(&mut self) {
        self.tt.clear();
        self.history.clear();
    }

    pub fn tt_stats(&self) -> TtStats {
        self.tt.stats()
    }

    /// Static evaluation of `pos` from the side to move.
    pub fn evaluate(&mut self, pos: &Position) -> i32 {
        self.eval.eval_pos(pos)
    }

    /// Choose a move for `pos`. `history` holds the hashes of the positions
    /// played before it, oldest first.
    pub fn think(
        &mut self,
        pos: &Position,
        history: &[u64],
        limits: SearchLimits,
        listener: &mut dyn SearchListener,
    ) -> Option<Move> {
        self.think_full(pos, history, limits, listener).best_move
    }

    /// Like [`Engine::think`], but report the score, where the move came
    /// from and any claimable draw.
    pub fn think_full(
        &mut self,
        pos: &Position,
        history: &[u64],
        limits: SearchLimits,
        listener: &mut dyn SearchListener,
    ) -> ThinkResult {
        self.tt.next_generation();
        self.stop.reset();
        let mut pos = pos.clone();
        let moves = movegen::legal_moves(&mut pos);
        let mut result =
            ThinkResult { best_move: None, source: MoveSource::Search, score: None, depth: 0, nodes: 0, draw_claim: None };
        if moves.is_empty() {
            return result;
        }

        let book_move = match &self.book {
            Some(book) if self.config.use_book => book.book_move(&mut pos, &mut self.rng),
            _ => None,
        };
        if let Some(mv) = book_move {
            debug!(%mv, "book move");
            result.best_move = Some(mv);
            result.source = MoveSource::Book;
            return result;
        }

        if self.config.random_mode {
            let outcome = self.search(&pos, history, &moves, limits.with_depth(1), listener);
            let mv = pick_semi_random(&outcome.root_moves, &mut self.rng).unwrap_or(outcome.best_move);
            result.source = MoveSource::Random;
            result.score = outcome.root_moves.iter().find(|m| **m == mv).map(|m| m.score);
            result.depth = outcome.depth;
            result.nodes = outcome.nodes;
            result.best_move = Some(mv);
        } else if moves.len() == 1 && claim_draw(&mut pos, history, moves[0]).is_none() {
            debug!(mv = %moves[0], "only legal move");
            result.best_move = Some(moves[0]);
            result.source = MoveSource::Forced;
            // Reported as a completed one-ply search.
            result.depth = 1;
            return result;
        } else {
            let outcome = self.search(&pos, history, &moves, limits, listener);
            result.score = Some(outcome.score);
            result.depth = outcome.depth;
            result.nodes = outcome.nodes;
            result.best_move = Some(outcome.best_move);
        }

        if let Some(mv) = result.best_move {
            result.draw_claim = claim_draw(&mut pos, history, mv);
        }
        result
    }

    fn search(
        &mut self,
        pos: &Position,
        history: &[u64],
        moves: &movegen::MoveList,
        limits: SearchLimits,
        listener: &mut dyn SearchListener,
    ) -> SearchOutcome {
        let weak = WeakMode::new(self.config.strength, self.config.random_seed);
        let mut searcher = Searcher::new(
            pos.clone(),
            history,
            &mut self.tt,
            &mut self.history,
            &mut self.eval,
            &self.config.params,
        )
        .with_listener(listener)
        .with_stop_token(self.stop.clone())
        .with_weak_mode(weak);
        searcher.iterative_deepening(moves, limits)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::listener::NoListener;

    fn engine(config: EngineConfig) -> Engine {
        Engine::new(config.with_hash_bits(16)).unwrap()
    }

    fn position(engine: &Engine, fen: &str) -> Position {
        Position::from_fen(fen, engine.tables().clone()).unwrap()
    }

    #[test]
    fn no_legal_moves() {
        let mut engine = engine(EngineConfig::default());
        let pos = position(&engine, "7k/6Q1/5K2/8/8/8/8/8 b - - 0 1");
        let result = engine.think_full(&pos, &[], SearchLimits::depth(3), &mut NoListener);
        assert_eq!(result.best_move, None);
    }

    #[test]
    fn forced_move_skips_search() {
        let mut engine = engine(EngineConfig::default());
        let pos = position(&engine, "k7/8/8/8/8/8/8/KR6 b - - 0 1");
        let result = engine.think_full(&pos, &[], SearchLimits::depth(5), &mut NoListener);
        assert_eq!(result.source, MoveSource::Forced);
        assert_eq!(result.best_move.map(|m| m.to_uci()).as_deref(), Some("a8a7"));
        assert_eq!(result.nodes, 0);
        assert_eq!(result.depth, 1);
    }

    #[test]
    fn book_move_is_played() {
        let mut engine = engine(EngineConfig::default());
        let book = Book::from_text("d2d4 d7d5", engine.tables().clone()).unwrap();
        engine.set_book(Some(book));
        let pos = engine.context().start_position();
        let result = engine.think_full(&pos, &[], SearchLimits::depth(3), &mut NoListener);
        assert_eq!(result.source, MoveSource::Book);
        assert_eq!(result.best_move.map(|m| m.to_uci()).as_deref(), Some("d2d4"));
    }

    #[test]
    fn book_can_be_disabled() {
        let mut engine = engine(EngineConfig::default().with_use_book(false));
        let book = Book::from_text("d2d4 d7d5", engine.tables().clone()).unwrap();
        engine.set_book(Some(book));
        let pos = engine.context().start_position();
        let result = engine.think_full(&pos, &[], SearchLimits::depth(2), &mut NoListener);
        assert_eq!(result.source, MoveSource::Search);
        assert!(result.best_move.is_some());
    }

    #[test]
    fn random_mode_plays_a_legal_move() {
        let mut engine = engine(EngineConfig::default().with_random_mode(true).with_strength(1000, 5));
        let mut pos = engine.context().start_position();
        let result = engine.think_full(&pos, &[], SearchLimits::infinite(), &mut NoListener);
        assert_eq!(result.source, MoveSource::Random);
        assert_eq!(result.depth, 1);
        let mv = result.best_move.unwrap();
        assert!(movegen::legal_moves(&mut pos).contains(mv));
    }

    #[test]
    fn stopped_search_still_returns_a_move() {
        let mut engine = engine(EngineConfig::default());
        let pos = engine.context().start_position();
        let limits = SearchLimits::nodes(1);
        let result = engine.think_full(&pos, &[], limits, &mut NoListener);
        assert!(result.best_move.is_some());
    }
}
