//! Negascout search with iterative deepening, quiescence and a two-slot
//! transposition table.

pub mod control;
pub mod draw;
pub mod heuristics;
pub mod listener;
mod negascout;
pub mod ordering;
mod quiesce;
pub mod see;
pub mod stack;
pub mod tt;
pub mod weak;

use magpie_core::{Color, Move, MoveList, Piece, PieceKind, Position, movegen};
use tracing::{debug, info};

use crate::config::{SearchLimits, SearchParams};
use crate::eval::Evaluator;

use control::{Aborted, SearchControl, StopToken};
use heuristics::{History, KillerTable};
use listener::{PvInfo, SearchListener, nodes_per_second};
use stack::{MoveStack, SearchStack};
use tt::{Bound, TranspositionTable};
use weak::WeakMode;

/// Score of a mate at the root; a mate found `n` plies down scores
/// `MATE0 - n`.
pub const MATE0: i32 = 32_000;

/// Marks a static evaluation that has not been computed.
pub const UNKNOWN_SCORE: i32 = -32_767;

/// Fractional plies per ply.
pub const PLY_SCALE: i32 = 8;

/// Deepest ply the search recurses to.
pub const MAX_PLY: usize = 200;

/// Iterations never go past this many plies.
const MAX_ITERATION_DEPTH: u32 = 100;

/// Result of [`Searcher::iterative_deepening`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchOutcome {
    /// [`Move::EMPTY`] when there were no root moves.
    pub best_move: Move,
    /// Score of `best_move` from the side to move.
    pub score: i32,
    /// Last iteration depth reached, in whole plies.
    pub depth: u32,
    pub nodes: u64,
    /// The budget ran out or the search was stopped inside an iteration.
    pub aborted: bool,
    /// The searched root moves with their last scores, best first.
    pub root_moves: Vec<Move>,
}

/// One root move with the effort spent on it in the last iteration.
#[derive(Debug, Clone, Copy)]
struct RootMove {
    mv: Move,
    score: i32,
    nodes: u64,
}

/// Return `true` if `m` pushes a passed pawn to the fifth rank or beyond
/// (from the mover's side).
pub(crate) fn passed_pawn_push(pos: &Position, m: Move) -> bool {
    let us = pos.side_to_move();
    if pos.piece_at(m.from()) != Some(Piece::new(PieceKind::Pawn, us)) {
        return false;
    }
    let blockers = pos.attacks().pawn_blockers(us, m.to()) & pos.pieces_of(PieceKind::Pawn, !us);
    if blockers.is_nonempty() {
        return false;
    }
    match us {
        Color::White => m.to().index() >= 40,
        Color::Black => m.to().index() <= 23,
    }
}

/// Return `true` if `m2` was made possible by `m1`: it moves the piece `m1`
/// moved, lands where `m1` came from, or passes through the square `m1`
/// vacated.
pub(crate) fn related_moves(pos: &Position, m1: Move, m2: Move) -> bool {
    if m1.is_empty() || m2.is_empty() {
        return false;
    }
    m1.to() == m2.from() || m1.from() == m2.to() || pos.attacks().between(m2.from(), m2.to()).contains(m1.from())
}

fn bound_for(score: i32, alpha: i32, beta: i32) -> Bound {
    if score <= alpha {
        Bound::UpperBound
    } else if score >= beta {
        Bound::LowerBound
    } else {
        Bound::Exact
    }
}

/// State of one search over one root position.
///
/// The transposition table, history table and evaluator are borrowed from
/// the owning engine and outlive the search; killers, the per-ply stack and
/// the hash history belong to this search alone.
pub struct Searcher<'a> {
    pos: Position,
    /// Hashes of earlier positions, oldest first.
    history: Vec<u64>,
    /// Entries from here on were pushed by the search.
    first_new: usize,
    tt: &'a mut TranspositionTable,
    history_table: &'a mut History,
    eval: &'a mut Evaluator,
    params: &'a SearchParams,
    killers: KillerTable,
    stack: SearchStack,
    control: SearchControl,
    stop: StopToken,
    listener: Option<&'a mut dyn SearchListener>,
    weak: Option<WeakMode>,
    /// Static evaluation of the node quiescence search starts from.
    q0_eval: i32,
    nodes: u64,
    q_nodes: u64,
    total_nodes: u64,
}

impl<'a> Searcher<'a> {
    /// `history` holds the hashes of the positions played before `pos`,
    /// back to the last irreversible move.
    pub fn new(
        pos: Position,
        history: &[u64],
        tt: &'a mut TranspositionTable,
        history_table: &'a mut History,
        eval: &'a mut Evaluator,
        params: &'a SearchParams,
    ) -> Self {
        let stop = StopToken::new();
        Self {
            pos,
            history: history.to_vec(),
            first_new: history.len(),
            tt,
            history_table,
            eval,
            params,
            killers: KillerTable::new(),
            stack: SearchStack::new(),
            control: SearchControl::new(SearchLimits::infinite(), stop.clone(), params.nodes_between_checks),
            stop,
            listener: None,
            weak: None,
            q0_eval: UNKNOWN_SCORE,
            nodes: 0,
            q_nodes: 0,
            total_nodes: 0,
        }
    }

    pub fn with_listener(mut self, listener: &'a mut dyn SearchListener) -> Self {
        self.listener = Some(listener);
        self
    }

    pub fn with_stop_token(mut self, stop: StopToken) -> Self {
        self.stop = stop;
        self
    }

    pub fn with_weak_mode(mut self, weak: Option<WeakMode>) -> Self {
        self.weak = weak;
        self
    }

    pub fn position(&self) -> &Position {
        &self.pos
    }

    pub fn total_nodes(&self) -> u64 {
        self.total_nodes
    }

    /// Search `root_moves` (legal moves of the root position) with growing
    /// depth until a limit in `limits` is reached.
    ///
    /// The best move of the deepest iteration searched so far is returned
    /// even when the budget runs out part way through an iteration.
    pub fn iterative_deepening(&mut self, root_moves: &MoveList, limits: SearchLimits) -> SearchOutcome {
        self.control = SearchControl::new(limits, self.stop.clone(), self.params.nodes_between_checks);
        self.total_nodes = 0;

        let candidates = match &self.weak {
            Some(weak) => weak.root_subset(&self.pos, root_moves.as_slice()),
            None => root_moves.as_slice().to_vec(),
        };
        let mut root: Vec<RootMove> = candidates.into_iter().map(|mv| RootMove { mv, score: 0, nodes: 0 }).collect();
        let mut outcome = SearchOutcome {
            best_move: root.first().map_or(Move::EMPTY, |r| r.mv),
            score: 0,
            depth: 0,
            nodes: 0,
            aborted: false,
            root_moves: Vec::new(),
        };
        if root.is_empty() {
            return outcome;
        }

        let max_depth = limits.max_depth.map_or(MAX_ITERATION_DEPTH, |d| d.clamp(1, MAX_ITERATION_DEPTH));
        self.stack.reset();
        let mut move_stack = MoveStack::new();
        let root_hash = self.pos.zobrist_hash();
        self.control.hold_budget(root.len() == 1);

        if self.deepen(&mut root, max_depth, move_stack.as_mut_slice(), &mut outcome).is_err() {
            outcome.aborted = true;
        }
        debug_assert_eq!(self.pos.zobrist_hash(), root_hash);
        debug_assert_eq!(self.history.len(), self.first_new);

        self.notify_stats();
        outcome.nodes = self.total_nodes;
        outcome.root_moves = root.iter().map(|r| r.mv.with_score(r.score)).collect();
        if let Some(best) = root.iter().find(|r| r.mv == outcome.best_move) {
            outcome.score = best.score;
        }
        info!(
            best_move = %outcome.best_move,
            score = outcome.score,
            depth = outcome.depth,
            nodes = outcome.nodes,
            aborted = outcome.aborted,
            "search finished"
        );
        outcome
    }

    fn deepen(
        &mut self,
        root: &mut [RootMove],
        max_depth: u32,
        moves: &mut [MoveList],
        outcome: &mut SearchOutcome,
    ) -> Result<(), Aborted> {
        let params = self.params;
        let mut best_score_last_iter: i32 = 0;
        let mut first_iteration = true;
        let mut depth = PLY_SCALE;
        loop {
            let iteration = (depth / PLY_SCALE) as u32;
            if let Some(listener) = self.listener.as_deref_mut() {
                listener.notify_depth(iteration);
            }
            let aspiration_delta = if best_score_last_iter.abs() <= MATE0 / 2 {
                params.aspiration_delta
            } else {
                params.aspiration_delta_mate
            };
            let mut alpha =
                if first_iteration { -MATE0 } else { (best_score_last_iter - aspiration_delta).max(-MATE0) };
            let mut best_score = -MATE0;
            let mut need_more_time = false;

            for mi in 0..root.len() {
                self.control.set_need_more_time(mi > 0 || need_more_time);
                let m = root[mi].mv;
                if self.control.elapsed().as_secs() >= 1 {
                    if let Some(listener) = self.listener.as_deref_mut() {
                        listener.notify_curr_move(m, mi + 1);
                    }
                }
                self.nodes = 0;
                self.q_nodes = 0;
                let gives_check = movegen::gives_check(&self.pos, m);
                let mut beta = if first_iteration {
                    MATE0
                } else if mi == 0 {
                    (best_score_last_iter + aspiration_delta).min(MATE0)
                } else {
                    alpha + 1
                };

                let quiet = self.pos.piece_at(m.to()).is_none() && !m.is_promotion();
                let lmr = if depth >= params.lmr_min_depth
                    && quiet
                    && !gives_check
                    && !passed_pawn_push(&self.pos, m)
                    && mi >= params.root_lmr_index
                {
                    PLY_SCALE
                } else {
                    0
                };

                let mut score = self.search_root_move(moves, m, alpha, beta, depth - lmr - PLY_SCALE, gives_check, lmr)?;
                if lmr > 0 && score > alpha {
                    score = self.search_root_move(moves, m, alpha, beta, depth - PLY_SCALE, gives_check, 0)?;
                }
                let mut nodes_this_move = self.nodes + self.q_nodes;
                let key = self.pos.history_hash();
                self.tt.insert(key, m, score, bound_for(score, alpha, beta), 0, depth, UNKNOWN_SCORE);

                if score >= beta {
                    let mut retry_delta = aspiration_delta * 2;
                    while score >= beta {
                        beta = (score + retry_delta).min(MATE0);
                        retry_delta = MATE0 * 2;
                        if mi != 0 {
                            need_more_time = true;
                        }
                        outcome.best_move = m;
                        self.notify_pv(iteration, score, false, true, m);
                        self.nodes = 0;
                        self.q_nodes = 0;
                        let rescore =
                            self.search_root_move(moves, m, score, beta, depth - PLY_SCALE, gives_check, 0)?;
                        score = score.max(rescore);
                        nodes_this_move += self.nodes + self.q_nodes;
                    }
                } else if mi == 0 && score <= alpha {
                    let retry_delta = MATE0 * 2;
                    while score <= alpha {
                        alpha = (score - retry_delta).max(-MATE0);
                        need_more_time = true;
                        self.control.set_need_more_time(true);
                        self.notify_pv(iteration, score, true, false, m);
                        self.nodes = 0;
                        self.q_nodes = 0;
                        score = self.search_root_move(moves, m, alpha, score, depth - PLY_SCALE, gives_check, 0)?;
                        nodes_this_move += self.nodes + self.q_nodes;
                    }
                }

                let improves = score > alpha || mi == 0;
                if improves && !first_iteration {
                    self.notify_pv(iteration, score, false, false, m);
                }
                root[mi].score = score;
                root[mi].nodes = nodes_this_move;
                best_score = best_score.max(score);
                if improves && !first_iteration {
                    alpha = score;
                    root[..=mi].rotate_right(1);
                    outcome.best_move = root[0].mv;
                }
                if !first_iteration && self.control.time_up(need_more_time) {
                    break;
                }
            }

            if first_iteration {
                root.sort_by(|a, b| b.score.cmp(&a.score));
                outcome.best_move = root[0].mv;
                self.notify_pv(iteration, root[0].score, false, false, root[0].mv);
            }
            outcome.depth = iteration;
            outcome.score = root[0].score;
            self.control.hold_budget(false);
            debug!(depth = iteration, score = best_score, nodes = self.total_nodes, best = %outcome.best_move, "iteration complete");

            if self.control.time_up(false) {
                break;
            }
            if iteration >= max_depth || self.control.nodes_exhausted(self.total_nodes) {
                break;
            }
            let ply_to_mate = MATE0 - best_score.abs();
            if depth >= ply_to_mate * PLY_SCALE {
                break;
            }
            best_score_last_iter = best_score;
            if !first_iteration {
                // Moves that were hard to refute go first next time.
                root[1..].sort_by(|a, b| b.nodes.cmp(&a.nodes));
            }
            depth += PLY_SCALE;
            first_iteration = false;
        }
        Ok(())
    }

    /// Play root move `m`, search the reply with the window `(alpha, beta)`
    /// seen from the root, and take it back.
    #[allow(clippy::too_many_arguments)]
    fn search_root_move(
        &mut self,
        moves: &mut [MoveList],
        m: Move,
        alpha: i32,
        beta: i32,
        depth: i32,
        gives_check: bool,
        lmr: i32,
    ) -> Result<i32, Aborted> {
        self.history.push(self.pos.zobrist_hash());
        let undo = self.pos.make_move(m);
        let info = self.stack.at_mut(0);
        info.current_move = m;
        info.lmr = lmr;
        let result = self.negascout(moves, -beta, -alpha, 1, depth, None, gives_check);
        self.history.pop();
        self.pos.unmake_move(m, &undo);
        Ok(-result?)
    }

    fn notify_pv(&mut self, depth: u32, score: i32, upper_bound: bool, lower_bound: bool, m: Move) {
        let Some(listener) = self.listener.as_deref_mut() else {
            return;
        };
        let (score, is_mate) = if score > MATE0 / 2 {
            ((MATE0 - score) / 2, true)
        } else if score < -MATE0 / 2 {
            (-((MATE0 + score - 1) / 2), true)
        } else {
            (score, false)
        };
        let time = self.control.elapsed();
        let info = PvInfo {
            depth,
            score,
            is_mate,
            upper_bound,
            lower_bound,
            time,
            nodes: self.total_nodes,
            nps: nodes_per_second(self.total_nodes, time),
            pv: self.tt.extract_pv_moves(&self.pos, m),
        };
        listener.notify_pv(&info);
    }

    fn notify_stats(&mut self) {
        let time = self.control.elapsed();
        if let Some(listener) = self.listener.as_deref_mut() {
            listener.notify_stats(self.total_nodes, nodes_per_second(self.total_nodes, time), time);
        }
    }
}
