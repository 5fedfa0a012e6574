//! The main recursive search.

use magpie_core::{Move, MoveList, Piece, PieceKind, Position, Square, movegen};

use super::control::Aborted;
use super::draw::{can_claim_draw_50, can_claim_draw_rep};
use super::ordering::{score_move_list, select_best, select_hash_move};
use super::see::see;
use super::tt::Bound;
use super::{MATE0, MAX_PLY, PLY_SCALE, Searcher, UNKNOWN_SCORE, bound_for, passed_pawn_push, related_moves};
use crate::eval::PAWN_VALUE;

/// Pruning that relies on the static evaluation only applies below this
/// depth.
const SHALLOW_DEPTH: i32 = 5 * PLY_SCALE;

fn value_of(piece: Option<Piece>) -> i32 {
    piece.map_or(0, |p| p.kind().value())
}

/// The side to move has pawns and at least one piece, so a null move is
/// unlikely to run into zugzwang.
fn has_pieces_and_pawns(pos: &Position) -> bool {
    let us = pos.side_to_move();
    pos.piece_material(us) > 0 && pos.pawn_material(us) > 0
}

impl Searcher<'_> {
    /// Score of the position for the side to move, searched to `depth`
    /// fractional plies with the window `(alpha, beta)`.
    ///
    /// `moves` holds one move buffer for this ply and each ply below it.
    /// `recapture` is the square of a roughly even capture on the previous
    /// ply; recapturing there is extended.
    #[allow(clippy::too_many_arguments)]
    pub(super) fn negascout(
        &mut self,
        moves: &mut [MoveList],
        mut alpha: i32,
        beta: i32,
        ply: usize,
        depth: i32,
        recapture: Option<Square>,
        in_check: bool,
    ) -> Result<i32, Aborted> {
        if self.control.tick(self.total_nodes)? && self.control.stats_due() {
            self.notify_stats();
        }
        if ply >= MAX_PLY || moves.len() < 2 {
            return Ok(self.eval.eval_pos(&self.pos));
        }
        let params = self.params;
        let ply_i = ply as i32;
        let h_key = self.pos.history_hash();

        if can_claim_draw_50(&self.pos) {
            if self.pos.can_take_king() {
                return Ok(MATE0 - ply_i);
            }
            if in_check && movegen::legal_moves(&mut self.pos).is_empty() {
                // Mate takes precedence over the fifty-move rule.
                return Ok(-(MATE0 - (ply_i + 1)));
            }
            return Ok(0);
        }
        if can_claim_draw_rep(&self.pos, &self.history, self.first_new) {
            return Ok(0);
        }

        let mut eval_score = UNKNOWN_SCORE;
        let mut hash_move = Move::EMPTY;
        if let Some(ent) = self.tt.probe(h_key) {
            let score = ent.score(ply_i);
            eval_score = ent.eval();
            hash_move = ent.best_move();
            let ply_to_mate = MATE0 - score.abs();
            let deep_enough = ent.depth() >= depth || ent.depth() >= ply_to_mate * PLY_SCALE;
            if beta == alpha + 1 && deep_enough {
                let cutoff = match ent.bound() {
                    Bound::Exact => true,
                    Bound::LowerBound => score >= beta,
                    Bound::UpperBound => score <= alpha,
                    Bound::None => false,
                };
                if cutoff {
                    if score >= beta && !hash_move.is_empty() && self.pos.piece_at(hash_move.to()).is_none() {
                        self.killers.add_killer(ply, hash_move);
                    }
                    self.stack.at_mut(ply).best_move = hash_move;
                    return Ok(score);
                }
            }
        }

        let pos_extend = if in_check { PLY_SCALE } else { 0 };

        if depth + pos_extend <= 0 {
            self.q0_eval = eval_score;
            self.stack.at_mut(ply).best_move = Move::EMPTY;
            let score = self.quiesce(moves, alpha, beta, ply, 0, in_check);
            let best = self.stack.at(ply).best_move;
            self.tt.insert(h_key, best, score, bound_for(score, alpha, beta), ply_i, depth, self.q0_eval);
            return Ok(score);
        }

        let window_normal = alpha.abs() <= MATE0 / 2 && beta.abs() <= MATE0 / 2;

        // Razoring
        if alpha.abs() <= MATE0 / 2 && depth < params.razor_depth && beta == alpha + 1 {
            if eval_score == UNKNOWN_SCORE {
                eval_score = self.eval.eval_pos(&self.pos);
            }
            let margin = params.razor_margin;
            if eval_score < beta - margin {
                self.q0_eval = eval_score;
                let score = self.quiesce(moves, alpha - margin, beta - margin, ply, 0, in_check);
                if score <= alpha - margin {
                    self.tt.insert(h_key, Move::EMPTY, score, Bound::UpperBound, ply_i, depth, self.q0_eval);
                    return Ok(score);
                }
            }
        }

        // Reverse futility pruning
        if !in_check && depth < SHALLOW_DEPTH && window_normal && has_pieces_and_pawns(&self.pos) {
            if eval_score == UNKNOWN_SCORE {
                eval_score = self.eval.eval_pos(&self.pos);
            }
            let score = eval_score - params.reverse_futility_margin(depth);
            if score >= beta {
                self.tt.insert(h_key, Move::EMPTY, score, Bound::LowerBound, ply_i, depth, eval_score);
                return Ok(score);
            }
        }

        // Null move
        self.stack.at_mut(ply).current_move = Move::EMPTY;
        if depth >= params.null_move_min_depth
            && !in_check
            && self.stack.at(ply).allow_null_move
            && beta.abs() <= MATE0 / 2
        {
            if self.pos.can_take_king() {
                return Ok(MATE0 - ply_i);
            }
            let mut null_ok = has_pieces_and_pawns(&self.pos);
            if null_ok {
                if eval_score == UNKNOWN_SCORE {
                    eval_score = self.eval.eval_pos(&self.pos);
                }
                null_ok = eval_score >= beta;
            }
            if null_ok {
                let reduction = if depth > params.null_move_deep_depth {
                    params.null_move_reduction_deep
                } else {
                    params.null_move_reduction
                };
                let us = self.pos.side_to_move();
                let ep = self.pos.ep_square();
                self.pos.set_side_to_move(!us);
                self.pos.set_ep_square(None);
                let child = self.stack.at_mut(ply + 1);
                child.allow_null_move = false;
                child.best_move = Move::EMPTY;
                let result = self.negascout(&mut moves[1..], -beta, -(beta - 1), ply + 1, depth - reduction, None, false);
                self.stack.at_mut(ply + 1).allow_null_move = true;
                self.pos.set_ep_square(ep);
                self.pos.set_side_to_move(us);
                let mut score = -result?;
                if score >= beta {
                    if score > MATE0 / 2 {
                        score = beta;
                    }
                    self.tt.insert(h_key, Move::EMPTY, score, Bound::LowerBound, ply_i, depth, eval_score);
                    return Ok(score);
                }
                let parent = *self.stack.at(ply - 1);
                if parent.lmr > 0 && depth < params.null_threat_max_depth {
                    let threat = self.stack.at(ply + 1).best_move;
                    if related_moves(&self.pos, parent.current_move, threat) {
                        // The reduced move one ply up allowed the threat:
                        // fail low so the parent searches it at full depth.
                        return Ok(alpha);
                    }
                }
            }
        }

        let mut futility_prune = false;
        let mut futility_score = alpha;
        if !in_check && depth < SHALLOW_DEPTH && window_normal {
            if eval_score == UNKNOWN_SCORE {
                eval_score = self.eval.eval_pos(&self.pos);
            }
            futility_score = eval_score + params.futility_margin(depth);
            futility_prune = futility_score <= alpha;
        }

        // Internal iterative deepening
        if depth > params.iid_min_depth && hash_move.is_empty() {
            let is_pv = beta > alpha + 1;
            if is_pv || depth > params.iid_non_pv_depth {
                let iid_depth = if is_pv { depth - 2 * PLY_SCALE } else { depth * 3 / 8 };
                self.negascout(moves, alpha, beta, ply, iid_depth, None, in_check)?;
                if let Some(ent) = self.tt.probe(h_key) {
                    hash_move = ent.best_move();
                }
            }
        }

        let (list, rest) = moves.split_at_mut(1);
        let list = &mut list[0];
        if in_check {
            movegen::check_evasions(&self.pos, list);
        } else {
            movegen::pseudo_legal_moves(&self.pos, list);
        }
        let mut see_done = false;
        let hash_move_selected = select_hash_move(list, hash_move);
        if !hash_move_selected {
            score_move_list(&mut self.pos, list, 0, ply, &self.killers, self.history_table);
            see_done = true;
        }

        let us = self.pos.side_to_move();
        let enemy_king = Some(Piece::new(PieceKind::King, !us));
        let illegal_score = -(MATE0 - (ply_i + 1));
        let mut have_legal_moves = false;
        let mut b = beta;
        let mut best_score = illegal_score;
        let mut best_index = None;
        let mut lmr_count = 0;

        for mi in 0..list.len() {
            if mi == 1 && !see_done {
                score_move_list(&mut self.pos, list, 1, ply, &self.killers, self.history_table);
                see_done = true;
            }
            if mi > 0 || !hash_move_selected {
                select_best(list, mi);
            }
            let m = list[mi];
            let captured = self.pos.piece_at(m.to());
            if captured == enemy_king {
                return Ok(MATE0 - ply_i);
            }
            let is_capture = captured.is_some();
            let is_promotion = m.is_promotion();
            let may_reduce = m.score < 53 && (!is_capture || m.score < 0) && !is_promotion;
            let gives_check = movegen::gives_check(&self.pos, m);
            let quiet_push = !gives_check && !passed_pawn_push(&self.pos, m);

            let mut do_futility = false;
            if may_reduce && have_legal_moves && quiet_push {
                if window_normal && mi >= params.late_move_count(depth) {
                    continue;
                }
                do_futility = futility_prune;
            }

            let mut score = if do_futility {
                futility_score
            } else {
                let mut move_extend = 0;
                if pos_extend == 0 {
                    if Some(m.to()) == recapture && see(&mut self.pos, m) > value_of(captured) - PAWN_VALUE / 2 {
                        move_extend = PLY_SCALE;
                    }
                    let pawns = self.pos.pawn_material(us) + self.pos.pawn_material(!us);
                    if move_extend < PLY_SCALE && is_capture && pawns > PAWN_VALUE {
                        // Capturing the last piece leads into a pawn ending.
                        let only_pawns_left = self.pos.piece_material(us) == 0;
                        if only_pawns_left && self.pos.piece_material(!us) == value_of(captured) {
                            move_extend = PLY_SCALE;
                        }
                    }
                }
                let extend = pos_extend.max(move_extend);

                let mut lmr = 0;
                if depth >= params.lmr_min_depth && may_reduce && extend == 0 && quiet_push {
                    lmr_count += 1;
                    lmr = if lmr_count > params.lmr_late_count && depth > params.lmr_min_depth && !is_capture {
                        2 * PLY_SCALE
                    } else {
                        PLY_SCALE
                    };
                }
                let mut new_depth = depth - PLY_SCALE + extend - lmr;

                let mut new_capture_square = None;
                if is_capture && (gives_check || depth + extend > PLY_SCALE) {
                    let from_value = value_of(self.pos.piece_at(m.from()));
                    let to_value = value_of(captured);
                    if (to_value - from_value).abs() < PAWN_VALUE / 2 && see(&mut self.pos, m).abs() < PAWN_VALUE / 2 {
                        new_capture_square = Some(m.to());
                    }
                }

                self.history.push(self.pos.zobrist_hash());
                let undo = self.pos.make_move(m);
                self.nodes += 1;
                self.total_nodes += 1;
                let info = self.stack.at_mut(ply);
                info.current_move = m;
                info.lmr = lmr;
                let mut result =
                    self.negascout(rest, -b, -alpha, ply + 1, new_depth, new_capture_square, gives_check).map(|s| -s);
                if let Ok(score) = result {
                    let reduced_raise = lmr > 0 && score > alpha;
                    let scout_raise = score > alpha && score < beta && b != beta && score != illegal_score;
                    if reduced_raise || scout_raise {
                        self.stack.at_mut(ply).lmr = 0;
                        new_depth += lmr;
                        result = self
                            .negascout(rest, -beta, -alpha, ply + 1, new_depth, new_capture_square, gives_check)
                            .map(|s| -s);
                    }
                }
                self.history.pop();
                self.pos.unmake_move(m, &undo);
                result?
            };

            if have_legal_moves {
                if let Some(weak) = &self.weak {
                    if weak.skip_move(&self.pos, m, ply, &self.stack) {
                        score = illegal_score;
                    }
                }
            }
            list[mi].score = score;

            if score != illegal_score {
                have_legal_moves = true;
            }
            best_score = best_score.max(score);
            if score > alpha {
                alpha = score;
                best_index = Some(mi);
                self.stack.at_mut(ply).best_move = m;
            }
            if alpha >= beta {
                if self.pos.piece_at(m.to()).is_none() {
                    let whole_depth = depth / PLY_SCALE;
                    self.killers.add_killer(ply, m);
                    self.history_table.add_success(&self.pos, m, whole_depth);
                    for &tried in &list.as_slice()[..mi] {
                        if self.pos.piece_at(tried.to()).is_none() {
                            self.history_table.add_fail(&self.pos, tried, whole_depth);
                        }
                    }
                }
                self.tt.insert(h_key, m, alpha, Bound::LowerBound, ply_i, depth, eval_score);
                return Ok(alpha);
            }
            b = alpha + 1;
        }

        if !have_legal_moves && !in_check {
            return Ok(0);
        }
        match best_index {
            Some(i) => self.tt.insert(h_key, list[i], best_score, Bound::Exact, ply_i, depth, eval_score),
            None => self.tt.insert(h_key, Move::EMPTY, best_score, Bound::UpperBound, ply_i, depth, eval_score),
        }
        Ok(best_score)
    }
}
