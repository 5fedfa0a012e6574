//! Quiescence search: captures, promotions and, on the first ply, checks.

use magpie_core::{MoveList, Piece, PieceKind, movegen};

use super::ordering::{score_move_list_mvv_lva, select_best};
use super::see::neg_see;
use super::{MATE0, Searcher, UNKNOWN_SCORE};

/// Only the first moves are sorted; past them the node is probably an
/// all-node and ordering does not pay off.
const SORTED_MOVES: usize = 8;

impl Searcher<'_> {
    /// Stand-pat search from the node at `ply`. `depth` is 0 on entry and
    /// counts down; checking moves are tried only at depth 0, and check
    /// evasions only at depths 0 and -1.
    pub(super) fn quiesce(
        &mut self,
        moves: &mut [MoveList],
        mut alpha: i32,
        beta: i32,
        ply: usize,
        depth: i32,
        in_check: bool,
    ) -> i32 {
        let ply_i = ply as i32;
        let mut score = if in_check {
            -(MATE0 - (ply_i + 1))
        } else if depth == 0 && self.q0_eval != UNKNOWN_SCORE {
            self.q0_eval
        } else {
            let score = self.eval.eval_pos(&self.pos);
            if depth == 0 {
                self.q0_eval = score;
            }
            score
        };
        if score >= beta {
            // Lets the parent tell stalemate from a king left en prise.
            if depth == 0 && score < MATE0 - ply_i && self.pos.can_take_king() {
                score = MATE0 - ply_i;
            }
            return score;
        }
        let eval_score = score;
        alpha = alpha.max(score);
        let mut best_score = score;

        let Some((list, rest)) = moves.split_first_mut() else {
            return best_score;
        };
        let try_checks = depth > -1;
        let checks_next = depth - 1 > -2;
        if in_check {
            movegen::check_evasions(&self.pos, list);
        } else if try_checks {
            movegen::pseudo_legal_captures_and_checks(&self.pos, list);
        } else {
            movegen::pseudo_legal_captures(&self.pos, list);
        }
        score_move_list_mvv_lva(&self.pos, list);

        let us = self.pos.side_to_move();
        let enemy_king = Some(Piece::new(PieceKind::King, !us));
        let delta_margin = self.params.delta_margin;

        for mi in 0..list.len() {
            if mi < SORTED_MOVES {
                select_best(list, mi);
            }
            let m = list[mi];
            let captured = self.pos.piece_at(m.to());
            if captured == enemy_king {
                return MATE0 - ply_i;
            }
            let mut gives_check = None;
            if !in_check {
                if captured.is_none() && !m.is_promotion() {
                    if !try_checks {
                        continue;
                    }
                    let check = movegen::gives_check(&self.pos, m);
                    gives_check = Some(check);
                    if !check || neg_see(&mut self.pos, m) {
                        continue;
                    }
                } else {
                    if neg_see(&mut self.pos, m) {
                        continue;
                    }
                    let capture_value = captured.map_or(0, |p| p.kind().value());
                    let promotion_value = m.promotion().map_or(0, |k| k.value());
                    let optimistic = eval_score + capture_value + promotion_value + delta_margin;
                    if optimistic < alpha && self.delta_prune_allowed(capture_value) {
                        let check = checks_next && movegen::gives_check(&self.pos, m);
                        gives_check = Some(check);
                        if !check {
                            best_score = best_score.max(optimistic);
                            continue;
                        }
                    }
                }
            }

            let next_in_check =
                checks_next && gives_check.unwrap_or_else(|| movegen::gives_check(&self.pos, m));

            let undo = self.pos.make_move(m);
            self.q_nodes += 1;
            self.total_nodes += 1;
            let score = -self.quiesce(rest, -beta, -alpha, ply + 1, depth - 1, next_in_check);
            self.pos.unmake_move(m, &undo);

            if score > best_score {
                best_score = score;
                if score > alpha {
                    if depth == 0 {
                        self.stack.at_mut(ply).best_move = m;
                    }
                    alpha = score;
                    if alpha >= beta {
                        return alpha;
                    }
                }
            }
        }
        best_score
    }

    /// Delta pruning is unsafe when a capture could leave a side with bare
    /// pawns or without pawns.
    fn delta_prune_allowed(&self, capture_value: i32) -> bool {
        use magpie_core::Color::{Black, White};
        let pos = &self.pos;
        let enough = |c| pos.pawn_material(c) > 0 && pos.material(c) > capture_value + pos.pawn_material(c);
        enough(White) && enough(Black)
    }
}
