//! Per-ply state owned by one search invocation.

use magpie_core::{Move, MoveList};

use super::MAX_PLY;

/// What the search remembers about one ply of the current line.
#[derive(Debug, Clone, Copy)]
pub struct PlyInfo {
    /// Best move found at this ply, also the null-move threat one ply down.
    pub best_move: Move,
    /// Move currently being searched from this ply.
    pub current_move: Move,
    /// Null move is not allowed directly after another null move.
    pub allow_null_move: bool,
    /// Reduction applied to `current_move`.
    pub lmr: i32,
}

impl Default for PlyInfo {
    fn default() -> Self {
        Self { best_move: Move::EMPTY, current_move: Move::EMPTY, allow_null_move: true, lmr: 0 }
    }
}

/// One [`PlyInfo`] per ply, with room for the ply below the deepest one.
pub struct SearchStack {
    plies: Vec<PlyInfo>,
}

impl SearchStack {
    pub fn new() -> Self {
        Self { plies: vec![PlyInfo::default(); MAX_PLY + 2] }
    }

    pub fn reset(&mut self) {
        self.plies.fill(PlyInfo::default());
    }

    #[inline]
    pub fn at(&self, ply: usize) -> &PlyInfo {
        &self.plies[ply]
    }

    #[inline]
    pub fn at_mut(&mut self, ply: usize) -> &mut PlyInfo {
        &mut self.plies[ply]
    }

    /// The info two plies up, if there is one.
    pub fn grandparent(&self, ply: usize) -> Option<&PlyInfo> {
        ply.checked_sub(2).map(|p| &self.plies[p])
    }
}

impl Default for SearchStack {
    fn default() -> Self {
        Self::new()
    }
}

/// Move buffers, one per ply. Each recursion level takes the first list of
/// the slice it is given and hands the rest to its children.
pub struct MoveStack {
    lists: Vec<MoveList>,
}

impl MoveStack {
    pub fn new() -> Self {
        Self { lists: vec![MoveList::new(); MAX_PLY + 2] }
    }

    pub fn as_mut_slice(&mut self) -> &mut [MoveList] {
        &mut self.lists
    }
}

impl Default for MoveStack {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_plies_allow_null_move() {
        let mut stack = SearchStack::new();
        assert!(stack.at(3).allow_null_move);
        stack.at_mut(3).allow_null_move = false;
        stack.at_mut(3).lmr = 8;
        stack.reset();
        assert!(stack.at(3).allow_null_move);
        assert_eq!(stack.at(3).lmr, 0);
        assert!(stack.grandparent(1).is_none());
        assert!(stack.grandparent(2).is_some());
    }

    #[test]
    fn move_stack_covers_every_ply() {
        let mut moves = MoveStack::new();
        assert_eq!(moves.as_mut_slice().len(), MAX_PLY + 2);
        assert!(moves.as_mut_slice().iter().all(MoveList::is_empty));
    }
}
