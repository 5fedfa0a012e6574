//! Endgame bitbases for king and pawn against king (KPK) and king and
//! rook against king and pawn (KRKP).
//!
//! Both tables are 24 576 bytes. Positions are mirrored so the reference
//! king stands on files a-d.
//!
//! - KPK, white pawn: bit `index` is set when White wins, with
//!   `index = ((side * 32 + wk_rank * 4 + wk_file) * 64 + bk) * 48 + wp - 8`.
//! - KRKP, black pawn: byte `((side * 32 + bk_rank * 4 + bk_file) * 48 + bp - 8) * 8 + wk_rank`
//!   holds a mask over the white king's file, set when White wins.
//!
//! `side` is 0 with White to move.

use std::fs;
use std::path::Path;
use std::sync::{Arc, OnceLock};

use magpie_core::{Square, distance};
use tracing::debug;

use crate::error::BitbaseError;

/// Size in bytes of each table.
pub const TABLE_SIZE: usize = 2 * 32 * 64 * 48 / 8;

pub const KPK_FILE: &str = "kpk.bitbase";
pub const KRKP_FILE: &str = "krkp.winmasks";

/// Read-only endgame tables, shared by every evaluator.
#[derive(Clone, PartialEq, Eq)]
pub struct Bitbases {
    kpk: Box<[u8]>,
    krkp: Box<[u8]>,
}

impl std::fmt::Debug for Bitbases {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Bitbases").finish_non_exhaustive()
    }
}

fn check_size(name: &'static str, bytes: &[u8]) -> Result<(), BitbaseError> {
    if bytes.len() == TABLE_SIZE {
        Ok(())
    } else {
        Err(BitbaseError::WrongSize { name, expected: TABLE_SIZE, found: bytes.len() })
    }
}

/// Flip a square to the other wing.
fn mirror_file(sq: Square) -> Square {
    Square::new(sq.index() as u8 ^ 7)
}

fn side_index(white_to_move: bool) -> usize {
    if white_to_move { 0 } else { 1 }
}

/// Bit index into the KPK table, mirroring so the white king is on files a-d.
fn kpk_index(white_to_move: bool, wk: Square, bk: Square, wp: Square) -> usize {
    let (wk, bk, wp) = if wk.file() >= 4 { (mirror_file(wk), mirror_file(bk), mirror_file(wp)) } else { (wk, bk, wp) };
    let mut index = side_index(white_to_move);
    index = index * 32 + wk.rank() as usize * 4 + wk.file() as usize;
    index = index * 64 + bk.index();
    index * 48 + wp.index() - 8
}

/// Byte index into the KRKP table and the white king's file bit.
fn krkp_index(white_to_move: bool, wk: Square, bk: Square, bp: Square) -> (usize, u8) {
    let (wk, bk, bp) = if bk.file() >= 4 { (mirror_file(wk), mirror_file(bk), mirror_file(bp)) } else { (wk, bk, bp) };
    let mut index = side_index(white_to_move);
    index = index * 32 + bk.rank() as usize * 4 + bk.file() as usize;
    index = index * 48 + bp.index() - 8;
    (index * 8 + wk.rank() as usize, wk.file())
}

impl Bitbases {
    /// Wrap tables already in memory.
    pub fn from_bytes(kpk: Vec<u8>, krkp: Vec<u8>) -> Result<Self, BitbaseError> {
        check_size("kpk", &kpk)?;
        check_size("krkp", &krkp)?;
        Ok(Self { kpk: kpk.into_boxed_slice(), krkp: krkp.into_boxed_slice() })
    }

    /// Read `kpk.bitbase` and `krkp.winmasks` from `dir`.
    pub fn load(dir: &Path) -> Result<Self, BitbaseError> {
        let read = |name: &str| {
            let path = dir.join(name);
            fs::read(&path).map_err(|source| BitbaseError::Io { path, source })
        };
        let bitbases = Self::from_bytes(read(KPK_FILE)?, read(KRKP_FILE)?)?;
        debug!(dir = %dir.display(), "loaded bitbases");
        Ok(bitbases)
    }

    /// Compute the tables: KPK exactly, by retrograde analysis, and KRKP
    /// from a king race rule.
    pub fn generate() -> Self {
        Self { kpk: generate_kpk().into_boxed_slice(), krkp: generate_krkp().into_boxed_slice() }
    }

    /// Generated tables, computed once per process.
    pub fn builtin() -> Arc<Self> {
        static BUILTIN: OnceLock<Arc<Bitbases>> = OnceLock::new();
        BUILTIN.get_or_init(|| Arc::new(Self::generate())).clone()
    }

    pub fn kpk_bytes(&self) -> &[u8] {
        &self.kpk
    }

    pub fn krkp_bytes(&self) -> &[u8] {
        &self.krkp
    }

    /// `true` if White wins with king `wk` and pawn `wp` against king `bk`.
    pub fn kpk_win(&self, white_to_move: bool, wk: Square, bk: Square, wp: Square) -> bool {
        let index = kpk_index(white_to_move, wk, bk, wp);
        self.kpk[index / 8] & (1 << (index % 8)) != 0
    }

    /// `true` if White's king and rook win against king `bk` and pawn `bp`.
    pub fn krkp_win(&self, white_to_move: bool, wk: Square, bk: Square, bp: Square) -> bool {
        let (index, file) = krkp_index(white_to_move, wk, bk, bp);
        self.krkp[index] & (1 << file) != 0
    }
}

// ---------------------------------------------------------------------------
// KPK retrograde analysis
// ---------------------------------------------------------------------------

const INVALID: u8 = 0;
const UNKNOWN: u8 = 1;
const DRAW: u8 = 2;
const WIN: u8 = 4;

/// Unmirrored working index: side, white king, black king, pawn square.
fn full_index(white_to_move: bool, wk: usize, bk: usize, wp: usize) -> usize {
    ((side_index(white_to_move) * 64 + wk) * 64 + bk) * 48 + wp - 8
}

fn king_targets(sq: usize) -> impl Iterator<Item = usize> {
    let (file, rank) = ((sq % 8) as i32, (sq / 8) as i32);
    (-1..=1)
        .flat_map(move |df| (-1..=1).map(move |dr| (file + df, rank + dr)))
        .filter(move |&(f, r)| (f, r) != (file, rank) && (0..8).contains(&f) && (0..8).contains(&r))
        .map(|(f, r)| (r * 8 + f) as usize)
}

fn pawn_attacks(wp: usize, target: usize) -> bool {
    let (pf, pr) = (wp % 8, wp / 8);
    let (tf, tr) = (target % 8, target / 8);
    tr == pr + 1 && pf.abs_diff(tf) == 1
}

fn sq(index: usize) -> Square {
    Square::new(index as u8)
}

fn initial_kpk(white_to_move: bool, wk: usize, bk: usize, wp: usize) -> u8 {
    if distance(sq(wk), sq(bk)) <= 1 || wk == wp || bk == wp {
        return INVALID;
    }
    if white_to_move && pawn_attacks(wp, bk) {
        return INVALID;
    }
    let push = wp + 8;
    if white_to_move
        && wp / 8 == 6
        && wk != push
        && (distance(sq(bk), sq(push)) > 1 || distance(sq(wk), sq(push)) == 1)
    {
        return WIN;
    }
    if !white_to_move {
        let guarded = |target: usize| distance(sq(wk), sq(target)) <= 1 || pawn_attacks(wp, target);
        let stalemated = king_targets(bk).all(guarded);
        let takes_pawn = distance(sq(bk), sq(wp)) == 1 && distance(sq(wk), sq(wp)) > 1;
        if stalemated || takes_pawn {
            return DRAW;
        }
    }
    UNKNOWN
}

fn classify_kpk(db: &[u8], white_to_move: bool, wk: usize, bk: usize, wp: usize) -> u8 {
    let mut reached = INVALID;
    if white_to_move {
        for to in king_targets(wk) {
            reached |= db[full_index(false, to, bk, wp)];
        }
        if wp / 8 < 6 {
            reached |= db[full_index(false, wk, bk, wp + 8)];
        }
        if wp / 8 == 1 && wp + 8 != wk && wp + 8 != bk {
            reached |= db[full_index(false, wk, bk, wp + 16)];
        }
    } else {
        for to in king_targets(bk) {
            reached |= db[full_index(true, wk, to, wp)];
        }
    }
    let (good, bad) = if white_to_move { (WIN, DRAW) } else { (DRAW, WIN) };
    if reached & good != 0 {
        good
    } else if reached & UNKNOWN != 0 {
        UNKNOWN
    } else {
        bad
    }
}

fn generate_kpk() -> Vec<u8> {
    let positions = || {
        [true, false].into_iter().flat_map(|wtm| {
            (0..64).flat_map(move |wk| (0..64).flat_map(move |bk| (8..56).map(move |wp| (wtm, wk, bk, wp))))
        })
    };

    let mut db = vec![INVALID; 2 * 64 * 64 * 48];
    for (wtm, wk, bk, wp) in positions() {
        db[full_index(wtm, wk, bk, wp)] = initial_kpk(wtm, wk, bk, wp);
    }

    let mut passes = 0;
    loop {
        let mut changed = false;
        for (wtm, wk, bk, wp) in positions() {
            let i = full_index(wtm, wk, bk, wp);
            if db[i] == UNKNOWN {
                let result = classify_kpk(&db, wtm, wk, bk, wp);
                if result != UNKNOWN {
                    db[i] = result;
                    changed = true;
                }
            }
        }
        passes += 1;
        if !changed {
            break;
        }
    }
    debug!(passes, "generated kpk bitbase");

    let mut table = vec![0u8; TABLE_SIZE];
    for (wtm, wk, bk, wp) in positions() {
        if wk % 8 < 4 && db[full_index(wtm, wk, bk, wp)] == WIN {
            let index = kpk_index(wtm, sq(wk), sq(bk), sq(wp));
            table[index / 8] |= 1 << (index % 8);
        }
    }
    table
}

// ---------------------------------------------------------------------------
// KRKP king race
// ---------------------------------------------------------------------------

/// The rook side wins when its king stands in front of the pawn, reaches
/// the promotion square in time, or the defending king has strayed too far
/// from the pawn for the rook to be kept off it.
fn krkp_rule(white_to_move: bool, wk: Square, bk: Square, bp: Square) -> bool {
    if wk == bk || wk == bp || bk == bp || distance(wk, bk) <= 1 {
        return false;
    }
    if wk.file() == bp.file() && wk.rank() < bp.rank() {
        return true;
    }
    let promotion = Square::from_coords(bp.file(), 0);
    let pawn_moves = if bp.rank() == 6 { 5 } else { bp.rank() as i32 };
    let white_tempo = i32::from(white_to_move);
    let black_tempo = 1 - white_tempo;
    distance(wk, promotion) - white_tempo <= pawn_moves || distance(bk, bp) - black_tempo >= 3
}

fn generate_krkp() -> Vec<u8> {
    let mut table = vec![0u8; TABLE_SIZE];
    for white_to_move in [true, false] {
        for bk in Square::all().filter(|s| s.file() < 4) {
            for bp in Square::all().filter(|s| (1..7).contains(&s.rank())) {
                for wk in Square::all() {
                    if krkp_rule(white_to_move, wk, bk, bp) {
                        let (index, file) = krkp_index(white_to_move, wk, bk, bp);
                        table[index] |= 1 << file;
                    }
                }
            }
        }
    }
    debug!("generated krkp win masks");
    table
}

#[cfg(test)]
mod tests {
    use super::*;

    fn s(name: &str) -> Square {
        Square::from_algebraic(name).unwrap()
    }

    #[test]
    fn tables_have_the_file_size() {
        let bb = Bitbases::builtin();
        assert_eq!(bb.kpk_bytes().len(), TABLE_SIZE);
        assert_eq!(bb.krkp_bytes().len(), TABLE_SIZE);
    }

    #[test]
    fn wrong_size_is_rejected() {
        let err = Bitbases::from_bytes(vec![0; 10], vec![0; TABLE_SIZE]).unwrap_err();
        assert!(matches!(err, BitbaseError::WrongSize { name: "kpk", found: 10, .. }));
    }

    #[test]
    fn missing_files_are_an_io_error() {
        let err = Bitbases::load(Path::new("/nonexistent/bitbases")).unwrap_err();
        assert!(matches!(err, BitbaseError::Io { .. }));
    }

    #[test]
    fn kpk_known_results() {
        let bb = Bitbases::builtin();
        // King on the sixth in front of its pawn wins with either side to move.
        assert!(bb.kpk_win(true, s("e6"), s("e8"), s("e5")));
        assert!(bb.kpk_win(false, s("e6"), s("e8"), s("e5")));
        // Defender holds the opposition.
        assert!(!bb.kpk_win(true, s("d1"), s("d3"), s("d2")));
        // Rook pawn with the defender in the corner.
        assert!(!bb.kpk_win(true, s("b6"), s("a8"), s("a5")));
        // Pawn outruns the king.
        assert!(bb.kpk_win(true, s("a1"), s("h8"), s("a5")));
    }

    #[test]
    fn kpk_is_symmetric_across_files() {
        let bb = Bitbases::builtin();
        for (wk, bk, wp) in [("e6", "e8", "e5"), ("d1", "d3", "d2"), ("c4", "c6", "b4")] {
            let (wk, bk, wp) = (s(wk), s(bk), s(wp));
            let mirrored = bb.kpk_win(true, mirror_file(wk), mirror_file(bk), mirror_file(wp));
            assert_eq!(bb.kpk_win(true, wk, bk, wp), mirrored);
        }
    }

    #[test]
    fn krkp_tempo_decides() {
        let bb = Bitbases::builtin();
        assert!(bb.krkp_win(true, s("f4"), s("c3"), s("d3")));
        assert!(!bb.krkp_win(false, s("f4"), s("c3"), s("d3")));
    }

    #[test]
    fn krkp_supported_pawn_near_promotion_draws() {
        let bb = Bitbases::builtin();
        for white_to_move in [true, false] {
            assert!(!bb.krkp_win(white_to_move, s("h8"), s("c2"), s("b2")));
            assert!(!bb.krkp_win(white_to_move, s("h7"), s("d3"), s("c3")));
            assert!(!bb.krkp_win(white_to_move, s("a8"), s("f2"), s("g2")));
        }
    }

    #[test]
    fn krkp_lone_pawn_is_lost() {
        let bb = Bitbases::builtin();
        assert!(bb.krkp_win(true, s("h1"), s("a8"), s("d4")));
        assert!(bb.krkp_win(false, s("h1"), s("a8"), s("d4")));
        // King blocking the pawn's path.
        assert!(bb.krkp_win(false, s("d1"), s("e4"), s("d4")));
    }

    #[test]
    fn round_trip_through_bytes() {
        let bb = Bitbases::builtin();
        let copy = Bitbases::from_bytes(bb.kpk_bytes().to_vec(), bb.krkp_bytes().to_vec()).unwrap();
        assert_eq!(&copy, bb.as_ref());
    }
}
