//! Magic bitboard construction for rook and bishop attacks.

use crate::bitboard::Bitboard;
use crate::error::TableError;

pub(super) const ROOK_DIRS: [(i8, i8); 4] = [(1, 0), (-1, 0), (0, 1), (0, -1)];
pub(super) const BISHOP_DIRS: [(i8, i8); 4] = [(1, 1), (-1, -1), (1, -1), (-1, 1)];

/// Per-square lookup parameters into a shared attack table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub(crate) struct MagicEntry {
    pub(crate) mask: u64,
    pub(crate) magic: u64,
    pub(crate) shift: u8,
    pub(crate) offset: u32,
}

impl MagicEntry {
    #[inline(always)]
    pub(crate) fn index(&self, occupied: u64) -> usize {
        self.offset as usize + ((occupied & self.mask).wrapping_mul(self.magic) >> self.shift) as usize
    }
}

/// One slider kind: the per-square entries and the table they index into.
#[derive(Debug, Clone)]
pub(crate) struct SliderTable {
    pub(crate) entries: [MagicEntry; 64],
    pub(crate) attacks: Vec<Bitboard>,
}

impl SliderTable {
    #[inline(always)]
    pub(crate) fn attacks(&self, sq: usize, occupied: u64) -> Bitboard {
        self.attacks[self.entries[sq].index(occupied)]
    }
}

/// Walk rays from `sq` until a blocker or the board edge. The blocker square
/// is part of the attack set. With `inner` set the rays stop one square short
/// of the edge, which yields the relevant-occupancy mask.
pub(super) fn ray_attacks(sq: usize, occupied: u64, dirs: &[(i8, i8); 4], inner: bool) -> u64 {
    let (lo, hi) = if inner { (1, 6) } else { (0, 7) };
    let mut attacks = 0u64;
    for &(dx, dy) in dirs {
        let mut x = (sq % 8) as i8;
        let mut y = (sq / 8) as i8;
        loop {
            if dx != 0 {
                x += dx;
                if x < lo || x > hi {
                    break;
                }
            }
            if dy != 0 {
                y += dy;
                if y < lo || y > hi {
                    break;
                }
            }
            let bit = 1u64 << (y * 8 + x);
            attacks |= bit;
            if occupied & bit != 0 {
                break;
            }
        }
    }
    attacks
}

/// Fill a slider table from fixed magics, checking every occupancy subset of
/// every square. A magic that sends two subsets with different attack sets to
/// one slot is reported as a collision.
pub(super) fn build_slider(
    magics: &[u64; 64],
    bits: &[u8; 64],
    dirs: &[(i8, i8); 4],
    slider: &'static str,
) -> Result<SliderTable, TableError> {
    let mut entries = [MagicEntry::default(); 64];
    let mut offset = 0u32;
    for sq in 0..64 {
        entries[sq] = MagicEntry {
            mask: ray_attacks(sq, 0, dirs, true),
            magic: magics[sq],
            shift: 64 - bits[sq],
            offset,
        };
        offset += 1u32 << bits[sq];
    }

    // A slider always attacks at least one square, so an empty slot is unused.
    let mut attacks = vec![Bitboard::EMPTY; offset as usize];
    for (sq, entry) in entries.iter().enumerate() {
        // Carry-rippler enumeration of every subset of the mask.
        let mut subset = 0u64;
        loop {
            let atk = Bitboard::new(ray_attacks(sq, subset, dirs, false));
            let slot = &mut attacks[entry.index(subset)];
            if slot.is_empty() {
                *slot = atk;
            } else if *slot != atk {
                return Err(TableError::MagicCollision { square: sq as u8, slider });
            }
            subset = subset.wrapping_sub(entry.mask) & entry.mask;
            if subset == 0 {
                break;
            }
        }
    }

    Ok(SliderTable { entries, attacks })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn relevance_masks_skip_edges() {
        // Rook on a1: b1..g1 and a2..a7.
        assert_eq!(ray_attacks(0, 0, &ROOK_DIRS, true).count_ones(), 12);
        // Bishop on d4: 9 inner diagonal squares.
        assert_eq!(ray_attacks(27, 0, &BISHOP_DIRS, true).count_ones(), 9);
    }

    #[test]
    fn broken_magic_is_reported() {
        let magics = [1u64; 64];
        let bits = [1u8; 64];
        let err = build_slider(&magics, &bits, &ROOK_DIRS, "rook").unwrap_err();
        assert!(matches!(err, TableError::MagicCollision { square: 0, slider: "rook" }));
    }
}
