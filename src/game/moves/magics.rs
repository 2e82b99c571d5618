// src/game/moves/magics.rs

use std::sync::OnceLock;

use rand::rngs::SmallRng;
use rand::{RngCore, SeedableRng};

use crate::game::board::{BitBoard, PieceMovement};
use crate::game::defs::{PieceType, Square};

pub static MAGICS: OnceLock<Magics> = OnceLock::new();

#[inline]
pub fn magics() -> &'static Magics {
    MAGICS.get_or_init(Magics::new)
}

/// Seed for the magic search. Any seed works; a fixed one keeps the tables
/// reproducible between runs.
const MAGIC_SEED: u64 = 84_629_465_829;

/// Fancy magic tables for one slider type: per-square masks, multipliers
/// and shifts, with the per-square attack tables packed back-to-back into
/// one flat array addressed through `offset`.
pub struct MagicTable {
    pub magic: [u64; 64],
    pub mask: [u64; 64],
    pub shift: [u8; 64],
    pub offset: [usize; 64],
    pub attacks: Vec<u64>,
}

impl MagicTable {
    #[inline]
    pub fn attacks(&self, sq: Square, occ: u64) -> u64 {
        let s = sq.0 as usize;
        let idx = self.offset[s]
            + (((occ & self.mask[s]).wrapping_mul(self.magic[s])) >> self.shift[s]) as usize;
        debug_assert!(idx < self.attacks.len());
        self.attacks[idx]
    }

    fn build(pt: PieceType, rng: &mut SmallRng) -> Self {
        debug_assert!(pt == PieceType::Bishop || pt == PieceType::Rook);

        let mut magic = [0u64; 64];
        let mut mask = [0u64; 64];
        let mut shift = [0u8; 64];
        let mut offset = [0usize; 64];

        let mut total = 0usize;
        for s in 0..64 {
            let sq = Square(s as u8);
            mask[s] = relevant_blocker_mask(pt, sq).0;
            shift[s] = 64 - mask[s].count_ones() as u8;
            magic[s] = find_magic(pt, sq, rng);
            offset[s] = total;
            total += 1usize << (64 - shift[s]);
        }

        let mut attacks = vec![0u64; total];
        for s in 0..64 {
            let sq = Square(s as u8);
            enumerate_subsets(mask[s], |subocc| {
                let idx = offset[s] + ((subocc.wrapping_mul(magic[s])) >> shift[s]) as usize;
                let atk = slider_rays(pt, sq, BitBoard(subocc)).0;
                if attacks[idx] != 0 && attacks[idx] != atk {
                    panic!("destructive magic collision at sq {s}, idx {idx}");
                }
                attacks[idx] = atk;
            });
        }

        Self { magic, mask, shift, offset, attacks }
    }
}

pub struct Magics {
    pub rook: MagicTable,
    pub bishop: MagicTable,
}

impl Magics {
    pub fn new() -> Self {
        let mut rng = SmallRng::seed_from_u64(MAGIC_SEED);
        Self {
            rook: MagicTable::build(PieceType::Rook, &mut rng),
            bishop: MagicTable::build(PieceType::Bishop, &mut rng),
        }
    }

    #[inline]
    pub fn rook_attacks(&self, sq: Square, occ: BitBoard) -> BitBoard {
        BitBoard(self.rook.attacks(sq, occ.0))
    }

    #[inline]
    pub fn bishop_attacks(&self, sq: Square, occ: BitBoard) -> BitBoard {
        BitBoard(self.bishop.attacks(sq, occ.0))
    }

    #[inline]
    pub fn queen_attacks(&self, sq: Square, occ: BitBoard) -> BitBoard {
        self.rook_attacks(sq, occ) | self.bishop_attacks(sq, occ)
    }
}

impl Default for Magics {
    fn default() -> Self {
        Self::new()
    }
}

pub fn slider_rays(pt: PieceType, sq: Square, blockers: BitBoard) -> BitBoard {
    let bb = BitBoard::from_square(sq);
    match pt {
        PieceType::Bishop => PieceMovement::bishop_rays(bb, blockers),
        PieceType::Rook => PieceMovement::rook_rays(bb, blockers),
        PieceType::Queen => PieceMovement::queen_rays(bb, blockers),
        _ => panic!("not a slider: {pt:?}"),
    }
}

/// The slider's empty-board attacks minus edge squares in every direction
/// the slider does not already stand on: nothing can hide behind the edge,
/// so those blockers never change the attack set.
pub fn relevant_blocker_mask(pt: PieceType, sq: Square) -> BitBoard {
    let file_bb = BitBoard::from_file(sq.get_file());
    let rank_bb = BitBoard::from_rank(sq.get_rank());

    let attacks = slider_rays(pt, sq, BitBoard::EMPTY);
    let irrelevant = ((BitBoard::FILE_A | BitBoard::FILE_H) & !file_bb)
        | ((BitBoard::RANK_1 | BitBoard::RANK_8) & !rank_bb);

    attacks & !irrelevant
}

/// Carry-Rippler traversal of every subset of `mask`, the empty set included.
pub fn enumerate_subsets(mask: u64, mut f: impl FnMut(u64)) {
    let mut sub = 0u64;
    loop {
        f(sub);
        sub = sub.wrapping_sub(mask) & mask;
        if sub == 0 {
            break;
        }
    }
}

/// Sparse random candidates work best: a magic needs the product's high
/// bits to separate blocker subsets, which few-bit multipliers achieve far
/// more often than dense ones.
#[inline]
fn sparse_u64(rng: &mut SmallRng) -> u64 {
    rng.next_u64() & rng.next_u64() & rng.next_u64()
}

/// Searches for a multiplier that maps every blocker subset of `sq` to a
/// distinct table slot, except where two subsets share the same true attack
/// set (a constructive collision, which is what makes the table compact).
/// Retries until found; magics exist for every square on an 8x8 board.
fn find_magic(pt: PieceType, sq: Square, rng: &mut SmallRng) -> u64 {
    let mask = relevant_blocker_mask(pt, sq).0;
    let n_blockers = mask.count_ones();
    let table_size = 1usize << n_blockers;
    let key_shift = 64 - n_blockers;

    let mut subsets = Vec::with_capacity(table_size);
    enumerate_subsets(mask, |subocc| {
        subsets.push((subocc, slider_rays(pt, sq, BitBoard(subocc)).0));
    });

    let mut mapped = vec![0u64; table_size];
    loop {
        for slot in mapped.iter_mut() {
            *slot = 0;
        }

        let candidate = sparse_u64(rng);
        let mut valid = true;
        for &(subocc, attack) in &subsets {
            let key = (subocc.wrapping_mul(candidate) >> key_shift) as usize;
            if mapped[key] == 0 {
                mapped[key] = attack;
            } else if mapped[key] != attack {
                valid = false;
                break;
            }
        }

        if valid {
            return candidate;
        }
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::defs::squarename as SQ;

    #[test]
    fn relevant_masks_trim_edges() {
        // a1 rook: the a-file up to a7 and the first rank up to g1
        let mask = relevant_blocker_mask(PieceType::Rook, SQ::A1);
        assert_eq!(mask.count(), 12);
        assert!(mask.contains(SQ::A7));
        assert!(!mask.contains(SQ::A8));
        assert!(mask.contains(SQ::G1));
        assert!(!mask.contains(SQ::H1));

        // central rook keeps 10 relevant squares
        assert_eq!(relevant_blocker_mask(PieceType::Rook, SQ::E4).count(), 10);

        // central bishop: diagonals without the board rim
        let mask = relevant_blocker_mask(PieceType::Bishop, SQ::E4);
        assert_eq!(mask.count(), 9);
        assert!(!mask.contains(SQ::A8));
        assert!(!mask.contains(SQ::H1));
    }

    #[test]
    fn carry_rippler_visits_every_subset() {
        let mask = 0b1011_0100u64;
        let mut seen = Vec::new();
        enumerate_subsets(mask, |s| seen.push(s));
        assert_eq!(seen.len(), 1 << mask.count_ones());
        seen.sort_unstable();
        seen.dedup();
        assert_eq!(seen.len(), 1 << mask.count_ones());
        for s in seen {
            assert_eq!(s & !mask, 0);
        }
    }

    #[test]
    fn magic_lookups_match_ray_fills() {
        let m = magics();
        for s in 0..64u8 {
            let sq = Square(s);
            for (pt, tbl) in [(PieceType::Rook, &m.rook), (PieceType::Bishop, &m.bishop)] {
                let mask = tbl.mask[s as usize];
                enumerate_subsets(mask, |subocc| {
                    let expected = slider_rays(pt, sq, BitBoard(subocc)).0;
                    assert_eq!(tbl.attacks(sq, subocc), expected, "{pt:?} on {sq}");
                });
            }
        }
    }

    #[test]
    fn magic_lookup_ignores_irrelevant_blockers() {
        let m = magics();
        // blockers off the rook's lines must not change the result
        let noise = BitBoard::from_square(SQ::B2) | BitBoard::from_square(SQ::G7);
        assert_eq!(
            m.rook_attacks(SQ::A1, noise),
            m.rook_attacks(SQ::A1, BitBoard::EMPTY)
        );
    }

    #[test]
    fn queen_is_union_of_rook_and_bishop() {
        let m = magics();
        let occ = BitBoard::from_square(SQ::D5) | BitBoard::from_square(SQ::F3);
        assert_eq!(
            m.queen_attacks(SQ::D4, occ),
            m.rook_attacks(SQ::D4, occ) | m.bishop_attacks(SQ::D4, occ)
        );
    }
}
