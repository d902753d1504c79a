//! Hash-bucketed lookup of soup corners by grid cell.
//!
//! Distinct cells may share a key; the index only narrows the candidate set and
//! callers compare attributes exactly.

use std::collections::HashMap;

use glam::{IVec3, Vec3};

use crate::discretize::{Cell, Discretizer};

pub type VicinityKey = u64;

/// Offsets of the 3x3x3 block around a cell, own cell first.
pub const NEIGHBOURS: [IVec3; 27] = {
    let mut out = [IVec3::ZERO; 27];
    let steps = [0, 1, -1];
    let mut i = 0;
    while i < 27 {
        out[i] = IVec3::new(steps[i / 9], steps[(i / 3) % 3], steps[i % 3]);
        i += 1;
    }
    out
};

/// Order-sensitive combine of the three cell coordinates (boost `hash_combine`
/// over sign-extended 64-bit values). Stable across runs and platforms.
#[inline]
pub fn hash_cell(cell: Cell) -> VicinityKey {
    let mut hash = cell.x as i64 as u64;
    for c in [cell.y, cell.z] {
        let v = c as i64 as u64;
        hash ^= v
            .wrapping_add(0x9e37_79b9)
            .wrapping_add(hash << 6)
            .wrapping_add(hash >> 2);
    }
    hash
}

#[inline]
pub fn neighbour(cell: Cell, offset: IVec3) -> Cell {
    IVec3::new(
        cell.x.wrapping_add(offset.x),
        cell.y.wrapping_add(offset.y),
        cell.z.wrapping_add(offset.z),
    )
}

/// Multi-valued map from cell key to corner indices, in insertion order.
#[derive(Debug, Default)]
pub struct VicinityIndex {
    buckets: HashMap<VicinityKey, Vec<usize>>,
}

impl VicinityIndex {
    pub fn build(discretizer: &Discretizer, positions: &[Vec3]) -> Self {
        let mut buckets: HashMap<VicinityKey, Vec<usize>> = HashMap::with_capacity(positions.len());
        for (index, &p) in positions.iter().enumerate() {
            let key = hash_cell(discretizer.discretize(p));
            buckets.entry(key).or_default().push(index);
        }
        Self { buckets }
    }

    pub fn bucket(&self, key: VicinityKey) -> &[usize] {
        self.buckets.get(&key).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn bucket_count(&self) -> usize {
        self.buckets.len()
    }

    /// Every corner whose cell hashes like one of the 27 cells around `cell`.
    /// A corner may be yielded more than once when keys collide.
    pub fn candidates(&self, cell: Cell) -> impl Iterator<Item = usize> + '_ {
        NEIGHBOURS
            .into_iter()
            .flat_map(move |offset| self.bucket(hash_cell(neighbour(cell, offset))).iter().copied())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn neighbourhood_is_complete() {
        assert_eq!(NEIGHBOURS[0], IVec3::ZERO);
        for x in -1..=1 {
            for y in -1..=1 {
                for z in -1..=1 {
                    let o = IVec3::new(x, y, z);
                    assert_eq!(NEIGHBOURS.iter().filter(|&&n| n == o).count(), 1);
                }
            }
        }
    }

    #[test]
    fn hash_is_order_sensitive() {
        assert_ne!(hash_cell(IVec3::new(1, 2, 3)), hash_cell(IVec3::new(3, 2, 1)));
        assert_ne!(hash_cell(IVec3::new(1, 2, 3)), hash_cell(IVec3::new(2, 1, 3)));
        assert_ne!(hash_cell(IVec3::new(0, 0, -1)), hash_cell(IVec3::new(-1, 0, 0)));
    }

    #[test]
    fn hash_is_stable() {
        // x = 0 leaves the seed at zero: 0 ^ (0 + k) = k for y = 0.
        let after_y = 0x9e37_79b9u64;
        let expected = after_y ^ 0x9e37_79b9u64.wrapping_add(after_y << 6).wrapping_add(after_y >> 2);
        assert_eq!(hash_cell(IVec3::ZERO), expected);
    }

    #[test]
    fn finds_corners_in_adjacent_cells() {
        let d = Discretizer::new(10, Vec3::ZERO, 10.0);
        let positions = [
            Vec3::new(0.5, 0.5, 0.5),
            Vec3::new(1.5, 0.5, 0.5),
            Vec3::new(2.5, 0.5, 0.5),
            Vec3::new(0.6, 0.6, 0.6),
        ];
        let index = VicinityIndex::build(&d, &positions);

        let mut near: Vec<usize> = index.candidates(d.discretize(positions[0])).collect();
        near.sort_unstable();
        near.dedup();
        assert_eq!(near, vec![0, 1, 3]);
        assert_eq!(index.bucket(hash_cell(IVec3::ZERO)), &[0, 3]);
    }
}
