//! Vertex collapse over a triangle soup.
//!
//! Corners merge when every component of position, normal (if present) and
//! texcoord differs by at most the tolerance. The test is not transitive and
//! the grouping is first-come: the first unassigned corner of a group becomes
//! its representative and absorbs every still-unassigned neighbour that
//! matches *it*. Neighbours of absorbed corners are not chased.

use glam::{Vec2, Vec3};

use crate::discretize::Discretizer;
use crate::input::TriangleSoup;
use crate::vicinity::VicinityIndex;

/// Result of a collapse: one index per soup corner and, per output vertex, the
/// soup corner whose attributes it carries.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Collapse {
    pub indices: Vec<u32>,
    pub representatives: Vec<usize>,
}

impl Collapse {
    pub fn vertex_count(&self) -> usize {
        self.representatives.len()
    }
}

#[inline]
fn within3(a: Vec3, b: Vec3, tolerance: f32) -> bool {
    (a - b).abs().cmple(Vec3::splat(tolerance)).all()
}

#[inline]
fn within2(a: Vec2, b: Vec2, tolerance: f32) -> bool {
    (a - b).abs().cmple(Vec2::splat(tolerance)).all()
}

pub fn mergeable(soup: &TriangleSoup, a: usize, b: usize, tolerance: f32) -> bool {
    if !within3(soup.positions[a], soup.positions[b], tolerance) {
        return false;
    }
    if soup.has_normals() && !within3(soup.normals[a], soup.normals[b], tolerance) {
        return false;
    }
    within2(soup.texcoords[a], soup.texcoords[b], tolerance)
}

pub fn collapse_vertices(
    soup: &TriangleSoup,
    vicinity: &VicinityIndex,
    discretizer: &Discretizer,
    tolerance: f32,
) -> Collapse {
    let corners = soup.len();
    let mut indices = Vec::with_capacity(corners);
    let mut representatives = Vec::with_capacity(corners);

    let mut slot_of: Vec<Option<u32>> = vec![None; corners];

    for i in 0..corners {
        if let Some(slot) = slot_of[i] {
            debug_assert!((slot as usize) < representatives.len());
            indices.push(slot);
            continue;
        }

        let slot = representatives.len() as u32;
        representatives.push(i);
        slot_of[i] = Some(slot);
        indices.push(slot);

        let cell = discretizer.discretize(soup.positions[i]);
        for j in vicinity.candidates(cell) {
            if slot_of[j].is_some() {
                continue;
            }
            if mergeable(soup, i, j, tolerance) {
                slot_of[j] = Some(slot);
            }
        }
    }

    Collapse {
        indices,
        representatives,
    }
}
