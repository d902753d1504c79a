use glam::{IVec3, Vec3};

/// Integer grid cell of a position.
pub type Cell = IVec3;

/// Maps positions inside a (padded) bounding box onto a uniform grid with
/// `subdivisions` cells along its longest side.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Discretizer {
    min: Vec3,
    scale: f32,
}

impl Discretizer {
    pub fn new(subdivisions: u32, min: Vec3, longest_side: f32) -> Self {
        Self {
            min,
            scale: subdivisions.max(1) as f32 / longest_side,
        }
    }

    pub fn min(&self) -> Vec3 {
        self.min
    }

    /// Inputs are expected to lie inside the box, so the scaled offset is
    /// non-negative and the cast truncates like `floor`.
    #[inline]
    pub fn discretize(&self, position: Vec3) -> Cell {
        let d = (position - self.min) * self.scale;
        IVec3::new(d.x as u32 as i32, d.y as u32 as i32, d.z as u32 as i32)
    }
}
