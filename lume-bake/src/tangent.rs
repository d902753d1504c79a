//! Per-vertex tangent frames for indexed meshes.
//!
//! Corner tangents come from the usual two-edge linear system of each
//! triangle, are averaged per vertex, Gram-Schmidt orthogonalised against the
//! vertex normal and packed as `(tangent, handedness)`.

use glam::{Vec2, Vec3, Vec4};
use rayon::prelude::*;

const DET_EPSILON: f32 = 1e-12;
const LENGTH_EPSILON: f32 = 1e-12;

/// Tangent and bitangent of one triangle corner. Zero for triangles with a
/// degenerate UV mapping.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct CornerFrame {
    pub tangent: Vec3,
    pub bitangent: Vec3,
}

fn corner_frame(p: [Vec3; 3], uv: [Vec2; 3], corner: usize) -> CornerFrame {
    let next = (corner + 1) % 3;
    let prev = (corner + 2) % 3;

    let e1 = p[next] - p[corner];
    let e2 = p[prev] - p[corner];
    let d1 = uv[next] - uv[corner];
    let d2 = uv[prev] - uv[corner];

    let det = d1.x * d2.y - d2.x * d1.y;
    if det.abs() <= DET_EPSILON || !det.is_finite() {
        return CornerFrame::default();
    }
    let r = 1.0 / det;

    CornerFrame {
        tangent: ((e1 * d2.y - e2 * d1.y) * r).normalize_or_zero(),
        bitangent: ((e2 * d1.x - e1 * d2.x) * r).normalize_or_zero(),
    }
}

/// One frame per entry of `indices`.
pub fn corner_frames(positions: &[Vec3], texcoords: &[Vec2], indices: &[u32]) -> Vec<CornerFrame> {
    indices
        .par_chunks_exact(3)
        .flat_map_iter(|tri| {
            let [a, b, c] = [tri[0] as usize, tri[1] as usize, tri[2] as usize];
            let p = [positions[a], positions[b], positions[c]];
            let uv = [texcoords[a], texcoords[b], texcoords[c]];
            (0..3).map(move |corner| corner_frame(p, uv, corner))
        })
        .collect()
}

/// Averages corner frames onto the vertices they belong to.
pub fn vertex_frames(indices: &[u32], corners: &[CornerFrame], vertex_count: usize) -> Vec<CornerFrame> {
    let mut sums = vec![CornerFrame::default(); vertex_count];
    for (&index, frame) in indices.iter().zip(corners) {
        let sum = &mut sums[index as usize];
        sum.tangent += frame.tangent;
        sum.bitangent += frame.bitangent;
    }
    for sum in &mut sums {
        sum.tangent = sum.tangent.normalize_or_zero();
        sum.bitangent = sum.bitangent.normalize_or_zero();
    }
    sums
}

/// Gram-Schmidt against `normal` and pack handedness into `w`.
pub fn pack_tangent(normal: Vec3, frame: CornerFrame) -> Vec4 {
    let n = normal.normalize_or_zero();

    let mut t = frame.tangent - n * n.dot(frame.tangent);
    if t.length_squared() <= LENGTH_EPSILON {
        t = if n == Vec3::ZERO { Vec3::X } else { n.any_orthonormal_vector() };
        return t.extend(1.0);
    }
    t = t.normalize();

    let b = frame.bitangent - n * n.dot(frame.bitangent) - t * t.dot(frame.bitangent);
    let w = if n.cross(t).dot(b) < 0.0 { -1.0 } else { 1.0 };
    t.extend(w)
}

/// Tangents for every vertex of an indexed mesh; output is index-aligned with
/// `positions`.
pub fn compute_tangents(
    positions: &[Vec3],
    texcoords: &[Vec2],
    normals: &[Vec3],
    indices: &[u32],
) -> Vec<Vec4> {
    let corners = corner_frames(positions, texcoords, indices);
    let frames = vertex_frames(indices, &corners, positions.len());

    normals
        .par_iter()
        .zip(frames.par_iter())
        .map(|(&n, &frame)| pack_tangent(n, frame))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: Vec4, b: Vec4) -> bool {
        (a - b).abs().max_element() < 1e-5
    }

    fn quad() -> (Vec<Vec3>, Vec<Vec2>, Vec<Vec3>, Vec<u32>) {
        (
            vec![Vec3::new(0.0, 0.0, 0.0), Vec3::new(1.0, 0.0, 0.0), Vec3::new(0.0, 1.0, 0.0), Vec3::new(1.0, 1.0, 0.0)],
            vec![Vec2::new(0.0, 0.0), Vec2::new(1.0, 0.0), Vec2::new(0.0, 1.0), Vec2::new(1.0, 1.0)],
            vec![Vec3::Z; 4],
            vec![0, 1, 2, 1, 3, 2],
        )
    }

    #[test]
    fn planar_quad_is_right_handed() {
        let (p, uv, n, i) = quad();
        let t = compute_tangents(&p, &uv, &n, &i);
        assert_eq!(t.len(), 4);
        for t in t {
            assert!(approx(t, Vec4::new(1.0, 0.0, 0.0, 1.0)), "{t:?}");
        }
    }

    #[test]
    fn mirrored_uvs_flip_handedness() {
        let (p, mut uv, n, i) = quad();
        for uv in &mut uv {
            uv.x = 1.0 - uv.x;
        }
        for t in compute_tangents(&p, &uv, &n, &i) {
            assert!(approx(t, Vec4::new(-1.0, 0.0, 0.0, -1.0)), "{t:?}");
        }
    }

    #[test]
    fn tangent_is_orthogonalised() {
        let (p, uv, _, i) = quad();
        let tilted = Vec3::new(0.3, 0.0, 1.0).normalize();
        let t = compute_tangents(&p, &uv, &[tilted; 4], &i);
        for t in t {
            assert!(t.truncate().dot(tilted).abs() < 1e-5);
            assert!((t.truncate().length() - 1.0).abs() < 1e-5);
        }
    }

    #[test]
    fn degenerate_uvs_stay_finite() {
        let (p, _, n, i) = quad();
        let t = compute_tangents(&p, &[Vec2::ZERO; 4], &n, &i);
        for t in t {
            assert!(t.is_finite());
            assert!(t.truncate().dot(Vec3::Z).abs() < 1e-5);
            assert_eq!(t.w, 1.0);
        }
    }
}
