use glam::{Vec2, Vec3, Vec4};
use lume_core::LumeResult;

use crate::collapse::collapse_vertices;
use crate::config::BakeConfig;
use crate::discretize::Discretizer;
use crate::input::TriangleSoup;
use crate::tangent::compute_tangents;
use crate::vicinity::VicinityIndex;

#[derive(Clone, Debug, Default, PartialEq)]
pub struct IndexedMesh {
    pub positions: Vec<Vec3>,
    /// Empty until [`ensure_normals`] runs on a soup without normals.
    pub normals: Vec<Vec3>,
    pub texcoords: Vec<Vec2>,
    pub tangents: Vec<Vec4>,
    pub indices: Vec<u32>,
    /// Bounds of the input positions, without the discretization margin.
    pub aabb_min: Vec3,
    pub aabb_max: Vec3,
}

impl IndexedMesh {
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }
}

fn bounds(positions: &[Vec3]) -> (Vec3, Vec3) {
    positions
        .iter()
        .fold((Vec3::splat(f32::MAX), Vec3::splat(f32::MIN)), |(lo, hi), &p| {
            (lo.min(p), hi.max(p))
        })
}

/// Number of cells along the longest side of the padded box.
pub fn grid_subdivisions(longest_side: f32, config: &BakeConfig) -> u32 {
    let cells = longest_side / (2.0 * config.error_tolerance);
    let subdivisions = ((cells + 0.5) as usize).min(config.max_grid_size).max(1);
    u32::try_from(subdivisions).unwrap_or(u32::MAX)
}

/// Deduplicates `soup` and computes tangents for the result. Meshes whose
/// soup has no normals get smooth normals before the tangent pass.
pub fn make_indexed_mesh(soup: &TriangleSoup, config: &BakeConfig) -> LumeResult<IndexedMesh> {
    config.validate()?;
    soup.validate()?;

    if soup.is_empty() {
        return Ok(IndexedMesh::default());
    }

    let (bmin, bmax) = bounds(&soup.positions);
    let margin = Vec3::splat(config.margin_factor * config.error_tolerance);
    let fmin = bmin - margin;
    let fmax = bmax + margin;

    let longest_side = (fmax - fmin).max_element();
    let subdivisions = grid_subdivisions(longest_side, config);

    let discretizer = Discretizer::new(subdivisions, fmin, longest_side);
    let vicinity = VicinityIndex::build(&discretizer, &soup.positions);

    let collapse = collapse_vertices(soup, &vicinity, &discretizer, config.error_tolerance);
    debug_assert_eq!(collapse.indices.len(), soup.len());

    log::debug!(
        "Collapsed {} corners into {} vertices ({} cells per side, {} buckets)",
        soup.len(),
        collapse.vertex_count(),
        subdivisions,
        vicinity.bucket_count()
    );

    let mut mesh = IndexedMesh {
        positions: collapse.representatives.iter().map(|&i| soup.positions[i]).collect(),
        normals: if soup.has_normals() {
            collapse.representatives.iter().map(|&i| soup.normals[i]).collect()
        } else {
            Vec::new()
        },
        texcoords: collapse.representatives.iter().map(|&i| soup.texcoords[i]).collect(),
        tangents: Vec::new(),
        indices: collapse.indices,
        aabb_min: bmin,
        aabb_max: bmax,
    };

    ensure_normals(&mut mesh);
    mesh.tangents = compute_tangents(&mesh.positions, &mesh.texcoords, &mesh.normals, &mesh.indices);

    Ok(mesh)
}

/// Fills in area-independent smooth normals when the mesh has none: every
/// corner adds the unit normal of its triangle as seen from that corner.
pub fn ensure_normals(mesh: &mut IndexedMesh) {
    if !mesh.normals.is_empty() {
        return;
    }

    let mut normals = vec![Vec3::ZERO; mesh.positions.len()];
    for tri in mesh.indices.chunks_exact(3) {
        let [i, j, k] = [tri[0] as usize, tri[1] as usize, tri[2] as usize];
        for (me, next, prev) in [(i, j, k), (j, k, i), (k, i, j)] {
            let a = mesh.positions[next] - mesh.positions[me];
            let b = mesh.positions[prev] - mesh.positions[me];
            normals[me] += a.cross(b).normalize_or_zero();
        }
    }

    for n in &mut normals {
        *n = n.try_normalize().unwrap_or(Vec3::Y);
    }
    mesh.normals = normals;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grid_is_capped() {
        let cfg = BakeConfig {
            error_tolerance: 1e-9,
            max_grid_size: 16,
            ..Default::default()
        };
        assert_eq!(grid_subdivisions(100.0, &cfg), 16);
        assert_eq!(grid_subdivisions(1.0, &BakeConfig::with_tolerance(0.25)), 2);
        assert_eq!(grid_subdivisions(1.0, &BakeConfig::with_tolerance(0.0)), 1024 * 1024);
    }

    #[test]
    fn reported_bounds_are_unpadded() {
        let soup = TriangleSoup {
            positions: vec![Vec3::new(-1.0, 0.0, 2.0), Vec3::new(3.0, 1.0, 2.0), Vec3::new(0.0, 5.0, 2.0)],
            normals: vec![Vec3::Z; 3],
            texcoords: vec![Vec2::ZERO, Vec2::X, Vec2::Y],
        };
        let mesh = make_indexed_mesh(&soup, &BakeConfig::with_tolerance(0.01)).unwrap();
        assert_eq!(mesh.aabb_min, Vec3::new(-1.0, 0.0, 2.0));
        assert_eq!(mesh.aabb_max, Vec3::new(3.0, 5.0, 2.0));
    }

    #[test]
    fn generated_normals_face_the_winding() {
        let soup = TriangleSoup {
            positions: vec![Vec3::ZERO, Vec3::X, Vec3::Y],
            normals: Vec::new(),
            texcoords: vec![Vec2::ZERO, Vec2::X, Vec2::Y],
        };
        let mesh = make_indexed_mesh(&soup, &BakeConfig::default()).unwrap();
        assert_eq!(mesh.normals, vec![Vec3::Z; 3]);
        assert_eq!(mesh.tangents.len(), 3);
    }

    #[test]
    fn empty_soup_gives_empty_mesh() {
        let mesh = make_indexed_mesh(&TriangleSoup::default(), &BakeConfig::default()).unwrap();
        assert!(mesh.positions.is_empty());
        assert!(mesh.indices.is_empty());
    }

    #[test]
    fn invalid_tolerance_is_an_error() {
        let soup = TriangleSoup {
            positions: vec![Vec3::ZERO; 3],
            normals: Vec::new(),
            texcoords: vec![Vec2::ZERO; 3],
        };
        assert!(make_indexed_mesh(&soup, &BakeConfig::with_tolerance(-1.0)).is_err());
    }
}
