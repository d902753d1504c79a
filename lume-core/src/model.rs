use glam::{Vec2, Vec3, Vec4};

/// Index into [`BakedModel::textures`].
pub type TextureId = u32;

/// Texture slot marker used on disk for "no texture".
pub const NO_TEXTURE: u32 = 0xFFFF_FFFF;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BakedTexture {
    pub path: String,
    pub channels: u8,
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct BakedMaterial {
    pub base_color: Option<TextureId>,
    pub roughness: Option<TextureId>,
    pub metalness: Option<TextureId>,
    pub alpha_mask: Option<TextureId>,
    pub normal_map: Option<TextureId>,
}

impl BakedMaterial {
    /// Slots in on-disk order.
    pub fn slots(&self) -> [Option<TextureId>; 5] {
        [
            self.base_color,
            self.roughness,
            self.metalness,
            self.alpha_mask,
            self.normal_map,
        ]
    }

    pub fn from_slots(slots: [Option<TextureId>; 5]) -> Self {
        let [base_color, roughness, metalness, alpha_mask, normal_map] = slots;
        Self {
            base_color,
            roughness,
            metalness,
            alpha_mask,
            normal_map,
        }
    }
}

/// Indexed geometry of one mesh. All per-vertex arrays share the same length;
/// indices are local to this mesh.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct BakedMesh {
    pub material: u32,
    pub positions: Vec<Vec3>,
    pub normals: Vec<Vec3>,
    pub texcoords: Vec<Vec2>,
    pub tangents: Vec<Vec4>,
    pub indices: Vec<u32>,
}

impl BakedMesh {
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct BakedModel {
    pub textures: Vec<BakedTexture>,
    pub materials: Vec<BakedMaterial>,
    pub meshes: Vec<BakedMesh>,
}

impl BakedModel {
    pub fn vertex_count(&self) -> usize {
        self.meshes.iter().map(BakedMesh::vertex_count).sum()
    }

    pub fn index_count(&self) -> usize {
        self.meshes.iter().map(|m| m.indices.len()).sum()
    }
}
