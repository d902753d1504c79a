use glam::{Vec2, Vec3};
use lume_core::{LumeError, LumeResult};

/// Texture slots of a material, in on-disk order.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum TextureSlot {
    BaseColor,
    Roughness,
    Metalness,
    AlphaMask,
    NormalMap,
}

impl TextureSlot {
    pub const ALL: [TextureSlot; 5] = [
        TextureSlot::BaseColor,
        TextureSlot::Roughness,
        TextureSlot::Metalness,
        TextureSlot::AlphaMask,
        TextureSlot::NormalMap,
    ];

    /// Channel count recorded for textures first seen in this slot. This is
    /// policy, not a property of the image.
    pub fn channels(self) -> u8 {
        match self {
            TextureSlot::BaseColor => 4,
            TextureSlot::Roughness => 1,
            TextureSlot::Metalness => 1,
            TextureSlot::AlphaMask => 4,
            TextureSlot::NormalMap => 4,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct InputMaterial {
    /// Informational only.
    pub name: String,
    pub base_color: Vec3,
    pub base_roughness: f32,
    pub base_metalness: f32,
    pub base_color_texture: Option<String>,
    pub roughness_texture: Option<String>,
    pub metalness_texture: Option<String>,
    /// When set, expected to be the same RGBA image as the base color texture.
    pub alpha_mask_texture: Option<String>,
    pub normal_map_texture: Option<String>,
}

impl InputMaterial {
    pub fn texture(&self, slot: TextureSlot) -> Option<&str> {
        let path = match slot {
            TextureSlot::BaseColor => &self.base_color_texture,
            TextureSlot::Roughness => &self.roughness_texture,
            TextureSlot::Metalness => &self.metalness_texture,
            TextureSlot::AlphaMask => &self.alpha_mask_texture,
            TextureSlot::NormalMap => &self.normal_map_texture,
        };
        path.as_deref().filter(|p| !p.is_empty())
    }
}

/// A contiguous run of corners in the model's global soup, drawn with one material.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct InputMesh {
    /// Informational only.
    pub name: String,
    pub material_index: usize,
    pub vertex_start: usize,
    pub vertex_count: usize,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct InputModel {
    pub source_path: String,
    pub materials: Vec<InputMaterial>,
    pub meshes: Vec<InputMesh>,
    pub positions: Vec<Vec3>,
    /// Either empty or as long as `positions`.
    pub normals: Vec<Vec3>,
    pub texcoords: Vec<Vec2>,
}

impl InputModel {
    pub fn corner_count(&self) -> usize {
        self.meshes.iter().map(|m| m.vertex_count).sum()
    }

    pub fn validate(&self) -> LumeResult<()> {
        let n = self.positions.len();
        if self.texcoords.len() != n || !(self.normals.is_empty() || self.normals.len() == n) {
            return Err(LumeError::InvalidInput(format!(
                "{}: attribute arrays disagree ({} positions, {} normals, {} texcoords)",
                self.source_path,
                n,
                self.normals.len(),
                self.texcoords.len()
            )));
        }
        for mesh in &self.meshes {
            if mesh.material_index >= self.materials.len() {
                return Err(LumeError::InvalidReference {
                    what: "material",
                    index: mesh.material_index as u64,
                    count: self.materials.len() as u64,
                });
            }
            let end = mesh.vertex_start.checked_add(mesh.vertex_count);
            if end.is_none_or(|end| end > n) {
                return Err(LumeError::InvalidInput(format!(
                    "mesh '{}' spans corners {}+{} but the model has {}",
                    mesh.name, mesh.vertex_start, mesh.vertex_count, n
                )));
            }
        }
        Ok(())
    }

    /// Copies the corners of `mesh` out of the global arrays.
    pub fn soup(&self, mesh: &InputMesh) -> LumeResult<TriangleSoup> {
        let range = mesh.vertex_start..mesh.vertex_start + mesh.vertex_count;
        let positions = self
            .positions
            .get(range.clone())
            .ok_or_else(|| LumeError::InvalidInput(format!("mesh '{}' is out of range", mesh.name)))?;
        let texcoords = self
            .texcoords
            .get(range.clone())
            .ok_or_else(|| LumeError::InvalidInput(format!("mesh '{}' has no texcoords", mesh.name)))?;
        let normals = if self.normals.is_empty() {
            &[][..]
        } else {
            self.normals
                .get(range)
                .ok_or_else(|| LumeError::InvalidInput(format!("mesh '{}' has no normals", mesh.name)))?
        };

        let soup = TriangleSoup {
            positions: positions.to_vec(),
            normals: normals.to_vec(),
            texcoords: texcoords.to_vec(),
        };
        soup.validate()?;
        Ok(soup)
    }
}

/// Unindexed corners; every three consecutive entries form a triangle.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TriangleSoup {
    pub positions: Vec<Vec3>,
    /// Empty when the source has no normals.
    pub normals: Vec<Vec3>,
    pub texcoords: Vec<Vec2>,
}

impl TriangleSoup {
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn has_normals(&self) -> bool {
        !self.normals.is_empty()
    }

    pub fn validate(&self) -> LumeResult<()> {
        let n = self.positions.len();
        if n % 3 != 0 {
            return Err(LumeError::InvalidInput(format!(
                "triangle soup has {n} corners, not a multiple of 3"
            )));
        }
        if self.texcoords.len() != n || !(self.normals.is_empty() || self.normals.len() == n) {
            return Err(LumeError::InvalidInput(format!(
                "triangle soup attributes disagree ({} positions, {} normals, {} texcoords)",
                n,
                self.normals.len(),
                self.texcoords.len()
            )));
        }
        Ok(())
    }
}
