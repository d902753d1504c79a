use std::path::Path;

use lume_core::{BakedMesh, BakedModel, LumeError, LumeResult};

use crate::config::BakeConfig;
use crate::index::{make_indexed_mesh, IndexedMesh};
use crate::input::InputModel;
use crate::texture::TextureTable;

/// Counts gathered while baking, for logging.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct BakeReport {
    pub meshes: usize,
    pub materials: usize,
    pub input_corners: usize,
    pub output_vertices: usize,
    pub output_indices: usize,
    pub tangents: usize,
    pub unique_textures: usize,
}

pub struct BakeOutput {
    pub model: BakedModel,
    pub textures: TextureTable,
    pub report: BakeReport,
}

/// Indexes every mesh of `model` independently, in mesh order.
pub fn index_meshes(model: &InputModel, config: &BakeConfig) -> LumeResult<Vec<IndexedMesh>> {
    model.validate()?;
    model
        .meshes
        .iter()
        .map(|mesh| {
            let soup = model.soup(mesh)?;
            let indexed = make_indexed_mesh(&soup, config)?;
            log::debug!(
                "Mesh '{}': {} corners -> {} vertices",
                mesh.name,
                soup.len(),
                indexed.vertex_count()
            );
            Ok(indexed)
        })
        .collect()
}

fn to_u32(what: &str, value: usize) -> LumeResult<u32> {
    u32::try_from(value).map_err(|_| LumeError::InvalidInput(format!("{what} {value} does not fit in 32 bits")))
}

/// Runs the whole pipeline. Texture paths in the result point into
/// `texture_dir`, relative to the asset.
pub fn bake_model(model: &InputModel, config: &BakeConfig, texture_dir: &Path) -> LumeResult<BakeOutput> {
    let indexed = index_meshes(model, config)?;

    let mut textures = TextureTable::from_materials(&model.materials);
    textures.relocate(texture_dir);

    let mut report = BakeReport {
        meshes: model.meshes.len(),
        materials: model.materials.len(),
        input_corners: model.corner_count(),
        unique_textures: textures.len(),
        ..Default::default()
    };

    let mut meshes = Vec::with_capacity(indexed.len());
    for (input, mesh) in model.meshes.iter().zip(indexed) {
        to_u32("vertex count", mesh.positions.len())?;
        to_u32("index count", mesh.indices.len())?;

        report.output_vertices += mesh.positions.len();
        report.output_indices += mesh.indices.len();
        report.tangents += mesh.tangents.len();

        meshes.push(BakedMesh {
            material: to_u32("material index", input.material_index)?,
            positions: mesh.positions,
            normals: mesh.normals,
            texcoords: mesh.texcoords,
            tangents: mesh.tangents,
            indices: mesh.indices,
        });
    }

    let baked = BakedModel {
        textures: textures.baked_textures(),
        materials: model.materials.iter().map(|m| textures.material(m)).collect(),
        meshes,
    };

    Ok(BakeOutput {
        model: baked,
        textures,
        report,
    })
}
