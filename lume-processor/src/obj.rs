//! Wavefront OBJ to [`InputModel`].

use std::path::Path;

use anyhow::{Context, Result};
use glam::{Vec2, Vec3};
use lume_bake::{InputMaterial, InputMesh, InputModel};

fn load_options() -> tobj::LoadOptions {
    tobj::LoadOptions {
        single_index: false,
        triangulate: true,
        ignore_points: true,
        ignore_lines: true,
        ..Default::default()
    }
}

/// Loads `path` into a triangle soup. Every tobj model becomes one mesh;
/// tobj already splits groups on material changes.
pub fn load_obj(path: &Path) -> Result<InputModel> {
    let (models, materials) =
        tobj::load_obj(path, &load_options()).with_context(|| format!("Failed to load OBJ file: {}", path.display()))?;

    let materials = materials.unwrap_or_else(|err| {
        log::warn!("{}: no usable material library ({err}), using defaults", path.display());
        Vec::new()
    });

    let dir = path.parent().unwrap_or(Path::new(""));
    let mut out = InputModel {
        source_path: path.to_string_lossy().into_owned(),
        materials: materials.iter().map(|m| convert_material(m, dir)).collect(),
        ..Default::default()
    };

    // Normals are all-or-nothing for the global soup.
    let keep_normals = models
        .iter()
        .all(|m| m.mesh.indices.is_empty() || !m.mesh.normal_indices.is_empty());
    if !keep_normals {
        log::warn!("{}: some faces have no normals, generating smooth normals instead", path.display());
    }

    let mut default_material = None;
    for model in &models {
        let mesh = &model.mesh;
        if mesh.indices.is_empty() {
            continue;
        }

        let material_index = match mesh.material_id {
            Some(id) if id < out.materials.len() => id,
            _ => *default_material.get_or_insert_with(|| {
                out.materials.push(InputMaterial {
                    name: "default".into(),
                    base_color: Vec3::ONE,
                    ..Default::default()
                });
                out.materials.len() - 1
            }),
        };

        let vertex_start = out.positions.len();
        for (corner, &p) in mesh.indices.iter().enumerate() {
            out.positions.push(vec3_at(&mesh.positions, p).context("position index out of range")?);

            let uv = match mesh.texcoord_indices.get(corner) {
                Some(&t) => vec2_at(&mesh.texcoords, t).context("texcoord index out of range")?,
                None => Vec2::ZERO,
            };
            out.texcoords.push(uv);

            if keep_normals {
                let n = mesh.normal_indices.get(corner).context("missing normal index")?;
                out.normals.push(vec3_at(&mesh.normals, *n).context("normal index out of range")?);
            }
        }

        out.meshes.push(InputMesh {
            name: model.name.clone(),
            material_index,
            vertex_start,
            vertex_count: mesh.indices.len(),
        });
    }

    Ok(out)
}

fn vec3_at(data: &[f32], index: u32) -> Option<Vec3> {
    let i = index as usize * 3;
    data.get(i..i + 3).map(Vec3::from_slice)
}

fn vec2_at(data: &[f32], index: u32) -> Option<Vec2> {
    let i = index as usize * 2;
    data.get(i..i + 2).map(Vec2::from_slice)
}

fn convert_material(mat: &tobj::Material, dir: &Path) -> InputMaterial {
    let param = |key: &str| mat.unknown_param.get(key).map(String::as_str);
    let scalar = |key: &str| param(key).and_then(|v| v.trim().parse::<f32>().ok()).unwrap_or(0.0);
    let texture = |name: Option<&str>| name.and_then(texture_file).map(|f| dir.join(f).to_string_lossy().into_owned());

    InputMaterial {
        name: mat.name.clone(),
        base_color: mat.diffuse.map(Vec3::from).unwrap_or(Vec3::ONE),
        base_roughness: scalar("Pr"),
        base_metalness: scalar("Pm"),
        base_color_texture: texture(mat.diffuse_texture.as_deref()),
        roughness_texture: texture(param("map_Pr")),
        metalness_texture: texture(param("map_Pm")),
        alpha_mask_texture: texture(mat.dissolve_texture.as_deref()),
        normal_map_texture: texture(
            mat.normal_texture
                .as_deref()
                .or(param("map_Bump"))
                .or(param("bump"))
                .or(param("norm")),
        ),
    }
}

/// Strips leading map options such as `-bm 0.5` from a texture statement.
fn texture_file(raw: &str) -> Option<&str> {
    let raw = raw.trim();
    let file = if raw.starts_with('-') {
        raw.split_whitespace().last()?
    } else {
        raw
    };
    (!file.is_empty()).then_some(file)
}
