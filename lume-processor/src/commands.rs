use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result};
use lume_bake::{bake_model, BakeConfig, TextureTable};
use lume_core::{load_baked_model, save_baked_model, ReadOptions};

use crate::obj::load_obj;

/// Bytes per soup corner: position, normal and texcoord.
const SOUP_VERTEX_SIZE: usize = (3 + 3 + 2) * 4;

/// Texture directory used when none is given: `<output stem>-tex`.
pub fn default_texture_dir(output: &Path) -> PathBuf {
    let stem = output.file_stem().map(|s| s.to_string_lossy().into_owned()).unwrap_or_default();
    PathBuf::from(format!("{stem}-tex"))
}

pub fn bake(input: &Path, output: &Path, config: &BakeConfig, texture_dir: Option<&Path>) -> Result<()> {
    let start = Instant::now();
    config.validate()?;

    let model = load_obj(input)?;
    let corners = model.corner_count();
    log::info!(
        "{}: {} meshes, {} materials",
        input.display(),
        model.meshes.len(),
        model.materials.len()
    );
    log::info!(" - triangle soup vertices: {corners} => {} kB", corners * SOUP_VERTEX_SIZE / 1024);

    let texture_dir = texture_dir.map(Path::to_path_buf).unwrap_or_else(|| default_texture_dir(output));
    let baked = bake_model(&model, config, &texture_dir).with_context(|| format!("Failed to bake {}", input.display()))?;
    let report = baked.report;

    log::info!(
        " - indexed vertices: {} with {} indices => {} kB",
        report.output_vertices,
        report.output_indices,
        (report.output_vertices * SOUP_VERTEX_SIZE + report.output_indices * 4) / 1024
    );
    log::info!(" - tangents: {}", report.tangents);
    log::info!(" - unique textures: {}", report.unique_textures);

    let root = output.parent().unwrap_or(Path::new(""));
    if !root.as_os_str().is_empty() {
        fs::create_dir_all(root).with_context(|| format!("Failed to create {}", root.display()))?;
    }
    save_baked_model(&baked.model, output).with_context(|| format!("Failed to write {}", output.display()))?;

    let copied = copy_textures(&baked.textures, root);
    log::info!("Copied {copied} textures out of {}.", baked.textures.len());
    log::info!("Baked {} in {:.2}s", output.display(), start.elapsed().as_secs_f32());

    Ok(())
}

/// Copies every texture next to the asset in `root`. Existing files are left
/// alone and count as failures. Returns the number of successful copies.
pub fn copy_textures(textures: &TextureTable, root: &Path) -> usize {
    textures
        .copy_plan(root)
        .into_iter()
        .filter(|(source, dest)| match copy_new(source, dest) {
            Ok(()) => true,
            Err(err) => {
                log::warn!("Copying '{}' to '{}' failed: {err}", source.display(), dest.display());
                false
            }
        })
        .count()
}

fn copy_new(source: &Path, dest: &Path) -> io::Result<()> {
    if let Some(dir) = dest.parent() {
        fs::create_dir_all(dir)?;
    }
    let mut from = File::open(source)?;
    let mut to = File::options().write(true).create_new(true).open(dest)?;
    io::copy(&mut from, &mut to)?;
    Ok(())
}

pub fn inspect(path: &Path, options: &ReadOptions) -> Result<()> {
    let model = load_baked_model(path, options).with_context(|| format!("Failed to load {}", path.display()))?;

    println!("{}:", path.display());
    println!(
        "  {} textures, {} materials, {} meshes, {} vertices, {} indices",
        model.textures.len(),
        model.materials.len(),
        model.meshes.len(),
        model.vertex_count(),
        model.index_count()
    );
    for (id, texture) in model.textures.iter().enumerate() {
        println!("  texture {id}: {} ({} channels)", texture.path, texture.channels);
    }
    for (id, material) in model.materials.iter().enumerate() {
        let slots: Vec<String> = material
            .slots()
            .iter()
            .map(|slot| slot.map_or_else(|| "-".to_owned(), |t| t.to_string()))
            .collect();
        println!("  material {id}: [{}]", slots.join(", "));
    }
    for (id, mesh) in model.meshes.iter().enumerate() {
        println!(
            "  mesh {id}: material {}, {} vertices, {} triangles",
            mesh.material,
            mesh.vertex_count(),
            mesh.triangle_count()
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const QUAD_OBJ: &str = "\
mtllib quad.mtl
v 0 0 0
v 1 0 0
v 1 1 0
v 0 1 0
vt 0 0
vt 1 0
vt 1 1
vt 0 1
usemtl tiles
f 1/1 2/2 3/3 4/4
";

    const QUAD_MTL: &str = "\
newmtl tiles
map_Kd maps/tiles.png
map_Bump maps/missing.png
";

    #[test]
    fn texture_dir_follows_output_stem() {
        assert_eq!(default_texture_dir(Path::new("out/sponza.lmesh")), PathBuf::from("sponza-tex"));
    }

    #[test]
    fn bake_writes_asset_and_copies_textures() {
        let src = tempfile::tempdir().unwrap();
        let dst = tempfile::tempdir().unwrap();
        fs::create_dir(src.path().join("maps")).unwrap();
        fs::write(src.path().join("maps/tiles.png"), b"not really a png").unwrap();
        fs::write(src.path().join("quad.obj"), QUAD_OBJ).unwrap();
        fs::write(src.path().join("quad.mtl"), QUAD_MTL).unwrap();

        let output = dst.path().join("nested/quad.lmesh");
        bake(&src.path().join("quad.obj"), &output, &BakeConfig::default(), None).unwrap();

        let copied = dst.path().join("nested/quad-tex/tiles.png");
        assert_eq!(fs::read(copied).unwrap(), b"not really a png");
        assert!(!dst.path().join("nested/quad-tex/missing.png").exists());

        let model = load_baked_model(&output, &ReadOptions::default()).unwrap();
        assert_eq!(model.meshes.len(), 1);
        assert_eq!(model.meshes[0].vertex_count(), 4);
        assert_eq!(model.meshes[0].indices.len(), 6);
        assert_eq!(model.textures.len(), 2);
        assert_eq!(
            Path::new(&model.textures[0].path),
            dst.path().join("nested").join("quad-tex").join("tiles.png")
        );

        inspect(&output, &ReadOptions::default()).unwrap();
    }

    #[test]
    fn existing_textures_are_not_overwritten() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("a.png");
        let dest = dir.path().join("out/a.png");
        fs::write(&source, b"new").unwrap();
        fs::create_dir(dir.path().join("out")).unwrap();
        fs::write(&dest, b"old").unwrap();

        assert!(copy_new(&source, &dest).is_err());
        assert_eq!(fs::read(&dest).unwrap(), b"old");
    }
}
