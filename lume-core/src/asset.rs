use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use memmap2::Mmap;

use crate::error::LumeResult;
use crate::format::{self, ReadOptions};
use crate::model::BakedModel;

/// Writes `model` to `path` in one pass. A failed bake may leave a partial
/// file behind; callers must not treat it as valid.
pub fn save_baked_model<P: AsRef<Path>>(model: &BakedModel, path: P) -> LumeResult<()> {
    let file = File::create(path.as_ref())?;
    let mut writer = BufWriter::with_capacity(1024 * 1024, file);
    format::write_model(&mut writer, model)?;
    writer.flush()?;
    Ok(())
}

/// Maps the file at `path` and parses it. Texture paths are stored relative to
/// the asset, so they are rebased onto the asset's directory.
pub fn load_baked_model<P: AsRef<Path>>(path: P, options: &ReadOptions) -> LumeResult<BakedModel> {
    let path = path.as_ref();
    let file = File::open(path)?;

    let mut model = if file.metadata()?.len() == 0 {
        format::read_model(&[], options)?
    } else {
        // SAFETY: the mapping is read-only and dropped before returning; the
        // parsed model owns copies of everything it keeps.
        let mmap = unsafe { Mmap::map(&file)? };
        format::read_model(&mmap, options)?
    };

    if let Some(dir) = path.parent() {
        for texture in &mut model.textures {
            texture.path = dir.join(&texture.path).to_string_lossy().into_owned();
        }
    }

    log::debug!(
        "Loaded {:?}: {} textures, {} materials, {} meshes",
        path,
        model.textures.len(),
        model.materials.len(),
        model.meshes.len()
    );

    Ok(model)
}
