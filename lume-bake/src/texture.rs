use std::collections::HashMap;
use std::path::{Path, PathBuf};

use lume_core::{BakedMaterial, BakedTexture, TextureId};

use crate::input::{InputMaterial, TextureSlot};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TextureEntry {
    /// Path as referenced by the input model.
    pub source: String,
    pub channels: u8,
    /// Path relative to the baked asset, `<texture dir>/<file name>`.
    pub baked_path: String,
}

/// Unique textures of a model in first-seen order; an entry's position is its
/// id.
#[derive(Clone, Debug, Default)]
pub struct TextureTable {
    entries: Vec<TextureEntry>,
    ids: HashMap<String, TextureId>,
}

impl TextureTable {
    /// Scans materials in order, slot by slot, assigning ids on first sight.
    /// The channel count comes from the slot a path is first seen in.
    pub fn from_materials(materials: &[InputMaterial]) -> Self {
        let mut table = Self::default();
        for material in materials {
            for slot in TextureSlot::ALL {
                if let Some(path) = material.texture(slot) {
                    table.insert(path, slot.channels());
                }
            }
        }
        table
    }

    fn insert(&mut self, path: &str, channels: u8) -> TextureId {
        if let Some(&id) = self.ids.get(path) {
            return id;
        }
        let id = self.entries.len() as TextureId;
        self.entries.push(TextureEntry {
            source: path.to_owned(),
            channels,
            baked_path: path.to_owned(),
        });
        self.ids.insert(path.to_owned(), id);
        id
    }

    /// Points every entry at `texture_dir/<file name of source>`. Distinct
    /// sources with the same file name end up at the same destination.
    pub fn relocate(&mut self, texture_dir: &Path) {
        for entry in &mut self.entries {
            let source = Path::new(&entry.source);
            let name = source.file_name().map(Path::new).unwrap_or(source);
            entry.baked_path = texture_dir.join(name).to_string_lossy().into_owned();
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[TextureEntry] {
        &self.entries
    }

    pub fn id(&self, path: &str) -> Option<TextureId> {
        self.ids.get(path).copied()
    }

    pub fn material(&self, material: &InputMaterial) -> BakedMaterial {
        let mut slots = [None; 5];
        for (out, slot) in slots.iter_mut().zip(TextureSlot::ALL) {
            *out = material.texture(slot).and_then(|path| self.id(path));
        }
        BakedMaterial::from_slots(slots)
    }

    pub fn baked_textures(&self) -> Vec<BakedTexture> {
        self.entries
            .iter()
            .map(|e| BakedTexture {
                path: e.baked_path.clone(),
                channels: e.channels,
            })
            .collect()
    }

    /// `(source, destination)` pairs for copying next to an asset in `root`.
    pub fn copy_plan(&self, root: &Path) -> Vec<(PathBuf, PathBuf)> {
        self.entries
            .iter()
            .map(|e| (PathBuf::from(&e.source), root.join(&e.baked_path)))
            .collect()
    }
}
