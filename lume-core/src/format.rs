//! Binary layout of a baked model (all values little-endian, no padding):
//!
//! ```text
//! [u8; 16]  file magic
//! [u8; 16]  file variant, NUL padded
//! u32       U = number of unique textures
//!   U x     string path, u8 channel count
//! u32       M = number of materials
//!   M x     u32 base color, roughness, metalness, alpha mask, normal map texture ids
//!           (0xffffffff when the slot is empty)
//! u32       N = number of meshes
//!   N x     u32 material index, u32 V, u32 I,
//!           V x vec3 position, V x vec3 normal, V x vec2 texcoord, V x vec4 tangent,
//!           I x u32 index
//! ```
//!
//! Strings are a `u32` length that counts the terminating NUL, followed by that
//! many bytes.

use std::io::{ErrorKind, Write};

use glam::{Vec2, Vec3, Vec4};

use crate::error::{LumeError, LumeResult};
use crate::model::{BakedMaterial, BakedMesh, BakedModel, BakedTexture, NO_TEXTURE};

pub const FILE_MAGIC: [u8; 16] = *b"\0\0COMP5822Mmesh\0";
pub const FILE_VARIANT: [u8; 16] = *b"scsmbil-tan\0\0\0\0\0";

/// Strings at or above this length (in bytes, NUL included) are rejected.
pub const MAX_STRING_LEN: u32 = 32 * 1024;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct ReadOptions {
    pub max_string_len: u32,
}

impl Default for ReadOptions {
    fn default() -> Self {
        Self {
            max_string_len: MAX_STRING_LEN,
        }
    }
}

struct CheckedWriter<'w, W: Write> {
    inner: &'w mut W,
    scratch: Vec<u8>,
}

impl<'w, W: Write> CheckedWriter<'w, W> {
    fn new(inner: &'w mut W) -> Self {
        Self {
            inner,
            scratch: Vec::new(),
        }
    }

    fn put(&mut self, bytes: &[u8]) -> LumeResult<()> {
        put_all(self.inner, bytes)
    }

    fn put_u8(&mut self, value: u8) -> LumeResult<()> {
        self.put(&[value])
    }

    fn put_u32(&mut self, value: u32) -> LumeResult<()> {
        self.put(&value.to_le_bytes())
    }

    fn put_u32s(&mut self, values: &[u32]) -> LumeResult<()> {
        self.scratch.clear();
        self.scratch.reserve(values.len() * 4);
        for v in values {
            self.scratch.extend_from_slice(&v.to_le_bytes());
        }
        put_all(self.inner, &self.scratch)
    }

    fn put_f32s(&mut self, values: &[f32]) -> LumeResult<()> {
        self.scratch.clear();
        self.scratch.reserve(values.len() * 4);
        for v in values {
            self.scratch.extend_from_slice(&v.to_le_bytes());
        }
        put_all(self.inner, &self.scratch)
    }

    fn put_string(&mut self, text: &str) -> LumeResult<()> {
        let length = text.len() + 1;
        if length >= MAX_STRING_LEN as usize {
            return Err(LumeError::StringTooLong {
                length: u32::try_from(length).unwrap_or(u32::MAX),
                max: MAX_STRING_LEN,
            });
        }
        self.put_u32(length as u32)?;
        self.put(text.as_bytes())?;
        self.put_u8(0)
    }
}

/// Writes every byte or fails; a writer that stops accepting data is reported
/// as a short write instead of being silently truncated.
fn put_all<W: Write>(out: &mut W, bytes: &[u8]) -> LumeResult<()> {
    let mut written = 0;
    while written < bytes.len() {
        match out.write(&bytes[written..]) {
            Ok(0) => {
                return Err(LumeError::ShortWrite {
                    requested: bytes.len(),
                    written,
                });
            }
            Ok(n) => written += n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(e.into()),
        }
    }
    Ok(())
}

fn count_u32(what: &str, count: usize) -> LumeResult<u32> {
    u32::try_from(count).map_err(|_| LumeError::InvalidInput(format!("too many {what}: {count}")))
}

fn check_texture_ref(slot: Option<u32>, texture_count: usize) -> LumeResult<u32> {
    match slot {
        None => Ok(NO_TEXTURE),
        Some(id) if (id as usize) < texture_count && id != NO_TEXTURE => Ok(id),
        Some(id) => Err(LumeError::InvalidReference {
            what: "texture",
            index: id as u64,
            count: texture_count as u64,
        }),
    }
}

fn check_mesh(mesh: &BakedMesh, material_count: usize) -> LumeResult<()> {
    if mesh.material as usize >= material_count {
        return Err(LumeError::InvalidReference {
            what: "material",
            index: mesh.material as u64,
            count: material_count as u64,
        });
    }
    let v = mesh.positions.len();
    if mesh.normals.len() != v || mesh.texcoords.len() != v || mesh.tangents.len() != v {
        return Err(LumeError::InvalidInput(format!(
            "mesh attribute arrays disagree: {} positions, {} normals, {} texcoords, {} tangents",
            v,
            mesh.normals.len(),
            mesh.texcoords.len(),
            mesh.tangents.len()
        )));
    }
    if let Some(&bad) = mesh.indices.iter().find(|&&i| i as usize >= v) {
        return Err(LumeError::InvalidReference {
            what: "vertex",
            index: bad as u64,
            count: v as u64,
        });
    }
    Ok(())
}

/// Serializes `model` into `out`. Textures are written in id order, so the
/// position of a texture in `model.textures` is its id.
pub fn write_model<W: Write>(out: &mut W, model: &BakedModel) -> LumeResult<()> {
    for material in &model.materials {
        for slot in material.slots() {
            check_texture_ref(slot, model.textures.len())?;
        }
    }
    for mesh in &model.meshes {
        check_mesh(mesh, model.materials.len())?;
    }

    let mut w = CheckedWriter::new(out);

    w.put(&FILE_MAGIC)?;
    w.put(&FILE_VARIANT)?;

    w.put_u32(count_u32("textures", model.textures.len())?)?;
    for texture in &model.textures {
        w.put_string(&texture.path)?;
        w.put_u8(texture.channels)?;
    }

    w.put_u32(count_u32("materials", model.materials.len())?)?;
    for material in &model.materials {
        for slot in material.slots() {
            let id = check_texture_ref(slot, model.textures.len())?;
            w.put_u32(id)?;
        }
    }

    w.put_u32(count_u32("meshes", model.meshes.len())?)?;
    for mesh in &model.meshes {
        w.put_u32(mesh.material)?;
        w.put_u32(count_u32("vertices", mesh.positions.len())?)?;
        w.put_u32(count_u32("indices", mesh.indices.len())?)?;

        w.put_f32s(bytemuck::cast_slice::<Vec3, f32>(&mesh.positions))?;
        w.put_f32s(bytemuck::cast_slice::<Vec3, f32>(&mesh.normals))?;
        w.put_f32s(bytemuck::cast_slice::<Vec2, f32>(&mesh.texcoords))?;
        w.put_f32s(bytemuck::cast_slice::<Vec4, f32>(&mesh.tangents))?;
        w.put_u32s(&mesh.indices)?;
    }

    Ok(())
}

struct ByteReader<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> ByteReader<'a> {
    fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, pos: 0 }
    }

    fn remaining(&self) -> usize {
        self.bytes.len() - self.pos
    }

    fn take(&mut self, count: usize) -> LumeResult<&'a [u8]> {
        if count > self.remaining() {
            return Err(LumeError::ShortRead {
                requested: count,
                available: self.remaining(),
            });
        }
        let out = &self.bytes[self.pos..self.pos + count];
        self.pos += count;
        Ok(out)
    }

    fn u8(&mut self) -> LumeResult<u8> {
        Ok(self.take(1)?[0])
    }

    fn u32(&mut self) -> LumeResult<u32> {
        let b = self.take(4)?;
        Ok(u32::from_le_bytes([b[0], b[1], b[2], b[3]]))
    }

    fn u32s(&mut self, count: usize) -> LumeResult<Vec<u32>> {
        let bytes = self.take(byte_len(count, 4)?)?;
        Ok(bytes
            .chunks_exact(4)
            .map(|b| u32::from_le_bytes([b[0], b[1], b[2], b[3]]))
            .collect())
    }

    fn f32s(&mut self, count: usize) -> LumeResult<Vec<f32>> {
        let bytes = self.take(byte_len(count, 4)?)?;
        Ok(bytes
            .chunks_exact(4)
            .map(|b| f32::from_le_bytes([b[0], b[1], b[2], b[3]]))
            .collect())
    }

    fn string(&mut self, max: u32) -> LumeResult<String> {
        let length = self.u32()?;
        if length >= max {
            return Err(LumeError::StringTooLong { length, max });
        }
        let bytes = self.take(length as usize)?;
        let text = match bytes.iter().position(|&b| b == 0) {
            Some(end) => &bytes[..end],
            None => bytes,
        };
        std::str::from_utf8(text)
            .map(str::to_owned)
            .map_err(|_| LumeError::InvalidUtf8)
    }
}

fn byte_len(count: usize, size: usize) -> LumeResult<usize> {
    count.checked_mul(size).ok_or(LumeError::ShortRead {
        requested: usize::MAX,
        available: 0,
    })
}

fn texture_slot(id: u32, texture_count: usize) -> LumeResult<Option<u32>> {
    if id == NO_TEXTURE {
        Ok(None)
    } else if (id as usize) < texture_count {
        Ok(Some(id))
    } else {
        Err(LumeError::InvalidReference {
            what: "texture",
            index: id as u64,
            count: texture_count as u64,
        })
    }
}

fn describe_tag(tag: &[u8]) -> String {
    let end = tag.iter().position(|&b| b == 0).unwrap_or(tag.len());
    String::from_utf8_lossy(&tag[..end]).into_owned()
}

/// Parses a baked model. Magic and variant are checked before anything else
/// is trusted. Trailing bytes are reported but tolerated.
pub fn read_model(bytes: &[u8], options: &ReadOptions) -> LumeResult<BakedModel> {
    let mut r = ByteReader::new(bytes);

    let magic = r.take(16)?;
    if magic != FILE_MAGIC {
        return Err(LumeError::BadMagic);
    }
    let variant = r.take(16)?;
    if variant != FILE_VARIANT {
        return Err(LumeError::BadVariant {
            found: describe_tag(variant),
            expected: describe_tag(&FILE_VARIANT),
        });
    }

    let mut model = BakedModel::default();

    let texture_count = r.u32()?;
    for _ in 0..texture_count {
        let path = r.string(options.max_string_len)?;
        let channels = r.u8()?;
        model.textures.push(BakedTexture { path, channels });
    }

    let material_count = r.u32()?;
    for _ in 0..material_count {
        let mut slots = [None; 5];
        for slot in &mut slots {
            *slot = texture_slot(r.u32()?, model.textures.len())?;
        }
        model.materials.push(BakedMaterial::from_slots(slots));
    }

    let mesh_count = r.u32()?;
    for _ in 0..mesh_count {
        let material = r.u32()?;
        if material as usize >= model.materials.len() {
            return Err(LumeError::InvalidReference {
                what: "material",
                index: material as u64,
                count: model.materials.len() as u64,
            });
        }

        let v = r.u32()? as usize;
        let i = r.u32()? as usize;

        let positions = r.f32s(v * 3)?.chunks_exact(3).map(Vec3::from_slice).collect();
        let normals = r.f32s(v * 3)?.chunks_exact(3).map(Vec3::from_slice).collect();
        let texcoords = r.f32s(v * 2)?.chunks_exact(2).map(Vec2::from_slice).collect();
        let tangents = r.f32s(v * 4)?.chunks_exact(4).map(Vec4::from_slice).collect();
        let indices = r.u32s(i)?;

        if let Some(&bad) = indices.iter().find(|&&idx| idx as usize >= v) {
            return Err(LumeError::InvalidReference {
                what: "vertex",
                index: bad as u64,
                count: v as u64,
            });
        }

        model.meshes.push(BakedMesh {
            material,
            positions,
            normals,
            texcoords,
            tangents,
            indices,
        });
    }

    if r.remaining() != 0 {
        log::warn!("Baked model contains {} trailing bytes", r.remaining());
    }

    Ok(model)
}
