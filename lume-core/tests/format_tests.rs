//! Integration tests for the baked model format.

use glam::{Vec2, Vec3, Vec4};
use lume_core::{
    load_baked_model, read_model, save_baked_model, write_model, BakedMaterial, BakedMesh,
    BakedModel, BakedTexture, LumeError, ReadOptions, FILE_MAGIC,
};

fn quad(material: u32, offset: f32) -> BakedMesh {
    BakedMesh {
        material,
        positions: vec![
            Vec3::new(offset, 0.0, 0.0),
            Vec3::new(offset + 1.0, 0.0, 0.0),
            Vec3::new(offset, 1.0, 0.0),
            Vec3::new(offset + 1.0, 1.0, 0.0),
        ],
        normals: vec![Vec3::Z; 4],
        texcoords: vec![
            Vec2::new(0.0, 0.0),
            Vec2::new(1.0, 0.0),
            Vec2::new(0.0, 1.0),
            Vec2::new(1.0, 1.0),
        ],
        tangents: vec![Vec4::new(1.0, 0.0, 0.0, -1.0); 4],
        indices: vec![0, 1, 2, 1, 3, 2],
    }
}

fn fixture() -> BakedModel {
    BakedModel {
        textures: vec![
            BakedTexture {
                path: "sponza-tex/bricks.png".into(),
                channels: 4,
            },
            BakedTexture {
                path: "sponza-tex/bricks_rough.png".into(),
                channels: 1,
            },
            BakedTexture {
                path: "sponza-tex/bricks_normal.png".into(),
                channels: 4,
            },
        ],
        materials: vec![
            BakedMaterial {
                base_color: Some(0),
                roughness: Some(1),
                metalness: Some(1),
                alpha_mask: None,
                normal_map: Some(2),
            },
            BakedMaterial {
                base_color: Some(0),
                roughness: Some(1),
                metalness: Some(1),
                alpha_mask: Some(0),
                normal_map: None,
            },
        ],
        meshes: vec![quad(0, 0.0), quad(1, 2.0), quad(0, -3.5)],
    }
}

#[test]
fn round_trip_preserves_everything() {
    let model = fixture();
    let mut bytes = Vec::new();
    write_model(&mut bytes, &model).unwrap();

    let back = read_model(&bytes, &ReadOptions::default()).unwrap();
    assert_eq!(back, model);
}

#[test]
fn round_trip_empty_model() {
    let mut bytes = Vec::new();
    write_model(&mut bytes, &BakedModel::default()).unwrap();
    assert_eq!(bytes.len(), 32 + 12);

    let back = read_model(&bytes, &ReadOptions::default()).unwrap();
    assert_eq!(back, BakedModel::default());
}

#[test]
fn mutated_magic_is_rejected() {
    let mut bytes = Vec::new();
    write_model(&mut bytes, &fixture()).unwrap();
    let len = bytes.len();
    bytes[3] ^= 0x20;

    let err = read_model(&bytes, &ReadOptions::default()).unwrap_err();
    assert!(matches!(err, LumeError::BadMagic));
    assert_eq!(bytes.len(), len);
}

#[test]
fn mutated_variant_is_rejected() {
    let mut bytes = Vec::new();
    write_model(&mut bytes, &fixture()).unwrap();
    bytes[16..27].copy_from_slice(b"someone-old");

    match read_model(&bytes, &ReadOptions::default()) {
        Err(LumeError::BadVariant { found, expected }) => {
            assert_eq!(found, "someone-old");
            assert_eq!(expected, "scsmbil-tan");
        }
        other => panic!("unexpected result: {other:?}"),
    }
}

#[test]
fn short_header_is_rejected() {
    let err = read_model(&FILE_MAGIC[..10], &ReadOptions::default()).unwrap_err();
    assert!(matches!(err, LumeError::ShortRead { requested: 16, available: 10 }));
}

#[test]
fn oversized_string_is_rejected() {
    let mut bytes = Vec::new();
    write_model(&mut bytes, &fixture()).unwrap();
    // first texture path length lives right after the texture count
    bytes[36..40].copy_from_slice(&(32 * 1024u32).to_le_bytes());

    let err = read_model(&bytes, &ReadOptions::default()).unwrap_err();
    assert!(matches!(err, LumeError::StringTooLong { length: 32768, .. }));
}

#[test]
fn file_round_trip_rebases_texture_paths() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("sponza.comp5822mesh");

    let model = fixture();
    save_baked_model(&model, &path).unwrap();

    let loaded = load_baked_model(&path, &ReadOptions::default()).unwrap();
    assert_eq!(loaded.meshes, model.meshes);
    assert_eq!(loaded.materials, model.materials);
    for (loaded, original) in loaded.textures.iter().zip(&model.textures) {
        assert_eq!(
            std::path::Path::new(&loaded.path),
            dir.path().join(&original.path)
        );
        assert_eq!(loaded.channels, original.channels);
    }
}

#[test]
fn empty_file_is_short_read() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("empty.comp5822mesh");
    std::fs::write(&path, b"").unwrap();

    let err = load_baked_model(&path, &ReadOptions::default()).unwrap_err();
    assert!(matches!(err, LumeError::ShortRead { requested: 16, available: 0 }));
}
