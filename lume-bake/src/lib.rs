pub mod bake;
pub mod collapse;
pub mod config;
pub mod discretize;
pub mod index;
pub mod input;
pub mod tangent;
pub mod texture;
pub mod vicinity;

pub use bake::{bake_model, index_meshes, BakeOutput, BakeReport};
pub use config::BakeConfig;
pub use index::{ensure_normals, make_indexed_mesh, IndexedMesh};
pub use input::{InputMaterial, InputMesh, InputModel, TextureSlot, TriangleSoup};
pub use texture::{TextureEntry, TextureTable};
