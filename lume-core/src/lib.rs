pub mod asset;
pub mod error;
pub mod format;
pub mod model;

pub use asset::{load_baked_model, save_baked_model};
pub use error::{LumeError, LumeResult};
pub use format::{read_model, write_model, ReadOptions, FILE_MAGIC, FILE_VARIANT, MAX_STRING_LEN};
pub use model::{BakedMaterial, BakedMesh, BakedModel, BakedTexture, TextureId, NO_TEXTURE};
