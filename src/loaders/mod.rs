pub mod gltf;

pub use self::gltf::{load_flower_model, load_flower_model_slice, GltfModelSource};
