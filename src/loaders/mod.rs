pub mod gltf;
pub mod skybox;

pub use gltf::load_mesh_objects;
pub use skybox::{load_skybox, Skybox};
