pub mod gltf;
pub mod hdr;
pub mod pipeline;
pub mod svg;
pub mod texture;
