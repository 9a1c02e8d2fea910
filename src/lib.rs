pub mod camera;
pub mod cli;
pub mod frame;
pub mod loaders;
pub mod panel;
pub mod params;
pub mod render;
pub mod scene;
pub mod sketch;
pub mod update;

pub use frame::{FrameClock, FrameContext};
pub use params::MaterialParams;
pub use scene::{Scene, SceneObject};
pub use sketch::Sketch;
