//! Command rendering
//!
//! Maps a storyboard to Minecraft commands grouped by scene. Pure and
//! deterministic; exporters only serialize what comes out of here.

pub mod actor;
pub mod camera;
pub mod renderer;
pub mod script;
pub mod world;

pub use actor::ActorRegistry;
pub use renderer::CommandRenderer;
pub use script::{RenderedCommand, RenderedScript, SceneBlock};
