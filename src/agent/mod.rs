//! Session orchestration and the user command surface
//!
//! The agent owns the storyboard session and drives
//! text -> IntentParser -> StoryboardSession -> CommandRenderer -> Exporter.

pub mod command;
pub mod ingame;
pub mod orchestrator;
pub mod recording;
pub mod summary;

pub use command::AgentCommand;
pub use orchestrator::{Agent, Reply};
pub use recording::RecordingPlan;
