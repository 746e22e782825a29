//! BBS Agent - natural language stories to Minecraft Blockbuster Studio commands
//!
//! story text -> llm (IntentParser) -> storyboard (StoryboardSession)
//! -> render (CommandRenderer) -> export (datapack, mcfunction or RCON)

pub mod agent;
pub mod core;
pub mod export;
pub mod llm;
pub mod render;
pub mod storyboard;
