//! Rendered output: commands grouped into per-scene blocks

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::core::types::{SceneId, Tick};

/// One target-system command at a scene-relative tick
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderedCommand {
    pub tick: Tick,
    pub command: String,
    pub description: String,
}

impl RenderedCommand {
    pub fn new(tick: Tick, command: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            tick,
            command: command.into(),
            description: description.into(),
        }
    }
}

/// Contiguous commands of one scene, exported as one function
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SceneBlock {
    pub scene_id: SceneId,
    pub name: String,
    /// Function file name (without namespace or extension), unique per script
    pub function_name: String,
    pub start_tick: Tick,
    pub duration: Tick,
    pub commands: Vec<RenderedCommand>,
}

/// Everything `generate` produces for a session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderedScript {
    pub title: String,
    /// Session version the script was rendered from
    pub session_version: u64,
    pub blocks: Vec<SceneBlock>,
}

impl RenderedScript {
    pub fn total_commands(&self) -> usize {
        self.blocks.iter().map(|b| b.commands.len()).sum()
    }

    /// Tick at which the last block ends
    pub fn total_duration(&self) -> Tick {
        self.blocks
            .iter()
            .map(|b| b.start_tick.saturating_add(b.duration))
            .max()
            .unwrap_or(0)
    }

    /// Every command in rendered order, paired with its absolute tick
    pub fn commands(&self) -> impl Iterator<Item = (Tick, &RenderedCommand)> {
        self.blocks.iter().flat_map(|block| {
            block
                .commands
                .iter()
                .map(move |cmd| (block.start_tick.saturating_add(cmd.tick), cmd))
        })
    }
}

/// Hands out function names that are valid resource paths and never collide
///
/// `main` is reserved for the entry-point function.
#[derive(Debug)]
pub(crate) struct FunctionNames {
    used: HashSet<String>,
}

impl FunctionNames {
    pub(crate) fn new() -> Self {
        let mut used = HashSet::new();
        used.insert("main".to_string());
        Self { used }
    }

    pub(crate) fn claim(&mut self, scene_id: &SceneId) -> String {
        let base = sanitize(scene_id.as_str());
        let mut name = base.clone();
        let mut n = 2;
        while !self.used.insert(name.clone()) {
            name = format!("{}_{}", base, n);
            n += 1;
        }
        name
    }
}

fn sanitize(id: &str) -> String {
    let name: String = id
        .trim()
        .to_lowercase()
        .chars()
        .map(|c| match c {
            'a'..='z' | '0'..='9' | '_' | '-' | '.' => c,
            _ => '_',
        })
        .collect();
    if name.is_empty() {
        "scene".into()
    } else {
        name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize() {
        assert_eq!(sanitize("Scene 1: Dawn"), "scene_1__dawn");
        assert_eq!(sanitize("scene_001"), "scene_001");
        assert_eq!(sanitize("   "), "scene");
    }

    #[test]
    fn test_function_names_never_collide() {
        let mut names = FunctionNames::new();
        assert_eq!(names.claim(&SceneId::from("Scene A")), "scene_a");
        assert_eq!(names.claim(&SceneId::from("scene_a")), "scene_a_2");
        assert_eq!(names.claim(&SceneId::from("main")), "main_2");
    }

    #[test]
    fn test_absolute_ticks() {
        let script = RenderedScript {
            title: "T".into(),
            session_version: 1,
            blocks: vec![SceneBlock {
                scene_id: SceneId::from("b"),
                name: "b".into(),
                function_name: "b".into(),
                start_tick: 100,
                duration: 50,
                commands: vec![RenderedCommand::new(10, "weather rain", "")],
            }],
        };
        let ticks: Vec<Tick> = script.commands().map(|(t, _)| t).collect();
        assert_eq!(ticks, vec![110]);
        assert_eq!(script.total_duration(), 150);
        assert_eq!(script.total_commands(), 1);
    }
}
