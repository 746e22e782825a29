//! Fakes shared by the integration tests

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::Mutex;

use bbs_agent::core::config::AgentConfig;
use bbs_agent::core::error::{BbsError, Result};
use bbs_agent::core::types::Position;
use bbs_agent::export::CommandSink;
use bbs_agent::llm::IntentParser;
use bbs_agent::storyboard::{
    ActorRef, CameraMovement, CameraSpec, PlanUpdate, Scene, ScenePlan, StoryboardSession,
};

/// Parser that replays queued answers and records what it was asked
#[derive(Default)]
pub struct ScriptedParser {
    answers: Mutex<VecDeque<Result<PlanUpdate>>>,
    pub calls: Mutex<Vec<(String, bool)>>,
}

impl ScriptedParser {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn answer(self, update: PlanUpdate) -> Self {
        self.answers.lock().unwrap().push_back(Ok(update));
        self
    }

    pub fn fail(self, message: &str) -> Self {
        self.answers
            .lock()
            .unwrap()
            .push_back(Err(BbsError::ParseError(message.into())));
        self
    }
}

impl IntentParser for ScriptedParser {
    async fn parse(&self, text: &str, existing: Option<&StoryboardSession>) -> Result<PlanUpdate> {
        self.calls
            .lock()
            .unwrap()
            .push((text.to_string(), existing.is_some()));
        self.answers
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(BbsError::ParseError("no scripted answer left".into())))
    }
}

/// Sink that keeps every command and rejects those containing `reject`
#[derive(Default)]
pub struct MemorySink {
    pub sent: Vec<String>,
    pub reject: Option<String>,
    /// Fail every command as if the server were down
    pub offline: bool,
}

impl MemorySink {
    pub fn rejecting(pattern: &str) -> Self {
        Self {
            reject: Some(pattern.to_string()),
            ..Self::default()
        }
    }

    pub fn offline() -> Self {
        Self {
            offline: true,
            ..Self::default()
        }
    }
}

impl CommandSink for MemorySink {
    async fn execute(&mut self, command: &str) -> Result<String> {
        if self.offline {
            return Err(std::io::Error::new(
                std::io::ErrorKind::ConnectionRefused,
                "connection refused",
            )
            .into());
        }
        self.sent.push(command.to_string());
        match &self.reject {
            Some(pattern) if command.contains(pattern.as_str()) => {
                Ok(format!("Unknown or incomplete command, see below for error\n{}<--[HERE]", command))
            }
            _ => Ok(String::new()),
        }
    }
}

pub fn static_camera(x: f64) -> CameraSpec {
    CameraSpec::new().with(CameraMovement::Static {
        tick_start: 0,
        tick_end: 0,
        position: Position::new(x, 70.0, 0.0),
        facing: None,
        look_at: None,
    })
}

/// A scene with one spawned actor and a static camera
pub fn simple_scene(id: &str, start: u64, duration: u64) -> Scene {
    let mut scene = Scene::new(id, start, duration);
    scene.name = format!("Scene {}", id);
    scene
        .actors
        .push(ActorRef::new(format!("{}_actor", id), "cow").at(Position::new(0.0, 64.0, 0.0)));
    scene.camera = static_camera(10.0);
    scene
}

pub fn two_scene_plan() -> PlanUpdate {
    PlanUpdate::Full(
        ScenePlan::new(vec![simple_scene("opening", 0, 100), simple_scene("finale", 100, 100)])
            .titled("Two Scenes"),
    )
}

pub fn config_with_output(dir: &std::path::Path) -> AgentConfig {
    let mut config = AgentConfig::default();
    config.export.output_dir = dir.to_path_buf();
    config
}
