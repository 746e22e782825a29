//! Session orchestration
//!
//! Holds the storyboard for one user and dispatches commands to the parser,
//! renderer and exporter. State machine:
//!
//! ```text
//! EMPTY --story--> DRAFT --generate--> GENERATED --export--> EXPORTED
//! refine: DRAFT | GENERATED | EXPORTED -> DRAFT
//! reset:  any -> EMPTY
//! ```
//!
//! A failed operation leaves status, plan and rendered script untouched.

use std::fs;
use std::path::{Path, PathBuf};

use crate::agent::command::{AgentCommand, HELP};
use crate::agent::recording::RecordingPlan;
use crate::agent::summary::summarize;
use crate::core::config::{AgentConfig, RecordingConfig};
use crate::core::error::{BbsError, Result};
use crate::core::types::ticks_to_seconds;
use crate::export::{is_rejection, CommandSink, ExportReport, ExportTarget, Exporter};
use crate::llm::IntentParser;
use crate::render::{CommandRenderer, RenderedScript};
use crate::storyboard::{PlanUpdate, SessionStatus, StoryboardSession};

/// What the caller should do after a command
#[derive(Debug, Clone, PartialEq)]
pub enum Reply {
    /// Show this text and keep going
    Text(String),
    Quit,
}

/// One user session wired to its collaborators
pub struct Agent<P, S> {
    parser: P,
    sink: S,
    renderer: CommandRenderer,
    exporter: Exporter,
    recording: RecordingConfig,
    default_target: ExportTarget,
    /// `host:port` of the RCON server, for status reports
    server: String,
    session: StoryboardSession,
    script: Option<RenderedScript>,
}

impl<P: IntentParser, S: CommandSink> Agent<P, S> {
    pub fn new(parser: P, sink: S, config: &AgentConfig) -> Self {
        Self {
            parser,
            sink,
            renderer: CommandRenderer::new(config.render.clone()),
            exporter: Exporter::new(config.export.clone()).with_rcon(&config.rcon),
            recording: config.recording.clone(),
            default_target: config.export.default_target,
            server: format!("{}:{}", config.rcon.host, config.rcon.port),
            session: StoryboardSession::new(),
            script: None,
        }
    }

    pub fn session(&self) -> &StoryboardSession {
        &self.session
    }

    pub fn status(&self) -> SessionStatus {
        self.session.status()
    }

    /// Commands from the last successful `generate`, dropped by any plan edit
    pub fn script(&self) -> Option<&RenderedScript> {
        self.script.as_ref()
    }

    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    fn require(&self, command: &'static str, allowed: &[SessionStatus]) -> Result<()> {
        let status = self.session.status();
        if allowed.contains(&status) {
            Ok(())
        } else {
            Err(BbsError::InvalidTransition { command, status })
        }
    }

    fn transition(&mut self, status: SessionStatus, what: &str) {
        let from = self.session.status();
        self.session.set_status(status);
        tracing::info!(
            session = %self.session.id(),
            version = self.session.version(),
            %from,
            to = %status,
            "{}",
            what
        );
    }

    /// Parse a new story, replacing whatever storyboard exists
    pub async fn story(&mut self, text: &str) -> Result<&StoryboardSession> {
        let update = self.parser.parse(text, None).await?;
        let mut plan = match update {
            PlanUpdate::Full(plan) => plan,
            PlanUpdate::Delta(_) => {
                return Err(BbsError::ParseError(
                    "expected a full storyboard for a new story".into(),
                ))
            }
        };
        // a new story must not inherit the previous title
        plan.title.get_or_insert_with(|| "Untitled".to_string());
        self.session.apply_full(plan)?;
        self.script = None;
        self.transition(SessionStatus::Draft, "story parsed");
        Ok(&self.session)
    }

    /// Apply a refinement to the existing storyboard
    pub async fn refine(&mut self, text: &str) -> Result<&StoryboardSession> {
        self.require(
            "refine",
            &[
                SessionStatus::Draft,
                SessionStatus::Generated,
                SessionStatus::Exported,
            ],
        )?;
        let update = self.parser.parse(text, Some(&self.session)).await?;
        match update {
            PlanUpdate::Full(plan) => self.session.apply_full(plan)?,
            PlanUpdate::Delta(delta) => self.session.apply_delta(delta)?,
        }
        self.script = None;
        self.transition(SessionStatus::Draft, "storyboard refined");
        Ok(&self.session)
    }

    /// Render the storyboard into commands
    pub fn generate(&mut self) -> Result<&RenderedScript> {
        self.require(
            "generate",
            &[
                SessionStatus::Draft,
                SessionStatus::Generated,
                SessionStatus::Exported,
            ],
        )?;
        let script = self.renderer.render(&self.session)?;
        tracing::info!(
            blocks = script.blocks.len(),
            commands = script.total_commands(),
            "generated commands"
        );
        self.transition(SessionStatus::Generated, "commands generated");
        Ok(self.script.insert(script))
    }

    /// Export the rendered commands; `None` uses the configured default target
    pub async fn export(&mut self, target: Option<ExportTarget>) -> Result<ExportReport> {
        self.require(
            "export",
            &[SessionStatus::Generated, SessionStatus::Exported],
        )?;
        let target = target.unwrap_or(self.default_target);
        let script = self.script.as_ref().ok_or(BbsError::InvalidTransition {
            command: "export",
            status: self.session.status(),
        })?;
        let report = self.exporter.export(script, target, &mut self.sink).await?;
        self.transition(SessionStatus::Exported, "commands exported");
        Ok(report)
    }

    /// Recording plan for the rendered commands; does not change state
    pub fn record(&self) -> Result<RecordingPlan> {
        self.require(
            "record",
            &[SessionStatus::Generated, SessionStatus::Exported],
        )?;
        let script = self.script.as_ref().ok_or(BbsError::InvalidTransition {
            command: "record",
            status: self.session.status(),
        })?;
        Ok(RecordingPlan::from_script(
            script,
            &self.recording,
            &self.exporter.config().namespace,
        ))
    }

    pub fn summary(&self) -> String {
        summarize(&self.session)
    }

    /// Probe the server and describe the configured paths
    ///
    /// Never fails: an unreachable server is part of the report.
    pub async fn system_status(&mut self) -> String {
        let server = match self.sink.check().await {
            Ok(reply) if is_rejection(&reply) => format!("rejected ({})", reply.trim()),
            Ok(_) => "reachable".to_string(),
            Err(e) => format!("unreachable ({})", e),
        };
        let reachable = server == "reachable";
        tracing::info!(server = %self.server, reachable, "checked system status");

        let describe = |path: &Path| {
            let state = if path.is_dir() { "exists" } else { "will be created" };
            format!("{} ({})", path.display(), state)
        };
        let mut s = String::from("System status\n");
        s.push_str(&format!("  RCON server {}: {}\n", self.server, server));
        s.push_str(&format!(
            "  Output dir: {}\n",
            describe(&self.exporter.config().output_dir)
        ));
        s.push_str(&format!(
            "  Recording dir: {}\n",
            describe(&self.recording.output_dir)
        ));
        s.push_str(&format!(
            "  Storyboard: {} (version {})",
            self.session.status(),
            self.session.version()
        ));
        if !reachable {
            s.push_str(
                "\nRemote export is unavailable; datapack and mcfunction export still work.",
            );
        }
        s
    }

    pub fn reset(&mut self) {
        self.session.reset();
        self.script = None;
        tracing::info!(session = %self.session.id(), "session reset");
    }

    /// Write the storyboard as JSON
    pub fn save(&self, path: &Path) -> Result<PathBuf> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, serde_json::to_string_pretty(&self.session)?)?;
        tracing::info!(
            path = %path.display(),
            version = self.session.version(),
            "saved storyboard"
        );
        Ok(path.to_path_buf())
    }

    /// Replace the session with a saved one
    ///
    /// Rendered output is never saved, so a loaded storyboard is a DRAFT
    /// (or EMPTY if it has no scenes).
    pub fn load(&mut self, path: &Path) -> Result<&StoryboardSession> {
        let content = fs::read_to_string(path)?;
        let mut session: StoryboardSession = serde_json::from_str(&content)?;
        if session.is_empty() {
            session.set_status(SessionStatus::Empty);
        } else {
            session.to_plan().validate()?;
            session.set_status(SessionStatus::Draft);
        }
        self.session = session;
        self.script = None;
        tracing::info!(
            session = %self.session.id(),
            version = self.session.version(),
            path = %path.display(),
            "loaded storyboard"
        );
        Ok(&self.session)
    }

    /// Run one user command and describe the outcome
    pub async fn handle(&mut self, command: AgentCommand) -> Result<Reply> {
        let text = match command {
            AgentCommand::Quit => return Ok(Reply::Quit),
            AgentCommand::Help => HELP.to_string(),
            AgentCommand::Summary => self.summary(),
            AgentCommand::Story(text) => {
                self.story(&text).await?;
                format!(
                    "{}\nType `generate` to render commands or `refine <text>` to change it.",
                    self.summary()
                )
            }
            AgentCommand::Refine(text) => {
                self.refine(&text).await?;
                self.summary()
            }
            AgentCommand::Generate => {
                let script = self.generate()?;
                format!(
                    "Generated {} commands in {} scene(s), {:.1} seconds.",
                    script.total_commands(),
                    script.blocks.len(),
                    ticks_to_seconds(script.total_duration())
                )
            }
            AgentCommand::Export(target) => {
                let report = self.export(target).await?;
                if report.files.is_empty() {
                    format!(
                        "Sent {} commands to the server ({}).",
                        report.commands_sent, report.target
                    )
                } else {
                    let mut s = format!(
                        "Exported {} file(s) ({}):",
                        report.files.len(),
                        report.target
                    );
                    for file in &report.files {
                        s.push_str(&format!("\n  {}", file.display()));
                    }
                    s
                }
            }
            AgentCommand::Record => self.record()?.instructions(),
            AgentCommand::Status => self.system_status().await,
            AgentCommand::Reset => {
                self.reset();
                "Storyboard cleared.".to_string()
            }
            AgentCommand::Save(path) => {
                let path = self.save(&path)?;
                format!("Saved to {}", path.display())
            }
            AgentCommand::Load(path) => {
                self.load(&path)?;
                format!("Loaded {}\n{}", path.display(), self.summary())
            }
        };
        Ok(Reply::Text(text))
    }
}
