//! Agent configuration with documented defaults
//!
//! Values come from three layers, later ones winning:
//! built-in defaults, an optional TOML file, then environment variables.
//! Every layer is checked by [`AgentConfig::validate`] before use.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::core::error::{BbsError, Result};
use crate::export::ExportTarget;

/// Config file picked up from the working directory when no path is given
pub const DEFAULT_CONFIG_FILE: &str = "bbs_agent.toml";

/// Top-level configuration for the agent
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentConfig {
    pub llm: LlmConfig,
    pub rcon: RconConfig,
    pub export: ExportConfig,
    pub render: RenderConfig,
    pub recording: RecordingConfig,
}

/// LLM endpoint used by the intent parser
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// API key; usually supplied through `LLM_API_KEY` rather than the file
    pub api_key: Option<String>,
    /// Anthropic messages endpoint or any OpenAI-compatible chat endpoint
    pub api_url: String,
    pub model: String,
    /// Upper bound for one parse request, in seconds
    pub timeout_secs: u64,
    pub max_tokens: u32,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            api_url: "https://api.openai.com/v1/chat/completions".into(),
            model: "gpt-4o".into(),
            timeout_secs: 60,
            max_tokens: 4096,
        }
    }
}

/// Remote command execution over RCON
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RconConfig {
    pub host: String,
    pub port: u16,
    pub password: String,
    /// Upper bound for connecting and for each command round trip, in seconds
    pub timeout_secs: u64,
    /// Wait between commands so they land on their scheduled ticks
    pub realtime: bool,
    /// Wall-clock length of one tick when `realtime` is set (50ms = 20 TPS)
    pub tick_millis: u64,
}

impl Default for RconConfig {
    fn default() -> Self {
        Self {
            host: "localhost".into(),
            port: 25575,
            password: String::new(),
            timeout_secs: 5,
            realtime: false,
            tick_millis: 50,
        }
    }
}

/// File export layout
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    pub output_dir: PathBuf,
    /// Datapack namespace; functions are called as `<namespace>:<name>`
    pub namespace: String,
    /// `pack_format` written to pack.mcmeta (15 = Minecraft 1.20.1)
    pub pack_format: u32,
    pub description: String,
    pub default_target: ExportTarget,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("output"),
            namespace: "bbs_agent".into(),
            pack_format: 15,
            description: "BBS AI Agent Generated Animation".into(),
            default_target: ExportTarget::Datapack,
        }
    }
}

/// Knobs for camera keyframe generation
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Ticks between interpolated camera keyframes
    pub keyframe_spacing: u64,
    /// Cap on interpolated keyframes per movement
    pub max_keyframes: u64,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            keyframe_spacing: 5,
            max_keyframes: 20,
        }
    }
}

/// Settings echoed into recording plans (no recorder is launched)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RecordingConfig {
    pub output_dir: PathBuf,
    pub width: u32,
    pub height: u32,
    pub fps: u32,
}

impl Default for RecordingConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("output/videos"),
            width: 1920,
            height: 1080,
            fps: 60,
        }
    }
}

impl AgentConfig {
    /// Load configuration from `path`, or from [`DEFAULT_CONFIG_FILE`] if it exists,
    /// then apply environment overrides and validate.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None if Path::new(DEFAULT_CONFIG_FILE).exists() => {
                Self::from_file(Path::new(DEFAULT_CONFIG_FILE))?
            }
            None => Self::default(),
        };
        config.apply_env(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        tracing::debug!(path = %path.display(), "loading config file");
        Self::parse_toml(&content)
    }

    pub fn parse_toml(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| BbsError::ConfigError(e.to_string()))
    }

    /// Override fields from environment-style variables
    ///
    /// Recognised: LLM_API_KEY, LLM_API_URL, LLM_MODEL, RCON_HOST, RCON_PORT,
    /// RCON_PASSWORD, BBS_OUTPUT_DIR.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(key) = lookup("LLM_API_KEY") {
            self.llm.api_key = Some(key);
        }
        if let Some(url) = lookup("LLM_API_URL") {
            self.llm.api_url = url;
        }
        if let Some(model) = lookup("LLM_MODEL") {
            self.llm.model = model;
        }
        if let Some(host) = lookup("RCON_HOST") {
            self.rcon.host = host;
        }
        if let Some(port) = lookup("RCON_PORT") {
            self.rcon.port = port
                .parse()
                .map_err(|_| BbsError::ConfigError(format!("RCON_PORT is not a port: {}", port)))?;
        }
        if let Some(password) = lookup("RCON_PASSWORD") {
            self.rcon.password = password;
        }
        if let Some(dir) = lookup("BBS_OUTPUT_DIR") {
            self.export.output_dir = PathBuf::from(dir);
        }
        Ok(())
    }

    /// Validate configuration for internal consistency
    pub fn validate(&self) -> Result<()> {
        if !is_resource_name(&self.export.namespace) {
            return Err(BbsError::ConfigError(format!(
                "namespace `{}` must be non-empty and use only a-z, 0-9, _, - and .",
                self.export.namespace
            )));
        }
        if self.rcon.port == 0 {
            return Err(BbsError::ConfigError("rcon.port must be non-zero".into()));
        }
        if self.llm.timeout_secs == 0 || self.rcon.timeout_secs == 0 {
            return Err(BbsError::ConfigError("timeouts must be positive".into()));
        }
        if self.rcon.tick_millis == 0 {
            return Err(BbsError::ConfigError("rcon.tick_millis must be positive".into()));
        }
        if self.render.keyframe_spacing == 0 || self.render.max_keyframes == 0 {
            return Err(BbsError::ConfigError(
                "render.keyframe_spacing and render.max_keyframes must be positive".into(),
            ));
        }
        Ok(())
    }
}

/// Namespace rule for Minecraft resource locations
fn is_resource_name(name: &str) -> bool {
    !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || matches!(c, '_' | '-' | '.'))
}
