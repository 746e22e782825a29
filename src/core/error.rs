use thiserror::Error;

use crate::core::types::SceneId;
use crate::storyboard::SessionStatus;

#[derive(Error, Debug)]
pub enum BbsError {
    /// LLM unreachable, timed out, or returned something that is not a plan
    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Unsupported feature in scene {scene_id}: {feature}")]
    UnsupportedFeature { scene_id: SceneId, feature: String },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// `succeeded` commands were applied on the server before `command` was rejected
    #[error("Remote execution failed after {succeeded} command(s) at `{command}`: {reason}")]
    RemoteExecution {
        succeeded: usize,
        command: String,
        reason: String,
    },

    #[error("Cannot {command} while the storyboard is {status}")]
    InvalidTransition {
        command: &'static str,
        status: SessionStatus,
    },

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Serialization error: {0}")]
    SerdeError(#[from] serde_json::Error),
}

impl BbsError {
    /// Whether repeating the same request may succeed without editing the plan
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            BbsError::ParseError(_) | BbsError::IoError(_) | BbsError::RemoteExecution { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, BbsError>;
