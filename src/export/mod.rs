//! Exporting rendered scripts
//!
//! File targets write a datapack or a flat mcfunction directory. The remote
//! target streams commands to a live server through a [`CommandSink`].

pub mod files;
pub mod rcon;
pub mod remote;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::core::config::{ExportConfig, RconConfig};
use crate::core::error::{BbsError, Result};
use crate::render::RenderedScript;

pub use rcon::{RconClient, RconSink};
pub use remote::{is_rejection, send_script, CommandSink};

/// Where an export goes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportTarget {
    #[default]
    Datapack,
    Mcfunction,
    Remote,
}

impl ExportTarget {
    pub fn is_file(&self) -> bool {
        !matches!(self, ExportTarget::Remote)
    }
}

impl fmt::Display for ExportTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ExportTarget::Datapack => "datapack",
            ExportTarget::Mcfunction => "mcfunction",
            ExportTarget::Remote => "remote",
        };
        f.write_str(name)
    }
}

impl FromStr for ExportTarget {
    type Err = BbsError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "datapack" => Ok(ExportTarget::Datapack),
            "mcfunction" | "function" => Ok(ExportTarget::Mcfunction),
            "remote" | "rcon" => Ok(ExportTarget::Remote),
            other => Err(BbsError::ConfigError(format!(
                "unknown export target `{}` (expected datapack, mcfunction or remote)",
                other
            ))),
        }
    }
}

/// What an export produced
#[derive(Debug, Clone, PartialEq)]
pub struct ExportReport {
    pub target: ExportTarget,
    /// Files written, in write order (empty for remote exports)
    pub files: Vec<PathBuf>,
    /// Commands accepted by the server (zero for file exports)
    pub commands_sent: usize,
}

/// Serializes rendered scripts to files or a remote executor
#[derive(Debug, Clone)]
pub struct Exporter {
    config: ExportConfig,
    /// Wall-clock tick length for paced remote export
    pacing: Option<Duration>,
}

impl Exporter {
    pub fn new(config: ExportConfig) -> Self {
        Self {
            config,
            pacing: None,
        }
    }

    /// Take remote pacing from the `[rcon]` section
    pub fn with_rcon(mut self, rcon: &RconConfig) -> Self {
        self.pacing = rcon
            .realtime
            .then(|| Duration::from_millis(rcon.tick_millis));
        self
    }

    pub fn config(&self) -> &ExportConfig {
        &self.config
    }

    /// Write the script as files
    ///
    /// Fails with [`BbsError::ConfigError`] for the remote target.
    pub fn export_files(
        &self,
        script: &RenderedScript,
        target: ExportTarget,
    ) -> Result<ExportReport> {
        let planned = match target {
            ExportTarget::Mcfunction => files::mcfunction_layout(script, &self.config),
            ExportTarget::Datapack => files::datapack_layout(script, &self.config)?,
            ExportTarget::Remote => {
                return Err(BbsError::ConfigError(
                    "remote export needs a command sink".into(),
                ))
            }
        };
        let written = files::write_all(&planned)?;
        tracing::info!(
            %target,
            files = written.len(),
            dir = %self.config.output_dir.display(),
            "exported files"
        );
        Ok(ExportReport {
            target,
            files: written,
            commands_sent: 0,
        })
    }

    /// Export to any target; `sink` is only used for [`ExportTarget::Remote`]
    pub async fn export<S: CommandSink>(
        &self,
        script: &RenderedScript,
        target: ExportTarget,
        sink: &mut S,
    ) -> Result<ExportReport> {
        if target.is_file() {
            return self.export_files(script, target);
        }
        let sent = send_script(script, sink, self.pacing).await?;
        tracing::info!(commands = sent, "remote export finished");
        Ok(ExportReport {
            target,
            files: Vec::new(),
            commands_sent: sent,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_target_parsing() {
        assert_eq!(
            "DATAPACK".parse::<ExportTarget>().unwrap(),
            ExportTarget::Datapack
        );
        assert_eq!("rcon".parse::<ExportTarget>().unwrap(), ExportTarget::Remote);
        assert!("zip".parse::<ExportTarget>().is_err());
        assert_eq!(ExportTarget::Mcfunction.to_string(), "mcfunction");
    }

    #[test]
    fn test_pacing_only_when_realtime() {
        let rcon = RconConfig {
            realtime: true,
            tick_millis: 50,
            ..RconConfig::default()
        };
        let exporter = Exporter::new(ExportConfig::default()).with_rcon(&rcon);
        assert_eq!(exporter.pacing, Some(Duration::from_millis(50)));
        let exporter = Exporter::new(ExportConfig::default()).with_rcon(&RconConfig::default());
        assert_eq!(exporter.pacing, None);
    }

    #[test]
    fn test_remote_needs_sink() {
        let script = RenderedScript {
            title: "t".into(),
            session_version: 1,
            blocks: Vec::new(),
        };
        let result =
            Exporter::new(ExportConfig::default()).export_files(&script, ExportTarget::Remote);
        assert!(matches!(result, Err(BbsError::ConfigError(_))));
    }
}
