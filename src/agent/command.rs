//! User command surface

use std::path::PathBuf;

use crate::core::error::{BbsError, Result};
use crate::export::ExportTarget;

/// One line of user input, classified
#[derive(Debug, Clone, PartialEq)]
pub enum AgentCommand {
    Summary,
    Generate,
    /// `None` uses the configured default target
    Export(Option<ExportTarget>),
    Record,
    /// Reachability of the server and the configured paths
    Status,
    Refine(String),
    Reset,
    Save(PathBuf),
    Load(PathBuf),
    Help,
    Quit,
    /// Anything else is a new story
    Story(String),
}

impl AgentCommand {
    /// Classify a line; blank lines yield `None`
    pub fn parse(line: &str) -> Result<Option<Self>> {
        let line = line.trim();
        if line.is_empty() {
            return Ok(None);
        }
        let (word, rest) = match line.split_once(char::is_whitespace) {
            Some((word, rest)) => (word, rest.trim()),
            None => (line, ""),
        };

        let command = match (word.to_lowercase().as_str(), rest) {
            ("summary" | "s", "") => AgentCommand::Summary,
            ("generate" | "g", "") => AgentCommand::Generate,
            ("export" | "e", "") => AgentCommand::Export(None),
            ("export" | "e", target) => AgentCommand::Export(Some(target.parse()?)),
            ("record", "") => AgentCommand::Record,
            ("status", "") => AgentCommand::Status,
            ("refine", "") => {
                return Err(BbsError::ParseError(
                    "refine needs a description of the change".into(),
                ))
            }
            ("refine", text) => AgentCommand::Refine(text.to_string()),
            ("reset", "") => AgentCommand::Reset,
            ("save", path) if !path.is_empty() => AgentCommand::Save(PathBuf::from(path)),
            ("load", path) if !path.is_empty() => AgentCommand::Load(PathBuf::from(path)),
            ("help" | "h" | "?", "") => AgentCommand::Help,
            ("quit" | "q" | "exit", "") => AgentCommand::Quit,
            _ => AgentCommand::Story(line.to_string()),
        };
        Ok(Some(command))
    }
}

pub const HELP: &str = "\
Commands:
  <story text>        - Describe an animation (replaces the current storyboard)
  refine <text>       - Change the current storyboard
  summary / s         - Show the storyboard
  generate / g        - Render commands from the storyboard
  export [target]     - Export as datapack, mcfunction or remote (RCON)
  record              - Show the recording plan for the rendered animation
  status              - Check the server connection and output paths
  save <path>         - Save the storyboard as JSON
  load <path>         - Load a saved storyboard
  reset               - Start over
  help / h            - Show this help
  quit / q            - Exit";

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(line: &str) -> AgentCommand {
        AgentCommand::parse(line).unwrap().unwrap()
    }

    #[test]
    fn test_keywords() {
        assert_eq!(parse("summary"), AgentCommand::Summary);
        assert_eq!(parse("  GENERATE "), AgentCommand::Generate);
        assert_eq!(parse("export"), AgentCommand::Export(None));
        assert_eq!(
            parse("export mcfunction"),
            AgentCommand::Export(Some(ExportTarget::Mcfunction))
        );
        assert_eq!(parse("q"), AgentCommand::Quit);
        assert_eq!(parse("status"), AgentCommand::Status);
        assert_eq!(
            parse("save out/garden.json"),
            AgentCommand::Save(PathBuf::from("out/garden.json"))
        );
    }

    #[test]
    fn test_refine_keeps_text() {
        assert_eq!(
            parse("refine make scene 2 longer"),
            AgentCommand::Refine("make scene 2 longer".into())
        );
        assert!(AgentCommand::parse("refine").is_err());
    }

    #[test]
    fn test_story_fallback() {
        assert_eq!(
            parse("A dragon attacks the village"),
            AgentCommand::Story("A dragon attacks the village".into())
        );
        // keyword with unexpected arguments is story text
        assert_eq!(
            parse("reset the village at dawn"),
            AgentCommand::Story("reset the village at dawn".into())
        );
    }

    #[test]
    fn test_blank_and_bad_target() {
        assert_eq!(AgentCommand::parse("   ").unwrap(), None);
        assert!(AgentCommand::parse("export zip").is_err());
    }
}
