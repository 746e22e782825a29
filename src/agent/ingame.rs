//! Requests typed into the game chat
//!
//! Players write `!agent <story>` in chat; the server log line looks like
//! `[12:00:00] [Server thread/INFO]: <Steve> !agent a dragon lands`.

use crate::core::error::Result;
use crate::core::types::Position;
use crate::export::CommandSink;

pub const TRIGGER: &str = "!agent";

#[derive(Debug, Clone, PartialEq)]
pub struct ChatRequest {
    pub player: String,
    pub request: String,
}

/// Pick an agent request out of a server log line
pub fn parse_chat_line(line: &str) -> Option<ChatRequest> {
    let open = line.find('<')?;
    let close = open + line[open..].find('>')?;
    let player = &line[open + 1..close];
    if player.is_empty() || !player.chars().all(|c| c.is_alphanumeric() || c == '_') {
        return None;
    }
    let request = line[close + 1..].trim_start().strip_prefix(TRIGGER)?;
    if !request.starts_with(char::is_whitespace) {
        return None;
    }
    let request = request.trim();
    if request.is_empty() {
        return None;
    }
    Some(ChatRequest {
        player: player.to_string(),
        request: request.to_string(),
    })
}

/// Parse the reply to `data get entity <player> Pos`
///
/// e.g. `Steve has the following entity data: [100.5d, 64.0d, -20.3d]`
pub fn parse_position(response: &str) -> Option<Position> {
    let start = response.rfind('[')?;
    let end = start + response[start..].find(']')?;
    let coords: Vec<f64> = response[start + 1..end]
        .split(',')
        .map(|c| c.trim().trim_end_matches(['d', 'D']).parse::<f64>())
        .collect::<std::result::Result<_, _>>()
        .ok()?;
    match coords.as_slice() {
        [x, y, z] => Some(Position::new(*x, *y, *z)),
        _ => None,
    }
}

/// Ask the server where a player stands; `None` if the reply is unreadable
pub async fn player_position<S: CommandSink>(
    sink: &mut S,
    player: &str,
) -> Result<Option<Position>> {
    let reply = sink.execute(&format!("data get entity {} Pos", player)).await?;
    Ok(parse_position(&reply))
}

/// Story text with the player's surroundings appended for the parser
pub fn with_position(request: &str, position: Option<Position>) -> String {
    match position {
        Some(pos) => format!(
            "{}\n\nPLAYER_POSITION: {}\nPlace actors, structures and cameras around this position.",
            request,
            pos.keyframe()
        ),
        None => request.to_string(),
    }
}

/// Chat message shown to every player, flattened to one line
pub fn say(message: &str) -> String {
    let line: String = message
        .chars()
        .map(|c| if c == '\n' { ' ' } else { c })
        .take(200)
        .collect();
    format!("say [Agent] {}", line)
}
