//! Frames exchanged over the persistent event channel.
//!
//! Every frame is a single JSON text message tagged with an `event` field.
//! The server pushes exactly one event type, `state-update`; the client
//! sends exactly one, `command`.
//!
//! # Wire Format
//!
//! Inbound:
//!
//! ```json
//! { "event": "state-update", "data": { "player": { ... }, "video": { ... } } }
//! ```
//!
//! Outbound:
//!
//! ```json
//! { "event": "command", "command": "playPause" }
//! { "event": "command", "command": "player-set-volume", "data": 50 }
//! ```
//!
//! The `data` key of a command is omitted entirely when there is no payload;
//! the player's dispatcher branches on key presence, not on null.

use serde::{Deserialize, Serialize};

use crate::protocol::state::State;

/// Messages pushed by the companion server.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(tag = "event", content = "data")]
pub enum ServerMessage {
    /// A full state snapshot replacing the previous one.
    #[serde(rename = "state-update")]
    StateUpdate(State),
}

/// Messages sent by this client.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "event")]
pub enum ClientMessage {
    /// A playback command, forwarded to the player verbatim.
    #[serde(rename = "command")]
    Command {
        command: String,

        #[serde(skip_serializing_if = "Option::is_none")]
        data: Option<serde_json::Value>,
    },
}

impl ClientMessage {
    #[must_use]
    pub fn command(command: &str, data: Option<serde_json::Value>) -> Self {
        Self::Command {
            command: command.to_owned(),
            data,
        }
    }
}
