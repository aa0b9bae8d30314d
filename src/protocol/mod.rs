//! Wire types for the YouTube Music Desktop companion API.
//!
//! # Submodules
//!
//! * [`auth`] - Request/response bodies of the authorization handshake
//! * [`command`] - Playback command names understood by the player
//! * [`realtime`] - Frames exchanged over the persistent event channel
//! * [`state`] - Player state snapshots pushed by the player
//!
//! The modules are plain data: decoding never mutates client state, and a
//! snapshot is owned by whoever received it.

pub mod auth;
pub mod command;
pub mod realtime;
pub mod state;

use std::fmt::Debug;

use serde::Deserialize;

/// Parses and logs a JSON payload from the companion API.
///
/// # Arguments
///
/// * `body` - Payload text to parse
/// * `origin` - Description of the endpoint or event for logging
///
/// # Logging
///
/// * Success: logs the parsed structure at TRACE level
/// * Parse error: logs the raw JSON at TRACE level if it is at least valid
///   JSON, the error itself at ERROR level otherwise
pub fn json<T>(body: &str, origin: &str) -> Result<T, serde_json::Error>
where
    T: for<'de> Deserialize<'de> + Debug,
{
    match serde_json::from_str(body) {
        Ok(result) => {
            trace!("{origin}: {result:#?}");
            Ok(result)
        }
        Err(e) => {
            if let Ok(json) = serde_json::from_str::<serde_json::Value>(body) {
                trace!("{origin}: {json:#?}");
            } else {
                error!("{origin}: failed parsing payload ({e:?})");
                trace!("{body}");
            }
            Err(e)
        }
    }
}
