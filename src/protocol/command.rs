//! Command names understood by the player.
//!
//! The dispatcher forwards any string unvalidated; these constants cover the
//! commands a transport-control widget needs. Unknown names are the remote
//! side's concern.

/// Toggle between playing and paused.
pub const PLAY_PAUSE: &str = "playPause";

/// Skip to the next track in the queue.
pub const NEXT: &str = "next";

/// Return to the previous track.
pub const PREVIOUS: &str = "previous";

/// Seek backwards within the current track.
pub const REWIND: &str = "player-rewind";

/// Seek forwards within the current track.
pub const FORWARD: &str = "player-forward";

/// Rate the current track up.
pub const TRACK_LIKE: &str = "track-like";

/// Rate the current track down.
pub const TRACK_DISLIKE: &str = "track-dislike";

/// Toggle queue shuffling.
pub const SHUFFLE: &str = "player-shuffle";

/// Cycle the repeat mode (off, all, one).
pub const REPEAT: &str = "player-repeat";

/// Request a full state snapshot.
///
/// The server only pushes on change, so the client issues this once right
/// after connecting to obtain a baseline.
pub const GET_STATE: &str = "player-get-state";
