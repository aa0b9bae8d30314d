//! Player state snapshots pushed by the companion server.
//!
//! The player sends a complete snapshot on every change; the client never
//! merges or diffs. Fields the player omits decode to their defaults so a
//! sparse snapshot (e.g. before any track has played) still parses.
//!
//! # Wire Format
//!
//! ```json
//! {
//!     "player": {
//!         "trackState": 1,
//!         "videoProgress": 12.45,
//!         "volume": 100,
//!         "adPlaying": false,
//!         "shuffle": false,
//!         "queue": {
//!             "autoplay": true,
//!             "items": [ { "title": "...", "videoId": "..." } ],
//!             "repeatMode": 0,
//!             "selectedItemIndex": 0
//!         }
//!     },
//!     "video": {
//!         "author": "Artist",
//!         "title": "Song",
//!         "album": "Album",
//!         "likeStatus": 1,
//!         "thumbnails": [ { "url": "//img", "width": 60, "height": 60 } ],
//!         "durationSeconds": 245,
//!         "id": "dQw4w9WgXcQ"
//!     },
//!     "playlistId": "RDAMVM..."
//! }
//! ```

use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_repr::{Deserialize_repr, Serialize_repr};
use serde_with::{formats::Flexible, serde_as, DurationSeconds, DurationSecondsWithFrac};

/// Complete snapshot of the player, the current video and the active
/// playlist.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct State {
    #[serde(default)]
    pub player: Player,

    /// Absent when nothing is playing.
    #[serde(default)]
    pub video: Option<Video>,

    #[serde(default)]
    pub playlist_id: Option<String>,
}

/// Transport and queue status of the player itself.
#[serde_as]
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Player {
    #[serde(default)]
    pub track_state: TrackState,

    /// Playhead position within the current video.
    #[serde(default)]
    #[serde_as(as = "DurationSecondsWithFrac<f64, Flexible>")]
    pub video_progress: Duration,

    /// Volume in percent, 0 to 100.
    #[serde(default)]
    pub volume: i32,

    #[serde(default)]
    pub ad_playing: bool,

    #[serde(default)]
    pub shuffle: bool,

    #[serde(default)]
    pub queue: Option<Queue>,
}

/// Playback state of the current track.
#[derive(
    Clone, Copy, Debug, Default, Eq, PartialEq, Hash, Serialize_repr, Deserialize_repr,
)]
#[repr(i8)]
pub enum TrackState {
    Paused = 0,
    Playing = 1,
    Buffering = 2,
    #[default]
    #[serde(other)]
    Unknown = -1,
}

/// Repeat setting of the queue.
#[derive(
    Clone, Copy, Debug, Default, Eq, PartialEq, Hash, Serialize_repr, Deserialize_repr,
)]
#[repr(i8)]
pub enum RepeatMode {
    None = 0,
    All = 1,
    One = 2,
    #[default]
    #[serde(other)]
    Unknown = -1,
}

/// Rating of the current video.
///
/// The player reports `1` for a liked track.
#[derive(
    Clone, Copy, Debug, Default, Eq, PartialEq, Hash, Serialize_repr, Deserialize_repr,
)]
#[repr(i8)]
pub enum LikeStatus {
    Dislike = 0,
    Like = 1,
    #[default]
    #[serde(other)]
    Unknown = -1,
}

/// The play queue, including automix suggestions appended by the player.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Queue {
    #[serde(default)]
    pub autoplay: bool,

    #[serde(default)]
    pub items: Vec<QueueItem>,

    #[serde(default)]
    pub automix_items: Vec<QueueItem>,

    #[serde(default)]
    pub is_generating: bool,

    #[serde(default)]
    pub is_infinite: bool,

    #[serde(default)]
    pub repeat_mode: RepeatMode,

    /// Index into `items`, or -1 when nothing is selected.
    #[serde(default)]
    pub selected_item_index: i32,
}

/// A single queue entry.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueueItem {
    #[serde(default)]
    pub thumbnails: Vec<Thumbnail>,

    #[serde(default)]
    pub title: String,

    #[serde(default)]
    pub author: String,

    /// Human-readable duration as the player displays it, e.g. `"3:57"`.
    #[serde(default)]
    pub duration: String,

    #[serde(default)]
    pub selected: bool,

    #[serde(default)]
    pub video_id: String,

    /// Alternate renditions (e.g. video vs. audio-only) of this entry.
    #[serde(default)]
    pub counterparts: Option<Vec<QueueItem>>,
}

/// Artwork in one of the sizes the player offers.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Thumbnail {
    #[serde(default)]
    pub url: String,

    #[serde(default)]
    pub width: u32,

    #[serde(default)]
    pub height: u32,
}

impl Thumbnail {
    /// The artwork URL with a scheme.
    ///
    /// The player sometimes hands out protocol-relative URLs (`//lh3...`);
    /// those are pinned to `https:` so they can be fetched directly.
    #[must_use]
    pub fn absolute_url(&self) -> String {
        if self.url.starts_with("http") {
            self.url.clone()
        } else {
            format!("https:{}", self.url)
        }
    }
}

/// Metadata of the video currently loaded in the player.
#[serde_as]
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Video {
    #[serde(default)]
    pub author: String,

    #[serde(default)]
    pub channel_id: Option<String>,

    #[serde(default)]
    pub title: String,

    #[serde(default)]
    pub album: Option<String>,

    #[serde(default)]
    pub album_id: Option<String>,

    #[serde(default)]
    pub like_status: Option<LikeStatus>,

    #[serde(default)]
    pub thumbnails: Vec<Thumbnail>,

    #[serde(default)]
    #[serde_as(as = "DurationSeconds<u64, Flexible>")]
    pub duration_seconds: Duration,

    #[serde(default)]
    pub id: String,

    #[serde(default)]
    pub is_live: Option<bool>,

    #[serde(default)]
    pub video_type: Option<i32>,

    #[serde(default)]
    pub metadata_filled: Option<bool>,
}
