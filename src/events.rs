//! Events emitted by the companion API session client.
//!
//! This module defines the events the host observes during authentication
//! and remote playback. These events can be used to:
//! * Persist a freshly granted token
//! * Redraw a widget on every player state change
//! * Surface diagnostics in the host's own log
//!
//! # Example
//!
//! ```rust
//! use ytmd_connect::events::Event;
//!
//! fn handle_event(event: Event) {
//!     match event {
//!         Event::Authenticated => println!("token granted"),
//!         Event::StateChanged(state) => println!("volume: {}", state.player.volume),
//!         Event::Log(message) => eprintln!("{message}"),
//!         _ => {}
//!     }
//! }
//! ```

use crate::protocol::state::State;

/// Events that can be emitted by the session client.
///
/// Delivered over the channel returned by
/// [`Client::new`](crate::remote::Client::new), on whatever task the
/// underlying transport uses. Consumers must not assume a particular thread
/// and should treat delivery as concurrent with their own calls into the
/// client.
///
/// All recoverable failures (handshake errors, transport drops, malformed
/// frames, commands sent while disconnected) surface only as
/// [`Log`](Self::Log) events; none of them are raised as errors.
#[derive(Clone, Debug)]
pub enum Event {
    /// The event channel is open and the baseline state fetch has been
    /// queued.
    Connected,

    /// The event channel closed, either deliberately or because the
    /// transport dropped.
    ///
    /// The client does not reconnect by itself; the host decides whether
    /// and when to call `connect()` again.
    Disconnected,

    /// The authorization handshake completed and a token is now held.
    ///
    /// Fires exactly once per successful handshake. The host should read
    /// the token back and persist it.
    Authenticated,

    /// The player pushed a new state snapshot.
    ///
    /// Each snapshot fully replaces the previous one; the client never
    /// merges or diffs.
    StateChanged(State),

    /// A human-readable diagnostic message.
    ///
    /// The host may surface these in its own UI or log.
    Log(String),
}
