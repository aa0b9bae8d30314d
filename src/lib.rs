//! Session client for the YouTube Music Desktop companion API.
//!
//! Connects to a locally running YouTube Music Desktop instance, performs
//! the two-step authorization handshake, keeps a live event channel open for
//! player state pushes, and relays playback commands back to the player.
//!
//! The entry point is [`remote::Client`], which hands out a stream of
//! [`events::Event`]s at construction time.

#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

#[macro_use]
extern crate log;

pub mod config;
pub mod events;
pub mod gateway;
pub mod protocol;
pub mod remote;
pub mod session;
pub mod token;
