//! lazymusic core - Remote control of a scriptable desktop music player
//!
//! This crate provides the player bridge (AppleScript via `osascript`),
//! parsers for the player's record output, album art rendering, and the
//! background worker that keeps script calls off the UI thread.

pub mod artwork;
pub mod bridge;
pub mod command;
pub mod event;
pub mod record;
pub mod script;
pub mod track;
pub mod worker;

#[cfg( test )]
pub( crate ) mod testing;

pub use artwork::{ Artwork, Cell, Rgb };
pub use bridge::{ AppleMusicBridge, BridgeError, PlayerBridge };
pub use command::{ Command, CommandError };
pub use event::{ PlayerEvent, PlayerRequest };
pub use script::{ OsascriptRunner, ScriptRunner };
pub use track::{ Playlist, Track };
pub use worker::{ BridgeWorker, RequestReceiver, RequestSender, WorkerHandle };
