//! Screen widgets.

pub mod help;
pub mod now_playing;
pub mod playlists;
pub mod progress;
pub mod tabs;
pub mod track_list;
