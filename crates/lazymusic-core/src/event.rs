//! Messages exchanged between the UI and the bridge worker.

use crate::artwork::Artwork;
use crate::track::{ Playlist, Track };


/// Requests sent from the UI to the bridge worker.
#[derive( Debug, Clone, PartialEq )]
pub enum PlayerRequest {
    PlayPause,
    Play,
    Pause,
    Next,
    Previous,
    SetVolume( u32 ),
    VolumeUp,
    VolumeDown,
    PlayPlaylist( String ),
    /// Play a track by persistent ID.
    PlayTrack( String ),
    FavoriteCurrent,
    /// Toggle favorite of a track by persistent ID.
    FavoriteTrack( String ),
    RefreshTrack,
    RefreshPosition,
    RefreshArtwork { cols: u16, rows: u16 },
    RefreshPlaylist,
    RefreshPlaylists,
    Shutdown,
}


/// Events emitted by the bridge worker for UI updates.
#[derive( Debug, Clone, PartialEq )]
pub enum PlayerEvent {
    /// The player moved to another track; details must be refetched.
    TrackChanged,
    TrackUpdated( Track ),
    /// Player position in whole seconds.
    PositionUpdated( u32 ),
    ArtworkUpdated( Option<Artwork> ),
    /// Favorite flag flipped on the track with this persistent ID.
    FavoriteToggled( String ),
    PlaylistUpdated( Playlist ),
    PlaylistsUpdated( Vec<String> ),
    Error( String ),
    /// Periodic refresh tick.
    Tick,
}
