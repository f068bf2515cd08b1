//! Player control surface
//!
//! [`PlayerBridge`] is everything the UI can ask of the player.
//! [`AppleMusicBridge`] implements it with fixed AppleScript snippets
//! and parses the loosely structured text that comes back.

use std::path::{ Path, PathBuf };

use thiserror::Error;

use crate::artwork::Artwork;
use crate::record::{
    escape_script_string, parse_name_list, parse_position, parse_track, parse_track_list,
    TRACK_SEPARATOR,
};
use crate::script::ScriptRunner;
use crate::track::{ Playlist, Track };


/// Name shown when the player is closed or idle.
pub const NO_TRACK_PLAYING: &str = "No Track Playing";

/// Reply of the artwork script when the track has no artwork.
const NO_ARTWORK_REPLY: &str = "No Artwork";

/// Default volume step for up/down.
pub const DEFAULT_VOLUME_STEP: u32 = 10;


/// Errors raised while talking to the player.
#[derive( Debug, Error )]
pub enum BridgeError {
    #[error( "Failed to run script interpreter: {0}" )]
    Spawn( #[source] std::io::Error ),

    #[error( "Script failed (status {status:?}): {stderr}" )]
    ScriptFailed { status: Option<i32>, stderr: String },

    #[error( "Volume must be between 0 and 100, got {0}" )]
    InvalidVolume( u32 ),

    #[error( "Unexpected script output: {0}" )]
    Parse( String ),

    #[error( "Artwork error: {0}" )]
    Artwork( String ),

    #[error( "No track with persistent ID {0}" )]
    NotFound( String ),
}


impl BridgeError {
    /// True when the script failed the way it does when the player is
    /// not running or has no current track.
    pub fn is_not_running( &self ) -> bool {
        matches!( self, BridgeError::ScriptFailed { status: Some( 1 ), .. } )
    }
}


/// Operations offered by the remote player.
pub trait PlayerBridge: Send + Sync {
    fn play_pause( &self ) -> Result<(), BridgeError>;
    fn play( &self ) -> Result<(), BridgeError>;
    fn pause( &self ) -> Result<(), BridgeError>;
    fn next_track( &self ) -> Result<(), BridgeError>;
    fn previous_track( &self ) -> Result<(), BridgeError>;
    fn set_volume( &self, volume: u32 ) -> Result<(), BridgeError>;
    fn increase_volume( &self ) -> Result<(), BridgeError>;
    fn decrease_volume( &self ) -> Result<(), BridgeError>;
    fn play_playlist( &self, name: &str ) -> Result<(), BridgeError>;
    fn play_track_by_id( &self, id: &str ) -> Result<(), BridgeError>;

    /// Toggles the favorite flag of the current track.
    ///
    /// @returns the persistent ID of the toggled track
    fn favorite_current_track( &self ) -> Result<String, BridgeError>;
    fn favorite_track_by_id( &self, id: &str ) -> Result<(), BridgeError>;

    /// Player position in whole seconds.
    fn player_position( &self ) -> Result<u32, BridgeError>;
    fn current_track( &self ) -> Result<Track, BridgeError>;
    fn playlists( &self ) -> Result<Vec<String>, BridgeError>;
    fn current_playlist( &self ) -> Result<Playlist, BridgeError>;

    /// Artwork of the current track rendered to `cols` x `rows` cells.
    fn current_artwork( &self, cols: u16, rows: u16 ) -> Result<Option<Artwork>, BridgeError>;
}


/// Bridge to the macOS Music app (or any app with the same dictionary).
pub struct AppleMusicBridge<R: ScriptRunner> {
    runner: R,
    app_name: String,
    artwork_path: PathBuf,
    volume_step: u32,
}


impl<R: ScriptRunner> AppleMusicBridge<R> {
    /// Creates a bridge targeting the `Music` application.
    pub fn new( runner: R ) -> Self {
        Self {
            runner,
            app_name: "Music".to_string(),
            artwork_path: std::env::temp_dir().join( "lazymusic-cover.jpg" ),
            volume_step: DEFAULT_VOLUME_STEP,
        }
    }


    /// Targets a different scriptable application.
    pub fn with_app_name( mut self, name: impl Into<String> ) -> Self {
        self.app_name = name.into();
        self
    }


    /// Changes where cover art is written before rendering.
    pub fn with_artwork_path( mut self, path: impl Into<PathBuf> ) -> Self {
        self.artwork_path = path.into();
        self
    }


    pub fn with_volume_step( mut self, step: u32 ) -> Self {
        self.volume_step = step;
        self
    }


    pub fn app_name( &self ) -> &str {
        &self.app_name
    }


    pub fn artwork_path( &self ) -> &Path {
        &self.artwork_path
    }


    fn app( &self ) -> String {
        escape_script_string( &self.app_name )
    }


    fn run( &self, what: &str, script: &str ) -> Result<String, BridgeError> {
        self.runner.run( script ).map_err( |e| {
            tracing::warn!( "Error {}: {}", what, e );
            e
        })
    }


    /// Runs `tell application "<app>" to <verb>`.
    fn tell( &self, what: &str, verb: &str ) -> Result<(), BridgeError> {
        let script = format!( r#"tell application "{}" to {}"#, self.app(), verb );
        self.run( what, &script ).map( |_| () )
    }


    fn adjust_volume( &self, what: &str, sign: char ) -> Result<(), BridgeError> {
        let script = format!(
            r#"tell application "{}"
    set currentVolume to sound volume
    set sound volume to (currentVolume {} {})
end tell"#,
            self.app(), sign, self.volume_step
        );
        self.run( what, &script ).map( |_| () )
    }


    /// Script that looks a track up by persistent ID in every playlist
    /// and runs `action` on it (bound to `foundTrack`).
    fn find_track_script( &self, id: &str, action: &str ) -> String {
        format!(
            r#"set targetID to "{id}"
set foundTrack to missing value
tell application "{app}"
    repeat with p in every playlist
        try
            set foundTrack to (first track of p whose persistent ID is targetID)
            if foundTrack is not missing value then
                exit repeat
            end if
        end try
    end repeat
    if foundTrack is missing value then
        return "NOT FOUND"
    end if
    {action}
    return persistent ID of foundTrack
end tell"#,
            id = escape_script_string( id ),
            app = self.app(),
            action = action,
        )
    }


    fn run_on_track( &self, what: &str, id: &str, action: &str ) -> Result<(), BridgeError> {
        let output = self.run( what, &self.find_track_script( id, action ) )?;
        if output.trim() == "NOT FOUND" {
            tracing::warn!( "Error {}: no track {}", what, id );
            return Err( BridgeError::NotFound( id.to_string() ) );
        }
        Ok(())
    }
}


impl<R: ScriptRunner> PlayerBridge for AppleMusicBridge<R> {
    fn play_pause( &self ) -> Result<(), BridgeError> {
        self.tell( "toggling play/pause", "playpause" )
    }


    fn play( &self ) -> Result<(), BridgeError> {
        self.tell( "playing track", "play" )
    }


    fn pause( &self ) -> Result<(), BridgeError> {
        self.tell( "pausing track", "pause" )
    }


    fn next_track( &self ) -> Result<(), BridgeError> {
        self.tell( "skipping to next track", "next track" )
    }


    fn previous_track( &self ) -> Result<(), BridgeError> {
        self.tell( "skipping to previous track", "previous track" )
    }


    fn set_volume( &self, volume: u32 ) -> Result<(), BridgeError> {
        if volume > 100 {
            return Err( BridgeError::InvalidVolume( volume ) );
        }
        self.tell( "setting volume", &format!( "set sound volume to {}", volume ) )
    }


    fn increase_volume( &self ) -> Result<(), BridgeError> {
        self.adjust_volume( "increasing volume", '+' )
    }


    fn decrease_volume( &self ) -> Result<(), BridgeError> {
        self.adjust_volume( "decreasing volume", '-' )
    }


    fn play_playlist( &self, name: &str ) -> Result<(), BridgeError> {
        let verb = format!( r#"play playlist "{}""#, escape_script_string( name ) );
        self.tell( &format!( "playing playlist '{}'", name ), &verb )
    }


    fn play_track_by_id( &self, id: &str ) -> Result<(), BridgeError> {
        self.run_on_track( "playing track by id", id, "play foundTrack" )
    }


    fn favorite_current_track( &self ) -> Result<String, BridgeError> {
        let script = format!(
            r#"tell application "{}"
    set aTrack to current track
    set persistentId to persistent ID of aTrack
    set favorited of aTrack to not (favorited of aTrack)
end tell
return persistentId"#,
            self.app()
        );
        let output = self.run( "favoriting track", &script )?;
        Ok( output.trim().to_string() )
    }


    fn favorite_track_by_id( &self, id: &str ) -> Result<(), BridgeError> {
        self.run_on_track(
            "favoriting track by id",
            id,
            "set favorited of foundTrack to not (favorited of foundTrack)",
        )
    }


    fn player_position( &self ) -> Result<u32, BridgeError> {
        let script = format!(
            r#"tell application "{}"
    set playerPosition to player position
end tell
return playerPosition"#,
            self.app()
        );
        let output = self.run( "getting player position", &script )?;
        parse_position( &output )
    }


    fn current_track( &self ) -> Result<Track, BridgeError> {
        let script = format!(
            r#"tell application "{}"
    set output to {{}}
    set end of output to properties of current track
end tell
return output"#,
            self.app()
        );
        match self.runner.run( &script ) {
            Ok( output ) => Ok( parse_track( &output ) ),
            Err( e ) if e.is_not_running() => Ok( Track::placeholder( NO_TRACK_PLAYING ) ),
            Err( e ) => {
                tracing::warn!( "Error getting current track: {}", e );
                Err( e )
            }
        }
    }


    fn playlists( &self ) -> Result<Vec<String>, BridgeError> {
        let script = format!(
            r#"tell application "{}" to set playlistNames to name of every playlist"#,
            self.app()
        );
        let output = self.run( "getting playlists", &script )?;
        Ok( parse_name_list( &output ) )
    }


    fn current_playlist( &self ) -> Result<Playlist, BridgeError> {
        let script = format!(
            r#"tell application "{}"
    set currentList to current playlist
    set output to {{}}
    repeat with t in tracks of currentList
        set end of output to properties of t
        set end of output to "{}"
    end repeat
end tell
return output"#,
            self.app(), TRACK_SEPARATOR
        );
        let output = self.run( "getting current playlist", &script )?;
        Ok( parse_track_list( &output ) )
    }


    fn current_artwork( &self, cols: u16, rows: u16 ) -> Result<Option<Artwork>, BridgeError> {
        let path = self.artwork_path.to_string_lossy();
        let script = format!(
            r#"set tmpPath to POSIX file "{path}"
tell application "{app}"
    set aTrack to current track
    if (count of artworks of aTrack) = 0 then return "{none}"
    set artData to data of artwork 1 of aTrack
end tell
set outFile to open for access tmpPath with write permission
try
    set eof outFile to 0
    write artData to outFile
end try
close access outFile
return POSIX path of tmpPath"#,
            path = escape_script_string( &path ),
            app = self.app(),
            none = NO_ARTWORK_REPLY,
        );

        let output = self.run( "getting current album artwork", &script )?;
        if output.trim() == NO_ARTWORK_REPLY {
            return Ok( None );
        }

        Artwork::from_path( &self.artwork_path, cols, rows )
            .map( Some )
            .map_err( |e| {
                tracing::warn!( "Error rendering artwork {:?}: {}", self.artwork_path, e );
                e
            })
    }
}


#[cfg( test )]
mod tests {
    use super::*;
    use crate::testing::FakeRunner;


    fn bridge( runner: FakeRunner ) -> AppleMusicBridge<FakeRunner> {
        AppleMusicBridge::new( runner )
    }


    #[test]
    fn test_simple_commands_target_app() {
        let b = bridge( FakeRunner::new() ).with_app_name( "Spotify" );
        b.play_pause().unwrap();
        b.next_track().unwrap();
        b.pause().unwrap();

        let scripts = b.runner.scripts();
        assert_eq!( scripts[ 0 ], r#"tell application "Spotify" to playpause"# );
        assert_eq!( scripts[ 1 ], r#"tell application "Spotify" to next track"# );
        assert_eq!( scripts[ 2 ], r#"tell application "Spotify" to pause"# );
    }


    #[test]
    fn test_set_volume_validates_range() {
        let b = bridge( FakeRunner::new() );
        assert!( matches!( b.set_volume( 101 ), Err( BridgeError::InvalidVolume( 101 ) ) ) );
        assert!( b.runner.scripts().is_empty() );

        b.set_volume( 100 ).unwrap();
        assert!( b.runner.scripts()[ 0 ].ends_with( "set sound volume to 100" ) );
    }


    #[test]
    fn test_volume_step() {
        let b = bridge( FakeRunner::new() ).with_volume_step( 5 );
        b.decrease_volume().unwrap();
        assert!( b.runner.scripts()[ 0 ].contains( "(currentVolume - 5)" ) );
    }


    #[test]
    fn test_increase_volume_uses_default_step() {
        let b = bridge( FakeRunner::new() );
        b.increase_volume().unwrap();

        let scripts = b.runner.scripts();
        let script = &scripts[ 0 ];
        assert!( script.starts_with( r#"tell application "Music""# ) );
        assert!( script.contains( "set sound volume to (currentVolume + 10)" ) );
    }


    #[test]
    fn test_current_track_parses_record() {
        let runner = FakeRunner::new()
            .reply( "name:Song, persistent ID:ABC, artist:Band, favorited:false, duration:200.0" );
        let track = bridge( runner ).current_track().unwrap();
        assert_eq!( track.id, "ABC" );
        assert_eq!( track.name, "Song" );
        assert_eq!( track.duration, 200.0 );
    }


    #[test]
    fn test_current_track_when_player_not_running() {
        let runner = FakeRunner::new().fail( 1 );
        let track = bridge( runner ).current_track().unwrap();
        assert_eq!( track.name, NO_TRACK_PLAYING );
        assert!( !track.is_real() );
    }


    #[test]
    fn test_current_track_other_failures_propagate() {
        let runner = FakeRunner::new().fail( 2 );
        assert!( bridge( runner ).current_track().is_err() );
    }


    #[test]
    fn test_playlists_and_position() {
        let runner = FakeRunner::new()
            .reply( "Library, Music, Road Trip\n" )
            .reply( "41.5\n" );
        let b = bridge( runner );
        assert_eq!( b.playlists().unwrap(), vec![ "Library", "Music", "Road Trip" ] );
        assert_eq!( b.player_position().unwrap(), 41 );
    }


    #[test]
    fn test_play_playlist_escapes_name() {
        let b = bridge( FakeRunner::new() );
        b.play_playlist( r#"My "Best""# ).unwrap();
        assert_eq!( b.runner.scripts()[ 0 ], r#"tell application "Music" to play playlist "My \"Best\"""# );
    }


    #[test]
    fn test_track_lookup_not_found() {
        let runner = FakeRunner::new().reply( "NOT FOUND\n" );
        let b = bridge( runner );
        assert!( matches!( b.play_track_by_id( "XYZ" ), Err( BridgeError::NotFound( id ) ) if id == "XYZ" ) );
        assert!( b.runner.scripts()[ 0 ].contains( r#"set targetID to "XYZ""# ) );
    }


    #[test]
    fn test_favorite_track_by_id_toggles_found_track() {
        let runner = FakeRunner::new().reply( "ID1\n" );
        let b = bridge( runner );
        b.favorite_track_by_id( "ID1" ).unwrap();

        let scripts = b.runner.scripts();
        let script = &scripts[ 0 ];
        assert!( script.contains( r#"set targetID to "ID1""# ) );
        assert!( script.contains( "set favorited of foundTrack to not (favorited of foundTrack)" ) );
    }


    #[test]
    fn test_favorite_track_by_id_not_found() {
        let runner = FakeRunner::new().reply( "NOT FOUND\n" );
        let b = bridge( runner );
        assert!( matches!( b.favorite_track_by_id( "GONE" ), Err( BridgeError::NotFound( id ) ) if id == "GONE" ) );
    }


    #[test]
    fn test_favorite_current_returns_id() {
        let runner = FakeRunner::new().reply( "6F2E0A1B\n" );
        assert_eq!( bridge( runner ).favorite_current_track().unwrap(), "6F2E0A1B" );
    }


    #[test]
    fn test_current_playlist() {
        let runner = FakeRunner::new()
            .reply( "name:One, persistent ID:A, ######, name:Two, persistent ID:B, favorited:true, ######" );
        let playlist = bridge( runner ).current_playlist().unwrap();
        assert_eq!( playlist.len(), 2 );
        assert!( playlist.tracks[ 1 ].favorited );
    }


    #[test]
    fn test_no_artwork() {
        let runner = FakeRunner::new().reply( "No Artwork\n" );
        assert!( bridge( runner ).current_artwork( 10, 5 ).unwrap().is_none() );
    }


    #[test]
    fn test_artwork_rendered_from_written_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join( "cover.png" );
        image::RgbImage::from_pixel( 8, 8, image::Rgb([ 200, 10, 10 ]) ).save( &path ).unwrap();

        let runner = FakeRunner::new().reply( &path.to_string_lossy() );
        let art = bridge( runner )
            .with_artwork_path( &path )
            .current_artwork( 4, 2 )
            .unwrap()
            .unwrap();
        assert_eq!( ( art.cols(), art.rows() ), ( 4, 2 ) );
    }
}
