//! Application settings management
//!
//! Persistent settings stored as JSON in the user's config directory,
//! overridable from the command line.

use std::fs;
use std::path::{ Path, PathBuf };
use std::time::Duration;

use serde::{ Deserialize, Serialize };

use crate::cli::Args;


/// Application settings.
#[derive( Debug, Clone, PartialEq, Serialize, Deserialize )]
#[serde( default )]
pub struct Settings {
    /// Scriptable application to control.
    pub app_name: String,

    /// Seconds between now-playing refreshes.
    pub refresh_secs: u64,

    /// Fetch and draw album art.
    pub show_artwork: bool,

    /// Volume change per up/down step.
    pub volume_step: u32,

    /// Where cover art is written before rendering (temp dir if unset).
    pub artwork_path: Option<PathBuf>,
}


impl Default for Settings {
    fn default() -> Self {
        Self {
            app_name: "Music".to_string(),
            refresh_secs: 5,
            show_artwork: true,
            volume_step: 10,
            artwork_path: None,
        }
    }
}


impl Settings {
    /// Returns the path to the settings file.
    pub fn settings_path() -> Option<PathBuf> {
        dirs::config_dir().map( |p| p.join( "lazymusic" ).join( "settings.json" ) )
    }


    /// Loads settings from the default location, or returns defaults if not found.
    pub fn load() -> Self {
        match Self::settings_path() {
            Some( path ) => Self::load_from( &path ),
            None => Self::default(),
        }
    }


    /// Loads settings from `path`, falling back to defaults.
    pub fn load_from( path: &Path ) -> Self {
        if !path.exists() {
            return Self::default();
        }

        match fs::read_to_string( path ) {
            Ok( contents ) => {
                serde_json::from_str( &contents ).unwrap_or_else( |e| {
                    tracing::warn!( "Invalid settings in {:?}: {}", path, e );
                    Self::default()
                })
            }
            Err( e ) => {
                tracing::warn!( "Failed to read settings: {}", e );
                Self::default()
            }
        }
    }


    /// Saves settings to the default location.
    pub fn save( &self ) {
        if let Some( path ) = Self::settings_path() {
            self.save_to( &path );
        }
    }


    /// Saves settings to `path`.
    pub fn save_to( &self, path: &Path ) {
        // Create parent directory if needed
        if let Some( parent ) = path.parent() {
            if !parent.exists() {
                if let Err( e ) = fs::create_dir_all( parent ) {
                    tracing::warn!( "Failed to create settings directory: {}", e );
                    return;
                }
            }
        }

        match serde_json::to_string_pretty( self ) {
            Ok( json ) => {
                if let Err( e ) = fs::write( path, json ) {
                    tracing::warn!( "Failed to save settings: {}", e );
                }
            }
            Err( e ) => {
                tracing::warn!( "Failed to serialize settings: {}", e );
            }
        }
    }


    /// Applies command-line overrides.
    pub fn apply_args( &mut self, args: &Args ) {
        if let Some( ref app ) = args.app {
            self.app_name = app.clone();
        }
        if let Some( secs ) = args.refresh {
            self.refresh_secs = secs;
        }
        if args.no_artwork {
            self.show_artwork = false;
        }
        if let Some( step ) = args.volume_step {
            self.volume_step = step;
        }
    }


    /// Refresh interval, never shorter than one second.
    pub fn refresh_interval( &self ) -> Duration {
        Duration::from_secs( self.refresh_secs.max( 1 ) )
    }
}


#[cfg( test )]
mod tests {
    use super::*;


    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!( Settings::load_from( &dir.path().join( "nope.json" ) ), Settings::default() );
    }


    #[test]
    fn test_partial_file_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join( "settings.json" );
        fs::write( &path, r#"{ "app_name": "Spotify" }"# ).unwrap();

        let settings = Settings::load_from( &path );
        assert_eq!( settings.app_name, "Spotify" );
        assert_eq!( settings.refresh_secs, 5 );
        assert!( settings.show_artwork );
    }


    #[test]
    fn test_invalid_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join( "settings.json" );
        fs::write( &path, "{ not json" ).unwrap();
        assert_eq!( Settings::load_from( &path ), Settings::default() );
    }


    #[test]
    fn test_save_and_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join( "nested" ).join( "settings.json" );
        let settings = Settings { show_artwork: false, volume_step: 5, ..Settings::default() };
        settings.save_to( &path );
        assert_eq!( Settings::load_from( &path ), settings );
    }


    #[test]
    fn test_args_override() {
        let mut settings = Settings::default();
        let args = Args {
            app: Some( "Spotify".to_string() ),
            refresh: Some( 0 ),
            no_artwork: true,
            ..Args::default()
        };
        settings.apply_args( &args );
        assert_eq!( settings.app_name, "Spotify" );
        assert!( !settings.show_artwork );
        assert_eq!( settings.refresh_interval(), Duration::from_secs( 1 ) );
    }
}
