//! Command line parsing
//!
//! Provides the commands typed after `:` in the TUI. Commands are parsed
//! from user input and turned into player requests or UI actions by the
//! caller.

use thiserror::Error;


/// Errors that can occur during command parsing.
#[derive( Debug, Error, PartialEq )]
pub enum CommandError {
    #[error( "Unknown command: {0}" )]
    Unknown( String ),

    #[error( "Invalid argument: {0}" )]
    InvalidArgument( String ),

    #[error( "Missing argument: {0}" )]
    MissingArgument( String ),
}


/// Parsed command.
#[derive( Debug, Clone, PartialEq )]
pub enum Command {
    // Playback commands
    Play,
    Pause,
    Toggle,
    Next,
    Prev,
    Volume { level: Option<u32> },
    VolumeUp,
    VolumeDown,

    // Library commands
    Favorite,
    Playlist { name: String },
    Track { id: String },
    Refresh,

    // UI commands
    Filter { term: String },
    Help,
    Quit,
}


impl Command {
    /// Parses a command string (without the leading `:`).
    ///
    /// @param input - The command string to parse
    ///
    /// @returns The parsed command or an error
    pub fn parse( input: &str ) -> Result<Self, CommandError> {
        let input = input.trim();
        let mut parts = input.splitn( 2, ' ' );
        let cmd = parts.next().unwrap_or( "" ).to_lowercase();
        let args = parts.next().map( |s| s.trim() ).filter( |s| !s.is_empty() );

        match cmd.as_str() {
            // Playback commands
            "play" | "p" => Ok( Command::Play ),
            "pause" | "pa" => Ok( Command::Pause ),
            "toggle" | "t" => Ok( Command::Toggle ),
            "next" | "n" => Ok( Command::Next ),
            "prev" | "previous" | "b" => Ok( Command::Prev ),
            "vol" | "volume" => {
                let level = args
                    .map( |s| {
                        s.parse::<u32>()
                            .ok()
                            .filter( |v| *v <= 100 )
                            .ok_or_else( || CommandError::InvalidArgument(
                                format!( "Invalid volume: '{}'. Use 0-100", s )
                            ))
                    })
                    .transpose()?;
                Ok( Command::Volume { level } )
            }
            "up" => Ok( Command::VolumeUp ),
            "down" => Ok( Command::VolumeDown ),

            // Library commands
            "fav" | "f" | "favorite" => Ok( Command::Favorite ),
            "playlist" | "pl" => {
                let name = args
                    .ok_or_else( || CommandError::MissingArgument( "playlist name".into() ) )?;
                Ok( Command::Playlist { name: name.to_string() } )
            }
            "track" => {
                let id = args
                    .ok_or_else( || CommandError::MissingArgument( "persistent ID".into() ) )?;
                Ok( Command::Track { id: id.to_string() } )
            }
            "refresh" | "r" => Ok( Command::Refresh ),

            // UI commands
            "filter" | "find" => {
                let term = args
                    .ok_or_else( || CommandError::MissingArgument( "filter term".into() ) )?;
                Ok( Command::Filter { term: term.to_string() } )
            }
            "help" | "h" => Ok( Command::Help ),
            "quit" | "q" | "exit" => Ok( Command::Quit ),

            "" => Err( CommandError::Unknown( "empty command".into() ) ),
            other => Err( CommandError::Unknown( other.to_string() ) ),
        }
    }


    /// Returns a brief description of the command for help text.
    pub fn description( &self ) -> &'static str {
        match self {
            Command::Play => "Start playback",
            Command::Pause => "Pause playback",
            Command::Toggle => "Toggle play/pause",
            Command::Next => "Next track",
            Command::Prev => "Previous track",
            Command::Volume { .. } => "Set volume (0-100)",
            Command::VolumeUp => "Volume up",
            Command::VolumeDown => "Volume down",
            Command::Favorite => "Favorite current track",
            Command::Playlist { .. } => "Play playlist by name",
            Command::Track { .. } => "Play track by persistent ID",
            Command::Refresh => "Refresh everything",
            Command::Filter { .. } => "Filter the track list",
            Command::Help => "Show help",
            Command::Quit => "Quit application",
        }
    }
}


/// Returns help text listing all available commands and keys.
pub fn help_text() -> &'static str {
    r#"Playback Commands:
  :play           Start playback
  :pause          Pause playback
  :toggle         Toggle play/pause          [p]
  :next           Next track                 [n]
  :prev           Previous track             [b]
  :vol <0-100>    Set volume
  :up / :down     Volume up / down           [u/d]

Library Commands:
  :fav            Favorite current track     [F]
  :playlist <n>   Play playlist by name
  :track <id>     Play track by persistent ID
  :refresh        Refresh everything         [r]

List Keys:
  j / k           Cursor down / up
  h / l           Previous / next page
  /               Filter list (Esc clears)
  f               Favorite selected track
  g / Enter       Play selected track
  s               Select current track
  < / >           Previous / next tab

Other:
  :filter <term>  Filter the track list
  a               Toggle album art
  :help           Show this help             [?]
  :quit           Exit lazymusic             [q]"#
}


#[cfg( test )]
mod tests {
    use super::*;


    #[test]
    fn test_parse_playback() {
        assert_eq!( Command::parse( "next" ).unwrap(), Command::Next );
        assert_eq!( Command::parse( "  B " ).unwrap(), Command::Prev );
        assert_eq!( Command::parse( "t" ).unwrap(), Command::Toggle );
    }


    #[test]
    fn test_parse_volume() {
        assert_eq!( Command::parse( "vol 40" ).unwrap(), Command::Volume { level: Some( 40 ) } );
        assert_eq!( Command::parse( "volume" ).unwrap(), Command::Volume { level: None } );
        assert!( matches!( Command::parse( "vol 140" ), Err( CommandError::InvalidArgument( _ ) ) ) );
        assert!( matches!( Command::parse( "vol loud" ), Err( CommandError::InvalidArgument( _ ) ) ) );
    }


    #[test]
    fn test_parse_playlist_keeps_spaces() {
        let cmd = Command::parse( "pl Road Trip 2024" ).unwrap();
        assert_eq!( cmd, Command::Playlist { name: "Road Trip 2024".to_string() } );
    }


    #[test]
    fn test_parse_missing_arg() {
        assert!( matches!( Command::parse( "playlist" ), Err( CommandError::MissingArgument( _ ) ) ) );
        assert!( matches!( Command::parse( "filter   " ), Err( CommandError::MissingArgument( _ ) ) ) );
    }


    #[test]
    fn test_parse_unknown() {
        assert!( matches!( Command::parse( "foobar" ), Err( CommandError::Unknown( _ ) ) ) );
        assert!( matches!( Command::parse( "" ), Err( CommandError::Unknown( _ ) ) ) );
    }
}
