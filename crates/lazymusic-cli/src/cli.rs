//! Command-line argument parsing for lazymusic.

use std::path::PathBuf;

use clap::Parser;


/// lazymusic - Remote control the desktop Music app from the terminal.
#[derive( Parser, Debug, Default )]
#[command( name = "lazymusic" )]
#[command( version, about, long_about = None )]
pub struct Args {
    /// Scriptable player application to control (default: Music).
    #[arg( short, long )]
    pub app: Option<String>,

    /// Seconds between now-playing refreshes.
    #[arg( short, long )]
    pub refresh: Option<u64>,

    /// Do not fetch or draw album art.
    #[arg( long )]
    pub no_artwork: bool,

    /// Volume change per up/down step.
    #[arg( long )]
    pub volume_step: Option<u32>,

    /// Write a debug log to this file.
    #[arg( short, long )]
    pub log: Option<PathBuf>,
}


#[cfg( test )]
mod tests {
    use super::*;


    #[test]
    fn test_parse_args() {
        let args = Args::parse_from([ "lazymusic", "--app", "Spotify", "-r", "2", "--no-artwork" ]);
        assert_eq!( args.app.as_deref(), Some( "Spotify" ) );
        assert_eq!( args.refresh, Some( 2 ) );
        assert!( args.no_artwork );
        assert!( args.log.is_none() );
    }
}
