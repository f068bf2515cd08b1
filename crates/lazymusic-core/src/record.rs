//! Parsing of AppleScript record output
//!
//! `osascript` prints records as loosely structured text such as
//! `class:file track, id:1234, name:Song, favorited:true, ...`.
//! Values never contain the separator in practice, so a regex over
//! `key:value` pairs is enough.

use std::collections::HashMap;
use std::sync::OnceLock;

use regex::Regex;

use crate::bridge::BridgeError;
use crate::track::{ Playlist, Track };


/// Separator emitted between track records in list scripts.
pub const TRACK_SEPARATOR: &str = "######";


fn record_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init( || {
        Regex::new( r"(\w[\w ]*?):\s*([^,]*?)\s*(?:,|$)" ).expect( "record regex is valid" )
    })
}


/// Extracts `key: value` pairs from a record.
///
/// Keys and values are trimmed. A repeated key keeps the last value.
pub fn parse_record( input: &str ) -> HashMap<String, String> {
    record_regex()
        .captures_iter( input )
        .map( |caps| ( caps[ 1 ].trim().to_string(), caps[ 2 ].trim().to_string() ) )
        .collect()
}


/// Builds a track from a parsed record.
pub fn track_from_record( record: &HashMap<String, String> ) -> Track {
    let text = |key: &str| record.get( key ).cloned().unwrap_or_default();

    Track {
        id: text( "persistent ID" ),
        name: text( "name" ),
        time: text( "time" ),
        duration: record.get( "duration" )
            .and_then( |v| parse_number( v ) )
            .unwrap_or( 0.0 ),
        played_count: record.get( "played count" )
            .and_then( |v| v.parse().ok() )
            .unwrap_or( 0 ),
        favorited: record.get( "favorited" ).map( |v| v == "true" ).unwrap_or( false ),
        artist: text( "artist" ),
        album: text( "album" ),
        album_artist: text( "album artist" ),
        lyrics: text( "lyrics" ),
    }
}


/// Parses a single track record.
pub fn parse_track( input: &str ) -> Track {
    track_from_record( &parse_record( input ) )
}


/// Parses a `######`-separated list of track records.
///
/// Everything after the last separator is dropped.
pub fn parse_track_list( input: &str ) -> Playlist {
    let mut segments: Vec<&str> = input.split( TRACK_SEPARATOR ).collect();
    segments.pop();

    Playlist::new( segments.into_iter().map( parse_track ).collect() )
}


/// Parses a comma separated list of names (`a, b, c`).
pub fn parse_name_list( input: &str ) -> Vec<String> {
    input.split( ", " )
        .map( str::trim )
        .filter( |name| !name.is_empty() )
        .map( str::to_string )
        .collect()
}


/// Parses the player position in seconds, truncated to whole seconds.
pub fn parse_position( input: &str ) -> Result<u32, BridgeError> {
    let trimmed = input.trim();
    parse_number( trimmed )
        .filter( |v| v.is_finite() && *v >= 0.0 )
        .map( |v| v as u32 )
        .ok_or_else( || BridgeError::Parse( format!( "player position '{}'", trimmed ) ) )
}


/// Escapes a value for use inside an AppleScript string literal.
pub fn escape_script_string( value: &str ) -> String {
    value.replace( '\\', "\\\\" ).replace( '"', "\\\"" )
}


// Some locales print a decimal comma.
fn parse_number( value: &str ) -> Option<f64> {
    value.trim().replace( ',', "." ).parse().ok()
}


#[cfg( test )]
mod tests {
    use super::*;

    const RECORD: &str = "class:file track, id:5123, index:3, name:Blue in Green, \
        persistent ID:6F2E0A1B9C3D4E5F, duration:337.45, time:5:37, \
        artist:Miles Davis, album artist:Miles Davis, album:Kind of Blue, \
        played count:42, favorited:true, lyrics:";


    #[test]
    fn test_parse_record_pairs() {
        let record = parse_record( RECORD );
        assert_eq!( record.get( "name" ).map( String::as_str ), Some( "Blue in Green" ) );
        assert_eq!( record.get( "persistent ID" ).map( String::as_str ), Some( "6F2E0A1B9C3D4E5F" ) );
        assert_eq!( record.get( "album artist" ).map( String::as_str ), Some( "Miles Davis" ) );
        assert_eq!( record.get( "lyrics" ).map( String::as_str ), Some( "" ) );
    }


    #[test]
    fn test_later_keys_overwrite_earlier() {
        let record = parse_record( "name:First, artist:Band, name:Second" );
        assert_eq!( record.get( "name" ).map( String::as_str ), Some( "Second" ) );
        assert_eq!( record.get( "artist" ).map( String::as_str ), Some( "Band" ) );
    }


    #[test]
    fn test_track_from_record() {
        let track = parse_track( RECORD );
        assert_eq!( track.id, "6F2E0A1B9C3D4E5F" );
        assert_eq!( track.name, "Blue in Green" );
        assert_eq!( track.time, "5:37" );
        assert_eq!( track.duration, 337.45 );
        assert_eq!( track.played_count, 42 );
        assert!( track.favorited );
        assert_eq!( track.album, "Kind of Blue" );
    }


    #[test]
    fn test_track_defaults_for_missing_keys() {
        let track = parse_track( "name:Untitled, duration:abc" );
        assert_eq!( track.name, "Untitled" );
        assert_eq!( track.duration, 0.0 );
        assert_eq!( track.played_count, 0 );
        assert!( !track.favorited );
        assert!( track.id.is_empty() );
    }


    #[test]
    fn test_parse_track_list_drops_tail() {
        let output = "name:One, persistent ID:A, ######, name:Two, persistent ID:B, ######\n";
        let playlist = parse_track_list( output );
        assert_eq!( playlist.len(), 2 );
        assert_eq!( playlist.tracks[ 0 ].name, "One" );
        assert_eq!( playlist.tracks[ 1 ].id, "B" );

        assert!( parse_track_list( "" ).is_empty() );
    }


    #[test]
    fn test_parse_name_list() {
        let names = parse_name_list( "Library, Music, Favourite Songs, \n" );
        assert_eq!( names, vec![ "Library", "Music", "Favourite Songs" ] );
        assert!( parse_name_list( "\n" ).is_empty() );
    }


    #[test]
    fn test_parse_position() {
        assert_eq!( parse_position( "83.912\n" ).unwrap(), 83 );
        assert_eq!( parse_position( "12,5" ).unwrap(), 12 );
        assert!( matches!( parse_position( "missing value" ), Err( BridgeError::Parse( _ ) ) ) );
    }


    #[test]
    fn test_escape_script_string() {
        assert_eq!( escape_script_string( r#"Say "hi" \o/"# ), r#"Say \"hi\" \\o/"# );
    }
}
