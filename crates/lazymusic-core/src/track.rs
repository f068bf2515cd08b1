//! Track and playlist model
//!
//! Plain data mirrored from the player's scripting dictionary.


/// Favorite marker shown next to favorited tracks.
pub const FAVORITE_ICON: &str = "\u{f02d1}";

/// Marker shown next to tracks that are not favorited.
pub const UNFAVORITE_ICON: &str = "\u{eb05}";


/// A track as reported by the player.
#[derive( Debug, Clone, Default, PartialEq )]
pub struct Track {
    /// Persistent ID, stable across sessions.
    pub id: String,
    pub name: String,
    /// Display length as formatted by the player ("3:45").
    pub time: String,
    /// Length in seconds.
    pub duration: f64,
    pub played_count: u32,
    pub favorited: bool,
    pub artist: String,
    pub album: String,
    pub album_artist: String,
    pub lyrics: String,
}


impl Track {
    /// Creates a track that only carries a display name.
    pub fn placeholder( name: impl Into<String> ) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }


    /// Text matched against the list filter.
    pub fn filter_value( &self ) -> String {
        format!( "{} {}", self.name, self.artist )
    }


    /// "Name - Artist".
    pub fn label( &self ) -> String {
        format!( "{} - {}", self.name, self.artist )
    }


    /// Icon reflecting the favorite flag.
    pub fn favorite_icon( &self ) -> &'static str {
        if self.favorited { FAVORITE_ICON } else { UNFAVORITE_ICON }
    }


    /// Returns true when the track carries a persistent ID.
    pub fn is_real( &self ) -> bool {
        !self.id.is_empty()
    }
}


/// Ordered list of tracks, e.g. the player's current playlist.
#[derive( Debug, Clone, Default, PartialEq )]
pub struct Playlist {
    pub tracks: Vec<Track>,
}


impl Playlist {
    /// Creates a playlist from tracks.
    pub fn new( tracks: Vec<Track> ) -> Self {
        Self { tracks }
    }


    /// Index of the track with the given persistent ID.
    pub fn position_of( &self, id: &str ) -> Option<usize> {
        self.tracks.iter().position( |t| t.id == id )
    }


    /// Flips the favorite flag of the track with the given ID.
    ///
    /// @returns true if a track matched
    pub fn toggle_favorite( &mut self, id: &str ) -> bool {
        match self.position_of( id ) {
            Some( index ) => {
                let track = &mut self.tracks[ index ];
                track.favorited = !track.favorited;
                true
            }
            None => false,
        }
    }


    pub fn len( &self ) -> usize {
        self.tracks.len()
    }


    pub fn is_empty( &self ) -> bool {
        self.tracks.is_empty()
    }
}


#[cfg( test )]
mod tests {
    use super::*;


    fn track( id: &str, name: &str ) -> Track {
        Track {
            id: id.to_string(),
            name: name.to_string(),
            artist: "Artist".to_string(),
            ..Track::default()
        }
    }


    #[test]
    fn test_toggle_favorite_first_track() {
        let mut playlist = Playlist::new( vec![ track( "A1", "One" ), track( "B2", "Two" ) ] );
        assert!( playlist.toggle_favorite( "A1" ) );
        assert!( playlist.tracks[ 0 ].favorited );
        assert!( !playlist.tracks[ 1 ].favorited );

        assert!( playlist.toggle_favorite( "A1" ) );
        assert!( !playlist.tracks[ 0 ].favorited );
    }


    #[test]
    fn test_toggle_favorite_unknown_id() {
        let mut playlist = Playlist::new( vec![ track( "A1", "One" ) ] );
        assert!( !playlist.toggle_favorite( "ZZ" ) );
        assert!( !playlist.tracks[ 0 ].favorited );
    }


    #[test]
    fn test_labels() {
        let t = track( "A1", "Song" );
        assert_eq!( t.label(), "Song - Artist" );
        assert_eq!( t.filter_value(), "Song Artist" );
        assert_eq!( t.favorite_icon(), UNFAVORITE_ICON );
        assert!( !Track::placeholder( "Loading..." ).is_real() );
    }
}
