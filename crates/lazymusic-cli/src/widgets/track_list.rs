//! Paged, filterable track list for the current playlist tab.

use crossterm::event::KeyCode;
use lazymusic_core::{ Playlist, Track };
use ratatui::{
    prelude::*,
    widgets::Paragraph,
};


/// What the list asks the app to do after a key press.
#[derive( Debug, Clone, PartialEq, Eq )]
pub enum ListAction {
    None,
    /// Play the track with this persistent ID.
    Play( String ),
    /// Toggle favorite on the track with this persistent ID.
    Favorite( String ),
    /// Open the filter prompt.
    StartFilter,
}


/// Track list state.
#[derive( Debug )]
pub struct TrackList {
    tracks: Vec<Track>,
    /// Indices into `tracks` matching the filter.
    visible: Vec<usize>,
    /// Cursor position within `visible`.
    cursor: usize,
    filter: String,
    page_size: usize,
}


impl TrackList {
    /// Creates a list holding a single "Loading..." row.
    pub fn new() -> Self {
        let loading = Track {
            artist: "Loading...".to_string(),
            ..Track::placeholder( "Loading..." )
        };
        let mut list = Self {
            tracks: vec![ loading ],
            visible: Vec::new(),
            cursor: 0,
            filter: String::new(),
            page_size: 10,
        };
        list.refilter();
        list
    }


    /// Replaces the tracks, keeping the cursor index in range.
    pub fn set_playlist( &mut self, playlist: Playlist ) {
        self.tracks = playlist.tracks;
        self.refilter();
    }


    #[cfg( test )]
    pub fn tracks( &self ) -> &[Track] {
        &self.tracks
    }


    /// Rows shown per page.
    pub fn set_page_size( &mut self, rows: usize ) {
        self.page_size = rows.max( 1 );
    }


    pub fn filter( &self ) -> &str {
        &self.filter
    }


    /// Applies a case-insensitive substring filter.
    pub fn set_filter( &mut self, term: &str ) {
        self.filter = term.to_string();
        self.cursor = 0;
        self.refilter();
    }


    pub fn clear_filter( &mut self ) {
        if !self.filter.is_empty() {
            self.set_filter( "" );
        }
    }


    fn refilter( &mut self ) {
        let needle = self.filter.to_lowercase();
        self.visible = self.tracks
            .iter()
            .enumerate()
            .filter( |( _, t )| needle.is_empty() || t.filter_value().to_lowercase().contains( &needle ) )
            .map( |( i, _ )| i )
            .collect();
        self.cursor = self.cursor.min( self.visible.len().saturating_sub( 1 ) );
    }


    pub fn visible_len( &self ) -> usize {
        self.visible.len()
    }


    pub fn cursor( &self ) -> usize {
        self.cursor
    }


    pub fn selected( &self ) -> Option<&Track> {
        self.visible.get( self.cursor ).map( |&i| &self.tracks[ i ] )
    }


    pub fn cursor_up( &mut self ) {
        self.cursor = self.cursor.saturating_sub( 1 );
    }


    pub fn cursor_down( &mut self ) {
        if self.cursor + 1 < self.visible.len() {
            self.cursor += 1;
        }
    }


    /// Zero-based page of the cursor.
    pub fn page( &self ) -> usize {
        self.cursor / self.page_size
    }


    pub fn page_count( &self ) -> usize {
        self.visible.len().div_ceil( self.page_size ).max( 1 )
    }


    /// Moves to the first row of the next page.
    pub fn next_page( &mut self ) {
        if self.page() + 1 < self.page_count() {
            self.cursor = ( self.page() + 1 ) * self.page_size;
        }
    }


    /// Moves to the first row of the previous page.
    pub fn prev_page( &mut self ) {
        if self.page() > 0 {
            self.cursor = ( self.page() - 1 ) * self.page_size;
        }
    }


    /// Moves the cursor to the track with `id`, clearing a filter that
    /// hides it.
    ///
    /// @returns true if the track is in the list
    pub fn select_id( &mut self, id: &str ) -> bool {
        let Some( index ) = self.tracks.iter().position( |t| t.is_real() && t.id == id ) else {
            return false;
        };
        if !self.visible.contains( &index ) {
            self.set_filter( "" );
        }
        if let Some( pos ) = self.visible.iter().position( |&i| i == index ) {
            self.cursor = pos;
        }
        true
    }


    /// Flips the favorite flag of the track with `id`.
    pub fn toggle_favorite( &mut self, id: &str ) -> bool {
        match self.tracks.iter_mut().find( |t| t.is_real() && t.id == id ) {
            Some( track ) => {
                track.favorited = !track.favorited;
                true
            }
            None => false,
        }
    }


    /// Handles a key in normal mode.
    pub fn handle_key( &mut self, code: KeyCode ) -> ListAction {
        match code {
            KeyCode::Char( 'k' ) | KeyCode::Up => self.cursor_up(),
            KeyCode::Char( 'j' ) | KeyCode::Down => self.cursor_down(),
            KeyCode::Char( 'h' ) | KeyCode::Left => self.prev_page(),
            KeyCode::Char( 'l' ) | KeyCode::Right => self.next_page(),
            KeyCode::Char( '/' ) => return ListAction::StartFilter,
            KeyCode::Esc => self.clear_filter(),
            KeyCode::Char( 'f' ) => {
                if let Some( track ) = self.selected().filter( |t| t.is_real() ) {
                    return ListAction::Favorite( track.id.clone() );
                }
            }
            KeyCode::Char( 'g' ) | KeyCode::Enter => {
                if let Some( track ) = self.selected().filter( |t| t.is_real() ) {
                    return ListAction::Play( track.id.clone() );
                }
            }
            _ => {}
        }
        ListAction::None
    }


    /// Text rows of the current page.
    fn page_rows( &self ) -> Vec<( bool, String )> {
        let start = self.page() * self.page_size;
        self.visible
            .iter()
            .enumerate()
            .skip( start )
            .take( self.page_size )
            .map( |( pos, &i )| {
                let t = &self.tracks[ i ];
                ( pos == self.cursor, format!( "{} {} - {}", t.favorite_icon(), t.name, t.artist ) )
            })
            .collect()
    }
}


/// Draws the list page plus a pager row.
pub fn draw( frame: &mut Frame, area: Rect, list: &mut TrackList ) {
    list.set_page_size( area.height.saturating_sub( 1 ) as usize );

    let mut lines: Vec<Line> = list.page_rows()
        .into_iter()
        .map( |( selected, row )| {
            if selected {
                Line::from( Span::styled(
                    format!( "  > {}", row ),
                    Style::default().fg( Color::Magenta ).bold(),
                ))
            } else {
                Line::from( format!( "    {}", row ) )
            }
        })
        .collect();

    if list.visible_len() == 0 {
        lines.push( Line::from( "    No matching tracks" ).style( Style::default().fg( Color::DarkGray ) ) );
    }

    while lines.len() < list.page_size {
        lines.push( Line::default() );
    }

    let mut pager = format!( "  {}/{}", list.page() + 1, list.page_count() );
    if !list.filter().is_empty() {
        pager.push_str( &format!( "  filter: {}", list.filter() ) );
    }
    lines.push( Line::from( pager ).style( Style::default().fg( Color::DarkGray ) ) );

    frame.render_widget( Paragraph::new( lines ), area );
}


#[cfg( test )]
mod tests {
    use super::*;


    fn track( id: &str, name: &str, artist: &str ) -> Track {
        Track {
            id: id.to_string(),
            name: name.to_string(),
            artist: artist.to_string(),
            ..Track::default()
        }
    }


    fn list_of( n: usize ) -> TrackList {
        let mut list = TrackList::new();
        list.set_playlist( Playlist::new(
            ( 0..n ).map( |i| track( &format!( "ID{}", i ), &format!( "Song {}", i ), "Band" ) ).collect()
        ));
        list
    }


    #[test]
    fn test_starts_loading() {
        let mut list = TrackList::new();
        assert_eq!( list.selected().map( |t| t.name.as_str() ), Some( "Loading..." ) );
        // Placeholder rows cannot be played.
        assert_eq!( list.handle_key( KeyCode::Enter ), ListAction::None );
    }


    #[test]
    fn test_cursor_and_paging() {
        let mut list = list_of( 25 );
        list.set_page_size( 10 );

        list.handle_key( KeyCode::Char( 'k' ) );
        assert_eq!( list.cursor(), 0 );

        list.handle_key( KeyCode::Char( 'l' ) );
        assert_eq!( list.cursor(), 10 );
        list.handle_key( KeyCode::Char( 'l' ) );
        list.handle_key( KeyCode::Char( 'l' ) );
        assert_eq!( list.cursor(), 20 );
        assert_eq!( list.page_count(), 3 );

        list.handle_key( KeyCode::Char( 'h' ) );
        assert_eq!( list.cursor(), 10 );

        for _ in 0..30 {
            list.handle_key( KeyCode::Char( 'j' ) );
        }
        assert_eq!( list.cursor(), 24 );
    }


    #[test]
    fn test_filter_is_case_insensitive() {
        let mut list = TrackList::new();
        list.set_playlist( Playlist::new( vec![
            track( "A", "Hello", "Adele" ),
            track( "B", "Yellow", "Coldplay" ),
            track( "C", "Halo", "Beyonce" ),
        ]));

        list.set_filter( "COLD" );
        assert_eq!( list.visible_len(), 1 );
        assert_eq!( list.handle_key( KeyCode::Char( 'g' ) ), ListAction::Play( "B".into() ) );

        list.handle_key( KeyCode::Esc );
        assert_eq!( list.visible_len(), 3 );
    }


    #[test]
    fn test_select_id_clears_hiding_filter() {
        let mut list = list_of( 5 );
        list.set_filter( "Song 1" );
        assert!( list.select_id( "ID3" ) );
        assert!( list.filter().is_empty() );
        assert_eq!( list.cursor(), 3 );
        assert!( !list.select_id( "missing" ) );
    }


    #[test]
    fn test_favorite_action_and_toggle() {
        let mut list = list_of( 3 );
        list.handle_key( KeyCode::Char( 'j' ) );
        assert_eq!( list.handle_key( KeyCode::Char( 'f' ) ), ListAction::Favorite( "ID1".into() ) );

        assert!( list.toggle_favorite( "ID0" ) );
        assert!( list.tracks()[ 0 ].favorited );
        assert!( !list.toggle_favorite( "nope" ) );
    }


    #[test]
    fn test_update_clamps_cursor() {
        let mut list = list_of( 10 );
        for _ in 0..9 {
            list.cursor_down();
        }
        list.set_playlist( Playlist::new( vec![ track( "X", "Only", "One" ) ] ) );
        assert_eq!( list.cursor(), 0 );
        assert_eq!( list.selected().map( |t| t.id.as_str() ), Some( "X" ) );
    }
}
