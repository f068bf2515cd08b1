//! Library playlists tab.

use crossterm::event::KeyCode;
use ratatui::{
    prelude::*,
    widgets::{ List, ListItem, ListState },
};


/// Playlist names with a cursor.
#[derive( Debug, Default )]
pub struct PlaylistList {
    names: Option<Vec<String>>,
    state: ListState,
}


impl PlaylistList {
    pub fn new() -> Self {
        Self::default()
    }


    /// Replaces the names, keeping the cursor in range.
    pub fn set_names( &mut self, names: Vec<String> ) {
        let selected = if names.is_empty() {
            None
        } else {
            Some( self.state.selected().unwrap_or( 0 ).min( names.len() - 1 ) )
        };
        self.state.select( selected );
        self.names = Some( names );
    }


    pub fn names( &self ) -> &[String] {
        self.names.as_deref().unwrap_or( &[] )
    }


    pub fn selected( &self ) -> Option<&str> {
        self.state.selected().and_then( |i| self.names().get( i ) ).map( String::as_str )
    }


    /// Handles a key; returns a playlist to play.
    pub fn handle_key( &mut self, code: KeyCode ) -> Option<String> {
        let len = self.names().len();
        match code {
            KeyCode::Char( 'k' ) | KeyCode::Up => {
                if let Some( i ) = self.state.selected() {
                    self.state.select( Some( i.saturating_sub( 1 ) ) );
                }
            }
            KeyCode::Char( 'j' ) | KeyCode::Down => {
                if let Some( i ) = self.state.selected() {
                    if i + 1 < len {
                        self.state.select( Some( i + 1 ) );
                    }
                }
            }
            KeyCode::Char( 'g' ) | KeyCode::Enter => return self.selected().map( str::to_string ),
            _ => {}
        }
        None
    }
}


pub fn draw( frame: &mut Frame, area: Rect, list: &mut PlaylistList ) {
    let items: Vec<ListItem> = match &list.names {
        None => vec![ ListItem::new( "    Loading..." ) ],
        Some( names ) if names.is_empty() => vec![ ListItem::new( "    No playlists" ) ],
        Some( names ) => names.iter().map( |n| ListItem::new( format!( "  {}", n ) ) ).collect(),
    };

    let widget = List::new( items )
        .highlight_style( Style::default().fg( Color::Magenta ).bold() )
        .highlight_symbol( "> " );

    frame.render_stateful_widget( widget, area, &mut list.state );
}


#[cfg( test )]
mod tests {
    use super::*;


    fn names( list: &[&str] ) -> Vec<String> {
        list.iter().map( |s| s.to_string() ).collect()
    }


    #[test]
    fn test_navigate_and_play() {
        let mut list = PlaylistList::new();
        assert_eq!( list.handle_key( KeyCode::Enter ), None );

        list.set_names( names( &[ "Chill", "Focus", "Party" ] ) );
        list.handle_key( KeyCode::Char( 'j' ) );
        list.handle_key( KeyCode::Char( 'j' ) );
        list.handle_key( KeyCode::Char( 'j' ) );
        assert_eq!( list.handle_key( KeyCode::Char( 'g' ) ), Some( "Party".to_string() ) );

        list.handle_key( KeyCode::Char( 'k' ) );
        assert_eq!( list.selected(), Some( "Focus" ) );
    }


    #[test]
    fn test_update_clamps_selection() {
        let mut list = PlaylistList::new();
        list.set_names( names( &[ "A", "B", "C" ] ) );
        list.handle_key( KeyCode::Down );
        list.handle_key( KeyCode::Down );
        list.set_names( names( &[ "A" ] ) );
        assert_eq!( list.selected(), Some( "A" ) );

        list.set_names( Vec::new() );
        assert_eq!( list.selected(), None );
    }
}
