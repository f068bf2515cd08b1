//! Tab management for the TUI.
//!
//! Defines the tabs of the browser below the now-playing panel.


/// Tabs in display order.
pub const TABS: [Tab; 2] = [ Tab::CurrentPlaylist, Tab::Playlists ];


/// A tab of the playlist browser.
#[derive( Debug, Clone, Copy, PartialEq, Eq, Default )]
pub enum Tab {
    /// Tracks of the player's current playlist.
    #[default]
    CurrentPlaylist,

    /// All playlists of the library.
    Playlists,
}


impl Tab {
    /// Position in [`TABS`].
    pub fn index( self ) -> usize {
        TABS.iter().position( |t| *t == self ).unwrap_or( 0 )
    }


    /// Returns the next tab, staying on the last one.
    pub fn next( self ) -> Self {
        TABS.get( self.index() + 1 ).copied().unwrap_or( self )
    }


    /// Returns the previous tab, staying on the first one.
    pub fn prev( self ) -> Self {
        match self.index() {
            0 => self,
            i => TABS[ i - 1 ],
        }
    }


    /// Returns the title of the tab.
    pub fn title( &self ) -> &'static str {
        match self {
            Tab::CurrentPlaylist => "Current Playlist",
            Tab::Playlists => "Playlists",
        }
    }
}


#[cfg( test )]
mod tests {
    use super::*;


    #[test]
    fn test_tab_navigation_clamps() {
        assert_eq!( Tab::CurrentPlaylist.next(), Tab::Playlists );
        assert_eq!( Tab::Playlists.next(), Tab::Playlists );
        assert_eq!( Tab::Playlists.prev(), Tab::CurrentPlaylist );
        assert_eq!( Tab::CurrentPlaylist.prev(), Tab::CurrentPlaylist );
    }
}
