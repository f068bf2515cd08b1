//! Application state machine.
//!
//! Turns key presses into player requests and worker events into widget
//! updates. Nothing here blocks: every script call goes through the
//! request sender.

use std::time::{ Duration, Instant };

use crossterm::event::{ KeyCode, KeyModifiers };
use lazymusic_core::artwork::artwork_size;
use lazymusic_core::{ Command, PlayerEvent, PlayerRequest, RequestSender };

use crate::input::{ InputBuffer, InputMode };
use crate::settings::Settings;
use crate::view::Tab;
use crate::widgets::now_playing::NowPlaying;
use crate::widgets::playlists::PlaylistList;
use crate::widgets::track_list::{ ListAction, TrackList };


/// How long a status message stays visible.
const STATUS_TIMEOUT: Duration = Duration::from_secs( 3 );


/// Application state.
pub struct App {
    pub( crate ) settings: Settings,
    settings_changed: bool,
    requests: RequestSender,

    pub( crate ) now_playing: NowPlaying,
    pub( crate ) tab: Tab,
    pub( crate ) tracks: TrackList,
    pub( crate ) playlists: PlaylistList,

    // Input state
    pub( crate ) input_mode: InputMode,
    pub( crate ) input_buffer: InputBuffer,
    pub( crate ) show_help: bool,

    // Status message (shown in status line)
    pub( crate ) status_message: Option<String>,
    status_clear_at: Option<Instant>,

    /// Terminal size (width, height).
    size: ( u16, u16 ),
    pub should_quit: bool,
}


impl App {
    pub fn new( settings: Settings, requests: RequestSender, size: ( u16, u16 ) ) -> Self {
        Self {
            settings,
            settings_changed: false,
            requests,
            now_playing: NowPlaying::new(),
            tab: Tab::default(),
            tracks: TrackList::new(),
            playlists: PlaylistList::new(),
            input_mode: InputMode::Normal,
            input_buffer: InputBuffer::new(),
            show_help: false,
            status_message: None,
            status_clear_at: None,
            size,
            should_quit: false,
        }
    }


    /// Requests the initial state from the player.
    pub fn start( &mut self ) {
        self.send( PlayerRequest::RefreshTrack );
        self.send( PlayerRequest::RefreshPlaylists );
    }


    pub fn settings( &self ) -> &Settings {
        &self.settings
    }


    /// Returns true if the user changed a persisted setting.
    pub fn settings_changed( &self ) -> bool {
        self.settings_changed
    }


    fn send( &self, request: PlayerRequest ) {
        self.requests.send( request );
    }


    fn set_status( &mut self, msg: impl Into<String> ) {
        self.set_status_at( msg, Instant::now() );
    }


    fn set_status_at( &mut self, msg: impl Into<String>, now: Instant ) {
        self.status_message = Some( msg.into() );
        self.status_clear_at = Some( now + STATUS_TIMEOUT );
    }


    /// Advances timers: the track countdown and the status message.
    pub fn tick( &mut self ) {
        self.tick_at( Instant::now() );
    }


    pub fn tick_at( &mut self, now: Instant ) {
        self.now_playing.tick_at( now );

        if let Some( clear_at ) = self.status_clear_at {
            if now >= clear_at {
                self.status_message = None;
                self.status_clear_at = None;
            }
        }
    }


    fn request_artwork( &self ) {
        if !self.settings.show_artwork {
            return;
        }
        let ( cols, rows ) = artwork_size( self.size.1 );
        if rows > 0 {
            self.send( PlayerRequest::RefreshArtwork { cols, rows } );
        }
    }


    fn refresh_all( &mut self ) {
        self.send( PlayerRequest::RefreshTrack );
        self.send( PlayerRequest::RefreshPosition );
        self.send( PlayerRequest::RefreshPlaylist );
        self.send( PlayerRequest::RefreshPlaylists );
        self.request_artwork();
        self.set_status( "Refreshing..." );
    }


    /// Applies a worker event.
    pub fn handle_event( &mut self, event: PlayerEvent ) {
        match event {
            PlayerEvent::TrackChanged | PlayerEvent::Tick => {
                self.send( PlayerRequest::RefreshTrack );
            }
            PlayerEvent::TrackUpdated( track ) => {
                let is_real = track.is_real();
                let changed = self.now_playing.set_track( track );
                if is_real {
                    self.send( PlayerRequest::RefreshPosition );
                    if changed {
                        tracing::debug!( "Track changed to {}", self.now_playing.track().label() );
                        self.request_artwork();
                        self.send( PlayerRequest::RefreshPlaylist );
                    }
                } else if changed {
                    // Nothing is playing; the previous cover no longer applies.
                    self.now_playing.set_artwork( None );
                }
            }
            PlayerEvent::PositionUpdated( position ) => {
                self.now_playing.set_position( position );
            }
            PlayerEvent::ArtworkUpdated( artwork ) => {
                self.now_playing.set_artwork( artwork );
            }
            PlayerEvent::FavoriteToggled( id ) => {
                self.now_playing.toggle_favorite( &id );
                self.tracks.toggle_favorite( &id );
            }
            PlayerEvent::PlaylistUpdated( playlist ) => {
                self.tracks.set_playlist( playlist );
            }
            PlayerEvent::PlaylistsUpdated( names ) => {
                self.playlists.set_names( names );
            }
            PlayerEvent::Error( msg ) => {
                tracing::warn!( "Player error: {}", msg );
                self.set_status( format!( "Error: {}", msg ) );
            }
        }
    }


    /// Stores the new terminal size and refetches artwork for it.
    pub fn resize( &mut self, width: u16, height: u16 ) {
        let height_changed = height != self.size.1;
        self.size = ( width, height );
        if height_changed {
            self.request_artwork();
        }
    }


    /// Handles a key press.
    pub fn handle_key( &mut self, code: KeyCode, modifiers: KeyModifiers ) {
        match self.input_mode {
            InputMode::Normal => self.handle_normal_key( code, modifiers ),
            InputMode::Command => self.handle_command_key( code ),
            InputMode::Filter => self.handle_filter_key( code ),
        }
    }


    fn handle_normal_key( &mut self, code: KeyCode, modifiers: KeyModifiers ) {
        if modifiers.contains( KeyModifiers::CONTROL ) && code == KeyCode::Char( 'c' ) {
            self.should_quit = true;
            return;
        }

        if self.show_help {
            match code {
                KeyCode::Char( '?' ) | KeyCode::Esc => self.show_help = false,
                KeyCode::Char( 'q' ) => self.should_quit = true,
                _ => {}
            }
            return;
        }

        match code {
            KeyCode::Char( 'q' ) => self.should_quit = true,
            KeyCode::Char( 'p' ) => self.send( PlayerRequest::PlayPause ),
            KeyCode::Char( 'n' ) => self.send( PlayerRequest::Next ),
            KeyCode::Char( 'b' ) => self.send( PlayerRequest::Previous ),
            KeyCode::Char( 'u' ) => self.send( PlayerRequest::VolumeUp ),
            KeyCode::Char( 'd' ) => self.send( PlayerRequest::VolumeDown ),
            KeyCode::Char( 'F' ) => self.send( PlayerRequest::FavoriteCurrent ),
            KeyCode::Char( 's' ) => self.select_current_track(),
            KeyCode::Char( '<' ) => self.tab = self.tab.prev(),
            KeyCode::Char( '>' ) => self.tab = self.tab.next(),
            KeyCode::Char( 'r' ) => self.refresh_all(),
            KeyCode::Char( 'a' ) => self.toggle_artwork(),
            KeyCode::Char( '?' ) => self.show_help = true,
            KeyCode::Char( ':' ) => {
                self.input_mode = InputMode::Command;
                self.input_buffer.clear();
            }
            _ => match self.tab {
                Tab::CurrentPlaylist => self.handle_track_list_key( code ),
                Tab::Playlists => {
                    if let Some( name ) = self.playlists.handle_key( code ) {
                        self.set_status( format!( "Playing playlist {}", name ) );
                        self.send( PlayerRequest::PlayPlaylist( name ) );
                    }
                }
            },
        }
    }


    fn handle_track_list_key( &mut self, code: KeyCode ) {
        match self.tracks.handle_key( code ) {
            ListAction::None => {}
            ListAction::Play( id ) => self.send( PlayerRequest::PlayTrack( id ) ),
            ListAction::Favorite( id ) => self.send( PlayerRequest::FavoriteTrack( id ) ),
            ListAction::StartFilter => {
                self.input_mode = InputMode::Filter;
                self.input_buffer.clear();
                for c in self.tracks.filter().chars() {
                    self.input_buffer.insert( c );
                }
            }
        }
    }


    fn handle_command_key( &mut self, code: KeyCode ) {
        match code {
            KeyCode::Enter => {
                let input = self.input_buffer.content().to_string();
                self.input_mode = InputMode::Normal;
                self.input_buffer.clear();
                self.execute_command( &input );
            }
            KeyCode::Esc => {
                self.input_mode = InputMode::Normal;
                self.input_buffer.clear();
            }
            KeyCode::Backspace => {
                if self.input_buffer.is_empty() {
                    self.input_mode = InputMode::Normal;
                } else {
                    self.input_buffer.backspace();
                }
            }
            KeyCode::Left => self.input_buffer.move_left(),
            KeyCode::Right => self.input_buffer.move_right(),
            KeyCode::Char( c ) => self.input_buffer.insert( c ),
            _ => {}
        }
    }


    fn handle_filter_key( &mut self, code: KeyCode ) {
        match code {
            KeyCode::Enter => {
                self.input_mode = InputMode::Normal;
                self.input_buffer.clear();
            }
            KeyCode::Esc => {
                self.input_mode = InputMode::Normal;
                self.input_buffer.clear();
                self.tracks.clear_filter();
            }
            KeyCode::Backspace => {
                self.input_buffer.backspace();
                self.tracks.set_filter( self.input_buffer.content() );
            }
            KeyCode::Left => self.input_buffer.move_left(),
            KeyCode::Right => self.input_buffer.move_right(),
            KeyCode::Char( c ) => {
                self.input_buffer.insert( c );
                self.tracks.set_filter( self.input_buffer.content() );
            }
            _ => {}
        }
    }


    fn execute_command( &mut self, input: &str ) {
        match Command::parse( input ) {
            Ok( cmd ) => {
                self.set_status( cmd.description() );
                self.run_command( cmd );
            }
            Err( e ) => self.set_status( e.to_string() ),
        }
    }


    fn run_command( &mut self, cmd: Command ) {
        match cmd {
            Command::Play => self.send( PlayerRequest::Play ),
            Command::Pause => self.send( PlayerRequest::Pause ),
            Command::Toggle => self.send( PlayerRequest::PlayPause ),
            Command::Next => self.send( PlayerRequest::Next ),
            Command::Prev => self.send( PlayerRequest::Previous ),
            Command::Volume { level: Some( level ) } => {
                self.send( PlayerRequest::SetVolume( level ) );
                self.set_status( format!( "Volume: {}", level ) );
            }
            Command::Volume { level: None } => self.set_status( "Usage: :vol <0-100>" ),
            Command::VolumeUp => self.send( PlayerRequest::VolumeUp ),
            Command::VolumeDown => self.send( PlayerRequest::VolumeDown ),
            Command::Favorite => self.send( PlayerRequest::FavoriteCurrent ),
            Command::Playlist { name } => {
                self.set_status( format!( "Playing playlist {}", name ) );
                self.send( PlayerRequest::PlayPlaylist( name ) );
            }
            Command::Track { id } => self.send( PlayerRequest::PlayTrack( id ) ),
            Command::Refresh => self.refresh_all(),
            Command::Filter { term } => {
                self.tab = Tab::CurrentPlaylist;
                self.tracks.set_filter( &term );
            }
            Command::Help => self.show_help = true,
            Command::Quit => self.should_quit = true,
        }
    }


    fn select_current_track( &mut self ) {
        let id = self.now_playing.track().id.clone();
        self.tab = Tab::CurrentPlaylist;
        if id.is_empty() || !self.tracks.select_id( &id ) {
            self.set_status( "Current track is not in the list" );
        }
    }


    fn toggle_artwork( &mut self ) {
        self.settings.show_artwork = !self.settings.show_artwork;
        self.settings_changed = true;
        if self.settings.show_artwork {
            self.request_artwork();
            self.set_status( "Album art on" );
        } else {
            self.set_status( "Album art off" );
        }
    }
}


#[cfg( test )]
mod tests {
    use super::*;
    use lazymusic_core::worker::request_channel;
    use crate::widgets::now_playing::ArtworkState;
    use lazymusic_core::{ Artwork, Cell, Playlist, RequestReceiver, Track };


    fn app() -> ( App, RequestReceiver ) {
        let ( tx, rx ) = request_channel();
        ( App::new( Settings::default(), tx, ( 80, 40 ) ), rx )
    }


    fn drain( rx: &mut RequestReceiver ) -> Vec<PlayerRequest> {
        let mut out = Vec::new();
        while let Ok( req ) = rx.try_recv() {
            out.push( req );
        }
        out
    }


    fn track( id: &str ) -> Track {
        Track {
            id: id.to_string(),
            name: format!( "Song {}", id ),
            artist: "Band".to_string(),
            duration: 100.0,
            ..Track::default()
        }
    }


    fn key( app: &mut App, c: char ) {
        app.handle_key( KeyCode::Char( c ), KeyModifiers::NONE );
    }


    #[test]
    fn test_startup_requests() {
        let ( mut app, mut rx ) = app();
        app.start();
        assert_eq!( drain( &mut rx ), vec![ PlayerRequest::RefreshTrack, PlayerRequest::RefreshPlaylists ] );
    }


    #[test]
    fn test_tick_refreshes_track() {
        let ( mut app, mut rx ) = app();
        app.handle_event( PlayerEvent::Tick );
        app.handle_event( PlayerEvent::TrackChanged );
        assert_eq!( drain( &mut rx ), vec![ PlayerRequest::RefreshTrack, PlayerRequest::RefreshTrack ] );
    }


    #[test]
    fn test_new_track_fetches_details() {
        let ( mut app, mut rx ) = app();
        app.handle_event( PlayerEvent::TrackUpdated( track( "A" ) ) );
        assert_eq!( drain( &mut rx ), vec![
            PlayerRequest::RefreshPosition,
            PlayerRequest::RefreshArtwork { cols: 32, rows: 16 },
            PlayerRequest::RefreshPlaylist,
        ]);

        // Same track again only resyncs the position.
        app.handle_event( PlayerEvent::TrackUpdated( track( "A" ) ) );
        assert_eq!( drain( &mut rx ), vec![ PlayerRequest::RefreshPosition ] );
    }


    #[test]
    fn test_player_not_running_fetches_nothing() {
        let ( mut app, mut rx ) = app();
        app.handle_event( PlayerEvent::TrackUpdated( Track::placeholder( "No Track Playing" ) ) );
        assert!( drain( &mut rx ).is_empty() );
        assert_eq!( app.now_playing.track().name, "No Track Playing" );
    }


    #[test]
    fn test_stopped_player_clears_artwork() {
        let ( mut app, mut rx ) = app();
        app.handle_event( PlayerEvent::TrackUpdated( track( "A" ) ) );
        app.handle_event( PlayerEvent::ArtworkUpdated( Some( Artwork::from_cells( 4, vec![ Cell::default(); 8 ] ) ) ) );
        assert!( matches!( app.now_playing.artwork(), ArtworkState::Loaded( _ ) ) );
        drain( &mut rx );

        app.handle_event( PlayerEvent::TrackUpdated( Track::placeholder( "No Track Playing" ) ) );
        assert_eq!( app.now_playing.artwork(), &ArtworkState::Missing );
        assert!( drain( &mut rx ).is_empty() );
    }


    #[test]
    fn test_artwork_disabled() {
        let ( tx, mut rx ) = request_channel();
        let settings = Settings { show_artwork: false, ..Settings::default() };
        let mut app = App::new( settings, tx, ( 80, 40 ) );

        app.handle_event( PlayerEvent::TrackUpdated( track( "A" ) ) );
        assert!( !drain( &mut rx ).iter().any( |r| matches!( r, PlayerRequest::RefreshArtwork { .. } ) ) );

        key( &mut app, 'a' );
        assert!( app.settings().show_artwork );
        assert!( app.settings_changed() );
        assert_eq!( drain( &mut rx ), vec![ PlayerRequest::RefreshArtwork { cols: 32, rows: 16 } ] );
    }


    #[test]
    fn test_playback_keys() {
        let ( mut app, mut rx ) = app();
        for c in [ 'p', 'n', 'b', 'u', 'd', 'F' ] {
            key( &mut app, c );
        }
        assert_eq!( drain( &mut rx ), vec![
            PlayerRequest::PlayPause,
            PlayerRequest::Next,
            PlayerRequest::Previous,
            PlayerRequest::VolumeUp,
            PlayerRequest::VolumeDown,
            PlayerRequest::FavoriteCurrent,
        ]);
    }


    #[test]
    fn test_quit_keys() {
        let ( mut app, _rx ) = app();
        app.handle_key( KeyCode::Char( 'c' ), KeyModifiers::CONTROL );
        assert!( app.should_quit );

        let ( mut app, _rx ) = self::app();
        key( &mut app, 'q' );
        assert!( app.should_quit );
    }


    #[test]
    fn test_list_keys_and_favorite_event() {
        let ( mut app, mut rx ) = app();
        app.handle_event( PlayerEvent::PlaylistUpdated( Playlist::new( vec![ track( "A" ), track( "B" ) ] ) ) );

        key( &mut app, 'j' );
        key( &mut app, 'g' );
        key( &mut app, 'f' );
        assert_eq!( drain( &mut rx ), vec![
            PlayerRequest::PlayTrack( "B".into() ),
            PlayerRequest::FavoriteTrack( "B".into() ),
        ]);

        app.handle_event( PlayerEvent::FavoriteToggled( "B".into() ) );
        assert!( app.tracks.tracks()[ 1 ].favorited );
    }


    #[test]
    fn test_favorite_current_updates_now_playing() {
        let ( mut app, _rx ) = app();
        app.handle_event( PlayerEvent::TrackUpdated( track( "A" ) ) );
        app.handle_event( PlayerEvent::PlaylistUpdated( Playlist::new( vec![ track( "A" ) ] ) ) );
        app.handle_event( PlayerEvent::FavoriteToggled( "A".into() ) );
        assert!( app.now_playing.track().favorited );
        assert!( app.tracks.tracks()[ 0 ].favorited );
    }


    #[test]
    fn test_filter_mode() {
        let ( mut app, _rx ) = app();
        app.handle_event( PlayerEvent::PlaylistUpdated( Playlist::new( vec![ track( "A" ), track( "B" ) ] ) ) );

        key( &mut app, '/' );
        assert_eq!( app.input_mode, InputMode::Filter );

        // Keys go to the filter, not to playback.
        key( &mut app, 'b' );
        assert_eq!( app.tracks.filter(), "b" );
        assert_eq!( app.tracks.visible_len(), 2 );

        app.handle_key( KeyCode::Esc, KeyModifiers::NONE );
        assert_eq!( app.input_mode, InputMode::Normal );
        assert!( app.tracks.filter().is_empty() );
    }


    #[test]
    fn test_command_mode() {
        let ( mut app, mut rx ) = app();
        key( &mut app, ':' );
        for c in "vol 40".chars() {
            key( &mut app, c );
        }
        app.handle_key( KeyCode::Enter, KeyModifiers::NONE );

        assert_eq!( app.input_mode, InputMode::Normal );
        assert_eq!( drain( &mut rx ), vec![ PlayerRequest::SetVolume( 40 ) ] );
        assert_eq!( app.status_message.as_deref(), Some( "Volume: 40" ) );
    }


    #[test]
    fn test_unknown_command_sets_status() {
        let ( mut app, mut rx ) = app();
        key( &mut app, ':' );
        key( &mut app, 'x' );
        app.handle_key( KeyCode::Enter, KeyModifiers::NONE );
        assert!( drain( &mut rx ).is_empty() );
        assert!( app.status_message.is_some() );
    }


    #[test]
    fn test_playlists_tab_plays_playlist() {
        let ( mut app, mut rx ) = app();
        app.handle_event( PlayerEvent::PlaylistsUpdated( vec![ "Chill".into(), "Focus".into() ] ) );

        key( &mut app, '>' );
        assert_eq!( app.tab, Tab::Playlists );
        key( &mut app, 'j' );
        app.handle_key( KeyCode::Enter, KeyModifiers::NONE );
        assert_eq!( drain( &mut rx ), vec![ PlayerRequest::PlayPlaylist( "Focus".into() ) ] );

        key( &mut app, '<' );
        key( &mut app, '<' );
        assert_eq!( app.tab, Tab::CurrentPlaylist );
    }


    #[test]
    fn test_select_current_track() {
        let ( mut app, _rx ) = app();
        app.handle_event( PlayerEvent::PlaylistUpdated( Playlist::new( vec![ track( "A" ), track( "B" ), track( "C" ) ] ) ) );
        app.handle_event( PlayerEvent::TrackUpdated( track( "C" ) ) );
        app.tab = Tab::Playlists;

        key( &mut app, 's' );
        assert_eq!( app.tab, Tab::CurrentPlaylist );
        assert_eq!( app.tracks.cursor(), 2 );
    }


    #[test]
    fn test_status_clears_after_timeout() {
        let ( mut app, _rx ) = app();
        let now = Instant::now();
        app.set_status_at( "hello", now );

        app.tick_at( now + Duration::from_secs( 1 ) );
        assert!( app.status_message.is_some() );

        app.tick_at( now + STATUS_TIMEOUT );
        assert!( app.status_message.is_none() );
    }


    #[test]
    fn test_error_event_sets_status() {
        let ( mut app, _rx ) = app();
        app.handle_event( PlayerEvent::Error( "boom".into() ) );
        assert_eq!( app.status_message.as_deref(), Some( "Error: boom" ) );
    }


    #[test]
    fn test_resize_refetches_artwork() {
        let ( mut app, mut rx ) = app();
        app.resize( 80, 40 );
        assert!( drain( &mut rx ).is_empty() );

        app.resize( 100, 50 );
        assert_eq!( drain( &mut rx ), vec![ PlayerRequest::RefreshArtwork { cols: 40, rows: 20 } ] );
    }


    #[test]
    fn test_help_toggle() {
        let ( mut app, mut rx ) = app();
        key( &mut app, '?' );
        assert!( app.show_help );
        // Playback keys are ignored while help is open.
        key( &mut app, 'p' );
        assert!( drain( &mut rx ).is_empty() );
        app.handle_key( KeyCode::Esc, KeyModifiers::NONE );
        assert!( !app.show_help );
    }
}
