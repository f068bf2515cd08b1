//! Screen layout.

use ratatui::{
    prelude::*,
    widgets::{ Block, BorderType, Borders, Paragraph },
};

use crate::app::App;
use crate::input::InputMode;
use crate::view::{ Tab, TABS };
use crate::widgets::{ help, now_playing, playlists, tabs, track_list };


/// Draws the whole screen.
pub fn draw_ui( frame: &mut Frame, app: &mut App ) {
    let area = frame.area();
    let show_artwork = app.settings.show_artwork;

    let chunks = Layout::default()
        .direction( Direction::Vertical )
        .constraints([
            Constraint::Length( app.now_playing.content_height( show_artwork ) + 2 ), // Now playing
            Constraint::Length( tabs::TAB_STRIP_HEIGHT ),                            // Tab strip
            Constraint::Min( 0 ),                                                     // Tab window
            Constraint::Length( help::summary_height( area.width ) ),                 // Key summary
            Constraint::Length( 1 ),                                                  // Status line
        ])
        .split( area );

    now_playing::draw( frame, chunks[0], &app.now_playing, show_artwork );

    if app.show_help {
        help::draw_full( frame, chunks[1].union( chunks[2] ) );
    } else {
        let titles: Vec<&str> = TABS.iter().map( |t| t.title() ).collect();
        tabs::draw( frame, chunks[1], &titles, app.tab.index() );
        draw_window( frame, app, chunks[2] );
    }

    help::draw_summary( frame, chunks[3] );
    draw_status_line( frame, app, chunks[4] );
}


fn draw_window( frame: &mut Frame, app: &mut App, area: Rect ) {
    let block = Block::default()
        .borders( Borders::LEFT | Borders::RIGHT | Borders::BOTTOM )
        .border_type( BorderType::Rounded )
        .border_style( Style::default().fg( Color::Magenta ) );
    let inner = block.inner( area );
    frame.render_widget( block, area );

    match app.tab {
        Tab::CurrentPlaylist => track_list::draw( frame, inner, &mut app.tracks ),
        Tab::Playlists => playlists::draw( frame, inner, &mut app.playlists ),
    }
}


fn draw_status_line( frame: &mut Frame, app: &App, area: Rect ) {
    let ( prefix, text, style ) = match app.input_mode {
        InputMode::Command => {
            ( ":", app.input_buffer.content().to_string(), Style::default().fg( Color::Yellow ) )
        }
        InputMode::Filter => {
            ( "Filter: ", app.input_buffer.content().to_string(), Style::default().fg( Color::Yellow ) )
        }
        InputMode::Normal => {
            let msg = app.status_message.clone().unwrap_or_default();
            ( "", msg, Style::default().fg( Color::Green ) )
        }
    };

    let status = Paragraph::new( format!( "{}{}", prefix, text ) ).style( style );
    frame.render_widget( status, area );

    // Show cursor while typing
    if app.input_mode != InputMode::Normal {
        let cursor_x = area.x + ( prefix.chars().count() + app.input_buffer.cursor_char_pos() ) as u16;
        frame.set_cursor_position(( cursor_x, area.y ));
    }
}


#[cfg( test )]
mod tests {
    use super::*;
    use crate::settings::Settings;
    use lazymusic_core::worker::request_channel;
    use lazymusic_core::{ PlayerEvent, Playlist, Track };
    use ratatui::backend::TestBackend;


    fn screen_text( terminal: &Terminal<TestBackend> ) -> String {
        let buffer = terminal.backend().buffer();
        let mut text = String::new();
        for y in 0..buffer.area.height {
            for x in 0..buffer.area.width {
                text.push_str( buffer[( x, y )].symbol() );
            }
            text.push( '\n' );
        }
        text
    }


    #[test]
    fn test_render_smoke() {
        let ( tx, _rx ) = request_channel();
        let mut app = App::new( Settings::default(), tx, ( 100, 30 ) );
        app.handle_event( PlayerEvent::TrackUpdated( Track {
            id: "A".into(),
            name: "Song".into(),
            artist: "Band".into(),
            time: "3:00".into(),
            duration: 180.0,
            ..Track::default()
        }));
        app.handle_event( PlayerEvent::PlaylistUpdated( Playlist::new( vec![ Track {
            id: "A".into(),
            name: "Song".into(),
            artist: "Band".into(),
            ..Track::default()
        }])));

        let mut terminal = Terminal::new( TestBackend::new( 100, 30 ) ).unwrap();
        terminal.draw( |frame| draw_ui( frame, &mut app ) ).unwrap();

        let text = screen_text( &terminal );
        assert!( text.contains( "Song - Band" ) );
        assert!( text.contains( "Current Playlist" ) );
        assert!( text.contains( "Playlists" ) );
        assert!( text.contains( "3:00" ) );
    }


    #[test]
    fn test_render_tiny_terminal() {
        let ( tx, _rx ) = request_channel();
        let mut app = App::new( Settings::default(), tx, ( 10, 4 ) );

        let mut terminal = Terminal::new( TestBackend::new( 10, 4 ) ).unwrap();
        terminal.draw( |frame| draw_ui( frame, &mut app ) ).unwrap();
    }
}
