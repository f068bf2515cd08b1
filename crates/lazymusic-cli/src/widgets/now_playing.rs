//! Now-playing panel: album art, progress bar and track line.

use std::time::{ Duration, Instant };

use lazymusic_core::artwork::HALF_BLOCK;
use lazymusic_core::{ Artwork, Rgb, Track };
use ratatui::{
    prelude::*,
    widgets::{ Block, BorderType, Borders, Paragraph },
};

use super::progress::progress_bar;


/// Shown until the first artwork fetch completes.
const ARTWORK_PLACEHOLDER: &str = "\u{f0383}";


/// Album art state.
#[derive( Debug, Clone, PartialEq, Default )]
pub enum ArtworkState {
    #[default]
    Pending,
    Missing,
    Loaded( Artwork ),
}


/// Now-playing state with a local per-second countdown.
#[derive( Debug, Default )]
pub struct NowPlaying {
    track: Track,
    artwork: ArtworkState,
    /// Remaining seconds at `anchor`.
    remaining_at_anchor: u32,
    anchor: Option<Instant>,
    remaining: u32,
}


impl NowPlaying {
    pub fn new() -> Self {
        Self::default()
    }


    pub fn track( &self ) -> &Track {
        &self.track
    }


    /// Replaces the track.
    ///
    /// @returns true if the persistent ID changed
    pub fn set_track( &mut self, track: Track ) -> bool {
        let changed = track.id != self.track.id;
        self.track = track;
        if changed {
            self.set_position_at( 0, Instant::now() );
        }
        changed
    }


    pub fn set_artwork( &mut self, artwork: Option<Artwork> ) {
        self.artwork = match artwork {
            Some( art ) => ArtworkState::Loaded( art ),
            None => ArtworkState::Missing,
        };
    }


    #[cfg( test )]
    pub fn artwork( &self ) -> &ArtworkState {
        &self.artwork
    }


    /// Restarts the countdown from the player position.
    pub fn set_position( &mut self, position: u32 ) {
        self.set_position_at( position, Instant::now() );
    }


    pub fn set_position_at( &mut self, position: u32, now: Instant ) {
        let duration = self.track.duration.max( 0.0 ) as u32;
        self.remaining_at_anchor = duration.saturating_sub( position );
        self.remaining = self.remaining_at_anchor;
        self.anchor = Some( now );
    }


    /// Advances the countdown. Stops at zero.
    pub fn tick_at( &mut self, now: Instant ) {
        if let Some( anchor ) = self.anchor {
            let elapsed = now.saturating_duration_since( anchor ).as_secs();
            self.remaining = self.remaining_at_anchor.saturating_sub( elapsed.min( u32::MAX as u64 ) as u32 );
        }
    }


    /// Flips the favorite flag if `id` is the current track.
    pub fn toggle_favorite( &mut self, id: &str ) -> bool {
        if self.track.is_real() && self.track.id == id {
            self.track.favorited = !self.track.favorited;
            true
        } else {
            false
        }
    }


    /// Remaining time of the current track.
    pub fn remaining( &self ) -> Duration {
        Duration::from_secs( self.remaining as u64 )
    }


    /// Played share of the track, 0-100.
    pub fn percent( &self ) -> i64 {
        let duration = self.track.duration;
        if duration <= 0.0 {
            return 0;
        }
        ( ( duration - self.remaining as f64 ) * 100.0 / duration ) as i64
    }


    /// Rows needed inside the borders.
    pub fn content_height( &self, show_artwork: bool ) -> u16 {
        let art_rows = match ( &self.artwork, show_artwork ) {
            ( ArtworkState::Loaded( art ), true ) => art.rows(),
            ( _, true ) => 1,
            ( _, false ) => 0,
        };
        art_rows + 2
    }


    /// "Name - Artist (fav)  remaining / time".
    pub fn status_line( &self ) -> String {
        format!(
            "{} ({})  {} / {}",
            self.track.label(),
            self.track.favorite_icon(),
            format_time( self.remaining() ),
            self.track.time,
        )
    }
}


/// Formats a duration as M:SS.
pub fn format_time( d: Duration ) -> String {
    let secs = d.as_secs();
    format!( "{}:{:02}", secs / 60, secs % 60 )
}


fn color( rgb: Rgb ) -> Color {
    Color::Rgb( rgb.0, rgb.1, rgb.2 )
}


fn artwork_lines( art: &Artwork ) -> Vec<Line<'static>> {
    art.lines()
        .map( |row| {
            Line::from(
                row.iter()
                    .map( |cell| Span::styled(
                        HALF_BLOCK,
                        Style::default().fg( color( cell.top ) ).bg( color( cell.bottom ) ),
                    ))
                    .collect::<Vec<_>>()
            )
        })
        .collect()
}


/// Draws the panel.
pub fn draw( frame: &mut Frame, area: Rect, state: &NowPlaying, show_artwork: bool ) {
    let mut lines = Vec::new();

    if show_artwork {
        match &state.artwork {
            ArtworkState::Loaded( art ) => lines.extend( artwork_lines( art ) ),
            ArtworkState::Pending => lines.push( Line::from( ARTWORK_PLACEHOLDER ) ),
            ArtworkState::Missing => lines.push( Line::from( "No Artwork" ).style( Style::default().fg( Color::DarkGray ) ) ),
        }
    }

    let bar_len = ( area.width.saturating_sub( 2 ) as f32 * 0.8 ) as usize;
    lines.push( Line::from( progress_bar( state.percent(), bar_len ) ).style( Style::default().fg( Color::Magenta ) ) );
    lines.push( Line::from( Span::styled( state.status_line(), Style::default().bold() ) ) );

    let panel = Paragraph::new( lines )
        .alignment( Alignment::Center )
        .block( Block::default()
            .borders( Borders::ALL )
            .border_type( BorderType::Rounded )
        );

    frame.render_widget( panel, area );
}


#[cfg( test )]
mod tests {
    use super::*;
    use lazymusic_core::Cell;


    fn track( id: &str, duration: f64 ) -> Track {
        Track {
            id: id.to_string(),
            name: "Song".to_string(),
            artist: "Band".to_string(),
            time: "3:20".to_string(),
            duration,
            ..Track::default()
        }
    }


    #[test]
    fn test_countdown() {
        let mut np = NowPlaying::new();
        np.set_track( track( "A", 200.0 ) );

        let start = Instant::now();
        np.set_position_at( 50, start );
        assert_eq!( np.remaining(), Duration::from_secs( 150 ) );
        assert_eq!( np.percent(), 25 );

        np.tick_at( start + Duration::from_secs( 10 ) );
        assert_eq!( np.remaining(), Duration::from_secs( 140 ) );

        np.tick_at( start + Duration::from_secs( 500 ) );
        assert_eq!( np.remaining(), Duration::ZERO );
        assert_eq!( np.percent(), 100 );
    }


    #[test]
    fn test_set_track_reports_change() {
        let mut np = NowPlaying::new();
        assert!( np.set_track( track( "A", 10.0 ) ) );
        assert!( !np.set_track( track( "A", 10.0 ) ) );
        assert!( np.set_track( track( "B", 10.0 ) ) );
    }


    #[test]
    fn test_toggle_favorite_matches_id() {
        let mut np = NowPlaying::new();
        np.set_track( track( "A", 10.0 ) );
        assert!( !np.toggle_favorite( "B" ) );
        assert!( np.toggle_favorite( "A" ) );
        assert!( np.track().favorited );
    }


    #[test]
    fn test_status_line_and_zero_duration() {
        let mut np = NowPlaying::new();
        np.set_track( Track::placeholder( "No Track Playing" ) );
        assert_eq!( np.percent(), 0 );

        np.set_track( track( "A", 200.0 ) );
        np.set_position_at( 65, Instant::now() );
        assert!( np.status_line().starts_with( "Song - Band (" ) );
        assert!( np.status_line().ends_with( "2:15 / 3:20" ) );
    }


    #[test]
    fn test_content_height() {
        let mut np = NowPlaying::new();
        assert_eq!( np.content_height( false ), 2 );
        assert_eq!( np.content_height( true ), 3 );

        np.set_artwork( None );
        assert_eq!( np.artwork(), &ArtworkState::Missing );
        assert_eq!( np.content_height( true ), 3 );

        np.set_artwork( Some( Artwork::from_cells( 8, vec![ Cell::default(); 32 ] ) ) );
        assert_eq!( np.content_height( true ), 6 );
        assert_eq!( np.content_height( false ), 2 );
    }
}
