//! Key summary bar and full help view.

use lazymusic_core::command;
use ratatui::{
    prelude::*,
    widgets::{ Block, BorderType, Borders, Paragraph, Wrap },
};


/// One-line key summary shown under the tab window.
pub const KEY_SUMMARY: &str = "p: play/pause, n: next, b: previous, u: volume up, d: volume down, \
    h/l: list page, j/k: list cursor, s: select current, f: favorite selected, \
    F: favorite current, g: play selected, /: filter, </>: switch list, \
    a: artwork, r: refresh, :: command, ?: help, q: quit";


/// Rows the summary needs when wrapped to `width`.
///
/// Counts whole words per line the same way word wrapping does.
pub fn summary_height( width: u16 ) -> u16 {
    let width = width as usize;
    if width == 0 {
        return 1;
    }

    let mut rows = 1;
    let mut used = 0;
    for word in KEY_SUMMARY.split_whitespace() {
        let len = word.chars().count();
        let needed = if used == 0 { len } else { used + 1 + len };
        if needed <= width {
            used = needed;
        } else {
            rows += 1;
            used = len.min( width );
        }
    }
    rows
}


pub fn draw_summary( frame: &mut Frame, area: Rect ) {
    let bar = Paragraph::new( KEY_SUMMARY )
        .style( Style::default().fg( Color::DarkGray ) )
        .alignment( Alignment::Center )
        .wrap( Wrap { trim: true } );
    frame.render_widget( bar, area );
}


/// Draws the full command and key reference over `area`.
pub fn draw_full( frame: &mut Frame, area: Rect ) {
    let help = Paragraph::new( command::help_text() )
        .block( Block::default()
            .title( " Help (? or Esc to close) " )
            .borders( Borders::ALL )
            .border_type( BorderType::Rounded )
        )
        .wrap( Wrap { trim: false } );

    frame.render_widget( help, area );
}


#[cfg( test )]
mod tests {
    use super::*;


    #[test]
    fn test_summary_height() {
        assert_eq!( summary_height( 1000 ), 1 );
        assert!( summary_height( 80 ) > 1 );
        assert!( summary_height( 40 ) > summary_height( 80 ) );
        assert_eq!( summary_height( 0 ), 1 );
    }
}
