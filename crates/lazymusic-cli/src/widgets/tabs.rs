//! Tab strip with horizontal windowing.
//!
//! Each tab is a three-row rounded box. When the tabs do not fit the
//! available width only a window of them is shown, always including the
//! active tab.

use ratatui::{
    prelude::*,
    widgets::Paragraph,
};


/// Height of the tab strip in rows.
pub const TAB_STRIP_HEIGHT: u16 = 3;


/// Rendered width of a tab: borders plus one column of padding each side.
pub fn tab_width( title: &str ) -> usize {
    title.chars().count() + 4
}


fn fit_from( widths: &[usize], start: usize, available: usize ) -> usize {
    let mut end = start;
    let mut used = 0;
    while end < widths.len() && used + widths[ end ] <= available {
        used += widths[ end ];
        end += 1;
    }
    end
}


/// Computes the visible window `[start, end)` of tabs.
///
/// Tabs are packed from the first one. If the active tab falls outside,
/// the window starts at the active tab and is pushed left as long as the
/// active tab still fits.
pub fn visible_tab_range( widths: &[usize], available: usize, active: usize ) -> ( usize, usize ) {
    let end = fit_from( widths, 0, available );
    if active < end {
        return ( 0, end );
    }

    let mut start = active.min( widths.len().saturating_sub( 1 ) );
    while start > 0 {
        let candidate = start - 1;
        if active >= fit_from( widths, candidate, available ) {
            break;
        }
        start = candidate;
    }

    ( start, fit_from( widths, start, available ) )
}


/// Builds the three text rows of the tab strip for `width` columns.
pub fn tab_strip_lines( titles: &[&str], active: usize, width: usize ) -> [ String; 3 ] {
    if titles.is_empty() {
        return [ "No tabs available".to_string(), String::new(), String::new() ];
    }

    let widths: Vec<usize> = titles.iter().map( |t| tab_width( t ) ).collect();
    let ( start, end ) = visible_tab_range( &widths, width, active );
    let pad = width.saturating_sub( widths[ start..end ].iter().sum() );

    let mut rows = [ String::new(), String::new(), String::new() ];
    for i in start..end {
        let inner = widths[ i ] - 2;
        let is_active = i == active;

        rows[ 0 ].push( '╭' );
        rows[ 0 ].push_str( &"─".repeat( inner ) );
        rows[ 0 ].push( '╮' );

        rows[ 1 ].push_str( &format!( "│ {} │", titles[ i ] ) );

        let ( mut left, fill, mut right ) = if is_active {
            ( '┘', ' ', '└' )
        } else {
            ( '┴', '─', '┴' )
        };
        if i == start {
            left = if is_active { '│' } else { '├' };
        }
        if i + 1 == end {
            right = if is_active {
                '└'
            } else if pad > 0 {
                '┴'
            } else {
                '┤'
            };
        }
        rows[ 2 ].push( left );
        rows[ 2 ].extend( std::iter::repeat( fill ).take( inner ) );
        rows[ 2 ].push( right );
    }

    if pad > 0 {
        rows[ 0 ].push_str( &" ".repeat( pad ) );
        rows[ 1 ].push_str( &" ".repeat( pad ) );
        rows[ 2 ].push_str( &"─".repeat( pad - 1 ) );
        rows[ 2 ].push( '┐' );
    }

    rows
}


/// Draws the tab strip.
pub fn draw( frame: &mut Frame, area: Rect, titles: &[&str], active: usize ) {
    let rows = tab_strip_lines( titles, active, area.width as usize );
    let lines: Vec<Line> = rows.into_iter().map( Line::from ).collect();
    frame.render_widget( Paragraph::new( lines ).style( Style::default().fg( Color::Magenta ) ), area );
}


#[cfg( test )]
mod tests {
    use super::*;


    #[test]
    fn test_all_tabs_fit() {
        assert_eq!( visible_tab_range( &[ 10, 10, 10 ], 40, 2 ), ( 0, 3 ) );
    }


    #[test]
    fn test_active_tab_outside_window() {
        // Only two tabs fit at once; the last tab pulls the window right.
        assert_eq!( visible_tab_range( &[ 10, 10, 10, 10 ], 25, 3 ), ( 2, 4 ) );
        assert_eq!( visible_tab_range( &[ 10, 10, 10, 10 ], 25, 2 ), ( 1, 3 ) );
        assert_eq!( visible_tab_range( &[ 10, 10, 10, 10 ], 25, 1 ), ( 0, 2 ) );
    }


    #[test]
    fn test_active_tab_wider_than_window() {
        assert_eq!( visible_tab_range( &[ 10, 50 ], 20, 1 ), ( 1, 1 ) );
    }


    #[test]
    fn test_strip_rows_fill_width() {
        let rows = tab_strip_lines( &[ "One", "Two" ], 0, 30 );
        for row in &rows {
            assert_eq!( row.chars().count(), 30 );
        }
        assert!( rows[ 1 ].starts_with( "│ One ││ Two │" ) );
        assert!( rows[ 2 ].starts_with( "│     └┴─────┴" ) );
        assert!( rows[ 2 ].ends_with( '┐' ) );
    }


    #[test]
    fn test_strip_exact_fit() {
        let rows = tab_strip_lines( &[ "One", "Two" ], 1, 14 );
        assert_eq!( rows[ 2 ], "├─────┴┘     └" );
    }


    #[test]
    fn test_no_tabs() {
        assert_eq!( tab_strip_lines( &[], 0, 20 )[ 0 ], "No tabs available" );
    }
}
