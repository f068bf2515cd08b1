//! Nerd Font progress bar.

const FULL_LEFT: &str = "\u{ee03}";
const FULL_MID: &str = "\u{ee04}";
const FULL_RIGHT: &str = "\u{ee05}";
const EMPTY_LEFT: &str = "\u{ee00}";
const EMPTY_MID: &str = "\u{ee01}";
const EMPTY_RIGHT: &str = "\u{ee02}";


/// Renders `percent` (0-100) as a bar of `length` glyphs.
///
/// Bars shorter than two glyphs render as nothing.
pub fn progress_bar( percent: i64, length: usize ) -> String {
    if length < 2 {
        return String::new();
    }

    let filled = ( percent * length as i64 / 100 ).clamp( 0, length as i64 ) as usize;

    let head = if filled > 0 { FULL_LEFT } else { EMPTY_LEFT };
    let tail = if filled == length { FULL_RIGHT } else { EMPTY_RIGHT };

    let full_mid = filled.saturating_sub( 1 ).min( length - 2 );
    let empty_mid = length - 2 - full_mid;

    let mut bar = String::with_capacity( length * FULL_MID.len() );
    bar.push_str( head );
    bar.push_str( &FULL_MID.repeat( full_mid ) );
    bar.push_str( &EMPTY_MID.repeat( empty_mid ) );
    bar.push_str( tail );
    bar
}


#[cfg( test )]
mod tests {
    use super::*;


    fn glyphs( s: &str ) -> usize {
        s.chars().count()
    }


    #[test]
    fn test_too_short() {
        assert_eq!( progress_bar( 50, 1 ), "" );
        assert_eq!( progress_bar( 50, 0 ), "" );
    }


    #[test]
    fn test_empty_and_full() {
        let empty = progress_bar( 0, 5 );
        assert_eq!( empty, format!( "{}{}{}", EMPTY_LEFT, EMPTY_MID.repeat( 3 ), EMPTY_RIGHT ) );

        let full = progress_bar( 100, 5 );
        assert_eq!( full, format!( "{}{}{}", FULL_LEFT, FULL_MID.repeat( 3 ), FULL_RIGHT ) );
    }


    #[test]
    fn test_partial() {
        let bar = progress_bar( 50, 10 );
        assert_eq!( glyphs( &bar ), 10 );
        assert!( bar.starts_with( FULL_LEFT ) );
        assert!( bar.ends_with( EMPTY_RIGHT ) );
        assert_eq!( bar.matches( FULL_MID ).count(), 4 );
    }


    #[test]
    fn test_bar_is_always_full_length() {
        for length in 2..12 {
            for percent in 0..=100 {
                assert_eq!( glyphs( &progress_bar( percent, length ) ), length, "{}% of {}", percent, length );
            }
        }
    }


    #[test]
    fn test_out_of_range_is_clamped() {
        assert_eq!( progress_bar( 250, 6 ), progress_bar( 100, 6 ) );
        assert_eq!( progress_bar( -20, 6 ), progress_bar( 0, 6 ) );
    }
}
