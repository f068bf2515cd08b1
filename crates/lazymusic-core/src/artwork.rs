//! Album art as terminal cells
//!
//! Each terminal cell shows two vertically stacked pixels using the upper
//! half block: the foreground colour paints the top pixel and the
//! background colour the bottom one.

use std::path::Path;

use image::imageops::FilterType;
use image::{ DynamicImage, ImageReader };

use crate::bridge::BridgeError;


/// Glyph used to draw every cell.
pub const HALF_BLOCK: &str = "▀";


/// 24-bit colour.
#[derive( Debug, Clone, Copy, PartialEq, Eq, Default )]
pub struct Rgb( pub u8, pub u8, pub u8 );


/// One terminal cell of artwork.
#[derive( Debug, Clone, Copy, PartialEq, Eq, Default )]
pub struct Cell {
    pub top: Rgb,
    pub bottom: Rgb,
}


/// Rendered artwork, row-major.
#[derive( Debug, Clone, PartialEq )]
pub struct Artwork {
    cols: u16,
    rows: u16,
    cells: Vec<Cell>,
}


impl Artwork {
    /// Decodes an image file and renders it to `cols` x `rows` cells.
    ///
    /// The format is detected from the file contents; the player writes
    /// PNG and JPEG covers to the same path.
    pub fn from_path( path: &Path, cols: u16, rows: u16 ) -> Result<Self, BridgeError> {
        let fail = |e: &dyn std::fmt::Display| BridgeError::Artwork( format!( "{}: {}", path.display(), e ) );

        let image = ImageReader::open( path )
            .and_then( |reader| reader.with_guessed_format() )
            .map_err( |e| fail( &e ) )?
            .decode()
            .map_err( |e| fail( &e ) )?;
        Self::from_image( &image, cols, rows )
    }


    /// Renders a decoded image to `cols` x `rows` cells.
    ///
    /// The image is stretched to exactly `cols` x `rows * 2` pixels.
    pub fn from_image( image: &DynamicImage, cols: u16, rows: u16 ) -> Result<Self, BridgeError> {
        if cols == 0 || rows == 0 {
            return Err( BridgeError::Artwork( format!( "cannot render into {}x{} cells", cols, rows ) ) );
        }

        let resized = image
            .resize_exact( cols as u32, rows as u32 * 2, FilterType::Triangle )
            .to_rgb8();

        let pixel = |x: u32, y: u32| {
            let p = resized.get_pixel( x, y );
            Rgb( p[ 0 ], p[ 1 ], p[ 2 ] )
        };

        let mut cells = Vec::with_capacity( cols as usize * rows as usize );
        for row in 0..rows as u32 {
            for col in 0..cols as u32 {
                cells.push( Cell {
                    top: pixel( col, row * 2 ),
                    bottom: pixel( col, row * 2 + 1 ),
                });
            }
        }

        Ok( Self { cols, rows, cells } )
    }


    /// Builds artwork from row-major cells. Trailing cells that do not fill
    /// a whole row are dropped.
    pub fn from_cells( cols: u16, mut cells: Vec<Cell> ) -> Self {
        let rows = if cols == 0 { 0 } else { ( cells.len() / cols as usize ) as u16 };
        cells.truncate( cols as usize * rows as usize );
        Self { cols, rows, cells }
    }


    pub fn cols( &self ) -> u16 {
        self.cols
    }


    pub fn rows( &self ) -> u16 {
        self.rows
    }


    /// Cells of one row, left to right.
    pub fn row( &self, index: u16 ) -> &[Cell] {
        let start = index as usize * self.cols as usize;
        self.cells.get( start..start + self.cols as usize ).unwrap_or( &[] )
    }


    /// Iterates over rows.
    pub fn lines( &self ) -> impl Iterator<Item = &[Cell]> {
        // `chunks` rejects a zero size; zero-width art has no rows.
        self.cells.chunks( ( self.cols as usize ).max( 1 ) ).take( self.rows as usize )
    }
}


/// Cell geometry for a cover drawn in a panel `height` rows tall.
///
/// Terminal cells are roughly twice as tall as wide, so the cover uses
/// twice as many columns as rows to look square.
pub fn artwork_size( height: u16 ) -> ( u16, u16 ) {
    let rows = ( height as f32 / 2.5 ) as u16;
    ( rows * 2, rows )
}


#[cfg( test )]
mod tests {
    use super::*;
    use image::{ Rgb as Pixel, RgbImage };


    #[test]
    fn test_split_colours_into_half_blocks() {
        // Top half red, bottom half blue.
        let mut img = RgbImage::new( 2, 4 );
        for ( _, y, p ) in img.enumerate_pixels_mut() {
            *p = if y < 2 { Pixel([ 255, 0, 0 ]) } else { Pixel([ 0, 0, 255 ]) };
        }

        let art = Artwork::from_image( &DynamicImage::ImageRgb8( img ), 2, 2 ).unwrap();
        assert_eq!( art.lines().count(), 2 );
        assert_eq!( art.row( 0 )[ 0 ], Cell { top: Rgb( 255, 0, 0 ), bottom: Rgb( 255, 0, 0 ) } );
        assert_eq!( art.row( 1 )[ 1 ], Cell { top: Rgb( 0, 0, 255 ), bottom: Rgb( 0, 0, 255 ) } );
        assert!( art.row( 2 ).is_empty() );
    }


    #[test]
    fn test_zero_size_rejected() {
        let img = DynamicImage::ImageRgb8( RgbImage::new( 4, 4 ) );
        assert!( matches!( Artwork::from_image( &img, 0, 3 ), Err( BridgeError::Artwork( _ ) ) ) );
    }


    #[test]
    fn test_unreadable_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join( "cover.jpg" );
        std::fs::write( &path, b"not an image" ).unwrap();
        assert!( Artwork::from_path( &path, 4, 2 ).is_err() );
    }


    #[test]
    fn test_format_detected_from_contents() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join( "cover.jpg" );
        RgbImage::from_pixel( 8, 8, Pixel([ 10, 200, 10 ]) )
            .save_with_format( &path, image::ImageFormat::Png )
            .unwrap();

        let art = Artwork::from_path( &path, 4, 2 ).unwrap();
        assert_eq!( ( art.cols(), art.rows() ), ( 4, 2 ) );
        let Rgb( r, g, _ ) = art.row( 1 )[ 3 ].bottom;
        assert!( g > 150 && r < 50 );
    }


    #[test]
    fn test_zero_width_has_no_lines() {
        let art = Artwork::from_cells( 0, vec![ Cell::default(); 3 ] );
        assert_eq!( art.lines().count(), 0 );
        assert!( art.row( 0 ).is_empty() );
    }


    #[test]
    fn test_from_cells_drops_partial_row() {
        let art = Artwork::from_cells( 3, vec![ Cell::default(); 7 ] );
        assert_eq!( art.rows(), 2 );
        assert_eq!( art.lines().count(), 2 );
        assert_eq!( Artwork::from_cells( 0, vec![ Cell::default() ] ).rows(), 0 );
    }


    #[test]
    fn test_artwork_size() {
        assert_eq!( artwork_size( 40 ), ( 32, 16 ) );
        assert_eq!( artwork_size( 2 ), ( 0, 0 ) );
    }
}
