//! Input mode handling for the TUI.
//!
//! Manages the current input mode (Normal, Command, Filter) and
//! provides an input buffer for text entry.


/// Current input mode of the application.
#[derive( Debug, Clone, Copy, PartialEq, Eq, Default )]
pub enum InputMode {
    /// Normal mode - keyboard shortcuts active.
    #[default]
    Normal,

    /// Command mode - typing a `:` command.
    Command,

    /// Filter mode - typing a track list filter.
    Filter,
}


/// Input buffer for command/filter text entry.
#[derive( Debug, Default )]
pub struct InputBuffer {
    content: String,
    cursor: usize,
}


impl InputBuffer {
    /// Creates a new empty input buffer.
    pub fn new() -> Self {
        Self::default()
    }


    /// Inserts a character at the cursor position.
    pub fn insert( &mut self, c: char ) {
        self.content.insert( self.cursor, c );
        self.cursor += c.len_utf8();
    }


    /// Deletes the character before the cursor.
    pub fn backspace( &mut self ) {
        if self.cursor > 0 {
            let prev_char_boundary = self.content[ ..self.cursor ]
                .char_indices()
                .last()
                .map( |( i, _ )| i )
                .unwrap_or( 0 );
            self.content.remove( prev_char_boundary );
            self.cursor = prev_char_boundary;
        }
    }


    /// Clears the buffer.
    pub fn clear( &mut self ) {
        self.content.clear();
        self.cursor = 0;
    }


    /// Gets the current content.
    pub fn content( &self ) -> &str {
        &self.content
    }


    /// Gets the cursor position as character count (for display).
    pub fn cursor_char_pos( &self ) -> usize {
        self.content[ ..self.cursor ].chars().count()
    }


    /// Moves cursor left by one character.
    pub fn move_left( &mut self ) {
        if self.cursor > 0 {
            self.cursor = self.content[ ..self.cursor ]
                .char_indices()
                .last()
                .map( |( i, _ )| i )
                .unwrap_or( 0 );
        }
    }


    /// Moves cursor right by one character.
    pub fn move_right( &mut self ) {
        if self.cursor < self.content.len() {
            self.cursor = self.content[ self.cursor.. ]
                .char_indices()
                .nth( 1 )
                .map( |( i, _ )| self.cursor + i )
                .unwrap_or( self.content.len() );
        }
    }


    /// Returns true if the buffer is empty.
    pub fn is_empty( &self ) -> bool {
        self.content.is_empty()
    }
}


#[cfg( test )]
mod tests {
    use super::*;


    #[test]
    fn test_edit_multibyte() {
        let mut buf = InputBuffer::new();
        for c in "añb".chars() {
            buf.insert( c );
        }
        assert_eq!( buf.cursor_char_pos(), 3 );

        buf.move_left();
        buf.backspace();
        assert_eq!( buf.content(), "ab" );
        assert_eq!( buf.cursor_char_pos(), 1 );

        buf.move_right();
        buf.insert( 'c' );
        assert_eq!( buf.content(), "abc" );

        buf.clear();
        assert!( buf.is_empty() );
    }
}
