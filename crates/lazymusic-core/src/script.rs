//! Script execution
//!
//! The bridge never talks to the player directly; it hands AppleScript
//! source to a [`ScriptRunner`]. The default runner shells out to
//! `osascript`.

use std::process::Command;

use crate::bridge::BridgeError;


/// Executes a script and returns its standard output.
pub trait ScriptRunner: Send + Sync {
    fn run( &self, script: &str ) -> Result<String, BridgeError>;
}


/// Runs scripts with `osascript -e`.
#[derive( Debug, Clone )]
pub struct OsascriptRunner {
    program: String,
}


impl OsascriptRunner {
    pub fn new() -> Self {
        Self { program: "osascript".to_string() }
    }


    /// Uses a different interpreter binary (e.g. an absolute path).
    pub fn with_program( program: impl Into<String> ) -> Self {
        Self { program: program.into() }
    }
}


impl Default for OsascriptRunner {
    fn default() -> Self {
        Self::new()
    }
}


impl ScriptRunner for OsascriptRunner {
    fn run( &self, script: &str ) -> Result<String, BridgeError> {
        let output = Command::new( &self.program )
            .arg( "-e" )
            .arg( script )
            .output()
            .map_err( BridgeError::Spawn )?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy( &output.stderr ).trim().to_string();
            tracing::debug!( "{} exited with {:?}: {}", self.program, output.status.code(), stderr );
            return Err( BridgeError::ScriptFailed {
                status: output.status.code(),
                stderr,
            });
        }

        Ok( String::from_utf8_lossy( &output.stdout ).into_owned() )
    }
}


#[cfg( test )]
mod tests {
    use super::*;


    #[test]
    fn test_missing_program_is_spawn_error() {
        let runner = OsascriptRunner::with_program( "/nonexistent/lazymusic-osascript" );
        let result = runner.run( "return 1" );
        assert!( matches!( result, Err( BridgeError::Spawn( _ ) ) ) );
    }
}
