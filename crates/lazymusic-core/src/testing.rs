//! Test doubles shared by the unit tests.

use std::collections::VecDeque;
use std::sync::Mutex;

use crate::bridge::BridgeError;
use crate::script::ScriptRunner;


/// Records every script and answers with queued replies.
///
/// Once the queue is empty every script succeeds with empty output.
#[derive( Default )]
pub struct FakeRunner {
    replies: Mutex<VecDeque<Result<String, i32>>>,
    scripts: Mutex<Vec<String>>,
}


impl FakeRunner {
    pub fn new() -> Self {
        Self::default()
    }


    /// Queues a successful reply.
    pub fn reply( self, output: &str ) -> Self {
        self.replies.lock().unwrap().push_back( Ok( output.to_string() ) );
        self
    }


    /// Queues a failure with the given exit status.
    pub fn fail( self, status: i32 ) -> Self {
        self.replies.lock().unwrap().push_back( Err( status ) );
        self
    }


    pub fn scripts( &self ) -> Vec<String> {
        self.scripts.lock().unwrap().clone()
    }
}


impl ScriptRunner for FakeRunner {
    fn run( &self, script: &str ) -> Result<String, BridgeError> {
        self.scripts.lock().unwrap().push( script.to_string() );
        match self.replies.lock().unwrap().pop_front() {
            Some( Ok( output ) ) => Ok( output ),
            Some( Err( status ) ) => Err( BridgeError::ScriptFailed {
                status: Some( status ),
                stderr: "execution error".to_string(),
            }),
            None => Ok( String::new() ),
        }
    }
}
