//! Background bridge worker
//!
//! Script calls block for tens to hundreds of milliseconds, so they run on
//! a dedicated thread with its own single-threaded tokio runtime. The UI
//! sends [`PlayerRequest`]s and drains [`PlayerEvent`]s once per frame.
//! Requests are executed one at a time, in order.

use std::sync::mpsc::{ self, Receiver, Sender };
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use tokio::sync::mpsc::{ unbounded_channel, UnboundedReceiver, UnboundedSender };
use tokio::time::MissedTickBehavior;

use crate::bridge::PlayerBridge;
use crate::event::{ PlayerEvent, PlayerRequest };


/// Default interval between refresh ticks.
pub const DEFAULT_REFRESH: Duration = Duration::from_secs( 5 );


/// Cloneable handle for sending requests to the worker.
#[derive( Debug, Clone )]
pub struct RequestSender( UnboundedSender<PlayerRequest> );


impl RequestSender {
    /// Queues a request. A stopped worker is logged and otherwise ignored.
    pub fn send( &self, request: PlayerRequest ) {
        if let Err( e ) = self.0.send( request ) {
            tracing::warn!( "Bridge worker is gone, dropping {:?}", e.0 );
        }
    }
}


/// Receiving end of a request channel.
pub type RequestReceiver = UnboundedReceiver<PlayerRequest>;


/// Creates a request channel not yet attached to a worker.
pub fn request_channel() -> ( RequestSender, RequestReceiver ) {
    let ( tx, rx ) = unbounded_channel();
    ( RequestSender( tx ), rx )
}


/// Runs one request against the bridge and converts the outcome to an event.
///
/// Plain commands that succeed produce no event.
pub fn execute( bridge: &dyn PlayerBridge, request: PlayerRequest ) -> Option<PlayerEvent> {
    let result = match request {
        PlayerRequest::PlayPause => bridge.play_pause().map( |_| None ),
        PlayerRequest::Play => bridge.play().map( |_| None ),
        PlayerRequest::Pause => bridge.pause().map( |_| None ),
        PlayerRequest::Next => bridge.next_track().map( |_| Some( PlayerEvent::TrackChanged ) ),
        PlayerRequest::Previous => bridge.previous_track().map( |_| Some( PlayerEvent::TrackChanged ) ),
        PlayerRequest::SetVolume( volume ) => bridge.set_volume( volume ).map( |_| None ),
        PlayerRequest::VolumeUp => bridge.increase_volume().map( |_| None ),
        PlayerRequest::VolumeDown => bridge.decrease_volume().map( |_| None ),
        PlayerRequest::PlayPlaylist( name ) => {
            bridge.play_playlist( &name ).map( |_| Some( PlayerEvent::TrackChanged ) )
        }
        PlayerRequest::PlayTrack( id ) => {
            bridge.play_track_by_id( &id ).map( |_| Some( PlayerEvent::TrackChanged ) )
        }
        PlayerRequest::FavoriteCurrent => {
            bridge.favorite_current_track().map( |id| Some( PlayerEvent::FavoriteToggled( id ) ) )
        }
        PlayerRequest::FavoriteTrack( id ) => {
            bridge.favorite_track_by_id( &id ).map( |_| Some( PlayerEvent::FavoriteToggled( id ) ) )
        }
        PlayerRequest::RefreshTrack => {
            bridge.current_track().map( |t| Some( PlayerEvent::TrackUpdated( t ) ) )
        }
        PlayerRequest::RefreshPosition => {
            bridge.player_position().map( |p| Some( PlayerEvent::PositionUpdated( p ) ) )
        }
        PlayerRequest::RefreshArtwork { cols, rows } => {
            bridge.current_artwork( cols, rows ).map( |a| Some( PlayerEvent::ArtworkUpdated( a ) ) )
        }
        PlayerRequest::RefreshPlaylist => {
            bridge.current_playlist().map( |p| Some( PlayerEvent::PlaylistUpdated( p ) ) )
        }
        PlayerRequest::RefreshPlaylists => {
            bridge.playlists().map( |p| Some( PlayerEvent::PlaylistsUpdated( p ) ) )
        }
        PlayerRequest::Shutdown => Ok( None ),
    };

    result.unwrap_or_else( |e| Some( PlayerEvent::Error( e.to_string() ) ) )
}


/// Handle to a running worker.
pub struct WorkerHandle {
    requests: RequestSender,
    events: Receiver<PlayerEvent>,
    thread: Option<thread::JoinHandle<()>>,
}


impl WorkerHandle {
    /// Sender for queuing requests.
    pub fn sender( &self ) -> RequestSender {
        self.requests.clone()
    }


    /// Returns the next pending event without blocking.
    pub fn try_recv( &self ) -> Option<PlayerEvent> {
        self.events.try_recv().ok()
    }


    /// Blocks up to `timeout` for the next event.
    pub fn recv_timeout( &self, timeout: Duration ) -> Option<PlayerEvent> {
        self.events.recv_timeout( timeout ).ok()
    }


    /// Stops the worker and waits for the current request to finish.
    pub fn shutdown( mut self ) {
        self.requests.send( PlayerRequest::Shutdown );
        if let Some( thread ) = self.thread.take() {
            if thread.join().is_err() {
                tracing::warn!( "Bridge worker panicked" );
            }
        }
    }
}


/// Spawns bridge workers.
pub struct BridgeWorker;


impl BridgeWorker {
    /// Starts a worker thread executing requests against `bridge` and
    /// emitting [`PlayerEvent::Tick`] every `refresh`.
    pub fn spawn( bridge: Arc<dyn PlayerBridge>, refresh: Duration ) -> std::io::Result<WorkerHandle> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()?;

        let ( requests, request_rx ) = request_channel();
        let ( event_tx, events ) = mpsc::channel();

        let thread = thread::Builder::new()
            .name( "lazymusic-bridge".to_string() )
            .spawn( move || {
                runtime.block_on( run( bridge, request_rx, event_tx, refresh ) );
                tracing::debug!( "Bridge worker stopped" );
            })?;

        Ok( WorkerHandle {
            requests,
            events,
            thread: Some( thread ),
        })
    }
}


async fn run(
    bridge: Arc<dyn PlayerBridge>,
    mut requests: RequestReceiver,
    events: Sender<PlayerEvent>,
    refresh: Duration,
) {
    let mut ticker = tokio::time::interval( refresh );
    ticker.set_missed_tick_behavior( MissedTickBehavior::Skip );
    // The first tick completes immediately.
    ticker.tick().await;

    loop {
        tokio::select! {
            request = requests.recv() => {
                let request = match request {
                    None | Some( PlayerRequest::Shutdown ) => break,
                    Some( request ) => request,
                };

                tracing::debug!( "Bridge request: {:?}", request );
                let bridge = Arc::clone( &bridge );
                let outcome = tokio::task::spawn_blocking( move || execute( bridge.as_ref(), request ) ).await;

                let event = match outcome {
                    Ok( event ) => event,
                    Err( e ) => Some( PlayerEvent::Error( format!( "Bridge task failed: {}", e ) ) ),
                };
                if let Some( event ) = event {
                    if events.send( event ).is_err() {
                        break;
                    }
                }
            }
            _ = ticker.tick() => {
                if events.send( PlayerEvent::Tick ).is_err() {
                    break;
                }
            }
        }
    }
}


#[cfg( test )]
mod tests {
    use super::*;
    use crate::bridge::AppleMusicBridge;
    use crate::testing::FakeRunner;


    #[test]
    fn test_execute_maps_results() {
        let runner = FakeRunner::new()
            .reply( "" )
            .reply( "ABC\n" )
            .reply( "name:Song, persistent ID:ABC" )
            .fail( 2 );
        let bridge = AppleMusicBridge::new( runner );

        assert_eq!( execute( &bridge, PlayerRequest::Next ), Some( PlayerEvent::TrackChanged ) );
        assert_eq!(
            execute( &bridge, PlayerRequest::FavoriteCurrent ),
            Some( PlayerEvent::FavoriteToggled( "ABC".to_string() ) )
        );
        match execute( &bridge, PlayerRequest::RefreshTrack ) {
            Some( PlayerEvent::TrackUpdated( track ) ) => assert_eq!( track.id, "ABC" ),
            other => panic!( "unexpected event {:?}", other ),
        }
        assert!( matches!( execute( &bridge, PlayerRequest::Pause ), Some( PlayerEvent::Error( _ ) ) ) );
    }


    #[test]
    fn test_execute_plain_commands_are_silent() {
        let bridge = AppleMusicBridge::new( FakeRunner::new() );
        assert_eq!( execute( &bridge, PlayerRequest::PlayPause ), None );
        assert_eq!( execute( &bridge, PlayerRequest::VolumeUp ), None );
        assert_eq!( execute( &bridge, PlayerRequest::Shutdown ), None );
    }


    #[test]
    fn test_execute_invalid_volume() {
        let bridge = AppleMusicBridge::new( FakeRunner::new() );
        assert!( matches!( execute( &bridge, PlayerRequest::SetVolume( 120 ) ), Some( PlayerEvent::Error( _ ) ) ) );
    }


    #[test]
    fn test_worker_round_trip() {
        let runner = FakeRunner::new().reply( "Library, Music\n" );
        let bridge: Arc<dyn PlayerBridge> = Arc::new( AppleMusicBridge::new( runner ) );
        let worker = BridgeWorker::spawn( bridge, Duration::from_secs( 3600 ) ).unwrap();

        worker.sender().send( PlayerRequest::RefreshPlaylists );
        let event = worker.recv_timeout( Duration::from_secs( 5 ) );
        assert_eq!(
            event,
            Some( PlayerEvent::PlaylistsUpdated( vec![ "Library".to_string(), "Music".to_string() ] ) )
        );

        worker.shutdown();
    }


    #[test]
    fn test_worker_ticks() {
        let bridge: Arc<dyn PlayerBridge> = Arc::new( AppleMusicBridge::new( FakeRunner::new() ) );
        let worker = BridgeWorker::spawn( bridge, Duration::from_millis( 20 ) ).unwrap();

        assert_eq!( worker.recv_timeout( Duration::from_secs( 5 ) ), Some( PlayerEvent::Tick ) );
        worker.shutdown();
    }


    #[test]
    fn test_dropped_senders_stop_the_loop() {
        let bridge: Arc<dyn PlayerBridge> = Arc::new( AppleMusicBridge::new( FakeRunner::new() ) );
        let ( sender, request_rx ) = request_channel();
        let ( event_tx, _events ) = mpsc::channel();
        let ( done_tx, done_rx ) = mpsc::channel();

        let thread = thread::spawn( move || {
            let runtime = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
                .unwrap();
            runtime.block_on( run( bridge, request_rx, event_tx, Duration::from_secs( 3600 ) ) );
            done_tx.send( () ).unwrap();
        });

        drop( sender );
        assert!( done_rx.recv_timeout( Duration::from_secs( 5 ) ).is_ok() );
        thread.join().unwrap();
    }


    #[test]
    fn test_send_after_shutdown_is_ignored() {
        let ( sender, rx ) = request_channel();
        drop( rx );
        sender.send( PlayerRequest::Play );
    }
}
