//! lazymusic CLI - Terminal remote control for the desktop Music app

mod app;
mod cli;
mod input;
mod settings;
mod ui;
mod view;
mod widgets;

use std::fs::OpenOptions;
use std::io;
use std::path::PathBuf;
use std::sync::{ Arc, Mutex };
use std::time::Duration;

use anyhow::{ Context, Result };
use clap::Parser;
use crossterm::{
    event::{ self, Event, KeyEventKind },
    terminal::{ self as term, disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen },
    ExecutableCommand,
};
use ratatui::prelude::*;
use tracing_subscriber::EnvFilter;

use lazymusic_core::{ AppleMusicBridge, BridgeWorker, OsascriptRunner, WorkerHandle };

use app::App;
use cli::Args;
use settings::Settings;


/// Environment variable naming a debug log file.
const LOG_ENV: &str = "LAZYMUSIC_LOG";


/// Installs a file logger when a log path is given.
///
/// The terminal belongs to the UI, so without a log file nothing is
/// logged at all.
fn init_tracing( path: Option<PathBuf> ) -> Result<()> {
    let Some( path ) = path.or_else( || std::env::var_os( LOG_ENV ).map( PathBuf::from ) ) else {
        return Ok(());
    };

    let file = OpenOptions::new()
        .create( true )
        .append( true )
        .open( &path )
        .with_context( || format!( "Failed to open log file {}", path.display() ) )?;

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else( |_| EnvFilter::new( "debug" ) );

    tracing_subscriber::fmt()
        .with_env_filter( env_filter )
        .with_writer( Mutex::new( file ) )
        .with_ansi( false )
        .try_init()
        .map_err( |e| anyhow::anyhow!( "Failed to install logger: {}", e ) )?;

    Ok(())
}


fn start_worker( settings: &Settings ) -> Result<WorkerHandle> {
    let mut bridge = AppleMusicBridge::new( OsascriptRunner::new() )
        .with_app_name( settings.app_name.clone() )
        .with_volume_step( settings.volume_step );
    if let Some( ref path ) = settings.artwork_path {
        bridge = bridge.with_artwork_path( path.clone() );
    }

    tracing::info!( "Controlling {} every {:?}", bridge.app_name(), settings.refresh_interval() );

    BridgeWorker::spawn( Arc::new( bridge ), settings.refresh_interval() )
        .context( "Failed to start bridge worker" )
}


fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing( args.log.clone() )?;

    let mut settings = Settings::load();
    let saved = settings.clone();
    settings.apply_args( &args );

    let worker = start_worker( &settings )?;

    // Setup terminal
    enable_raw_mode()?;
    io::stdout().execute( EnterAlternateScreen )?;

    let result = run( settings, &worker );

    // Cleanup
    disable_raw_mode()?;
    io::stdout().execute( LeaveAlternateScreen )?;
    worker.shutdown();

    let app = result?;
    if app.settings_changed() {
        // Only the UI toggle is persisted, not one-off CLI overrides.
        let mut to_save = saved;
        to_save.show_artwork = app.settings().show_artwork;
        to_save.save();
    }

    Ok(())
}


fn run( settings: Settings, worker: &WorkerHandle ) -> Result<App> {
    let mut terminal = Terminal::new( CrosstermBackend::new( io::stdout() ) )?;
    let size = term::size()?;

    let mut app = App::new( settings, worker.sender(), size );
    app.start();

    // Main loop
    loop {
        while let Some( event ) = worker.try_recv() {
            app.handle_event( event );
        }

        app.tick();

        terminal.draw( |frame| ui::draw_ui( frame, &mut app ) )?;

        if event::poll( Duration::from_millis( 100 ) )? {
            match event::read()? {
                Event::Key( key ) if key.kind == KeyEventKind::Press => {
                    app.handle_key( key.code, key.modifiers );
                }
                Event::Resize( width, height ) => {
                    app.resize( width, height );
                }
                _ => {}
            }
        }

        if app.should_quit {
            break;
        }
    }

    Ok( app )
}
