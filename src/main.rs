use std::fs::OpenOptions;
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Instant;

use chrono::Local;
use clap::Parser;
use tracing::{error, info, Level};
use tracing_subscriber::EnvFilter;

use channelsurf::app::AppState;
use channelsurf::cli::Args;
use channelsurf::error::Result;
use channelsurf::playback::RodioBackend;
use channelsurf::schedule::TimeOfDay;
use channelsurf::session::Session;
use channelsurf::store::Store;
use channelsurf::tasks::{Channels, Worker, WorkerConfig, WorkerEvent};
use channelsurf::tui::TuiApp;

/// Log file inside the data directory (the terminal belongs to the TUI)
const LOG_FILE: &str = "channelsurf.log";

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let data_dir = args.data_dir();

    // Initialize tracing (to file if TUI is enabled)
    let log_file = args.command.is_none().then(|| data_dir.join(LOG_FILE));
    init_tracing(args.verbose, log_file.as_deref());

    info!("channelsurf v{} starting", env!("CARGO_PKG_VERSION"));

    let store = Arc::new(Store::open(&data_dir));

    if let Some(command) = &args.command {
        let mut stdout = std::io::stdout().lock();
        return command.execute(&store, &mut stdout);
    }

    // Create shared application state
    let state = AppState::new();

    // Set up graceful shutdown
    let shutdown_state = Arc::clone(&state);
    tokio::spawn(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to listen for Ctrl-C: {}", e);
            return;
        }
        info!("Received Ctrl-C, shutting down...");
        shutdown_state.quit();
    });

    // Run the application
    if let Err(e) = run(state, store, args).await {
        error!("Application error: {}", e);
        return Err(e);
    }

    info!("channelsurf shutdown complete");
    Ok(())
}

/// Initialize tracing subscriber
fn init_tracing(verbose: bool, log_file: Option<&Path>) {
    let level = if verbose { Level::DEBUG } else { Level::INFO };

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level.to_string()));

    let file = log_file.and_then(|path| {
        if let Some(dir) = path.parent() {
            let _ = std::fs::create_dir_all(dir);
        }
        OpenOptions::new().create(true).append(true).open(path).ok()
    });

    match file {
        Some(file) => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .with_thread_ids(false)
            .with_ansi(false)
            .with_writer(Mutex::new(file))
            .compact()
            .init(),
        None => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .with_thread_ids(false)
            .with_writer(std::io::stderr)
            .compact()
            .init(),
    }
}

/// Main application loop
async fn run(state: Arc<AppState>, store: Arc<Store>, args: Args) -> Result<()> {
    let period = TimeOfDay::classify(&Local::now());
    info!(
        start_channel = args.start_channel,
        device = ?args.device,
        %period,
        "Starting session"
    );

    let mut session = Session::new(
        store,
        RodioBackend::new(args.device),
        args.start_channel,
        period,
    );

    // Set up channels for task communication
    let channels = Channels::new();
    let (cmd_tx, cmd_rx, event_tx, mut event_rx) = channels.split();

    // Start worker task
    let worker_config = WorkerConfig {
        hub_command: args.hub_command.clone(),
        ..WorkerConfig::default()
    };
    let worker = Worker::new(worker_config, Arc::clone(&state), period, cmd_rx, event_tx);
    tokio::spawn(async move {
        worker.run().await;
    });

    // Initialize TUI
    let show_controls = session.system().show_controls_on_start;
    let mut tui = TuiApp::new(Arc::clone(&state), cmd_tx, show_controls)?;

    session.start().await;
    info!("TUI started - press 'q' to quit");

    // Main event loop
    loop {
        // Handle TUI input
        let should_quit = tui.handle_input(&mut session).await?;
        if should_quit || state.is_quitting() {
            break;
        }

        // Process worker events
        while let Ok(event) = event_rx.try_recv() {
            match event {
                WorkerEvent::PeriodChanged(period) => {
                    session.set_period(period);
                }
                WorkerEvent::HubLaunched(system) => {
                    tui.set_status(format!("{} running", system));
                }
                WorkerEvent::HubExited(code) => {
                    if let Some(code) = code.filter(|c| *c != 0) {
                        tui.set_error(format!("Games hub exited with status {}", code));
                    }
                }
                WorkerEvent::Error(msg) => {
                    tui.set_error(msg);
                }
                WorkerEvent::Shutdown => {
                    info!("Worker shutdown");
                    break;
                }
            }
        }

        session.tick(Instant::now());

        // Draw TUI
        tui.draw(&session)?;

        // Small delay to prevent busy loop
        tokio::time::sleep(tokio::time::Duration::from_millis(16)).await; // ~60 FPS
    }

    // Clean shutdown
    session.shutdown();
    tui.cleanup();

    Ok(())
}
