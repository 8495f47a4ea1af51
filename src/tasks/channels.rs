use tokio::sync::mpsc;

use crate::schedule::TimeOfDay;

/// Commands from the TUI to the worker task
#[derive(Debug)]
pub enum WorkerCommand {
    /// Start the games hub for a system
    LaunchHub(String),
    /// Shutdown the worker
    Quit,
}

/// Messages from the worker to the main loop
#[derive(Debug, PartialEq, Eq)]
pub enum WorkerEvent {
    /// Wall clock crossed into another broadcast period
    PeriodChanged(TimeOfDay),
    /// Hub process started
    HubLaunched(String),
    /// Hub process ended, with its exit code if it had one
    HubExited(Option<i32>),
    /// Something failed outside the core (shown, not fatal)
    Error(String),
    /// Worker is shutting down
    Shutdown,
}

/// Channel bundle for communication
pub struct Channels {
    /// Commands to worker
    pub cmd_tx: mpsc::Sender<WorkerCommand>,
    pub cmd_rx: mpsc::Receiver<WorkerCommand>,

    /// Events from worker
    pub event_tx: mpsc::Sender<WorkerEvent>,
    pub event_rx: mpsc::Receiver<WorkerEvent>,
}

impl Channels {
    pub fn new() -> Self {
        let (cmd_tx, cmd_rx) = mpsc::channel(8);
        let (event_tx, event_rx) = mpsc::channel(8);

        Self {
            cmd_tx,
            cmd_rx,
            event_tx,
            event_rx,
        }
    }

    /// Split into sender/receiver pairs
    pub fn split(
        self,
    ) -> (
        mpsc::Sender<WorkerCommand>,
        mpsc::Receiver<WorkerCommand>,
        mpsc::Sender<WorkerEvent>,
        mpsc::Receiver<WorkerEvent>,
    ) {
        (self.cmd_tx, self.cmd_rx, self.event_tx, self.event_rx)
    }
}

impl Default for Channels {
    fn default() -> Self {
        Self::new()
    }
}
