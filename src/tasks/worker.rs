use std::io;
use std::process::{ExitStatus, Stdio};
use std::sync::Arc;
use std::time::Duration;

use chrono::Local;
use tokio::process::{Child, Command};
use tokio::sync::mpsc;
use tokio::time::interval;
use tracing::{debug, error, info, instrument, warn};

use crate::app::AppState;
use crate::schedule::TimeOfDay;

use super::channels::{WorkerCommand, WorkerEvent};

/// How often the wall clock is checked for a period change
pub const PERIOD_CHECK: Duration = Duration::from_secs(30);

/// Worker task configuration
#[derive(Clone, Debug)]
pub struct WorkerConfig {
    /// Command line that starts the games hub; the system name is appended
    pub hub_command: Option<String>,
    pub period_check: Duration,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            hub_command: None,
            period_check: PERIOD_CHECK,
        }
    }
}

/// Background task for everything that waits on the outside world: the
/// wall clock and the games hub process.
pub struct Worker {
    config: WorkerConfig,
    state: Arc<AppState>,
    period: TimeOfDay,
    hub: Option<Child>,
    cmd_rx: mpsc::Receiver<WorkerCommand>,
    event_tx: mpsc::Sender<WorkerEvent>,
}

impl Worker {
    pub fn new(
        config: WorkerConfig,
        state: Arc<AppState>,
        period: TimeOfDay,
        cmd_rx: mpsc::Receiver<WorkerCommand>,
        event_tx: mpsc::Sender<WorkerEvent>,
    ) -> Self {
        Self {
            config,
            state,
            period,
            hub: None,
            cmd_rx,
            event_tx,
        }
    }

    /// Run the worker task
    #[instrument(skip(self), name = "worker")]
    pub async fn run(mut self) {
        info!("Worker starting");

        let mut period_timer = interval(self.config.period_check);

        loop {
            tokio::select! {
                // Handle commands from TUI
                Some(cmd) = self.cmd_rx.recv() => {
                    match cmd {
                        WorkerCommand::LaunchHub(system) => {
                            debug!(%system, "Received LaunchHub command");
                            self.launch_hub(&system).await;
                        }
                        WorkerCommand::Quit => {
                            info!("Received Quit command");
                            break;
                        }
                    }
                }

                _ = period_timer.tick() => {
                    self.check_period().await;
                }

                status = wait_for(&mut self.hub), if self.hub.is_some() => {
                    self.hub = None;
                    let code = match status {
                        Ok(status) => status.code(),
                        Err(e) => {
                            warn!(error = %e, "Lost track of hub process");
                            None
                        }
                    };
                    info!(?code, "Hub exited");
                    let _ = self.event_tx.send(WorkerEvent::HubExited(code)).await;
                }

                // Check for shutdown
                _ = tokio::time::sleep(Duration::from_millis(100)) => {
                    if self.state.is_quitting() {
                        break;
                    }
                }
            }
        }

        info!("Worker shutting down");
        let _ = self.event_tx.send(WorkerEvent::Shutdown).await;
    }

    async fn check_period(&mut self) {
        let period = TimeOfDay::classify(&Local::now());
        if period != self.period {
            info!(from = %self.period, to = %period, "Period changed");
            self.period = period;
            let _ = self.event_tx.send(WorkerEvent::PeriodChanged(period)).await;
        }
    }

    async fn launch_hub(&mut self, system: &str) {
        if self.hub.is_some() {
            warn!(%system, "Hub already running");
            return;
        }

        let Some(command_line) = self.config.hub_command.as_deref() else {
            info!(%system, "No hub command configured");
            let _ = self
                .event_tx
                .send(WorkerEvent::Error(String::from("No games hub configured")))
                .await;
            return;
        };

        match spawn_hub(command_line, system) {
            Ok(child) => {
                info!(%system, pid = child.id(), "Hub launched");
                self.hub = Some(child);
                let _ = self
                    .event_tx
                    .send(WorkerEvent::HubLaunched(system.to_string()))
                    .await;
            }
            Err(e) => {
                error!(error = %e, command = %command_line, "Failed to launch hub");
                let _ = self
                    .event_tx
                    .send(WorkerEvent::Error(format!("Hub error: {}", e)))
                    .await;
            }
        }
    }
}

fn spawn_hub(command_line: &str, system: &str) -> io::Result<Child> {
    let mut parts = command_line.split_whitespace();
    let program = parts
        .next()
        .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "empty hub command"))?;

    Command::new(program)
        .args(parts)
        .arg(system)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
}

async fn wait_for(child: &mut Option<Child>) -> io::Result<ExitStatus> {
    match child {
        Some(child) => child.wait().await,
        None => std::future::pending().await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tasks::Channels;

    fn other_period() -> TimeOfDay {
        match TimeOfDay::classify(&Local::now()) {
            TimeOfDay::Morning => TimeOfDay::Night,
            _ => TimeOfDay::Morning,
        }
    }

    fn worker(hub_command: Option<&str>, period: TimeOfDay) -> (
        mpsc::Sender<WorkerCommand>,
        mpsc::Receiver<WorkerEvent>,
        tokio::task::JoinHandle<()>,
    ) {
        let (cmd_tx, cmd_rx, event_tx, event_rx) = Channels::new().split();
        let config = WorkerConfig {
            hub_command: hub_command.map(String::from),
            ..WorkerConfig::default()
        };
        let worker = Worker::new(config, AppState::new(), period, cmd_rx, event_tx);
        (cmd_tx, event_rx, tokio::spawn(worker.run()))
    }

    #[tokio::test]
    async fn test_reports_period_change_on_start() {
        let (cmd_tx, mut events, handle) = worker(None, other_period());

        let event = events.recv().await;
        assert!(matches!(event, Some(WorkerEvent::PeriodChanged(_))));

        cmd_tx.send(WorkerCommand::Quit).await.unwrap();
        assert_eq!(events.recv().await, Some(WorkerEvent::Shutdown));
        handle.await.unwrap();
    }

    #[tokio::test]
    async fn test_missing_hub_command_is_reported() {
        let period = TimeOfDay::classify(&Local::now());
        let (cmd_tx, mut events, _handle) = worker(None, period);

        cmd_tx
            .send(WorkerCommand::LaunchHub("MAME".into()))
            .await
            .unwrap();

        let event = events.recv().await;
        assert_eq!(event, Some(WorkerEvent::Error("No games hub configured".into())));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_hub_launch_and_exit() {
        let period = TimeOfDay::classify(&Local::now());
        let (cmd_tx, mut events, _handle) = worker(Some("true"), period);

        cmd_tx
            .send(WorkerCommand::LaunchHub("MAME".into()))
            .await
            .unwrap();

        assert_eq!(events.recv().await, Some(WorkerEvent::HubLaunched("MAME".into())));
        assert_eq!(events.recv().await, Some(WorkerEvent::HubExited(Some(0))));
    }

    #[test]
    fn test_empty_hub_command_is_invalid() {
        let runtime = tokio::runtime::Runtime::new().unwrap();
        let _guard = runtime.enter();
        let err = spawn_hub("   ", "MAME").unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidInput);
    }
}
