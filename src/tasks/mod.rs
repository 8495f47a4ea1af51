mod channels;
mod worker;

pub use channels::{Channels, WorkerCommand, WorkerEvent};
pub use worker::{Worker, WorkerConfig, PERIOD_CHECK};
