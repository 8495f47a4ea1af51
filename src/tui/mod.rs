mod app;
mod input;
mod widgets;

pub use app::TuiApp;
pub use input::{handle_key, Outcome, Overlay};
