mod analyser;
mod graph;
mod settings;

pub use analyser::{Analyser, SampleTap, FFT_SIZE};
pub use graph::{
    AudioBackend, AudioContext, AudioGraphManager, ContextState, MAX_INIT_RETRIES,
    MAX_RESUME_ATTEMPTS,
};
pub use settings::{AudioSettings, SharedAudioSettings, MAX_VOLUME};
