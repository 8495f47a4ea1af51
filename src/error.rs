use thiserror::Error;

/// Main application error type
#[derive(Error, Debug)]
pub enum ChannelsurfError {
    #[error("Playback error: {0}")]
    Playback(#[from] PlaybackError),

    #[error("Audio error: {0}")]
    Audio(#[from] AudioError),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("TUI error: {0}")]
    Tui(#[from] TuiError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}

/// Media element errors
#[derive(Error, Debug)]
pub enum PlaybackError {
    #[error("Failed to open {uri}: {source}")]
    Open {
        uri: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to decode {uri}: {reason}")]
    Decode { uri: String, reason: String },

    #[error("Audio device error: {0}")]
    Device(String),

    #[error("No audio device available")]
    NoDevice,

    #[error("Nothing loaded to play")]
    NothingLoaded,
}

/// Audio context / analysis graph errors
#[derive(Error, Debug)]
pub enum AudioError {
    #[error("Audio context creation failed: {0}")]
    ContextCreation(String),

    #[error("Audio context resume failed: {0}")]
    Resume(String),

    #[error("Audio context not initialized")]
    NotInitialized,

    #[error("Audio context initialization gave up after {0} attempts")]
    InitExhausted(u32),
}

/// Persistence errors (only surfaced by explicit file operations)
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// TUI errors
#[derive(Error, Debug)]
pub enum TuiError {
    #[error("Terminal IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for channelsurf operations
pub type Result<T> = std::result::Result<T, ChannelsurfError>;

impl ChannelsurfError {
    /// Check if this error only degrades one channel or the audio subsystem
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            ChannelsurfError::Playback(_)
                | ChannelsurfError::Audio(AudioError::ContextCreation(_))
                | ChannelsurfError::Audio(AudioError::Resume(_))
                | ChannelsurfError::Audio(AudioError::InitExhausted(_))
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_playback_failures_are_recoverable() {
        let err: ChannelsurfError = PlaybackError::NoDevice.into();
        assert!(err.is_recoverable());

        let err: ChannelsurfError = AudioError::InitExhausted(4).into();
        assert!(err.is_recoverable());
    }

    #[test]
    fn test_config_errors_are_fatal() {
        let err = ChannelsurfError::Config("bad channel".into());
        assert!(!err.is_recoverable());
    }
}
