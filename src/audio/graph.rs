use std::collections::HashMap;
use std::time::Duration;

use tracing::{debug, error, info, instrument, warn};

use crate::error::{AudioError, PlaybackError};
use crate::playback::{ElementId, MediaElement, NullElement};

use super::Analyser;

/// Retries after the first failed context creation
pub const MAX_INIT_RETRIES: u32 = 3;

/// Resume attempts allowed from user interaction
pub const MAX_RESUME_ATTEMPTS: u32 = 3;

const INIT_BACKOFF: Duration = Duration::from_secs(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContextState {
    Suspended,
    Running,
    Closed,
}

/// The shared audio-processing context: an open output plus a factory for
/// elements that play into it.
pub trait AudioContext {
    fn state(&self) -> ContextState;

    fn resume(&mut self) -> Result<(), AudioError>;

    fn close(&mut self);

    fn create_element(&self) -> Result<Box<dyn MediaElement>, PlaybackError>;
}

/// Creates audio contexts
pub trait AudioBackend {
    type Context: AudioContext;

    fn create_context(&mut self) -> Result<Self::Context, AudioError>;
}

/// Owns the single audio context and the element → analyser edges.
///
/// At most one edge exists per element: connecting an element that already
/// has one disconnects the old edge first.
pub struct AudioGraphManager<B: AudioBackend> {
    backend: B,
    context: Option<B::Context>,
    edges: HashMap<ElementId, Analyser>,
    resume_attempts: u32,
    backoff: Duration,
}

impl<B: AudioBackend> AudioGraphManager<B> {
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            context: None,
            edges: HashMap::new(),
            resume_attempts: 0,
            backoff: INIT_BACKOFF,
        }
    }

    pub fn is_initialized(&self) -> bool {
        self.context.is_some()
    }

    pub fn state(&self) -> Option<ContextState> {
        self.context.as_ref().map(|c| c.state())
    }

    /// Create the context if needed and try to get it running.
    ///
    /// Idempotent. Creation is attempted once plus `MAX_INIT_RETRIES` times,
    /// `INIT_BACKOFF` apart; after that the graph stays uninitialized and
    /// elements fall back to `NullElement`.
    #[instrument(skip(self))]
    pub async fn init(&mut self) -> Result<(), AudioError> {
        if let Some(context) = self.context.as_mut() {
            if context.state() == ContextState::Suspended {
                if let Err(e) = context.resume() {
                    debug!(error = %e, "Context still suspended");
                }
            }
            return Ok(());
        }

        for attempt in 0..=MAX_INIT_RETRIES {
            match self.backend.create_context() {
                Ok(mut context) => {
                    if context.state() == ContextState::Suspended {
                        if let Err(e) = context.resume() {
                            warn!(error = %e, "Audio context suspended, will resume on interaction");
                        }
                    }
                    info!(attempt, state = ?context.state(), "Audio context ready");
                    self.context = Some(context);
                    return Ok(());
                }
                Err(e) => {
                    warn!(attempt, error = %e, "Audio context creation failed");
                    if attempt < MAX_INIT_RETRIES {
                        tokio::time::sleep(self.backoff).await;
                    }
                }
            }
        }

        error!("Audio unavailable, continuing without sound");
        Err(AudioError::InitExhausted(MAX_INIT_RETRIES + 1))
    }

    /// Resume a suspended context after a key press, at most
    /// `MAX_RESUME_ATTEMPTS` times over the graph's life.
    pub fn on_user_interaction(&mut self) {
        let Some(context) = self.context.as_mut() else {
            return;
        };
        if context.state() != ContextState::Suspended
            || self.resume_attempts >= MAX_RESUME_ATTEMPTS
        {
            return;
        }

        self.resume_attempts += 1;
        match context.resume() {
            Ok(()) => info!("Audio context resumed"),
            Err(e) => warn!(attempt = self.resume_attempts, error = %e, "Audio resume failed"),
        }
    }

    /// New element on the context, or a silent one if there is none
    pub fn create_element(&self) -> Box<dyn MediaElement> {
        let Some(context) = self.context.as_ref() else {
            return Box::new(NullElement::new());
        };
        match context.create_element() {
            Ok(element) => element,
            Err(e) => {
                warn!(error = %e, "Falling back to silent element");
                Box::new(NullElement::new())
            }
        }
    }

    /// Route `element` through a fresh analyser and return its handle
    pub fn connect(&mut self, element: &mut dyn MediaElement) -> Result<Analyser, AudioError> {
        match self.state() {
            Some(ContextState::Running) | Some(ContextState::Suspended) => {}
            _ => return Err(AudioError::NotInitialized),
        }

        if self.edges.contains_key(&element.id()) {
            debug!(element = element.id(), "Element already connected, replacing edge");
            self.disconnect(element);
        }

        let analyser = Analyser::new();
        element.set_tap(Some(analyser.tap()));
        self.edges.insert(element.id(), analyser.clone());
        debug!(element = element.id(), edges = self.edges.len(), "Element connected");
        Ok(analyser)
    }

    pub fn disconnect(&mut self, element: &mut dyn MediaElement) {
        if let Some(analyser) = self.edges.remove(&element.id()) {
            analyser.tap().disconnect();
            element.set_tap(None);
            debug!(element = element.id(), "Element disconnected");
        }
    }

    pub fn is_connected(&self, id: ElementId) -> bool {
        self.edges.contains_key(&id)
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Drop every edge and close the context. Safe to call repeatedly.
    pub fn cleanup(&mut self) {
        for (_, analyser) in self.edges.drain() {
            analyser.tap().disconnect();
        }
        if let Some(mut context) = self.context.take() {
            context.close();
            info!("Audio context closed");
        }
        self.resume_attempts = 0;
    }
}

impl<B: AudioBackend> Drop for AudioGraphManager<B> {
    fn drop(&mut self) {
        self.cleanup();
    }
}
