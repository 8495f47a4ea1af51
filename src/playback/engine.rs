use std::fs::File;
use std::io::BufReader;
use std::sync::Arc;

use rodio::cpal::traits::{DeviceTrait, HostTrait};
use rodio::{Decoder, OutputStream, OutputStreamHandle, Sink, Source};
use tracing::{debug, info, instrument, warn};

use crate::audio::{AudioBackend, AudioContext, ContextState, SampleTap};
use crate::error::{AudioError, PlaybackError};
use crate::schedule::uri_to_path;

use super::source::{OutputRoute, StaticNoise, TapSource};
use super::{next_element_id, ElementId, MediaElement};

/// Audio device information
#[derive(Debug, Clone)]
pub struct AudioDevice {
    pub name: String,
    pub index: usize,
    pub is_default: bool,
}

/// Get list of available audio output devices
pub fn list_audio_devices() -> Vec<AudioDevice> {
    let host = rodio::cpal::default_host();
    let default_name = host.default_output_device().and_then(|d| d.name().ok());
    let mut devices = Vec::new();

    match host.output_devices() {
        Ok(output_devices) => {
            for (index, device) in output_devices.enumerate() {
                let name = device.name().unwrap_or_else(|_| format!("Device {}", index));
                let is_default = default_name.as_deref() == Some(name.as_str());
                devices.push(AudioDevice {
                    name,
                    index,
                    is_default,
                });
            }
        }
        Err(e) => {
            warn!(error = %e, "Failed to enumerate audio devices");
        }
    }

    devices
}

/// Opens rodio output streams, optionally on a specific device
#[derive(Debug, Clone, Default)]
pub struct RodioBackend {
    device_index: Option<usize>,
}

impl RodioBackend {
    pub fn new(device_index: Option<usize>) -> Self {
        Self { device_index }
    }

    fn open_default() -> Result<(OutputStream, OutputStreamHandle), AudioError> {
        OutputStream::try_default()
            .map_err(|e| AudioError::ContextCreation(format!("Failed to open audio device: {}", e)))
    }

    fn open_selected(index: usize) -> Result<(OutputStream, OutputStreamHandle), AudioError> {
        let host = rodio::cpal::default_host();
        let device = host
            .output_devices()
            .ok()
            .and_then(|mut devices| devices.nth(index));

        let Some(device) = device else {
            warn!(index, "Device index out of range, using default");
            return Self::open_default();
        };

        let name = device.name().unwrap_or_else(|_| "Unknown".to_string());
        info!(device = %name, index, "Using selected audio device");

        match OutputStream::try_from_device(&device) {
            Ok(opened) => Ok(opened),
            Err(e) => {
                warn!(error = %e, "Failed to open selected device, using default");
                Self::open_default()
            }
        }
    }
}

impl AudioBackend for RodioBackend {
    type Context = RodioContext;

    #[instrument(skip(self))]
    fn create_context(&mut self) -> Result<RodioContext, AudioError> {
        info!("Initializing audio output");

        let (stream, handle) = match self.device_index {
            Some(index) => Self::open_selected(index)?,
            None => Self::open_default()?,
        };

        debug!("Audio output initialized");

        Ok(RodioContext {
            stream: Some(stream),
            handle,
            state: ContextState::Running,
        })
    }
}

/// An open output stream. Dropping the stream silences every sink on it.
pub struct RodioContext {
    stream: Option<OutputStream>,
    handle: OutputStreamHandle,
    state: ContextState,
}

impl AudioContext for RodioContext {
    fn state(&self) -> ContextState {
        self.state
    }

    fn resume(&mut self) -> Result<(), AudioError> {
        if self.stream.is_none() {
            return Err(AudioError::Resume(String::from("output stream closed")));
        }
        self.state = ContextState::Running;
        Ok(())
    }

    fn close(&mut self) {
        debug!("Closing audio output");
        self.stream = None;
        self.state = ContextState::Closed;
    }

    fn create_element(&self) -> Result<Box<dyn MediaElement>, PlaybackError> {
        let sink = Sink::try_new(&self.handle)
            .map_err(|e| PlaybackError::Device(format!("Failed to create audio sink: {}", e)))?;
        Ok(Box::new(SinkElement::new(sink)))
    }
}

/// Media element backed by a rodio sink
pub struct SinkElement {
    id: ElementId,
    sink: Sink,
    route: Arc<OutputRoute>,
    loaded: bool,
    volume: f32,
    muted: bool,
}

impl SinkElement {
    pub fn new(sink: Sink) -> Self {
        sink.pause();
        Self {
            id: next_element_id(),
            sink,
            route: Arc::new(OutputRoute::new(true)),
            loaded: false,
            volume: 1.0,
            muted: false,
        }
    }

    fn apply_volume(&self) {
        let volume = if self.muted { 0.0 } else { self.volume };
        self.sink.set_volume(volume);
    }

    fn replace<S>(&mut self, source: S)
    where
        S: Source<Item = f32> + Send + 'static,
    {
        // clear() also pauses, so a fresh load waits for play()
        self.sink.clear();
        self.sink
            .append(TapSource::new(source, Arc::clone(&self.route)));
        self.loaded = true;
    }
}

impl MediaElement for SinkElement {
    fn id(&self) -> ElementId {
        self.id
    }

    #[instrument(skip(self), fields(element = self.id))]
    fn load(&mut self, uri: &str) -> Result<(), PlaybackError> {
        let path = uri_to_path(uri);
        let file = File::open(&path).map_err(|source| PlaybackError::Open {
            uri: uri.to_string(),
            source,
        })?;
        let decoder = Decoder::new(BufReader::new(file)).map_err(|e| PlaybackError::Decode {
            uri: uri.to_string(),
            reason: e.to_string(),
        })?;

        debug!(
            channels = decoder.channels(),
            sample_rate = decoder.sample_rate(),
            "Loaded media"
        );

        self.replace(decoder.convert_samples::<f32>());
        Ok(())
    }

    fn load_static(&mut self) {
        self.replace(StaticNoise::new());
    }

    fn play(&mut self) -> Result<(), PlaybackError> {
        if !self.loaded {
            return Err(PlaybackError::NothingLoaded);
        }
        self.sink.play();
        Ok(())
    }

    fn pause(&mut self) {
        self.sink.pause();
    }

    fn clear(&mut self) {
        self.sink.clear();
        self.loaded = false;
    }

    fn set_volume(&mut self, volume: f32) {
        self.volume = volume.clamp(0.0, 1.0);
        self.apply_volume();
    }

    fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
        self.apply_volume();
    }

    fn set_stereo(&mut self, stereo: bool) {
        self.route.set_stereo(stereo);
    }

    fn is_ended(&self) -> bool {
        self.loaded && self.sink.empty()
    }

    fn set_tap(&mut self, tap: Option<SampleTap>) {
        self.route.set_tap(tap);
    }
}

impl Drop for SinkElement {
    fn drop(&mut self) {
        self.sink.stop();
    }
}
