use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use rustfft::num_complex::Complex;
use rustfft::{Fft, FftPlanner};

/// Samples per analysis window
pub const FFT_SIZE: usize = 2048;

/// Weight of the previous frame when smoothing magnitudes
const SMOOTHING: f32 = 0.8;

/// Decibel range mapped onto 0..=255
const MIN_DB: f32 = -100.0;
const MAX_DB: f32 = -30.0;

struct TapBuffer {
    samples: Mutex<VecDeque<f32>>,
    connected: AtomicBool,
}

/// Write end of an analyser: the last `FFT_SIZE` mono samples an element
/// produced. Once disconnected it ignores everything pushed to it.
#[derive(Clone)]
pub struct SampleTap {
    buffer: Arc<TapBuffer>,
}

impl SampleTap {
    fn new() -> Self {
        Self {
            buffer: Arc::new(TapBuffer {
                samples: Mutex::new(VecDeque::with_capacity(FFT_SIZE)),
                connected: AtomicBool::new(true),
            }),
        }
    }

    pub fn push(&self, samples: &[f32]) {
        if !self.is_connected() {
            return;
        }
        let mut buffer = self.buffer.samples.lock();
        buffer.extend(samples.iter().copied());
        let excess = buffer.len().saturating_sub(FFT_SIZE);
        buffer.drain(..excess);
    }

    pub fn is_connected(&self) -> bool {
        self.buffer.connected.load(Ordering::Acquire)
    }

    pub(crate) fn disconnect(&self) {
        self.buffer.connected.store(false, Ordering::Release);
        self.buffer.samples.lock().clear();
    }

    /// Latest window, zero-padded at the front while filling up
    fn snapshot(&self) -> Vec<f32> {
        let buffer = self.buffer.samples.lock();
        let mut window = vec![0.0; FFT_SIZE - buffer.len()];
        window.extend(buffer.iter().copied());
        window
    }
}

/// Read end handed to visualizers: frequency and waveform views of a tap
#[derive(Clone)]
pub struct Analyser {
    tap: SampleTap,
    fft: Arc<dyn Fft<f32>>,
    window: Arc<[f32]>,
    smoothed: Arc<Mutex<Vec<f32>>>,
}

impl Analyser {
    pub fn new() -> Self {
        let fft = FftPlanner::new().plan_fft_forward(FFT_SIZE);
        let window: Arc<[f32]> = (0..FFT_SIZE)
            .map(|i| {
                let phase = 2.0 * std::f32::consts::PI * i as f32 / FFT_SIZE as f32;
                0.5 * (1.0 - phase.cos())
            })
            .collect();

        Self {
            tap: SampleTap::new(),
            fft,
            window,
            smoothed: Arc::new(Mutex::new(vec![0.0; FFT_SIZE / 2])),
        }
    }

    pub fn tap(&self) -> SampleTap {
        self.tap.clone()
    }

    pub fn is_connected(&self) -> bool {
        self.tap.is_connected()
    }

    pub fn frequency_bin_count(&self) -> usize {
        FFT_SIZE / 2
    }

    /// Smoothed magnitude spectrum scaled to bytes
    pub fn frequency_data(&self) -> Vec<u8> {
        let mut spectrum: Vec<Complex<f32>> = self
            .tap
            .snapshot()
            .iter()
            .zip(self.window.iter())
            .map(|(s, w)| Complex::new(s * w, 0.0))
            .collect();
        self.fft.process(&mut spectrum);

        let mut smoothed = self.smoothed.lock();
        smoothed
            .iter_mut()
            .zip(spectrum.iter())
            .map(|(previous, bin)| {
                let magnitude = bin.norm() / FFT_SIZE as f32;
                *previous = SMOOTHING * *previous + (1.0 - SMOOTHING) * magnitude;
                to_byte(*previous)
            })
            .collect()
    }

    /// Waveform, 128 at silence
    pub fn time_domain_data(&self) -> Vec<u8> {
        self.tap
            .snapshot()
            .iter()
            .map(|s| (128.0 + s.clamp(-1.0, 1.0) * 127.0).round() as u8)
            .collect()
    }

    /// RMS level of the current window
    pub fn level(&self) -> f32 {
        let window = self.tap.snapshot();
        (window.iter().map(|s| s * s).sum::<f32>() / FFT_SIZE as f32).sqrt()
    }
}

impl Default for Analyser {
    fn default() -> Self {
        Self::new()
    }
}

fn to_byte(magnitude: f32) -> u8 {
    if magnitude <= 0.0 {
        return 0;
    }
    let db = 20.0 * magnitude.log10();
    let scaled = (db - MIN_DB) / (MAX_DB - MIN_DB) * 255.0;
    scaled.clamp(0.0, 255.0) as u8
}
