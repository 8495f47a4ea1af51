use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rodio::Source;

use crate::audio::SampleTap;

/// Fade-in applied to every freshly loaded source
const FADE_IN_SECS: f32 = 0.05;

/// Mono samples collected before handing a chunk to the tap
const TAP_CHUNK: usize = 512;

/// Static noise format
const STATIC_SAMPLE_RATE: u32 = 44_100;
const STATIC_CHANNELS: u16 = 2;
const STATIC_AMPLITUDE: f32 = 0.15;

/// Output settings shared between an element and the source it is playing.
///
/// Read from rodio's mixer thread, so an element can re-route or switch to
/// mono without reloading.
#[derive(Default)]
pub struct OutputRoute {
    tap: Mutex<Option<SampleTap>>,
    mono: AtomicBool,
}

impl OutputRoute {
    pub fn new(stereo: bool) -> Self {
        Self {
            tap: Mutex::new(None),
            mono: AtomicBool::new(!stereo),
        }
    }

    pub fn set_tap(&self, tap: Option<SampleTap>) {
        *self.tap.lock() = tap;
    }

    pub fn set_stereo(&self, stereo: bool) {
        self.mono.store(!stereo, Ordering::Relaxed);
    }

    pub fn is_mono(&self) -> bool {
        self.mono.load(Ordering::Relaxed)
    }

    fn feed(&self, samples: &[f32]) {
        if let Some(tap) = self.tap.lock().as_ref() {
            tap.push(samples);
        }
    }
}

/// Wraps a decoded source: equal-power fade-in, optional mono downmix and a
/// mono copy of the output for the analyser tap.
pub struct TapSource<S> {
    inner: S,
    route: Arc<OutputRoute>,
    /// Current interleaved frame
    frame: Vec<f32>,
    /// Next sample to emit from `frame`
    frame_pos: usize,
    /// Frames emitted so far
    frames: usize,
    fade_frames: usize,
    pending: Vec<f32>,
}

impl<S> TapSource<S>
where
    S: Source<Item = f32>,
{
    pub fn new(inner: S, route: Arc<OutputRoute>) -> Self {
        let channels = inner.channels().max(1) as usize;
        let fade_frames = (FADE_IN_SECS * inner.sample_rate() as f32) as usize;
        Self {
            inner,
            route,
            frame: vec![0.0; channels],
            frame_pos: channels,
            frames: 0,
            fade_frames,
            pending: Vec::with_capacity(TAP_CHUNK),
        }
    }

    /// Equal-power fade-in: sin(t * π/2) over the fade region
    fn fade_in_gain(&self) -> f32 {
        if self.frames >= self.fade_frames {
            return 1.0;
        }
        let t = self.frames as f32 / self.fade_frames as f32;
        (t * std::f32::consts::FRAC_PI_2).sin()
    }

    /// Pull the next full frame from the inner source
    fn next_frame(&mut self) -> bool {
        let channels = self.frame.len();
        let Some(first) = self.inner.next() else {
            self.flush();
            return false;
        };
        self.frame[0] = first;
        for i in 1..channels {
            // A truncated final frame is padded with silence
            self.frame[i] = self.inner.next().unwrap_or(0.0);
        }

        let gain = self.fade_in_gain();
        let mono = self.frame.iter().sum::<f32>() / channels as f32 * gain;
        if self.route.is_mono() {
            self.frame.iter_mut().for_each(|s| *s = mono);
        } else {
            self.frame.iter_mut().for_each(|s| *s *= gain);
        }

        self.pending.push(mono);
        if self.pending.len() >= TAP_CHUNK {
            self.flush();
        }

        self.frames += 1;
        self.frame_pos = 0;
        true
    }

    fn flush(&mut self) {
        if !self.pending.is_empty() {
            self.route.feed(&self.pending);
            self.pending.clear();
        }
    }
}

impl<S> Source for TapSource<S>
where
    S: Source<Item = f32>,
{
    fn current_frame_len(&self) -> Option<usize> {
        // Samples already pulled into `frame` still belong to the inner span
        let buffered = self.frame.len().saturating_sub(self.frame_pos);
        self.inner.current_frame_len().map(|len| len + buffered)
    }

    fn channels(&self) -> u16 {
        self.frame.len() as u16
    }

    fn sample_rate(&self) -> u32 {
        self.inner.sample_rate()
    }

    fn total_duration(&self) -> Option<Duration> {
        self.inner.total_duration()
    }
}

impl<S> Iterator for TapSource<S>
where
    S: Source<Item = f32>,
{
    type Item = f32;

    fn next(&mut self) -> Option<f32> {
        if self.frame_pos >= self.frame.len() && !self.next_frame() {
            return None;
        }
        let sample = self.frame[self.frame_pos];
        self.frame_pos += 1;
        Some(sample)
    }
}

/// Endless white noise, the off-air picture's soundtrack
pub struct StaticNoise {
    rng: StdRng,
}

impl StaticNoise {
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }
}

impl Default for StaticNoise {
    fn default() -> Self {
        Self::new()
    }
}

impl Source for StaticNoise {
    fn current_frame_len(&self) -> Option<usize> {
        None
    }

    fn channels(&self) -> u16 {
        STATIC_CHANNELS
    }

    fn sample_rate(&self) -> u32 {
        STATIC_SAMPLE_RATE
    }

    fn total_duration(&self) -> Option<Duration> {
        None
    }
}

impl Iterator for StaticNoise {
    type Item = f32;

    fn next(&mut self) -> Option<f32> {
        Some(self.rng.gen_range(-STATIC_AMPLITUDE..=STATIC_AMPLITUDE))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::Analyser;
    use rodio::buffer::SamplesBuffer;

    fn constant(channels: u16, frames: usize, value: f32) -> SamplesBuffer<f32> {
        SamplesBuffer::new(channels, 1000, vec![value; frames * channels as usize])
    }

    #[test]
    fn test_plays_once_with_fade_in() {
        // 1000 Hz, so the fade covers 50 frames
        let route = Arc::new(OutputRoute::new(true));
        let source = TapSource::new(constant(2, 200, 1.0), route);
        let output: Vec<f32> = source.collect();

        assert_eq!(output.len(), 400);
        assert!(output[0] < 0.01, "first frame should start silent, got {}", output[0]);
        assert!(output[60] > 0.1 && output[60] < 1.0, "mid-fade sample out of range");
        assert!((output[399] - 1.0).abs() < f32::EPSILON, "fade should be complete");
    }

    #[test]
    fn test_equal_power_fade_curve() {
        let route = Arc::new(OutputRoute::new(true));
        let mut source = TapSource::new(constant(1, 200, 1.0), route);
        source.frames = source.fade_frames / 2;
        let gain = source.fade_in_gain();
        assert!((gain * gain - 0.5).abs() < 0.01, "half-way gain should be -3dB, got {}", gain);
    }

    #[test]
    fn test_mono_downmix() {
        let route = Arc::new(OutputRoute::new(false));
        let samples: Vec<f32> = (0..200).flat_map(|_| [1.0, 0.0]).collect();
        let source = TapSource::new(SamplesBuffer::new(2, 1000, samples), route);
        let output: Vec<f32> = source.skip(150).collect();

        for pair in output.chunks(2) {
            assert!((pair[0] - pair[1]).abs() < f32::EPSILON, "channels should match in mono");
            assert!((pair[0] - 0.5).abs() < 0.01);
        }
    }

    #[test]
    fn test_tap_receives_mono_copy() {
        let analyser = Analyser::new();
        let route = Arc::new(OutputRoute::new(true));
        route.set_tap(Some(analyser.tap()));

        let source = TapSource::new(constant(2, 2048, 0.5), Arc::clone(&route));
        let _: Vec<f32> = source.collect();

        assert!(analyser.level() > 0.3, "tap should have seen the signal");
    }

    /// A buffer that reports its remaining samples as one span
    struct Span(std::vec::IntoIter<f32>);

    impl Iterator for Span {
        type Item = f32;

        fn next(&mut self) -> Option<f32> {
            self.0.next()
        }
    }

    impl Source for Span {
        fn current_frame_len(&self) -> Option<usize> {
            Some(self.0.len())
        }

        fn channels(&self) -> u16 {
            2
        }

        fn sample_rate(&self) -> u32 {
            1000
        }

        fn total_duration(&self) -> Option<Duration> {
            None
        }
    }

    #[test]
    fn test_span_length_counts_buffered_samples() {
        let route = Arc::new(OutputRoute::new(true));
        let mut source = TapSource::new(Span(vec![0.5; 10].into_iter()), route);
        assert_eq!(source.current_frame_len(), Some(10));

        source.next();
        assert_eq!(source.current_frame_len(), Some(9));

        source.next();
        source.next();
        assert_eq!(source.current_frame_len(), Some(7));

        let rest = source.by_ref().count();
        assert_eq!(rest, 7);
        assert_eq!(source.current_frame_len(), Some(0));
    }

    #[test]
    fn test_static_noise_is_endless_and_bounded() {
        let noise = StaticNoise::new();
        assert!(noise.total_duration().is_none());
        for sample in noise.take(10_000) {
            assert!(sample.abs() <= STATIC_AMPLITUDE);
        }
    }
}
