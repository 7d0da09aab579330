//! Frequency-domain volume probe.
//!
//! Reports the spectral energy of the newest capture window on a byte
//! scale, the way an analyser node exposes byte frequency data: each bin
//! magnitude is mapped onto a -100..-30 dB window, scaled to 0..255, and
//! the probe returns the average across bins. Silence, or a missing
//! capture stream, reads as `NO_SIGNAL`.

use num_complex::Complex;
use rustfft::{Fft, FftPlanner};
use std::f32::consts::TAU;
use std::sync::Arc;

/// FFT size; half of it is usable bins
const FFT_SIZE: usize = 256;
/// Bin magnitudes at or below this dB floor read as 0
const MIN_DB: f32 = -100.0;
/// Bin magnitudes at or above this dB ceiling read as 255
const MAX_DB: f32 = -30.0;

/// Reported when no audio is flowing
pub const NO_SIGNAL: f32 = 0.0;
/// Upper bound of the reported volume scale
pub const VOLUME_CEIL: f32 = 255.0;

pub struct VolumeProbe {
    fft: Arc<dyn Fft<f32>>,
    fft_buffer: Vec<Complex<f32>>,
    fft_window: Vec<f32>,
}

impl VolumeProbe {
    pub fn new() -> Self {
        let mut planner = FftPlanner::new();
        let fft = planner.plan_fft_forward(FFT_SIZE);

        // Hann window
        let fft_window: Vec<f32> = (0..FFT_SIZE)
            .map(|i| 0.5 * (1.0 - (TAU * i as f32 / FFT_SIZE as f32).cos()))
            .collect();

        Self {
            fft,
            fft_buffer: vec![Complex::new(0.0, 0.0); FFT_SIZE],
            fft_window,
        }
    }

    /// Average byte-scaled spectral energy of the newest samples, in
    /// `NO_SIGNAL..=VOLUME_CEIL`. Call once per frame.
    pub fn measure(&mut self, samples: &[f32]) -> f32 {
        let start = samples.len().saturating_sub(FFT_SIZE);
        for (i, slot) in self.fft_buffer.iter_mut().enumerate() {
            let sample = samples.get(start + i).copied().unwrap_or(0.0);
            *slot = Complex::new(sample * self.fft_window[i], 0.0);
        }

        self.fft.process(&mut self.fft_buffer);

        let bins = FFT_SIZE / 2;
        let sum: f32 = self.fft_buffer[1..bins]
            .iter()
            .map(|c| {
                let magnitude = c.norm() / FFT_SIZE as f32;
                let db = 20.0 * (magnitude + 1e-12).log10();
                ((db - MIN_DB) / (MAX_DB - MIN_DB)).clamp(0.0, 1.0) * VOLUME_CEIL
            })
            .sum();

        sum / (bins - 1) as f32
    }
}
