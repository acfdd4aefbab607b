//! rustfft-backed transform library.

use super::spectrum::{self, BinRange, MultiSpectrum, Spectrum};
use super::TransformLibrary;
use crate::error::Result;
use parking_lot::Mutex;
use rustfft::num_complex::Complex;
use rustfft::{Fft, FftPlanner};
use std::collections::HashMap;
use std::sync::Arc;

/// CPU transform library. Plans are cached per length for the lifetime of
/// the value.
pub struct CpuTransform {
    plans: Mutex<HashMap<usize, Arc<dyn Fft<f32>>>>,
}

impl CpuTransform {
    pub fn new() -> Self {
        Self {
            plans: Mutex::new(HashMap::new()),
        }
    }

    fn plan(&self, n: usize) -> Arc<dyn Fft<f32>> {
        let mut plans = self.plans.lock();
        Arc::clone(
            plans
                .entry(n)
                .or_insert_with(|| FftPlanner::new().plan_fft_forward(n)),
        )
    }

    /// Number of distinct lengths planned so far.
    pub fn cached_plans(&self) -> usize {
        self.plans.lock().len()
    }

    fn magnitudes(&self, samples: &[f32], bins: BinRange) -> Vec<f32> {
        if bins.is_empty() {
            return Vec::new();
        }

        let n = samples.len();
        let fft = self.plan(n);

        let mut buffer: Vec<Complex<f32>> =
            samples.iter().map(|&x| Complex::new(x, 0.0)).collect();
        fft.process(&mut buffer);

        bins.iter()
            .map(|k| spectrum::amplitude(k, n, buffer[k].norm()))
            .collect()
    }

    fn transform_rows(&self, rows: &[Vec<f32>], bins: BinRange, seconds: f32) -> MultiSpectrum {
        let channels = rows.iter().map(|row| self.magnitudes(row, bins)).collect();
        MultiSpectrum::new(spectrum::frequencies(bins, seconds), channels)
    }
}

impl Default for CpuTransform {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for CpuTransform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CpuTransform").finish_non_exhaustive()
    }
}

impl TransformLibrary for CpuTransform {
    fn name(&self) -> &'static str {
        "cpu"
    }

    fn dft(&self, series: &[f32], seconds: f32) -> Result<Spectrum> {
        spectrum::validate_series(series, seconds)?;

        let bins = spectrum::full_bins(series.len());
        Ok(Spectrum::new(
            spectrum::frequencies(bins, seconds),
            self.magnitudes(series, bins),
        ))
    }

    fn multi_dft(&self, rows: &[Vec<f32>], seconds: f32) -> Result<MultiSpectrum> {
        let width = spectrum::validate_rows(rows, seconds)?;
        Ok(self.transform_rows(rows, spectrum::full_bins(width), seconds))
    }

    fn multi_dft_bandpass(
        &self,
        rows: &[Vec<f32>],
        seconds: f32,
        low_freq: f32,
        high_freq: f32,
    ) -> Result<MultiSpectrum> {
        let width = spectrum::validate_rows(rows, seconds)?;
        spectrum::validate_band(low_freq, high_freq)?;

        let bins = spectrum::band_bins(width, seconds, low_freq, high_freq);
        Ok(self.transform_rows(rows, bins, seconds))
    }
}
