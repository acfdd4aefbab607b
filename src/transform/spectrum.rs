//! Spectrum types and the bin/scaling rules shared by every bundled backend.
//!
//! A series of `n` samples spanning `seconds` has a resolution of
//! `1 / seconds` Hz, so bin `k` sits at `k / seconds`. Only the one-sided
//! half `0..=n/2` is reported.

use crate::error::{Error, Result};
use serde::ser::{Serialize, Serializer};

// Tolerance for band edges that land on a bin frequency.
const EDGE_EPSILON: f64 = 1e-6;

/// Single-channel amplitude spectrum.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Spectrum {
    pub frequencies: Vec<f32>,
    pub magnitudes: Vec<f32>,
}

impl Spectrum {
    pub fn new(frequencies: Vec<f32>, magnitudes: Vec<f32>) -> Self {
        Self {
            frequencies,
            magnitudes,
        }
    }

    /// Frequency of the strongest non-DC bin, if any.
    pub fn peak_frequency(&self) -> Option<f32> {
        peak_of(&self.frequencies, &self.magnitudes)
    }
}

/// Spectra for several channels that share one frequency axis.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MultiSpectrum {
    pub frequencies: Vec<f32>,
    pub channels: Vec<Vec<f32>>,
}

impl MultiSpectrum {
    pub fn new(frequencies: Vec<f32>, channels: Vec<Vec<f32>>) -> Self {
        Self {
            frequencies,
            channels,
        }
    }

    pub fn num_channels(&self) -> usize {
        self.channels.len()
    }

    pub fn channel(&self, idx: usize) -> Option<Spectrum> {
        self.channels
            .get(idx)
            .map(|mags| Spectrum::new(self.frequencies.clone(), mags.clone()))
    }
}

// Wire form is `[frequencies, magnitudes]`.
impl Serialize for Spectrum {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        (&self.frequencies, &self.magnitudes).serialize(serializer)
    }
}

impl Serialize for MultiSpectrum {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        (&self.frequencies, &self.channels).serialize(serializer)
    }
}

fn peak_of(frequencies: &[f32], magnitudes: &[f32]) -> Option<f32> {
    frequencies
        .iter()
        .zip(magnitudes)
        .filter(|(f, _)| **f > 0.0)
        .max_by(|a, b| a.1.total_cmp(b.1))
        .map(|(f, _)| *f)
}

/// Contiguous run of DFT bins.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BinRange {
    pub start: usize,
    pub count: usize,
}

impl BinRange {
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    pub fn iter(&self) -> std::ops::Range<usize> {
        self.start..self.start + self.count
    }
}

/// Bins `0..=n/2`.
pub fn full_bins(n: usize) -> BinRange {
    BinRange {
        start: 0,
        count: n / 2 + 1,
    }
}

/// Bins whose frequency lies in `[low_freq, high_freq]`, clipped to `0..=n/2`.
pub fn band_bins(n: usize, seconds: f32, low_freq: f32, high_freq: f32) -> BinRange {
    let nyquist_bin = (n / 2) as f64;
    let seconds = seconds as f64;

    let start = (low_freq as f64 * seconds - EDGE_EPSILON).ceil().max(0.0);
    let end = (high_freq as f64 * seconds + EDGE_EPSILON).floor().min(nyquist_bin);

    if end < start {
        return BinRange { start: 0, count: 0 };
    }

    BinRange {
        start: start as usize,
        count: (end - start) as usize + 1,
    }
}

pub fn frequencies(bins: BinRange, seconds: f32) -> Vec<f32> {
    bins.iter().map(|k| k as f32 / seconds).collect()
}

/// Scale a raw `|X_k|` to a one-sided amplitude.
pub fn amplitude(k: usize, n: usize, raw_magnitude: f32) -> f32 {
    let n_f = n as f32;
    let is_nyquist = n % 2 == 0 && k == n / 2;
    if k == 0 || is_nyquist {
        raw_magnitude / n_f
    } else {
        2.0 * raw_magnitude / n_f
    }
}

pub(crate) fn validate_seconds(seconds: f32) -> Result<()> {
    if !seconds.is_finite() || seconds <= 0.0 {
        return Err(Error::invalid_input(format!(
            "duration must be a positive number of seconds, got {}",
            seconds
        )));
    }
    // bin frequencies are k / seconds
    if !(1.0 / seconds).is_finite() {
        return Err(Error::invalid_input(format!(
            "duration {:e} is too short to build a frequency axis",
            seconds
        )));
    }
    Ok(())
}

pub(crate) fn validate_series(series: &[f32], seconds: f32) -> Result<()> {
    if series.is_empty() {
        return Err(Error::invalid_input("series is empty"));
    }
    validate_seconds(seconds)
}

/// Checks a channel matrix and returns the shared row length.
pub(crate) fn validate_rows(rows: &[Vec<f32>], seconds: f32) -> Result<usize> {
    let first = rows
        .first()
        .ok_or_else(|| Error::invalid_input("no channels given"))?;
    let width = first.len();
    if width == 0 {
        return Err(Error::invalid_input("channels are empty"));
    }

    if let Some((idx, row)) = rows.iter().enumerate().find(|(_, r)| r.len() != width) {
        return Err(Error::invalid_input(format!(
            "channel {} has {} samples, expected {}",
            idx,
            row.len(),
            width
        )));
    }

    validate_seconds(seconds)?;
    Ok(width)
}

pub(crate) fn validate_band(low_freq: f32, high_freq: f32) -> Result<()> {
    if !low_freq.is_finite() || !high_freq.is_finite() {
        return Err(Error::invalid_input("band edges must be finite"));
    }
    if low_freq > high_freq {
        return Err(Error::invalid_input(format!(
            "band low edge {} exceeds high edge {}",
            low_freq, high_freq
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_bins_even_and_odd() {
        assert_eq!(full_bins(8), BinRange { start: 0, count: 5 });
        assert_eq!(full_bins(7), BinRange { start: 0, count: 4 });
        assert_eq!(full_bins(1), BinRange { start: 0, count: 1 });
    }

    #[test]
    fn test_band_bins_inclusive_edges() {
        // 2 seconds -> 0.5 Hz resolution
        let bins = band_bins(256, 2.0, 8.0, 12.0);
        assert_eq!(bins.start, 16);
        assert_eq!(bins.count, 9);

        let freqs = frequencies(bins, 2.0);
        assert_eq!(freqs.first(), Some(&8.0));
        assert_eq!(freqs.last(), Some(&12.0));
    }

    #[test]
    fn test_band_bins_clipped_to_nyquist() {
        let bins = band_bins(64, 1.0, 20.0, 1000.0);
        assert_eq!(bins.start, 20);
        assert_eq!(bins.start + bins.count - 1, 32);
    }

    #[test]
    fn test_band_bins_empty_between_bins() {
        let bins = band_bins(64, 1.0, 3.2, 3.8);
        assert!(bins.is_empty());
    }

    #[test]
    fn test_band_bins_negative_low_edge() {
        let bins = band_bins(16, 1.0, -5.0, 2.0);
        assert_eq!(bins, BinRange { start: 0, count: 3 });
    }

    #[test]
    fn test_amplitude_scaling() {
        assert_eq!(amplitude(0, 8, 8.0), 1.0);
        assert_eq!(amplitude(1, 8, 4.0), 1.0);
        assert_eq!(amplitude(4, 8, 8.0), 1.0);
        // odd length has no Nyquist bin
        assert_eq!(amplitude(3, 7, 3.5), 1.0);
    }

    #[test]
    fn test_validate_rows() {
        assert_eq!(validate_rows(&[vec![1.0, 2.0], vec![3.0, 4.0]], 1.0).unwrap(), 2);
        assert!(validate_rows(&[], 1.0).is_err());
        assert!(validate_rows(&[vec![]], 1.0).is_err());
        assert!(validate_rows(&[vec![1.0], vec![1.0, 2.0]], 1.0).is_err());
        assert!(validate_rows(&[vec![1.0]], 0.0).is_err());
    }

    #[test]
    fn test_validate_seconds_rejects_subnormal_duration() {
        assert!(validate_seconds(1.0).is_ok());
        assert!(validate_seconds(f32::MIN_POSITIVE).is_ok());
        assert!(matches!(validate_seconds(1e-39), Err(Error::InvalidInput(_))));
        assert!(validate_series(&[1.0, 2.0, 3.0, 4.0], 1e-39).is_err());
    }

    #[test]
    fn test_validate_band() {
        assert!(validate_band(1.0, 2.0).is_ok());
        assert!(validate_band(2.0, 2.0).is_ok());
        assert!(validate_band(3.0, 2.0).is_err());
        assert!(validate_band(f32::NAN, 2.0).is_err());
    }

    #[test]
    fn test_spectrum_serializes_as_pair() {
        let spectrum = Spectrum::new(vec![0.0, 1.0], vec![0.5, 2.0]);
        let json = serde_json::to_string(&spectrum).unwrap();
        assert_eq!(json, "[[0.0,1.0],[0.5,2.0]]");
    }

    #[test]
    fn test_peak_frequency_skips_dc() {
        let spectrum = Spectrum::new(vec![0.0, 1.0, 2.0], vec![10.0, 0.2, 0.7]);
        assert_eq!(spectrum.peak_frequency(), Some(2.0));
    }
}
