//! Transform libraries.
//!
//! The dispatcher only knows the [`TransformLibrary`] trait. Bundled
//! implementations are [`CpuTransform`] and, with the `gpu` feature,
//! [`crate::gpu::GpuTransform`]. Tests inject their own doubles.

pub mod cpu;
pub mod spectrum;

pub use cpu::CpuTransform;
pub use spectrum::{BinRange, MultiSpectrum, Spectrum};

use crate::error::Result;
use std::sync::Arc;

/// The three spectral routines a worker can dispatch to.
///
/// Implementations own whatever long-lived state they need (FFT plans,
/// GPU device handles). Errors are returned to the caller untouched.
pub trait TransformLibrary: Send {
    /// Short backend name used in logs.
    fn name(&self) -> &'static str;

    /// Amplitude spectrum of one series covering `seconds` of signal.
    fn dft(&self, series: &[f32], seconds: f32) -> Result<Spectrum>;

    /// Amplitude spectra of equal-length rows covering `seconds` of signal.
    fn multi_dft(&self, rows: &[Vec<f32>], seconds: f32) -> Result<MultiSpectrum>;

    /// Like [`multi_dft`](Self::multi_dft), restricted to `[low_freq, high_freq]` Hz.
    fn multi_dft_bandpass(
        &self,
        rows: &[Vec<f32>],
        seconds: f32,
        low_freq: f32,
        high_freq: f32,
    ) -> Result<MultiSpectrum>;
}

impl<L: TransformLibrary + ?Sized> TransformLibrary for Box<L> {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    fn dft(&self, series: &[f32], seconds: f32) -> Result<Spectrum> {
        (**self).dft(series, seconds)
    }

    fn multi_dft(&self, rows: &[Vec<f32>], seconds: f32) -> Result<MultiSpectrum> {
        (**self).multi_dft(rows, seconds)
    }

    fn multi_dft_bandpass(
        &self,
        rows: &[Vec<f32>],
        seconds: f32,
        low_freq: f32,
        high_freq: f32,
    ) -> Result<MultiSpectrum> {
        (**self).multi_dft_bandpass(rows, seconds, low_freq, high_freq)
    }
}

impl<L: TransformLibrary + Sync + ?Sized> TransformLibrary for Arc<L> {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    fn dft(&self, series: &[f32], seconds: f32) -> Result<Spectrum> {
        (**self).dft(series, seconds)
    }

    fn multi_dft(&self, rows: &[Vec<f32>], seconds: f32) -> Result<MultiSpectrum> {
        (**self).multi_dft(rows, seconds)
    }

    fn multi_dft_bandpass(
        &self,
        rows: &[Vec<f32>],
        seconds: f32,
        low_freq: f32,
        high_freq: f32,
    ) -> Result<MultiSpectrum> {
        (**self).multi_dft_bandpass(rows, seconds, low_freq, high_freq)
    }
}
