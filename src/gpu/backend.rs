use super::buffer::GpuBuffer;
use super::kernel::{CompiledKernel, DftParams};
use super::runtime::GpuRuntime;
use crate::error::{Error, Result};
use crate::transform::spectrum::{self, BinRange, MultiSpectrum, Spectrum};
use crate::transform::TransformLibrary;

/// GPU transform library. The device, queue and compiled pipeline are
/// created once and reused for every request.
pub struct GpuTransform {
    runtime: GpuRuntime,
    kernel: CompiledKernel,
}

impl GpuTransform {
    pub fn new() -> Result<Self> {
        Self::with_runtime(GpuRuntime::new_blocking()?)
    }

    pub fn with_runtime(runtime: GpuRuntime) -> Result<Self> {
        let kernel = CompiledKernel::compile(runtime.device())?;
        Ok(Self { runtime, kernel })
    }

    pub fn runtime(&self) -> &GpuRuntime {
        &self.runtime
    }

    /// Raw DFT of `channels` rows of `width` samples stored back to back.
    fn magnitudes(&self, flat: &[f32], width: usize, channels: usize, bins: BinRange) -> Result<Vec<Vec<f32>>> {
        if bins.is_empty() {
            return Ok(vec![Vec::new(); channels]);
        }

        let params = DftParams {
            n_samples: to_u32(width, "samples per channel")?,
            n_channels: to_u32(channels, "channel count")?,
            bin_start: to_u32(bins.start, "bin start")?,
            bin_count: to_u32(bins.count, "bin count")?,
        };
        self.check_limits(&params, flat.len())?;

        let device = self.runtime.device();
        let queue = self.runtime.queue();

        let params_buf = GpuBuffer::uniform(device, "spectra-dft-params", &params);
        let signal_buf = GpuBuffer::storage_from(device, "spectra-dft-signal", flat);
        let output_buf = GpuBuffer::storage(device, "spectra-dft-output", params.output_len());

        self.kernel
            .execute(device, queue, &params_buf, &signal_buf, &output_buf, params.workgroups());

        let raw = output_buf.read_f32(device, queue)?;

        Ok(raw
            .chunks(bins.count)
            .map(|row| {
                row.iter()
                    .zip(bins.iter())
                    .map(|(&mag, k)| spectrum::amplitude(k, width, mag))
                    .collect()
            })
            .collect())
    }

    fn check_limits(&self, params: &DftParams, signal_len: usize) -> Result<()> {
        let limits = self.runtime.device().limits();
        let (x, y, _) = params.workgroups();
        let max_groups = limits.max_compute_workgroups_per_dimension;
        if x > max_groups || y > max_groups {
            return Err(Error::gpu(format!(
                "dispatch of {}x{} workgroups exceeds device limit {}",
                x, y, max_groups
            )));
        }

        let largest = signal_len.max(params.output_len()) * std::mem::size_of::<f32>();
        if largest as u64 > limits.max_storage_buffer_binding_size as u64 {
            return Err(Error::gpu(format!(
                "{} byte buffer exceeds device binding limit {}",
                largest, limits.max_storage_buffer_binding_size
            )));
        }

        Ok(())
    }

    fn transform_rows(&self, rows: &[Vec<f32>], width: usize, bins: BinRange, seconds: f32) -> Result<MultiSpectrum> {
        let flat: Vec<f32> = rows.iter().flatten().copied().collect();
        let channels = self.magnitudes(&flat, width, rows.len(), bins)?;
        Ok(MultiSpectrum::new(spectrum::frequencies(bins, seconds), channels))
    }
}

fn to_u32(value: usize, what: &str) -> Result<u32> {
    u32::try_from(value).map_err(|_| Error::gpu(format!("{} {} does not fit in u32", what, value)))
}

impl std::fmt::Debug for GpuTransform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GpuTransform")
            .field("runtime", &self.runtime)
            .finish_non_exhaustive()
    }
}

impl TransformLibrary for GpuTransform {
    fn name(&self) -> &'static str {
        "gpu"
    }

    fn dft(&self, series: &[f32], seconds: f32) -> Result<Spectrum> {
        spectrum::validate_series(series, seconds)?;

        let bins = spectrum::full_bins(series.len());
        let mut channels = self.magnitudes(series, series.len(), 1, bins)?;
        let magnitudes = channels.pop().unwrap_or_default();

        Ok(Spectrum::new(spectrum::frequencies(bins, seconds), magnitudes))
    }

    fn multi_dft(&self, rows: &[Vec<f32>], seconds: f32) -> Result<MultiSpectrum> {
        let width = spectrum::validate_rows(rows, seconds)?;
        self.transform_rows(rows, width, spectrum::full_bins(width), seconds)
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
        self.transform_rows(rows, width, bins, seconds)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transform::CpuTransform;
    use std::f32::consts::TAU;

    fn assert_close(a: &[f32], b: &[f32]) {
        assert_eq!(a.len(), b.len());
        for (x, y) in a.iter().zip(b) {
            assert!((x - y).abs() < 1e-3, "{} vs {}", x, y);
        }
    }

    #[test]
    fn test_gpu_matches_cpu() {
        // Requires a GPU adapter; skipped when none is present.
        let Ok(gpu) = GpuTransform::new() else {
            return;
        };
        let cpu = CpuTransform::new();

        let rows: Vec<Vec<f32>> = [3.0f32, 7.0]
            .iter()
            .map(|&f| (0..64).map(|i| (TAU * f * i as f32 / 64.0).sin()).collect())
            .collect();

        let g = gpu.multi_dft(&rows, 1.0).unwrap();
        let c = cpu.multi_dft(&rows, 1.0).unwrap();
        assert_eq!(g.frequencies, c.frequencies);
        for (gr, cr) in g.channels.iter().zip(&c.channels) {
            assert_close(gr, cr);
        }

        let g = gpu.multi_dft_bandpass(&rows, 1.0, 2.0, 8.0).unwrap();
        let c = cpu.multi_dft_bandpass(&rows, 1.0, 2.0, 8.0).unwrap();
        assert_eq!(g.frequencies, c.frequencies);
        assert_close(&g.channels[1], &c.channels[1]);
    }

    #[test]
    fn test_gpu_rejects_invalid_input() {
        let Ok(gpu) = GpuTransform::new() else {
            return;
        };
        assert!(gpu.dft(&[], 1.0).is_err());
        assert!(gpu.multi_dft(&[vec![1.0], vec![1.0, 2.0]], 1.0).is_err());
    }
}
