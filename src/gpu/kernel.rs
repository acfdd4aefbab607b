//! DFT compute kernel.

use super::buffer::GpuBuffer;
use crate::error::{Error, Result};
use wgpu;

pub const WORKGROUP_SIZE: u32 = 64;

// One invocation per (bin, channel). Writes raw |X_k|; scaling happens on
// the host so CPU and GPU share the same amplitude rules.
const DFT_SHADER: &str = r#"
struct Params {
    n_samples: u32,
    n_channels: u32,
    bin_start: u32,
    bin_count: u32,
};

@group(0) @binding(0) var<uniform> params: Params;
@group(0) @binding(1) var<storage, read> signal: array<f32>;
@group(0) @binding(2) var<storage, read_write> magnitudes: array<f32>;

const TAU: f32 = 6.283185307179586;

@compute @workgroup_size(64)
fn main(@builtin(global_invocation_id) global_id: vec3<u32>) {
    let bin = global_id.x;
    let channel = global_id.y;
    if (bin >= params.bin_count || channel >= params.n_channels) {
        return;
    }

    let n = params.n_samples;
    let k = params.bin_start + bin;
    let base = channel * n;

    var re: f32 = 0.0;
    var im: f32 = 0.0;
    var idx: u32 = 0u;
    for (var i: u32 = 0u; i < n; i = i + 1u) {
        let phase = TAU * f32(idx) / f32(n);
        let x = signal[base + i];
        re = re + x * cos(phase);
        im = im - x * sin(phase);
        idx = (idx + k) % n;
    }

    magnitudes[channel * params.bin_count + bin] = sqrt(re * re + im * im);
}
"#;

/// Uniform block matching `Params` in the shader.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct DftParams {
    pub n_samples: u32,
    pub n_channels: u32,
    pub bin_start: u32,
    pub bin_count: u32,
}

impl DftParams {
    pub fn workgroups(&self) -> (u32, u32, u32) {
        let x = (self.bin_count + WORKGROUP_SIZE - 1) / WORKGROUP_SIZE;
        (x.max(1), self.n_channels.max(1), 1)
    }

    pub fn output_len(&self) -> usize {
        self.n_channels as usize * self.bin_count as usize
    }
}

/// Compiled DFT pipeline ready for execution
#[derive(Debug)]
pub struct CompiledKernel {
    pipeline: wgpu::ComputePipeline,
    bind_group_layout: wgpu::BindGroupLayout,
}

impl CompiledKernel {
    /// Compile the DFT shader. Validation errors are reported instead of
    /// reaching the device's uncaptured-error handler.
    pub fn compile(device: &wgpu::Device) -> Result<Self> {
        device.push_error_scope(wgpu::ErrorFilter::Validation);

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("spectra-dft-shader"),
            source: wgpu::ShaderSource::Wgsl(DFT_SHADER.into()),
        });

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("spectra-dft-layout"),
            entries: &[
                layout_entry(0, wgpu::BufferBindingType::Uniform),
                layout_entry(1, wgpu::BufferBindingType::Storage { read_only: true }),
                layout_entry(2, wgpu::BufferBindingType::Storage { read_only: false }),
            ],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("spectra-dft-pipeline-layout"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });

        let pipeline = device.create_compute_pipeline(&wgpu::ComputePipelineDescriptor {
            label: Some("spectra-dft-pipeline"),
            layout: Some(&pipeline_layout),
            module: &shader,
            entry_point: "main",
        });

        if let Some(err) = futures::executor::block_on(device.pop_error_scope()) {
            return Err(Error::gpu(format!("DFT kernel failed to compile: {}", err)));
        }

        Ok(Self {
            pipeline,
            bind_group_layout,
        })
    }

    /// Record and submit one dispatch.
    pub fn execute(
        &self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        params: &GpuBuffer,
        signal: &GpuBuffer,
        output: &GpuBuffer,
        workgroups: (u32, u32, u32),
    ) {
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("spectra-dft-bind-group"),
            layout: &self.bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: params.buffer().as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: signal.buffer().as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: output.buffer().as_entire_binding(),
                },
            ],
        });

        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("spectra-dft-encoder"),
        });

        {
            let mut compute_pass = encoder.begin_compute_pass(&wgpu::ComputePassDescriptor {
                label: Some("spectra-dft-pass"),
                timestamp_writes: None,
            });

            compute_pass.set_pipeline(&self.pipeline);
            compute_pass.set_bind_group(0, &bind_group, &[]);

            let (x, y, z) = workgroups;
            compute_pass.dispatch_workgroups(x, y, z);
        }

        queue.submit(Some(encoder.finish()));
    }
}

fn layout_entry(binding: u32, ty: wgpu::BufferBindingType) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility: wgpu::ShaderStages::COMPUTE,
        ty: wgpu::BindingType::Buffer {
            ty,
            has_dynamic_offset: false,
            min_binding_size: None,
        },
        count: None,
    }
}
