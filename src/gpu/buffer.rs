//! GPU buffer helpers: upload, allocate, read back.

use crate::error::{Error, Result};
use wgpu::util::DeviceExt;

/// GPU buffer wrapper
#[derive(Debug)]
pub struct GpuBuffer {
    buffer: wgpu::Buffer,
    size: u64,
}

impl GpuBuffer {
    /// Storage buffer initialised with `data`.
    pub fn storage_from(device: &wgpu::Device, label: &str, data: &[f32]) -> Self {
        let contents: &[u8] = bytemuck::cast_slice(data);
        let buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(label),
            contents,
            usage: wgpu::BufferUsages::STORAGE | wgpu::BufferUsages::COPY_SRC,
        });

        Self {
            buffer,
            size: contents.len() as u64,
        }
    }

    /// Zeroed storage buffer for `len` floats.
    pub fn storage(device: &wgpu::Device, label: &str, len: usize) -> Self {
        let size = (len * std::mem::size_of::<f32>()) as u64;
        let buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some(label),
            size,
            usage: wgpu::BufferUsages::STORAGE | wgpu::BufferUsages::COPY_SRC,
            mapped_at_creation: false,
        });

        Self { buffer, size }
    }

    /// Uniform buffer holding one plain-old-data value.
    pub fn uniform<T: bytemuck::Pod>(device: &wgpu::Device, label: &str, value: &T) -> Self {
        let contents = bytemuck::bytes_of(value);
        let buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(label),
            contents,
            usage: wgpu::BufferUsages::UNIFORM,
        });

        Self {
            buffer,
            size: contents.len() as u64,
        }
    }

    /// Copy the buffer into a staging buffer and read it back as floats.
    ///
    /// Blocks until the GPU has finished all submitted work.
    pub fn read_f32(&self, device: &wgpu::Device, queue: &wgpu::Queue) -> Result<Vec<f32>> {
        let staging = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("spectra-staging-buffer"),
            size: self.size,
            usage: wgpu::BufferUsages::MAP_READ | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("spectra-readback-encoder"),
        });
        encoder.copy_buffer_to_buffer(&self.buffer, 0, &staging, 0, self.size);
        queue.submit(Some(encoder.finish()));

        let slice = staging.slice(..);
        let (tx, rx) = futures::channel::oneshot::channel();
        slice.map_async(wgpu::MapMode::Read, move |result| {
            let _ = tx.send(result);
        });
        device.poll(wgpu::Maintain::Wait);

        futures::executor::block_on(rx)
            .map_err(|_| Error::gpu("buffer map callback dropped"))?
            .map_err(|e| Error::gpu(format!("buffer map failed: {}", e)))?;

        let values = {
            let view = slice.get_mapped_range();
            bytemuck::cast_slice::<u8, f32>(&view).to_vec()
        };
        staging.unmap();

        Ok(values)
    }

    pub fn buffer(&self) -> &wgpu::Buffer {
        &self.buffer
    }

    /// Size in bytes.
    pub fn size(&self) -> u64 {
        self.size
    }
}
