use bytemuck::{Pod, Zeroable};
use wgpu::util::DeviceExt;

/// CPU mirror of the shader's std140 uniform block.
///
/// The layout must match the `QuadParams` block declared by the fragment
/// shader: a vec2 resolution at offset 0, the time scalar at offset 8, and
/// explicit padding to the 16-byte std140 round-up.
#[repr(C, align(16))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct QuadUniforms {
    resolution: [f32; 2],
    time: f32,
    _padding: f32,
}

unsafe impl Zeroable for QuadUniforms {}
unsafe impl Pod for QuadUniforms {}

impl QuadUniforms {
    /// Seeds the block with the drawing buffer's size. The resolution is
    /// written here exactly once and never again.
    pub(crate) fn new(width: u32, height: u32) -> Self {
        Self {
            resolution: [width as f32, height as f32],
            time: 0.0,
            _padding: 0.0,
        }
    }

    /// Writes the elapsed time, scaling the raw clock value from
    /// milliseconds to seconds.
    pub(crate) fn set_time_millis(&mut self, clock_millis: f64) {
        self.time = (clock_millis * 0.001) as f32;
    }

    #[cfg(test)]
    pub(crate) fn time(&self) -> f32 {
        self.time
    }

    #[cfg(test)]
    pub(crate) fn resolution(&self) -> [f32; 2] {
        self.resolution
    }
}

/// Uniform buffer and bind group resolved once against the linked program.
pub(crate) struct UniformBindings {
    values: QuadUniforms,
    pub buffer: wgpu::Buffer,
    pub bind_group: wgpu::BindGroup,
}

impl UniformBindings {
    pub(crate) fn new(
        device: &wgpu::Device,
        layout: &wgpu::BindGroupLayout,
        width: u32,
        height: u32,
    ) -> Self {
        let values = QuadUniforms::new(width, height);
        let buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("quad uniforms"),
            contents: bytemuck::bytes_of(&values),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("quad uniform bind group"),
            layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: buffer.as_entire_binding(),
            }],
        });
        Self {
            values,
            buffer,
            bind_group,
        }
    }

    /// Advances the time uniform and mirrors the block into the GPU buffer.
    pub(crate) fn write_time(&mut self, queue: &wgpu::Queue, clock_millis: f64) {
        self.values.set_time_millis(clock_millis);
        queue.write_buffer(&self.buffer, 0, bytemuck::bytes_of(&self.values));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn block_matches_std140_size() {
        assert_eq!(std::mem::size_of::<QuadUniforms>(), 16);
        let values = QuadUniforms::new(1280, 720);
        let bytes = bytemuck::bytes_of(&values);
        let field = |offset: usize| {
            f32::from_ne_bytes(bytes[offset..offset + 4].try_into().unwrap())
        };
        assert_eq!(field(0), 1280.0);
        assert_eq!(field(4), 720.0);
        assert_eq!(field(8), 0.0);
    }

    #[test]
    fn time_is_clock_millis_scaled_to_seconds() {
        let mut values = QuadUniforms::new(640, 480);
        values.set_time_millis(1500.0);
        assert!((values.time() - 1.5).abs() < f32::EPSILON);
        values.set_time_millis(16.0);
        assert!((values.time() - 0.016).abs() < 1e-6);
    }

    #[test]
    fn time_tracks_a_monotonic_clock_monotonically() {
        let mut values = QuadUniforms::new(640, 480);
        let mut last = -1.0_f32;
        for millis in [0.0, 16.7, 33.4, 1000.0, 1000.0, 2500.0] {
            values.set_time_millis(millis);
            assert!(values.time() >= last);
            last = values.time();
        }
    }

    #[test]
    fn resolution_is_untouched_by_time_updates() {
        let mut values = QuadUniforms::new(1920, 1080);
        values.set_time_millis(42_000.0);
        assert_eq!(values.resolution(), [1920.0, 1080.0]);
    }
}
