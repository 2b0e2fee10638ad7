use winit::dpi::PhysicalSize;

use super::context::GpuContext;
use super::geometry::QuadGeometry;
use super::program::{BuildError, QuadProgram};
use super::uniforms::UniformBindings;

/// Everything one frame needs, owned explicitly instead of captured in
/// globals: the GPU context, the linked pipeline, the quad, and the
/// uniform block.
pub(crate) struct RenderState {
    context: GpuContext,
    program: QuadProgram,
    geometry: QuadGeometry,
    uniforms: UniformBindings,
}

impl RenderState {
    /// Builds the program against the fetched sources and uploads the quad.
    ///
    /// The resolution uniform is seeded from the drawing buffer's size at
    /// this moment and is not rewritten afterwards, not even on resize.
    pub(crate) fn new(
        context: GpuContext,
        vertex_source: &str,
        fragment_source: &str,
    ) -> Result<Self, BuildError> {
        let program = QuadProgram::build(
            &context.device,
            context.config.format,
            vertex_source,
            fragment_source,
        )?;
        let geometry = QuadGeometry::upload(&context.device);
        let size = context.size();
        let uniforms = UniformBindings::new(
            &context.device,
            &program.uniform_layout,
            size.width,
            size.height,
        );
        Ok(Self {
            context,
            program,
            geometry,
            uniforms,
        })
    }

    pub(crate) fn size(&self) -> PhysicalSize<u32> {
        self.context.size()
    }

    /// Reconfigures the swapchain; the resolution uniform keeps its
    /// initialization-time value.
    pub(crate) fn resize(&mut self, new_size: PhysicalSize<u32>) {
        self.context.resize(new_size);
    }

    /// One render tick: write the time uniform, clear to opaque black,
    /// draw the quad strip, present.
    pub(crate) fn frame_tick(&mut self, clock_millis: f64) -> Result<(), wgpu::SurfaceError> {
        self.uniforms.write_time(&self.context.queue, clock_millis);

        let frame = self.context.surface.get_current_texture()?;
        let view = frame
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        let mut encoder =
            self.context
                .device
                .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                    label: Some("frame encoder"),
                });

        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("quad pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    depth_slice: None,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                occlusion_query_set: None,
                timestamp_writes: None,
            });
            render_pass.set_pipeline(&self.program.pipeline);
            render_pass.set_bind_group(0, &self.uniforms.bind_group, &[]);
            render_pass.set_vertex_buffer(0, self.geometry.buffer.slice(..));
            render_pass.draw(0..QuadGeometry::vertex_count(), 0..1);
        }

        self.context.queue.submit(std::iter::once(encoder.finish()));
        frame.present();
        Ok(())
    }
}
