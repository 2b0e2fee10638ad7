use std::borrow::Cow;
use std::fmt;

use wgpu::naga;

use super::geometry::QuadVertex;

/// Pipeline stage a source string is compiled for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageKind {
    Vertex,
    Fragment,
}

impl StageKind {
    fn naga_stage(self) -> naga::ShaderStage {
        match self {
            StageKind::Vertex => naga::ShaderStage::Vertex,
            StageKind::Fragment => naga::ShaderStage::Fragment,
        }
    }

    fn label(self) -> &'static str {
        match self {
            StageKind::Vertex => "wireshade vertex",
            StageKind::Fragment => "wireshade fragment",
        }
    }
}

impl fmt::Display for StageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StageKind::Vertex => f.write_str("vertex"),
            StageKind::Fragment => f.write_str("fragment"),
        }
    }
}

/// Compile or link failure, carrying the backend's diagnostic log.
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    #[error("{stage} shader failed to compile:\n{log}")]
    Compile { stage: StageKind, log: String },
    #[error("shader program failed to link:\n{log}")]
    Link { log: String },
}

/// Linked full-screen quad pipeline plus the uniform layout it was built
/// against.
pub(crate) struct QuadProgram {
    pub pipeline: wgpu::RenderPipeline,
    pub uniform_layout: wgpu::BindGroupLayout,
}

impl QuadProgram {
    /// Compiles both stages, then links them into a render pipeline.
    ///
    /// Either stage failing short-circuits before link is attempted; the
    /// failed module is dropped on the spot and the diagnostic goes to the
    /// operator log.
    pub(crate) fn build(
        device: &wgpu::Device,
        format: wgpu::TextureFormat,
        vertex_source: &str,
        fragment_source: &str,
    ) -> Result<Self, BuildError> {
        let vertex = compile_stage(device, StageKind::Vertex, vertex_source)?;
        let fragment = compile_stage(device, StageKind::Fragment, fragment_source)?;
        link(device, format, &vertex, &fragment)
    }
}

/// Compiles one GLSL stage into a shader module.
///
/// `wgpu` reports naga frontend errors through the validation error scope
/// rather than a return value, so the creation call is bracketed by a
/// push/pop pair and the popped error becomes the typed failure.
fn compile_stage(
    device: &wgpu::Device,
    stage: StageKind,
    source: &str,
) -> Result<wgpu::ShaderModule, BuildError> {
    device.push_error_scope(wgpu::ErrorFilter::Validation);
    let module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some(stage.label()),
        source: wgpu::ShaderSource::Glsl {
            shader: Cow::Borrowed(source),
            stage: stage.naga_stage(),
            defines: &[],
        },
    });
    match pollster::block_on(device.pop_error_scope()) {
        Some(error) => {
            let log = error.to_string();
            tracing::error!(stage = %stage, "shader compilation failed:\n{log}");
            drop(module);
            Err(BuildError::Compile { stage, log })
        }
        None => {
            tracing::debug!(stage = %stage, "compiled shader stage");
            Ok(module)
        }
    }
}

/// Links the two compiled stages into the quad pipeline.
fn link(
    device: &wgpu::Device,
    format: wgpu::TextureFormat,
    vertex: &wgpu::ShaderModule,
    fragment: &wgpu::ShaderModule,
) -> Result<QuadProgram, BuildError> {
    let uniform_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some("uniform layout"),
        entries: &[wgpu::BindGroupLayoutEntry {
            binding: 0,
            visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Uniform,
                has_dynamic_offset: false,
                min_binding_size: None,
            },
            count: None,
        }],
    });

    device.push_error_scope(wgpu::ErrorFilter::Validation);
    let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some("quad pipeline layout"),
        bind_group_layouts: &[&uniform_layout],
        push_constant_ranges: &[],
    });
    let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some("quad pipeline"),
        layout: Some(&pipeline_layout),
        vertex: wgpu::VertexState {
            module: vertex,
            entry_point: Some("main"),
            buffers: &[QuadVertex::layout()],
            compilation_options: wgpu::PipelineCompilationOptions::default(),
        },
        primitive: wgpu::PrimitiveState {
            topology: wgpu::PrimitiveTopology::TriangleStrip,
            strip_index_format: None,
            front_face: wgpu::FrontFace::Ccw,
            cull_mode: None,
            unclipped_depth: false,
            polygon_mode: wgpu::PolygonMode::Fill,
            conservative: false,
        },
        depth_stencil: None,
        multisample: wgpu::MultisampleState::default(),
        fragment: Some(wgpu::FragmentState {
            module: fragment,
            entry_point: Some("main"),
            targets: &[Some(wgpu::ColorTargetState {
                format,
                blend: Some(wgpu::BlendState::REPLACE),
                write_mask: wgpu::ColorWrites::ALL,
            })],
            compilation_options: wgpu::PipelineCompilationOptions::default(),
        }),
        multiview: None,
        cache: None,
    });
    match pollster::block_on(device.pop_error_scope()) {
        Some(error) => {
            let log = error.to_string();
            tracing::error!("shader program link failed:\n{log}");
            drop(pipeline);
            Err(BuildError::Link { log })
        }
        None => {
            tracing::info!("linked quad pipeline");
            Ok(QuadProgram {
                pipeline,
                uniform_layout,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stage_labels_match_pipeline_names() {
        assert_eq!(StageKind::Vertex.to_string(), "vertex");
        assert_eq!(StageKind::Fragment.to_string(), "fragment");
    }

    #[test]
    fn build_errors_carry_the_backend_log() {
        let compile = BuildError::Compile {
            stage: StageKind::Fragment,
            log: "expected ';' at line 4".into(),
        };
        let rendered = compile.to_string();
        assert!(rendered.contains("fragment shader failed to compile"));
        assert!(rendered.contains("expected ';' at line 4"));

        let link = BuildError::Link {
            log: "location 0 mismatch".into(),
        };
        assert!(link.to_string().contains("location 0 mismatch"));
    }
}
