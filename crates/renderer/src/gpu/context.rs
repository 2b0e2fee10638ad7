use raw_window_handle::{HasDisplayHandle, HasWindowHandle};
use winit::dpi::PhysicalSize;

/// Failure to bring up the graphics backend.
///
/// This is the one error the binary surfaces directly to the user; every
/// other failure stays in the operator log.
#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    #[error("failed to acquire a window or display handle: {0}")]
    Handle(String),
    #[error("failed to create a rendering surface")]
    Surface(#[source] wgpu::CreateSurfaceError),
    #[error("no compatible GPU adapter is available")]
    NoAdapter(#[source] wgpu::RequestAdapterError),
    #[error("failed to create a GPU device")]
    Device(#[source] wgpu::RequestDeviceError),
}

/// Surface, device, and queue for one window.
///
/// The layout mirrors the lifetime relationship between objects: the
/// instance outlives the surface, the surface is configured against the
/// device, and the queue accepts the per-frame command buffers.
pub(crate) struct GpuContext {
    /// `wgpu` instance that produced the surface; kept alive for the surface lifetime.
    _instance: wgpu::Instance,
    pub surface: wgpu::Surface<'static>,
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
    pub config: wgpu::SurfaceConfiguration,
    size: PhysicalSize<u32>,
}

impl GpuContext {
    /// Acquires the adapter, device, and configured surface for `target`.
    pub(crate) fn new<T>(target: &T, initial_size: PhysicalSize<u32>) -> Result<Self, BackendError>
    where
        T: HasDisplayHandle + HasWindowHandle,
    {
        let instance = wgpu::Instance::default();
        let window_handle = target
            .window_handle()
            .map_err(|err| BackendError::Handle(err.to_string()))?;
        let display_handle = target
            .display_handle()
            .map_err(|err| BackendError::Handle(err.to_string()))?;
        let surface = unsafe {
            instance.create_surface_unsafe(wgpu::SurfaceTargetUnsafe::RawHandle {
                raw_display_handle: display_handle.as_raw(),
                raw_window_handle: window_handle.as_raw(),
            })
        }
        .map_err(BackendError::Surface)?;

        let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::HighPerformance,
            compatible_surface: Some(&surface),
            force_fallback_adapter: false,
        }))
        .map_err(BackendError::NoAdapter)?;

        let device_descriptor = wgpu::DeviceDescriptor {
            label: Some("wireshade device"),
            required_features: wgpu::Features::empty(),
            required_limits: adapter.limits(),
            memory_hints: wgpu::MemoryHints::default(),
            trace: wgpu::Trace::default(),
        };
        let (device, queue) = pollster::block_on(adapter.request_device(&device_descriptor))
            .map_err(BackendError::Device)?;

        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .copied()
            .find(|format| format.is_srgb())
            .unwrap_or(surface_caps.formats[0]);

        let size = PhysicalSize::new(initial_size.width.max(1), initial_size.height.max(1));
        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width,
            height: size.height,
            present_mode: surface_caps.present_modes[0],
            alpha_mode: surface_caps.alpha_modes[0],
            view_formats: vec![],
            desired_maximum_frame_latency: 1,
        };
        surface.configure(&device, &config);
        tracing::info!(
            width = size.width,
            height = size.height,
            format = ?surface_format,
            "configured rendering surface"
        );

        Ok(Self {
            _instance: instance,
            surface,
            device,
            queue,
            config,
            size,
        })
    }

    /// Current surface size in physical pixels.
    pub(crate) fn size(&self) -> PhysicalSize<u32> {
        self.size
    }

    /// Reconfigures the swapchain to match the new size.
    pub(crate) fn resize(&mut self, new_size: PhysicalSize<u32>) {
        if new_size.width == 0 || new_size.height == 0 {
            return;
        }
        self.size = new_size;
        self.config.width = new_size.width;
        self.config.height = new_size.height;
        self.surface.configure(&self.device, &self.config);
    }
}
