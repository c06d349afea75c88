use crate::coords::FrameSize;

/// Renderer-facing context (device/queue + surface format + frame size).
pub struct RenderCtx<'a> {
    pub device: &'a wgpu::Device,
    pub queue: &'a wgpu::Queue,
    pub surface_format: wgpu::TextureFormat,
    /// Physical pixels.
    pub frame: FrameSize,
}

impl<'a> RenderCtx<'a> {
    #[inline]
    pub fn new(
        device: &'a wgpu::Device,
        queue: &'a wgpu::Queue,
        surface_format: wgpu::TextureFormat,
        frame: FrameSize,
    ) -> Self {
        Self {
            device,
            queue,
            surface_format,
            frame,
        }
    }
}

/// Target for drawing (encoder + color view). The view is already cleared.
pub struct RenderTarget<'a> {
    pub encoder: &'a mut wgpu::CommandEncoder,
    pub color_view: &'a wgpu::TextureView,
}

impl<'a> RenderTarget<'a> {
    #[inline]
    pub fn new(
        encoder: &'a mut wgpu::CommandEncoder,
        color_view: &'a wgpu::TextureView,
    ) -> Self {
        Self { encoder, color_view }
    }
}
