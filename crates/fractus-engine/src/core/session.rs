use std::fmt;

use crate::camera::{CameraConfig, ViewportCamera};
use crate::coords::FrameSize;
use crate::geometry::{GeometryDescription, GeometryHandle, GeometryShapeError};
use crate::input::InputEvent;
use crate::paint::Color;
use crate::render::{FractalRenderer, FrameUniforms};
use crate::shader::{ShaderError, ShaderProgram};
use crate::time::{Clock, SystemClock};

use super::app::AppControl;
use super::ctx::FrameCtx;
use super::render_loop::{CancelToken, FpsSink, FrameTarget, RenderLoop};

/// Fatal failure while assembling a session.
#[derive(Debug, Clone, PartialEq)]
pub enum SetupError {
    Shader(ShaderError),
    Geometry(GeometryShapeError),
}

impl fmt::Display for SetupError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SetupError::Shader(e) => e.fmt(f),
            SetupError::Geometry(e) => write!(f, "invalid geometry: {e}"),
        }
    }
}

impl std::error::Error for SetupError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SetupError::Shader(e) => Some(e),
            SetupError::Geometry(e) => Some(e),
        }
    }
}

impl From<ShaderError> for SetupError {
    fn from(e: ShaderError) -> Self {
        SetupError::Shader(e)
    }
}

impl From<GeometryShapeError> for SetupError {
    fn from(e: GeometryShapeError) -> Self {
        SetupError::Geometry(e)
    }
}

/// Everything one fractal view needs: program + geometry (inside the
/// renderer), camera and render loop.
pub struct Session<C: Clock = SystemClock> {
    renderer: FractalRenderer,
    camera: ViewportCamera,
    render_loop: RenderLoop<C>,
}

impl Session<SystemClock> {
    pub fn new(
        device: &wgpu::Device,
        frame: FrameSize,
        vertex_src: &str,
        fragment_src: &str,
        geometry: &GeometryDescription,
        camera: &CameraConfig,
    ) -> Result<Self, SetupError> {
        Self::with_clock(
            device,
            frame,
            vertex_src,
            fragment_src,
            geometry,
            camera,
            SystemClock::new(),
        )
    }
}

impl<C: Clock> Session<C> {
    /// Builds the session in order: shader program, geometry, loop.
    ///
    /// Compile, link, geometry shape and the vertex input match are all
    /// checked here, before the first frame.
    pub fn with_clock(
        device: &wgpu::Device,
        frame: FrameSize,
        vertex_src: &str,
        fragment_src: &str,
        geometry: &GeometryDescription,
        camera: &CameraConfig,
        clock: C,
    ) -> Result<Self, SetupError> {
        let program = ShaderProgram::compile(device, vertex_src, fragment_src)
            .inspect_err(|e| log::error!("{e}"))?;

        let geometry = GeometryHandle::setup(device, geometry)
            .inspect_err(|e| log::error!("invalid geometry: {e}"))?;

        program
            .linked()
            .check_vertex_inputs(geometry.layouts())
            .map_err(ShaderError::from)
            .inspect_err(|e| log::error!("{e}"))?;

        let renderer = FractalRenderer::new(program, geometry);

        let camera = ViewportCamera::from_config(camera, frame);
        log::info!(
            "session ready: center ({}, {}), scale {}",
            camera.center().x,
            camera.center().y,
            camera.scale()
        );

        Ok(Self {
            renderer,
            camera,
            render_loop: RenderLoop::new(clock),
        })
    }

    pub fn camera(&self) -> &ViewportCamera {
        &self.camera
    }

    pub fn camera_mut(&mut self) -> &mut ViewportCamera {
        &mut self.camera
    }

    pub fn renderer(&self) -> &FractalRenderer {
        &self.renderer
    }

    pub fn render_loop(&self) -> &RenderLoop<C> {
        &self.render_loop
    }

    pub fn cancel_token(&self) -> CancelToken {
        self.render_loop.cancel_token()
    }

    /// Feeds an input event to the camera. Returns whether it was consumed.
    pub fn handle_input(&mut self, event: &InputEvent) -> bool {
        self.camera.handle_input(event)
    }

    /// Renders one frame into the window.
    pub fn frame(
        &mut self,
        ctx: &mut FrameCtx<'_, '_>,
        clear: Color,
        sink: &mut impl FpsSink,
    ) -> AppControl {
        let Session {
            renderer,
            camera,
            render_loop,
        } = self;

        let mut target = GpuFrameTarget {
            ctx,
            renderer,
            clear,
        };
        render_loop.tick(camera, &mut target, sink)
    }
}

/// `FrameTarget` backed by the window surface.
struct GpuFrameTarget<'s, 'a, 'w> {
    ctx: &'s mut FrameCtx<'a, 'w>,
    renderer: &'s mut FractalRenderer,
    clear: Color,
}

impl FrameTarget for GpuFrameTarget<'_, '_, '_> {
    fn frame_size(&self) -> FrameSize {
        self.ctx.gpu.frame_size()
    }

    fn draw(&mut self, uniforms: &FrameUniforms) -> AppControl {
        // Minimized: nothing to draw into.
        if !self.ctx.gpu.frame_size().is_valid() {
            return AppControl::Continue;
        }

        let renderer = &mut *self.renderer;
        self.ctx.render(self.clear, |rctx, target| {
            renderer.render(rctx, target, uniforms);
        })
    }
}
