use crate::camera::ViewportCamera;
use crate::coords::{FrameSize, ViewportRect};
use crate::geometry::GeometryHandle;
use crate::shader::{ShaderProgram, UniformLocation, UniformValue};

use super::{RenderCtx, RenderTarget};

/// Values pushed to the shader every frame.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct FrameUniforms {
    pub viewport: ViewportRect,
    pub min_dim: f32,
}

impl FrameUniforms {
    pub fn from_camera(camera: &ViewportCamera, frame: FrameSize) -> Self {
        Self {
            viewport: camera.compute_viewport(frame),
            min_dim: frame.min_dim().max(1.0),
        }
    }
}

/// Locations of the per-frame uniforms, looked up once.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct UniformSlots {
    pub viewportx: Option<UniformLocation>,
    pub viewporty: Option<UniformLocation>,
    pub min_dim: Option<UniformLocation>,
}

impl UniformSlots {
    pub const VIEWPORT_X: &'static str = "viewportx";
    pub const VIEWPORT_Y: &'static str = "viewporty";
    pub const MIN_DIM: &'static str = "minDim";

    /// Looks the slots up in `program`, warning once per missing name.
    pub fn resolve(program: &ShaderProgram) -> Self {
        let lookup = |name: &str| {
            let loc = program.uniform_location(name);
            if loc.is_none() {
                log::warn!("shader has no active uniform '{name}'; it will not be updated");
            }
            loc
        };

        Self {
            viewportx: lookup(Self::VIEWPORT_X),
            viewporty: lookup(Self::VIEWPORT_Y),
            min_dim: lookup(Self::MIN_DIM),
        }
    }
}

/// Draws the fractal: one program over one static geometry.
pub struct FractalRenderer {
    program: ShaderProgram,
    geometry: GeometryHandle,
    slots: UniformSlots,

    pipeline_format: Option<wgpu::TextureFormat>,
    pipeline: Option<wgpu::RenderPipeline>,
}

impl FractalRenderer {
    pub fn new(program: ShaderProgram, geometry: GeometryHandle) -> Self {
        let slots = UniformSlots::resolve(&program);
        Self {
            program,
            geometry,
            slots,
            pipeline_format: None,
            pipeline: None,
        }
    }

    pub fn program(&self) -> &ShaderProgram {
        &self.program
    }

    pub fn geometry(&self) -> &GeometryHandle {
        &self.geometry
    }

    pub fn slots(&self) -> UniformSlots {
        self.slots
    }

    /// Pushes `uniforms` and draws into `target`.
    pub fn render(&mut self, ctx: &RenderCtx<'_>, target: &mut RenderTarget<'_>, uniforms: &FrameUniforms) {
        self.ensure_pipeline(ctx);

        let slots = self.slots;
        let vp = uniforms.viewport;
        self.program.set_uniform(slots.viewportx.as_ref(), UniformValue::Vec2(vp.x));
        self.program.set_uniform(slots.viewporty.as_ref(), UniformValue::Vec2(vp.y));
        self.program.set_uniform(slots.min_dim.as_ref(), UniformValue::F32(uniforms.min_dim));
        self.program.flush(ctx.queue);

        let Some(pipeline) = self.pipeline.as_ref() else { return };

        let mut rpass = target.encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("fractus fractal pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: target.color_view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Load,
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
            multiview_mask: None,
        });

        rpass.set_pipeline(pipeline);
        self.program.bind(&mut rpass);
        self.geometry.draw(&mut rpass);
    }

    fn ensure_pipeline(&mut self, ctx: &RenderCtx<'_>) {
        if self.pipeline_format == Some(ctx.surface_format) && self.pipeline.is_some() {
            return;
        }

        let buffers = self.geometry.vertex_buffer_layouts();
        let draw = self.geometry.draw_descriptor();

        let pipeline = ctx.device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("fractus fractal pipeline"),
            layout: Some(self.program.pipeline_layout()),

            vertex: wgpu::VertexState {
                module: self.program.vertex_module(),
                entry_point: Some(self.program.vertex_entry()),
                compilation_options: Default::default(),
                buffers: &buffers,
            },

            fragment: Some(wgpu::FragmentState {
                module: self.program.fragment_module(),
                entry_point: Some(self.program.fragment_entry()),
                compilation_options: Default::default(),
                targets: &[Some(wgpu::ColorTargetState {
                    format: ctx.surface_format,
                    blend: Some(wgpu::BlendState::REPLACE),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),

            primitive: wgpu::PrimitiveState {
                topology: draw.topology,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: None,
                polygon_mode: wgpu::PolygonMode::Fill,
                unclipped_depth: false,
                conservative: false,
            },

            // Flat full-frame draw; depth is only cleared.
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            multiview_mask: None,
            cache: None,
        });

        log::debug!("fractal pipeline built for {:?}", ctx.surface_format);

        self.pipeline_format = Some(ctx.surface_format);
        self.pipeline = Some(pipeline);
    }
}
