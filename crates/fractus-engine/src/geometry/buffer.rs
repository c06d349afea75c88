use wgpu::util::DeviceExt;

use super::description::{
    AttributeLayout, DrawDescriptor, GeometryDescription, PreparedGeometry,
};
use super::error::GeometryShapeError;

/// Uploaded geometry: one vertex buffer per attribute plus a u16 index buffer.
///
/// Immutable after creation.
pub struct GeometryHandle {
    vertex_buffers: Vec<wgpu::Buffer>,
    index_buffer: wgpu::Buffer,
    layouts: Vec<AttributeLayout>,
    /// One single-attribute array per vertex buffer; borrowed by
    /// `vertex_buffer_layouts`.
    attributes: Vec<[wgpu::VertexAttribute; 1]>,
    draw: DrawDescriptor,
}

impl GeometryHandle {
    /// Validates `desc` and uploads it.
    pub fn setup(
        device: &wgpu::Device,
        desc: &GeometryDescription,
    ) -> Result<Self, GeometryShapeError> {
        let prepared = desc.prepare()?;
        Ok(Self::upload(device, &prepared))
    }

    pub fn upload(device: &wgpu::Device, geometry: &PreparedGeometry) -> Self {
        let vertex_buffers = geometry
            .attributes
            .iter()
            .map(|a| {
                device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                    label: Some("fractus attribute vbo"),
                    contents: bytemuck::cast_slice(&a.data),
                    usage: wgpu::BufferUsages::VERTEX,
                })
            })
            .collect();

        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("fractus ibo"),
            contents: bytemuck::cast_slice(&geometry.indices),
            usage: wgpu::BufferUsages::INDEX,
        });

        let layouts = geometry.layouts();
        let attributes = layouts
            .iter()
            .map(|l| {
                [wgpu::VertexAttribute {
                    format: l.vertex_format(),
                    offset: 0,
                    shader_location: l.slot,
                }]
            })
            .collect();

        log::info!(
            "geometry uploaded: {} vertices, {} triangles, {} attribute(s)",
            geometry.vertex_count,
            geometry.draw.count / 3,
            layouts.len()
        );

        Self {
            vertex_buffers,
            index_buffer,
            layouts,
            attributes,
            draw: geometry.draw,
        }
    }

    pub fn draw_descriptor(&self) -> DrawDescriptor {
        self.draw
    }

    pub fn layouts(&self) -> &[AttributeLayout] {
        &self.layouts
    }

    /// Vertex buffer layouts in slot order, for pipeline creation.
    pub fn vertex_buffer_layouts(&self) -> Vec<wgpu::VertexBufferLayout<'_>> {
        self.layouts
            .iter()
            .zip(&self.attributes)
            .map(|(l, attrs)| wgpu::VertexBufferLayout {
                array_stride: l.stride(),
                step_mode: wgpu::VertexStepMode::Vertex,
                attributes: attrs,
            })
            .collect()
    }

    /// Binds the vertex and index buffers and issues the indexed draw.
    pub fn draw(&self, rpass: &mut wgpu::RenderPass<'_>) {
        for (slot, vbo) in self.vertex_buffers.iter().enumerate() {
            rpass.set_vertex_buffer(slot as u32, vbo.slice(..));
        }
        rpass.set_index_buffer(self.index_buffer.slice(..), self.draw.index_format);
        rpass.draw_indexed(0..self.draw.count, 0, 0..1);
    }
}
