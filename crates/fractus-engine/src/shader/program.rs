use std::collections::HashSet;

use super::error::ShaderError;
use super::link::{compile_program, LinkedProgram};
use super::uniforms::{UniformLocation, UniformStorage, UniformValue};

/// A linked program with its GPU-side resources.
///
/// Uniform values are staged in a CPU shadow (`UniformStorage`) and uploaded by
/// `flush`, so any number of `set_uniform` calls cost at most one buffer write
/// per binding per frame.
pub struct ShaderProgram {
    linked: LinkedProgram,

    vertex_module: wgpu::ShaderModule,
    fragment_module: wgpu::ShaderModule,

    pipeline_layout: wgpu::PipelineLayout,
    /// Indexed by group; groups without uniforms get an empty group.
    bind_groups: Vec<wgpu::BindGroup>,

    /// Parallel to `storage.blocks()`.
    buffers: Vec<wgpu::Buffer>,
    storage: UniformStorage,

    warned_mismatch: HashSet<UniformLocation>,
}

impl ShaderProgram {
    /// Compiles, links and uploads a program.
    pub fn compile(
        device: &wgpu::Device,
        vertex_src: &str,
        fragment_src: &str,
    ) -> Result<Self, ShaderError> {
        let linked = compile_program(vertex_src, fragment_src)?;
        Ok(Self::from_linked(device, linked))
    }

    /// Creates GPU resources for an already linked program.
    pub fn from_linked(device: &wgpu::Device, linked: LinkedProgram) -> Self {
        let vertex_module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("fractus vertex shader"),
            source: wgpu::ShaderSource::Wgsl(linked.vertex().source().to_owned().into()),
        });
        let fragment_module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("fractus fragment shader"),
            source: wgpu::ShaderSource::Wgsl(linked.fragment().source().to_owned().into()),
        });

        let storage = UniformStorage::new(linked.bindings());
        let buffers: Vec<wgpu::Buffer> = storage
            .blocks()
            .iter()
            .map(|block| {
                device.create_buffer(&wgpu::BufferDescriptor {
                    label: Some("fractus uniform buffer"),
                    size: block.bytes().len() as u64,
                    usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
                    mapped_at_creation: false,
                })
            })
            .collect();

        let group_count = linked
            .bindings()
            .iter()
            .map(|b| b.group + 1)
            .max()
            .unwrap_or(0);

        let mut bind_group_layouts = Vec::with_capacity(group_count as usize);
        let mut bind_groups = Vec::with_capacity(group_count as usize);

        for group in 0..group_count {
            let members: Vec<usize> = linked
                .bindings()
                .iter()
                .enumerate()
                .filter(|(_, b)| b.group == group)
                .map(|(i, _)| i)
                .collect();

            let layout_entries: Vec<wgpu::BindGroupLayoutEntry> = members
                .iter()
                .map(|&i| {
                    let b = &linked.bindings()[i];
                    wgpu::BindGroupLayoutEntry {
                        binding: b.binding,
                        visibility: b.visibility,
                        ty: wgpu::BindingType::Buffer {
                            ty: wgpu::BufferBindingType::Uniform,
                            has_dynamic_offset: false,
                            min_binding_size: None,
                        },
                        count: None,
                    }
                })
                .collect();

            let layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("fractus uniform bgl"),
                entries: &layout_entries,
            });

            let entries: Vec<wgpu::BindGroupEntry<'_>> = members
                .iter()
                .map(|&i| wgpu::BindGroupEntry {
                    binding: linked.bindings()[i].binding,
                    resource: buffers[i].as_entire_binding(),
                })
                .collect();

            let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some("fractus uniform bind group"),
                layout: &layout,
                entries: &entries,
            });

            bind_group_layouts.push(layout);
            bind_groups.push(bind_group);
        }

        let layout_refs: Vec<&wgpu::BindGroupLayout> = bind_group_layouts.iter().collect();
        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("fractus pipeline layout"),
            bind_group_layouts: &layout_refs,
            immediate_size: 0,
        });

        log::info!(
            "shader program ready: {} active uniform(s), {} bind group(s)",
            linked.uniforms().len(),
            group_count
        );

        Self {
            linked,
            vertex_module,
            fragment_module,
            pipeline_layout,
            bind_groups,
            buffers,
            storage,
            warned_mismatch: HashSet::new(),
        }
    }

    pub fn linked(&self) -> &LinkedProgram {
        &self.linked
    }

    pub fn uniform_location(&self, name: &str) -> Option<UniformLocation> {
        self.linked.uniform_location(name).copied()
    }

    pub fn vertex_module(&self) -> &wgpu::ShaderModule {
        &self.vertex_module
    }

    pub fn fragment_module(&self) -> &wgpu::ShaderModule {
        &self.fragment_module
    }

    pub fn vertex_entry(&self) -> &str {
        self.linked.vertex().entry_point()
    }

    pub fn fragment_entry(&self) -> &str {
        self.linked.fragment().entry_point()
    }

    pub fn pipeline_layout(&self) -> &wgpu::PipelineLayout {
        &self.pipeline_layout
    }

    /// Stages `value` for upload at the next `flush`.
    ///
    /// `None` (a uniform the program does not have) is a no-op. A value whose
    /// kind differs from the location's is dropped with a one-time warning.
    pub fn set_uniform(&mut self, location: Option<&UniformLocation>, value: UniformValue) {
        let Some(location) = location else { return };

        if !self.storage.write(location, value) && self.warned_mismatch.insert(*location) {
            log::warn!(
                "uniform at @group({}) @binding({}) offset {} is {}; ignoring {} value",
                location.group,
                location.binding,
                location.offset,
                location.kind,
                value.kind()
            );
        }
    }

    /// Uploads every uniform buffer changed since the last flush.
    pub fn flush(&mut self, queue: &wgpu::Queue) {
        let buffers = &self.buffers;
        self.storage.flush_with(|i, bytes| {
            queue.write_buffer(&buffers[i], 0, bytes);
        });
    }

    /// Binds the program's uniform groups. The pipeline is set by the caller.
    pub fn bind(&self, rpass: &mut wgpu::RenderPass<'_>) {
        for (group, bind_group) in self.bind_groups.iter().enumerate() {
            rpass.set_bind_group(group as u32, bind_group, &[]);
        }
    }
}
