use std::collections::{BTreeMap, HashMap};
use std::fmt;

use naga::{AddressSpace, Binding, ScalarKind, TypeInner, VectorSize};

use crate::geometry::AttributeLayout;

use super::compile::{compile_stage, Stage, StageModule};
use super::error::{ShaderError, ShaderLinkError};
use super::uniforms::{UniformBinding, UniformKind, UniformLocation};

/// Structural description of a WGSL type, comparable across modules.
///
/// Type handles are module-local, so the two stages cannot be compared by
/// handle.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum TypeShape {
    Scalar(naga::Scalar),
    Vector { size: u8, scalar: naga::Scalar },
    Matrix { columns: u8, rows: u8, scalar: naga::Scalar },
    Struct(Vec<(String, TypeShape)>),
    /// Arrays, textures, atomics... compared by byte size only.
    Opaque(u32),
}

fn vector_len(size: VectorSize) -> u8 {
    match size {
        VectorSize::Bi => 2,
        VectorSize::Tri => 3,
        VectorSize::Quad => 4,
    }
}

fn scalar_name(scalar: naga::Scalar) -> String {
    let prefix = match scalar.kind {
        ScalarKind::Float | ScalarKind::AbstractFloat => "f",
        ScalarKind::Sint | ScalarKind::AbstractInt => "i",
        ScalarKind::Uint => "u",
        ScalarKind::Bool => return "bool".to_string(),
    };
    format!("{prefix}{}", u32::from(scalar.width) * 8)
}

impl TypeShape {
    fn of(module: &naga::Module, ty: naga::Handle<naga::Type>) -> Self {
        let inner = &module.types[ty].inner;
        match *inner {
            TypeInner::Scalar(scalar) => TypeShape::Scalar(scalar),
            TypeInner::Vector { size, scalar } => TypeShape::Vector {
                size: vector_len(size),
                scalar,
            },
            TypeInner::Matrix { columns, rows, scalar } => TypeShape::Matrix {
                columns: vector_len(columns),
                rows: vector_len(rows),
                scalar,
            },
            TypeInner::Struct { ref members, .. } => TypeShape::Struct(
                members
                    .iter()
                    .map(|m| {
                        (
                            m.name.clone().unwrap_or_default(),
                            TypeShape::of(module, m.ty),
                        )
                    })
                    .collect(),
            ),
            _ => TypeShape::Opaque(inner.size(module.to_ctx())),
        }
    }

    /// Component count of a float scalar or vector; `None` for anything else.
    fn float_components(&self) -> Option<u32> {
        match *self {
            TypeShape::Scalar(s) if s == naga::Scalar::F32 => Some(1),
            TypeShape::Vector { size, scalar } if scalar == naga::Scalar::F32 => {
                Some(u32::from(size))
            }
            _ => None,
        }
    }

    fn uniform_kind(&self) -> UniformKind {
        match *self {
            TypeShape::Scalar(s) if s == naga::Scalar::F32 => UniformKind::F32,
            TypeShape::Scalar(s) if s == naga::Scalar::I32 => UniformKind::I32,
            TypeShape::Scalar(s) if s == naga::Scalar::U32 => UniformKind::U32,
            TypeShape::Vector { size: 2, scalar } if scalar == naga::Scalar::F32 => {
                UniformKind::Vec2
            }
            TypeShape::Vector { size: 3, scalar } if scalar == naga::Scalar::F32 => {
                UniformKind::Vec3
            }
            TypeShape::Vector { size: 4, scalar } if scalar == naga::Scalar::F32 => {
                UniformKind::Vec4
            }
            TypeShape::Matrix { columns: 4, rows: 4, scalar } if scalar == naga::Scalar::F32 => {
                UniformKind::Mat4
            }
            _ => UniformKind::Other,
        }
    }
}

impl fmt::Display for TypeShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeShape::Scalar(s) => f.write_str(&scalar_name(*s)),
            TypeShape::Vector { size, scalar } => write!(f, "vec{size}<{}>", scalar_name(*scalar)),
            TypeShape::Matrix { columns, rows, scalar } => {
                write!(f, "mat{columns}x{rows}<{}>", scalar_name(*scalar))
            }
            TypeShape::Struct(members) => {
                f.write_str("struct {")?;
                for (i, (name, shape)) in members.iter().enumerate() {
                    if i > 0 {
                        f.write_str(",")?;
                    }
                    write!(f, " {name}: {shape}")?;
                }
                f.write_str(" }")
            }
            TypeShape::Opaque(size) => write!(f, "<{size}-byte type>"),
        }
    }
}

/// A value passed between stages at one `@location`.
///
/// Unspelled qualifiers take the WGSL defaults (`perspective`, `center` for
/// floats), so two declarations that differ only in spelling compare equal.
#[derive(Debug, Clone, PartialEq)]
struct Varying {
    shape: TypeShape,
    interpolation: Option<naga::Interpolation>,
    sampling: Option<naga::Sampling>,
}

impl Varying {
    fn qualifiers(&self) -> String {
        let interpolation = match self.interpolation {
            Some(i) => format!("{i:?}").to_lowercase(),
            None => "none".to_string(),
        };
        match self.sampling {
            Some(s) => format!("@interpolate({interpolation}, {})", format!("{s:?}").to_lowercase()),
            None => format!("@interpolate({interpolation})"),
        }
    }
}

/// Collects `@location` bindings of an entry point argument or result,
/// descending into struct members when the value itself is unbound.
fn collect_locations(
    module: &naga::Module,
    ty: naga::Handle<naga::Type>,
    binding: Option<&Binding>,
    out: &mut BTreeMap<u32, Varying>,
) {
    match binding {
        Some(Binding::Location {
            location,
            interpolation,
            sampling,
            ..
        }) => {
            let shape = TypeShape::of(module, ty);
            let is_float = match &shape {
                TypeShape::Scalar(scalar) | TypeShape::Vector { scalar, .. } => {
                    scalar.kind == ScalarKind::Float
                }
                _ => false,
            };
            let interpolation = (*interpolation)
                .or_else(|| is_float.then_some(naga::Interpolation::Perspective));
            let sampling = (*sampling).or_else(|| {
                matches!(
                    interpolation,
                    Some(naga::Interpolation::Perspective | naga::Interpolation::Linear)
                )
                .then_some(naga::Sampling::Center)
            });
            out.insert(
                *location,
                Varying {
                    shape,
                    interpolation,
                    sampling,
                },
            );
        }
        Some(Binding::BuiltIn(_)) => {}
        None => {
            if let TypeInner::Struct { ref members, .. } = module.types[ty].inner {
                for m in members {
                    collect_locations(module, m.ty, m.binding.as_ref(), out);
                }
            }
        }
    }
}

fn stage_inputs(stage: &StageModule) -> BTreeMap<u32, Varying> {
    let mut out = BTreeMap::new();
    for arg in &stage.entry().function.arguments {
        collect_locations(stage.module(), arg.ty, arg.binding.as_ref(), &mut out);
    }
    out
}

fn stage_outputs(stage: &StageModule) -> BTreeMap<u32, Varying> {
    let mut out = BTreeMap::new();
    if let Some(result) = &stage.entry().function.result {
        collect_locations(stage.module(), result.ty, result.binding.as_ref(), &mut out);
    }
    out
}

/// A vertex shader input the geometry must feed.
#[derive(Debug, Clone, PartialEq)]
pub struct VertexInput {
    pub location: u32,
    /// Float component count (1..=4); `None` for non-float inputs.
    pub components: Option<u32>,
    pub type_name: String,
}

/// Two stages checked against each other, with their uniforms reflected.
#[derive(Debug)]
pub struct LinkedProgram {
    vertex: StageModule,
    fragment: StageModule,
    uniforms: HashMap<String, UniformLocation>,
    bindings: Vec<UniformBinding>,
    vertex_inputs: Vec<VertexInput>,
}

impl LinkedProgram {
    pub fn vertex(&self) -> &StageModule {
        &self.vertex
    }

    pub fn fragment(&self) -> &StageModule {
        &self.fragment
    }

    /// Active uniforms by name.
    pub fn uniforms(&self) -> &HashMap<String, UniformLocation> {
        &self.uniforms
    }

    pub fn uniform_location(&self, name: &str) -> Option<&UniformLocation> {
        self.uniforms.get(name)
    }

    /// Uniform buffers, sorted by `(group, binding)`.
    pub fn bindings(&self) -> &[UniformBinding] {
        &self.bindings
    }

    /// Vertex inputs, sorted by location.
    pub fn vertex_inputs(&self) -> &[VertexInput] {
        &self.vertex_inputs
    }

    /// Checks that every vertex input is fed by an attribute slot at its
    /// location.
    ///
    /// Component counts may differ: missing components read as `(0, 0, 0, 1)`
    /// and extra ones are dropped.
    pub fn check_vertex_inputs(&self, layouts: &[AttributeLayout]) -> Result<(), ShaderLinkError> {
        let mut problems = Vec::new();

        for input in &self.vertex_inputs {
            if input.components.is_none() {
                problems.push(format!(
                    "vertex input @location({}) has type {}; only f32 scalars and vectors can be fed from geometry",
                    input.location, input.type_name
                ));
                continue;
            }

            if !layouts.iter().any(|l| l.slot == input.location) {
                problems.push(format!(
                    "vertex input @location({}) ({}) has no geometry attribute",
                    input.location, input.type_name
                ));
            }
        }

        match ShaderLinkError::from_problems(problems) {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

/// One uniform buffer seen while merging the two stages.
struct PendingBinding {
    name: Option<String>,
    shape: TypeShape,
    size: u32,
    visibility: wgpu::ShaderStages,
    /// Named values inside the buffer: `(name, offset, size, kind)`.
    members: Vec<(String, u32, u32, UniformKind)>,
}

fn uniform_members(
    module: &naga::Module,
    var: &naga::GlobalVariable,
) -> Vec<(String, u32, u32, UniformKind)> {
    let ty = &module.types[var.ty];
    match ty.inner {
        TypeInner::Struct { ref members, .. } => members
            .iter()
            .filter_map(|m| {
                let name = m.name.clone()?;
                let size = module.types[m.ty].inner.size(module.to_ctx());
                let kind = TypeShape::of(module, m.ty).uniform_kind();
                Some((name, m.offset, size, kind))
            })
            .collect(),
        _ => match &var.name {
            Some(name) => vec![(
                name.clone(),
                0,
                ty.inner.size(module.to_ctx()),
                TypeShape::of(module, var.ty).uniform_kind(),
            )],
            None => Vec::new(),
        },
    }
}

fn describe_binding(name: Option<&str>, group: u32, binding: u32) -> String {
    match name {
        Some(n) => format!("'{n}' (@group({group}) @binding({binding}))"),
        None => format!("@group({group}) @binding({binding})"),
    }
}

/// Merges the active resource bindings of both stages.
fn merge_bindings(
    stages: [&StageModule; 2],
    problems: &mut Vec<String>,
) -> BTreeMap<(u32, u32), PendingBinding> {
    let mut merged: BTreeMap<(u32, u32), PendingBinding> = BTreeMap::new();

    for stage in stages {
        let module = stage.module();
        for (handle, var) in module.global_variables.iter() {
            let Some(rb) = &var.binding else { continue };
            if !stage.uses(handle) {
                continue;
            }

            let key = (rb.group, rb.binding);
            if var.space != AddressSpace::Uniform {
                problems.push(format!(
                    "{} in the {} stage is not a uniform buffer; only var<uniform> resources are supported",
                    describe_binding(var.name.as_deref(), rb.group, rb.binding),
                    stage.stage()
                ));
                continue;
            }

            let shape = TypeShape::of(module, var.ty);
            match merged.get_mut(&key) {
                Some(existing) => {
                    if existing.shape != shape {
                        problems.push(format!(
                            "{} has type {} in one stage and {} in the {} stage",
                            describe_binding(var.name.as_deref(), rb.group, rb.binding),
                            existing.shape,
                            shape,
                            stage.stage()
                        ));
                    } else if existing.name != var.name {
                        problems.push(format!(
                            "@group({}) @binding({}) is named '{}' in one stage and '{}' in the {} stage",
                            rb.group,
                            rb.binding,
                            existing.name.as_deref().unwrap_or("<unnamed>"),
                            var.name.as_deref().unwrap_or("<unnamed>"),
                            stage.stage()
                        ));
                    }
                    existing.visibility |= stage.stage().wgpu();
                }
                None => {
                    merged.insert(
                        key,
                        PendingBinding {
                            name: var.name.clone(),
                            size: module.types[var.ty].inner.size(module.to_ctx()),
                            members: uniform_members(module, var),
                            shape,
                            visibility: stage.stage().wgpu(),
                        },
                    );
                }
            }
        }
    }

    merged
}

/// Checks the two stages against each other and reflects their uniforms.
pub fn link(vertex: StageModule, fragment: StageModule) -> Result<LinkedProgram, ShaderLinkError> {
    let mut problems = Vec::new();

    // Inter-stage interface.
    let vs_out = stage_outputs(&vertex);
    for (location, input) in stage_inputs(&fragment) {
        match vs_out.get(&location) {
            None => problems.push(format!(
                "fragment input @location({location}) ({}) is not written by the vertex stage",
                input.shape
            )),
            Some(out) if out.shape != input.shape => problems.push(format!(
                "@location({location}) is {} in the vertex output but {} in the fragment input",
                out.shape, input.shape
            )),
            Some(out) if *out != input => problems.push(format!(
                "@location({location}) is {} in the vertex output but {} in the fragment input",
                out.qualifiers(),
                input.qualifiers()
            )),
            Some(_) => {}
        }
    }

    let merged = merge_bindings([&vertex, &fragment], &mut problems);

    let mut uniforms: HashMap<String, UniformLocation> = HashMap::new();
    let mut bindings = Vec::with_capacity(merged.len());
    for ((group, binding), pending) in merged {
        for (name, offset, size, kind) in &pending.members {
            let location = UniformLocation {
                group,
                binding,
                offset: *offset,
                size: *size,
                kind: *kind,
            };
            if let Some(previous) = uniforms.insert(name.clone(), location) {
                problems.push(format!(
                    "uniform name '{name}' is declared at both @group({}) @binding({}) and @group({group}) @binding({binding})",
                    previous.group, previous.binding
                ));
            }
        }

        bindings.push(UniformBinding {
            group,
            binding,
            name: pending.name,
            size: pending.size,
            visibility: pending.visibility,
        });
    }

    if let Some(err) = ShaderLinkError::from_problems(problems) {
        return Err(err);
    }

    let vertex_inputs = stage_inputs(&vertex)
        .into_iter()
        .map(|(location, input)| VertexInput {
            location,
            components: input.shape.float_components(),
            type_name: input.shape.to_string(),
        })
        .collect();

    log::debug!(
        "linked program '{}' + '{}': {} uniform(s) in {} buffer(s)",
        vertex.entry_point(),
        fragment.entry_point(),
        uniforms.len(),
        bindings.len()
    );

    Ok(LinkedProgram {
        vertex,
        fragment,
        uniforms,
        bindings,
        vertex_inputs,
    })
}

/// Compiles both stages and links them.
///
/// The vertex stage is compiled first; its failure is reported without
/// looking at the fragment source.
pub fn compile_program(vertex_src: &str, fragment_src: &str) -> Result<LinkedProgram, ShaderError> {
    let vertex = compile_stage(Stage::Vertex, vertex_src)?;
    let fragment = compile_stage(Stage::Fragment, fragment_src)?;
    Ok(link(vertex, fragment)?)
}
