//! Shader program management.
//!
//! A program is built in two phases:
//! - CPU: each WGSL stage is parsed and validated with naga, the stages are
//!   linked (inter-stage interface and shared bindings checked) and the active
//!   uniforms are reflected into a name → location map
//! - GPU: shader modules, uniform buffers, bind groups and the pipeline layout
//!   are created from the linked description
//!
//! The CPU phase has no device dependency and is where every setup error is
//! detected.

mod compile;
mod error;
mod link;
mod program;
mod uniforms;

pub use compile::{compile_stage, Stage, StageModule};
pub use error::{ShaderCompileError, ShaderError, ShaderLinkError};
pub use link::{compile_program, link, LinkedProgram, VertexInput};
pub use program::ShaderProgram;
pub use uniforms::{
    UniformBinding, UniformBlock, UniformKind, UniformLocation, UniformStorage, UniformValue,
};
