//! GPU rendering subsystem.
//!
//! The fractal renderer owns the program and geometry and issues one indexed
//! draw per frame. Everything it needs from the frame arrives through
//! `RenderCtx`, `RenderTarget` and `FrameUniforms`.

mod ctx;
mod fractal;

pub use ctx::{RenderCtx, RenderTarget};
pub use fractal::{FractalRenderer, FrameUniforms, UniformSlots};
