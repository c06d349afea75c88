//! Coordinate types shared by the camera, the render loop and renderers.
//!
//! Two spaces are involved:
//! - screen space: physical pixels of the drawable area, origin top-left
//! - world space: the plane the fractal is evaluated on
//!
//! `ViewportRect` is the bridge between them and is recomputed every frame.

mod vec2;
mod viewport;

pub use vec2::{DVec2, Vec2};
pub use viewport::{FrameSize, ViewportRect};
