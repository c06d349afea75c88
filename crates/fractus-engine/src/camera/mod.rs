//! Pan/zoom camera over the fractal plane.
//!
//! The camera owns all interaction state. It is fed pointer and wheel events
//! between frames and read once per frame to derive the viewport uniforms.

mod gesture;
mod viewport_camera;

pub use gesture::CameraEvent;
pub use viewport_camera::{CameraConfig, DragState, ViewportCamera};
