//! Fractus engine crate.
//!
//! GPU fractal rendering: shader program management, static geometry, a
//! pan/zoom viewport camera and the frame loop, plus the platform and GPU
//! runtime they run on.

pub mod device;
pub mod window;
pub mod input;
pub mod time;
pub mod core;

pub mod logging;
pub mod coords;
pub mod paint;

pub mod shader;
pub mod geometry;
pub mod camera;
pub mod render;
