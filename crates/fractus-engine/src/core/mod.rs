//! Core engine-facing contracts.
//!
//! This module defines the interface between the runtime (platform loop) and
//! the application, the frame scheduling loop, and the `Session` that ties
//! program, geometry, camera and loop together.

mod app;
mod ctx;
mod render_loop;
mod session;

pub use app::{App, AppControl};
pub use ctx::{FrameCtx, SetupCtx, WindowCtx};
pub use render_loop::{CancelToken, FpsSink, FrameSource, FrameTarget, RenderLoop};
pub use session::{Session, SetupError};
