//! Time subsystem.
//!
//! Provides testable frame timing utilities without coupling to the runtime:
//! - `Clock` abstracts "now" so the render loop can run against a manual clock
//! - `FpsSampler` turns per-frame timestamps into a periodic frames-per-second value

mod clock;
mod fps;

pub use clock::{Clock, ManualClock, SystemClock};
pub use fps::{FpsSampler, FPS_SAMPLE_WINDOW};
