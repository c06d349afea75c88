use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::camera::ViewportCamera;
use crate::coords::FrameSize;
use crate::render::FrameUniforms;
use crate::time::{Clock, FpsSampler, SystemClock};

use super::app::AppControl;

/// Where a frame is drawn. The GPU implementation lives in `Session`; tests use
/// recording mocks.
pub trait FrameTarget {
    /// Current drawable size; re-read every tick.
    fn frame_size(&self) -> FrameSize;

    /// Clears, pushes `uniforms` and draws. `Exit` means the target is gone.
    fn draw(&mut self, uniforms: &FrameUniforms) -> AppControl;
}

/// Host frame scheduling.
pub trait FrameSource {
    /// Blocks until the next frame is due, applying input that arrived in the
    /// meantime to `camera`. Returns `false` once no more frames will come.
    fn next_frame(&mut self, camera: &mut ViewportCamera) -> bool;
}

/// Receives frames-per-second reports.
pub trait FpsSink {
    fn report(&mut self, fps: u32);
}

impl<F: FnMut(u32)> FpsSink for F {
    fn report(&mut self, fps: u32) {
        self(fps)
    }
}

/// Shared stop flag. Clones observe the same flag.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

/// Per-frame driver: derives uniforms from the camera, draws, samples FPS.
pub struct RenderLoop<C: Clock = SystemClock> {
    clock: C,
    fps: FpsSampler,
    cancel: CancelToken,
    frames: u64,
}

impl RenderLoop<SystemClock> {
    pub fn with_system_clock() -> Self {
        Self::new(SystemClock::new())
    }
}

impl<C: Clock> RenderLoop<C> {
    /// The first FPS window starts now.
    pub fn new(clock: C) -> Self {
        let fps = FpsSampler::new(clock.now());
        Self {
            clock,
            fps,
            cancel: CancelToken::new(),
            frames: 0,
        }
    }

    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    /// Frames drawn so far.
    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn fps_sampler(&self) -> &FpsSampler {
        &self.fps
    }

    /// Runs one frame to completion.
    ///
    /// Returns `Exit` when the token is cancelled (checked before drawing and
    /// again before the next frame would be requested) or the target is gone.
    pub fn tick(
        &mut self,
        camera: &ViewportCamera,
        target: &mut impl FrameTarget,
        sink: &mut impl FpsSink,
    ) -> AppControl {
        if self.cancel.is_cancelled() {
            return AppControl::Exit;
        }

        let uniforms = FrameUniforms::from_camera(camera, target.frame_size());
        if target.draw(&uniforms) == AppControl::Exit {
            return AppControl::Exit;
        }
        self.frames += 1;

        if let Some(fps) = self.fps.tick(self.clock.now()) {
            log::debug!("{fps} fps");
            sink.report(fps);
        }

        if self.cancel.is_cancelled() {
            AppControl::Exit
        } else {
            AppControl::Continue
        }
    }

    /// Drives frames from `source` until it stops, the token is cancelled or
    /// the target exits.
    pub fn run(
        &mut self,
        source: &mut impl FrameSource,
        camera: &mut ViewportCamera,
        target: &mut impl FrameTarget,
        sink: &mut impl FpsSink,
    ) {
        while !self.cancel.is_cancelled() && source.next_frame(camera) {
            if self.tick(camera, target, sink) == AppControl::Exit {
                break;
            }
        }
        log::debug!("render loop stopped after {} frame(s)", self.frames);
    }
}
