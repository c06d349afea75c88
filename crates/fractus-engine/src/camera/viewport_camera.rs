use crate::coords::{DVec2, FrameSize, Vec2, ViewportRect};
use crate::input::InputEvent;

use super::gesture::CameraEvent;

/// Initial camera parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct CameraConfig {
    /// Starting center; `None` places it at `(frame_width / 2, 0)`.
    pub center: Option<Vec2>,
    /// Starting world units per viewport unit.
    pub scale: f64,
    /// Scale multiplier applied per zoom-in wheel step, in `(0, 1)`.
    pub zoom_factor: f64,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            center: None,
            scale: 2.0,
            zoom_factor: 0.90,
        }
    }
}

/// Drag state machine.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum DragState {
    Idle,
    Dragging {
        /// Pointer position at drag start, x mirrored.
        anchor: DVec2,
        /// Center at drag start.
        last_center: DVec2,
    },
}

/// Pan/zoom state. `scale > 0` always holds.
///
/// State is kept in `f64`; only `compute_viewport` narrows to `f32`.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewportCamera {
    center: DVec2,
    scale: f64,
    zoom_factor: f64,
    drag: DragState,

    initial_center: DVec2,
    initial_scale: f64,
}

/// Screen position with x mirrored, widened for camera arithmetic.
fn screen_point(x: f32, y: f32) -> DVec2 {
    DVec2::from(Vec2::new(x, y).flip_x())
}

impl ViewportCamera {
    /// Invalid `scale` or `zoom_factor` values fall back to the defaults.
    pub fn new(center: DVec2, scale: f64, zoom_factor: f64) -> Self {
        let defaults = CameraConfig::default();

        let scale = if scale.is_finite() && scale > 0.0 {
            scale
        } else {
            log::warn!("camera scale {scale} is not positive; using {}", defaults.scale);
            defaults.scale
        };

        let zoom_factor = if zoom_factor > 0.0 && zoom_factor < 1.0 {
            zoom_factor
        } else {
            log::warn!(
                "camera zoom factor {zoom_factor} is outside (0, 1); using {}",
                defaults.zoom_factor
            );
            defaults.zoom_factor
        };

        Self {
            center,
            scale,
            zoom_factor,
            drag: DragState::Idle,
            initial_center: center,
            initial_scale: scale,
        }
    }

    pub fn from_config(config: &CameraConfig, frame: FrameSize) -> Self {
        let center = config
            .center
            .map(DVec2::from)
            .unwrap_or_else(|| DVec2::new(f64::from(frame.width) * 0.5, 0.0));
        Self::new(center, config.scale, config.zoom_factor)
    }

    #[inline]
    pub fn center(&self) -> DVec2 {
        self.center
    }

    #[inline]
    pub fn scale(&self) -> f64 {
        self.scale
    }

    #[inline]
    pub fn drag_state(&self) -> DragState {
        self.drag
    }

    #[inline]
    pub fn is_dragging(&self) -> bool {
        matches!(self.drag, DragState::Dragging { .. })
    }

    pub fn handle(&mut self, event: CameraEvent) {
        match event {
            CameraEvent::PointerDown { x, y } => self.pointer_down(x, y),
            CameraEvent::PointerMove { x, y } => self.pointer_move(x, y),
            CameraEvent::PointerUp => self.pointer_up(),
            CameraEvent::Wheel { delta_y } => self.wheel(delta_y),
            CameraEvent::Reset => self.reset(),
        }
    }

    /// Feeds a platform-agnostic input event through `CameraEvent::from_input`.
    /// Returns whether the camera consumed it.
    pub fn handle_input(&mut self, event: &InputEvent) -> bool {
        match CameraEvent::from_input(event) {
            Some(e) => {
                self.handle(e);
                true
            }
            None => false,
        }
    }

    /// Starts a drag at screen position `(x, y)`.
    ///
    /// A press while already dragging commits the current center first.
    pub fn pointer_down(&mut self, x: f32, y: f32) {
        self.drag = DragState::Dragging {
            anchor: screen_point(x, y),
            last_center: self.center,
        };
    }

    pub fn pointer_move(&mut self, x: f32, y: f32) {
        let DragState::Dragging { anchor, last_center } = self.drag else {
            return;
        };
        let diff = (screen_point(x, y) - anchor) * self.scale;
        self.center = last_center - diff;
    }

    pub fn pointer_up(&mut self) {
        self.drag = DragState::Idle;
    }

    /// Negative `delta_y` zooms in, anything else zooms out. Unbounded.
    pub fn wheel(&mut self, delta_y: f32) {
        if delta_y < 0.0 {
            self.scale *= self.zoom_factor;
        } else {
            self.scale /= self.zoom_factor;
        }
        log::trace!("camera scale {}", self.scale);
    }

    /// World-space window for a frame of the given size.
    pub fn compute_viewport(&self, frame: FrameSize) -> ViewportRect {
        let min_dim = f64::from(frame.min_dim().max(1.0));
        let half = 0.5 * self.scale;
        let ox = self.center.x / min_dim;
        let oy = self.center.y / min_dim;
        ViewportRect::new(
            [(-half - ox) as f32, (half - ox) as f32],
            [(-half - oy) as f32, (half - oy) as f32],
        )
    }

    /// Returns to the initial center and scale and ends any drag.
    pub fn reset(&mut self) {
        self.center = self.initial_center;
        self.scale = self.initial_scale;
        self.drag = DragState::Idle;
        log::debug!("camera reset");
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;
    use crate::input::{
        MouseButton, MouseButtonState, MouseWheelDelta, PointerButtonEvent, PointerMoveEvent,
    };

    const EPS: f32 = 1e-4;
    const SCALE_EPS: f64 = 1e-9;

    fn camera() -> ViewportCamera {
        ViewportCamera::new(DVec2::new(400.0, 0.0), 2.0, 0.90)
    }

    // ---------------------------------------------------------------------
    // viewport
    // ---------------------------------------------------------------------

    #[test]
    fn reference_scenario_800x600() {
        let vp = camera().compute_viewport(FrameSize::new(800.0, 600.0));
        assert_relative_eq!(vp.x[0], -1.6667, epsilon = EPS);
        assert_relative_eq!(vp.x[1], 0.3333, epsilon = EPS);
        assert_relative_eq!(vp.y[0], -1.0, epsilon = EPS);
        assert_relative_eq!(vp.y[1], 1.0, epsilon = EPS);
    }

    #[test]
    fn viewport_width_is_scale_and_midpoint_follows_center() {
        let cam = ViewportCamera::new(DVec2::new(-120.0, 75.0), 0.37, 0.90);
        let frame = FrameSize::new(1024.0, 768.0);
        let vp = cam.compute_viewport(frame);

        assert_relative_eq!(vp.width(), 0.37, epsilon = EPS);
        assert_relative_eq!(vp.height(), 0.37, epsilon = EPS);
        let (mx, my) = vp.midpoint();
        assert_relative_eq!(mx, 120.0 / 768.0, epsilon = EPS);
        assert_relative_eq!(my, -75.0 / 768.0, epsilon = EPS);
    }

    #[test]
    fn degenerate_frame_does_not_divide_by_zero() {
        let vp = camera().compute_viewport(FrameSize::new(0.0, 0.0));
        assert!(vp.is_finite());
    }

    #[test]
    fn default_center_is_half_frame_width() {
        let cam = ViewportCamera::from_config(&CameraConfig::default(), FrameSize::new(800.0, 600.0));
        assert_eq!(cam.center(), DVec2::new(400.0, 0.0));
        assert_eq!(cam.scale(), 2.0);
    }

    // ---------------------------------------------------------------------
    // zoom
    // ---------------------------------------------------------------------

    #[test]
    fn wheel_scenario() {
        let mut cam = camera();
        cam.wheel(-1.0);
        assert_relative_eq!(cam.scale(), 1.8, epsilon = SCALE_EPS);
        cam.wheel(1.0);
        assert_relative_eq!(cam.scale(), 2.0, epsilon = SCALE_EPS);
    }

    #[test]
    fn zoom_in_and_out_n_times_is_reversible() {
        let mut cam = camera();
        for _ in 0..25 {
            cam.wheel(-3.0);
        }
        for _ in 0..25 {
            cam.wheel(3.0);
        }
        assert_relative_eq!(cam.scale(), 2.0, epsilon = SCALE_EPS);
    }

    #[test]
    fn long_zoom_gesture_does_not_underflow() {
        let mut cam = camera();
        for _ in 0..1200 {
            cam.wheel(-1.0);
        }
        assert!(cam.scale() > 0.0);
        assert!(cam.scale().is_normal());

        for _ in 0..1200 {
            cam.wheel(1.0);
        }
        assert_relative_eq!(cam.scale(), 2.0, max_relative = 1e-9);
    }

    #[test]
    fn deep_zoom_drag_still_moves_center() {
        let mut cam = camera();
        for _ in 0..200 {
            cam.wheel(-1.0);
        }
        cam.pointer_down(0.0, 0.0);
        cam.pointer_move(1.0, 0.0);
        assert_ne!(cam.center(), DVec2::new(400.0, 0.0));
    }

    #[test]
    fn zero_wheel_delta_zooms_out() {
        let mut cam = camera();
        cam.wheel(0.0);
        assert!(cam.scale() > 2.0);
    }

    #[test]
    fn invalid_config_falls_back_to_defaults() {
        let cam = ViewportCamera::new(DVec2::default(), -1.0, 1.5);
        assert_eq!(cam.scale(), 2.0);

        let mut cam = cam;
        cam.wheel(-1.0);
        assert_relative_eq!(cam.scale(), 1.8, epsilon = SCALE_EPS);
    }

    // ---------------------------------------------------------------------
    // input events
    // ---------------------------------------------------------------------

    fn button(button: MouseButton, state: MouseButtonState, x: f32, y: f32) -> InputEvent {
        InputEvent::PointerButton(PointerButtonEvent { button, state, x, y })
    }

    fn moved(x: f32, y: f32) -> InputEvent {
        InputEvent::PointerMoved(PointerMoveEvent { x, y })
    }

    #[test]
    fn input_events_drive_drag_and_zoom() {
        let mut cam = camera();

        assert!(cam.handle_input(&button(MouseButton::Left, MouseButtonState::Pressed, 100.0, 100.0)));
        assert!(cam.handle_input(&moved(110.0, 95.0)));
        assert!(cam.handle_input(&button(MouseButton::Left, MouseButtonState::Released, 110.0, 95.0)));
        assert_eq!(cam.center(), DVec2::new(420.0, 10.0));
        assert!(!cam.is_dragging());

        // winit reports scroll-up as positive y.
        let up = InputEvent::MouseWheel { delta: MouseWheelDelta::Line { x: 0.0, y: 1.0 } };
        assert!(cam.handle_input(&up));
        assert_relative_eq!(cam.scale(), 1.8, epsilon = SCALE_EPS);
    }

    #[test]
    fn right_click_resets_the_view() {
        let mut cam = camera();
        cam.handle_input(&button(MouseButton::Left, MouseButtonState::Pressed, 0.0, 0.0));
        cam.handle_input(&moved(40.0, -20.0));
        cam.wheel(-1.0);
        assert_ne!(cam, camera());

        assert!(cam.handle_input(&button(MouseButton::Right, MouseButtonState::Pressed, 5.0, 5.0)));
        assert_eq!(cam, camera());
    }

    #[test]
    fn unrelated_input_is_not_consumed() {
        let mut cam = camera();
        assert!(!cam.handle_input(&InputEvent::PointerLeft));
        assert!(!cam.handle_input(&InputEvent::Focused(true)));
        assert_eq!(cam, camera());
    }

    // ---------------------------------------------------------------------
    // drag
    // ---------------------------------------------------------------------

    #[test]
    fn drag_follows_law() {
        let mut cam = camera();
        cam.pointer_down(100.0, 100.0);
        assert!(cam.is_dragging());
        assert_eq!(cam.center(), DVec2::new(400.0, 0.0));

        cam.pointer_move(110.0, 95.0);
        // diff = ((-110, 95) - (-100, 100)) * 2 = (-20, -10)
        assert_eq!(cam.center(), DVec2::new(420.0, 10.0));
    }

    #[test]
    fn moves_are_relative_to_drag_start() {
        let mut cam = camera();
        cam.pointer_down(0.0, 0.0);
        cam.pointer_move(50.0, 0.0);
        cam.pointer_move(10.0, 0.0);
        assert_eq!(cam.center(), DVec2::new(420.0, 0.0));
    }

    #[test]
    fn two_drags_compose_through_committed_center() {
        let mut cam = camera();
        cam.pointer_down(0.0, 0.0);
        cam.pointer_move(10.0, 0.0);
        cam.pointer_up();
        assert_eq!(cam.drag_state(), DragState::Idle);
        assert_eq!(cam.center(), DVec2::new(420.0, 0.0));

        cam.pointer_down(200.0, 200.0);
        cam.pointer_move(200.0, 230.0);
        cam.pointer_up();
        assert_eq!(cam.center(), DVec2::new(420.0, -60.0));
    }

    #[test]
    fn idle_move_and_up_are_noops() {
        let mut cam = camera();
        cam.pointer_move(500.0, 500.0);
        cam.pointer_up();
        assert_eq!(cam.center(), DVec2::new(400.0, 0.0));
        assert_eq!(cam.drag_state(), DragState::Idle);
    }

    #[test]
    fn second_press_restarts_drag_from_current_center() {
        let mut cam = camera();
        cam.pointer_down(0.0, 0.0);
        cam.pointer_move(10.0, 0.0);
        cam.pointer_down(10.0, 0.0);

        let DragState::Dragging { anchor, last_center } = cam.drag_state() else {
            panic!("expected drag");
        };
        assert_eq!(anchor, DVec2::new(-10.0, 0.0));
        assert_eq!(last_center, DVec2::new(420.0, 0.0));
    }

    #[test]
    fn drag_uses_current_scale() {
        let mut cam = camera();
        cam.wheel(-1.0);
        cam.pointer_down(0.0, 0.0);
        cam.pointer_move(10.0, 0.0);
        assert_relative_eq!(cam.center().x, 418.0, epsilon = SCALE_EPS);
    }

    #[test]
    fn reset_restores_initial_state() {
        let mut cam = camera();
        cam.wheel(-1.0);
        cam.pointer_down(0.0, 0.0);
        cam.pointer_move(30.0, 30.0);
        cam.reset();
        assert_eq!(cam, camera());
    }
}
