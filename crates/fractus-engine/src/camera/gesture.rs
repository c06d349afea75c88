use crate::input::{InputEvent, MouseButton, MouseButtonState};

/// Camera-level interaction, in screen pixels.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum CameraEvent {
    PointerDown { x: f32, y: f32 },
    PointerMove { x: f32, y: f32 },
    PointerUp,
    /// Browser convention: negative when scrolling up (zoom in).
    Wheel { delta_y: f32 },
    /// Back to the initial view.
    Reset,
}

impl CameraEvent {
    /// Maps a platform-agnostic input event to a camera event.
    ///
    /// Only the left button drags; a right-button press resets the view.
    /// Losing focus ends a drag, since the release may never be delivered.
    pub fn from_input(event: &InputEvent) -> Option<CameraEvent> {
        match event {
            InputEvent::PointerButton(e) if e.button == MouseButton::Left => match e.state {
                MouseButtonState::Pressed => Some(CameraEvent::PointerDown { x: e.x, y: e.y }),
                MouseButtonState::Released => Some(CameraEvent::PointerUp),
            },
            InputEvent::PointerButton(e)
                if e.button == MouseButton::Right && e.state == MouseButtonState::Pressed =>
            {
                Some(CameraEvent::Reset)
            }
            InputEvent::PointerMoved(e) => Some(CameraEvent::PointerMove { x: e.x, y: e.y }),
            InputEvent::MouseWheel { delta } => {
                let y = delta.y();
                // Positive platform y is "away from the user", i.e. scroll up.
                (y != 0.0).then_some(CameraEvent::Wheel { delta_y: -y })
            }
            InputEvent::Focused(false) => Some(CameraEvent::PointerUp),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::{MouseWheelDelta, PointerButtonEvent, PointerMoveEvent};

    fn button(button: MouseButton, state: MouseButtonState) -> InputEvent {
        InputEvent::PointerButton(PointerButtonEvent { button, state, x: 12.0, y: 34.0 })
    }

    #[test]
    fn left_button_drives_drag() {
        assert_eq!(
            CameraEvent::from_input(&button(MouseButton::Left, MouseButtonState::Pressed)),
            Some(CameraEvent::PointerDown { x: 12.0, y: 34.0 })
        );
        assert_eq!(
            CameraEvent::from_input(&button(MouseButton::Left, MouseButtonState::Released)),
            Some(CameraEvent::PointerUp)
        );
        assert_eq!(
            CameraEvent::from_input(&button(MouseButton::Middle, MouseButtonState::Pressed)),
            None
        );
    }

    #[test]
    fn right_press_resets() {
        assert_eq!(
            CameraEvent::from_input(&button(MouseButton::Right, MouseButtonState::Pressed)),
            Some(CameraEvent::Reset)
        );
        assert_eq!(
            CameraEvent::from_input(&button(MouseButton::Right, MouseButtonState::Released)),
            None
        );
    }

    #[test]
    fn pointer_motion_maps_to_move() {
        let e = InputEvent::PointerMoved(PointerMoveEvent { x: 1.0, y: 2.0 });
        assert_eq!(CameraEvent::from_input(&e), Some(CameraEvent::PointerMove { x: 1.0, y: 2.0 }));
    }

    #[test]
    fn wheel_sign_is_flipped_to_scroll_up_negative() {
        let up = InputEvent::MouseWheel { delta: MouseWheelDelta::Line { x: 0.0, y: 1.0 } };
        assert_eq!(CameraEvent::from_input(&up), Some(CameraEvent::Wheel { delta_y: -1.0 }));

        let down = InputEvent::MouseWheel { delta: MouseWheelDelta::Pixel { x: 0.0, y: -40.0 } };
        assert_eq!(CameraEvent::from_input(&down), Some(CameraEvent::Wheel { delta_y: 40.0 }));
    }

    #[test]
    fn horizontal_scroll_is_dropped() {
        let e = InputEvent::MouseWheel { delta: MouseWheelDelta::Pixel { x: 5.0, y: 0.0 } };
        assert_eq!(CameraEvent::from_input(&e), None);
    }

    #[test]
    fn focus_loss_ends_drag() {
        assert_eq!(CameraEvent::from_input(&InputEvent::Focused(false)), Some(CameraEvent::PointerUp));
        assert_eq!(CameraEvent::from_input(&InputEvent::Focused(true)), None);
        assert_eq!(CameraEvent::from_input(&InputEvent::PointerLeft), None);
    }
}
