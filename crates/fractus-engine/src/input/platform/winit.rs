use winit::event::{ElementState, MouseButton as WinitMouseButton, MouseScrollDelta, WindowEvent};

use crate::input::{
    InputEvent, InputState, MouseButton, MouseButtonState, MouseWheelDelta, PointerButtonEvent,
    PointerMoveEvent,
};

/// Translates a winit `WindowEvent` into an engine `InputEvent`.
///
/// Positions stay in physical pixels, the same space as the surface the
/// fractal is drawn into. Returns `None` for events the input subsystem does
/// not represent.
pub fn translate_window_event(state: &InputState, event: &WindowEvent) -> Option<InputEvent> {
    match event {
        WindowEvent::Focused(f) => Some(InputEvent::Focused(*f)),

        WindowEvent::CursorLeft { .. } => Some(InputEvent::PointerLeft),

        WindowEvent::CursorMoved { position, .. } => Some(InputEvent::PointerMoved(PointerMoveEvent {
            x: position.x as f32,
            y: position.y as f32,
        })),

        WindowEvent::MouseInput { state: st, button, .. } => {
            let st = match st {
                ElementState::Pressed => MouseButtonState::Pressed,
                ElementState::Released => MouseButtonState::Released,
            };
            pointer_button(state, map_mouse_button(*button), st)
        }

        WindowEvent::MouseWheel { delta, .. } => {
            let delta = match delta {
                MouseScrollDelta::LineDelta(x, y) => MouseWheelDelta::Line { x: *x, y: *y },
                MouseScrollDelta::PixelDelta(p) => MouseWheelDelta::Pixel {
                    x: p.x as f32,
                    y: p.y as f32,
                },
            };
            Some(InputEvent::MouseWheel { delta })
        }

        _ => None,
    }
}

/// Builds a button event at the tracked pointer position.
///
/// winit 0.30 does not expose a cursor query. A press before the first
/// `CursorMoved` has no position and is dropped; a release is always kept so
/// a drag can end.
fn pointer_button(
    state: &InputState,
    button: MouseButton,
    st: MouseButtonState,
) -> Option<InputEvent> {
    let (x, y) = match (state.pointer_pos, st) {
        (Some(pos), _) => pos,
        (None, MouseButtonState::Released) => (0.0, 0.0),
        (None, MouseButtonState::Pressed) => {
            log::trace!("{button:?} pressed before any pointer position; ignored");
            return None;
        }
    };

    Some(InputEvent::PointerButton(PointerButtonEvent {
        button,
        state: st,
        x,
        y,
    }))
}

fn map_mouse_button(b: WinitMouseButton) -> MouseButton {
    match b {
        WinitMouseButton::Left => MouseButton::Left,
        WinitMouseButton::Right => MouseButton::Right,
        WinitMouseButton::Middle => MouseButton::Middle,
        WinitMouseButton::Back => MouseButton::Back,
        WinitMouseButton::Forward => MouseButton::Forward,
        WinitMouseButton::Other(v) => MouseButton::Other(v),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn press_without_known_position_is_dropped() {
        let state = InputState::default();
        assert_eq!(pointer_button(&state, MouseButton::Left, MouseButtonState::Pressed), None);
    }

    #[test]
    fn release_without_known_position_is_kept() {
        let state = InputState::default();
        let ev = pointer_button(&state, MouseButton::Left, MouseButtonState::Released);
        assert!(matches!(
            ev,
            Some(InputEvent::PointerButton(PointerButtonEvent { state: MouseButtonState::Released, .. }))
        ));
    }

    #[test]
    fn press_uses_tracked_position() {
        let mut state = InputState::default();
        state.apply_event(&InputEvent::PointerMoved(PointerMoveEvent { x: 7.0, y: 9.0 }));
        assert_eq!(
            pointer_button(&state, MouseButton::Left, MouseButtonState::Pressed),
            Some(InputEvent::PointerButton(PointerButtonEvent {
                button: MouseButton::Left,
                state: MouseButtonState::Pressed,
                x: 7.0,
                y: 9.0,
            }))
        );
    }
}
