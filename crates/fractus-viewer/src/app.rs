use anyhow::Context;

use fractus_engine::core::{App, AppControl, FrameCtx, Session, SetupCtx};
use fractus_engine::input::InputEvent;
use fractus_engine::paint::Color;

use crate::config::ViewerConfig;

/// Window title carrying the latest frame rate.
pub fn fps_title(base: &str, fps: u32) -> String {
    format!("{base} - {fps} fps")
}

/// Fractal viewer: one session, built once the GPU is up.
pub struct ViewerApp {
    config: ViewerConfig,
    session: Option<Session>,
}

impl ViewerApp {
    pub fn new(config: ViewerConfig) -> Self {
        Self { config, session: None }
    }

    fn clear(&self) -> Color {
        self.config.clear
    }
}

impl App for ViewerApp {
    fn on_setup(&mut self, ctx: &mut SetupCtx<'_, '_>) -> anyhow::Result<()> {
        let session = Session::new(
            ctx.gpu.device(),
            ctx.gpu.frame_size(),
            &self.config.vertex_src,
            &self.config.fragment_src,
            &self.config.geometry,
            &self.config.camera,
        )
        .context("failed to set up the fractal session")?;

        self.session = Some(session);
        Ok(())
    }

    fn on_input(&mut self, event: &InputEvent) -> AppControl {
        if let Some(session) = self.session.as_mut() {
            session.handle_input(event);
        }
        AppControl::Continue
    }

    fn on_frame(&mut self, ctx: &mut FrameCtx<'_, '_>) -> AppControl {
        let clear = self.clear();
        let Some(session) = self.session.as_mut() else {
            return AppControl::Exit;
        };

        let mut latest = None;
        let control = session.frame(ctx, clear, &mut |fps: u32| latest = Some(fps));

        if let Some(fps) = latest {
            ctx.runtime.set_title(fps_title(&self.config.runtime.title, fps));
        }
        control
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn title_shows_rate() {
        assert_eq!(fps_title("fractus", 60), "fractus - 60 fps");
    }
}
