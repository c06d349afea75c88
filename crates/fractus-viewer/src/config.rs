use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;

use fractus_engine::camera::CameraConfig;
use fractus_engine::device::GpuInit;
use fractus_engine::geometry::GeometryDescription;
use fractus_engine::logging::LoggingConfig;
use fractus_engine::paint::Color;
use fractus_engine::window::RuntimeConfig;

const DEFAULT_VERTEX: &str = include_str!("../assets/vert.wgsl");
const DEFAULT_FRAGMENT: &str = include_str!("../assets/frag.wgsl");
const DEFAULT_GEOMETRY: &str = include_str!("../assets/quad.json");

#[derive(Parser, Debug)]
#[command(name = "fractus")]
#[command(about = "Interactive GPU fractal viewer: drag to pan, scroll to zoom, right-click to reset")]
pub struct Cli {
    /// WGSL vertex shader (default: built-in full-screen quad shader)
    #[arg(long)]
    pub vertex: Option<PathBuf>,

    /// WGSL fragment shader (default: built-in Mandelbrot shader)
    #[arg(long)]
    pub fragment: Option<PathBuf>,

    /// Geometry description JSON (default: built-in full-screen quad)
    #[arg(long)]
    pub geometry: Option<PathBuf>,

    /// Window title
    #[arg(long, default_value = "fractus")]
    pub title: String,

    /// Initial window width in logical pixels
    #[arg(long, default_value_t = 800.0)]
    pub width: f64,

    /// Initial window height in logical pixels
    #[arg(long, default_value_t = 600.0)]
    pub height: f64,

    /// Initial world units across the viewport's minor axis
    #[arg(long, default_value_t = 2.0)]
    pub scale: f64,

    /// Scale multiplier per zoom-in wheel step
    #[arg(long, default_value_t = 0.90)]
    pub zoom_factor: f64,

    /// Clear color as #rrggbb or #rrggbbaa
    #[arg(long, default_value = "#ffffff")]
    pub clear: Color,

    /// Allocate a depth buffer (cleared every frame)
    #[arg(long)]
    pub depth: bool,

    /// Log filter, env_logger syntax (overrides RUST_LOG)
    #[arg(long)]
    pub log: Option<String>,
}

/// Everything the viewer needs, resolved from the command line.
#[derive(Debug, Clone)]
pub struct ViewerConfig {
    pub vertex_src: String,
    pub fragment_src: String,
    pub geometry: GeometryDescription,
    pub camera: CameraConfig,
    pub clear: Color,
    pub runtime: RuntimeConfig,
    pub gpu: GpuInit,
}

impl Cli {
    pub fn logging(&self) -> LoggingConfig {
        LoggingConfig {
            env_filter: self.log.clone(),
            ..LoggingConfig::default()
        }
    }

    /// Loads the shader and geometry files and builds the config structs.
    pub fn into_config(self) -> Result<ViewerConfig> {
        let vertex_src = read_or(self.vertex.as_deref(), DEFAULT_VERTEX)?;
        let fragment_src = read_or(self.fragment.as_deref(), DEFAULT_FRAGMENT)?;

        let geometry_text = read_or(self.geometry.as_deref(), DEFAULT_GEOMETRY)?;
        let geometry = GeometryDescription::from_json(&geometry_text).with_context(|| {
            format!(
                "failed to parse geometry {}",
                self.geometry
                    .as_deref()
                    .map_or("<built-in quad>".into(), |p| p.display().to_string())
            )
        })?;

        let mut gpu = GpuInit::default();
        if self.depth {
            gpu.depth_format = Some(wgpu::TextureFormat::Depth32Float);
        }

        Ok(ViewerConfig {
            vertex_src,
            fragment_src,
            geometry,
            camera: CameraConfig {
                center: None,
                scale: self.scale,
                zoom_factor: self.zoom_factor,
            },
            clear: self.clear,
            runtime: RuntimeConfig {
                title: self.title,
                initial_size: winit::dpi::LogicalSize::new(self.width, self.height),
            },
            gpu,
        })
    }
}

fn read_or(path: Option<&Path>, default: &str) -> Result<String> {
    match path {
        Some(p) => fs::read_to_string(p).with_context(|| format!("failed to read {}", p.display())),
        None => Ok(default.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fractus_engine::shader::compile_program;

    #[test]
    fn defaults_parse() {
        let cli = Cli::parse_from(["fractus"]);
        assert_eq!(cli.width, 800.0);
        assert_eq!(cli.scale, 2.0);
        assert_eq!(cli.clear, Color::WHITE);
        assert!(cli.log.is_none());
    }

    #[test]
    fn flags_override_defaults() {
        let cli = Cli::parse_from([
            "fractus", "--title", "julia", "--scale", "3.5", "--clear", "#000000", "--depth",
        ]);
        let config = cli.into_config().unwrap();
        assert_eq!(config.runtime.title, "julia");
        assert_eq!(config.camera.scale, 3.5);
        assert_eq!(config.clear, Color::BLACK);
        assert!(config.gpu.depth_format.is_some());
    }

    #[test]
    fn built_in_assets_form_a_valid_program() {
        let config = Cli::parse_from(["fractus"]).into_config().unwrap();

        let program = compile_program(&config.vertex_src, &config.fragment_src).unwrap();
        for name in ["viewportx", "viewporty", "minDim"] {
            assert!(program.uniform_location(name).is_some(), "missing uniform {name}");
        }

        let geometry = config.geometry.prepare().unwrap();
        assert_eq!(geometry.draw.count, 6);
        program.check_vertex_inputs(&geometry.layouts()).unwrap();
    }

    #[test]
    fn missing_shader_file_is_reported() {
        let cli = Cli::parse_from(["fractus", "--fragment", "/nonexistent/frag.wgsl"]);
        let err = cli.into_config().unwrap_err();
        assert!(format!("{err:#}").contains("/nonexistent/frag.wgsl"));
    }
}
