use std::fmt;

use naga::valid::{Capabilities, ModuleInfo, ValidationFlags, Validator};

use super::error::ShaderCompileError;

/// Programmable pipeline stage.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Stage {
    Vertex,
    Fragment,
}

impl Stage {
    #[inline]
    pub fn as_str(self) -> &'static str {
        match self {
            Stage::Vertex => "vertex",
            Stage::Fragment => "fragment",
        }
    }

    #[inline]
    fn naga(self) -> naga::ShaderStage {
        match self {
            Stage::Vertex => naga::ShaderStage::Vertex,
            Stage::Fragment => naga::ShaderStage::Fragment,
        }
    }

    #[inline]
    pub(crate) fn wgpu(self) -> wgpu::ShaderStages {
        match self {
            Stage::Vertex => wgpu::ShaderStages::VERTEX,
            Stage::Fragment => wgpu::ShaderStages::FRAGMENT,
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One parsed and validated shader stage.
///
/// Keeps the WGSL source (the GPU module is created from it later) alongside
/// the naga IR used for reflection.
#[derive(Debug)]
pub struct StageModule {
    stage: Stage,
    source: String,
    module: naga::Module,
    info: ModuleInfo,
    entry_index: usize,
}

impl StageModule {
    pub fn stage(&self) -> Stage {
        self.stage
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    /// Name of the entry point used for this stage.
    pub fn entry_point(&self) -> &str {
        &self.module.entry_points[self.entry_index].name
    }

    pub(crate) fn module(&self) -> &naga::Module {
        &self.module
    }

    pub(crate) fn entry(&self) -> &naga::EntryPoint {
        &self.module.entry_points[self.entry_index]
    }

    /// Whether the stage's entry point touches `var`.
    pub(crate) fn uses(&self, var: naga::Handle<naga::GlobalVariable>) -> bool {
        !self.info.get_entry_point(self.entry_index)[var].is_empty()
    }
}

/// Parses and validates `source` as the given stage.
///
/// The source may contain entry points for other stages (a single WGSL file
/// can serve as both sources); the first entry point of `stage` is used.
pub fn compile_stage(stage: Stage, source: &str) -> Result<StageModule, ShaderCompileError> {
    let module = naga::front::wgsl::parse_str(source)
        .map_err(|e| ShaderCompileError::new(stage, e.emit_to_string(source)))?;

    let info = Validator::new(ValidationFlags::all(), Capabilities::default())
        .validate(&module)
        .map_err(|e| ShaderCompileError::new(stage, e.emit_to_string(source)))?;

    let mut candidates = module
        .entry_points
        .iter()
        .enumerate()
        .filter(|(_, ep)| ep.stage == stage.naga());

    let Some((entry_index, ep)) = candidates.next() else {
        return Err(ShaderCompileError::new(
            stage,
            format!("no @{stage} entry point found"),
        ));
    };

    if let Some((_, extra)) = candidates.next() {
        log::warn!(
            "{stage} source declares several @{stage} entry points; using '{}', ignoring '{}'",
            ep.name,
            extra.name
        );
    }

    log::debug!("compiled {stage} stage (entry point '{}')", ep.name);

    Ok(StageModule {
        stage,
        source: source.to_string(),
        module,
        info,
        entry_index,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const VS: &str = r#"
@vertex
fn vs_main(@location(0) pos: vec2<f32>) -> @builtin(position) vec4<f32> {
    return vec4<f32>(pos, 0.0, 1.0);
}
"#;

    const FS: &str = r#"
@fragment
fn fs_main() -> @location(0) vec4<f32> {
    return vec4<f32>(1.0);
}
"#;

    #[test]
    fn compiles_valid_stages() {
        let vs = compile_stage(Stage::Vertex, VS).unwrap();
        assert_eq!(vs.entry_point(), "vs_main");
        assert_eq!(vs.stage(), Stage::Vertex);

        let fs = compile_stage(Stage::Fragment, FS).unwrap();
        assert_eq!(fs.entry_point(), "fs_main");
    }

    #[test]
    fn syntax_error_reports_stage_and_diagnostic() {
        let err = compile_stage(Stage::Fragment, "@fragment fn fs_main( {").unwrap_err();
        assert_eq!(err.stage, Stage::Fragment);
        assert!(!err.diagnostic.is_empty());
        assert!(err.to_string().starts_with("fragment shader compilation failed"));
    }

    #[test]
    fn type_error_is_a_compile_error() {
        let src = r#"
@fragment
fn fs_main() -> @location(0) vec4<f32> {
    let x: f32 = vec2<f32>(1.0, 2.0);
    return vec4<f32>(x);
}
"#;
        let err = compile_stage(Stage::Fragment, src).unwrap_err();
        assert_eq!(err.stage, Stage::Fragment);
    }

    #[test]
    fn missing_entry_point_for_stage() {
        let err = compile_stage(Stage::Vertex, FS).unwrap_err();
        assert_eq!(err.stage, Stage::Vertex);
        assert!(err.diagnostic.contains("no @vertex entry point"));
    }

    #[test]
    fn combined_source_serves_both_stages() {
        let both = format!("{VS}\n{FS}");
        assert_eq!(compile_stage(Stage::Vertex, &both).unwrap().entry_point(), "vs_main");
        assert_eq!(compile_stage(Stage::Fragment, &both).unwrap().entry_point(), "fs_main");
    }
}
