use std::fmt;

use super::compile::Stage;

/// A shader stage failed to parse or validate.
#[derive(Debug, Clone, PartialEq)]
pub struct ShaderCompileError {
    pub stage: Stage,
    /// Compiler output, annotated with source excerpts.
    pub diagnostic: String,
}

impl ShaderCompileError {
    pub(crate) fn new(stage: Stage, diagnostic: impl Into<String>) -> Self {
        Self { stage, diagnostic: diagnostic.into() }
    }
}

impl fmt::Display for ShaderCompileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} shader compilation failed:\n{}", self.stage, self.diagnostic)
    }
}

impl std::error::Error for ShaderCompileError {}

/// Both stages compiled but do not form a usable program.
#[derive(Debug, Clone, PartialEq)]
pub struct ShaderLinkError {
    /// One problem per line.
    pub diagnostic: String,
}

impl ShaderLinkError {
    pub(crate) fn new(diagnostic: impl Into<String>) -> Self {
        Self { diagnostic: diagnostic.into() }
    }

    /// Builds an error from a list of problems, or `None` if there are none.
    pub(crate) fn from_problems(problems: Vec<String>) -> Option<Self> {
        if problems.is_empty() {
            None
        } else {
            Some(Self::new(problems.join("\n")))
        }
    }
}

impl fmt::Display for ShaderLinkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "shader program linking failed:\n{}", self.diagnostic)
    }
}

impl std::error::Error for ShaderLinkError {}

/// Either failure of program construction. Both are fatal.
#[derive(Debug, Clone, PartialEq)]
pub enum ShaderError {
    Compile(ShaderCompileError),
    Link(ShaderLinkError),
}

impl fmt::Display for ShaderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShaderError::Compile(e) => e.fmt(f),
            ShaderError::Link(e) => e.fmt(f),
        }
    }
}

impl std::error::Error for ShaderError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ShaderError::Compile(e) => Some(e),
            ShaderError::Link(e) => Some(e),
        }
    }
}

impl From<ShaderCompileError> for ShaderError {
    fn from(e: ShaderCompileError) -> Self {
        ShaderError::Compile(e)
    }
}

impl From<ShaderLinkError> for ShaderError {
    fn from(e: ShaderLinkError) -> Self {
        ShaderError::Link(e)
    }
}
