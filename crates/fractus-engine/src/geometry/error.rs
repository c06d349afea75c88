use std::fmt;

/// The geometry description cannot be turned into a drawable buffer.
#[derive(Debug, Clone, PartialEq)]
pub enum GeometryShapeError {
    /// The JSON text is not a geometry description.
    Malformed(String),
    NoTriangles,
    NoAttributes,
    /// Attribute vectors must have 1 to 4 components.
    ComponentCount { attribute: usize, components: usize },
    /// Entries of one attribute have different lengths.
    RaggedAttribute { attribute: usize, vertex: usize, expected: usize, found: usize },
    /// Attribute length differs from `max(index) + 1`.
    VertexCount { attribute: usize, expected: usize, found: usize },
    /// An index does not fit the 16-bit index buffer.
    IndexTooWide { index: u32 },
    NonFinite { attribute: usize, vertex: usize },
}

impl fmt::Display for GeometryShapeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GeometryShapeError::Malformed(msg) => write!(f, "malformed geometry description: {msg}"),
            GeometryShapeError::NoTriangles => f.write_str("geometry has no triangles"),
            GeometryShapeError::NoAttributes => f.write_str("geometry has no vertex attributes"),
            GeometryShapeError::ComponentCount { attribute, components } => write!(
                f,
                "attribute {attribute} has {components}-component vectors; expected 1 to 4"
            ),
            GeometryShapeError::RaggedAttribute { attribute, vertex, expected, found } => write!(
                f,
                "attribute {attribute}, vertex {vertex}: expected {expected} components, found {found}"
            ),
            GeometryShapeError::VertexCount { attribute, expected, found } => write!(
                f,
                "attribute {attribute} has {found} vertices, but the triangles reference {expected}"
            ),
            GeometryShapeError::IndexTooWide { index } => {
                write!(f, "vertex index {index} does not fit in a 16-bit index buffer")
            }
            GeometryShapeError::NonFinite { attribute, vertex } => {
                write!(f, "attribute {attribute}, vertex {vertex} contains a non-finite value")
            }
        }
    }
}

impl std::error::Error for GeometryShapeError {}
