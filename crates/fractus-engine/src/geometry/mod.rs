//! Static geometry: description, validation and GPU upload.
//!
//! `GeometryDescription::prepare` does every check on the CPU; `GeometryHandle`
//! only ever sees data that is known to be drawable.

mod buffer;
mod description;
mod error;

pub use buffer::GeometryHandle;
pub use description::{
    AttributeLayout, DrawDescriptor, GeometryDescription, PreparedAttribute, PreparedGeometry,
};
pub use error::GeometryShapeError;
