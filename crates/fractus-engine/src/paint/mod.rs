//! Paint model: color representation for clear values.

mod color;

pub use color::{Color, ParseColorError};
