//! Reference path geometry
//!
//! Pipeline: SVG path data → kurbo segments → arc-length index → checkpoints

pub mod path;
pub mod sampler;

pub use path::ReferencePath;
pub use sampler::{ArcLengthIndex, GeometrySampler};
