//! Application layer: the text-to-artifacts pipeline and its consumers.

pub mod delivery;
pub mod extract;
pub mod features;
pub mod fence;
pub mod pipeline;
pub mod report;
pub mod sanitize;
pub mod tree;
pub mod writer;

pub use extract::extract;
pub use features::detect;
pub use pipeline::{Pipeline, PipelineOptions, parse};
pub use sanitize::sanitize;
pub use tree::build_tree;
