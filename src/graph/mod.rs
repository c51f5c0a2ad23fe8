//! Conversion of server graph payloads into renderer-ready nodes and edges.

pub mod palette;
mod visual;

pub use palette::{Category, DEFAULT_COLOR};
pub use visual::{EDGE_COLOR, NodeSizes, VisualEdge, VisualNode, resolve_edges, transform};
