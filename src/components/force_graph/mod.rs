//! Force-directed graph rendered on a canvas.

mod engine;
mod render;
mod state;

pub use engine::{CanvasEngine, CanvasInstance};
