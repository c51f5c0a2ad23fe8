//! Leptos components and the canvas graph engine.

pub mod article_panel;
pub mod force_graph;
