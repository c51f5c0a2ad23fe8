use std::collections::HashSet;
use std::f64::consts::PI;

use serde_json::{Map, Value};

use super::palette::Category;
use crate::api::GraphPayload;

/// Stroke color for every edge.
pub const EDGE_COLOR: &str = "#848484";
const PLACEMENT_RADIUS: f64 = 100.0;

/// Node radii by kind.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct NodeSizes {
	/// Radius of article nodes.
	pub article: f64,
	/// Radius of every other node.
	pub other: f64,
}

impl Default for NodeSizes {
	fn default() -> Self {
		Self {
			article: 10.0,
			other: 6.0,
		}
	}
}

/// A node ready to hand to a renderer.
#[derive(Clone, Debug, PartialEq)]
pub struct VisualNode {
	/// Server node id.
	pub id: String,
	/// Display label, never empty.
	pub label: String,
	/// Resolved entity kind.
	pub category: Category,
	/// Fill color.
	pub color: &'static str,
	/// Radius in graph units.
	pub size: f64,
	/// Initial horizontal position.
	pub x: f64,
	/// Initial vertical position.
	pub y: f64,
	/// Server properties, shown in the tooltip.
	pub properties: Map<String, Value>,
}

/// An edge ready to hand to a renderer.
#[derive(Clone, Debug, PartialEq)]
pub struct VisualEdge {
	/// Positional id, `e0`, `e1`, ...
	pub id: String,
	/// Source node id.
	pub source: String,
	/// Target node id.
	pub target: String,
	/// Relationship label, possibly empty.
	pub label: String,
	/// Stroke color.
	pub color: &'static str,
	/// Whether an arrowhead is drawn at the target.
	pub arrow: bool,
}

/// Reshapes a server graph into the renderer's schema.
///
/// Nodes start on a circle around the origin; the physics layout moves them
/// from there. Edges are passed through even when an endpoint is missing.
pub fn transform(payload: &GraphPayload, sizes: NodeSizes) -> (Vec<VisualNode>, Vec<VisualEdge>) {
	let count = payload.nodes.len().max(1) as f64;
	let nodes = payload
		.nodes
		.iter()
		.enumerate()
		.map(|(i, node)| {
			let category = Category::from_tag(node.category.as_deref());
			let angle = (i as f64) * 2.0 * PI / count;
			VisualNode {
				id: node.id.clone(),
				label: node
					.label
					.clone()
					.unwrap_or_else(|| format!("Node {}", node.id)),
				category,
				color: category.color(),
				size: if category == Category::Article {
					sizes.article
				} else {
					sizes.other
				},
				x: PLACEMENT_RADIUS * angle.cos(),
				y: PLACEMENT_RADIUS * angle.sin(),
				properties: node.properties.clone(),
			}
		})
		.collect();

	let edges = payload
		.edges
		.iter()
		.enumerate()
		.map(|(i, edge)| VisualEdge {
			id: format!("e{}", i),
			source: edge.source.clone(),
			target: edge.target.clone(),
			label: edge.label.clone().unwrap_or_default(),
			color: EDGE_COLOR,
			arrow: true,
		})
		.collect();

	(nodes, edges)
}

/// Splits edges into those whose endpoints both exist and the dangling rest.
pub fn resolve_edges(
	nodes: &[VisualNode],
	edges: Vec<VisualEdge>,
) -> (Vec<VisualEdge>, Vec<VisualEdge>) {
	let ids: HashSet<&str> = nodes.iter().map(|n| n.id.as_str()).collect();
	edges
		.into_iter()
		.partition(|e| ids.contains(e.source.as_str()) && ids.contains(e.target.as_str()))
}
