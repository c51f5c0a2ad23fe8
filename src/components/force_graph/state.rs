use std::collections::{HashMap, HashSet};

use force_graph::{DefaultNodeIdx, EdgeData, ForceGraph, NodeData, SimulationParameters};
use serde_json::{Map, Value};

use crate::config::PhysicsConfig;
use crate::graph::{Category, VisualEdge, VisualNode};

pub const HIT_RADIUS: f64 = 12.0;
const TOOLTIP_OFFSET: f64 = 12.0;
const TOOLTIP_MAX_PROPERTIES: usize = 6;

#[derive(Clone, Debug)]
pub struct NodeInfo {
	pub label: String,
	pub category: Category,
	pub color: &'static str,
	pub size: f64,
	pub properties: Map<String, Value>,
}

#[derive(Clone, Debug)]
pub struct EdgeInfo {
	pub source: DefaultNodeIdx,
	pub target: DefaultNodeIdx,
	pub label: String,
	pub color: &'static str,
	pub arrow: bool,
}

#[derive(Clone, Debug, Default)]
pub struct ViewTransform {
	pub x: f64,
	pub y: f64,
	pub k: f64,
}

#[derive(Clone, Debug, Default)]
pub struct DragState {
	pub active: bool,
	pub node_idx: Option<DefaultNodeIdx>,
	pub start_x: f64,
	pub start_y: f64,
	pub node_start_x: f32,
	pub node_start_y: f32,
}

#[derive(Clone, Debug, Default)]
pub struct PanState {
	pub active: bool,
	pub start_x: f64,
	pub start_y: f64,
	pub transform_start_x: f64,
	pub transform_start_y: f64,
}

#[derive(Clone, Debug, Default)]
pub struct HoverState {
	pub node: Option<DefaultNodeIdx>,
	pub neighbors: HashSet<DefaultNodeIdx>,
	pub highlight_t: f64,
	pub prev_node: Option<DefaultNodeIdx>,
	pub prev_neighbors: HashSet<DefaultNodeIdx>,
	delay_t: f64,
}

/// What the floating tooltip shows, in canvas pixel coordinates.
#[derive(Clone, Debug, PartialEq)]
pub struct Tooltip {
	pub left: f64,
	pub top: f64,
	pub title: String,
	pub category: &'static str,
	pub properties: Vec<(String, String)>,
}

impl Tooltip {
	pub fn text(&self) -> String {
		let mut text = format!("{}\n{}", self.title, self.category);
		for (key, value) in &self.properties {
			text.push_str(&format!("\n{}: {}", key, value));
		}
		text
	}
}

pub struct ForceGraphState {
	pub graph: ForceGraph<NodeInfo, ()>,
	pub edges: Vec<EdgeInfo>,
	pub transform: ViewTransform,
	pub drag: DragState,
	pub pan: PanState,
	pub hover: HoverState,
	pub width: f64,
	pub height: f64,
	pub layout_running: bool,
	pub flow_time: f64,
}

impl ForceGraphState {
	/// Builds the simulation. Edges whose endpoints are not among `nodes` are skipped.
	pub fn new(
		nodes: &[VisualNode],
		edges: &[VisualEdge],
		width: f64,
		height: f64,
		physics: &PhysicsConfig,
	) -> Self {
		let mut graph = ForceGraph::new(SimulationParameters {
			force_charge: physics.force_charge,
			force_spring: physics.force_spring,
			force_max: physics.force_max,
			node_speed: physics.node_speed,
			damping_factor: physics.damping_factor,
		});
		let mut id_to_idx = HashMap::new();

		for node in nodes {
			let idx = graph.add_node(NodeData {
				x: node.x as f32,
				y: node.y as f32,
				mass: if node.category == Category::Article { 20.0 } else { 10.0 },
				is_anchor: false,
				user_data: NodeInfo {
					label: node.label.clone(),
					category: node.category,
					color: node.color,
					size: node.size,
					properties: node.properties.clone(),
				},
			});
			id_to_idx.insert(node.id.as_str(), idx);
		}

		let mut infos = Vec::new();
		for edge in edges {
			if let (Some(&src), Some(&tgt)) =
				(id_to_idx.get(edge.source.as_str()), id_to_idx.get(edge.target.as_str()))
			{
				graph.add_edge(src, tgt, EdgeData::default());
				infos.push(EdgeInfo {
					source: src,
					target: tgt,
					label: edge.label.clone(),
					color: edge.color,
					arrow: edge.arrow,
				});
			}
		}

		Self {
			graph,
			edges: infos,
			transform: ViewTransform {
				x: width / 2.0,
				y: height / 2.0,
				k: 1.0,
			},
			drag: DragState::default(),
			pan: PanState::default(),
			hover: HoverState::default(),
			width,
			height,
			layout_running: true,
			flow_time: 0.0,
		}
	}

	pub fn screen_to_graph(&self, sx: f64, sy: f64) -> (f64, f64) {
		(
			(sx - self.transform.x) / self.transform.k,
			(sy - self.transform.y) / self.transform.k,
		)
	}

	pub fn graph_to_screen(&self, gx: f64, gy: f64) -> (f64, f64) {
		(
			gx * self.transform.k + self.transform.x,
			gy * self.transform.k + self.transform.y,
		)
	}

	pub fn node_at_position(&self, sx: f64, sy: f64) -> Option<DefaultNodeIdx> {
		let (gx, gy) = self.screen_to_graph(sx, sy);
		let mut found = None;
		self.graph.visit_nodes(|node| {
			let (dx, dy) = (node.x() as f64 - gx, node.y() as f64 - gy);
			// world-space radius, scales with zoom like nodes
			let radius = HIT_RADIUS.max(node.data.user_data.size);
			if (dx * dx + dy * dy).sqrt() < radius {
				found = Some(node.index());
			}
		});
		found
	}

	/// Node positions and sizes keyed by index, for drawing edges.
	pub fn positions(&self) -> HashMap<DefaultNodeIdx, (f64, f64, f64)> {
		let mut positions = HashMap::new();
		self.graph.visit_nodes(|node| {
			positions.insert(
				node.index(),
				(node.x() as f64, node.y() as f64, node.data.user_data.size),
			);
		});
		positions
	}

	pub fn set_hover(&mut self, node: Option<DefaultNodeIdx>) {
		if self.hover.node == node {
			return;
		}
		let was_hovering = self.hover.node.is_some();

		// Keep the previous highlight around so it can fade out
		if was_hovering && node.is_none() {
			self.hover.prev_node = self.hover.node.take();
			self.hover.prev_neighbors = std::mem::take(&mut self.hover.neighbors);
		} else {
			self.hover.prev_node = None;
			self.hover.prev_neighbors.clear();
		}

		self.hover.node = node;
		self.hover.neighbors.clear();

		if let Some(idx) = node {
			if !was_hovering {
				self.hover.delay_t = 0.0;
			}
			for edge in &self.edges {
				if edge.source == idx {
					self.hover.neighbors.insert(edge.target);
				} else if edge.target == idx {
					self.hover.neighbors.insert(edge.source);
				}
			}
		}
	}

	/// Tooltip for the hovered node, placed just below-right of it on screen.
	pub fn tooltip(&self) -> Option<Tooltip> {
		let idx = self.hover.node?;
		let mut tooltip = None;
		self.graph.visit_nodes(|node| {
			if node.index() != idx {
				return;
			}
			let info = &node.data.user_data;
			let (sx, sy) = self.graph_to_screen(node.x() as f64, node.y() as f64);
			let offset = info.size * self.transform.k + TOOLTIP_OFFSET;
			tooltip = Some(Tooltip {
				left: sx + offset,
				top: sy + offset,
				title: info.label.clone(),
				category: info.category.name(),
				properties: info
					.properties
					.iter()
					.filter_map(|(key, value)| match value {
						Value::String(s) if !s.is_empty() => Some((key.clone(), s.clone())),
						Value::Number(n) => Some((key.clone(), n.to_string())),
						Value::Bool(b) => Some((key.clone(), b.to_string())),
						_ => None,
					})
					.take(TOOLTIP_MAX_PROPERTIES)
					.collect(),
			});
		});
		tooltip
	}

	pub fn is_highlighted(&self, idx: DefaultNodeIdx) -> bool {
		self.hover.node == Some(idx)
			|| self.hover.neighbors.contains(&idx)
			|| self.hover.prev_node == Some(idx)
			|| self.hover.prev_neighbors.contains(&idx)
	}

	pub fn is_hovered(&self, idx: DefaultNodeIdx) -> bool {
		self.hover.node == Some(idx) || self.hover.prev_node == Some(idx)
	}

	pub fn has_active_highlight(&self) -> bool {
		self.hover.node.is_some() || self.hover.prev_node.is_some()
	}

	pub fn halt_layout(&mut self) {
		self.layout_running = false;
	}

	pub fn tick(&mut self, dt: f32) {
		// A dragged node still has to move after the layout is halted.
		if self.layout_running || self.drag.active {
			self.graph.update(dt);
		}
		self.flow_time += dt as f64;

		let (target, delay, speed) = if self.hover.node.is_some() {
			(1.0, 0.08, 1.8)
		} else {
			(0.0, 0.0, 1.26)
		};

		if self.hover.node.is_some() {
			self.hover.delay_t = (self.hover.delay_t + dt as f64).min(delay);
			if self.hover.delay_t >= delay {
				self.hover.highlight_t += (target - self.hover.highlight_t) * speed * dt as f64;
			}
		} else {
			self.hover.highlight_t += (target - self.hover.highlight_t) * speed * dt as f64;
			if self.hover.highlight_t < 0.01 {
				self.hover.highlight_t = 0.0;
				self.hover.prev_node = None;
				self.hover.prev_neighbors.clear();
			}
		}
	}

	/// Keeps the graph centred in a resized canvas.
	pub fn resize(&mut self, width: f64, height: f64) {
		self.transform.x += (width - self.width) / 2.0;
		self.transform.y += (height - self.height) / 2.0;
		self.width = width;
		self.height = height;
	}
}
