//! Runtime configuration for the article browser.

use std::time::Duration;

use crate::graph::NodeSizes;

/// Force-directed layout tuning, mirrored into `force_graph::SimulationParameters`.
#[derive(Clone, Debug, PartialEq)]
pub struct PhysicsConfig {
	/// Repulsion between nodes.
	pub force_charge: f32,
	/// Attraction along edges.
	pub force_spring: f32,
	/// Upper bound on any single force.
	pub force_max: f32,
	/// Velocity scale.
	pub node_speed: f32,
	/// Per-step velocity decay.
	pub damping_factor: f32,
}

impl Default for PhysicsConfig {
	fn default() -> Self {
		Self {
			force_charge: 150.0,
			force_spring: 0.05,
			force_max: 100.0,
			node_speed: 3000.0,
			damping_factor: 0.9,
		}
	}
}

/// Everything the browser glue needs to know about its page and server.
#[derive(Clone, Debug, PartialEq)]
pub struct BrowserConfig {
	/// Origin the `/api/...` routes are resolved against.
	pub api_base: String,
	/// Id of the element the graph canvas is mounted into.
	pub graph_container_id: String,
	/// Class of the floating tooltip element.
	pub tooltip_class: String,
	/// How long the physics layout runs before it is halted.
	pub layout_budget: Duration,
	/// Quiet period before a window resize reaches the graph.
	pub resize_debounce: Duration,
	/// Node radii.
	pub node_sizes: NodeSizes,
	/// Layout tuning.
	pub physics: PhysicsConfig,
}

impl Default for BrowserConfig {
	fn default() -> Self {
		Self {
			api_base: String::new(),
			graph_container_id: "graphContainer".into(),
			tooltip_class: "graph-tooltip".into(),
			layout_budget: Duration::from_secs(3),
			resize_debounce: Duration::from_millis(100),
			node_sizes: NodeSizes::default(),
			physics: PhysicsConfig::default(),
		}
	}
}

impl BrowserConfig {
	/// Defaults with the given server origin; a trailing `/` is dropped.
	pub fn with_api_base(api_base: impl Into<String>) -> Self {
		let api_base: String = api_base.into();
		Self {
			api_base: api_base.trim_end_matches('/').to_string(),
			..Self::default()
		}
	}

	/// Reads `data-api-base` from `<body>`, falling back to the page origin.
	pub fn from_document() -> Self {
		let Some(window) = web_sys::window() else {
			return Self::default();
		};
		let from_body = window
			.document()
			.and_then(|doc| doc.body())
			.and_then(|body| body.get_attribute("data-api-base"))
			.filter(|base| !base.is_empty());
		let base = from_body.or_else(|| window.location().origin().ok());
		match base {
			Some(base) => Self::with_api_base(base),
			None => Self::default(),
		}
	}

	/// `/api/article/{id}` on the configured server.
	pub fn article_url(&self, id: &str) -> String {
		format!("{}/api/article/{}", self.api_base, urlencoding::encode(id))
	}

	/// `/api/graph/{id}` on the configured server.
	pub fn graph_url(&self, id: &str) -> String {
		format!("{}/api/graph/{}", self.api_base, urlencoding::encode(id))
	}
}
