//! Lifecycle of the one live graph renderer.
//!
//! A [`VisualizationSession`] owns at most one engine instance. Every `start`
//! first tears the previous instance down, so two renderers never coexist,
//! and the layout halt timer of a torn-down instance can never reach its
//! successor.

mod scheduler;

pub use scheduler::{ScheduledTask, Scheduler, Timeout, TimeoutScheduler};

use std::cell::RefCell;
use std::rc::{Rc, Weak};
use std::time::Duration;

use log::{debug, error, warn};

use crate::error::Result;
use crate::graph::{VisualEdge, VisualNode, resolve_edges};

/// Placeholder text for a graph without nodes.
pub const EMPTY_GRAPH_MESSAGE: &str = "No graph data available for this article";

/// Capability interface the controller drives.
pub trait Visualization {
	/// Replaces whatever is shown with a graph of `nodes` and `edges`.
	fn start(&mut self, nodes: Vec<VisualNode>, edges: Vec<VisualEdge>) -> Result<Phase>;
	/// Releases the live renderer, if any.
	fn stop(&mut self);
	/// Re-measures and redraws after a resize or fullscreen change.
	fn refresh(&mut self);
	/// Current lifecycle phase.
	fn phase(&self) -> Phase;
}

/// A concrete rendering backend bound to one container.
pub trait RenderEngine {
	/// Handle to one mounted renderer.
	type Instance: EngineInstance;

	/// Mounts a renderer for the graph into the container.
	fn create(&mut self, nodes: &[VisualNode], edges: &[VisualEdge]) -> Result<Self::Instance>;
	/// Shows `message` in place of a graph.
	fn show_placeholder(&mut self, message: &str);
	/// Empties the container.
	fn clear(&mut self);
}

/// A mounted renderer.
pub trait EngineInstance {
	/// Re-measures the container and redraws.
	fn refresh(&mut self);
	/// Stops the physics simulation; the graph stays interactive.
	fn halt_layout(&mut self);
	/// Stops all callbacks and removes the renderer from the page.
	fn destroy(self);
}

/// Lifecycle phase of a [`VisualizationSession`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
	/// Nothing is shown.
	Idle,
	/// A renderer is live.
	Rendering,
	/// A placeholder is shown instead of a renderer.
	Empty,
}

struct Live<I> {
	generation: u64,
	instance: I,
}

/// [`Visualization`] over a [`RenderEngine`], halting the layout after a fixed budget.
pub struct VisualizationSession<E: RenderEngine, S: Scheduler> {
	engine: E,
	scheduler: S,
	layout_budget: Duration,
	live: Rc<RefCell<Option<Live<E::Instance>>>>,
	halt: Option<S::Task>,
	phase: Phase,
	generation: u64,
}

impl<E, S> VisualizationSession<E, S>
where
	E: RenderEngine,
	E::Instance: 'static,
	S: Scheduler,
{
	/// An idle session.
	pub fn new(engine: E, scheduler: S, layout_budget: Duration) -> Self {
		Self {
			engine,
			scheduler,
			layout_budget,
			live: Rc::new(RefCell::new(None)),
			halt: None,
			phase: Phase::Idle,
			generation: 0,
		}
	}

	/// The rendering backend.
	pub fn engine(&self) -> &E {
		&self.engine
	}

	fn schedule_halt(&mut self, generation: u64) {
		let live: Weak<RefCell<Option<Live<E::Instance>>>> = Rc::downgrade(&self.live);
		let task = self.scheduler.schedule(
			self.layout_budget,
			Box::new(move || {
				let Some(live) = live.upgrade() else {
					return;
				};
				let mut slot = live.borrow_mut();
				match slot.as_mut() {
					Some(current) if current.generation == generation => {
						debug!("halting layout of renderer {}", generation);
						current.instance.halt_layout();
					}
					_ => debug!("layout halt for stale renderer {} ignored", generation),
				}
			}),
		);
		self.halt = Some(task);
	}
}

impl<E, S> Visualization for VisualizationSession<E, S>
where
	E: RenderEngine,
	E::Instance: 'static,
	S: Scheduler,
{
	fn start(&mut self, nodes: Vec<VisualNode>, edges: Vec<VisualEdge>) -> Result<Phase> {
		self.stop();
		self.engine.clear();

		if nodes.is_empty() {
			self.engine.show_placeholder(EMPTY_GRAPH_MESSAGE);
			self.phase = Phase::Empty;
			return Ok(self.phase);
		}

		let (edges, dangling) = resolve_edges(&nodes, edges);
		if !dangling.is_empty() {
			warn!(
				"dropped {} edge(s) referencing unknown nodes: {}",
				dangling.len(),
				dangling
					.iter()
					.map(|e| format!("{} -> {}", e.source, e.target))
					.collect::<Vec<_>>()
					.join(", ")
			);
		}

		match self.engine.create(&nodes, &edges) {
			Ok(instance) => {
				self.generation += 1;
				*self.live.borrow_mut() = Some(Live {
					generation: self.generation,
					instance,
				});
				self.schedule_halt(self.generation);
				self.phase = Phase::Rendering;
				debug!(
					"renderer {} started with {} nodes, {} edges",
					self.generation,
					nodes.len(),
					edges.len()
				);
				Ok(self.phase)
			}
			Err(err) => {
				error!("renderer construction failed: {}", err);
				self.engine.show_placeholder(&err.to_string());
				self.phase = Phase::Empty;
				Err(err)
			}
		}
	}

	fn stop(&mut self) {
		if let Some(task) = self.halt.take() {
			task.cancel();
		}
		let live = self.live.borrow_mut().take();
		if let Some(live) = live {
			debug!("renderer {} destroyed", live.generation);
			live.instance.destroy();
		}
		self.phase = Phase::Idle;
	}

	fn refresh(&mut self) {
		if let Some(live) = self.live.borrow_mut().as_mut() {
			live.instance.refresh();
		}
	}

	fn phase(&self) -> Phase {
		self.phase
	}
}
