//! In-memory stand-ins for the network, the renderer, the timer and the UI.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;
use std::time::Duration;

use futures::channel::oneshot;

use crate::api::{ArticleRecord, ArticleSource, GraphPayload, NodeDescriptor};
use crate::controller::ArticleView;
use crate::error::{BrowserError, Result};
use crate::graph::{VisualEdge, VisualNode};
use crate::session::{EngineInstance, RenderEngine, ScheduledTask, Scheduler};

#[derive(Default)]
struct SourceState {
	articles: HashMap<String, ArticleRecord>,
	graphs: HashMap<String, GraphPayload>,
	article_calls: HashMap<String, usize>,
	graph_calls: HashMap<String, usize>,
	gates: HashMap<String, Vec<oneshot::Sender<()>>>,
	held: Vec<String>,
}

/// Article source backed by maps. Ids passed to [`FakeSource::hold`] block
/// their article fetch until [`FakeSource::release`].
#[derive(Clone, Default)]
pub struct FakeSource(Rc<RefCell<SourceState>>);

impl FakeSource {
	pub fn with_article(id: &str, title: &str) -> Self {
		let source = Self::default();
		source.insert_article(id, title);
		source
	}

	/// Adds an article and a one-node graph for it.
	pub fn insert_article(&self, id: &str, title: &str) {
		let mut state = self.0.borrow_mut();
		state.articles.insert(
			id.into(),
			ArticleRecord {
				id: Some(id.into()),
				title: title.into(),
				..Default::default()
			},
		);
		state.graphs.entry(id.into()).or_insert_with(|| GraphPayload {
			nodes: vec![NodeDescriptor {
				id: id.into(),
				label: Some(title.into()),
				category: Some("article".into()),
				properties: Default::default(),
			}],
			edges: vec![],
		});
	}

	pub fn insert_graph(&self, id: &str, graph: GraphPayload) {
		self.0.borrow_mut().graphs.insert(id.into(), graph);
	}

	pub fn remove_graph(&self, id: &str) {
		self.0.borrow_mut().graphs.remove(id);
	}

	pub fn hold(&self, id: &str) {
		self.0.borrow_mut().held.push(id.into());
	}

	pub fn release(&self, id: &str) {
		let mut state = self.0.borrow_mut();
		state.held.retain(|held| held != id);
		for gate in state.gates.remove(id).unwrap_or_default() {
			let _ = gate.send(());
		}
	}

	pub fn article_calls(&self, id: &str) -> usize {
		self.0.borrow().article_calls.get(id).copied().unwrap_or(0)
	}

	pub fn graph_calls(&self, id: &str) -> usize {
		self.0.borrow().graph_calls.get(id).copied().unwrap_or(0)
	}
}

impl ArticleSource for FakeSource {
	async fn fetch_article(&self, id: &str) -> Result<ArticleRecord> {
		let gate = {
			let mut state = self.0.borrow_mut();
			*state.article_calls.entry(id.into()).or_default() += 1;
			if state.held.iter().any(|held| held == id) {
				let (tx, rx) = oneshot::channel();
				state.gates.entry(id.into()).or_default().push(tx);
				Some(rx)
			} else {
				None
			}
		};
		if let Some(rx) = gate {
			let _ = rx.await;
		}
		self.0
			.borrow()
			.articles
			.get(id)
			.cloned()
			.ok_or_else(|| BrowserError::not_found(id, "status 404 Not Found"))
	}

	async fn fetch_graph(&self, id: &str) -> Result<GraphPayload> {
		let mut state = self.0.borrow_mut();
		*state.graph_calls.entry(id.into()).or_default() += 1;
		state
			.graphs
			.get(id)
			.cloned()
			.ok_or_else(|| BrowserError::unavailable(id, "status 404 Not Found"))
	}
}

#[derive(Default)]
struct EngineLog {
	created: usize,
	destroyed: usize,
	alive: usize,
	max_alive: usize,
	halted: usize,
	refreshed: usize,
	placeholders: Vec<String>,
	last_nodes: Vec<String>,
	last_edges: Vec<String>,
	fail_next: Option<String>,
}

/// Rendering engine that records what it was asked to do.
#[derive(Clone, Default)]
pub struct FakeEngine(Rc<RefCell<EngineLog>>);

pub struct FakeInstance(Rc<RefCell<EngineLog>>);

impl FakeEngine {
	pub fn fail_next(&self, reason: &str) {
		self.0.borrow_mut().fail_next = Some(reason.into());
	}

	pub fn created(&self) -> usize {
		self.0.borrow().created
	}

	pub fn destroyed(&self) -> usize {
		self.0.borrow().destroyed
	}

	pub fn alive(&self) -> usize {
		self.0.borrow().alive
	}

	pub fn max_alive(&self) -> usize {
		self.0.borrow().max_alive
	}

	pub fn halted(&self) -> usize {
		self.0.borrow().halted
	}

	pub fn refreshed(&self) -> usize {
		self.0.borrow().refreshed
	}

	pub fn placeholders(&self) -> Vec<String> {
		self.0.borrow().placeholders.clone()
	}

	pub fn last_nodes(&self) -> Vec<String> {
		self.0.borrow().last_nodes.clone()
	}

	pub fn last_edges(&self) -> Vec<String> {
		self.0.borrow().last_edges.clone()
	}
}

impl RenderEngine for FakeEngine {
	type Instance = FakeInstance;

	fn create(&mut self, nodes: &[VisualNode], edges: &[VisualEdge]) -> Result<FakeInstance> {
		let mut log = self.0.borrow_mut();
		if let Some(reason) = log.fail_next.take() {
			return Err(BrowserError::RenderFailure(reason));
		}
		log.created += 1;
		log.alive += 1;
		log.max_alive = log.max_alive.max(log.alive);
		log.last_nodes = nodes.iter().map(|n| n.id.clone()).collect();
		log.last_edges = edges.iter().map(|e| e.id.clone()).collect();
		Ok(FakeInstance(self.0.clone()))
	}

	fn show_placeholder(&mut self, message: &str) {
		self.0.borrow_mut().placeholders.push(message.into());
	}

	fn clear(&mut self) {}
}

impl EngineInstance for FakeInstance {
	fn refresh(&mut self) {
		self.0.borrow_mut().refreshed += 1;
	}

	fn halt_layout(&mut self) {
		self.0.borrow_mut().halted += 1;
	}

	fn destroy(self) {
		let mut log = self.0.borrow_mut();
		log.destroyed += 1;
		log.alive -= 1;
	}
}

struct PendingTask {
	delay: Duration,
	task: Option<Box<dyn FnOnce()>>,
	cancelled: Rc<Cell<bool>>,
}

/// Scheduler whose tasks only run when the test fires them.
#[derive(Clone, Default)]
pub struct ManualScheduler(Rc<RefCell<Vec<PendingTask>>>);

pub struct ManualTask(Rc<Cell<bool>>);

impl ScheduledTask for ManualTask {
	fn cancel(self) {
		self.0.set(true);
	}
}

impl Scheduler for ManualScheduler {
	type Task = ManualTask;

	fn schedule(&self, delay: Duration, task: Box<dyn FnOnce()>) -> ManualTask {
		let cancelled = Rc::new(Cell::new(false));
		self.0.borrow_mut().push(PendingTask {
			delay,
			task: Some(task),
			cancelled: cancelled.clone(),
		});
		ManualTask(cancelled)
	}
}

impl ManualScheduler {
	pub fn delays(&self) -> Vec<Duration> {
		self.0.borrow().iter().map(|p| p.delay).collect()
	}

	pub fn pending(&self) -> usize {
		self.0
			.borrow()
			.iter()
			.filter(|p| p.task.is_some() && !p.cancelled.get())
			.count()
	}

	/// Removes every runnable task without running it.
	pub fn take_all(&self) -> Vec<Box<dyn FnOnce()>> {
		self.0
			.borrow_mut()
			.iter_mut()
			.filter(|p| !p.cancelled.get())
			.filter_map(|p| p.task.take())
			.collect()
	}

	pub fn fire_all(&self) {
		for task in self.take_all() {
			task();
		}
	}
}

#[derive(Clone, Debug, PartialEq)]
pub enum ViewEvent {
	Loading(String),
	Article(String),
	Error(String),
	Active(Option<String>),
	Panel(bool),
	Fullscreen(bool),
}

/// Records every notification sent to the UI layer.
#[derive(Clone, Default)]
pub struct RecordingView(Rc<RefCell<Vec<ViewEvent>>>);

impl RecordingView {
	pub fn events(&self) -> Vec<ViewEvent> {
		self.0.borrow().clone()
	}

	pub fn clear(&self) {
		self.0.borrow_mut().clear();
	}
}

impl ArticleView for RecordingView {
	fn show_loading(&self, id: &str) {
		self.0.borrow_mut().push(ViewEvent::Loading(id.into()));
	}

	fn show_article(&self, article: &ArticleRecord) {
		self.0.borrow_mut().push(ViewEvent::Article(article.title.clone()));
	}

	fn show_error(&self, message: &str) {
		self.0.borrow_mut().push(ViewEvent::Error(message.into()));
	}

	fn set_active(&self, id: Option<&str>) {
		self.0.borrow_mut().push(ViewEvent::Active(id.map(Into::into)));
	}

	fn set_panel_visible(&self, visible: bool) {
		self.0.borrow_mut().push(ViewEvent::Panel(visible));
	}

	fn set_fullscreen(&self, fullscreen: bool) {
		self.0.borrow_mut().push(ViewEvent::Fullscreen(fullscreen));
	}
}
