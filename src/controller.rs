//! Coordinates "open article X" and "close" transitions.
//!
//! The controller is the only writer of [`SessionState`]. It runs on the
//! single-threaded UI executor, so its state sits in `RefCell`/`Cell` and no
//! borrow is ever held across the fetch await. Every `open` and `close` bumps
//! a generation counter; an `open` whose fetches resolve after a newer
//! transition discards its results instead of rendering them.

use std::cell::{Cell, Ref, RefCell};

use futures::future::try_join;
use log::{debug, error, info, warn};

use crate::api::{ArticleRecord, ArticleSource};
use crate::cache::FetchCache;
use crate::error::BrowserError;
use crate::graph::{NodeSizes, transform};
use crate::session::Visualization;

/// One-way notifications to the UI layer.
pub trait ArticleView {
	/// Fetches for `id` have started.
	fn show_loading(&self, id: &str);
	/// Article content is ready to display.
	fn show_article(&self, article: &ArticleRecord);
	/// An open failed with a user-facing message.
	fn show_error(&self, message: &str);
	/// Highlights the list item for `id`, or clears the highlight.
	fn set_active(&self, id: Option<&str>);
	/// Shows or hides the article panel.
	fn set_panel_visible(&self, visible: bool);
	/// Enters or leaves fullscreen mode.
	fn set_fullscreen(&self, fullscreen: bool);
}

/// What the controller currently shows and what it is waiting for.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SessionState {
	/// Article whose content and graph are currently shown.
	pub open_article: Option<String>,
	/// Article whose fetches are in flight.
	pub pending: Option<String>,
}

/// Result of an [`ArticleController::open`] call.
#[derive(Debug, PartialEq)]
pub enum OpenOutcome {
	/// Article and graph are shown.
	Opened,
	/// The id was already open or already being opened.
	AlreadyOpen,
	/// A newer `open` or `close` happened while fetching.
	Superseded,
	/// A fetch failed and the error is shown instead.
	Failed(BrowserError),
}

/// Owns the fetch cache and the visualization and drives the view.
pub struct ArticleController<S, V, U> {
	cache: FetchCache<S>,
	visualization: RefCell<V>,
	view: U,
	sizes: NodeSizes,
	state: RefCell<SessionState>,
	generation: Cell<u64>,
	fullscreen: Cell<bool>,
}

impl<S, V, U> ArticleController<S, V, U>
where
	S: ArticleSource,
	V: Visualization,
	U: ArticleView,
{
	/// Builds an idle controller with an empty cache.
	pub fn new(source: S, visualization: V, view: U, sizes: NodeSizes) -> Self {
		Self {
			cache: FetchCache::new(source),
			visualization: RefCell::new(visualization),
			view,
			sizes,
			state: RefCell::default(),
			generation: Cell::new(0),
			fullscreen: Cell::new(false),
		}
	}

	/// Snapshot of the current session.
	pub fn session_state(&self) -> SessionState {
		self.state.borrow().clone()
	}

	/// The fetch cache.
	pub fn cache(&self) -> &FetchCache<S> {
		&self.cache
	}

	/// The visualization session.
	pub fn visualization(&self) -> Ref<'_, V> {
		self.visualization.borrow()
	}

	/// The view receiving notifications.
	pub fn view(&self) -> &U {
		&self.view
	}

	/// Whether fullscreen mode is on.
	pub fn is_fullscreen(&self) -> bool {
		self.fullscreen.get()
	}

	fn next_generation(&self) -> u64 {
		let generation = self.generation.get() + 1;
		self.generation.set(generation);
		generation
	}

	/// Shows article `id` and its graph, fetching both concurrently.
	///
	/// Opening the article that is already shown while another open is in
	/// flight abandons that open and restores the shown article.
	pub async fn open(&self, id: &str) -> OpenOutcome {
		let (is_open, pending) = {
			let state = self.state.borrow();
			(state.open_article.as_deref() == Some(id), state.pending.clone())
		};
		if is_open && pending.is_some() {
			self.restore(id).await;
			return OpenOutcome::AlreadyOpen;
		}
		if is_open || pending.as_deref() == Some(id) {
			debug!("article {} already open", id);
			return OpenOutcome::AlreadyOpen;
		}

		let generation = self.next_generation();
		self.state.borrow_mut().pending = Some(id.to_string());
		info!("opening article {}", id);
		self.view.set_panel_visible(true);
		self.view.show_loading(id);

		let fetched = try_join(self.cache.article(id), self.cache.graph(id)).await;

		if self.generation.get() != generation {
			debug!("discarding stale response for article {}", id);
			return OpenOutcome::Superseded;
		}
		self.state.borrow_mut().pending = None;

		match fetched {
			Ok((article, graph)) => {
				self.view.show_article(&article);
				let (nodes, edges) = transform(&graph, self.sizes);
				{
					let mut visualization = self.visualization.borrow_mut();
					visualization.stop();
					if let Err(err) = visualization.start(nodes, edges) {
						warn!("article {} opened without graph: {}", id, err);
					}
				}
				self.state.borrow_mut().open_article = Some(id.to_string());
				self.view.set_active(Some(id));
				OpenOutcome::Opened
			}
			Err(err) => {
				error!("error opening article {}: {}", id, err);
				self.visualization.borrow_mut().stop();
				let previous = self.state.borrow_mut().open_article.take();
				if previous.is_some() {
					self.view.set_active(None);
				}
				self.view.show_error(&err.to_string());
				OpenOutcome::Failed(err)
			}
		}
	}

	async fn restore(&self, id: &str) {
		self.next_generation();
		let abandoned = self.state.borrow_mut().pending.take();
		info!(
			"returning to article {}, abandoning {}",
			id,
			abandoned.unwrap_or_default()
		);
		let generation = self.generation.get();
		match self.cache.article(id).await {
			Ok(article) if self.generation.get() == generation => {
				self.view.show_article(&article);
				self.view.set_active(Some(id));
			}
			Ok(_) => {}
			Err(err) => warn!("article {} missing from cache: {}", id, err),
		}
	}

	/// Tears the open article down. Returns `false` when nothing was open.
	pub fn close(&self) -> bool {
		if *self.state.borrow() == SessionState::default() {
			return false;
		}
		self.next_generation();
		let previous = std::mem::take(&mut *self.state.borrow_mut());
		info!(
			"closing article {}",
			previous
				.open_article
				.or(previous.pending)
				.unwrap_or_default()
		);

		self.visualization.borrow_mut().stop();
		if self.fullscreen.replace(false) {
			self.view.set_fullscreen(false);
		}
		self.view.set_active(None);
		self.view.set_panel_visible(false);
		true
	}

	/// Re-measures the graph container.
	pub fn resize(&self) {
		self.visualization.borrow_mut().refresh();
	}

	/// Flips fullscreen mode and refreshes the graph.
	pub fn toggle_fullscreen(&self) {
		let fullscreen = !self.fullscreen.get();
		self.fullscreen.set(fullscreen);
		debug!("fullscreen {}", if fullscreen { "on" } else { "off" });
		self.view.set_fullscreen(fullscreen);
		self.visualization.borrow_mut().refresh();
	}
}

#[cfg(test)]
mod tests {
	use std::rc::Rc;
	use std::time::Duration;

	use futures::executor::{LocalPool, block_on};
	use futures::task::LocalSpawnExt;

	use super::*;
	use crate::api::{EdgeDescriptor, GraphPayload, NodeDescriptor};
	use crate::cache::PayloadKind;
	use crate::session::{EMPTY_GRAPH_MESSAGE, Phase, VisualizationSession};
	use crate::testing::{FakeEngine, FakeSource, ManualScheduler, RecordingView, ViewEvent};

	type TestController =
		ArticleController<FakeSource, VisualizationSession<FakeEngine, ManualScheduler>, RecordingView>;

	struct Harness {
		controller: Rc<TestController>,
		source: FakeSource,
		engine: FakeEngine,
		view: RecordingView,
	}

	fn harness() -> Harness {
		let source = FakeSource::default();
		source.insert_article("a", "Article A");
		source.insert_article("b", "Article B");
		let engine = FakeEngine::default();
		let view = RecordingView::default();
		let session =
			VisualizationSession::new(engine.clone(), ManualScheduler::default(), Duration::from_secs(3));
		Harness {
			controller: Rc::new(ArticleController::new(
				source.clone(),
				session,
				view.clone(),
				NodeSizes::default(),
			)),
			source,
			engine,
			view,
		}
	}

	#[test]
	fn open_renders_article_and_graph() {
		let h = harness();

		assert_eq!(block_on(h.controller.open("a")), OpenOutcome::Opened);

		assert_eq!(h.controller.session_state().open_article.as_deref(), Some("a"));
		assert_eq!(h.controller.visualization().phase(), Phase::Rendering);
		assert_eq!(
			h.view.events(),
			vec![
				ViewEvent::Panel(true),
				ViewEvent::Loading("a".into()),
				ViewEvent::Article("Article A".into()),
				ViewEvent::Active(Some("a".into())),
			]
		);
	}

	#[test]
	fn reopening_same_article_is_noop() {
		let h = harness();
		block_on(h.controller.open("a"));
		let state = h.controller.session_state();
		h.view.clear();

		assert_eq!(block_on(h.controller.open("a")), OpenOutcome::AlreadyOpen);

		assert_eq!(h.controller.session_state(), state);
		assert_eq!(h.source.article_calls("a"), 1);
		assert_eq!(h.source.graph_calls("a"), 1);
		assert_eq!(h.engine.created(), 1);
		assert!(h.view.events().is_empty());
	}

	#[test]
	fn switching_keeps_one_live_renderer() {
		let h = harness();

		block_on(h.controller.open("a"));
		block_on(h.controller.open("b"));

		assert_eq!(h.engine.alive(), 1);
		assert_eq!(h.engine.max_alive(), 1);
		assert_eq!(h.engine.last_nodes(), vec!["b".to_string()]);
		assert_eq!(h.controller.session_state().open_article.as_deref(), Some("b"));
	}

	#[test]
	fn returning_to_an_article_uses_the_cache() {
		let h = harness();

		block_on(h.controller.open("a"));
		block_on(h.controller.open("b"));
		block_on(h.controller.open("a"));

		assert_eq!(h.source.article_calls("a"), 1);
		assert_eq!(h.source.graph_calls("a"), 1);
		assert_eq!(h.engine.created(), 3);
	}

	#[test]
	fn close_without_open_article_is_noop() {
		let h = harness();

		assert!(!h.controller.close());

		assert_eq!(h.controller.session_state(), SessionState::default());
		assert!(h.view.events().is_empty());
	}

	#[test]
	fn close_tears_down_and_clears_highlight() {
		let h = harness();
		block_on(h.controller.open("a"));
		h.view.clear();

		assert!(h.controller.close());

		assert_eq!(h.controller.session_state(), SessionState::default());
		assert_eq!(h.engine.alive(), 0);
		assert_eq!(h.controller.visualization().phase(), Phase::Idle);
		assert_eq!(
			h.view.events(),
			vec![ViewEvent::Active(None), ViewEvent::Panel(false)]
		);
	}

	#[test]
	fn failed_fetch_leaves_article_closed_and_retries() {
		let h = harness();

		let outcome = block_on(h.controller.open("missing"));
		let Some(ViewEvent::Error(message)) = h.view.events().last().cloned() else {
			panic!("expected an error to be shown");
		};
		assert!(matches!(outcome, OpenOutcome::Failed(BrowserError::NotFound { .. })));
		assert!(message.contains("missing"));
		assert_eq!(h.controller.session_state(), SessionState::default());

		h.source.insert_article("missing", "Found later");
		assert_eq!(block_on(h.controller.open("missing")), OpenOutcome::Opened);
		assert_eq!(h.source.article_calls("missing"), 2);
	}

	#[test]
	fn failed_graph_fetch_tears_down_previous_article() {
		let h = harness();
		block_on(h.controller.open("a"));
		h.source.remove_graph("b");

		let outcome = block_on(h.controller.open("b"));

		assert!(matches!(outcome, OpenOutcome::Failed(BrowserError::Unavailable { .. })));
		assert_eq!(h.controller.session_state().open_article, None);
		assert_eq!(h.engine.alive(), 0);
		assert!(h.view.events().contains(&ViewEvent::Active(None)));
		assert!(h.controller.cache().contains(PayloadKind::Article, "b"));
	}

	#[test]
	fn empty_graph_opens_with_placeholder() {
		let h = harness();
		h.source.insert_graph("a", GraphPayload::default());

		assert_eq!(block_on(h.controller.open("a")), OpenOutcome::Opened);

		assert_eq!(h.engine.created(), 0);
		assert_eq!(h.engine.placeholders(), vec![EMPTY_GRAPH_MESSAGE.to_string()]);
		assert_eq!(h.controller.visualization().phase(), Phase::Empty);
	}

	#[test]
	fn render_failure_still_opens_article() {
		let h = harness();
		h.engine.fail_next("no 2d context");

		assert_eq!(block_on(h.controller.open("a")), OpenOutcome::Opened);

		assert_eq!(h.controller.session_state().open_article.as_deref(), Some("a"));
		assert_eq!(
			h.engine.placeholders(),
			vec!["Error rendering graph: no 2d context".to_string()]
		);
	}

	#[test]
	fn dangling_edges_do_not_fail_open() {
		let h = harness();
		h.source.insert_graph(
			"a",
			GraphPayload {
				nodes: vec![NodeDescriptor {
					id: "a".into(),
					label: None,
					category: Some("article".into()),
					properties: Default::default(),
				}],
				edges: vec![EdgeDescriptor {
					source: "a".into(),
					target: "nowhere".into(),
					label: None,
				}],
			},
		);

		assert_eq!(block_on(h.controller.open("a")), OpenOutcome::Opened);
		assert!(h.engine.last_edges().is_empty());
	}

	#[test]
	fn stale_open_is_discarded() {
		let h = harness();
		h.source.hold("a");
		let mut pool = LocalPool::new();
		let first = Rc::new(RefCell::new(None));
		{
			let (controller, first) = (h.controller.clone(), first.clone());
			pool.spawner()
				.spawn_local(async move {
					*first.borrow_mut() = Some(controller.open("a").await);
				})
				.unwrap();
		}
		pool.run_until_stalled();
		assert_eq!(h.controller.session_state().pending.as_deref(), Some("a"));

		assert_eq!(block_on(h.controller.open("b")), OpenOutcome::Opened);
		h.source.release("a");
		pool.run_until_stalled();

		assert_eq!(*first.borrow(), Some(OpenOutcome::Superseded));
		assert_eq!(h.controller.session_state().open_article.as_deref(), Some("b"));
		assert_eq!(h.engine.created(), 1);
		assert_eq!(h.engine.last_nodes(), vec!["b".to_string()]);
	}

	#[test]
	fn returning_to_open_article_abandons_pending_open() {
		let h = harness();
		block_on(h.controller.open("a"));
		h.source.hold("b");
		let mut pool = LocalPool::new();
		let second = Rc::new(RefCell::new(None));
		{
			let (controller, second) = (h.controller.clone(), second.clone());
			pool.spawner()
				.spawn_local(async move {
					*second.borrow_mut() = Some(controller.open("b").await);
				})
				.unwrap();
		}
		pool.run_until_stalled();
		h.view.clear();

		assert_eq!(block_on(h.controller.open("a")), OpenOutcome::AlreadyOpen);
		assert_eq!(h.controller.session_state().pending, None);
		assert_eq!(
			h.view.events(),
			vec![
				ViewEvent::Article("Article A".into()),
				ViewEvent::Active(Some("a".into())),
			]
		);

		h.source.release("b");
		pool.run_until_stalled();

		assert_eq!(*second.borrow(), Some(OpenOutcome::Superseded));
		assert_eq!(h.controller.session_state().open_article.as_deref(), Some("a"));
		assert_eq!(h.engine.created(), 1);
		assert_eq!(h.engine.alive(), 1);
		assert_eq!(h.engine.last_nodes(), vec!["a".to_string()]);
		assert_eq!(h.source.article_calls("a"), 1);
	}

	#[test]
	fn repeated_open_while_pending_is_noop() {
		let h = harness();
		h.source.hold("a");
		let mut pool = LocalPool::new();
		let controller = h.controller.clone();
		pool.spawner()
			.spawn_local(async move {
				controller.open("a").await;
			})
			.unwrap();
		pool.run_until_stalled();

		assert_eq!(block_on(h.controller.open("a")), OpenOutcome::AlreadyOpen);
		h.source.release("a");
		pool.run_until_stalled();

		assert_eq!(h.source.article_calls("a"), 1);
		assert_eq!(h.controller.session_state().open_article.as_deref(), Some("a"));
	}

	#[test]
	fn close_cancels_pending_open() {
		let h = harness();
		h.source.hold("a");
		let mut pool = LocalPool::new();
		let controller = h.controller.clone();
		pool.spawner()
			.spawn_local(async move {
				assert_eq!(controller.open("a").await, OpenOutcome::Superseded);
			})
			.unwrap();
		pool.run_until_stalled();

		assert!(h.controller.close());
		h.source.release("a");
		pool.run_until_stalled();

		assert_eq!(h.controller.session_state(), SessionState::default());
		assert_eq!(h.engine.created(), 0);
	}

	#[test]
	fn fullscreen_toggles_and_refreshes() {
		let h = harness();
		block_on(h.controller.open("a"));
		h.view.clear();

		h.controller.toggle_fullscreen();
		assert!(h.controller.is_fullscreen());
		h.controller.resize();
		assert_eq!(h.engine.refreshed(), 2);

		h.controller.close();
		assert!(!h.controller.is_fullscreen());
		assert_eq!(
			h.view.events(),
			vec![
				ViewEvent::Fullscreen(true),
				ViewEvent::Fullscreen(false),
				ViewEvent::Active(None),
				ViewEvent::Panel(false),
			]
		);
	}

	#[test]
	fn resize_without_article_is_noop() {
		let h = harness();
		h.controller.resize();
		h.controller.toggle_fullscreen();
		assert_eq!(h.engine.refreshed(), 0);
	}
}
