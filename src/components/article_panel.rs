//! The article side panel and the signals that drive it.

use std::rc::Rc;

use leptos::prelude::*;
use web_sys::MouseEvent;

use crate::BrowserController;
use crate::api::ArticleRecord;
use crate::controller::ArticleView;

/// What the panel body shows.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum PanelContent {
	/// Nothing opened yet.
	#[default]
	Empty,
	/// Fetching the article with this id.
	Loading(String),
	/// A fetched article.
	Article(ArticleRecord),
	/// Error message from a failed open.
	Error(String),
}

/// Signal-backed [`ArticleView`]; the panel and the page effects render from it.
#[derive(Clone, Copy)]
pub struct PanelView {
	/// Panel body.
	pub content: RwSignal<PanelContent>,
	/// Id of the highlighted list item.
	pub active: RwSignal<Option<String>>,
	/// Whether the panel is shown.
	pub visible: RwSignal<bool>,
	/// Whether the panel fills the window.
	pub fullscreen: RwSignal<bool>,
}

impl PanelView {
	/// A hidden, empty panel.
	pub fn new() -> Self {
		Self {
			content: RwSignal::new(PanelContent::Empty),
			active: RwSignal::new(None),
			visible: RwSignal::new(false),
			fullscreen: RwSignal::new(false),
		}
	}
}

impl Default for PanelView {
	fn default() -> Self {
		Self::new()
	}
}

impl ArticleView for PanelView {
	fn show_loading(&self, id: &str) {
		self.content.set(PanelContent::Loading(id.to_string()));
	}

	fn show_article(&self, article: &ArticleRecord) {
		self.content.set(PanelContent::Article(article.clone()));
	}

	fn show_error(&self, message: &str) {
		self.content.set(PanelContent::Error(message.to_string()));
	}

	fn set_active(&self, id: Option<&str>) {
		self.active.set(id.map(str::to_string));
	}

	fn set_panel_visible(&self, visible: bool) {
		self.visible.set(visible);
	}

	fn set_fullscreen(&self, fullscreen: bool) {
		self.fullscreen.set(fullscreen);
	}
}

fn article_body(article: ArticleRecord) -> impl IntoView {
	let body = article.sanitized_content();
	view! {
		<p class="article-source">
			<a id="articleSourceValue" href=article.url target="_blank" rel="noopener">
				{article.source}
			</a>
		</p>
		<div class="article-meta">
			<span class="article-date">{article.date}</span>
			<span class="article-read-time">{article.read_time}</span>
		</div>
		<div class="article-text" inner_html=body></div>
	}
}

/// Side panel showing the open article and its graph container.
#[component]
pub fn ArticlePanel(
	/// Signals the controller writes to.
	panel: PanelView,
	/// Handles the close and fullscreen buttons.
	controller: StoredValue<Rc<BrowserController>, LocalStorage>,
	/// Id given to the graph container element.
	#[prop(into)]
	graph_container_id: String,
) -> impl IntoView {
	let title = move || {
		panel.content.with(|content| match content {
			PanelContent::Article(article) => article.title.clone(),
			PanelContent::Loading(_) => "Loading...".to_string(),
			_ => String::new(),
		})
	};

	let content = move || match panel.content.get() {
		PanelContent::Empty => ().into_any(),
		PanelContent::Loading(_) => view! {
			<div class="loading-spinner"></div>
			<p>"Loading article..."</p>
		}
		.into_any(),
		PanelContent::Article(article) => article_body(article).into_any(),
		PanelContent::Error(message) => view! { <p class="error">{message}</p> }.into_any(),
	};

	let on_close = move |_: MouseEvent| {
		controller.with_value(|c| {
			c.close();
		})
	};
	let on_fullscreen = move |_: MouseEvent| controller.with_value(|c| c.toggle_fullscreen());

	view! {
		<aside
			class="article-window"
			class:visible=move || panel.visible.get()
			class:fullscreen=move || panel.fullscreen.get()
		>
			<header class="article-window-header">
				<h2 id="articleWindowTitle">{title}</h2>
				<div class="article-window-actions">
					<button
						class="fullscreen-btn"
						title=move || if panel.fullscreen.get() { "Exit fullscreen" } else { "Fullscreen" }
						on:click=on_fullscreen
					>
						{move || if panel.fullscreen.get() { "\u{2922}" } else { "\u{26F6}" }}
					</button>
					<button id="closeBtn" class="close-btn" title="Close" on:click=on_close>
						"\u{00D7}"
					</button>
				</div>
			</header>
			<div id="articleWindowContent" class="article-window-content">
				{content}
			</div>
			<div id=graph_container_id class="graph-container"></div>
		</aside>
	}
}
