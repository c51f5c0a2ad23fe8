//! Leptos client-side article browser: article panel, relationship graph and routes.

use leptos::prelude::*;
use leptos_meta::*;
use leptos_router::components::*;
use leptos_router::path;
use log::{Level, info};

pub mod api;
pub mod cache;
pub mod components;
pub mod config;
pub mod controller;
pub mod dom;
pub mod error;
pub mod graph;
mod pages;
pub mod session;
#[cfg(test)]
mod testing;

use crate::api::HttpSource;
use crate::components::article_panel::PanelView;
use crate::components::force_graph::CanvasEngine;
use crate::config::BrowserConfig;
use crate::controller::ArticleController;
use crate::pages::home::Home;
use crate::pages::not_found::NotFound;
use crate::session::{TimeoutScheduler, VisualizationSession};

/// The controller as wired in the browser.
pub type BrowserController =
	ArticleController<HttpSource, VisualizationSession<CanvasEngine, TimeoutScheduler>, PanelView>;

/// Wires the HTTP source, canvas engine and panel into a controller.
pub fn build_controller(config: &BrowserConfig, panel: PanelView) -> BrowserController {
	let session = VisualizationSession::new(
		CanvasEngine::new(config),
		TimeoutScheduler,
		config.layout_budget,
	);
	ArticleController::new(HttpSource::new(config.clone()), session, panel, config.node_sizes)
}

/// Initialize logging and panic hooks for the WASM target.
pub fn init_logging() {
	let _ = console_log::init_with_level(Level::Debug);
	console_error_panic_hook::set_once();
	info!("Article browser initialized");
}

/// An app router which renders the article browser and handles 404's
#[component]
pub fn App() -> impl IntoView {
	// Provides context that manages stylesheets, titles, meta tags, etc.
	provide_meta_context();

	view! {
		<Title text="Article Browser" />

		<Router>
			<Routes fallback=|| view! { <NotFound /> }>
				<Route path=path!("/") view=Home />
			</Routes>
		</Router>
	}
}
