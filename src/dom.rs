//! Wiring between the server-rendered article list and the controller.

use std::cell::Cell;
use std::rc::Rc;
use std::time::Duration;

use leptos::prelude::{TimeoutHandle, set_timeout_with_handle};
use leptos::task::spawn_local;
use log::{debug, warn};
use wasm_bindgen::prelude::*;
use web_sys::{Element, MouseEvent};

use crate::BrowserController;

/// Selector of the clickable list entries.
pub const ARTICLE_ITEM_SELECTOR: &str = ".article-item";
/// Attribute holding an entry's article id.
pub const ARTICLE_ID_ATTRIBUTE: &str = "data-article-id";
const ACTIVE_CLASS: &str = "active";
const APP_CONTAINER_ID: &str = "appContainer";
const ARTICLE_VISIBLE_CLASS: &str = "article-visible";

fn article_items() -> Vec<Element> {
	let Some(document) = web_sys::window().and_then(|w| w.document()) else {
		return Vec::new();
	};
	let Ok(list) = document.query_selector_all(ARTICLE_ITEM_SELECTOR) else {
		return Vec::new();
	};
	(0..list.length())
		.filter_map(|i| list.item(i))
		.filter_map(|node| node.dyn_into::<Element>().ok())
		.collect()
}

/// Opens the article on click for every `.article-item` carrying an id.
pub fn bind_article_items(controller: &Rc<BrowserController>) {
	let items = article_items();
	let mut bound = 0;
	for item in items {
		let Some(id) = item.get_attribute(ARTICLE_ID_ATTRIBUTE) else {
			warn!("article item without {}", ARTICLE_ID_ATTRIBUTE);
			continue;
		};
		let controller = controller.clone();
		let on_click = Closure::<dyn FnMut(MouseEvent)>::new(move |_: MouseEvent| {
			let (controller, id) = (controller.clone(), id.clone());
			spawn_local(async move {
				controller.open(&id).await;
			});
		});
		let _ = item.add_event_listener_with_callback("click", on_click.as_ref().unchecked_ref());
		// The list lives as long as the page.
		on_click.forget();
		bound += 1;
	}
	debug!("bound {} article items", bound);
}

/// Marks the entry for `id` as active and unmarks the rest.
pub fn highlight_active(id: Option<&str>) {
	for item in article_items() {
		let is_active = id.is_some() && item.get_attribute(ARTICLE_ID_ATTRIBUTE).as_deref() == id;
		let _ = item.class_list().toggle_with_force(ACTIVE_CLASS, is_active);
	}
}

/// Toggles the page layout class that makes room for the panel.
pub fn set_article_visible(visible: bool) {
	let container = web_sys::window()
		.and_then(|w| w.document())
		.and_then(|d| d.get_element_by_id(APP_CONTAINER_ID));
	if let Some(container) = container {
		let _ = container
			.class_list()
			.toggle_with_force(ARTICLE_VISIBLE_CLASS, visible);
	}
}

/// Runs only the last of a burst of calls, after `delay` of quiet.
pub struct Debounce {
	delay: Duration,
	pending: Cell<Option<TimeoutHandle>>,
}

impl Debounce {
	/// A debouncer with nothing pending.
	pub fn new(delay: Duration) -> Self {
		Self {
			delay,
			pending: Cell::new(None),
		}
	}

	/// Schedules `f`, replacing any call still waiting.
	pub fn call(&self, f: impl FnOnce() + 'static) {
		if let Some(handle) = self.pending.take() {
			handle.clear();
		}
		self.pending.set(set_timeout_with_handle(f, self.delay).ok());
	}
}
