use std::rc::Rc;

use leptos::ev;
use leptos::prelude::*;

use crate::build_controller;
use crate::components::article_panel::{ArticlePanel, PanelView};
use crate::config::BrowserConfig;
use crate::dom::{self, Debounce};

/// Article panel plus the page-level bindings for the server-rendered list.
#[component]
pub fn Home() -> impl IntoView {
	let config = BrowserConfig::from_document();
	let panel = PanelView::new();
	let controller = Rc::new(build_controller(&config, panel));
	dom::bind_article_items(&controller);
	let controller = StoredValue::new_local(controller);

	Effect::new(move |_| {
		let active = panel.active.get();
		dom::highlight_active(active.as_deref());
	});
	Effect::new(move |_| dom::set_article_visible(panel.visible.get()));
	// The panel's size only changes once the fullscreen class has been applied.
	Effect::new(move |_| {
		panel.fullscreen.track();
		request_animation_frame(move || controller.with_value(|c| c.resize()));
	});

	let debounce = StoredValue::new_local(Debounce::new(config.resize_debounce));
	let _ = window_event_listener(ev::resize, move |_| {
		debounce.with_value(|d| d.call(move || controller.with_value(|c| c.resize())));
	});
	let _ = window_event_listener(ev::keydown, move |e| {
		if e.key() == "Escape" {
			controller.with_value(|c| {
				c.close();
			});
		}
	});

	view! {
		<ArticlePanel panel=panel controller=controller graph_container_id=config.graph_container_id />
	}
}
