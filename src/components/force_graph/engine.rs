use std::cell::{Cell, RefCell};
use std::rc::Rc;

use log::{debug, error};
use wasm_bindgen::prelude::*;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, HtmlElement, MouseEvent, WheelEvent};

use super::render;
use super::state::{ForceGraphState, Tooltip};
use crate::config::{BrowserConfig, PhysicsConfig};
use crate::error::{BrowserError, Result};
use crate::graph::{VisualEdge, VisualNode};
use crate::session::{EngineInstance, RenderEngine};

const FRAME_DT: f32 = 0.016;
const FALLBACK_SIZE: (f64, f64) = (800.0, 600.0);

type Shared<T> = Rc<RefCell<T>>;
type MouseListener = Closure<dyn FnMut(MouseEvent)>;

fn js_failure(err: JsValue) -> BrowserError {
	BrowserError::RenderFailure(format!("{:?}", err))
}

fn measure(container: &HtmlElement) -> (f64, f64) {
	let (w, h) = (container.client_width() as f64, container.client_height() as f64);
	(
		if w > 0.0 { w } else { FALLBACK_SIZE.0 },
		if h > 0.0 { h } else { FALLBACK_SIZE.1 },
	)
}

fn pointer(canvas: &HtmlCanvasElement, ev: &MouseEvent) -> (f64, f64) {
	let rect = canvas.get_bounding_client_rect();
	(
		ev.client_x() as f64 - rect.left(),
		ev.client_y() as f64 - rect.top(),
	)
}

fn show_tooltip(tooltip: &HtmlElement, content: Option<Tooltip>) {
	let style = tooltip.style();
	match content {
		Some(content) => {
			tooltip.set_text_content(Some(&content.text()));
			let _ = style.set_property("left", &format!("{}px", content.left));
			let _ = style.set_property("top", &format!("{}px", content.top));
			let _ = style.set_property("display", "block");
		}
		None => {
			let _ = style.set_property("display", "none");
		}
	}
}

/// Canvas renderer mounted into the element with the configured id.
pub struct CanvasEngine {
	container_id: String,
	tooltip_class: String,
	physics: PhysicsConfig,
}

impl CanvasEngine {
	/// Engine for the container and physics named in `config`.
	pub fn new(config: &BrowserConfig) -> Self {
		Self {
			container_id: config.graph_container_id.clone(),
			tooltip_class: config.tooltip_class.clone(),
			physics: config.physics.clone(),
		}
	}

	fn container(&self) -> Option<HtmlElement> {
		web_sys::window()?
			.document()?
			.get_element_by_id(&self.container_id)?
			.dyn_into()
			.ok()
	}
}

impl RenderEngine for CanvasEngine {
	type Instance = CanvasInstance;

	fn create(&mut self, nodes: &[VisualNode], edges: &[VisualEdge]) -> Result<CanvasInstance> {
		let container = self.container().ok_or_else(|| {
			BrowserError::RenderFailure(format!("container #{} not found", self.container_id))
		})?;
		CanvasInstance::mount(container, &self.tooltip_class, nodes, edges, &self.physics)
	}

	fn show_placeholder(&mut self, message: &str) {
		let Some(container) = self.container() else {
			return;
		};
		let Some(document) = container.owner_document() else {
			return;
		};
		match document.create_element("p") {
			Ok(p) => {
				p.set_class_name("graph-placeholder");
				p.set_text_content(Some(message));
				let _ = container.append_child(&p);
			}
			Err(e) => error!("failed to create placeholder: {:?}", e),
		}
	}

	fn clear(&mut self) {
		if let Some(container) = self.container() {
			container.set_inner_html("");
		}
	}
}

/// One live canvas: the simulation, its animation loop, its listeners and its tooltip.
pub struct CanvasInstance {
	container: HtmlElement,
	canvas: HtmlCanvasElement,
	tooltip: HtmlElement,
	state: Shared<ForceGraphState>,
	frame: Rc<Cell<Option<i32>>>,
	animate: Shared<Option<Closure<dyn FnMut()>>>,
	mouse_listeners: Vec<(&'static str, MouseListener)>,
	wheel_listener: Option<Closure<dyn FnMut(WheelEvent)>>,
}

impl CanvasInstance {
	fn mount(
		container: HtmlElement,
		tooltip_class: &str,
		nodes: &[VisualNode],
		edges: &[VisualEdge],
		physics: &PhysicsConfig,
	) -> Result<Self> {
		let document = container
			.owner_document()
			.ok_or_else(|| BrowserError::RenderFailure("graph container is detached".into()))?;

		let canvas: HtmlCanvasElement = document
			.create_element("canvas")
			.map_err(js_failure)?
			.dyn_into()
			.map_err(|_| BrowserError::RenderFailure("canvas element unavailable".into()))?;
		let ctx: CanvasRenderingContext2d = canvas
			.get_context("2d")
			.map_err(js_failure)?
			.ok_or_else(|| BrowserError::RenderFailure("2d context unavailable".into()))?
			.dyn_into()
			.map_err(|_| BrowserError::RenderFailure("2d context unavailable".into()))?;
		canvas.set_class_name("force-graph-canvas");
		let _ = canvas.style().set_property("display", "block");
		let _ = canvas.style().set_property("cursor", "grab");

		let tooltip: HtmlElement = document
			.create_element("div")
			.map_err(js_failure)?
			.dyn_into()
			.map_err(|_| BrowserError::RenderFailure("tooltip element unavailable".into()))?;
		tooltip.set_class_name(tooltip_class);
		for (property, value) in [
			("position", "absolute"),
			("display", "none"),
			("pointer-events", "none"),
			("white-space", "pre-line"),
		] {
			let _ = tooltip.style().set_property(property, value);
		}

		let _ = container.style().set_property("position", "relative");
		container.append_child(&canvas).map_err(js_failure)?;
		container.append_child(&tooltip).map_err(js_failure)?;

		let (w, h) = measure(&container);
		canvas.set_width(w as u32);
		canvas.set_height(h as u32);
		debug!("canvas mounted at {}x{}", w, h);

		let mut instance = Self {
			container,
			canvas,
			tooltip,
			state: Rc::new(RefCell::new(ForceGraphState::new(nodes, edges, w, h, physics))),
			frame: Rc::new(Cell::new(None)),
			animate: Rc::new(RefCell::new(None)),
			mouse_listeners: Vec::new(),
			wheel_listener: None,
		};
		instance.bind_pointer();
		instance.start_loop(ctx);
		Ok(instance)
	}

	fn listen(&mut self, event: &'static str, listener: MouseListener) {
		let _ = self
			.canvas
			.add_event_listener_with_callback(event, listener.as_ref().unchecked_ref());
		self.mouse_listeners.push((event, listener));
	}

	fn bind_pointer(&mut self) {
		let (state, canvas) = (self.state.clone(), self.canvas.clone());
		self.listen(
			"mousedown",
			Closure::new(move |ev: MouseEvent| {
				let (x, y) = pointer(&canvas, &ev);
				let s = &mut *state.borrow_mut();
				if let Some(idx) = s.node_at_position(x, y) {
					s.drag.active = true;
					s.drag.node_idx = Some(idx);
					s.drag.start_x = x;
					s.drag.start_y = y;
					s.graph.visit_nodes(|node| {
						if node.index() == idx {
							s.drag.node_start_x = node.x();
							s.drag.node_start_y = node.y();
						}
					});
				} else {
					s.pan.active = true;
					s.pan.start_x = x;
					s.pan.start_y = y;
					s.pan.transform_start_x = s.transform.x;
					s.pan.transform_start_y = s.transform.y;
				}
			}),
		);

		let (state, canvas, tooltip) = (self.state.clone(), self.canvas.clone(), self.tooltip.clone());
		self.listen(
			"mousemove",
			Closure::new(move |ev: MouseEvent| {
				let (x, y) = pointer(&canvas, &ev);
				let s = &mut *state.borrow_mut();
				if !s.drag.active {
					let hovered = s.node_at_position(x, y);
					s.set_hover(hovered);
					show_tooltip(&tooltip, s.tooltip());
				}

				if s.drag.active {
					if let Some(idx) = s.drag.node_idx {
						let (dx, dy) = (
							(x - s.drag.start_x) / s.transform.k,
							(y - s.drag.start_y) / s.transform.k,
						);
						let (nx, ny) = (
							s.drag.node_start_x + dx as f32,
							s.drag.node_start_y + dy as f32,
						);
						s.graph.visit_nodes_mut(|node| {
							if node.index() == idx {
								node.data.x = nx;
								node.data.y = ny;
								node.data.is_anchor = true;
							}
						});
					}
				} else if s.pan.active {
					s.transform.x = s.pan.transform_start_x + (x - s.pan.start_x);
					s.transform.y = s.pan.transform_start_y + (y - s.pan.start_y);
				}
			}),
		);

		let state = self.state.clone();
		self.listen(
			"mouseup",
			Closure::new(move |_: MouseEvent| {
				let s = &mut *state.borrow_mut();
				s.drag.active = false;
				s.drag.node_idx = None;
				s.pan.active = false;
			}),
		);

		let (state, tooltip) = (self.state.clone(), self.tooltip.clone());
		self.listen(
			"mouseleave",
			Closure::new(move |_: MouseEvent| {
				let s = &mut *state.borrow_mut();
				s.drag.active = false;
				s.drag.node_idx = None;
				s.pan.active = false;
				s.set_hover(None);
				show_tooltip(&tooltip, None);
			}),
		);

		let (state, canvas) = (self.state.clone(), self.canvas.clone());
		let wheel = Closure::<dyn FnMut(WheelEvent)>::new(move |ev: WheelEvent| {
			ev.prevent_default();
			let (x, y) = pointer(&canvas, &ev);
			let s = &mut *state.borrow_mut();
			let factor = if ev.delta_y() > 0.0 { 0.9 } else { 1.1 };
			let new_k = (s.transform.k * factor).clamp(0.1, 10.0);
			let ratio = new_k / s.transform.k;
			s.transform.x = x - (x - s.transform.x) * ratio;
			s.transform.y = y - (y - s.transform.y) * ratio;
			s.transform.k = new_k;
		});
		let _ = self
			.canvas
			.add_event_listener_with_callback("wheel", wheel.as_ref().unchecked_ref());
		self.wheel_listener = Some(wheel);
	}

	fn start_loop(&mut self, ctx: CanvasRenderingContext2d) {
		let (state, tooltip, animate, frame) = (
			self.state.clone(),
			self.tooltip.clone(),
			self.animate.clone(),
			self.frame.clone(),
		);
		*self.animate.borrow_mut() = Some(Closure::new(move || {
			{
				let s = &mut *state.borrow_mut();
				s.tick(FRAME_DT);
				render::render(s, &ctx);
				if s.hover.node.is_some() {
					show_tooltip(&tooltip, s.tooltip());
				}
			}
			request_frame(&animate, &frame);
		}));
		request_frame(&self.animate, &self.frame);
	}
}

fn request_frame(animate: &Shared<Option<Closure<dyn FnMut()>>>, frame: &Cell<Option<i32>>) {
	let Some(window) = web_sys::window() else {
		return;
	};
	if let Some(cb) = animate.borrow().as_ref() {
		frame.set(window.request_animation_frame(cb.as_ref().unchecked_ref()).ok());
	}
}

impl EngineInstance for CanvasInstance {
	fn refresh(&mut self) {
		let (w, h) = measure(&self.container);
		self.canvas.set_width(w as u32);
		self.canvas.set_height(h as u32);
		self.state.borrow_mut().resize(w, h);
	}

	fn halt_layout(&mut self) {
		self.state.borrow_mut().halt_layout();
	}

	fn destroy(self) {
		if let (Some(window), Some(id)) = (web_sys::window(), self.frame.take()) {
			let _ = window.cancel_animation_frame(id);
		}
		// The loop closure holds a handle to its own slot; emptying the slot frees it.
		let animate = self.animate.borrow_mut().take();
		drop(animate);

		for (event, listener) in &self.mouse_listeners {
			let _ = self
				.canvas
				.remove_event_listener_with_callback(event, listener.as_ref().unchecked_ref());
		}
		if let Some(wheel) = &self.wheel_listener {
			let _ = self
				.canvas
				.remove_event_listener_with_callback("wheel", wheel.as_ref().unchecked_ref());
		}
		self.canvas.remove();
		self.tooltip.remove();
	}
}
