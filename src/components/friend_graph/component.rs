//! Leptos component wrapping the friend graph canvas.
//!
//! The component creates an HTML canvas element and wires up mouse/wheel event
//! handlers for node dragging, clicking, panning and zooming. An animation loop
//! runs via `requestAnimationFrame`, advancing the layout one tick and
//! redrawing each frame.
//!
//! Whenever the store's derived nodes or edges change, the running simulation
//! is stopped and replaced by one over the new graph, carrying positions over.
//! When the component is unmounted the loop stops and the simulation with it.

use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use leptos::prelude::*;
use log::{debug, warn};
use wasm_bindgen::prelude::*;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, MouseEvent, WheelEvent, Window};

use super::render::{self, PhotoCache};
use super::scale::ScaleConfig;
use super::simulation::ForceConfig;
use super::state::{CanvasState, Release, SelectionView};
use super::store::GraphStore;
use super::theme::Theme;

/// Seconds per animation frame fed to highlight easing.
const FRAME_DT: f64 = 0.016;

/// Bundles canvas state with its drawing context and visual configuration.
struct GraphContext {
	state: CanvasState,
	ctx: CanvasRenderingContext2d,
	scale: ScaleConfig,
	theme: Theme,
	photos: PhotoCache,
}

type FrameCallback = Rc<RefCell<Option<Closure<dyn FnMut()>>>>;

fn window_size(window: &Window) -> Option<(f64, f64)> {
	let w = window.inner_width().ok()?.as_f64()?;
	let h = window.inner_height().ok()?.as_f64()?;
	Some((w, h))
}

/// Pointer position relative to the canvas.
fn local_point(canvas_ref: NodeRef<leptos::html::Canvas>, ev: &MouseEvent) -> Option<(f64, f64)> {
	let canvas: HtmlCanvasElement = canvas_ref.get()?.into();
	let rect = canvas.get_bounding_client_rect();
	Some((ev.client_x() as f64 - rect.left(), ev.client_y() as f64 - rect.top()))
}

/// Renders the friend graph of `store` on a canvas element.
///
/// The component sizes itself to its parent container by default; set
/// `fullscreen = true` to fill the viewport and resize with the window.
/// Explicit `width`/`height` override automatic sizing.
#[component]
pub fn FriendGraphCanvas(
	store: GraphStore,
	#[prop(default = false)] fullscreen: bool,
	#[prop(default = None)] width: Option<f64>,
	#[prop(default = None)] height: Option<f64>,
	#[prop(optional)] theme: Option<Theme>,
	#[prop(optional)] forces: Option<ForceConfig>,
) -> impl IntoView {
	let canvas_ref = NodeRef::<leptos::html::Canvas>::new();
	let context: Rc<RefCell<Option<GraphContext>>> = Rc::new(RefCell::new(None));
	let animate: FrameCallback = Rc::new(RefCell::new(None));
	let resize_cb: FrameCallback = Rc::new(RefCell::new(None));
	let theme = theme.unwrap_or_default();
	let forces = forces.unwrap_or_default();

	let mounted = Arc::new(AtomicBool::new(true));
	on_cleanup({
		let mounted = Arc::clone(&mounted);
		move || mounted.store(false, Ordering::Relaxed)
	});

	let (context_init, animate_init, resize_cb_init) =
		(context.clone(), animate.clone(), resize_cb.clone());
	Effect::new(move |_| {
		let nodes = store.nodes().get();
		let edges = store.edges().get();
		let Some(canvas) = canvas_ref.get() else {
			return;
		};

		if let Some(c) = context_init.borrow_mut().as_mut() {
			c.state.rebuild(&nodes, &edges);
			return;
		}

		let canvas: HtmlCanvasElement = canvas.into();
		let Some(window) = web_sys::window() else {
			return;
		};

		let (w, h) = if fullscreen {
			window_size(&window).unwrap_or((800.0, 600.0))
		} else {
			let parent = canvas.parent_element();
			(
				width.unwrap_or_else(|| {
					parent
						.as_ref()
						.map(|p| p.client_width() as f64)
						.unwrap_or(800.0)
				}),
				height.unwrap_or_else(|| {
					parent
						.as_ref()
						.map(|p| p.client_height() as f64)
						.unwrap_or(600.0)
				}),
			)
		};
		canvas.set_width(w as u32);
		canvas.set_height(h as u32);

		let ctx: CanvasRenderingContext2d = match canvas.get_context("2d") {
			Ok(Some(ctx)) => match ctx.dyn_into() {
				Ok(ctx) => ctx,
				Err(_) => return,
			},
			_ => {
				warn!("friend-graph: canvas has no 2d context");
				return;
			}
		};

		let mut state = CanvasState::new(&nodes, &edges, forces.clone(), w, h);
		state.selection = untrack(|| SelectionView {
			node: store.selected_node().map(|n| n.id.clone()),
			link: store.selected_link().map(|l| l.key().clone()),
		});
		*context_init.borrow_mut() = Some(GraphContext {
			state,
			ctx,
			scale: ScaleConfig::default(),
			theme: theme.clone(),
			photos: PhotoCache::default(),
		});

		if fullscreen {
			let (context_resize, canvas_resize) = (context_init.clone(), canvas.clone());
			*resize_cb_init.borrow_mut() = Some(Closure::new(move || {
				let Some((nw, nh)) = web_sys::window().as_ref().and_then(window_size) else {
					return;
				};
				canvas_resize.set_width(nw as u32);
				canvas_resize.set_height(nh as u32);
				if let Some(c) = context_resize.borrow_mut().as_mut() {
					c.state.resize(nw, nh);
				}
			}));
			if let Some(ref cb) = *resize_cb_init.borrow() {
				let _ =
					window.add_event_listener_with_callback("resize", cb.as_ref().unchecked_ref());
			}
		}

		let (context_anim, animate_inner, resize_cb_anim, mounted) = (
			context_init.clone(),
			animate_init.clone(),
			resize_cb_init.clone(),
			Arc::clone(&mounted),
		);
		*animate_init.borrow_mut() = Some(Closure::new(move || {
			if !mounted.load(Ordering::Relaxed) {
				if let Some(mut c) = context_anim.borrow_mut().take() {
					c.state.simulation.stop();
				}
				if let Some(window) = web_sys::window() {
					if let Some(cb) = resize_cb_anim.borrow_mut().take() {
						let _ = window
							.remove_event_listener_with_callback("resize", cb.as_ref().unchecked_ref());
					}
					// This closure is still on the stack; free it from a later task.
					if let Some(frame) = animate_inner.borrow_mut().take() {
						let release = Closure::once_into_js(move || drop(frame));
						let _ = window.set_timeout_with_callback(release.unchecked_ref());
					}
				}
				debug!("friend-graph: canvas unmounted, animation stopped");
				return;
			}

			if let Some(c) = context_anim.borrow_mut().as_mut() {
				c.state.tick(FRAME_DT);
				render::render(&c.state, &c.ctx, &c.scale, &c.theme, &mut c.photos);
			}
			if let (Some(cb), Some(window)) = (animate_inner.borrow().as_ref(), web_sys::window()) {
				let _ = window.request_animation_frame(cb.as_ref().unchecked_ref());
			}
		}));
		if let Some(ref cb) = *animate_init.borrow() {
			let _ = window.request_animation_frame(cb.as_ref().unchecked_ref());
		}
	});

	let context_sel = context.clone();
	Effect::new(move |_| {
		let selection = SelectionView {
			node: store.selected_node().map(|n| n.id.clone()),
			link: store.selected_link().map(|l| l.key().clone()),
		};
		if let Some(c) = context_sel.borrow_mut().as_mut() {
			c.state.selection = selection;
		}
	});

	let context_md = context.clone();
	let on_mousedown = move |ev: MouseEvent| {
		let Some((x, y)) = local_point(canvas_ref, &ev) else {
			return;
		};
		if let Some(c) = context_md.borrow_mut().as_mut() {
			c.state.press(x, y, &c.scale);
		}
	};

	let context_mm = context.clone();
	let on_mousemove = move |ev: MouseEvent| {
		let Some((x, y)) = local_point(canvas_ref, &ev) else {
			return;
		};
		if let Some(c) = context_mm.borrow_mut().as_mut() {
			c.state.pointer_move(x, y, &c.scale);
		}
	};

	let context_mu = context.clone();
	let on_mouseup = move |_: MouseEvent| {
		let release = context_mu.borrow_mut().as_mut().map(|c| c.state.release());
		match release {
			Some(Release::NodeClick(id)) => store.on_node_click(&id),
			Some(Release::EdgeClick(key)) => store.on_edge_click(key.low(), key.high()),
			_ => {}
		}
	};

	let context_ml = context.clone();
	let on_mouseleave = move |_: MouseEvent| {
		if let Some(c) = context_ml.borrow_mut().as_mut() {
			c.state.cancel();
		}
	};

	let context_wh = context.clone();
	let on_wheel = move |ev: WheelEvent| {
		ev.prevent_default();
		let Some((x, y)) = local_point(canvas_ref, &ev) else {
			return;
		};
		if let Some(c) = context_wh.borrow_mut().as_mut() {
			let step = c.scale.zoom.step;
			let factor = if ev.delta_y() > 0.0 { 1.0 / step } else { step };
			c.state.zoom_by(x, y, factor, &c.scale);
		}
	};

	let zoom_button = move |direction: f64| {
		let context = context.clone();
		move |_: MouseEvent| {
			if let Some(c) = context.borrow_mut().as_mut() {
				let (cx, cy) = (c.state.width / 2.0, c.state.height / 2.0);
				if direction == 0.0 {
					c.state.reset_view();
				} else {
					let factor = c.scale.zoom.step.powf(direction);
					c.state.zoom_by(cx, cy, factor, &c.scale);
				}
			}
		}
	};

	view! {
		<div class="friend-graph" style="position: relative; width: 100%; height: 100%;">
			<canvas
				node_ref=canvas_ref
				class="friend-graph-canvas"
				on:mousedown=on_mousedown
				on:mousemove=on_mousemove
				on:mouseup=on_mouseup
				on:mouseleave=on_mouseleave
				on:wheel=on_wheel
				style="display: block; cursor: grab;"
			/>
			<div class="zoom-controls" style="position: absolute; right: 16px; bottom: 16px; display: flex; gap: 4px;">
				<button title="Zoom in" on:click=zoom_button(1.0)>"+"</button>
				<button title="Zoom out" on:click=zoom_button(-1.0)>"−"</button>
				<button title="Reset view" on:click=zoom_button(0.0)>"⟲"</button>
			</div>
		</div>
	}
}
