use std::cell::RefCell;
use std::rc::Rc;

use leptos::prelude::*;
use log::{error, warn};
use wasm_bindgen::prelude::*;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, MouseEvent, WheelEvent, Window};

use super::config::{LayoutConfig, LayoutMode};
use super::interaction::{ContextAction, PointerEvent};
use super::render;
use super::state::ForceLayoutState;
use super::surface::ViewTransform;
use super::types::GraphData;

type SharedState = Rc<RefCell<Option<ForceLayoutState>>>;

#[component]
pub fn ForceLayout(
	#[prop(into)] data: Signal<GraphData>,
	#[prop(default = false)] fullscreen: bool,
	#[prop(default = None)] width: Option<f64>,
	#[prop(default = None)] height: Option<f64>,
	#[prop(default = LayoutMode::Animated)] mode: LayoutMode,
	#[prop(default = false)] bundled: bool,
	#[prop(optional)] config: Option<LayoutConfig>,
	#[prop(optional)] on_option: Option<Callback<ContextAction>>,
	#[prop(optional)] on_mutate: Option<Callback<()>>,
) -> impl IntoView {
	let canvas_ref = NodeRef::<leptos::html::Canvas>::new();
	let state: SharedState = Rc::new(RefCell::new(None));
	let animate: Rc<RefCell<Option<Closure<dyn FnMut()>>>> = Rc::new(RefCell::new(None));
	let resize_cb: Rc<RefCell<Option<Closure<dyn FnMut()>>>> = Rc::new(RefCell::new(None));
	let (state_init, animate_init, resize_cb_init) =
		(state.clone(), animate.clone(), resize_cb.clone());

	Effect::new(move |_| {
		let Some(canvas) = canvas_ref.get() else {
			return;
		};
		let snapshot = data.get();

		// Later runs are data changes on an already mounted view.
		if state_init.borrow().is_some() {
			sync(&state_init, &snapshot);
			return;
		}

		let canvas: HtmlCanvasElement = canvas.into();
		let Some(window) = web_sys::window() else {
			error!("no window to mount the graph in");
			return;
		};
		let (w, h) = if fullscreen {
			window_size(&window).unwrap_or((800.0, 600.0))
		} else {
			(
				width.unwrap_or_else(|| {
					canvas
						.parent_element()
						.map(|p| p.client_width() as f64)
						.unwrap_or(800.0)
				}),
				height.unwrap_or_else(|| {
					canvas
						.parent_element()
						.map(|p| p.client_height() as f64)
						.unwrap_or(600.0)
				}),
			)
		};
		canvas.set_width(w as u32);
		canvas.set_height(h as u32);

		let Some(ctx) = canvas
			.get_context("2d")
			.ok()
			.flatten()
			.and_then(|c| c.dyn_into::<CanvasRenderingContext2d>().ok())
		else {
			error!("canvas has no 2d context");
			return;
		};

		let config = LayoutConfig {
			width: w,
			height: h,
			..config.clone().unwrap_or_default()
		};
		match ForceLayoutState::new(config, mode, bundled) {
			Ok(s) => *state_init.borrow_mut() = Some(s),
			Err(err) => {
				error!("cannot start graph layout: {err}");
				return;
			}
		}
		sync(&state_init, &snapshot);

		if fullscreen {
			let (state_resize, canvas_resize) = (state_init.clone(), canvas.clone());
			*resize_cb_init.borrow_mut() = Some(Closure::new(move || {
				let Some((nw, nh)) = web_sys::window().and_then(|w| window_size(&w)) else {
					return;
				};
				canvas_resize.set_width(nw as u32);
				canvas_resize.set_height(nh as u32);
				if let Some(ref mut s) = *state_resize.borrow_mut() {
					s.resize(nw, nh);
				}
			}));
			if let Some(ref cb) = *resize_cb_init.borrow() {
				let _ =
					window.add_event_listener_with_callback("resize", cb.as_ref().unchecked_ref());
			}
		}

		let (state_anim, animate_inner) = (state_init.clone(), animate_init.clone());
		*animate_init.borrow_mut() = Some(Closure::new(move || {
			if let Some(ref mut s) = *state_anim.borrow_mut() {
				s.tick();
				render::render(&s.scene, s.width, s.height, &ctx);
			}
			if let (Some(cb), Some(win)) = (&*animate_inner.borrow(), web_sys::window()) {
				let _ = win.request_animation_frame(cb.as_ref().unchecked_ref());
			}
		}));
		if let Some(ref cb) = *animate_init.borrow() {
			let _ = window.request_animation_frame(cb.as_ref().unchecked_ref());
		}
	});

	let dispatch = move |state: &SharedState, ev: &MouseEvent, event: PointerEvent| {
		let action = match *state.borrow_mut() {
			Some(ref mut s) => s.handle(event),
			None => None,
		};
		if let Some(action) = action {
			// The menu consumed this release; the canvas must not see it too.
			ev.stop_propagation();
			if let Some(cb) = on_option {
				cb.run(action);
			}
		}
	};

	let state_md = state.clone();
	let on_mousedown = move |ev: MouseEvent| {
		if let Some((x, y)) = canvas_point(canvas_ref, &ev) {
			dispatch(&state_md, &ev, PointerEvent::Down { x, y });
		}
	};

	let state_mm = state.clone();
	let on_mousemove = move |ev: MouseEvent| {
		if let Some((x, y)) = canvas_point(canvas_ref, &ev) {
			dispatch(&state_mm, &ev, PointerEvent::Move { x, y });
		}
	};

	let state_mu = state.clone();
	let on_mouseup = move |ev: MouseEvent| {
		if let Some((x, y)) = canvas_point(canvas_ref, &ev) {
			dispatch(&state_mu, &ev, PointerEvent::Up { x, y });
		}
	};

	let state_ml = state.clone();
	let on_mouseleave = move |ev: MouseEvent| {
		dispatch(&state_ml, &ev, PointerEvent::Leave);
	};

	let state_wh = state.clone();
	let on_wheel = move |ev: WheelEvent| {
		ev.prevent_default();
		let delta_y = ev.delta_y();
		let ev: &MouseEvent = &ev;
		if let Some((x, y)) = canvas_point(canvas_ref, ev) {
			dispatch(&state_wh, ev, PointerEvent::Wheel { x, y, delta_y });
		}
	};

	// Double click snaps the view back to the identity transform.
	let state_dc = state.clone();
	let on_dblclick = move |ev: MouseEvent| {
		dispatch(&state_dc, &ev, PointerEvent::Gesture(ViewTransform::default()));
	};

	let mutate_button = on_mutate.map(|cb| {
		view! {
			<button class="force-layout-mutate" on:click=move |_| cb.run(())>
				"Mutate"
			</button>
		}
	});

	view! {
		<div class="force-layout">
			<canvas
				node_ref=canvas_ref
				class="force-layout-canvas"
				on:mousedown=on_mousedown
				on:mousemove=on_mousemove
				on:mouseup=on_mouseup
				on:mouseleave=on_mouseleave
				on:wheel=on_wheel
				on:dblclick=on_dblclick
				style="display: block; cursor: pointer;"
			/>
			{mutate_button}
		</div>
	}
}

/// Apply a snapshot and, for settled views, queue the settle for the next turn.
fn sync(state: &SharedState, data: &GraphData) {
	let ticket = {
		let mut guard = state.borrow_mut();
		let Some(s) = guard.as_mut() else {
			return;
		};
		match s.on_data_changed(data) {
			Ok(report) => {
				if !report.dangling.is_empty() {
					warn!("{} links left out of the graph", report.dangling.len());
				}
			}
			Err(err) => {
				warn!("rejected graph data: {err}");
				return;
			}
		}
		if s.mode != LayoutMode::Settled {
			return;
		}
		s.settle_ticket()
	};

	let state = state.clone();
	let settle = Closure::once_into_js(move || {
		if let Some(ref mut s) = *state.borrow_mut() {
			if let Err(err) = s.settle(ticket) {
				error!("settle failed: {err}");
			}
		}
	});
	if let Some(window) = web_sys::window() {
		let _ = window
			.set_timeout_with_callback_and_timeout_and_arguments_0(settle.unchecked_ref(), 0);
	}
}

fn canvas_point(canvas_ref: NodeRef<leptos::html::Canvas>, ev: &MouseEvent) -> Option<(f64, f64)> {
	let canvas: HtmlCanvasElement = canvas_ref.get()?.into();
	let rect = canvas.get_bounding_client_rect();
	Some((
		ev.client_x() as f64 - rect.left(),
		ev.client_y() as f64 - rect.top(),
	))
}

fn window_size(window: &Window) -> Option<(f64, f64)> {
	Some((
		window.inner_width().ok()?.as_f64()?,
		window.inner_height().ok()?.as_f64()?,
	))
}
