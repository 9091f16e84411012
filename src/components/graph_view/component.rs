//! Leptos component wrapping the relationship graph canvas.
//!
//! The component fetches graph data from the backend, builds the simulation
//! and wires up mouse/wheel handlers for node dragging, panning and zooming.
//! An animation loop runs via `requestAnimationFrame`, stepping the
//! simulation and redrawing each frame. HUD buttons cover zoom, fit and
//! refresh; a legend and status line describe the loaded graph. Unmounting
//! cancels the animation loop and orphans any in-flight fetch.

use std::cell::Cell;

use leptos::prelude::*;
use leptos::task::spawn_local;
use log::{info, warn};
use thiserror::Error;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::JsFuture;
use web_sys::{
	CanvasRenderingContext2d, HtmlCanvasElement, MouseEvent, Response, WheelEvent, Window,
};

use super::render;
use super::state::GraphViewState;
use super::theme::{Theme, category_color};
use super::types::{GraphData, GraphDataError, NodeCategory};

/// Why a graph load failed. Shown in the error overlay and logged.
#[derive(Clone, Debug, Error)]
pub enum LoadError {
	/// The request never produced a response, usually network trouble.
	#[error("request failed: {0}")]
	Request(String),
	/// The backend answered with a non-success status code.
	#[error("server returned status {0}")]
	Status(u16),
	/// The response body was not valid graph JSON.
	#[error("invalid graph payload: {0}")]
	Parse(String),
	/// The payload decoded but failed integrity validation.
	#[error("invalid graph data: {0}")]
	Data(#[from] GraphDataError),
}

fn js_error(value: JsValue) -> LoadError {
	LoadError::Request(format!("{value:?}"))
}

/// Fetch and decode the graph payload from the backend.
async fn fetch_graph_data(endpoint: &str) -> Result<GraphData, LoadError> {
	let window =
		web_sys::window().ok_or_else(|| LoadError::Request("no window".to_string()))?;
	let response = JsFuture::from(window.fetch_with_str(endpoint))
		.await
		.map_err(js_error)?;
	let response: Response = response
		.dyn_into()
		.map_err(|_| LoadError::Request("fetch returned a non-response".to_string()))?;
	if !response.ok() {
		return Err(LoadError::Status(response.status()));
	}

	let text = JsFuture::from(response.text().map_err(js_error)?)
		.await
		.map_err(js_error)?
		.as_string()
		.ok_or_else(|| LoadError::Request("response body is not text".to_string()))?;

	serde_json::from_str(&text).map_err(|e| LoadError::Parse(e.to_string()))
}

/// Monotonic token separating the latest load from superseded ones. A
/// response is applied only when its token is still current.
#[derive(Default)]
struct LoadGeneration(Cell<u64>);

impl LoadGeneration {
	/// Start a new load, invalidating every earlier token.
	fn begin(&self) -> u64 {
		let token = self.0.get() + 1;
		self.0.set(token);
		token
	}

	fn is_current(&self, token: u64) -> bool {
		self.0.get() == token
	}

	/// Orphan all in-flight loads without starting a new one.
	fn invalidate(&self) {
		self.0.set(self.0.get() + 1);
	}
}

/// Bundles the view state with the theme used to draw it.
struct ViewContext {
	state: GraphViewState,
	theme: Theme,
}

/// Renders an interactive compliance relationship graph on a canvas element.
///
/// Data is fetched from `endpoint` on mount and again on refresh; payloads
/// that fail validation are rejected whole and reported in the error
/// overlay. The component sizes itself to its parent container by default;
/// set `fullscreen = true` to fill the viewport and resize with the window.
/// Explicit `width`/`height` override automatic sizing.
#[component]
pub fn GraphViewCanvas(
	/// Backend endpoint serving the graph payload.
	#[prop(into, default = String::from("/api/graph/relations"))]
	endpoint: String,
	#[prop(default = false)] fullscreen: bool,
	#[prop(default = None)] width: Option<f64>,
	#[prop(default = None)] height: Option<f64>,
) -> impl IntoView {
	let canvas_ref = NodeRef::<leptos::html::Canvas>::new();

	// Browser-side values (canvas state, rAF closures) live in thread-local
	// stored values. The Copy keys are Send + Sync, which cleanup and view
	// closures require of their captures; the values never leave this thread.
	let context = StoredValue::new_local(None::<ViewContext>);
	let animate = StoredValue::new_local(None::<Closure<dyn FnMut()>>);
	let resize_cb = StoredValue::new_local(None::<Closure<dyn FnMut()>>);
	let raf_id = StoredValue::new_local(None::<i32>);
	let generation = StoredValue::new_local(LoadGeneration::default());

	let loading = RwSignal::new(true);
	let error = RwSignal::new(Option::<String>::None);
	let node_count = RwSignal::new(0usize);
	let edge_count = RwSignal::new(0usize);
	let settled = RwSignal::new(true);

	let load = Callback::new(move |_: ()| {
		let token = generation.with_value(|g| g.begin());
		let endpoint = endpoint.clone();
		spawn_local(async move {
			info!("graph_view: loading graph from {endpoint}");
			loading.set(true);
			error.set(None);

			let result = fetch_graph_data(&endpoint).await;
			// A disposed generation means the view is gone; treat that
			// like a superseded load.
			let current = generation
				.try_with_value(|g| g.is_current(token))
				.unwrap_or(false);
			if !current {
				info!("graph_view: discarding stale response from {endpoint}");
				return;
			}

			match result {
				Ok(data) => {
					let dims = context
						.with_value(|c| c.as_ref().map(|c| (c.state.width, c.state.height)));
					if let Some((w, h)) = dims {
						match GraphViewState::new(&data, w, h) {
							Ok(state) => {
								info!(
									"graph_view: loaded {} nodes, {} edges from {endpoint}",
									state.simulation.nodes().len(),
									state.simulation.edges().len(),
								);
								node_count.set(state.simulation.nodes().len());
								edge_count.set(state.simulation.edges().len());
								context.update_value(|c| {
									if let Some(c) = c {
										c.state = state;
									}
								});
							}
							Err(e) => {
								warn!("graph_view: rejected graph payload: {e}");
								error.set(Some(LoadError::from(e).to_string()));
							}
						}
					}
				}
				Err(e) => {
					warn!("graph_view: load failed: {e}");
					error.set(Some(e.to_string()));
				}
			}
			loading.set(false);
		});
	});

	Effect::new(move |_| {
		let Some(canvas) = canvas_ref.get() else {
			return;
		};
		let canvas: HtmlCanvasElement = canvas.into();
		let window: Window = web_sys::window().unwrap();

		let (w, h) = if fullscreen {
			(
				window.inner_width().unwrap().as_f64().unwrap(),
				window.inner_height().unwrap().as_f64().unwrap(),
			)
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

		let ctx: CanvasRenderingContext2d = match canvas
			.get_context("2d")
			.ok()
			.flatten()
			.and_then(|c| c.dyn_into().ok())
		{
			Some(ctx) => ctx,
			None => {
				warn!("graph_view: 2d canvas context unavailable");
				return;
			}
		};

		// An empty simulation renders the backdrop until data arrives.
		context.set_value(
			GraphViewState::new(&GraphData::default(), w, h)
				.ok()
				.map(|state| ViewContext {
					state,
					theme: Theme::dark(),
				}),
		);

		if fullscreen {
			let canvas_resize = canvas.clone();
			resize_cb.set_value(Some(Closure::new(move || {
				let win: Window = web_sys::window().unwrap();
				let (nw, nh) = (
					win.inner_width().unwrap().as_f64().unwrap(),
					win.inner_height().unwrap().as_f64().unwrap(),
				);
				canvas_resize.set_width(nw as u32);
				canvas_resize.set_height(nh as u32);
				context.update_value(|c| {
					if let Some(c) = c {
						c.state.resize(nw, nh);
					}
				});
			})));
			resize_cb.with_value(|cb| {
				if let Some(cb) = cb {
					let _ =
						window.add_event_listener_with_callback("resize", cb.as_ref().unchecked_ref());
				}
			});
		}

		animate.set_value(Some(Closure::new(move || {
			context.update_value(|c| {
				if let Some(c) = c {
					c.state.tick();
					render::render(&c.state, &ctx, &c.theme);

					let now_settled = c.state.simulation.is_settled();
					if settled.get_untracked() != now_settled {
						settled.set(now_settled);
					}
				}
			});
			animate.with_value(|cb| {
				if let Some(cb) = cb {
					if let Ok(id) = web_sys::window()
						.unwrap()
						.request_animation_frame(cb.as_ref().unchecked_ref())
					{
						raf_id.set_value(Some(id));
					}
				}
			});
		})));
		animate.with_value(|cb| {
			if let Some(cb) = cb {
				if let Ok(id) = window.request_animation_frame(cb.as_ref().unchecked_ref()) {
					raf_id.set_value(Some(id));
				}
			}
		});

		load.run(());
	});

	on_cleanup(move || {
		generation.with_value(|g| g.invalidate());
		raf_id.with_value(|id| {
			if let (Some(id), Some(win)) = (*id, web_sys::window()) {
				let _ = win.cancel_animation_frame(id);
			}
		});
		resize_cb.update_value(|cb| {
			if let (Some(cb), Some(win)) = (cb.take(), web_sys::window()) {
				let _ = win.remove_event_listener_with_callback("resize", cb.as_ref().unchecked_ref());
			}
		});
		animate.set_value(None);
		context.set_value(None);
		info!("graph_view: view torn down");
	});

	let on_mousedown = move |ev: MouseEvent| {
		let canvas: HtmlCanvasElement = canvas_ref.get().unwrap().into();
		let rect = canvas.get_bounding_client_rect();
		let (x, y) = (
			ev.client_x() as f64 - rect.left(),
			ev.client_y() as f64 - rect.top(),
		);

		context.update_value(|c| {
			if let Some(c) = c {
				c.state.pointer_down(x, y);
			}
		});
	};

	let on_mousemove = move |ev: MouseEvent| {
		let canvas: HtmlCanvasElement = canvas_ref.get().unwrap().into();
		let rect = canvas.get_bounding_client_rect();
		let (x, y) = (
			ev.client_x() as f64 - rect.left(),
			ev.client_y() as f64 - rect.top(),
		);

		context.update_value(|c| {
			if let Some(c) = c {
				c.state.pointer_move(x, y);
			}
		});
	};

	let on_mouseup = move |_: MouseEvent| {
		context.update_value(|c| {
			if let Some(c) = c {
				c.state.pointer_up();
			}
		});
	};

	let on_mouseleave = move |_: MouseEvent| {
		context.update_value(|c| {
			if let Some(c) = c {
				c.state.pointer_up();
			}
		});
	};

	let on_wheel = move |ev: WheelEvent| {
		ev.prevent_default();
		let canvas: HtmlCanvasElement = canvas_ref.get().unwrap().into();
		let rect = canvas.get_bounding_client_rect();
		let (x, y) = (
			ev.client_x() as f64 - rect.left(),
			ev.client_y() as f64 - rect.top(),
		);

		context.update_value(|c| {
			if let Some(c) = c {
				c.state.wheel_zoom(x, y, ev.delta_y());
			}
		});
	};

	let on_zoom_in = move |_: MouseEvent| {
		context.update_value(|c| {
			if let Some(c) = c {
				c.state.zoom_in();
			}
		});
	};

	let on_zoom_out = move |_: MouseEvent| {
		context.update_value(|c| {
			if let Some(c) = c {
				c.state.zoom_out();
			}
		});
	};

	let on_fit = move |_: MouseEvent| {
		context.update_value(|c| {
			if let Some(c) = c {
				c.state.fit_to_view();
			}
		});
	};

	let on_refresh = move |_: MouseEvent| load.run(());

	view! {
		<div
			class="graph-view"
			style="position: relative; width: 100%; height: 100%; background: #09090b; overflow: hidden;"
		>
			<canvas
				node_ref=canvas_ref
				class="graph-view-canvas"
				on:mousedown=on_mousedown
				on:mousemove=on_mousemove
				on:mouseup=on_mouseup
				on:mouseleave=on_mouseleave
				on:wheel=on_wheel
				style="display: block; cursor: grab;"
			/>

			<div class="graph-hud">
				<button class="hud-button" title="Zoom in" on:click=on_zoom_in>
					"+"
				</button>
				<button class="hud-button" title="Zoom out" on:click=on_zoom_out>
					"-"
				</button>
				<button class="hud-button" title="Fit graph to view" on:click=on_fit>
					"Fit"
				</button>
				<button
					class="hud-button"
					title="Reload graph data"
					on:click=on_refresh
					disabled=move || loading.get()
				>
					{move || if loading.get() { "Loading..." } else { "Refresh" }}
				</button>
			</div>

			<div class="graph-status">
				{move || format!("{} nodes | {} edges", node_count.get(), edge_count.get())}
				<span class="status-phase">
					{move || if settled.get() { " | settled" } else { " | settling" }}
				</span>
			</div>

			<div class="graph-legend">
				<h4>"Node types"</h4>
				{NodeCategory::KNOWN
					.into_iter()
					.map(|category| {
						let accent = category_color(category).to_css();
						view! {
							<div class="legend-row">
								<span>{category.display_name()}</span>
								<span class="legend-dot" style=format!("background: {accent};")></span>
							</div>
						}
					})
					.collect_view()}
			</div>

			<Show when=move || loading.get()>
				<div class="graph-loading">
					<div class="spinner"></div>
					<p>"Fetching graph data..."</p>
				</div>
			</Show>

			{move || {
				error
					.get()
					.map(|e| {
						view! {
							<div class="graph-error">
								<p>{format!("Failed to load graph: {e}")}</p>
								<button class="hud-button" on:click=move |_| load.run(())>
									"Retry"
								</button>
							</div>
						}
					})
			}}
		</div>
	}
}
