//! audit-graph: Interactive relationship graph for compliance audit
//! dashboards.
//!
//! This crate provides a WASM-based visualization component that renders the
//! audited ontology (standard clauses, controls, evidence, risks) with
//! physics-based layout, pan/zoom, and node dragging.

use leptos::prelude::*;
use leptos_meta::*;
use log::{Level, info};

pub mod components;

pub use components::graph_view::{
	GraphData, GraphDataError, GraphEdge, GraphNode, GraphViewCanvas, LoadError, NodeCategory,
};

/// Initialize logging and panic hooks for the WASM target.
pub fn init_logging() {
	let _ = console_log::init_with_level(Level::Debug);
	console_error_panic_hook::set_once();
	info!("audit-graph: logging initialized");
}

/// Main application component.
/// Hosts the fullscreen relationship graph backed by the audit API.
#[component]
pub fn App() -> impl IntoView {
	provide_meta_context();

	view! {
		<Html attr:lang="en" attr:dir="ltr" attr:data-theme="dark" />
		<Title text="Compliance Relationship Graph" />
		<Meta charset="UTF-8" />
		<Meta name="viewport" content="width=device-width, initial-scale=1.0" />

		<div class="fullscreen-graph">
			<GraphViewCanvas fullscreen=true />
			<div class="graph-overlay">
				<h1>"Relationship Graph"</h1>
				<p class="subtitle">
					"Drag nodes to reposition. Scroll to zoom. Drag background to pan."
				</p>
			</div>
		</div>
	}
}
