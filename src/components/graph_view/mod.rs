//! Interactive relationship graph for the compliance dashboard.
//!
//! Renders the audited ontology (standard clauses, controls, evidence and
//! risks) as a directed graph on an HTML canvas with:
//! - Physics-based layout via a force simulation with Barnes-Hut charge
//!   approximation
//! - Pan, zoom and node dragging, with dragged nodes pinned to the pointer
//! - Async data loading with refresh, stale-response discard and full
//!   teardown on unmount
//!
//! # Example
//!
//! ```ignore
//! use audit_graph::GraphViewCanvas;
//!
//! view! { <GraphViewCanvas endpoint="/api/graph/relations" fullscreen=true /> }
//! ```

mod component;
mod quadtree;
mod render;
mod simulation;
mod state;
pub mod theme;
mod types;

pub use component::{GraphViewCanvas, LoadError};
pub use simulation::{SimEdge, SimNode, Simulation, SimulationConfig};
pub use state::{DragState, GraphViewState, PanState, SCALE_MAX, SCALE_MIN, ViewTransform};
pub use types::{GraphData, GraphDataError, GraphEdge, GraphNode, NodeCategory};
