//! Per-view mutable state: the simulation plus camera transform and pointer
//! gesture tracking.
//!
//! A pointer gesture is either a node drag or a canvas pan, never both: the
//! hit test at pointer-down decides which, and the rest of the gesture
//! routes through that decision. Dragging writes the node's pin (world
//! space, inverse-transformed through the current view); panning and
//! zooming write the view transform only.

use super::simulation::Simulation;
use super::theme::NODE_RING_MARGIN;
use super::types::{GraphData, GraphDataError};

/// Smallest allowed zoom factor.
pub const SCALE_MIN: f64 = 0.1;
/// Largest allowed zoom factor.
pub const SCALE_MAX: f64 = 4.0;

/// Zoom step applied by the HUD zoom buttons.
const BUTTON_ZOOM_STEP: f64 = 1.2;
/// Screen-space padding kept around the graph by fit-to-view.
const FIT_PADDING: f64 = 40.0;

/// Pan and zoom transform applied to the entire scene.
///
/// Screen = world * k + (x, y). `to_world` and `to_screen` are exact
/// inverses of one another.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ViewTransform {
	/// Screen-space translation.
	pub x: f64,
	/// Screen-space translation.
	pub y: f64,
	/// Zoom factor, clamped to [`SCALE_MIN`]..[`SCALE_MAX`].
	pub k: f64,
}

impl Default for ViewTransform {
	fn default() -> Self {
		Self {
			x: 0.0,
			y: 0.0,
			k: 1.0,
		}
	}
}

impl ViewTransform {
	/// World coordinates to screen coordinates.
	pub fn to_screen(&self, wx: f64, wy: f64) -> (f64, f64) {
		(wx * self.k + self.x, wy * self.k + self.y)
	}

	/// Screen coordinates to world coordinates.
	pub fn to_world(&self, sx: f64, sy: f64) -> (f64, f64) {
		((sx - self.x) / self.k, (sy - self.y) / self.k)
	}

	/// Multiply the zoom by `factor`, clamped, keeping the world point under
	/// the screen anchor `(sx, sy)` fixed.
	pub fn zoom_around(&mut self, sx: f64, sy: f64, factor: f64) {
		let new_k = (self.k * factor).clamp(SCALE_MIN, SCALE_MAX);
		let ratio = new_k / self.k;
		self.x = sx - (sx - self.x) * ratio;
		self.y = sy - (sy - self.y) * ratio;
		self.k = new_k;
	}
}

/// Tracks an in-progress node drag.
#[derive(Clone, Debug, Default)]
pub struct DragState {
	/// Whether a drag gesture is underway.
	pub active: bool,
	/// Arena index of the dragged node.
	pub node_idx: Option<usize>,
}

/// Tracks an in-progress canvas pan.
#[derive(Clone, Debug, Default)]
pub struct PanState {
	/// Whether a pan gesture is underway.
	pub active: bool,
	/// Pointer position at gesture start, screen space.
	pub start_x: f64,
	/// Pointer position at gesture start, screen space.
	pub start_y: f64,
	/// Transform translation at gesture start.
	pub transform_start_x: f64,
	/// Transform translation at gesture start.
	pub transform_start_y: f64,
}

/// Core view state combining the simulation with interaction tracking.
///
/// Created when the component mounts (and again on every refresh), then
/// mutated each frame by the animation loop and by pointer handlers.
pub struct GraphViewState {
	/// The force simulation owning all node positions.
	pub simulation: Simulation,
	/// Current pan/zoom transform.
	pub transform: ViewTransform,
	/// Drag gesture tracking.
	pub drag: DragState,
	/// Pan gesture tracking.
	pub pan: PanState,
	/// Canvas width in CSS pixels.
	pub width: f64,
	/// Canvas height in CSS pixels.
	pub height: f64,
}

impl GraphViewState {
	/// Build view state from a data set; fails on integrity errors without
	/// creating a partial simulation.
	pub fn new(data: &GraphData, width: f64, height: f64) -> Result<Self, GraphDataError> {
		Ok(Self {
			simulation: Simulation::new(data, width, height)?,
			transform: ViewTransform::default(),
			drag: DragState::default(),
			pan: PanState::default(),
			width,
			height,
		})
	}

	/// Advance the simulation one step; `false` when settled.
	pub fn tick(&mut self) -> bool {
		self.simulation.tick()
	}

	/// Topmost node whose rendered circle covers the screen point, if any.
	pub fn node_at_position(&self, sx: f64, sy: f64) -> Option<usize> {
		let (wx, wy) = self.transform.to_world(sx, sy);
		self.simulation
			.nodes()
			.iter()
			.enumerate()
			.rev()
			.find(|(_, node)| {
				let (dx, dy) = (node.x - wx, node.y - wy);
				let hit = node.size + NODE_RING_MARGIN;
				dx * dx + dy * dy < hit * hit
			})
			.map(|(idx, _)| idx)
	}

	/// Pointer pressed: start a node drag when over a node, otherwise start
	/// a pan.
	pub fn pointer_down(&mut self, sx: f64, sy: f64) {
		if let Some(idx) = self.node_at_position(sx, sy) {
			self.drag.active = true;
			self.drag.node_idx = Some(idx);
			let (wx, wy) = self.transform.to_world(sx, sy);
			let target = self.simulation.config().drag_alpha_target;
			self.simulation.pin_node(idx, wx, wy);
			self.simulation.set_alpha_target(target);
		} else {
			self.pan.active = true;
			self.pan.start_x = sx;
			self.pan.start_y = sy;
			self.pan.transform_start_x = self.transform.x;
			self.pan.transform_start_y = self.transform.y;
		}
	}

	/// Pointer moved: update the pin of a dragged node, or the translation
	/// of an active pan.
	pub fn pointer_move(&mut self, sx: f64, sy: f64) {
		if self.drag.active {
			if let Some(idx) = self.drag.node_idx {
				let (wx, wy) = self.transform.to_world(sx, sy);
				self.simulation.pin_node(idx, wx, wy);
			}
		} else if self.pan.active {
			self.transform.x = self.pan.transform_start_x + (sx - self.pan.start_x);
			self.transform.y = self.pan.transform_start_y + (sy - self.pan.start_y);
		}
	}

	/// Pointer released or left the canvas: release any pin and end the
	/// gesture; a released node resumes free simulation and alpha decays
	/// normally again.
	pub fn pointer_up(&mut self) {
		if self.drag.active {
			if let Some(idx) = self.drag.node_idx {
				self.simulation.unpin_node(idx);
			}
			self.simulation.set_alpha_target(0.0);
		}
		self.drag.active = false;
		self.drag.node_idx = None;
		self.pan.active = false;
	}

	/// Wheel zoom anchored at the cursor. A zero vertical delta (pure
	/// horizontal scroll) leaves the view unchanged.
	pub fn wheel_zoom(&mut self, sx: f64, sy: f64, delta_y: f64) {
		if delta_y == 0.0 {
			return;
		}
		let factor = if delta_y > 0.0 { 0.9 } else { 1.1 };
		self.transform.zoom_around(sx, sy, factor);
	}

	/// HUD zoom-in command, anchored at the canvas center.
	pub fn zoom_in(&mut self) {
		self.transform
			.zoom_around(self.width / 2.0, self.height / 2.0, BUTTON_ZOOM_STEP);
	}

	/// HUD zoom-out command, anchored at the canvas center.
	pub fn zoom_out(&mut self) {
		self.transform
			.zoom_around(self.width / 2.0, self.height / 2.0, 1.0 / BUTTON_ZOOM_STEP);
	}

	/// Scale and center the view so every node circle fits on the canvas
	/// with some padding. Resets to identity when the graph is empty.
	pub fn fit_to_view(&mut self) {
		let nodes = self.simulation.nodes();
		let Some(first) = nodes.first() else {
			self.transform = ViewTransform::default();
			return;
		};

		let r0 = first.size + NODE_RING_MARGIN;
		let (mut min_x, mut min_y) = (first.x - r0, first.y - r0);
		let (mut max_x, mut max_y) = (first.x + r0, first.y + r0);
		for node in nodes {
			let r = node.size + NODE_RING_MARGIN;
			min_x = min_x.min(node.x - r);
			min_y = min_y.min(node.y - r);
			max_x = max_x.max(node.x + r);
			max_y = max_y.max(node.y + r);
		}

		let (bw, bh) = (max_x - min_x, max_y - min_y);
		let avail_w = (self.width - 2.0 * FIT_PADDING).max(1.0);
		let avail_h = (self.height - 2.0 * FIT_PADDING).max(1.0);
		let k = (avail_w / bw.max(1.0))
			.min(avail_h / bh.max(1.0))
			.clamp(SCALE_MIN, SCALE_MAX);

		let (bcx, bcy) = ((min_x + max_x) / 2.0, (min_y + max_y) / 2.0);
		self.transform = ViewTransform {
			x: self.width / 2.0 - bcx * k,
			y: self.height / 2.0 - bcy * k,
			k,
		};
	}

	/// Update the canvas extent after a window resize. Layout is unaffected;
	/// only the viewport changes.
	pub fn resize(&mut self, width: f64, height: f64) {
		self.width = width;
		self.height = height;
	}
}
