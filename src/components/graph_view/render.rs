//! Canvas rendering for the relationship graph.
//!
//! Drawing runs in passes for correct z-ordering:
//! 1. Background fill and dot grid (screen space)
//! 2. Edge lines and arrowheads (world space)
//! 3. Node glows, then rings, discs and node labels
//! 4. Relation labels on top

use std::f64::consts::PI;

use web_sys::CanvasRenderingContext2d;

use super::simulation::SimNode;
use super::state::GraphViewState;
use super::theme::{NODE_DISC_MARGIN, NODE_RING_MARGIN, Theme, category_color};

/// Renders one complete frame.
pub fn render(state: &GraphViewState, ctx: &CanvasRenderingContext2d, theme: &Theme) {
	if state.width <= 0.0 || state.height <= 0.0 {
		return;
	}

	draw_background(state, ctx, theme);

	ctx.save();
	let _ = ctx.translate(state.transform.x, state.transform.y);
	let _ = ctx.scale(state.transform.k, state.transform.k);

	draw_edges(state, ctx, theme);
	draw_nodes(state, ctx, theme);
	draw_relation_labels(state, ctx, theme);

	ctx.restore();
}

fn draw_background(state: &GraphViewState, ctx: &CanvasRenderingContext2d, theme: &Theme) {
	ctx.set_fill_style_str(&theme.background.to_css());
	ctx.fill_rect(0.0, 0.0, state.width, state.height);

	// The dot grid lives in screen space; it does not pan or zoom.
	ctx.set_fill_style_str(&theme.grid_dot.to_css());
	let spacing = theme.grid_spacing;
	let mut y = spacing / 2.0;
	while y < state.height {
		let mut x = spacing / 2.0;
		while x < state.width {
			ctx.begin_path();
			let _ = ctx.arc(x, y, theme.grid_dot_radius, 0.0, PI * 2.0);
			ctx.fill();
			x += spacing;
		}
		y += spacing;
	}
}

fn draw_edges(state: &GraphViewState, ctx: &CanvasRenderingContext2d, theme: &Theme) {
	let nodes = state.simulation.nodes();

	for edge in state.simulation.edges() {
		draw_edge(ctx, theme, &nodes[edge.source], &nodes[edge.target]);
	}
}

fn draw_edge(ctx: &CanvasRenderingContext2d, theme: &Theme, source: &SimNode, target: &SimNode) {
	let (dx, dy) = (target.x - source.x, target.y - source.y);
	let dist = (dx * dx + dy * dy).sqrt();
	if dist < 0.001 {
		return;
	}
	let (ux, uy) = (dx / dist, dy / dist);

	let source_r = source.size + NODE_RING_MARGIN;
	let target_r = target.size + NODE_RING_MARGIN;

	ctx.set_stroke_style_str(&theme.edge.to_css());
	ctx.set_line_width(theme.edge_width);
	ctx.begin_path();
	ctx.move_to(source.x + ux * source_r, source.y + uy * source_r);
	ctx.line_to(
		target.x - ux * (target_r + theme.arrow_length),
		target.y - uy * (target_r + theme.arrow_length),
	);
	ctx.stroke();

	// Arrowhead resting against the target ring.
	ctx.set_fill_style_str(&theme.arrow.to_css());
	let (tip_x, tip_y) = (target.x - ux * target_r, target.y - uy * target_r);
	let (back_x, back_y) = (tip_x - ux * theme.arrow_length, tip_y - uy * theme.arrow_length);
	let (px, py) = (
		-uy * theme.arrow_length * 0.5,
		ux * theme.arrow_length * 0.5,
	);

	ctx.begin_path();
	ctx.move_to(tip_x, tip_y);
	ctx.line_to(back_x + px, back_y + py);
	ctx.line_to(back_x - px, back_y - py);
	ctx.close_path();
	ctx.fill();
}

fn draw_nodes(state: &GraphViewState, ctx: &CanvasRenderingContext2d, theme: &Theme) {
	// Pass 1: glows, so no ring sits under a neighbor's halo.
	if theme.glow_alpha > 0.0 {
		for node in state.simulation.nodes() {
			draw_node_glow(ctx, theme, node);
		}
	}

	// Pass 2: rings, discs and labels.
	for node in state.simulation.nodes() {
		draw_node(ctx, theme, node);
	}
}

fn draw_node_glow(ctx: &CanvasRenderingContext2d, theme: &Theme, node: &SimNode) {
	let ring_r = node.size + NODE_RING_MARGIN;
	let glow_r = ring_r + theme.glow_extent;
	let accent = category_color(node.category);

	let gradient = ctx
		.create_radial_gradient(node.x, node.y, ring_r * 0.5, node.x, node.y, glow_r)
		.unwrap();
	gradient
		.add_color_stop(0.0, &accent.with_alpha(theme.glow_alpha).to_css())
		.unwrap();
	gradient.add_color_stop(1.0, "rgba(0, 0, 0, 0)").unwrap();

	ctx.begin_path();
	let _ = ctx.arc(node.x, node.y, glow_r, 0.0, PI * 2.0);
	#[allow(deprecated)]
	ctx.set_fill_style(&gradient);
	ctx.fill();
}

fn draw_node(ctx: &CanvasRenderingContext2d, theme: &Theme, node: &SimNode) {
	let ring_r = node.size + NODE_RING_MARGIN;
	let accent = category_color(node.category);

	// Dark core with the category ring around it.
	ctx.begin_path();
	let _ = ctx.arc(node.x, node.y, ring_r, 0.0, PI * 2.0);
	ctx.set_fill_style_str(&theme.node_core.to_css());
	ctx.fill();
	ctx.set_stroke_style_str(&accent.to_css());
	ctx.set_line_width(theme.ring_width);
	ctx.stroke();

	// Translucent accent disc inside the ring.
	ctx.begin_path();
	let _ = ctx.arc(node.x, node.y, node.size + NODE_DISC_MARGIN, 0.0, PI * 2.0);
	ctx.set_fill_style_str(&accent.with_alpha(theme.disc_alpha).to_css());
	ctx.fill();

	ctx.set_fill_style_str(&theme.node_label.to_css());
	ctx.set_font(theme.node_label_font);
	ctx.set_text_align("start");
	let _ = ctx.fill_text(&node.label, node.x + 20.0, node.y + 5.0);
}

fn draw_relation_labels(state: &GraphViewState, ctx: &CanvasRenderingContext2d, theme: &Theme) {
	let nodes = state.simulation.nodes();

	ctx.set_fill_style_str(&theme.relation_label.to_css());
	ctx.set_font(theme.relation_label_font);
	ctx.set_text_align("center");

	for edge in state.simulation.edges() {
		let (source, target) = (&nodes[edge.source], &nodes[edge.target]);
		let mid_x = (source.x + target.x) / 2.0;
		let mid_y = (source.y + target.y) / 2.0;
		let _ = ctx.fill_text(&edge.relation, mid_x, mid_y - 4.0);
	}
}
