//! Visual tokens for the dark dashboard look: category accents, canvas
//! colors and the fonts and offsets used by the renderer.

use super::types::NodeCategory;

/// Margin between a node's logical size and its outer ring radius.
pub const NODE_RING_MARGIN: f64 = 10.0;
/// Margin between a node's logical size and its translucent inner disc.
pub const NODE_DISC_MARGIN: f64 = 4.0;

/// RGBA color usable as a CSS color string.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Color {
	/// Red channel.
	pub r: u8,
	/// Green channel.
	pub g: u8,
	/// Blue channel.
	pub b: u8,
	/// Opacity in 0.0..=1.0.
	pub a: f32,
}

impl Color {
	/// Fully opaque color.
	pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
		Self { r, g, b, a: 1.0 }
	}

	/// Color with explicit opacity.
	pub const fn rgba(r: u8, g: u8, b: u8, a: f32) -> Self {
		Self { r, g, b, a }
	}

	/// Same color with a different opacity.
	pub const fn with_alpha(self, a: f32) -> Self {
		Self {
			r: self.r,
			g: self.g,
			b: self.b,
			a,
		}
	}

	/// CSS color string, `rgb(..)` when fully opaque.
	pub fn to_css(self) -> String {
		if self.a >= 1.0 {
			format!("rgb({}, {}, {})", self.r, self.g, self.b)
		} else {
			format!("rgba({}, {}, {}, {})", self.r, self.g, self.b, self.a)
		}
	}
}

/// Accent color for a node category, used for the ring stroke, the inner
/// disc and the glow.
pub fn category_color(category: NodeCategory) -> Color {
	match category {
		NodeCategory::Clause => Color::rgb(139, 92, 246),
		NodeCategory::Control => Color::rgb(59, 130, 246),
		NodeCategory::Evidence => Color::rgb(16, 185, 129),
		NodeCategory::Risk => Color::rgb(244, 63, 94),
		NodeCategory::Other => Color::rgb(113, 113, 122),
	}
}

/// Canvas drawing tokens. One dark theme matches the rest of the dashboard;
/// a light variant was never designed.
pub struct Theme {
	/// Canvas fill.
	pub background: Color,
	/// Dot-grid color, already carrying the grid opacity.
	pub grid_dot: Color,
	/// Dot-grid spacing in screen pixels.
	pub grid_spacing: f64,
	/// Dot-grid dot radius in screen pixels.
	pub grid_dot_radius: f64,
	/// Edge stroke color.
	pub edge: Color,
	/// Edge stroke width.
	pub edge_width: f64,
	/// Arrowhead fill.
	pub arrow: Color,
	/// Arrowhead length along the edge.
	pub arrow_length: f64,
	/// Fill inside the node ring.
	pub node_core: Color,
	/// Ring stroke width.
	pub ring_width: f64,
	/// Opacity of the translucent inner disc.
	pub disc_alpha: f32,
	/// Peak opacity of the glow gradient behind each node.
	pub glow_alpha: f32,
	/// How far the glow extends past the ring.
	pub glow_extent: f64,
	/// Node label fill.
	pub node_label: Color,
	/// Node label font.
	pub node_label_font: &'static str,
	/// Relation label fill.
	pub relation_label: Color,
	/// Relation label font.
	pub relation_label_font: &'static str,
}

impl Theme {
	/// The dashboard's dark zinc palette.
	pub fn dark() -> Self {
		Self {
			background: Color::rgb(9, 9, 11),
			grid_dot: Color::rgba(63, 63, 70, 0.2),
			grid_spacing: 32.0,
			grid_dot_radius: 1.0,
			edge: Color::rgba(63, 63, 70, 0.4),
			edge_width: 1.0,
			arrow: Color::rgb(82, 82, 91),
			arrow_length: 6.0,
			node_core: Color::rgb(9, 9, 11),
			ring_width: 2.0,
			disc_alpha: 0.2,
			glow_alpha: 0.35,
			glow_extent: 8.0,
			node_label: Color::rgb(228, 228, 231),
			node_label_font: "500 12px Inter, sans-serif",
			relation_label: Color::rgb(113, 113, 122),
			relation_label_font: "8px 'JetBrains Mono', monospace",
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn css_formats_opaque_and_translucent() {
		assert_eq!(Color::rgb(139, 92, 246).to_css(), "rgb(139, 92, 246)");
		assert_eq!(
			Color::rgba(63, 63, 70, 0.4).to_css(),
			"rgba(63, 63, 70, 0.4)"
		);
		assert_eq!(
			Color::rgb(16, 185, 129).with_alpha(0.2).to_css(),
			"rgba(16, 185, 129, 0.2)"
		);
	}

	#[test]
	fn known_categories_have_distinct_accents() {
		let mut seen = Vec::new();
		for category in NodeCategory::KNOWN {
			let c = category_color(category);
			assert!(!seen.contains(&c), "{category:?} accent repeats");
			seen.push(c);
		}
	}

	#[test]
	fn unknown_category_uses_neutral_accent() {
		assert_eq!(category_color(99.into()), Color::rgb(113, 113, 122));
	}
}
