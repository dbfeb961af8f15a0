//! Visual theming for the friend graph.
//!
//! Colors, node fallback palettes and the selection/hover accents.

/// RGBA color representation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Color {
	pub r: u8,
	pub g: u8,
	pub b: u8,
	pub a: f64,
}

impl Color {
	pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
		Self { r, g, b, a: 1.0 }
	}

	pub const fn rgba(r: u8, g: u8, b: u8, a: f64) -> Self {
		Self { r, g, b, a }
	}

	/// Parses `#RRGGBB`. Anything else yields `None`.
	pub fn from_hex(hex: &str) -> Option<Self> {
		let digits = hex.strip_prefix('#')?;
		if digits.len() != 6 || !digits.is_ascii() {
			return None;
		}
		let channel = |i: usize| u8::from_str_radix(&digits[i..i + 2], 16).ok();
		Some(Self::rgb(channel(0)?, channel(2)?, channel(4)?))
	}

	pub fn with_alpha(self, a: f64) -> Self {
		Self { a, ..self }
	}

	fn mix(self, target: (f64, f64, f64), t: f64) -> Self {
		let blend = |from: u8, to: f64| (from as f64 + (to - from as f64) * t).round() as u8;
		Self {
			r: blend(self.r, target.0),
			g: blend(self.g, target.1),
			b: blend(self.b, target.2),
			a: self.a,
		}
	}

	/// Moves toward white; `1.0` is white.
	pub fn lighten(self, factor: f64) -> Self {
		self.mix((255.0, 255.0, 255.0), factor.clamp(0.0, 1.0))
	}

	/// Moves toward black; `1.0` is black.
	pub fn darken(self, factor: f64) -> Self {
		self.mix((0.0, 0.0, 0.0), factor.clamp(0.0, 1.0))
	}

	pub fn lerp(self, other: Color, t: f64) -> Self {
		let t = t.clamp(0.0, 1.0);
		let target = (other.r as f64, other.g as f64, other.b as f64);
		self.mix(target, t).with_alpha(self.a + (other.a - self.a) * t)
	}

	pub fn to_css(self) -> String {
		if self.a >= 0.999 {
			format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
		} else {
			format!("rgba({}, {}, {}, {})", self.r, self.g, self.b, self.a)
		}
	}
}

/// Fill colors for nodes whose photo has not loaded (or has none).
#[derive(Clone, Debug)]
pub struct NodePalette {
	pub colors: Vec<Color>,
}

impl NodePalette {
	/// Material-ish accents matching the light theme.
	pub fn material() -> Self {
		Self {
			colors: vec![
				Color::rgb(63, 81, 181),  // Indigo
				Color::rgb(0, 150, 136),  // Teal
				Color::rgb(255, 152, 0),  // Orange
				Color::rgb(156, 39, 176), // Purple
				Color::rgb(76, 175, 80),  // Green
				Color::rgb(3, 169, 244),  // Light blue
				Color::rgb(233, 30, 99),  // Pink
				Color::rgb(121, 85, 72),  // Brown
			],
		}
	}

	/// Cool teals and purples for dark backgrounds.
	pub fn aurora() -> Self {
		Self {
			colors: vec![
				Color::rgb(100, 145, 135), // Eucalyptus
				Color::rgb(115, 135, 155), // Slate
				Color::rgb(130, 120, 150), // Wisteria
				Color::rgb(105, 140, 145), // Teal
				Color::rgb(120, 130, 160), // Periwinkle
				Color::rgb(125, 145, 140), // Sage
				Color::rgb(110, 125, 155), // Storm
				Color::rgb(135, 140, 150), // Pewter
			],
		}
	}

	/// Stable color for a friend id, so a node keeps its color across rebuilds.
	pub fn for_id(&self, id: &str) -> Color {
		let hash = id
			.bytes()
			.fold(2166136261u32, |h, b| (h ^ b as u32).wrapping_mul(16777619));
		self.colors[hash as usize % self.colors.len()]
	}
}

/// Background style configuration.
#[derive(Clone, Debug)]
pub struct BackgroundStyle {
	/// Primary background color
	pub color: Color,
	/// Secondary color for gradients
	pub color_secondary: Color,
	/// Whether to use radial gradient
	pub use_gradient: bool,
	/// Vignette intensity (0.0 = none, 1.0 = strong)
	pub vignette: f64,
}

/// Edge visual style.
#[derive(Clone, Debug)]
pub struct EdgeStyle {
	pub color: Color,
	/// Opacity of an edge that is neither selected nor hovered.
	pub opacity: f64,
}

/// Node visual style.
#[derive(Clone, Debug)]
pub struct NodeStyle {
	/// Disc behind the photo.
	pub fill: Color,
	pub border_color: Color,
	pub border_width: f64,
	/// Gap between the disc edge and the clipped photo.
	pub photo_inset: f64,
	pub label_color: Color,
}

/// Accents for selection and hover.
#[derive(Clone, Debug)]
pub struct SelectionStyle {
	/// Border of the selected node and links incident to it.
	pub node: Color,
	pub node_border_width: f64,
	/// The selected link.
	pub link: Color,
	/// Border of a hovered node and color of a hovered link.
	pub hover: Color,
	pub hover_border_width: f64,
}

/// Complete visual theme.
#[derive(Clone, Debug)]
pub struct Theme {
	pub name: &'static str,
	pub background: BackgroundStyle,
	pub edge: EdgeStyle,
	pub node: NodeStyle,
	pub selection: SelectionStyle,
	pub palette: NodePalette,
}

impl Theme {
	/// White canvas with indigo node borders (default).
	pub fn light() -> Self {
		Self {
			name: "light",
			background: BackgroundStyle {
				color: Color::rgb(250, 250, 250),
				color_secondary: Color::rgb(255, 255, 255),
				use_gradient: true,
				vignette: 0.0,
			},
			edge: EdgeStyle {
				color: Color::rgb(153, 153, 153),
				opacity: 0.8,
			},
			node: NodeStyle {
				fill: Color::rgb(255, 255, 255),
				border_color: Color::rgb(63, 81, 181),
				border_width: 2.0,
				photo_inset: 2.0,
				label_color: Color::rgba(33, 33, 33, 0.87),
			},
			selection: SelectionStyle {
				node: Color::rgb(244, 67, 54),
				node_border_width: 4.0,
				link: Color::rgb(0, 150, 136),
				hover: Color::rgb(0, 150, 136),
				hover_border_width: 3.0,
			},
			palette: NodePalette::material(),
		}
	}

	/// Dark variant for embedding in dark pages.
	pub fn midnight() -> Self {
		Self {
			name: "midnight",
			background: BackgroundStyle {
				color: Color::rgb(18, 20, 28),
				color_secondary: Color::rgb(25, 28, 38),
				use_gradient: true,
				vignette: 0.2,
			},
			edge: EdgeStyle {
				color: Color::rgb(100, 120, 150),
				opacity: 0.6,
			},
			node: NodeStyle {
				fill: Color::rgb(40, 44, 56),
				border_color: Color::rgb(121, 134, 203),
				border_width: 2.0,
				photo_inset: 2.0,
				label_color: Color::rgba(255, 255, 255, 0.85),
			},
			selection: SelectionStyle {
				node: Color::rgb(239, 83, 80),
				node_border_width: 4.0,
				link: Color::rgb(38, 166, 154),
				hover: Color::rgb(38, 166, 154),
				hover_border_width: 3.0,
			},
			palette: NodePalette::aurora(),
		}
	}
}

impl Default for Theme {
	fn default() -> Self {
		Self::light()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn parses_hex_colors() {
		assert_eq!(Color::from_hex("#f44336"), Some(Color::rgb(244, 67, 54)));
		assert_eq!(Color::from_hex("#009688").map(Color::to_css).as_deref(), Some("#009688"));
		assert_eq!(Color::from_hex("f44336"), None);
		assert_eq!(Color::from_hex("#zzzzzz"), None);
	}

	#[test]
	fn palette_color_is_stable_per_id() {
		let palette = NodePalette::material();
		assert_eq!(palette.for_id("f1"), palette.for_id("f1"));
		assert!(palette.colors.contains(&palette.for_id("anything")));
	}

	#[test]
	fn alpha_changes_css_form() {
		let c = Color::rgb(153, 153, 153);
		assert_eq!(c.to_css(), "#999999");
		assert_eq!(c.with_alpha(0.5).to_css(), "rgba(153, 153, 153, 0.5)");
		assert_eq!(c.lerp(Color::rgb(255, 255, 255), 1.0), Color::rgb(255, 255, 255));
	}
}
