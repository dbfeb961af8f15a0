//! Zoom-dependent sizing for graph visuals.
//!
//! Node radii and edge widths live in world space and grow with zoom, like the
//! graph itself. Strokes around nodes, labels and hit tolerances are defined
//! in screen pixels so they stay legible and clickable at any zoom level.
//!
//! # Scaling Behaviors
//!
//! - [`ScaleBehavior::World`]: Scales with zoom.
//! - [`ScaleBehavior::Screen`]: Constant screen size. Divides by `k` to counteract
//!   the canvas transform.
//! - [`ScaleBehavior::Clamped`]: World-space scaling with min/max screen-size bounds.

/// Defines how a visual property scales with zoom level.
#[derive(Clone, Debug)]
pub enum ScaleBehavior {
	/// Constant world-space size. Appears larger when zoomed in.
	World,
	/// Constant screen-space size (pixels). Unaffected by zoom.
	Screen,
	/// World-space scaling, clamped to min/max screen-space bounds.
	Clamped { min_screen: f64, max_screen: f64 },
}

impl ScaleBehavior {
	/// World-space value for `base` at zoom `k`.
	pub fn apply(&self, base: f64, k: f64) -> f64 {
		match self {
			ScaleBehavior::World => base,
			ScaleBehavior::Screen => base / k,
			ScaleBehavior::Clamped {
				min_screen,
				max_screen,
			} => base.clamp(min_screen / k, max_screen / k),
		}
	}
}

/// Defines how alpha/opacity scales with zoom level.
#[derive(Clone, Debug)]
pub enum AlphaBehavior {
	/// Constant alpha regardless of zoom.
	Constant,
	/// Fully visible at `full_alpha_k`, fades to zero at `zero_alpha_k`.
	Fade { zero_alpha_k: f64, full_alpha_k: f64 },
}

impl AlphaBehavior {
	/// Alpha multiplier for zoom `k`.
	pub fn apply(&self, k: f64) -> f64 {
		match self {
			AlphaBehavior::Constant => 1.0,
			AlphaBehavior::Fade {
				zero_alpha_k,
				full_alpha_k,
			} => {
				if zero_alpha_k == full_alpha_k {
					return 1.0;
				}
				((k - zero_alpha_k) / (full_alpha_k - zero_alpha_k)).clamp(0.0, 1.0)
			}
		}
	}
}

/// Node visuals.
#[derive(Clone, Debug)]
pub struct NodeScaleConfig {
	/// How border strokes scale with zoom.
	pub border_behavior: ScaleBehavior,
	/// Extra pick radius around each node, in screen pixels.
	pub hit_padding: f64,
	/// Label font size in screen pixels.
	pub label_size: f64,
	/// Label fade-out when zoomed out.
	pub label_alpha_behavior: AlphaBehavior,
}

/// Edge visuals. Widths are in world units and derive from connection strength.
#[derive(Clone, Debug)]
pub struct EdgeScaleConfig {
	pub min_width: f64,
	pub max_width: f64,
	/// Added to the connection strength for a selected or highlighted edge.
	pub highlight_boost: f64,
	pub highlight_min_width: f64,
	pub highlight_max_width: f64,
	/// Pick distance from the edge line, in screen pixels.
	pub hit_tolerance: f64,
}

impl EdgeScaleConfig {
	/// Stroke width for an edge with `value` shared events.
	pub fn width(&self, value: usize) -> f64 {
		(value as f64).clamp(self.min_width, self.max_width)
	}

	/// Stroke width for a selected, hovered or incident edge.
	pub fn highlighted_width(&self, value: usize) -> f64 {
		(value as f64 + self.highlight_boost).clamp(self.highlight_min_width, self.highlight_max_width)
	}
}

/// Zoom limits and step for wheel and button zoom.
#[derive(Clone, Debug)]
pub struct ZoomConfig {
	pub min_k: f64,
	pub max_k: f64,
	/// Factor applied per zoom-in step; zoom-out uses its inverse.
	pub step: f64,
}

impl ZoomConfig {
	pub fn clamp(&self, k: f64) -> f64 {
		k.clamp(self.min_k, self.max_k)
	}
}

/// Complete scale configuration for all graph elements.
#[derive(Clone, Debug)]
pub struct ScaleConfig {
	pub node: NodeScaleConfig,
	pub edge: EdgeScaleConfig,
	pub zoom: ZoomConfig,
}

impl Default for ScaleConfig {
	fn default() -> Self {
		Self {
			node: NodeScaleConfig {
				border_behavior: ScaleBehavior::Clamped {
					min_screen: 1.0,
					max_screen: 6.0,
				},
				hit_padding: 4.0,
				label_size: 12.0,
				label_alpha_behavior: AlphaBehavior::Fade {
					zero_alpha_k: 0.35,
					full_alpha_k: 0.7,
				},
			},
			edge: EdgeScaleConfig {
				min_width: 1.0,
				max_width: 8.0,
				highlight_boost: 2.0,
				highlight_min_width: 2.0,
				highlight_max_width: 10.0,
				hit_tolerance: 4.0,
			},
			zoom: ZoomConfig {
				min_k: 0.1,
				max_k: 4.0,
				step: 1.2,
			},
		}
	}
}

/// Pre-computed scale values for a specific zoom level.
///
/// Create this once per frame and pass it to rendering functions.
#[derive(Clone, Debug)]
pub struct ScaledValues {
	/// Current zoom level.
	pub k: f64,
	/// Multiplier turning a world-space border width into the drawn width.
	pub border_scale: f64,
	/// Pick padding around nodes in world-space.
	pub hit_padding: f64,
	/// Pick distance around edges in world-space.
	pub edge_hit_tolerance: f64,
	/// Label font (e.g., "12px sans-serif").
	pub label_font: String,
	/// Label gap below the node in world-space.
	pub label_offset: f64,
	pub label_alpha: f64,
}

impl ScaledValues {
	pub fn new(config: &ScaleConfig, k: f64) -> Self {
		let k = k.max(f64::EPSILON);
		let label_size = config.node.label_size / k;
		Self {
			k,
			border_scale: config.node.border_behavior.apply(1.0, k),
			hit_padding: ScaleBehavior::Screen.apply(config.node.hit_padding, k),
			edge_hit_tolerance: ScaleBehavior::Screen.apply(config.edge.hit_tolerance, k),
			label_font: format!("{}px sans-serif", label_size),
			label_offset: label_size * 1.1,
			label_alpha: config.node.label_alpha_behavior.apply(k),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn edge_widths_are_clamped() {
		let edge = ScaleConfig::default().edge;
		assert_eq!(edge.width(0), 1.0);
		assert_eq!(edge.width(3), 3.0);
		assert_eq!(edge.width(20), 8.0);
		assert_eq!(edge.highlighted_width(0), 2.0);
		assert_eq!(edge.highlighted_width(5), 7.0);
		assert_eq!(edge.highlighted_width(20), 10.0);
	}

	#[test]
	fn screen_space_values_counter_zoom() {
		let config = ScaleConfig::default();
		let near = ScaledValues::new(&config, 2.0);
		let far = ScaledValues::new(&config, 0.5);
		assert_eq!(near.hit_padding * 2.0, config.node.hit_padding);
		assert_eq!(far.hit_padding * 0.5, config.node.hit_padding);
		assert!(far.label_alpha > 0.0 && far.label_alpha < 1.0);
		assert_eq!(near.label_alpha, 1.0);
		assert_eq!(ScaledValues::new(&config, 0.2).label_alpha, 0.0);
	}

	#[test]
	fn zoom_is_clamped() {
		let zoom = ScaleConfig::default().zoom;
		assert_eq!(zoom.clamp(100.0), 4.0);
		assert_eq!(zoom.clamp(0.0), 0.1);
		assert_eq!(ScaleBehavior::World.apply(3.0, 2.0), 3.0);
	}
}
