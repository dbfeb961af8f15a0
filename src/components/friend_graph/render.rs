//! Canvas rendering for the friend graph.
//!
//! Rendering uses multiple passes for correct z-ordering:
//! 1. Background (screen space)
//! 2. Edges, emphasised ones last (world space)
//! 3. Dimmed nodes, then highlighted or selected nodes on top
//! 4. Vignette (screen space)

use std::collections::HashMap;
use std::f64::consts::PI;

use log::warn;
use web_sys::{CanvasRenderingContext2d, HtmlImageElement};

use super::scale::{ScaleConfig, ScaledValues};
use super::simulation::SimNode;
use super::state::{CanvasState, SelectionView};
use super::theme::{Color, Theme};
use super::types::{EdgeKey, GraphEdge};

/// Attempt to smooth values that would otherwise cause abrupt visual changes.
fn smooth_step(t: f64) -> f64 {
	t * t * (3.0 - 2.0 * t)
}

/// Friend photos, loaded lazily and drawn once the browser has decoded them.
#[derive(Default)]
pub struct PhotoCache {
	images: HashMap<String, Option<HtmlImageElement>>,
}

impl PhotoCache {
	/// The decoded image for `url`, starting a load on first request.
	fn get(&mut self, url: &str) -> Option<&HtmlImageElement> {
		if url.is_empty() {
			return None;
		}
		let image = self.images.entry(url.to_string()).or_insert_with(|| {
			match HtmlImageElement::new() {
				Ok(image) => {
					image.set_src(url);
					Some(image)
				}
				Err(e) => {
					warn!("friend-graph: cannot create image for {url}: {e:?}");
					None
				}
			}
		});
		image
			.as_ref()
			.filter(|image| image.complete() && image.natural_width() > 0)
	}
}

/// How strongly an edge is emphasised, in increasing priority.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum EdgeEmphasis {
	Normal,
	Hovered,
	/// Touches the selected node.
	Incident,
	Selected,
}

impl EdgeEmphasis {
	pub fn of(key: &EdgeKey, selection: &SelectionView, hovered: Option<&EdgeKey>) -> Self {
		if selection.is_link_selected(key) {
			EdgeEmphasis::Selected
		} else if selection.is_incident(key) {
			EdgeEmphasis::Incident
		} else if hovered == Some(key) {
			EdgeEmphasis::Hovered
		} else {
			EdgeEmphasis::Normal
		}
	}
}

/// Stroke color and world-space width for an edge.
pub fn edge_stroke(theme: &Theme, config: &ScaleConfig, value: usize, emphasis: EdgeEmphasis) -> (Color, f64) {
	match emphasis {
		EdgeEmphasis::Normal => (
			theme.edge.color.with_alpha(theme.edge.opacity),
			config.edge.width(value),
		),
		EdgeEmphasis::Hovered => (theme.selection.hover, config.edge.highlighted_width(value)),
		EdgeEmphasis::Incident => (theme.selection.node, config.edge.highlighted_width(value)),
		EdgeEmphasis::Selected => (theme.selection.link, config.edge.highlighted_width(value)),
	}
}

/// Renders the complete graph to the canvas.
pub fn render(
	state: &CanvasState,
	ctx: &CanvasRenderingContext2d,
	config: &ScaleConfig,
	theme: &Theme,
	photos: &mut PhotoCache,
) {
	let scale = ScaledValues::new(config, state.transform.k);

	draw_background(state, ctx, theme);

	ctx.save();
	let _ = ctx.translate(state.transform.x, state.transform.y);
	let _ = ctx.scale(state.transform.k, state.transform.k);

	draw_edges(state, ctx, config, theme);
	draw_nodes(state, ctx, &scale, theme, photos);

	ctx.restore();

	if theme.background.vignette > 0.0 {
		draw_vignette(state, ctx, theme);
	}
}

fn draw_background(state: &CanvasState, ctx: &CanvasRenderingContext2d, theme: &Theme) {
	let gradient = theme
		.background
		.use_gradient
		.then(|| {
			ctx.create_radial_gradient(
				state.width / 2.0,
				state.height / 2.0,
				0.0,
				state.width / 2.0,
				state.height / 2.0,
				state.width.max(state.height) * 0.8,
			)
			.ok()
		})
		.flatten();

	match gradient {
		Some(gradient) => {
			let _ = gradient.add_color_stop(0.0, &theme.background.color_secondary.to_css());
			let _ = gradient.add_color_stop(1.0, &theme.background.color.to_css());
			#[allow(deprecated)]
			ctx.set_fill_style(&gradient);
		}
		None => ctx.set_fill_style_str(&theme.background.color.to_css()),
	}

	ctx.fill_rect(0.0, 0.0, state.width, state.height);
}

fn draw_vignette(state: &CanvasState, ctx: &CanvasRenderingContext2d, theme: &Theme) {
	let Ok(gradient) = ctx.create_radial_gradient(
		state.width / 2.0,
		state.height / 2.0,
		state.width.min(state.height) * 0.3,
		state.width / 2.0,
		state.height / 2.0,
		state.width.max(state.height) * 0.7,
	) else {
		return;
	};

	let _ = gradient.add_color_stop(0.0, "rgba(0, 0, 0, 0)");
	let _ = gradient.add_color_stop(1.0, &format!("rgba(0, 0, 0, {})", theme.background.vignette));

	#[allow(deprecated)]
	ctx.set_fill_style(&gradient);
	ctx.fill_rect(0.0, 0.0, state.width, state.height);
}

fn draw_edges(state: &CanvasState, ctx: &CanvasRenderingContext2d, config: &ScaleConfig, theme: &Theme) {
	let max_t = smooth_step(state.highlight.max_intensity());
	let mut edges: Vec<(&GraphEdge, &SimNode, &SimNode, EdgeEmphasis)> = state
		.simulation
		.edge_endpoints()
		.map(|(edge, a, b)| {
			let emphasis = EdgeEmphasis::of(edge.key(), &state.selection, state.hovered_edge.as_ref());
			(edge, a, b, emphasis)
		})
		.collect();
	edges.sort_by_key(|(_, _, _, emphasis)| *emphasis);

	let _ = ctx.set_line_dash(&js_sys::Array::new());
	ctx.set_line_cap("round");
	for (edge, a, b, emphasis) in edges {
		let (color, width) = edge_stroke(theme, config, edge.value(), emphasis);
		let alpha = if emphasis != EdgeEmphasis::Normal {
			1.0
		} else {
			let edge_t = smooth_step(state.highlight.edge_intensity(a.id(), b.id()));
			if edge_t > 0.01 {
				1.0
			} else {
				1.0 - 0.6 * max_t
			}
		};

		ctx.set_stroke_style_str(&color.with_alpha(color.a * alpha).to_css());
		ctx.set_line_width(width);
		ctx.begin_path();
		ctx.move_to(a.x, a.y);
		ctx.line_to(b.x, b.y);
		ctx.stroke();
	}
}

fn draw_nodes(
	state: &CanvasState,
	ctx: &CanvasRenderingContext2d,
	scale: &ScaledValues,
	theme: &Theme,
	photos: &mut PhotoCache,
) {
	let max_t = smooth_step(state.highlight.max_intensity());
	let has_highlight = max_t > 0.01;
	let is_prominent = |node: &SimNode| {
		state.highlight.node_intensity(node.id()) > 0.001 || state.selection.is_node_selected(node.id())
	};

	// Pass 1: ordinary nodes, dimmed while something is hovered
	for node in state.simulation.nodes().iter().filter(|n| !is_prominent(*n)) {
		let alpha = if has_highlight { 1.0 - 0.6 * max_t } else { 1.0 };
		draw_node(state, ctx, node, scale, theme, photos, alpha, 1.0);
	}

	// Pass 2: hovered neighbourhood and the selected node on top
	for node in state.simulation.nodes().iter().filter(|n| is_prominent(*n)) {
		let eased_t = smooth_step(state.highlight.node_intensity(node.id()));
		let hover_t = smooth_step(state.highlight.hover_ring_intensity(node.id()));
		let dim_alpha = if has_highlight { 1.0 - 0.6 * max_t } else { 1.0 };
		let alpha = if state.selection.is_node_selected(node.id()) {
			1.0
		} else {
			dim_alpha + (1.0 - dim_alpha) * eased_t
		};
		let radius_mult = 1.0 + 0.08 * eased_t + 0.07 * hover_t;
		draw_node(state, ctx, node, scale, theme, photos, alpha, radius_mult);
	}
}

#[allow(clippy::too_many_arguments)]
fn draw_node(
	state: &CanvasState,
	ctx: &CanvasRenderingContext2d,
	node: &SimNode,
	scale: &ScaledValues,
	theme: &Theme,
	photos: &mut PhotoCache,
	alpha: f64,
	radius_mult: f64,
) {
	let (x, y) = (node.x, node.y);
	let radius = node.radius() * radius_mult;
	let inner = (radius - theme.node.photo_inset).max(1.0);

	ctx.set_global_alpha(alpha);

	ctx.begin_path();
	let _ = ctx.arc(x, y, radius, 0.0, 2.0 * PI);
	ctx.set_fill_style_str(&theme.node.fill.to_css());
	ctx.fill();

	match photos.get(&node.data.photo_url) {
		Some(image) => {
			ctx.save();
			ctx.begin_path();
			let _ = ctx.arc(x, y, inner, 0.0, 2.0 * PI);
			ctx.clip();
			let _ = ctx.draw_image_with_html_image_element_and_dw_and_dh(
				image,
				x - inner,
				y - inner,
				inner * 2.0,
				inner * 2.0,
			);
			ctx.restore();
		}
		None => draw_placeholder(ctx, node, theme, inner),
	}

	let hover_t = smooth_step(state.highlight.hover_ring_intensity(node.id()));
	let (border, border_width) = if state.selection.is_node_selected(node.id()) {
		(theme.selection.node, theme.selection.node_border_width)
	} else if hover_t > 0.01 {
		(
			theme.node.border_color.lerp(theme.selection.hover, hover_t),
			theme.node.border_width
				+ (theme.selection.hover_border_width - theme.node.border_width) * hover_t,
		)
	} else {
		(theme.node.border_color, theme.node.border_width)
	};
	ctx.begin_path();
	let _ = ctx.arc(x, y, radius, 0.0, 2.0 * PI);
	ctx.set_stroke_style_str(&border.to_css());
	ctx.set_line_width(border_width * scale.border_scale);
	ctx.stroke();

	let label_alpha = alpha * scale.label_alpha;
	if label_alpha > 0.05 {
		ctx.set_global_alpha(label_alpha);
		ctx.set_fill_style_str(&theme.node.label_color.to_css());
		ctx.set_font(&scale.label_font);
		ctx.set_text_align("center");
		ctx.set_text_baseline("top");
		let _ = ctx.fill_text(&node.data.name, x, y + radius + scale.label_offset * 0.25);
	}

	ctx.set_global_alpha(1.0);
}

/// Colored disc with initials for friends without a loaded photo.
fn draw_placeholder(ctx: &CanvasRenderingContext2d, node: &SimNode, theme: &Theme, radius: f64) {
	let (x, y) = (node.x, node.y);
	let base = theme.palette.for_id(node.id());

	match ctx.create_radial_gradient(x - radius * 0.3, y - radius * 0.3, 0.0, x, y, radius) {
		Ok(gradient) => {
			let _ = gradient.add_color_stop(0.0, &base.lighten(0.4).to_css());
			let _ = gradient.add_color_stop(0.7, &base.to_css());
			let _ = gradient.add_color_stop(1.0, &base.darken(0.2).to_css());
			#[allow(deprecated)]
			ctx.set_fill_style(&gradient);
		}
		Err(_) => ctx.set_fill_style_str(&base.to_css()),
	}
	ctx.begin_path();
	let _ = ctx.arc(x, y, radius, 0.0, 2.0 * PI);
	ctx.fill();

	ctx.set_fill_style_str("#ffffff");
	ctx.set_font(&format!("bold {}px sans-serif", (radius * 0.7).round()));
	ctx.set_text_align("center");
	ctx.set_text_baseline("middle");
	let _ = ctx.fill_text(&initials(&node.data.name), x, y);
}

/// Up to two uppercase initials from a display name.
fn initials(name: &str) -> String {
	name.split_whitespace()
		.filter_map(|word| word.chars().next())
		.flat_map(char::to_uppercase)
		.take(2)
		.collect()
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn initials_from_names() {
		assert_eq!(initials("Jane Doe"), "JD");
		assert_eq!(initials("  ada  lovelace byron "), "AL");
		assert_eq!(initials("Prince"), "P");
		assert_eq!(initials(""), "");
	}

	#[test]
	fn emphasis_priority() {
		let ab = EdgeKey::new("a", "b");
		let selection = SelectionView {
			node: Some("a".into()),
			link: None,
		};
		assert_eq!(EdgeEmphasis::of(&ab, &selection, Some(&ab)), EdgeEmphasis::Incident);
		assert_eq!(
			EdgeEmphasis::of(&ab, &SelectionView::default(), Some(&ab)),
			EdgeEmphasis::Hovered
		);
		let selected = SelectionView {
			node: Some("a".into()),
			link: Some(ab.clone()),
		};
		assert_eq!(EdgeEmphasis::of(&ab, &selected, None), EdgeEmphasis::Selected);
		assert_eq!(
			EdgeEmphasis::of(&EdgeKey::new("c", "d"), &selected, None),
			EdgeEmphasis::Normal
		);
	}

	#[test]
	fn edge_strokes_follow_selection_colors() {
		let theme = Theme::light();
		let config = ScaleConfig::default();
		let (color, width) = edge_stroke(&theme, &config, 3, EdgeEmphasis::Normal);
		assert_eq!((color.r, color.g, color.b), (153, 153, 153));
		assert_eq!(width, 3.0);
		assert_eq!(
			edge_stroke(&theme, &config, 3, EdgeEmphasis::Selected),
			(Color::rgb(0, 150, 136), 5.0)
		);
		assert_eq!(
			edge_stroke(&theme, &config, 12, EdgeEmphasis::Incident),
			(Color::rgb(244, 67, 54), 10.0)
		);
	}
}
