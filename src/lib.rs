//! friend-graph: Interactive force-directed visualization of a friend network.
//!
//! Friends are drawn as nodes and linked by the events they attended together.
//! The graph is derived reactively from the friend and event lists under an
//! event-type and year filter, laid out by a force simulation and rendered on
//! a canvas with drag, click selection, pan and zoom.

use leptos::prelude::*;
use leptos_meta::*;
use log::{Level, info, warn};
use wasm_bindgen::JsCast;
use web_sys::{HtmlScriptElement, Window};

pub mod components;

pub use components::friend_graph::{
	FilterState, ForceConfig, FriendData, FriendGraphCanvas, FriendStore, GraphStore, Theme, sample_data,
};

/// Failure to read the network embedded in the page.
#[derive(Debug, thiserror::Error)]
pub enum DataError {
	/// The page has no `<script id="graph-data">` element.
	#[error("no graph-data script element in the page")]
	MissingElement,
	/// The element's text is not a valid friend network document.
	#[error("failed to parse graph data: {0}")]
	Parse(#[from] serde_json::Error),
}

/// Initialize logging and panic hooks for the WASM target.
pub fn init_logging() {
	let _ = console_log::init_with_level(Level::Debug);
	console_error_panic_hook::set_once();
	info!("friend-graph: logging initialized");
}

/// Parses a network document of the form `{ friends: [...], events: [...] }`.
pub fn parse_graph_data(json_text: &str) -> Result<FriendData, DataError> {
	let data: FriendData = serde_json::from_str(json_text)?;
	info!(
		"friend-graph: loaded {} friends, {} events",
		data.friends.len(),
		data.events.len()
	);
	Ok(data)
}

fn graph_data_text() -> Option<String> {
	let window: Window = web_sys::window()?;
	let document = window.document()?;
	let element = document.get_element_by_id("graph-data")?;
	let script: HtmlScriptElement = element.dyn_into().ok()?;
	script.text().ok()
}

/// Load the network from a script element with id="graph-data".
pub fn load_graph_data() -> Result<FriendData, DataError> {
	let json_text = graph_data_text().ok_or(DataError::MissingElement)?;
	parse_graph_data(&json_text)
}

/// Embedded data, else the bundled sample, else an empty network.
fn initial_data() -> FriendData {
	load_graph_data()
		.or_else(|e| {
			warn!("friend-graph: {e}; showing sample network");
			sample_data().map_err(DataError::from)
		})
		.unwrap_or_else(|e| {
			warn!("friend-graph: {e}; starting empty");
			FriendData::default()
		})
}

/// Event-type picker and year range inputs.
#[component]
fn FilterBar(graph: GraphStore) -> impl IntoView {
	let year_input = move |ev: web_sys::Event| event_target_value(&ev).trim().parse::<i32>().ok();
	let on_from = move |ev: web_sys::Event| {
		let (_, to) = graph.filter().get_untracked().year_range();
		graph.set_year_range(year_input(ev), to);
	};
	let on_to = move |ev: web_sys::Event| {
		let (from, _) = graph.filter().get_untracked().year_range();
		graph.set_year_range(from, year_input(ev));
	};
	let year_value = move |upper: bool| {
		move || {
			let (from, to) = graph.filter().get().year_range();
			let bound = if upper { to } else { from };
			bound.map(|y| y.to_string()).unwrap_or_default()
		}
	};

	view! {
		<div class="filter-bar">
			<select on:change=move |ev| graph.set_type_filter(event_target_value(&ev))>
				{move || {
					let active = graph.filter().get().event_type().unwrap_or_default().to_string();
					graph
						.event_type_options()
						.into_iter()
						.map(|option| {
							let selected = option.value == active;
							view! {
								<option value=option.value selected=selected>
									{format!("{} ({})", option.label, option.count)}
								</option>
							}
						})
						.collect_view()
				}}
			</select>
			<input type="number" placeholder="From year" prop:value=year_value(false) on:change=on_from />
			<input type="number" placeholder="To year" prop:value=year_value(true) on:change=on_to />
			<button
				disabled=move || !graph.filter().get().is_active()
				on:click=move |_| graph.clear_filter()
			>
				"Clear"
			</button>
		</div>
	}
}

/// Details for the selected friend and/or connection.
#[component]
fn SelectionPanel(graph: GraphStore) -> impl IntoView {
	let friend = move || {
		graph.selected_node().map(|node| {
			let connected = graph.connected_friends(&node.id);
			view! {
				<section class="friend-details">
					<h2>{node.name.clone()}</h2>
					<p>{format!("{} events", node.event_count)}</p>
					<ul>
						{connected
							.into_iter()
							.map(|c| {
								view! {
									<li>{format!("{} ({} shared)", c.friend.name, c.shared_event_count)}</li>
								}
							})
							.collect_view()}
					</ul>
				</section>
			}
		})
	};
	let connection = move || {
		graph.selected_link().map(|edge| {
			view! {
				<section class="connection-details">
					<h2>{format!("{} & {}", edge.source.name, edge.target.name)}</h2>
					<p>{format!("{} shared events", edge.value())}</p>
					<ul>
						{edge
							.shared_events
							.iter()
							.map(|event| {
								view! {
									<li>
										{format!(
											"{} · {} · {}",
											event.title,
											event.date.format("%b %-d, %Y"),
											event.location,
										)}
									</li>
								}
							})
							.collect_view()}
					</ul>
				</section>
			}
		})
	};

	view! { <aside class="selection-panel">{friend} {connection}</aside> }
}

/// Main application component.
/// Loads the network from the DOM and renders the force-directed visualization.
#[component]
pub fn App() -> impl IntoView {
	provide_meta_context();

	let friends = FriendStore::new(initial_data());
	let graph = GraphStore::from_store(&friends);
	provide_context(friends);
	provide_context(graph);

	view! {
		<Html attr:lang="en" attr:dir="ltr" />
		<Title text="Friend Network" />
		<Meta charset="UTF-8" />
		<Meta name="viewport" content="width=device-width, initial-scale=1.0" />

		<div class="fullscreen-graph">
			<FriendGraphCanvas store=graph fullscreen=true />
			<div class="graph-overlay">
				<h1>"Friend Network"</h1>
				<p class="subtitle">"Click a friend or a connection for details. Drag to reposition, scroll to zoom."</p>
				<FilterBar graph=graph />
			</div>
			<SelectionPanel graph=graph />
		</div>
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn parses_embedded_document() {
		let data = parse_graph_data(
			r#"{"friends":[{"id":"f1","name":"A","photoUrl":"a.jpg"}],
			"events":[{"id":"e1","title":"t","date":"2023-01-01T00:00:00Z","location":"x","attendees":["f1"]}]}"#,
		)
		.unwrap();
		assert_eq!(data.friends.len(), 1);
		assert_eq!(data.events[0].attendees, vec!["f1"]);
	}

	#[test]
	fn malformed_document_is_a_parse_error() {
		assert!(matches!(parse_graph_data("{\"friends\": 3}"), Err(DataError::Parse(_))));
		assert!(matches!(parse_graph_data("not json"), Err(DataError::Parse(_))));
	}
}
