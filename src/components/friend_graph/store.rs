//! Reactive state for the friend graph.
//!
//! [`FriendStore`] owns the canonical friends and events. [`GraphStore`]
//! derives nodes and edges from them through memos, and holds the active
//! filter and selection. Both are `Copy` handles onto Leptos signals.

use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;

use leptos::prelude::*;
use log::{info, warn};

use super::derive::{RadiusScale, compute_edges, compute_nodes, connected_friends, event_type_options};
use super::filter::FilterState;
use super::selection::SelectionState;
use super::types::{ConnectedFriend, EdgeKey, Event, EventTypeOption, Friend, FriendData, GraphEdge, GraphNode};

/// In-memory friend and event records.
///
/// Every write normalises attendee lists to sets and notifies subscribers
/// before returning.
#[derive(Clone, Copy)]
pub struct FriendStore {
	friends: RwSignal<Vec<Friend>>,
	events: RwSignal<Vec<Event>>,
}

impl FriendStore {
	pub fn new(data: FriendData) -> Self {
		let FriendData { friends, mut events } = data;
		events.iter_mut().for_each(Event::normalize_attendees);
		Self {
			friends: RwSignal::new(friends),
			events: RwSignal::new(events),
		}
	}

	pub fn friends(&self) -> Signal<Vec<Friend>> {
		self.friends.into()
	}

	pub fn events(&self) -> Signal<Vec<Event>> {
		self.events.into()
	}

	/// Replaces the whole data set, e.g. after an import.
	pub fn replace_all(&self, data: FriendData) {
		let FriendData { friends, mut events } = data;
		events.iter_mut().for_each(Event::normalize_attendees);
		info!(
			"friend-graph: replacing data with {} friends, {} events",
			friends.len(),
			events.len()
		);
		self.friends.set(friends);
		self.events.set(events);
	}

	/// Adds `friend` and marks them as attending `event_ids`. Returns `false`
	/// if the id is already taken.
	pub fn add_friend(&self, friend: Friend, event_ids: &[String]) -> bool {
		if self.friends.with_untracked(|friends| friends.iter().any(|f| f.id == friend.id)) {
			warn!("friend-graph: friend {} already exists", friend.id);
			return false;
		}
		let id = friend.id.clone();
		self.friends.update(|friends| friends.push(friend));
		self.set_attendance(&id, event_ids);
		true
	}

	/// Replaces the friend with the same id and sets their attendance to
	/// exactly `event_ids`. Returns `false` for an unknown id.
	pub fn update_friend(&self, friend: Friend, event_ids: &[String]) -> bool {
		let id = friend.id.clone();
		let mut found = false;
		self.friends.update(|friends| {
			if let Some(existing) = friends.iter_mut().find(|f| f.id == friend.id) {
				*existing = friend;
				found = true;
			}
		});
		if !found {
			warn!("friend-graph: cannot update unknown friend {id}");
			return false;
		}
		self.set_attendance(&id, event_ids);
		true
	}

	/// Removes the friend and drops them from every attendee list.
	pub fn remove_friend(&self, id: &str) -> bool {
		let mut removed = false;
		self.friends.update(|friends| {
			let before = friends.len();
			friends.retain(|f| f.id != id);
			removed = friends.len() != before;
		});
		if removed {
			self.events.update(|events| {
				for event in events {
					event.attendees.retain(|a| a != id);
				}
			});
		}
		removed
	}

	pub fn add_event(&self, mut event: Event) -> bool {
		if self.events.with_untracked(|events| events.iter().any(|e| e.id == event.id)) {
			warn!("friend-graph: event {} already exists", event.id);
			return false;
		}
		event.normalize_attendees();
		self.events.update(|events| events.push(event));
		true
	}

	pub fn update_event(&self, mut event: Event) -> bool {
		event.normalize_attendees();
		let mut found = false;
		self.events.update(|events| {
			if let Some(existing) = events.iter_mut().find(|e| e.id == event.id) {
				*existing = event;
				found = true;
			}
		});
		found
	}

	pub fn remove_event(&self, id: &str) -> bool {
		let mut removed = false;
		self.events.update(|events| {
			let before = events.len();
			events.retain(|e| e.id != id);
			removed = events.len() != before;
		});
		removed
	}

	pub fn events_for_friend(&self, friend_id: &str) -> Vec<Event> {
		self.events.with(|events| {
			events
				.iter()
				.filter(|e| e.has_attendee(friend_id))
				.cloned()
				.collect()
		})
	}

	pub fn friends_for_event(&self, event_id: &str) -> Vec<Friend> {
		let attendees: HashSet<String> = self.events.with(|events| {
			events
				.iter()
				.find(|e| e.id == event_id)
				.map(|e| e.attendees.iter().cloned().collect())
				.unwrap_or_default()
		});
		self.friends.with(|friends| {
			friends
				.iter()
				.filter(|f| attendees.contains(&f.id))
				.cloned()
				.collect()
		})
	}

	/// Events attended by both friends, ignoring any filter.
	pub fn shared_events(&self, a: &str, b: &str) -> Vec<Event> {
		self.events.with(|events| {
			events
				.iter()
				.filter(|e| e.has_attendee(a) && e.has_attendee(b))
				.cloned()
				.collect()
		})
	}

	/// Unfiltered co-attendance count for every pair of attendee ids,
	/// including ids with no matching friend.
	pub fn connection_strengths(&self) -> BTreeMap<EdgeKey, usize> {
		self.events.with(|events| {
			let mut strengths = BTreeMap::new();
			for event in events {
				for (i, a) in event.attendees.iter().enumerate() {
					for b in &event.attendees[i + 1..] {
						if a != b {
							*strengths.entry(EdgeKey::new(a, b)).or_insert(0) += 1;
						}
					}
				}
			}
			strengths
		})
	}

	fn set_attendance(&self, friend_id: &str, event_ids: &[String]) {
		let wanted: HashSet<&str> = event_ids.iter().map(String::as_str).collect();
		self.events.update(|events| {
			for event in events {
				let attending = event.has_attendee(friend_id);
				let should = wanted.contains(event.id.as_str());
				if should && !attending {
					event.attendees.push(friend_id.to_string());
				} else if !should && attending {
					event.attendees.retain(|a| a != friend_id);
				}
			}
		});
	}
}

/// Derived graph plus the filter and selection driving it.
///
/// `nodes` and `edges` are memos; `edges` reads `nodes`, so an edge set is
/// never computed from a stale node set.
#[derive(Clone, Copy)]
pub struct GraphStore {
	events: Signal<Vec<Event>>,
	filter: RwSignal<FilterState>,
	selection: RwSignal<SelectionState>,
	nodes: Memo<Vec<Arc<GraphNode>>>,
	edges: Memo<Vec<GraphEdge>>,
}

impl GraphStore {
	pub fn new(friends: Signal<Vec<Friend>>, events: Signal<Vec<Event>>, scale: RadiusScale) -> Self {
		let filter = RwSignal::new(FilterState::new());
		let nodes = Memo::new(move |_| {
			friends.with(|friends| {
				events.with(|events| filter.with(|filter| compute_nodes(friends, events, filter, &scale)))
			})
		});
		let edges = Memo::new(move |_| {
			nodes.with(|nodes| events.with(|events| filter.with(|filter| compute_edges(nodes, events, filter))))
		});
		Self {
			events,
			filter,
			selection: RwSignal::new(SelectionState::new()),
			nodes,
			edges,
		}
	}

	/// Builds a graph over `store` with the default radius scale.
	pub fn from_store(store: &FriendStore) -> Self {
		Self::new(store.friends(), store.events(), RadiusScale::default())
	}

	pub fn nodes(&self) -> Memo<Vec<Arc<GraphNode>>> {
		self.nodes
	}

	pub fn edges(&self) -> Memo<Vec<GraphEdge>> {
		self.edges
	}

	pub fn filter(&self) -> Signal<FilterState> {
		self.filter.into()
	}

	pub fn set_type_filter(&self, kind: impl Into<String>) {
		let kind = kind.into();
		self.filter.update(|f| f.set_type_filter(kind));
		self.prune_selection();
	}

	pub fn set_year_range(&self, from: Option<i32>, to: Option<i32>) {
		self.filter.update(|f| f.set_year_range(from, to));
		self.prune_selection();
	}

	pub fn clear_filter(&self) {
		self.filter.update(FilterState::clear);
		self.prune_selection();
	}

	pub fn select_node(&self, node: Option<Arc<GraphNode>>) {
		self.prune_selection();
		self.selection.update(|s| s.select_node(node));
	}

	pub fn select_link(&self, link: Option<GraphEdge>) {
		self.prune_selection();
		self.selection.update(|s| s.select_link(link));
	}

	/// Drops a selected node or link the current derivation no longer has,
	/// so it cannot reappear when the filter or data change back.
	fn prune_selection(&self) {
		let (node_gone, link_gone) = self.selection.with_untracked(|s| {
			let node_gone = s.selected_node().is_some_and(|node| {
				self.nodes
					.with_untracked(|nodes| !nodes.iter().any(|n| n.id == node.id))
			});
			let link_gone = s.selected_link().is_some_and(|link| {
				self.edges
					.with_untracked(|edges| !edges.iter().any(|e| e.same_pair(link)))
			});
			(node_gone, link_gone)
		});
		if node_gone || link_gone {
			self.selection.update(|s| {
				if link_gone {
					s.select_link(None);
				}
				if node_gone {
					s.select_node(None);
				}
			});
		}
	}

	pub fn clear_selection(&self) {
		self.selection.update(SelectionState::clear);
	}

	/// Selects the node with `id`, or deselects it if it already is selected.
	pub fn on_node_click(&self, id: &str) {
		let Some(node) = self
			.nodes
			.with_untracked(|nodes| nodes.iter().find(|n| n.id == id).cloned())
		else {
			warn!("friend-graph: click on unknown node {id}");
			return;
		};
		let already = self.selection.with_untracked(|s| s.is_node_selected(id));
		self.select_node((!already).then_some(node));
	}

	/// Selects the edge between `a` and `b`, or deselects it if it already is selected.
	pub fn on_edge_click(&self, a: &str, b: &str) {
		let key = EdgeKey::new(a, b);
		let Some(edge) = self
			.edges
			.with_untracked(|edges| edges.iter().find(|e| e.key() == &key).cloned())
		else {
			warn!("friend-graph: click on unknown edge {key}");
			return;
		};
		let already = self.selection.with_untracked(|s| s.is_link_selected(&edge));
		self.select_link((!already).then_some(edge));
	}

	/// The selected node as it appears in the current derivation.
	///
	/// A node that no longer exists reads as `None`.
	pub fn selected_node(&self) -> Option<Arc<GraphNode>> {
		let id = self.selection.with(|s| s.selected_node().map(|n| n.id.clone()))?;
		self.nodes.with(|nodes| nodes.iter().find(|n| n.id == id).cloned())
	}

	/// The selected link as it appears in the current derivation.
	pub fn selected_link(&self) -> Option<GraphEdge> {
		let key = self.selection.with(|s| s.selected_link().map(|l| l.key().clone()))?;
		self.edges.with(|edges| edges.iter().find(|e| e.key() == &key).cloned())
	}

	/// Type picker entries over all events, ignoring the active filter.
	pub fn event_type_options(&self) -> Vec<EventTypeOption> {
		self.events.with(|events| event_type_options(events))
	}

	pub fn connected_friends(&self, id: &str) -> Vec<ConnectedFriend> {
		self.edges.with(|edges| connected_friends(edges, id))
	}

	/// Shared events between two friends under the active filter.
	pub fn shared_events(&self, a: &str, b: &str) -> Vec<Event> {
		let key = EdgeKey::new(a, b);
		self.edges.with(|edges| {
			edges
				.iter()
				.find(|e| e.key() == &key)
				.map(|e| e.shared_events.clone())
				.unwrap_or_default()
		})
	}
}
