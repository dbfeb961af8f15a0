//! Derivation of graph nodes and edges from friends, events and the active filter.
//!
//! Everything here is a pure function of its inputs. The reactive store calls
//! these inside memos so the derived sets are rebuilt whenever an input changes.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Arc;

use super::filter::{FilterState, UNCATEGORIZED};
use super::types::{ConnectedFriend, EdgeKey, Event, EventTypeOption, Friend, GraphEdge, GraphNode};

/// Maps an event count to a node radius.
///
/// `radius = clamp(base + count * per_event, min, max)`, which is
/// monotonically non-decreasing in `count` as long as `per_event >= 0`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RadiusScale {
	pub base: f64,
	pub per_event: f64,
	pub min: f64,
	pub max: f64,
}

impl Default for RadiusScale {
	fn default() -> Self {
		Self {
			base: 25.0,
			per_event: 3.0,
			min: 25.0,
			max: 60.0,
		}
	}
}

impl RadiusScale {
	pub fn radius(&self, event_count: usize) -> f64 {
		(self.base + event_count as f64 * self.per_event.max(0.0)).clamp(self.min, self.max)
	}
}

/// One node per friend, in friend order.
///
/// Friends without any matching event are kept (count 0, minimum radius) so
/// they stay visible as isolated nodes.
pub fn compute_nodes(
	friends: &[Friend],
	events: &[Event],
	filter: &FilterState,
	scale: &RadiusScale,
) -> Vec<Arc<GraphNode>> {
	let mut counts: HashMap<&str, usize> = HashMap::new();
	for event in events.iter().filter(|e| filter.matches(e)) {
		let attendees: HashSet<&str> = event.attendees.iter().map(String::as_str).collect();
		for id in attendees {
			*counts.entry(id).or_insert(0) += 1;
		}
	}

	friends
		.iter()
		.map(|friend| {
			let event_count = counts.get(friend.id.as_str()).copied().unwrap_or(0);
			Arc::new(GraphNode {
				id: friend.id.clone(),
				name: friend.name.clone(),
				photo_url: friend.photo_url.clone(),
				event_count,
				radius: scale.radius(event_count),
			})
		})
		.collect()
}

/// One edge per unordered pair of nodes sharing at least one matching event.
///
/// Attendees missing from `nodes` never produce an edge, so every endpoint is
/// a member of `nodes`. Output is ordered by [`EdgeKey`], which makes it
/// independent of friend enumeration order.
///
/// Cost is O(events × attendees²). That is fine for a personal network of a
/// few hundred people; large gatherings dominate the cost and are not split
/// up or sampled.
pub fn compute_edges(nodes: &[Arc<GraphNode>], events: &[Event], filter: &FilterState) -> Vec<GraphEdge> {
	let by_id: HashMap<&str, &Arc<GraphNode>> = nodes.iter().map(|n| (n.id.as_str(), n)).collect();
	let mut edges: BTreeMap<EdgeKey, GraphEdge> = BTreeMap::new();

	for event in events.iter().filter(|e| filter.matches(e)) {
		let mut seen = HashSet::new();
		let present: Vec<&Arc<GraphNode>> = event
			.attendees
			.iter()
			.filter(|id| seen.insert(id.as_str()))
			.filter_map(|id| by_id.get(id.as_str()).copied())
			.collect();

		for (i, a) in present.iter().enumerate() {
			for b in &present[i + 1..] {
				let key = EdgeKey::new(&a.id, &b.id);
				match edges.get_mut(&key) {
					Some(edge) => edge.shared_events.push(event.clone()),
					None => {
						let (source, target) = if a.id <= b.id { (a, b) } else { (b, a) };
						let edge = GraphEdge::new(Arc::clone(source), Arc::clone(target), event.clone());
						edges.insert(key, edge);
					}
				}
			}
		}
	}

	edges.into_values().collect()
}

/// Ids of nodes with no incident edge.
pub fn isolated_ids<'a>(nodes: &'a [Arc<GraphNode>], edges: &[GraphEdge]) -> HashSet<&'a str> {
	let connected: HashSet<&str> = edges
		.iter()
		.flat_map(|e| [e.source.id.as_str(), e.target.id.as_str()])
		.collect();
	nodes
		.iter()
		.map(|n| n.id.as_str())
		.filter(|id| !connected.contains(id))
		.collect()
}

/// Options for the event-type picker: "All Events" first, then every type
/// present (untyped events grouped under [`UNCATEGORIZED`]) sorted by label.
pub fn event_type_options(events: &[Event]) -> Vec<EventTypeOption> {
	let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
	for event in events {
		*counts.entry(event.kind.as_deref().unwrap_or(UNCATEGORIZED)).or_insert(0) += 1;
	}

	let mut options = vec![EventTypeOption {
		value: String::new(),
		label: "All Events".into(),
		count: events.len(),
	}];
	options.extend(counts.into_iter().map(|(kind, count)| EventTypeOption {
		value: kind.to_string(),
		label: kind.to_string(),
		count,
	}));
	options
}

/// Neighbours of `friend_id`, strongest connection first, ties by name.
pub fn connected_friends(edges: &[GraphEdge], friend_id: &str) -> Vec<ConnectedFriend> {
	let mut connected: Vec<ConnectedFriend> = edges
		.iter()
		.filter_map(|edge| {
			edge.other_end(friend_id).map(|other| ConnectedFriend {
				friend: Arc::clone(other),
				shared_event_count: edge.value(),
			})
		})
		.collect();
	connected.sort_by(|a, b| {
		b.shared_event_count
			.cmp(&a.shared_event_count)
			.then_with(|| a.friend.name.cmp(&b.friend.name))
	});
	connected
}

#[cfg(test)]
mod tests {
	use chrono::{TimeZone, Utc};

	use super::*;

	fn friend(id: &str) -> Friend {
		Friend {
			id: id.into(),
			name: id.to_uppercase(),
			photo_url: format!("https://example.org/{id}.jpg"),
			bio: None,
			join_date: None,
		}
	}

	fn event(id: &str, kind: &str, year: i32, attendees: &[&str]) -> Event {
		Event {
			id: id.into(),
			title: id.into(),
			date: Utc.with_ymd_and_hms(year, 3, 1, 0, 0, 0).unwrap(),
			location: "here".into(),
			description: None,
			kind: Some(kind.into()),
			attendees: attendees.iter().map(|s| s.to_string()).collect(),
		}
	}

	fn count_of(nodes: &[Arc<GraphNode>], id: &str) -> usize {
		nodes.iter().find(|n| n.id == id).unwrap().event_count
	}

	fn pair(edges: &[GraphEdge], a: &str, b: &str) -> Option<GraphEdge> {
		edges.iter().find(|e| e.key() == &EdgeKey::new(a, b)).cloned()
	}

	#[test]
	fn three_friends_two_events() {
		let friends = vec![friend("a"), friend("b"), friend("c")];
		let events = vec![
			event("e1", "Social", 2023, &["a", "b"]),
			event("e2", "Social", 2023, &["a", "b", "c"]),
		];
		let filter = FilterState::new();
		let nodes = compute_nodes(&friends, &events, &filter, &RadiusScale::default());
		assert_eq!(count_of(&nodes, "a"), 2);
		assert_eq!(count_of(&nodes, "b"), 2);
		assert_eq!(count_of(&nodes, "c"), 1);

		let edges = compute_edges(&nodes, &events, &filter);
		assert_eq!(edges.len(), 3);
		let ab = pair(&edges, "a", "b").unwrap();
		assert_eq!(ab.value(), 2);
		let ids: Vec<&str> = ab.shared_events.iter().map(|e| e.id.as_str()).collect();
		assert_eq!(ids, vec!["e1", "e2"]);
		assert_eq!(pair(&edges, "a", "c").unwrap().value(), 1);
		assert_eq!(pair(&edges, "b", "c").unwrap().value(), 1);
	}

	#[test]
	fn filter_matching_nothing_keeps_zero_count_nodes() {
		let friends = vec![friend("a"), friend("b"), friend("c")];
		let events = vec![
			event("e1", "Social", 2023, &["a", "b"]),
			event("e2", "Social", 2023, &["a", "b", "c"]),
		];
		let mut filter = FilterState::new();
		filter.set_type_filter("X");
		let scale = RadiusScale::default();
		let nodes = compute_nodes(&friends, &events, &filter, &scale);
		assert_eq!(nodes.len(), 3);
		assert!(nodes.iter().all(|n| n.event_count == 0 && n.radius == scale.min));
		assert!(compute_edges(&nodes, &events, &filter).is_empty());
	}

	#[test]
	fn year_range_limits_counts_and_edges() {
		let friends = vec![friend("a"), friend("b"), friend("c")];
		let events = vec![
			event("e22", "Social", 2022, &["a", "b", "c"]),
			event("e23", "Social", 2023, &["a", "b"]),
			event("e24", "Social", 2024, &["b", "c"]),
		];
		let mut filter = FilterState::new();
		filter.set_year_range(Some(2023), Some(2023));
		let nodes = compute_nodes(&friends, &events, &filter, &RadiusScale::default());
		assert_eq!(count_of(&nodes, "a"), 1);
		assert_eq!(count_of(&nodes, "b"), 1);
		assert_eq!(count_of(&nodes, "c"), 0);

		let edges = compute_edges(&nodes, &events, &filter);
		assert_eq!(edges.len(), 1);
		assert_eq!(edges[0].shared_events[0].id, "e23");
	}

	#[test]
	fn unknown_attendees_and_duplicates_are_ignored() {
		let friends = vec![friend("a"), friend("b")];
		let events = vec![event("e1", "Social", 2023, &["a", "ghost", "b", "a"])];
		let filter = FilterState::new();
		let nodes = compute_nodes(&friends, &events, &filter, &RadiusScale::default());
		assert_eq!(count_of(&nodes, "a"), 1);

		let edges = compute_edges(&nodes, &events, &filter);
		assert_eq!(edges.len(), 1);
		assert_eq!(edges[0].value(), 1);
		let ids: HashSet<&str> = nodes.iter().map(|n| n.id.as_str()).collect();
		for edge in &edges {
			assert!(ids.contains(edge.source.id.as_str()));
			assert!(ids.contains(edge.target.id.as_str()));
		}
	}

	#[test]
	fn edges_do_not_depend_on_friend_order() {
		let mut friends = vec![friend("a"), friend("b"), friend("c"), friend("d")];
		let events = vec![
			event("e1", "Social", 2023, &["d", "a", "c"]),
			event("e2", "Food", 2023, &["b", "c"]),
			event("e3", "Food", 2024, &["c", "a", "b"]),
		];
		let filter = FilterState::new();
		let scale = RadiusScale::default();
		let forward = compute_edges(&compute_nodes(&friends, &events, &filter, &scale), &events, &filter);
		friends.reverse();
		let backward = compute_edges(&compute_nodes(&friends, &events, &filter, &scale), &events, &filter);
		assert_eq!(forward, backward);
		for edge in &forward {
			assert!(edge.source.id < edge.target.id);
			assert_eq!(edge.value(), edge.shared_events.len());
		}
	}

	#[test]
	fn derivation_is_idempotent() {
		let friends = vec![friend("a"), friend("b"), friend("c")];
		let events = vec![
			event("e1", "Social", 2023, &["a", "b"]),
			event("e2", "Outdoor", 2023, &["a", "c"]),
		];
		let mut filter = FilterState::new();
		filter.set_type_filter("Outdoor");
		let scale = RadiusScale::default();
		let first = compute_nodes(&friends, &events, &filter, &scale);
		let second = compute_nodes(&friends, &events, &filter, &scale);
		assert_eq!(first, second);
		assert_eq!(compute_edges(&first, &events, &filter), compute_edges(&second, &events, &filter));
	}

	#[test]
	fn radius_is_monotonic_and_clamped() {
		let scale = RadiusScale::default();
		let mut previous = scale.radius(0);
		assert_eq!(previous, scale.min);
		for count in 1..100 {
			let r = scale.radius(count);
			assert!(r >= previous);
			assert!((scale.min..=scale.max).contains(&r));
			previous = r;
		}
		assert_eq!(scale.radius(1_000), scale.max);
	}

	#[test]
	fn isolated_nodes_are_reported() {
		let friends = vec![friend("a"), friend("b"), friend("c")];
		let events = vec![event("e1", "Social", 2023, &["a", "b"])];
		let filter = FilterState::new();
		let nodes = compute_nodes(&friends, &events, &filter, &RadiusScale::default());
		let edges = compute_edges(&nodes, &events, &filter);
		let isolated = isolated_ids(&nodes, &edges);
		assert_eq!(isolated.len(), 1);
		assert!(isolated.contains("c"));
	}

	#[test]
	fn type_options_are_sorted_with_all_first() {
		let mut untyped = event("e3", "x", 2023, &[]);
		untyped.kind = None;
		let events = vec![
			event("e1", "Social", 2023, &[]),
			event("e2", "Food", 2023, &[]),
			untyped,
			event("e4", "Social", 2023, &[]),
		];
		let options = event_type_options(&events);
		let labels: Vec<&str> = options.iter().map(|o| o.label.as_str()).collect();
		assert_eq!(labels, vec!["All Events", "Food", "Social", UNCATEGORIZED]);
		assert_eq!(options[0].count, 4);
		assert_eq!(options[0].value, "");
		assert_eq!(options[2].count, 2);
	}

	#[test]
	fn connected_friends_strongest_first() {
		let friends = vec![friend("a"), friend("b"), friend("c")];
		let events = vec![
			event("e1", "Social", 2023, &["a", "b"]),
			event("e2", "Social", 2023, &["a", "c"]),
			event("e3", "Social", 2023, &["a", "c"]),
		];
		let filter = FilterState::new();
		let nodes = compute_nodes(&friends, &events, &filter, &RadiusScale::default());
		let edges = compute_edges(&nodes, &events, &filter);
		let connected = connected_friends(&edges, "a");
		assert_eq!(connected.len(), 2);
		assert_eq!(connected[0].friend.id, "c");
		assert_eq!(connected[0].shared_event_count, 2);
		assert_eq!(connected[1].friend.id, "b");
		assert!(connected_friends(&edges, "nobody").is_empty());
	}
}
