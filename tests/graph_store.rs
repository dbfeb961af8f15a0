//! Reactive derivation and selection through the public store API.

use chrono::{TimeZone, Utc};
use friend_graph::components::friend_graph::{EdgeKey, Event, Friend};
use friend_graph::{FriendData, FriendStore, GraphStore};
use leptos::prelude::*;

fn friend(id: &str, name: &str) -> Friend {
	Friend {
		id: id.into(),
		name: name.into(),
		photo_url: format!("{id}.jpg"),
		bio: None,
		join_date: None,
	}
}

fn event(id: &str, year: i32, kind: Option<&str>, attendees: &[&str]) -> Event {
	Event {
		id: id.into(),
		title: id.into(),
		date: Utc.with_ymd_and_hms(year, 6, 1, 12, 0, 0).unwrap(),
		location: "Park".into(),
		description: None,
		kind: kind.map(String::from),
		attendees: attendees.iter().map(|s| s.to_string()).collect(),
	}
}

/// Ann and Ben share two events, Ben and Cat one, Dan attends nothing.
fn stores() -> (FriendStore, GraphStore) {
	let friends = FriendStore::new(FriendData {
		friends: vec![friend("a", "Ann"), friend("b", "Ben"), friend("c", "Cat"), friend("d", "Dan")],
		events: vec![
			event("e1", 2022, Some("Social"), &["a", "b"]),
			event("e2", 2023, Some("Sports"), &["b", "a"]),
			event("e3", 2023, None, &["b", "c"]),
		],
	});
	let graph = GraphStore::from_store(&friends);
	(friends, graph)
}

fn edge_keys(graph: &GraphStore) -> Vec<EdgeKey> {
	graph.edges().get_untracked().iter().map(|e| e.key().clone()).collect()
}

#[test]
fn derives_nodes_and_edges() {
	let owner = Owner::new();
	owner.set();
	let (_, graph) = stores();

	let nodes = graph.nodes().get_untracked();
	let counts: Vec<(&str, usize)> = nodes.iter().map(|n| (n.id.as_str(), n.event_count)).collect();
	assert_eq!(counts, vec![("a", 2), ("b", 3), ("c", 1), ("d", 0)]);
	assert!(nodes[1].radius > nodes[0].radius);
	assert_eq!(nodes[3].radius, 25.0);

	let edges = graph.edges().get_untracked();
	assert_eq!(edge_keys(&graph), vec![EdgeKey::new("a", "b"), EdgeKey::new("b", "c")]);
	assert_eq!(edges[0].value(), 2);
	assert_eq!(edges[0].source.id, "a");
}

#[test]
fn mutations_recompute_the_graph() {
	let owner = Owner::new();
	owner.set();
	let (friends, graph) = stores();

	friends.add_event(event("e4", 2024, Some("Social"), &["c", "d"]));
	assert_eq!(graph.nodes().get_untracked()[3].event_count, 1);
	assert!(edge_keys(&graph).contains(&EdgeKey::new("c", "d")));

	friends.remove_friend("b");
	let ids: Vec<String> = graph.nodes().get_untracked().iter().map(|n| n.id.clone()).collect();
	assert_eq!(ids, vec!["a", "c", "d"]);
	assert_eq!(edge_keys(&graph), vec![EdgeKey::new("c", "d")]);
}

#[test]
fn filters_narrow_the_graph() {
	let owner = Owner::new();
	owner.set();
	let (_, graph) = stores();

	graph.set_type_filter("Sports");
	assert_eq!(edge_keys(&graph), vec![EdgeKey::new("a", "b")]);
	assert_eq!(graph.edges().get_untracked()[0].value(), 1);
	assert_eq!(graph.nodes().get_untracked().len(), 4);

	graph.set_type_filter("Uncategorized");
	assert_eq!(edge_keys(&graph), vec![EdgeKey::new("b", "c")]);

	graph.set_type_filter("");
	graph.set_year_range(Some(2023), None);
	assert_eq!(graph.shared_events("a", "b").len(), 1);

	graph.set_year_range(Some(2023), Some(2022));
	assert_eq!(graph.filter().get_untracked().year_range(), (Some(2022), Some(2023)));

	graph.clear_filter();
	assert!(!graph.filter().get_untracked().is_active());
	assert_eq!(graph.shared_events("b", "a").len(), 2);
}

#[test]
fn node_clicks_toggle_selection() {
	let owner = Owner::new();
	owner.set();
	let (_, graph) = stores();

	graph.on_node_click("a");
	assert_eq!(graph.selected_node().map(|n| n.id.clone()), Some("a".into()));
	graph.on_node_click("a");
	assert!(graph.selected_node().is_none());

	graph.on_node_click("nobody");
	assert!(graph.selected_node().is_none());
}

#[test]
fn edge_clicks_toggle_in_either_order() {
	let owner = Owner::new();
	owner.set();
	let (_, graph) = stores();

	graph.on_edge_click("b", "a");
	assert_eq!(graph.selected_link().map(|l| l.key().clone()), Some(EdgeKey::new("a", "b")));
	graph.on_edge_click("a", "b");
	assert!(graph.selected_link().is_none());

	graph.on_edge_click("a", "d");
	assert!(graph.selected_link().is_none());
}

#[test]
fn selecting_a_distant_node_drops_the_link() {
	let owner = Owner::new();
	owner.set();
	let (_, graph) = stores();

	graph.on_edge_click("a", "b");
	graph.on_node_click("b");
	assert!(graph.selected_link().is_some());

	graph.on_node_click("c");
	assert!(graph.selected_link().is_none());
	assert_eq!(graph.selected_node().map(|n| n.id.clone()), Some("c".into()));

	graph.on_edge_click("b", "c");
	graph.on_node_click("c");
	assert!(graph.selected_node().is_none());
	assert!(graph.selected_link().is_some());
}

#[test]
fn filtered_out_link_does_not_come_back() {
	let owner = Owner::new();
	owner.set();
	let (_, graph) = stores();

	graph.on_node_click("c");
	graph.on_edge_click("b", "c");
	graph.set_type_filter("Sports");
	assert!(graph.selected_link().is_none());

	graph.on_node_click("b");
	graph.clear_filter();
	assert_eq!(graph.selected_node().map(|n| n.id.clone()), Some("b".into()));
	assert!(graph.selected_link().is_none());
}

#[test]
fn selection_of_removed_data_reads_as_none() {
	let owner = Owner::new();
	owner.set();
	let (friends, graph) = stores();

	graph.on_node_click("c");
	graph.on_edge_click("b", "c");
	friends.remove_event("e3");
	assert!(graph.selected_link().is_none());
	assert_eq!(graph.selected_node().map(|n| n.event_count), Some(0));

	friends.remove_friend("c");
	assert!(graph.selected_node().is_none());
}

#[test]
fn neighbours_are_ordered_by_strength() {
	let owner = Owner::new();
	owner.set();
	let (_, graph) = stores();

	let neighbours: Vec<(String, usize)> = graph
		.connected_friends("b")
		.into_iter()
		.map(|c| (c.friend.name.clone(), c.shared_event_count))
		.collect();
	assert_eq!(neighbours, vec![("Ann".into(), 2), ("Cat".into(), 1)]);
	assert!(graph.connected_friends("d").is_empty());

	let options: Vec<(String, usize)> = graph
		.event_type_options()
		.into_iter()
		.map(|o| (o.value, o.count))
		.collect();
	assert_eq!(
		options,
		vec![
			(String::new(), 3),
			("Social".into(), 1),
			("Sports".into(), 1),
			("Uncategorized".into(), 1),
		]
	);
}
