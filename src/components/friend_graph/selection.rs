//! Node and link selection with the co-selection rule.

use std::sync::Arc;

use super::types::{GraphEdge, GraphNode};

/// Currently selected node and/or link.
///
/// A node and a link may be selected together only while the link touches
/// the node. Selecting a different node drops a link that does not touch it;
/// deselecting the node leaves the link alone.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SelectionState {
	node: Option<Arc<GraphNode>>,
	link: Option<GraphEdge>,
}

impl SelectionState {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn select_node(&mut self, node: Option<Arc<GraphNode>>) {
		if let Some(selected) = &node {
			if self
				.link
				.as_ref()
				.is_some_and(|link| !link.is_incident(&selected.id))
			{
				self.link = None;
			}
		}
		self.node = node;
	}

	/// Sets the link unconditionally; the node selection is untouched.
	pub fn select_link(&mut self, link: Option<GraphEdge>) {
		self.link = link;
	}

	pub fn clear(&mut self) {
		self.node = None;
		self.link = None;
	}

	pub fn selected_node(&self) -> Option<&Arc<GraphNode>> {
		self.node.as_ref()
	}

	pub fn selected_link(&self) -> Option<&GraphEdge> {
		self.link.as_ref()
	}

	pub fn is_node_selected(&self, id: &str) -> bool {
		self.node.as_ref().is_some_and(|n| n.id == id)
	}

	/// Compares by endpoint pair, not by reference.
	pub fn is_link_selected(&self, edge: &GraphEdge) -> bool {
		self.link.as_ref().is_some_and(|l| l.same_pair(edge))
	}
}

#[cfg(test)]
mod tests {
	use chrono::Utc;

	use super::*;
	use crate::components::friend_graph::types::Event;

	fn node(id: &str) -> Arc<GraphNode> {
		Arc::new(GraphNode {
			id: id.into(),
			name: id.into(),
			photo_url: String::new(),
			event_count: 1,
			radius: 28.0,
		})
	}

	fn edge(a: &str, b: &str) -> GraphEdge {
		let event = Event {
			id: "e1".into(),
			title: "t".into(),
			date: Utc::now(),
			location: "x".into(),
			description: None,
			kind: None,
			attendees: vec![a.into(), b.into()],
		};
		GraphEdge::new(node(a), node(b), event)
	}

	#[test]
	fn selecting_unrelated_node_clears_link() {
		let mut selection = SelectionState::new();
		selection.select_node(Some(node("a")));
		selection.select_link(Some(edge("a", "b")));
		selection.select_node(Some(node("c")));
		assert!(selection.selected_link().is_none());
		assert!(selection.is_node_selected("c"));
	}

	#[test]
	fn selecting_incident_node_keeps_link() {
		let mut selection = SelectionState::new();
		selection.select_link(Some(edge("a", "b")));
		selection.select_node(Some(node("b")));
		assert!(selection.is_link_selected(&edge("b", "a")));
		assert!(selection.is_node_selected("b"));
	}

	#[test]
	fn deselecting_node_leaves_link() {
		let mut selection = SelectionState::new();
		selection.select_node(Some(node("a")));
		selection.select_link(Some(edge("a", "b")));
		selection.select_node(None);
		assert!(selection.selected_node().is_none());
		assert!(selection.selected_link().is_some());
	}

	#[test]
	fn selecting_link_keeps_node() {
		let mut selection = SelectionState::new();
		selection.select_node(Some(node("c")));
		selection.select_link(Some(edge("a", "b")));
		assert!(selection.is_node_selected("c"));
		assert!(selection.is_link_selected(&edge("a", "b")));

		selection.clear();
		assert_eq!(selection, SelectionState::default());
	}

	#[test]
	fn link_identity_is_the_endpoint_pair() {
		let mut selection = SelectionState::new();
		selection.select_link(Some(edge("a", "b")));
		assert!(selection.is_link_selected(&edge("b", "a")));
		assert!(!selection.is_link_selected(&edge("a", "c")));
	}
}
