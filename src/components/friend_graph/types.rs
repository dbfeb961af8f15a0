//! Data structures flowing into and out of the friend graph.
//!
//! [`Friend`] and [`Event`] are the canonical records owned by the data store.
//! [`GraphNode`] and [`GraphEdge`] are derived from them on every change and
//! never persisted.

use std::cmp::Ordering;
use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Datelike, Utc};
use serde::{Deserialize, Serialize, Serializer};

/// A person in the network.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Friend {
	/// Unique, immutable identifier.
	pub id: String,
	pub name: String,
	pub photo_url: String,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub bio: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub join_date: Option<DateTime<Utc>>,
}

/// An activity attended by a set of friends.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
	pub id: String,
	pub title: String,
	pub date: DateTime<Utc>,
	pub location: String,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub description: Option<String>,
	/// Free-form category, e.g. "Social" or "Outdoor".
	#[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
	pub kind: Option<String>,
	/// Friend ids. Treated as a set; see [`Event::normalize_attendees`].
	#[serde(default)]
	pub attendees: Vec<String>,
}

impl Event {
	/// Calendar year the event took place in.
	pub fn year(&self) -> i32 {
		self.date.year()
	}

	pub fn has_attendee(&self, friend_id: &str) -> bool {
		self.attendees.iter().any(|a| a == friend_id)
	}

	/// Drops duplicate attendee ids, keeping first occurrences.
	pub fn normalize_attendees(&mut self) {
		let mut seen = std::collections::HashSet::new();
		self.attendees.retain(|id| seen.insert(id.clone()));
	}
}

/// A friend as rendered in the graph.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphNode {
	pub id: String,
	pub name: String,
	pub photo_url: String,
	/// Number of events passing the active filter that this friend attends.
	pub event_count: usize,
	/// Display and collision radius, grows with `event_count`.
	pub radius: f64,
}

/// Order-independent identity of a friend pair.
///
/// `EdgeKey::new("b", "a") == EdgeKey::new("a", "b")`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EdgeKey {
	low: String,
	high: String,
}

impl EdgeKey {
	pub fn new(a: &str, b: &str) -> Self {
		let (low, high) = match a.cmp(b) {
			Ordering::Greater => (b, a),
			_ => (a, b),
		};
		Self {
			low: low.to_string(),
			high: high.to_string(),
		}
	}

	/// Lexicographically smaller id.
	pub fn low(&self) -> &str {
		&self.low
	}

	/// Lexicographically larger id.
	pub fn high(&self) -> &str {
		&self.high
	}

	pub fn contains(&self, id: &str) -> bool {
		self.low == id || self.high == id
	}
}

impl fmt::Display for EdgeKey {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}-{}", self.low, self.high)
	}
}

/// A connection between two friends who attended at least one event together.
///
/// Endpoints are always resolved nodes. When serialized for external
/// consumers they are written as bare ids.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphEdge {
	#[serde(serialize_with = "node_id")]
	pub source: Arc<GraphNode>,
	#[serde(serialize_with = "node_id")]
	pub target: Arc<GraphNode>,
	pub shared_events: Vec<Event>,
	#[serde(skip)]
	key: EdgeKey,
}

impl GraphEdge {
	pub(crate) fn new(source: Arc<GraphNode>, target: Arc<GraphNode>, first: Event) -> Self {
		let key = EdgeKey::new(&source.id, &target.id);
		Self {
			source,
			target,
			shared_events: vec![first],
			key,
		}
	}

	/// Connection strength: the number of shared events.
	pub fn value(&self) -> usize {
		self.shared_events.len()
	}

	pub fn key(&self) -> &EdgeKey {
		&self.key
	}

	/// True if `node_id` is one of the two endpoints.
	pub fn is_incident(&self, node_id: &str) -> bool {
		self.key.contains(node_id)
	}

	/// Endpoint-set equality; edges are rebuilt on every derivation so
	/// reference identity is meaningless.
	pub fn same_pair(&self, other: &GraphEdge) -> bool {
		self.key == other.key
	}

	/// The endpoint that is not `node_id`, if `node_id` is an endpoint.
	pub fn other_end(&self, node_id: &str) -> Option<&Arc<GraphNode>> {
		if self.source.id == node_id {
			Some(&self.target)
		} else if self.target.id == node_id {
			Some(&self.source)
		} else {
			None
		}
	}
}

fn node_id<S: Serializer>(node: &Arc<GraphNode>, serializer: S) -> Result<S::Ok, S::Error> {
	serializer.serialize_str(&node.id)
}

/// One entry of the event-type picker.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct EventTypeOption {
	/// Filter value; empty for "all events".
	pub value: String,
	pub label: String,
	pub count: usize,
}

/// A neighbour of a friend together with the strength of the connection.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectedFriend {
	pub friend: Arc<GraphNode>,
	pub shared_event_count: usize,
}

/// The document embedded in the page or bundled as sample data.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct FriendData {
	#[serde(default)]
	pub friends: Vec<Friend>,
	#[serde(default)]
	pub events: Vec<Event>,
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn edge_key_is_order_independent() {
		assert_eq!(EdgeKey::new("b", "a"), EdgeKey::new("a", "b"));
		assert_eq!(EdgeKey::new("b", "a").low(), "a");
		assert_eq!(EdgeKey::new("a", "b").to_string(), "a-b");
	}

	#[test]
	fn normalize_attendees_removes_duplicates() {
		let mut event: Event = serde_json::from_str(
			r#"{"id":"e1","title":"t","date":"2023-05-20T00:00:00.000Z","location":"x",
			"attendees":["f1","f2","f1","f3","f2"]}"#,
		)
		.unwrap();
		event.normalize_attendees();
		assert_eq!(event.attendees, vec!["f1", "f2", "f3"]);
		assert_eq!(event.year(), 2023);
		assert_eq!(event.kind, None);
	}

	#[test]
	fn edge_serializes_endpoints_as_ids() {
		let node = |id: &str| {
			Arc::new(GraphNode {
				id: id.into(),
				name: id.into(),
				photo_url: String::new(),
				event_count: 1,
				radius: 28.0,
			})
		};
		let event: Event = serde_json::from_str(
			r#"{"id":"e1","title":"t","date":"2023-05-20T00:00:00Z","location":"x","type":"Social","attendees":["a","b"]}"#,
		)
		.unwrap();
		let edge = GraphEdge::new(node("a"), node("b"), event);
		let json = serde_json::to_value(&edge).unwrap();
		assert_eq!(json["source"], "a");
		assert_eq!(json["target"], "b");
		assert_eq!(json["sharedEvents"][0]["type"], "Social");
	}
}
