//! Active event filter.

use super::types::Event;

/// Label used for events without a type. Selecting it as the type filter
/// matches exactly those events.
pub const UNCATEGORIZED: &str = "Uncategorized";

/// Event-type and year-range filter, combined with AND semantics.
///
/// Invalid ranges are corrected rather than rejected: `set_year_range(2024, 2022)`
/// stores `2022..=2024`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FilterState {
	event_type: Option<String>,
	year_from: Option<i32>,
	year_to: Option<i32>,
}

impl FilterState {
	pub fn new() -> Self {
		Self::default()
	}

	/// Restrict to a single event type. An empty string removes the restriction.
	pub fn set_type_filter(&mut self, kind: impl Into<String>) {
		let kind = kind.into();
		self.event_type = if kind.trim().is_empty() {
			None
		} else {
			Some(kind)
		};
	}

	/// Restrict to an inclusive year range. Either bound may be open.
	pub fn set_year_range(&mut self, from: Option<i32>, to: Option<i32>) {
		(self.year_from, self.year_to) = match (from, to) {
			(Some(a), Some(b)) if a > b => (Some(b), Some(a)),
			bounds => bounds,
		};
	}

	pub fn clear(&mut self) {
		*self = Self::default();
	}

	pub fn event_type(&self) -> Option<&str> {
		self.event_type.as_deref()
	}

	pub fn year_range(&self) -> (Option<i32>, Option<i32>) {
		(self.year_from, self.year_to)
	}

	pub fn is_active(&self) -> bool {
		self.event_type.is_some() || self.year_from.is_some() || self.year_to.is_some()
	}

	/// Whether `event` passes every active criterion.
	pub fn matches(&self, event: &Event) -> bool {
		let type_ok = match (&self.event_type, &event.kind) {
			(None, _) => true,
			(Some(wanted), Some(kind)) => wanted == kind,
			(Some(wanted), None) => wanted == UNCATEGORIZED,
		};
		if !type_ok {
			return false;
		}
		let year = event.year();
		self.year_from.is_none_or(|from| year >= from) && self.year_to.is_none_or(|to| year <= to)
	}
}
