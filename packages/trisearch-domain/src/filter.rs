use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// Optional narrowing applied by every source before ranking.
///
/// A record matches when it carries every requested tag and its `updated_at` falls inside the
/// time range. `from` is inclusive and `to` is exclusive.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct FilterSet {
	#[serde(default)]
	pub tags: BTreeSet<String>,
	#[serde(default)]
	pub time_range: Option<TimeRange>,
}
impl FilterSet {
	pub fn is_empty(&self) -> bool {
		self.tags.is_empty() && self.time_range.is_none()
	}

	pub fn matches(&self, tags: &BTreeSet<String>, updated_at: OffsetDateTime) -> bool {
		if !self.tags.is_subset(tags) {
			return false;
		}

		self.time_range.as_ref().map(|range| range.contains(updated_at)).unwrap_or(true)
	}

	pub fn from(&self) -> Option<OffsetDateTime> {
		self.time_range.as_ref().and_then(|range| range.from)
	}

	pub fn to(&self) -> Option<OffsetDateTime> {
		self.time_range.as_ref().and_then(|range| range.to)
	}

	pub fn tag_list(&self) -> Vec<String> {
		self.tags.iter().cloned().collect()
	}

	/// Returns a description of the first problem found, if any.
	pub fn validate(&self) -> Option<String> {
		if self.tags.iter().any(|tag| tag.trim().is_empty()) {
			return Some("filters.tags must not contain empty entries.".to_string());
		}
		if let Some(range) = self.time_range.as_ref()
			&& let (Some(from), Some(to)) = (range.from, range.to)
			&& from > to
		{
			return Some("filters.time_range.from must not be after filters.time_range.to.".to_string());
		}

		None
	}
}

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct TimeRange {
	#[serde(default, with = "crate::time_serde::option")]
	pub from: Option<OffsetDateTime>,
	#[serde(default, with = "crate::time_serde::option")]
	pub to: Option<OffsetDateTime>,
}
impl TimeRange {
	pub fn contains(&self, at: OffsetDateTime) -> bool {
		if let Some(from) = self.from
			&& at < from
		{
			return false;
		}
		if let Some(to) = self.to
			&& at >= to
		{
			return false;
		}

		true
	}
}
