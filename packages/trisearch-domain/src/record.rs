use std::{
	collections::BTreeSet,
	fmt::{Display, Formatter, Result as FmtResult},
	str::FromStr,
};

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Classification {
	Public,
	Internal,
	Restricted,
}
impl Classification {
	pub fn as_str(self) -> &'static str {
		match self {
			Self::Public => "public",
			Self::Internal => "internal",
			Self::Restricted => "restricted",
		}
	}
}
impl Display for Classification {
	fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
		f.write_str(self.as_str())
	}
}
impl FromStr for Classification {
	type Err = String;

	fn from_str(raw: &str) -> Result<Self, Self::Err> {
		match raw.trim() {
			"public" => Ok(Self::Public),
			"internal" => Ok(Self::Internal),
			"restricted" => Ok(Self::Restricted),
			other => Err(format!("Unknown classification {other:?}.")),
		}
	}
}

/// Pointer back into the memory store for the thing a candidate was found in.
#[derive(Clone, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum RecordRef {
	Session(String),
	Fact(String),
	Node(String),
}
impl RecordRef {
	pub fn from_parts(kind: &str, id: impl Into<String>) -> Option<Self> {
		let id = id.into();

		match kind {
			"session" => Some(Self::Session(id)),
			"fact" => Some(Self::Fact(id)),
			"node" => Some(Self::Node(id)),
			_ => None,
		}
	}

	pub fn kind(&self) -> &'static str {
		match self {
			Self::Session(_) => "session",
			Self::Fact(_) => "fact",
			Self::Node(_) => "node",
		}
	}

	pub fn id(&self) -> &str {
		match self {
			Self::Session(id) | Self::Fact(id) | Self::Node(id) => id,
		}
	}
}

/// Access-relevant view of one memory item. Read fresh at gating time and never mutated here.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct MemoryRecord {
	pub item_id: String,
	pub tenant_id: String,
	pub owner_user_id: String,
	#[serde(default)]
	pub acl_groups: BTreeSet<String>,
	pub classification: Classification,
	#[serde(default)]
	pub project_id: Option<String>,
	#[serde(default)]
	pub tags: BTreeSet<String>,
	#[serde(with = "crate::time_serde")]
	pub updated_at: OffsetDateTime,
}

#[cfg(test)]
mod tests {
	use crate::record::{Classification, RecordRef};

	#[test]
	fn classification_parses_known_names_only() {
		assert_eq!("public".parse::<Classification>(), Ok(Classification::Public));
		assert_eq!(" restricted ".parse::<Classification>(), Ok(Classification::Restricted));
		assert!("secret".parse::<Classification>().is_err());
	}

	#[test]
	fn record_ref_serializes_with_kind_tag() {
		let value = serde_json::to_value(RecordRef::Fact("f-1".to_string()))
			.expect("Failed to serialize record ref.");

		assert_eq!(value, serde_json::json!({ "kind": "fact", "id": "f-1" }));
		assert_eq!(RecordRef::from_parts("node", "n-9"), Some(RecordRef::Node("n-9".to_string())));
		assert_eq!(RecordRef::from_parts("blob", "x"), None);
	}
}
