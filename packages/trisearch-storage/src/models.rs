use time::OffsetDateTime;

use trisearch_domain::{
	candidate::ScoredItem,
	graph::LinkedItem,
	record::{Classification, MemoryRecord, RecordRef},
};

use crate::{Error, Result};

/// A memory item as written into a store: its access record, where it came from, its searchable
/// text, and an optional precomputed embedding.
#[derive(Clone, Debug, PartialEq)]
pub struct MemoryDocument {
	pub record: MemoryRecord,
	pub record_ref: RecordRef,
	pub title: String,
	pub body: String,
	pub embedding: Option<Vec<f32>>,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct GraphNode {
	pub node_id: String,
	pub tenant_id: String,
	pub label: String,
	pub item_id: Option<String>,
}

#[derive(Clone, Debug, Eq, Ord, PartialEq, PartialOrd)]
pub struct GraphEdge {
	pub tenant_id: String,
	pub src_node_id: String,
	pub dst_node_id: String,
	pub edge_type: String,
}

#[derive(Debug, sqlx::FromRow)]
pub struct MemoryRecordRow {
	pub item_id: String,
	pub tenant_id: String,
	pub project_id: Option<String>,
	pub owner_user_id: String,
	pub acl_groups: Vec<String>,
	pub classification: String,
	pub tags: Vec<String>,
	pub updated_at: OffsetDateTime,
}
impl MemoryRecordRow {
	pub fn into_record(self) -> Result<MemoryRecord> {
		let classification = self.classification.parse::<Classification>().map_err(|err| {
			Error::Decode(format!("memory_records.classification for {}: {err}", self.item_id))
		})?;

		Ok(MemoryRecord {
			item_id: self.item_id,
			tenant_id: self.tenant_id,
			owner_user_id: self.owner_user_id,
			acl_groups: self.acl_groups.into_iter().collect(),
			classification,
			project_id: self.project_id,
			tags: self.tags.into_iter().collect(),
			updated_at: self.updated_at,
		})
	}
}

#[derive(Debug, sqlx::FromRow)]
pub struct ScoredRow {
	pub item_id: String,
	pub record_kind: String,
	pub record_id: String,
	pub updated_at: OffsetDateTime,
	pub score: f32,
}
impl ScoredRow {
	pub fn into_scored(self) -> Result<ScoredItem> {
		let record = RecordRef::from_parts(&self.record_kind, self.record_id).ok_or_else(|| {
			Error::Decode(format!(
				"memory_records.record_kind {:?} for {}",
				self.record_kind, self.item_id
			))
		})?;

		Ok(ScoredItem {
			item_id: self.item_id,
			score: self.score,
			updated_at: self.updated_at,
			record,
			extra: (),
		})
	}
}

#[derive(Debug, sqlx::FromRow)]
pub struct LinkedItemRow {
	pub node_id: String,
	pub item_id: String,
	pub updated_at: OffsetDateTime,
}
impl From<LinkedItemRow> for LinkedItem {
	fn from(row: LinkedItemRow) -> Self {
		Self { node_id: row.node_id, item_id: row.item_id, updated_at: row.updated_at }
	}
}
