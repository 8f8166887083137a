//! Per-query audit events.
//!
//! Sinks are synchronous and must not block the search path. The raw query text never leaves the
//! orchestrator; events carry its digest instead.

use serde::Serialize;
use tokio::sync::mpsc::{self, Receiver, Sender, error::TrySendError};
use uuid::Uuid;

use trisearch_domain::{candidate::SourceType, identity::IdentityContext};

use crate::search::SearchStatus;

pub const AUDIT_TARGET: &str = "trisearch::audit";

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SearchEvent {
	pub trace_id: Uuid,
	pub identity: IdentityContext,
	pub query_hash: String,
	pub result_count: usize,
	pub rejected_count: usize,
	pub unavailable_sources: Vec<SourceType>,
	pub status: SearchStatus,
}

pub trait AuditSink
where
	Self: Send + Sync,
{
	fn emit(&self, event: SearchEvent);
}

/// Writes each event as one structured `info` line.
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingAuditSink;
impl AuditSink for TracingAuditSink {
	fn emit(&self, event: SearchEvent) {
		let unavailable =
			event.unavailable_sources.iter().map(|source| source.as_str()).collect::<Vec<_>>();
		let groups = event.identity.groups.iter().map(String::as_str).collect::<Vec<_>>();

		tracing::info!(
			target: AUDIT_TARGET,
			trace_id = %event.trace_id,
			tenant_id = %event.identity.tenant_id,
			user_id = %event.identity.user_id,
			groups = ?groups,
			project_id = ?event.identity.project_id,
			query_hash = %event.query_hash,
			result_count = event.result_count,
			rejected_count = event.rejected_count,
			unavailable_sources = ?unavailable,
			status = event.status.as_str(),
			"Search audited."
		);
	}
}

#[derive(Clone, Copy, Debug, Default)]
pub struct NoopAuditSink;
impl AuditSink for NoopAuditSink {
	fn emit(&self, _event: SearchEvent) {}
}

/// Hands events to a bounded channel. When the consumer falls behind, events are dropped with a
/// warning rather than stalling searches.
#[derive(Clone, Debug)]
pub struct ChannelAuditSink {
	tx: Sender<SearchEvent>,
}
impl ChannelAuditSink {
	pub fn new(capacity: usize) -> (Self, Receiver<SearchEvent>) {
		let (tx, rx) = mpsc::channel(capacity.max(1));

		(Self { tx }, rx)
	}
}
impl AuditSink for ChannelAuditSink {
	fn emit(&self, event: SearchEvent) {
		match self.tx.try_send(event) {
			Ok(()) => {},
			Err(TrySendError::Full(event)) => {
				tracing::warn!(trace_id = %event.trace_id, "Audit channel is full; dropping event.");
			},
			Err(TrySendError::Closed(event)) => {
				tracing::warn!(trace_id = %event.trace_id, "Audit channel is closed; dropping event.");
			},
		}
	}
}

/// Stable digest of the trimmed query text.
pub fn hash_query(query: &str) -> String {
	blake3::hash(query.trim().as_bytes()).to_hex().to_string()
}
