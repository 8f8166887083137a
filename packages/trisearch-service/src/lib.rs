pub mod adapters;
pub mod audit;
pub mod embedder;
pub mod gating;
pub mod policy;
pub mod search;
pub mod state;

mod error;

pub use audit::{AuditSink, ChannelAuditSink, NoopAuditSink, SearchEvent, TracingAuditSink};
pub use error::{Error, Result, SourceError};
pub use policy::{SearchConfig, SourceToggles};
pub use search::{SearchMode, SearchRequest, SearchResponse, SearchStatus, TriSearch};
pub use state::QueryState;

use std::{collections::HashMap, future::Future, pin::Pin, sync::Arc};

use trisearch_domain::{
	candidate::{Candidate, SourceType},
	query::SourceQuery,
	record::MemoryRecord,
};

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// One retrieval channel. Returns candidates of its own source type ranked 1..=N with
/// N <= `query.limit`, or an error when its backing store cannot answer.
pub trait SourceAdapter
where
	Self: Send + Sync,
{
	fn source(&self) -> SourceType;

	fn retrieve<'a>(
		&'a self,
		query: SourceQuery<'a>,
	) -> BoxFuture<'a, Result<Vec<Candidate>, SourceError>>;
}

/// Authoritative access records, read at gating time.
pub trait RecordStore
where
	Self: Send + Sync,
{
	fn get_records<'a>(
		&'a self,
		item_ids: &'a [String],
	) -> BoxFuture<'a, Result<HashMap<String, MemoryRecord>, SourceError>>;
}

pub trait QueryEmbedder
where
	Self: Send + Sync,
{
	fn embed_query<'a>(&'a self, text: &'a str) -> BoxFuture<'a, Result<Vec<f32>, SourceError>>;
}

/// The adapters wired into an orchestrator. A missing adapter is treated like a disabled source.
#[derive(Clone, Default)]
pub struct Sources {
	pub keyword: Option<Arc<dyn SourceAdapter>>,
	pub vector: Option<Arc<dyn SourceAdapter>>,
	pub graph: Option<Arc<dyn SourceAdapter>>,
}
impl Sources {
	pub fn get(&self, source: SourceType) -> Option<&Arc<dyn SourceAdapter>> {
		match source {
			SourceType::Keyword => self.keyword.as_ref(),
			SourceType::Vector => self.vector.as_ref(),
			SourceType::Graph => self.graph.as_ref(),
		}
	}

	pub fn with(mut self, adapter: Arc<dyn SourceAdapter>) -> Self {
		match adapter.source() {
			SourceType::Keyword => self.keyword = Some(adapter),
			SourceType::Vector => self.vector = Some(adapter),
			SourceType::Graph => self.graph = Some(adapter),
		}

		self
	}
}
