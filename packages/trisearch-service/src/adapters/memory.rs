use std::{collections::HashMap, sync::Arc};

use trisearch_domain::{
	candidate::{self, Candidate, SourceType},
	graph::GraphPolicy,
	query::SourceQuery,
	record::MemoryRecord,
	similarity::VectorMetric,
};
use trisearch_storage::memory::InMemoryStore;

use crate::{
	BoxFuture, QueryEmbedder, RecordStore, SearchConfig, SourceAdapter, SourceError, Sources,
};

pub struct MemoryKeyword {
	store: Arc<InMemoryStore>,
}
impl MemoryKeyword {
	pub fn new(store: Arc<InMemoryStore>) -> Self {
		Self { store }
	}
}
impl SourceAdapter for MemoryKeyword {
	fn source(&self) -> SourceType {
		SourceType::Keyword
	}

	fn retrieve<'a>(
		&'a self,
		query: SourceQuery<'a>,
	) -> BoxFuture<'a, Result<Vec<Candidate>, SourceError>> {
		Box::pin(async move {
			Ok(candidate::keyword_candidates(self.store.keyword_search(&query), query.limit))
		})
	}
}

pub struct MemoryVector {
	store: Arc<InMemoryStore>,
	embedder: Arc<dyn QueryEmbedder>,
	metric: VectorMetric,
}
impl MemoryVector {
	pub fn new(
		store: Arc<InMemoryStore>,
		embedder: Arc<dyn QueryEmbedder>,
		metric: VectorMetric,
	) -> Self {
		Self { store, embedder, metric }
	}
}
impl SourceAdapter for MemoryVector {
	fn source(&self) -> SourceType {
		SourceType::Vector
	}

	fn retrieve<'a>(
		&'a self,
		query: SourceQuery<'a>,
	) -> BoxFuture<'a, Result<Vec<Candidate>, SourceError>> {
		Box::pin(async move {
			let vector = self.embedder.embed_query(query.text).await?;
			let items = self.store.vector_search(&vector, self.metric, &query);

			Ok(candidate::vector_candidates(items, query.limit))
		})
	}
}

pub struct MemoryGraph {
	store: Arc<InMemoryStore>,
	policy: GraphPolicy,
}
impl MemoryGraph {
	pub fn new(store: Arc<InMemoryStore>, policy: GraphPolicy) -> Self {
		Self { store, policy }
	}
}
impl SourceAdapter for MemoryGraph {
	fn source(&self) -> SourceType {
		SourceType::Graph
	}

	fn retrieve<'a>(
		&'a self,
		query: SourceQuery<'a>,
	) -> BoxFuture<'a, Result<Vec<Candidate>, SourceError>> {
		Box::pin(async move {
			let items = self.store.graph_search(&query, &self.policy);

			Ok(candidate::graph_candidates(items, query.limit))
		})
	}
}

impl RecordStore for InMemoryStore {
	fn get_records<'a>(
		&'a self,
		item_ids: &'a [String],
	) -> BoxFuture<'a, Result<HashMap<String, MemoryRecord>, SourceError>> {
		Box::pin(async move { Ok(InMemoryStore::get_records(self, item_ids)) })
	}
}

/// Wires all three sources over one in-memory store. The vector source is left out when no
/// embedder is given.
pub fn sources(
	store: Arc<InMemoryStore>,
	embedder: Option<Arc<dyn QueryEmbedder>>,
	cfg: &SearchConfig,
) -> Sources {
	let mut sources = Sources::default()
		.with(Arc::new(MemoryKeyword::new(store.clone())))
		.with(Arc::new(MemoryGraph::new(store.clone(), cfg.graph.clone())));

	if let Some(embedder) = embedder {
		sources = sources.with(Arc::new(MemoryVector::new(store, embedder, cfg.vector_metric)));
	}

	sources
}
