use std::{collections::HashMap, sync::Arc};

use sqlx::PgPool;

use trisearch_domain::{
	candidate::{self, Candidate, SourceType},
	graph::GraphPolicy,
	query::SourceQuery,
	record::MemoryRecord,
	similarity::VectorMetric,
};
use trisearch_storage::{graph, queries};

use crate::{
	BoxFuture, QueryEmbedder, RecordStore, SearchConfig, SourceAdapter, SourceError, Sources,
};

pub struct PgKeyword {
	pool: PgPool,
}
impl PgKeyword {
	pub fn new(pool: PgPool) -> Self {
		Self { pool }
	}
}
impl SourceAdapter for PgKeyword {
	fn source(&self) -> SourceType {
		SourceType::Keyword
	}

	fn retrieve<'a>(
		&'a self,
		query: SourceQuery<'a>,
	) -> BoxFuture<'a, Result<Vec<Candidate>, SourceError>> {
		Box::pin(async move {
			let mut conn = self.pool.acquire().await?;
			let items = queries::keyword_search(&mut conn, &query).await?;

			Ok(candidate::keyword_candidates(items, query.limit))
		})
	}
}

pub struct PgVector {
	pool: PgPool,
	embedder: Arc<dyn QueryEmbedder>,
	metric: VectorMetric,
}
impl PgVector {
	pub fn new(pool: PgPool, embedder: Arc<dyn QueryEmbedder>, metric: VectorMetric) -> Self {
		Self { pool, embedder, metric }
	}
}
impl SourceAdapter for PgVector {
	fn source(&self) -> SourceType {
		SourceType::Vector
	}

	fn retrieve<'a>(
		&'a self,
		query: SourceQuery<'a>,
	) -> BoxFuture<'a, Result<Vec<Candidate>, SourceError>> {
		Box::pin(async move {
			// Embed before taking a connection so a slow provider does not pin one.
			let vector = self.embedder.embed_query(query.text).await?;
			let mut conn = self.pool.acquire().await?;
			let items = queries::vector_search(&mut conn, &vector, self.metric, &query).await?;

			Ok(candidate::vector_candidates(items, query.limit))
		})
	}
}

pub struct PgGraph {
	pool: PgPool,
	policy: GraphPolicy,
}
impl PgGraph {
	pub fn new(pool: PgPool, policy: GraphPolicy) -> Self {
		Self { pool, policy }
	}
}
impl SourceAdapter for PgGraph {
	fn source(&self) -> SourceType {
		SourceType::Graph
	}

	fn retrieve<'a>(
		&'a self,
		query: SourceQuery<'a>,
	) -> BoxFuture<'a, Result<Vec<Candidate>, SourceError>> {
		Box::pin(async move {
			let mut conn = self.pool.acquire().await?;
			let items = graph::graph_search(&mut conn, &query, &self.policy).await?;

			Ok(candidate::graph_candidates(items, query.limit))
		})
	}
}

#[derive(Clone)]
pub struct PgRecordStore {
	pool: PgPool,
}
impl PgRecordStore {
	pub fn new(pool: PgPool) -> Self {
		Self { pool }
	}
}
impl RecordStore for PgRecordStore {
	fn get_records<'a>(
		&'a self,
		item_ids: &'a [String],
	) -> BoxFuture<'a, Result<HashMap<String, MemoryRecord>, SourceError>> {
		Box::pin(async move {
			let mut conn = self.pool.acquire().await?;

			Ok(queries::get_records(&mut conn, item_ids).await?)
		})
	}
}

/// Wires all three sources over one Postgres pool. The vector source is left out when no embedder
/// is given.
pub fn sources(pool: PgPool, embedder: Option<Arc<dyn QueryEmbedder>>, cfg: &SearchConfig) -> Sources {
	let mut sources = Sources::default()
		.with(Arc::new(PgKeyword::new(pool.clone())))
		.with(Arc::new(PgGraph::new(pool.clone(), cfg.graph.clone())));

	if let Some(embedder) = embedder {
		sources = sources.with(Arc::new(PgVector::new(pool, embedder, cfg.vector_metric)));
	}

	sources
}
