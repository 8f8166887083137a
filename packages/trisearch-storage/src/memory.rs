//! In-process store with the same read operations as the Postgres backend.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use trisearch_domain::{
	candidate::{GraphReach, ScoredItem},
	graph::{self, GraphPolicy, GraphWalk, LinkedItem},
	query::SourceQuery,
	record::MemoryRecord,
	similarity::VectorMetric,
	text,
};

use crate::{
	Error, Result,
	models::{GraphEdge, GraphNode, MemoryDocument},
};

#[derive(Debug, Default)]
pub struct InMemoryStore {
	documents: BTreeMap<String, MemoryDocument>,
	nodes: BTreeMap<String, GraphNode>,
	edges: BTreeSet<GraphEdge>,
}
impl InMemoryStore {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn len(&self) -> usize {
		self.documents.len()
	}

	pub fn is_empty(&self) -> bool {
		self.documents.is_empty()
	}

	pub fn upsert_document(&mut self, doc: MemoryDocument) -> Result<()> {
		if doc.record.item_id.trim().is_empty() {
			return Err(Error::InvalidArgument("item_id must not be empty".to_string()));
		}
		if doc.record.tenant_id.trim().is_empty() {
			return Err(Error::InvalidArgument("tenant_id must not be empty".to_string()));
		}
		if doc.embedding.as_ref().is_some_and(Vec::is_empty) {
			return Err(Error::InvalidArgument("embedding must not be empty".to_string()));
		}

		self.documents.insert(doc.record.item_id.clone(), doc);

		Ok(())
	}

	pub fn remove_document(&mut self, item_id: &str) -> Option<MemoryDocument> {
		for node in self.nodes.values_mut() {
			if node.item_id.as_deref() == Some(item_id) {
				node.item_id = None;
			}
		}

		self.documents.remove(item_id)
	}

	pub fn upsert_node(&mut self, node: GraphNode) -> Result<()> {
		if node.node_id.trim().is_empty() {
			return Err(Error::InvalidArgument("graph node_id must not be empty".to_string()));
		}
		if let Some(item_id) = node.item_id.as_deref()
			&& !self.documents.contains_key(item_id)
		{
			return Err(Error::NotFound(format!("memory item {item_id}")));
		}

		self.nodes.insert(node.node_id.clone(), node);

		Ok(())
	}

	pub fn insert_edge(&mut self, edge: GraphEdge) -> Result<()> {
		if edge.edge_type.trim().is_empty() {
			return Err(Error::InvalidArgument("graph edge_type must not be empty".to_string()));
		}

		for node_id in [&edge.src_node_id, &edge.dst_node_id] {
			if !self.nodes.contains_key(node_id) {
				return Err(Error::NotFound(format!("graph node {node_id}")));
			}
		}

		self.edges.insert(edge);

		Ok(())
	}

	pub fn get_records(&self, item_ids: &[String]) -> HashMap<String, MemoryRecord> {
		item_ids
			.iter()
			.filter_map(|item_id| self.documents.get(item_id))
			.map(|doc| (doc.record.item_id.clone(), doc.record.clone()))
			.collect()
	}

	pub fn keyword_search(&self, query: &SourceQuery<'_>) -> Vec<ScoredItem> {
		self.visible(query)
			.filter_map(|doc| {
				let score = text::keyword_score(query.text, &doc.title, &doc.body)?;

				Some(scored(doc, score))
			})
			.collect()
	}

	pub fn vector_search(
		&self,
		vector: &[f32],
		metric: VectorMetric,
		query: &SourceQuery<'_>,
	) -> Vec<ScoredItem> {
		self.visible(query)
			.filter_map(|doc| {
				let embedding = doc.embedding.as_deref()?;
				let score = metric.score(vector, embedding)?;

				Some(scored(doc, score))
			})
			.collect()
	}

	pub fn graph_search(
		&self,
		query: &SourceQuery<'_>,
		policy: &GraphPolicy,
	) -> Vec<ScoredItem<GraphReach>> {
		let tokens = text::tokenize(query.text);

		if tokens.is_empty() {
			return Vec::new();
		}

		let mut seeds = self
			.nodes
			.values()
			.filter(|node| query.tenant_allows(&node.tenant_id))
			.filter(|node| text::label_matches(&tokens, &node.label))
			.map(|node| (text::tokenize(&node.label).len(), node.node_id.clone()))
			.collect::<Vec<_>>();

		seeds.sort_by(|left, right| right.0.cmp(&left.0).then_with(|| left.1.cmp(&right.1)));
		seeds.truncate(policy.max_seeds);

		if seeds.is_empty() {
			return Vec::new();
		}

		let mut walk = GraphWalk::new(seeds.into_iter().map(|(_, node_id)| node_id), policy.clone());

		while !walk.is_done() {
			let edges = self.frontier_edges(query, walk.frontier(), policy);

			walk.advance(edges);
		}

		let reached = walk.into_reached();
		let links = reached
			.iter()
			.filter_map(|node| {
				let item_id = self.nodes.get(&node.node_id)?.item_id.as_deref()?;
				let doc = self.documents.get(item_id)?;

				if !query.tenant_allows(&doc.record.tenant_id)
					|| !query.filters.matches(&doc.record.tags, doc.record.updated_at)
				{
					return None;
				}

				Some(LinkedItem {
					node_id: node.node_id.clone(),
					item_id: item_id.to_string(),
					updated_at: doc.record.updated_at,
				})
			})
			.collect::<Vec<_>>();

		graph::scored_items(&reached, &links)
	}

	fn frontier_edges(
		&self,
		query: &SourceQuery<'_>,
		frontier: &[String],
		policy: &GraphPolicy,
	) -> Vec<(String, String)> {
		let frontier = frontier.iter().map(String::as_str).collect::<BTreeSet<_>>();

		self.edges
			.iter()
			.filter(|edge| query.tenant_allows(&edge.tenant_id))
			.filter(|edge| policy.allows_edge(&edge.edge_type))
			.flat_map(|edge| {
				let forward = frontier
					.contains(edge.src_node_id.as_str())
					.then(|| (edge.src_node_id.clone(), edge.dst_node_id.clone()));
				let backward = frontier
					.contains(edge.dst_node_id.as_str())
					.then(|| (edge.dst_node_id.clone(), edge.src_node_id.clone()));

				forward.into_iter().chain(backward)
			})
			.collect()
	}

	fn visible<'a>(
		&'a self,
		query: &'a SourceQuery<'_>,
	) -> impl Iterator<Item = &'a MemoryDocument> + 'a {
		self.documents.values().filter(move |doc| {
			query.tenant_allows(&doc.record.tenant_id)
				&& query.filters.matches(&doc.record.tags, doc.record.updated_at)
		})
	}
}

fn scored(doc: &MemoryDocument, score: f32) -> ScoredItem {
	ScoredItem {
		item_id: doc.record.item_id.clone(),
		score,
		updated_at: doc.record.updated_at,
		record: doc.record_ref.clone(),
		extra: (),
	}
}
