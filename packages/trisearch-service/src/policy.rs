use std::time::Duration;

use trisearch_config::Config;
use trisearch_domain::{candidate::SourceType, graph::GraphPolicy, similarity::VectorMetric};

use crate::{Error, Result};

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct SourceToggles {
	pub keyword: bool,
	pub vector: bool,
	pub graph: bool,
}
impl SourceToggles {
	pub fn is_enabled(&self, source: SourceType) -> bool {
		match source {
			SourceType::Keyword => self.keyword,
			SourceType::Vector => self.vector,
			SourceType::Graph => self.graph,
		}
	}
}
impl Default for SourceToggles {
	fn default() -> Self {
		Self { keyword: true, vector: true, graph: true }
	}
}

/// Typed search settings handed to the orchestrator.
#[derive(Clone, Debug)]
pub struct SearchConfig {
	pub default_limit: u32,
	pub max_limit: u32,
	pub candidate_k: u32,
	pub adapter_timeout: Duration,
	pub sources: SourceToggles,
	pub graph: GraphPolicy,
	pub vector_metric: VectorMetric,
	pub vector_dimensions: u32,
	pub audit_enabled: bool,
}
impl SearchConfig {
	pub fn from_config(cfg: &Config) -> Result<Self> {
		let search = &cfg.search;
		let vector_metric = cfg
			.storage
			.vector
			.metric
			.parse::<VectorMetric>()
			.map_err(|message| Error::Config { message })?;

		Ok(Self {
			default_limit: search.default_limit,
			max_limit: search.max_limit,
			candidate_k: search.candidate_k,
			adapter_timeout: Duration::from_millis(search.adapter_timeout_ms),
			sources: SourceToggles {
				keyword: search.sources.keyword,
				vector: search.sources.vector,
				graph: search.sources.graph,
			},
			graph: GraphPolicy {
				max_hops: search.graph.max_hops,
				hop_decay: search.graph.hop_decay,
				max_seeds: search.graph.max_seeds as usize,
				max_nodes: search.graph.max_nodes as usize,
				edge_types: search.graph.edge_types.clone(),
			},
			vector_metric,
			vector_dimensions: cfg.storage.vector.dimensions,
			audit_enabled: cfg.audit.enabled,
		})
	}

	/// Per-source fetch depth for a request that wants `limit` results.
	pub fn fetch_depth(&self, limit: u32) -> usize {
		self.candidate_k.max(limit) as usize
	}
}
impl Default for SearchConfig {
	fn default() -> Self {
		Self {
			default_limit: 10,
			max_limit: 100,
			candidate_k: 50,
			adapter_timeout: Duration::from_millis(3_000),
			sources: SourceToggles::default(),
			graph: GraphPolicy::default(),
			vector_metric: VectorMetric::Cosine,
			vector_dimensions: 1_536,
			audit_enabled: true,
		}
	}
}
