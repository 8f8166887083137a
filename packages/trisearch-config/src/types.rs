use serde::Deserialize;
use serde_json::{Map, Value};

#[derive(Debug, Deserialize)]
pub struct Config {
	pub service: Service,
	pub storage: Storage,
	#[serde(default)]
	pub providers: Providers,
	#[serde(default)]
	pub search: Search,
	#[serde(default)]
	pub audit: Audit,
}

#[derive(Debug, Deserialize)]
pub struct Service {
	pub http_bind: String,
	#[serde(default = "default_log_level")]
	pub log_level: String,
}

#[derive(Debug, Deserialize)]
pub struct Storage {
	pub postgres: Postgres,
	pub vector: VectorIndex,
}

#[derive(Debug, Deserialize)]
pub struct Postgres {
	pub dsn: String,
	pub pool_max_conns: u32,
}

#[derive(Debug, Deserialize)]
pub struct VectorIndex {
	pub dimensions: u32,
	/// One of "cosine" or "inner_product".
	#[serde(default = "default_vector_metric")]
	pub metric: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct Providers {
	/// Optional. Without it the vector source has no way to embed query text.
	pub embedding: Option<EmbeddingProviderConfig>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct EmbeddingProviderConfig {
	pub provider_id: String,
	pub api_base: String,
	pub api_key: String,
	pub path: String,
	pub model: String,
	pub dimensions: u32,
	pub timeout_ms: u64,
	#[serde(default)]
	pub default_headers: Map<String, Value>,
}

#[derive(Debug, Deserialize)]
pub struct Search {
	#[serde(default = "default_limit")]
	pub default_limit: u32,
	#[serde(default = "default_max_limit")]
	pub max_limit: u32,
	/// Per-source fetch depth. Each adapter returns at most max(candidate_k, limit) candidates.
	#[serde(default = "default_candidate_k")]
	pub candidate_k: u32,
	#[serde(default = "default_adapter_timeout_ms")]
	pub adapter_timeout_ms: u64,
	#[serde(default)]
	pub sources: SearchSources,
	#[serde(default)]
	pub graph: SearchGraph,
}
impl Default for Search {
	fn default() -> Self {
		Self {
			default_limit: default_limit(),
			max_limit: default_max_limit(),
			candidate_k: default_candidate_k(),
			adapter_timeout_ms: default_adapter_timeout_ms(),
			sources: SearchSources::default(),
			graph: SearchGraph::default(),
		}
	}
}

#[derive(Debug, Deserialize)]
pub struct SearchSources {
	#[serde(default = "default_true")]
	pub keyword: bool,
	#[serde(default = "default_true")]
	pub vector: bool,
	#[serde(default = "default_true")]
	pub graph: bool,
}
impl Default for SearchSources {
	fn default() -> Self {
		Self { keyword: true, vector: true, graph: true }
	}
}

#[derive(Debug, Deserialize)]
pub struct SearchGraph {
	#[serde(default = "default_max_hops")]
	pub max_hops: u32,
	#[serde(default = "default_hop_decay")]
	pub hop_decay: f32,
	#[serde(default = "default_max_seeds")]
	pub max_seeds: u32,
	#[serde(default = "default_max_nodes")]
	pub max_nodes: u32,
	/// Empty means every edge type is walked.
	#[serde(default)]
	pub edge_types: Vec<String>,
}
impl Default for SearchGraph {
	fn default() -> Self {
		Self {
			max_hops: default_max_hops(),
			hop_decay: default_hop_decay(),
			max_seeds: default_max_seeds(),
			max_nodes: default_max_nodes(),
			edge_types: Vec::new(),
		}
	}
}

#[derive(Debug, Deserialize)]
pub struct Audit {
	#[serde(default = "default_true")]
	pub enabled: bool,
}
impl Default for Audit {
	fn default() -> Self {
		Self { enabled: true }
	}
}

fn default_log_level() -> String {
	"info".to_string()
}

fn default_vector_metric() -> String {
	"cosine".to_string()
}

fn default_limit() -> u32 {
	10
}

fn default_max_limit() -> u32 {
	100
}

fn default_candidate_k() -> u32 {
	50
}

fn default_adapter_timeout_ms() -> u64 {
	3_000
}

fn default_max_hops() -> u32 {
	3
}

fn default_hop_decay() -> f32 {
	0.5
}

fn default_max_seeds() -> u32 {
	8
}

fn default_max_nodes() -> u32 {
	256
}

fn default_true() -> bool {
	true
}
