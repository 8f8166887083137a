mod error;
mod types;

pub use error::{Error, Result};
pub use types::{
	Audit, Config, EmbeddingProviderConfig, Postgres, Providers, Search, SearchGraph,
	SearchSources, Service, Storage, VectorIndex,
};

use std::{fs, path::Path};

pub const MAX_GRAPH_HOPS: u32 = 8;

pub fn load(path: &Path) -> Result<Config> {
	let raw = fs::read_to_string(path)
		.map_err(|err| Error::ReadConfig { path: path.to_path_buf(), source: err })?;

	let mut cfg: Config = toml::from_str(&raw)
		.map_err(|err| Error::ParseConfig { path: path.to_path_buf(), source: err })?;

	normalize(&mut cfg);

	validate(&cfg)?;

	Ok(cfg)
}

pub fn validate(cfg: &Config) -> Result<()> {
	if cfg.service.http_bind.trim().is_empty() {
		return Err(Error::Validation {
			message: "service.http_bind must be non-empty.".to_string(),
		});
	}
	if cfg.storage.postgres.dsn.trim().is_empty() {
		return Err(Error::Validation {
			message: "storage.postgres.dsn must be non-empty.".to_string(),
		});
	}
	if cfg.storage.postgres.pool_max_conns == 0 {
		return Err(Error::Validation {
			message: "storage.postgres.pool_max_conns must be greater than zero.".to_string(),
		});
	}
	if cfg.storage.vector.dimensions == 0 {
		return Err(Error::Validation {
			message: "storage.vector.dimensions must be greater than zero.".to_string(),
		});
	}
	if !matches!(cfg.storage.vector.metric.as_str(), "cosine" | "inner_product") {
		return Err(Error::Validation {
			message: "storage.vector.metric must be one of cosine or inner_product.".to_string(),
		});
	}

	if let Some(embedding) = cfg.providers.embedding.as_ref() {
		validate_embedding(embedding, cfg.storage.vector.dimensions)?;
	}

	validate_search(&cfg.search)?;

	Ok(())
}

fn validate_embedding(embedding: &EmbeddingProviderConfig, dimensions: u32) -> Result<()> {
	if embedding.api_key.trim().is_empty() {
		return Err(Error::Validation {
			message: "Provider embedding api_key must be non-empty.".to_string(),
		});
	}
	if embedding.dimensions == 0 {
		return Err(Error::Validation {
			message: "providers.embedding.dimensions must be greater than zero.".to_string(),
		});
	}
	if embedding.dimensions != dimensions {
		return Err(Error::Validation {
			message: "providers.embedding.dimensions must match storage.vector.dimensions."
				.to_string(),
		});
	}
	if embedding.timeout_ms == 0 {
		return Err(Error::Validation {
			message: "providers.embedding.timeout_ms must be greater than zero.".to_string(),
		});
	}

	Ok(())
}

fn validate_search(search: &Search) -> Result<()> {
	if search.default_limit == 0 {
		return Err(Error::Validation {
			message: "search.default_limit must be greater than zero.".to_string(),
		});
	}
	if search.max_limit < search.default_limit {
		return Err(Error::Validation {
			message: "search.max_limit must be greater than or equal to search.default_limit."
				.to_string(),
		});
	}
	if search.candidate_k == 0 {
		return Err(Error::Validation {
			message: "search.candidate_k must be greater than zero.".to_string(),
		});
	}
	if search.adapter_timeout_ms == 0 {
		return Err(Error::Validation {
			message: "search.adapter_timeout_ms must be greater than zero.".to_string(),
		});
	}
	if !(search.sources.keyword || search.sources.vector || search.sources.graph) {
		return Err(Error::Validation {
			message: "search.sources must enable at least one source.".to_string(),
		});
	}
	if !(1..=MAX_GRAPH_HOPS).contains(&search.graph.max_hops) {
		return Err(Error::Validation {
			message: format!("search.graph.max_hops must be in the range 1-{MAX_GRAPH_HOPS}."),
		});
	}
	if !search.graph.hop_decay.is_finite() {
		return Err(Error::Validation {
			message: "search.graph.hop_decay must be a finite number.".to_string(),
		});
	}
	if search.graph.hop_decay <= 0.0 || search.graph.hop_decay > 1.0 {
		return Err(Error::Validation {
			message: "search.graph.hop_decay must be greater than zero and at most 1.0."
				.to_string(),
		});
	}
	if search.graph.max_seeds == 0 {
		return Err(Error::Validation {
			message: "search.graph.max_seeds must be greater than zero.".to_string(),
		});
	}
	if search.graph.max_nodes == 0 {
		return Err(Error::Validation {
			message: "search.graph.max_nodes must be greater than zero.".to_string(),
		});
	}

	for edge_type in &search.graph.edge_types {
		if edge_type.trim().is_empty() {
			return Err(Error::Validation {
				message: "search.graph.edge_types must not contain empty entries.".to_string(),
			});
		}
	}

	Ok(())
}

fn normalize(cfg: &mut Config) {
	cfg.storage.vector.metric = cfg.storage.vector.metric.trim().to_ascii_lowercase();

	for edge_type in &mut cfg.search.graph.edge_types {
		*edge_type = edge_type.trim().to_string();
	}

	cfg.search.graph.edge_types.sort();
	cfg.search.graph.edge_types.dedup();

	if cfg.service.log_level.trim().is_empty() {
		cfg.service.log_level = "info".to_string();
	}
}
