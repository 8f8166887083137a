use std::sync::Arc;

use color_eyre::eyre;

use trisearch_config::Config;
use trisearch_service::{
	QueryEmbedder, SearchConfig, TriSearch,
	adapters::{self, PgRecordStore},
	embedder::ProviderEmbedder,
};
use trisearch_storage::db::Db;

#[derive(Clone)]
pub struct AppState {
	pub search: Arc<TriSearch>,
}
impl AppState {
	/// Connects to Postgres, bootstraps the schema, and wires every enabled source.
	pub async fn new(config: &Config) -> color_eyre::Result<Self> {
		let search_cfg = SearchConfig::from_config(config)?;
		let embedder: Option<Arc<dyn QueryEmbedder>> = match config.providers.embedding.as_ref() {
			Some(provider) => Some(Arc::new(ProviderEmbedder::from_config(provider)?)),
			None if search_cfg.sources.vector => {
				return Err(eyre::eyre!(
					"providers.embedding must be configured when search.sources.vector is true."
				));
			},
			None => None,
		};
		let db = Db::connect(&config.storage.postgres).await?;

		db.ensure_schema(config.storage.vector.dimensions).await?;

		let sources = adapters::postgres::sources(db.pool.clone(), embedder, &search_cfg);
		let records = Arc::new(PgRecordStore::new(db.pool));

		Ok(Self::from_search(TriSearch::new(search_cfg, sources, records)))
	}

	pub fn from_search(search: TriSearch) -> Self {
		Self { search: Arc::new(search) }
	}
}
