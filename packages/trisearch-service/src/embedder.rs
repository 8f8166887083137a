use trisearch_config::EmbeddingProviderConfig;
use trisearch_providers::embedding::EmbeddingClient;

use crate::{BoxFuture, Error, QueryEmbedder, Result, SourceError};

/// Embeds query text through the configured HTTP provider.
#[derive(Clone, Debug)]
pub struct ProviderEmbedder {
	client: EmbeddingClient,
}
impl ProviderEmbedder {
	pub fn new(client: EmbeddingClient) -> Self {
		Self { client }
	}

	pub fn from_config(cfg: &EmbeddingProviderConfig) -> Result<Self> {
		let client =
			EmbeddingClient::new(cfg).map_err(|err| Error::Config { message: err.to_string() })?;

		Ok(Self::new(client))
	}

	pub fn dimensions(&self) -> u32 {
		self.client.dimensions()
	}
}
impl QueryEmbedder for ProviderEmbedder {
	fn embed_query<'a>(&'a self, text: &'a str) -> BoxFuture<'a, Result<Vec<f32>, SourceError>> {
		Box::pin(async move { Ok(self.client.embed_query(text).await?) })
	}
}
