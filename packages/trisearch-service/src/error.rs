pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("Invalid query: {message}")]
	InvalidQuery { message: String },
	#[error("Record store error: {message}")]
	RecordStore { message: String },
	#[error("Invalid search config: {message}")]
	Config { message: String },
}

/// Failure inside one source adapter. The orchestrator turns it into an unavailable source.
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
	#[error("Source unreachable: {message}")]
	Unreachable { message: String },
	#[error("Storage error: {message}")]
	Storage { message: String },
	#[error("Embedding error: {message}")]
	Embedding { message: String },
}
impl From<trisearch_storage::Error> for SourceError {
	fn from(err: trisearch_storage::Error) -> Self {
		match err {
			trisearch_storage::Error::Sqlx(inner) => Self::Unreachable { message: inner.to_string() },
			other => Self::Storage { message: other.to_string() },
		}
	}
}
impl From<sqlx::Error> for SourceError {
	fn from(err: sqlx::Error) -> Self {
		Self::Unreachable { message: err.to_string() }
	}
}
impl From<trisearch_providers::Error> for SourceError {
	fn from(err: trisearch_providers::Error) -> Self {
		Self::Embedding { message: err.to_string() }
	}
}
