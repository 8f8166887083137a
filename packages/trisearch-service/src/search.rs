use std::{
	collections::{BTreeSet, HashMap},
	fmt::{Display, Formatter},
	sync::Arc,
	time::Instant,
};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use trisearch_domain::{
	candidate::{Candidate, SourceType},
	evidence::{self, FusedResult},
	filter::FilterSet,
	fusion,
	identity::IdentityContext,
	query::SourceQuery,
	record::MemoryRecord,
};

use crate::{
	Error, RecordStore, Result, SourceAdapter, Sources,
	audit::{self, AuditSink, NoopAuditSink, SearchEvent, TracingAuditSink},
	gating::GatingFilter,
	policy::SearchConfig,
	state::{QueryRun, QueryState},
};

/// Which sources a request wants. `Hybrid` runs every enabled source.
#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchMode {
	#[default]
	Hybrid,
	Keyword,
	Similarity,
	Graph,
}
impl SearchMode {
	pub fn as_str(self) -> &'static str {
		match self {
			Self::Hybrid => "hybrid",
			Self::Keyword => "keyword",
			Self::Similarity => "similarity",
			Self::Graph => "graph",
		}
	}

	pub fn single_source(self) -> Option<SourceType> {
		match self {
			Self::Hybrid => None,
			Self::Keyword => Some(SourceType::Keyword),
			Self::Similarity => Some(SourceType::Vector),
			Self::Graph => Some(SourceType::Graph),
		}
	}

	pub fn includes(self, source: SourceType) -> bool {
		self.single_source().map(|only| only == source).unwrap_or(true)
	}
}
impl Display for SearchMode {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		f.write_str(self.as_str())
	}
}

#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchStatus {
	Complete,
	PartialFailure,
	Failed,
}
impl SearchStatus {
	pub fn as_str(self) -> &'static str {
		match self {
			Self::Complete => "complete",
			Self::PartialFailure => "partial_failure",
			Self::Failed => "failed",
		}
	}
}

#[derive(Clone, Debug)]
pub struct SearchRequest {
	pub query: String,
	pub identity: IdentityContext,
	pub limit: Option<u32>,
	pub filters: FilterSet,
	pub mode: SearchMode,
}
impl SearchRequest {
	pub fn new(query: impl Into<String>, identity: IdentityContext) -> Self {
		Self {
			query: query.into(),
			identity,
			limit: None,
			filters: FilterSet::default(),
			mode: SearchMode::default(),
		}
	}

	pub fn with_limit(mut self, limit: u32) -> Self {
		self.limit = Some(limit);

		self
	}

	pub fn with_filters(mut self, filters: FilterSet) -> Self {
		self.filters = filters;

		self
	}

	pub fn with_mode(mut self, mode: SearchMode) -> Self {
		self.mode = mode;

		self
	}
}

#[derive(Clone, Debug, Serialize)]
pub struct SearchResponse {
	pub trace_id: Uuid,
	pub status: SearchStatus,
	pub results: Vec<FusedResult>,
	/// Dispatched sources that failed or timed out, in canonical source order.
	pub unavailable_sources: Vec<SourceType>,
}

enum SourceOutcome {
	Skipped,
	Ready(Vec<Candidate>),
	Unavailable,
}

/// The query orchestrator. Holds no per-query state, so one instance serves concurrent searches.
pub struct TriSearch {
	cfg: SearchConfig,
	sources: Sources,
	records: Arc<dyn RecordStore>,
	audit: Arc<dyn AuditSink>,
}
impl TriSearch {
	pub fn new(cfg: SearchConfig, sources: Sources, records: Arc<dyn RecordStore>) -> Self {
		let audit: Arc<dyn AuditSink> =
			if cfg.audit_enabled { Arc::new(TracingAuditSink) } else { Arc::new(NoopAuditSink) };

		Self { cfg, sources, records, audit }
	}

	pub fn with_audit(mut self, audit: Arc<dyn AuditSink>) -> Self {
		self.audit = audit;

		self
	}

	pub fn config(&self) -> &SearchConfig {
		&self.cfg
	}

	/// Runs one search end to end.
	///
	/// Source failures and timeouts never surface as errors; they show up in the response status
	/// and `unavailable_sources`. Only a malformed request or a failing record store returns
	/// `Err`. Dropping the returned future cancels every in-flight adapter call.
	pub async fn search(&self, request: SearchRequest) -> Result<SearchResponse> {
		let started = Instant::now();
		let trace_id = Uuid::new_v4();
		let mut run = QueryRun::new(trace_id);
		let identity = request.identity.normalized();
		let limit = match self.validate(&request, &identity) {
			Ok(limit) => limit,
			Err(err) => {
				tracing::debug!(trace_id = %trace_id, error = %err, "Search rejected.");
				run.advance(QueryState::Failed);

				return Err(err);
			},
		};
		let text = request.query.trim();
		let dispatch = if text.is_empty() {
			BTreeSet::new()
		} else {
			self.dispatch_plan(request.mode)
		};
		let query = SourceQuery::new(text, self.cfg.fetch_depth(limit), &request.filters)
			.with_tenant(identity.tenant_id.as_str());

		run.advance(QueryState::Dispatching);
		run.advance(QueryState::Awaiting { pending: dispatch.len() });

		let (keyword, vector, graph) = tokio::join!(
			self.run_source(SourceType::Keyword, &dispatch, query, trace_id),
			self.run_source(SourceType::Vector, &dispatch, query, trace_id),
			self.run_source(SourceType::Graph, &dispatch, query, trace_id),
		);
		let mut candidates = Vec::new();
		let mut unavailable_sources = Vec::new();

		for (source, outcome) in
			[(SourceType::Keyword, keyword), (SourceType::Vector, vector), (SourceType::Graph, graph)]
		{
			match outcome {
				SourceOutcome::Skipped => {},
				SourceOutcome::Ready(found) => candidates.extend(found),
				SourceOutcome::Unavailable => unavailable_sources.push(source),
			}
		}

		if !dispatch.is_empty() && unavailable_sources.len() == dispatch.len() {
			tracing::warn!(
				trace_id = %trace_id,
				unavailable = unavailable_sources.len(),
				"Every dispatched source is unavailable."
			);
			run.advance(QueryState::Failed);

			let response = SearchResponse {
				trace_id,
				status: SearchStatus::Failed,
				results: Vec::new(),
				unavailable_sources,
			};

			self.emit_audit(&request.query, &identity, &response, 0);

			return Ok(response);
		}

		run.advance(QueryState::Gating);

		let records = match self.load_records(&candidates).await {
			Ok(records) => records,
			Err(err) => {
				tracing::error!(trace_id = %trace_id, error = %err, "Record store read failed.");
				run.advance(QueryState::Failed);

				let response = SearchResponse {
					trace_id,
					status: SearchStatus::Failed,
					results: Vec::new(),
					unavailable_sources,
				};

				self.emit_audit(&request.query, &identity, &response, 0);

				return Err(err);
			},
		};
		let mut gate = GatingFilter::new(&identity, &records);
		let admitted = gate.filter(candidates);

		run.advance(QueryState::Fusing);

		let results = fusion::fuse(admitted, limit as usize)
			.into_iter()
			.filter_map(|entry| {
				let record = gate.record(&entry.item_id)?;
				let outcome = gate.outcome(&entry.item_id)?;

				Some(evidence::assemble(entry, record, outcome))
			})
			.collect::<Vec<_>>();
		let status = if unavailable_sources.is_empty() {
			SearchStatus::Complete
		} else {
			SearchStatus::PartialFailure
		};

		run.advance(status.into());
		debug_assert!(run.state().is_terminal());

		let response = SearchResponse { trace_id, status, results, unavailable_sources };

		self.emit_audit(&request.query, &identity, &response, gate.rejected_count());

		tracing::info!(
			trace_id = %trace_id,
			tenant_id = %identity.tenant_id,
			mode = request.mode.as_str(),
			status = status.as_str(),
			result_count = response.results.len(),
			rejected_count = gate.rejected_count(),
			elapsed_ms = started.elapsed().as_millis() as u64,
			"Search completed."
		);

		Ok(response)
	}

	fn validate(&self, request: &SearchRequest, identity: &IdentityContext) -> Result<u32> {
		if !identity.has_tenant() {
			return Err(Error::InvalidQuery {
				message: "identity.tenant_id must be non-empty.".to_string(),
			});
		}

		let limit = request.limit.unwrap_or(self.cfg.default_limit);

		if limit == 0 || limit > self.cfg.max_limit {
			return Err(Error::InvalidQuery {
				message: format!("limit must be in the range 1-{}.", self.cfg.max_limit),
			});
		}
		if let Some(message) = request.filters.validate() {
			return Err(Error::InvalidQuery { message });
		}
		if let Some(source) = request.mode.single_source()
			&& !self.is_available(source)
		{
			return Err(Error::InvalidQuery {
				message: format!(
					"mode {} requires the {source} source, which is disabled.",
					request.mode
				),
			});
		}

		Ok(limit)
	}

	fn is_available(&self, source: SourceType) -> bool {
		self.cfg.sources.is_enabled(source) && self.sources.get(source).is_some()
	}

	fn dispatch_plan(&self, mode: SearchMode) -> BTreeSet<SourceType> {
		SourceType::ALL
			.into_iter()
			.filter(|source| mode.includes(*source) && self.is_available(*source))
			.collect()
	}

	async fn run_source(
		&self,
		source: SourceType,
		dispatch: &BTreeSet<SourceType>,
		query: SourceQuery<'_>,
		trace_id: Uuid,
	) -> SourceOutcome {
		if !dispatch.contains(&source) {
			return SourceOutcome::Skipped;
		}

		let Some(adapter) = self.sources.get(source) else {
			return SourceOutcome::Skipped;
		};
		let started = Instant::now();

		match tokio::time::timeout(self.cfg.adapter_timeout, adapter.retrieve(query)).await {
			Ok(Ok(found)) => {
				let returned = found.len();
				let mut kept = found
					.into_iter()
					.filter(|candidate| candidate.source() == source)
					.collect::<Vec<_>>();

				if kept.len() != returned {
					tracing::warn!(
						trace_id = %trace_id,
						source = source.as_str(),
						dropped = returned - kept.len(),
						"Source adapter returned candidates of another source."
					);
				}

				kept.truncate(query.limit);

				tracing::debug!(
					trace_id = %trace_id,
					source = source.as_str(),
					candidates = kept.len(),
					elapsed_ms = started.elapsed().as_millis() as u64,
					"Source adapter responded."
				);

				SourceOutcome::Ready(kept)
			},
			Ok(Err(err)) => {
				tracing::warn!(
					trace_id = %trace_id,
					source = source.as_str(),
					error = %err,
					elapsed_ms = started.elapsed().as_millis() as u64,
					"Source adapter failed."
				);

				SourceOutcome::Unavailable
			},
			Err(_) => {
				tracing::warn!(
					trace_id = %trace_id,
					source = source.as_str(),
					timeout_ms = self.cfg.adapter_timeout.as_millis() as u64,
					"Source adapter timed out."
				);

				SourceOutcome::Unavailable
			},
		}
	}

	async fn load_records(&self, candidates: &[Candidate]) -> Result<HashMap<String, MemoryRecord>> {
		let item_ids = candidates
			.iter()
			.map(|candidate| candidate.item_id().to_string())
			.collect::<BTreeSet<_>>()
			.into_iter()
			.collect::<Vec<_>>();

		if item_ids.is_empty() {
			return Ok(HashMap::new());
		}

		self.records
			.get_records(&item_ids)
			.await
			.map_err(|err| Error::RecordStore { message: err.to_string() })
	}

	fn emit_audit(
		&self,
		query: &str,
		identity: &IdentityContext,
		response: &SearchResponse,
		rejected_count: usize,
	) {
		self.audit.emit(SearchEvent {
			trace_id: response.trace_id,
			identity: identity.clone(),
			query_hash: audit::hash_query(query),
			result_count: response.results.len(),
			rejected_count,
			unavailable_sources: response.unavailable_sources.clone(),
			status: response.status,
		});
	}
}
