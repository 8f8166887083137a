use std::sync::Arc;

use trisearch_domain::{candidate::SourceType, identity::IdentityContext};
use trisearch_service::{
	ChannelAuditSink, SearchConfig, SearchRequest, SearchStatus, TriSearch, audit,
};

use super::{Failing, Fixed, Records, all_sources, engine, identity, owned};

#[tokio::test]
async fn each_search_emits_one_event_without_the_raw_query() {
	let (sink, mut rx) = ChannelAuditSink::new(4);
	let search = engine(
		SearchConfig::default(),
		all_sources(
			Fixed::arc(SourceType::Keyword, &["a", "b"]),
			Fixed::arc(SourceType::Vector, &["b"]),
			Failing::arc(SourceType::Graph),
		),
		owned(&["a"]),
	)
	.with_audit(Arc::new(sink));
	let identity = IdentityContext::new(" t1 ", "u1").with_groups(["g1", " "]);
	let response = search
		.search(SearchRequest::new("  secret plans ", identity))
		.await
		.expect("Failed to run search.");
	let event = rx.try_recv().expect("Expected an audit event.");

	assert_eq!(event.trace_id, response.trace_id);
	assert_eq!(event.identity.tenant_id, "t1");
	assert_eq!(event.identity.groups.len(), 1);
	assert_eq!(event.query_hash, audit::hash_query("secret plans"));
	assert_eq!(event.result_count, 1);
	// "b" has no record, so both of its candidates are rejected.
	assert_eq!(event.rejected_count, 2);
	assert_eq!(event.unavailable_sources, vec![SourceType::Graph]);
	assert_eq!(event.status, SearchStatus::PartialFailure);
	assert!(rx.try_recv().is_err());

	let serialized = serde_json::to_string(&event).expect("Failed to serialize event.");

	assert!(!serialized.contains("secret"));
}

#[tokio::test]
async fn total_failure_is_audited() {
	let (sink, mut rx) = ChannelAuditSink::new(4);
	let search = engine(
		SearchConfig::default(),
		all_sources(
			Failing::arc(SourceType::Keyword),
			Failing::arc(SourceType::Vector),
			Failing::arc(SourceType::Graph),
		),
		owned(&[]),
	)
	.with_audit(Arc::new(sink));

	search.search(SearchRequest::new("q", identity())).await.expect("Failed to run search.");

	let event = rx.try_recv().expect("Expected an audit event.");

	assert_eq!(event.status, SearchStatus::Failed);
	assert_eq!(event.result_count, 0);
	assert_eq!(event.unavailable_sources.len(), 3);
}

#[tokio::test]
async fn record_store_failure_is_audited_as_failed() {
	let (sink, mut rx) = ChannelAuditSink::new(4);
	let search = TriSearch::new(
		SearchConfig::default(),
		all_sources(
			Fixed::arc(SourceType::Keyword, &["a"]),
			Fixed::arc(SourceType::Vector, &[]),
			Fixed::arc(SourceType::Graph, &[]),
		),
		Arc::new(Records::failing()),
	)
	.with_audit(Arc::new(sink));

	search.search(SearchRequest::new("q", identity())).await.expect_err("Expected failure.");

	let event = rx.try_recv().expect("Expected an audit event.");

	assert_eq!(event.status, SearchStatus::Failed);
}

#[tokio::test]
async fn invalid_requests_are_not_audited() {
	let (sink, mut rx) = ChannelAuditSink::new(4);
	let search = engine(
		SearchConfig::default(),
		all_sources(
			Fixed::arc(SourceType::Keyword, &["a"]),
			Fixed::arc(SourceType::Vector, &[]),
			Fixed::arc(SourceType::Graph, &[]),
		),
		owned(&["a"]),
	)
	.with_audit(Arc::new(sink));

	search
		.search(SearchRequest::new("q", IdentityContext::new("", "u1")))
		.await
		.expect_err("Expected invalid query.");

	assert!(rx.try_recv().is_err());
}
