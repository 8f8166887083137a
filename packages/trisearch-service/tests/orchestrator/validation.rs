use std::sync::{Arc, atomic::Ordering};

use trisearch_domain::{
	candidate::SourceType,
	filter::{FilterSet, TimeRange},
	identity::IdentityContext,
};
use trisearch_service::{Error, SearchConfig, SearchMode, SearchRequest, SearchStatus, Sources};

use super::{Failing, Fixed, all_sources, engine, identity, owned};

fn assert_invalid(result: Result<trisearch_service::SearchResponse, Error>, needle: &str) {
	match result {
		Err(Error::InvalidQuery { message }) => {
			assert!(message.contains(needle), "Unexpected message: {message}");
		},
		other => panic!("Expected InvalidQuery, got {other:?}"),
	}
}

#[tokio::test]
async fn blank_tenant_is_rejected_before_dispatch() {
	let keyword = Arc::new(Fixed::new(SourceType::Keyword, &["a"]));
	let calls = keyword.calls.clone();
	let search = engine(SearchConfig::default(), Sources::default().with(keyword), owned(&["a"]));
	let result = search.search(SearchRequest::new("q", IdentityContext::new("  ", "u1"))).await;

	assert_invalid(result, "tenant_id");
	assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn limit_must_be_within_bounds() {
	let search = engine(
		SearchConfig::default(),
		Sources::default().with(Fixed::arc(SourceType::Keyword, &["a"])),
		owned(&["a"]),
	);

	assert_invalid(search.search(SearchRequest::new("q", identity()).with_limit(0)).await, "limit");
	assert_invalid(
		search.search(SearchRequest::new("q", identity()).with_limit(101)).await,
		"limit",
	);

	let response = search
		.search(SearchRequest::new("q", identity()).with_limit(100))
		.await
		.expect("Failed to run search at the maximum limit.");

	assert_eq!(response.status, SearchStatus::Complete);
}

#[tokio::test]
async fn inverted_time_range_is_rejected() {
	let search = engine(
		SearchConfig::default(),
		Sources::default().with(Fixed::arc(SourceType::Keyword, &["a"])),
		owned(&["a"]),
	);
	let filters = FilterSet {
		time_range: Some(TimeRange {
			from: Some(time::macros::datetime!(2026-05-01 00:00 UTC)),
			to: Some(time::macros::datetime!(2026-04-01 00:00 UTC)),
		}),
		..Default::default()
	};
	let result = search.search(SearchRequest::new("q", identity()).with_filters(filters)).await;

	assert_invalid(result, "time_range");
}

#[tokio::test]
async fn single_source_mode_dispatches_only_that_source() {
	let search = engine(
		SearchConfig::default(),
		all_sources(
			Fixed::arc(SourceType::Keyword, &["a"]),
			Failing::arc(SourceType::Vector),
			Failing::arc(SourceType::Graph),
		),
		owned(&["a"]),
	);
	let response = search
		.search(SearchRequest::new("q", identity()).with_mode(SearchMode::Keyword))
		.await
		.expect("Failed to run keyword search.");

	assert_eq!(response.status, SearchStatus::Complete);
	assert!(response.unavailable_sources.is_empty());
	assert_eq!(response.results.len(), 1);
}

#[tokio::test]
async fn mode_naming_a_disabled_source_is_rejected() {
	let mut cfg = SearchConfig::default();

	cfg.sources.vector = false;

	let search = engine(
		cfg,
		all_sources(
			Fixed::arc(SourceType::Keyword, &["a"]),
			Fixed::arc(SourceType::Vector, &["a"]),
			Fixed::arc(SourceType::Graph, &["a"]),
		),
		owned(&["a"]),
	);
	let result =
		search.search(SearchRequest::new("q", identity()).with_mode(SearchMode::Similarity)).await;

	assert_invalid(result, "similarity");
}

#[tokio::test]
async fn blank_query_returns_no_results() {
	let keyword = Arc::new(Fixed::new(SourceType::Keyword, &["a"]));
	let calls = keyword.calls.clone();
	let search = engine(SearchConfig::default(), Sources::default().with(keyword), owned(&["a"]));
	let response = search
		.search(SearchRequest::new("   ", identity()))
		.await
		.expect("Failed to run blank search.");

	assert_eq!(response.status, SearchStatus::Complete);
	assert!(response.results.is_empty());
	assert_eq!(calls.load(Ordering::SeqCst), 0);
}
