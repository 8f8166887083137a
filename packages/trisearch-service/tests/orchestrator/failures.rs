use std::{
	sync::{Arc, atomic::Ordering},
	time::Duration,
};

use trisearch_domain::candidate::SourceType;
use trisearch_service::{
	Error, SearchConfig, SearchRequest, SearchStatus, Sources, TriSearch,
};

use super::{Failing, Fixed, Records, Stalled, all_sources, engine, identity, owned};

#[tokio::test]
async fn one_source_down_is_a_partial_failure() {
	let search = engine(
		SearchConfig::default(),
		all_sources(
			Fixed::arc(SourceType::Keyword, &["a", "b"]),
			Fixed::arc(SourceType::Vector, &["b"]),
			Failing::arc(SourceType::Graph),
		),
		owned(&["a", "b"]),
	);
	let response = search
		.search(SearchRequest::new("q", identity()))
		.await
		.expect("Failed to run search.");

	assert_eq!(response.status, SearchStatus::PartialFailure);
	assert_eq!(response.unavailable_sources, vec![SourceType::Graph]);
	assert!(!response.results.is_empty());
}

#[tokio::test]
async fn every_source_down_fails_with_all_listed() {
	let search = engine(
		SearchConfig::default(),
		all_sources(
			Failing::arc(SourceType::Keyword),
			Failing::arc(SourceType::Vector),
			Failing::arc(SourceType::Graph),
		),
		owned(&[]),
	);
	let response = search
		.search(SearchRequest::new("q", identity()))
		.await
		.expect("Failed to run search.");

	assert_eq!(response.status, SearchStatus::Failed);
	assert!(response.results.is_empty());
	assert_eq!(
		response.unavailable_sources,
		vec![SourceType::Keyword, SourceType::Vector, SourceType::Graph]
	);
}

#[tokio::test]
async fn slow_source_times_out_and_is_listed() {
	let stalled = Stalled::new(SourceType::Vector);
	let dropped = stalled.dropped.clone();
	let cfg = SearchConfig { adapter_timeout: Duration::from_millis(50), ..Default::default() };
	let search = engine(
		cfg,
		all_sources(
			Fixed::arc(SourceType::Keyword, &["a"]),
			Arc::new(stalled),
			Fixed::arc(SourceType::Graph, &[]),
		),
		owned(&["a"]),
	);
	let response = search
		.search(SearchRequest::new("q", identity()))
		.await
		.expect("Failed to run search.");

	assert_eq!(response.status, SearchStatus::PartialFailure);
	assert_eq!(response.unavailable_sources, vec![SourceType::Vector]);
	assert_eq!(response.results.len(), 1);
	assert!(dropped.load(Ordering::SeqCst));
}

#[tokio::test]
async fn dropping_the_search_cancels_in_flight_adapters() {
	let stalled = Stalled::new(SourceType::Keyword);
	let dropped = stalled.dropped.clone();
	let cfg = SearchConfig { adapter_timeout: Duration::from_secs(120), ..Default::default() };
	let search = Arc::new(TriSearch::new(
		cfg,
		Sources::default().with(Arc::new(stalled)),
		Arc::new(owned(&[])),
	));
	let task = {
		let search = search.clone();

		tokio::spawn(async move { search.search(SearchRequest::new("q", identity())).await })
	};

	tokio::time::sleep(Duration::from_millis(50)).await;

	assert!(!dropped.load(Ordering::SeqCst));

	task.abort();

	let joined = task.await;

	assert!(joined.is_err_and(|err| err.is_cancelled()));
	assert!(dropped.load(Ordering::SeqCst));
}

#[tokio::test]
async fn disabled_source_is_neither_called_nor_listed() {
	let mut cfg = SearchConfig::default();

	cfg.sources.graph = false;

	let search = engine(
		cfg,
		all_sources(
			Fixed::arc(SourceType::Keyword, &["a"]),
			Fixed::arc(SourceType::Vector, &["a"]),
			Failing::arc(SourceType::Graph),
		),
		owned(&["a"]),
	);
	let response = search
		.search(SearchRequest::new("q", identity()))
		.await
		.expect("Failed to run search.");

	assert_eq!(response.status, SearchStatus::Complete);
	assert!(response.unavailable_sources.is_empty());
}

#[tokio::test]
async fn absent_adapters_are_never_listed() {
	let search = engine(
		SearchConfig::default(),
		Sources::default().with(Failing::arc(SourceType::Keyword)),
		owned(&[]),
	);
	let response = search
		.search(SearchRequest::new("q", identity()))
		.await
		.expect("Failed to run search.");

	assert_eq!(response.status, SearchStatus::Failed);
	assert_eq!(response.unavailable_sources, vec![SourceType::Keyword]);
}

#[tokio::test]
async fn record_store_failure_fails_closed() {
	let search = engine(
		SearchConfig::default(),
		Sources::default().with(Fixed::arc(SourceType::Keyword, &["a"])),
		Records::failing(),
	);
	let err = search
		.search(SearchRequest::new("q", identity()))
		.await
		.expect_err("Expected record store failure.");

	assert!(matches!(err, Error::RecordStore { .. }), "Unexpected error: {err:?}");
}

#[tokio::test]
async fn record_store_is_not_needed_without_candidates() {
	let search = engine(
		SearchConfig::default(),
		Sources::default().with(Fixed::arc(SourceType::Keyword, &[])),
		Records::failing(),
	);
	let response = search
		.search(SearchRequest::new("q", identity()))
		.await
		.expect("Failed to run search.");

	assert_eq!(response.status, SearchStatus::Complete);
	assert!(response.results.is_empty());
}
