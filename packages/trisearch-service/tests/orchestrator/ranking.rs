use std::sync::Arc;

use trisearch_domain::{
	candidate::SourceType,
	gating::GateRule,
	record::Classification,
};
use trisearch_service::{SearchConfig, SearchRequest, SearchStatus, Sources};

use super::{Fixed, Records, all_sources, candidate, engine, identity, owned, record};

#[tokio::test]
async fn owner_allowed_and_foreign_group_denied() {
	let records = Records::new([
		record("A", "u1", &[], Classification::Internal),
		record("B", "u9", &["g2"], Classification::Internal),
	]);
	let search = engine(
		SearchConfig::default(),
		all_sources(
			Fixed::arc(SourceType::Keyword, &["A", "B"]),
			Fixed::arc(SourceType::Vector, &["B", "A"]),
			Fixed::arc(SourceType::Graph, &[]),
		),
		records,
	);
	let response = search
		.search(SearchRequest::new("trip", identity()))
		.await
		.expect("Failed to run search.");
	let ids = response.results.iter().map(|result| result.item_id.as_str()).collect::<Vec<_>>();

	assert_eq!(ids, vec!["A"]);
	assert_eq!(response.status, SearchStatus::Complete);
	assert!(response.unavailable_sources.is_empty());

	let evidence = &response.results[0].evidence;

	assert_eq!(evidence.gate.rule, GateRule::Owner);
	assert_eq!(evidence.gate.owner_user_id, "u1");
	assert_eq!(evidence.contributions.len(), 2);
	assert_eq!(evidence.contributions[0].source, SourceType::Keyword);
	assert_eq!(evidence.contributions[0].rank, 1);
	assert_eq!(evidence.contributions[1].source, SourceType::Vector);
	assert_eq!(evidence.contributions[1].rank, 2);
}

#[tokio::test]
async fn agreement_across_sources_beats_a_better_single_rank() {
	let search = engine(
		SearchConfig::default(),
		all_sources(
			Fixed::arc(SourceType::Keyword, &["X", "Y"]),
			Fixed::arc(SourceType::Vector, &["P", "Q", "X"]),
			Fixed::arc(SourceType::Graph, &[]),
		),
		owned(&["X", "Y", "P", "Q"]),
	);
	let response = search
		.search(SearchRequest::new("anything", identity()))
		.await
		.expect("Failed to run search.");
	let ids = response.results.iter().map(|result| result.item_id.as_str()).collect::<Vec<_>>();

	// Y and Q tie at 1/62 with the same best rank, so the item id decides.
	assert_eq!(ids, vec!["X", "P", "Q", "Y"]);
	assert!((response.results[0].score - (1.0 / 61.0 + 1.0 / 63.0)).abs() < 1e-12);
	assert!((response.results[3].score - 1.0 / 62.0).abs() < 1e-12);

	let x_sources = response.results[0]
		.sources
		.iter()
		.map(|source| (source.source, source.rank))
		.collect::<Vec<_>>();

	assert_eq!(x_sources, vec![(SourceType::Keyword, 1), (SourceType::Vector, 3)]);
}

#[tokio::test]
async fn identical_searches_are_identical() {
	let search = engine(
		SearchConfig::default(),
		all_sources(
			Fixed::arc(SourceType::Keyword, &["a", "b", "c"]),
			Fixed::arc(SourceType::Vector, &["c", "a"]),
			Fixed::arc(SourceType::Graph, &["b", "d"]),
		),
		owned(&["a", "b", "c", "d"]),
	);
	let first = search
		.search(SearchRequest::new("same", identity()))
		.await
		.expect("Failed to run first search.");
	let second = search
		.search(SearchRequest::new("same", identity()))
		.await
		.expect("Failed to run second search.");

	assert_eq!(first.results, second.results);
	assert_eq!(first.status, second.status);
	assert_ne!(first.trace_id, second.trace_id);
}

#[tokio::test]
async fn results_are_truncated_to_the_requested_limit() {
	let search = engine(
		SearchConfig::default(),
		Sources::default().with(Fixed::arc(SourceType::Keyword, &["a", "b", "c", "d", "e"])),
		owned(&["a", "b", "c", "d", "e"]),
	);
	let response = search
		.search(SearchRequest::new("q", identity()).with_limit(2))
		.await
		.expect("Failed to run search.");
	let ids = response.results.iter().map(|result| result.item_id.as_str()).collect::<Vec<_>>();

	assert_eq!(ids, vec!["a", "b"]);
}

#[tokio::test]
async fn survivors_keep_their_original_ranks() {
	let records = Records::new([
		record("hidden", "u9", &[], Classification::Restricted),
		record("shared", "u9", &["g1"], Classification::Internal),
	]);
	let search = engine(
		SearchConfig::default(),
		Sources::default().with(Fixed::arc(SourceType::Keyword, &["hidden", "shared"])),
		records,
	);
	let response = search
		.search(SearchRequest::new("q", identity()))
		.await
		.expect("Failed to run search.");

	assert_eq!(response.results.len(), 1);
	assert_eq!(response.results[0].item_id, "shared");
	assert_eq!(response.results[0].evidence.contributions[0].rank, 2);
	assert_eq!(response.results[0].evidence.gate.rule, GateRule::GroupAcl);
	assert_eq!(response.results[0].evidence.gate.matched_groups, vec!["g1".to_string()]);
	assert!((response.results[0].score - 1.0 / 62.0).abs() < 1e-12);
}

#[tokio::test]
async fn candidates_from_the_wrong_source_are_dropped() {
	let keyword = Fixed::with_candidates(
		SourceType::Keyword,
		vec![candidate(SourceType::Keyword, "a", 1), candidate(SourceType::Vector, "b", 2)],
	);
	let search = engine(
		SearchConfig::default(),
		Sources::default().with(Arc::new(keyword)),
		owned(&["a", "b"]),
	);
	let response = search
		.search(SearchRequest::new("q", identity()))
		.await
		.expect("Failed to run search.");
	let ids = response.results.iter().map(|result| result.item_id.as_str()).collect::<Vec<_>>();

	assert_eq!(ids, vec!["a"]);
}

#[tokio::test]
async fn graph_evidence_carries_hops_and_seed() {
	let search = engine(
		SearchConfig::default(),
		Sources::default().with(Fixed::arc(SourceType::Graph, &["g"])),
		owned(&["g"]),
	);
	let response = search
		.search(SearchRequest::new("q", identity()))
		.await
		.expect("Failed to run search.");
	let contribution = &response.results[0].evidence.contributions[0];

	assert_eq!(contribution.source, SourceType::Graph);
	assert_eq!(contribution.hops, Some(1));
	assert_eq!(contribution.seed_node_id.as_deref(), Some("node-seed"));
}
