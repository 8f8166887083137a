use std::{collections::BTreeSet, sync::Arc};

use time::macros::datetime;

use trisearch_domain::{
	candidate::SourceType,
	gating::GateRule,
	identity::IdentityContext,
	record::{Classification, MemoryRecord, RecordRef},
};
use trisearch_service::{
	BoxFuture, ChannelAuditSink, QueryEmbedder, SearchConfig, SearchRequest, SearchStatus,
	SourceError, TriSearch, adapters,
};
use trisearch_storage::{
	memory::InMemoryStore,
	models::{GraphEdge, GraphNode, MemoryDocument},
};

/// Points any query mentioning "lisbon" along the first axis.
struct AxisEmbedder;
impl QueryEmbedder for AxisEmbedder {
	fn embed_query<'a>(&'a self, text: &'a str) -> BoxFuture<'a, Result<Vec<f32>, SourceError>> {
		Box::pin(async move {
			if text.to_lowercase().contains("lisbon") { Ok(vec![1.0, 0.0]) } else { Ok(vec![0.0, 1.0]) }
		})
	}
}

fn document(
	item_id: &str,
	tenant_id: &str,
	owner: &str,
	groups: &[&str],
	classification: Classification,
	title: &str,
	embedding: Option<Vec<f32>>,
) -> MemoryDocument {
	MemoryDocument {
		record: MemoryRecord {
			item_id: item_id.to_string(),
			tenant_id: tenant_id.to_string(),
			owner_user_id: owner.to_string(),
			acl_groups: groups.iter().map(|group| group.to_string()).collect::<BTreeSet<_>>(),
			classification,
			project_id: None,
			tags: BTreeSet::new(),
			updated_at: datetime!(2026-04-01 09:00 UTC),
		},
		record_ref: RecordRef::Fact(format!("fact-{item_id}")),
		title: title.to_string(),
		body: String::new(),
		embedding,
	}
}

fn node(node_id: &str, label: &str, item_id: &str) -> GraphNode {
	GraphNode {
		node_id: node_id.to_string(),
		tenant_id: "t1".to_string(),
		label: label.to_string(),
		item_id: Some(item_id.to_string()),
	}
}

fn store() -> InMemoryStore {
	let mut store = InMemoryStore::new();

	for doc in [
		document("a", "t1", "u1", &[], Classification::Internal, "Lisbon trip", Some(vec![1.0, 0.0])),
		document("b", "t1", "u2", &["g1"], Classification::Internal, "Lisbon budget", Some(vec![0.8, 0.6])),
		document("c", "t1", "u2", &[], Classification::Restricted, "Lisbon secrets", Some(vec![1.0, 0.0])),
		document("d", "t2", "u1", &[], Classification::Public, "Lisbon trip", Some(vec![1.0, 0.0])),
		document("e", "t1", "u1", &[], Classification::Internal, "Alice", None),
	] {
		store.upsert_document(doc).expect("Failed to insert document.");
	}

	store.upsert_node(node("n-trip", "Lisbon trip", "a")).expect("Failed to insert node.");
	store.upsert_node(node("n-alice", "Alice", "e")).expect("Failed to insert node.");
	store
		.insert_edge(GraphEdge {
			tenant_id: "t1".to_string(),
			src_node_id: "n-alice".to_string(),
			dst_node_id: "n-trip".to_string(),
			edge_type: "participated_in".to_string(),
		})
		.expect("Failed to insert edge.");

	store
}

fn engine() -> (TriSearch, tokio::sync::mpsc::Receiver<trisearch_service::SearchEvent>) {
	let cfg = SearchConfig::default();
	let store = Arc::new(store());
	let sources = adapters::memory::sources(store.clone(), Some(Arc::new(AxisEmbedder)), &cfg);
	let (sink, rx) = ChannelAuditSink::new(8);

	(TriSearch::new(cfg, sources, store).with_audit(Arc::new(sink)), rx)
}

#[tokio::test]
async fn tri_search_over_the_in_memory_store() {
	let (search, mut rx) = engine();
	let identity = IdentityContext::new("t1", "u1").with_groups(["g1"]);
	let response = search
		.search(SearchRequest::new("Lisbon trip", identity))
		.await
		.expect("Failed to run search.");
	let ids = response.results.iter().map(|result| result.item_id.as_str()).collect::<Vec<_>>();

	assert_eq!(response.status, SearchStatus::Complete);
	assert_eq!(ids, vec!["a", "b", "e"]);
	assert!((response.results[0].score - 3.0 / 61.0).abs() < 1e-12);

	let b = &response.results[1];

	assert_eq!(b.evidence.gate.rule, GateRule::GroupAcl);
	assert_eq!(
		b.sources.iter().map(|source| (source.source, source.rank)).collect::<Vec<_>>(),
		vec![(SourceType::Keyword, 2), (SourceType::Vector, 3)]
	);

	let e = &response.results[2].evidence.contributions[0];

	assert_eq!(e.source, SourceType::Graph);
	assert_eq!(e.hops, Some(1));
	assert_eq!(e.seed_node_id.as_deref(), Some("n-trip"));
	assert_eq!(e.record, RecordRef::Node("n-alice".to_string()));

	let event = rx.try_recv().expect("Expected an audit event.");

	// "c" is denied once for each source that found it.
	assert_eq!(event.rejected_count, 2);
	assert_eq!(event.result_count, 3);
}

#[tokio::test]
async fn other_tenants_never_surface() {
	let (search, _rx) = engine();
	let response = search
		.search(SearchRequest::new("Lisbon trip", IdentityContext::new("t2", "u1")))
		.await
		.expect("Failed to run search.");
	let ids = response.results.iter().map(|result| result.item_id.as_str()).collect::<Vec<_>>();

	assert_eq!(ids, vec!["d"]);
	assert_eq!(response.results[0].evidence.gate.tenant_id, "t2");
}
