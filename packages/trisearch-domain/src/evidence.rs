use serde::Serialize;

use crate::{
	candidate::{Candidate, SourceType},
	fusion::{FusedEntry, SourceRank, rrf_contribution},
	gating::{GateDecision, GateOutcome, GateRule},
	record::{Classification, MemoryRecord, RecordRef},
};

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct FusedResult {
	pub item_id: String,
	pub score: f64,
	pub sources: Vec<SourceRank>,
	pub evidence: EvidenceBundle,
}

/// Everything an auditor needs to explain a result without re-running the query.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct EvidenceBundle {
	pub item_id: String,
	pub contributions: Vec<Contribution>,
	pub gate: GateEvidence,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Contribution {
	pub source: SourceType,
	pub rank: u32,
	pub raw_score: f32,
	pub rrf_score: f64,
	pub record: RecordRef,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub hops: Option<u32>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub seed_node_id: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct GateEvidence {
	pub decision: GateDecision,
	pub rule: GateRule,
	#[serde(skip_serializing_if = "Vec::is_empty")]
	pub matched_groups: Vec<String>,
	pub tenant_id: String,
	pub owner_user_id: String,
	pub classification: Classification,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub project_id: Option<String>,
}

/// Builds the final result for one fused entry. Contributions are ordered by rank, then by
/// canonical source order.
pub fn assemble(entry: FusedEntry, record: &MemoryRecord, gate: &GateOutcome) -> FusedResult {
	let sources = entry.sources();
	let mut contributions = entry.members.into_iter().map(contribution).collect::<Vec<_>>();

	contributions.sort_by(|left, right| {
		left.rank.cmp(&right.rank).then_with(|| left.source.cmp(&right.source))
	});

	let gate = GateEvidence {
		decision: gate.decision,
		rule: gate.rule,
		matched_groups: gate.matched_groups.clone(),
		tenant_id: record.tenant_id.clone(),
		owner_user_id: record.owner_user_id.clone(),
		classification: record.classification,
		project_id: record.project_id.clone(),
	};

	FusedResult {
		item_id: entry.item_id.clone(),
		score: entry.score,
		sources,
		evidence: EvidenceBundle { item_id: entry.item_id, contributions, gate },
	}
}

fn contribution(candidate: Candidate) -> Contribution {
	let source = candidate.source();

	match candidate {
		Candidate::Keyword(hit) | Candidate::Vector(hit) => Contribution {
			source,
			rank: hit.rank,
			raw_score: hit.raw_score,
			rrf_score: rrf_contribution(hit.rank),
			record: hit.record,
			hops: None,
			seed_node_id: None,
		},
		Candidate::Graph(graph) => Contribution {
			source,
			rank: graph.hit.rank,
			raw_score: graph.hit.raw_score,
			rrf_score: rrf_contribution(graph.hit.rank),
			record: graph.hit.record,
			hops: Some(graph.hops),
			seed_node_id: Some(graph.seed_node_id),
		},
	}
}
