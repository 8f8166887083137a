use std::{
	cmp::Ordering,
	collections::HashSet,
	fmt::{Display, Formatter, Result as FmtResult},
};

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::record::RecordRef;

/// Retrieval channel a candidate came from. The declaration order is the canonical order used
/// wherever sources are listed or summed.
#[derive(
	Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize,
)]
#[serde(rename_all = "snake_case")]
pub enum SourceType {
	Keyword,
	Vector,
	Graph,
}
impl SourceType {
	pub const ALL: [Self; 3] = [Self::Keyword, Self::Vector, Self::Graph];

	pub fn as_str(self) -> &'static str {
		match self {
			Self::Keyword => "keyword",
			Self::Vector => "vector",
			Self::Graph => "graph",
		}
	}
}
impl Display for SourceType {
	fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Core of every candidate. `rank` is 1-based and unique within the list that produced it.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Hit {
	pub item_id: String,
	pub rank: u32,
	pub raw_score: f32,
	pub record: RecordRef,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct GraphHit {
	pub hit: Hit,
	pub hops: u32,
	pub seed_node_id: String,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "source", rename_all = "snake_case")]
pub enum Candidate {
	Keyword(Hit),
	Vector(Hit),
	Graph(GraphHit),
}
impl Candidate {
	pub fn source(&self) -> SourceType {
		match self {
			Self::Keyword(_) => SourceType::Keyword,
			Self::Vector(_) => SourceType::Vector,
			Self::Graph(_) => SourceType::Graph,
		}
	}

	pub fn hit(&self) -> &Hit {
		match self {
			Self::Keyword(hit) | Self::Vector(hit) => hit,
			Self::Graph(graph) => &graph.hit,
		}
	}

	pub fn item_id(&self) -> &str {
		&self.hit().item_id
	}

	pub fn rank(&self) -> u32 {
		self.hit().rank
	}

	pub fn hops(&self) -> Option<u32> {
		match self {
			Self::Graph(graph) => Some(graph.hops),
			Self::Keyword(_) | Self::Vector(_) => None,
		}
	}

	pub fn seed_node_id(&self) -> Option<&str> {
		match self {
			Self::Graph(graph) => Some(graph.seed_node_id.as_str()),
			Self::Keyword(_) | Self::Vector(_) => None,
		}
	}
}

/// Unranked match produced by a backend before list ordering is fixed.
#[derive(Clone, Debug, PartialEq)]
pub struct ScoredItem<T = ()> {
	pub item_id: String,
	pub score: f32,
	pub updated_at: OffsetDateTime,
	pub record: RecordRef,
	pub extra: T,
}

/// Graph-specific payload carried through ranking.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct GraphReach {
	pub hops: u32,
	pub seed_node_id: String,
}

/// Orders scored items by score, then recency, then item id, keeps the first occurrence of each
/// item, and assigns ranks 1..=N with N at most `limit`.
///
/// Non-finite scores are dropped.
pub fn rank_scored<T>(mut items: Vec<ScoredItem<T>>, limit: usize) -> Vec<(Hit, T)> {
	items.retain(|item| item.score.is_finite());
	items.sort_by(compare_scored);

	let mut seen = HashSet::new();
	let mut ranked = Vec::with_capacity(items.len().min(limit));

	for item in items {
		if ranked.len() >= limit {
			break;
		}
		if !seen.insert(item.item_id.clone()) {
			continue;
		}

		let rank = ranked.len() as u32 + 1;
		let hit =
			Hit { item_id: item.item_id, rank, raw_score: item.score, record: item.record };

		ranked.push((hit, item.extra));
	}

	ranked
}

pub fn keyword_candidates(items: Vec<ScoredItem>, limit: usize) -> Vec<Candidate> {
	rank_scored(items, limit).into_iter().map(|(hit, ())| Candidate::Keyword(hit)).collect()
}

pub fn vector_candidates(items: Vec<ScoredItem>, limit: usize) -> Vec<Candidate> {
	rank_scored(items, limit).into_iter().map(|(hit, ())| Candidate::Vector(hit)).collect()
}

pub fn graph_candidates(items: Vec<ScoredItem<GraphReach>>, limit: usize) -> Vec<Candidate> {
	rank_scored(items, limit)
		.into_iter()
		.map(|(hit, reach)| {
			Candidate::Graph(GraphHit { hit, hops: reach.hops, seed_node_id: reach.seed_node_id })
		})
		.collect()
}

fn compare_scored<T>(left: &ScoredItem<T>, right: &ScoredItem<T>) -> Ordering {
	right
		.score
		.total_cmp(&left.score)
		.then_with(|| right.updated_at.cmp(&left.updated_at))
		.then_with(|| left.item_id.cmp(&right.item_id))
}
