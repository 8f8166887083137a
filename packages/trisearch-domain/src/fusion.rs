//! Reciprocal Rank Fusion over per-source candidate lists.

use std::{cmp::Ordering, collections::BTreeMap};

use serde::Serialize;

use crate::candidate::{Candidate, SourceType};

/// RRF smoothing constant. Fixed so fused scores stay comparable across deployments.
pub const RRF_K: f64 = 60.0;

#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
pub struct SourceRank {
	pub source: SourceType,
	pub rank: u32,
}

/// One item after merging: its fused score and the best candidate from each source that found it.
#[derive(Clone, Debug, PartialEq)]
pub struct FusedEntry {
	pub item_id: String,
	pub score: f64,
	/// At most one candidate per source, in canonical source order.
	pub members: Vec<Candidate>,
}
impl FusedEntry {
	pub fn best_rank(&self) -> u32 {
		self.members.iter().map(Candidate::rank).min().unwrap_or(u32::MAX)
	}

	pub fn sources(&self) -> Vec<SourceRank> {
		self.members
			.iter()
			.map(|member| SourceRank { source: member.source(), rank: member.rank() })
			.collect()
	}
}

pub fn rrf_contribution(rank: u32) -> f64 {
	1.0 / (RRF_K + f64::from(rank))
}

/// Merges candidates from every source into a single ordering truncated to `limit`.
///
/// Ranks are taken as given. When one source lists an item more than once, only its best rank
/// counts. The result is independent of input order.
pub fn fuse<I>(candidates: I, limit: usize) -> Vec<FusedEntry>
where
	I: IntoIterator<Item = Candidate>,
{
	let mut grouped: BTreeMap<String, BTreeMap<SourceType, Candidate>> = BTreeMap::new();

	for candidate in candidates {
		let per_source = grouped.entry(candidate.item_id().to_string()).or_default();
		let source = candidate.source();
		let keep = per_source
			.get(&source)
			.map(|existing| prefer(&candidate, existing) == Ordering::Less)
			.unwrap_or(true);

		if keep {
			per_source.insert(source, candidate);
		}
	}

	let mut entries = grouped
		.into_iter()
		.map(|(item_id, per_source)| {
			let members = per_source.into_values().collect::<Vec<_>>();
			let score = members.iter().map(|member| rrf_contribution(member.rank())).sum();

			FusedEntry { item_id, score, members }
		})
		.collect::<Vec<_>>();

	entries.sort_by(compare_entries);
	entries.truncate(limit);

	entries
}

fn prefer(candidate: &Candidate, existing: &Candidate) -> Ordering {
	candidate
		.rank()
		.cmp(&existing.rank())
		.then_with(|| existing.hit().raw_score.total_cmp(&candidate.hit().raw_score))
}

fn compare_entries(left: &FusedEntry, right: &FusedEntry) -> Ordering {
	right
		.score
		.total_cmp(&left.score)
		.then_with(|| left.best_rank().cmp(&right.best_rank()))
		.then_with(|| left.item_id.cmp(&right.item_id))
}
