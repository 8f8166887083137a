//! Bounded breadth-first expansion from seed nodes.
//!
//! The walk is driven one hop at a time so that synchronous and async backends can feed it edges
//! for the current frontier however they fetch them.

use std::collections::{BTreeSet, HashMap};

use time::OffsetDateTime;

use crate::{
	candidate::{GraphReach, ScoredItem},
	record::RecordRef,
};

#[derive(Clone, Debug, PartialEq)]
pub struct GraphPolicy {
	pub max_hops: u32,
	pub hop_decay: f32,
	pub max_seeds: usize,
	pub max_nodes: usize,
	/// Empty means every edge type.
	pub edge_types: Vec<String>,
}
impl GraphPolicy {
	pub fn allows_edge(&self, edge_type: &str) -> bool {
		self.edge_types.is_empty() || self.edge_types.iter().any(|allowed| allowed == edge_type)
	}

	pub fn hop_score(&self, hops: u32) -> f32 {
		self.hop_decay.powi(hops.min(i32::MAX as u32) as i32)
	}
}
impl Default for GraphPolicy {
	fn default() -> Self {
		Self { max_hops: 3, hop_decay: 0.5, max_seeds: 8, max_nodes: 256, edge_types: Vec::new() }
	}
}

#[derive(Clone, Debug, PartialEq)]
pub struct Reached {
	pub node_id: String,
	pub hops: u32,
	pub seed_node_id: String,
	pub score: f32,
}

#[derive(Debug)]
pub struct GraphWalk {
	policy: GraphPolicy,
	visited: HashMap<String, Reached>,
	order: Vec<String>,
	frontier: Vec<String>,
	hops: u32,
}
impl GraphWalk {
	pub fn new<I>(seeds: I, policy: GraphPolicy) -> Self
	where
		I: IntoIterator<Item = String>,
	{
		let mut walk = Self {
			policy,
			visited: HashMap::new(),
			order: Vec::new(),
			frontier: Vec::new(),
			hops: 0,
		};
		let seeds = seeds.into_iter().collect::<BTreeSet<_>>();

		for seed in seeds.into_iter().take(walk.policy.max_seeds) {
			if walk.visited.len() >= walk.policy.max_nodes {
				break;
			}

			walk.visit(seed.clone(), seed.clone(), 0);
			walk.frontier.push(seed);
		}

		walk
	}

	/// Nodes whose neighbours the next call to [`GraphWalk::advance`] expects.
	pub fn frontier(&self) -> &[String] {
		&self.frontier
	}

	pub fn is_done(&self) -> bool {
		self.frontier.is_empty()
			|| self.hops >= self.policy.max_hops
			|| self.visited.len() >= self.policy.max_nodes
	}

	/// Expands one hop. `edges` are `(frontier_node, neighbour)` pairs; pairs whose first element
	/// is not on the current frontier are ignored. Already visited neighbours are never revisited,
	/// which keeps cycles finite.
	pub fn advance<I>(&mut self, edges: I)
	where
		I: IntoIterator<Item = (String, String)>,
	{
		if self.is_done() {
			self.frontier.clear();

			return;
		}

		let frontier = self.frontier.iter().cloned().collect::<BTreeSet<_>>();
		let edges = edges
			.into_iter()
			.filter(|(from, _)| frontier.contains(from))
			.collect::<BTreeSet<_>>();
		let next_hops = self.hops + 1;
		let mut next = Vec::new();

		for (from, to) in edges {
			if self.visited.len() >= self.policy.max_nodes {
				break;
			}
			if self.visited.contains_key(&to) {
				continue;
			}

			let seed = match self.visited.get(&from) {
				Some(reached) => reached.seed_node_id.clone(),
				None => continue,
			};

			self.visit(to.clone(), seed, next_hops);
			next.push(to);
		}

		self.hops = next_hops;
		self.frontier = next;
	}

	/// Every reached node in discovery order, seeds first.
	pub fn into_reached(mut self) -> Vec<Reached> {
		self.order.iter().filter_map(|node_id| self.visited.remove(node_id)).collect()
	}

	fn visit(&mut self, node_id: String, seed_node_id: String, hops: u32) {
		let score = self.policy.hop_score(hops);

		self.order.push(node_id.clone());
		self.visited.insert(node_id.clone(), Reached { node_id, hops, seed_node_id, score });
	}
}

/// A memory item attached to a graph node.
#[derive(Clone, Debug, PartialEq)]
pub struct LinkedItem {
	pub node_id: String,
	pub item_id: String,
	pub updated_at: OffsetDateTime,
}

/// Turns reached nodes into scored items. Nodes without a linked item produce nothing; the
/// candidate's record points at the node that carried the item.
pub fn scored_items(reached: &[Reached], links: &[LinkedItem]) -> Vec<ScoredItem<GraphReach>> {
	let mut by_node: HashMap<&str, Vec<&LinkedItem>> = HashMap::new();

	for link in links {
		by_node.entry(link.node_id.as_str()).or_default().push(link);
	}

	let mut items = Vec::new();

	for node in reached {
		let Some(links) = by_node.get(node.node_id.as_str()) else {
			continue;
		};

		for link in links {
			items.push(ScoredItem {
				item_id: link.item_id.clone(),
				score: node.score,
				updated_at: link.updated_at,
				record: RecordRef::Node(node.node_id.clone()),
				extra: GraphReach { hops: node.hops, seed_node_id: node.seed_node_id.clone() },
			});
		}
	}

	items
}
