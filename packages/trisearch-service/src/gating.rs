use std::collections::HashMap;

use trisearch_domain::{
	candidate::Candidate,
	gating::{self, GateOutcome},
	identity::IdentityContext,
	record::MemoryRecord,
};

/// Per-query access filter. Every candidate is evaluated independently of its source, and every
/// denial (including a missing record) bumps the rejected count.
pub struct GatingFilter<'a> {
	identity: &'a IdentityContext,
	records: &'a HashMap<String, MemoryRecord>,
	outcomes: HashMap<String, GateOutcome>,
	rejected: usize,
}
impl<'a> GatingFilter<'a> {
	pub fn new(identity: &'a IdentityContext, records: &'a HashMap<String, MemoryRecord>) -> Self {
		Self { identity, records, outcomes: HashMap::new(), rejected: 0 }
	}

	pub fn admit(&mut self, candidate: &Candidate) -> bool {
		let item_id = candidate.item_id();
		let records = self.records;
		let identity = self.identity;
		let Some(record) = records.get(item_id) else {
			self.rejected += 1;

			return false;
		};
		let outcome = self
			.outcomes
			.entry(item_id.to_string())
			.or_insert_with(|| gating::evaluate(record, identity));

		if outcome.is_allowed() {
			true
		} else {
			self.rejected += 1;

			false
		}
	}

	/// Keeps admitted candidates and preserves their original ranks.
	pub fn filter(&mut self, candidates: Vec<Candidate>) -> Vec<Candidate> {
		candidates.into_iter().filter(|candidate| self.admit(candidate)).collect()
	}

	pub fn rejected_count(&self) -> usize {
		self.rejected
	}

	pub fn outcome(&self, item_id: &str) -> Option<&GateOutcome> {
		self.outcomes.get(item_id)
	}

	pub fn record(&self, item_id: &str) -> Option<&'a MemoryRecord> {
		self.records.get(item_id)
	}
}
