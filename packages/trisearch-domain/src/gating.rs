use serde::{Deserialize, Serialize};

use crate::{
	identity::IdentityContext,
	record::{Classification, MemoryRecord},
};

/// Access rules in evaluation order. The first rule that applies decides.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GateRule {
	TenantMismatch,
	Owner,
	GroupAcl,
	PublicClassification,
	DefaultDeny,
}
impl GateRule {
	pub fn as_str(self) -> &'static str {
		match self {
			Self::TenantMismatch => "tenant_mismatch",
			Self::Owner => "owner",
			Self::GroupAcl => "group_acl",
			Self::PublicClassification => "public_classification",
			Self::DefaultDeny => "default_deny",
		}
	}

	pub fn decision(self) -> GateDecision {
		match self {
			Self::Owner | Self::GroupAcl | Self::PublicClassification => GateDecision::Allow,
			Self::TenantMismatch | Self::DefaultDeny => GateDecision::Deny,
		}
	}
}

#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GateDecision {
	Allow,
	Deny,
}

#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct GateOutcome {
	pub decision: GateDecision,
	pub rule: GateRule,
	/// Non-empty only when `rule` is `GroupAcl`.
	pub matched_groups: Vec<String>,
}
impl GateOutcome {
	fn from_rule(rule: GateRule) -> Self {
		Self { decision: rule.decision(), rule, matched_groups: Vec::new() }
	}

	pub fn is_allowed(&self) -> bool {
		self.decision == GateDecision::Allow
	}
}

pub fn evaluate(record: &MemoryRecord, identity: &IdentityContext) -> GateOutcome {
	if record.tenant_id != identity.tenant_id {
		return GateOutcome::from_rule(GateRule::TenantMismatch);
	}
	if !identity.user_id.is_empty() && record.owner_user_id == identity.user_id {
		return GateOutcome::from_rule(GateRule::Owner);
	}

	let matched_groups = record
		.acl_groups
		.intersection(&identity.groups)
		.filter(|group| !group.trim().is_empty())
		.cloned()
		.collect::<Vec<_>>();

	if !matched_groups.is_empty() {
		return GateOutcome { decision: GateDecision::Allow, rule: GateRule::GroupAcl, matched_groups };
	}
	if record.classification == Classification::Public {
		return GateOutcome::from_rule(GateRule::PublicClassification);
	}

	GateOutcome::from_rule(GateRule::DefaultDeny)
}

#[cfg(test)]
mod tests {
	use time::macros::datetime;

	use crate::{
		gating::{GateDecision, GateRule, evaluate},
		identity::IdentityContext,
		record::{Classification, MemoryRecord},
	};

	fn record(tenant: &str, owner: &str, groups: &[&str], classification: Classification) -> MemoryRecord {
		MemoryRecord {
			item_id: "item".to_string(),
			tenant_id: tenant.to_string(),
			owner_user_id: owner.to_string(),
			acl_groups: groups.iter().map(|group| group.to_string()).collect(),
			classification,
			project_id: None,
			tags: Default::default(),
			updated_at: datetime!(2026-01-01 00:00 UTC),
		}
	}

	#[test]
	fn tenant_mismatch_beats_every_allow_rule() {
		let identity = IdentityContext::new("t1", "u1").with_groups(["g1"]);
		let outcome = evaluate(&record("t2", "u1", &["g1"], Classification::Public), &identity);

		assert_eq!(outcome.rule, GateRule::TenantMismatch);
		assert_eq!(outcome.decision, GateDecision::Deny);
	}

	#[test]
	fn owner_is_checked_before_groups() {
		let identity = IdentityContext::new("t1", "u1").with_groups(["g1"]);
		let outcome = evaluate(&record("t1", "u1", &["g1"], Classification::Restricted), &identity);

		assert_eq!(outcome.rule, GateRule::Owner);
		assert!(outcome.matched_groups.is_empty());
	}

	#[test]
	fn group_acl_reports_matched_groups() {
		let identity = IdentityContext::new("t1", "u1").with_groups(["g1", "g3"]);
		let outcome =
			evaluate(&record("t1", "u2", &["g3", "g1", "g9"], Classification::Internal), &identity);

		assert_eq!(outcome.rule, GateRule::GroupAcl);
		assert_eq!(outcome.matched_groups, vec!["g1".to_string(), "g3".to_string()]);
	}

	#[test]
	fn public_records_are_visible_inside_the_tenant() {
		let identity = IdentityContext::new("t1", "u1");
		let outcome = evaluate(&record("t1", "u2", &["g2"], Classification::Public), &identity);

		assert_eq!(outcome.rule, GateRule::PublicClassification);
		assert!(outcome.is_allowed());
	}

	#[test]
	fn everything_else_is_denied() {
		let identity = IdentityContext::new("t1", "u1").with_groups(["g1"]);
		let outcome = evaluate(&record("t1", "u2", &["g2"], Classification::Internal), &identity);

		assert_eq!(outcome.rule, GateRule::DefaultDeny);
		assert!(!outcome.is_allowed());
	}

	#[test]
	fn blank_user_never_matches_blank_owner() {
		let identity = IdentityContext::new("t1", "");
		let outcome = evaluate(&record("t1", "", &[], Classification::Restricted), &identity);

		assert_eq!(outcome.rule, GateRule::DefaultDeny);
	}

	#[test]
	fn blank_group_names_never_match() {
		let identity = IdentityContext::new("t1", "u1").with_groups([""]);
		let outcome = evaluate(&record("t1", "u2", &[""], Classification::Internal), &identity);

		assert_eq!(outcome.rule, GateRule::DefaultDeny);
	}
}
