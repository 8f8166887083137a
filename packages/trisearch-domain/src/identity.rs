use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// Caller identity as asserted by the upstream identity layer.
///
/// A blank `tenant_id` is never defaulted. The orchestrator rejects it before any source runs.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct IdentityContext {
	pub tenant_id: String,
	#[serde(default)]
	pub user_id: String,
	#[serde(default)]
	pub groups: BTreeSet<String>,
	#[serde(default)]
	pub project_id: Option<String>,
}
impl IdentityContext {
	pub fn new(tenant_id: impl Into<String>, user_id: impl Into<String>) -> Self {
		Self { tenant_id: tenant_id.into(), user_id: user_id.into(), ..Default::default() }
	}

	pub fn with_groups<I, S>(mut self, groups: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		self.groups.extend(groups.into_iter().map(Into::into));

		self
	}

	pub fn with_project(mut self, project_id: impl Into<String>) -> Self {
		self.project_id = Some(project_id.into());

		self
	}

	pub fn has_tenant(&self) -> bool {
		!self.tenant_id.trim().is_empty()
	}

	/// Trims every field and drops blank group names and a blank project.
	pub fn normalized(&self) -> Self {
		let groups = self
			.groups
			.iter()
			.map(|group| group.trim())
			.filter(|group| !group.is_empty())
			.map(str::to_string)
			.collect();
		let project_id = self
			.project_id
			.as_deref()
			.map(str::trim)
			.filter(|project| !project.is_empty())
			.map(str::to_string);

		Self {
			tenant_id: self.tenant_id.trim().to_string(),
			user_id: self.user_id.trim().to_string(),
			groups,
			project_id,
		}
	}
}
