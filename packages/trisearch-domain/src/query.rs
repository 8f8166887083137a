use crate::filter::FilterSet;

/// What each source adapter receives for one search.
///
/// `tenant_id` is a prefilter hint so backends can skip other tenants' data early. It is not an
/// access decision; gating re-checks every candidate.
#[derive(Clone, Copy, Debug)]
pub struct SourceQuery<'a> {
	pub text: &'a str,
	pub limit: usize,
	pub filters: &'a FilterSet,
	pub tenant_id: Option<&'a str>,
}
impl<'a> SourceQuery<'a> {
	pub fn new(text: &'a str, limit: usize, filters: &'a FilterSet) -> Self {
		Self { text, limit, filters, tenant_id: None }
	}

	pub fn with_tenant(mut self, tenant_id: &'a str) -> Self {
		self.tenant_id = Some(tenant_id);

		self
	}

	pub fn tenant_allows(&self, tenant_id: &str) -> bool {
		self.tenant_id.map(|expected| expected == tenant_id).unwrap_or(true)
	}
}
