use uuid::Uuid;

use crate::search::SearchStatus;

/// Lifecycle of one search call.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum QueryState {
	Received,
	Dispatching,
	Awaiting { pending: usize },
	Gating,
	Fusing,
	Complete,
	PartialFailure,
	Failed,
}
impl QueryState {
	pub fn as_str(self) -> &'static str {
		match self {
			Self::Received => "received",
			Self::Dispatching => "dispatching",
			Self::Awaiting { .. } => "awaiting",
			Self::Gating => "gating",
			Self::Fusing => "fusing",
			Self::Complete => "complete",
			Self::PartialFailure => "partial_failure",
			Self::Failed => "failed",
		}
	}

	pub fn is_terminal(self) -> bool {
		matches!(self, Self::Complete | Self::PartialFailure | Self::Failed)
	}

	pub fn can_advance_to(self, next: Self) -> bool {
		match (self, next) {
			(Self::Received, Self::Dispatching) => true,
			(Self::Dispatching, Self::Awaiting { .. }) => true,
			(Self::Awaiting { .. }, Self::Gating) => true,
			(Self::Gating, Self::Fusing) => true,
			(Self::Fusing, Self::Complete | Self::PartialFailure) => true,
			// Validation failures, all sources down, and record store failures end the run early.
			(Self::Received | Self::Awaiting { .. } | Self::Gating, Self::Failed) => true,
			_ => false,
		}
	}
}
impl From<SearchStatus> for QueryState {
	fn from(status: SearchStatus) -> Self {
		match status {
			SearchStatus::Complete => Self::Complete,
			SearchStatus::PartialFailure => Self::PartialFailure,
			SearchStatus::Failed => Self::Failed,
		}
	}
}

/// Tracks and logs state transitions for one call.
#[derive(Debug)]
pub(crate) struct QueryRun {
	trace_id: Uuid,
	state: QueryState,
}
impl QueryRun {
	pub(crate) fn new(trace_id: Uuid) -> Self {
		tracing::debug!(trace_id = %trace_id, state = QueryState::Received.as_str(), "Search received.");

		Self { trace_id, state: QueryState::Received }
	}

	pub(crate) fn state(&self) -> QueryState {
		self.state
	}

	pub(crate) fn advance(&mut self, next: QueryState) {
		debug_assert!(
			self.state.can_advance_to(next),
			"Illegal search state transition from {:?} to {next:?}.",
			self.state
		);

		tracing::debug!(
			trace_id = %self.trace_id,
			from = self.state.as_str(),
			to = next.as_str(),
			pending = match next {
				QueryState::Awaiting { pending } => pending,
				_ => 0,
			},
			"Search state advanced."
		);

		self.state = next;
	}
}
