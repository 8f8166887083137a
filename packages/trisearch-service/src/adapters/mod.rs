//! Source adapters over the two storage backends.
//!
//! Each adapter runs one read-only query against its backend and ranks the result with the shared
//! domain ranking, so the orchestrator sees the same candidate shape from either backend.

pub mod memory;
pub mod postgres;

pub use memory::{MemoryGraph, MemoryKeyword, MemoryVector};
pub use postgres::{PgGraph, PgKeyword, PgRecordStore, PgVector};
