pub mod candidate;
pub mod evidence;
pub mod filter;
pub mod fusion;
pub mod gating;
pub mod graph;
pub mod identity;
pub mod query;
pub mod record;
pub mod similarity;
pub mod text;
pub mod time_serde;
