use std::{
	fmt::{Display, Formatter, Result as FmtResult},
	str::FromStr,
};

use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum VectorMetric {
	#[default]
	Cosine,
	InnerProduct,
}
impl VectorMetric {
	pub fn as_str(self) -> &'static str {
		match self {
			Self::Cosine => "cosine",
			Self::InnerProduct => "inner_product",
		}
	}

	/// Higher is more similar. `None` when the vectors cannot be compared.
	pub fn score(self, left: &[f32], right: &[f32]) -> Option<f32> {
		match self {
			Self::Cosine => cosine(left, right),
			Self::InnerProduct => inner_product(left, right),
		}
	}
}
impl Display for VectorMetric {
	fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
		f.write_str(self.as_str())
	}
}
impl FromStr for VectorMetric {
	type Err = String;

	fn from_str(raw: &str) -> Result<Self, Self::Err> {
		match raw.trim() {
			"cosine" => Ok(Self::Cosine),
			"inner_product" => Ok(Self::InnerProduct),
			other => Err(format!("Unknown vector metric {other:?}.")),
		}
	}
}

pub fn inner_product(left: &[f32], right: &[f32]) -> Option<f32> {
	if left.is_empty() || left.len() != right.len() {
		return None;
	}

	let dot = left.iter().zip(right).map(|(a, b)| a * b).sum::<f32>();

	dot.is_finite().then_some(dot)
}

pub fn cosine(left: &[f32], right: &[f32]) -> Option<f32> {
	let dot = inner_product(left, right)?;
	let left_norm = left.iter().map(|value| value * value).sum::<f32>().sqrt();
	let right_norm = right.iter().map(|value| value * value).sum::<f32>().sqrt();

	if left_norm == 0.0 || right_norm == 0.0 {
		return None;
	}

	let score = dot / (left_norm * right_norm);

	score.is_finite().then_some(score)
}
