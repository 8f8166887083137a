//! Text normalization shared by the keyword scorer and graph seed matching.

use std::collections::HashSet;

use unicode_normalization::UnicodeNormalization;
use unicode_segmentation::UnicodeSegmentation;

const PHRASE_BONUS: f32 = 1.0;
const TITLE_WEIGHT: f32 = 0.5;

/// NFKC-folds and lowercases `text`, collapsing runs of whitespace to one space.
pub fn normalize(text: &str) -> String {
	let folded = text.nfkc().collect::<String>().to_lowercase();

	folded.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Unique word tokens of `text` in first-seen order.
pub fn tokenize(text: &str) -> Vec<String> {
	let normalized = normalize(text);
	let mut seen = HashSet::new();
	let mut tokens = Vec::new();

	for word in normalized.unicode_words() {
		if seen.insert(word) {
			tokens.push(word.to_string());
		}
	}

	tokens
}

/// Tokens restricted to alphanumeric characters, safe to splice into a Postgres tsquery.
pub fn query_terms(text: &str) -> Vec<String> {
	let mut seen = HashSet::new();

	tokenize(text)
		.into_iter()
		.map(|token| token.chars().filter(|ch| ch.is_alphanumeric()).collect::<String>())
		.filter(|token| !token.is_empty())
		.filter(|token| seen.insert(token.clone()))
		.collect()
}

/// Lexical relevance of a document to a query, or `None` when nothing overlaps.
///
/// The score is the fraction of query tokens found in the document, plus a bonus when the whole
/// normalized query appears as a run of whole words, plus a smaller weight for tokens that hit the
/// title.
pub fn keyword_score(query: &str, title: &str, body: &str) -> Option<f32> {
	let query_tokens = tokenize(query);

	if query_tokens.is_empty() {
		return None;
	}

	let title_norm = normalize(title);
	let body_norm = normalize(body);
	let title_words = title_norm.unicode_words().collect::<Vec<_>>();
	let body_words = body_norm.unicode_words().collect::<Vec<_>>();
	let title_tokens = title_words.iter().copied().collect::<HashSet<_>>();
	let body_tokens = body_words.iter().copied().collect::<HashSet<_>>();
	let total = query_tokens.len() as f32;
	let matched = query_tokens
		.iter()
		.filter(|token| title_tokens.contains(token.as_str()) || body_tokens.contains(token.as_str()))
		.count() as f32;
	let title_matched =
		query_tokens.iter().filter(|token| title_tokens.contains(token.as_str())).count() as f32;
	let phrase = normalize(query);
	let phrase_words = phrase.unicode_words().collect::<Vec<_>>();
	let phrase_hit =
		contains_phrase(&title_words, &phrase_words) || contains_phrase(&body_words, &phrase_words);

	if matched == 0.0 && !phrase_hit {
		return None;
	}

	let mut score = matched / total + TITLE_WEIGHT * (title_matched / total);

	if phrase_hit {
		score += PHRASE_BONUS;
	}

	Some(score)
}

// Phrases match whole words in sequence, never a fragment of a longer word.
fn contains_phrase(words: &[&str], phrase: &[&str]) -> bool {
	!phrase.is_empty() && words.windows(phrase.len()).any(|window| window == phrase)
}

/// Whether every token of a graph node label occurs in the query.
pub fn label_matches(query_tokens: &[String], label: &str) -> bool {
	let label_tokens = tokenize(label);

	!label_tokens.is_empty() && label_tokens.iter().all(|token| query_tokens.contains(token))
}

#[cfg(test)]
mod tests {
	use crate::text::{keyword_score, label_matches, normalize, query_terms, tokenize};

	#[test]
	fn normalize_folds_width_and_case() {
		assert_eq!(normalize("  Ｈｅｌｌｏ \t WORLD "), "hello world");
	}

	#[test]
	fn tokenize_dedups_in_order() {
		assert_eq!(tokenize("Alice met alice, then Bob."), vec!["alice", "met", "then", "bob"]);
	}

	#[test]
	fn query_terms_strip_punctuation_inside_words() {
		assert_eq!(query_terms("Don't stop"), vec!["dont", "stop"]);
	}

	#[test]
	fn phrase_match_outranks_scattered_tokens() {
		let phrase = keyword_score("trip to Lisbon", "Notes", "Planning the trip to Lisbon in May.")
			.expect("Expected a phrase match.");
		let scattered = keyword_score("trip to Lisbon", "Notes", "Lisbon is far; a trip is long.")
			.expect("Expected a token match.");

		assert!(phrase > scattered, "phrase={phrase} scattered={scattered}");
	}

	#[test]
	fn phrase_matches_whole_words_only() {
		assert_eq!(keyword_score("cat", "Notes", "We concatenate the education logs."), None);
		assert_eq!(keyword_score("cat", "Notes", "The cat sat."), Some(2.0));

		let split = keyword_score("the trip", "Notes", "Other trip; the end.")
			.expect("Expected a token match.");

		assert_eq!(split, 1.0);
	}

	#[test]
	fn title_hits_weigh_more_than_body_hits() {
		let title = keyword_score("budget", "Budget review", "numbers").expect("Expected a match.");
		let body = keyword_score("budget", "Review", "the budget numbers").expect("Expected a match.");

		assert!(title > body);
	}

	#[test]
	fn no_overlap_is_none() {
		assert_eq!(keyword_score("volcano", "Notes", "Nothing related."), None);
		assert_eq!(keyword_score("   ", "Notes", "Anything."), None);
	}

	#[test]
	fn label_matching_requires_every_label_token() {
		let query = tokenize("what did Alice Smith establish");

		assert!(label_matches(&query, "Alice Smith"));
		assert!(!label_matches(&query, "Alice Jones"));
		assert!(!label_matches(&query, "  "));
	}
}
