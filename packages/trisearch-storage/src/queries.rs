use std::collections::HashMap;

use sqlx::PgConnection;
use time::OffsetDateTime;

use trisearch_domain::{
	candidate::ScoredItem, query::SourceQuery, record::MemoryRecord, similarity::VectorMetric, text,
};

use crate::{
	Error, Result,
	models::{MemoryDocument, MemoryRecordRow, ScoredRow},
};

pub fn vector_to_pg(vec: &[f32]) -> String {
	let mut out = String::with_capacity(vec.len() * 8);

	out.push('[');

	for (idx, value) in vec.iter().enumerate() {
		if idx > 0 {
			out.push(',');
		}

		out.push_str(&value.to_string());
	}

	out.push(']');

	out
}

pub async fn upsert_document(executor: &mut PgConnection, doc: &MemoryDocument) -> Result<()> {
	let record = &doc.record;

	if record.item_id.trim().is_empty() {
		return Err(Error::InvalidArgument("item_id must not be empty".to_string()));
	}
	if record.tenant_id.trim().is_empty() {
		return Err(Error::InvalidArgument("tenant_id must not be empty".to_string()));
	}

	let acl_groups = record.acl_groups.iter().cloned().collect::<Vec<_>>();
	let tags = record.tags.iter().cloned().collect::<Vec<_>>();

	sqlx::query(
		"\
INSERT INTO memory_records (
	item_id,
	record_kind,
	record_id,
	tenant_id,
	project_id,
	owner_user_id,
	acl_groups,
	classification,
	tags,
	title,
	body,
	updated_at
)
VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
ON CONFLICT (item_id) DO UPDATE
SET
	record_kind = EXCLUDED.record_kind,
	record_id = EXCLUDED.record_id,
	tenant_id = EXCLUDED.tenant_id,
	project_id = EXCLUDED.project_id,
	owner_user_id = EXCLUDED.owner_user_id,
	acl_groups = EXCLUDED.acl_groups,
	classification = EXCLUDED.classification,
	tags = EXCLUDED.tags,
	title = EXCLUDED.title,
	body = EXCLUDED.body,
	updated_at = EXCLUDED.updated_at",
	)
	.bind(record.item_id.as_str())
	.bind(doc.record_ref.kind())
	.bind(doc.record_ref.id())
	.bind(record.tenant_id.as_str())
	.bind(record.project_id.as_deref())
	.bind(record.owner_user_id.as_str())
	.bind(&acl_groups)
	.bind(record.classification.as_str())
	.bind(&tags)
	.bind(doc.title.as_str())
	.bind(doc.body.as_str())
	.bind(record.updated_at)
	.execute(&mut *executor)
	.await?;

	if let Some(embedding) = doc.embedding.as_ref() {
		upsert_embedding(executor, record.item_id.as_str(), embedding).await?;
	}

	Ok(())
}

pub async fn upsert_embedding(
	executor: &mut PgConnection,
	item_id: &str,
	vec: &[f32],
) -> Result<()> {
	if vec.is_empty() {
		return Err(Error::InvalidArgument("embedding must not be empty".to_string()));
	}

	let dim = i32::try_from(vec.len())
		.map_err(|_| Error::InvalidArgument("embedding is too large".to_string()))?;

	sqlx::query(
		"\
INSERT INTO memory_embeddings (item_id, embedding_dim, vec)
VALUES ($1, $2, $3::text::vector)
ON CONFLICT (item_id) DO UPDATE
SET
	embedding_dim = EXCLUDED.embedding_dim,
	vec = EXCLUDED.vec,
	created_at = now()",
	)
	.bind(item_id)
	.bind(dim)
	.bind(vector_to_pg(vec))
	.execute(&mut *executor)
	.await?;

	Ok(())
}

pub async fn get_records(
	executor: &mut PgConnection,
	item_ids: &[String],
) -> Result<HashMap<String, MemoryRecord>> {
	if item_ids.is_empty() {
		return Ok(HashMap::new());
	}

	let rows = sqlx::query_as::<_, MemoryRecordRow>(
		"\
SELECT
	item_id,
	tenant_id,
	project_id,
	owner_user_id,
	acl_groups,
	classification,
	tags,
	updated_at
FROM memory_records
WHERE item_id = ANY($1::text[])",
	)
	.bind(item_ids)
	.fetch_all(&mut *executor)
	.await?;
	let mut records = HashMap::with_capacity(rows.len());

	for row in rows {
		let record = row.into_record()?;

		records.insert(record.item_id.clone(), record);
	}

	Ok(records)
}

/// Token-overlap and phrase search over title and body, using the same scoring shape as the
/// in-memory store: `ts_rank` coverage plus a bonus when the phrase occurs as consecutive whole
/// words of the title or the body.
pub async fn keyword_search(
	executor: &mut PgConnection,
	query: &SourceQuery<'_>,
) -> Result<Vec<ScoredItem>> {
	let terms = text::query_terms(query.text);

	if terms.is_empty() || query.limit == 0 {
		return Ok(Vec::new());
	}

	let tsquery = terms.join(" | ");
	let phrase = text::normalize(query.text);
	let (tags, from, to, limit) = filter_binds(query)?;
	let rows = sqlx::query_as::<_, ScoredRow>(
		"\
SELECT
	item_id,
	record_kind,
	record_id,
	updated_at,
	(
		ts_rank(search_tsv, to_tsquery('simple', $1))
		+ CASE
			WHEN to_tsvector('simple', normalize(title, NFKC)) @@ phraseto_tsquery('simple', $2)
				OR to_tsvector('simple', normalize(body, NFKC)) @@ phraseto_tsquery('simple', $2)
			THEN 1.0
			ELSE 0.0
		END
	)::real AS score
FROM memory_records
WHERE ($3::text IS NULL OR tenant_id = $3)
	AND search_tsv @@ to_tsquery('simple', $1)
	AND tags @> $4::text[]
	AND ($5::timestamptz IS NULL OR updated_at >= $5)
	AND ($6::timestamptz IS NULL OR updated_at < $6)
ORDER BY score DESC, updated_at DESC, item_id ASC
LIMIT $7",
	)
	.bind(tsquery)
	.bind(phrase)
	.bind(query.tenant_id)
	.bind(tags)
	.bind(from)
	.bind(to)
	.bind(limit)
	.fetch_all(&mut *executor)
	.await?;

	rows.into_iter().map(ScoredRow::into_scored).collect()
}

pub async fn vector_search(
	executor: &mut PgConnection,
	vector: &[f32],
	metric: VectorMetric,
	query: &SourceQuery<'_>,
) -> Result<Vec<ScoredItem>> {
	if vector.is_empty() {
		return Err(Error::InvalidArgument("query vector must not be empty".to_string()));
	}
	if query.limit == 0 {
		return Ok(Vec::new());
	}

	let (score_expr, order_expr) = match metric {
		VectorMetric::Cosine =>
			("(1 - (e.vec <=> $1::text::vector))::real", "e.vec <=> $1::text::vector"),
		VectorMetric::InnerProduct =>
			("(-(e.vec <#> $1::text::vector))::real", "e.vec <#> $1::text::vector"),
	};
	let sql = format!(
		"\
SELECT
	r.item_id,
	r.record_kind,
	r.record_id,
	r.updated_at,
	{score_expr} AS score
FROM memory_embeddings e
JOIN memory_records r ON r.item_id = e.item_id
WHERE e.embedding_dim = $2
	AND ($3::text IS NULL OR r.tenant_id = $3)
	AND r.tags @> $4::text[]
	AND ($5::timestamptz IS NULL OR r.updated_at >= $5)
	AND ($6::timestamptz IS NULL OR r.updated_at < $6)
ORDER BY {order_expr} ASC, r.updated_at DESC, r.item_id ASC
LIMIT $7"
	);
	let dim = i32::try_from(vector.len())
		.map_err(|_| Error::InvalidArgument("query vector is too large".to_string()))?;
	let (tags, from, to, limit) = filter_binds(query)?;
	let rows = sqlx::query_as::<_, ScoredRow>(&sql)
		.bind(vector_to_pg(vector))
		.bind(dim)
		.bind(query.tenant_id)
		.bind(tags)
		.bind(from)
		.bind(to)
		.bind(limit)
		.fetch_all(&mut *executor)
		.await?;

	rows.into_iter().map(ScoredRow::into_scored).collect()
}

pub(crate) fn filter_binds(
	query: &SourceQuery<'_>,
) -> Result<(Vec<String>, Option<OffsetDateTime>, Option<OffsetDateTime>, i64)> {
	let limit = i64::try_from(query.limit)
		.map_err(|_| Error::InvalidArgument("limit is too large".to_string()))?;

	Ok((query.filters.tag_list(), query.filters.from(), query.filters.to(), limit))
}
