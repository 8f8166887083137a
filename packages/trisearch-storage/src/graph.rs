use sqlx::PgConnection;

use trisearch_domain::{
	candidate::{GraphReach, ScoredItem},
	graph::{self, GraphPolicy, GraphWalk, LinkedItem},
	query::SourceQuery,
	text,
};

use crate::{
	Error, Result,
	models::{GraphEdge, GraphNode, LinkedItemRow},
	queries,
};

pub async fn upsert_node(executor: &mut PgConnection, node: &GraphNode) -> Result<()> {
	if node.node_id.trim().is_empty() {
		return Err(Error::InvalidArgument("graph node_id must not be empty".to_string()));
	}

	let label_tokens = text::tokenize(&node.label);

	sqlx::query(
		"\
INSERT INTO graph_nodes (node_id, tenant_id, label, label_tokens, item_id)
VALUES ($1, $2, $3, $4, $5)
ON CONFLICT (node_id) DO UPDATE
SET
	tenant_id = EXCLUDED.tenant_id,
	label = EXCLUDED.label,
	label_tokens = EXCLUDED.label_tokens,
	item_id = EXCLUDED.item_id",
	)
	.bind(node.node_id.as_str())
	.bind(node.tenant_id.as_str())
	.bind(node.label.as_str())
	.bind(&label_tokens)
	.bind(node.item_id.as_deref())
	.execute(&mut *executor)
	.await?;

	Ok(())
}

pub async fn insert_edge(executor: &mut PgConnection, edge: &GraphEdge) -> Result<()> {
	if edge.edge_type.trim().is_empty() {
		return Err(Error::InvalidArgument("graph edge_type must not be empty".to_string()));
	}

	sqlx::query(
		"\
INSERT INTO graph_edges (tenant_id, src_node_id, dst_node_id, edge_type)
VALUES ($1, $2, $3, $4)
ON CONFLICT (src_node_id, dst_node_id, edge_type) DO NOTHING",
	)
	.bind(edge.tenant_id.as_str())
	.bind(edge.src_node_id.as_str())
	.bind(edge.dst_node_id.as_str())
	.bind(edge.edge_type.trim())
	.execute(&mut *executor)
	.await?;

	Ok(())
}

/// Nodes whose every label token occurs in the query, most specific label first.
pub async fn find_seed_nodes(
	executor: &mut PgConnection,
	tenant_id: Option<&str>,
	query_tokens: &[String],
	max_seeds: usize,
) -> Result<Vec<String>> {
	if query_tokens.is_empty() || max_seeds == 0 {
		return Ok(Vec::new());
	}

	let max_seeds = i64::try_from(max_seeds)
		.map_err(|_| Error::InvalidArgument("max_seeds is too large".to_string()))?;
	let seeds: Vec<String> = sqlx::query_scalar(
		"\
SELECT node_id
FROM graph_nodes
WHERE ($1::text IS NULL OR tenant_id = $1)
	AND cardinality(label_tokens) > 0
	AND label_tokens <@ $2::text[]
ORDER BY cardinality(label_tokens) DESC, node_id ASC
LIMIT $3",
	)
	.bind(tenant_id)
	.bind(query_tokens)
	.bind(max_seeds)
	.fetch_all(&mut *executor)
	.await?;

	Ok(seeds)
}

/// Edges touching the frontier, in either direction, as `(frontier_node, neighbour)` pairs.
pub async fn frontier_edges(
	executor: &mut PgConnection,
	tenant_id: Option<&str>,
	frontier: &[String],
	edge_types: &[String],
) -> Result<Vec<(String, String)>> {
	if frontier.is_empty() {
		return Ok(Vec::new());
	}

	let rows: Vec<(String, String)> = sqlx::query_as(
		"\
SELECT src_node_id AS from_node, dst_node_id AS to_node
FROM graph_edges
WHERE src_node_id = ANY($1::text[])
	AND (cardinality($2::text[]) = 0 OR edge_type = ANY($2::text[]))
	AND ($3::text IS NULL OR tenant_id = $3)
UNION
SELECT dst_node_id AS from_node, src_node_id AS to_node
FROM graph_edges
WHERE dst_node_id = ANY($1::text[])
	AND (cardinality($2::text[]) = 0 OR edge_type = ANY($2::text[]))
	AND ($3::text IS NULL OR tenant_id = $3)",
	)
	.bind(frontier)
	.bind(edge_types)
	.bind(tenant_id)
	.fetch_all(&mut *executor)
	.await?;

	Ok(rows)
}

pub async fn linked_items(
	executor: &mut PgConnection,
	node_ids: &[String],
	query: &SourceQuery<'_>,
) -> Result<Vec<LinkedItem>> {
	if node_ids.is_empty() {
		return Ok(Vec::new());
	}

	let (tags, from, to, _) = queries::filter_binds(query)?;
	let rows = sqlx::query_as::<_, LinkedItemRow>(
		"\
SELECT n.node_id, r.item_id, r.updated_at
FROM graph_nodes n
JOIN memory_records r ON r.item_id = n.item_id
WHERE n.node_id = ANY($1::text[])
	AND ($2::text IS NULL OR r.tenant_id = $2)
	AND r.tags @> $3::text[]
	AND ($4::timestamptz IS NULL OR r.updated_at >= $4)
	AND ($5::timestamptz IS NULL OR r.updated_at < $5)
ORDER BY n.node_id ASC",
	)
	.bind(node_ids)
	.bind(query.tenant_id)
	.bind(tags)
	.bind(from)
	.bind(to)
	.fetch_all(&mut *executor)
	.await?;

	Ok(rows.into_iter().map(LinkedItem::from).collect())
}

/// Seeds from the query, walks outward one frontier query per hop, then resolves linked items.
pub async fn graph_search(
	executor: &mut PgConnection,
	query: &SourceQuery<'_>,
	policy: &GraphPolicy,
) -> Result<Vec<ScoredItem<GraphReach>>> {
	let tokens = text::tokenize(query.text);
	let seeds = find_seed_nodes(executor, query.tenant_id, &tokens, policy.max_seeds).await?;

	if seeds.is_empty() {
		return Ok(Vec::new());
	}

	let mut walk = GraphWalk::new(seeds, policy.clone());

	while !walk.is_done() {
		let edges =
			frontier_edges(executor, query.tenant_id, walk.frontier(), &policy.edge_types).await?;

		walk.advance(edges);
	}

	let reached = walk.into_reached();
	let node_ids = reached.iter().map(|node| node.node_id.clone()).collect::<Vec<_>>();
	let links = linked_items(executor, &node_ids, query).await?;

	Ok(graph::scored_items(&reached, &links))
}
