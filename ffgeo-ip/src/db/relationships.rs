//! Edge loaders: priority claims, continuations, technical relations
//!
//! PCT phase edges are not stored; they follow from `appln.internat_appln_id`.

use ffgeo_common::model::{RelationKind, Relationship};
use ffgeo_common::Result;
use sqlx::SqlitePool;

/// (table, child column, parent column) per stored edge kind
const EDGE_TABLES: [(RelationKind, &str, &str, &str); 3] = [
    (RelationKind::PriorityClaim, "priority_claim", "appln_id", "prior_appln_id"),
    (RelationKind::Continuation, "continuation", "appln_id", "parent_appln_id"),
    (RelationKind::TechRel, "tech_rel", "appln_id", "tech_rel_appln_id"),
];

pub async fn load_relationships(pool: &SqlitePool) -> Result<Vec<Relationship>> {
    let mut relationships = Vec::new();
    for (kind, table, child, parent) in EDGE_TABLES {
        relationships.extend(load_edges(pool, kind, table, child, parent).await?);
    }
    Ok(relationships)
}

async fn load_edges(
    pool: &SqlitePool,
    kind: RelationKind,
    table: &str,
    child_column: &str,
    parent_column: &str,
) -> Result<Vec<Relationship>> {
    let sql = format!(
        "SELECT DISTINCT {child}, {parent} FROM {table} \
         WHERE {child} IS NOT NULL AND {parent} IS NOT NULL \
         ORDER BY {child}, {parent}",
        child = child_column,
        parent = parent_column,
        table = table
    );
    let rows: Vec<(i64, i64)> = sqlx::query_as(&sql).fetch_all(pool).await?;

    Ok(rows
        .into_iter()
        .map(|(child, parent)| Relationship { child, parent, kind })
        .collect())
}
