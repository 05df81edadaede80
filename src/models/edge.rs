//! Directed social-graph edges between users.

use serde::{Deserialize, Serialize};

/// Kind of relationship an edge represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum EdgeKind {
    Follow,
    Like,
}

/// A directed relationship from one user to another.
///
/// Duplicate (source, target, kind) rows are permitted; the store does not
/// enforce uniqueness.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Edge {
    pub id: String,
    pub source: String,
    pub target: String,
    pub kind: EdgeKind,
}
