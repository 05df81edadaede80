//! Post and comment models.

use serde::{Deserialize, Serialize};

/// A media post. Immutable after creation.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Post {
    /// Server-generated id
    pub id: String,
    /// Author user id, taken from the authenticated token
    pub author: String,
    /// Media id of the attached upload
    pub media: String,
    /// Creation time (Unix milliseconds), server-populated
    pub created: i64,
    /// Optional expiry time (Unix milliseconds)
    pub expires: Option<i64>,
    /// Caption text
    pub description: String,
}

/// A comment on a post.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Comment {
    pub id: String,
    pub text: String,
    /// Author user id
    pub author: String,
    /// Parent post id
    pub parent: String,
}
