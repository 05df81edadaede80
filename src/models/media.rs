//! Stored media blobs.

use serde::{Deserialize, Serialize};

/// An opaque media payload served at `/api/media/{id}`.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Media {
    pub id: String,
    #[serde(skip_serializing)]
    pub data: Vec<u8>,
    pub mime_type: String,
}
