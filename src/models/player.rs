use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A player record. `id` is an opaque client-supplied token.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Player {
    pub id: String,
    pub score: i64,
    /// Milliseconds since the Unix epoch.
    pub created_at: i64,
}

impl Player {
    pub fn new(id: impl Into<String>, now: i64) -> Self {
        Self {
            id: id.into(),
            score: 0,
            created_at: now,
        }
    }
}
