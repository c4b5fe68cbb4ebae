//! Mitts: short user-authored posts
//!
//! A stored mitt only knows its author's id. `author_name` and `likes` are
//! derived fields the mitt service fills in at read time; they stay at their
//! zero value when the lookup behind them finds nothing.
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{UserId, id::prefixed_id};

prefixed_id!(
    /// A unique, stable identifier for a mitt
    MittId,
    "mitt"
);

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mitt {
    pub id: MittId,
    pub author: UserId,
    #[serde(default)]
    pub author_name: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub likes: i64,
}

impl Mitt {
    pub fn is_authored_by(&self, user_id: &UserId) -> bool {
        &self.author == user_id
    }
}

#[derive(Debug, Clone)]
pub struct NewMitt {
    pub id: MittId,
    pub author: UserId,
    pub content: String,
}

impl NewMitt {
    pub fn new(author: &UserId, content: &str) -> Self {
        Self {
            id: MittId::new_random(),
            author: author.clone(),
            content: content.to_string(),
        }
    }
}
