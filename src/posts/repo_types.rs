use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// List projection of a post; the author is never exposed here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct PostSummary {
    pub id: Uuid,
    pub title: String,
    pub content: String,
}

#[derive(Debug, Clone)]
pub struct NewPost<'a> {
    pub title: &'a str,
    pub content: &'a str,
    pub author: &'a str,
}
