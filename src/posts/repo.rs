use anyhow::Context;
use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use super::repo_types::{NewPost, PostSummary};

#[async_trait]
pub trait PostStore: Send + Sync {
    /// Full scan in insertion order.
    async fn list(&self) -> anyhow::Result<Vec<PostSummary>>;
    async fn create(&self, post: NewPost<'_>) -> anyhow::Result<Uuid>;
}

#[derive(Clone)]
pub struct PgPostStore {
    db: PgPool,
}

impl PgPostStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl PostStore for PgPostStore {
    async fn list(&self) -> anyhow::Result<Vec<PostSummary>> {
        let rows = sqlx::query_as::<_, PostSummary>(
            r#"
            SELECT id, title, content
            FROM posts
            ORDER BY created_at ASC, id ASC
            "#,
        )
        .fetch_all(&self.db)
        .await
        .context("list posts")?;
        Ok(rows)
    }

    async fn create(&self, post: NewPost<'_>) -> anyhow::Result<Uuid> {
        let id = sqlx::query_scalar::<_, Uuid>(
            r#"
            INSERT INTO posts (title, content, author)
            VALUES ($1, $2, $3)
            RETURNING id
            "#,
        )
        .bind(post.title)
        .bind(post.content)
        .bind(post.author)
        .fetch_one(&self.db)
        .await
        .context("insert post")?;
        Ok(id)
    }
}

#[cfg(test)]
pub(crate) mod memory {
    use std::sync::{
        atomic::{AtomicUsize, Ordering},
        Mutex,
    };

    use super::*;

    #[derive(Debug, Clone)]
    pub struct StoredPost {
        pub summary: PostSummary,
        pub author: String,
    }

    /// In-memory store that counts full scans.
    #[derive(Default)]
    pub struct MemoryPostStore {
        posts: Mutex<Vec<StoredPost>>,
        scans: AtomicUsize,
    }

    impl MemoryPostStore {
        pub fn scans(&self) -> usize {
            self.scans.load(Ordering::SeqCst)
        }

        pub fn stored(&self) -> Vec<StoredPost> {
            self.posts.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl PostStore for MemoryPostStore {
        async fn list(&self) -> anyhow::Result<Vec<PostSummary>> {
            self.scans.fetch_add(1, Ordering::SeqCst);
            let posts = self.posts.lock().unwrap();
            Ok(posts.iter().map(|p| p.summary.clone()).collect())
        }

        async fn create(&self, post: NewPost<'_>) -> anyhow::Result<Uuid> {
            let id = Uuid::new_v4();
            self.posts.lock().unwrap().push(StoredPost {
                summary: PostSummary {
                    id,
                    title: post.title.to_string(),
                    content: post.content.to_string(),
                },
                author: post.author.to_string(),
            });
            Ok(id)
        }
    }
}
