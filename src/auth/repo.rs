use anyhow::Context;
use async_trait::async_trait;
use sqlx::PgPool;

use crate::auth::repo_types::UserRecord;

#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find_by_username(&self, username: &str) -> anyhow::Result<Option<UserRecord>>;
    async fn count(&self) -> anyhow::Result<i64>;
    /// Returns `false` when `username` is already taken.
    async fn insert(&self, username: &str, password_hash: &str) -> anyhow::Result<bool>;
}

#[derive(Clone)]
pub struct PgUserStore {
    db: PgPool,
}

impl PgUserStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn find_by_username(&self, username: &str) -> anyhow::Result<Option<UserRecord>> {
        let user = sqlx::query_as::<_, UserRecord>(
            r#"
            SELECT username, password_hash
            FROM users
            WHERE username = $1
            "#,
        )
        .bind(username)
        .fetch_optional(&self.db)
        .await
        .context("find user by username")?;
        Ok(user)
    }

    async fn count(&self) -> anyhow::Result<i64> {
        let n = sqlx::query_scalar::<_, i64>(r#"SELECT COUNT(*) FROM users"#)
            .fetch_one(&self.db)
            .await
            .context("count users")?;
        Ok(n)
    }

    async fn insert(&self, username: &str, password_hash: &str) -> anyhow::Result<bool> {
        let res = sqlx::query(
            r#"
            INSERT INTO users (username, password_hash)
            VALUES ($1, $2)
            ON CONFLICT (username) DO NOTHING
            "#,
        )
        .bind(username)
        .bind(password_hash)
        .execute(&self.db)
        .await
        .context("insert user")?;
        Ok(res.rows_affected() == 1)
    }
}

#[cfg(test)]
pub(crate) mod memory {
    use std::{collections::BTreeMap, sync::Mutex};

    use super::*;

    #[derive(Default)]
    pub struct MemoryUserStore {
        users: Mutex<BTreeMap<String, String>>,
    }

    #[async_trait]
    impl UserStore for MemoryUserStore {
        async fn find_by_username(&self, username: &str) -> anyhow::Result<Option<UserRecord>> {
            let users = self.users.lock().unwrap();
            Ok(users.get(username).map(|hash| UserRecord {
                username: username.to_string(),
                password_hash: hash.clone(),
            }))
        }

        async fn count(&self) -> anyhow::Result<i64> {
            Ok(self.users.lock().unwrap().len() as i64)
        }

        async fn insert(&self, username: &str, password_hash: &str) -> anyhow::Result<bool> {
            let mut users = self.users.lock().unwrap();
            if users.contains_key(username) {
                return Ok(false);
            }
            users.insert(username.to_string(), password_hash.to_string());
            Ok(true)
        }
    }
}
