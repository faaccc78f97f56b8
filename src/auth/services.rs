use anyhow::Context;
use tracing::{info, warn};

use super::{
    password::{hash_password, verify_password},
    repo::UserStore,
};

pub const DEFAULT_USERNAME: &str = "admin";
pub const DEFAULT_PASSWORD: &str = "admin";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BootstrapOutcome {
    Created,
    AlreadyExists,
}

impl BootstrapOutcome {
    pub fn message(self) -> &'static str {
        match self {
            Self::Created => "Test user created successfully",
            Self::AlreadyExists => "Test user already exists",
        }
    }
}

/// Seeds the default credential when the credential store is empty.
pub async fn bootstrap_default_user(users: &dyn UserStore) -> anyhow::Result<BootstrapOutcome> {
    if users.count().await? > 0 {
        return Ok(BootstrapOutcome::AlreadyExists);
    }
    let hash = hash_password(DEFAULT_PASSWORD)?;
    let inserted = users
        .insert(DEFAULT_USERNAME, &hash)
        .await
        .context("insert default user")?;
    if inserted {
        info!(username = DEFAULT_USERNAME, "default user created");
        Ok(BootstrapOutcome::Created)
    } else {
        Ok(BootstrapOutcome::AlreadyExists)
    }
}

/// `Ok(false)` for an unknown username or a wrong password.
pub async fn check_credentials(
    users: &dyn UserStore,
    username: &str,
    password: &str,
) -> anyhow::Result<bool> {
    let Some(user) = users.find_by_username(username).await? else {
        warn!(username, "login unknown username");
        return Ok(false);
    };
    let ok = verify_password(password, &user.password_hash)?;
    if !ok {
        warn!(username = %user.username, "login invalid password");
    }
    Ok(ok)
}
