use sqlx::FromRow;

/// Credential record in the database.
#[derive(Debug, Clone, FromRow)]
pub struct UserRecord {
    pub username: String,
    pub password_hash: String, // Argon2 PHC string
}
