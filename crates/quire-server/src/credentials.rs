//! PostgreSQL credential store.
//!
//! User records live in a single `users` table keyed by username. Only the
//! hex SHA-256 digest of the password is stored.
//!
//! Feature-gated behind `postgres`.

use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;

use quire_core::credential::{CredentialStore, PasswordDigest};
use quire_core::error::CredentialError;

/// PostgreSQL unique violation.
const UNIQUE_VIOLATION: &str = "23505";

/// A credential store backed by PostgreSQL.
///
/// # Examples
///
/// ```no_run
/// # use quire_server::credentials::PostgresCredentialStore;
/// # async fn demo() -> Result<(), quire_core::error::CredentialError> {
/// let store = PostgresCredentialStore::connect("postgres://localhost/quire").await?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct PostgresCredentialStore {
    pool: PgPool,
}

impl std::fmt::Debug for PostgresCredentialStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PostgresCredentialStore")
            .field("pool", &"[PgPool]")
            .finish_non_exhaustive()
    }
}

impl PostgresCredentialStore {
    /// Connect and create the `users` table if it does not exist.
    ///
    /// # Errors
    ///
    /// Returns [`CredentialError::Unavailable`] if the connection or the
    /// table creation fails.
    pub async fn connect(database_url: &str) -> Result<Self, CredentialError> {
        let pool = PgPoolOptions::new()
            .max_connections(10)
            .connect(database_url)
            .await
            .map_err(unavailable)?;

        sqlx::query(
            "CREATE TABLE IF NOT EXISTS users (\
                username      TEXT PRIMARY KEY, \
                password_hash TEXT NOT NULL\
            )",
        )
        .execute(&pool)
        .await
        .map_err(|e| CredentialError::Unavailable {
            reason: format!("migration failed: {e}"),
        })?;

        Ok(Self { pool })
    }
}

fn unavailable(err: sqlx::Error) -> CredentialError {
    CredentialError::Unavailable {
        reason: err.to_string(),
    }
}

#[async_trait::async_trait]
impl CredentialStore for PostgresCredentialStore {
    async fn password_digest(
        &self,
        username: &str,
    ) -> Result<Option<PasswordDigest>, CredentialError> {
        let row: Option<(String,)> =
            sqlx::query_as("SELECT password_hash FROM users WHERE username = $1")
                .bind(username)
                .fetch_optional(&self.pool)
                .await
                .map_err(unavailable)?;

        Ok(row.map(|(hash,)| PasswordDigest::from_stored(hash)))
    }

    async fn insert(
        &self,
        username: &str,
        digest: &PasswordDigest,
    ) -> Result<(), CredentialError> {
        let result = sqlx::query("INSERT INTO users (username, password_hash) VALUES ($1, $2)")
            .bind(username)
            .bind(digest.as_str())
            .execute(&self.pool)
            .await;

        match result {
            Ok(_) => Ok(()),
            Err(sqlx::Error::Database(db_err))
                if db_err.code().as_deref() == Some(UNIQUE_VIOLATION) =>
            {
                Err(CredentialError::UsernameTaken {
                    username: username.to_owned(),
                })
            }
            Err(e) => Err(unavailable(e)),
        }
    }
}
