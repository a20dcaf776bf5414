//! PostgreSQL session repository.

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use sqlx::postgres::{PgPoolOptions, PgRow};
use sqlx::{FromRow, PgPool, Postgres, Row, query, query_as, query_scalar};

use crate::error::SessionError;
use crate::models::{NewSession, SessionRecord, SessionStatus};
use crate::storage::SessionRepository;

const COLUMNS: &str = "id, token_hash, username, login_time, logout_time, status, created_at";

/// Statements with the schema name already spliced in.
#[derive(Debug, Clone)]
struct Statements {
    create_schema: String,
    create_table: String,
    create_index: String,
    insert: String,
    update: String,
    find_by_token_hash: String,
    find_all: String,
    count: String,
    delete_all: String,
}

impl Statements {
    fn for_schema(schema: &str) -> Self {
        let table = format!("{schema}.auth_sessions");
        Self {
            create_schema: format!("CREATE SCHEMA IF NOT EXISTS {schema}"),
            create_table: format!(
                "CREATE TABLE IF NOT EXISTS {table} (\
                 id BIGSERIAL PRIMARY KEY, \
                 token_hash VARCHAR(64) NOT NULL, \
                 username TEXT NOT NULL, \
                 login_time TIMESTAMPTZ NOT NULL, \
                 logout_time TIMESTAMPTZ NULL, \
                 status VARCHAR(20) NOT NULL, \
                 created_at TIMESTAMPTZ NOT NULL)"
            ),
            create_index: format!(
                "CREATE INDEX IF NOT EXISTS auth_sessions_token_hash_idx ON {table} (token_hash)"
            ),
            insert: format!(
                "INSERT INTO {table} (token_hash, username, login_time, logout_time, status, created_at) \
                 VALUES ($1, $2, $3, NULL, $4, $5) RETURNING id"
            ),
            update: format!("UPDATE {table} SET logout_time = $1, status = $2 WHERE id = $3"),
            find_by_token_hash: format!(
                "SELECT {COLUMNS} FROM {table} WHERE token_hash = $1 ORDER BY id LIMIT 1"
            ),
            find_all: format!("SELECT {COLUMNS} FROM {table} ORDER BY id"),
            count: format!("SELECT COUNT(*) FROM {table}"),
            delete_all: format!("DELETE FROM {table}"),
        }
    }
}

/// Session repository backed by a Postgres pool.
#[derive(Debug, Clone)]
pub struct PgSessionRepository {
    pool: PgPool,
    sql: Statements,
}

impl PgSessionRepository {
    /// Wraps an existing pool. `schema` must be a plain identifier.
    #[must_use]
    pub fn new(pool: PgPool, schema: &str) -> Self {
        Self {
            pool,
            sql: Statements::for_schema(schema),
        }
    }

    /// Opens a pool and wraps it.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be reached.
    pub async fn connect(
        database_url: &SecretString,
        schema: &str,
        max_connections: u32,
    ) -> Result<Self, SessionError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url.expose_secret())
            .await?;
        tracing::info!(schema = %schema, max_connections, "Connected to Postgres");
        Ok(Self::new(pool, schema))
    }

    /// Creates the schema, table and token-hash index if missing.
    ///
    /// # Errors
    ///
    /// Returns an error if any DDL statement fails.
    pub async fn ensure_schema(&self) -> Result<(), SessionError> {
        for statement in [
            &self.sql.create_schema,
            &self.sql.create_table,
            &self.sql.create_index,
        ] {
            query(statement).execute(&self.pool).await?;
        }
        Ok(())
    }
}

impl<'r> FromRow<'r, PgRow> for SessionRecord {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        let status: String = row.try_get("status")?;
        Ok(Self {
            id: row.try_get("id")?,
            token_hash: row.try_get("token_hash")?,
            username: row.try_get("username")?,
            login_time: row.try_get("login_time")?,
            logout_time: row.try_get("logout_time")?,
            status: status
                .parse::<SessionStatus>()
                .map_err(|e| sqlx::Error::Decode(e.into()))?,
            created_at: row.try_get("created_at")?,
        })
    }
}

#[async_trait]
impl SessionRepository for PgSessionRepository {
    async fn insert(&self, session: NewSession) -> Result<SessionRecord, SessionError> {
        let id: i64 = query_scalar(&self.sql.insert)
            .bind(&session.token_hash)
            .bind(&session.username)
            .bind(session.login_time)
            .bind(session.status.as_str())
            .bind(session.created_at)
            .fetch_one(&self.pool)
            .await?;
        Ok(session.into_record(id))
    }

    async fn update(&self, session: &SessionRecord) -> Result<SessionRecord, SessionError> {
        query(&self.sql.update)
            .bind(session.logout_time)
            .bind(session.status.as_str())
            .bind(session.id)
            .execute(&self.pool)
            .await?;
        Ok(session.clone())
    }

    async fn find_by_token_hash(&self, token_hash: &str) -> Result<Option<SessionRecord>, SessionError> {
        Ok(query_as::<Postgres, SessionRecord>(&self.sql.find_by_token_hash)
            .bind(token_hash)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn find_all(&self) -> Result<Vec<SessionRecord>, SessionError> {
        Ok(query_as::<Postgres, SessionRecord>(&self.sql.find_all)
            .fetch_all(&self.pool)
            .await?)
    }

    async fn count(&self) -> Result<u64, SessionError> {
        let count: i64 = query_scalar(&self.sql.count).fetch_one(&self.pool).await?;
        u64::try_from(count).map_err(|e| SessionError::CorruptRecord(e.to_string()))
    }

    async fn delete_all(&self) -> Result<u64, SessionError> {
        let result = query(&self.sql.delete_all).execute(&self.pool).await?;
        Ok(result.rows_affected())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_statements_use_schema() {
        let sql = Statements::for_schema("audit");
        assert!(sql.insert.starts_with("INSERT INTO audit.auth_sessions"));
        assert!(sql.find_by_token_hash.contains("FROM audit.auth_sessions WHERE token_hash = $1"));
        assert!(sql.find_by_token_hash.ends_with("ORDER BY id LIMIT 1"));
        assert_eq!(sql.create_schema, "CREATE SCHEMA IF NOT EXISTS audit");
    }

    #[test]
    fn test_index_is_not_unique() {
        let sql = Statements::for_schema("public");
        assert!(!sql.create_index.contains("UNIQUE"));
        assert!(sql.create_index.contains("(token_hash)"));
    }
}
