use crate::domain::account::Role;
use crate::domain::{Account, DomainError};
use async_trait::async_trait;
use sqlx::{PgPool, Row};

#[async_trait]
pub trait AccountRepository: Send + Sync {
    async fn create(
        &self,
        name: &str,
        email: &str,
        password_hash: &str,
        role: Role,
    ) -> Result<Account, DomainError>;
    async fn find_by_email(&self, email: &str) -> Result<Option<Account>, DomainError>;
}

pub struct PostgresAccountRepository {
    pool: PgPool,
}

impl PostgresAccountRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn parse_role(value: &str) -> Result<Role, DomainError> {
    Role::parse(value)
        .ok_or_else(|| DomainError::InternalError(format!("Unknown role in store: {}", value)))
}

#[async_trait]
impl AccountRepository for PostgresAccountRepository {
    async fn create(
        &self,
        name: &str,
        email: &str,
        password_hash: &str,
        role: Role,
    ) -> Result<Account, DomainError> {
        let row = sqlx::query(
            r#"
            INSERT INTO accounts (name, email, password_hash, role, created_at)
            VALUES ($1, $2, $3, $4, NOW())
            RETURNING id, name, email, password_hash, role, created_at
            "#,
        )
        .bind(name)
        .bind(email)
        .bind(password_hash)
        .bind(role.as_str())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if e.to_string().contains("duplicate key") {
                tracing::warn!("Registration rejected: email already registered");
                DomainError::EmailAlreadyRegistered
            } else {
                tracing::error!("Failed to create account: {}", e);
                DomainError::DatabaseError(e.to_string())
            }
        })?;

        let role: String = row.try_get("role")?;
        Ok(Account {
            id: row.try_get("id")?,
            name: row.try_get("name")?,
            email: row.try_get("email")?,
            password_hash: row.try_get("password_hash")?,
            role: parse_role(&role)?,
            created_at: row.try_get("created_at")?,
        })
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<Account>, DomainError> {
        let row = sqlx::query(
            r#"
            SELECT id, name, email, password_hash, role, created_at
            FROM accounts
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| DomainError::DatabaseError(e.to_string()))?;

        match row {
            Some(row) => {
                let role: String = row.try_get("role")?;
                Ok(Some(Account {
                    id: row.try_get("id")?,
                    name: row.try_get("name")?,
                    email: row.try_get("email")?,
                    password_hash: row.try_get("password_hash")?,
                    role: parse_role(&role)?,
                    created_at: row.try_get("created_at")?,
                }))
            }
            None => Ok(None),
        }
    }
}
