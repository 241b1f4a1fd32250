//! Read-only lookup of user accounts by ledger address or role.

use crate::entities::user::{FindUserByAddress, FindUsersByRole};
use crate::entities::{UserRole, UserRow};
use crate::framework::DatabaseProcessor;
use async_trait::async_trait;
use kanau::processor::Processor;
use thiserror::Error;

/// Lookup failures. All of these are recoverable per event: the handler
/// logs and skips, it never takes the worker down.
#[derive(Debug, Error)]
pub enum DirectoryError {
    #[error("no user with ledger address {0}")]
    UnknownAddress(String),

    #[error("no user with role {0}")]
    MissingRole(UserRole),

    #[error("more than one user with role {0}")]
    AmbiguousRole(UserRole),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

#[async_trait]
pub trait UserDirectory: Send + Sync {
    /// Look up a user by ledger address, case-insensitively.
    async fn by_address(&self, address: &str) -> Result<UserRow, DirectoryError>;

    /// Look up the single user holding a role.
    async fn singleton_by_role(&self, role: UserRole) -> Result<UserRow, DirectoryError>;
}

/// Postgres-backed directory over the application's user table.
pub struct PgUserDirectory {
    db: DatabaseProcessor,
}

impl PgUserDirectory {
    pub fn new(pool: sqlx::PgPool) -> Self {
        Self {
            db: DatabaseProcessor { pool },
        }
    }
}

#[async_trait]
impl UserDirectory for PgUserDirectory {
    async fn by_address(&self, address: &str) -> Result<UserRow, DirectoryError> {
        self.db
            .process(FindUserByAddress {
                address: address.to_string(),
            })
            .await?
            .ok_or_else(|| DirectoryError::UnknownAddress(address.to_string()))
    }

    async fn singleton_by_role(&self, role: UserRole) -> Result<UserRow, DirectoryError> {
        let users = self.db.process(FindUsersByRole { role }).await?;
        resolve_singleton(role, users)
    }
}

/// Enforce the one-account-per-role rule over a role lookup result.
fn resolve_singleton(role: UserRole, mut users: Vec<UserRow>) -> Result<UserRow, DirectoryError> {
    match users.len() {
        0 => Err(DirectoryError::MissingRole(role)),
        1 => Ok(users.remove(0)),
        _ => Err(DirectoryError::AmbiguousRole(role)),
    }
}
