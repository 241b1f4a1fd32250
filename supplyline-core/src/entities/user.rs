use super::UserRole;
use crate::framework::DatabaseProcessor;
use kanau::processor::Processor;

/// A user account in the surrounding application, read-only here.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct UserRow {
    pub id: i64,
    pub ledger_address: String,
    pub role: UserRole,
}

#[derive(Debug, Clone)]
/// Look up a user by ledger address, case-insensitively.
pub struct FindUserByAddress {
    pub address: String,
}

impl Processor<FindUserByAddress> for DatabaseProcessor {
    type Output = Option<UserRow>;
    type Error = sqlx::Error;
    #[tracing::instrument(skip_all, err, name = "SQL:FindUserByAddress")]
    async fn process(&self, query: FindUserByAddress) -> Result<Option<UserRow>, sqlx::Error> {
        sqlx::query_as::<_, UserRow>(
            r#"
            SELECT id, ledger_address, role
            FROM users
            WHERE lower(ledger_address) = lower($1)
            "#,
        )
        .bind(query.address)
        .fetch_optional(&self.pool)
        .await
    }
}

#[derive(Debug, Clone)]
/// All users holding a role. The directory layer enforces the singleton rule,
/// so the query is capped at two rows.
pub struct FindUsersByRole {
    pub role: UserRole,
}

impl Processor<FindUsersByRole> for DatabaseProcessor {
    type Output = Vec<UserRow>;
    type Error = sqlx::Error;
    #[tracing::instrument(skip_all, err, name = "SQL:FindUsersByRole")]
    async fn process(&self, query: FindUsersByRole) -> Result<Vec<UserRow>, sqlx::Error> {
        sqlx::query_as::<_, UserRow>(
            "SELECT id, ledger_address, role FROM users WHERE role = $1 LIMIT 2",
        )
        .bind(query.role)
        .fetch_all(&self.pool)
        .await
    }
}
