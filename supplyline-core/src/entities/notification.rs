use crate::framework::DatabaseProcessor;
use kanau::processor::Processor;

/// An in-app notification.
///
/// Append-only from this subsystem's perspective; the read/delete lifecycle
/// belongs to the surrounding web application.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct NotificationRow {
    pub id: i64,
    pub sender_id: i64,
    pub receiver_id: i64,
    pub message: String,
    pub created_at: time::PrimitiveDateTime,
    pub is_read: bool,
}

#[derive(Debug, Clone)]
pub struct CreateNotification {
    pub sender_id: i64,
    pub receiver_id: i64,
    pub message: String,
}

impl Processor<CreateNotification> for DatabaseProcessor {
    type Output = ();
    type Error = sqlx::Error;
    #[tracing::instrument(skip_all, err, name = "SQL:CreateNotification")]
    async fn process(&self, insert: CreateNotification) -> Result<(), sqlx::Error> {
        sqlx::query(
            "INSERT INTO notifications (sender_id, receiver_id, message) VALUES ($1, $2, $3)",
        )
        .bind(insert.sender_id)
        .bind(insert.receiver_id)
        .bind(insert.message)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}
