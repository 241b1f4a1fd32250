use super::DeliveryStatus;
use crate::framework::DatabaseProcessor;
use kanau::processor::Processor;

/// A delivery, keyed one-to-one by the order it fulfils.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct DeliveryRow {
    pub order_id: i64,
    pub status: DeliveryStatus,
    pub distributor_id: i64,
    pub retail_store_id: i64,
    pub delivered_at: Option<time::PrimitiveDateTime>,
    pub created_at: time::PrimitiveDateTime,
}

#[derive(Debug, Clone)]
pub struct GetDelivery {
    pub order_id: i64,
}

impl Processor<GetDelivery> for DatabaseProcessor {
    type Output = Option<DeliveryRow>;
    type Error = sqlx::Error;
    #[tracing::instrument(skip_all, err, name = "SQL:GetDelivery")]
    async fn process(&self, query: GetDelivery) -> Result<Option<DeliveryRow>, sqlx::Error> {
        sqlx::query_as::<_, DeliveryRow>(
            r#"
            SELECT order_id, status, distributor_id, retail_store_id, delivered_at, created_at
            FROM deliveries
            WHERE order_id = $1
            "#,
        )
        .bind(query.order_id)
        .fetch_optional(&self.pool)
        .await
    }
}

#[derive(Debug, Clone)]
/// Insert an in-transit delivery for an order, keyed by the order id.
///
/// ON CONFLICT DO NOTHING keeps concurrent or re-delivered creation attempts
/// from producing duplicate rows. Returns whether a row was inserted.
pub struct CreateDeliveryIfAbsent {
    pub order_id: i64,
    pub distributor_id: i64,
    pub retail_store_id: i64,
}

impl Processor<CreateDeliveryIfAbsent> for DatabaseProcessor {
    type Output = bool;
    type Error = sqlx::Error;
    #[tracing::instrument(skip_all, err, name = "SQL:CreateDeliveryIfAbsent")]
    async fn process(&self, insert: CreateDeliveryIfAbsent) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            r#"
            INSERT INTO deliveries (order_id, status, distributor_id, retail_store_id)
            VALUES ($1, 'in_transit', $2, $3)
            ON CONFLICT (order_id) DO NOTHING
            "#,
        )
        .bind(insert.order_id)
        .bind(insert.distributor_id)
        .bind(insert.retail_store_id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}

#[derive(Debug, Clone)]
/// Set the status (and optionally the delivered-at timestamp) of a delivery.
pub struct UpdateDeliveryStatus {
    pub order_id: i64,
    pub status: DeliveryStatus,
    pub delivered_at: Option<time::PrimitiveDateTime>,
}

impl Processor<UpdateDeliveryStatus> for DatabaseProcessor {
    type Output = u64;
    type Error = sqlx::Error;
    #[tracing::instrument(skip_all, err, name = "SQL:UpdateDeliveryStatus")]
    async fn process(&self, update: UpdateDeliveryStatus) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            r#"
            UPDATE deliveries
            SET status = $2, delivered_at = COALESCE($3, delivered_at)
            WHERE order_id = $1
            "#,
        )
        .bind(update.order_id)
        .bind(update.status)
        .bind(update.delivered_at)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected())
    }
}
