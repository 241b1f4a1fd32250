use super::OrderStatus;
use crate::framework::DatabaseProcessor;
use kanau::processor::Processor;

/// An order as recorded in the domain store.
///
/// `id` is the ledger-assigned order identifier, not a locally generated
/// one: inserts go through [`CreateOrderIfAbsent`], never a blind insert.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct OrderRow {
    pub id: i64,
    pub product_id: i64,
    pub quantity: i64,
    pub status: OrderStatus,
    pub retail_store_id: i64,
    pub created_at: time::PrimitiveDateTime,
}

#[derive(Debug, Clone)]
pub struct GetOrder {
    pub id: i64,
}

impl Processor<GetOrder> for DatabaseProcessor {
    type Output = Option<OrderRow>;
    type Error = sqlx::Error;
    #[tracing::instrument(skip_all, err, name = "SQL:GetOrder")]
    async fn process(&self, query: GetOrder) -> Result<Option<OrderRow>, sqlx::Error> {
        sqlx::query_as::<_, OrderRow>(
            r#"
            SELECT id, product_id, quantity, status, retail_store_id, created_at
            FROM orders
            WHERE id = $1
            "#,
        )
        .bind(query.id)
        .fetch_optional(&self.pool)
        .await
    }
}

#[derive(Debug, Clone)]
/// Insert an order keyed by its ledger-assigned id.
///
/// Uses ON CONFLICT DO NOTHING so re-delivered OrderPlaced events are no-ops.
/// Returns whether a row was actually inserted.
pub struct CreateOrderIfAbsent {
    pub id: i64,
    pub product_id: i64,
    pub quantity: i64,
    pub retail_store_id: i64,
}

impl Processor<CreateOrderIfAbsent> for DatabaseProcessor {
    type Output = bool;
    type Error = sqlx::Error;
    #[tracing::instrument(skip_all, err, name = "SQL:CreateOrderIfAbsent")]
    async fn process(&self, insert: CreateOrderIfAbsent) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            r#"
            INSERT INTO orders (id, product_id, quantity, status, retail_store_id)
            VALUES ($1, $2, $3, 'pending', $4)
            ON CONFLICT (id) DO NOTHING
            "#,
        )
        .bind(insert.id)
        .bind(insert.product_id)
        .bind(insert.quantity)
        .bind(insert.retail_store_id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}

#[derive(Debug, Clone)]
/// Set the status of an existing order. Returns the number of rows updated.
pub struct UpdateOrderStatus {
    pub id: i64,
    pub status: OrderStatus,
}

impl Processor<UpdateOrderStatus> for DatabaseProcessor {
    type Output = u64;
    type Error = sqlx::Error;
    #[tracing::instrument(skip_all, err, name = "SQL:UpdateOrderStatus")]
    async fn process(&self, update: UpdateOrderStatus) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("UPDATE orders SET status = $2 WHERE id = $1")
            .bind(update.id)
            .bind(update.status)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }
}
