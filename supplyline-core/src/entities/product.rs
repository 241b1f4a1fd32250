use crate::framework::DatabaseProcessor;
use kanau::processor::Processor;

/// Inventory record for a product.
///
/// `product_id` is the external natural key shared with the ledger contracts;
/// all lookups go through it.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct ProductRow {
    pub product_id: i64,
    pub name: String,
    pub quantity: i64,
}

#[derive(Debug, Clone)]
pub struct GetProductByExternalId {
    pub product_id: i64,
}

impl Processor<GetProductByExternalId> for DatabaseProcessor {
    type Output = Option<ProductRow>;
    type Error = sqlx::Error;
    #[tracing::instrument(skip_all, err, name = "SQL:GetProductByExternalId")]
    async fn process(
        &self,
        query: GetProductByExternalId,
    ) -> Result<Option<ProductRow>, sqlx::Error> {
        sqlx::query_as::<_, ProductRow>(
            "SELECT product_id, name, quantity FROM products WHERE product_id = $1",
        )
        .bind(query.product_id)
        .fetch_optional(&self.pool)
        .await
    }
}

#[derive(Debug, Clone)]
/// Apply a relative quantity change in a single statement.
///
/// The relative UPDATE keeps concurrent workers from losing adjustments to
/// a read-modify-write race. Returns the number of rows updated (zero when
/// the product does not exist).
pub struct AdjustProductQuantity {
    pub product_id: i64,
    pub delta: i64,
}

impl Processor<AdjustProductQuantity> for DatabaseProcessor {
    type Output = u64;
    type Error = sqlx::Error;
    #[tracing::instrument(skip_all, err, name = "SQL:AdjustProductQuantity")]
    async fn process(&self, update: AdjustProductQuantity) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE products SET quantity = quantity + $2 WHERE product_id = $1",
        )
        .bind(update.product_id)
        .bind(update.delta)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected())
    }
}
