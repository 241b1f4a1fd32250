//! Repository surface over the order/delivery/inventory/notification records.
//!
//! The records are owned by the surrounding application; the pipeline only
//! sees this trait. All create operations are keyed by external natural ids
//! and are safe under concurrent workers.

use crate::entities::delivery::{CreateDeliveryIfAbsent, GetDelivery, UpdateDeliveryStatus};
use crate::entities::notification::CreateNotification;
use crate::entities::order::{CreateOrderIfAbsent, GetOrder, UpdateOrderStatus};
use crate::entities::product::{AdjustProductQuantity, GetProductByExternalId};
use crate::entities::{DeliveryRow, DeliveryStatus, OrderRow, OrderStatus, ProductRow};
use crate::framework::DatabaseProcessor;
use async_trait::async_trait;
use kanau::processor::Processor;
use thiserror::Error;

/// Errors from the domain store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Fields for a new order; the id is the ledger-assigned natural key.
#[derive(Debug, Clone)]
pub struct NewOrder {
    pub id: i64,
    pub product_id: i64,
    pub quantity: i64,
    pub retail_store_id: i64,
}

/// Fields for a new in-transit delivery, keyed by order id.
#[derive(Debug, Clone)]
pub struct NewDelivery {
    pub order_id: i64,
    pub distributor_id: i64,
    pub retail_store_id: i64,
}

#[async_trait]
pub trait DomainStore: Send + Sync {
    async fn order(&self, id: i64) -> Result<Option<OrderRow>, StoreError>;

    /// Create the order unless one with the same id exists.
    /// Returns whether a row was created.
    async fn create_order_if_absent(&self, order: NewOrder) -> Result<bool, StoreError>;

    async fn update_order_status(&self, id: i64, status: OrderStatus) -> Result<(), StoreError>;

    async fn delivery(&self, order_id: i64) -> Result<Option<DeliveryRow>, StoreError>;

    /// Create an in-transit delivery unless the order already has one.
    /// Returns whether a row was created.
    async fn create_delivery_if_absent(&self, delivery: NewDelivery) -> Result<bool, StoreError>;

    async fn update_delivery_status(
        &self,
        order_id: i64,
        status: DeliveryStatus,
        delivered_at: Option<time::PrimitiveDateTime>,
    ) -> Result<(), StoreError>;

    async fn product(&self, product_id: i64) -> Result<Option<ProductRow>, StoreError>;

    /// Apply a relative inventory change. Returns false when the product
    /// does not exist.
    async fn adjust_product_quantity(&self, product_id: i64, delta: i64)
    -> Result<bool, StoreError>;

    /// Append a notification. Best-effort from the caller's point of view.
    async fn create_notification(
        &self,
        sender_id: i64,
        receiver_id: i64,
        message: String,
    ) -> Result<(), StoreError>;
}

/// Postgres-backed domain store.
pub struct PgDomainStore {
    db: DatabaseProcessor,
}

impl PgDomainStore {
    pub fn new(pool: sqlx::PgPool) -> Self {
        Self {
            db: DatabaseProcessor { pool },
        }
    }
}

#[async_trait]
impl DomainStore for PgDomainStore {
    async fn order(&self, id: i64) -> Result<Option<OrderRow>, StoreError> {
        Ok(self.db.process(GetOrder { id }).await?)
    }

    async fn create_order_if_absent(&self, order: NewOrder) -> Result<bool, StoreError> {
        Ok(self
            .db
            .process(CreateOrderIfAbsent {
                id: order.id,
                product_id: order.product_id,
                quantity: order.quantity,
                retail_store_id: order.retail_store_id,
            })
            .await?)
    }

    async fn update_order_status(&self, id: i64, status: OrderStatus) -> Result<(), StoreError> {
        self.db.process(UpdateOrderStatus { id, status }).await?;
        Ok(())
    }

    async fn delivery(&self, order_id: i64) -> Result<Option<DeliveryRow>, StoreError> {
        Ok(self.db.process(GetDelivery { order_id }).await?)
    }

    async fn create_delivery_if_absent(&self, delivery: NewDelivery) -> Result<bool, StoreError> {
        Ok(self
            .db
            .process(CreateDeliveryIfAbsent {
                order_id: delivery.order_id,
                distributor_id: delivery.distributor_id,
                retail_store_id: delivery.retail_store_id,
            })
            .await?)
    }

    async fn update_delivery_status(
        &self,
        order_id: i64,
        status: DeliveryStatus,
        delivered_at: Option<time::PrimitiveDateTime>,
    ) -> Result<(), StoreError> {
        self.db
            .process(UpdateDeliveryStatus {
                order_id,
                status,
                delivered_at,
            })
            .await?;
        Ok(())
    }

    async fn product(&self, product_id: i64) -> Result<Option<ProductRow>, StoreError> {
        Ok(self.db.process(GetProductByExternalId { product_id }).await?)
    }

    async fn adjust_product_quantity(
        &self,
        product_id: i64,
        delta: i64,
    ) -> Result<bool, StoreError> {
        let updated = self
            .db
            .process(AdjustProductQuantity { product_id, delta })
            .await?;
        Ok(updated > 0)
    }

    async fn create_notification(
        &self,
        sender_id: i64,
        receiver_id: i64,
        message: String,
    ) -> Result<(), StoreError> {
        self.db
            .process(CreateNotification {
                sender_id,
                receiver_id,
                message,
            })
            .await?;
        Ok(())
    }
}
