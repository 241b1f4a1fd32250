//! Applies decoded ledger events to the domain state.
//!
//! The ledger emits each event once per on-chain state transition, but a
//! poller restart can re-deliver a block range, so every handler must be safe
//! to re-apply: create operations are keyed by external natural ids, and
//! status updates are guarded so a repeat becomes a reported conflict instead
//! of a double mutation.
//!
//! Side effects are strictly ordered: lookups, then one idempotent domain
//! mutation, then one notification. The notification is best-effort; a
//! failure to append it is logged and never rolls back the mutation.

use crate::directory::{DirectoryError, UserDirectory};
use crate::entities::{DeliveryStatus, OrderStatus, UserRole};
use crate::events::DecodedEvent;
use crate::store::{DomainStore, NewDelivery, NewOrder, StoreError};
use alloy_primitives::Address;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Per-event failures. Every variant is recoverable: the poller logs the
/// event's identifying detail and moves on to the next log.
#[derive(Debug, Error)]
pub enum HandleError {
    /// A record the event depends on is not in the domain store.
    /// Downstream state is intentionally left untouched.
    #[error("{entity} {id} not found")]
    DependencyNotFound { entity: &'static str, id: i64 },

    /// The mutation would repeat or contradict an already-applied
    /// transition, e.g. re-initiating a delivery that is already in transit.
    #[error("delivery for order {order_id} already {status}")]
    InvalidStateTransition {
        order_id: i64,
        status: DeliveryStatus,
    },

    #[error(transparent)]
    Directory(#[from] DirectoryError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Applies one decoded event to orders, deliveries and inventory.
pub struct Reconciler {
    store: Arc<dyn DomainStore>,
    directory: Arc<dyn UserDirectory>,
}

impl Reconciler {
    pub fn new(store: Arc<dyn DomainStore>, directory: Arc<dyn UserDirectory>) -> Self {
        Self { store, directory }
    }

    /// Apply a single event. Idempotent per the rules above.
    pub async fn apply(&self, event: &DecodedEvent) -> Result<(), HandleError> {
        match *event {
            DecodedEvent::OrderPlaced {
                order_id,
                product_id,
                quantity,
                retail_store,
            } => {
                self.handle_order_placed(order_id, product_id, quantity, retail_store)
                    .await
            }
            DecodedEvent::OrderProcessed {
                order_id,
                product_id,
                quantity,
                is_available,
            } => {
                self.handle_order_processed(order_id, product_id, quantity, is_available)
                    .await
            }
            DecodedEvent::DeliveryInitiated {
                order_id,
                product_id,
                quantity,
                retail_store,
            } => {
                self.handle_delivery_initiated(order_id, product_id, quantity, retail_store)
                    .await
            }
            DecodedEvent::DeliveryConfirmed {
                order_id,
                retail_store,
            } => self.handle_delivery_confirmed(order_id, retail_store).await,
            DecodedEvent::ManufacturerContacted {
                order_id,
                product_id,
                quantity,
            } => {
                let message = format!(
                    "Manufacturer contacted for Order ID: {order_id}, \
                     Product ID: {product_id}, Quantity: {quantity}"
                );
                self.handle_manufacturer_relay(message).await
            }
            DecodedEvent::ProductCreated {
                order_id,
                product_id,
                quantity,
            } => {
                self.handle_product_created(order_id, product_id, quantity)
                    .await
            }
            DecodedEvent::ManufacturerNotified {
                order_id,
                product_id,
                quantity,
            } => {
                let message = format!(
                    "Manufacturer notified for Order ID: {order_id}, \
                     Product ID: {product_id}, Quantity: {quantity}"
                );
                self.handle_manufacturer_relay(message).await
            }
        }
    }

    async fn handle_order_placed(
        &self,
        order_id: i64,
        product_id: i64,
        quantity: i64,
        retail_store: Address,
    ) -> Result<(), HandleError> {
        let product = self
            .store
            .product(product_id)
            .await?
            .ok_or(HandleError::DependencyNotFound {
                entity: "product",
                id: product_id,
            })?;
        let retail_user = self.directory.by_address(&retail_store.to_string()).await?;
        let distributor = self
            .directory
            .singleton_by_role(UserRole::Distributor)
            .await?;

        let created = self
            .store
            .create_order_if_absent(NewOrder {
                id: order_id,
                product_id: product.product_id,
                quantity,
                retail_store_id: retail_user.id,
            })
            .await?;
        if created {
            info!(order_id, product_id, quantity, "order placed");
        } else {
            debug!(order_id, "order already exists, creation skipped");
        }

        self.notify(
            retail_user.id,
            distributor.id,
            format!(
                "New order placed. Order ID: {order_id}, \
                 Product ID: {product_id}, Quantity: {quantity}."
            ),
        )
        .await;
        Ok(())
    }

    async fn handle_order_processed(
        &self,
        order_id: i64,
        product_id: i64,
        quantity: i64,
        is_available: bool,
    ) -> Result<(), HandleError> {
        let order = self
            .store
            .order(order_id)
            .await?
            .ok_or(HandleError::DependencyNotFound {
                entity: "order",
                id: order_id,
            })?;
        let distributor = self
            .directory
            .singleton_by_role(UserRole::Distributor)
            .await?;

        let message = if is_available {
            self.store
                .update_order_status(order_id, OrderStatus::Processed)
                .await?;
            let created = self
                .store
                .create_delivery_if_absent(NewDelivery {
                    order_id,
                    distributor_id: distributor.id,
                    retail_store_id: order.retail_store_id,
                })
                .await?;
            info!(
                order_id,
                delivery_created = created,
                "order processed, product available"
            );
            format!("Order ID: {order_id} processed. Delivery is in transit.")
        } else {
            self.store
                .update_order_status(order_id, OrderStatus::AwaitingManufacture)
                .await?;
            info!(order_id, product_id, quantity, "order awaiting manufacture");
            format!("Order ID: {order_id} is awaiting manufacture.")
        };

        self.notify(distributor.id, order.retail_store_id, message)
            .await;
        Ok(())
    }

    async fn handle_delivery_initiated(
        &self,
        order_id: i64,
        product_id: i64,
        quantity: i64,
        retail_store: Address,
    ) -> Result<(), HandleError> {
        let retail_user = self.directory.by_address(&retail_store.to_string()).await?;
        let distributor = self
            .directory
            .singleton_by_role(UserRole::Distributor)
            .await?;

        // Status guard before any mutation: a re-delivered event must not
        // decrement inventory a second time.
        if let Some(delivery) = self.store.delivery(order_id).await? {
            if matches!(
                delivery.status,
                DeliveryStatus::InTransit | DeliveryStatus::Delivered
            ) {
                return Err(HandleError::InvalidStateTransition {
                    order_id,
                    status: delivery.status,
                });
            }
        }

        let adjusted = self
            .store
            .adjust_product_quantity(product_id, -quantity)
            .await?;
        if !adjusted {
            return Err(HandleError::DependencyNotFound {
                entity: "product",
                id: product_id,
            });
        }

        let created = self
            .store
            .create_delivery_if_absent(NewDelivery {
                order_id,
                distributor_id: distributor.id,
                retail_store_id: retail_user.id,
            })
            .await?;
        if !created {
            // The guard above only lets a cancelled delivery through, so an
            // existing row here is a re-initiation: put it back in transit.
            self.store
                .update_delivery_status(order_id, DeliveryStatus::InTransit, None)
                .await?;
        }
        info!(order_id, product_id, quantity, "delivery initiated");

        self.notify(
            distributor.id,
            retail_user.id,
            format!(
                "Delivery initiated for Order ID: {order_id}. \
                 Product ID: {product_id}, Quantity: {quantity}."
            ),
        )
        .await;
        Ok(())
    }

    async fn handle_delivery_confirmed(
        &self,
        order_id: i64,
        retail_store: Address,
    ) -> Result<(), HandleError> {
        let retail_user = self.directory.by_address(&retail_store.to_string()).await?;
        let distributor = self
            .directory
            .singleton_by_role(UserRole::Distributor)
            .await?;

        let delivery =
            self.store
                .delivery(order_id)
                .await?
                .ok_or(HandleError::DependencyNotFound {
                    entity: "delivery",
                    id: order_id,
                })?;
        if delivery.status == DeliveryStatus::Delivered {
            return Err(HandleError::InvalidStateTransition {
                order_id,
                status: delivery.status,
            });
        }

        self.store
            .update_delivery_status(order_id, DeliveryStatus::Delivered, Some(now()))
            .await?;
        info!(order_id, "delivery confirmed");

        self.notify(
            retail_user.id,
            distributor.id,
            format!("Delivery confirmed for Order ID: {order_id}"),
        )
        .await;
        Ok(())
    }

    /// ManufacturerContacted and ManufacturerNotified mutate nothing; they
    /// only relay a message from the distributor to the manufacturer.
    async fn handle_manufacturer_relay(&self, message: String) -> Result<(), HandleError> {
        let distributor = self
            .directory
            .singleton_by_role(UserRole::Distributor)
            .await?;
        let manufacturer = self
            .directory
            .singleton_by_role(UserRole::Manufacturer)
            .await?;
        self.notify(distributor.id, manufacturer.id, message).await;
        Ok(())
    }

    async fn handle_product_created(
        &self,
        order_id: i64,
        product_id: i64,
        quantity: i64,
    ) -> Result<(), HandleError> {
        let distributor = self
            .directory
            .singleton_by_role(UserRole::Distributor)
            .await?;
        let manufacturer = self
            .directory
            .singleton_by_role(UserRole::Manufacturer)
            .await?;

        // Additive restock: each distinct event is a separate increment, and
        // the poller cursor is the dedup boundary for the event itself.
        let adjusted = self
            .store
            .adjust_product_quantity(product_id, quantity)
            .await?;
        if !adjusted {
            return Err(HandleError::DependencyNotFound {
                entity: "product",
                id: product_id,
            });
        }
        info!(order_id, product_id, quantity, "product restocked");

        self.notify(
            manufacturer.id,
            distributor.id,
            format!(
                "Product created with new quantity for Order ID: {order_id}, \
                 Product ID: {product_id}"
            ),
        )
        .await;
        Ok(())
    }

    /// Append a notification, logging instead of failing: the domain
    /// mutation preceding it must never be rolled back for a lost message.
    async fn notify(&self, sender_id: i64, receiver_id: i64, message: String) {
        if let Err(e) = self
            .store
            .create_notification(sender_id, receiver_id, message)
            .await
        {
            warn!(sender_id, receiver_id, error = %e, "failed to create notification");
        }
    }
}

fn now() -> time::PrimitiveDateTime {
    let now = time::OffsetDateTime::now_utc();
    time::PrimitiveDateTime::new(now.date(), now.time())
}
