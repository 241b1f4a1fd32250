//! Tracked ledger events and their decoded forms.

use alloy_primitives::{Address, B256, keccak256};
use serde::Deserialize;

/// The contract a tracked event is emitted from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContractKind {
    RetailStore,
    Distributor,
    Delivery,
    Manufacturer,
}

/// The seven event types the pipeline listens for.
///
/// One poller runs per kind; the canonical signatures below are fixed by the
/// deployed contracts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    OrderPlaced,
    OrderProcessed,
    DeliveryInitiated,
    DeliveryConfirmed,
    ManufacturerContacted,
    ProductCreated,
    ManufacturerNotified,
}

impl EventKind {
    pub const ALL: [EventKind; 7] = [
        EventKind::OrderPlaced,
        EventKind::OrderProcessed,
        EventKind::DeliveryInitiated,
        EventKind::DeliveryConfirmed,
        EventKind::ManufacturerContacted,
        EventKind::ProductCreated,
        EventKind::ManufacturerNotified,
    ];

    /// Canonical event signature used for topic filtering.
    pub fn signature(&self) -> &'static str {
        match self {
            EventKind::OrderPlaced => "OrderPlaced(uint256,uint256,uint256,address)",
            EventKind::OrderProcessed => "OrderProcessed(uint256,uint256,uint256,bool)",
            EventKind::DeliveryInitiated => "DeliveryInitiated(uint256,uint256,uint256,address)",
            EventKind::DeliveryConfirmed => "DeliveryConfirmed(uint256,address)",
            EventKind::ManufacturerContacted => "ManufacturerContacted(uint256,uint256,uint256)",
            EventKind::ProductCreated => "ProductCreated(uint256,uint256,uint256)",
            EventKind::ManufacturerNotified => "ManufacturerNotified(uint256,uint256,uint256)",
        }
    }

    /// Topic hash of the canonical signature.
    pub fn topic(&self) -> B256 {
        keccak256(self.signature().as_bytes())
    }

    /// The contract emitting this event.
    pub fn contract(&self) -> ContractKind {
        match self {
            EventKind::OrderPlaced => ContractKind::RetailStore,
            EventKind::OrderProcessed
            | EventKind::ManufacturerContacted
            | EventKind::ManufacturerNotified => ContractKind::Distributor,
            EventKind::DeliveryInitiated | EventKind::DeliveryConfirmed => ContractKind::Delivery,
            EventKind::ProductCreated => ContractKind::Manufacturer,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            EventKind::OrderPlaced => "OrderPlaced",
            EventKind::OrderProcessed => "OrderProcessed",
            EventKind::DeliveryInitiated => "DeliveryInitiated",
            EventKind::DeliveryConfirmed => "DeliveryConfirmed",
            EventKind::ManufacturerContacted => "ManufacturerContacted",
            EventKind::ProductCreated => "ProductCreated",
            EventKind::ManufacturerNotified => "ManufacturerNotified",
        }
    }
}

impl std::fmt::Display for EventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// A decoded ledger event. Immutable once decoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecodedEvent {
    OrderPlaced {
        order_id: i64,
        product_id: i64,
        quantity: i64,
        retail_store: Address,
    },
    OrderProcessed {
        order_id: i64,
        product_id: i64,
        quantity: i64,
        is_available: bool,
    },
    DeliveryInitiated {
        order_id: i64,
        product_id: i64,
        quantity: i64,
        retail_store: Address,
    },
    DeliveryConfirmed {
        order_id: i64,
        retail_store: Address,
    },
    ManufacturerContacted {
        order_id: i64,
        product_id: i64,
        quantity: i64,
    },
    ProductCreated {
        order_id: i64,
        product_id: i64,
        quantity: i64,
    },
    ManufacturerNotified {
        order_id: i64,
        product_id: i64,
        quantity: i64,
    },
}

impl DecodedEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            DecodedEvent::OrderPlaced { .. } => EventKind::OrderPlaced,
            DecodedEvent::OrderProcessed { .. } => EventKind::OrderProcessed,
            DecodedEvent::DeliveryInitiated { .. } => EventKind::DeliveryInitiated,
            DecodedEvent::DeliveryConfirmed { .. } => EventKind::DeliveryConfirmed,
            DecodedEvent::ManufacturerContacted { .. } => EventKind::ManufacturerContacted,
            DecodedEvent::ProductCreated { .. } => EventKind::ProductCreated,
            DecodedEvent::ManufacturerNotified { .. } => EventKind::ManufacturerNotified,
        }
    }

    /// The order id every tracked event carries.
    pub fn order_id(&self) -> i64 {
        match self {
            DecodedEvent::OrderPlaced { order_id, .. }
            | DecodedEvent::OrderProcessed { order_id, .. }
            | DecodedEvent::DeliveryInitiated { order_id, .. }
            | DecodedEvent::DeliveryConfirmed { order_id, .. }
            | DecodedEvent::ManufacturerContacted { order_id, .. }
            | DecodedEvent::ProductCreated { order_id, .. }
            | DecodedEvent::ManufacturerNotified { order_id, .. } => *order_id,
        }
    }
}
