pub mod delivery;
pub mod notification;
pub mod order;
pub mod product;
pub mod user;

pub use delivery::DeliveryRow;
pub use notification::NotificationRow;
pub use order::OrderRow;
pub use product::ProductRow;
pub use user::UserRow;

/// Order lifecycle as driven by ledger events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, sqlx::Type)]
#[sqlx(rename_all = "snake_case", type_name = "order_status")]
pub enum OrderStatus {
    Pending,
    Processed,
    AwaitingManufacture,
    Delivered,
}

/// Delivery lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, sqlx::Type)]
#[sqlx(rename_all = "snake_case", type_name = "delivery_status")]
pub enum DeliveryStatus {
    InTransit,
    Delivered,
    Cancelled,
}

impl std::fmt::Display for DeliveryStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DeliveryStatus::InTransit => write!(f, "in_transit"),
            DeliveryStatus::Delivered => write!(f, "delivered"),
            DeliveryStatus::Cancelled => write!(f, "cancelled"),
        }
    }
}

/// Supply-chain role of a user account.
///
/// The distributor, manufacturer and retail store are each expected to be a
/// single account; the directory enforces that at lookup time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, sqlx::Type)]
#[sqlx(rename_all = "snake_case", type_name = "user_role")]
pub enum UserRole {
    Distributor,
    Manufacturer,
    RetailStore,
}

impl std::fmt::Display for UserRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UserRole::Distributor => write!(f, "distributor"),
            UserRole::Manufacturer => write!(f, "manufacturer"),
            UserRole::RetailStore => write!(f, "retail_store"),
        }
    }
}
