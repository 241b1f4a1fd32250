//! In-memory doubles for the domain store, user directory and ledger client.

use crate::directory::{DirectoryError, UserDirectory};
use crate::entities::{
    DeliveryRow, DeliveryStatus, NotificationRow, OrderRow, OrderStatus, ProductRow, UserRole,
    UserRow,
};
use crate::events::EventKind;
use crate::store::{DomainStore, NewDelivery, NewOrder, StoreError};
use alloy_primitives::{Address, B256, Bytes};
use async_trait::async_trait;
use std::collections::{BTreeMap, VecDeque};
use std::str::FromStr;
use std::sync::Mutex;
use supplyline_ledger::{ContractCall, LedgerClient, LedgerError, LogFilter, RawLogEntry};

pub fn addr(hex: &str) -> Address {
    Address::from_str(hex).unwrap()
}

/// A raw log for the given kind with `data` built from 32-byte ABI words.
pub fn raw_log(kind: EventKind, block: u64, words: &[[u8; 32]]) -> RawLogEntry {
    RawLogEntry {
        block_number: block,
        address: Address::ZERO,
        topics: vec![kind.topic()],
        data: Bytes::from(words.concat()),
    }
}

pub fn encode_order_placed(
    block: u64,
    order_id: u64,
    product_id: u64,
    quantity: u64,
    retail_store: Address,
) -> RawLogEntry {
    let mut store_word = [0u8; 32];
    store_word[12..].copy_from_slice(retail_store.as_slice());
    raw_log(
        EventKind::OrderPlaced,
        block,
        &[
            uint_word(order_id),
            uint_word(product_id),
            uint_word(quantity),
            store_word,
        ],
    )
}

pub fn uint_word(value: u64) -> [u8; 32] {
    let mut word = [0u8; 32];
    word[24..].copy_from_slice(&value.to_be_bytes());
    word
}

fn now() -> time::PrimitiveDateTime {
    let now = time::OffsetDateTime::now_utc();
    time::PrimitiveDateTime::new(now.date(), now.time())
}

#[derive(Default)]
struct StoreState {
    orders: BTreeMap<i64, OrderRow>,
    deliveries: BTreeMap<i64, DeliveryRow>,
    products: BTreeMap<i64, ProductRow>,
    notifications: Vec<NotificationRow>,
    fail_notifications: bool,
}

/// Map-backed [`DomainStore`] with the same natural-key create semantics as
/// the Postgres implementation.
#[derive(Default)]
pub struct MemoryStore {
    state: Mutex<StoreState>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_product(product_id: i64, quantity: i64) -> Self {
        let store = Self::new();
        store.state.lock().unwrap().products.insert(
            product_id,
            ProductRow {
                product_id,
                name: format!("product-{product_id}"),
                quantity,
            },
        );
        store
    }

    pub fn fail_notifications(&self) {
        self.state.lock().unwrap().fail_notifications = true;
    }

    pub fn orders(&self) -> Vec<OrderRow> {
        self.state.lock().unwrap().orders.values().cloned().collect()
    }

    pub fn deliveries(&self) -> Vec<DeliveryRow> {
        let state = self.state.lock().unwrap();
        state.deliveries.values().cloned().collect()
    }

    pub fn notifications(&self) -> Vec<NotificationRow> {
        self.state.lock().unwrap().notifications.clone()
    }

    pub fn product_quantity(&self, product_id: i64) -> i64 {
        self.state.lock().unwrap().products[&product_id].quantity
    }
}

#[async_trait]
impl DomainStore for MemoryStore {
    async fn order(&self, id: i64) -> Result<Option<OrderRow>, StoreError> {
        Ok(self.state.lock().unwrap().orders.get(&id).cloned())
    }

    async fn create_order_if_absent(&self, order: NewOrder) -> Result<bool, StoreError> {
        let mut state = self.state.lock().unwrap();
        if state.orders.contains_key(&order.id) {
            return Ok(false);
        }
        state.orders.insert(
            order.id,
            OrderRow {
                id: order.id,
                product_id: order.product_id,
                quantity: order.quantity,
                status: OrderStatus::Pending,
                retail_store_id: order.retail_store_id,
                created_at: now(),
            },
        );
        Ok(true)
    }

    async fn update_order_status(&self, id: i64, status: OrderStatus) -> Result<(), StoreError> {
        if let Some(order) = self.state.lock().unwrap().orders.get_mut(&id) {
            order.status = status;
        }
        Ok(())
    }

    async fn delivery(&self, order_id: i64) -> Result<Option<DeliveryRow>, StoreError> {
        Ok(self.state.lock().unwrap().deliveries.get(&order_id).cloned())
    }

    async fn create_delivery_if_absent(&self, delivery: NewDelivery) -> Result<bool, StoreError> {
        let mut state = self.state.lock().unwrap();
        if state.deliveries.contains_key(&delivery.order_id) {
            return Ok(false);
        }
        state.deliveries.insert(
            delivery.order_id,
            DeliveryRow {
                order_id: delivery.order_id,
                status: DeliveryStatus::InTransit,
                distributor_id: delivery.distributor_id,
                retail_store_id: delivery.retail_store_id,
                delivered_at: None,
                created_at: now(),
            },
        );
        Ok(true)
    }

    async fn update_delivery_status(
        &self,
        order_id: i64,
        status: DeliveryStatus,
        delivered_at: Option<time::PrimitiveDateTime>,
    ) -> Result<(), StoreError> {
        if let Some(delivery) = self.state.lock().unwrap().deliveries.get_mut(&order_id) {
            delivery.status = status;
            if delivered_at.is_some() {
                delivery.delivered_at = delivered_at;
            }
        }
        Ok(())
    }

    async fn product(&self, product_id: i64) -> Result<Option<ProductRow>, StoreError> {
        Ok(self.state.lock().unwrap().products.get(&product_id).cloned())
    }

    async fn adjust_product_quantity(
        &self,
        product_id: i64,
        delta: i64,
    ) -> Result<bool, StoreError> {
        match self.state.lock().unwrap().products.get_mut(&product_id) {
            Some(product) => {
                product.quantity += delta;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn create_notification(
        &self,
        sender_id: i64,
        receiver_id: i64,
        message: String,
    ) -> Result<(), StoreError> {
        let mut state = self.state.lock().unwrap();
        if state.fail_notifications {
            return Err(StoreError::Database(sqlx::Error::PoolClosed));
        }
        let id = state.notifications.len() as i64 + 1;
        state.notifications.push(NotificationRow {
            id,
            sender_id,
            receiver_id,
            message,
            created_at: now(),
            is_read: false,
        });
        Ok(())
    }
}

/// Fixed three-account directory: one retail store at the given address,
/// one distributor, one manufacturer.
pub struct MemoryDirectory {
    users: Vec<UserRow>,
}

impl MemoryDirectory {
    pub fn standard(retail_address: &str) -> Self {
        Self {
            users: vec![
                UserRow {
                    id: 1,
                    ledger_address: retail_address.to_string(),
                    role: UserRole::RetailStore,
                },
                UserRow {
                    id: 2,
                    ledger_address: "0x0000000000000000000000000000000000000002".to_string(),
                    role: UserRole::Distributor,
                },
                UserRow {
                    id: 3,
                    ledger_address: "0x0000000000000000000000000000000000000003".to_string(),
                    role: UserRole::Manufacturer,
                },
            ],
        }
    }
}

#[async_trait]
impl UserDirectory for MemoryDirectory {
    async fn by_address(&self, address: &str) -> Result<UserRow, DirectoryError> {
        self.users
            .iter()
            .find(|u| u.ledger_address.eq_ignore_ascii_case(address))
            .cloned()
            .ok_or_else(|| DirectoryError::UnknownAddress(address.to_string()))
    }

    async fn singleton_by_role(&self, role: UserRole) -> Result<UserRow, DirectoryError> {
        let mut matching = self.users.iter().filter(|u| u.role == role);
        match (matching.next(), matching.next()) {
            (Some(user), None) => Ok(user.clone()),
            (Some(_), Some(_)) => Err(DirectoryError::AmbiguousRole(role)),
            (None, _) => Err(DirectoryError::MissingRole(role)),
        }
    }
}

#[derive(Default)]
struct LedgerScript {
    heights: VecDeque<u64>,
    last_height: u64,
    batches: VecDeque<Result<Vec<RawLogEntry>, ()>>,
    filters: Vec<LogFilter>,
}

/// [`LedgerClient`] answering from queued responses: each `block_number`
/// pops a height (repeating the last when drained), each `get_logs` pops a
/// batch or an injected failure.
pub struct ScriptedLedger {
    script: Mutex<LedgerScript>,
}

impl ScriptedLedger {
    pub fn at_height(height: u64) -> Self {
        let ledger = Self {
            script: Mutex::new(LedgerScript::default()),
        };
        ledger.push_height(height);
        ledger
    }

    pub fn push_height(&self, height: u64) {
        self.script.lock().unwrap().heights.push_back(height);
    }

    pub fn push_batch(&self, logs: Vec<RawLogEntry>) {
        self.script.lock().unwrap().batches.push_back(Ok(logs));
    }

    pub fn push_failure(&self) {
        self.script.lock().unwrap().batches.push_back(Err(()));
    }

    pub fn last_filter(&self) -> Option<LogFilter> {
        self.script.lock().unwrap().filters.last().cloned()
    }
}

#[async_trait]
impl LedgerClient for ScriptedLedger {
    async fn block_number(&self) -> Result<u64, LedgerError> {
        let mut script = self.script.lock().unwrap();
        if let Some(height) = script.heights.pop_front() {
            script.last_height = height;
        }
        Ok(script.last_height)
    }

    async fn get_logs(&self, filter: &LogFilter) -> Result<Vec<RawLogEntry>, LedgerError> {
        let mut script = self.script.lock().unwrap();
        script.filters.push(filter.clone());
        match script.batches.pop_front() {
            Some(Ok(logs)) => Ok(logs),
            Some(Err(())) => Err(LedgerError::Rpc {
                code: -32000,
                message: "scripted failure".to_string(),
            }),
            None => Ok(Vec::new()),
        }
    }

    async fn submit_transaction(
        &self,
        _call: ContractCall,
        _sender: Address,
    ) -> Result<B256, LedgerError> {
        Ok(B256::ZERO)
    }
}
