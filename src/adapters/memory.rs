use crate::domain::model::{CarrierCredential, Order, ShipmentRecord};
use crate::domain::ports::{CredentialStore, OrderStore, ShipmentStore};
use crate::utils::error::Result;
use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;

/// In-memory credential store. Keeps the deactivate-then-insert history the
/// way the relational schema does, so `active()` semantics match production.
#[derive(Clone, Default)]
pub struct InMemoryCredentialStore {
    rows: Arc<Mutex<Vec<CarrierCredential>>>,
}

impl InMemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CredentialStore for InMemoryCredentialStore {
    async fn active(&self) -> Result<Option<CarrierCredential>> {
        let rows = self.rows.lock().await;
        Ok(rows.iter().rev().find(|c| c.is_active).cloned())
    }

    async fn replace_active(&self, credential: CarrierCredential) -> Result<()> {
        let mut rows = self.rows.lock().await;
        for row in rows.iter_mut() {
            row.is_active = false;
        }
        rows.push(credential);
        Ok(())
    }
}

/// In-memory shipment record store. The single mutex makes `upsert` atomic
/// on `order_id`, matching the insert-on-conflict-update contract.
#[derive(Clone, Default)]
pub struct InMemoryShipmentStore {
    rows: Arc<Mutex<HashMap<i64, ShipmentRecord>>>,
}

impl InMemoryShipmentStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.rows.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.rows.lock().await.is_empty()
    }
}

#[async_trait]
impl ShipmentStore for InMemoryShipmentStore {
    async fn find_by_order(&self, order_id: i64) -> Result<Option<ShipmentRecord>> {
        let rows = self.rows.lock().await;
        Ok(rows.get(&order_id).cloned())
    }

    async fn upsert(&self, mut record: ShipmentRecord) -> Result<ShipmentRecord> {
        let mut rows = self.rows.lock().await;
        record.updated_at = Utc::now();
        if let Some(existing) = rows.get(&record.order_id) {
            record.created_at = existing.created_at;
        }
        rows.insert(record.order_id, record.clone());
        Ok(record)
    }
}

/// In-memory order store, used by tests and the one-shot CLI. Production
/// wires the `OrderStore` port to the order CRUD database instead.
#[derive(Clone, Default)]
pub struct InMemoryOrderStore {
    rows: Arc<Mutex<HashMap<i64, Order>>>,
}

impl InMemoryOrderStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert(&self, order: Order) {
        let mut rows = self.rows.lock().await;
        rows.insert(order.id, order);
    }
}

#[async_trait]
impl OrderStore for InMemoryOrderStore {
    async fn find(&self, order_id: i64) -> Result<Option<Order>> {
        let rows = self.rows.lock().await;
        Ok(rows.get(&order_id).cloned())
    }
}
