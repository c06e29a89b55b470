use crate::domain::model::{CarrierCredential, Order, ShipmentRecord};
use crate::utils::error::Result;
use async_trait::async_trait;

/// Carrier account credentials. At most one active row at a time; saving a
/// new credential replaces the active one wholesale.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    async fn active(&self) -> Result<Option<CarrierCredential>>;
    async fn replace_active(&self, credential: CarrierCredential) -> Result<()>;
}

/// Persistence for shipment records, one row per order. `upsert` must be
/// atomic on `order_id` (insert-on-conflict-update) so concurrent creation
/// attempts can never produce two rows.
#[async_trait]
pub trait ShipmentStore: Send + Sync {
    async fn find_by_order(&self, order_id: i64) -> Result<Option<ShipmentRecord>>;
    async fn upsert(&self, record: ShipmentRecord) -> Result<ShipmentRecord>;
}

/// Read access to storefront orders, owned by the order CRUD subsystem.
#[async_trait]
pub trait OrderStore: Send + Sync {
    async fn find(&self, order_id: i64) -> Result<Option<Order>>;
}
