use crate::carrier::{CarrierClient, ServiceabilityQuery};
use crate::config::FulfillmentConfig;
use crate::core::awb::{AwbAssignor, LabelGenerator};
use crate::core::pickup::PickupResolver;
use crate::core::shipment::ShipmentCreator;
use crate::core::token::TokenBroker;
use crate::domain::model::{CarrierCredential, ShipmentRecord};
use crate::domain::ports::{CredentialStore, OrderStore, ShipmentStore};
use crate::utils::error::{FulfillmentError, Result};
use crate::utils::validation;
use serde::Serialize;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};

#[derive(Debug, Clone, Copy, Serialize)]
pub struct CredentialStatus {
    pub configured: bool,
}

/// Per-order creation guard. Concurrent creation attempts for one order
/// serialize here, so the loser of the race observes the winner's record
/// through the idempotent path instead of calling the carrier again.
#[derive(Default)]
struct OrderLocks {
    inner: Mutex<HashMap<i64, Arc<Mutex<()>>>>,
}

impl OrderLocks {
    async fn acquire(&self, order_id: i64) -> OwnedMutexGuard<()> {
        let lock = {
            let mut map = self.inner.lock().await;
            map.entry(order_id)
                .or_insert_with(|| Arc::new(Mutex::new(())))
                .clone()
        };
        lock.lock_owned().await
    }
}

/// Surface exposed to the admin UI and post-payment hooks. Owns the carrier
/// client and wires the orchestration components over the store ports.
pub struct FulfillmentService<C, S, O>
where
    C: CredentialStore,
    S: ShipmentStore,
    O: OrderStore,
{
    carrier: Arc<CarrierClient>,
    credentials: Arc<C>,
    shipments: Arc<S>,
    orders: Arc<O>,
    broker: TokenBroker<C>,
    creator: ShipmentCreator<S>,
    awb: AwbAssignor<S>,
    labels: LabelGenerator<S>,
    creation_locks: OrderLocks,
}

impl<C, S, O> FulfillmentService<C, S, O>
where
    C: CredentialStore,
    S: ShipmentStore,
    O: OrderStore,
{
    pub fn new(
        config: &FulfillmentConfig,
        credentials: C,
        shipments: S,
        orders: O,
    ) -> Result<Self> {
        let carrier = Arc::new(CarrierClient::new(config)?);
        let credentials = Arc::new(credentials);
        let shipments = Arc::new(shipments);
        let orders = Arc::new(orders);

        let broker = TokenBroker::new(carrier.clone(), credentials.clone());
        let pickup = PickupResolver::new(carrier.clone(), config.pickup_location());
        let creator = ShipmentCreator::new(carrier.clone(), shipments.clone(), pickup);
        let awb = AwbAssignor::new(carrier.clone(), shipments.clone());
        let labels = LabelGenerator::new(carrier.clone(), shipments.clone());

        Ok(Self {
            carrier,
            credentials,
            shipments,
            orders,
            broker,
            creator,
            awb,
            labels,
            creation_locks: OrderLocks::default(),
        })
    }

    /// Verify the credential against the carrier, then replace the active
    /// row. A credential the carrier rejects is never persisted.
    pub async fn save_credentials(&self, email: &str, password: &str) -> Result<()> {
        validation::validate_non_empty_string("credentials.email", email)
            .map_err(|_| FulfillmentError::validation("email is required"))?;
        validation::validate_non_empty_string("credentials.password", password)
            .map_err(|_| FulfillmentError::validation("password is required"))?;

        self.carrier.login(email, password).await?;
        self.credentials
            .replace_active(CarrierCredential::new(email, password))
            .await?;
        tracing::info!("carrier credentials saved and verified for {}", email);
        Ok(())
    }

    pub async fn credential_status(&self) -> Result<CredentialStatus> {
        Ok(CredentialStatus {
            configured: self.credentials.active().await?.is_some(),
        })
    }

    /// Idempotent shipment creation for a paid order. At most one creation
    /// runs per order at a time; an order that already has a carrier-side
    /// shipment is returned as-is without another carrier call.
    pub async fn create_shipment(&self, order_id: i64) -> Result<ShipmentRecord> {
        let order = self.orders.find(order_id).await?.ok_or_else(|| {
            FulfillmentError::not_found(format!("order {} not found", order_id))
        })?;

        let _guard = self.creation_locks.acquire(order_id).await;

        if let Some(existing) = self.shipments.find_by_order(order_id).await? {
            if existing.shipment_id.is_some() {
                tracing::info!(
                    "shipment already exists for order {} (shipment {})",
                    order.order_number,
                    existing.shipment_id.as_deref().unwrap_or_default()
                );
                return Ok(existing);
            }
            // A record without a shipment_id is a previous partial failure;
            // fall through and try the carrier again.
        }

        let token = self.broker.authenticate().await?;
        self.creator.create(&token, &order).await
    }

    /// Standalone AWB assignment + label generation from an admin action.
    /// Unlike the creation flow, an AWB failure here surfaces to the caller.
    pub async fn assign_awb_and_label(
        &self,
        order_id: i64,
        courier_id: Option<i64>,
    ) -> Result<ShipmentRecord> {
        let record = self
            .shipments
            .find_by_order(order_id)
            .await?
            .ok_or_else(|| {
                FulfillmentError::precondition(format!(
                    "order {} has no shipment record; create the shipment first",
                    order_id
                ))
            })?;

        let token = self.broker.authenticate().await?;
        let record = self.awb.assign(&token, &record, courier_id).await?;
        self.labels.generate(&token, &record).await
    }

    /// Carrier tracking payload for an order's shipment.
    pub async fn track_shipment(&self, order_id: i64) -> Result<Value> {
        let record = self
            .shipments
            .find_by_order(order_id)
            .await?
            .ok_or_else(|| {
                FulfillmentError::not_found(format!("no shipment record for order {}", order_id))
            })?;
        let awb = record.awb_code.ok_or_else(|| {
            FulfillmentError::not_found(format!(
                "order {} has no AWB assigned yet, nothing to track",
                order_id
            ))
        })?;

        let token = self.broker.authenticate().await?;
        self.carrier.track_by_awb(&token, &awb).await
    }

    /// Courier serviceability between two postal codes, passed through.
    pub async fn check_serviceability(&self, query: &ServiceabilityQuery) -> Result<Value> {
        let token = self.broker.authenticate().await?;
        self.carrier.serviceability(&token, query).await
    }
}
