use crate::carrier::payload::build_shipment_payload;
use crate::carrier::response::{
    self, classify_carrier_error, pickup_location_from_error, CarrierErrorKind,
};
use crate::carrier::CarrierClient;
use crate::core::awb::{AwbAssignor, LabelGenerator};
use crate::core::pickup::PickupResolver;
use crate::domain::model::{Order, ShipmentRecord, STATUS_PENDING};
use crate::domain::ports::ShipmentStore;
use crate::utils::error::{FulfillmentError, Result};
use std::sync::Arc;

/// Drives the carrier's multi-step shipment creation to completion:
/// create (with a single pickup-location retry), recover a missing shipment
/// identifier, persist the record, then best-effort AWB assignment and
/// label generation.
pub struct ShipmentCreator<S: ShipmentStore> {
    carrier: Arc<CarrierClient>,
    shipments: Arc<S>,
    pickup: PickupResolver,
    awb: AwbAssignor<S>,
    labels: LabelGenerator<S>,
}

impl<S: ShipmentStore> ShipmentCreator<S> {
    pub fn new(
        carrier: Arc<CarrierClient>,
        shipments: Arc<S>,
        pickup: PickupResolver,
    ) -> Self {
        let awb = AwbAssignor::new(carrier.clone(), shipments.clone());
        let labels = LabelGenerator::new(carrier.clone(), shipments.clone());
        Self {
            carrier,
            shipments,
            pickup,
            awb,
            labels,
        }
    }

    /// Create a carrier shipment for `order` and persist the resulting
    /// record. Creation counts as successful once a record exists, even when
    /// the shipment identifier could not be obtained (that record is flagged
    /// for manual reconciliation) or when the AWB/label steps fail.
    pub async fn create(&self, token: &str, order: &Order) -> Result<ShipmentRecord> {
        if !order.shipping_address.is_shippable() {
            return Err(FulfillmentError::validation(format!(
                "order {} has an incomplete shipping address (street, city and postal code are required)",
                order.order_number
            )));
        }

        let pickup_location = self.pickup.resolve(token).await;
        let mut payload = build_shipment_payload(order, &pickup_location);

        tracing::info!(
            "creating carrier shipment for order {} from pickup location '{}'",
            order.order_number,
            pickup_location
        );
        let mut resp = self.carrier.create_shipment(token, &payload).await?;

        if !resp.ok {
            match classify_carrier_error(&resp.body) {
                CarrierErrorKind::PickupLocation => {
                    // The carrier echoes its registered locations in the
                    // error body; retry exactly once with a corrected name.
                    let corrected = pickup_location_from_error(&resp.body)
                        .unwrap_or_else(|| self.pickup_default());
                    tracing::warn!(
                        "pickup location '{}' rejected for order {}, retrying once with '{}'",
                        payload.pickup_location,
                        order.order_number,
                        corrected
                    );
                    payload.pickup_location = corrected;
                    resp = self.carrier.create_shipment(token, &payload).await?;
                    if !resp.ok {
                        return Err(FulfillmentError::carrier(
                            format!(
                                "shipment creation failed for order {} after pickup-location retry: {}",
                                order.order_number,
                                response::extract_message(&resp.body)
                            ),
                            Some(resp.body),
                        ));
                    }
                }
                CarrierErrorKind::Other => {
                    return Err(FulfillmentError::carrier(
                        format!(
                            "shipment creation failed for order {}: {}",
                            order.order_number,
                            response::extract_message(&resp.body)
                        ),
                        Some(resp.body),
                    ));
                }
            }
        }

        let mut shipment_id = response::extract_shipment_id(&resp.body);
        if shipment_id.is_none() {
            shipment_id = self
                .recover_shipment_id(token, &payload.order_id)
                .await;
        }

        let mut record = ShipmentRecord::new(order.id);
        record.shipment_id = shipment_id;
        record.awb_code = response::extract_awb_code(&resp.body);
        record.tracking_url = response::extract_tracking_url(&resp.body);
        record.status = response::extract_status(&resp.body)
            .unwrap_or_else(|| STATUS_PENDING.to_string());

        let record = self.shipments.upsert(record).await?;

        if record.needs_manual_check() {
            tracing::error!(
                "no shipment_id could be obtained for order {}; record persisted for manual reconciliation",
                order.order_number
            );
        } else {
            tracing::info!(
                "carrier shipment {} recorded for order {}",
                record.shipment_id.as_deref().unwrap_or_default(),
                order.order_number
            );
        }

        Ok(self.run_ancillary_steps(token, record).await)
    }

    fn pickup_default(&self) -> String {
        crate::config::DEFAULT_PICKUP_LOCATION.to_string()
    }

    /// The create response sometimes confirms the shipment without its
    /// identifier. Look the order up once by order number; absence stays
    /// absence and is handled by the caller.
    async fn recover_shipment_id(&self, token: &str, order_number: &str) -> Option<String> {
        tracing::warn!(
            "create response carried no shipment_id for order {}, querying carrier orders once",
            order_number
        );
        match self.carrier.fetch_orders(token, order_number).await {
            Ok(resp) if resp.ok => {
                let recovered = response::extract_shipment_id(&resp.body).or_else(|| {
                    // list shape: {data: [{shipment_id}]}
                    resp.body
                        .get("data")
                        .and_then(|data| data.as_array())
                        .and_then(|entries| entries.first())
                        .and_then(response::extract_shipment_id)
                });
                if let Some(id) = &recovered {
                    tracing::info!(
                        "recovered shipment_id {} for order {} via orders lookup",
                        id,
                        order_number
                    );
                }
                recovered
            }
            Ok(resp) => {
                tracing::warn!(
                    "orders lookup for {} rejected with status {}",
                    order_number,
                    resp.status
                );
                None
            }
            Err(err) => {
                tracing::warn!("orders lookup for {} failed: {}", order_number, err);
                None
            }
        }
    }

    /// Step 7 of the creation flow: AWB assignment when a shipment id is
    /// present, then label generation when an AWB was obtained. Both are
    /// best-effort; their failures never undo the persisted record.
    async fn run_ancillary_steps(&self, token: &str, record: ShipmentRecord) -> ShipmentRecord {
        let mut record = record;

        if record.shipment_id.is_some() && record.awb_code.is_none() {
            match self.awb.assign(token, &record, None).await {
                Ok(updated) => record = updated,
                Err(err) => {
                    tracing::warn!(
                        "AWB assignment failed for order {} (non-critical): {}",
                        record.order_id,
                        err
                    );
                }
            }
        }

        if record.awb_code.is_some() {
            match self.labels.generate(token, &record).await {
                Ok(updated) => record = updated,
                Err(err) => {
                    tracing::warn!(
                        "label generation failed for order {} (non-critical): {}",
                        record.order_id,
                        err
                    );
                }
            }
        }

        record
    }
}
