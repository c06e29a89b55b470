use crate::carrier::{response, CarrierClient};
use crate::domain::model::{ShipmentRecord, STATUS_READY_TO_SHIP};
use crate::domain::ports::ShipmentStore;
use crate::utils::error::{FulfillmentError, Result};
use std::sync::Arc;

/// Requests courier/waybill assignment for a created shipment.
pub struct AwbAssignor<S: ShipmentStore> {
    carrier: Arc<CarrierClient>,
    shipments: Arc<S>,
}

impl<S: ShipmentStore> AwbAssignor<S> {
    pub fn new(carrier: Arc<CarrierClient>, shipments: Arc<S>) -> Self {
        Self {
            carrier,
            shipments,
        }
    }

    /// Assign an AWB to an existing shipment. Requires `shipment_id`; a
    /// record still waiting on manual reconciliation is rejected without a
    /// carrier call. On success the record is updated with the AWB and moved
    /// to `ready_to_ship`.
    pub async fn assign(
        &self,
        token: &str,
        record: &ShipmentRecord,
        courier_id: Option<i64>,
    ) -> Result<ShipmentRecord> {
        let shipment_id = record.shipment_id.as_deref().ok_or_else(|| {
            FulfillmentError::precondition(format!(
                "order {} has no carrier shipment yet; create the shipment first",
                record.order_id
            ))
        })?;

        let resp = self
            .carrier
            .assign_awb(token, shipment_id, courier_id)
            .await?;

        if !resp.ok {
            return Err(FulfillmentError::carrier(
                format!(
                    "AWB assignment failed for shipment {}: {}",
                    shipment_id,
                    response::extract_message(&resp.body)
                ),
                Some(resp.body),
            ));
        }

        let awb_code = response::extract_awb_code(&resp.body).ok_or_else(|| {
            FulfillmentError::carrier(
                format!(
                    "AWB response for shipment {} contained no awb_code",
                    shipment_id
                ),
                Some(resp.body.clone()),
            )
        })?;

        tracing::info!(
            "assigned AWB {} to shipment {} (order {})",
            awb_code,
            shipment_id,
            record.order_id
        );

        let mut updated = record.clone();
        updated.awb_code = Some(awb_code);
        updated.status = STATUS_READY_TO_SHIP.to_string();
        self.shipments.upsert(updated).await
    }
}

/// Requests a label document for a shipment with an assigned AWB.
pub struct LabelGenerator<S: ShipmentStore> {
    carrier: Arc<CarrierClient>,
    shipments: Arc<S>,
}

impl<S: ShipmentStore> LabelGenerator<S> {
    pub fn new(carrier: Arc<CarrierClient>, shipments: Arc<S>) -> Self {
        Self {
            carrier,
            shipments,
        }
    }

    /// Best-effort label generation. A record without an AWB is a no-op, and
    /// carrier failures are logged and swallowed; the record is never rolled
    /// back. Only store failures propagate.
    pub async fn generate(&self, token: &str, record: &ShipmentRecord) -> Result<ShipmentRecord> {
        let (Some(shipment_id), Some(_awb)) =
            (record.shipment_id.as_deref(), record.awb_code.as_deref())
        else {
            return Ok(record.clone());
        };

        let resp = match self.carrier.generate_label(token, shipment_id).await {
            Ok(resp) => resp,
            Err(err) => {
                tracing::warn!(
                    "label generation request failed for shipment {} (non-critical): {}",
                    shipment_id,
                    err
                );
                return Ok(record.clone());
            }
        };

        if !resp.ok {
            tracing::warn!(
                "label generation rejected for shipment {} (non-critical): {}",
                shipment_id,
                response::extract_message(&resp.body)
            );
            return Ok(record.clone());
        }

        match response::extract_label_url(&resp.body) {
            Some(label_url) => {
                let mut updated = record.clone();
                updated.label_url = Some(label_url);
                self.shipments.upsert(updated).await
            }
            None => {
                tracing::warn!(
                    "label response for shipment {} contained no label URL",
                    shipment_id
                );
                Ok(record.clone())
            }
        }
    }
}
