use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Shipment lifecycle states this crate writes itself. The carrier may
/// report other values, which are stored verbatim.
pub const STATUS_PENDING: &str = "pending";
pub const STATUS_READY_TO_SHIP: &str = "ready_to_ship";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    Cod,
    Prepaid,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Address {
    pub street: String,
    pub city: String,
    pub state: String,
    pub postal_code: String,
    pub country: String,
    pub phone: Option<String>,
    pub apartment: Option<String>,
}

impl Address {
    /// An order can be handed to the carrier only when street, city and
    /// postal code are all present.
    pub fn is_shippable(&self) -> bool {
        !self.street.trim().is_empty()
            && !self.city.trim().is_empty()
            && !self.postal_code.trim().is_empty()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderItem {
    pub name: String,
    pub sku: String,
    pub quantity: u32,
    pub unit_price: f64,
}

/// Storefront order. Read-only from this crate's point of view; owned and
/// persisted by the order CRUD subsystem.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    pub id: i64,
    pub order_number: String,
    pub customer_name: String,
    pub customer_email: String,
    pub shipping_address: Address,
    pub billing_address: Option<Address>,
    pub items: Vec<OrderItem>,
    pub subtotal: f64,
    pub shipping_fee: f64,
    pub discount: f64,
    pub total: f64,
    pub payment_method: PaymentMethod,
    pub created_at: DateTime<Utc>,
}

impl Order {
    pub fn is_cod(&self) -> bool {
        self.payment_method == PaymentMethod::Cod
    }
}

/// One row per order. `shipment_id` stays null when the carrier confirmed
/// the create call but never surfaced an identifier; such records need
/// manual reconciliation before an AWB can be assigned.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShipmentRecord {
    pub order_id: i64,
    pub shipment_id: Option<String>,
    pub awb_code: Option<String>,
    pub label_url: Option<String>,
    pub tracking_url: Option<String>,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ShipmentRecord {
    pub fn new(order_id: i64) -> Self {
        let now = Utc::now();
        Self {
            order_id,
            shipment_id: None,
            awb_code: None,
            label_url: None,
            tracking_url: None,
            status: STATUS_PENDING.to_string(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn needs_manual_check(&self) -> bool {
        self.shipment_id.is_none()
    }
}

/// Carrier account credential. The store keeps at most one active row;
/// reconfiguration deactivates the old row and inserts a fresh one.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CarrierCredential {
    pub email: String,
    pub password: String,
    pub is_active: bool,
    pub updated_at: DateTime<Utc>,
}

impl CarrierCredential {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
            is_active: true,
            updated_at: Utc::now(),
        }
    }
}

/// Pickup location as returned by the carrier. Fetched on demand, never
/// persisted.
#[derive(Debug, Clone, Deserialize)]
pub struct PickupLocation {
    pub pickup_location: Option<String>,
    pub id: Option<serde_json::Value>,
}

impl PickupLocation {
    /// Carrier responses name the location in `pickup_location`, some older
    /// ones only carry `id`.
    pub fn display_name(&self) -> Option<String> {
        if let Some(name) = &self.pickup_location {
            if !name.is_empty() {
                return Some(name.clone());
            }
        }
        self.id.as_ref().map(|id| match id {
            serde_json::Value::String(s) => s.clone(),
            other => other.to_string(),
        })
    }
}
