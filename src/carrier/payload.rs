use crate::domain::model::{Address, Order};
use serde::Serialize;

// Parcel defaults until product dimensions are captured per SKU.
const DEFAULT_LENGTH_CM: f64 = 10.0;
const DEFAULT_BREADTH_CM: f64 = 10.0;
const DEFAULT_HEIGHT_CM: f64 = 10.0;
const DEFAULT_WEIGHT_KG: f64 = 0.5;

#[derive(Debug, Clone, Serialize)]
pub struct ShipmentItemPayload {
    pub name: String,
    pub sku: String,
    pub units: u32,
    pub selling_price: f64,
}

/// Wire shape of the carrier's shipment-creation request.
#[derive(Debug, Clone, Serialize)]
pub struct ShipmentPayload {
    pub order_id: String,
    pub order_date: String,
    pub pickup_location: String,
    pub billing_customer_name: String,
    pub billing_last_name: String,
    pub billing_address: String,
    pub billing_address_2: String,
    pub billing_city: String,
    pub billing_pincode: String,
    pub billing_state: String,
    pub billing_country: String,
    pub billing_email: String,
    pub billing_phone: String,
    pub shipping_is_billing: bool,
    pub shipping_customer_name: String,
    pub shipping_last_name: String,
    pub shipping_address: String,
    pub shipping_address_2: String,
    pub shipping_city: String,
    pub shipping_pincode: String,
    pub shipping_state: String,
    pub shipping_country: String,
    pub shipping_email: String,
    pub shipping_phone: String,
    pub order_items: Vec<ShipmentItemPayload>,
    pub payment_method: String,
    pub sub_total: f64,
    pub length: f64,
    pub breadth: f64,
    pub height: f64,
    pub weight: f64,
    pub total_discount: f64,
    pub shipping_charges: f64,
    pub giftwrap_charges: f64,
    pub transaction_charges: f64,
    pub cod_charges: f64,
    pub add_charges: f64,
    pub order_amount: f64,
    pub comment: String,
}

/// The carrier requires exactly 10 digits. Strip everything else and keep
/// the trailing 10 so country prefixes ("+91 ...") survive. Shorter values
/// pass through and fail carrier-side validation instead of being padded.
pub fn normalize_phone(value: Option<&str>) -> String {
    let digits: String = value
        .unwrap_or_default()
        .chars()
        .filter(|c| c.is_ascii_digit())
        .collect();
    if digits.len() > 10 {
        digits[digits.len() - 10..].to_string()
    } else {
        digits
    }
}

fn last_name_of(full_name: &str) -> String {
    full_name
        .split_whitespace()
        .skip(1)
        .collect::<Vec<_>>()
        .join(" ")
}

fn country_or_default(address: &Address) -> String {
    if address.country.trim().is_empty() {
        "India".to_string()
    } else {
        address.country.clone()
    }
}

/// Map an order onto the carrier's shipment-creation request.
///
/// Carrier-side surcharge fields are forced to zero and `order_amount`
/// carries the storefront total so the carrier collects exactly what the
/// customer was charged. That is an invariant, not a default.
pub fn build_shipment_payload(order: &Order, pickup_location: &str) -> ShipmentPayload {
    let shipping = &order.shipping_address;
    let billing = order.billing_address.as_ref().unwrap_or(shipping);
    let last_name = last_name_of(&order.customer_name);

    let billing_phone = billing
        .phone
        .as_deref()
        .or(shipping.phone.as_deref());

    ShipmentPayload {
        order_id: order.order_number.clone(),
        order_date: order.created_at.format("%Y-%m-%d").to_string(),
        pickup_location: pickup_location.to_string(),
        billing_customer_name: order.customer_name.clone(),
        billing_last_name: last_name.clone(),
        billing_address: billing.street.clone(),
        billing_address_2: billing.apartment.clone().unwrap_or_default(),
        billing_city: billing.city.clone(),
        billing_pincode: billing.postal_code.clone(),
        billing_state: billing.state.clone(),
        billing_country: country_or_default(billing),
        billing_email: order.customer_email.clone(),
        billing_phone: normalize_phone(billing_phone),
        shipping_is_billing: order.billing_address.is_none(),
        shipping_customer_name: order.customer_name.clone(),
        shipping_last_name: last_name,
        shipping_address: shipping.street.clone(),
        shipping_address_2: shipping.apartment.clone().unwrap_or_default(),
        shipping_city: shipping.city.clone(),
        shipping_pincode: shipping.postal_code.clone(),
        shipping_state: shipping.state.clone(),
        shipping_country: country_or_default(shipping),
        shipping_email: order.customer_email.clone(),
        shipping_phone: normalize_phone(shipping.phone.as_deref()),
        order_items: order
            .items
            .iter()
            .map(|item| ShipmentItemPayload {
                name: item.name.clone(),
                sku: item.sku.clone(),
                units: item.quantity,
                selling_price: item.unit_price,
            })
            .collect(),
        payment_method: if order.is_cod() { "COD" } else { "Prepaid" }.to_string(),
        sub_total: order.subtotal,
        length: DEFAULT_LENGTH_CM,
        breadth: DEFAULT_BREADTH_CM,
        height: DEFAULT_HEIGHT_CM,
        weight: DEFAULT_WEIGHT_KG,
        total_discount: order.discount,
        shipping_charges: order.shipping_fee,
        giftwrap_charges: 0.0,
        transaction_charges: 0.0,
        cod_charges: 0.0,
        add_charges: 0.0,
        order_amount: order.total,
        comment: format!("Order from NEFOL - {}", order.order_number),
    }
}

/// Order fixture shared by unit tests across the crate.
#[cfg(test)]
pub(crate) fn tests_order_fixture() -> Order {
    use crate::domain::model::{OrderItem, PaymentMethod};
    use chrono::TimeZone;

    Order {
        id: 1001,
        order_number: "NEFOL-1001".to_string(),
        customer_name: "Asha Verma".to_string(),
        customer_email: "asha@example.com".to_string(),
        shipping_address: Address {
            street: "12 MG Road".to_string(),
            city: "Lucknow".to_string(),
            state: "UP".to_string(),
            postal_code: "226001".to_string(),
            country: String::new(),
            phone: Some("+91 98765-43210".to_string()),
            apartment: Some("Flat 3B".to_string()),
        },
        billing_address: None,
        items: vec![OrderItem {
            name: "Face Serum".to_string(),
            sku: "NF-SER-01".to_string(),
            quantity: 2,
            unit_price: 449.5,
        }],
        subtotal: 899.0,
        shipping_fee: 0.0,
        discount: 0.0,
        total: 899.0,
        payment_method: PaymentMethod::Cod,
        created_at: chrono::Utc.with_ymd_and_hms(2025, 3, 14, 9, 30, 0).unwrap(),
    }
}
