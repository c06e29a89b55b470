use serde_json::Value;

/// Nesting prefixes the carrier is known to wrap result fields in, in
/// priority order. An empty prefix means the top level of the body.
pub const RESPONSE_NESTINGS: &[&str] = &["", "data", "response"];

/// Walk a dotted path ("data.data") below `body`, returning the value at
/// `field` under the first present nesting. Null values count as absent.
pub fn extract_field(body: &Value, field: &str, paths: &[&str]) -> Option<Value> {
    for path in paths {
        let mut cursor = body;
        if !path.is_empty() {
            let mut found = true;
            for segment in path.split('.') {
                match cursor.get(segment) {
                    Some(next) => cursor = next,
                    None => {
                        found = false;
                        break;
                    }
                }
            }
            if !found {
                continue;
            }
        }
        if let Some(value) = cursor.get(field) {
            if !value.is_null() {
                return Some(value.clone());
            }
        }
    }
    None
}

/// Like `extract_field`, but coerces strings and numbers to `String` and
/// treats empty strings as absent. Identifiers come back as either from
/// the carrier.
pub fn extract_string(body: &Value, field: &str, paths: &[&str]) -> Option<String> {
    match extract_field(body, field, paths)? {
        Value::String(s) if !s.is_empty() => Some(s),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Shipment identifier from a create response. `order_id` is the carrier's
/// own order handle and doubles as the identifier in some response shapes.
pub fn extract_shipment_id(body: &Value) -> Option<String> {
    extract_string(body, "shipment_id", RESPONSE_NESTINGS)
        .or_else(|| extract_string(body, "order_id", RESPONSE_NESTINGS))
}

pub fn extract_awb_code(body: &Value) -> Option<String> {
    extract_string(body, "awb_code", RESPONSE_NESTINGS)
}

pub fn extract_label_url(body: &Value) -> Option<String> {
    extract_string(body, "label_url", RESPONSE_NESTINGS)
        .or_else(|| extract_string(body, "label_url_pdf", RESPONSE_NESTINGS))
}

pub fn extract_tracking_url(body: &Value) -> Option<String> {
    extract_string(body, "tracking_url", RESPONSE_NESTINGS)
}

pub fn extract_status(body: &Value) -> Option<String> {
    extract_string(body, "status", RESPONSE_NESTINGS)
}

/// Human-readable message from a carrier error body.
pub fn extract_message(body: &Value) -> String {
    body.get("message")
        .and_then(|m| m.as_str())
        .unwrap_or("carrier returned an error without a message")
        .to_string()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CarrierErrorKind {
    /// The submitted pickup location is not registered with the carrier.
    /// Retryable once with a corrected location echoed in the error body.
    PickupLocation,
    /// Everything else. Not retried.
    Other,
}

/// The carrier has no structured error codes; classification is by message
/// text. Kept in one place so the matching rule can be hardened later
/// without touching call sites.
pub fn classify_carrier_error(body: &Value) -> CarrierErrorKind {
    let message = extract_message(body).to_lowercase();
    if message.contains("pickup") {
        CarrierErrorKind::PickupLocation
    } else {
        CarrierErrorKind::Other
    }
}

/// Pull a corrected pickup location out of a pickup-class error body. The
/// carrier echoes its registered locations under `data.data` or `data`.
pub fn pickup_location_from_error(body: &Value) -> Option<String> {
    for path in ["data.data", "data"] {
        let mut cursor = body;
        let mut found = true;
        for segment in path.split('.') {
            match cursor.get(segment) {
                Some(next) => cursor = next,
                None => {
                    found = false;
                    break;
                }
            }
        }
        if !found {
            continue;
        }
        if let Some(first) = cursor.as_array().and_then(|entries| entries.first()) {
            let name = extract_string(first, "pickup_location", &[""])
                .or_else(|| extract_string(first, "id", &[""]));
            if name.is_some() {
                return name;
            }
        }
    }
    None
}
