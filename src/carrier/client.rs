use crate::carrier::response;
use crate::config::FulfillmentConfig;
use crate::domain::model::PickupLocation;
use crate::utils::error::{FulfillmentError, Result};
use serde_json::Value;
use std::time::Duration;

/// Outcome of a carrier call whose error body still matters to the caller.
/// Creation needs to inspect rejected responses for the pickup-location
/// retry, so non-2xx is not an `Err` at this layer.
#[derive(Debug, Clone)]
pub struct CarrierResponse {
    pub ok: bool,
    pub status: u16,
    pub body: Value,
}

#[derive(Debug, Clone)]
pub struct ServiceabilityQuery {
    pub pickup_postcode: String,
    pub delivery_postcode: String,
    pub cod: bool,
    pub weight: f64,
}

/// Thin HTTP client over the carrier API. Every call is bounded by the
/// configured timeout; timeouts and transport failures surface as
/// `ApiError`, distinct from a definitive carrier rejection.
pub struct CarrierClient {
    http: reqwest::Client,
    base_url: String,
}

impl CarrierClient {
    pub fn new(config: &FulfillmentConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds()))
            .build()?;
        Ok(Self {
            http,
            base_url: config.base_url(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn decode(resp: reqwest::Response) -> CarrierResponse {
        let status = resp.status();
        // Error bodies are sometimes not JSON at all; treat those as empty.
        let body: Value = resp.json().await.unwrap_or(Value::Null);
        CarrierResponse {
            ok: status.is_success(),
            status: status.as_u16(),
            body,
        }
    }

    /// Exchange the account credential for a short-lived bearer token.
    pub async fn login(&self, email: &str, password: &str) -> Result<String> {
        let resp = self
            .http
            .post(format!("{}/auth/login", self.base_url))
            .json(&serde_json::json!({"email": email, "password": password}))
            .send()
            .await?;
        let decoded = Self::decode(resp).await;

        if !decoded.ok {
            return Err(FulfillmentError::authentication(format!(
                "carrier login failed with status {}: {}",
                decoded.status,
                response::extract_message(&decoded.body)
            )));
        }

        decoded
            .body
            .get("token")
            .and_then(|t| t.as_str())
            .filter(|t| !t.is_empty())
            .map(str::to_string)
            .ok_or_else(|| {
                FulfillmentError::authentication("carrier login succeeded but returned no token")
            })
    }

    /// Registered pickup locations. The carrier wraps the list in `data.data`,
    /// `data`, or returns it bare depending on the account.
    pub async fn pickup_locations(&self, token: &str) -> Result<Vec<PickupLocation>> {
        let resp = self
            .http
            .get(format!("{}/settings/company/pickup", self.base_url))
            .bearer_auth(token)
            .send()
            .await?;
        let decoded = Self::decode(resp).await;

        if !decoded.ok {
            return Err(FulfillmentError::carrier(
                format!(
                    "failed to fetch pickup locations (status {})",
                    decoded.status
                ),
                Some(decoded.body),
            ));
        }

        let list = decoded
            .body
            .get("data")
            .map(|data| data.get("data").unwrap_or(data))
            .unwrap_or(&decoded.body);

        match list.as_array() {
            Some(entries) => Ok(entries
                .iter()
                .filter_map(|entry| serde_json::from_value(entry.clone()).ok())
                .collect()),
            None => Ok(Vec::new()),
        }
    }

    pub async fn create_shipment(
        &self,
        token: &str,
        payload: &crate::carrier::payload::ShipmentPayload,
    ) -> Result<CarrierResponse> {
        let resp = self
            .http
            .post(format!("{}/orders/create/adhoc", self.base_url))
            .bearer_auth(token)
            .json(payload)
            .send()
            .await?;
        Ok(Self::decode(resp).await)
    }

    /// Look an order up by the storefront order number. Used to recover a
    /// shipment identifier the create response failed to surface.
    pub async fn fetch_orders(&self, token: &str, order_number: &str) -> Result<CarrierResponse> {
        let resp = self
            .http
            .get(format!("{}/orders", self.base_url))
            .query(&[("order_id", order_number)])
            .bearer_auth(token)
            .send()
            .await?;
        Ok(Self::decode(resp).await)
    }

    pub async fn assign_awb(
        &self,
        token: &str,
        shipment_id: &str,
        courier_id: Option<i64>,
    ) -> Result<CarrierResponse> {
        let resp = self
            .http
            .post(format!("{}/courier/assign/awb", self.base_url))
            .bearer_auth(token)
            .json(&serde_json::json!({
                "shipment_id": shipment_id,
                "courier_id": courier_id,
            }))
            .send()
            .await?;
        Ok(Self::decode(resp).await)
    }

    pub async fn generate_label(&self, token: &str, shipment_id: &str) -> Result<CarrierResponse> {
        let resp = self
            .http
            .post(format!("{}/courier/generate/label", self.base_url))
            .bearer_auth(token)
            .json(&serde_json::json!({"shipment_id": shipment_id}))
            .send()
            .await?;
        Ok(Self::decode(resp).await)
    }

    /// Carrier tracking payload for an AWB, passed through verbatim.
    pub async fn track_by_awb(&self, token: &str, awb: &str) -> Result<Value> {
        let resp = self
            .http
            .get(format!("{}/courier/track/awb/{}", self.base_url, awb))
            .bearer_auth(token)
            .send()
            .await?;
        let decoded = Self::decode(resp).await;

        if !decoded.ok {
            return Err(FulfillmentError::carrier(
                format!("failed to track AWB {} (status {})", awb, decoded.status),
                Some(decoded.body),
            ));
        }
        Ok(decoded.body)
    }

    /// Courier serviceability between two postal codes, passed through
    /// verbatim.
    pub async fn serviceability(
        &self,
        token: &str,
        query: &ServiceabilityQuery,
    ) -> Result<Value> {
        let resp = self
            .http
            .get(format!("{}/courier/serviceability", self.base_url))
            .query(&[
                ("pickup_postcode", query.pickup_postcode.as_str()),
                ("delivery_postcode", query.delivery_postcode.as_str()),
                ("cod", if query.cod { "1" } else { "0" }),
                ("weight", &query.weight.to_string()),
            ])
            .bearer_auth(token)
            .send()
            .await?;
        let decoded = Self::decode(resp).await;

        if !decoded.ok {
            return Err(FulfillmentError::carrier(
                format!("serviceability check failed (status {})", decoded.status),
                Some(decoded.body),
            ));
        }
        Ok(decoded.body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;

    fn client_for(server: &MockServer) -> CarrierClient {
        let config = FulfillmentConfig {
            carrier: crate::config::CarrierConfig {
                base_url: Some(server.base_url()),
                timeout_seconds: Some(5),
                pickup_location: None,
            },
        };
        CarrierClient::new(&config).unwrap()
    }

    #[tokio::test]
    async fn test_login_returns_token() {
        let server = MockServer::start();
        let login_mock = server.mock(|when, then| {
            when.method(POST)
                .path("/auth/login")
                .json_body(serde_json::json!({
                    "email": "ops@nefol.in",
                    "password": "secret"
                }));
            then.status(200)
                .json_body(serde_json::json!({"token": "tok_123"}));
        });

        let client = client_for(&server);
        let token = client.login("ops@nefol.in", "secret").await.unwrap();

        login_mock.assert();
        assert_eq!(token, "tok_123");
    }

    #[tokio::test]
    async fn test_login_rejection_is_authentication_error() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/auth/login");
            then.status(403)
                .json_body(serde_json::json!({"message": "Wrong email or password"}));
        });

        let client = client_for(&server);
        let err = client.login("ops@nefol.in", "bad").await.unwrap_err();

        assert!(matches!(
            err,
            crate::utils::error::FulfillmentError::AuthenticationError { .. }
        ));
    }

    #[tokio::test]
    async fn test_login_without_token_is_authentication_error() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/auth/login");
            then.status(200).json_body(serde_json::json!({"ok": true}));
        });

        let client = client_for(&server);
        let err = client.login("ops@nefol.in", "secret").await.unwrap_err();

        assert!(matches!(
            err,
            crate::utils::error::FulfillmentError::AuthenticationError { .. }
        ));
    }

    #[tokio::test]
    async fn test_pickup_locations_handles_nested_and_bare_shapes() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/settings/company/pickup");
            then.status(200).json_body(serde_json::json!({
                "data": {"data": [
                    {"pickup_location": "Home", "id": 1},
                    {"pickup_location": "Warehouse", "id": 2}
                ]}
            }));
        });

        let client = client_for(&server);
        let locations = client.pickup_locations("tok").await.unwrap();

        assert_eq!(locations.len(), 2);
        assert_eq!(locations[0].display_name().unwrap(), "Home");
    }

    #[tokio::test]
    async fn test_pickup_locations_non_array_is_empty() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/settings/company/pickup");
            then.status(200)
                .json_body(serde_json::json!({"data": {"note": "none registered"}}));
        });

        let client = client_for(&server);
        let locations = client.pickup_locations("tok").await.unwrap();

        assert!(locations.is_empty());
    }

    #[tokio::test]
    async fn test_create_shipment_surfaces_error_body_not_err() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/orders/create/adhoc");
            then.status(422)
                .json_body(serde_json::json!({"message": "Pickup location X is invalid"}));
        });

        let client = client_for(&server);
        let order = crate::carrier::payload::tests_order_fixture();
        let payload = crate::carrier::payload::build_shipment_payload(&order, "X");
        let resp = client.create_shipment("tok", &payload).await.unwrap();

        assert!(!resp.ok);
        assert_eq!(resp.status, 422);
        assert_eq!(
            crate::carrier::response::extract_message(&resp.body),
            "Pickup location X is invalid"
        );
    }
}
