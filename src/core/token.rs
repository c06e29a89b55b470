use crate::carrier::CarrierClient;
use crate::domain::ports::CredentialStore;
use crate::utils::error::{FulfillmentError, Result};
use std::sync::Arc;

/// Exchanges the stored carrier credential for a short-lived bearer token.
///
/// Stateless: every orchestration step re-authenticates. A short-TTL cache
/// could be added behind this same interface without changing callers.
pub struct TokenBroker<C: CredentialStore> {
    carrier: Arc<CarrierClient>,
    credentials: Arc<C>,
}

impl<C: CredentialStore> TokenBroker<C> {
    pub fn new(carrier: Arc<CarrierClient>, credentials: Arc<C>) -> Self {
        Self {
            carrier,
            credentials,
        }
    }

    /// Missing credentials are a configuration problem ("not configured"),
    /// distinct from the carrier rejecting them ("bad credentials").
    pub async fn authenticate(&self) -> Result<String> {
        let credential = self.credentials.active().await?.ok_or_else(|| {
            FulfillmentError::configuration(
                "carrier credentials are not configured; save them before fulfilling orders",
            )
        })?;

        self.carrier
            .login(&credential.email, &credential.password)
            .await
    }
}
