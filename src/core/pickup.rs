use crate::carrier::CarrierClient;
use std::sync::Arc;

/// Picks the pickup location name to submit with a shipment.
///
/// Best-effort only: a wrong name is corrected downstream by the
/// pickup-location retry in the shipment creator, so this resolver never
/// returns an error.
pub struct PickupResolver {
    carrier: Arc<CarrierClient>,
    canonical: String,
}

impl PickupResolver {
    pub fn new(carrier: Arc<CarrierClient>, canonical: String) -> Self {
        Self { carrier, canonical }
    }

    /// Prefer the registered location whose name matches the canonical label
    /// case-insensitively, else the first registered location, else the
    /// canonical label itself.
    pub async fn resolve(&self, token: &str) -> String {
        let locations = match self.carrier.pickup_locations(token).await {
            Ok(locations) => locations,
            Err(err) => {
                tracing::warn!(
                    "failed to fetch pickup locations, using default '{}': {}",
                    self.canonical,
                    err
                );
                return self.canonical.clone();
            }
        };

        if locations.is_empty() {
            tracing::warn!(
                "carrier returned no pickup locations, using default '{}'",
                self.canonical
            );
            return self.canonical.clone();
        }

        let canonical_lower = self.canonical.to_lowercase();
        let matched = locations.iter().find(|location| {
            location
                .display_name()
                .map(|name| name.to_lowercase() == canonical_lower)
                .unwrap_or(false)
        });

        let chosen = matched
            .or_else(|| locations.first())
            .and_then(|location| location.display_name())
            .unwrap_or_else(|| self.canonical.clone());

        tracing::debug!(
            "resolved pickup location '{}' from {} registered location(s)",
            chosen,
            locations.len()
        );
        chosen
    }
}
