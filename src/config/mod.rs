pub mod carrier;

#[cfg(feature = "cli")]
pub mod cli;

pub use carrier::{CarrierConfig, FulfillmentConfig, DEFAULT_PICKUP_LOCATION};
