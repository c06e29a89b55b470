pub mod adapters;
pub mod carrier;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

pub use carrier::{CarrierClient, ServiceabilityQuery};
pub use config::FulfillmentConfig;
pub use core::{CredentialStatus, FulfillmentService};
pub use domain::model::{Order, ShipmentRecord};
pub use utils::error::{FulfillmentError, Result};
