pub mod awb;
pub mod pickup;
pub mod service;
pub mod shipment;
pub mod token;

pub use service::{CredentialStatus, FulfillmentService};
