use clap::{Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "nefol-fulfillment")]
#[command(about = "Shipment fulfillment tooling for the NEFOL back office")]
pub struct Cli {
    /// Optional TOML config file; carrier defaults apply when omitted
    #[arg(long)]
    pub config: Option<String>,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Emit logs as JSON")]
    pub log_json: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Verify carrier credentials by performing a real login
    VerifyCredentials,

    /// Create a shipment (and best-effort AWB + label) for an order JSON file
    Create {
        #[arg(long)]
        order_file: String,
    },

    /// Fetch carrier tracking for an AWB
    Track {
        #[arg(long)]
        awb: String,
    },

    /// Check courier serviceability between two postal codes
    Serviceability {
        #[arg(long)]
        pickup_postcode: String,

        #[arg(long)]
        delivery_postcode: String,

        #[arg(long)]
        cod: bool,

        #[arg(long, default_value = "0.5")]
        weight: f64,
    },
}
