use clap::Parser;
use nefol_fulfillment::adapters::memory::{
    InMemoryCredentialStore, InMemoryOrderStore, InMemoryShipmentStore,
};
use nefol_fulfillment::config::cli::{Cli, Command};
use nefol_fulfillment::utils::{logger, validation::Validate};
use nefol_fulfillment::{
    CarrierClient, FulfillmentConfig, FulfillmentService, Order, ServiceabilityQuery,
};

fn credentials_from_env() -> Result<(String, String), Box<dyn std::error::Error>> {
    let email = std::env::var("SHIPROCKET_EMAIL")
        .map_err(|_| "SHIPROCKET_EMAIL environment variable is not set")?;
    let password = std::env::var("SHIPROCKET_PASSWORD")
        .map_err(|_| "SHIPROCKET_PASSWORD environment variable is not set")?;
    Ok((email, password))
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    if cli.log_json {
        logger::init_json_logger();
    } else {
        logger::init_cli_logger(cli.verbose);
    }

    let config = match &cli.config {
        Some(path) => FulfillmentConfig::from_file(path)?,
        None => FulfillmentConfig::default(),
    };

    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        eprintln!("❌ {}", e);
        std::process::exit(1);
    }

    tracing::debug!("using carrier endpoint {}", config.base_url());

    match cli.command {
        Command::VerifyCredentials => {
            let (email, password) = credentials_from_env()?;
            let client = CarrierClient::new(&config)?;
            client.login(&email, &password).await?;
            println!("✅ Carrier credentials verified for {}", email);
        }

        Command::Create { order_file } => {
            let (email, password) = credentials_from_env()?;
            let content = std::fs::read_to_string(&order_file)?;
            let order: Order = serde_json::from_str(&content)?;
            let order_id = order.id;

            let orders = InMemoryOrderStore::new();
            orders.insert(order).await;

            let service = FulfillmentService::new(
                &config,
                InMemoryCredentialStore::new(),
                InMemoryShipmentStore::new(),
                orders,
            )?;
            service.save_credentials(&email, &password).await?;

            let record = service.create_shipment(order_id).await?;
            if record.needs_manual_check() {
                eprintln!("⚠️ Shipment recorded without a carrier shipment_id - needs manual check");
            }
            println!("{}", serde_json::to_string_pretty(&record)?);
        }

        Command::Track { awb } => {
            let (email, password) = credentials_from_env()?;
            let client = CarrierClient::new(&config)?;
            let token = client.login(&email, &password).await?;
            let payload = client.track_by_awb(&token, &awb).await?;
            println!("{}", serde_json::to_string_pretty(&payload)?);
        }

        Command::Serviceability {
            pickup_postcode,
            delivery_postcode,
            cod,
            weight,
        } => {
            let (email, password) = credentials_from_env()?;
            let client = CarrierClient::new(&config)?;
            let token = client.login(&email, &password).await?;
            let payload = client
                .serviceability(
                    &token,
                    &ServiceabilityQuery {
                        pickup_postcode,
                        delivery_postcode,
                        cod,
                        weight,
                    },
                )
                .await?;
            println!("{}", serde_json::to_string_pretty(&payload)?);
        }
    }

    Ok(())
}
