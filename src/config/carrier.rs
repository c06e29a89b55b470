use crate::utils::error::{FulfillmentError, Result};
use crate::utils::validation::{self, Validate};
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const DEFAULT_BASE_URL: &str = "https://apiv2.shiprocket.in/v1/external";
pub const DEFAULT_TIMEOUT_SECONDS: u64 = 30;

/// Canonical pickup location registered with the carrier. Used as the match
/// target when resolving locations and as the last-resort fallback.
pub const DEFAULT_PICKUP_LOCATION: &str = "Home";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FulfillmentConfig {
    pub carrier: CarrierConfig,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CarrierConfig {
    pub base_url: Option<String>,
    pub timeout_seconds: Option<u64>,
    pub pickup_location: Option<String>,
}

impl FulfillmentConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(FulfillmentError::IoError)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| FulfillmentError::InvalidConfigValueError {
            field: "toml_parsing".to_string(),
            value: String::new(),
            reason: format!("TOML parsing error: {}", e),
        })
    }

    /// Substitute `${VAR_NAME}` placeholders with environment values.
    /// Unknown variables are left as-is so validation can report them.
    fn substitute_env_vars(content: &str) -> Result<String> {
        use regex::Regex;
        let re = Regex::new(r"\$\{([^}]+)\}").unwrap();

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    /// Carrier API base URL. Config wins over the `SHIPROCKET_BASE_URL`
    /// environment variable, which wins over the public endpoint.
    pub fn base_url(&self) -> String {
        if let Some(url) = &self.carrier.base_url {
            return url.trim_end_matches('/').to_string();
        }
        std::env::var("SHIPROCKET_BASE_URL")
            .ok()
            .filter(|v| !v.is_empty())
            .map(|v| v.trim_end_matches('/').to_string())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
    }

    pub fn timeout_seconds(&self) -> u64 {
        self.carrier.timeout_seconds.unwrap_or(DEFAULT_TIMEOUT_SECONDS)
    }

    pub fn pickup_location(&self) -> String {
        self.carrier
            .pickup_location
            .clone()
            .unwrap_or_else(|| DEFAULT_PICKUP_LOCATION.to_string())
    }

    pub fn validate_config(&self) -> Result<()> {
        validation::validate_url("carrier.base_url", &self.base_url())?;
        validation::validate_positive_number("carrier.timeout_seconds", self.timeout_seconds(), 1)?;
        validation::validate_non_empty_string("carrier.pickup_location", &self.pickup_location())?;
        Ok(())
    }
}

impl Validate for FulfillmentConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}
