//! # Sale Configuration
//!
//! `SaleConfig` holds the administrator-mutable sale parameters and the
//! constants fixed at construction. It deserializes from YAML or JSON with
//! every field except `sale_start_time` and `base_uri` defaulted.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use mintgate_core::{Amount, Timestamp};

use crate::phase::PhaseSchedule;
use crate::quota::QuotaLimits;

/// Default allow-list price: 0.002 in 18-decimal units.
pub const DEFAULT_WHITELIST_PRICE: Amount = Amount::new(2_000_000_000_000_000);
/// Default public price: 0.003 in 18-decimal units.
pub const DEFAULT_PUBLIC_PRICE: Amount = Amount::new(3_000_000_000_000_000);
/// Default URI returned for every asset before the reveal.
pub const DEFAULT_PLACEHOLDER_URI: &str = "ipfs://placeholder/hidden.json";

/// Rejections from [`SaleConfig::validate`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Supply caps are not nested.
    #[error("supply caps must satisfy whitelist ({whitelist}) <= sale ({sale}) <= total ({total})")]
    SupplyCapOrder { whitelist: u64, sale: u64, total: u64 },

    /// The allow-list cap is larger than the combined cap.
    #[error("per-identity whitelist cap ({whitelist}) exceeds combined cap ({public})")]
    IdentityCapOrder { whitelist: u64, public: u64 },

    /// A field that must be positive is zero.
    #[error("{field} must be greater than zero")]
    Zero { field: &'static str },

    /// The base URI is empty.
    #[error("base_uri must not be empty")]
    EmptyBaseUri,
}

/// Sale parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaleConfig {
    /// Anchor for every phase boundary.
    pub sale_start_time: Timestamp,
    #[serde(default)]
    pub schedule: PhaseSchedule,
    #[serde(default = "default_whitelist_price")]
    pub whitelist_price: Amount,
    #[serde(default = "default_public_price")]
    pub public_price: Amount,
    #[serde(default)]
    pub limits: QuotaLimits,
    #[serde(default)]
    pub paused: bool,
    /// Prefix for revealed token URIs.
    pub base_uri: String,
    #[serde(default = "default_placeholder_uri")]
    pub placeholder_uri: String,
}

fn default_whitelist_price() -> Amount {
    DEFAULT_WHITELIST_PRICE
}

fn default_public_price() -> Amount {
    DEFAULT_PUBLIC_PRICE
}

fn default_placeholder_uri() -> String {
    DEFAULT_PLACEHOLDER_URI.to_string()
}

impl SaleConfig {
    /// A config with default schedule, prices and limits.
    pub fn new(sale_start_time: Timestamp, base_uri: impl Into<String>) -> Self {
        Self {
            sale_start_time,
            schedule: PhaseSchedule::default(),
            whitelist_price: DEFAULT_WHITELIST_PRICE,
            public_price: DEFAULT_PUBLIC_PRICE,
            limits: QuotaLimits::default(),
            paused: false,
            base_uri: base_uri.into(),
            placeholder_uri: DEFAULT_PLACEHOLDER_URI.to_string(),
        }
    }

    /// Check the cap hierarchy and required fields.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let l = &self.limits;
        if l.max_whitelist_supply > l.max_sale_supply || l.max_sale_supply > l.max_total_supply {
            return Err(ConfigError::SupplyCapOrder {
                whitelist: l.max_whitelist_supply,
                sale: l.max_sale_supply,
                total: l.max_total_supply,
            });
        }
        if l.max_per_identity_whitelist > l.max_per_identity_public {
            return Err(ConfigError::IdentityCapOrder {
                whitelist: l.max_per_identity_whitelist,
                public: l.max_per_identity_public,
            });
        }
        if l.max_per_call_public == 0 {
            return Err(ConfigError::Zero {
                field: "max_per_call_public",
            });
        }
        if self.schedule.whitelist_duration_secs == 0 {
            return Err(ConfigError::Zero {
                field: "whitelist_duration_secs",
            });
        }
        if self.schedule.public_duration_secs == 0 {
            return Err(ConfigError::Zero {
                field: "public_duration_secs",
            });
        }
        if self.base_uri.trim().is_empty() {
            return Err(ConfigError::EmptyBaseUri);
        }
        Ok(())
    }
}
