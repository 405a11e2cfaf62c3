//! Greenhouse-gas inventory access and the derived carbon-credit market.
//!
//! The inventory itself is reached through an [`EmissionsSource`]; this
//! crate ships no network client. [`derive_credit_market`] turns year-on-year
//! CO2 reductions into credit records with a simple price heuristic.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use thiserror::Error;

/// Environment variable holding the inventory API key.
pub const API_KEY_ENV: &str = "UNFCCC_DI_API_KEY";
pub const DEFAULT_BASE_URL: &str = "https://di.unfccc.int/api/";

/// Parties queried by [`derive_credit_market`] when no list is given.
pub const MAJOR_PARTIES: [&str; 10] = [
    "USA", "CHN", "IND", "RUS", "JPN", "DEU", "GBR", "FRA", "ITA", "CAN",
];

/// Errors raised by an [`EmissionsSource`].
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EmissionsError {
    #[error("emissions service not available: API key required")]
    Unavailable,

    #[error("query for {party} failed: {reason}")]
    Query { party: String, reason: String },
}

/// A reporting party (country or group).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Party {
    pub code: String,
    pub name: Option<String>,
}

/// A greenhouse gas known to the inventory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Gas {
    pub code: String,
    pub name: Option<String>,
}

/// One inventory row. Missing values stay `None` rather than NaN.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmissionsRecord {
    pub party: String,
    pub year: Option<i32>,
    pub gas: String,
    pub category_name: Option<String>,
    pub emissions: Option<f64>,
}

/// Overview of a query result.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct EmissionsSummary {
    pub total_records: usize,
    pub years: Vec<i32>,
    pub categories: Vec<String>,
}

impl EmissionsSummary {
    pub fn from_records(records: &[EmissionsRecord]) -> Self {
        let years: BTreeSet<i32> = records.iter().filter_map(|r| r.year).collect();
        let categories: BTreeSet<&str> = records
            .iter()
            .filter_map(|r| r.category_name.as_deref())
            .collect();
        Self {
            total_records: records.len(),
            years: years.into_iter().collect(),
            categories: categories.into_iter().map(str::to_string).collect(),
        }
    }
}

/// Read access to a greenhouse-gas inventory.
pub trait EmissionsSource {
    fn list_parties(&self) -> Result<Vec<Party>, EmissionsError>;

    fn list_gases(&self) -> Result<Vec<Gas>, EmissionsError>;

    /// Rows for `party`, restricted to `gases` when non-empty and truncated
    /// to `limit` rows when given.
    fn query_emissions(
        &self,
        party: &str,
        gases: &[&str],
        limit: Option<usize>,
    ) -> Result<Vec<EmissionsRecord>, EmissionsError>;
}

/// Reported availability of the inventory client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ServiceStatus {
    pub available: bool,
    pub api_key_configured: bool,
    pub base_url: String,
}

/// Explicit inventory client settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmissionsClientConfig {
    pub api_key: Option<String>,
    pub base_url: String,
}

impl Default for EmissionsClientConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }
}

impl EmissionsClientConfig {
    /// Read the API key from [`API_KEY_ENV`]; blank values count as unset.
    pub fn from_env() -> Self {
        let api_key = std::env::var(API_KEY_ENV)
            .ok()
            .filter(|key| !key.trim().is_empty());
        Self {
            api_key,
            ..Default::default()
        }
    }

    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    pub fn status(&self) -> ServiceStatus {
        let api_key_configured = self.api_key.is_some();
        ServiceStatus {
            available: api_key_configured,
            api_key_configured,
            base_url: self.base_url.clone(),
        }
    }
}

/// Tradable credits implied by one party's year-on-year CO2 reduction.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CreditMarketRecord {
    pub name: String,
    pub standard: String,
    pub asset_id: String,
    pub current_price: f64,
    /// Reduction as a percentage of the previous year.
    pub price_change: f64,
    pub volume_24h: u64,
    pub market_cap: f64,
    pub total_supply: u64,
    pub location: String,
    pub project_type: String,
    pub last_updated: DateTime<Utc>,
    pub balance: u64,
    pub value: f64,
    pub data_source: String,
    pub emissions_reduction: f64,
    pub year: i32,
}

const BASE_CREDIT_PRICE: f64 = 15.0;
const MAX_PRICE_MULTIPLIER: f64 = 2.0;
const CO2_QUERY_LIMIT: usize = 100;

fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}

/// First non-zero emissions value reported for `year`.
fn emissions_in(records: &[EmissionsRecord], year: i32) -> Option<f64> {
    records
        .iter()
        .find(|r| r.year == Some(year))
        .and_then(|r| r.emissions)
        .filter(|e| *e != 0.0 && e.is_finite())
}

fn credit_record(party: &str, records: &[EmissionsRecord], now: DateTime<Utc>) -> Option<CreditMarketRecord> {
    let recent_year = records.iter().filter_map(|r| r.year).filter(|y| *y != 0).max()?;
    let recent = emissions_in(records, recent_year)?;
    let prev = emissions_in(records, recent_year - 1)?;

    let reduction = prev - recent;
    if reduction <= 0.0 {
        return None;
    }

    let credits = reduction.trunc() as u64;
    let multiplier = (1.0 + reduction / 1000.0).min(MAX_PRICE_MULTIPLIER);
    let price = round2(BASE_CREDIT_PRICE * multiplier);
    let value = credits as f64 * price;

    Some(CreditMarketRecord {
        name: format!("{party} Emissions Reduction Credits"),
        standard: "UNFCCC Verified".to_string(),
        asset_id: format!("UNFCCC-{party}-{recent_year}"),
        current_price: price,
        price_change: round2(reduction / prev * 100.0),
        volume_24h: credits,
        market_cap: value,
        total_supply: credits,
        location: party.to_string(),
        project_type: "Emissions Reduction".to_string(),
        last_updated: now,
        balance: credits,
        value,
        data_source: "unfccc_api".to_string(),
        emissions_reduction: reduction,
        year: recent_year,
    })
}

/// Derive credit records for `parties` from their CO2 history.
///
/// Parties whose query fails are logged and skipped; parties without a
/// positive reduction between their two latest years produce nothing.
pub fn derive_credit_market<S: EmissionsSource + ?Sized>(
    source: &S,
    parties: &[&str],
    now: DateTime<Utc>,
) -> Vec<CreditMarketRecord> {
    let credits: Vec<CreditMarketRecord> = parties
        .iter()
        .filter_map(|party| match source.query_emissions(party, &["CO2"], Some(CO2_QUERY_LIMIT)) {
            Ok(records) => credit_record(party, &records, now),
            Err(error) => {
                tracing::warn!(party, %error, "skipping party");
                None
            }
        })
        .collect();

    tracing::info!(records = credits.len(), parties = parties.len(), "derived credit market");
    credits
}
