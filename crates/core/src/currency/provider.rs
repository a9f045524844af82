//! Remote exchange rate provider.
//!
//! The provider answers `GET <endpoint>` with `{ "rates": { "<ISO>": <number>, ... } }`
//! quoted against USD. Only the supported [`Currency`] codes are read.

use std::str::FromStr;
use std::time::Duration;

use async_trait::async_trait;
use neutron_shared::config::{DEFAULT_EXCHANGE_RATE_ENDPOINT, ExchangeRateConfig};
use neutron_shared::types::Currency;
use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::debug;

use super::error::CurrencyError;
use super::rates::RateTable;

/// Source of current USD-based rates.
#[async_trait]
pub trait RateProvider: Send + Sync + std::fmt::Debug {
    /// Fetches the current rate for every supported currency.
    async fn fetch_rates(&self) -> Result<RateTable, CurrencyError>;
}

/// Builder for constructing an [`HttpRateProvider`].
#[derive(Debug, Default)]
pub struct HttpRateProviderBuilder {
    /// Endpoint override (for testing).
    endpoint: Option<String>,
    /// Request timeout.
    timeout: Option<Duration>,
}

impl HttpRateProviderBuilder {
    /// Overrides the endpoint (useful for testing with a mock server).
    #[must_use]
    pub fn endpoint<T: Into<String>>(mut self, url: T) -> Self {
        self.endpoint = Some(url.into());
        self
    }

    /// Bounds each request.
    #[must_use]
    pub const fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Builds the provider.
    ///
    /// # Errors
    ///
    /// Returns [`CurrencyError::Provider`] if the HTTP client fails to build.
    pub fn build(self) -> Result<HttpRateProvider, CurrencyError> {
        let mut http = reqwest::Client::builder();
        if let Some(timeout) = self.timeout {
            http = http.timeout(timeout);
        }

        Ok(HttpRateProvider {
            http: http.build()?,
            endpoint: self
                .endpoint
                .unwrap_or_else(|| DEFAULT_EXCHANGE_RATE_ENDPOINT.to_owned()),
        })
    }
}

/// HTTP-backed [`RateProvider`].
#[derive(Debug, Clone)]
pub struct HttpRateProvider {
    http: reqwest::Client,
    endpoint: String,
}

#[derive(Debug, Deserialize)]
struct RatesResponse {
    rates: serde_json::Map<String, serde_json::Value>,
}

impl HttpRateProvider {
    /// Creates a new builder.
    #[must_use]
    pub fn builder() -> HttpRateProviderBuilder {
        HttpRateProviderBuilder::default()
    }

    /// Builds a provider from application configuration.
    pub fn from_config(config: &ExchangeRateConfig) -> Result<Self, CurrencyError> {
        Self::builder()
            .endpoint(config.endpoint.clone())
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
    }

    /// Configured endpoint.
    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl RateProvider for HttpRateProvider {
    async fn fetch_rates(&self) -> Result<RateTable, CurrencyError> {
        debug!(endpoint = %self.endpoint, "Fetching exchange rates");
        let body = self
            .http
            .get(&self.endpoint)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;

        parse_rates(&body)
    }
}

/// Extracts the supported currencies from a provider response body.
pub fn parse_rates(body: &str) -> Result<RateTable, CurrencyError> {
    let response: RatesResponse = serde_json::from_str(body)
        .map_err(|e| CurrencyError::MalformedResponse(e.to_string()))?;

    let mut pairs = Vec::with_capacity(Currency::ALL.len());
    for currency in Currency::ALL {
        let raw = response
            .rates
            .get(currency.iso_code())
            .ok_or(CurrencyError::MissingRate(currency))?;
        let rate = decimal_from_json(raw).ok_or_else(|| {
            CurrencyError::MalformedResponse(format!(
                "rate for {} is not a number",
                currency.iso_code()
            ))
        })?;
        if rate <= Decimal::ZERO {
            return Err(CurrencyError::NonPositiveRate(currency));
        }
        pairs.push((currency, rate));
    }

    Ok(RateTable::from_pairs(pairs))
}

fn decimal_from_json(value: &serde_json::Value) -> Option<Decimal> {
    let serde_json::Value::Number(number) = value else {
        return None;
    };
    let number = number.to_string();
    Decimal::from_str(&number)
        .or_else(|_| Decimal::from_scientific(&number))
        .ok()
}
