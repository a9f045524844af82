//! USD-based rate table and the refresh-gated cache in front of the provider.

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

use chrono::{DateTime, TimeDelta, Utc};
use neutron_shared::types::Currency;
use rust_decimal::Decimal;
use tracing::{debug, info};

use super::error::CurrencyError;
use super::provider::RateProvider;

/// Units of each currency per 1 USD.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RateTable {
    rates: HashMap<Currency, Decimal>,
}

impl RateTable {
    /// Builds a table from `(currency, rate)` pairs.
    pub fn from_pairs(pairs: impl IntoIterator<Item = (Currency, Decimal)>) -> Self {
        Self {
            rates: pairs.into_iter().collect(),
        }
    }

    /// Rate for `currency`. USD is always 1.
    pub fn rate(&self, currency: Currency) -> Result<Decimal, CurrencyError> {
        if currency == Currency::Dollar {
            return Ok(Decimal::ONE);
        }
        let rate = self
            .rates
            .get(&currency)
            .copied()
            .ok_or(CurrencyError::MissingRate(currency))?;
        if rate <= Decimal::ZERO {
            return Err(CurrencyError::NonPositiveRate(currency));
        }
        Ok(rate)
    }

    /// Number of currencies with a rate.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rates.len()
    }

    /// True if no rates are held.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rates.is_empty()
    }
}

#[derive(Debug, Default)]
struct CacheState {
    rates: RateTable,
    last_refresh: Option<DateTime<Utc>>,
}

/// Process-wide rate cache, injected where it is needed.
///
/// Refreshes are not mutually exclusive: two callers that both see a stale
/// cache both fetch, and the last write wins. The lock is never held across
/// the provider call.
#[derive(Debug)]
pub struct RateCache {
    state: Mutex<CacheState>,
    refresh_interval: TimeDelta,
}

impl RateCache {
    /// Creates an empty cache that will fetch on first use.
    #[must_use]
    pub fn new(refresh_interval: TimeDelta) -> Self {
        Self {
            state: Mutex::new(CacheState::default()),
            refresh_interval,
        }
    }

    /// Creates a cache pre-filled with `rates` fetched at `refreshed_at`.
    #[must_use]
    pub fn with_rates(
        rates: RateTable,
        refreshed_at: DateTime<Utc>,
        refresh_interval: TimeDelta,
    ) -> Self {
        Self {
            state: Mutex::new(CacheState {
                rates,
                last_refresh: Some(refreshed_at),
            }),
            refresh_interval,
        }
    }

    /// True if the cache has never been filled or its rates are at least one
    /// refresh interval old.
    #[must_use]
    pub fn is_stale(&self, now: DateTime<Utc>) -> bool {
        let state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        state
            .last_refresh
            .is_none_or(|last| now - last >= self.refresh_interval)
    }

    /// Instant of the last successful refresh.
    #[must_use]
    pub fn last_refresh(&self) -> Option<DateTime<Utc>> {
        self.state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .last_refresh
    }

    /// Copy of the current rates.
    #[must_use]
    pub fn snapshot(&self) -> RateTable {
        self.state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .rates
            .clone()
    }

    /// Replaces the rates and stamps the refresh instant.
    pub fn store(&self, rates: RateTable, now: DateTime<Utc>) {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        state.rates = rates;
        state.last_refresh = Some(now);
    }

    /// Returns current rates, fetching from `provider` first if stale.
    ///
    /// A failed fetch leaves the cache untouched and is returned to the caller.
    pub async fn refresh_if_stale(
        &self,
        provider: &dyn RateProvider,
        now: DateTime<Utc>,
    ) -> Result<RateTable, CurrencyError> {
        if !self.is_stale(now) {
            debug!("Exchange rates still fresh");
            return Ok(self.snapshot());
        }

        let rates = provider.fetch_rates().await?;
        info!(currencies = rates.len(), "Exchange rates refreshed");
        self.store(rates.clone(), now);
        Ok(rates)
    }
}

impl Default for RateCache {
    fn default() -> Self {
        Self::new(TimeDelta::hours(24))
    }
}
