//! Ledger currency changes and the background rewrite of stored values.
//!
//! Changing a user's currency refreshes the rate cache if it is stale,
//! persists the new preference, and hands the value rewrite to a background
//! task. The caller gets a [`ConversionHandle`] it can await, poll or cancel.
//! Rows are rewritten one at a time, so a cancelled or failed run leaves the
//! rows it already converted in the new currency.
//!
//! A run holds the user's ledger gate exclusively from the preference change
//! until its last row, and each row is only rewritten while it still holds
//! the amount the run read. Writes made through a [`RevenueService`] sharing
//! the gate therefore land after the run and are never converted twice.
//!
//! [`RevenueService`]: super::RevenueService

use std::sync::Arc;

use dashmap::DashMap;
use neutron_core::Clock;
use neutron_core::currency::{RateCache, RateProvider, RateTable, convert_value};
use neutron_shared::types::{Currency, UserId};
use sea_orm::DatabaseConnection;
use serde::Serialize;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use super::error::ServiceError;
use super::locks::{KeyGuard, KeyedLocks};
use crate::repositories::{RevenueRepository, UserRepository};

/// Progress of one conversion run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum ConversionStatus {
    /// Rows are being rewritten.
    Running {
        /// Rows rewritten so far.
        converted: u64,
    },
    /// Every row was rewritten.
    Completed {
        /// Rows rewritten.
        converted: u64,
    },
    /// Stopped on request.
    Cancelled {
        /// Rows rewritten before the stop.
        converted: u64,
    },
    /// Abandoned after an error. Not retried.
    Failed {
        /// What went wrong.
        reason: String,
    },
}

impl ConversionStatus {
    /// True once the run can make no further progress.
    #[must_use]
    pub const fn is_finished(&self) -> bool {
        !matches!(self, Self::Running { .. })
    }
}

/// Handle to a background conversion run.
#[derive(Debug)]
pub struct ConversionHandle {
    status: watch::Receiver<ConversionStatus>,
    cancel: CancellationToken,
    task: JoinHandle<()>,
}

impl ConversionHandle {
    /// Latest reported status.
    #[must_use]
    pub fn status(&self) -> ConversionStatus {
        self.status.borrow().clone()
    }

    /// Asks the run to stop before its next row.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Waits for the run to finish and returns its final status.
    pub async fn wait(self) -> ConversionStatus {
        if let Err(e) = self.task.await {
            warn!(error = %e, "Conversion task ended abnormally");
            let status = self.status.borrow().clone();
            if !status.is_finished() {
                return ConversionStatus::Failed {
                    reason: e.to_string(),
                };
            }
            return status;
        }
        self.status.borrow().clone()
    }
}

/// Currency preference and ledger conversion.
#[derive(Debug, Clone)]
pub struct CurrencyService {
    users: UserRepository,
    revenues: RevenueRepository,
    rates: Arc<RateCache>,
    provider: Arc<dyn RateProvider>,
    clock: Arc<dyn Clock>,
    gate: Arc<KeyedLocks<UserId>>,
    latest: Arc<DashMap<UserId, watch::Receiver<ConversionStatus>>>,
}

impl CurrencyService {
    /// Creates a new currency service around a shared rate cache.
    #[must_use]
    pub fn new(
        db: DatabaseConnection,
        rates: Arc<RateCache>,
        provider: Arc<dyn RateProvider>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            users: UserRepository::new(db.clone()),
            revenues: RevenueRepository::new(db),
            rates,
            provider,
            clock,
            gate: Arc::new(KeyedLocks::new()),
            latest: Arc::new(DashMap::new()),
        }
    }

    /// The per-user gate a run holds exclusively. Hand it to
    /// [`RevenueService::with_ledger_gate`](super::RevenueService::with_ledger_gate).
    #[must_use]
    pub fn ledger_gate(&self) -> Arc<KeyedLocks<UserId>> {
        Arc::clone(&self.gate)
    }

    /// The user's current ledger currency.
    pub async fn currency(&self, user: UserId) -> Result<Currency, ServiceError> {
        self.users
            .currency(user)
            .await?
            .ok_or(ServiceError::UserNotFound(user))
    }

    /// Switches the user's ledger currency.
    ///
    /// Returns `None` when `currency` is already the user's. Otherwise the
    /// preference is stored before this returns and the stored values are
    /// rewritten in the background. Runs for the same user happen one after
    /// another, so this waits for any earlier run, and for amount writes in
    /// flight, to finish first.
    ///
    /// # Errors
    ///
    /// A rate refresh failure is returned here and leaves the preference
    /// unchanged.
    pub async fn change_currency(
        &self,
        user: UserId,
        currency: Currency,
    ) -> Result<Option<ConversionHandle>, ServiceError> {
        let guard = self.gate.lock(user).await;

        let current = self.currency(user).await?;
        if current == currency {
            return Ok(None);
        }

        let rates = self
            .rates
            .refresh_if_stale(self.provider.as_ref(), self.clock.now())
            .await?;
        rates.rate(current)?;
        rates.rate(currency)?;

        if !self.users.set_currency(user, currency).await? {
            return Err(ServiceError::UserNotFound(user));
        }
        info!(user_id = %user, from = %current, to = %currency, "Ledger currency changed");

        let (tx, rx) = watch::channel(ConversionStatus::Running { converted: 0 });
        let cancel = CancellationToken::new();
        self.latest.insert(user, rx.clone());

        let run = ConversionRun {
            revenues: self.revenues.clone(),
            user,
            from: current,
            to: currency,
            rates,
            status: tx,
            cancel: cancel.clone(),
        };
        let task = tokio::spawn(run.execute(guard));

        Ok(Some(ConversionHandle {
            status: rx,
            cancel,
            task,
        }))
    }

    /// Status of the user's most recent conversion, if any ran since startup.
    #[must_use]
    pub fn latest_status(&self, user: UserId) -> Option<ConversionStatus> {
        self.latest.get(&user).map(|rx| rx.borrow().clone())
    }
}

struct ConversionRun {
    revenues: RevenueRepository,
    user: UserId,
    from: Currency,
    to: Currency,
    rates: RateTable,
    status: watch::Sender<ConversionStatus>,
    cancel: CancellationToken,
}

impl ConversionRun {
    async fn execute(self, _guard: KeyGuard<UserId>) {
        let outcome = self.rewrite().await;
        info!(user_id = %self.user, status = ?outcome, "Conversion finished");
        self.status.send_replace(outcome);
    }

    async fn rewrite(&self) -> ConversionStatus {
        let rows = match self.revenues.ledger_values(self.user).await {
            Ok(rows) => rows,
            Err(e) => return self.fail(&e),
        };

        let mut converted = 0;
        for row in rows {
            if self.cancel.is_cancelled() {
                return ConversionStatus::Cancelled { converted };
            }
            let value = match convert_value(row.value, self.from, self.to, &self.rates) {
                Ok(value) => value,
                Err(e) => return self.fail(&e),
            };
            match self.revenues.set_value(&row, value).await {
                Ok(true) => converted += 1,
                Ok(false) => {
                    debug!(revenue_id = %row.id, "Row changed since it was read, skipped");
                    continue;
                }
                Err(e) => return self.fail(&e),
            }
            self.status
                .send_replace(ConversionStatus::Running { converted });
        }

        ConversionStatus::Completed { converted }
    }

    fn fail(&self, e: &dyn std::error::Error) -> ConversionStatus {
        error!(user_id = %self.user, error = %e, "Conversion abandoned");
        ConversionStatus::Failed {
            reason: e.to_string(),
        }
    }
}
