//! Wallet aggregation over the current and previous period.

use std::sync::Arc;

use neutron_core::Clock;
use neutron_core::period::{PeriodWindow, RevenuePeriod};
use neutron_core::revenue::{GeneralRevenue, ProjectRevenue};
use neutron_core::wallet::WalletStatus;
use neutron_shared::types::UserId;
use rust_decimal::Decimal;
use sea_orm::{DatabaseConnection, DbErr};
use tracing::debug;

use super::error::ServiceError;
use crate::repositories::{RevenueFilter, RevenueRepository};

/// Earnings totals and trend.
#[derive(Debug, Clone)]
pub struct WalletService {
    revenues: RevenueRepository,
    clock: Arc<dyn Clock>,
}

impl WalletService {
    /// Creates a new wallet service.
    #[must_use]
    pub fn new(db: DatabaseConnection, clock: Arc<dyn Clock>) -> Self {
        Self {
            revenues: RevenueRepository::new(db),
            clock,
        }
    }

    /// Sums the period and the one before it and compares them.
    ///
    /// With no previous window (`ALL`) the previous total is zero, which
    /// reports the no-history trend.
    pub async fn get_wallet_status(
        &self,
        owner: UserId,
        period: RevenuePeriod,
        labels: &[String],
    ) -> Result<WalletStatus, ServiceError> {
        let now = self.clock.now();
        let total = self.earnings(owner, period.current_window(now), labels).await?;
        let previous = match period.previous_window(now) {
            Some(window) => self.earnings(owner, window, labels).await?,
            None => Decimal::ZERO,
        };

        let status = WalletStatus::from_totals(total, previous);
        debug!(
            user_id = %owner,
            period = %period,
            total = %status.total_earnings,
            trend = %status.trend,
            "Wallet computed"
        );
        Ok(status)
    }

    async fn earnings(
        &self,
        owner: UserId,
        window: PeriodWindow,
        labels: &[String],
    ) -> Result<Decimal, DbErr> {
        let filter = RevenueFilter::new(window, labels.to_vec());
        let general: Decimal = self
            .revenues
            .get_general(owner, &filter, 0, None)
            .await?
            .iter()
            .map(GeneralRevenue::value)
            .sum();
        let projects: Decimal = self
            .revenues
            .get_projects(owner, &filter, 0, None)
            .await?
            .iter()
            .map(ProjectRevenue::value)
            .sum();

        Ok(general + projects)
    }
}
