//! Revenue domain types.
//!
//! A revenue is one of three concrete kinds a caller can hold: a general
//! revenue, a project, or a ticket. A project owns its initial revenue and its
//! tickets; its value is always derived from them.

use std::cmp::Ordering;

use chrono::{DateTime, TimeDelta, Utc};
use neutron_shared::types::{RevenueId, UserId, round_value};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::error::RevenueError;
use super::validation::{validate_description, validate_title, validate_value};
use crate::label::{LabelDraft, RevenueLabel, cap_labels};

/// Discriminant for every stored revenue row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RevenueKind {
    /// Standalone revenue with labels.
    General,
    /// Container with an opening balance and tickets.
    Project,
    /// Opening balance of a project.
    Initial,
    /// Sub-revenue attached to a project.
    Ticket,
}

/// Standalone income item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneralRevenue {
    /// Revenue id.
    pub id: RevenueId,
    /// Owning user.
    pub owner: UserId,
    /// Title, unique among the owner's general revenues.
    pub title: String,
    /// Stored value, 2 decimals.
    pub value: Decimal,
    /// When the revenue was received.
    pub revenue_date: DateTime<Utc>,
    /// Free text.
    pub description: Option<String>,
    /// Attached labels.
    pub labels: Vec<RevenueLabel>,
}

impl GeneralRevenue {
    /// Display value, re-rounded.
    #[must_use]
    pub fn value(&self) -> Decimal {
        round_value(self.value)
    }
}

/// Opening balance of a project. Has no title of its own.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InitialRevenue {
    /// Revenue id.
    pub id: RevenueId,
    /// Owning user.
    pub owner: UserId,
    /// Project this balance opens.
    pub project_id: RevenueId,
    /// Stored value, 2 decimals.
    pub value: Decimal,
    /// When the project started.
    pub revenue_date: DateTime<Utc>,
}

impl InitialRevenue {
    /// Display value, re-rounded.
    #[must_use]
    pub fn value(&self) -> Decimal {
        round_value(self.value)
    }
}

/// Ticket lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TicketStatus {
    /// Not closed yet.
    Pending,
    /// Closed at the given instant.
    Closed(DateTime<Utc>),
}

/// Sub-revenue of a project, pending until closed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TicketRevenue {
    /// Revenue id.
    pub id: RevenueId,
    /// Owning user.
    pub owner: UserId,
    /// Project the ticket belongs to.
    pub project_id: RevenueId,
    /// Title, unique within the project.
    pub title: String,
    /// Stored value, 2 decimals.
    pub value: Decimal,
    /// When the ticket was opened.
    pub revenue_date: DateTime<Utc>,
    /// Free text.
    pub description: Option<String>,
    /// Set exactly once, never earlier than `revenue_date`.
    pub closing_date: Option<DateTime<Utc>>,
}

/// Wire sentinel for a ticket that is still pending.
pub const PENDING_CLOSING_DATE: i64 = -1;

impl TicketRevenue {
    /// Display value, re-rounded.
    #[must_use]
    pub fn value(&self) -> Decimal {
        round_value(self.value)
    }

    /// True once the ticket has been closed.
    #[must_use]
    pub const fn is_closed(&self) -> bool {
        self.closing_date.is_some()
    }

    /// Current lifecycle state.
    #[must_use]
    pub const fn status(&self) -> TicketStatus {
        match self.closing_date {
            Some(at) => TicketStatus::Closed(at),
            None => TicketStatus::Pending,
        }
    }

    /// Time between opening and closing; `None` while pending.
    #[must_use]
    pub fn duration(&self) -> Option<TimeDelta> {
        self.closing_date.map(|closed| closed - self.revenue_date)
    }

    /// Closing date in epoch milliseconds, `-1` while pending.
    #[must_use]
    pub fn closing_timestamp(&self) -> i64 {
        self.closing_date
            .map_or(PENDING_CLOSING_DATE, |at| at.timestamp_millis())
    }

    /// Instant at which a close requested at `now` takes effect.
    ///
    /// A ticket opened in the future closes at its opening instant.
    pub fn closing_instant(&self, now: DateTime<Utc>) -> Result<DateTime<Utc>, RevenueError> {
        if self.is_closed() {
            return Err(RevenueError::TicketAlreadyClosed(self.id));
        }
        Ok(now.max(self.revenue_date))
    }

    /// Transitions a pending ticket to closed.
    pub fn close(&mut self, now: DateTime<Utc>) -> Result<DateTime<Utc>, RevenueError> {
        let at = self.closing_instant(now)?;
        self.closing_date = Some(at);
        Ok(at)
    }
}

/// A project and everything it owns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectRevenue {
    /// Project id.
    pub id: RevenueId,
    /// Owning user.
    pub owner: UserId,
    /// Title, unique among the owner's projects.
    pub title: String,
    /// When the project started.
    pub revenue_date: DateTime<Utc>,
    /// Opening balance.
    pub initial_revenue: InitialRevenue,
    /// Tickets, newest first.
    pub tickets: Vec<TicketRevenue>,
}

impl ProjectRevenue {
    /// Initial value plus every ticket's value, computed on each call.
    #[must_use]
    pub fn value(&self) -> Decimal {
        let tickets: Decimal = self.tickets.iter().map(TicketRevenue::value).sum();
        round_value(self.initial_revenue.value() + tickets)
    }

    /// Case-sensitive exact title match among this project's tickets.
    #[must_use]
    pub fn has_ticket(&self, title: &str) -> bool {
        self.tickets.iter().any(|t| t.title == title)
    }

    /// Looks up a ticket by id.
    #[must_use]
    pub fn ticket(&self, id: RevenueId) -> Option<&TicketRevenue> {
        self.tickets.iter().find(|t| t.id == id)
    }

    /// Initial value plus closed tickets received at or after `from`.
    #[must_use]
    pub fn balance(&self, from: Option<DateTime<Utc>>, include_closed: bool) -> Decimal {
        let closed: Decimal = if include_closed {
            self.tickets
                .iter()
                .filter(|t| t.is_closed())
                .filter(|t| from.is_none_or(|from| t.revenue_date >= from))
                .map(TicketRevenue::value)
                .sum()
        } else {
            Decimal::ZERO
        };
        round_value(self.initial_revenue.value() + closed)
    }
}

/// Any revenue a caller can look up directly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Revenue {
    /// Standalone revenue.
    General(GeneralRevenue),
    /// Project with derived value.
    Project(ProjectRevenue),
    /// Ticket of a project.
    Ticket(TicketRevenue),
}

impl Revenue {
    /// Row discriminant.
    #[must_use]
    pub const fn kind(&self) -> RevenueKind {
        match self {
            Self::General(_) => RevenueKind::General,
            Self::Project(_) => RevenueKind::Project,
            Self::Ticket(_) => RevenueKind::Ticket,
        }
    }

    /// Revenue id.
    #[must_use]
    pub const fn id(&self) -> RevenueId {
        match self {
            Self::General(r) => r.id,
            Self::Project(r) => r.id,
            Self::Ticket(r) => r.id,
        }
    }

    /// Owning user.
    #[must_use]
    pub const fn owner(&self) -> UserId {
        match self {
            Self::General(r) => r.owner,
            Self::Project(r) => r.owner,
            Self::Ticket(r) => r.owner,
        }
    }

    /// Title.
    #[must_use]
    pub fn title(&self) -> &str {
        match self {
            Self::General(r) => &r.title,
            Self::Project(r) => &r.title,
            Self::Ticket(r) => &r.title,
        }
    }

    /// Value; derived for projects.
    #[must_use]
    pub fn value(&self) -> Decimal {
        match self {
            Self::General(r) => r.value(),
            Self::Project(r) => r.value(),
            Self::Ticket(r) => r.value(),
        }
    }

    /// When the revenue was received.
    #[must_use]
    pub const fn revenue_date(&self) -> DateTime<Utc> {
        match self {
            Self::General(r) => r.revenue_date,
            Self::Project(r) => r.revenue_date,
            Self::Ticket(r) => r.revenue_date,
        }
    }

    /// Newest first, then by id so equal instants keep a stable order.
    #[must_use]
    pub fn newest_first(a: &Self, b: &Self) -> Ordering {
        b.revenue_date()
            .cmp(&a.revenue_date())
            .then_with(|| a.id().cmp(&b.id()))
    }
}

/// Command payload for creating or editing a general revenue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RevenueDraft {
    /// Title.
    pub title: String,
    /// Value in the owner's currency.
    pub value: Decimal,
    /// When the revenue was received.
    pub revenue_date: DateTime<Utc>,
    /// Free text.
    #[serde(default)]
    pub description: Option<String>,
    /// Requested labels.
    #[serde(default)]
    pub labels: Vec<LabelDraft>,
}

impl RevenueDraft {
    /// Validates the draft, rounds its value and caps its labels.
    pub fn normalize(self) -> Result<Self, RevenueError> {
        validate_title(&self.title)?;
        validate_value(self.value)?;
        validate_description(self.description.as_deref())?;
        Ok(Self {
            value: round_value(self.value),
            labels: cap_labels(self.labels)?,
            ..self
        })
    }
}

/// Command payload for creating or editing a project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectDraft {
    /// Title.
    pub title: String,
    /// Opening balance.
    pub value: Decimal,
    /// When the project started.
    pub revenue_date: DateTime<Utc>,
}

impl ProjectDraft {
    /// Validates the draft and rounds its opening value.
    pub fn normalize(self) -> Result<Self, RevenueError> {
        validate_title(&self.title)?;
        validate_value(self.value)?;
        Ok(Self {
            value: round_value(self.value),
            ..self
        })
    }
}

/// Command payload for adding or editing a ticket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TicketDraft {
    /// Title.
    pub title: String,
    /// Value.
    pub value: Decimal,
    /// When the ticket was opened.
    pub revenue_date: DateTime<Utc>,
    /// Free text.
    #[serde(default)]
    pub description: Option<String>,
}

impl TicketDraft {
    /// Validates the draft and rounds its value.
    pub fn normalize(self) -> Result<Self, RevenueError> {
        validate_title(&self.title)?;
        validate_value(self.value)?;
        validate_description(self.description.as_deref())?;
        Ok(Self {
            value: round_value(self.value),
            ..self
        })
    }
}
