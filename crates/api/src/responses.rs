//! Response bodies.
//!
//! Instants are rendered as epoch milliseconds and money as 2-decimal strings.
//! A pending ticket renders `closing_date` as `-1`; an initial revenue never
//! carries a title.

use neutron_core::revenue::{
    GeneralRevenue, InitialRevenue, ProjectRevenue, Revenue, TicketRevenue,
};
use neutron_core::label::RevenueLabel;
use neutron_shared::types::{LabelId, RevenueId};
use rust_decimal::Decimal;
use serde::Serialize;

/// A label as rendered to clients.
#[derive(Debug, Clone, Serialize)]
pub struct LabelResponse {
    /// Label id.
    pub id: LabelId,
    /// Text.
    pub text: String,
    /// `#RRGGBB` color.
    pub color: String,
}

impl From<RevenueLabel> for LabelResponse {
    fn from(label: RevenueLabel) -> Self {
        Self {
            id: label.id,
            text: label.text,
            color: label.color,
        }
    }
}

/// A general revenue.
#[derive(Debug, Clone, Serialize)]
pub struct GeneralRevenueResponse {
    /// Revenue id.
    pub id: RevenueId,
    /// Title.
    pub title: String,
    /// Value.
    pub value: Decimal,
    /// Epoch millis.
    pub revenue_date: i64,
    /// Free text.
    pub description: Option<String>,
    /// Attached labels.
    pub labels: Vec<LabelResponse>,
}

impl From<GeneralRevenue> for GeneralRevenueResponse {
    fn from(revenue: GeneralRevenue) -> Self {
        Self {
            id: revenue.id,
            value: revenue.value(),
            title: revenue.title,
            revenue_date: revenue.revenue_date.timestamp_millis(),
            description: revenue.description,
            labels: revenue.labels.into_iter().map(Into::into).collect(),
        }
    }
}

/// Opening balance of a project.
#[derive(Debug, Clone, Serialize)]
pub struct InitialRevenueResponse {
    /// Revenue id.
    pub id: RevenueId,
    /// Value.
    pub value: Decimal,
    /// Epoch millis.
    pub revenue_date: i64,
}

impl From<InitialRevenue> for InitialRevenueResponse {
    fn from(initial: InitialRevenue) -> Self {
        Self {
            id: initial.id,
            value: initial.value(),
            revenue_date: initial.revenue_date.timestamp_millis(),
        }
    }
}

/// A ticket.
#[derive(Debug, Clone, Serialize)]
pub struct TicketResponse {
    /// Ticket id.
    pub id: RevenueId,
    /// Owning project.
    pub project_id: RevenueId,
    /// Title.
    pub title: String,
    /// Value.
    pub value: Decimal,
    /// Epoch millis.
    pub revenue_date: i64,
    /// Free text.
    pub description: Option<String>,
    /// Epoch millis, `-1` while pending.
    pub closing_date: i64,
}

impl From<TicketRevenue> for TicketResponse {
    fn from(ticket: TicketRevenue) -> Self {
        Self {
            id: ticket.id,
            project_id: ticket.project_id,
            value: ticket.value(),
            closing_date: ticket.closing_timestamp(),
            title: ticket.title,
            revenue_date: ticket.revenue_date.timestamp_millis(),
            description: ticket.description,
        }
    }
}

/// A project with its derived value.
#[derive(Debug, Clone, Serialize)]
pub struct ProjectResponse {
    /// Project id.
    pub id: RevenueId,
    /// Title.
    pub title: String,
    /// Initial value plus every ticket.
    pub value: Decimal,
    /// Epoch millis.
    pub revenue_date: i64,
    /// Opening balance.
    pub initial_revenue: InitialRevenueResponse,
    /// Tickets, newest first.
    pub tickets: Vec<TicketResponse>,
}

impl From<ProjectRevenue> for ProjectResponse {
    fn from(project: ProjectRevenue) -> Self {
        Self {
            id: project.id,
            value: project.value(),
            title: project.title,
            revenue_date: project.revenue_date.timestamp_millis(),
            initial_revenue: project.initial_revenue.into(),
            tickets: project.tickets.into_iter().map(Into::into).collect(),
        }
    }
}

/// Any revenue, tagged by `kind`.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RevenueResponse {
    /// Standalone revenue.
    General(GeneralRevenueResponse),
    /// Project.
    Project(ProjectResponse),
    /// Ticket.
    Ticket(TicketResponse),
}

impl From<Revenue> for RevenueResponse {
    fn from(revenue: Revenue) -> Self {
        match revenue {
            Revenue::General(r) => Self::General(r.into()),
            Revenue::Project(r) => Self::Project(r.into()),
            Revenue::Ticket(r) => Self::Ticket(r.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use neutron_shared::types::UserId;
    use rust_decimal_macros::dec;

    fn ticket(closing: Option<i64>) -> TicketRevenue {
        TicketRevenue {
            id: RevenueId::new(),
            owner: UserId::new(),
            project_id: RevenueId::new(),
            title: "Fuel".to_string(),
            value: dec!(20.00),
            revenue_date: Utc.timestamp_millis_opt(1_000).unwrap(),
            description: None,
            closing_date: closing.map(|ms| Utc.timestamp_millis_opt(ms).unwrap()),
        }
    }

    #[test]
    fn test_pending_ticket_renders_sentinel() {
        let body = serde_json::to_value(TicketResponse::from(ticket(None))).unwrap();
        assert_eq!(body["closing_date"], -1);

        let body = serde_json::to_value(TicketResponse::from(ticket(Some(5_000)))).unwrap();
        assert_eq!(body["closing_date"], 5_000);
    }

    #[test]
    fn test_initial_revenue_has_no_title() {
        let owner = UserId::new();
        let project_id = RevenueId::new();
        let at = Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap();
        let project = ProjectRevenue {
            id: project_id,
            owner,
            title: "Trip".to_string(),
            revenue_date: at,
            initial_revenue: InitialRevenue {
                id: RevenueId::new(),
                owner,
                project_id,
                value: dec!(100.00),
                revenue_date: at,
            },
            tickets: vec![ticket(None)],
        };

        let body = serde_json::to_value(RevenueResponse::from(Revenue::Project(project))).unwrap();
        assert_eq!(body["kind"], "project");
        assert_eq!(body["value"], "120.00");
        assert!(body["initial_revenue"].get("title").is_none());
    }
}
