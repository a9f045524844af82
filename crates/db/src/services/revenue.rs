//! Revenue service: validation, title uniqueness, transactions and label
//! bookkeeping around the revenue repository.
//!
//! Writes to one revenue (or to the tickets of one project) are serialized
//! through a per-id lock. Writes that store an amount also hold the owner's
//! ledger gate shared, so they never interleave with a currency conversion
//! that holds it exclusively. Label detach and garbage collection run in
//! their own transaction after the new associations are committed.

use std::sync::Arc;

use neutron_core::Clock;
use neutron_core::label::{RevenueLabel, removed_labels};
use neutron_core::period::RevenuePeriod;
use neutron_core::revenue::{
    GeneralRevenue, ProjectDraft, ProjectRevenue, Revenue, RevenueDraft, RevenueError,
    TicketDraft, TicketRevenue,
};
use neutron_shared::types::{PageRequest, PageResponse, RevenueId, UserId};
use rust_decimal::Decimal;
use sea_orm::{DatabaseConnection, TransactionTrait};
use tracing::{debug, info};

use super::error::ServiceError;
use super::locks::KeyedLocks;
use crate::repositories::{LabelRepository, RevenueFilter, RevenueRepository, TicketFilter};

/// Parameters of the merged revenue listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RevenueQuery {
    /// Window counted back from now.
    pub period: RevenuePeriod,
    /// Label texts to match; empty for no restriction.
    pub labels: Vec<String>,
    /// Include general revenues.
    pub general: bool,
    /// Include projects.
    pub projects: bool,
}

impl Default for RevenueQuery {
    fn default() -> Self {
        Self {
            period: RevenuePeriod::default(),
            labels: Vec::new(),
            general: true,
            projects: true,
        }
    }
}

impl RevenueQuery {
    /// Both kinds over `period`, no label restriction.
    #[must_use]
    pub fn new(period: RevenuePeriod) -> Self {
        Self {
            period,
            ..Self::default()
        }
    }

    /// Restricts the listing to revenues carrying any of `labels`.
    #[must_use]
    pub fn with_labels(mut self, labels: Vec<String>) -> Self {
        self.labels = labels;
        self
    }
}

/// Revenue ledger operations.
#[derive(Debug, Clone)]
pub struct RevenueService {
    db: DatabaseConnection,
    revenues: RevenueRepository,
    labels: LabelRepository,
    clock: Arc<dyn Clock>,
    locks: Arc<KeyedLocks<RevenueId>>,
    gate: Arc<KeyedLocks<UserId>>,
}

impl RevenueService {
    /// Creates a new revenue service.
    #[must_use]
    pub fn new(db: DatabaseConnection, clock: Arc<dyn Clock>) -> Self {
        Self {
            revenues: RevenueRepository::new(db.clone()),
            labels: LabelRepository::new(db.clone()),
            db,
            clock,
            locks: Arc::new(KeyedLocks::new()),
            gate: Arc::new(KeyedLocks::new()),
        }
    }

    /// Shares the per-user ledger gate with a [`CurrencyService`], so
    /// amounts written here wait for that user's running conversion.
    ///
    /// [`CurrencyService`]: super::CurrencyService
    #[must_use]
    pub fn with_ledger_gate(mut self, gate: Arc<KeyedLocks<UserId>>) -> Self {
        self.gate = gate;
        self
    }

    // ========================================================================
    // Queries
    // ========================================================================

    /// Merged page of general revenues and projects, newest first.
    ///
    /// Each kind is counted and read on its own; the page is cut from the
    /// merged, re-sorted rows and the total is the sum of both counts.
    pub async fn get_revenues(
        &self,
        owner: UserId,
        query: &RevenueQuery,
        page: PageRequest,
    ) -> Result<PageResponse<Revenue>, ServiceError> {
        let filter = RevenueFilter::new(
            query.period.current_window(self.clock.now()),
            query.labels.clone(),
        );
        let window = Some(page.merged_window());

        let mut total = 0;
        let mut merged = Vec::new();
        if query.general {
            total += self.revenues.count_general(owner, &filter).await?;
            let general = self.revenues.get_general(owner, &filter, 0, window).await?;
            merged.extend(general.into_iter().map(Revenue::General));
        }
        if query.projects {
            total += self.revenues.count_projects(owner, &filter).await?;
            let projects = self.revenues.get_projects(owner, &filter, 0, window).await?;
            merged.extend(projects.into_iter().map(Revenue::Project));
        }
        merged.sort_by(Revenue::newest_first);

        let data = merged
            .into_iter()
            .skip(usize::try_from(page.offset()).unwrap_or(usize::MAX))
            .take(usize::try_from(page.limit()).unwrap_or(usize::MAX))
            .collect();

        Ok(PageResponse::new(data, page, total))
    }

    /// Resolves an id to a general revenue, a project or a ticket.
    pub async fn get_revenue(&self, owner: UserId, id: RevenueId) -> Result<Revenue, ServiceError> {
        if let Some(general) = self.revenues.find_general(&self.db, owner, id).await? {
            return Ok(Revenue::General(general));
        }
        if let Some(project) = self.revenues.find_project(&self.db, owner, id).await? {
            return Ok(Revenue::Project(project));
        }
        if let Some(ticket) = self.revenues.find_ticket(&self.db, owner, None, id).await? {
            return Ok(Revenue::Ticket(ticket));
        }
        Err(RevenueError::NotFound(id).into())
    }

    /// Labels used by any of the owner's revenues.
    pub async fn get_user_labels(&self, owner: UserId) -> Result<Vec<RevenueLabel>, ServiceError> {
        Ok(self.labels.user_labels(owner).await?)
    }

    // ========================================================================
    // General revenues
    // ========================================================================

    /// Creates a general revenue with its labels in one transaction.
    pub async fn add_revenue(
        &self,
        owner: UserId,
        draft: RevenueDraft,
    ) -> Result<GeneralRevenue, ServiceError> {
        let draft = draft.normalize()?;
        let _ledger = self.gate.share(owner).await;

        let txn = self.db.begin().await?;
        if self
            .revenues
            .general_title_exists(&txn, owner, &draft.title, None)
            .await?
        {
            return Err(RevenueError::DuplicateTitle(draft.title).into());
        }
        let id = self.revenues.insert_general(&txn, owner, &draft).await?;
        let labels = self.labels.ensure_labels(&txn, &draft.labels).await?;
        self.labels.attach(&txn, id, &labels).await?;
        txn.commit().await?;

        info!(user_id = %owner, revenue_id = %id, labels = labels.len(), "Revenue created");
        self.require_general(owner, id).await
    }

    /// Replaces a general revenue's fields and label set.
    ///
    /// Labels dropped by the edit are detached, and deleted if unreferenced,
    /// only after the new set has been committed.
    pub async fn edit_revenue(
        &self,
        owner: UserId,
        id: RevenueId,
        draft: RevenueDraft,
    ) -> Result<GeneralRevenue, ServiceError> {
        let _guard = self.locks.lock(id).await;
        let draft = draft.normalize()?;
        let _ledger = self.gate.share(owner).await;
        let current = self.require_general(owner, id).await?;

        let txn = self.db.begin().await?;
        if self
            .revenues
            .general_title_exists(&txn, owner, &draft.title, Some(id))
            .await?
        {
            return Err(RevenueError::DuplicateTitle(draft.title).into());
        }
        if !self.revenues.update_general(&txn, owner, id, &draft).await? {
            return Err(RevenueError::NotFound(id).into());
        }
        let labels = self.labels.ensure_labels(&txn, &draft.labels).await?;
        self.labels.attach(&txn, id, &labels).await?;
        txn.commit().await?;

        let removed = removed_labels(&current.labels, &labels);
        if !removed.is_empty() {
            let txn = self.db.begin().await?;
            let deleted = self
                .labels
                .detach_and_maybe_delete(&txn, id, &removed)
                .await?;
            txn.commit().await?;
            debug!(revenue_id = %id, detached = removed.len(), deleted, "Labels detached");
        }

        info!(user_id = %owner, revenue_id = %id, "Revenue updated");
        self.require_general(owner, id).await
    }

    /// Deletes a general revenue or a project, whichever `id` names.
    ///
    /// A general revenue's labels are detached and collected before the row
    /// goes; a project's opening balance and tickets cascade.
    pub async fn delete_revenue(&self, owner: UserId, id: RevenueId) -> Result<(), ServiceError> {
        let _guard = self.locks.lock(id).await;

        if let Some(general) = self.revenues.find_general(&self.db, owner, id).await? {
            let txn = self.db.begin().await?;
            self.labels
                .detach_and_maybe_delete(&txn, id, &general.labels)
                .await?;
            self.revenues.delete_general(&txn, owner, id).await?;
            txn.commit().await?;
        } else if !self.revenues.delete_project(&self.db, owner, id).await? {
            return Err(RevenueError::NotFound(id).into());
        }

        info!(user_id = %owner, revenue_id = %id, "Revenue deleted");
        Ok(())
    }

    // ========================================================================
    // Projects
    // ========================================================================

    /// Creates a project and its opening balance in one transaction.
    pub async fn add_project(
        &self,
        owner: UserId,
        draft: ProjectDraft,
    ) -> Result<ProjectRevenue, ServiceError> {
        let draft = draft.normalize()?;
        let _ledger = self.gate.share(owner).await;

        let txn = self.db.begin().await?;
        if self
            .revenues
            .project_title_exists(&txn, owner, &draft.title, None)
            .await?
        {
            return Err(RevenueError::DuplicateTitle(draft.title).into());
        }
        let id = self.revenues.insert_project(&txn, owner, &draft).await?;
        txn.commit().await?;

        info!(user_id = %owner, project_id = %id, "Project created");
        self.require_project(owner, id).await
    }

    /// Updates a project's title and date and its opening balance.
    pub async fn edit_project(
        &self,
        owner: UserId,
        id: RevenueId,
        draft: ProjectDraft,
    ) -> Result<ProjectRevenue, ServiceError> {
        let _guard = self.locks.lock(id).await;
        let draft = draft.normalize()?;
        let _ledger = self.gate.share(owner).await;

        let txn = self.db.begin().await?;
        if self
            .revenues
            .project_title_exists(&txn, owner, &draft.title, Some(id))
            .await?
        {
            return Err(RevenueError::DuplicateTitle(draft.title).into());
        }
        if !self.revenues.update_project(&txn, owner, id, &draft).await? {
            return Err(RevenueError::NotFound(id).into());
        }
        txn.commit().await?;

        info!(user_id = %owner, project_id = %id, "Project updated");
        self.require_project(owner, id).await
    }

    /// Deletes a project with its opening balance and tickets.
    pub async fn delete_project(&self, owner: UserId, id: RevenueId) -> Result<(), ServiceError> {
        let _guard = self.locks.lock(id).await;
        if !self.revenues.delete_project(&self.db, owner, id).await? {
            return Err(RevenueError::NotFound(id).into());
        }

        info!(user_id = %owner, project_id = %id, "Project deleted");
        Ok(())
    }

    /// Opening balance plus, if requested, closed tickets received within
    /// the period. Pending tickets never count.
    pub async fn get_project_balance(
        &self,
        owner: UserId,
        project_id: RevenueId,
        period: RevenuePeriod,
        include_closed_tickets: bool,
    ) -> Result<Decimal, ServiceError> {
        let project = self.require_project(owner, project_id).await?;
        let from = period.from_date(self.clock.now(), 1)?;
        Ok(project.balance(from, include_closed_tickets))
    }

    // ========================================================================
    // Tickets
    // ========================================================================

    /// Page of a project's tickets in the period, newest first.
    pub async fn get_tickets(
        &self,
        owner: UserId,
        project_id: RevenueId,
        period: RevenuePeriod,
        states: TicketFilter,
        page: PageRequest,
    ) -> Result<PageResponse<TicketRevenue>, ServiceError> {
        if !self
            .revenues
            .project_exists(&self.db, owner, project_id)
            .await?
        {
            return Err(RevenueError::NotFound(project_id).into());
        }

        let filter = RevenueFilter::new(period.current_window(self.clock.now()), Vec::new());
        let total = self
            .revenues
            .count_tickets(owner, project_id, &filter, states)
            .await?;
        let tickets = self
            .revenues
            .get_tickets(
                owner,
                project_id,
                &filter,
                states,
                page.offset(),
                Some(page.limit()),
            )
            .await?;

        Ok(PageResponse::new(tickets, page, total))
    }

    /// Adds a pending ticket. Titles are unique within the project,
    /// compared case-sensitively.
    pub async fn add_ticket(
        &self,
        owner: UserId,
        project_id: RevenueId,
        draft: TicketDraft,
    ) -> Result<TicketRevenue, ServiceError> {
        let _guard = self.locks.lock(project_id).await;
        let draft = draft.normalize()?;
        let _ledger = self.gate.share(owner).await;

        let project = self.require_project(owner, project_id).await?;
        if project.has_ticket(&draft.title) {
            return Err(RevenueError::DuplicateTitle(draft.title).into());
        }
        let id = self
            .revenues
            .insert_ticket(&self.db, owner, project_id, &draft)
            .await?;

        info!(user_id = %owner, project_id = %project_id, ticket_id = %id, "Ticket added");
        self.require_ticket(owner, project_id, id).await
    }

    /// Edits a ticket that is still pending.
    pub async fn edit_ticket(
        &self,
        owner: UserId,
        project_id: RevenueId,
        ticket_id: RevenueId,
        draft: TicketDraft,
    ) -> Result<TicketRevenue, ServiceError> {
        let _guard = self.locks.lock(project_id).await;
        let draft = draft.normalize()?;
        let _ledger = self.gate.share(owner).await;

        let ticket = self.require_ticket(owner, project_id, ticket_id).await?;
        if ticket.is_closed() {
            return Err(RevenueError::TicketAlreadyClosed(ticket_id).into());
        }
        if self
            .revenues
            .ticket_title_exists(&self.db, project_id, &draft.title, Some(ticket_id))
            .await?
        {
            return Err(RevenueError::DuplicateTitle(draft.title).into());
        }
        if !self
            .revenues
            .update_ticket(&self.db, owner, project_id, ticket_id, &draft)
            .await?
        {
            return Err(RevenueError::TicketAlreadyClosed(ticket_id).into());
        }

        info!(user_id = %owner, ticket_id = %ticket_id, "Ticket updated");
        self.require_ticket(owner, project_id, ticket_id).await
    }

    /// Closes a pending ticket at `max(now, revenue_date)`.
    ///
    /// A second close is rejected, including one that races the first.
    pub async fn close_ticket(
        &self,
        owner: UserId,
        project_id: RevenueId,
        ticket_id: RevenueId,
    ) -> Result<TicketRevenue, ServiceError> {
        let _guard = self.locks.lock(project_id).await;

        let ticket = self.require_ticket(owner, project_id, ticket_id).await?;
        let at = ticket.closing_instant(self.clock.now())?;
        if !self
            .revenues
            .close_ticket(&self.db, owner, project_id, ticket_id, at)
            .await?
        {
            return Err(RevenueError::TicketAlreadyClosed(ticket_id).into());
        }

        info!(user_id = %owner, ticket_id = %ticket_id, closed_at = %at, "Ticket closed");
        self.require_ticket(owner, project_id, ticket_id).await
    }

    /// Deletes a ticket in either state.
    pub async fn delete_ticket(
        &self,
        owner: UserId,
        project_id: RevenueId,
        ticket_id: RevenueId,
    ) -> Result<(), ServiceError> {
        let _guard = self.locks.lock(project_id).await;
        if !self
            .revenues
            .delete_ticket(&self.db, owner, project_id, ticket_id)
            .await?
        {
            return Err(RevenueError::NotFound(ticket_id).into());
        }

        info!(user_id = %owner, ticket_id = %ticket_id, "Ticket deleted");
        Ok(())
    }

    async fn require_general(
        &self,
        owner: UserId,
        id: RevenueId,
    ) -> Result<GeneralRevenue, ServiceError> {
        self.revenues
            .find_general(&self.db, owner, id)
            .await?
            .ok_or_else(|| RevenueError::NotFound(id).into())
    }

    async fn require_project(
        &self,
        owner: UserId,
        id: RevenueId,
    ) -> Result<ProjectRevenue, ServiceError> {
        self.revenues
            .find_project(&self.db, owner, id)
            .await?
            .ok_or_else(|| RevenueError::NotFound(id).into())
    }

    async fn require_ticket(
        &self,
        owner: UserId,
        project_id: RevenueId,
        id: RevenueId,
    ) -> Result<TicketRevenue, ServiceError> {
        self.revenues
            .find_ticket(&self.db, owner, Some(project_id), id)
            .await?
            .ok_or_else(|| RevenueError::NotFound(id).into())
    }
}
