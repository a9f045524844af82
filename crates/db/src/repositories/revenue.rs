//! Revenue repository: per-kind queries and single-row mutations.
//!
//! General revenues and tickets share `general_revenues`; projects and their
//! opening balances live in their own tables. Every query is scoped to the
//! owner, and listings are ordered newest first with the id as tie-break.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use neutron_core::label::RevenueLabel;
use neutron_core::period::PeriodWindow;
use neutron_core::revenue::{
    GeneralRevenue, InitialRevenue, ProjectDraft, ProjectRevenue, RevenueDraft, RevenueKind,
    TicketDraft, TicketRevenue,
};
use neutron_shared::types::{RevenueId, UserId};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, DatabaseConnection, DbErr,
    EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Select, Set,
    sea_query::{Expr, Query},
};
use uuid::Uuid;

use super::convert::{cents, from_millis, to_millis, value};
use super::label::LabelRepository;
use crate::entities::{
    general_revenues, initial_revenues, labels, project_revenues, revenue_labels,
    sea_orm_active_enums::RevenueType,
};

/// Filter shared by every listing and count.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RevenueFilter {
    /// Time window on `revenue_date`.
    pub window: PeriodWindow,
    /// Label texts; a revenue matches if any of its labels has one of them.
    /// Empty means no label restriction.
    pub labels: Vec<String>,
}

impl RevenueFilter {
    /// Filter over `window` with an optional label set.
    #[must_use]
    pub const fn new(window: PeriodWindow, labels: Vec<String>) -> Self {
        Self { window, labels }
    }

    /// True if a label restriction applies.
    #[must_use]
    pub fn has_labels(&self) -> bool {
        !self.labels.is_empty()
    }
}

/// Which ticket states a ticket listing includes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TicketFilter {
    /// Include tickets that are still open.
    pub pending: bool,
    /// Include closed tickets.
    pub closed: bool,
}

impl Default for TicketFilter {
    fn default() -> Self {
        Self {
            pending: true,
            closed: true,
        }
    }
}

impl TicketFilter {
    fn condition(self) -> Option<Condition> {
        let mut cond = Condition::any();
        if self.pending {
            cond = cond.add(general_revenues::Column::ClosingDate.is_null());
        }
        if self.closed {
            cond = cond.add(general_revenues::Column::ClosingDate.is_not_null());
        }
        (self.pending || self.closed).then_some(cond)
    }
}

/// One stored amount, as rewritten by a currency conversion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LedgerValue {
    /// Row id.
    pub id: RevenueId,
    /// General, ticket or initial.
    pub kind: RevenueKind,
    /// Stored value.
    pub value: Decimal,
}

/// Revenue repository.
#[derive(Debug, Clone)]
pub struct RevenueRepository {
    db: DatabaseConnection,
    labels: LabelRepository,
}

impl RevenueRepository {
    /// Creates a new revenue repository.
    #[must_use]
    pub fn new(db: DatabaseConnection) -> Self {
        Self {
            labels: LabelRepository::new(db.clone()),
            db,
        }
    }

    // ========================================================================
    // General revenues
    // ========================================================================

    /// Counts the owner's general revenues matching `filter`.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn count_general(
        &self,
        owner: UserId,
        filter: &RevenueFilter,
    ) -> Result<u64, DbErr> {
        general_query(owner, RevenueType::General, filter)
            .count(&self.db)
            .await
    }

    /// Lists the owner's general revenues matching `filter`, newest first.
    ///
    /// `limit = None` reads every row from `offset` on.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn get_general(
        &self,
        owner: UserId,
        filter: &RevenueFilter,
        offset: u64,
        limit: Option<u64>,
    ) -> Result<Vec<GeneralRevenue>, DbErr> {
        let query = general_query(owner, RevenueType::General, filter)
            .order_by_desc(general_revenues::Column::RevenueDate)
            .order_by_asc(general_revenues::Column::Id);
        let rows = paged(query, offset, limit).all(&self.db).await?;

        let ids: Vec<Uuid> = rows.iter().map(|r| r.id).collect();
        let mut labels = self.labels.labels_for(&self.db, &ids).await?;
        rows.into_iter()
            .map(|row| {
                let attached = labels.remove(&row.id).unwrap_or_default();
                to_general(row, attached)
            })
            .collect()
    }

    /// Loads one of the owner's general revenues with its labels.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_general<C: ConnectionTrait>(
        &self,
        conn: &C,
        owner: UserId,
        id: RevenueId,
    ) -> Result<Option<GeneralRevenue>, DbErr> {
        let Some(row) = general_revenues::Entity::find_by_id(id.into_inner())
            .filter(general_revenues::Column::OwnerId.eq(owner.into_inner()))
            .filter(general_revenues::Column::RevenueType.eq(RevenueType::General))
            .one(conn)
            .await?
        else {
            return Ok(None);
        };

        let labels = self.labels.labels_of(conn, id).await?;
        to_general(row, labels).map(Some)
    }

    /// True if the owner has another general revenue titled `title`.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn general_title_exists<C: ConnectionTrait>(
        &self,
        conn: &C,
        owner: UserId,
        title: &str,
        exclude: Option<RevenueId>,
    ) -> Result<bool, DbErr> {
        let mut query = general_revenues::Entity::find()
            .filter(general_revenues::Column::OwnerId.eq(owner.into_inner()))
            .filter(general_revenues::Column::RevenueType.eq(RevenueType::General))
            .filter(general_revenues::Column::Title.eq(title));
        if let Some(id) = exclude {
            query = query.filter(general_revenues::Column::Id.ne(id.into_inner()));
        }
        Ok(query.count(conn).await? > 0)
    }

    /// Inserts a general revenue row. Labels are attached separately.
    ///
    /// # Errors
    ///
    /// Returns an error if the database insert fails.
    pub async fn insert_general<C: ConnectionTrait>(
        &self,
        conn: &C,
        owner: UserId,
        draft: &RevenueDraft,
    ) -> Result<RevenueId, DbErr> {
        let id = RevenueId::new();
        general_revenues::ActiveModel {
            id: Set(id.into_inner()),
            owner_id: Set(owner.into_inner()),
            project_id: Set(None),
            revenue_type: Set(RevenueType::General),
            title: Set(draft.title.clone()),
            value_cents: Set(cents(draft.value)?),
            revenue_date: Set(to_millis(draft.revenue_date)),
            description: Set(draft.description.clone()),
            closing_date: Set(None),
        }
        .insert(conn)
        .await?;

        Ok(id)
    }

    /// Rewrites the scalar fields of a general revenue. Never touches id or owner.
    ///
    /// # Errors
    ///
    /// Returns an error if the database update fails.
    pub async fn update_general<C: ConnectionTrait>(
        &self,
        conn: &C,
        owner: UserId,
        id: RevenueId,
        draft: &RevenueDraft,
    ) -> Result<bool, DbErr> {
        let result = general_revenues::Entity::update_many()
            .col_expr(general_revenues::Column::Title, Expr::value(draft.title.clone()))
            .col_expr(general_revenues::Column::ValueCents, Expr::value(cents(draft.value)?))
            .col_expr(
                general_revenues::Column::RevenueDate,
                Expr::value(to_millis(draft.revenue_date)),
            )
            .col_expr(
                general_revenues::Column::Description,
                Expr::value(draft.description.clone()),
            )
            .filter(general_revenues::Column::Id.eq(id.into_inner()))
            .filter(general_revenues::Column::OwnerId.eq(owner.into_inner()))
            .filter(general_revenues::Column::RevenueType.eq(RevenueType::General))
            .exec(conn)
            .await?;

        Ok(result.rows_affected > 0)
    }

    /// Deletes a general revenue row. Its label associations go with it.
    ///
    /// # Errors
    ///
    /// Returns an error if the database delete fails.
    pub async fn delete_general<C: ConnectionTrait>(
        &self,
        conn: &C,
        owner: UserId,
        id: RevenueId,
    ) -> Result<bool, DbErr> {
        let result = general_revenues::Entity::delete_many()
            .filter(general_revenues::Column::Id.eq(id.into_inner()))
            .filter(general_revenues::Column::OwnerId.eq(owner.into_inner()))
            .filter(general_revenues::Column::RevenueType.eq(RevenueType::General))
            .exec(conn)
            .await?;

        Ok(result.rows_affected > 0)
    }

    // ========================================================================
    // Projects
    // ========================================================================

    /// Counts the owner's projects matching `filter`.
    ///
    /// Projects carry no labels, so any label filter excludes them rather
    /// than letting them through unfiltered.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn count_projects(
        &self,
        owner: UserId,
        filter: &RevenueFilter,
    ) -> Result<u64, DbErr> {
        if filter.has_labels() {
            return Ok(0);
        }
        project_query(owner, filter.window).count(&self.db).await
    }

    /// Lists the owner's projects matching `filter`, newest first, each with
    /// its opening balance and tickets.
    ///
    /// Like [`count_projects`](Self::count_projects), a label filter yields
    /// no projects: a listing restricted to labels holds only revenues that
    /// carry one of them.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn get_projects(
        &self,
        owner: UserId,
        filter: &RevenueFilter,
        offset: u64,
        limit: Option<u64>,
    ) -> Result<Vec<ProjectRevenue>, DbErr> {
        if filter.has_labels() {
            return Ok(Vec::new());
        }

        let query = project_query(owner, filter.window)
            .order_by_desc(project_revenues::Column::RevenueDate)
            .order_by_asc(project_revenues::Column::Id);
        let rows = paged(query, offset, limit).all(&self.db).await?;

        self.assemble_projects(&self.db, rows).await
    }

    /// Loads one of the owner's projects with its opening balance and tickets.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_project<C: ConnectionTrait>(
        &self,
        conn: &C,
        owner: UserId,
        id: RevenueId,
    ) -> Result<Option<ProjectRevenue>, DbErr> {
        let Some(row) = project_revenues::Entity::find_by_id(id.into_inner())
            .filter(project_revenues::Column::OwnerId.eq(owner.into_inner()))
            .one(conn)
            .await?
        else {
            return Ok(None);
        };

        Ok(self.assemble_projects(conn, vec![row]).await?.pop())
    }

    /// True if the project exists and belongs to the owner.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn project_exists<C: ConnectionTrait>(
        &self,
        conn: &C,
        owner: UserId,
        id: RevenueId,
    ) -> Result<bool, DbErr> {
        let count = project_revenues::Entity::find_by_id(id.into_inner())
            .filter(project_revenues::Column::OwnerId.eq(owner.into_inner()))
            .count(conn)
            .await?;
        Ok(count > 0)
    }

    /// True if the owner has another project titled `title`.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn project_title_exists<C: ConnectionTrait>(
        &self,
        conn: &C,
        owner: UserId,
        title: &str,
        exclude: Option<RevenueId>,
    ) -> Result<bool, DbErr> {
        let mut query = project_revenues::Entity::find()
            .filter(project_revenues::Column::OwnerId.eq(owner.into_inner()))
            .filter(project_revenues::Column::Title.eq(title));
        if let Some(id) = exclude {
            query = query.filter(project_revenues::Column::Id.ne(id.into_inner()));
        }
        Ok(query.count(conn).await? > 0)
    }

    /// Inserts a project row followed by its opening balance.
    ///
    /// Run inside a transaction so a failed second insert leaves no orphan.
    ///
    /// # Errors
    ///
    /// Returns an error if either insert fails.
    pub async fn insert_project<C: ConnectionTrait>(
        &self,
        conn: &C,
        owner: UserId,
        draft: &ProjectDraft,
    ) -> Result<RevenueId, DbErr> {
        let id = RevenueId::new();
        let revenue_date = to_millis(draft.revenue_date);

        project_revenues::ActiveModel {
            id: Set(id.into_inner()),
            owner_id: Set(owner.into_inner()),
            title: Set(draft.title.clone()),
            revenue_date: Set(revenue_date),
        }
        .insert(conn)
        .await?;

        initial_revenues::ActiveModel {
            id: Set(RevenueId::new().into_inner()),
            owner_id: Set(owner.into_inner()),
            project_id: Set(id.into_inner()),
            value_cents: Set(cents(draft.value)?),
            revenue_date: Set(revenue_date),
        }
        .insert(conn)
        .await?;

        Ok(id)
    }

    /// Rewrites a project's title and date and its opening balance.
    ///
    /// # Errors
    ///
    /// Returns an error if either update fails.
    pub async fn update_project<C: ConnectionTrait>(
        &self,
        conn: &C,
        owner: UserId,
        id: RevenueId,
        draft: &ProjectDraft,
    ) -> Result<bool, DbErr> {
        let revenue_date = to_millis(draft.revenue_date);
        let result = project_revenues::Entity::update_many()
            .col_expr(project_revenues::Column::Title, Expr::value(draft.title.clone()))
            .col_expr(project_revenues::Column::RevenueDate, Expr::value(revenue_date))
            .filter(project_revenues::Column::Id.eq(id.into_inner()))
            .filter(project_revenues::Column::OwnerId.eq(owner.into_inner()))
            .exec(conn)
            .await?;
        if result.rows_affected == 0 {
            return Ok(false);
        }

        initial_revenues::Entity::update_many()
            .col_expr(initial_revenues::Column::ValueCents, Expr::value(cents(draft.value)?))
            .col_expr(initial_revenues::Column::RevenueDate, Expr::value(revenue_date))
            .filter(initial_revenues::Column::ProjectId.eq(id.into_inner()))
            .exec(conn)
            .await?;

        Ok(true)
    }

    /// Deletes a project; its opening balance and tickets cascade.
    ///
    /// # Errors
    ///
    /// Returns an error if the database delete fails.
    pub async fn delete_project<C: ConnectionTrait>(
        &self,
        conn: &C,
        owner: UserId,
        id: RevenueId,
    ) -> Result<bool, DbErr> {
        let result = project_revenues::Entity::delete_many()
            .filter(project_revenues::Column::Id.eq(id.into_inner()))
            .filter(project_revenues::Column::OwnerId.eq(owner.into_inner()))
            .exec(conn)
            .await?;

        Ok(result.rows_affected > 0)
    }

    // ========================================================================
    // Tickets
    // ========================================================================

    /// Counts a project's tickets in `filter`'s window and `states`.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn count_tickets(
        &self,
        owner: UserId,
        project_id: RevenueId,
        filter: &RevenueFilter,
        states: TicketFilter,
    ) -> Result<u64, DbErr> {
        let Some(states) = states.condition() else {
            return Ok(0);
        };
        general_query(owner, RevenueType::Ticket, filter)
            .filter(general_revenues::Column::ProjectId.eq(project_id.into_inner()))
            .filter(states)
            .count(&self.db)
            .await
    }

    /// Lists a project's tickets in `filter`'s window and `states`, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn get_tickets(
        &self,
        owner: UserId,
        project_id: RevenueId,
        filter: &RevenueFilter,
        states: TicketFilter,
        offset: u64,
        limit: Option<u64>,
    ) -> Result<Vec<TicketRevenue>, DbErr> {
        let Some(states) = states.condition() else {
            return Ok(Vec::new());
        };
        let query = general_query(owner, RevenueType::Ticket, filter)
            .filter(general_revenues::Column::ProjectId.eq(project_id.into_inner()))
            .filter(states)
            .order_by_desc(general_revenues::Column::RevenueDate)
            .order_by_asc(general_revenues::Column::Id);
        paged(query, offset, limit)
            .all(&self.db)
            .await?
            .into_iter()
            .map(to_ticket)
            .collect()
    }

    /// Loads one of the owner's tickets, optionally pinned to a project.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_ticket<C: ConnectionTrait>(
        &self,
        conn: &C,
        owner: UserId,
        project_id: Option<RevenueId>,
        id: RevenueId,
    ) -> Result<Option<TicketRevenue>, DbErr> {
        let mut query = general_revenues::Entity::find_by_id(id.into_inner())
            .filter(general_revenues::Column::OwnerId.eq(owner.into_inner()))
            .filter(general_revenues::Column::RevenueType.eq(RevenueType::Ticket));
        if let Some(project_id) = project_id {
            query = query.filter(general_revenues::Column::ProjectId.eq(project_id.into_inner()));
        }
        query.one(conn).await?.map(to_ticket).transpose()
    }

    /// True if the project has another ticket titled exactly `title`.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn ticket_title_exists<C: ConnectionTrait>(
        &self,
        conn: &C,
        project_id: RevenueId,
        title: &str,
        exclude: Option<RevenueId>,
    ) -> Result<bool, DbErr> {
        let mut query = general_revenues::Entity::find()
            .filter(general_revenues::Column::ProjectId.eq(project_id.into_inner()))
            .filter(general_revenues::Column::RevenueType.eq(RevenueType::Ticket))
            .filter(general_revenues::Column::Title.eq(title));
        if let Some(id) = exclude {
            query = query.filter(general_revenues::Column::Id.ne(id.into_inner()));
        }
        Ok(query.count(conn).await? > 0)
    }

    /// Inserts a pending ticket into a project.
    ///
    /// # Errors
    ///
    /// Returns an error if the database insert fails.
    pub async fn insert_ticket<C: ConnectionTrait>(
        &self,
        conn: &C,
        owner: UserId,
        project_id: RevenueId,
        draft: &TicketDraft,
    ) -> Result<RevenueId, DbErr> {
        let id = RevenueId::new();
        general_revenues::ActiveModel {
            id: Set(id.into_inner()),
            owner_id: Set(owner.into_inner()),
            project_id: Set(Some(project_id.into_inner())),
            revenue_type: Set(RevenueType::Ticket),
            title: Set(draft.title.clone()),
            value_cents: Set(cents(draft.value)?),
            revenue_date: Set(to_millis(draft.revenue_date)),
            description: Set(draft.description.clone()),
            closing_date: Set(None),
        }
        .insert(conn)
        .await?;

        Ok(id)
    }

    /// Rewrites a ticket's scalar fields while it is still pending.
    ///
    /// Returns `false` if no pending ticket matched.
    ///
    /// # Errors
    ///
    /// Returns an error if the database update fails.
    pub async fn update_ticket<C: ConnectionTrait>(
        &self,
        conn: &C,
        owner: UserId,
        project_id: RevenueId,
        id: RevenueId,
        draft: &TicketDraft,
    ) -> Result<bool, DbErr> {
        let result = general_revenues::Entity::update_many()
            .col_expr(general_revenues::Column::Title, Expr::value(draft.title.clone()))
            .col_expr(general_revenues::Column::ValueCents, Expr::value(cents(draft.value)?))
            .col_expr(
                general_revenues::Column::RevenueDate,
                Expr::value(to_millis(draft.revenue_date)),
            )
            .col_expr(
                general_revenues::Column::Description,
                Expr::value(draft.description.clone()),
            )
            .filter(ticket_scope(owner, project_id, id))
            .filter(general_revenues::Column::ClosingDate.is_null())
            .exec(conn)
            .await?;

        Ok(result.rows_affected > 0)
    }

    /// Sets a pending ticket's closing date.
    ///
    /// The update only matches while `closing_date` is unset, so of two
    /// racing closes exactly one returns `true`.
    ///
    /// # Errors
    ///
    /// Returns an error if the database update fails.
    pub async fn close_ticket<C: ConnectionTrait>(
        &self,
        conn: &C,
        owner: UserId,
        project_id: RevenueId,
        id: RevenueId,
        at: DateTime<Utc>,
    ) -> Result<bool, DbErr> {
        let result = general_revenues::Entity::update_many()
            .col_expr(general_revenues::Column::ClosingDate, Expr::value(to_millis(at)))
            .filter(ticket_scope(owner, project_id, id))
            .filter(general_revenues::Column::ClosingDate.is_null())
            .exec(conn)
            .await?;

        Ok(result.rows_affected > 0)
    }

    /// Deletes a ticket in either state.
    ///
    /// # Errors
    ///
    /// Returns an error if the database delete fails.
    pub async fn delete_ticket<C: ConnectionTrait>(
        &self,
        conn: &C,
        owner: UserId,
        project_id: RevenueId,
        id: RevenueId,
    ) -> Result<bool, DbErr> {
        let result = general_revenues::Entity::delete_many()
            .filter(ticket_scope(owner, project_id, id))
            .exec(conn)
            .await?;

        Ok(result.rows_affected > 0)
    }

    // ========================================================================
    // Currency conversion
    // ========================================================================

    /// Every stored amount the owner has: general revenues, tickets and
    /// opening balances. Projects have no stored amount of their own.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn ledger_values(&self, owner: UserId) -> Result<Vec<LedgerValue>, DbErr> {
        let general = general_revenues::Entity::find()
            .filter(general_revenues::Column::OwnerId.eq(owner.into_inner()))
            .order_by_asc(general_revenues::Column::Id)
            .all(&self.db)
            .await?;
        let initial = initial_revenues::Entity::find()
            .filter(initial_revenues::Column::OwnerId.eq(owner.into_inner()))
            .order_by_asc(initial_revenues::Column::Id)
            .all(&self.db)
            .await?;

        let general = general.into_iter().map(|row| LedgerValue {
            id: RevenueId::from_uuid(row.id),
            kind: match row.revenue_type {
                RevenueType::General => RevenueKind::General,
                RevenueType::Ticket => RevenueKind::Ticket,
            },
            value: value(row.value_cents),
        });
        let initial = initial.into_iter().map(|row| LedgerValue {
            id: RevenueId::from_uuid(row.id),
            kind: RevenueKind::Initial,
            value: value(row.value_cents),
        });

        Ok(general.chain(initial).collect())
    }

    /// Overwrites one stored amount, but only while it still holds the value
    /// in `entry`. Returns false if the row changed or went away since.
    ///
    /// # Errors
    ///
    /// Returns an error if a value does not fit or the update fails.
    pub async fn set_value(&self, entry: &LedgerValue, amount: Decimal) -> Result<bool, DbErr> {
        let expected = cents(entry.value)?;
        let amount = cents(amount)?;
        let result = match entry.kind {
            RevenueKind::General | RevenueKind::Ticket => {
                general_revenues::Entity::update_many()
                    .col_expr(general_revenues::Column::ValueCents, Expr::value(amount))
                    .filter(general_revenues::Column::Id.eq(entry.id.into_inner()))
                    .filter(general_revenues::Column::ValueCents.eq(expected))
                    .exec(&self.db)
                    .await?
            }
            RevenueKind::Initial => {
                initial_revenues::Entity::update_many()
                    .col_expr(initial_revenues::Column::ValueCents, Expr::value(amount))
                    .filter(initial_revenues::Column::Id.eq(entry.id.into_inner()))
                    .filter(initial_revenues::Column::ValueCents.eq(expected))
                    .exec(&self.db)
                    .await?
            }
            RevenueKind::Project => return Ok(false),
        };

        Ok(result.rows_affected > 0)
    }

    async fn assemble_projects<C: ConnectionTrait>(
        &self,
        conn: &C,
        rows: Vec<project_revenues::Model>,
    ) -> Result<Vec<ProjectRevenue>, DbErr> {
        if rows.is_empty() {
            return Ok(Vec::new());
        }
        let ids: Vec<Uuid> = rows.iter().map(|r| r.id).collect();

        let mut initials: HashMap<Uuid, initial_revenues::Model> = initial_revenues::Entity::find()
            .filter(initial_revenues::Column::ProjectId.is_in(ids.iter().copied()))
            .all(conn)
            .await?
            .into_iter()
            .map(|row| (row.project_id, row))
            .collect();

        let mut tickets: HashMap<Uuid, Vec<TicketRevenue>> = HashMap::new();
        let ticket_rows = general_revenues::Entity::find()
            .filter(general_revenues::Column::ProjectId.is_in(ids))
            .filter(general_revenues::Column::RevenueType.eq(RevenueType::Ticket))
            .order_by_desc(general_revenues::Column::RevenueDate)
            .order_by_asc(general_revenues::Column::Id)
            .all(conn)
            .await?;
        for row in ticket_rows {
            if let Some(project_id) = row.project_id {
                tickets.entry(project_id).or_default().push(to_ticket(row)?);
            }
        }

        rows.into_iter()
            .map(|row| {
                let initial = initials.remove(&row.id).ok_or_else(|| {
                    DbErr::RecordNotFound(format!("initial revenue of project {}", row.id))
                })?;
                let tickets = tickets.remove(&row.id).unwrap_or_default();
                to_project(row, initial, tickets)
            })
            .collect()
    }
}

/// Largest row count SQLite and Postgres both accept in `LIMIT`.
const ALL_ROWS: u64 = i64::MAX.unsigned_abs();

/// Applies `offset` and `limit`. SQLite rejects `OFFSET` without `LIMIT`, so
/// an unbounded read past the first row gets an explicit one.
fn paged<Q: QuerySelect>(query: Q, offset: u64, limit: Option<u64>) -> Q {
    match limit {
        Some(limit) => query.offset(offset).limit(limit),
        None if offset == 0 => query,
        None => query.offset(offset).limit(ALL_ROWS),
    }
}

fn general_query(
    owner: UserId,
    kind: RevenueType,
    filter: &RevenueFilter,
) -> Select<general_revenues::Entity> {
    let mut query = general_revenues::Entity::find()
        .filter(general_revenues::Column::OwnerId.eq(owner.into_inner()))
        .filter(general_revenues::Column::RevenueType.eq(kind));
    if let Some(from) = filter.window.from {
        query = query.filter(general_revenues::Column::RevenueDate.gte(to_millis(from)));
    }
    if let Some(until) = filter.window.until {
        query = query.filter(general_revenues::Column::RevenueDate.lt(to_millis(until)));
    }
    if filter.has_labels() {
        let labelled = Query::select()
            .column((revenue_labels::Entity, revenue_labels::Column::RevenueId))
            .from(revenue_labels::Entity)
            .inner_join(
                labels::Entity,
                Expr::col((labels::Entity, labels::Column::Id))
                    .equals((revenue_labels::Entity, revenue_labels::Column::LabelId)),
            )
            .and_where(
                Expr::col((labels::Entity, labels::Column::Text))
                    .is_in(filter.labels.iter().cloned()),
            )
            .to_owned();
        query = query.filter(general_revenues::Column::Id.in_subquery(labelled));
    }
    query
}

fn project_query(owner: UserId, window: PeriodWindow) -> Select<project_revenues::Entity> {
    let mut query = project_revenues::Entity::find()
        .filter(project_revenues::Column::OwnerId.eq(owner.into_inner()));
    if let Some(from) = window.from {
        query = query.filter(project_revenues::Column::RevenueDate.gte(to_millis(from)));
    }
    if let Some(until) = window.until {
        query = query.filter(project_revenues::Column::RevenueDate.lt(to_millis(until)));
    }
    query
}

fn ticket_scope(owner: UserId, project_id: RevenueId, id: RevenueId) -> Condition {
    Condition::all()
        .add(general_revenues::Column::Id.eq(id.into_inner()))
        .add(general_revenues::Column::OwnerId.eq(owner.into_inner()))
        .add(general_revenues::Column::ProjectId.eq(project_id.into_inner()))
        .add(general_revenues::Column::RevenueType.eq(RevenueType::Ticket))
}

fn to_general(
    row: general_revenues::Model,
    labels: Vec<RevenueLabel>,
) -> Result<GeneralRevenue, DbErr> {
    Ok(GeneralRevenue {
        id: RevenueId::from_uuid(row.id),
        owner: UserId::from_uuid(row.owner_id),
        title: row.title,
        value: value(row.value_cents),
        revenue_date: from_millis(row.revenue_date)?,
        description: row.description,
        labels,
    })
}

fn to_ticket(row: general_revenues::Model) -> Result<TicketRevenue, DbErr> {
    let project_id = row
        .project_id
        .ok_or_else(|| DbErr::Custom(format!("Ticket {} has no project", row.id)))?;
    Ok(TicketRevenue {
        id: RevenueId::from_uuid(row.id),
        owner: UserId::from_uuid(row.owner_id),
        project_id: RevenueId::from_uuid(project_id),
        title: row.title,
        value: value(row.value_cents),
        revenue_date: from_millis(row.revenue_date)?,
        description: row.description,
        closing_date: row.closing_date.map(from_millis).transpose()?,
    })
}

fn to_project(
    row: project_revenues::Model,
    initial: initial_revenues::Model,
    tickets: Vec<TicketRevenue>,
) -> Result<ProjectRevenue, DbErr> {
    Ok(ProjectRevenue {
        id: RevenueId::from_uuid(row.id),
        owner: UserId::from_uuid(row.owner_id),
        title: row.title,
        revenue_date: from_millis(row.revenue_date)?,
        initial_revenue: InitialRevenue {
            id: RevenueId::from_uuid(initial.id),
            owner: UserId::from_uuid(initial.owner_id),
            project_id: RevenueId::from_uuid(initial.project_id),
            value: value(initial.value_cents),
            revenue_date: from_millis(initial.revenue_date)?,
        },
        tickets,
    })
}
