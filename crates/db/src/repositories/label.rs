//! Label registry: shared `(text, color)` rows and their revenue associations.
//!
//! Every method that takes a `conn` runs on whatever connection or
//! transaction the caller hands in, so the revenue service can group label
//! work with the revenue write it belongs to.

use std::collections::HashMap;

use neutron_core::label::{LabelDraft, RevenueLabel};
use neutron_shared::types::{LabelId, RevenueId, UserId};
use sea_orm::{
    ColumnTrait, Condition, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, RelationTrait, Set,
    sea_query::{OnConflict, Query, SelectStatement},
};
use tracing::debug;
use uuid::Uuid;

use crate::entities::{general_revenues, labels, revenue_labels};

/// Label repository.
#[derive(Debug, Clone)]
pub struct LabelRepository {
    db: DatabaseConnection,
}

impl LabelRepository {
    /// Creates a new label repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Inserts any missing labels in one statement and returns the stored rows,
    /// in the order of `drafts`.
    ///
    /// Labels that already exist, including ones inserted concurrently by
    /// another request, resolve to the existing row.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub async fn ensure_labels<C: ConnectionTrait>(
        &self,
        conn: &C,
        drafts: &[LabelDraft],
    ) -> Result<Vec<RevenueLabel>, DbErr> {
        if drafts.is_empty() {
            return Ok(Vec::new());
        }

        let rows = drafts.iter().map(|draft| labels::ActiveModel {
            id: Set(LabelId::new().into_inner()),
            text: Set(draft.text.clone()),
            color: Set(draft.color.clone()),
        });
        let inserted = labels::Entity::insert_many(rows)
            .on_conflict(
                OnConflict::columns([labels::Column::Text, labels::Column::Color])
                    .do_nothing()
                    .to_owned(),
            )
            .exec_without_returning(conn)
            .await?;
        debug!(requested = drafts.len(), inserted, "Labels ensured");

        let identity = drafts.iter().fold(Condition::any(), |cond, draft| {
            cond.add(
                Condition::all()
                    .add(labels::Column::Text.eq(draft.text.as_str()))
                    .add(labels::Column::Color.eq(draft.color.as_str())),
            )
        });
        let stored = labels::Entity::find().filter(identity).all(conn).await?;

        drafts
            .iter()
            .map(|draft| {
                stored
                    .iter()
                    .find(|row| row.text == draft.text && row.color == draft.color)
                    .map(|row| to_label(row.clone()))
                    .ok_or_else(|| {
                        DbErr::RecordNotFound(format!("label {} {}", draft.text, draft.color))
                    })
            })
            .collect()
    }

    /// Associates `labels` with a revenue. Existing associations are left as is.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub async fn attach<C: ConnectionTrait>(
        &self,
        conn: &C,
        revenue_id: RevenueId,
        labels: &[RevenueLabel],
    ) -> Result<(), DbErr> {
        if labels.is_empty() {
            return Ok(());
        }

        let rows = labels.iter().map(|label| revenue_labels::ActiveModel {
            revenue_id: Set(revenue_id.into_inner()),
            label_id: Set(label.id.into_inner()),
        });
        revenue_labels::Entity::insert_many(rows)
            .on_conflict(
                OnConflict::columns([
                    revenue_labels::Column::RevenueId,
                    revenue_labels::Column::LabelId,
                ])
                .do_nothing()
                .to_owned(),
            )
            .exec_without_returning(conn)
            .await?;

        Ok(())
    }

    /// Removes the given associations, then deletes every removed label no
    /// other revenue still references. Returns how many labels were deleted.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub async fn detach_and_maybe_delete<C: ConnectionTrait>(
        &self,
        conn: &C,
        revenue_id: RevenueId,
        removed: &[RevenueLabel],
    ) -> Result<u64, DbErr> {
        if removed.is_empty() {
            return Ok(0);
        }

        let ids: Vec<Uuid> = removed.iter().map(|l| l.id.into_inner()).collect();
        revenue_labels::Entity::delete_many()
            .filter(revenue_labels::Column::RevenueId.eq(revenue_id.into_inner()))
            .filter(revenue_labels::Column::LabelId.is_in(ids.iter().copied()))
            .exec(conn)
            .await?;

        self.delete_unreferenced(conn, &ids).await
    }

    /// Deletes those of `label_ids` that no revenue references. Returns how
    /// many went.
    ///
    /// The reference check and the delete are one statement, so a label
    /// attached by a concurrent writer is never taken. Associations restrict
    /// label deletion, so a lost race fails instead of dropping one.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub async fn delete_unreferenced<C: ConnectionTrait>(
        &self,
        conn: &C,
        label_ids: &[Uuid],
    ) -> Result<u64, DbErr> {
        if label_ids.is_empty() {
            return Ok(0);
        }

        let referenced = Query::select()
            .column(revenue_labels::Column::LabelId)
            .from(revenue_labels::Entity)
            .and_where(revenue_labels::Column::LabelId.is_in(label_ids.iter().copied()))
            .to_owned();
        let result = labels::Entity::delete_many()
            .filter(labels::Column::Id.is_in(label_ids.iter().copied()))
            .filter(labels::Column::Id.not_in_subquery(referenced))
            .exec(conn)
            .await?;

        if result.rows_affected > 0 {
            debug!(
                candidates = label_ids.len(),
                deleted = result.rows_affected,
                "Unreferenced labels deleted"
            );
        }
        Ok(result.rows_affected)
    }

    /// Ids of every label attached to one of the owner's revenues.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn owned_label_ids<C: ConnectionTrait>(
        &self,
        conn: &C,
        owner: UserId,
    ) -> Result<Vec<Uuid>, DbErr> {
        revenue_labels::Entity::find()
            .select_only()
            .column(revenue_labels::Column::LabelId)
            .distinct()
            .filter(revenue_labels::Column::RevenueId.in_subquery(owned_revenues(owner)))
            .into_tuple()
            .all(conn)
            .await
    }

    /// Number of revenues referencing a label.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn count_references<C: ConnectionTrait>(
        &self,
        conn: &C,
        label_id: LabelId,
    ) -> Result<u64, DbErr> {
        revenue_labels::Entity::find()
            .filter(revenue_labels::Column::LabelId.eq(label_id.into_inner()))
            .count(conn)
            .await
    }

    /// Labels attached to one revenue, ordered by text.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn labels_of<C: ConnectionTrait>(
        &self,
        conn: &C,
        revenue_id: RevenueId,
    ) -> Result<Vec<RevenueLabel>, DbErr> {
        let rows = labels::Entity::find()
            .join(
                sea_orm::JoinType::InnerJoin,
                labels::Relation::RevenueLabels.def(),
            )
            .filter(revenue_labels::Column::RevenueId.eq(revenue_id.into_inner()))
            .order_by_asc(labels::Column::Text)
            .order_by_asc(labels::Column::Color)
            .all(conn)
            .await?;

        Ok(rows.into_iter().map(to_label).collect())
    }

    /// Labels of several revenues at once, keyed by revenue id.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn labels_for<C: ConnectionTrait>(
        &self,
        conn: &C,
        revenue_ids: &[Uuid],
    ) -> Result<HashMap<Uuid, Vec<RevenueLabel>>, DbErr> {
        if revenue_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let rows = revenue_labels::Entity::find()
            .filter(revenue_labels::Column::RevenueId.is_in(revenue_ids.iter().copied()))
            .find_also_related(labels::Entity)
            .all(conn)
            .await?;

        let mut by_revenue: HashMap<Uuid, Vec<RevenueLabel>> = HashMap::new();
        for (association, label) in rows {
            if let Some(label) = label {
                by_revenue
                    .entry(association.revenue_id)
                    .or_default()
                    .push(to_label(label));
            }
        }
        for labels in by_revenue.values_mut() {
            labels.sort_by(|a, b| a.text.cmp(&b.text).then_with(|| a.color.cmp(&b.color)));
        }

        Ok(by_revenue)
    }

    /// Distinct labels attached to any of the owner's revenues, ordered by text.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn user_labels(&self, owner: UserId) -> Result<Vec<RevenueLabel>, DbErr> {
        let owned = Query::select()
            .column(revenue_labels::Column::LabelId)
            .from(revenue_labels::Entity)
            .and_where(revenue_labels::Column::RevenueId.in_subquery(owned_revenues(owner)))
            .to_owned();

        let rows = labels::Entity::find()
            .filter(labels::Column::Id.in_subquery(owned))
            .order_by_asc(labels::Column::Text)
            .order_by_asc(labels::Column::Color)
            .all(&self.db)
            .await?;

        Ok(rows.into_iter().map(to_label).collect())
    }
}

fn owned_revenues(owner: UserId) -> SelectStatement {
    Query::select()
        .column(general_revenues::Column::Id)
        .from(general_revenues::Entity)
        .and_where(general_revenues::Column::OwnerId.eq(owner.into_inner()))
        .to_owned()
}

fn to_label(row: labels::Model) -> RevenueLabel {
    RevenueLabel {
        id: LabelId::from_uuid(row.id),
        text: row.text,
        color: row.color,
    }
}
