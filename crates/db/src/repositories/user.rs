//! User repository for database operations.

use std::str::FromStr;

use chrono::Utc;
use neutron_shared::types::{Currency, UserId};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, PaginatorTrait,
    QueryFilter, Set, TransactionTrait, sea_query::Expr,
};
use tracing::info;

use super::label::LabelRepository;
use crate::entities::users;

/// Input for creating a user.
#[derive(Debug, Clone)]
pub struct CreateUserInput {
    /// Given name.
    pub name: String,
    /// Family name.
    pub surname: String,
    /// Email, unique.
    pub email: String,
    /// Access token presented with every request.
    pub token: String,
    /// Ledger currency.
    pub currency: Currency,
}

/// User repository for CRUD operations.
#[derive(Debug, Clone)]
pub struct UserRepository {
    db: DatabaseConnection,
}

impl UserRepository {
    /// Creates a new user repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Creates a new user.
    ///
    /// # Errors
    ///
    /// Returns an error if the database insert fails.
    pub async fn create(&self, input: CreateUserInput) -> Result<users::Model, DbErr> {
        let user = users::ActiveModel {
            id: Set(UserId::new().into_inner()),
            name: Set(input.name),
            surname: Set(input.surname),
            email: Set(input.email),
            token: Set(input.token),
            currency: Set(input.currency.name().to_string()),
            created_at: Set(Utc::now().timestamp_millis()),
        };

        user.insert(&self.db).await
    }

    /// Finds a user by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_by_id(&self, id: UserId) -> Result<Option<users::Model>, DbErr> {
        users::Entity::find_by_id(id.into_inner()).one(&self.db).await
    }

    /// Finds the user only if `token` is theirs.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn authenticate(
        &self,
        id: UserId,
        token: &str,
    ) -> Result<Option<users::Model>, DbErr> {
        users::Entity::find_by_id(id.into_inner())
            .filter(users::Column::Token.eq(token))
            .one(&self.db)
            .await
    }

    /// Checks if an email is already registered.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn email_exists(&self, email: &str) -> Result<bool, DbErr> {
        let count = users::Entity::find()
            .filter(users::Column::Email.eq(email))
            .count(&self.db)
            .await?;

        Ok(count > 0)
    }

    /// The user's ledger currency, or `None` if the user does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails or the stored code is unknown.
    pub async fn currency(&self, id: UserId) -> Result<Option<Currency>, DbErr> {
        self.find_by_id(id)
            .await?
            .map(|user| parse_currency(&user.currency))
            .transpose()
    }

    /// Persists a new ledger currency. Returns `false` if the user does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the database update fails.
    pub async fn set_currency(&self, id: UserId, currency: Currency) -> Result<bool, DbErr> {
        let result = users::Entity::update_many()
            .col_expr(users::Column::Currency, Expr::value(currency.name()))
            .filter(users::Column::Id.eq(id.into_inner()))
            .exec(&self.db)
            .await?;

        Ok(result.rows_affected > 0)
    }

    /// Deletes a user with everything they own. Returns `false` if the user
    /// does not exist.
    ///
    /// Revenues, projects, tickets and label associations cascade with the
    /// user row. Labels outlive it until nothing references them, so the
    /// ones only this user referenced are collected in the same transaction.
    ///
    /// # Errors
    ///
    /// Returns an error if any statement fails; nothing is deleted then.
    pub async fn delete(&self, id: UserId) -> Result<bool, DbErr> {
        let labels = LabelRepository::new(self.db.clone());

        let txn = self.db.begin().await?;
        let label_ids = labels.owned_label_ids(&txn, id).await?;
        let result = users::Entity::delete_by_id(id.into_inner())
            .exec(&txn)
            .await?;
        if result.rows_affected == 0 {
            return Ok(false);
        }
        let collected = labels.delete_unreferenced(&txn, &label_ids).await?;
        txn.commit().await?;

        info!(user_id = %id, labels_collected = collected, "User deleted");
        Ok(true)
    }
}

/// Reads a stored currency column.
///
/// # Errors
///
/// Returns `DbErr::Custom` for codes no [`Currency`] accepts.
pub fn parse_currency(code: &str) -> Result<Currency, DbErr> {
    Currency::from_str(code).map_err(|_| DbErr::Custom(format!("Unknown stored currency: {code}")))
}
