//! `SeaORM` entity definitions.
//!
//! Money columns hold integer cents; instant columns hold epoch milliseconds.

pub mod general_revenues;
pub mod initial_revenues;
pub mod labels;
pub mod project_revenues;
pub mod revenue_labels;
pub mod sea_orm_active_enums;
pub mod users;

pub mod prelude {
    //! Entity re-exports.
    pub use super::general_revenues::Entity as GeneralRevenues;
    pub use super::initial_revenues::Entity as InitialRevenues;
    pub use super::labels::Entity as Labels;
    pub use super::project_revenues::Entity as ProjectRevenues;
    pub use super::revenue_labels::Entity as RevenueLabels;
    pub use super::users::Entity as Users;
}
