//! Allow-list entity for SeaORM.

use sea_orm::Set;
use sea_orm::entity::prelude::*;

use folio_core::domain::AllowedEmail;

use super::profile::DbRole;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "allowed_emails")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub email: String,
    pub role: DbRole,
    /// Weak reference to `profiles.id`.
    pub invited_by: Option<Uuid>,
    pub is_login_allowed: bool,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for AllowedEmail {
    fn from(model: Model) -> Self {
        Self {
            email: model.email,
            role: model.role.into(),
            invited_by: model.invited_by,
            is_login_allowed: model.is_login_allowed,
            created_at: model.created_at.into(),
            updated_at: model.updated_at.into(),
        }
    }
}

impl From<AllowedEmail> for ActiveModel {
    fn from(entry: AllowedEmail) -> Self {
        Self {
            email: Set(entry.email),
            role: Set(entry.role.into()),
            invited_by: Set(entry.invited_by),
            is_login_allowed: Set(entry.is_login_allowed),
            created_at: Set(entry.created_at.into()),
            updated_at: Set(entry.updated_at.into()),
        }
    }
}
