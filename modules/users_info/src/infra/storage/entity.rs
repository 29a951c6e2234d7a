use chrono::{DateTime, Utc};
use modkit_db::{FieldKind, FieldMap};
use sea_orm::entity::prelude::*;

use crate::contract::{Role, User};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub email: String,
    #[sea_orm(unique)]
    pub user_name: String,
    pub password_hash: String,
    pub role: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for User {
    fn from(m: Model) -> Self {
        Self {
            id: m.id,
            email: m.email,
            user_name: m.user_name,
            role: Role::parse(&m.role),
            is_active: m.is_active,
            created_at: m.created_at,
            updated_at: m.updated_at,
        }
    }
}

/// Query keys accepted by the user list endpoint.
pub fn list_fields() -> FieldMap<Entity> {
    FieldMap::new()
        .insert("id", Column::Id, FieldKind::Uuid)
        .insert("email", Column::Email, FieldKind::String)
        .insert("user_name", Column::UserName, FieldKind::String)
        .insert("role", Column::Role, FieldKind::String)
        .insert("is_active", Column::IsActive, FieldKind::Bool)
        .insert("created_at", Column::CreatedAt, FieldKind::DateTimeUtc)
}
