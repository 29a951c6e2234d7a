//! SeaORM-backed implementation of the users repository port.
//!
//! Generic over `C: ConnectionTrait`, so it can be built on a
//! `DatabaseConnection` or on a transaction.

use anyhow::Context;
use async_trait::async_trait;
use modkit_db::{LimitCfg, Page, PageError, QueryBuilder, QueryParams};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, PaginatorTrait, QueryFilter,
    QuerySelect, Set,
};

use crate::contract::User;
use crate::domain::repo::UsersRepository;
use crate::infra::storage::entity::{self, ActiveModel as UserAM, Column, Entity as UserEntity};

pub struct SeaOrmUsersRepository<C>
where
    C: ConnectionTrait + Send + Sync,
{
    conn: C,
    fields: modkit_db::FieldMap<UserEntity>,
}

impl<C> SeaOrmUsersRepository<C>
where
    C: ConnectionTrait + Send + Sync,
{
    pub fn new(conn: C) -> Self {
        Self {
            conn,
            fields: entity::list_fields(),
        }
    }
}

#[async_trait]
impl<C> UsersRepository for SeaOrmUsersRepository<C>
where
    C: ConnectionTrait + Send + Sync + 'static,
{
    async fn find_by_email(&self, email: &str) -> anyhow::Result<Option<User>> {
        let found = UserEntity::find()
            .filter(Column::Email.eq(email))
            .one(&self.conn)
            .await
            .context("find_by_email failed")?;
        Ok(found.map(Into::into))
    }

    async fn email_exists(&self, email: &str) -> anyhow::Result<bool> {
        let count = UserEntity::find()
            .filter(Column::Email.eq(email))
            .count(&self.conn)
            .await
            .context("email_exists failed")?;
        Ok(count > 0)
    }

    async fn user_names_with_prefix(&self, base: &str) -> anyhow::Result<Vec<String>> {
        let names: Vec<String> = UserEntity::find()
            .select_only()
            .column(Column::UserName)
            .filter(Column::UserName.starts_with(base))
            .into_tuple()
            .all(&self.conn)
            .await
            .context("user_names_with_prefix failed")?;
        Ok(names)
    }

    async fn insert(&self, u: &User, password_hash: &str) -> anyhow::Result<()> {
        let m = UserAM {
            id: Set(u.id),
            email: Set(u.email.clone()),
            user_name: Set(u.user_name.clone()),
            password_hash: Set(password_hash.to_string()),
            role: Set(u.role.as_str().to_string()),
            is_active: Set(u.is_active),
            created_at: Set(u.created_at),
            updated_at: Set(u.updated_at),
        };
        m.insert(&self.conn).await.context("insert failed")?;
        Ok(())
    }

    async fn list_page(
        &self,
        params: &QueryParams,
        limits: LimitCfg,
    ) -> Result<Page<User>, PageError> {
        let page = QueryBuilder::new(&self.fields, params)
            .filter()?
            .sort()?
            .paginate(limits)?
            .page(&self.conn)
            .await?;
        Ok(page.map(Into::into))
    }
}
