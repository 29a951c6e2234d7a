use sea_orm_migration::prelude::*;

mod m20240101_000001_create_users;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![Box::new(m20240101_000001_create_users::Migration)]
    }

    // Each module keeps its own history table so migrators do not see each other's rows.
    fn migration_table_name() -> DynIden {
        Alias::new("seaql_migrations_users_info").into_iden()
    }
}
