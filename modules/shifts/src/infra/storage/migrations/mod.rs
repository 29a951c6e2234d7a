use sea_orm_migration::prelude::*;

mod m20240101_000001_create_shifts;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![Box::new(m20240101_000001_create_shifts::Migration)]
    }

    fn migration_table_name() -> DynIden {
        Alias::new("seaql_migrations_shifts").into_iden()
    }
}
