use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Shifts::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Shifts::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Shifts::UserId).uuid().not_null())
                    .col(
                        ColumnDef::new(Shifts::Date)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Shifts::StartTime).string_len(5).not_null())
                    .col(ColumnDef::new(Shifts::EndTime).string_len(5).not_null())
                    .col(
                        ColumnDef::new(Shifts::BreakHours)
                            .string_len(5)
                            .not_null()
                            .default("00:00"),
                    )
                    .col(
                        ColumnDef::new(Shifts::BreakMins)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(ColumnDef::new(Shifts::WorkingHours).string_len(5).not_null())
                    .col(ColumnDef::new(Shifts::WorkingMins).integer().not_null())
                    .col(
                        ColumnDef::new(Shifts::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Shifts::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        // Backstop for identical concurrent inserts that both pass the overlap screen.
        manager
            .create_index(
                Index::create()
                    .name("shifts_user_slot_key")
                    .table(Shifts::Table)
                    .col(Shifts::UserId)
                    .col(Shifts::Date)
                    .col(Shifts::StartTime)
                    .col(Shifts::EndTime)
                    .unique()
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("ix_shifts_user_date")
                    .table(Shifts::Table)
                    .col(Shifts::UserId)
                    .col(Shifts::Date)
                    .if_not_exists()
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Shifts::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Shifts {
    Table,
    Id,
    UserId,
    Date,
    StartTime,
    EndTime,
    BreakHours,
    BreakMins,
    WorkingHours,
    WorkingMins,
    CreatedAt,
    UpdatedAt,
}
