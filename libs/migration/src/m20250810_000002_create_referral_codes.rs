use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(ReferralCodes::Table)
                    .if_not_exists()
                    .col(big_pk_auto(ReferralCodes::Id))
                    .col(string_uniq(ReferralCodes::Code))
                    // UNIQUE enforces the one-code-per-owner invariant at the
                    // store level; concurrent creates serialize here.
                    .col(
                        ColumnDef::new(ReferralCodes::OwnerId)
                            .big_integer()
                            .not_null()
                            .unique_key(),
                    )
                    .col(timestamp_with_time_zone(ReferralCodes::ExpiresAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_referral_codes_owner_id")
                            .from(ReferralCodes::Table, ReferralCodes::OwnerId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_referral_codes_code")
                    .table(ReferralCodes::Table)
                    .col(ReferralCodes::Code)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(ReferralCodes::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum ReferralCodes {
    Table,
    Id,
    Code,
    OwnerId,
    ExpiresAt,
}

#[derive(DeriveIden)]
enum Users {
    Table,
    Id,
}
