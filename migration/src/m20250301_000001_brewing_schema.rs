use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Enable foreign keys for SQLite
        if manager.get_database_backend() == sea_orm_migration::sea_orm::DatabaseBackend::Sqlite {
            manager
                .get_connection()
                .execute_unprepared("PRAGMA foreign_keys = ON")
                .await?;
        }

        // Create brewers table
        manager
            .create_table(
                Table::create()
                    .table(Brewers::Table)
                    .if_not_exists()
                    .col(pk_auto(Brewers::Id))
                    .col(string(Brewers::Name))
                    .col(string_null(Brewers::Email))
                    .col(boolean(Brewers::IsPublic).default(true))
                    .col(big_integer(Brewers::CreatedAt))
                    .to_owned(),
            )
            .await?;

        // Create breweries table
        manager
            .create_table(
                Table::create()
                    .table(Breweries::Table)
                    .if_not_exists()
                    .col(pk_auto(Breweries::Id))
                    .col(integer(Breweries::BrewerId))
                    .col(string(Breweries::Name))
                    .col(text_null(Breweries::Description))
                    .col(date_null(Breweries::EstablishedDate))
                    .col(big_integer(Breweries::CreatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_breweries_brewer")
                            .from(Breweries::Table, Breweries::BrewerId)
                            .to(Brewers::Table, Brewers::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Create brews table
        manager
            .create_table(
                Table::create()
                    .table(Brews::Table)
                    .if_not_exists()
                    .col(pk_auto(Brews::Id))
                    .col(integer(Brews::BreweryId))
                    .col(string(Brews::Name))
                    .col(string_null(Brews::Code))
                    .col(string_null(Brews::Style))
                    .col(string_null(Brews::BjcpStyleCode))
                    .col(string_null(Brews::BjcpStyleName))
                    .col(string_null(Brews::BjcpStyle))
                    .col(text_null(Brews::Notes))
                    .col(boolean(Brews::IsPublic).default(true))
                    .col(boolean(Brews::IsDraft).default(false))
                    .col(date_null(Brews::DateBrewed))
                    .col(date_null(Brews::BottlingDate))
                    .col(date_null(Brews::Tapped))
                    .col(date_null(Brews::Finished))
                    .col(string_null(Brews::CarbonationType))
                    .col(string_null(Brews::CarbonationLevel))
                    .col(big_integer(Brews::CreatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_brews_brewery")
                            .from(Brews::Table, Brews::BreweryId)
                            .to(Breweries::Table, Breweries::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Create fermentation_steps table
        manager
            .create_table(
                Table::create()
                    .table(FermentationSteps::Table)
                    .if_not_exists()
                    .col(pk_auto(FermentationSteps::Id))
                    .col(integer(FermentationSteps::BrewId))
                    .col(date(FermentationSteps::Date))
                    .col(string_null(FermentationSteps::Name))
                    .col(double_null(FermentationSteps::Og))
                    .col(double_null(FermentationSteps::Fg))
                    .col(double_null(FermentationSteps::Volume))
                    .col(integer_null(FermentationSteps::Temperature))
                    .col(text_null(FermentationSteps::Notes))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_fermentation_steps_brew")
                            .from(FermentationSteps::Table, FermentationSteps::BrewId)
                            .to(Brews::Table, Brews::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Chain lookups are always (brew_id, date) ordered
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_fermentation_steps_brew_date")
                    .table(FermentationSteps::Table)
                    .col(FermentationSteps::BrewId)
                    .col(FermentationSteps::Date)
                    .to_owned(),
            )
            .await?;

        // Create tasting_notes table
        manager
            .create_table(
                Table::create()
                    .table(TastingNotes::Table)
                    .if_not_exists()
                    .col(pk_auto(TastingNotes::Id))
                    .col(integer(TastingNotes::BrewId))
                    .col(integer(TastingNotes::AuthorId))
                    .col(date(TastingNotes::Date))
                    .col(text(TastingNotes::Text))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_tasting_notes_brew")
                            .from(TastingNotes::Table, TastingNotes::BrewId)
                            .to(Brews::Table, Brews::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_tasting_notes_author")
                            .from(TastingNotes::Table, TastingNotes::AuthorId)
                            .to(Brewers::Table, Brewers::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_tasting_notes_brew")
                    .table(TastingNotes::Table)
                    .col(TastingNotes::BrewId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(TastingNotes::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(FermentationSteps::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Brews::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Breweries::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Brewers::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Brewers {
    Table,
    Id,
    Name,
    Email,
    IsPublic,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Breweries {
    Table,
    Id,
    BrewerId,
    Name,
    Description,
    EstablishedDate,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Brews {
    Table,
    Id,
    BreweryId,
    Name,
    Code,
    Style,
    BjcpStyleCode,
    BjcpStyleName,
    BjcpStyle,
    Notes,
    IsPublic,
    IsDraft,
    DateBrewed,
    BottlingDate,
    Tapped,
    Finished,
    CarbonationType,
    CarbonationLevel,
    CreatedAt,
}

#[derive(DeriveIden)]
enum FermentationSteps {
    Table,
    Id,
    BrewId,
    Date,
    Name,
    Og,
    Fg,
    Volume,
    Temperature,
    Notes,
}

#[derive(DeriveIden)]
enum TastingNotes {
    Table,
    Id,
    BrewId,
    AuthorId,
    Date,
    Text,
}
