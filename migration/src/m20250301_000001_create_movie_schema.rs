use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Movies::Table)
                    .if_not_exists()
                    .col(string(Movies::Mid).primary_key())
                    .col(string_null(Movies::TitleType))
                    .col(string_null(Movies::PrimaryTitle))
                    .col(string_null(Movies::OriginalTitle))
                    .col(integer_null(Movies::IsAdult))
                    .col(integer_null(Movies::StartYear))
                    .col(integer_null(Movies::EndYear))
                    .col(integer_null(Movies::RuntimeMinutes))
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Persons::Table)
                    .if_not_exists()
                    .col(string(Persons::Pid).primary_key())
                    .col(string_null(Persons::Name))
                    .col(integer_null(Persons::BirthYear))
                    .col(integer_null(Persons::DeathYear))
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Genres::Table)
                    .if_not_exists()
                    .col(string(Genres::Mid))
                    .col(string(Genres::Genre))
                    .primary_key(Index::create().col(Genres::Mid).col(Genres::Genre))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_genres_mid")
                            .from(Genres::Table, Genres::Mid)
                            .to(Movies::Table, Movies::Mid),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Ratings::Table)
                    .if_not_exists()
                    .col(string(Ratings::Mid).primary_key())
                    .col(double_null(Ratings::AverageRating))
                    .col(big_integer_null(Ratings::NumVotes))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_ratings_mid")
                            .from(Ratings::Table, Ratings::Mid)
                            .to(Movies::Table, Movies::Mid),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Principals::Table)
                    .if_not_exists()
                    .col(string(Principals::Mid))
                    .col(string(Principals::Pid))
                    .col(integer_null(Principals::Ordering))
                    .col(string_null(Principals::Category))
                    .col(string_null(Principals::Job))
                    .primary_key(Index::create().col(Principals::Mid).col(Principals::Pid))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_principals_mid")
                            .from(Principals::Table, Principals::Mid)
                            .to(Movies::Table, Movies::Mid),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_principals_pid")
                            .from(Principals::Table, Principals::Pid)
                            .to(Persons::Table, Persons::Pid),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(KnownForMovies::Table)
                    .if_not_exists()
                    .col(string(KnownForMovies::Pid))
                    .col(string(KnownForMovies::Mid))
                    .primary_key(Index::create().col(KnownForMovies::Pid).col(KnownForMovies::Mid))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_known_for_movies_pid")
                            .from(KnownForMovies::Table, KnownForMovies::Pid)
                            .to(Persons::Table, Persons::Pid),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_known_for_movies_mid")
                            .from(KnownForMovies::Table, KnownForMovies::Mid)
                            .to(Movies::Table, Movies::Mid),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Professions::Table)
                    .if_not_exists()
                    .col(string(Professions::Pid))
                    .col(string(Professions::Profession))
                    .primary_key(Index::create().col(Professions::Pid).col(Professions::Profession))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_professions_pid")
                            .from(Professions::Table, Professions::Pid)
                            .to(Persons::Table, Persons::Pid),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Writers::Table)
                    .if_not_exists()
                    .col(string(Writers::Mid))
                    .col(string(Writers::Pid))
                    .primary_key(Index::create().col(Writers::Mid).col(Writers::Pid))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_writers_mid")
                            .from(Writers::Table, Writers::Mid)
                            .to(Movies::Table, Movies::Mid),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_writers_pid")
                            .from(Writers::Table, Writers::Pid)
                            .to(Persons::Table, Persons::Pid),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Directors::Table)
                    .if_not_exists()
                    .col(string(Directors::Mid))
                    .col(string(Directors::Pid))
                    .primary_key(Index::create().col(Directors::Mid).col(Directors::Pid))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_directors_mid")
                            .from(Directors::Table, Directors::Mid)
                            .to(Movies::Table, Movies::Mid),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_directors_pid")
                            .from(Directors::Table, Directors::Pid)
                            .to(Persons::Table, Persons::Pid),
                    )
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Directors::Table).to_owned()).await?;
        manager.drop_table(Table::drop().table(Writers::Table).to_owned()).await?;
        manager.drop_table(Table::drop().table(Professions::Table).to_owned()).await?;
        manager.drop_table(Table::drop().table(KnownForMovies::Table).to_owned()).await?;
        manager.drop_table(Table::drop().table(Principals::Table).to_owned()).await?;
        manager.drop_table(Table::drop().table(Ratings::Table).to_owned()).await?;
        manager.drop_table(Table::drop().table(Genres::Table).to_owned()).await?;
        manager.drop_table(Table::drop().table(Persons::Table).to_owned()).await?;
        manager.drop_table(Table::drop().table(Movies::Table).to_owned()).await?;
        Ok(())
    }
}

#[derive(DeriveIden)]
enum Movies {
    Table,
    Mid,
    TitleType,
    PrimaryTitle,
    OriginalTitle,
    IsAdult,
    StartYear,
    EndYear,
    RuntimeMinutes,
}

#[derive(DeriveIden)]
enum Persons {
    Table,
    Pid,
    Name,
    BirthYear,
    DeathYear,
}

#[derive(DeriveIden)]
enum Genres {
    Table,
    Mid,
    Genre,
}

#[derive(DeriveIden)]
enum Ratings {
    Table,
    Mid,
    AverageRating,
    NumVotes,
}

#[derive(DeriveIden)]
enum Principals {
    Table,
    Mid,
    Pid,
    Ordering,
    Category,
    Job,
}

#[derive(DeriveIden)]
enum KnownForMovies {
    Table,
    Pid,
    Mid,
}

#[derive(DeriveIden)]
enum Professions {
    Table,
    Pid,
    Profession,
}

#[derive(DeriveIden)]
enum Writers {
    Table,
    Mid,
    Pid,
}

#[derive(DeriveIden)]
enum Directors {
    Table,
    Mid,
    Pid,
}
