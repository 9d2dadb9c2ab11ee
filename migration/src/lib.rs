pub use sea_orm_migration::prelude::*;

mod m20250301_000001_create_movie_schema;
mod m20250301_000002_create_lookup_indexes;

pub use m20250301_000001_create_movie_schema::Migration as CreateMovieSchema;
pub use m20250301_000002_create_lookup_indexes::Migration as CreateLookupIndexes;

/// Tables in import order: parents before the tables that reference them.
pub const TABLES: [&str; 9] = [
    "movies",
    "persons",
    "genres",
    "ratings",
    "principals",
    "known_for_movies",
    "professions",
    "writers",
    "directors",
];

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LookupIndex {
    pub name: &'static str,
    pub table: &'static str,
    pub column: &'static str,
}

/// Secondary indexes created between the two benchmark passes.
pub const LOOKUP_INDEXES: [LookupIndex; 6] = [
    LookupIndex { name: "idx_principals_pid", table: "principals", column: "pid" },
    LookupIndex { name: "idx_principals_mid", table: "principals", column: "mid" },
    LookupIndex { name: "idx_persons_name", table: "persons", column: "name" },
    LookupIndex { name: "idx_genres_mid", table: "genres", column: "mid" },
    LookupIndex { name: "idx_ratings_mid", table: "ratings", column: "mid" },
    LookupIndex { name: "idx_movies_year", table: "movies", column: "start_year" },
];
