//! The nine read-only analytic queries.
//!
//! Every query binds its inputs as parameters and returns typed rows in a fixed
//! order. The orderings add a deterministic tie-breaker so that two runs over
//! the same data return identical sequences.

use std::fmt;

use sea_orm::{
    ColumnTrait, ConnectionTrait, EntityTrait, FromQueryResult, QueryFilter, QueryOrder,
    QuerySelect, QueryTrait, Statement, Value,
    sea_query::{Expr, Func, LikeExpr, SimpleExpr},
};
use serde::Serialize;

use crate::{
    db::Session,
    entities::{director, person, principal},
    error::{AppError, AppResult},
};

/// Credits whose vote count reaches this value count as high exposure.
pub const HIGH_EXPOSURE_VOTES: i64 = 200_000;

pub const POPULAR_GENRE_MIN_RATING: f64 = 7.0;
pub const POPULAR_GENRE_MIN_FILMS: i64 = 50;

/// Ranks kept per genre by [`top_three_per_genre`]; ties can add rows.
pub const GENRE_TOP_RANK: i64 = 3;

#[derive(Clone, Debug, PartialEq, FromQueryResult, Serialize)]
pub struct FilmographyRow {
    pub title: Option<String>,
    pub year: Option<i32>,
    pub category: Option<String>,
    pub job: Option<String>,
}

#[derive(Clone, Debug, PartialEq, FromQueryResult, Serialize)]
pub struct TopRatedRow {
    pub title: Option<String>,
    pub year: Option<i32>,
    pub average_rating: Option<f64>,
}

#[derive(Clone, Debug, PartialEq, Eq, FromQueryResult, Serialize)]
pub struct MultiRoleRow {
    pub name: Option<String>,
    pub title: Option<String>,
    pub role_count: i64,
}

#[derive(Clone, Debug, PartialEq, Eq, FromQueryResult, Serialize)]
pub struct CollaborationRow {
    pub director: Option<String>,
    pub collaborations: i64,
}

#[derive(Clone, Debug, PartialEq, FromQueryResult, Serialize)]
pub struct GenreStatsRow {
    pub genre: String,
    pub film_count: i64,
    pub average_rating: f64,
}

#[derive(Clone, Debug, PartialEq, FromQueryResult, Serialize)]
pub struct DecadeRow {
    pub decade: i64,
    pub film_count: i64,
    /// `None` when none of the decade's movies has a rating.
    pub average_rating: Option<f64>,
}

#[derive(Clone, Debug, PartialEq, FromQueryResult, Serialize)]
pub struct GenreRankRow {
    pub genre: String,
    pub title: Option<String>,
    pub average_rating: Option<f64>,
    pub rank: i64,
}

#[derive(Clone, Debug, PartialEq, Eq, FromQueryResult, Serialize)]
pub struct CareerBoostRow {
    pub name: Option<String>,
    pub low_exposure: i64,
    pub high_exposure: i64,
}

#[derive(Clone, Debug, PartialEq, Eq, FromQueryResult, Serialize)]
pub struct SelfInvolvedRow {
    pub title: Option<String>,
    pub director: Option<String>,
    pub writer: Option<String>,
}

/// Substring match pattern for `LIKE ... ESCAPE '\'`.
pub fn like_pattern(needle: &str) -> String {
    let mut out = String::with_capacity(needle.len() + 2);
    out.push('%');
    for c in needle.chars() {
        if matches!(c, '%' | '_' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out.push('%');
    out
}

fn statement<I>(session: &Session, sql: &str, values: I) -> Statement
where
    I: IntoIterator<Item = Value>,
{
    Statement::from_sql_and_values(session.db().get_database_backend(), sql, values)
}

const FILMOGRAPHY_SQL: &str = r"
SELECT m.primary_title AS title, m.start_year AS year, p.category AS category, p.job AS job
FROM principals p
JOIN persons pe ON pe.pid = p.pid
JOIN movies m ON m.mid = p.mid
WHERE pe.name LIKE ? ESCAPE '\'
ORDER BY m.start_year DESC, m.primary_title, m.mid";

/// Q1: every credit of persons whose name contains `actor`, newest first.
pub async fn filmography(session: &Session, actor: &str) -> AppResult<Vec<FilmographyRow>> {
    let stmt = statement(session, FILMOGRAPHY_SQL, [like_pattern(actor).into()]);
    Ok(FilmographyRow::find_by_statement(stmt).all(session.db()).await?)
}

const TOP_RATED_SQL: &str = r"
SELECT m.primary_title AS title, m.start_year AS year, r.average_rating AS average_rating
FROM movies m
JOIN genres g ON g.mid = m.mid
JOIN ratings r ON r.mid = m.mid
WHERE g.genre = ?
  AND m.start_year BETWEEN ? AND ?
ORDER BY r.average_rating DESC, m.mid
LIMIT ?";

/// Q2: at most `limit` movies of `genre` released within
/// `start_year..=end_year`, best rated first.
pub async fn top_rated_in_genre(
    session: &Session,
    genre: &str,
    start_year: i32,
    end_year: i32,
    limit: u64,
) -> AppResult<Vec<TopRatedRow>> {
    if start_year > end_year {
        return Err(AppError::InvalidArgument(format!(
            "start year {start_year} is after end year {end_year}"
        )));
    }
    let limit = i64::try_from(limit)
        .map_err(|_| AppError::InvalidArgument(format!("limit {limit} is too large")))?;

    let stmt = statement(
        session,
        TOP_RATED_SQL,
        [genre.into(), start_year.into(), end_year.into(), limit.into()],
    );
    Ok(TopRatedRow::find_by_statement(stmt).all(session.db()).await?)
}

const MULTI_ROLE_SQL: &str = r"
SELECT pe.name AS name, m.primary_title AS title, COUNT(*) AS role_count
FROM principals p
JOIN persons pe ON pe.pid = p.pid
JOIN movies m ON m.mid = p.mid
GROUP BY p.mid, p.pid
HAVING COUNT(*) > 1
ORDER BY role_count DESC, pe.name, m.primary_title";

/// Q3: (movie, person) pairs credited more than once.
///
/// The principals key is (mid, pid), so a store that kept its constraints can
/// only produce an empty result here.
pub async fn multi_role_credits(session: &Session) -> AppResult<Vec<MultiRoleRow>> {
    let stmt = statement(session, MULTI_ROLE_SQL, []);
    Ok(MultiRoleRow::find_by_statement(stmt).all(session.db()).await?)
}

/// Q4: directors of the movies in which a person matching `actor` appears,
/// with the number of such movies each directed.
///
/// Two stages: the matching movie ids are resolved as a subquery, then the
/// directors of those movies are grouped.
pub async fn collaborations(session: &Session, actor: &str) -> AppResult<Vec<CollaborationRow>> {
    let name_matches = Expr::col((person::Entity, person::Column::Name))
        .like(LikeExpr::new(like_pattern(actor)).escape('\\'));

    let movie_ids = principal::Entity::find()
        .select_only()
        .column(principal::Column::Mid)
        .inner_join(person::Entity)
        .filter(name_matches)
        .into_query();

    let collaborations: SimpleExpr =
        Func::count(Expr::col((director::Entity, director::Column::Mid))).into();

    let rows = director::Entity::find()
        .select_only()
        .column_as(person::Column::Name, "director")
        .column_as(collaborations.clone(), "collaborations")
        .inner_join(person::Entity)
        .filter(director::Column::Mid.in_subquery(movie_ids))
        .group_by(director::Column::Pid)
        .order_by_desc(collaborations)
        .order_by_asc(person::Column::Name)
        .order_by_asc(director::Column::Pid)
        .into_model::<CollaborationRow>()
        .all(session.db())
        .await?;
    Ok(rows)
}

const POPULAR_GENRES_SQL: &str = r"
SELECT g.genre AS genre, COUNT(*) AS film_count, AVG(r.average_rating) AS average_rating
FROM genres g
JOIN ratings r ON r.mid = g.mid
GROUP BY g.genre
HAVING AVG(r.average_rating) > ?
   AND COUNT(*) > ?
ORDER BY average_rating DESC, g.genre";

/// Q5: genres averaging above 7.0 across more than 50 rated films.
pub async fn popular_genres(session: &Session) -> AppResult<Vec<GenreStatsRow>> {
    let stmt = statement(
        session,
        POPULAR_GENRES_SQL,
        [POPULAR_GENRE_MIN_RATING.into(), POPULAR_GENRE_MIN_FILMS.into()],
    );
    Ok(GenreStatsRow::find_by_statement(stmt).all(session.db()).await?)
}

const CAREER_BY_DECADE_SQL: &str = r"
WITH actor_movies AS (
    SELECT m.start_year AS year, r.average_rating AS rating
    FROM principals p
    JOIN persons pe ON pe.pid = p.pid
    JOIN movies m ON m.mid = p.mid
    LEFT JOIN ratings r ON r.mid = m.mid
    WHERE pe.name LIKE ? ESCAPE '\'
)
SELECT (year / 10) * 10 AS decade, COUNT(*) AS film_count, AVG(rating) AS average_rating
FROM actor_movies
WHERE year IS NOT NULL
GROUP BY decade
ORDER BY decade";

/// Q6: credits of persons matching `actor` bucketed by decade. Movies without
/// a start year fall outside every bucket.
pub async fn career_by_decade(session: &Session, actor: &str) -> AppResult<Vec<DecadeRow>> {
    let stmt = statement(session, CAREER_BY_DECADE_SQL, [like_pattern(actor).into()]);
    Ok(DecadeRow::find_by_statement(stmt).all(session.db()).await?)
}

const TOP_THREE_PER_GENRE_SQL: &str = r"
SELECT genre, title, average_rating, rank
FROM (
    SELECT g.genre AS genre,
           m.primary_title AS title,
           r.average_rating AS average_rating,
           RANK() OVER (PARTITION BY g.genre ORDER BY r.average_rating DESC) AS rank
    FROM genres g
    JOIN movies m ON m.mid = g.mid
    JOIN ratings r ON r.mid = m.mid
)
WHERE rank <= ?
ORDER BY genre, rank, title";

/// Q7: the three best rated movies of every genre under competition ranking.
/// Movies tied at a rank share it, so a genre may return more than three rows.
pub async fn top_three_per_genre(session: &Session) -> AppResult<Vec<GenreRankRow>> {
    let stmt = statement(session, TOP_THREE_PER_GENRE_SQL, [GENRE_TOP_RANK.into()]);
    Ok(GenreRankRow::find_by_statement(stmt).all(session.db()).await?)
}

const CAREER_BOOST_SQL: &str = r"
SELECT pe.name AS name,
       SUM(CASE WHEN r.num_votes < ? THEN 1 ELSE 0 END) AS low_exposure,
       SUM(CASE WHEN r.num_votes >= ? THEN 1 ELSE 0 END) AS high_exposure
FROM principals p
JOIN persons pe ON pe.pid = p.pid
JOIN ratings r ON r.mid = p.mid
GROUP BY pe.pid
HAVING high_exposure > 0
ORDER BY high_exposure DESC, pe.name, pe.pid";

/// Q8: persons with at least one high-exposure credit, with their low and
/// high exposure credit counts.
pub async fn career_boost(session: &Session) -> AppResult<Vec<CareerBoostRow>> {
    let votes: Value = HIGH_EXPOSURE_VOTES.into();
    let stmt = statement(session, CAREER_BOOST_SQL, [votes.clone(), votes]);
    Ok(CareerBoostRow::find_by_statement(stmt).all(session.db()).await?)
}

const SELF_INVOLVED_SQL: &str = r"
SELECT DISTINCT m.primary_title AS title, d.name AS director, w.name AS writer
FROM movies m
JOIN directors di ON di.mid = m.mid
JOIN persons d ON d.pid = di.pid
JOIN writers wr ON wr.mid = m.mid
JOIN persons w ON w.pid = wr.pid
JOIN principals p ON p.mid = m.mid
WHERE p.pid = di.pid
   OR p.pid = wr.pid
ORDER BY title, director, writer";

/// Q9: movies whose credited director or writer is also one of its principals.
pub async fn self_involved(session: &Session) -> AppResult<Vec<SelfInvolvedRow>> {
    let stmt = statement(session, SELF_INVOLVED_SQL, []);
    Ok(SelfInvolvedRow::find_by_statement(stmt).all(session.db()).await?)
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum QueryId {
    Filmography,
    TopRatedInGenre,
    MultiRole,
    Collaborations,
    PopularGenres,
    CareerByDecade,
    TopThreePerGenre,
    CareerBoost,
    SelfInvolved,
}

impl QueryId {
    pub const ALL: [QueryId; 9] = [
        QueryId::Filmography,
        QueryId::TopRatedInGenre,
        QueryId::MultiRole,
        QueryId::Collaborations,
        QueryId::PopularGenres,
        QueryId::CareerByDecade,
        QueryId::TopThreePerGenre,
        QueryId::CareerBoost,
        QueryId::SelfInvolved,
    ];

    pub fn code(self) -> &'static str {
        match self {
            QueryId::Filmography => "Q1",
            QueryId::TopRatedInGenre => "Q2",
            QueryId::MultiRole => "Q3",
            QueryId::Collaborations => "Q4",
            QueryId::PopularGenres => "Q5",
            QueryId::CareerByDecade => "Q6",
            QueryId::TopThreePerGenre => "Q7",
            QueryId::CareerBoost => "Q8",
            QueryId::SelfInvolved => "Q9",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            QueryId::Filmography => "filmography",
            QueryId::TopRatedInGenre => "top rated in genre",
            QueryId::MultiRole => "multi-role credits",
            QueryId::Collaborations => "director collaborations",
            QueryId::PopularGenres => "popular genres",
            QueryId::CareerByDecade => "career by decade",
            QueryId::TopThreePerGenre => "top 3 per genre",
            QueryId::CareerBoost => "career boost",
            QueryId::SelfInvolved => "self-involved productions",
        }
    }
}

impl fmt::Display for QueryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Parameters shared by every parametrized query in a benchmark run.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct QueryArgs {
    pub actor: String,
    pub genre: String,
    pub start_year: i32,
    pub end_year: i32,
    pub limit: u64,
}

impl Default for QueryArgs {
    fn default() -> Self {
        Self {
            actor: "Tom Hanks".to_string(),
            genre: "Action".to_string(),
            start_year: 2000,
            end_year: 2020,
            limit: 10,
        }
    }
}

/// Runs one query with `args` and returns how many rows it produced.
pub async fn run_query(session: &Session, id: QueryId, args: &QueryArgs) -> AppResult<usize> {
    let rows = match id {
        QueryId::Filmography => filmography(session, &args.actor).await?.len(),
        QueryId::TopRatedInGenre => {
            top_rated_in_genre(session, &args.genre, args.start_year, args.end_year, args.limit)
                .await?
                .len()
        },
        QueryId::MultiRole => multi_role_credits(session).await?.len(),
        QueryId::Collaborations => collaborations(session, &args.actor).await?.len(),
        QueryId::PopularGenres => popular_genres(session).await?.len(),
        QueryId::CareerByDecade => career_by_decade(session, &args.actor).await?.len(),
        QueryId::TopThreePerGenre => top_three_per_genre(session).await?.len(),
        QueryId::CareerBoost => career_boost(session).await?.len(),
        QueryId::SelfInvolved => self_involved(session).await?.len(),
    };
    Ok(rows)
}

/// Runs one query and returns at most `limit` of its rows as JSON objects.
pub async fn preview(
    session: &Session,
    id: QueryId,
    args: &QueryArgs,
    limit: usize,
) -> AppResult<Vec<serde_json::Value>> {
    match id {
        QueryId::Filmography => to_json(filmography(session, &args.actor).await?, limit),
        QueryId::TopRatedInGenre => to_json(
            top_rated_in_genre(session, &args.genre, args.start_year, args.end_year, args.limit)
                .await?,
            limit,
        ),
        QueryId::MultiRole => to_json(multi_role_credits(session).await?, limit),
        QueryId::Collaborations => to_json(collaborations(session, &args.actor).await?, limit),
        QueryId::PopularGenres => to_json(popular_genres(session).await?, limit),
        QueryId::CareerByDecade => to_json(career_by_decade(session, &args.actor).await?, limit),
        QueryId::TopThreePerGenre => to_json(top_three_per_genre(session).await?, limit),
        QueryId::CareerBoost => to_json(career_boost(session).await?, limit),
        QueryId::SelfInvolved => to_json(self_involved(session).await?, limit),
    }
}

fn to_json<T: Serialize>(rows: Vec<T>, limit: usize) -> AppResult<Vec<serde_json::Value>> {
    rows.into_iter().take(limit).map(|row| Ok(serde_json::to_value(row)?)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern("Tom Hanks"), "%Tom Hanks%");
        assert_eq!(like_pattern("100%_\\"), "%100\\%\\_\\\\%");
        assert_eq!(like_pattern(""), "%%");
    }

    #[test]
    fn query_codes_are_sequential() {
        let codes: Vec<_> = QueryId::ALL.iter().map(|q| q.code()).collect();
        assert_eq!(codes, ["Q1", "Q2", "Q3", "Q4", "Q5", "Q6", "Q7", "Q8", "Q9"]);
    }
}
