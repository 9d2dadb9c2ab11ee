use std::path::Path;

use sea_orm::{
    ConnectionTrait, DatabaseTransaction, DbErr, RuntimeErr, SqlxError, TransactionTrait, Value,
    sea_query::{Alias, Query, SimpleExpr},
};
use tracing::{debug, info, warn};

use crate::{
    db::Session,
    error::{AppError, AppResult, RowError},
    source::{CsvSource, FieldMap, Record, RowSource},
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ColumnKind {
    Text,
    Integer,
    Real,
    /// 0/1 stored as INTEGER; also accepts true/false.
    Flag,
}

#[derive(Clone, Copy, Debug)]
pub struct ImportColumn {
    pub name: &'static str,
    pub kind: ColumnKind,
}

const fn text(name: &'static str) -> ImportColumn {
    ImportColumn { name, kind: ColumnKind::Text }
}

const fn integer(name: &'static str) -> ImportColumn {
    ImportColumn { name, kind: ColumnKind::Integer }
}

/// Target table and the typed columns each record is bound to.
#[derive(Clone, Copy, Debug)]
pub struct InsertTemplate {
    pub table: &'static str,
    pub columns: &'static [ImportColumn],
}

pub const MOVIES: InsertTemplate = InsertTemplate {
    table: "movies",
    columns: &[
        text("mid"),
        text("title_type"),
        text("primary_title"),
        text("original_title"),
        ImportColumn { name: "is_adult", kind: ColumnKind::Flag },
        integer("start_year"),
        integer("end_year"),
        integer("runtime_minutes"),
    ],
};

pub const PERSONS: InsertTemplate = InsertTemplate {
    table: "persons",
    columns: &[text("pid"), text("name"), integer("birth_year"), integer("death_year")],
};

pub const GENRES: InsertTemplate =
    InsertTemplate { table: "genres", columns: &[text("mid"), text("genre")] };

pub const RATINGS: InsertTemplate = InsertTemplate {
    table: "ratings",
    columns: &[
        text("mid"),
        ImportColumn { name: "average_rating", kind: ColumnKind::Real },
        integer("num_votes"),
    ],
};

pub const PRINCIPALS: InsertTemplate = InsertTemplate {
    table: "principals",
    columns: &[text("mid"), text("pid"), integer("ordering"), text("category"), text("job")],
};

pub const KNOWN_FOR_MOVIES: InsertTemplate =
    InsertTemplate { table: "known_for_movies", columns: &[text("pid"), text("mid")] };

pub const PROFESSIONS: InsertTemplate =
    InsertTemplate { table: "professions", columns: &[text("pid"), text("profession")] };

pub const WRITERS: InsertTemplate =
    InsertTemplate { table: "writers", columns: &[text("mid"), text("pid")] };

pub const DIRECTORS: InsertTemplate =
    InsertTemplate { table: "directors", columns: &[text("mid"), text("pid")] };

#[derive(Clone, Copy, Debug)]
pub struct DatasetTable {
    pub template: InsertTemplate,
    pub file_name: &'static str,
}

/// Every table with its export file, parents first.
pub const DATASET: [DatasetTable; 9] = [
    DatasetTable { template: MOVIES, file_name: "movies_clean.csv" },
    DatasetTable { template: PERSONS, file_name: "persons_clean.csv" },
    DatasetTable { template: GENRES, file_name: "genres_clean.csv" },
    DatasetTable { template: RATINGS, file_name: "ratings_clean.csv" },
    DatasetTable { template: PRINCIPALS, file_name: "principals_clean.csv" },
    DatasetTable { template: KNOWN_FOR_MOVIES, file_name: "knownformovies_clean.csv" },
    DatasetTable { template: PROFESSIONS, file_name: "professions_clean.csv" },
    DatasetTable { template: WRITERS, file_name: "writers_clean.csv" },
    DatasetTable { template: DIRECTORS, file_name: "directors_clean.csv" },
];

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ImportOutcome {
    pub table: &'static str,
    pub succeeded: u64,
    pub failed: u64,
}

impl ImportOutcome {
    pub fn total(&self) -> u64 {
        self.succeeded + self.failed
    }
}

/// Loads every record of `source` into `template.table` inside one transaction.
///
/// A row that fails to convert or is refused by a constraint is counted in
/// `failed` and skipped. Any other storage fault (read-only store, missing
/// table, I/O error, lost connection) rolls back the whole table and returns
/// `AppError::Transaction`. A source that stops being readable rolls back too.
pub async fn load_table<S: RowSource>(
    session: &Session,
    template: &InsertTemplate,
    source: &mut S,
    field_map: &FieldMap,
) -> AppResult<ImportOutcome> {
    let table = template.table;
    debug!(table, source = %source.location().display(), "load start");

    let txn = session
        .db()
        .begin()
        .await
        .map_err(|err| AppError::Transaction { table, source: err })?;

    let mut outcome = ImportOutcome { table, succeeded: 0, failed: 0 };
    let mut line = 0_u64;

    loop {
        let row = match source.next_record(field_map) {
            Ok(Some(row)) => row,
            Ok(None) => break,
            Err(err) => {
                abort(txn, table).await;
                return Err(err);
            },
        };
        line += 1;

        let result = match row {
            Ok(record) => insert_record(&txn, template, &record).await,
            Err(err) => Err(InsertError::Row(err)),
        };

        match result {
            Ok(()) => outcome.succeeded += 1,
            Err(InsertError::Row(err)) => {
                debug!(table, row = line, error = %err, "row skipped");
                outcome.failed += 1;
            },
            Err(InsertError::Fatal(cause)) => {
                warn!(table, row = line, error = %cause, "storage fault, rolling back");
                abort(txn, table).await;
                return Err(AppError::Transaction { table, source: cause });
            },
        }
    }

    txn.commit().await.map_err(|err| AppError::Transaction { table, source: err })?;

    info!(table, inserted = outcome.succeeded, failed = outcome.failed, "table imported");
    Ok(outcome)
}

async fn abort(txn: DatabaseTransaction, table: &'static str) {
    if let Err(err) = txn.rollback().await {
        warn!(table, error = %err, "rollback failed");
    }
}

/// Imports the nine export files found in `dir`, parents first. All files are
/// opened before any table is touched so a missing file stops the run early.
pub async fn import_dataset(
    session: &Session,
    dir: &Path,
    delimiter: u8,
    field_map: &FieldMap,
) -> AppResult<Vec<ImportOutcome>> {
    let mut sources = Vec::with_capacity(DATASET.len());
    for table in &DATASET {
        sources.push((table, CsvSource::open(dir.join(table.file_name), delimiter)?));
    }

    let mut outcomes = Vec::with_capacity(sources.len());
    for (table, mut source) in sources {
        outcomes.push(load_table(session, &table.template, &mut source, field_map).await?);
    }
    Ok(outcomes)
}

enum InsertError {
    Row(RowError),
    Fatal(DbErr),
}

async fn insert_record(
    txn: &DatabaseTransaction,
    template: &InsertTemplate,
    record: &Record,
) -> Result<(), InsertError> {
    let values = template
        .columns
        .iter()
        .map(|column| bind(column, record.get(column.name)).map(SimpleExpr::Value))
        .collect::<Result<Vec<_>, _>>()
        .map_err(InsertError::Row)?;

    let mut insert = Query::insert();
    insert
        .into_table(Alias::new(template.table))
        .columns(template.columns.iter().map(|column| Alias::new(column.name)));
    insert.values(values).map_err(|err| InsertError::Row(RowError::Malformed(err.to_string())))?;

    let stmt = txn.get_database_backend().build(&insert);
    match txn.execute(stmt).await {
        Ok(_) => Ok(()),
        Err(err) if is_row_rejection(&err) => {
            Err(InsertError::Row(RowError::Rejected(err.to_string())))
        },
        Err(err) => Err(InsertError::Fatal(err)),
    }
}

const SQLITE_CONSTRAINT: i32 = 19;
const SQLITE_MISMATCH: i32 = 20;

/// True when the storage refused this one row: a constraint violation of any
/// kind, or a datatype mismatch. Judged on the primary SQLite result code,
/// which is the low byte of the extended code sqlx reports.
fn is_row_rejection(err: &DbErr) -> bool {
    if err.sql_err().is_some() {
        return true;
    }
    match err {
        DbErr::Exec(RuntimeErr::SqlxError(SqlxError::Database(db_err)))
        | DbErr::Query(RuntimeErr::SqlxError(SqlxError::Database(db_err))) => db_err
            .code()
            .and_then(|code| code.parse::<i32>().ok())
            .is_some_and(|code| matches!(code & 0xff, SQLITE_CONSTRAINT | SQLITE_MISMATCH)),
        _ => false,
    }
}

/// Absent fields, empty strings and the IMDb `\N` marker all bind as NULL.
fn bind(column: &ImportColumn, raw: Option<&str>) -> Result<Value, RowError> {
    let raw = raw.map(str::trim).filter(|s| !s.is_empty() && *s != "\\N");

    let type_error = |value: &str, expected| RowError::Type {
        column: column.name,
        value: value.to_string(),
        expected,
    };

    let value = match column.kind {
        ColumnKind::Text => Value::from(raw.map(str::to_string)),
        ColumnKind::Integer => {
            let parsed = match raw {
                Some(s) => Some(s.parse::<i64>().map_err(|_| type_error(s, "integer"))?),
                None => None,
            };
            Value::from(parsed)
        },
        ColumnKind::Real => {
            let parsed = match raw {
                Some(s) => {
                    let v = s.parse::<f64>().map_err(|_| type_error(s, "real"))?;
                    if !v.is_finite() {
                        return Err(type_error(s, "real"));
                    }
                    Some(v)
                },
                None => None,
            };
            Value::from(parsed)
        },
        ColumnKind::Flag => {
            let parsed = match raw {
                Some("0") => Some(0_i64),
                Some("1") => Some(1),
                Some(s) if s.eq_ignore_ascii_case("false") => Some(0),
                Some(s) if s.eq_ignore_ascii_case("true") => Some(1),
                Some(s) => return Err(type_error(s, "0/1 flag")),
                None => None,
            };
            Value::from(parsed)
        },
    };
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dataset_follows_schema_table_order() {
        let tables: Vec<_> = DATASET.iter().map(|t| t.template.table).collect();
        assert_eq!(tables, migration::TABLES);
    }

    #[test]
    fn null_markers_bind_as_null() {
        let column = integer("start_year");
        assert_eq!(bind(&column, None).unwrap(), Value::BigInt(None));
        assert_eq!(bind(&column, Some("")).unwrap(), Value::BigInt(None));
        assert_eq!(bind(&column, Some("\\N")).unwrap(), Value::BigInt(None));
        assert_eq!(bind(&column, Some(" 1994 ")).unwrap(), Value::BigInt(Some(1994)));
    }

    #[test]
    fn unparsable_numbers_are_type_errors() {
        let err = bind(&integer("runtime_minutes"), Some("ninety")).unwrap_err();
        assert_eq!(
            err,
            RowError::Type {
                column: "runtime_minutes",
                value: "ninety".to_string(),
                expected: "integer",
            }
        );

        let rating = ImportColumn { name: "average_rating", kind: ColumnKind::Real };
        assert!(bind(&rating, Some("NaN")).is_err());
        assert_eq!(bind(&rating, Some("7.5")).unwrap(), Value::Double(Some(7.5)));
    }

    #[test]
    fn flags_accept_digits_and_words() {
        let column = ImportColumn { name: "is_adult", kind: ColumnKind::Flag };
        assert_eq!(bind(&column, Some("1")).unwrap(), Value::BigInt(Some(1)));
        assert_eq!(bind(&column, Some("False")).unwrap(), Value::BigInt(Some(0)));
        assert!(bind(&column, Some("yes")).is_err());
    }
}
