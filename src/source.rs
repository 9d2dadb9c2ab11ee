use std::{
    collections::BTreeMap,
    fs::File,
    io::Read,
    path::{Path, PathBuf},
};

use csv::StringRecord;

use crate::error::{AppError, AppResult, RowError};

/// External field name to canonical column name, consulted while a record is
/// built. Fields without an entry keep their external name.
#[derive(Clone, Debug, Default)]
pub struct FieldMap {
    renames: BTreeMap<String, String>,
}

impl FieldMap {
    pub fn new<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self { renames: pairs.into_iter().map(|(k, v)| (k.into(), v.into())).collect() }
    }

    /// Header names used by the IMDb dumps and their cleaned exports.
    pub fn imdb() -> Self {
        Self::new([
            ("nconst", "pid"),
            ("tconst", "mid"),
            ("primaryName", "name"),
            ("jobName", "profession"),
            ("titleType", "title_type"),
            ("primaryTitle", "primary_title"),
            ("originalTitle", "original_title"),
            ("isAdult", "is_adult"),
            ("startYear", "start_year"),
            ("endYear", "end_year"),
            ("runtimeMinutes", "runtime_minutes"),
            ("birthYear", "birth_year"),
            ("deathYear", "death_year"),
            ("averageRating", "average_rating"),
            ("numVotes", "num_votes"),
        ])
    }

    pub fn canonical<'a>(&'a self, field: &'a str) -> &'a str {
        self.renames.get(field).map(String::as_str).unwrap_or(field)
    }
}

/// One input row keyed by canonical field name.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Record {
    fields: BTreeMap<String, String>,
}

impl Record {
    pub fn from_fields<'a, I>(fields: I, field_map: &FieldMap) -> Self
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let fields = fields
            .into_iter()
            .map(|(name, value)| (field_map.canonical(name.trim()).to_string(), value.to_string()))
            .collect();
        Self { fields }
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.fields.get(field).map(String::as_str)
    }
}

/// Somewhere import rows come from, read one record at a time. A row that
/// cannot be read comes back as a `RowError`; only a failure that makes the
/// whole source unusable is an `Err`.
pub trait RowSource {
    fn location(&self) -> &Path;

    /// The next row, or `None` once the input is exhausted.
    fn next_record(&mut self, field_map: &FieldMap) -> AppResult<Option<Result<Record, RowError>>>;
}

pub struct CsvSource<R> {
    location: PathBuf,
    reader: csv::Reader<R>,
    row: StringRecord,
}

impl CsvSource<File> {
    pub fn open(path: impl AsRef<Path>, delimiter: u8) -> AppResult<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|err| source_error(path, err))?;
        Ok(Self::from_reader(path, file, delimiter))
    }
}

impl<R: Read> CsvSource<R> {
    pub fn from_reader(location: impl Into<PathBuf>, reader: R, delimiter: u8) -> Self {
        let reader = csv::ReaderBuilder::new()
            .delimiter(delimiter)
            .has_headers(true)
            .quoting(delimiter != b'\t')
            .from_reader(reader);
        Self { location: location.into(), reader, row: StringRecord::new() }
    }
}

fn source_error(path: &Path, err: impl ToString) -> AppError {
    AppError::Source { path: path.to_path_buf(), message: err.to_string() }
}

impl<R: Read> RowSource for CsvSource<R> {
    fn location(&self) -> &Path {
        &self.location
    }

    fn next_record(&mut self, field_map: &FieldMap) -> AppResult<Option<Result<Record, RowError>>> {
        let Self { location, reader, row } = self;

        // The header line is consumed and cached by the first `read_record`.
        match reader.read_record(row) {
            Ok(false) => Ok(None),
            Ok(true) => {
                let headers = reader.headers().map_err(|err| source_error(location, err))?;
                Ok(Some(Ok(Record::from_fields(headers.iter().zip(row.iter()), field_map))))
            },
            Err(err) if err.is_io_error() => Err(source_error(location, err)),
            Err(err) => Ok(Some(Err(RowError::Malformed(err.to_string())))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn drain<S: RowSource>(source: &mut S, map: &FieldMap) -> Vec<Result<Record, RowError>> {
        let mut rows = Vec::new();
        while let Some(row) = source.next_record(map).unwrap() {
            rows.push(row);
        }
        rows
    }

    #[test]
    fn imdb_map_renames_external_identifiers() {
        let map = FieldMap::imdb();
        assert_eq!(map.canonical("nconst"), "pid");
        assert_eq!(map.canonical("tconst"), "mid");
        assert_eq!(map.canonical("primaryName"), "name");
        assert_eq!(map.canonical("jobName"), "profession");
        assert_eq!(map.canonical("category"), "category");
    }

    #[test]
    fn record_is_built_under_canonical_names() {
        let map = FieldMap::imdb();
        let record = Record::from_fields([("nconst", "nm1"), ("primaryName", "Ann")], &map);
        assert_eq!(record.get("pid"), Some("nm1"));
        assert_eq!(record.get("name"), Some("Ann"));
        assert_eq!(record.get("nconst"), None);
    }

    #[test]
    fn malformed_rows_are_kept_in_place() {
        let data = "pid,name\nnm1,Ann\nnm2\nnm3,Cat\n";
        let mut source = CsvSource::from_reader("persons.csv", data.as_bytes(), b',');
        let rows = drain(&mut source, &FieldMap::default());

        assert_eq!(rows.len(), 3);
        assert!(rows[0].is_ok());
        assert!(matches!(rows[1], Err(RowError::Malformed(_))));
        assert_eq!(rows[2].as_ref().unwrap().get("name"), Some("Cat"));
    }

    #[test]
    fn tab_separated_dumps_are_read_unquoted() {
        let data = "tconst\tprimaryTitle\ntt1\t\"Quoted\" Title\n";
        let mut source = CsvSource::from_reader("movies.tsv", data.as_bytes(), b'\t');
        let rows = drain(&mut source, &FieldMap::imdb());

        let record = rows[0].as_ref().unwrap();
        assert_eq!(record.get("mid"), Some("tt1"));
        assert_eq!(record.get("primary_title"), Some("\"Quoted\" Title"));
    }

    #[test]
    fn exhausted_source_keeps_returning_none() {
        let data = "mid,genre\ntt1,Drama\n";
        let mut source = CsvSource::from_reader("genres.csv", data.as_bytes(), b',');
        let map = FieldMap::default();

        assert!(source.next_record(&map).unwrap().is_some());
        assert!(source.next_record(&map).unwrap().is_none());
        assert!(source.next_record(&map).unwrap().is_none());
    }

    #[test]
    fn header_only_input_has_no_rows() {
        let mut source = CsvSource::from_reader("writers.csv", "mid,pid\n".as_bytes(), b',');
        assert!(drain(&mut source, &FieldMap::default()).is_empty());
    }
}
