use std::path::PathBuf;

use anyhow::Context;

use crate::queries::QueryArgs;

#[derive(Clone, Debug)]
pub struct Config {
    pub database_url: String,
    pub csv_dir: PathBuf,
    pub csv_delimiter: u8,
    pub query_args: QueryArgs,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let database_url = std::env::var("DATABASE_URL")
            .unwrap_or_else(|_| "sqlite://data/imdb.db?mode=rwc".to_string());

        let csv_dir: PathBuf =
            std::env::var("CSV_DIR").unwrap_or_else(|_| "data/csv".to_string()).into();

        let csv_delimiter = match std::env::var("CSV_DELIMITER") {
            Ok(raw) => parse_delimiter(&raw).context("CSV_DELIMITER")?,
            Err(_) => b',',
        };

        let defaults = QueryArgs::default();

        let actor = std::env::var("BENCH_ACTOR").unwrap_or(defaults.actor);
        let genre = std::env::var("BENCH_GENRE").unwrap_or(defaults.genre);

        let start_year: i32 = match std::env::var("BENCH_START_YEAR") {
            Ok(raw) => raw.parse().context("BENCH_START_YEAR")?,
            Err(_) => defaults.start_year,
        };
        let end_year: i32 = match std::env::var("BENCH_END_YEAR") {
            Ok(raw) => raw.parse().context("BENCH_END_YEAR")?,
            Err(_) => defaults.end_year,
        };
        let limit: u64 = match std::env::var("BENCH_TOP_N") {
            Ok(raw) => raw.parse().context("BENCH_TOP_N")?,
            Err(_) => defaults.limit,
        };

        Ok(Self {
            database_url,
            csv_dir,
            csv_delimiter,
            query_args: QueryArgs { actor, genre, start_year, end_year, limit },
        })
    }
}

fn parse_delimiter(raw: &str) -> anyhow::Result<u8> {
    match raw {
        "\\t" | "tab" => Ok(b'\t'),
        s if s.len() == 1 && s.is_ascii() => Ok(s.as_bytes()[0]),
        s => anyhow::bail!("expected a single ASCII character, got {s:?}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delimiter_accepts_tab_aliases() {
        assert_eq!(parse_delimiter("\\t").unwrap(), b'\t');
        assert_eq!(parse_delimiter("tab").unwrap(), b'\t');
        assert_eq!(parse_delimiter(";").unwrap(), b';');
    }

    #[test]
    fn delimiter_rejects_multi_byte() {
        assert!(parse_delimiter(";;").is_err());
        assert!(parse_delimiter("é").is_err());
        assert!(parse_delimiter("").is_err());
    }
}
