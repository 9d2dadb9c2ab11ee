use std::{collections::BTreeMap, fmt::Write};

use crate::{
    benchmark::{BenchmarkReport, Measurement},
    import::ImportOutcome,
    queries::QueryId,
};

pub fn import_summary(outcomes: &[ImportOutcome]) -> String {
    let mut out = String::new();
    for outcome in outcomes {
        let _ = writeln!(
            out,
            "[{}] inserted: {} | failed: {}",
            outcome.table, outcome.succeeded, outcome.failed
        );
    }
    out
}

pub fn benchmark_table(report: &BenchmarkReport) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "benchmark started {}", report.started_at);
    let _ = writeln!(
        out,
        "{:<4} {:<28} {:>12} {:>12} {:>12}",
        "id", "query", "no index ms", "indexed ms", "delta ms"
    );
    for (id, timing) in &report.timings {
        let _ = writeln!(
            out,
            "{:<4} {:<28} {:>12.3} {:>12.3} {:>+12.3}",
            id.code(),
            id.label(),
            timing.pre_index.ms,
            timing.post_index.ms,
            timing.delta_ms()
        );
    }
    out
}

pub fn single_pass_table(pass: &BTreeMap<QueryId, Measurement>) -> String {
    let mut out = String::new();
    for (id, measurement) in pass {
        let _ = writeln!(
            out,
            "{:<4} {:<28} {:>12.3} ms  ({} rows)",
            id.code(),
            id.label(),
            measurement.ms,
            measurement.rows
        );
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{benchmark::QueryTiming, queries::QueryArgs};

    #[test]
    fn import_summary_has_one_line_per_table() {
        let outcomes = [
            ImportOutcome { table: "movies", succeeded: 3, failed: 1 },
            ImportOutcome { table: "persons", succeeded: 2, failed: 0 },
        ];
        assert_eq!(
            import_summary(&outcomes),
            "[movies] inserted: 3 | failed: 1\n[persons] inserted: 2 | failed: 0\n"
        );
    }

    #[test]
    fn benchmark_table_lists_every_query_with_delta() {
        let timing = QueryTiming {
            pre_index: Measurement { ms: 12.5, rows: 4 },
            post_index: Measurement { ms: 2.0, rows: 4 },
        };
        let report = BenchmarkReport {
            started_at: jiff::Timestamp::UNIX_EPOCH,
            args: QueryArgs::default(),
            timings: BTreeMap::from([(QueryId::Filmography, timing)]),
        };

        let table = benchmark_table(&report);
        let line = table.lines().find(|l| l.starts_with("Q1")).unwrap();
        assert!(line.contains("filmography"));
        assert!(line.contains("12.500"));
        assert!(line.contains("-10.500"));
    }
}
