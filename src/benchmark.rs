use std::{collections::BTreeMap, time::Instant};

use migration::{CreateLookupIndexes, LOOKUP_INDEXES, LookupIndex, MigrationTrait};
use sea_orm_migration::SchemaManager;
use serde::Serialize;
use tracing::{debug, info};

use crate::{
    db::Session,
    error::AppResult,
    queries::{QueryArgs, QueryId, run_query},
};

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct Measurement {
    pub ms: f64,
    pub rows: usize,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct QueryTiming {
    pub pre_index: Measurement,
    pub post_index: Measurement,
}

impl QueryTiming {
    /// Negative when the indexed pass was faster.
    pub fn delta_ms(&self) -> f64 {
        self.post_index.ms - self.pre_index.ms
    }
}

#[derive(Clone, Debug, Serialize)]
pub struct BenchmarkReport {
    pub started_at: jiff::Timestamp,
    pub args: QueryArgs,
    pub timings: BTreeMap<QueryId, QueryTiming>,
}

/// Times each query without the lookup indexes, creates them, and times each
/// query again with identical arguments.
///
/// Indexes left from an earlier run are dropped first so the first pass is a
/// real baseline. The OS page cache is not flushed between passes, so the
/// second pass may also benefit from warm pages.
pub async fn run_benchmark(
    session: &Session,
    queries: &[QueryId],
    args: &QueryArgs,
) -> AppResult<BenchmarkReport> {
    let started_at = jiff::Timestamp::now();

    drop_lookup_indexes(session).await?;
    let pre = timed_pass(session, queries, args, "unindexed").await?;

    create_lookup_indexes(session).await?;
    let post = timed_pass(session, queries, args, "indexed").await?;

    let timings = pre
        .into_iter()
        .zip(post)
        .map(|((id, pre_index), (_, post_index))| (id, QueryTiming { pre_index, post_index }))
        .collect();

    Ok(BenchmarkReport { started_at, args: args.clone(), timings })
}

/// One pass over the store as it is, without touching indexes.
pub async fn run_unindexed(
    session: &Session,
    queries: &[QueryId],
    args: &QueryArgs,
) -> AppResult<BTreeMap<QueryId, Measurement>> {
    Ok(timed_pass(session, queries, args, "as-is").await?.into_iter().collect())
}

async fn timed_pass(
    session: &Session,
    queries: &[QueryId],
    args: &QueryArgs,
    pass: &'static str,
) -> AppResult<Vec<(QueryId, Measurement)>> {
    let mut out = Vec::with_capacity(queries.len());
    for &id in queries {
        let started = Instant::now();
        let rows = run_query(session, id, args).await?;
        let ms = started.elapsed().as_secs_f64() * 1000.0;

        info!(pass, query = %id, label = id.label(), rows, ms, "query timed");
        out.push((id, Measurement { ms, rows }));
    }
    Ok(out)
}

pub async fn create_lookup_indexes(session: &Session) -> AppResult<()> {
    let manager = SchemaManager::new(session.db());
    CreateLookupIndexes.up(&manager).await?;
    info!(indexes = LOOKUP_INDEXES.len(), "lookup indexes created");
    Ok(())
}

pub async fn drop_lookup_indexes(session: &Session) -> AppResult<()> {
    let manager = SchemaManager::new(session.db());
    CreateLookupIndexes.down(&manager).await?;
    debug!("lookup indexes dropped");
    Ok(())
}

/// The lookup indexes currently present in the store.
pub async fn present_indexes(session: &Session) -> AppResult<Vec<LookupIndex>> {
    let manager = SchemaManager::new(session.db());
    let mut present = Vec::new();
    for index in LOOKUP_INDEXES {
        if manager.has_index(index.table, index.name).await? {
            present.push(index);
        }
    }
    Ok(present)
}
