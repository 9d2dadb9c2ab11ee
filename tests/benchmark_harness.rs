mod common;

use imdbench::{
    benchmark::{self, present_indexes},
    queries::{QueryArgs, QueryId},
};

#[tokio::test]
async fn every_query_is_timed_in_both_passes() {
    let session = common::memory_session().await;
    common::seed_catalogue(&session).await;

    let report = benchmark::run_benchmark(&session, &QueryId::ALL, &QueryArgs::default())
        .await
        .unwrap();

    assert_eq!(report.timings.len(), QueryId::ALL.len());
    for id in QueryId::ALL {
        let timing = report.timings.get(&id).unwrap();
        assert!(timing.pre_index.ms >= 0.0);
        assert!(timing.post_index.ms >= 0.0);
        assert_eq!(timing.pre_index.rows, timing.post_index.rows, "{id} changed with indexes");
    }
    assert_eq!(report.args, QueryArgs::default());
}

#[tokio::test]
async fn lookup_indexes_exist_after_the_indexed_pass() {
    let session = common::memory_session().await;
    assert!(present_indexes(&session).await.unwrap().is_empty());

    benchmark::run_benchmark(&session, &QueryId::ALL, &QueryArgs::default()).await.unwrap();

    let present = present_indexes(&session).await.unwrap();
    assert_eq!(present, migration::LOOKUP_INDEXES);
}

#[tokio::test]
async fn baseline_pass_starts_without_leftover_indexes() {
    let session = common::memory_session().await;
    benchmark::create_lookup_indexes(&session).await.unwrap();
    assert_eq!(present_indexes(&session).await.unwrap().len(), 6);

    benchmark::drop_lookup_indexes(&session).await.unwrap();
    assert!(present_indexes(&session).await.unwrap().is_empty());

    benchmark::drop_lookup_indexes(&session).await.unwrap();
    benchmark::create_lookup_indexes(&session).await.unwrap();
    benchmark::create_lookup_indexes(&session).await.unwrap();
    assert_eq!(present_indexes(&session).await.unwrap().len(), 6);
}

#[tokio::test]
async fn unindexed_pass_leaves_indexes_alone() {
    let session = common::memory_session().await;
    common::seed_catalogue(&session).await;

    let subset = [QueryId::Filmography, QueryId::CareerBoost];
    let pass = benchmark::run_unindexed(&session, &subset, &QueryArgs::default()).await.unwrap();

    assert_eq!(pass.keys().copied().collect::<Vec<_>>(), subset);
    assert_eq!(pass[&QueryId::Filmography].rows, 5);
    assert!(present_indexes(&session).await.unwrap().is_empty());
}

#[tokio::test]
async fn invalid_arguments_halt_the_benchmark() {
    let session = common::memory_session().await;
    let args = QueryArgs { start_year: 2020, end_year: 1990, ..QueryArgs::default() };

    let result = benchmark::run_benchmark(&session, &QueryId::ALL, &args).await;
    assert!(result.is_err());
}
