mod common;

use imdbench::{AppError, Session, import, schema};
use sea_orm::{EntityTrait, PaginatorTrait};

use imdbench::entities::movie;

#[tokio::test]
async fn ensure_schema_creates_all_nine_tables() {
    let session = common::memory_session().await;

    let tables = schema::existing_tables(&session).await.unwrap();
    assert_eq!(tables, migration::TABLES);
    assert!(session.foreign_keys_enabled().await.unwrap());
}

#[tokio::test]
async fn ensure_schema_twice_keeps_tables_and_rows() {
    let session = common::memory_session().await;
    common::load_csv(&session, &import::MOVIES, "mid,primary_title\ntt1,Heat\n").await;

    schema::ensure_schema(&session).await.unwrap();
    schema::ensure_schema(&session).await.unwrap();

    assert_eq!(schema::existing_tables(&session).await.unwrap().len(), 9);
    assert_eq!(movie::Entity::find().count(session.db()).await.unwrap(), 1);
    assert!(session.foreign_keys_enabled().await.unwrap());
}

#[tokio::test]
async fn constraints_survive_a_second_ensure() {
    let session = common::memory_session().await;
    schema::ensure_schema(&session).await.unwrap();

    let outcome = common::load_csv(&session, &import::GENRES, "mid,genre\ntt404,Drama\n").await;
    assert_eq!(outcome.failed, 1);
}

#[tokio::test]
async fn file_backed_store_is_reopened_intact() {
    let dir = tempfile::tempdir().unwrap();
    let url = format!("sqlite://{}?mode=rwc", dir.path().join("imdb.db").display());

    let session = Session::open(&url).await.unwrap();
    schema::ensure_schema(&session).await.unwrap();
    common::load_csv(&session, &import::PERSONS, "pid,name\nnm1,Tom Hanks\n").await;
    session.close().await.unwrap();

    let session = Session::open(&url).await.unwrap();
    schema::ensure_schema(&session).await.unwrap();
    let count = imdbench::entities::person::Entity::find().count(session.db()).await.unwrap();
    assert_eq!(count, 1);
}

#[tokio::test]
async fn unopenable_storage_is_a_connection_error() {
    let dir = tempfile::tempdir().unwrap();
    let url = format!("sqlite://{}?mode=rwc", dir.path().join("missing/nested/imdb.db").display());

    let err = Session::open(&url).await.err().unwrap();
    assert!(matches!(err, AppError::Connection { .. }), "unexpected error: {err}");
}
