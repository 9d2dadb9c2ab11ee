#![allow(dead_code)]

use imdbench::{
    AppResult, Session,
    import::{self, ImportOutcome, InsertTemplate},
    schema,
    source::{CsvSource, FieldMap},
};

pub async fn memory_session() -> Session {
    let session = Session::open("sqlite::memory:").await.unwrap();
    schema::ensure_schema(&session).await.unwrap();
    session
}

pub async fn load_csv(session: &Session, template: &InsertTemplate, csv: &str) -> ImportOutcome {
    try_load_csv(session, template, csv).await.unwrap()
}

pub async fn try_load_csv(
    session: &Session,
    template: &InsertTemplate,
    csv: &str,
) -> AppResult<ImportOutcome> {
    let mut source = CsvSource::from_reader(template.table, csv.as_bytes(), b',');
    import::load_table(session, template, &mut source, &FieldMap::imdb()).await
}

/// A small catalogue exercising every query:
/// - Tom Hanks is credited on five movies: three in the 1990s, one in 2000 and
///   one without a year. He also directs and writes one of them.
/// - Zemeckis directs two Hanks movies, Spielberg one.
/// - Drama has ties at rank 1 and at rank 3, so it keeps four rows.
pub async fn seed_catalogue(session: &Session) {
    load_csv(
        session,
        &import::MOVIES,
        "mid,titleType,primaryTitle,originalTitle,isAdult,startYear,endYear,runtimeMinutes\n\
         tt1,movie,Forrest Gump,Forrest Gump,0,1994,,142\n\
         tt2,movie,Saving Private Ryan,Saving Private Ryan,0,1998,,169\n\
         tt3,movie,Cast Away,Cast Away,0,2000,,143\n\
         tt4,movie,That Thing You Do!,That Thing You Do!,0,1996,,108\n\
         tt5,movie,Untitled Hanks Project,,0,\\N,,\n\
         tt6,movie,Gladiator,Gladiator,0,2000,,155\n\
         tt7,movie,Heat,Heat,0,1995,,170\n",
    )
    .await;

    load_csv(
        session,
        &import::PERSONS,
        "nconst,primaryName,birthYear,deathYear\n\
         nm1,Tom Hanks,1956,\n\
         nm2,Steven Spielberg,1946,\n\
         nm3,Robert Zemeckis,1952,\n\
         nm4,Russell Crowe,1964,\n\
         nm5,Michael Mann,1943,\n",
    )
    .await;

    load_csv(
        session,
        &import::GENRES,
        "tconst,genre\n\
         tt1,Drama\ntt2,Drama\ntt3,Drama\ntt4,Drama\ntt2,War\ntt6,Action\ntt7,Action\ntt7,Drama\n",
    )
    .await;

    load_csv(
        session,
        &import::RATINGS,
        "tconst,averageRating,numVotes\n\
         tt1,8.8,2200000\n\
         tt2,8.6,1500000\n\
         tt3,8.6,650000\n\
         tt4,6.9,70000\n\
         tt6,8.5,1600000\n\
         tt7,8.8,700000\n",
    )
    .await;

    load_csv(
        session,
        &import::PRINCIPALS,
        "tconst,nconst,ordering,category,job\n\
         tt1,nm1,1,actor,\n\
         tt2,nm1,1,actor,\n\
         tt4,nm1,1,actor,\n\
         tt5,nm1,1,actor,\n\
         tt3,nm1,1,actor,\n\
         tt6,nm4,1,actor,\n\
         tt7,nm5,2,producer,producer\n",
    )
    .await;

    load_csv(
        session,
        &import::DIRECTORS,
        "tconst,nconst\ntt1,nm3\ntt3,nm3\ntt2,nm2\ntt4,nm1\ntt7,nm5\n",
    )
    .await;

    load_csv(session, &import::WRITERS, "tconst,nconst\ntt4,nm1\ntt7,nm5\ntt1,nm3\n").await;
}
