use std::sync::Arc;

use keysync::{
    FetchOptions, Field, RecordId, SaveOptions, Session, Store, source::FileSource,
};

use crate::helpers::*;

#[tokio::test]
async fn round_trip_preserves_every_field() {
    let (_, store) = test_store();
    let session = unlocked();
    let (_, mut original) = test_collection("personal");
    original
        .add([
            record_at("a", "mail", 1_000)
                .with_field(Field::new("user", "alice@example.com"))
                .with_field(Field::masked("password", "hunter2"))
                .with_tag("email")
                .with_tag("daily"),
            record_at("b", "bank", 2_000).with_field(Field::masked("pin", "0000")),
            record_at("c", "old wifi", 3_000),
        ])
        .unwrap();
    original.remove(&RecordId::new("c")).unwrap();

    store
        .save(&mut original, &session, SaveOptions::default())
        .await
        .unwrap();

    let (_, mut restored) = test_collection("personal");
    store
        .fetch(&mut restored, &session, FetchOptions::default())
        .await
        .unwrap();

    assert_eq!(restored.records(), original.records());
    assert_eq!(names(&restored), ["mail", "bank", "-"]);
}

#[tokio::test]
async fn fetch_merges_instead_of_replacing() {
    let (_, store) = test_store();
    let session = unlocked();

    let (_, mut persisted) = test_collection("default");
    persisted
        .add([record_at("a", "old", 1_000), record_at("b", "remote only", 1_000)])
        .unwrap();
    store
        .save(&mut persisted, &session, SaveOptions::default())
        .await
        .unwrap();

    let (_, mut local) = test_collection("default");
    local
        .add([record_at("a", "newer", 2_000), record_at("c", "local only", 1_000)])
        .unwrap();
    let outcome = store
        .fetch(&mut local, &session, FetchOptions::default())
        .await
        .unwrap();

    assert_eq!(outcome.added, 1);
    assert_eq!(outcome.discarded, 1);
    assert_eq!(names(&local), ["newer", "local only", "remote only"]);
}

#[tokio::test]
async fn file_source_survives_restart() {
    let dir = tempfile::tempdir().unwrap();
    let session = unlocked();

    {
        let source = Arc::new(FileSource::open(dir.path()).await.unwrap());
        let store = Store::with_config(source, test_config());
        let (_, mut coll) = test_collection("default");
        store
            .save(
                &mut coll,
                &session,
                SaveOptions::default().with_record(record_at("a", "mail", 1_000)),
            )
            .await
            .unwrap();
    }

    let source = Arc::new(FileSource::open(dir.path()).await.unwrap());
    let store = Store::with_config(source, test_config());
    let (_, mut coll) = test_collection("default");
    assert!(store.exists(&coll, FetchOptions::default()).await.unwrap());
    store
        .fetch(&mut coll, &session, FetchOptions::default())
        .await
        .unwrap();
    assert_eq!(names(&coll), ["mail"]);
    assert!(dir.path().join("coll_default").exists());
}

#[tokio::test]
async fn one_session_reads_blobs_from_another() {
    let (_, store) = test_store();
    let (_, mut coll) = test_collection("default");
    coll.add([record_at("a", "mail", 1_000)]).unwrap();
    store
        .save(&mut coll, &Session::unlock(PASSWORD), SaveOptions::default())
        .await
        .unwrap();

    let (_, mut other) = test_collection("default");
    store
        .fetch(&mut other, &Session::unlock(PASSWORD), FetchOptions::default())
        .await
        .unwrap();
    assert_eq!(names(&other), ["mail"]);
}

#[tokio::test]
async fn password_change_reencrypts_on_next_save() {
    let (_, store) = test_store();
    let mut session = unlocked();
    let (_, mut coll) = test_collection("default");
    coll.add([record_at("a", "mail", 1_000)]).unwrap();
    store
        .save(&mut coll, &session, SaveOptions::default())
        .await
        .unwrap();

    session.set_password("new password");
    store
        .save(&mut coll, &session, SaveOptions::default())
        .await
        .unwrap();

    let (_, mut reread) = test_collection("default");
    let err = store
        .fetch(&mut reread, &unlocked(), FetchOptions::default())
        .await
        .unwrap_err();
    assert!(err.is_authentication_error());
    store
        .fetch(&mut reread, &session, FetchOptions::default())
        .await
        .unwrap();
    assert_eq!(reread.len(), 1);
}
