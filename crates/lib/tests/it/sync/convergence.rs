use keysync::{
    Collection, FetchOptions, Record, RecordId, SaveOptions, Session, SyncCoordinator,
    clock::from_millis, source::MemorySource, source::Source,
};

use crate::helpers::*;

/// Decrypts what `source` currently holds for the default collection.
async fn persisted(sync: &SyncCoordinator, session: &Session, source: &dyn Source) -> Vec<Record> {
    let (_, mut coll) = test_collection("default");
    sync.store()
        .fetch(&mut coll, session, FetchOptions::from_source(source))
        .await
        .unwrap();
    let mut records = coll.records().to_vec();
    records.sort_by(|a, b| a.id().cmp(&b.id()));
    records
}

async fn seed(sync: &SyncCoordinator, session: &Session, source: &dyn Source, records: Vec<Record>) {
    let (_, mut coll) = test_collection("default");
    coll.add(records).unwrap();
    sync.store()
        .save(&mut coll, session, SaveOptions::from_source(source))
        .await
        .unwrap();
}

#[tokio::test]
async fn local_edit_wins_and_reaches_remote() {
    let sync = test_coordinator();
    let session = unlocked();
    let (local, remote) = (MemorySource::new("local"), MemorySource::new("remote"));
    let (t1, t2) = (from_millis(1_000), from_millis(2_000));

    seed(&sync, &session, &remote, vec![Record::with_id("1", "old", t1)]).await;

    let (_, mut coll) = test_collection("default");
    coll.add([Record::with_id("1", "old", t1)]).unwrap();
    coll.add([Record::with_id("1", "new", t2)]).unwrap();

    let report = sync.run(&mut coll, &session, &local, &remote).await.unwrap();
    assert!(report.remote_existed);
    assert_eq!(report.pulled.discarded, 1);

    for source in [&local as &dyn Source, &remote] {
        let records = persisted(&sync, &session, source).await;
        assert_eq!(records.len(), 1, "{}", source.name());
        assert_eq!(records[0].display_name(), "new");
        assert_eq!(records[0].updated, t2);
    }

    // Second run changes nothing observable
    let before = (
        persisted(&sync, &session, &local).await,
        persisted(&sync, &session, &remote).await,
    );
    let report = sync.run(&mut coll, &session, &local, &remote).await.unwrap();
    assert!(!report.pulled.changed());
    let after = (
        persisted(&sync, &session, &local).await,
        persisted(&sync, &session, &remote).await,
    );
    assert_eq!(before, after);
}

#[tokio::test]
async fn two_devices_converge() {
    let sync = test_coordinator();
    let session = unlocked();
    let remote = MemorySource::new("remote");
    let (phone_disk, laptop_disk) = (MemorySource::new("phone"), MemorySource::new("laptop"));

    let (_, mut phone) = test_collection("default");
    phone
        .add([
            record_at("shared", "shared v1", 1_000),
            record_at("phone-only", "phone", 1_000),
        ])
        .unwrap();
    let (_, mut laptop) = test_collection("default");
    laptop
        .add([
            record_at("shared", "shared v2", 2_000),
            record_at("doomed", "doomed", 1_000),
        ])
        .unwrap();
    laptop.remove(&RecordId::new("doomed")).unwrap();

    sync.run(&mut phone, &session, &phone_disk, &remote).await.unwrap();
    sync.run(&mut laptop, &session, &laptop_disk, &remote).await.unwrap();
    sync.run(&mut phone, &session, &phone_disk, &remote).await.unwrap();

    let sorted = |c: &Collection| {
        let mut r = c.records().to_vec();
        r.sort_by(|a, b| a.id().cmp(&b.id()));
        r
    };
    assert_eq!(sorted(&phone), sorted(&laptop));
    assert_eq!(persisted(&sync, &session, &remote).await, sorted(&phone));
    assert_eq!(persisted(&sync, &session, &phone_disk).await, sorted(&phone));

    let shared = phone.get(&RecordId::new("shared")).unwrap();
    assert_eq!(shared.display_name(), "shared v2");
    assert!(phone.get(&RecordId::new("doomed")).unwrap().is_removed());
    assert_eq!(phone.live().count(), 2);
}

#[tokio::test]
async fn first_sync_publishes_local_state() {
    let sync = test_coordinator();
    let session = unlocked();
    let (local, remote) = (MemorySource::new("local"), MemorySource::new("remote"));
    let (_, mut coll) = test_collection("default");
    coll.add([record_at("a", "mail", 1_000)]).unwrap();

    let report = sync.run(&mut coll, &session, &local, &remote).await.unwrap();
    assert!(!report.remote_existed);
    assert_eq!(persisted(&sync, &session, &remote).await, coll.records());
    assert_eq!(persisted(&sync, &session, &local).await, coll.records());
}

#[tokio::test]
async fn empty_collection_syncs_to_empty_remote() {
    let sync = test_coordinator();
    let session = unlocked();
    let (local, remote) = (MemorySource::new("local"), MemorySource::new("remote"));
    let (_, mut coll) = test_collection("default");

    sync.run(&mut coll, &session, &local, &remote).await.unwrap();
    assert!(remote.exists("coll_default").await.unwrap());
    assert!(persisted(&sync, &session, &remote).await.is_empty());
}
