use std::time::Duration;

use async_trait::async_trait;
use keysync::{
    ErrorKind, FetchOptions, Result, Session,
    source::{MemorySource, Source, SourceError, Timeout},
};

use crate::helpers::*;

/// Never answers.
struct Stalled;

#[async_trait]
impl Source for Stalled {
    fn name(&self) -> &str {
        "stalled"
    }

    async fn get(&self, _key: &str) -> Result<Vec<u8>> {
        std::future::pending().await
    }

    async fn set(&self, _key: &str, _value: &[u8]) -> Result<()> {
        std::future::pending().await
    }

    async fn exists(&self, _key: &str) -> Result<bool> {
        std::future::pending().await
    }
}

/// Serves reads from `inner` and refuses every write.
struct ReadOnly(MemorySource);

#[async_trait]
impl Source for ReadOnly {
    fn name(&self) -> &str {
        "read-only"
    }

    async fn get(&self, key: &str) -> Result<Vec<u8>> {
        self.0.get(key).await
    }

    async fn set(&self, key: &str, _value: &[u8]) -> Result<()> {
        Err(SourceError::Unavailable {
            source_name: self.name().to_string(),
            key: key.to_string(),
            reason: "read-only".to_string(),
        }
        .into())
    }

    async fn exists(&self, key: &str) -> Result<bool> {
        self.0.exists(key).await
    }
}

#[tokio::test]
async fn unreachable_remote_aborts_before_local_write() {
    let sync = test_coordinator();
    let (local, remote) = (MemorySource::new("local"), MemorySource::new("remote"));
    remote.set_offline(true);
    let (_, mut coll) = test_collection("default");
    coll.add([record_at("a", "mail", 1_000)]).unwrap();

    let err = sync
        .run(&mut coll, &unlocked(), &local, &remote)
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::SourceUnavailable);
    assert_eq!(local.write_count(), 0);
    assert_eq!(coll.len(), 1);
}

#[tokio::test]
async fn local_failure_never_pushes() {
    let sync = test_coordinator();
    let (local, remote) = (MemorySource::new("local"), MemorySource::new("remote"));
    local.set_offline(true);
    let (_, mut coll) = test_collection("default");
    coll.add([record_at("a", "mail", 1_000)]).unwrap();

    let err = sync
        .run(&mut coll, &unlocked(), &local, &remote)
        .await
        .unwrap_err();
    assert!(err.is_retryable());
    assert_eq!(remote.write_count(), 0);
    assert!(!remote.exists("coll_default").await.unwrap());
}

#[tokio::test]
async fn stalled_remote_times_out() {
    let sync = test_coordinator();
    let local = MemorySource::new("local");
    let remote = Timeout::new(Stalled, Duration::from_millis(50));
    let (_, mut coll) = test_collection("default");

    let err = sync
        .run(&mut coll, &unlocked(), &local, &remote)
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::SourceUnavailable);
    assert_eq!(local.write_count(), 0);
}

#[tokio::test]
async fn failed_push_keeps_local_commit() {
    let sync = test_coordinator();
    let session = unlocked();
    let local = MemorySource::new("local");
    let remote = ReadOnly(MemorySource::new("remote"));
    let (_, mut coll) = test_collection("default");
    coll.add([record_at("a", "mail", 1_000)]).unwrap();

    let err = sync
        .run(&mut coll, &session, &local, &remote)
        .await
        .unwrap_err();
    assert!(err.is_unavailable());
    assert_eq!(local.write_count(), 1);
    assert!(!remote.exists("coll_default").await.unwrap());

    // The local commit is complete and readable
    let (_, mut reread) = test_collection("default");
    sync.store()
        .fetch(&mut reread, &session, FetchOptions::from_source(&local))
        .await
        .unwrap();
    assert_eq!(reread.records(), coll.records());
}

#[tokio::test]
async fn wrong_password_on_remote_is_surfaced_verbatim() {
    let sync = test_coordinator();
    let (local, remote) = (MemorySource::new("local"), MemorySource::new("remote"));
    let (_, mut seeded) = test_collection("default");
    seeded.add([record_at("a", "mail", 1_000)]).unwrap();
    let elsewhere = MemorySource::new("elsewhere");
    sync.run(&mut seeded, &Session::unlock("someone else"), &elsewhere, &remote)
        .await
        .unwrap();

    let (_, mut coll) = test_collection("default");
    let err = sync
        .run(&mut coll, &unlocked(), &local, &remote)
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::AuthenticationFailed);
    assert_eq!(local.write_count(), 0);
    assert!(coll.is_empty());
}

#[tokio::test]
async fn locked_session_syncs_nothing() {
    let sync = test_coordinator();
    let (local, remote) = (MemorySource::new("local"), MemorySource::new("remote"));
    let (_, mut coll) = test_collection("default");

    let err = sync
        .run(&mut coll, &Session::locked(), &local, &remote)
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Locked);
    assert_eq!(local.write_count() + remote.write_count(), 0);
}
