use std::sync::Arc;

use keysync::{
    Collection, FixedClock, Record, Session, Store, StoreConfig, SyncCoordinator,
    clock::from_millis, codec::KdfParams, source::MemorySource,
};

pub const PASSWORD: &str = "correct horse battery staple";

/// Store config with cheap Argon2 parameters.
pub fn test_config() -> StoreConfig {
    StoreConfig::default().with_kdf(KdfParams::fast())
}

/// A store over a fresh in-memory source, returned alongside the source.
pub fn test_store() -> (Arc<MemorySource>, Store) {
    let source = Arc::new(MemorySource::new("default"));
    let store = Store::with_config(source.clone(), test_config());
    (source, store)
}

pub fn test_coordinator() -> SyncCoordinator {
    let (_, store) = test_store();
    SyncCoordinator::new(store)
}

pub fn unlocked() -> Session {
    Session::unlock(PASSWORD)
}

/// A collection driven by its own deterministic clock.
pub fn test_collection(name: &str) -> (Arc<FixedClock>, Collection) {
    let clock = Arc::new(FixedClock::default());
    let collection = Collection::with_clock(name, clock.clone());
    (clock, collection)
}

pub fn record_at(id: &str, name: &str, millis: i64) -> Record {
    Record::with_id(id, name, from_millis(millis))
}

/// Names of the records in order, tombstones shown as `-`.
pub fn names(collection: &Collection) -> Vec<String> {
    collection
        .iter()
        .map(|r| {
            if r.is_removed() {
                "-".to_string()
            } else {
                r.display_name().to_string()
            }
        })
        .collect()
}
