/*! Integration tests for keysync.
 *
 * This test suite is organized as a single integration test binary
 * following the pattern described by matklad in
 * https://matklad.github.io/2021/02/27/delete-cargo-integration-tests.html
 *
 * The module structure mirrors the main library structure:
 * - collection: merge semantics, tombstones and the uuid index
 * - store: encrypted save/fetch/exists and error classification
 * - source: file and HTTP sources against the shared contract
 * - sync: the pull/commit/push coordinator
 */

use tracing_subscriber::EnvFilter;

#[ctor::ctor]
fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive("keysync=info".parse().unwrap()),
        )
        .with_test_writer()
        .try_init();
}

mod collection;
mod helpers;
mod store;
mod sync;
