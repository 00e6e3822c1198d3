/*! Integration tests for Patchlog.
 *
 * This test suite is organized as a single integration test binary
 * following the pattern described by matklad in
 * https://matklad.github.io/2021/02/27/delete-cargo-integration-tests.html
 *
 * The module structure mirrors the main library structure:
 * - marshal: Tests for converting typed values to and from trees
 * - snapshot: Tests for flattening trees and the textual snapshot form
 * - patch: Tests for diffing snapshots and applying patches
 * - history: Tests for the History struct and its persisted form
 */

use tracing_subscriber::EnvFilter;

#[ctor::ctor]
fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive("patchlog=info".parse().unwrap()),
        )
        .with_test_writer()
        .try_init();
}

mod helpers;
mod history;
mod patch;
mod snapshot;
