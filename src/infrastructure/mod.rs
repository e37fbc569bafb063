//! Infrastructure layer - external adapters and integrations.
//!
//! This layer provides adapters for:
//! - Storage implementations (sharded maps)
//! - The `tracing` backend records are forwarded to
//! - Tracing integration (per-layer `Filter`)
//! - The assembled `LogGovernor`

pub mod backend;
pub mod governor;
pub mod layer;
pub mod storage;

/// Mock implementations for testing.
///
/// This module is only available when the `test-helpers` feature is enabled,
/// or during test builds. It provides recording test doubles for asserting
/// on what the governor forwards.
///
/// To use these mocks in integration tests, add to your `Cargo.toml`:
/// ```toml
/// [dev-dependencies]
/// log-governor = { version = "*", features = ["test-helpers"] }
/// ```
#[cfg(any(test, feature = "test-helpers"))]
pub mod mocks;
