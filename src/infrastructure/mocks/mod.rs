//! Mock implementations for testing.
//!
//! This module provides test doubles for infrastructure adapters,
//! enabling controlled testing of application logic.

pub mod backend;
pub mod layer;

pub use backend::{RecordedEvent, RecordingBackend};
pub use layer::{CapturedEvent, MockCaptureLayer};
