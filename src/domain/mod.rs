//! Domain layer - pure types with no I/O.
//!
//! - Logger identities and markers
//! - Log records, levels and message classes
//! - Per-logger and global limits
//! - Overflow detection with hysteresis
//! - Suppression reports and sweep summaries

pub mod identity;
pub mod limits;
pub mod overflow;
pub mod record;
pub mod summary;
