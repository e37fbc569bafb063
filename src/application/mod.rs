//! Application layer - orchestration of domain logic.
//!
//! This layer coordinates the domain logic and manages the runtime behavior:
//! - Gated loggers (counting and gating each call)
//! - Logger registry (one gated logger per identity, global budget)
//! - Sweep controller and adjustment policy (the feedback loop)
//! - Scheduler (periodic sweeps)
//!
//! ## Ports
//!
//! The application layer defines ports (traits) that infrastructure
//! adapters must implement. This keeps the application layer independent
//! from infrastructure details.

pub mod adjustment;
pub mod gate;
pub mod metrics;
pub mod ports;
pub mod registry;
pub mod scheduler;
pub mod sweep;
