//! Domain layer - Port definitions and desired-state helpers
//!
//! This module defines the core traits (ports) that transports implement,
//! following hexagonal architecture principles, plus the helpers used to
//! compare current and desired resource state.

pub mod modify;
pub mod ports;

pub use modify::*;
pub use ports::*;
