//! Domain model types (pure).
//!
//! Plain data shared by the engine, the simulation driver and the binary.

pub mod error;
pub mod types;

// Re-export for convenience
pub use error::AppError;
pub use types::{
    sign, BoundarySide, OffsetChange, ScrollBounds, Timestamp, OFFSET_EPSILON, VELOCITY_EPSILON,
};
