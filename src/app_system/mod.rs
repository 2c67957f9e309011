//! System orchestration, startup, and shutdown logic.

pub mod cafe_system;
pub mod tracing;

pub use self::cafe_system::*;
pub use self::tracing::*;
