//! In-memory state storage modules.
//!
//! - `SessionStore` - Per-session locked aggregates in front of the save store

pub mod session;

pub use session::{SessionSlot, SessionStore};
