//! Pure helpers shared by entities and the engine's validators.
//!
//! No side effects, no I/O.

pub mod seed;
pub mod string;

pub use seed::{pick, stable_int};
pub use string::{none_if_blank, truncate_chars};
