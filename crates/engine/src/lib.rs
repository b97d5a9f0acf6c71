//! WrldKeep Engine library.
//!
//! Server-side world state for a text adventure: region generation, movement,
//! the world clock, interaction discovery and incremental save bundles.
//!
//! ## Structure
//!
//! - `use_cases/` - World state operations, one module per area
//! - `stores/` - Per-session locked aggregates
//! - `infrastructure/` - External dependency implementations (ports + adapters)
//! - `api/` - HTTP entry points
//! - `app` - Application composition

pub mod api;
pub mod app;
pub mod infrastructure;
pub mod stores;
pub mod use_cases;

/// Test fixtures shared by use case and API tests.
#[cfg(test)]
pub mod test_fixtures;

pub use app::App;
