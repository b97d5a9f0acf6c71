//! Save persistence port.
//!
//! Synchronous: commits run on the blocking pool and finish once started,
//! even if the request that triggered them goes away.

use serde::Serialize;
use wrldkeep_domain::{SaveFile, SessionId};

use super::error::StoreError;

/// What a commit actually wrote.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CommitReport {
    /// Shards whose file was (re)written
    pub written: Vec<String>,
    /// Shards whose previous file was reused
    pub reused: Vec<String>,
    /// Stale shard files removed after the pointer moved
    pub pruned: usize,
}

#[cfg_attr(test, mockall::automock)]
pub trait SaveRepo: Send + Sync {
    /// Load the aggregate for `session_id`. `Ok(None)` when nothing was saved yet.
    fn load(&self, session_id: &SessionId) -> Result<Option<SaveFile>, StoreError>;

    /// Persist `save` atomically. With `force`, every shard is rewritten.
    fn commit(&self, save: &SaveFile, force: bool) -> Result<CommitReport, StoreError>;
}
