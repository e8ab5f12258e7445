//! Reference data port trait.

use crate::domain::error::BlotterError;
use crate::domain::issue::IssueMap;
use std::path::Path;

/// Source of reference issues and their closing yields.
pub trait ReferencePort {
    /// Load issues from `path`, reporting why nothing could be loaded.
    fn try_load(&self, path: &Path) -> Result<IssueMap, BlotterError>;

    /// Default implementation: any failure yields an empty map and a warning.
    /// A missing file and an undecodable one look the same to the caller.
    fn load(&self, path: &Path) -> IssueMap {
        match self.try_load(path) {
            Ok(issues) => issues,
            Err(e) => {
                tracing::warn!(error = %e, "no reference issues loaded");
                IssueMap::new()
            }
        }
    }
}
