//! Error types for scope tree operations

use thiserror::Error;

use super::LabelPath;

/// Errors that can occur when addressing or editing tree nodes
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TreeError {
    /// No node exists at the given label path
    #[error("No scope item found at '{0}'")]
    PathNotFound(LabelPath),

    /// The node is locked and rejects label edits
    #[error("Scope item '{0}' is locked and cannot be renamed")]
    NodeLocked(LabelPath),

    /// The path is empty and would address the virtual root
    #[error("The tree root cannot be addressed or modified")]
    RootNotAddressable,
}
