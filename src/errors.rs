//! Error types for LilyPond emission
//!
//! Emission itself never aborts on musical content: missing or unknown
//! pieces are logged and replaced by a safe default. The errors here cover
//! the two places that genuinely fail: structural edits of the event tree
//! and I/O on the output sink.

use crate::models::music::NodeId;
use thiserror::Error;

/// Top-level error type
#[derive(Debug, Error)]
pub enum EmitError {
    /// Writing a finished line to the output sink failed
    #[error("Output sink failed: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid structural edit of the event tree
    #[error("Event tree error: {0}")]
    Tree(#[from] TreeError),

    /// Emitter settings could not be parsed
    #[error("Invalid emitter settings: {0}")]
    Settings(#[from] serde_json::Error),
}

/// Structural errors raised by `MusicTree` edits
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TreeError {
    /// The node already has a parent and must be detached first
    #[error("node {0:?} is already attached to a parent")]
    AlreadyAttached(NodeId),

    /// The given node is not a child of the given parent
    #[error("node {child:?} is not a child of {parent:?}")]
    NotAChild { parent: NodeId, child: NodeId },

    /// The node cannot hold an ordered list of children
    #[error("node {0:?} is not nested music")]
    NotNested(NodeId),

    /// The node is not a chord
    #[error("node {0:?} is not a chord event")]
    NotAChord(NodeId),

    /// The node is not a music wrapper
    #[error("node {0:?} is not a music wrapper")]
    NotAWrapper(NodeId),

    /// The node is not a repeat
    #[error("node {0:?} is not a repeat")]
    NotARepeat(NodeId),

    /// A node cannot become its own child or descendant
    #[error("node {0:?} cannot contain itself")]
    SelfReference(NodeId),
}
