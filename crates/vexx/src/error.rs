use crate::node::NodeId;
use std::fmt::{self, Display};
use thiserror::Error;
use vexx_utils::AsciiDisplay;

/// Everything that can go wrong while decoding a VEXX file.
///
/// Only a handful of these are fatal to a whole load (see [`crate::Document::load`]), the rest
/// end up as [`Diagnostic`]s attached to the decoded document.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DecodeError {
    #[error("read of {len} bytes at {offset:#x} leaves the {begin:#x}..{end:#x} window")]
    OutOfBounds {
        offset: usize,
        len: usize,
        begin: usize,
        end: usize,
    },
    #[error("malformed structure at {offset:#x}: {reason}")]
    Structural { offset: usize, reason: String },
    #[error("unrecognized file magic `{}`", AsciiDisplay(.0.as_slice()))]
    BadMagic([u8; 4]),
    #[error("unknown node type {tag:#x} at {offset:#x}")]
    UnknownType { tag: u32, offset: usize },
    #[error("{what} size mismatch, expected {expected} bytes, found {found}")]
    SizeMismatch {
        what: &'static str,
        expected: usize,
        found: usize,
    },
    #[error("{what} index {index} is out of range (only {len} available)")]
    IndexOutOfRange {
        what: &'static str,
        index: usize,
        len: usize,
    },
    #[error("{what} limit of {limit} reached")]
    LimitReached { what: &'static str, limit: usize },
    #[error("texture data unavailable: {0}")]
    Texture(String),
}

impl DecodeError {
    pub(crate) fn structural(offset: usize, reason: impl Into<String>) -> Self {
        Self::Structural {
            offset,
            reason: reason.into(),
        }
    }

    /// Turns a failed read into a structural error. Used where a read going out of bounds means
    /// the tree itself can't be laid out anymore.
    pub(crate) fn into_structural(self, offset: usize, what: &str) -> Self {
        match self {
            Self::OutOfBounds { .. } => Self::structural(offset, format!("{what}: {self}")),
            other => other,
        }
    }
}

/// A non-fatal problem found while decoding, optionally pinned to the node it was found in.
#[derive(Debug, Clone, PartialEq)]
pub struct Diagnostic {
    pub node: Option<NodeId>,
    pub error: DecodeError,
}

impl Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.node {
            Some(node) => write!(f, "node #{}: {}", node.index(), self.error),
            None => write!(f, "{}", self.error),
        }
    }
}
