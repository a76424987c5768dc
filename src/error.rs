// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Error types for the native boundary

use std::fmt;
use thiserror::Error;

/// Which flat buffer an error refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BufferKind {
    Vertex,
    Face,
}

impl fmt::Display for BufferKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BufferKind::Vertex => write!(f, "vertex"),
            BufferKind::Face => write!(f, "face"),
        }
    }
}

/// Errors raised while marshaling data across the native boundary
#[derive(Debug, Error)]
pub enum BridgeError {
    /// The native create call returned a null handle
    #[error("native engine failed to allocate a mesh ({vertices} vertices, {faces} faces)")]
    NativeAllocation { vertices: usize, faces: usize },

    /// A flat buffer's length is not a multiple of 3
    #[error("{buffer} buffer length {len} is not a multiple of 3")]
    MalformedBuffer { buffer: BufferKind, len: usize },

    /// A face references a vertex that does not exist
    #[error("face {face} references vertex {index}, but the mesh has {vertex_count} vertices")]
    IndexOutOfRange {
        face: usize,
        index: i64,
        vertex_count: usize,
    },

    /// The native engine returned data that violates the call contract
    #[error("native engine returned an invalid {what}: {detail}")]
    NativeContract { what: &'static str, detail: String },

    /// A count does not fit the C `int` the native ABI expects
    #[error("{what} count {count} exceeds the native engine limit")]
    TooLarge { what: &'static str, count: usize },

    /// The native library or one of its symbols could not be loaded
    #[error("failed to load native library {path}: {reason}")]
    LibraryLoad { path: String, reason: String },
}

/// Result alias used throughout the crate
pub type Result<T> = std::result::Result<T, BridgeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = BridgeError::MalformedBuffer {
            buffer: BufferKind::Face,
            len: 7,
        };
        assert_eq!(err.to_string(), "face buffer length 7 is not a multiple of 3");

        let err = BridgeError::IndexOutOfRange {
            face: 2,
            index: 9,
            vertex_count: 4,
        };
        assert!(err.to_string().contains("vertex 9"));
    }
}
