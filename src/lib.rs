// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Meshbridge
//!
//! Marshaling boundary between host-side meshes and a native geometry engine
//! reachable only through a flat, pointer-based C ABI. Meshes are flattened
//! into coordinate and index buffers, native objects and arrays are owned by
//! scoped guards, and geometry queries (volume, centroid, containment,
//! spatial queries, convex hull, clipping, closest point) are exposed through
//! [`Kernel`].

pub mod config;
pub mod diagnostics;
pub mod engine;
pub mod error;
pub mod ffi;
pub mod geometry;
pub mod io;
pub mod kernel;
pub mod marshal;

pub use config::BridgeConfig;
pub use diagnostics::{DiagnosticsReport, Timed, Timer};
pub use engine::{Engine, EngineKind};
pub use error::{BridgeError, BufferKind, Result};
pub use ffi::{CentroidKind, ElementKind};
pub use geometry::{BoundingBox, BoundingRegion, Face, Mesh, Primitive, Vertex};
pub use kernel::{Kernel, KernelOptions};
