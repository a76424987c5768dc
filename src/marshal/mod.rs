// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Marshaling between host meshes and the native engine

pub mod codec;
pub mod guard;
pub mod handle;

pub use codec::{decode, encode, encode_points, FaceBuffer, MeshBuffers, VertexBuffer};
pub use guard::{NativeArray, NativeElement};
pub use handle::{convex_hull, NativeMesh};
