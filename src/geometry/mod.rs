// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Geometry module - host-side mesh representation

mod bbox;
mod mesh;
mod primitives;

pub use bbox::{BoundingBox, BoundingRegion};
pub use mesh::{Face, Mesh, Vertex};
pub use primitives::Primitive;
