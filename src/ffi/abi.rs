// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! C ABI of the native geometry engine.
//!
//! Every entry point is held as an `unsafe extern "C"` function pointer so the
//! same table can be filled from a dynamically loaded library or from the
//! in-process loopback engine. Parameter order and layout match the exported
//! C functions exactly; output parameters are pointer-to-pointer and
//! pointer-to-int at the C level.

use serde::{Deserialize, Serialize};
use std::ffi::c_int;
use std::fmt;

/// Opaque native mesh object
#[repr(C)]
pub struct RawMesh {
    _private: [u8; 0],
}

/// Coordinate value the native engine writes for "no point"
pub const UNSET_COORDINATE: f64 = f64::MAX;

pub type MeshCreateFn = unsafe extern "C" fn(
    vertices: *const f64,
    vertex_count: c_int,
    faces: *const c_int,
    face_count: c_int,
) -> *mut RawMesh;

pub type MeshDeleteFn = unsafe extern "C" fn(mesh: *mut RawMesh);

pub type MeshGetDataFn = unsafe extern "C" fn(
    mesh: *mut RawMesh,
    vertices: *mut *mut f64,
    vertex_count: *mut c_int,
    faces: *mut *mut c_int,
    face_count: *mut c_int,
);

pub type MeshVolumeFn = unsafe extern "C" fn(mesh: *mut RawMesh) -> f64;

pub type MeshCentroidFn =
    unsafe extern "C" fn(mesh: *mut RawMesh, kind: c_int, x: *mut f64, y: *mut f64, z: *mut f64);

pub type MeshQueryBoxFn = unsafe extern "C" fn(
    mesh: *mut RawMesh,
    bounds: *const f64,
    indices: *mut *mut c_int,
    count: *mut c_int,
    element: c_int,
);

pub type MeshQuerySphereFn = unsafe extern "C" fn(
    mesh: *mut RawMesh,
    cx: f64,
    cy: f64,
    cz: f64,
    radius: f64,
    indices: *mut *mut c_int,
    count: *mut c_int,
    element: c_int,
);

pub type MeshContainsPointFn =
    unsafe extern "C" fn(mesh: *mut RawMesh, x: f64, y: f64, z: f64) -> bool;

pub type MeshClipWithPlaneFn =
    unsafe extern "C" fn(mesh: *mut RawMesh, point: *const f64, normal: *const f64) -> *mut RawMesh;

pub type MeshClosestPointFn = unsafe extern "C" fn(
    mesh: *mut RawMesh,
    point: *const f64,
    closest: *mut f64,
    search_distance: f64,
);

pub type ConvexHullCreateFn = unsafe extern "C" fn(
    coords: *const f64,
    point_count: usize,
    faces: *mut *mut c_int,
    face_count: *mut c_int,
);

pub type ReleaseIntFn = unsafe extern "C" fn(ptr: *mut c_int, is_array: bool);

pub type ReleaseDoubleFn = unsafe extern "C" fn(ptr: *mut f64, is_array: bool);

/// Function table for one native engine
#[derive(Clone, Copy)]
pub struct NativeApi {
    pub mesh_create: MeshCreateFn,
    pub mesh_delete: MeshDeleteFn,
    pub mesh_get_data: MeshGetDataFn,
    pub mesh_volume: MeshVolumeFn,
    pub mesh_centroid: MeshCentroidFn,
    pub mesh_query_box: MeshQueryBoxFn,
    pub mesh_query_sphere: MeshQuerySphereFn,
    pub mesh_contains_point: MeshContainsPointFn,
    pub mesh_clip_with_plane: MeshClipWithPlaneFn,
    pub mesh_closest_point: MeshClosestPointFn,
    pub convex_hull_create: ConvexHullCreateFn,
    pub release_int: ReleaseIntFn,
    pub release_double: ReleaseDoubleFn,
}

impl fmt::Debug for NativeApi {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NativeApi").finish_non_exhaustive()
    }
}

/// Exported symbol names, in `NativeApi` field order
pub const SYMBOLS: [&str; 13] = [
    "Mesh_Create",
    "Mesh_Delete",
    "Mesh_GetData",
    "Mesh_Volume",
    "Mesh_Centroid",
    "Mesh_QueryBox",
    "Mesh_QuerySphere",
    "Mesh_ContainsPoint",
    "Mesh_ClipWithPlane",
    "Mesh_ClosestPoint",
    "ConvexHull_Create",
    "Unsafe_ReleaseInt",
    "Unsafe_ReleaseDouble",
];

/// Centroid estimator selector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CentroidKind {
    VertexBased,
    AreaBased,
    VolumeBased,
}

impl CentroidKind {
    pub const ALL: [CentroidKind; 3] = [Self::VertexBased, Self::AreaBased, Self::VolumeBased];

    /// Integer code the native ABI expects
    pub fn code(self) -> c_int {
        match self {
            Self::VertexBased => 0,
            Self::AreaBased => 1,
            Self::VolumeBased => 2,
        }
    }

    pub fn from_code(code: c_int) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.code() == code)
    }
}

/// Mesh element selector for spatial queries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ElementKind {
    Vertex,
    Face,
}

impl ElementKind {
    /// Integer code the native ABI expects
    pub fn code(self) -> c_int {
        match self {
            Self::Vertex => 0,
            Self::Face => 1,
        }
    }

    pub fn from_code(code: c_int) -> Option<Self> {
        match code {
            0 => Some(Self::Vertex),
            1 => Some(Self::Face),
            _ => None,
        }
    }
}
