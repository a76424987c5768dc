// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Owned native mesh objects

use super::codec::{FaceBuffer, MeshBuffers, VertexBuffer};
use super::guard::NativeArray;
use crate::error::{BridgeError, Result};
use crate::ffi::{CentroidKind, ElementKind, NativeApi, RawMesh, UNSET_COORDINATE};
use crate::geometry::BoundingRegion;
use nalgebra::{Point3, Vector3};
use std::ffi::c_int;
use std::ptr::{self, NonNull};
use tracing::{debug, warn};

/// One native mesh object, deleted exactly once when the value is dropped
/// or passed to [`NativeMesh::delete`].
///
/// Holding a raw pointer keeps the type `!Send`, so a handle never leaves the
/// thread (and the engine lock scope) that created it.
pub struct NativeMesh<'a> {
    raw: NonNull<RawMesh>,
    api: &'a NativeApi,
    /// Vertex and face counts when known, used to check returned indices
    shape: Option<(usize, usize)>,
}

impl<'a> NativeMesh<'a> {
    /// Create a native mesh from flat buffers
    pub fn create(api: &'a NativeApi, buffers: &MeshBuffers) -> Result<Self> {
        let vertex_count = buffers.vertices.native_count()?;
        let face_count = buffers.faces.native_count()?;
        let shape = (buffers.vertices.vertex_count(), buffers.faces.face_count());

        // SAFETY: both buffers outlive the call and hold exactly 3 * count values.
        let raw = unsafe {
            (api.mesh_create)(
                buffers.vertices.as_slice().as_ptr(),
                vertex_count,
                buffers.faces.as_slice().as_ptr(),
                face_count,
            )
        };
        let raw = NonNull::new(raw).ok_or(BridgeError::NativeAllocation {
            vertices: shape.0,
            faces: shape.1,
        })?;

        debug!(vertices = shape.0, faces = shape.1, "created native mesh");
        Ok(Self {
            raw,
            api,
            shape: Some(shape),
        })
    }

    fn adopt(api: &'a NativeApi, raw: *mut RawMesh, what: &'static str) -> Result<Self> {
        let raw = NonNull::new(raw).ok_or(BridgeError::NativeAllocation { vertices: 0, faces: 0 })?;
        debug!(source = what, "adopted native mesh");
        Ok(Self { raw, api, shape: None })
    }

    fn as_ptr(&self) -> *mut RawMesh {
        self.raw.as_ptr()
    }

    /// Copy the current vertex and face buffers out of the native object
    pub fn data(&self) -> Result<MeshBuffers> {
        let mut vertices: *mut f64 = ptr::null_mut();
        let mut vertex_count: c_int = 0;
        let mut faces: *mut c_int = ptr::null_mut();
        let mut face_count: c_int = 0;

        // SAFETY: the handle is live; output pointers are null on entry as the
        // call requires.
        unsafe {
            (self.api.mesh_get_data)(
                self.as_ptr(),
                &mut vertices,
                &mut vertex_count,
                &mut faces,
                &mut face_count,
            )
        };

        // Adopt both arrays before checking either, so both are released.
        // SAFETY: arrays returned by `mesh_get_data` hold 3 values per item.
        let vertices = unsafe { NativeArray::adopt(self.api, vertices, vertex_count, 3) };
        let faces = unsafe { NativeArray::adopt(self.api, faces, face_count, 3) };
        let (vertices, faces) = (vertices?, faces?);

        Ok(MeshBuffers {
            vertices: VertexBuffer::new(vertices.into_vec())?,
            faces: FaceBuffer::new(faces.into_vec())?,
        })
    }

    pub fn volume(&self) -> f64 {
        // SAFETY: the handle is live.
        unsafe { (self.api.mesh_volume)(self.as_ptr()) }
    }

    pub fn centroid(&self, kind: CentroidKind) -> Point3<f64> {
        let (mut x, mut y, mut z) = (0.0, 0.0, 0.0);
        // SAFETY: the handle is live; the outputs are valid for writes.
        unsafe { (self.api.mesh_centroid)(self.as_ptr(), kind.code(), &mut x, &mut y, &mut z) };
        Point3::new(x, y, z)
    }

    /// Native point-in-mesh test, with the engine's own boundary behaviour
    pub fn contains(&self, point: &Point3<f64>) -> bool {
        // SAFETY: the handle is live.
        unsafe { (self.api.mesh_contains_point)(self.as_ptr(), point.x, point.y, point.z) }
    }

    /// Indices of the elements of `element` kind matched by `region`
    pub fn query(&self, region: &BoundingRegion, element: ElementKind) -> Result<Vec<usize>> {
        let mut indices: *mut c_int = ptr::null_mut();
        let mut count: c_int = 0;

        match region {
            BoundingRegion::Box(bbox) => {
                let bounds = bbox.to_array();
                // SAFETY: the handle is live; `bounds` holds 6 doubles.
                unsafe {
                    (self.api.mesh_query_box)(
                        self.as_ptr(),
                        bounds.as_ptr(),
                        &mut indices,
                        &mut count,
                        element.code(),
                    )
                }
            }
            BoundingRegion::Sphere { center, radius } => {
                // SAFETY: the handle is live.
                unsafe {
                    (self.api.mesh_query_sphere)(
                        self.as_ptr(),
                        center.x,
                        center.y,
                        center.z,
                        *radius,
                        &mut indices,
                        &mut count,
                        element.code(),
                    )
                }
            }
        }

        // SAFETY: query results hold one index per matched element.
        let array = unsafe { NativeArray::adopt(self.api, indices, count, 1) }?;
        let limit = self.shape.map(|(vertices, faces)| match element {
            ElementKind::Vertex => vertices,
            ElementKind::Face => faces,
        });

        array
            .as_slice()
            .iter()
            .map(|&index| match usize::try_from(index) {
                Ok(i) if limit.map_or(true, |limit| i < limit) => Ok(i),
                _ => {
                    warn!(index, ?element, "native query returned an out-of-range index");
                    Err(BridgeError::NativeContract {
                        what: "query index",
                        detail: format!("{:?} index {} out of range", element, index),
                    })
                }
            })
            .collect()
    }

    /// New native mesh holding the part behind the plane
    pub fn clip(&self, point: &Point3<f64>, normal: &Vector3<f64>) -> Result<NativeMesh<'a>> {
        let point = [point.x, point.y, point.z];
        let normal = [normal.x, normal.y, normal.z];
        // SAFETY: the handle is live; both arrays hold 3 doubles.
        let raw = unsafe { (self.api.mesh_clip_with_plane)(self.as_ptr(), point.as_ptr(), normal.as_ptr()) };
        Self::adopt(self.api, raw, "clip")
    }

    /// Closest surface point within `search_distance`, if any
    pub fn closest_point(&self, point: &Point3<f64>, search_distance: f64) -> Option<Point3<f64>> {
        let query = [point.x, point.y, point.z];
        let mut closest = [UNSET_COORDINATE; 3];
        // SAFETY: the handle is live; `closest` is valid for 3 writes.
        unsafe {
            (self.api.mesh_closest_point)(self.as_ptr(), query.as_ptr(), closest.as_mut_ptr(), search_distance)
        };

        if closest.iter().any(|c| !c.is_finite() || *c == UNSET_COORDINATE) {
            return None;
        }
        Some(Point3::new(closest[0], closest[1], closest[2]))
    }

    /// Delete the native object now. Consuming `self` rules out any further
    /// use of the handle.
    pub fn delete(self) {
        drop(self);
    }
}

impl Drop for NativeMesh<'_> {
    fn drop(&mut self) {
        debug!("deleting native mesh");
        // SAFETY: `raw` came from the engine behind `api` and drop runs once.
        unsafe { (self.api.mesh_delete)(self.as_ptr()) };
    }
}

/// Hull triangles over `points`, indexing the points in their given order
pub fn convex_hull(api: &NativeApi, points: &VertexBuffer) -> Result<FaceBuffer> {
    let mut faces: *mut c_int = ptr::null_mut();
    let mut face_count: c_int = 0;
    // SAFETY: `points` holds 3 doubles per point and outlives the call.
    unsafe {
        (api.convex_hull_create)(
            points.as_slice().as_ptr(),
            points.vertex_count(),
            &mut faces,
            &mut face_count,
        )
    };

    // SAFETY: hull faces are returned as 3 indices per triangle.
    let array = unsafe { NativeArray::adopt(api, faces, face_count, 3) }?;
    let point_count = points.vertex_count();
    if let Some(&index) = array
        .as_slice()
        .iter()
        .find(|&&i| usize::try_from(i).map_or(true, |i| i >= point_count))
    {
        warn!(index, point_count, "native hull returned an out-of-range index");
        return Err(BridgeError::NativeContract {
            what: "hull index",
            detail: format!("index {} with {} input points", index, point_count),
        });
    }
    FaceBuffer::new(array.into_vec())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ffi::loopback;
    use crate::geometry::{BoundingBox, Primitive};
    use crate::marshal::codec::encode;

    #[test]
    fn test_create_and_read_back() {
        let api = loopback::api();
        let buffers = encode(&Primitive::unit_box().to_mesh()).unwrap();
        let handle = NativeMesh::create(&api, &buffers).unwrap();
        let data = handle.data().unwrap();
        handle.delete();

        assert_eq!(data, buffers);
    }

    #[test]
    fn test_invalid_input_is_allocation_error() {
        let api = loopback::api();
        // index 5 with 3 vertices: the engine refuses to build the mesh
        let buffers = MeshBuffers {
            vertices: VertexBuffer::new(vec![0.0; 9]).unwrap(),
            faces: FaceBuffer::new(vec![0, 1, 5]).unwrap(),
        };
        let result = NativeMesh::create(&api, &buffers);
        assert!(matches!(result, Err(BridgeError::NativeAllocation { vertices: 3, faces: 1 })));
    }

    #[test]
    fn test_query_returns_indices() {
        let api = loopback::api();
        let buffers = encode(&Primitive::unit_box().to_mesh()).unwrap();
        let handle = NativeMesh::create(&api, &buffers).unwrap();

        let corner = BoundingBox::new(Point3::new(-0.1, -0.1, -0.1), Point3::new(0.1, 0.1, 0.1));
        let vertices = handle.query(&corner.into(), ElementKind::Vertex).unwrap();
        assert_eq!(vertices, vec![0]);

        let far = BoundingRegion::sphere(Point3::new(10.0, 10.0, 10.0), 1.0);
        assert!(handle.query(&far, ElementKind::Face).unwrap().is_empty());
    }
}
