// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Native allocation accounting.
//!
//! The loopback registry is process-wide, so everything here runs inside one
//! test function to keep other tests from allocating concurrently.

use anyhow::Result;
use meshbridge::ffi::abi::MeshQuerySphereFn;
use meshbridge::ffi::loopback::{self, outstanding_allocations};
use meshbridge::ffi::{ElementKind, NativeApi, RawMesh};
use meshbridge::marshal::{encode, MeshBuffers, NativeMesh};
use meshbridge::{BoundingBox, BoundingRegion, BridgeError, CentroidKind, Kernel, Primitive};
use nalgebra::{Point3, Vector3};
use std::ffi::c_int;
use std::ptr;

const CYCLES: usize = 25;

#[test]
fn test_native_allocations_are_released() -> Result<()> {
    assert_eq!(outstanding_allocations(), 0);

    facade_cycles()?;
    handle_lifecycle()?;
    failure_paths()?;
    corrupted_query_results()?;
    raw_abi_misuse();

    assert_eq!(outstanding_allocations(), 0);
    Ok(())
}

fn facade_cycles() -> Result<()> {
    let kernel = Kernel::loopback();
    let mesh = Primitive::sphere(1.0, 12).to_mesh();
    let region = BoundingRegion::from(BoundingBox::new(Point3::new(0.0, 0.0, 0.0), Point3::new(1.0, 1.0, 1.0)));
    let points: Vec<Point3<f64>> = mesh.positions().collect();

    for cycle in 0..CYCLES {
        kernel.volume(&mesh)?;
        kernel.centroid(&mesh, CentroidKind::ALL[cycle % 3])?;
        kernel.contains_point(&mesh, &Point3::new(0.1, 0.0, 0.0))?;
        kernel.query_faces(&mesh, &region)?;
        kernel.query_vertices(&mesh, &region)?;
        kernel.convex_hull(&points)?;
        kernel.clip_with_plane(&mesh, &Point3::origin(), &Vector3::new(1.0, 1.0, 0.0))?;
        kernel.closest_point(&mesh, &Point3::new(3.0, 0.0, 0.0), 5.0)?;
        kernel.round_trip(&mesh)?;

        assert_eq!(outstanding_allocations(), 0, "leak after cycle {}", cycle);
    }
    Ok(())
}

fn handle_lifecycle() -> Result<()> {
    let api = loopback::api();
    let buffers = encode(&Primitive::unit_box().to_mesh())?;

    let handle = NativeMesh::create(&api, &buffers)?;
    assert_eq!(outstanding_allocations(), 1);

    let clipped = handle.clip(&Point3::new(0.5, 0.5, 0.5), &Vector3::z())?;
    assert_eq!(outstanding_allocations(), 2);

    // copied out and released before `data` returns
    let data = clipped.data()?;
    assert!(!data.faces.is_empty());
    assert_eq!(outstanding_allocations(), 2);

    clipped.delete();
    assert_eq!(outstanding_allocations(), 1);
    drop(handle);
    assert_eq!(outstanding_allocations(), 0);
    Ok(())
}

fn failure_paths() -> Result<()> {
    let api = loopback::api();

    // rejected by the engine: nothing allocated
    let bad = MeshBuffers {
        vertices: meshbridge::marshal::VertexBuffer::new(vec![0.0; 9])?,
        faces: meshbridge::marshal::FaceBuffer::new(vec![0, 1, 9])?,
    };
    assert!(matches!(
        NativeMesh::create(&api, &bad),
        Err(BridgeError::NativeAllocation { .. })
    ));
    assert_eq!(outstanding_allocations(), 0);

    // an error inside the operation still deletes the handle
    let buffers = encode(&Primitive::unit_box().to_mesh())?;
    let result: meshbridge::Result<()> = (|| {
        let handle = NativeMesh::create(&api, &buffers)?;
        handle.data()?;
        Err(BridgeError::NativeContract {
            what: "test",
            detail: "forced failure".into(),
        })
    })();
    assert!(result.is_err());
    assert_eq!(outstanding_allocations(), 0);
    Ok(())
}

/// Loopback sphere query whose first returned index is out of range
unsafe extern "C" fn sphere_with_bad_index(
    mesh: *mut RawMesh,
    cx: f64,
    cy: f64,
    cz: f64,
    radius: f64,
    indices: *mut *mut c_int,
    count: *mut c_int,
    element: c_int,
) {
    (loopback::api().mesh_query_sphere)(mesh, cx, cy, cz, radius, indices, count, element);
    if !(*indices).is_null() && *count > 0 {
        **indices = 9999;
    }
}

/// Loopback sphere query that reports a negative count for a live array
unsafe extern "C" fn sphere_with_negative_count(
    mesh: *mut RawMesh,
    cx: f64,
    cy: f64,
    cz: f64,
    radius: f64,
    indices: *mut *mut c_int,
    count: *mut c_int,
    element: c_int,
) {
    (loopback::api().mesh_query_sphere)(mesh, cx, cy, cz, radius, indices, count, element);
    *count = -*count;
}

fn corrupted_query_results() -> Result<()> {
    let buffers = encode(&Primitive::unit_box().to_mesh())?;
    let region = BoundingRegion::sphere(Point3::new(0.5, 0.5, 0.5), 2.0);

    let queries: [MeshQuerySphereFn; 2] = [sphere_with_bad_index, sphere_with_negative_count];
    for query in queries {
        let api = NativeApi {
            mesh_query_sphere: query,
            ..loopback::api()
        };
        let handle = NativeMesh::create(&api, &buffers)?;

        // the index array is live in the registry when validation fails
        let result = handle.query(&region, ElementKind::Face);
        assert!(matches!(result, Err(BridgeError::NativeContract { .. })), "{:?}", result);
        assert_eq!(outstanding_allocations(), 1);

        handle.delete();
        assert_eq!(outstanding_allocations(), 0);
    }
    Ok(())
}

fn raw_abi_misuse() {
    let api = loopback::api();
    let coords = [0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0];
    let faces: [c_int; 3] = [0, 1, 2];

    unsafe {
        let mesh = (api.mesh_create)(coords.as_ptr(), 3, faces.as_ptr(), 1);
        assert!(!mesh.is_null());
        assert_eq!(outstanding_allocations(), 1);

        // outputs that are not null on entry are left alone
        let mut vertex_out: *mut f64 = ptr::NonNull::dangling().as_ptr();
        let mut vertex_count: c_int = -1;
        let mut face_out: *mut c_int = ptr::null_mut();
        let mut face_count: c_int = -1;
        (api.mesh_get_data)(mesh, &mut vertex_out, &mut vertex_count, &mut face_out, &mut face_count);
        assert_eq!(vertex_count, -1);
        assert!(face_out.is_null());
        assert_eq!(outstanding_allocations(), 1);

        (api.mesh_delete)(mesh);
        assert_eq!(outstanding_allocations(), 0);

        // second delete and stray releases are logged and ignored
        (api.mesh_delete)(mesh);
        (api.release_int)(ptr::null_mut(), true);
        (api.release_double)(ptr::null_mut(), true);
    }
    assert_eq!(outstanding_allocations(), 0);
}
