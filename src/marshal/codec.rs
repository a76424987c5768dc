// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Conversion between [`Mesh`] and the flat buffers the native engine reads.
//!
//! A vertex buffer holds `x, y, z` doubles per vertex and a face buffer holds
//! three C `int` indices per triangle. Both are validated on construction, so a
//! buffer that exists always has a length that is a multiple of three.

use crate::error::{BridgeError, BufferKind, Result};
use crate::geometry::{Face, Mesh};
use nalgebra::Point3;
use std::ffi::c_int;

/// Flat `x, y, z` coordinates
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VertexBuffer(Vec<f64>);

impl VertexBuffer {
    pub fn new(coords: Vec<f64>) -> Result<Self> {
        if coords.len() % 3 != 0 {
            return Err(BridgeError::MalformedBuffer {
                buffer: BufferKind::Vertex,
                len: coords.len(),
            });
        }
        Ok(Self(coords))
    }

    pub fn from_points<'a>(points: impl IntoIterator<Item = &'a Point3<f64>>) -> Self {
        Self(points.into_iter().flat_map(|p| [p.x, p.y, p.z]).collect())
    }

    pub fn vertex_count(&self) -> usize {
        self.0.len() / 3
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    pub fn points(&self) -> impl Iterator<Item = Point3<f64>> + '_ {
        self.0.chunks_exact(3).map(|c| Point3::new(c[0], c[1], c[2]))
    }

    /// Vertex count as the C `int` the native ABI expects
    pub fn native_count(&self) -> Result<c_int> {
        native_count("vertex", self.vertex_count())
    }

    pub fn into_inner(self) -> Vec<f64> {
        self.0
    }
}

/// Flat triangle indices, three per face
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FaceBuffer(Vec<c_int>);

impl FaceBuffer {
    pub fn new(indices: Vec<c_int>) -> Result<Self> {
        if indices.len() % 3 != 0 {
            return Err(BridgeError::MalformedBuffer {
                buffer: BufferKind::Face,
                len: indices.len(),
            });
        }
        Ok(Self(indices))
    }

    pub fn face_count(&self) -> usize {
        self.0.len() / 3
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_slice(&self) -> &[c_int] {
        &self.0
    }

    pub fn triangles(&self) -> impl Iterator<Item = [c_int; 3]> + '_ {
        self.0.chunks_exact(3).map(|c| [c[0], c[1], c[2]])
    }

    /// Face count as the C `int` the native ABI expects
    pub fn native_count(&self) -> Result<c_int> {
        native_count("face", self.face_count())
    }
}

/// Vertex and face buffers of one mesh
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MeshBuffers {
    pub vertices: VertexBuffer,
    pub faces: FaceBuffer,
}

fn native_count(what: &'static str, count: usize) -> Result<c_int> {
    c_int::try_from(count).map_err(|_| BridgeError::TooLarge { what, count })
}

/// Flatten a mesh, splitting quads into triangles.
///
/// Vertices and faces keep their insertion order. An empty mesh encodes to
/// empty buffers.
pub fn encode(mesh: &Mesh) -> Result<MeshBuffers> {
    mesh.validate()?;
    native_count("vertex", mesh.vertex_count())?;

    let vertices = VertexBuffer::from_points(mesh.vertices.iter().map(|v| &v.position));
    let mut indices = Vec::with_capacity(mesh.face_count() * 3);
    for face in &mesh.faces {
        for triangle in face.triangles() {
            // bounded by the vertex count checked above
            indices.extend(triangle.iter().map(|&i| i as c_int));
        }
    }
    let faces = FaceBuffer(indices);
    faces.native_count()?;

    Ok(MeshBuffers { vertices, faces })
}

/// Flatten a bare point set
pub fn encode_points(points: &[Point3<f64>]) -> VertexBuffer {
    VertexBuffer::from_points(points)
}

/// Rebuild a mesh from flat buffers, recomputing normals locally
pub fn decode(vertices: &VertexBuffer, faces: &FaceBuffer) -> Result<Mesh> {
    let vertex_count = vertices.vertex_count();
    let mut mesh = Mesh::with_capacity(vertex_count, faces.face_count());
    for point in vertices.points() {
        mesh.add_point(point);
    }

    for (face, triangle) in faces.triangles().enumerate() {
        let mut indices = [0usize; 3];
        for (slot, &index) in indices.iter_mut().zip(&triangle) {
            *slot = usize::try_from(index)
                .ok()
                .filter(|&i| i < vertex_count)
                .ok_or(BridgeError::IndexOutOfRange {
                    face,
                    index: i64::from(index),
                    vertex_count,
                })?;
        }
        mesh.faces.push(Face::Triangle(indices));
    }

    mesh.recompute_normals();
    Ok(mesh)
}

/// Decode raw flat values, rejecting lengths that are not multiples of 3
pub fn decode_raw(coords: Vec<f64>, indices: Vec<c_int>) -> Result<Mesh> {
    decode(&VertexBuffer::new(coords)?, &FaceBuffer::new(indices)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Primitive;

    #[test]
    fn test_encode_unit_box() {
        let mesh = Primitive::unit_box().to_mesh();
        let buffers = encode(&mesh).unwrap();
        assert_eq!(buffers.vertices.as_slice().len(), 24);
        assert_eq!(buffers.faces.as_slice().len(), 36);
        assert_eq!(&buffers.vertices.as_slice()[3..6], &[1.0, 0.0, 0.0]);
    }

    #[test]
    fn test_encode_triangulates_quads() {
        let mesh = Primitive::unit_box_quads().to_mesh();
        assert_eq!(mesh.face_count(), 6);
        let buffers = encode(&mesh).unwrap();
        assert_eq!(buffers.faces.face_count(), 12);
        // first quad [0, 3, 2, 1] splits into (0, 3, 2) and (0, 2, 1)
        assert_eq!(&buffers.faces.as_slice()[..6], &[0, 3, 2, 0, 2, 1]);
    }

    #[test]
    fn test_empty_mesh_encodes_to_empty_buffers() {
        let buffers = encode(&Mesh::new()).unwrap();
        assert!(buffers.vertices.is_empty());
        assert!(buffers.faces.is_empty());
        let decoded = decode(&buffers.vertices, &buffers.faces).unwrap();
        assert_eq!(decoded.vertex_count(), 0);
        assert!(decoded.is_empty());
    }

    #[test]
    fn test_round_trip_is_exact() {
        let mesh = Primitive::sphere(1.3, 12).to_mesh();
        let buffers = encode(&mesh).unwrap();
        let decoded = decode(&buffers.vertices, &buffers.faces).unwrap();

        assert_eq!(decoded.vertex_count(), mesh.vertex_count());
        for (a, b) in mesh.positions().zip(decoded.positions()) {
            assert_eq!(a, b);
        }
        for (a, b) in mesh.faces.iter().zip(&decoded.faces) {
            assert_eq!(a.indices(), b.indices());
        }
        assert_eq!(decoded.face_normals.len(), decoded.face_count());
    }

    #[test]
    fn test_malformed_lengths_rejected() {
        let err = decode_raw(vec![0.0; 7], vec![]).unwrap_err();
        assert!(matches!(
            err,
            BridgeError::MalformedBuffer { buffer: BufferKind::Vertex, len: 7 }
        ));
        let err = decode_raw(vec![0.0; 9], vec![0, 1]).unwrap_err();
        assert!(matches!(
            err,
            BridgeError::MalformedBuffer { buffer: BufferKind::Face, len: 2 }
        ));
    }

    #[test]
    fn test_decode_rejects_bad_indices() {
        let err = decode_raw(vec![0.0; 9], vec![0, 1, 3]).unwrap_err();
        assert!(matches!(err, BridgeError::IndexOutOfRange { face: 0, index: 3, .. }));
        let err = decode_raw(vec![0.0; 9], vec![0, -1, 2]).unwrap_err();
        assert!(matches!(err, BridgeError::IndexOutOfRange { index: -1, .. }));
    }

    #[test]
    fn test_encode_rejects_invalid_mesh() {
        let mut mesh = Mesh::new();
        mesh.add_point(Point3::origin());
        mesh.add_triangle([0, 1, 2]);
        assert!(matches!(encode(&mesh), Err(BridgeError::IndexOutOfRange { .. })));
    }
}
