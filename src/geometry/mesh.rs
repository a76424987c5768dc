// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Structured mesh representation on the host side of the boundary

use super::BoundingBox;
use crate::error::{BridgeError, Result};
use ahash::AHashMap;
use nalgebra::{Point3, Vector3};
use serde::{Deserialize, Serialize};

/// Vertex with position and normal
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Vertex {
    pub position: Point3<f64>,
    pub normal: Vector3<f64>,
}

impl Vertex {
    pub fn new(position: Point3<f64>, normal: Vector3<f64>) -> Self {
        Self { position, normal }
    }

    /// Vertex at a position, normal left at +Z until normals are recomputed
    pub fn at(position: Point3<f64>) -> Self {
        Self::new(position, Vector3::z())
    }
}

/// Mesh face: a triangle or a quad, defined by vertex indices
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Face {
    Triangle([usize; 3]),
    Quad([usize; 4]),
}

impl Face {
    /// Vertex indices of this face in winding order
    pub fn indices(&self) -> &[usize] {
        match self {
            Face::Triangle(indices) => indices,
            Face::Quad(indices) => indices,
        }
    }

    pub fn is_triangle(&self) -> bool {
        matches!(self, Face::Triangle(_))
    }

    /// Split into triangles: quad (a, b, c, d) becomes (a, b, c) and (a, c, d)
    pub fn triangles(&self) -> Vec<[usize; 3]> {
        match *self {
            Face::Triangle(t) => vec![t],
            Face::Quad([a, b, c, d]) => vec![[a, b, c], [a, c, d]],
        }
    }

    fn remap(&self, map: &[usize]) -> Face {
        match *self {
            Face::Triangle([a, b, c]) => Face::Triangle([map[a], map[b], map[c]]),
            Face::Quad([a, b, c, d]) => Face::Quad([map[a], map[b], map[c], map[d]]),
        }
    }
}

/// Polygon mesh with derived vertex and face normals
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Mesh {
    pub vertices: Vec<Vertex>,
    pub faces: Vec<Face>,
    /// One unit normal per face, valid after `recompute_normals`
    pub face_normals: Vec<Vector3<f64>>,
}

impl Mesh {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(vertex_count: usize, face_count: usize) -> Self {
        Self {
            vertices: Vec::with_capacity(vertex_count),
            faces: Vec::with_capacity(face_count),
            face_normals: Vec::new(),
        }
    }

    /// Build a mesh from positions and triangles, computing normals
    pub fn from_triangles(points: &[Point3<f64>], triangles: &[[usize; 3]]) -> Self {
        let mut mesh = Self::with_capacity(points.len(), triangles.len());
        for point in points {
            mesh.add_point(*point);
        }
        for triangle in triangles {
            mesh.add_triangle(*triangle);
        }
        mesh.recompute_normals();
        mesh
    }

    /// Add a vertex and return its index
    pub fn add_vertex(&mut self, vertex: Vertex) -> usize {
        let index = self.vertices.len();
        self.vertices.push(vertex);
        index
    }

    /// Add a vertex at a position and return its index
    pub fn add_point(&mut self, position: Point3<f64>) -> usize {
        self.add_vertex(Vertex::at(position))
    }

    pub fn add_triangle(&mut self, indices: [usize; 3]) {
        self.faces.push(Face::Triangle(indices));
    }

    pub fn add_quad(&mut self, indices: [usize; 4]) {
        self.faces.push(Face::Quad(indices));
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn face_count(&self) -> usize {
        self.faces.len()
    }

    /// A mesh is empty when it has no faces
    pub fn is_empty(&self) -> bool {
        self.faces.is_empty()
    }

    pub fn positions(&self) -> impl Iterator<Item = Point3<f64>> + '_ {
        self.vertices.iter().map(|v| v.position)
    }

    /// Compute bounding box
    pub fn bounding_box(&self) -> BoundingBox {
        BoundingBox::from_points(self.positions())
    }

    /// Check that every face index refers to an existing vertex
    pub fn validate(&self) -> Result<()> {
        let vertex_count = self.vertices.len();
        for (face, f) in self.faces.iter().enumerate() {
            if let Some(&index) = f.indices().iter().find(|&&i| i >= vertex_count) {
                return Err(BridgeError::IndexOutOfRange {
                    face,
                    index: index as i64,
                    vertex_count,
                });
            }
        }
        Ok(())
    }

    /// Convert every quad into two triangles, preserving face order
    pub fn triangulate(&mut self) {
        if self.faces.iter().all(Face::is_triangle) {
            return;
        }
        self.faces = self
            .faces
            .iter()
            .flat_map(|f| f.triangles())
            .map(Face::Triangle)
            .collect();
        self.face_normals.clear();
    }

    /// Merge vertices with identical positions.
    /// The first occurrence survives; returns the number of vertices removed.
    pub fn weld_identical(&mut self) -> usize {
        let original_count = self.vertices.len();
        let mut seen: AHashMap<[u64; 3], usize> = AHashMap::with_capacity(original_count);
        let mut new_vertices = Vec::with_capacity(original_count);
        let mut remap = Vec::with_capacity(original_count);

        for vertex in &self.vertices {
            // adding 0.0 folds -0.0 into +0.0
            let p = vertex.position;
            let key = [(p.x + 0.0).to_bits(), (p.y + 0.0).to_bits(), (p.z + 0.0).to_bits()];
            let index = *seen.entry(key).or_insert_with(|| {
                new_vertices.push(*vertex);
                new_vertices.len() - 1
            });
            remap.push(index);
        }

        self.apply_remap(new_vertices, &remap);
        original_count - self.vertices.len()
    }

    /// Weld vertices that are within epsilon distance of each other.
    /// Returns the number of vertices removed.
    pub fn weld_vertices(&mut self, epsilon: f64) -> usize {
        if epsilon <= 0.0 {
            return self.weld_identical();
        }

        let original_count = self.vertices.len();
        let mut new_vertices: Vec<Vertex> = Vec::new();
        let mut remap = Vec::with_capacity(original_count);

        // survivors bucketed into epsilon-sized cells; a match can only be
        // in the same or an adjacent cell
        let cell_of = |p: &Point3<f64>| -> [i64; 3] {
            [
                (p.x / epsilon).floor() as i64,
                (p.y / epsilon).floor() as i64,
                (p.z / epsilon).floor() as i64,
            ]
        };
        let mut grid: AHashMap<[i64; 3], Vec<usize>> = AHashMap::new();

        for vertex in &self.vertices {
            let [cx, cy, cz] = cell_of(&vertex.position);
            let mut existing: Option<usize> = None;
            for dx in -1i64..=1 {
                for dy in -1i64..=1 {
                    for dz in -1i64..=1 {
                        let key = [cx.wrapping_add(dx), cy.wrapping_add(dy), cz.wrapping_add(dz)];
                        let Some(bucket) = grid.get(&key) else { continue };
                        // lowest survivor index wins, as in a front-to-back scan
                        let hit = bucket
                            .iter()
                            .copied()
                            .find(|&i| (new_vertices[i].position - vertex.position).norm() < epsilon);
                        if let Some(i) = hit {
                            existing = Some(existing.map_or(i, |e| e.min(i)));
                        }
                    }
                }
            }
            match existing {
                Some(index) => remap.push(index),
                None => {
                    let index = new_vertices.len();
                    remap.push(index);
                    new_vertices.push(*vertex);
                    grid.entry([cx, cy, cz]).or_default().push(index);
                }
            }
        }

        self.apply_remap(new_vertices, &remap);
        original_count - self.vertices.len()
    }

    fn apply_remap(&mut self, vertices: Vec<Vertex>, remap: &[usize]) {
        if vertices.len() == self.vertices.len() {
            return;
        }
        for face in &mut self.faces {
            *face = face.remap(remap);
        }
        self.vertices = vertices;
    }

    /// Sub-mesh containing only the given faces, with unreferenced
    /// vertices dropped and normals recomputed
    pub fn extract_faces(&self, face_indices: &[usize]) -> Mesh {
        let mut remap: Vec<Option<usize>> = vec![None; self.vertices.len()];
        let mut mesh = Mesh::with_capacity(face_indices.len() * 3, face_indices.len());

        for face in face_indices.iter().filter_map(|&fi| self.faces.get(fi)) {
            let mut map = |i: usize| -> usize {
                *remap[i].get_or_insert_with(|| {
                    mesh.vertices.push(self.vertices[i]);
                    mesh.vertices.len() - 1
                })
            };
            let extracted = match *face {
                Face::Triangle([a, b, c]) => Face::Triangle([map(a), map(b), map(c)]),
                Face::Quad([a, b, c, d]) => Face::Quad([map(a), map(b), map(c), map(d)]),
            };
            mesh.faces.push(extracted);
        }

        mesh.recompute_normals();
        mesh
    }

    /// Area-weighted normal of a face (length is twice the face area for triangles)
    fn face_area_vector(&self, face: &Face) -> Vector3<f64> {
        let p = |i: usize| self.vertices[i].position;
        match *face {
            Face::Triangle([a, b, c]) => (p(b) - p(a)).cross(&(p(c) - p(a))),
            Face::Quad([a, b, c, d]) => (p(c) - p(a)).cross(&(p(d) - p(b))),
        }
    }

    /// Recompute face normals and vertex normals from geometry.
    /// Vertex normals are the area-weighted average of adjacent face normals.
    pub fn recompute_normals(&mut self) {
        let mut normal_sums: Vec<Vector3<f64>> = vec![Vector3::zeros(); self.vertices.len()];
        let mut face_normals = Vec::with_capacity(self.faces.len());

        for face in &self.faces {
            let weighted = self.face_area_vector(face);
            for &idx in face.indices() {
                normal_sums[idx] += weighted;
            }
            face_normals.push(weighted.try_normalize(1e-12).unwrap_or_else(Vector3::zeros));
        }

        for (vertex, sum) in self.vertices.iter_mut().zip(normal_sums) {
            vertex.normal = sum.try_normalize(1e-12).unwrap_or_else(Vector3::z);
        }
        self.face_normals = face_normals;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Primitive;

    #[test]
    fn test_triangulate_quads() {
        let mut mesh = Primitive::unit_box_quads().to_mesh();
        assert_eq!(mesh.face_count(), 6);

        mesh.triangulate();
        assert_eq!(mesh.face_count(), 12);
        assert!(mesh.faces.iter().all(Face::is_triangle));
        assert_eq!(mesh.faces[0], Face::Triangle([0, 3, 2]));
        assert_eq!(mesh.faces[1], Face::Triangle([0, 2, 1]));
    }

    #[test]
    fn test_weld_identical() {
        let mut mesh = Mesh::new();
        let a = mesh.add_point(Point3::new(0.0, 0.0, 0.0));
        let b = mesh.add_point(Point3::new(1.0, 0.0, 0.0));
        let c = mesh.add_point(Point3::new(0.0, 1.0, 0.0));
        let b2 = mesh.add_point(Point3::new(1.0, 0.0, 0.0));
        let d = mesh.add_point(Point3::new(1.0, 1.0, -0.0));
        mesh.add_triangle([a, b, c]);
        mesh.add_triangle([b2, d, c]);

        assert_eq!(mesh.weld_identical(), 1);
        assert_eq!(mesh.vertex_count(), 4);
        assert_eq!(mesh.faces[1], Face::Triangle([1, 3, 2]));
    }

    #[test]
    fn test_weld_vertices_with_tolerance() {
        let mut mesh = Mesh::new();
        mesh.add_point(Point3::new(0.0, 0.0, 0.0));
        mesh.add_point(Point3::new(1e-7, 0.0, 0.0));
        mesh.add_point(Point3::new(1.0, 0.0, 0.0));

        assert_eq!(mesh.weld_vertices(1e-6), 1);
        assert_eq!(mesh.vertex_count(), 2);
    }

    #[test]
    fn test_weld_vertices_across_cells() {
        let mut mesh = Mesh::new();
        let a = mesh.add_point(Point3::new(0.0, 0.0, 0.0));
        let b = mesh.add_point(Point3::new(0.15, 0.0, 0.0));
        // within 0.1 of both survivors, on either side of a cell boundary
        let c = mesh.add_point(Point3::new(0.09, 0.0, 0.0));
        let d = mesh.add_point(Point3::new(0.199, 0.0, 0.0));
        let e = mesh.add_point(Point3::new(0.0, 0.0, 5.0));
        mesh.add_triangle([a, b, e]);
        mesh.add_triangle([c, d, e]);

        assert_eq!(mesh.weld_vertices(0.1), 2);
        assert_eq!(mesh.vertex_count(), 3);
        assert_eq!(mesh.faces[1], Face::Triangle([0, 1, 2]));
    }

    #[test]
    fn test_validate_rejects_out_of_range() {
        let mut mesh = Mesh::new();
        mesh.add_point(Point3::origin());
        mesh.add_triangle([0, 0, 3]);

        match mesh.validate() {
            Err(BridgeError::IndexOutOfRange { face, index, vertex_count }) => {
                assert_eq!((face, index, vertex_count), (0, 3, 1));
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_recompute_normals() {
        let mut mesh = Primitive::unit_box().to_mesh();
        mesh.recompute_normals();

        assert_eq!(mesh.face_normals.len(), 12);
        assert!(mesh.vertices.iter().all(|v| (v.normal.norm() - 1.0).abs() < 1e-9));
        // corner (0,0,0) normal points away from the box
        let corner = mesh.vertices[0].normal;
        assert!(corner.x < 0.0 && corner.y < 0.0 && corner.z < 0.0);
    }

    #[test]
    fn test_extract_faces_compacts_vertices() {
        let mesh = Primitive::unit_box().to_mesh();
        let sub = mesh.extract_faces(&[0, 1]);

        assert_eq!(sub.face_count(), 2);
        assert_eq!(sub.vertex_count(), 4);
        assert!(sub.validate().is_ok());
        assert_eq!(sub.face_normals.len(), 2);
    }
}
