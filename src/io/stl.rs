// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! STL import and export

use crate::geometry::Mesh;
use anyhow::{Context, Result};
use nalgebra::Point3;
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

/// Read an ASCII or binary STL file.
///
/// Corners shared between facets become shared vertices; normals are
/// recomputed from the geometry rather than taken from the file.
pub fn load_stl(path: impl AsRef<Path>) -> Result<Mesh> {
    let path = path.as_ref();
    let mut file = File::open(path).with_context(|| format!("Failed to open STL file: {:?}", path))?;
    let stl = stl_io::read_stl(&mut file).with_context(|| format!("Failed to read STL file: {:?}", path))?;

    let mut mesh = Mesh::with_capacity(stl.vertices.len(), stl.faces.len());
    for v in &stl.vertices {
        mesh.add_point(Point3::new(f64::from(v[0]), f64::from(v[1]), f64::from(v[2])));
    }
    for face in &stl.faces {
        mesh.add_triangle(face.vertices);
    }

    mesh.validate()?;
    mesh.recompute_normals();
    Ok(mesh)
}

/// Write a binary STL file, splitting quads into triangles
pub fn export_stl(mesh: &Mesh, path: impl AsRef<Path>) -> Result<()> {
    use stl_io::{Normal, Triangle as StlTriangle, Vertex as StlVertex};

    let mut triangulated = mesh.clone();
    triangulated.triangulate();
    if triangulated.face_normals.len() != triangulated.face_count() {
        triangulated.recompute_normals();
    }

    let vertex = |i: usize| {
        let p = triangulated.vertices[i].position;
        StlVertex::new([p.x as f32, p.y as f32, p.z as f32])
    };
    let triangles: Vec<StlTriangle> = triangulated
        .faces
        .iter()
        .zip(&triangulated.face_normals)
        .map(|(face, normal)| {
            let [a, b, c] = [face.indices()[0], face.indices()[1], face.indices()[2]];
            StlTriangle {
                normal: Normal::new([normal.x as f32, normal.y as f32, normal.z as f32]),
                vertices: [vertex(a), vertex(b), vertex(c)],
            }
        })
        .collect();

    let path = path.as_ref();
    let file = File::create(path).with_context(|| format!("Failed to create STL file: {:?}", path))?;
    let mut writer = BufWriter::new(file);
    stl_io::write_stl(&mut writer, triangles.iter()).context("Failed to write STL file")?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Primitive;
    use tempfile::TempDir;

    #[test]
    fn test_stl_round_trip_shares_vertices() -> Result<()> {
        let dir = TempDir::new()?;
        let path = dir.path().join("cube.stl");

        export_stl(&Primitive::unit_box_quads().to_mesh(), &path)?;
        let mesh = load_stl(&path)?;

        assert_eq!(mesh.face_count(), 12);
        assert_eq!(mesh.vertex_count(), 8);
        Ok(())
    }

    #[test]
    fn test_missing_file_is_error() {
        assert!(load_stl("/nonexistent/mesh.stl").is_err());
    }
}
