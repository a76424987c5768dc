// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Closed primitive solids with shared vertices and outward winding

use super::Mesh;
use nalgebra::Point3;
use std::f64::consts::PI;

/// Geometric primitives
pub enum Primitive {
    Box { min: Point3<f64>, max: Point3<f64>, quads: bool },
    Tetrahedron,
    Sphere { r: f64, segments: usize },
    Cylinder { h: f64, r: f64, segments: usize },
}

impl Primitive {
    /// Axis-aligned box made of 12 triangles
    pub fn cuboid(min: Point3<f64>, max: Point3<f64>) -> Self {
        Self::Box { min, max, quads: false }
    }

    /// Axis-aligned box made of 6 quads
    pub fn cuboid_quads(min: Point3<f64>, max: Point3<f64>) -> Self {
        Self::Box { min, max, quads: true }
    }

    /// Unit cube spanning (0,0,0)..(1,1,1): 8 vertices, 12 triangles
    pub fn unit_box() -> Self {
        Self::cuboid(Point3::origin(), Point3::new(1.0, 1.0, 1.0))
    }

    /// Unit cube built from quads
    pub fn unit_box_quads() -> Self {
        Self::cuboid_quads(Point3::origin(), Point3::new(1.0, 1.0, 1.0))
    }

    /// Tetrahedron on the origin and the three unit axis points
    pub fn tetrahedron() -> Self {
        Self::Tetrahedron
    }

    pub fn sphere(r: f64, segments: usize) -> Self {
        Self::Sphere { r, segments: segments.max(4) }
    }

    pub fn cylinder(h: f64, r: f64, segments: usize) -> Self {
        Self::Cylinder { h, r, segments: segments.max(3) }
    }

    pub fn to_mesh(&self) -> Mesh {
        match self {
            Self::Box { min, max, quads } => generate_box_mesh(min, max, *quads),
            Self::Tetrahedron => generate_tetrahedron_mesh(),
            Self::Sphere { r, segments } => generate_sphere_mesh(*r, *segments),
            Self::Cylinder { h, r, segments } => generate_cylinder_mesh(*h, *r, *segments),
        }
    }
}

const BOX_QUADS: [[usize; 4]; 6] = [
    [0, 3, 2, 1], // bottom (z-)
    [4, 5, 6, 7], // top (z+)
    [0, 1, 5, 4], // front (y-)
    [3, 7, 6, 2], // back (y+)
    [0, 4, 7, 3], // left (x-)
    [1, 2, 6, 5], // right (x+)
];

fn generate_box_mesh(min: &Point3<f64>, max: &Point3<f64>, quads: bool) -> Mesh {
    let mut mesh = Mesh::with_capacity(8, if quads { 6 } else { 12 });

    for z in [min.z, max.z] {
        mesh.add_point(Point3::new(min.x, min.y, z));
        mesh.add_point(Point3::new(max.x, min.y, z));
        mesh.add_point(Point3::new(max.x, max.y, z));
        mesh.add_point(Point3::new(min.x, max.y, z));
    }

    for quad in BOX_QUADS {
        mesh.add_quad(quad);
    }
    if !quads {
        mesh.triangulate();
    }

    mesh.recompute_normals();
    mesh
}

fn generate_tetrahedron_mesh() -> Mesh {
    Mesh::from_triangles(
        &[
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
            Point3::new(0.0, 0.0, 1.0),
        ],
        &[[0, 2, 1], [0, 1, 3], [0, 3, 2], [1, 2, 3]],
    )
}

fn generate_sphere_mesh(radius: f64, segments: usize) -> Mesh {
    let slices = segments;
    let stacks = (segments / 2).max(2);
    let mut mesh = Mesh::with_capacity(2 + (stacks - 1) * slices, 2 * slices * (stacks - 1));

    let top = mesh.add_point(Point3::new(0.0, 0.0, radius));
    for i in 1..stacks {
        let phi = PI * i as f64 / stacks as f64;
        for j in 0..slices {
            let theta = 2.0 * PI * j as f64 / slices as f64;
            mesh.add_point(Point3::new(
                radius * phi.sin() * theta.cos(),
                radius * phi.sin() * theta.sin(),
                radius * phi.cos(),
            ));
        }
    }
    let bottom = mesh.add_point(Point3::new(0.0, 0.0, -radius));

    let ring = |i: usize, j: usize| 1 + (i - 1) * slices + j % slices;

    for j in 0..slices {
        mesh.add_triangle([top, ring(1, j), ring(1, j + 1)]);
    }
    for i in 1..stacks - 1 {
        for j in 0..slices {
            let (a, b) = (ring(i, j), ring(i + 1, j));
            let (c, d) = (ring(i + 1, j + 1), ring(i, j + 1));
            mesh.add_triangle([a, b, c]);
            mesh.add_triangle([a, c, d]);
        }
    }
    for j in 0..slices {
        mesh.add_triangle([bottom, ring(stacks - 1, j + 1), ring(stacks - 1, j)]);
    }

    mesh.recompute_normals();
    mesh
}

fn generate_cylinder_mesh(height: f64, radius: f64, segments: usize) -> Mesh {
    let mut mesh = Mesh::with_capacity(2 + 2 * segments, 4 * segments);

    let bottom_center = mesh.add_point(Point3::new(0.0, 0.0, 0.0));
    let top_center = mesh.add_point(Point3::new(0.0, 0.0, height));

    let mut bottom = Vec::with_capacity(segments);
    let mut top = Vec::with_capacity(segments);
    for i in 0..segments {
        let angle = 2.0 * PI * i as f64 / segments as f64;
        let (sin, cos) = angle.sin_cos();
        bottom.push(mesh.add_point(Point3::new(radius * cos, radius * sin, 0.0)));
        top.push(mesh.add_point(Point3::new(radius * cos, radius * sin, height)));
    }

    for i in 0..segments {
        let next = (i + 1) % segments;
        mesh.add_triangle([bottom_center, bottom[next], bottom[i]]);
        mesh.add_triangle([top_center, top[i], top[next]]);
        mesh.add_triangle([bottom[i], bottom[next], top[i]]);
        mesh.add_triangle([top[i], bottom[next], top[next]]);
    }

    mesh.recompute_normals();
    mesh
}
