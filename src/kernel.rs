// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Geometry queries answered by the native engine.
//!
//! Every operation follows the same discipline: weld and encode the host
//! mesh, create one native mesh, issue the query, copy out and release every
//! native buffer, then delete the native mesh. Nothing native outlives the
//! call, on success or on error.

use crate::config::BridgeConfig;
use crate::diagnostics::Timed;
use crate::engine::{Engine, EngineKind};
use crate::error::Result;
use crate::ffi::{CentroidKind, ElementKind};
use crate::geometry::{BoundingRegion, Mesh};
use crate::marshal::{self, MeshBuffers, NativeMesh};
use nalgebra::{Point3, Vector3};
use tracing::debug;

/// Tunables applied by the facade around each native call
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KernelOptions {
    /// Vertex weld distance; 0 merges bit-identical positions only
    pub weld_tolerance: f64,
    /// Points at most this far from the surface count as contained
    pub boundary_tolerance: f64,
}

impl Default for KernelOptions {
    fn default() -> Self {
        Self {
            weld_tolerance: 0.0,
            boundary_tolerance: 1e-9,
        }
    }
}

/// Geometry facade over one native engine
#[derive(Debug)]
pub struct Kernel {
    engine: Engine,
    options: KernelOptions,
}

impl Kernel {
    pub fn new(engine: Engine) -> Self {
        Self {
            engine,
            options: KernelOptions::default(),
        }
    }

    /// Kernel backed by the in-process engine
    pub fn loopback() -> Self {
        Self::new(Engine::loopback())
    }

    pub fn with_options(mut self, options: KernelOptions) -> Self {
        self.options = options;
        self
    }

    /// Build the engine and options a configuration describes
    pub fn from_config(config: &BridgeConfig) -> anyhow::Result<Self> {
        let engine = match config.engine {
            EngineKind::Loopback => Engine::loopback(),
            EngineKind::Dynamic => Self::dynamic_engine(config)?,
        };
        Ok(Self::new(engine).with_options(KernelOptions {
            weld_tolerance: config.weld_tolerance,
            boundary_tolerance: config.boundary_tolerance,
        }))
    }

    #[cfg(feature = "dynamic")]
    fn dynamic_engine(config: &BridgeConfig) -> anyhow::Result<Engine> {
        use anyhow::Context;
        let path = config
            .library_path
            .as_ref()
            .context("dynamic engine selected but no library_path configured")?;
        Ok(Engine::load(path, config.native_reentrant)?)
    }

    #[cfg(not(feature = "dynamic"))]
    fn dynamic_engine(_config: &BridgeConfig) -> anyhow::Result<Engine> {
        anyhow::bail!("dynamic engine requested but meshbridge was built without the `dynamic` feature")
    }

    pub fn engine(&self) -> &Engine {
        &self.engine
    }

    pub fn options(&self) -> &KernelOptions {
        &self.options
    }

    /// Welded, triangulated copy of `mesh` and its flat buffers
    fn prepare(&self, mesh: &Mesh) -> Result<(Mesh, MeshBuffers)> {
        // welding remaps indices, so they must be in range first
        mesh.validate()?;
        let mut prepared = mesh.clone();
        let merged = prepared.weld_vertices(self.options.weld_tolerance);
        prepared.triangulate();
        let buffers = marshal::encode(&prepared)?;
        debug!(
            vertices = prepared.vertex_count(),
            faces = prepared.face_count(),
            merged,
            "prepared mesh for native call"
        );
        Ok((prepared, buffers))
    }

    /// Run `f` against a native copy of `buffers`, deleting it afterwards
    fn with_native<T>(&self, buffers: &MeshBuffers, f: impl FnOnce(&NativeMesh<'_>) -> Result<T>) -> Result<T> {
        // declared first so it is released last, after the handle is deleted
        let _lock = self.engine.serialize();
        let handle = NativeMesh::create(self.engine.api(), buffers)?;
        let result = f(&handle);
        handle.delete();
        result
    }

    /// Enclosed volume; 0 for meshes that are not closed
    pub fn volume(&self, mesh: &Mesh) -> Result<f64> {
        let (_, buffers) = self.prepare(mesh)?;
        let volume = self.with_native(&buffers, |native| Ok(native.volume()))?;
        debug!(volume, "computed volume");
        Ok(volume)
    }

    /// Volume with a one-line timing summary
    pub fn volume_with_summary(&self, mesh: &Mesh) -> Result<(f64, String)> {
        let timed = Timed::measure(|| self.volume(mesh)).transpose()?;
        let summary = timed.summary("Volume");
        Ok((timed.value, summary))
    }

    pub fn centroid(&self, mesh: &Mesh, kind: CentroidKind) -> Result<Point3<f64>> {
        let (_, buffers) = self.prepare(mesh)?;
        let centroid = self.with_native(&buffers, |native| Ok(native.centroid(kind)))?;
        debug!(?kind, x = centroid.x, y = centroid.y, z = centroid.z, "computed centroid");
        Ok(centroid)
    }

    /// Point-in-mesh test. Points on the surface (within the boundary
    /// tolerance) are contained.
    pub fn contains_point(&self, mesh: &Mesh, point: &Point3<f64>) -> Result<bool> {
        let (_, buffers) = self.prepare(mesh)?;
        let tolerance = self.options.boundary_tolerance;
        self.with_native(&buffers, |native| {
            if native.closest_point(point, tolerance).is_some() {
                return Ok(true);
            }
            Ok(native.contains(point))
        })
    }

    /// Indices of the faces of the welded, triangulated mesh inside `region`
    pub fn query_face_indices(&self, mesh: &Mesh, region: &BoundingRegion) -> Result<Vec<usize>> {
        let (_, buffers) = self.prepare(mesh)?;
        self.with_native(&buffers, |native| native.query(region, ElementKind::Face))
    }

    /// Sub-mesh of the faces inside `region`; an empty mesh when none match
    pub fn query_faces(&self, mesh: &Mesh, region: &BoundingRegion) -> Result<Mesh> {
        let (prepared, buffers) = self.prepare(mesh)?;
        let indices = self.with_native(&buffers, |native| native.query(region, ElementKind::Face))?;
        debug!(matched = indices.len(), "face query");
        Ok(prepared.extract_faces(&indices))
    }

    /// Indices of the welded vertices inside `region`
    pub fn query_vertex_indices(&self, mesh: &Mesh, region: &BoundingRegion) -> Result<Vec<usize>> {
        let (_, buffers) = self.prepare(mesh)?;
        self.with_native(&buffers, |native| native.query(region, ElementKind::Vertex))
    }

    /// Positions of the vertices inside `region`; empty when none match
    pub fn query_vertices(&self, mesh: &Mesh, region: &BoundingRegion) -> Result<Vec<Point3<f64>>> {
        let (prepared, buffers) = self.prepare(mesh)?;
        let indices = self.with_native(&buffers, |native| native.query(region, ElementKind::Vertex))?;
        debug!(matched = indices.len(), "vertex query");
        Ok(indices.into_iter().map(|i| prepared.vertices[i].position).collect())
    }

    /// Convex hull over the points in their given order.
    ///
    /// The hull mesh keeps every input point as a vertex, duplicates included;
    /// its triangles reference them by input index.
    pub fn convex_hull(&self, points: &[Point3<f64>]) -> Result<Timed<Mesh>> {
        Timed::measure(|| {
            let coords = marshal::encode_points(points);
            let faces = {
                let _lock = self.engine.serialize();
                marshal::convex_hull(self.engine.api(), &coords)?
            };
            debug!(points = points.len(), faces = faces.face_count(), "built convex hull");
            marshal::decode(&coords, &faces)
        })
        .transpose()
    }

    /// Part of the mesh behind the plane through `point` with `normal`
    pub fn clip_with_plane(&self, mesh: &Mesh, point: &Point3<f64>, normal: &Vector3<f64>) -> Result<Mesh> {
        let (_, buffers) = self.prepare(mesh)?;
        let data = self.with_native(&buffers, |native| {
            let clipped = native.clip(point, normal)?;
            let data = clipped.data();
            clipped.delete();
            data
        })?;
        marshal::decode(&data.vertices, &data.faces)
    }

    /// Closest surface point within `search_distance`, `None` on a miss
    pub fn closest_point(
        &self,
        mesh: &Mesh,
        point: &Point3<f64>,
        search_distance: f64,
    ) -> Result<Option<Point3<f64>>> {
        let (_, buffers) = self.prepare(mesh)?;
        self.with_native(&buffers, |native| Ok(native.closest_point(point, search_distance)))
    }

    /// Copy the mesh through the native engine and back
    pub fn round_trip(&self, mesh: &Mesh) -> Result<Mesh> {
        let (_, buffers) = self.prepare(mesh)?;
        let data = self.with_native(&buffers, |native| native.data())?;
        marshal::decode(&data.vertices, &data.faces)
    }
}

impl Default for Kernel {
    fn default() -> Self {
        Self::loopback()
    }
}
