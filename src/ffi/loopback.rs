// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! In-process engine exposing the native C ABI.
//!
//! The loopback engine answers every entry point of [`NativeApi`] from Rust so
//! the boundary can be exercised without the shared library. It mirrors the
//! native engine's allocation behaviour: output arrays and mesh objects are
//! heap allocations handed across the boundary as raw pointers, and each one
//! must come back through the matching delete or release call. Every live
//! allocation is tracked in a registry, which makes leaks and double frees
//! observable through [`outstanding_allocations`].

use super::abi::{CentroidKind, ElementKind, NativeApi, RawMesh, UNSET_COORDINATE};
use crate::geometry::BoundingBox;
use ahash::AHashMap;
use chull::ConvexHullWrapper;
use dashmap::DashMap;
use nalgebra::{Point3, Vector3};
use std::f64::consts::PI;
use std::ffi::c_int;
use std::ptr;
use std::sync::OnceLock;
use tracing::{error, trace, warn};

/// Function table pointing at the loopback implementation
pub fn api() -> NativeApi {
    NativeApi {
        mesh_create,
        mesh_delete,
        mesh_get_data,
        mesh_volume,
        mesh_centroid,
        mesh_query_box,
        mesh_query_sphere,
        mesh_contains_point,
        mesh_clip_with_plane,
        mesh_closest_point,
        convex_hull_create,
        release_int,
        release_double,
    }
}

/// Number of loopback allocations (meshes and arrays) not yet released
pub fn outstanding_allocations() -> usize {
    registry().len()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Allocation {
    Mesh,
    Ints(usize),
    Doubles(usize),
}

fn registry() -> &'static DashMap<usize, Allocation> {
    static REGISTRY: OnceLock<DashMap<usize, Allocation>> = OnceLock::new();
    REGISTRY.get_or_init(DashMap::new)
}

/// Element types the loopback engine hands out as arrays
trait Exported: Copy {
    fn allocation(len: usize) -> Allocation;
}

impl Exported for c_int {
    fn allocation(len: usize) -> Allocation {
        Allocation::Ints(len)
    }
}

impl Exported for f64 {
    fn allocation(len: usize) -> Allocation {
        Allocation::Doubles(len)
    }
}

/// Hand a buffer across the boundary. Empty buffers become null.
fn export_array<T: Exported>(values: Vec<T>) -> *mut T {
    if values.is_empty() {
        return ptr::null_mut();
    }
    let len = values.len();
    let raw = Box::into_raw(values.into_boxed_slice()) as *mut T;
    registry().insert(raw as usize, T::allocation(len));
    raw
}

/// Reclaim an array previously returned by `export_array`
unsafe fn release_array<T: Exported>(ptr: *mut T, is_array: bool) {
    if ptr.is_null() {
        return;
    }
    if !is_array {
        warn!(address = ptr as usize, "array released through the scalar path");
    }
    let Some((_, allocation)) = registry().remove(&(ptr as usize)) else {
        error!(address = ptr as usize, "release of unknown or already released array");
        return;
    };
    let len = match allocation {
        Allocation::Ints(len) | Allocation::Doubles(len) if allocation == T::allocation(len) => len,
        other => {
            error!(address = ptr as usize, ?other, "release with mismatched element kind");
            registry().insert(ptr as usize, other);
            return;
        }
    };
    trace!(address = ptr as usize, len, "released array");
    drop(Box::from_raw(ptr::slice_from_raw_parts_mut(ptr, len)));
}

fn export_mesh(mesh: LoopbackMesh) -> *mut RawMesh {
    let raw = Box::into_raw(Box::new(mesh));
    registry().insert(raw as usize, Allocation::Mesh);
    raw.cast()
}

unsafe fn mesh_ref<'a>(mesh: *mut RawMesh) -> Option<&'a LoopbackMesh> {
    if mesh.is_null() || !registry().contains_key(&(mesh as usize)) {
        error!(address = mesh as usize, "call on unknown mesh handle");
        return None;
    }
    mesh.cast::<LoopbackMesh>().as_ref()
}

fn to_c_int(count: usize) -> c_int {
    c_int::try_from(count).unwrap_or(c_int::MAX)
}

unsafe fn write_indices(indices: Vec<usize>, out: *mut *mut c_int, count: *mut c_int) {
    if out.is_null() || count.is_null() {
        return;
    }
    *count = to_c_int(indices.len());
    *out = export_array(indices.into_iter().map(|i| i as c_int).collect());
}

unsafe extern "C" fn mesh_create(
    vertices: *const f64,
    vertex_count: c_int,
    faces: *const c_int,
    face_count: c_int,
) -> *mut RawMesh {
    let (Ok(vertex_count), Ok(face_count)) = (usize::try_from(vertex_count), usize::try_from(face_count)) else {
        return ptr::null_mut();
    };
    if (vertex_count > 0 && vertices.is_null()) || (face_count > 0 && faces.is_null()) {
        return ptr::null_mut();
    }

    let coords = if vertex_count == 0 {
        &[][..]
    } else {
        std::slice::from_raw_parts(vertices, vertex_count * 3)
    };
    let indices = if face_count == 0 {
        &[][..]
    } else {
        std::slice::from_raw_parts(faces, face_count * 3)
    };

    let points = coords
        .chunks_exact(3)
        .map(|c| Point3::new(c[0], c[1], c[2]))
        .collect();
    let mut triangles = Vec::with_capacity(face_count);
    for chunk in indices.chunks_exact(3) {
        let mut triangle = [0usize; 3];
        for (slot, &index) in triangle.iter_mut().zip(chunk) {
            match usize::try_from(index) {
                Ok(i) if i < vertex_count => *slot = i,
                _ => return ptr::null_mut(),
            }
        }
        triangles.push(triangle);
    }

    export_mesh(LoopbackMesh::new(points, triangles))
}

unsafe extern "C" fn mesh_delete(mesh: *mut RawMesh) {
    if mesh.is_null() {
        return;
    }
    match registry().remove(&(mesh as usize)) {
        Some((_, Allocation::Mesh)) => drop(Box::from_raw(mesh.cast::<LoopbackMesh>())),
        Some((address, other)) => {
            error!(address, ?other, "mesh delete called on an array allocation");
            registry().insert(address, other);
        }
        None => error!(address = mesh as usize, "delete of unknown or already deleted mesh"),
    }
}

unsafe extern "C" fn mesh_get_data(
    mesh: *mut RawMesh,
    vertices: *mut *mut f64,
    vertex_count: *mut c_int,
    faces: *mut *mut c_int,
    face_count: *mut c_int,
) {
    if vertices.is_null() || vertex_count.is_null() || faces.is_null() || face_count.is_null() {
        return;
    }
    // outputs are only filled when the caller passes them in empty
    if !(*vertices).is_null() || !(*faces).is_null() {
        return;
    }
    let Some(mesh) = mesh_ref(mesh) else { return };

    let coords: Vec<f64> = mesh.vertices.iter().flat_map(|p| [p.x, p.y, p.z]).collect();
    let indices: Vec<c_int> = mesh.faces.iter().flatten().map(|&i| i as c_int).collect();

    *vertex_count = to_c_int(mesh.vertices.len());
    *face_count = to_c_int(mesh.faces.len());
    *vertices = export_array(coords);
    *faces = export_array(indices);
}

unsafe extern "C" fn mesh_volume(mesh: *mut RawMesh) -> f64 {
    mesh_ref(mesh).map(LoopbackMesh::volume).unwrap_or(0.0)
}

unsafe extern "C" fn mesh_centroid(mesh: *mut RawMesh, kind: c_int, x: *mut f64, y: *mut f64, z: *mut f64) {
    if x.is_null() || y.is_null() || z.is_null() {
        return;
    }
    let Some(mesh) = mesh_ref(mesh) else { return };
    let kind = CentroidKind::from_code(kind).unwrap_or(CentroidKind::VertexBased);
    let centroid = mesh.centroid(kind);
    *x = centroid.x;
    *y = centroid.y;
    *z = centroid.z;
}

unsafe extern "C" fn mesh_query_box(
    mesh: *mut RawMesh,
    bounds: *const f64,
    indices: *mut *mut c_int,
    count: *mut c_int,
    element: c_int,
) {
    let (Some(mesh), Some(element)) = (mesh_ref(mesh), ElementKind::from_code(element)) else {
        return;
    };
    if bounds.is_null() {
        return;
    }
    let mut array = [0.0; 6];
    array.copy_from_slice(std::slice::from_raw_parts(bounds, 6));
    write_indices(mesh.query_box(&BoundingBox::from_array(array), element), indices, count);
}

unsafe extern "C" fn mesh_query_sphere(
    mesh: *mut RawMesh,
    cx: f64,
    cy: f64,
    cz: f64,
    radius: f64,
    indices: *mut *mut c_int,
    count: *mut c_int,
    element: c_int,
) {
    let (Some(mesh), Some(element)) = (mesh_ref(mesh), ElementKind::from_code(element)) else {
        return;
    };
    let found = mesh.query_sphere(&Point3::new(cx, cy, cz), radius, element);
    write_indices(found, indices, count);
}

unsafe extern "C" fn mesh_contains_point(mesh: *mut RawMesh, x: f64, y: f64, z: f64) -> bool {
    mesh_ref(mesh)
        .map(|m| m.contains(&Point3::new(x, y, z)))
        .unwrap_or(false)
}

unsafe extern "C" fn mesh_clip_with_plane(
    mesh: *mut RawMesh,
    point: *const f64,
    normal: *const f64,
) -> *mut RawMesh {
    let Some(mesh) = mesh_ref(mesh) else {
        return ptr::null_mut();
    };
    if point.is_null() || normal.is_null() {
        return ptr::null_mut();
    }
    let point = read_point(point);
    let normal = read_point(normal).coords;
    match mesh.clipped_with_plane(&point, &normal) {
        Some(clipped) => export_mesh(clipped),
        None => ptr::null_mut(),
    }
}

unsafe extern "C" fn mesh_closest_point(
    mesh: *mut RawMesh,
    point: *const f64,
    closest: *mut f64,
    search_distance: f64,
) {
    if point.is_null() || closest.is_null() {
        return;
    }
    let found = mesh_ref(mesh).and_then(|m| m.closest_point(&read_point(point), search_distance));
    let out = std::slice::from_raw_parts_mut(closest, 3);
    match found {
        Some(p) => out.copy_from_slice(&[p.x, p.y, p.z]),
        None => out.fill(UNSET_COORDINATE),
    }
}

unsafe extern "C" fn convex_hull_create(
    coords: *const f64,
    point_count: usize,
    faces: *mut *mut c_int,
    face_count: *mut c_int,
) {
    if faces.is_null() || face_count.is_null() {
        return;
    }
    let points: Vec<Point3<f64>> = if point_count == 0 || coords.is_null() {
        Vec::new()
    } else {
        std::slice::from_raw_parts(coords, point_count * 3)
            .chunks_exact(3)
            .map(|c| Point3::new(c[0], c[1], c[2]))
            .collect()
    };

    let triangles = convex_hull(&points);
    *face_count = to_c_int(triangles.len());
    *faces = export_array(triangles.into_iter().flatten().map(|i| i as c_int).collect());
}

unsafe extern "C" fn release_int(ptr: *mut c_int, is_array: bool) {
    release_array(ptr, is_array);
}

unsafe extern "C" fn release_double(ptr: *mut f64, is_array: bool) {
    release_array(ptr, is_array);
}

unsafe fn read_point(ptr: *const f64) -> Point3<f64> {
    let c = std::slice::from_raw_parts(ptr, 3);
    Point3::new(c[0], c[1], c[2])
}

/// Hull triangles indexing the first occurrence of each hull point in `points`
fn convex_hull(points: &[Point3<f64>]) -> Vec<[usize; 3]> {
    if points.len() < 4 {
        return Vec::new();
    }
    let input: Vec<Vec<f64>> = points.iter().map(|p| vec![p.x, p.y, p.z]).collect();
    let hull = match ConvexHullWrapper::try_new(&input, None) {
        Ok(hull) => hull,
        Err(e) => {
            warn!(error = ?e, points = points.len(), "convex hull of degenerate input");
            return Vec::new();
        }
    };
    let (hull_vertices, hull_indices) = hull.vertices_indices();

    let mut first_index: AHashMap<[u64; 3], usize> = AHashMap::with_capacity(points.len());
    for (i, p) in points.iter().enumerate() {
        first_index.entry(point_key(p)).or_insert(i);
    }
    let input_index: Vec<usize> = hull_vertices
        .iter()
        .map(|v| {
            let p = Point3::new(v[0], v[1], v[2]);
            first_index
                .get(&point_key(&p))
                .copied()
                .unwrap_or_else(|| nearest_point(points, &p))
        })
        .collect();

    hull_indices
        .chunks_exact(3)
        .map(|t| [input_index[t[0]], input_index[t[1]], input_index[t[2]]])
        .collect()
}

fn point_key(p: &Point3<f64>) -> [u64; 3] {
    [(p.x + 0.0).to_bits(), (p.y + 0.0).to_bits(), (p.z + 0.0).to_bits()]
}

fn nearest_point(points: &[Point3<f64>], target: &Point3<f64>) -> usize {
    points
        .iter()
        .enumerate()
        .min_by(|(_, a), (_, b)| (*a - target).norm_squared().total_cmp(&(*b - target).norm_squared()))
        .map(|(i, _)| i)
        .unwrap_or(0)
}

/// Native-side mesh object
struct LoopbackMesh {
    vertices: Vec<Point3<f64>>,
    faces: Vec<[usize; 3]>,
    is_solid: bool,
}

impl LoopbackMesh {
    fn new(vertices: Vec<Point3<f64>>, faces: Vec<[usize; 3]>) -> Self {
        let mut edge_faces: AHashMap<(usize, usize), usize> = AHashMap::new();
        for face in &faces {
            for k in 0..3 {
                let (p, q) = (face[k], face[(k + 1) % 3]);
                *edge_faces.entry((p.min(q), p.max(q))).or_insert(0) += 1;
            }
        }
        let is_solid = !faces.is_empty() && edge_faces.values().all(|&count| count == 2);

        Self {
            vertices,
            faces,
            is_solid,
        }
    }

    fn bounds(&self) -> BoundingBox {
        BoundingBox::from_points(self.vertices.iter().copied())
    }

    fn face_bounds(&self, face: &[usize; 3]) -> BoundingBox {
        BoundingBox::from_points(face.iter().map(|&i| self.vertices[i]))
    }

    fn triangle(&self, face: &[usize; 3]) -> [Point3<f64>; 3] {
        [self.vertices[face[0]], self.vertices[face[1]], self.vertices[face[2]]]
    }

    /// Signed tetrahedron volumes about the bounding-box centre, with the
    /// matching tetrahedron centres
    fn tetrahedra(&self) -> impl Iterator<Item = (f64, Point3<f64>)> + '_ {
        let reference = self.bounds().center();
        self.faces.iter().map(move |face| {
            let [a, b, c] = self.triangle(face);
            let (ja, jb, jc) = (a - reference, b - reference, c - reference);
            let volume = ja.dot(&jb.cross(&jc)) / 6.0;
            let center = Point3::from((a.coords + b.coords + c.coords + reference.coords) * 0.25);
            (volume, center)
        })
    }

    fn volume(&self) -> f64 {
        if !self.is_solid {
            return 0.0;
        }
        self.tetrahedra().map(|(volume, _)| volume).sum()
    }

    fn centroid(&self, kind: CentroidKind) -> Point3<f64> {
        match kind {
            CentroidKind::VertexBased => weighted_average(self.vertices.iter().map(|&v| (1.0, v))),
            CentroidKind::AreaBased => weighted_average(self.faces.iter().map(|face| {
                let [a, b, c] = self.triangle(face);
                let area = (b - a).cross(&(c - a)).norm() * 0.5;
                (area, Point3::from((a.coords + b.coords + c.coords) / 3.0))
            })),
            CentroidKind::VolumeBased => weighted_average(self.tetrahedra()),
        }
    }

    /// Generalized winding number test
    fn contains(&self, point: &Point3<f64>) -> bool {
        let solid_angle: f64 = self
            .faces
            .iter()
            .map(|face| {
                let [a, b, c] = self.triangle(face);
                let (a, b, c) = (a - point, b - point, c - point);
                let (la, lb, lc) = (a.norm(), b.norm(), c.norm());
                let numerator = a.dot(&b.cross(&c));
                let denominator = la * lb * lc + a.dot(&b) * lc + a.dot(&c) * lb + b.dot(&c) * la;
                2.0 * numerator.atan2(denominator)
            })
            .sum();
        (solid_angle / (4.0 * PI)).abs() > 0.5
    }

    fn query_box(&self, query: &BoundingBox, element: ElementKind) -> Vec<usize> {
        match element {
            ElementKind::Vertex => (0..self.vertices.len())
                .filter(|&i| query.contains_point(&self.vertices[i]))
                .collect(),
            ElementKind::Face => (0..self.faces.len())
                .filter(|&i| query.intersects(&self.face_bounds(&self.faces[i])))
                .collect(),
        }
    }

    fn query_sphere(&self, center: &Point3<f64>, radius: f64, element: ElementKind) -> Vec<usize> {
        match element {
            ElementKind::Vertex => (0..self.vertices.len())
                .filter(|&i| (self.vertices[i] - center).norm() < radius)
                .collect(),
            ElementKind::Face => (0..self.faces.len())
                .filter(|&i| self.face_bounds(&self.faces[i]).distance_to(center) < radius)
                .collect(),
        }
    }

    /// Part of the mesh behind the plane, i.e. on the side opposite its normal
    fn clipped_with_plane(&self, point: &Point3<f64>, normal: &Vector3<f64>) -> Option<LoopbackMesh> {
        let unit = normal.try_normalize(0.0)?;
        let distances: Vec<f64> = self.vertices.iter().map(|v| (v - point).dot(&unit)).collect();

        #[derive(Hash, PartialEq, Eq, Clone, Copy)]
        enum Key {
            Vertex(usize),
            Edge(usize, usize),
        }

        let mut remap: AHashMap<Key, usize> = AHashMap::new();
        let mut vertices = Vec::new();
        let mut faces = Vec::new();

        for face in &self.faces {
            let mut polygon = Vec::with_capacity(4);
            for k in 0..3 {
                let (p, q) = (face[k], face[(k + 1) % 3]);
                let (dp, dq) = (distances[p], distances[q]);
                if dp <= 0.0 {
                    polygon.push(Key::Vertex(p));
                }
                if dp * dq < 0.0 {
                    polygon.push(Key::Edge(p.min(q), p.max(q)));
                }
            }
            if polygon.len() < 3 {
                continue;
            }

            let mut index_of = |key: Key| -> usize {
                *remap.entry(key).or_insert_with(|| {
                    let position = match key {
                        Key::Vertex(i) => self.vertices[i],
                        Key::Edge(p, q) => {
                            let t = distances[p] / (distances[p] - distances[q]);
                            self.vertices[p] + (self.vertices[q] - self.vertices[p]) * t
                        }
                    };
                    vertices.push(position);
                    vertices.len() - 1
                })
            };
            let indices: Vec<usize> = polygon.into_iter().map(&mut index_of).collect();
            for k in 1..indices.len() - 1 {
                faces.push([indices[0], indices[k], indices[k + 1]]);
            }
        }

        Some(LoopbackMesh::new(vertices, faces))
    }

    fn closest_point(&self, point: &Point3<f64>, search_distance: f64) -> Option<Point3<f64>> {
        let candidates: Box<dyn Iterator<Item = Point3<f64>> + '_> = if self.faces.is_empty() {
            Box::new(self.vertices.iter().copied())
        } else {
            Box::new(self.faces.iter().map(|face| {
                let [a, b, c] = self.triangle(face);
                closest_point_on_triangle(point, &a, &b, &c)
            }))
        };
        candidates
            .map(|candidate| ((candidate - point).norm(), candidate))
            .filter(|(distance, _)| *distance <= search_distance)
            .min_by(|(da, _), (db, _)| da.total_cmp(db))
            .map(|(_, candidate)| candidate)
    }
}

fn weighted_average(items: impl Iterator<Item = (f64, Point3<f64>)>) -> Point3<f64> {
    let (total, sum) = items.fold((0.0, Vector3::zeros()), |(total, sum), (weight, point)| {
        (total + weight, sum + point.coords * weight)
    });
    if total == 0.0 {
        return Point3::origin();
    }
    Point3::from(sum / total)
}

/// Closest point on triangle `abc` (Ericson, Real-Time Collision Detection 5.1.5)
fn closest_point_on_triangle(
    p: &Point3<f64>,
    a: &Point3<f64>,
    b: &Point3<f64>,
    c: &Point3<f64>,
) -> Point3<f64> {
    let ab = b - a;
    let ac = c - a;
    let ap = p - a;
    let d1 = ab.dot(&ap);
    let d2 = ac.dot(&ap);
    if d1 <= 0.0 && d2 <= 0.0 {
        return *a;
    }

    let bp = p - b;
    let d3 = ab.dot(&bp);
    let d4 = ac.dot(&bp);
    if d3 >= 0.0 && d4 <= d3 {
        return *b;
    }

    let vc = d1 * d4 - d3 * d2;
    if vc <= 0.0 && d1 >= 0.0 && d3 <= 0.0 {
        return a + ab * (d1 / (d1 - d3));
    }

    let cp = p - c;
    let d5 = ab.dot(&cp);
    let d6 = ac.dot(&cp);
    if d6 >= 0.0 && d5 <= d6 {
        return *c;
    }

    let vb = d5 * d2 - d1 * d6;
    if vb <= 0.0 && d2 >= 0.0 && d6 <= 0.0 {
        return a + ac * (d2 / (d2 - d6));
    }

    let va = d3 * d6 - d5 * d4;
    if va <= 0.0 && (d4 - d3) >= 0.0 && (d5 - d6) >= 0.0 {
        return b + (c - b) * ((d4 - d3) / ((d4 - d3) + (d5 - d6)));
    }

    let denom = 1.0 / (va + vb + vc);
    a + ab * (vb * denom) + ac * (vc * denom)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_cube() -> LoopbackMesh {
        let mesh = crate::geometry::Primitive::unit_box().to_mesh();
        let faces = mesh
            .faces
            .iter()
            .map(|f| [f.indices()[0], f.indices()[1], f.indices()[2]])
            .collect();
        LoopbackMesh::new(mesh.positions().collect(), faces)
    }

    #[test]
    fn test_cube_volume_and_solidity() {
        let cube = unit_cube();
        assert!(cube.is_solid);
        assert!((cube.volume() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_open_mesh_has_zero_volume() {
        let mut cube = unit_cube();
        cube.faces.pop();
        let open = LoopbackMesh::new(cube.vertices.clone(), cube.faces.clone());
        assert!(!open.is_solid);
        assert_eq!(open.volume(), 0.0);
    }

    #[test]
    fn test_centroids_of_cube() {
        let cube = unit_cube();
        for kind in CentroidKind::ALL {
            let c = cube.centroid(kind);
            assert!((c - Point3::new(0.5, 0.5, 0.5)).norm() < 1e-9, "{:?} gave {}", kind, c);
        }
    }

    #[test]
    fn test_winding_number_containment() {
        let cube = unit_cube();
        assert!(cube.contains(&Point3::new(0.5, 0.5, 0.5)));
        assert!(cube.contains(&Point3::new(0.01, 0.99, 0.5)));
        assert!(!cube.contains(&Point3::new(5.0, 5.0, 5.0)));
        assert!(!cube.contains(&Point3::new(1.01, 0.5, 0.5)));
    }

    #[test]
    fn test_clip_keeps_back_half() {
        let cube = unit_cube();
        let clipped = cube
            .clipped_with_plane(&Point3::new(0.5, 0.5, 0.5), &Vector3::new(0.0, 0.0, 1.0))
            .unwrap();
        assert!(!clipped.faces.is_empty());
        assert!(clipped.vertices.iter().all(|v| v.z <= 0.5 + 1e-12));
        // open at the cut, so no volume
        assert!(!clipped.is_solid);
    }

    #[test]
    fn test_closest_point_respects_search_distance() {
        let cube = unit_cube();
        let target = Point3::new(0.5, 0.5, 2.0);
        let found = cube.closest_point(&target, 5.0).unwrap();
        assert!((found - Point3::new(0.5, 0.5, 1.0)).norm() < 1e-12);
        assert!(cube.closest_point(&target, 0.5).is_none());
    }

    #[test]
    fn test_hull_of_tetrahedron_references_inputs() {
        let points = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
            Point3::new(0.0, 0.0, 1.0),
        ];
        let faces = convex_hull(&points);
        assert_eq!(faces.len(), 4);
        let mut used: Vec<usize> = faces.iter().flatten().copied().collect();
        used.sort_unstable();
        used.dedup();
        assert_eq!(used, vec![0, 1, 2, 3]);
    }

    #[test]
    fn test_release_of_unknown_pointer_is_ignored() {
        let mut value: c_int = 7;
        unsafe { release_int(&mut value, true) };
        assert_eq!(value, 7);
    }
}
