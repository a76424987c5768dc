// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Buffer codec and file round-trip tests

use anyhow::Result;
use approx::assert_relative_eq;
use meshbridge::marshal::{decode, encode, encode_points, FaceBuffer, VertexBuffer};
use meshbridge::{io, BridgeConfig, BridgeError, BufferKind, EngineKind, Kernel, Mesh, Primitive};
use nalgebra::Point3;
use rand::{Rng, SeedableRng};
use tempfile::TempDir;

fn random_mesh(rng: &mut impl Rng, vertex_count: usize, face_count: usize) -> Mesh {
    let mut mesh = Mesh::new();
    for _ in 0..vertex_count {
        mesh.add_point(Point3::new(
            rng.gen_range(-100.0..100.0),
            rng.gen_range(-100.0..100.0),
            rng.gen_range(-100.0..100.0),
        ));
    }
    for _ in 0..face_count {
        let mut pick = || rng.gen_range(0..vertex_count);
        let (a, b, c, d) = (pick(), pick(), pick(), pick());
        if rng.gen_bool(0.3) {
            mesh.add_quad([a, b, c, d]);
        } else {
            mesh.add_triangle([a, b, c]);
        }
    }
    mesh
}

#[test]
fn test_codec_preserves_coordinates_and_connectivity() -> Result<()> {
    let mut rng = rand::rngs::StdRng::seed_from_u64(42);

    for _ in 0..10 {
        let mesh = random_mesh(&mut rng, 50, 80);
        let buffers = encode(&mesh)?;
        let decoded = decode(&buffers.vertices, &buffers.faces)?;

        let mut expected = mesh.clone();
        expected.triangulate();

        assert_eq!(decoded.vertex_count(), expected.vertex_count());
        assert_eq!(decoded.face_count(), expected.face_count());
        for (a, b) in expected.positions().zip(decoded.positions()) {
            assert_eq!(a.coords.as_slice(), b.coords.as_slice());
        }
        for (a, b) in expected.faces.iter().zip(&decoded.faces) {
            assert_eq!(a.indices(), b.indices());
        }
    }
    Ok(())
}

#[test]
fn test_point_buffer_layout() {
    let points = [Point3::new(1.0, 2.0, 3.0), Point3::new(-4.0, 5.5, 0.0)];
    let buffer = encode_points(&points);
    assert_eq!(buffer.as_slice(), &[1.0, 2.0, 3.0, -4.0, 5.5, 0.0]);
    assert_eq!(buffer.vertex_count(), 2);
}

#[test]
fn test_malformed_buffers_are_hard_errors() {
    assert!(matches!(
        VertexBuffer::new(vec![1.0, 2.0]),
        Err(BridgeError::MalformedBuffer { buffer: BufferKind::Vertex, len: 2 })
    ));
    assert!(matches!(
        FaceBuffer::new(vec![0, 1, 2, 3]),
        Err(BridgeError::MalformedBuffer { buffer: BufferKind::Face, len: 4 })
    ));
}

#[test]
fn test_stl_file_through_kernel() -> Result<()> {
    let dir = TempDir::new()?;
    let path = dir.path().join("box.stl");
    let source = Primitive::cuboid(Point3::new(0.0, 0.0, 0.0), Point3::new(2.0, 3.0, 4.0)).to_mesh();
    io::export_stl(&source, &path)?;

    let mesh = io::load_stl(&path)?;
    println!("Loaded {} vertices, {} faces", mesh.vertex_count(), mesh.face_count());
    assert_eq!(mesh.face_count(), 12);

    let volume = Kernel::loopback().volume(&mesh)?;
    assert_relative_eq!(volume, 24.0, epsilon = 1e-6);
    Ok(())
}

#[test]
fn test_kernel_from_config_file() -> Result<()> {
    let dir = TempDir::new()?;
    let path = dir.path().join("meshbridge.toml");
    std::fs::write(&path, "engine = \"loopback\"\nboundary_tolerance = 0.01\ntiming = true\n")?;

    let config = BridgeConfig::from_file(&path)?;
    assert_eq!(config.engine, EngineKind::Loopback);
    assert!(config.timing);

    let kernel = Kernel::from_config(&config)?;
    assert_eq!(kernel.options().boundary_tolerance, 0.01);

    // within the configured tolerance of the top face
    let mesh = Primitive::unit_box().to_mesh();
    assert!(kernel.contains_point(&mesh, &Point3::new(0.5, 0.5, 1.005))?);
    assert!(!kernel.contains_point(&mesh, &Point3::new(0.5, 0.5, 1.05))?);
    Ok(())
}

#[cfg(not(feature = "dynamic"))]
#[test]
fn test_dynamic_engine_requires_feature() {
    let config = BridgeConfig {
        engine: EngineKind::Dynamic,
        library_path: Some("/opt/native/libgeometry.so".into()),
        ..Default::default()
    };
    assert!(Kernel::from_config(&config).is_err());
}

#[cfg(feature = "dynamic")]
#[test]
fn test_missing_library_is_fatal() {
    let config = BridgeConfig {
        engine: EngineKind::Dynamic,
        library_path: Some("/nonexistent/libgeometry.so".into()),
        ..Default::default()
    };
    assert!(Kernel::from_config(&config).is_err());
}
