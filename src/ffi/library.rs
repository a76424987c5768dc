// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Dynamically loaded native engine

use super::abi::{NativeApi, SYMBOLS};
use crate::error::{BridgeError, Result};
use libloading::Library;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Shared library together with the function table resolved from it.
///
/// The function pointers in `api` are only valid while `library` is loaded,
/// so the two are kept together and dropped together.
pub struct NativeLibrary {
    api: NativeApi,
    path: PathBuf,
    _library: Library,
}

impl NativeLibrary {
    /// Load the library at `path` and resolve every native entry point
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        // SAFETY: loading runs the library's initializers; the native engine
        // has no initialization side effects beyond its own statics.
        let library = unsafe { Library::new(&path) }.map_err(|e| load_error(&path, e.to_string()))?;

        let api = NativeApi {
            mesh_create: resolve(&library, &path, SYMBOLS[0])?,
            mesh_delete: resolve(&library, &path, SYMBOLS[1])?,
            mesh_get_data: resolve(&library, &path, SYMBOLS[2])?,
            mesh_volume: resolve(&library, &path, SYMBOLS[3])?,
            mesh_centroid: resolve(&library, &path, SYMBOLS[4])?,
            mesh_query_box: resolve(&library, &path, SYMBOLS[5])?,
            mesh_query_sphere: resolve(&library, &path, SYMBOLS[6])?,
            mesh_contains_point: resolve(&library, &path, SYMBOLS[7])?,
            mesh_clip_with_plane: resolve(&library, &path, SYMBOLS[8])?,
            mesh_closest_point: resolve(&library, &path, SYMBOLS[9])?,
            convex_hull_create: resolve(&library, &path, SYMBOLS[10])?,
            release_int: resolve(&library, &path, SYMBOLS[11])?,
            release_double: resolve(&library, &path, SYMBOLS[12])?,
        };

        debug!(path = %path.display(), "loaded native geometry library");
        Ok(Self {
            api,
            path,
            _library: library,
        })
    }

    pub fn api(&self) -> &NativeApi {
        &self.api
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

fn resolve<T: Copy>(library: &Library, path: &Path, name: &str) -> Result<T> {
    let mut symbol = name.as_bytes().to_vec();
    symbol.push(0);
    // SAFETY: `T` is the fn-pointer type declared for this symbol in `abi`.
    unsafe { library.get::<T>(&symbol) }
        .map(|s| *s)
        .map_err(|e| load_error(path, format!("missing symbol {}: {}", name, e)))
}

fn load_error(path: &Path, reason: String) -> BridgeError {
    BridgeError::LibraryLoad {
        path: path.display().to_string(),
        reason,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_library_is_load_error() {
        let result = NativeLibrary::open("/nonexistent/libmeshbridge_native.so");
        match result {
            Err(BridgeError::LibraryLoad { path, .. }) => assert!(path.contains("nonexistent")),
            Err(other) => panic!("unexpected error: {}", other),
            Ok(_) => panic!("loading a missing library succeeded"),
        }
    }
}
