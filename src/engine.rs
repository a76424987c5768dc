// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Native engine selection and call serialization

use crate::ffi::{loopback, NativeApi};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::{Mutex, MutexGuard};
use tracing::debug;

#[cfg(feature = "dynamic")]
use crate::error::Result;
#[cfg(feature = "dynamic")]
use crate::ffi::NativeLibrary;
#[cfg(feature = "dynamic")]
use std::path::Path;

/// Serializes every call into engines not known to be reentrant
static NATIVE_LOCK: Mutex<()> = Mutex::new(());

/// Which engine provides the native ABI
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EngineKind {
    #[default]
    Loopback,
    Dynamic,
}

impl fmt::Display for EngineKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EngineKind::Loopback => write!(f, "loopback"),
            EngineKind::Dynamic => write!(f, "dynamic"),
        }
    }
}

impl std::str::FromStr for EngineKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "loopback" => Ok(EngineKind::Loopback),
            "dynamic" => Ok(EngineKind::Dynamic),
            other => Err(format!("unknown engine '{}'", other)),
        }
    }
}

/// A native engine: its function table and whether it tolerates concurrent calls
pub struct Engine {
    api: NativeApi,
    kind: EngineKind,
    reentrant: bool,
    #[cfg(feature = "dynamic")]
    _library: Option<NativeLibrary>,
}

impl Engine {
    /// The in-process engine
    pub fn loopback() -> Self {
        Self {
            api: loopback::api(),
            kind: EngineKind::Loopback,
            reentrant: true,
            #[cfg(feature = "dynamic")]
            _library: None,
        }
    }

    /// Load the native engine from a shared library.
    ///
    /// Unless `reentrant` is set, every facade call on this engine runs under
    /// the process-wide native lock.
    #[cfg(feature = "dynamic")]
    pub fn load(path: impl AsRef<Path>, reentrant: bool) -> Result<Self> {
        let library = NativeLibrary::open(path)?;
        Ok(Self {
            api: *library.api(),
            kind: EngineKind::Dynamic,
            reentrant,
            _library: Some(library),
        })
    }

    /// Treat this engine as non-reentrant: calls go through the native lock
    pub fn serialized(mut self) -> Self {
        self.reentrant = false;
        self
    }

    pub fn api(&self) -> &NativeApi {
        &self.api
    }

    pub fn kind(&self) -> EngineKind {
        self.kind
    }

    pub fn is_reentrant(&self) -> bool {
        self.reentrant
    }

    /// Take the native lock for one facade call, unless the engine is
    /// reentrant. Hold the guard until every handle of the call is deleted.
    pub fn serialize(&self) -> Option<MutexGuard<'static, ()>> {
        if self.reentrant {
            return None;
        }
        // a panic inside a native call leaves no state behind the lock
        let guard = NATIVE_LOCK.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        debug!(engine = %self.kind, "acquired native lock");
        Some(guard)
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::loopback()
    }
}

impl fmt::Debug for Engine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Engine")
            .field("kind", &self.kind)
            .field("reentrant", &self.reentrant)
            .finish()
    }
}
