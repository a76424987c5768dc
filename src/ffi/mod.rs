// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Native engine ABI and the engines that provide it

pub mod abi;
#[cfg(feature = "dynamic")]
pub mod library;
pub mod loopback;

pub use abi::{CentroidKind, ElementKind, NativeApi, RawMesh, SYMBOLS, UNSET_COORDINATE};
#[cfg(feature = "dynamic")]
pub use library::NativeLibrary;
