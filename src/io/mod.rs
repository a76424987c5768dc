// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! I/O module - mesh files read and written by the CLI

mod stl;

pub use stl::{export_stl, load_stl};
