// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! File naming and image file output.

pub mod formats;
pub mod naming;
pub mod writer;
