// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Behavioral specs for the `bloodline` binary.
//!
//! The spec files under `cli/` are registered as `[[test]]` targets of the
//! `bloodline` crate so they can run the built binary. Each file is
//! self-contained.
