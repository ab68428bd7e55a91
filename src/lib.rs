//! # dust-builder - Build and test orchestrator for Dust
//!
//! Compiles the Dust sources with a native C compiler, optionally spreading the
//! compilation units across several compiler processes, and runs the Dust test
//! binary, turning its line protocol into a pass/fail report.
//!
//! ## Usage
//!
//! ```bash
//! # Build with 4 compiler processes at -O2
//! dust-build build -j4 -O2
//!
//! # Build and run the test binary
//! dust-build test
//! ```
//!
//! ## Module Organization
//!
//! - [`config`] - Flag parsing into an immutable build configuration
//! - [`layout`] - Compilation units and project paths (`dust.toml`)
//! - [`toolchain`] - Compiler discovery and invocation construction
//! - [`build`] - Parallel compilation, cleanup and the test harness

/// Parallel compilation, artifact cleanup and the test harness.
pub mod build;

/// Build configuration parsed from flag tokens.
pub mod config;

/// Error types.
pub mod error;

/// Project layout and the fixed source set.
pub mod layout;

/// Tracing subscriber setup.
pub mod logging;

/// Compiler discovery and invocations.
pub mod toolchain;

/// Terminal UI helpers.
pub mod ui;
