//! Common test utilities for Casilla integration tests.
//!
//! This module provides:
//! - `TestEnv`: Isolated test environment with a temp directory
//! - Fixtures: generated template PDFs and the bundled model 650 files

#![allow(dead_code, unused_imports)]

pub mod env;
pub mod fixtures;

pub use env::*;
pub use fixtures::*;
