//! Test fixtures and utilities

pub mod binaries;

pub use binaries::*;
