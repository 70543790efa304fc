//! Test helpers module
//!
//! Shared setup for the HTTP-level tests: an in-process server over the
//! reference database, signed-in accounts and request bodies.

#![allow(dead_code)]

pub mod test_context;
pub mod test_data;

pub use test_context::*;
pub use test_data::*;
