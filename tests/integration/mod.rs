//! Integration test suite for ktmpl
//!
//! End-to-end tests that drive the `ktmpl` binary against manifest trees
//! written to temporary directories.
//!
//! # Running Integration Tests
//!
//! ```bash
//! cargo test --test integration
//! ```
//!
//! # Test Organization
//!
//! - **render**: rendering, ordering, values and output formats
//! - **list**: asset selection
//! - **kinds**: the effective kind order
//! - **errors**: failure exit codes and messages

mod common;
mod errors;
mod kinds;
mod list;
mod render;
