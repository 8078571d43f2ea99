//! Integration test suite for devtools
//!
//! ```bash
//! cargo test --test integration
//! ```
//!
//! # Test Organization
//!
//! - **cli**: the `devtools` binary end to end (configuration lookup, clone, export)
//! - **export_restore**: exports against real git repositories; the working
//!   tree always ends up where it started
//! - **resolver**: resolver runs driven by a configuration file and scripted
//!   package-manager outcomes

// Shared test utilities (from parent tests/ directory)
#[path = "../common/mod.rs"]
mod common;

mod cli;
mod export_restore;
mod resolver;
