//! Shared test utilities for Tally test suites
//!
//! This crate provides common testing utilities to eliminate code
//! duplication across test suites and ensure consistent test environments.
//!
//! # Modules
//!
//! - [`session`]: Temp session directories with `.tally` structure
//! - [`store`]: Seeded in-memory stores and a write-failure wrapper
//! - [`cli`]: Command builders with pre-configured environments
//! - [`logging`]: Test logging configuration
//! - [`assertions`]: Domain-specific assertion helpers
//!
//! # Example
//!
//! ```rust,no_run
//! use tally_test_helpers::prelude::*;
//!
//! let store = seeded_store();
//! let session = temp_session();
//! let _ = tally_command().current_dir(session.path()).arg("lists");
//! ```

pub mod assertions;
pub mod cli;
pub mod logging;
pub mod session;
pub mod store;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::assertions::*;
    pub use crate::cli::{command_for, tally_command};
    pub use crate::logging::init_test_logging;
    pub use crate::session::{init_session, temp_session};
    pub use crate::store::{seeded_store, FlakyStore};
}
