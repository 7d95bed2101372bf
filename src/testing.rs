//! Testing utilities
//!
//! Factories for building expected token streams and line contexts
//! succinctly, shared by unit tests and the integration tests under `tests/`.

mod testing_factories;

// Public submodule path: crate::testing::factories
pub mod factories {
    pub use super::testing_factories::*;
}
