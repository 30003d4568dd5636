//! R2E — a Quarkus-like ergonomic layer over Axum.
//!
//! This facade crate re-exports the framework sub-crates through a single
//! dependency. Import everything you need with:
//!
//! ```ignore
//! use r2e::prelude::*;
//! ```
//!
//! # Feature flags
//!
//! | Feature       | Default | Crate                     |
//! |---------------|---------|---------------------------|
//! | `ws`          | no      | `r2e-core/ws`             |
//! | `multipart`   | no      | `r2e-core/multipart`      |

// Re-export sub-crates as public modules so they're accessible as
// `r2e::r2e_core`, `r2e::r2e_macros`, etc.
//
// The proc macros use `proc-macro-crate` to detect whether the user depends
// on `r2e` (facade) or individual crates, and generate the correct paths.
pub extern crate r2e_core;
pub extern crate r2e_macros;

// Re-export everything from r2e-core at the top level for convenience.
pub use r2e_core::*;

/// Convenience type aliases built on `r2e-core` types.
pub mod types {
    pub use r2e_core::types::*;
}

/// Unified prelude — import everything with `use r2e::prelude::*`.
pub mod prelude {
    pub use r2e_core::prelude::*;
    pub use crate::types::*;
}
