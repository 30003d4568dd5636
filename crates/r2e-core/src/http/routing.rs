//! Routing re-exports from Axum.

pub use axum::routing::{any, delete, get, head, options, patch, post, put, MethodRouter, Route};
