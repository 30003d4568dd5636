//! Response re-exports from Axum.

pub use axum::response::{Html, IntoResponse, Redirect, Response, Sse};
pub use axum::response::sse::{Event as SseEvent, KeepAlive as SseKeepAlive};
