//! Axum re-exports, isolated into their own crate so that only this crate
//! needs to track Axum's version directly.

pub use axum::body::Body;
pub use axum::extract;
pub use axum::response;
pub use axum::routing;
pub use axum::{serve, Extension, Json, Router};

#[cfg(feature = "ws")]
pub mod ws {
    pub use axum::extract::ws::{CloseFrame, Message, WebSocket, WebSocketUpgrade};
}

#[cfg(feature = "multipart")]
pub mod multipart {
    pub use axum::extract::Multipart;
}

#[cfg(feature = "proxy")]
pub use hyper;
