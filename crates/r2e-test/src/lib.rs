mod app;

pub use app::{TestApp, TestResponse};
