//! Debug receiver
//!
//! A tiny axum server that prints every diagnostic trace POSTed by
//! [`crate::debug::HttpDebugSink`].

pub mod app;
pub mod handlers;

pub use app::{AppState, create_app};
