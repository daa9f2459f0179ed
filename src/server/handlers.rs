//! HTTP request handlers

use crate::server::app::AppState;
use axum::{extract::State, http::StatusCode};
use chrono::{DateTime, Local};
use std::sync::atomic::Ordering;

/// Receive one trace
///
/// POST /
///
/// Prints the trace to stdout preceded by the local receive time and
/// answers with an empty 200.
pub async fn receive_trace(State(state): State<AppState>, body: String) -> StatusCode {
    let count = state.received.fetch_add(1, Ordering::SeqCst) + 1;
    tracing::debug!("Received trace #{} ({} bytes)", count, body.len());

    print!("{}", format_entry(Local::now(), &body));
    StatusCode::OK
}

/// `<timestamp>\n<body>\n\n`
pub fn format_entry(at: DateTime<Local>, body: &str) -> String {
    format!("{}\n{}\n\n", at.format("%Y-%m-%d %H:%M:%S%.3f"), body)
}
