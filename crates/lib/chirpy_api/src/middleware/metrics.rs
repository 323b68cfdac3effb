//! File-server hit counting.

use std::sync::atomic::{AtomicU64, Ordering};

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};

use crate::AppState;

/// Process-wide request counters.
#[derive(Debug, Default)]
pub struct Metrics {
    file_server_hits: AtomicU64,
}

impl Metrics {
    pub fn file_server_hits(&self) -> u64 {
        self.file_server_hits.load(Ordering::Relaxed)
    }

    pub fn record_file_server_hit(&self) {
        self.file_server_hits.fetch_add(1, Ordering::Relaxed);
    }

    pub fn reset(&self) {
        self.file_server_hits.store(0, Ordering::Relaxed);
    }
}

/// Axum middleware: counts every request that reaches the file server.
pub async fn count_file_server_hits(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    state.metrics.record_file_server_hit();
    next.run(request).await
}
