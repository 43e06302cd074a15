//! Login timing middleware.

use std::time::Instant;

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};

use crate::app_state::AppState;

/// Wrap the login handler and report its wall time to the metrics sink.
pub async fn time_login(State(app): State<AppState>, req: Request, next: Next) -> Response {
    let started = Instant::now();
    let resp = next.run(req).await;
    app.sink().observe_login(started.elapsed());
    resp
}
