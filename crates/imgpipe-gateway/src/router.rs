//! Routing table and axum router wiring.
//!
//! The image API is resolved through `ROUTES`, a static
//! `(path shape, method) -> operation` table. Unknown methods on a known
//! shape yield 405 with an `Allow` list derived from the same table.
//! `/login` is a plain GET route wrapped by the login timing middleware.
//! The metrics listener gets its own router.

use axum::http::Method;
use axum::{middleware, routing::get, Router};

use imgpipe_core::error::{PipelineError, Result};

use crate::{app_state::AppState, ops, transport};

/// Path families served by the image API.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathShape {
    /// `/images`
    Images,
    /// `/images/{id}`
    ImageById,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    ListProcessing,
    RegisterImage,
    TransitionImage,
}

#[derive(Debug)]
pub struct RouteEntry {
    pub shape: PathShape,
    pub method: Method,
    pub op: Operation,
}

pub const ROUTES: &[RouteEntry] = &[
    RouteEntry {
        shape: PathShape::Images,
        method: Method::GET,
        op: Operation::ListProcessing,
    },
    RouteEntry {
        shape: PathShape::Images,
        method: Method::POST,
        op: Operation::RegisterImage,
    },
    RouteEntry {
        shape: PathShape::ImageById,
        method: Method::PUT,
        op: Operation::TransitionImage,
    },
];

const IMAGES_PATH: &str = "/images";
const IMAGE_BY_ID_PREFIX: &str = "/images/";

/// A resolved request: what to run and, for `ImageById`, the raw id segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resolved<'a> {
    pub op: Operation,
    pub raw_id: Option<&'a str>,
}

/// Map a path onto its shape. Everything after `/images/` is the id segment,
/// unparsed.
pub fn classify(path: &str) -> Option<(PathShape, Option<&str>)> {
    if path == IMAGES_PATH {
        return Some((PathShape::Images, None));
    }
    path.strip_prefix(IMAGE_BY_ID_PREFIX)
        .map(|rest| (PathShape::ImageById, Some(rest)))
}

/// Comma-separated methods routed for `shape`, in table order.
pub fn allowed_methods(shape: PathShape) -> String {
    ROUTES
        .iter()
        .filter(|r| r.shape == shape)
        .map(|r| r.method.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Resolve `(method, path)` against `ROUTES`.
///
/// The method is checked before the id segment is looked at; id parsing is
/// left to the operation.
pub fn resolve<'a>(method: &Method, path: &'a str) -> Result<Resolved<'a>> {
    let (shape, raw_id) =
        classify(path).ok_or_else(|| PipelineError::NotFound(path.to_string()))?;

    ROUTES
        .iter()
        .find(|r| r.shape == shape && r.method == *method)
        .map(|r| Resolved { op: r.op, raw_id })
        .ok_or_else(|| PipelineError::MethodNotAllowed {
            allow: allowed_methods(shape),
        })
}

/// Router for the image API listener.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route(
            "/login",
            get(transport::http::login).layer(middleware::from_fn_with_state(
                state.clone(),
                transport::timing::time_login,
            )),
        )
        .fallback(transport::http::dispatch)
        .with_state(state)
}

/// Router for the metrics listener.
pub fn build_metrics_router(state: AppState) -> Router {
    Router::new()
        .route("/metrics", get(ops::metrics))
        .route("/healthz", get(ops::healthz))
        .with_state(state)
}
