//! Image API handlers.
//!
//! All `/images` traffic enters through `dispatch`, which resolves the
//! request against the routing table and hands it to the coordinator.
//! Bodies are plain text except for the JSON list.

use std::borrow::Cow;

use axum::{
    extract::State,
    http::{header, HeaderValue, Method, StatusCode, Uri},
    response::{IntoResponse, Response},
};
use bytes::Bytes;

use imgpipe_core::error::{PipelineError, Result};

use crate::app_state::AppState;
use crate::pipeline::coordinator::{Outcome, ACCEPTED_BODY, CREATED_BODY, GREETING_BODY};
use crate::router::{self, Operation};

const NOT_FOUND_BODY: &str = "404 page not found\n";
const METHOD_NOT_ALLOWED_BODY: &str = "Method Not Allowed\n";

/// HTTP rendering of a pipeline error.
#[derive(Debug)]
pub struct HttpError(pub PipelineError);

impl From<PipelineError> for HttpError {
    fn from(e: PipelineError) -> Self {
        Self(e)
    }
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        match self.0 {
            PipelineError::Decode(msg) | PipelineError::BadRequest(msg) => {
                (StatusCode::BAD_REQUEST, format!("{msg}\n")).into_response()
            }
            PipelineError::InvalidId(_) | PipelineError::NotFound(_) => {
                (StatusCode::NOT_FOUND, NOT_FOUND_BODY).into_response()
            }
            PipelineError::MethodNotAllowed { allow } => {
                let mut resp =
                    (StatusCode::METHOD_NOT_ALLOWED, METHOD_NOT_ALLOWED_BODY).into_response();
                if let Ok(v) = HeaderValue::from_str(&allow) {
                    resp.headers_mut().insert(header::ALLOW, v);
                }
                resp
            }
            e @ (PipelineError::Encode(_)
            | PipelineError::Internal(_)
            | PipelineError::UnsupportedVersion) => {
                tracing::error!(error = %e, code = e.client_code().as_str(), "request failed");
                (StatusCode::INTERNAL_SERVER_ERROR, format!("{e}\n")).into_response()
            }
        }
    }
}

impl IntoResponse for Outcome {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.status_code()).unwrap_or(StatusCode::OK);
        match self {
            Outcome::Created => (status, CREATED_BODY).into_response(),
            Outcome::Accepted => (status, ACCEPTED_BODY).into_response(),
            Outcome::Greeting => (status, GREETING_BODY).into_response(),
            Outcome::Listed(body) => (
                status,
                [(header::CONTENT_TYPE, "application/json")],
                body,
            )
                .into_response(),
        }
    }
}

/// Fallback handler for the API listener: route via the table, then run.
pub async fn dispatch(
    State(app): State<AppState>,
    method: Method,
    uri: Uri,
    body: Bytes,
) -> Response {
    let result = match decode_path(uri.path()) {
        Ok(path) => run(&app, &method, &path, &body).await,
        Err(e) => Err(e),
    };
    match result {
        Ok(outcome) => outcome.into_response(),
        Err(e) => {
            tracing::debug!(%method, path = uri.path(), error = %e, "request rejected");
            HttpError(e).into_response()
        }
    }
}

/// Percent-decode the request path before routing, so `/images/%31`
/// addresses image 1. Non-UTF-8 results match no route.
fn decode_path(raw: &str) -> Result<Cow<'_, str>> {
    urlencoding::decode(raw).map_err(|_| PipelineError::NotFound(raw.to_string()))
}

async fn run(app: &AppState, method: &Method, path: &str, body: &[u8]) -> Result<Outcome> {
    let resolved = router::resolve(method, path)?;
    let coordinator = app.coordinator();

    match resolved.op {
        Operation::ListProcessing => coordinator.list_processing_images().await,
        Operation::RegisterImage => coordinator.register_image(body).await,
        Operation::TransitionImage => {
            coordinator
                .transition_image(resolved.raw_id.unwrap_or_default())
                .await
        }
    }
}

pub async fn login(State(app): State<AppState>) -> Outcome {
    app.coordinator().login_greeting().await
}
