//! Response construction.
//!
//! # Responsibilities
//! - Turn a forwarding `Reply` into JSON, HTML or plain text
//! - Map `ForwardError` to the client-facing status and body
//!
//! # Design Decisions
//! - Transport failures answer 200 with a fixed message, never the cause
//! - Payload failures answer 502 Bad Gateway

use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    Json,
};

use crate::forward::{ForwardError, Reply, INSTRUCTIONS, PAYLOAD_FAILURE, TRANSPORT_FAILURE};

impl IntoResponse for Reply {
    fn into_response(self) -> Response {
        match self {
            Reply::Json(body) => (StatusCode::OK, Json(body)).into_response(),
            Reply::Page(page) => Html(page.render()).into_response(),
            Reply::Instructions => (StatusCode::OK, INSTRUCTIONS).into_response(),
        }
    }
}

impl IntoResponse for ForwardError {
    fn into_response(self) -> Response {
        match self {
            ForwardError::Transport { .. } => (StatusCode::OK, TRANSPORT_FAILURE).into_response(),
            ForwardError::Payload { .. } => {
                (StatusCode::BAD_GATEWAY, PAYLOAD_FAILURE).into_response()
            }
        }
    }
}
