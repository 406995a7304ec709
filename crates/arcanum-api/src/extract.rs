//! Request extractors.

use axum::Json;
use axum::extract::FromRequestParts;
use axum::http::StatusCode;
use axum::http::request::Parts;
use axum::response::{IntoResponse, Response};
use uuid::Uuid;

use crate::error::ErrorBody;

/// Header carrying the caller's opaque actor id, issued by the identity
/// provider in front of this service.
pub const ACTOR_HEADER: &str = "x-actor-id";

/// The authenticated caller, extracted from [`ACTOR_HEADER`].
#[derive(Debug, Clone, Copy)]
pub struct ActorId(pub Uuid);

/// Rejection for a missing or malformed actor header.
#[derive(Debug)]
pub enum ActorRejection {
    /// The header is absent.
    Missing,
    /// The header is present but not a UUID.
    Invalid,
}

impl IntoResponse for ActorRejection {
    fn into_response(self) -> Response {
        let message = match self {
            Self::Missing => format!("missing {ACTOR_HEADER} header"),
            Self::Invalid => format!("{ACTOR_HEADER} header is not a valid uuid"),
        };
        let body = ErrorBody {
            error: "actor_required",
            message,
        };
        (StatusCode::BAD_REQUEST, Json(body)).into_response()
    }
}

impl<S> FromRequestParts<S> for ActorId
where
    S: Send + Sync,
{
    type Rejection = ActorRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let value = parts
            .headers
            .get(ACTOR_HEADER)
            .ok_or(ActorRejection::Missing)?;
        let text = value.to_str().map_err(|_| ActorRejection::Invalid)?;
        let id = Uuid::parse_str(text).map_err(|_| ActorRejection::Invalid)?;
        Ok(Self(id))
    }
}
