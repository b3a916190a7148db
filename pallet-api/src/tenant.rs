use axum::{extract::FromRequestParts, extract::Query, http::request::Parts};
use pallet_core::ClientId;
use serde::Deserialize;

use crate::error::AppError;

pub const CLIENT_ID_HEADER: &str = "x-client-id";

/// The tenant a request is scoped to.
///
/// Resolved upstream by the authorization layer and forwarded in the
/// `x-client-id` header; a `clientId` query parameter is accepted as a
/// fallback for dashboard links. Missing or malformed ids are a 400.
#[derive(Debug, Clone)]
pub struct Tenant(pub ClientId);

#[derive(Deserialize)]
struct TenantQuery {
    #[serde(rename = "clientId")]
    client_id: Option<String>,
}

impl<S> FromRequestParts<S> for Tenant
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let from_header = parts
            .headers
            .get(CLIENT_ID_HEADER)
            .map(|value| {
                value
                    .to_str()
                    .map(str::to_string)
                    .map_err(|_| AppError::ValidationError("x-client-id must be valid ASCII".to_string()))
            })
            .transpose()?;

        let raw = match from_header {
            Some(raw) => raw,
            None => Query::<TenantQuery>::try_from_uri(&parts.uri)
                .ok()
                .and_then(|Query(q)| q.client_id)
                .ok_or_else(|| AppError::ValidationError("clientId is required".to_string()))?,
        };

        Ok(Tenant(ClientId::new(raw)?))
    }
}
