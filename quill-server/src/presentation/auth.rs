//! Bearer-token extraction.
//!
//! [`Principal`] implements [`FromRequest`], so protected handlers simply
//! take it as an argument: a missing or malformed `Authorization` header and
//! a failed verification all reject with 401 and the uniform `{error}` body
//! before any handler logic runs.

use crate::domain::{DomainError, Principal};
use crate::infrastructure::jwt::JwtService;
use actix_web::error::InternalError;
use actix_web::http::header;
use actix_web::{dev::Payload, web, Error, FromRequest, HttpRequest, HttpResponse};
use std::future::{ready, Ready};
use std::sync::Arc;

impl FromRequest for Principal {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(extract_principal(req).map_err(reject))
    }
}

fn extract_principal(req: &HttpRequest) -> Result<Principal, DomainError> {
    let jwt_service = req
        .app_data::<web::Data<Arc<JwtService>>>()
        .ok_or_else(|| DomainError::InternalError("JWT service not configured".to_string()))?
        .get_ref()
        .clone();

    let header_value = req.headers().get(header::AUTHORIZATION).ok_or_else(|| {
        DomainError::Unauthorized("Missing authorization header".to_string())
    })?;

    let token = header_value
        .to_str()
        .ok()
        .and_then(|value| value.strip_prefix("Bearer "))
        .filter(|token| !token.is_empty())
        .ok_or_else(|| {
            DomainError::Unauthorized(
                "Invalid authorization header format. Expected: Bearer <token>".to_string(),
            )
        })?;

    jwt_service.verify(token)
}

fn reject(err: DomainError) -> Error {
    let message = err.to_string();
    let response = if err.to_status_code() == 500 {
        tracing::error!("Principal extraction failed: {}", err);
        HttpResponse::InternalServerError()
            .json(serde_json::json!({ "error": "Internal server error" }))
    } else {
        HttpResponse::Unauthorized().json(serde_json::json!({ "error": message }))
    };

    InternalError::from_response(message, response).into()
}
