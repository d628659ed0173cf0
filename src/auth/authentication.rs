use rocket::Request;
use rocket::http::Status;
use rocket::request::{FromRequest, Outcome};
use rocket::response::status::Custom;
use rocket::serde::json::Json;
use sqlx::SqlitePool;
use tracing::Instrument;

use crate::auth::account::resolve_token;
use crate::validation::{ToValidationResponse, ValidationResponse};

use super::{Sessions, User};

/// Raw token taken from an `Authorization: Bearer <token>` header.
#[derive(Debug, Clone)]
pub struct BearerToken(pub String);

impl BearerToken {
    fn parse(header: &str) -> Option<Self> {
        let (scheme, token) = header.trim().split_once(' ')?;
        let token = token.trim();

        if !scheme.eq_ignore_ascii_case("bearer") || token.is_empty() {
            return None;
        }

        Some(BearerToken(token.to_string()))
    }
}

#[rocket::async_trait]
impl<'r> FromRequest<'r> for BearerToken {
    type Error = ();

    async fn from_request(request: &'r Request<'_>) -> Outcome<Self, Self::Error> {
        match request
            .headers()
            .get_one("Authorization")
            .and_then(BearerToken::parse)
        {
            Some(token) => Outcome::Success(token),
            _ => {
                tracing::warn!("Missing or malformed bearer token");
                Outcome::Error((Status::Forbidden, ()))
            }
        }
    }
}

#[rocket::async_trait]
impl<'r> FromRequest<'r> for User {
    type Error = ();

    async fn from_request(request: &'r Request<'_>) -> Outcome<Self, Self::Error> {
        authenticate(request)
            .instrument(tracing::info_span!("user_auth_guard"))
            .await
    }
}

async fn authenticate(request: &Request<'_>) -> Outcome<User, ()> {
    let token = match request.guard::<BearerToken>().await {
        Outcome::Success(token) => token,
        Outcome::Error(e) => return Outcome::Error(e),
        Outcome::Forward(status) => return Outcome::Forward(status),
    };

    let (Some(db), Some(sessions)) = (
        request.rocket().state::<SqlitePool>(),
        request.rocket().state::<Sessions>(),
    ) else {
        tracing::error!("Database pool or session store not found in managed state");
        return Outcome::Error((Status::InternalServerError, ()));
    };

    match resolve_token(db, sessions.as_ref(), &token.0).await {
        Ok(user) => {
            tracing::info!(user_id = %user.id, "User authenticated via bearer token");
            Outcome::Success(user)
        }
        Err(err) => Outcome::Error((err.to_status_with_log("Bearer token guard"), ())),
    }
}

#[catch(400)]
pub fn bad_request_api(_req: &Request) -> Custom<Json<ValidationResponse>> {
    Status::BadRequest.to_validation_response()
}

#[catch(401)]
pub fn unauthorized_api(_req: &Request) -> Custom<Json<ValidationResponse>> {
    Status::Unauthorized.to_validation_response()
}

#[catch(403)]
pub fn forbidden_api(_req: &Request) -> Custom<Json<ValidationResponse>> {
    tracing::warn!("Forbidden access attempt");
    Status::Forbidden.to_validation_response()
}

#[catch(404)]
pub fn not_found_api(_req: &Request) -> Custom<Json<ValidationResponse>> {
    Status::NotFound.to_validation_response()
}

#[catch(422)]
pub fn unprocessable_api(_req: &Request) -> Custom<Json<ValidationResponse>> {
    Status::UnprocessableEntity.to_validation_response()
}

#[catch(500)]
pub fn internal_error_api(_req: &Request) -> Custom<Json<ValidationResponse>> {
    Status::InternalServerError.to_validation_response()
}
