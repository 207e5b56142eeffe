use actix_web::dev::Payload;
use actix_web::{Error as ActixError, FromRequest, HttpMessage, HttpRequest};
use std::future::{ready, Ready};

use super::middleware::MISSING_TOKEN;
use crate::error::AppError;

/// The identity (token subject) of the caller, as established by `AuthMiddleware`.
///
/// Extracting it on a route that is not wrapped by the middleware fails with
/// `AppError::Unauthorized`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedUser(pub String);

impl AuthenticatedUser {
    pub fn username(&self) -> &str {
        &self.0
    }
}

impl FromRequest for AuthenticatedUser {
    type Error = ActixError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        match req.extensions().get::<AuthenticatedUser>().cloned() {
            Some(identity) => ready(Ok(identity)),
            None => ready(Err(AppError::Unauthorized(MISSING_TOKEN.into()).into())),
        }
    }
}
