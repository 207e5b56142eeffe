use actix_web::{
    body::EitherBody,
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    http::header,
    web, Error, HttpMessage, ResponseError,
};
use futures::future::{ready, LocalBoxFuture, Ready};

use super::{AuthError, AuthenticatedUser, TokenService};
use crate::error::AppError;
use crate::state::AppState;

pub const BEARER_SCHEME: &str = "Bearer";
pub(crate) const MISSING_TOKEN: &str = "Not authenticated";
pub(crate) const INVALID_TOKEN: &str = "Could not validate credentials";

/// Resolves the `Authorization` header value to an authenticated identity.
///
/// Every token failure (malformed, bad signature, expired, empty subject)
/// yields the same `Unauthorized` error.
pub fn authorize(
    authorization: Option<&str>,
    tokens: &TokenService,
) -> Result<AuthenticatedUser, AuthError> {
    let value = authorization.ok_or(AuthError::Unauthorized(MISSING_TOKEN))?;
    let (scheme, token) = value
        .trim()
        .split_once(' ')
        .ok_or(AuthError::Unauthorized(MISSING_TOKEN))?;
    if !scheme.eq_ignore_ascii_case(BEARER_SCHEME) {
        return Err(AuthError::Unauthorized(MISSING_TOKEN));
    }

    let claims = tokens.validate(token.trim())?;
    match claims.sub {
        Some(sub) if !sub.is_empty() => Ok(AuthenticatedUser(sub)),
        _ => {
            log::debug!("Token rejected: no subject claim");
            Err(AuthError::Unauthorized(INVALID_TOKEN))
        }
    }
}

/// Guards a scope: requests without a valid bearer token are answered with
/// 401 before reaching any handler.
pub struct AuthMiddleware;

impl<S, B> Transform<S, ServiceRequest> for AuthMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Transform = AuthMiddlewareService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(AuthMiddlewareService { service }))
    }
}

pub struct AuthMiddlewareService<S> {
    service: S,
}

impl<S, B> Service<ServiceRequest> for AuthMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let outcome = match req.app_data::<web::Data<AppState>>() {
            Some(state) => {
                let auth_header = req
                    .headers()
                    .get(header::AUTHORIZATION)
                    .and_then(|value| value.to_str().ok());
                authorize(auth_header, &state.tokens).map_err(AppError::from)
            }
            None => Err(AppError::InternalServerError(
                "Application state is not configured".into(),
            )),
        };

        match outcome {
            Ok(identity) => {
                req.extensions_mut().insert(identity);
                let fut = self.service.call(req);
                Box::pin(async move { fut.await.map(ServiceResponse::map_into_left_body) })
            }
            Err(app_err) => {
                let response = req.into_response(app_err.error_response());
                Box::pin(async move { Ok(response.map_into_right_body()) })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::ClaimSet;
    use crate::config::JwtConfig;
    use jsonwebtoken::Algorithm;
    use serde_json::Value;

    fn tokens() -> TokenService {
        TokenService::new(&JwtConfig {
            secret: "gate-secret".into(),
            expires_in_minutes: 5,
            algorithm: Algorithm::HS256,
        })
    }

    fn assert_unauthorized(result: Result<AuthenticatedUser, AuthError>, message: &str) {
        match result {
            Err(AuthError::Unauthorized(msg)) => assert_eq!(msg, message),
            other => panic!("expected Unauthorized({}), got {:?}", message, other),
        }
    }

    #[test]
    fn test_valid_bearer_token_yields_identity() {
        let tokens = tokens();
        let header = format!("Bearer {}", tokens.issue_for_subject("alice").unwrap());

        let identity = authorize(Some(&header), &tokens).unwrap();
        assert_eq!(identity.username(), "alice");

        let lowercase = header.replacen("Bearer", "bearer", 1);
        assert_eq!(authorize(Some(&lowercase), &tokens).unwrap().0, "alice");
    }

    #[test]
    fn test_missing_header_or_wrong_scheme() {
        let tokens = tokens();
        let token = tokens.issue_for_subject("alice").unwrap();

        assert_unauthorized(authorize(None, &tokens), MISSING_TOKEN);
        assert_unauthorized(authorize(Some(""), &tokens), MISSING_TOKEN);
        assert_unauthorized(authorize(Some(&token), &tokens), MISSING_TOKEN);
        assert_unauthorized(
            authorize(Some(&format!("Basic {}", token)), &tokens),
            MISSING_TOKEN,
        );
    }

    #[test]
    fn test_invalid_tokens_share_one_message() {
        let tokens = tokens();
        let expired = tokens
            .issue_at(
                ClaimSet::from_iter([("sub".to_string(), Value::from("alice"))]),
                1,
                chrono::Utc::now() - chrono::Duration::minutes(5),
            )
            .unwrap();
        let foreign = TokenService::new(&JwtConfig {
            secret: "someone-else".into(),
            expires_in_minutes: 5,
            algorithm: Algorithm::HS256,
        })
        .issue_for_subject("alice")
        .unwrap();

        for token in ["garbage", expired.as_str(), foreign.as_str()] {
            assert_unauthorized(
                authorize(Some(&format!("Bearer {}", token)), &tokens),
                INVALID_TOKEN,
            );
        }
    }

    #[test]
    fn test_missing_or_empty_subject_is_rejected() {
        let tokens = tokens();
        let no_subject = tokens.issue(ClaimSet::new(), 5).unwrap();
        let empty_subject = tokens
            .issue(
                ClaimSet::from_iter([("sub".to_string(), Value::from(""))]),
                5,
            )
            .unwrap();

        for token in [no_subject, empty_subject] {
            assert_unauthorized(
                authorize(Some(&format!("Bearer {}", token)), &tokens),
                INVALID_TOKEN,
            );
        }
    }
}
