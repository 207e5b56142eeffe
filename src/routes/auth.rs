use crate::{
    auth::LoginForm,
    error::AppError,
    models::RegisterRequest,
    state::AppState,
};
use actix_web::{post, web, HttpResponse, Responder};

/// Register a new user
///
/// Validates the payload, stores the user with a hashed password and returns
/// the public view `{id, username, email}`.
///
/// ## Responses:
/// - `201 Created`: the registered user.
/// - `400 Bad Request`: the body is not valid JSON or misses a field.
/// - `409 Conflict`: username or email already registered.
/// - `422 Unprocessable Entity`: a field fails validation.
#[post("/register")]
pub async fn register(
    state: web::Data<AppState>,
    register_data: web::Json<RegisterRequest>,
) -> Result<impl Responder, AppError> {
    let user = state.auth.register(register_data.into_inner()).await?;
    Ok(HttpResponse::Created().json(user))
}

/// Login user
///
/// Accepts form-encoded `username` and `password` and returns
/// `{access_token, id}`.
///
/// ## Responses:
/// - `200 OK`: credentials accepted.
/// - `400 Bad Request`: unknown user or wrong password.
#[post("/login")]
pub async fn login(
    state: web::Data<AppState>,
    form: web::Form<LoginForm>,
) -> Result<impl Responder, AppError> {
    let token = state.auth.authenticate(&form.username, &form.password).await?;
    Ok(HttpResponse::Ok().json(token))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Config, JwtConfig};
    use actix_web::{http::StatusCode, test, App};
    use jsonwebtoken::Algorithm;
    use serde_json::json;

    fn state() -> web::Data<AppState> {
        let config = Config {
            database_url: "postgres://unused".into(),
            server_port: 8080,
            server_host: "127.0.0.1".into(),
            jwt: JwtConfig {
                secret: "routes-secret".into(),
                expires_in_minutes: 30,
                algorithm: Algorithm::HS256,
            },
            bcrypt_cost: crate::auth::MIN_COST,
        };
        web::Data::new(AppState::in_memory(&config))
    }

    #[actix_rt::test]
    async fn test_register_validation() {
        let app = test::init_service(
            App::new()
                .app_data(state())
                .service(register),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/register")
            .set_json(json!({
                "username": "test",
                "email": "invalid-email",
                "password": "123456"
            }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);

        let req = test::TestRequest::post()
            .uri("/register")
            .set_json(json!({
                "username": "test",
                "email": "test@example.com",
                "password": "password"
            }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[actix_rt::test]
    async fn test_login_requires_form_fields() {
        let app = test::init_service(
            App::new()
                .app_data(state())
                .service(login),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/login")
            .set_form([("username", "alice")])
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert!(resp.status().is_client_error());

        let req = test::TestRequest::post()
            .uri("/login")
            .set_form([("username", "alice"), ("password", "12345")])
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }
}
