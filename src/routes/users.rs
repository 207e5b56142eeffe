use crate::{auth::AuthenticatedUser, error::AppError, state::AppState};
use actix_web::{get, web, HttpResponse, Responder};

/// Lists every registered user (public view only).
#[get("")]
pub async fn get_users(
    state: web::Data<AppState>,
    identity: AuthenticatedUser,
) -> Result<impl Responder, AppError> {
    log::debug!("{} listed users", identity.username());
    let users = state.users.list_users().await?;
    Ok(HttpResponse::Ok().json(users))
}
