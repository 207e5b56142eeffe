pub mod auth;
pub mod health;
pub mod tasks;
pub mod users;

use actix_web::web;

use crate::auth::AuthMiddleware;

/// Registers every route. Expects `web::Data<AppState>` on the app.
///
/// `/login` and `/register` are public; `/users` and `/tasks` sit behind
/// `AuthMiddleware`.
pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(auth::login)
        .service(auth::register)
        .service(
            web::scope("/users")
                .wrap(AuthMiddleware)
                .service(users::get_users),
        )
        .service(
            web::scope("/tasks")
                .wrap(AuthMiddleware)
                .service(tasks::get_tasks)
                .service(tasks::create_task)
                .service(tasks::get_tasks_by_user)
                .service(tasks::get_task)
                .service(tasks::update_task)
                .service(tasks::delete_task),
        );
}
