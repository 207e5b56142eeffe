#![doc = "The `taskgate` library crate."]
#![doc = ""]
#![doc = "A multi-tenant task-tracking backend. Users register and log in to obtain a"]
#![doc = "signed bearer token; every `/users` and `/tasks` request is re-validated by"]
#![doc = "`auth::AuthMiddleware` before reaching its handler."]
#![doc = ""]
#![doc = "The binary (`main.rs`) loads `config::Config`, connects a `store::PgStore`,"]
#![doc = "builds a `state::AppState` and mounts `routes::config`."]

pub mod auth;
pub mod config;
pub mod error;
pub mod models;
pub mod routes;
pub mod state;
pub mod store;

pub use error::AppError;
pub use state::AppState;
