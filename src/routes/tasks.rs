use crate::{
    auth::AuthenticatedUser,
    error::AppError,
    models::{Task, TaskInput},
    state::AppState,
};
use actix_web::{delete, get, post, put, web, HttpResponse, Responder};
use validator::Validate;

/// Fetches task `id` if it belongs to `owner_id`; other users' tasks are reported as missing.
async fn owned_task(state: &AppState, id: i32, owner_id: i32) -> Result<Task, AppError> {
    match state.tasks.find_task(id).await? {
        Some(task) if task.user_id == owner_id => Ok(task),
        _ => Err(AppError::NotFound("Task not found".into())),
    }
}

/// Retrieves the tasks owned by the authenticated user.
///
/// ## Responses:
/// - `200 OK`: Returns a JSON array of `Task` objects.
/// - `401 Unauthorized`: If the request lacks a valid authentication token.
#[get("")]
pub async fn get_tasks(
    state: web::Data<AppState>,
    identity: AuthenticatedUser,
) -> Result<impl Responder, AppError> {
    let user = state.current_user(&identity).await?;
    let tasks = state.tasks.list_tasks_by_user(user.id).await?;
    Ok(HttpResponse::Ok().json(tasks))
}

/// Retrieves the tasks of the user with the given id.
///
/// Any authenticated caller may list any user's tasks here. This is a
/// read-only listing; the per-task routes below stay owner-only and report
/// other users' tasks as 404.
#[get("/user/{user_id}")]
pub async fn get_tasks_by_user(
    state: web::Data<AppState>,
    user_id: web::Path<i32>,
    identity: AuthenticatedUser,
) -> Result<impl Responder, AppError> {
    state.current_user(&identity).await?;
    let tasks = state.tasks.list_tasks_by_user(user_id.into_inner()).await?;
    Ok(HttpResponse::Ok().json(tasks))
}

/// Creates a new task owned by the authenticated user.
///
/// ## Request Body:
/// A JSON object matching `TaskInput`:
/// - `title`: 3 to 50 characters.
/// - `description`: 3 to 255 characters.
/// - `due_date` (optional): defaults to now.
/// - `completed` (optional): defaults to `false`.
///
/// ## Responses:
/// - `201 Created`: Returns the newly created `Task`.
/// - `401 Unauthorized`: If the request lacks a valid authentication token.
/// - `422 Unprocessable Entity`: If input validation fails.
#[post("")]
pub async fn create_task(
    state: web::Data<AppState>,
    task_data: web::Json<TaskInput>,
    identity: AuthenticatedUser,
) -> Result<impl Responder, AppError> {
    task_data.validate()?;

    let user = state.current_user(&identity).await?;
    let task = state
        .tasks
        .insert_task(user.id, task_data.into_inner())
        .await?;
    Ok(HttpResponse::Created().json(task))
}

/// Retrieves a specific task owned by the authenticated user.
///
/// ## Responses:
/// - `200 OK`: Returns the `Task`.
/// - `404 Not Found`: The task does not exist or belongs to another user.
#[get("/{id}")]
pub async fn get_task(
    state: web::Data<AppState>,
    task_id: web::Path<i32>,
    identity: AuthenticatedUser,
) -> Result<impl Responder, AppError> {
    let user = state.current_user(&identity).await?;
    let task = owned_task(&state, task_id.into_inner(), user.id).await?;
    Ok(HttpResponse::Ok().json(task))
}

/// Updates a task owned by the authenticated user.
///
/// ## Responses:
/// - `200 OK`: Returns the updated `Task`.
/// - `404 Not Found`: The task does not exist or belongs to another user.
/// - `422 Unprocessable Entity`: If input validation fails.
#[put("/{id}")]
pub async fn update_task(
    state: web::Data<AppState>,
    task_id: web::Path<i32>,
    task_data: web::Json<TaskInput>,
    identity: AuthenticatedUser,
) -> Result<impl Responder, AppError> {
    task_data.validate()?;
    let user = state.current_user(&identity).await?;
    let task = owned_task(&state, task_id.into_inner(), user.id).await?;

    let updated = state
        .tasks
        .update_task(task.id, task_data.into_inner())
        .await?
        .ok_or_else(|| AppError::NotFound("Task not found".into()))?;
    Ok(HttpResponse::Ok().json(updated))
}

/// Deletes a task owned by the authenticated user.
///
/// ## Responses:
/// - `204 No Content`: On successful deletion.
/// - `404 Not Found`: The task does not exist or belongs to another user.
#[delete("/{id}")]
pub async fn delete_task(
    state: web::Data<AppState>,
    task_id: web::Path<i32>,
    identity: AuthenticatedUser,
) -> Result<impl Responder, AppError> {
    let user = state.current_user(&identity).await?;
    let task = owned_task(&state, task_id.into_inner(), user.id).await?;

    if !state.tasks.delete_task(task.id).await? {
        return Err(AppError::NotFound("Task not found".into()));
    }
    Ok(HttpResponse::NoContent().finish())
}
