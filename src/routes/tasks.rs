/// Task Routes
///
/// All handlers sit behind `BearerAuth` and only ever see the caller's tasks.

use actix_web::{web, HttpResponse};
use serde::Deserialize;

use crate::auth::Claims;
use crate::error::{AppError, AuthError, DatabaseError, ValidationError};
use crate::store::{NewTask, TaskFilter, TaskStatus, TaskStore};
use crate::validators::{is_valid_description, is_valid_title};

const DEFAULT_LIMIT: i64 = 10;
const MAX_LIMIT: i64 = 100;

#[derive(Deserialize)]
pub struct CreateTaskRequest {
    pub title: String,
    pub description: Option<String>,
    #[serde(default)]
    pub status: TaskStatus,
}

#[derive(Deserialize)]
pub struct ListTasksQuery {
    pub status: Option<TaskStatus>,
    #[serde(default)]
    pub skip: i64,
    #[serde(default = "default_limit")]
    pub limit: i64,
}

fn default_limit() -> i64 {
    DEFAULT_LIMIT
}

/// Tokens minted by this service always carry the numeric `id` claim.
fn owner_id(claims: &Claims) -> Result<i64, AppError> {
    claims
        .user_id()
        .ok_or(AppError::Auth(AuthError::MalformedToken))
}

/// POST /tasks
pub async fn create_task(
    claims: web::ReqData<Claims>,
    body: web::Json<CreateTaskRequest>,
    store: web::Data<dyn TaskStore>,
) -> Result<HttpResponse, AppError> {
    let owner_id = owner_id(&claims)?;
    let body = body.into_inner();

    let task = NewTask {
        title: is_valid_title(&body.title)?,
        description: is_valid_description(body.description.as_deref())?,
        status: body.status,
    };

    let task = store.create(owner_id, task).await?;
    tracing::info!(user_id = owner_id, task_id = task.id, "Task created");

    Ok(HttpResponse::Created().json(task))
}

/// GET /tasks?status=&skip=&limit=
pub async fn list_tasks(
    claims: web::ReqData<Claims>,
    query: web::Query<ListTasksQuery>,
    store: web::Data<dyn TaskStore>,
) -> Result<HttpResponse, AppError> {
    let owner_id = owner_id(&claims)?;

    if query.skip < 0 {
        return Err(ValidationError::OutOfRange("skip".to_string()).into());
    }
    if query.limit < 0 {
        return Err(ValidationError::OutOfRange("limit".to_string()).into());
    }

    let filter = TaskFilter {
        status: query.status,
        skip: query.skip,
        limit: query.limit.min(MAX_LIMIT),
    };

    let tasks = store.list(owner_id, &filter).await?;
    Ok(HttpResponse::Ok().json(tasks))
}

/// GET /tasks/{task_id}
///
/// # Errors
/// - 404: no such task for this user
pub async fn get_task(
    claims: web::ReqData<Claims>,
    path: web::Path<i64>,
    store: web::Data<dyn TaskStore>,
) -> Result<HttpResponse, AppError> {
    let owner_id = owner_id(&claims)?;
    let task_id = path.into_inner();

    let task = store
        .get(owner_id, task_id)
        .await?
        .ok_or_else(|| DatabaseError::NotFound("Task not found".to_string()))?;

    Ok(HttpResponse::Ok().json(task))
}
