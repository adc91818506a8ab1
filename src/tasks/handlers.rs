use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{post, put},
    Json, Router,
};
use sqlx::PgPool;
use time::OffsetDateTime;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::{
    auth::AuthSession,
    error::ApiError,
    state::AppState,
    tasks::{
        dto::{CreateTaskRequest, MessageResponse, SyncTaskRequest, UpdateTaskRequest},
        repo::Task,
    },
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_task).get(list_tasks))
        .route("/sync", post(sync_task))
        .route("/:task_id", put(update_task).delete(delete_task))
}

#[instrument(skip(state, session, payload))]
pub async fn create_task(
    State(state): State<AppState>,
    session: AuthSession,
    Json(payload): Json<CreateTaskRequest>,
) -> Result<(StatusCode, Json<Task>), ApiError> {
    let id = payload.id.unwrap_or_else(Uuid::new_v4);
    let due_date = payload.due_date.unwrap_or_else(OffsetDateTime::now_utc);

    // The owner is always the authenticated caller, whatever the body says.
    let task = Task::create(
        &state.db,
        id,
        session.user_id,
        &payload.title,
        &payload.description,
        &payload.hex_color,
        due_date,
    )
    .await?;

    info!(task_id = %task.id, uid = %task.uid, "task created");
    Ok((StatusCode::CREATED, Json(task)))
}

#[instrument(skip(state, session))]
pub async fn list_tasks(
    State(state): State<AppState>,
    session: AuthSession,
) -> Result<Json<Vec<Task>>, ApiError> {
    let tasks = Task::list_by_owner(&state.db, session.user_id).await?;
    Ok(Json(tasks))
}

#[instrument(skip(state, session, payload))]
pub async fn sync_task(
    State(state): State<AppState>,
    session: AuthSession,
    Json(payload): Json<SyncTaskRequest>,
) -> Result<Json<Task>, ApiError> {
    let id = payload
        .id
        .ok_or(ApiError::Validation("Task ID is required"))?;

    match Task::set_completed(&state.db, id, session.user_id, payload.is_completed).await? {
        Some(task) => {
            info!(task_id = %task.id, is_completed = task.is_completed, "task synced");
            Ok(Json(task))
        }
        None => Err(not_owned_or_missing(&state.db, id).await?),
    }
}

#[instrument(skip(state, session, payload))]
pub async fn update_task(
    State(state): State<AppState>,
    session: AuthSession,
    Path(task_id): Path<Uuid>,
    Json(payload): Json<UpdateTaskRequest>,
) -> Result<Json<Task>, ApiError> {
    let updated = Task::update_fields(
        &state.db,
        task_id,
        session.user_id,
        payload.title.as_deref(),
        payload.description.as_deref(),
        payload.hex_color.as_deref(),
        payload.due_date,
    )
    .await?;

    match updated {
        Some(task) => {
            info!(task_id = %task.id, "task updated");
            Ok(Json(task))
        }
        None => Err(not_owned_or_missing(&state.db, task_id).await?),
    }
}

#[instrument(skip(state, session))]
pub async fn delete_task(
    State(state): State<AppState>,
    session: AuthSession,
    Path(task_id): Path<Uuid>,
) -> Result<Json<MessageResponse>, ApiError> {
    if Task::delete(&state.db, task_id, session.user_id).await? {
        info!(%task_id, "task deleted");
        Ok(Json(MessageResponse {
            message: "Task deleted successfully".into(),
        }))
    } else {
        Err(not_owned_or_missing(&state.db, task_id).await?)
    }
}

/// An owner-scoped mutation matched no row: tell apart "someone else's task"
/// (403) from "no such task" (404).
async fn not_owned_or_missing(db: &PgPool, task_id: Uuid) -> anyhow::Result<ApiError> {
    Ok(match Task::find_by_id(db, task_id).await? {
        Some(_) => ApiError::Forbidden,
        None => ApiError::NotFound("Task not found"),
    })
}
