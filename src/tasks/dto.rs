use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

/// Body for `POST /tasks/`. A client-supplied `id` is trusted verbatim
/// (offline clients generate their own); `dueDate` falls back to "now".
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTaskRequest {
    #[serde(default)]
    pub id: Option<Uuid>,
    pub title: String,
    pub description: String,
    pub hex_color: String,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub due_date: Option<OffsetDateTime>,
}

/// Body for `POST /tasks/sync`. `id` is optional at the serde level so a
/// missing id surfaces as the dedicated 400 instead of a decode error.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncTaskRequest {
    #[serde(default)]
    pub id: Option<Uuid>,
    pub is_completed: bool,
}

/// Body for `PUT /tasks/:taskId`. Omitted fields are left untouched.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTaskRequest {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub hex_color: Option<String>,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub due_date: Option<OffsetDateTime>,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}
