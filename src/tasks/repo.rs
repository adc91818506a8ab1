use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;
use uuid::Uuid;

/// Task record in the database. `uid` is the owning user and is set once at
/// creation. `created_at`/`updated_at` are maintained by the store (column
/// default plus an update trigger), never by this code.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub hex_color: String,
    pub uid: Uuid,
    #[serde(with = "time::serde::rfc3339")]
    pub due_date: OffsetDateTime,
    pub is_completed: bool,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl Task {
    /// Insert a task for `uid`. The id is the client-supplied one when
    /// present, otherwise freshly generated by the caller.
    pub async fn create(
        db: &PgPool,
        id: Uuid,
        uid: Uuid,
        title: &str,
        description: &str,
        hex_color: &str,
        due_date: OffsetDateTime,
    ) -> anyhow::Result<Task> {
        let task = sqlx::query_as::<_, Task>(
            r#"
            INSERT INTO tasks (id, title, description, hex_color, uid, due_date)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, title, description, hex_color, uid, due_date,
                      is_completed, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(title)
        .bind(description)
        .bind(hex_color)
        .bind(uid)
        .bind(due_date)
        .fetch_one(db)
        .await?;
        Ok(task)
    }

    /// All tasks owned by `uid`, in the store's natural order.
    pub async fn list_by_owner(db: &PgPool, uid: Uuid) -> anyhow::Result<Vec<Task>> {
        let tasks = sqlx::query_as::<_, Task>(
            r#"
            SELECT id, title, description, hex_color, uid, due_date,
                   is_completed, created_at, updated_at
            FROM tasks
            WHERE uid = $1
            "#,
        )
        .bind(uid)
        .fetch_all(db)
        .await?;
        Ok(tasks)
    }

    pub async fn find_by_id(db: &PgPool, id: Uuid) -> anyhow::Result<Option<Task>> {
        let task = sqlx::query_as::<_, Task>(
            r#"
            SELECT id, title, description, hex_color, uid, due_date,
                   is_completed, created_at, updated_at
            FROM tasks
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(db)
        .await?;
        Ok(task)
    }

    /// Flip the completion flag. Scoped to the owner; `None` means the task
    /// does not exist or belongs to someone else.
    pub async fn set_completed(
        db: &PgPool,
        id: Uuid,
        uid: Uuid,
        is_completed: bool,
    ) -> anyhow::Result<Option<Task>> {
        let task = sqlx::query_as::<_, Task>(
            r#"
            UPDATE tasks
            SET is_completed = $3
            WHERE id = $1 AND uid = $2
            RETURNING id, title, description, hex_color, uid, due_date,
                      is_completed, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(uid)
        .bind(is_completed)
        .fetch_optional(db)
        .await?;
        Ok(task)
    }

    /// Partial update. A `None` field keeps the stored value (COALESCE), so
    /// an omitted `dueDate` is never overwritten. Scoped to the owner.
    pub async fn update_fields(
        db: &PgPool,
        id: Uuid,
        uid: Uuid,
        title: Option<&str>,
        description: Option<&str>,
        hex_color: Option<&str>,
        due_date: Option<OffsetDateTime>,
    ) -> anyhow::Result<Option<Task>> {
        let task = sqlx::query_as::<_, Task>(
            r#"
            UPDATE tasks
            SET title = COALESCE($3, title),
                description = COALESCE($4, description),
                hex_color = COALESCE($5, hex_color),
                due_date = COALESCE($6, due_date)
            WHERE id = $1 AND uid = $2
            RETURNING id, title, description, hex_color, uid, due_date,
                      is_completed, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(uid)
        .bind(title)
        .bind(description)
        .bind(hex_color)
        .bind(due_date)
        .fetch_optional(db)
        .await?;
        Ok(task)
    }

    /// Delete, scoped to the owner. Returns whether a row was removed.
    pub async fn delete(db: &PgPool, id: Uuid, uid: Uuid) -> anyhow::Result<bool> {
        let result = sqlx::query(
            r#"
            DELETE FROM tasks
            WHERE id = $1 AND uid = $2
            "#,
        )
        .bind(id)
        .bind(uid)
        .execute(db)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn task_serializes_with_wire_field_names() {
        let now = OffsetDateTime::now_utc();
        let task = Task {
            id: Uuid::new_v4(),
            title: "T".into(),
            description: "D".into(),
            hex_color: "#fff".into(),
            uid: Uuid::new_v4(),
            due_date: now,
            is_completed: false,
            created_at: now,
            updated_at: now,
        };
        let v: serde_json::Value = serde_json::to_value(&task).unwrap();
        assert_eq!(v["hexColor"], "#fff");
        assert_eq!(v["isCompleted"], false);
        assert!(v["dueDate"].is_string());
        assert!(v["createdAt"].is_string());
        assert!(v["updatedAt"].is_string());
        assert!(v.get("hex_color").is_none());
    }
}
