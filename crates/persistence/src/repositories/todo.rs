//! To-do repository.

use domain::models::todo::{CreateTodoRequest, ListTodosQuery, UpdateTodoRequest};
use domain::models::Todo;
use sqlx::PgPool;
use uuid::Uuid;

use crate::entities::TodoEntity;
use crate::metrics::QueryTimer;

const TODO_COLUMNS: &str =
    "id, user_id, title, due_date, completed, completed_at, created_at, updated_at";

/// Repository for to-do database operations.
#[derive(Clone)]
pub struct TodoRepository {
    pool: PgPool,
}

impl TodoRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, user_id: Uuid, request: &CreateTodoRequest) -> Result<Todo, sqlx::Error> {
        let timer = QueryTimer::new("create_todo");
        let sql = format!(
            "INSERT INTO todos (user_id, title, due_date) VALUES ($1, $2, $3) RETURNING {TODO_COLUMNS}"
        );
        let result = sqlx::query_as::<_, TodoEntity>(&sql)
            .bind(user_id)
            .bind(request.title.trim())
            .bind(request.due_date)
            .fetch_one(&self.pool)
            .await;
        timer.record();
        Ok(result?.into())
    }

    pub async fn find_by_id(&self, user_id: Uuid, id: Uuid) -> Result<Option<Todo>, sqlx::Error> {
        let timer = QueryTimer::new("find_todo_by_id");
        let sql = format!("SELECT {TODO_COLUMNS} FROM todos WHERE id = $1 AND user_id = $2");
        let result = sqlx::query_as::<_, TodoEntity>(&sql)
            .bind(id)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await;
        timer.record();
        Ok(result?.map(Into::into))
    }

    /// Open items first, then by due date with undated items last.
    pub async fn list(&self, user_id: Uuid, query: &ListTodosQuery) -> Result<Vec<Todo>, sqlx::Error> {
        let timer = QueryTimer::new("list_todos");
        let sql = format!(
            r#"
            SELECT {TODO_COLUMNS}
            FROM todos
            WHERE user_id = $1 AND ($2::boolean IS NULL OR completed = $2)
            ORDER BY completed ASC, due_date ASC NULLS LAST, created_at ASC
            "#
        );
        let result = sqlx::query_as::<_, TodoEntity>(&sql)
            .bind(user_id)
            .bind(query.completed)
            .fetch_all(&self.pool)
            .await;
        timer.record();
        Ok(result?.into_iter().map(Into::into).collect())
    }

    /// Partial update. `completed_at` follows the `completed` flag.
    pub async fn update(
        &self,
        user_id: Uuid,
        id: Uuid,
        request: &UpdateTodoRequest,
    ) -> Result<Option<Todo>, sqlx::Error> {
        let timer = QueryTimer::new("update_todo");
        let sql = format!(
            r#"
            UPDATE todos
            SET
                title = COALESCE($3, title),
                due_date = COALESCE($4, due_date),
                completed = COALESCE($5, completed),
                completed_at = CASE
                    WHEN $5::boolean IS NULL THEN completed_at
                    WHEN $5 AND NOT completed THEN NOW()
                    WHEN $5 THEN completed_at
                    ELSE NULL
                END
            WHERE id = $1 AND user_id = $2
            RETURNING {TODO_COLUMNS}
            "#
        );
        let result = sqlx::query_as::<_, TodoEntity>(&sql)
            .bind(id)
            .bind(user_id)
            .bind(request.title.as_deref().map(str::trim))
            .bind(request.due_date)
            .bind(request.completed)
            .fetch_optional(&self.pool)
            .await;
        timer.record();
        Ok(result?.map(Into::into))
    }

    /// Flips the completion flag.
    pub async fn toggle(&self, user_id: Uuid, id: Uuid) -> Result<Option<Todo>, sqlx::Error> {
        let timer = QueryTimer::new("toggle_todo");
        let sql = format!(
            r#"
            UPDATE todos
            SET completed = NOT completed,
                completed_at = CASE WHEN completed THEN NULL ELSE NOW() END
            WHERE id = $1 AND user_id = $2
            RETURNING {TODO_COLUMNS}
            "#
        );
        let result = sqlx::query_as::<_, TodoEntity>(&sql)
            .bind(id)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await;
        timer.record();
        Ok(result?.map(Into::into))
    }

    pub async fn delete(&self, user_id: Uuid, id: Uuid) -> Result<bool, sqlx::Error> {
        let timer = QueryTimer::new("delete_todo");
        let result = sqlx::query("DELETE FROM todos WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(&self.pool)
            .await;
        timer.record();
        Ok(result?.rows_affected() > 0)
    }
}
