//! Note repository.

use domain::models::note::{CreateNoteRequest, ListNotesQuery, UpdateNoteRequest};
use domain::models::Note;
use sqlx::PgPool;
use uuid::Uuid;

use crate::entities::NoteEntity;
use crate::metrics::QueryTimer;

const NOTE_COLUMNS: &str = "id, user_id, title, content, patient_id, created_at, updated_at";

/// Repository for note database operations.
#[derive(Clone)]
pub struct NoteRepository {
    pool: PgPool,
}

impl NoteRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, user_id: Uuid, request: &CreateNoteRequest) -> Result<Note, sqlx::Error> {
        let timer = QueryTimer::new("create_note");
        let sql = format!(
            r#"
            INSERT INTO notes (user_id, title, content, patient_id)
            VALUES ($1, $2, $3, $4)
            RETURNING {NOTE_COLUMNS}
            "#
        );
        let result = sqlx::query_as::<_, NoteEntity>(&sql)
            .bind(user_id)
            .bind(request.title.trim())
            .bind(&request.content)
            .bind(request.patient_id)
            .fetch_one(&self.pool)
            .await;
        timer.record();
        Ok(result?.into())
    }

    pub async fn find_by_id(&self, user_id: Uuid, id: Uuid) -> Result<Option<Note>, sqlx::Error> {
        let timer = QueryTimer::new("find_note_by_id");
        let sql = format!("SELECT {NOTE_COLUMNS} FROM notes WHERE id = $1 AND user_id = $2");
        let result = sqlx::query_as::<_, NoteEntity>(&sql)
            .bind(id)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await;
        timer.record();
        Ok(result?.map(Into::into))
    }

    pub async fn list(&self, user_id: Uuid, query: &ListNotesQuery) -> Result<Vec<Note>, sqlx::Error> {
        let timer = QueryTimer::new("list_notes");
        let sql = format!(
            r#"
            SELECT {NOTE_COLUMNS}
            FROM notes
            WHERE user_id = $1 AND ($2::uuid IS NULL OR patient_id = $2)
            ORDER BY updated_at DESC
            "#
        );
        let result = sqlx::query_as::<_, NoteEntity>(&sql)
            .bind(user_id)
            .bind(query.patient_id)
            .fetch_all(&self.pool)
            .await;
        timer.record();
        Ok(result?.into_iter().map(Into::into).collect())
    }

    pub async fn update(
        &self,
        user_id: Uuid,
        id: Uuid,
        request: &UpdateNoteRequest,
    ) -> Result<Option<Note>, sqlx::Error> {
        let timer = QueryTimer::new("update_note");
        let sql = format!(
            r#"
            UPDATE notes
            SET
                title = COALESCE($3, title),
                content = COALESCE($4, content),
                patient_id = COALESCE($5, patient_id)
            WHERE id = $1 AND user_id = $2
            RETURNING {NOTE_COLUMNS}
            "#
        );
        let result = sqlx::query_as::<_, NoteEntity>(&sql)
            .bind(id)
            .bind(user_id)
            .bind(request.title.as_deref().map(str::trim))
            .bind(&request.content)
            .bind(request.patient_id)
            .fetch_optional(&self.pool)
            .await;
        timer.record();
        Ok(result?.map(Into::into))
    }

    pub async fn delete(&self, user_id: Uuid, id: Uuid) -> Result<bool, sqlx::Error> {
        let timer = QueryTimer::new("delete_note");
        let result = sqlx::query("DELETE FROM notes WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(&self.pool)
            .await;
        timer.record();
        Ok(result?.rows_affected() > 0)
    }
}
