//! Goal repository.

use domain::models::goal::{CreateGoalRequest, ListGoalsQuery, UpdateGoalRequest};
use domain::models::Goal;
use sqlx::PgPool;
use uuid::Uuid;

use crate::entities::{GoalEntity, GoalStatusDb};
use crate::metrics::QueryTimer;

const GOAL_COLUMNS: &str = "id, user_id, title, description, target_value, current_value, unit, due_date, status, created_at, updated_at";

/// Repository for goal database operations.
#[derive(Clone)]
pub struct GoalRepository {
    pool: PgPool,
}

impl GoalRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, user_id: Uuid, request: &CreateGoalRequest) -> Result<Goal, sqlx::Error> {
        let timer = QueryTimer::new("create_goal");
        let sql = format!(
            r#"
            INSERT INTO goals (user_id, title, description, target_value, current_value, unit, due_date, status)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING {GOAL_COLUMNS}
            "#
        );
        let result = sqlx::query_as::<_, GoalEntity>(&sql)
            .bind(user_id)
            .bind(request.title.trim())
            .bind(&request.description)
            .bind(request.target_value)
            .bind(request.current_value)
            .bind(&request.unit)
            .bind(request.due_date)
            .bind(GoalStatusDb::from(request.status))
            .fetch_one(&self.pool)
            .await;
        timer.record();
        Ok(result?.into())
    }

    pub async fn find_by_id(&self, user_id: Uuid, id: Uuid) -> Result<Option<Goal>, sqlx::Error> {
        let timer = QueryTimer::new("find_goal_by_id");
        let sql = format!("SELECT {GOAL_COLUMNS} FROM goals WHERE id = $1 AND user_id = $2");
        let result = sqlx::query_as::<_, GoalEntity>(&sql)
            .bind(id)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await;
        timer.record();
        Ok(result?.map(Into::into))
    }

    pub async fn list(&self, user_id: Uuid, query: &ListGoalsQuery) -> Result<Vec<Goal>, sqlx::Error> {
        let timer = QueryTimer::new("list_goals");
        let sql = format!(
            r#"
            SELECT {GOAL_COLUMNS}
            FROM goals
            WHERE user_id = $1 AND ($2::goal_status IS NULL OR status = $2)
            ORDER BY due_date ASC NULLS LAST, created_at DESC
            "#
        );
        let result = sqlx::query_as::<_, GoalEntity>(&sql)
            .bind(user_id)
            .bind(query.status.map(GoalStatusDb::from))
            .fetch_all(&self.pool)
            .await;
        timer.record();
        Ok(result?.into_iter().map(Into::into).collect())
    }

    pub async fn update(
        &self,
        user_id: Uuid,
        id: Uuid,
        request: &UpdateGoalRequest,
    ) -> Result<Option<Goal>, sqlx::Error> {
        let timer = QueryTimer::new("update_goal");
        let sql = format!(
            r#"
            UPDATE goals
            SET
                title = COALESCE($3, title),
                description = COALESCE($4, description),
                target_value = COALESCE($5, target_value),
                current_value = COALESCE($6, current_value),
                unit = COALESCE($7, unit),
                due_date = COALESCE($8, due_date),
                status = COALESCE($9, status)
            WHERE id = $1 AND user_id = $2
            RETURNING {GOAL_COLUMNS}
            "#
        );
        let result = sqlx::query_as::<_, GoalEntity>(&sql)
            .bind(id)
            .bind(user_id)
            .bind(request.title.as_deref().map(str::trim))
            .bind(&request.description)
            .bind(request.target_value)
            .bind(request.current_value)
            .bind(&request.unit)
            .bind(request.due_date)
            .bind(request.status.map(GoalStatusDb::from))
            .fetch_optional(&self.pool)
            .await;
        timer.record();
        Ok(result?.map(Into::into))
    }

    pub async fn delete(&self, user_id: Uuid, id: Uuid) -> Result<bool, sqlx::Error> {
        let timer = QueryTimer::new("delete_goal");
        let result = sqlx::query("DELETE FROM goals WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(&self.pool)
            .await;
        timer.record();
        Ok(result?.rows_affected() > 0)
    }
}
