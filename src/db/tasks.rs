//! Task repository.
//!
//! Every function is a single statement, so each mutation commits on its own.
//! Searches use `instr`, which makes them case-sensitive.

use chrono::{DateTime, NaiveDate, Utc};
use sqlx::{FromRow, SqlitePool};

use crate::models::{Task, TaskFields, TaskWithAssignee, User};

const SELECT_TASKS: &str = "SELECT t.id, t.title, t.description, t.due_date, t.difficulty, \
     t.is_completed, t.user_id, \
     NULL AS assignee_username, NULL AS assignee_email, NULL AS assignee_full_name, \
     NULL AS assignee_created_at \
     FROM tasks t";

const SELECT_TASKS_WITH_ASSIGNEE: &str = "SELECT t.id, t.title, t.description, t.due_date, \
     t.difficulty, t.is_completed, t.user_id, \
     u.username AS assignee_username, u.email AS assignee_email, \
     u.full_name AS assignee_full_name, u.created_at AS assignee_created_at \
     FROM tasks t LEFT JOIN users u ON u.id = t.user_id";

#[derive(Debug, FromRow)]
struct TaskRow {
    id: i64,
    title: String,
    description: String,
    due_date: NaiveDate,
    difficulty: String,
    is_completed: bool,
    user_id: Option<String>,
    assignee_username: Option<String>,
    assignee_email: Option<String>,
    assignee_full_name: Option<String>,
    assignee_created_at: Option<DateTime<Utc>>,
}

impl From<TaskRow> for TaskWithAssignee {
    fn from(row: TaskRow) -> Self {
        let assignee = match (
            row.user_id.clone(),
            row.assignee_username,
            row.assignee_email,
            row.assignee_full_name,
            row.assignee_created_at,
        ) {
            (Some(id), Some(username), Some(email), Some(full_name), Some(created_at)) => {
                Some(User {
                    id,
                    username,
                    email,
                    full_name,
                    created_at,
                })
            }
            _ => None,
        };

        TaskWithAssignee {
            task: Task {
                id: row.id,
                title: row.title,
                description: row.description,
                due_date: row.due_date,
                difficulty: row.difficulty,
                is_completed: row.is_completed,
                user_id: row.user_id,
            },
            assignee,
        }
    }
}

fn select(include_assignee: bool) -> &'static str {
    if include_assignee {
        SELECT_TASKS_WITH_ASSIGNEE
    } else {
        SELECT_TASKS
    }
}

/// All tasks, or those whose title or description contains `search`.
pub async fn list_tasks(
    pool: &SqlitePool,
    search: Option<&str>,
    include_assignee: bool,
) -> Result<Vec<TaskWithAssignee>, sqlx::Error> {
    let sql = format!(
        "{} WHERE (?1 IS NULL OR instr(t.title, ?1) > 0 OR instr(t.description, ?1) > 0) \
         ORDER BY t.id",
        select(include_assignee)
    );

    let rows = sqlx::query_as::<_, TaskRow>(&sql)
        .bind(search)
        .fetch_all(pool)
        .await?;

    Ok(rows.into_iter().map(TaskWithAssignee::from).collect())
}

pub async fn find_task(
    pool: &SqlitePool,
    id: i64,
    include_assignee: bool,
) -> Result<Option<TaskWithAssignee>, sqlx::Error> {
    let sql = format!("{} WHERE t.id = ?1", select(include_assignee));

    let row = sqlx::query_as::<_, TaskRow>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?;

    Ok(row.map(TaskWithAssignee::from))
}

pub async fn task_exists(pool: &SqlitePool, id: i64) -> Result<bool, sqlx::Error> {
    sqlx::query_scalar::<_, bool>("SELECT EXISTS (SELECT 1 FROM tasks WHERE id = ?1)")
        .bind(id)
        .fetch_one(pool)
        .await
}

/// Inserts a task and returns its store-assigned id.
pub async fn insert_task(pool: &SqlitePool, fields: &TaskFields) -> Result<i64, sqlx::Error> {
    let result = sqlx::query(
        "INSERT INTO tasks (title, description, due_date, difficulty, is_completed, user_id) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
    )
    .bind(&fields.title)
    .bind(&fields.description)
    .bind(fields.due_date)
    .bind(&fields.difficulty)
    .bind(fields.is_completed)
    .bind(&fields.user_id)
    .execute(pool)
    .await?;

    Ok(result.last_insert_rowid())
}

/// Overwrites every mutable column. Returns the number of rows matched, which is zero
/// when the task vanished.
pub async fn update_task(
    pool: &SqlitePool,
    id: i64,
    fields: &TaskFields,
) -> Result<u64, sqlx::Error> {
    let result = sqlx::query(
        "UPDATE tasks \
         SET title = ?1, description = ?2, due_date = ?3, difficulty = ?4, \
             is_completed = ?5, user_id = ?6 \
         WHERE id = ?7",
    )
    .bind(&fields.title)
    .bind(&fields.description)
    .bind(fields.due_date)
    .bind(&fields.difficulty)
    .bind(fields.is_completed)
    .bind(&fields.user_id)
    .bind(id)
    .execute(pool)
    .await?;

    Ok(result.rows_affected())
}

pub async fn delete_task(pool: &SqlitePool, id: i64) -> Result<u64, sqlx::Error> {
    let result = sqlx::query("DELETE FROM tasks WHERE id = ?1")
        .bind(id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected())
}

/// Flips the completion flag in place.
pub async fn toggle_task(pool: &SqlitePool, id: i64) -> Result<u64, sqlx::Error> {
    let result = sqlx::query("UPDATE tasks SET is_completed = NOT is_completed WHERE id = ?1")
        .bind(id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
    use std::str::FromStr;

    async fn pool() -> SqlitePool {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")
            .unwrap()
            .foreign_keys(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await
            .unwrap();
        crate::db::initialize(&pool, false).await.unwrap();
        pool
    }

    fn fields(title: &str, description: &str) -> TaskFields {
        TaskFields {
            title: title.to_string(),
            description: description.to_string(),
            due_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            difficulty: "Medium".to_string(),
            is_completed: false,
            user_id: None,
        }
    }

    async fn titles(pool: &SqlitePool, search: Option<&str>) -> Vec<String> {
        list_tasks(pool, search, false)
            .await
            .unwrap()
            .into_iter()
            .map(|r| r.task.title)
            .collect()
    }

    #[actix_rt::test]
    async fn test_search_matches_title_or_description_case_sensitively() {
        let pool = pool().await;
        insert_task(&pool, &fields("Write spec", "")).await.unwrap();
        insert_task(&pool, &fields("Review", "spec review for Bob")).await.unwrap();
        insert_task(&pool, &fields("Deploy", "ship it")).await.unwrap();

        assert_eq!(titles(&pool, None).await.len(), 3);
        assert_eq!(titles(&pool, Some("spec")).await, vec!["Write spec", "Review"]);
        assert_eq!(titles(&pool, Some("Write")).await, vec!["Write spec"]);
        assert!(titles(&pool, Some("write")).await.is_empty());
        assert!(titles(&pool, Some("SPEC")).await.is_empty());
    }

    #[actix_rt::test]
    async fn test_toggle_and_delete_missing_rows_are_noops() {
        let pool = pool().await;
        assert_eq!(toggle_task(&pool, 99).await.unwrap(), 0);
        assert_eq!(delete_task(&pool, 99).await.unwrap(), 0);

        let id = insert_task(&pool, &fields("Toggle me", "")).await.unwrap();
        toggle_task(&pool, id).await.unwrap();
        assert!(find_task(&pool, id, false).await.unwrap().unwrap().task.is_completed);
        toggle_task(&pool, id).await.unwrap();
        assert!(!find_task(&pool, id, false).await.unwrap().unwrap().task.is_completed);
    }

    #[actix_rt::test]
    async fn test_update_reports_vanished_rows() {
        let pool = pool().await;
        let id = insert_task(&pool, &fields("Original", "")).await.unwrap();

        let mut changes = fields("Changed", "now with text");
        changes.is_completed = true;
        assert_eq!(update_task(&pool, id, &changes).await.unwrap(), 1);

        let stored = find_task(&pool, id, true).await.unwrap().unwrap();
        assert_eq!(stored.task.title, "Changed");
        assert!(stored.task.is_completed);
        assert!(stored.assignee.is_none());

        delete_task(&pool, id).await.unwrap();
        assert_eq!(update_task(&pool, id, &changes).await.unwrap(), 0);
        assert!(!task_exists(&pool, id).await.unwrap());
    }

    #[actix_rt::test]
    async fn test_unknown_assignee_is_rejected_by_store() {
        let pool = pool().await;
        let mut orphan = fields("Orphan", "");
        orphan.user_id = Some("no-such-user".to_string());
        assert!(insert_task(&pool, &orphan).await.is_err());
    }
}
