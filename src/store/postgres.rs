use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use super::models::{Credential, NewCredential, NewTask, Task, TaskFilter, TaskStatus};
use super::{CredentialStore, TaskStore};
use crate::error::DatabaseError;

/// Postgres-backed store. The `users.username` unique index is what makes
/// concurrent signups for one subject fail.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

type TaskRow = (i64, i64, String, Option<String>, String, DateTime<Utc>);

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn task_from_row(row: TaskRow) -> Result<Task, DatabaseError> {
        let (id, owner_id, title, description, status, created_at) = row;
        let status = status
            .parse::<TaskStatus>()
            .map_err(DatabaseError::UnexpectedError)?;

        Ok(Task {
            id,
            owner_id,
            title,
            description,
            status,
            created_at,
        })
    }
}

#[async_trait]
impl CredentialStore for PgStore {
    async fn find_by_subject(&self, subject: &str) -> Result<Option<Credential>, DatabaseError> {
        let row = sqlx::query_as::<_, (i64, String, String, String, DateTime<Utc>)>(
            "SELECT id, username, password_hash, role, created_at FROM users WHERE username = $1",
        )
        .bind(subject)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|(id, subject, password_hash, role, created_at)| Credential {
            id,
            subject,
            password_hash,
            role,
            created_at,
        }))
    }

    async fn insert(&self, credential: NewCredential) -> Result<Credential, DatabaseError> {
        let (id, created_at) = sqlx::query_as::<_, (i64, DateTime<Utc>)>(
            r#"
            INSERT INTO users (username, password_hash, role)
            VALUES ($1, $2, $3)
            RETURNING id, created_at
            "#,
        )
        .bind(&credential.subject)
        .bind(&credential.password_hash)
        .bind(&credential.role)
        .fetch_one(&self.pool)
        .await?;

        Ok(Credential {
            id,
            subject: credential.subject,
            password_hash: credential.password_hash,
            role: credential.role,
            created_at,
        })
    }
}

#[async_trait]
impl TaskStore for PgStore {
    async fn create(&self, owner_id: i64, task: NewTask) -> Result<Task, DatabaseError> {
        let (id, created_at) = sqlx::query_as::<_, (i64, DateTime<Utc>)>(
            r#"
            INSERT INTO tasks (owner_id, title, description, status)
            VALUES ($1, $2, $3, $4)
            RETURNING id, created_at
            "#,
        )
        .bind(owner_id)
        .bind(&task.title)
        .bind(&task.description)
        .bind(task.status.as_str())
        .fetch_one(&self.pool)
        .await?;

        Ok(Task {
            id,
            owner_id,
            title: task.title,
            description: task.description,
            status: task.status,
            created_at,
        })
    }

    async fn list(&self, owner_id: i64, filter: &TaskFilter) -> Result<Vec<Task>, DatabaseError> {
        let rows = sqlx::query_as::<_, TaskRow>(
            r#"
            SELECT id, owner_id, title, description, status, created_at
            FROM tasks
            WHERE owner_id = $1 AND ($2::TEXT IS NULL OR status = $2)
            ORDER BY id
            OFFSET $3
            LIMIT $4
            "#,
        )
        .bind(owner_id)
        .bind(filter.status.map(|s| s.as_str()))
        .bind(filter.skip)
        .bind(filter.limit)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Self::task_from_row).collect()
    }

    async fn get(&self, owner_id: i64, task_id: i64) -> Result<Option<Task>, DatabaseError> {
        let row = sqlx::query_as::<_, TaskRow>(
            r#"
            SELECT id, owner_id, title, description, status, created_at
            FROM tasks
            WHERE id = $1 AND owner_id = $2
            "#,
        )
        .bind(task_id)
        .bind(owner_id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Self::task_from_row).transpose()
    }
}
