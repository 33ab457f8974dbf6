/// Persistence collaborators
///
/// The auth core and the task routes only see these traits; Postgres and an
/// in-process store implement them.

mod memory;
mod models;
mod postgres;

use async_trait::async_trait;

use crate::error::DatabaseError;

pub use memory::InMemoryStore;
pub use models::{Credential, NewCredential, NewTask, Task, TaskFilter, TaskStatus};
pub use postgres::PgStore;

#[async_trait]
pub trait CredentialStore: Send + Sync {
    async fn find_by_subject(&self, subject: &str) -> Result<Option<Credential>, DatabaseError>;

    /// Must fail with `DatabaseError::UniqueConstraintViolation` if the subject
    /// exists, including when two inserts for one subject race.
    async fn insert(&self, credential: NewCredential) -> Result<Credential, DatabaseError>;
}

#[async_trait]
pub trait TaskStore: Send + Sync {
    async fn create(&self, owner_id: i64, task: NewTask) -> Result<Task, DatabaseError>;

    async fn list(&self, owner_id: i64, filter: &TaskFilter) -> Result<Vec<Task>, DatabaseError>;

    async fn get(&self, owner_id: i64, task_id: i64) -> Result<Option<Task>, DatabaseError>;
}
