use std::collections::{BTreeMap, HashMap};
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::Utc;

use super::models::{Credential, NewCredential, NewTask, Task, TaskFilter};
use super::{CredentialStore, TaskStore};
use crate::error::DatabaseError;

#[derive(Default)]
struct State {
    credentials: HashMap<String, Credential>,
    tasks: BTreeMap<i64, Task>,
    next_user_id: i64,
    next_task_id: i64,
}

/// Process-local store. Uniqueness is enforced under a single lock, so
/// concurrent signups for one subject cannot both succeed.
#[derive(Default)]
pub struct InMemoryStore {
    state: Mutex<State>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, State>, DatabaseError> {
        self.state
            .lock()
            .map_err(|_| DatabaseError::UnexpectedError("in-memory store lock poisoned".to_string()))
    }
}

#[async_trait]
impl CredentialStore for InMemoryStore {
    async fn find_by_subject(&self, subject: &str) -> Result<Option<Credential>, DatabaseError> {
        Ok(self.lock()?.credentials.get(subject).cloned())
    }

    async fn insert(&self, credential: NewCredential) -> Result<Credential, DatabaseError> {
        let mut state = self.lock()?;

        if state.credentials.contains_key(&credential.subject) {
            return Err(DatabaseError::UniqueConstraintViolation(format!(
                "username {} already exists",
                credential.subject
            )));
        }

        state.next_user_id += 1;
        let stored = Credential {
            id: state.next_user_id,
            subject: credential.subject,
            password_hash: credential.password_hash,
            role: credential.role,
            created_at: Utc::now(),
        };
        state
            .credentials
            .insert(stored.subject.clone(), stored.clone());

        Ok(stored)
    }
}

#[async_trait]
impl TaskStore for InMemoryStore {
    async fn create(&self, owner_id: i64, task: NewTask) -> Result<Task, DatabaseError> {
        let mut state = self.lock()?;

        state.next_task_id += 1;
        let stored = Task {
            id: state.next_task_id,
            owner_id,
            title: task.title,
            description: task.description,
            status: task.status,
            created_at: Utc::now(),
        };
        state.tasks.insert(stored.id, stored.clone());

        Ok(stored)
    }

    async fn list(&self, owner_id: i64, filter: &TaskFilter) -> Result<Vec<Task>, DatabaseError> {
        let state = self.lock()?;
        let skip = usize::try_from(filter.skip).unwrap_or(0);
        let limit = usize::try_from(filter.limit).unwrap_or(0);

        Ok(state
            .tasks
            .values()
            .filter(|task| task.owner_id == owner_id)
            .filter(|task| filter.status.map_or(true, |status| task.status == status))
            .skip(skip)
            .take(limit)
            .cloned()
            .collect())
    }

    async fn get(&self, owner_id: i64, task_id: i64) -> Result<Option<Task>, DatabaseError> {
        Ok(self
            .lock()?
            .tasks
            .get(&task_id)
            .filter(|task| task.owner_id == owner_id)
            .cloned())
    }
}
