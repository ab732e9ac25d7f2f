use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::Mutex;
use sea_orm::DbErr;
use thiserror::Error;

use crate::employee::Employee;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error(transparent)]
    Db(#[from] DbErr),
    #[error("employee {0} does not exist")]
    Missing(i64),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Persistence for employee records keyed by id. Each call is atomic on its own;
/// callers never rely on more than that.
#[async_trait]
pub trait EmployeeStore: Send + Sync {
    /// Every record, ascending by id.
    async fn list_all(&self) -> StoreResult<Vec<Employee>>;

    async fn find_by_id(&self, id: i64) -> StoreResult<Option<Employee>>;

    /// Insert when `id` is `None`, otherwise update the existing row.
    /// Inserts assign `id` and `created_at`; updates never touch `created_at`.
    async fn save(&self, employee: Employee) -> StoreResult<Employee>;

    async fn delete_by_id(&self, id: i64) -> StoreResult<()>;
}

/// Process-local store. Ids come from a sequence and are never reused.
#[derive(Debug, Default)]
pub struct MemoryEmployeeStore {
    state: Mutex<MemoryState>,
}

#[derive(Debug, Default)]
struct MemoryState {
    last_id: i64,
    rows: BTreeMap<i64, Employee>,
}

impl MemoryEmployeeStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl EmployeeStore for MemoryEmployeeStore {
    async fn list_all(&self) -> StoreResult<Vec<Employee>> {
        Ok(self.state.lock().rows.values().cloned().collect())
    }

    async fn find_by_id(&self, id: i64) -> StoreResult<Option<Employee>> {
        Ok(self.state.lock().rows.get(&id).cloned())
    }

    async fn save(&self, mut employee: Employee) -> StoreResult<Employee> {
        let now = Utc::now();
        let mut state = self.state.lock();
        match employee.id {
            None => {
                state.last_id += 1;
                let id = state.last_id;
                employee.id = Some(id);
                let created_at = employee.created_at.unwrap_or(now);
                employee.created_at = Some(created_at);
                employee.updated_at = Some(employee.updated_at.unwrap_or(created_at));
                state.rows.insert(id, employee.clone());
            }
            Some(id) => {
                let row = state.rows.get_mut(&id).ok_or(StoreError::Missing(id))?;
                employee.created_at = row.created_at;
                employee.updated_at = Some(employee.updated_at.unwrap_or(now));
                *row = employee.clone();
            }
        }
        Ok(employee)
    }

    async fn delete_by_id(&self, id: i64) -> StoreResult<()> {
        self.state.lock().rows.remove(&id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::employee::EmployeePayload;

    #[tokio::test]
    async fn ids_are_sequential_and_never_reused() {
        let store = MemoryEmployeeStore::new();
        let first = store
            .save(Employee::from_payload(EmployeePayload::new("a", "1", "x")))
            .await
            .unwrap();
        let second = store
            .save(Employee::from_payload(EmployeePayload::new("b", "2", "y")))
            .await
            .unwrap();
        assert_eq!((first.id, second.id), (Some(1), Some(2)));
        assert!(first.created_at.is_some());

        store.delete_by_id(2).await.unwrap();
        let third = store
            .save(Employee::from_payload(EmployeePayload::new("c", "3", "z")))
            .await
            .unwrap();
        assert_eq!(third.id, Some(3));

        let ids: Vec<_> = store
            .list_all()
            .await
            .unwrap()
            .into_iter()
            .map(|e| e.id)
            .collect();
        assert_eq!(ids, vec![Some(1), Some(3)]);
    }

    #[tokio::test]
    async fn update_preserves_created_at_and_rejects_unknown_ids() {
        let store = MemoryEmployeeStore::new();
        let saved = store
            .save(Employee::from_payload(EmployeePayload::new("a", "1", "x")))
            .await
            .unwrap();
        let mut changed = saved.clone();
        changed.name = "renamed".into();
        changed.created_at = None;
        let updated = store.save(changed).await.unwrap();
        assert_eq!(updated.created_at, saved.created_at);
        assert_eq!(updated.name, "renamed");

        let mut ghost = saved;
        ghost.id = Some(404);
        assert!(matches!(store.save(ghost).await, Err(StoreError::Missing(404))));
    }
}
