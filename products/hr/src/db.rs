use async_trait::async_trait;
use chrono::Utc;
use entity::employees;
use platform_db::DbPool;
use sea_orm::{
    ActiveModelTrait,
    ActiveValue::{NotSet, Set, Unchanged},
    EntityTrait, QueryOrder,
};

use crate::{
    employee::Employee,
    store::{EmployeeStore, StoreResult},
};

/// [`EmployeeStore`] backed by the `employee` table.
#[derive(Clone, Debug)]
pub struct SeaOrmEmployeeStore {
    pool: DbPool,
}

impl SeaOrmEmployeeStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl EmployeeStore for SeaOrmEmployeeStore {
    async fn list_all(&self) -> StoreResult<Vec<Employee>> {
        let rows = employees::Entity::find()
            .order_by_asc(employees::Column::Id)
            .all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(Employee::from).collect())
    }

    async fn find_by_id(&self, id: i64) -> StoreResult<Option<Employee>> {
        let row = employees::Entity::find_by_id(id).one(&self.pool).await?;
        Ok(row.map(Employee::from))
    }

    async fn save(&self, employee: Employee) -> StoreResult<Employee> {
        let now = Utc::now();
        let model = match employee.id {
            None => {
                let created_at = employee.created_at.unwrap_or(now);
                employees::ActiveModel {
                    id: NotSet,
                    name: Set(employee.name),
                    salary: Set(employee.salary),
                    department: Set(employee.department),
                    created_at: Set(created_at.into()),
                    updated_at: Set(employee.updated_at.unwrap_or(created_at).into()),
                }
                .insert(&self.pool)
                .await?
            }
            Some(id) => {
                employees::ActiveModel {
                    id: Unchanged(id),
                    name: Set(employee.name),
                    salary: Set(employee.salary),
                    department: Set(employee.department),
                    created_at: NotSet,
                    updated_at: Set(employee.updated_at.unwrap_or(now).into()),
                }
                .update(&self.pool)
                .await?
            }
        };
        Ok(model.into())
    }

    async fn delete_by_id(&self, id: i64) -> StoreResult<()> {
        employees::Entity::delete_by_id(id).exec(&self.pool).await?;
        Ok(())
    }
}
