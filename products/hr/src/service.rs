use std::sync::Arc;

use chrono::Utc;
use platform_api::{ApiError, ApiResult, MessageResponse};
use tracing::{debug, info, instrument};

use crate::{
    cache::{Lookup, ReadCache},
    employee::{Employee, EmployeePayload},
    store::{EmployeeStore, StoreError},
    validate::{EmployeeValidator, parse_employee_id},
};

pub const INVALID_ID: &str = "Employee ID is invalid.";
pub const NOT_FOUND: &str = "Employee Not Found.";
pub const SUCCESS: &str = "Success.";
pub const INVALID_BODY: &str = "Request body is invalid.";

/// Employee operations in their fixed check order:
/// id token, then body, then existence, then the store mutation.
#[derive(Clone)]
pub struct EmployeeService {
    store: Arc<dyn EmployeeStore>,
    validator: EmployeeValidator,
    cache: Option<Arc<ReadCache>>,
}

impl EmployeeService {
    pub fn new(store: Arc<dyn EmployeeStore>, validator: EmployeeValidator) -> Self {
        Self {
            store,
            validator,
            cache: None,
        }
    }

    pub fn with_cache(mut self, cache: Arc<ReadCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    pub fn cache(&self) -> Option<&ReadCache> {
        self.cache.as_deref()
    }

    #[instrument(name = "employees.list", skip_all)]
    pub async fn list(&self) -> ApiResult<Vec<Employee>> {
        let ticket = match self.cache().map(ReadCache::list) {
            Some(Lookup::Hit(employees)) => {
                debug!("list served from cache");
                return Ok(employees);
            }
            Some(Lookup::Miss(ticket)) => Some(ticket),
            None => None,
        };
        let employees = self
            .store
            .list_all()
            .await
            .map_err(|err| store_failure(err, "failed to list employees"))?;
        if let (Some(cache), Some(ticket)) = (self.cache(), ticket) {
            cache.fill_list(ticket, employees.clone());
        }
        Ok(employees)
    }

    #[instrument(name = "employees.get", skip(self))]
    pub async fn get(&self, id_token: &str) -> ApiResult<Employee> {
        let id = parse_employee_id(id_token)
            .ok_or_else(|| ApiError::InvalidInput(INVALID_ID.into()))?;
        let ticket = match self.cache().map(|cache| cache.employee(id)) {
            Some(Lookup::Hit(found)) => {
                debug!(id, "employee served from cache");
                return found.ok_or_else(not_found);
            }
            Some(Lookup::Miss(ticket)) => Some(ticket),
            None => None,
        };
        let found = self.find(id).await?;
        if let (Some(cache), Some(ticket)) = (self.cache(), ticket) {
            cache.fill_employee(ticket, id, found.clone());
        }
        found.ok_or_else(not_found)
    }

    /// `body` carries the decoding outcome so a malformed body is reported in
    /// the same place as any other input problem.
    #[instrument(name = "employees.create", skip_all)]
    pub async fn create(&self, body: ApiResult<EmployeePayload>) -> ApiResult<Employee> {
        let result = self.create_inner(body).await;
        self.invalidate();
        result
    }

    #[instrument(name = "employees.update", skip(self, body))]
    pub async fn update(
        &self,
        id_token: &str,
        body: ApiResult<EmployeePayload>,
    ) -> ApiResult<MessageResponse> {
        let result = self.update_inner(id_token, body).await;
        self.invalidate();
        result
    }

    #[instrument(name = "employees.delete", skip(self))]
    pub async fn delete(&self, id_token: &str) -> ApiResult<MessageResponse> {
        let result = self.delete_inner(id_token).await;
        self.invalidate();
        result
    }

    async fn create_inner(&self, body: ApiResult<EmployeePayload>) -> ApiResult<Employee> {
        let payload = body?;
        self.validator.validate(&payload).into_result()?;
        let saved = self
            .store
            .save(Employee::from_payload(payload))
            .await
            .map_err(|err| store_failure(err, "failed to save employee"))?;
        info!(id = ?saved.id, "employee saved");
        Ok(saved)
    }

    async fn update_inner(
        &self,
        id_token: &str,
        body: ApiResult<EmployeePayload>,
    ) -> ApiResult<MessageResponse> {
        let id = parse_mutation_id(id_token)?;
        let payload = body?;
        self.validator.validate(&payload).into_result()?;
        let mut employee = self.find(id).await?.ok_or_else(not_found)?;
        employee.apply(payload, Utc::now());
        self.store
            .save(employee)
            .await
            .map_err(|err| store_failure(err, format!("failed to update employee {id}")))?;
        info!(id, "employee updated");
        Ok(MessageResponse::new(SUCCESS))
    }

    async fn delete_inner(&self, id_token: &str) -> ApiResult<MessageResponse> {
        let id = parse_mutation_id(id_token)?;
        self.find(id).await?.ok_or_else(not_found)?;
        self.store
            .delete_by_id(id)
            .await
            .map_err(|err| store_failure(err, format!("failed to delete employee {id}")))?;
        info!(id, "employee deleted");
        Ok(MessageResponse::new(SUCCESS))
    }

    async fn find(&self, id: i64) -> ApiResult<Option<Employee>> {
        self.store
            .find_by_id(id)
            .await
            .map_err(|err| store_failure(err, format!("failed to load employee {id}")))
    }

    fn invalidate(&self) {
        if let Some(cache) = self.cache() {
            cache.invalidate_all();
        }
    }
}

/// Insert a few fixed demo rows through the regular create path.
pub async fn seed_demo_employees(service: &EmployeeService) -> ApiResult<Vec<Employee>> {
    let mut seeded = Vec::new();
    for (name, salary, department) in [
        ("Ada Lovelace", "120000", "Engineering"),
        ("Grace Hopper", "115000", "Engineering"),
        ("Katherine Johnson", "98000", "Research"),
    ] {
        let payload = EmployeePayload::new(name, salary, department);
        seeded.push(service.create(Ok(payload)).await?);
    }
    Ok(seeded)
}

// Update and delete report a bad id under `errors`, unlike get.
fn parse_mutation_id(id_token: &str) -> ApiResult<i64> {
    parse_employee_id(id_token).ok_or_else(|| ApiError::field("id", INVALID_ID))
}

fn not_found() -> ApiError {
    ApiError::NotFound(NOT_FOUND.into())
}

fn store_failure(err: StoreError, context: impl Into<String>) -> ApiError {
    ApiError::internal(anyhow::Error::new(err).context(context.into()))
}
