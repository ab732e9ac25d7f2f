//! HR vertical slice: employee records, their validation rules, storage
//! adapters and the REST routes mounted under `/api/v1`.

pub mod cache;
pub mod db;
pub mod employee;
pub mod routes;
pub mod service;
pub mod store;
pub mod validate;

pub use cache::ReadCache;
pub use db::SeaOrmEmployeeStore;
pub use employee::{Employee, EmployeePayload};
pub use routes::router;
pub use service::{EmployeeService, seed_demo_employees};
pub use store::{EmployeeStore, MemoryEmployeeStore, StoreError, StoreResult};
pub use validate::{EmployeeValidator, parse_employee_id};
