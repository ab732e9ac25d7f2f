use axum::{
    Json, Router,
    extract::{
        FromRef, Path, State,
        rejection::{JsonRejection, PathRejection},
    },
    routing::get,
};
use platform_api::{ApiError, ApiResult, MessageResponse};
use tracing::debug;

use crate::{
    employee::{Employee, EmployeePayload},
    service::{EmployeeService, INVALID_BODY},
};

/// Employee routes, relative to the API base path.
pub fn router<S>() -> Router<S>
where
    S: Clone + Send + Sync + 'static,
    EmployeeService: FromRef<S>,
{
    Router::new()
        .route("/employees", get(list_employees).post(create_employee))
        .route("/employees/", get(list_employees).post(create_employee))
        .route(
            "/employees/{id}",
            get(get_employee).put(update_employee).delete(delete_employee),
        )
}

async fn list_employees(State(service): State<EmployeeService>) -> ApiResult<Json<Vec<Employee>>> {
    service.list().await.map(Json)
}

async fn get_employee(
    State(service): State<EmployeeService>,
    id: Result<Path<String>, PathRejection>,
) -> ApiResult<Json<Employee>> {
    service.get(&id_token(id)).await.map(Json)
}

async fn create_employee(
    State(service): State<EmployeeService>,
    body: Result<Json<EmployeePayload>, JsonRejection>,
) -> ApiResult<Json<Employee>> {
    service.create(decode(body)).await.map(Json)
}

async fn update_employee(
    State(service): State<EmployeeService>,
    id: Result<Path<String>, PathRejection>,
    body: Result<Json<EmployeePayload>, JsonRejection>,
) -> ApiResult<Json<MessageResponse>> {
    service.update(&id_token(id), decode(body)).await.map(Json)
}

async fn delete_employee(
    State(service): State<EmployeeService>,
    id: Result<Path<String>, PathRejection>,
) -> ApiResult<Json<MessageResponse>> {
    service.delete(&id_token(id)).await.map(Json)
}

// An undecodable segment becomes a token no id parser accepts.
fn id_token(id: Result<Path<String>, PathRejection>) -> String {
    id.map(|Path(token)| token).unwrap_or_else(|rejection| {
        debug!(%rejection, "rejected employee id segment");
        String::new()
    })
}

fn decode(body: Result<Json<EmployeePayload>, JsonRejection>) -> ApiResult<EmployeePayload> {
    body.map(|Json(payload)| payload).map_err(|rejection| {
        debug!(%rejection, "rejected employee body");
        ApiError::InvalidInput(INVALID_BODY.into())
    })
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::{
        body::Body,
        http::{Method, Request, StatusCode, header},
    };
    use http_body_util::BodyExt;
    use serde_json::{Value, json};
    use tower::ServiceExt;

    use super::*;
    use crate::{store::MemoryEmployeeStore, validate::EmployeeValidator};

    fn app() -> Router {
        let service = EmployeeService::new(
            Arc::new(MemoryEmployeeStore::new()),
            EmployeeValidator::default(),
        );
        router().with_state(service)
    }

    async fn send(app: &Router, method: Method, uri: &str, body: Option<&str>) -> (StatusCode, Value) {
        let mut request = Request::builder().method(method).uri(uri);
        let body = match body {
            Some(json) => {
                request = request.header(header::CONTENT_TYPE, "application/json");
                Body::from(json.to_owned())
            }
            None => Body::empty(),
        };
        let response = app
            .clone()
            .oneshot(request.body(body).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn create_returns_ok_with_the_new_record() {
        let app = app();
        let (status, body) = send(
            &app,
            Method::POST,
            "/employees",
            Some(r#"{"name":"name_test","salary":"80000","department":"dep_test"}"#),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body,
            json!({"id": 1, "name": "name_test", "salary": "80000", "department": "dep_test"})
        );
    }

    #[tokio::test]
    async fn trailing_slash_lists_too() {
        let app = app();
        let (status, body) = send(&app, Method::GET, "/employees/", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!([]));
    }

    #[tokio::test]
    async fn malformed_body_is_a_bad_request() {
        let app = app();
        let (status, body) = send(&app, Method::POST, "/employees", Some("{not json")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({ "message": INVALID_BODY }));

        // The id check still comes first on update.
        let (status, body) = send(&app, Method::PUT, "/employees/abc", Some("[]")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({ "errors": { "id": "Employee ID is invalid." } }));
    }

    #[tokio::test]
    async fn undecodable_id_segment_uses_the_json_id_errors() {
        let app = app();
        let (status, body) = send(&app, Method::GET, "/employees/%FF", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({ "message": "Employee ID is invalid." }));

        let (status, body) = send(&app, Method::DELETE, "/employees/%FF", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({ "errors": { "id": "Employee ID is invalid." } }));

        let (status, body) = send(
            &app,
            Method::PUT,
            "/employees/%FF",
            Some(r#"{"name":"a","salary":"1","department":"b"}"#),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({ "errors": { "id": "Employee ID is invalid." } }));
    }

    #[tokio::test]
    async fn missing_content_type_is_a_bad_request() {
        let app = app();
        let response = app
            .oneshot(
                Request::builder()
                    .method(Method::POST)
                    .uri("/employees")
                    .body(Body::from(r#"{"name":"a","salary":"1","department":"b"}"#))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
