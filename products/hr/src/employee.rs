use chrono::{DateTime, Utc};
use entity::employees;
use serde::{Deserialize, Deserializer, Serialize};

/// An employee record. Timestamps are tracked but never serialized.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Employee {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub name: String,
    pub salary: String,
    pub department: String,
    #[serde(skip)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(skip)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Employee {
    /// A not-yet-persisted record built from an already validated payload.
    pub fn from_payload(payload: EmployeePayload) -> Self {
        Self {
            id: None,
            name: payload.name.unwrap_or_default(),
            salary: payload.salary.unwrap_or_default(),
            department: payload.department.unwrap_or_default(),
            created_at: None,
            updated_at: None,
        }
    }

    /// Overwrite the mutable fields and bump `updated_at`, never moving it backwards.
    pub fn apply(&mut self, payload: EmployeePayload, now: DateTime<Utc>) {
        self.name = payload.name.unwrap_or_default();
        self.salary = payload.salary.unwrap_or_default();
        self.department = payload.department.unwrap_or_default();
        self.updated_at = Some(match self.updated_at {
            Some(previous) if previous > now => previous,
            _ => now,
        });
    }
}

impl From<employees::Model> for Employee {
    fn from(model: employees::Model) -> Self {
        Self {
            id: Some(model.id),
            name: model.name,
            salary: model.salary,
            department: model.department,
            created_at: Some(model.created_at.with_timezone(&Utc)),
            updated_at: Some(model.updated_at.with_timezone(&Utc)),
        }
    }
}

/// Body of create and update requests. Unknown keys (`id`, timestamps) are ignored.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
pub struct EmployeePayload {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "text_or_number")]
    pub salary: Option<String>,
    #[serde(default)]
    pub department: Option<String>,
}

impl EmployeePayload {
    pub fn new(
        name: impl Into<String>,
        salary: impl Into<String>,
        department: impl Into<String>,
    ) -> Self {
        Self {
            name: Some(name.into()),
            salary: Some(salary.into()),
            department: Some(department.into()),
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum TextOrNumber {
    Text(String),
    Number(serde_json::Number),
}

// Salary is text on the wire, but clients routinely send it as a JSON number.
fn text_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(
        Option::<TextOrNumber>::deserialize(deserializer)?.map(|value| match value {
            TextOrNumber::Text(text) => text,
            TextOrNumber::Number(number) => number.to_string(),
        }),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use serde_json::json;

    #[test]
    fn serializes_without_timestamps_in_field_order() {
        let employee = Employee {
            id: Some(7),
            name: "name_test".into(),
            salary: "80000".into(),
            department: "dep_test".into(),
            created_at: Some(Utc::now()),
            updated_at: Some(Utc::now()),
        };
        assert_eq!(
            serde_json::to_string(&employee).unwrap(),
            r#"{"id":7,"name":"name_test","salary":"80000","department":"dep_test"}"#
        );
    }

    #[test]
    fn payload_ignores_identity_and_timestamps() {
        let payload: EmployeePayload = serde_json::from_value(json!({
            "id": 99,
            "name": "Ada",
            "salary": "1",
            "department": "R&D",
            "createdAt": "2020-01-01T00:00:00Z"
        }))
        .unwrap();
        assert_eq!(payload, EmployeePayload::new("Ada", "1", "R&D"));
    }

    #[test]
    fn payload_accepts_numeric_salary_and_missing_fields() {
        let payload: EmployeePayload =
            serde_json::from_value(json!({ "salary": -12, "department": null })).unwrap();
        assert_eq!(payload.salary.as_deref(), Some("-12"));
        assert_eq!(payload.name, None);
        assert_eq!(payload.department, None);
    }

    #[test]
    fn apply_keeps_identity_and_never_rewinds_updated_at() {
        let created = Utc::now();
        let future = created + Duration::hours(1);
        let mut employee = Employee {
            id: Some(3),
            name: "old".into(),
            salary: "1".into(),
            department: "old".into(),
            created_at: Some(created),
            updated_at: Some(future),
        };
        employee.apply(EmployeePayload::new("new", "2", "new"), created);
        assert_eq!(employee.id, Some(3));
        assert_eq!(employee.created_at, Some(created));
        assert_eq!(employee.updated_at, Some(future));
        assert_eq!(
            (employee.name.as_str(), employee.salary.as_str(), employee.department.as_str()),
            ("new", "2", "new")
        );
    }
}
