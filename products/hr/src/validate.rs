//! Field rules for employee payloads.

use once_cell::sync::Lazy;
use platform_api::FieldErrors;
use regex::Regex;

use crate::employee::EmployeePayload;

static SALARY_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^-?[0-9]*$").expect("salary pattern is a valid regex"));

pub const DEFAULT_MAX_LEN: usize = 255;

/// Parse a path id token. Accepts exactly what a signed 64-bit decimal parse accepts.
pub fn parse_employee_id(token: &str) -> Option<i64> {
    token.parse().ok()
}

/// Checks every field independently; within one field the last failing rule wins.
#[derive(Clone, Copy, Debug)]
pub struct EmployeeValidator {
    max_len: usize,
}

impl Default for EmployeeValidator {
    fn default() -> Self {
        Self {
            max_len: DEFAULT_MAX_LEN,
        }
    }
}

impl EmployeeValidator {
    pub fn with_max_len(max_len: usize) -> Self {
        Self { max_len }
    }

    pub fn validate(&self, payload: &EmployeePayload) -> FieldErrors {
        let mut errors = FieldErrors::new();
        self.required_text(&mut errors, "name", "Name", payload.name.as_deref());
        self.required_text(
            &mut errors,
            "department",
            "Department",
            payload.department.as_deref(),
        );
        self.salary(&mut errors, payload.salary.as_deref().unwrap_or_default());
        errors
    }

    fn required_text(
        &self,
        errors: &mut FieldErrors,
        field: &str,
        label: &str,
        value: Option<&str>,
    ) {
        let value = value.unwrap_or_default();
        if value.trim().is_empty() {
            errors.insert(field, format!("{label} cannot be blank."));
        }
        if self.too_long(value) {
            errors.insert(field, self.length_message(label));
        }
    }

    fn salary(&self, errors: &mut FieldErrors, value: &str) {
        if self.too_long(value) {
            errors.insert("salary", self.length_message("Salary"));
        }
        let numeric = SALARY_PATTERN.is_match(value) && value.bytes().any(|b| b.is_ascii_digit());
        if numeric && is_negative(value) {
            errors.insert("salary", "Salary must not be less than 0.");
        }
        if !numeric {
            errors.insert("salary", "Salary must be a number");
        }
    }

    fn too_long(&self, value: &str) -> bool {
        value.chars().count() > self.max_len
    }

    fn length_message(&self, label: &str) -> String {
        format!("{label} must not exceed {} characters.", self.max_len)
    }
}

// Decided on the text so arbitrarily long digit strings never overflow.
fn is_negative(numeric: &str) -> bool {
    numeric
        .strip_prefix('-')
        .is_some_and(|digits| digits.bytes().any(|b| b != b'0'))
}
