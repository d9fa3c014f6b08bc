use std::collections::HashMap;

use crate::error::ApiError;

pub const PASSWORD_LEN: (usize, usize) = (8, 72);
pub const COLLECTION_NAME_LEN: (usize, usize) = (3, 48);
pub const DESCRIPTION_LEN: (usize, usize) = (0, 96);
pub const PATH_LEN: (usize, usize) = (1, 255);

/// Collects per-field problems and reports them together.
#[derive(Debug, Default)]
pub struct Validator {
    field_errors: HashMap<String, String>,
}

impl Validator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn email(&mut self, field: &str, value: &str) -> &mut Self {
        if !looks_like_email(value) {
            self.reject(field, "must be a valid email address");
        }
        self
    }

    pub fn length(&mut self, field: &str, value: &str, (min, max): (usize, usize)) -> &mut Self {
        let len = value.chars().count();
        if len < min || len > max {
            self.reject(field, &format!("must be between {} and {} characters", min, max));
        }
        self
    }

    pub fn optional_length(&mut self, field: &str, value: Option<&str>, bounds: (usize, usize)) -> &mut Self {
        if let Some(value) = value {
            self.length(field, value, bounds);
        }
        self
    }

    pub fn finish(&mut self) -> Result<(), ApiError> {
        if self.field_errors.is_empty() {
            return Ok(());
        }
        Err(ApiError::validation_error(
            "Invalid input",
            Some(std::mem::take(&mut self.field_errors)),
        ))
    }

    fn reject(&mut self, field: &str, message: &str) {
        self.field_errors.entry(field.to_string()).or_insert_with(|| message.to_string());
    }
}

/// `local@domain.tld`: one `@`, no whitespace, a dot-separated domain with non-empty labels.
fn looks_like_email(value: &str) -> bool {
    if value.chars().any(char::is_whitespace) || value.len() > 254 {
        return false;
    }
    let Some((local, domain)) = value.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') {
        return false;
    }
    let labels: Vec<&str> = domain.split('.').collect();
    labels.len() >= 2 && labels.iter().all(|label| !label.is_empty())
}
