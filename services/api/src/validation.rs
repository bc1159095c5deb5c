//! Input validation utilities

use regex::Regex;
use std::sync::OnceLock;

use crate::{
    error::{ApiError, ApiResult},
    models::{UpdateCompanyRequest, UpdateUserRequest},
};

/// Validate a required text field's length in characters
pub fn validate_length(field: &str, value: &str, min: usize, max: usize) -> Result<(), String> {
    let len = value.chars().count();

    if len < min {
        return Err(format!("{} must be at least {} characters long", field, min));
    }

    if len > max {
        return Err(format!("{} must be at most {} characters long", field, max));
    }

    Ok(())
}

/// Validate email
pub fn validate_email(email: &str) -> Result<(), String> {
    validate_length("email", email, 6, 60)?;

    static EMAIL_REGEX: OnceLock<Regex> = OnceLock::new();
    let regex = EMAIL_REGEX.get_or_init(|| {
        Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$")
            .expect("Failed to compile email regex")
    });

    if !regex.is_match(email) {
        return Err("Invalid email format".to_string());
    }

    Ok(())
}

/// Validate password
pub fn validate_password(password: &str) -> Result<(), String> {
    validate_length("password", password, 5, 20)
}

/// Validate a user update payload
pub fn validate_user_update(changes: &UpdateUserRequest) -> ApiResult<()> {
    let mut errors = Vec::new();

    if let Some(first_name) = &changes.first_name {
        errors.extend(validate_length("firstName", first_name, 1, 30).err());
    }
    if let Some(last_name) = &changes.last_name {
        errors.extend(validate_length("lastName", last_name, 1, 30).err());
    }
    if let Some(email) = &changes.email {
        errors.extend(validate_email(email).err());
    }
    if let Some(password) = &changes.password {
        errors.extend(validate_password(password).err());
    }

    into_result(errors)
}

/// Validate a company update payload
pub fn validate_company_update(changes: &UpdateCompanyRequest) -> ApiResult<()> {
    let mut errors = Vec::new();

    if let Some(name) = &changes.name {
        errors.extend(validate_length("name", name, 1, 255).err());
    }
    if let Some(num_employees) = changes.num_employees {
        if num_employees < 0 {
            errors.push("numEmployees must not be negative".to_string());
        }
    }

    into_result(errors)
}

fn into_result(errors: Vec<String>) -> ApiResult<()> {
    if errors.is_empty() {
        Ok(())
    } else {
        Err(ApiError::BadRequest(errors.join("; ")))
    }
}
