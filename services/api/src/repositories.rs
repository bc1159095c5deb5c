//! Repositories for database operations

use std::collections::HashMap;

use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier, password_hash::SaltString};
use common::{
    error::DatabaseError,
    sql::{bind_values, sql_for_partial_update},
};
use serde_json::Value;
use sqlx::{PgPool, Row, postgres::PgRow};
use tracing::info;

use crate::{
    error::{ApiError, ApiResult},
    models::{Company, UpdateCompanyRequest, UpdateUserRequest, User, update_data},
};

const USER_COLUMNS: &str = "username, first_name, last_name, email, is_admin";
const USER_UPDATE_COLUMNS: [(&str, &str); 2] =
    [("firstName", "first_name"), ("lastName", "last_name")];
const COMPANY_COLUMNS: &str = "handle, name, description, num_employees, logo_url";

fn query_error(e: sqlx::Error) -> ApiError {
    ApiError::Database(DatabaseError::Query(e))
}

fn user_from_row(row: &PgRow) -> User {
    User {
        username: row.get("username"),
        first_name: row.get("first_name"),
        last_name: row.get("last_name"),
        email: row.get("email"),
        is_admin: row.get("is_admin"),
    }
}

fn company_from_row(row: &PgRow) -> Company {
    Company {
        handle: row.get("handle"),
        name: row.get("name"),
        description: row.get("description"),
        num_employees: row.get("num_employees"),
        logo_url: row.get("logo_url"),
    }
}

/// Hash a password with argon2 on the blocking pool
pub async fn hash_password(password: String) -> ApiResult<String> {
    tokio::task::spawn_blocking(move || {
        let salt = SaltString::generate(&mut rand::thread_rng());
        Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| {
                tracing::error!("Failed to hash password: {}", e);
                ApiError::InternalServerError
            })
    })
    .await
    .map_err(|e| {
        tracing::error!("Password hashing task failed: {}", e);
        ApiError::InternalServerError
    })?
}

/// Check a password against a stored argon2 hash on the blocking pool
pub async fn verify_password(password: String, hash: String) -> ApiResult<bool> {
    tokio::task::spawn_blocking(move || match PasswordHash::new(&hash) {
        Ok(parsed) => Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok(),
        Err(_) => false,
    })
    .await
    .map_err(|e| {
        tracing::error!("Password verification task failed: {}", e);
        ApiError::InternalServerError
    })
}

/// User repository for database operations
#[derive(Clone)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    /// Create a new user repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Get all users
    pub async fn get_all(&self) -> ApiResult<Vec<User>> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM users ORDER BY username",
            USER_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(query_error)?;

        Ok(rows.iter().map(user_from_row).collect())
    }

    /// Find a user by username
    pub async fn get(&self, username: &str) -> ApiResult<User> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM users WHERE username = $1",
            USER_COLUMNS
        ))
        .bind(username)
        .fetch_optional(&self.pool)
        .await
        .map_err(query_error)?;

        row.as_ref()
            .map(user_from_row)
            .ok_or_else(|| ApiError::NotFound(format!("No user: {}", username)))
    }

    /// Check a username/password pair
    pub async fn authenticate(&self, username: &str, password: &str) -> ApiResult<User> {
        let row = sqlx::query(&format!(
            "SELECT {}, password FROM users WHERE username = $1",
            USER_COLUMNS
        ))
        .bind(username)
        .fetch_optional(&self.pool)
        .await
        .map_err(query_error)?;

        let Some(row) = row else {
            return Err(ApiError::Unauthorized);
        };

        let hash: String = row.get("password");
        if verify_password(password.to_string(), hash).await? {
            Ok(user_from_row(&row))
        } else {
            Err(ApiError::Unauthorized)
        }
    }

    /// Apply a partial update to a user
    ///
    /// A new password is hashed before it is stored.
    pub async fn update(&self, username: &str, changes: &UpdateUserRequest) -> ApiResult<User> {
        let mut data = update_data(changes)?;
        if let Some(Value::String(password)) = data.get_mut("password") {
            *password = hash_password(std::mem::take(password)).await?;
        }

        let js_to_sql = HashMap::from(USER_UPDATE_COLUMNS);
        let clause = sql_for_partial_update(&data, &js_to_sql)?;

        info!("Updating user {}", username);

        let sql = format!(
            "UPDATE users SET {} WHERE username = ${} RETURNING {}",
            clause.set_cols,
            clause.next_placeholder(),
            USER_COLUMNS
        );
        let row = bind_values(sqlx::query(&sql), &clause.values)
            .bind(username)
            .fetch_optional(&self.pool)
            .await
            .map_err(query_error)?;

        row.as_ref()
            .map(user_from_row)
            .ok_or_else(|| ApiError::NotFound(format!("No user: {}", username)))
    }

    /// Delete a user
    pub async fn remove(&self, username: &str) -> ApiResult<()> {
        let result = sqlx::query("DELETE FROM users WHERE username = $1")
            .bind(username)
            .execute(&self.pool)
            .await
            .map_err(query_error)?;

        if result.rows_affected() == 0 {
            return Err(ApiError::NotFound(format!("No user: {}", username)));
        }

        info!("Deleted user {}", username);
        Ok(())
    }
}

/// Company repository for database operations
#[derive(Clone)]
pub struct CompanyRepository {
    pool: PgPool,
}

impl CompanyRepository {
    /// Create a new company repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Find a company by handle
    pub async fn get(&self, handle: &str) -> ApiResult<Company> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM companies WHERE handle = $1",
            COMPANY_COLUMNS
        ))
        .bind(handle)
        .fetch_optional(&self.pool)
        .await
        .map_err(query_error)?;

        row.as_ref()
            .map(company_from_row)
            .ok_or_else(|| ApiError::NotFound(format!("No company: {}", handle)))
    }

    /// Apply a partial update to a company
    pub async fn update(&self, handle: &str, changes: &UpdateCompanyRequest) -> ApiResult<Company> {
        let data = update_data(changes)?;
        let js_to_sql = HashMap::from([("numEmployees", "num_employees"), ("logoUrl", "logo_url")]);
        let clause = sql_for_partial_update(&data, &js_to_sql)?;

        info!("Updating company {}", handle);

        let sql = format!(
            "UPDATE companies SET {} WHERE handle = ${} RETURNING {}",
            clause.set_cols,
            clause.next_placeholder(),
            COMPANY_COLUMNS
        );
        let row = bind_values(sqlx::query(&sql), &clause.values)
            .bind(handle)
            .fetch_optional(&self.pool)
            .await
            .map_err(query_error)?;

        row.as_ref()
            .map(company_from_row)
            .ok_or_else(|| ApiError::NotFound(format!("No company: {}", handle)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_hash_and_verify_password() {
        let hash = hash_password("password1".to_string()).await.unwrap();

        assert_ne!(hash, "password1");
        assert!(verify_password("password1".to_string(), hash.clone()).await.unwrap());
        assert!(!verify_password("password2".to_string(), hash).await.unwrap());
    }

    #[tokio::test]
    async fn test_verify_password_rejects_malformed_hash() {
        let valid = verify_password("password1".to_string(), "not-a-hash".to_string())
            .await
            .unwrap();
        assert!(!valid);
    }

    #[test]
    fn test_user_update_columns_cover_request_fields() {
        let changes = UpdateUserRequest {
            first_name: Some("Ann".to_string()),
            last_name: Some("Lee".to_string()),
            email: Some("ann@example.com".to_string()),
            ..Default::default()
        };
        let data = update_data(&changes).unwrap();

        let clause = sql_for_partial_update(&data, &HashMap::from(USER_UPDATE_COLUMNS))
            .unwrap();
        assert_eq!(
            clause.set_cols,
            r#""first_name"=$1, "last_name"=$2, "email"=$3"#
        );
    }
}
