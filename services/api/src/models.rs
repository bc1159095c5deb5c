//! API models for request and response payloads
//!
//! The `Update*Request` types double as the whitelist of fields a partial
//! update may touch: only their declared fields reach the SQL builder.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{ApiError, ApiResult};

/// User as exposed by the API
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub is_admin: bool,
}

/// Partial update of a user
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct UpdateUserRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
}

/// Company as exposed by the API
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Company {
    pub handle: String,
    pub name: String,
    pub description: Option<String>,
    pub num_employees: Option<i32>,
    pub logo_url: Option<String>,
}

/// Partial update of a company
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct UpdateCompanyRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub num_employees: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logo_url: Option<String>,
}

/// Request for a token
#[derive(Debug, Deserialize)]
pub struct TokenRequest {
    pub username: String,
    pub password: String,
}

/// Response for token generation
#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub token: String,
}

/// Flatten an update request into the field map consumed by the SQL builder
///
/// Fields left unset are omitted; the remaining keys keep declaration order.
pub fn update_data<T: Serialize>(changes: &T) -> ApiResult<Map<String, Value>> {
    match serde_json::to_value(changes) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(_) => Err(ApiError::BadRequest("Update must be an object".to_string())),
        Err(e) => Err(ApiError::BadRequest(e.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_update_data_skips_unset_fields() {
        let changes = UpdateCompanyRequest {
            name: Some("New".to_string()),
            num_employees: Some(5),
            ..Default::default()
        };

        let data = update_data(&changes).unwrap();
        let keys: Vec<_> = data.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["name", "numEmployees"]);
        assert_eq!(data["numEmployees"], json!(5));
    }

    #[test]
    fn test_update_data_empty_request() {
        assert!(update_data(&UpdateUserRequest::default()).unwrap().is_empty());
    }

    #[test]
    fn test_update_request_rejects_unknown_fields() {
        let parsed: Result<UpdateUserRequest, _> =
            serde_json::from_value(json!({ "isAdmin": true }));
        assert!(parsed.is_err());

        let parsed: UpdateUserRequest =
            serde_json::from_value(json!({ "firstName": "Ann" })).unwrap();
        assert_eq!(parsed.first_name.as_deref(), Some("Ann"));
    }
}
