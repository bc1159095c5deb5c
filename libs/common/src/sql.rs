//! Helpers for building parameterized SQL
//!
//! The partial-update builder turns an object of changed fields into the
//! `SET` clause of an `UPDATE` statement plus its positional values:
//!
//! ```rust
//! use std::collections::HashMap;
//! use common::sql::sql_for_partial_update;
//! use serde_json::json;
//!
//! let data = json!({ "name": "X", "numEmployees": 5 });
//! let js_to_sql = HashMap::from([("numEmployees", "num_employees")]);
//! let clause = sql_for_partial_update(data.as_object().unwrap(), &js_to_sql).unwrap();
//! assert_eq!(clause.set_cols, r#""name"=$1, "num_employees"=$2"#);
//! assert_eq!(clause.values, vec![json!("X"), json!(5)]);
//! ```
//!
//! Column names are interpolated into the fragment as-is. Callers must only
//! pass keys that are known columns of the target table.

use std::collections::HashMap;

use serde_json::{Map, Value};
use sqlx::{Postgres, postgres::PgArguments, query::Query, types::Json};

use crate::error::SqlError;

/// `SET` clause of a partial update and the values for its placeholders
#[derive(Debug, Clone, PartialEq)]
pub struct SetClause {
    /// Comma-joined `"column"=$n` terms
    pub set_cols: String,
    /// Values for `$1..$n`, in the same order as `set_cols`
    pub values: Vec<Value>,
}

impl SetClause {
    /// Index of the first placeholder free for a trailing `WHERE` clause
    pub fn next_placeholder(&self) -> usize {
        self.values.len() + 1
    }
}

/// Build the `SET` clause for a partial update
///
/// `data` is walked in insertion order. Each key is translated to its column
/// name through `js_to_sql`; keys missing from the map are used verbatim.
///
/// # Errors
///
/// Returns [`SqlError::BadRequest`] when `data` is empty.
pub fn sql_for_partial_update(
    data: &Map<String, Value>,
    js_to_sql: &HashMap<&str, &str>,
) -> Result<SetClause, SqlError> {
    if data.is_empty() {
        return Err(SqlError::BadRequest("No data".to_string()));
    }

    let mut cols = Vec::with_capacity(data.len());
    let mut values = Vec::with_capacity(data.len());

    for (idx, (key, value)) in data.iter().enumerate() {
        let column = js_to_sql.get(key.as_str()).copied().unwrap_or(key.as_str());
        cols.push(format!("\"{}\"=${}", column, idx + 1));
        values.push(value.clone());
    }

    Ok(SetClause {
        set_cols: cols.join(", "),
        values,
    })
}

/// Bind JSON values to a query as their natural PostgreSQL types
///
/// Strings bind as text, integers as int8, other numbers as float8, booleans
/// as bool and null as a NULL parameter. Arrays and objects bind as jsonb.
pub fn bind_values<'q>(
    mut query: Query<'q, Postgres, PgArguments>,
    values: &[Value],
) -> Query<'q, Postgres, PgArguments> {
    for value in values {
        query = match value {
            Value::Null => query.bind(None::<String>),
            Value::Bool(b) => query.bind(*b),
            Value::Number(n) => match n.as_i64() {
                Some(i) => query.bind(i),
                None => query.bind(n.as_f64()),
            },
            Value::String(s) => query.bind(s.clone()),
            other => query.bind(Json(other.clone())),
        };
    }
    query
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn object(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected a JSON object"),
        }
    }

    #[test]
    fn test_partial_update_maps_columns_in_order() {
        let data = object(json!({
            "name": "testyMcTestfaceInc",
            "description": "A test company",
            "numEmployees": 5,
            "logoUrl": "data:image/jpeg;base64,/9j/4PmhDP/9k=",
        }));
        let js_to_sql = HashMap::from([("numEmployees", "num_employees"), ("logoUrl", "logo_url")]);

        let clause = sql_for_partial_update(&data, &js_to_sql).unwrap();

        assert_eq!(
            clause.set_cols,
            r#""name"=$1, "description"=$2, "num_employees"=$3, "logo_url"=$4"#
        );
        assert_eq!(
            clause.values,
            vec![
                json!("testyMcTestfaceInc"),
                json!("A test company"),
                json!(5),
                json!("data:image/jpeg;base64,/9j/4PmhDP/9k="),
            ]
        );
        assert_eq!(clause.next_placeholder(), 5);
    }

    #[test]
    fn test_partial_update_keeps_insertion_order() {
        let mut data = Map::new();
        data.insert("zeta".to_string(), json!(1));
        data.insert("alpha".to_string(), json!(2));

        let clause = sql_for_partial_update(&data, &HashMap::new()).unwrap();

        assert_eq!(clause.set_cols, r#""zeta"=$1, "alpha"=$2"#);
        assert_eq!(clause.values, vec![json!(1), json!(2)]);
    }

    #[test]
    fn test_partial_update_single_field() {
        let data = object(json!({ "isAdmin": true }));
        let js_to_sql = HashMap::from([("isAdmin", "is_admin")]);

        let clause = sql_for_partial_update(&data, &js_to_sql).unwrap();

        assert_eq!(clause.set_cols, r#""is_admin"=$1"#);
        assert_eq!(clause.values, vec![json!(true)]);
        assert_eq!(clause.next_placeholder(), 2);
    }

    #[test]
    fn test_partial_update_ignores_unused_mappings() {
        let data = object(json!({ "email": "a@b.com" }));
        let js_to_sql = HashMap::from([("firstName", "first_name")]);

        let clause = sql_for_partial_update(&data, &js_to_sql).unwrap();

        assert_eq!(clause.set_cols, r#""email"=$1"#);
    }

    #[test]
    fn test_partial_update_rejects_empty_data() {
        let js_to_sql = HashMap::from([("numEmployees", "num_employees")]);

        let err = sql_for_partial_update(&Map::new(), &js_to_sql).unwrap_err();
        assert_eq!(err, SqlError::BadRequest("No data".to_string()));

        let err = sql_for_partial_update(&Map::new(), &HashMap::new()).unwrap_err();
        assert_eq!(err.to_string(), "No data");
    }

    fn bound_count(values: &[Value]) -> Option<usize> {
        let mut query = bind_values(sqlx::query("SELECT 1"), values);
        sqlx::Execute::take_arguments(&mut query)
            .unwrap()
            .map(|args| sqlx::Arguments::len(&args))
    }

    #[test]
    fn test_bind_values_binds_each_json_kind() {
        assert_eq!(bound_count(&[Value::Null]), Some(1));
        assert_eq!(bound_count(&[json!(false)]), Some(1));
        assert_eq!(bound_count(&[json!(42)]), Some(1));
        assert_eq!(bound_count(&[json!(1.5)]), Some(1));
        assert_eq!(bound_count(&[json!("text")]), Some(1));
        assert_eq!(bound_count(&[json!({ "nested": [1, 2] })]), Some(1));
    }

    #[test]
    fn test_bind_values_counts_every_value() {
        let values = vec![
            json!("text"),
            json!(42),
            json!(1.5),
            json!(false),
            Value::Null,
            json!({ "nested": [1, 2] }),
        ];

        assert_eq!(bound_count(&values), Some(6));
        assert_eq!(bound_count(&[]), Some(0));
    }
}
