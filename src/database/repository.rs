use serde_json::{Map, Value};
use sqlx::{postgres::PgRow, PgPool, Row};
use uuid::Uuid;

use crate::database::manager::DatabaseError;
use crate::database::record::Record;

/// Every table this API is allowed to touch. Queries are built with the
/// matched static name, never with caller input.
pub const TABLES: &[&str] = &[
    "sermons",
    "events",
    "leaders",
    "cell_groups",
    "zones",
    "media",
    "membership_renewals",
    "foundation_class_registrations",
    "event_signups",
    "admin_users",
];

pub struct Repository {
    table: &'static str,
}

impl Repository {
    pub fn new(table: &str) -> Result<Self, DatabaseError> {
        TABLES
            .iter()
            .find(|t| **t == table)
            .map(|t| Self { table: t })
            .ok_or_else(|| DatabaseError::UnknownTable(table.to_string()))
    }

    pub fn table(&self) -> &'static str {
        self.table
    }

    /// Fetch all rows, newest first
    pub async fn fetch_all(&self, pool: &PgPool) -> Result<Vec<Record>, DatabaseError> {
        let sql = format!(
            "SELECT row_to_json(t) AS row FROM (SELECT * FROM \"{}\" ORDER BY created_at DESC) t",
            self.table
        );
        let rows = sqlx::query(&sql).fetch_all(pool).await?;
        rows.into_iter().map(row_to_record).collect()
    }

    pub async fn fetch_by_id(&self, pool: &PgPool, id: &str) -> Result<Option<Record>, DatabaseError> {
        let sql = format!(
            "SELECT row_to_json(t) AS row FROM (SELECT * FROM \"{}\" WHERE id = $1) t",
            self.table
        );
        match sqlx::query(&sql).bind(id).fetch_optional(pool).await? {
            Some(row) => Ok(Some(row_to_record(row)?)),
            None => Ok(None),
        }
    }

    /// Fetch rows matching one column value, newest first
    pub async fn fetch_where(
        &self,
        pool: &PgPool,
        column: &str,
        value: &str,
    ) -> Result<Vec<Record>, DatabaseError> {
        if !is_valid_column(column) {
            return Err(DatabaseError::QueryError(format!("invalid column: {}", column)));
        }
        let sql = format!(
            "SELECT row_to_json(t) AS row FROM (SELECT * FROM \"{}\" WHERE \"{}\" = $1 ORDER BY created_at DESC) t",
            self.table, column
        );
        let rows = sqlx::query(&sql).bind(value).fetch_all(pool).await?;
        rows.into_iter().map(row_to_record).collect()
    }

    /// Insert a new row from dynamic fields, generating an id when absent.
    /// created_at/updated_at come from column defaults.
    pub async fn insert(&self, pool: &PgPool, mut fields: Map<String, Value>) -> Result<Record, DatabaseError> {
        fields
            .entry("id".to_string())
            .or_insert_with(|| Value::String(Uuid::new_v4().to_string()));

        let columns: Vec<String> = fields.keys().cloned().collect();
        for column in &columns {
            if !is_valid_column(column) {
                return Err(DatabaseError::QueryError(format!("invalid column: {}", column)));
            }
        }

        let placeholders = (1..=columns.len()).map(|i| format!("${}", i)).collect::<Vec<_>>().join(", ");
        let column_list = columns.iter().map(|c| format!("\"{}\"", c)).collect::<Vec<_>>().join(", ");

        let sql = format!(
            "INSERT INTO \"{table}\" ({columns}) VALUES ({placeholders}) RETURNING row_to_json(\"{table}\".*) AS row",
            table = self.table,
            columns = column_list,
            placeholders = placeholders,
        );

        let values: Vec<Value> = fields.values().cloned().collect();
        let mut query = sqlx::query(&sql);
        for value in &values {
            query = bind_param(query, value);
        }

        let row = query.fetch_one(pool).await?;
        row_to_record(row)
    }

    /// Update only the given fields; returns None when the row is missing
    pub async fn update_fields(
        &self,
        pool: &PgPool,
        id: &str,
        changes: Map<String, Value>,
    ) -> Result<Option<Record>, DatabaseError> {
        if changes.is_empty() {
            return self.fetch_by_id(pool, id).await;
        }

        let columns: Vec<String> = changes.keys().cloned().collect();
        for column in &columns {
            if !is_valid_column(column) {
                return Err(DatabaseError::QueryError(format!("invalid column: {}", column)));
            }
        }

        let set_clauses: Vec<String> = columns
            .iter()
            .enumerate()
            .map(|(i, column)| format!("\"{}\" = ${}", column, i + 1))
            .collect();

        let sql = format!(
            "UPDATE \"{table}\" SET {sets}, updated_at = NOW() WHERE id = ${id_pos} RETURNING row_to_json(\"{table}\".*) AS row",
            table = self.table,
            sets = set_clauses.join(", "),
            id_pos = columns.len() + 1,
        );

        let values: Vec<Value> = changes.values().cloned().collect();
        let mut query = sqlx::query(&sql);
        for value in &values {
            query = bind_param(query, value);
        }
        query = query.bind(id);

        match query.fetch_optional(pool).await? {
            Some(row) => Ok(Some(row_to_record(row)?)),
            None => Ok(None),
        }
    }

    /// Hard delete; returns whether a row was removed
    pub async fn delete(&self, pool: &PgPool, id: &str) -> Result<bool, DatabaseError> {
        let sql = format!("DELETE FROM \"{}\" WHERE id = $1", self.table);
        let result = sqlx::query(&sql).bind(id).execute(pool).await?;
        Ok(result.rows_affected() > 0)
    }
}

fn row_to_record(row: PgRow) -> Result<Record, DatabaseError> {
    let value: Value = row.try_get("row").map_err(DatabaseError::Sqlx)?;
    match value {
        Value::Object(map) => Ok(Record::from_sql_row(map)),
        _ => Err(DatabaseError::QueryError("unexpected row format".to_string())),
    }
}

fn is_valid_column(name: &str) -> bool {
    !name.is_empty()
        && name.chars().next().map(|c| c.is_ascii_alphabetic()).unwrap_or(false)
        && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Bind a dynamic JSON parameter to a SQL query
fn bind_param<'q>(
    q: sqlx::query::Query<'q, sqlx::Postgres, sqlx::postgres::PgArguments>,
    v: &'q Value,
) -> sqlx::query::Query<'q, sqlx::Postgres, sqlx::postgres::PgArguments> {
    match v {
        Value::Null => {
            let none: Option<String> = None;
            q.bind(none)
        }
        Value::Bool(b) => q.bind(*b),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                q.bind(i)
            } else if let Some(u) = n.as_u64() {
                q.bind(u as i64)
            } else if let Some(f) = n.as_f64() {
                q.bind(f)
            } else {
                q.bind(n.to_string())
            }
        }
        Value::String(s) => q.bind(s),
        Value::Array(_) => q.bind(v),  // JSONB
        Value::Object(_) => q.bind(v), // JSONB
    }
}
