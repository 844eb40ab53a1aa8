use anyhow::{Result, bail};
use sqlx::MySqlConnection;

/// ===============================
/// SQL bindable value enum
/// ===============================
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    String(String),
    Null,
}

/// ===============================
/// SQL insert container
/// ===============================
#[derive(Debug)]
pub struct SqlInsert {
    pub sql: String,
    pub values: Vec<SqlValue>,
    pub rows: usize,
}

/// ===============================
/// Build multi-row INSERT SQL
/// ===============================
pub fn build_bulk_insert(
    table: &str,
    columns: &[&str],
    rows: &[Vec<SqlValue>],
) -> Result<SqlInsert> {
    if columns.is_empty() {
        bail!("No columns given for insert into {}", table);
    }
    if rows.is_empty() {
        bail!("No rows given for insert into {}", table);
    }

    // column names may contain spaces and slashes
    let column_list = columns
        .iter()
        .map(|c| format!("`{}`", c))
        .collect::<Vec<_>>()
        .join(", ");

    let placeholders = format!("({})", vec!["?"; columns.len()].join(", "));
    let values_clause = vec![placeholders.as_str(); rows.len()].join(", ");

    let sql = format!(
        "INSERT INTO {} ({}) VALUES {}",
        table, column_list, values_clause
    );

    let mut values = Vec::with_capacity(columns.len() * rows.len());
    for (idx, row) in rows.iter().enumerate() {
        if row.len() != columns.len() {
            bail!(
                "Row {} has {} values, expected {}",
                idx,
                row.len(),
                columns.len()
            );
        }
        values.extend(row.iter().cloned());
    }

    Ok(SqlInsert {
        sql,
        values,
        rows: rows.len(),
    })
}

/// ===============================
/// Execute the insert
/// ===============================
pub async fn execute_insert(
    conn: &mut MySqlConnection,
    insert: SqlInsert,
) -> Result<u64, sqlx::Error> {
    let mut query = sqlx::query(&insert.sql);

    for value in insert.values {
        query = match value {
            SqlValue::String(v) => query.bind(v),
            SqlValue::Null => query.bind(None::<String>),
        };
    }

    let result = query.execute(conn).await?;
    Ok(result.rows_affected())
}
