//! Read attendee rows from an uploaded `.xlsx` workbook

use std::io::Cursor;

use anyhow::{Context, Result};
use calamine::{Data, Reader, Xlsx};
use serde_json::{Map, Value, json};

use crate::utils::db_utils::SqlValue;

/// One data row keyed by the header text of its column
pub type SheetRow = Map<String, Value>;

/// Convert Excel cell to serde_json::Value
fn cell_to_value(cell: &Data) -> Value {
    match cell {
        Data::Empty => Value::Null,
        Data::String(s) if s.is_empty() => Value::Null,
        Data::String(s) => Value::String(s.clone()),
        Data::Int(i) => json!(*i),
        Data::Float(f) => {
            // ids and phone numbers come through as whole floats
            if f.fract() == 0.0 && *f >= i64::MIN as f64 && *f <= i64::MAX as f64 {
                json!(*f as i64)
            } else {
                json!(*f)
            }
        }
        Data::Bool(b) => Value::Bool(*b),
        Data::DateTime(dt) => Value::String(format!("{}", dt)),
        Data::DateTimeIso(s) => Value::String(s.clone()),
        Data::DurationIso(s) => Value::String(s.clone()),
        Data::Error(_) => Value::Null,
    }
}

fn header_text(cell: &Data) -> String {
    match cell {
        Data::String(s) => s.trim().to_string(),
        Data::Empty => String::new(),
        other => other.to_string(),
    }
}

/// Parse the first worksheet of an in-memory workbook.
///
/// Row 1 holds the headers. Rows without any value are skipped, as are
/// columns with an empty header.
pub fn read_rows(bytes: &[u8]) -> Result<Vec<SheetRow>> {
    let mut workbook: Xlsx<_> =
        Xlsx::new(Cursor::new(bytes)).context("Failed to open spreadsheet")?;

    let sheet_name = workbook
        .sheet_names()
        .first()
        .cloned()
        .context("Spreadsheet has no sheets")?;

    let range = workbook
        .worksheet_range(&sheet_name)
        .with_context(|| format!("Failed to read sheet: {}", sheet_name))?;

    let mut rows = range.rows();
    let headers: Vec<String> = match rows.next() {
        Some(header_row) => header_row.iter().map(header_text).collect(),
        None => return Ok(Vec::new()),
    };

    let mut parsed = Vec::new();
    for row in rows {
        let mut data = Map::new();
        for (col_idx, cell) in row.iter().enumerate() {
            let header = headers.get(col_idx).map(String::as_str).unwrap_or("");
            if header.is_empty() {
                continue;
            }
            let value = cell_to_value(cell);
            if !value.is_null() {
                data.insert(header.to_string(), value);
            }
        }

        if !data.is_empty() {
            parsed.push(data);
        }
    }

    Ok(parsed)
}

/// Attendee columns recognised in an upload, matched case-insensitively
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AttendeeImport {
    pub name: String,
    pub email: String,
    pub uid: String,
    pub phone: Option<String>,
    pub gender: Option<String>,
    pub team_name: Option<String>,
    pub team_id: Option<String>,
    pub institute_name: Option<String>,
    pub participants_type: Option<String>,
    pub team_role_label: Option<String>,
}

fn value_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) if s.is_empty() => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

impl AttendeeImport {
    /// Returns `None` when the row has none of the attendee columns.
    pub fn from_row(row: &SheetRow) -> Option<Self> {
        let mut import = AttendeeImport::default();
        let mut recognised = false;

        for (header, value) in row {
            let Some(text) = value_text(value) else {
                continue;
            };

            match header.to_lowercase().as_str() {
                "name" => import.name = text,
                "email" => import.email = text,
                "uid" => import.uid = text,
                "phone" => import.phone = Some(text),
                "gender" => import.gender = Some(text),
                "team name" => import.team_name = Some(text),
                "team id" => import.team_id = Some(text),
                "institute name" => import.institute_name = Some(text),
                "participants type" => import.participants_type = Some(text),
                "team leader/member" => import.team_role_label = Some(text),
                _ => continue,
            }
            recognised = true;
        }

        recognised.then_some(import)
    }

    /// Values in `ATTENDEE_COLUMNS` order
    pub fn to_sql_values(&self) -> Vec<SqlValue> {
        let optional = |v: &Option<String>| match v {
            Some(s) => SqlValue::String(s.clone()),
            None => SqlValue::Null,
        };

        vec![
            SqlValue::String(self.name.clone()),
            SqlValue::String(self.email.clone()),
            SqlValue::String(self.uid.clone()),
            optional(&self.phone),
            optional(&self.gender),
            optional(&self.team_name),
            optional(&self.team_id),
            optional(&self.institute_name),
            optional(&self.participants_type),
            optional(&self.team_role_label),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::attendee::ATTENDEE_COLUMNS;
    use rust_xlsxwriter::Workbook;

    fn workbook_bytes(rows: &[&[&str]]) -> Vec<u8> {
        let mut workbook = Workbook::new();
        let worksheet = workbook.add_worksheet();
        for (r, row) in rows.iter().enumerate() {
            for (c, cell) in row.iter().enumerate() {
                if !cell.is_empty() {
                    worksheet.write_string(r as u32, c as u16, *cell).unwrap();
                }
            }
        }
        workbook.save_to_buffer().unwrap()
    }

    #[test]
    fn test_read_rows_keys_by_header() {
        let bytes = workbook_bytes(&[
            &["name", "email", "uid", "Team Name"],
            &["John Smith", "john@example.com", "R-1", "Smithsonian Builders"],
            &["", "", "", ""],
            &["Mary", "mary@example.com", "R-2", ""],
        ]);

        let rows = read_rows(&bytes).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0]["name"], "John Smith");
        assert_eq!(rows[0]["Team Name"], "Smithsonian Builders");
        assert_eq!(rows[1]["uid"], "R-2");
        assert!(rows[1].get("Team Name").is_none());
    }

    #[test]
    fn test_numeric_uid_becomes_integer_text() {
        let mut workbook = Workbook::new();
        let worksheet = workbook.add_worksheet();
        worksheet.write_string(0, 0, "UID").unwrap();
        worksheet.write_string(0, 1, "Phone").unwrap();
        worksheet.write_number(1, 0, 1042.0).unwrap();
        worksheet.write_number(1, 1, 9876543210.0).unwrap();
        let bytes = workbook.save_to_buffer().unwrap();

        let rows = read_rows(&bytes).unwrap();
        let import = AttendeeImport::from_row(&rows[0]).unwrap();
        assert_eq!(import.uid, "1042");
        assert_eq!(import.phone.as_deref(), Some("9876543210"));
    }

    #[test]
    fn test_garbage_is_rejected() {
        assert!(read_rows(b"definitely not a workbook").is_err());
    }

    #[test]
    fn test_import_matches_headers_case_insensitively() {
        let row: SheetRow = serde_json::from_value(serde_json::json!({
            "Name": "Ana",
            "EMAIL": "ana@example.com",
            "uid": "A-1",
            "participants type": "Student",
            "Team Leader/Member": "Team Member",
            "Shirt Size": "M"
        }))
        .unwrap();

        let import = AttendeeImport::from_row(&row).unwrap();
        assert_eq!(import.name, "Ana");
        assert_eq!(import.email, "ana@example.com");
        assert_eq!(import.participants_type.as_deref(), Some("Student"));
        assert_eq!(import.team_role_label.as_deref(), Some("Team Member"));
        assert_eq!(import.gender, None);
    }

    #[test]
    fn test_row_without_attendee_columns_is_dropped() {
        let row: SheetRow =
            serde_json::from_value(serde_json::json!({ "Notes": "call back" })).unwrap();
        assert_eq!(AttendeeImport::from_row(&row), None);
    }

    #[test]
    fn test_sql_values_follow_column_order() {
        let import = AttendeeImport {
            name: "Ana".into(),
            uid: "A-1".into(),
            team_id: Some("T-9".into()),
            ..Default::default()
        };
        let values = import.to_sql_values();

        assert_eq!(values.len(), ATTENDEE_COLUMNS.len());
        assert_eq!(values[0], SqlValue::String("Ana".into()));
        assert_eq!(values[1], SqlValue::String(String::new()));
        assert_eq!(values[3], SqlValue::Null);
        assert_eq!(values[6], SqlValue::String("T-9".into()));
    }
}
