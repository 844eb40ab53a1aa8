//! Build downloadable `.xlsx` files

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use rust_xlsxwriter::Workbook;

use crate::model::attendee::AttendeePreview;
use crate::stats::classify::AttendeeView;

/// Columns of the statistics table, in display order
pub const STATISTICS_HEADERS: [&str; 8] = [
    "Name",
    "Team Name",
    "Institute Name",
    "Participant Type",
    "Team Role",
    "Gender",
    "Attendance",
    "Entry Time",
];

const PREVIEW_HEADERS: [&str; 4] = ["name", "email", "uid", "entry_time"];
const TEMPLATE_HEADERS: [&str; 3] = ["name", "email", "uid"];

fn write_sheet<I>(sheet_name: &str, headers: &[&str], rows: I) -> Result<Vec<u8>>
where
    I: IntoIterator<Item = Vec<String>>,
{
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet.set_name(sheet_name)?;

    for (col, name) in headers.iter().enumerate() {
        worksheet.write_string(0, col as u16, *name)?;
    }

    for (row_idx, row) in rows.into_iter().enumerate() {
        let row_num = (row_idx + 1) as u32;
        for (col, value) in row.iter().enumerate() {
            if !value.is_empty() {
                worksheet.write_string(row_num, col as u16, value)?;
            }
        }
    }

    workbook
        .save_to_buffer()
        .with_context(|| format!("Failed to build spreadsheet: {}", sheet_name))
}

fn entry_time_text(entry_time: Option<DateTime<Utc>>) -> String {
    match entry_time {
        Some(t) => t.format("%Y-%m-%d %H:%M:%S UTC").to_string(),
        None => "N/A".to_string(),
    }
}

/// Filtered statistics rows, laid out like the statistics table
pub fn write_views(views: &[AttendeeView]) -> Result<Vec<u8>> {
    let rows = views.iter().map(|v| {
        let r = &v.record;
        vec![
            r.name.clone(),
            r.team_name.clone().unwrap_or_default(),
            r.institute_name.clone().unwrap_or_default(),
            v.participant_type.to_string(),
            v.team_role.clone(),
            r.gender.clone().unwrap_or_default(),
            if v.is_present { "Present" } else { "Absent" }.to_string(),
            entry_time_text(r.entry_time),
        ]
    });

    write_sheet("Statistics", &STATISTICS_HEADERS, rows)
}

/// Upload preview rows
pub fn write_preview(rows: &[AttendeePreview]) -> Result<Vec<u8>> {
    let rows = rows.iter().map(|p| {
        vec![
            p.name.clone(),
            p.email.clone(),
            p.uid.clone(),
            p.entry_time.map(|t| t.to_rfc3339()).unwrap_or_default(),
        ]
    });

    write_sheet("Sheet1", &PREVIEW_HEADERS, rows)
}

/// Empty upload template with the required columns
pub fn write_template() -> Result<Vec<u8>> {
    write_sheet("Sheet1", &TEMPLATE_HEADERS, std::iter::empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::attendee::AttendeeRecord;
    use crate::sheet::reader::read_rows;
    use chrono::TimeZone;

    #[test]
    fn test_statistics_export_layout() {
        let present = AttendeeView::from(AttendeeRecord {
            name: "John Smith".into(),
            team_name: Some("Smithsonian Builders".into()),
            participants_type: Some("student".into()),
            team_role_label: Some("Team Leader".into()),
            gender: Some("male".into()),
            entry_time: Some(Utc.with_ymd_and_hms(2024, 1, 1, 10, 0, 0).unwrap()),
            ..Default::default()
        });
        let absent = AttendeeView::from(AttendeeRecord {
            name: "Mary".into(),
            ..Default::default()
        });

        let bytes = write_views(&[present, absent]).unwrap();
        let rows = read_rows(&bytes).unwrap();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0]["Name"], "John Smith");
        assert_eq!(rows[0]["Participant Type"], "Student");
        assert_eq!(rows[0]["Team Role"], "Team Leader");
        assert_eq!(rows[0]["Attendance"], "Present");
        assert_eq!(rows[0]["Entry Time"], "2024-01-01 10:00:00 UTC");
        assert_eq!(rows[1]["Team Role"], "Mentor");
        assert_eq!(rows[1]["Attendance"], "Absent");
        assert_eq!(rows[1]["Entry Time"], "N/A");
        assert!(rows[1].get("Team Name").is_none());
    }

    #[test]
    fn test_template_is_header_row_only() {
        use calamine::{Reader, Xlsx};

        let bytes = write_template().unwrap();
        assert!(read_rows(&bytes).unwrap().is_empty());

        let mut workbook = Xlsx::new(std::io::Cursor::new(bytes)).unwrap();
        let range = workbook.worksheet_range("Sheet1").unwrap();
        let header: Vec<String> = range
            .rows()
            .next()
            .unwrap()
            .iter()
            .map(|c| c.to_string())
            .collect();
        assert_eq!(header, vec!["name", "email", "uid"]);
        assert_eq!(range.height(), 1);
    }

    #[test]
    fn test_preview_export_keeps_uids() {
        let rows = vec![AttendeePreview {
            name: "Ana".into(),
            email: "ana@example.com".into(),
            uid: "A-1".into(),
            entry_time: None,
        }];

        let parsed = read_rows(&write_preview(&rows).unwrap()).unwrap();
        assert_eq!(parsed.len(), 1);
        assert_eq!(parsed[0]["uid"], "A-1");
        assert!(parsed[0].get("entry_time").is_none());
    }
}
