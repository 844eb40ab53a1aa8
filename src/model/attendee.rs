use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, de};
use utoipa::ToSchema;

/// Column list of `attendee_details` used by bulk imports, in insert order
pub const ATTENDEE_COLUMNS: [&str; 10] = [
    "name",
    "email",
    "uid",
    "phone",
    "gender",
    "Team Name",
    "Team ID",
    "Institute Name",
    "Participants Type",
    "Team Leader/Member",
];

pub const SELECT_ATTENDEES: &str = r#"
    SELECT
        id,
        name,
        email,
        uid,
        phone,
        gender,
        `Team Name`,
        `Team ID`,
        `Institute Name`,
        `Participants Type`,
        `Team Leader/Member`,
        entry_time
    FROM attendee_details
    ORDER BY id
"#;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
#[schema(example = json!({
    "id": 1,
    "name": "John Smith",
    "email": "john@example.com",
    "uid": "REG-0001",
    "phone": "9876543210",
    "gender": "male",
    "Team Name": "Smithsonian Builders",
    "Team ID": "T-12",
    "Institute Name": "City College",
    "Participants Type": "Student",
    "Team Leader/Member": "Team Leader",
    "entry_time": "2024-01-01T10:00:00Z"
}))]
pub struct AttendeeRecord {
    #[serde(default)]
    pub id: u64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub uid: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub gender: Option<String>,

    #[serde(default, rename = "Team Name")]
    #[sqlx(rename = "Team Name")]
    pub team_name: Option<String>,

    #[serde(default, rename = "Team ID")]
    #[sqlx(rename = "Team ID")]
    pub team_id: Option<String>,

    #[serde(default, rename = "Institute Name")]
    #[sqlx(rename = "Institute Name")]
    pub institute_name: Option<String>,

    #[serde(default, rename = "Participants Type")]
    #[sqlx(rename = "Participants Type")]
    pub participants_type: Option<String>,

    #[serde(default, rename = "Team Leader/Member")]
    #[sqlx(rename = "Team Leader/Member")]
    pub team_role_label: Option<String>,

    /// Check-in timestamp; an empty string is read as "not checked in"
    #[serde(default, deserialize_with = "empty_as_none")]
    #[schema(value_type = Option<String>, format = "date-time")]
    pub entry_time: Option<DateTime<Utc>>,
}

/// Row shown in the upload preview table
#[derive(Debug, Clone, Serialize, sqlx::FromRow, ToSchema)]
pub struct AttendeePreview {
    #[schema(example = "John Smith")]
    pub name: String,
    #[schema(example = "john@example.com")]
    pub email: String,
    #[schema(example = "REG-0001")]
    pub uid: String,
    #[schema(value_type = Option<String>, format = "date-time")]
    pub entry_time: Option<DateTime<Utc>>,
}

fn empty_as_none<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(s) => DateTime::parse_from_rfc3339(s)
            .map(|dt| Some(dt.with_timezone(&Utc)))
            .map_err(de::Error::custom),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_deserialize_uses_column_names() {
        let record: AttendeeRecord = serde_json::from_value(json!({
            "name": "John Smith",
            "uid": "REG-1",
            "Team Name": "Smithsonian Builders",
            "Participants Type": "Student",
            "Team Leader/Member": "Team Leader",
            "entry_time": "2024-01-01T10:00:00Z"
        }))
        .unwrap();

        assert_eq!(record.team_name.as_deref(), Some("Smithsonian Builders"));
        assert_eq!(record.participants_type.as_deref(), Some("Student"));
        assert_eq!(record.team_role_label.as_deref(), Some("Team Leader"));
        assert!(record.entry_time.is_some());
        assert_eq!(record.email, "");
    }

    #[test]
    fn test_empty_entry_time_is_none() {
        let blank: AttendeeRecord = serde_json::from_value(json!({ "entry_time": "" })).unwrap();
        let null: AttendeeRecord = serde_json::from_value(json!({ "entry_time": null })).unwrap();
        assert_eq!(blank.entry_time, None);
        assert_eq!(null.entry_time, None);
    }

    #[test]
    fn test_serialize_keeps_column_names() {
        let record = AttendeeRecord {
            team_id: Some("T-1".to_string()),
            ..Default::default()
        };
        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["Team ID"], "T-1");
        assert!(value["entry_time"].is_null());
    }
}
