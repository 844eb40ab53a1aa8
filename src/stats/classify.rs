use serde::Serialize;
use strum::{AsRefStr, Display};

use crate::model::attendee::AttendeeRecord;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Display, AsRefStr)]
pub enum ParticipantType {
    Student,
    Professional,
}

impl ParticipantType {
    /// Anything other than a "student" label, including a missing one, is a professional.
    pub fn from_label(label: Option<&str>) -> Self {
        match label {
            Some(l) if l.to_lowercase() == "student" => ParticipantType::Student,
            _ => ParticipantType::Professional,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum TeamRole {
    #[strum(serialize = "Team Leader")]
    TeamLeader,
    #[strum(serialize = "Team Member")]
    TeamMember,
    Mentor,
}

impl TeamRole {
    /// Returns the role together with the label to display. Leader and member
    /// labels keep the casing they were imported with.
    pub fn from_label(label: Option<&str>) -> (Self, String) {
        let Some(label) = label else {
            return (TeamRole::Mentor, TeamRole::Mentor.to_string());
        };

        match label.to_lowercase().as_str() {
            "team leader" => (TeamRole::TeamLeader, label.to_string()),
            "team member" => (TeamRole::TeamMember, label.to_string()),
            _ => (TeamRole::Mentor, TeamRole::Mentor.to_string()),
        }
    }
}

/// Attendee row plus the classifications the statistics view works on.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AttendeeView {
    #[serde(flatten)]
    pub record: AttendeeRecord,
    #[serde(rename = "participantType")]
    pub participant_type: ParticipantType,
    #[serde(rename = "teamRole")]
    pub team_role: String,
    #[serde(rename = "isPresent")]
    pub is_present: bool,
    #[serde(skip)]
    pub role: TeamRole,
}

impl From<AttendeeRecord> for AttendeeView {
    fn from(record: AttendeeRecord) -> Self {
        let participant_type = ParticipantType::from_label(record.participants_type.as_deref());
        let (role, team_role) = TeamRole::from_label(record.team_role_label.as_deref());
        let is_present = record.entry_time.is_some();

        AttendeeView {
            record,
            participant_type,
            team_role,
            is_present,
            role,
        }
    }
}

impl AttendeeView {
    /// String form of every populated field, raw and derived, as searched by
    /// the free-text filter. `isPresent` only contributes when it is true.
    pub fn searchable_values(&self) -> Vec<String> {
        let r = &self.record;
        let mut values = vec![
            r.id.to_string(),
            r.name.clone(),
            r.email.clone(),
            r.uid.clone(),
        ];

        values.extend(
            [
                &r.phone,
                &r.gender,
                &r.team_name,
                &r.team_id,
                &r.institute_name,
                &r.participants_type,
                &r.team_role_label,
            ]
            .into_iter()
            .flatten()
            .cloned(),
        );

        if let Some(entry_time) = r.entry_time {
            values.push(entry_time.to_rfc3339());
        }

        values.push(self.participant_type.to_string());
        values.push(self.team_role.clone());
        if self.is_present {
            values.push("true".to_string());
        }

        values.retain(|v| !v.is_empty());
        values
    }
}

/// Classifies every row, keeping cardinality and order.
pub fn classify(rows: Vec<AttendeeRecord>) -> Vec<AttendeeView> {
    rows.into_iter().map(AttendeeView::from).collect()
}
