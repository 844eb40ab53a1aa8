use std::fmt::Display;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, de};
use strum::{AsRefStr, Display as StrumDisplay, EnumString};
use utoipa::IntoParams;

use super::classify::AttendeeView;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, StrumDisplay, AsRefStr, EnumString)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum GenderFilter {
    #[default]
    All,
    Male,
    Female,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, StrumDisplay, AsRefStr, EnumString)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum ParticipantTypeFilter {
    #[default]
    All,
    Student,
    Professional,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, StrumDisplay, AsRefStr, EnumString)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum AttendanceFilter {
    #[default]
    All,
    Present,
    Absent,
}

/// Statistics filters. The default lets every row through.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct FilterCriteria {
    /// all | male | female
    #[serde(default, deserialize_with = "lenient_enum")]
    #[param(value_type = Option<String>, example = "female")]
    pub gender: GenderFilter,

    /// all | student | professional
    #[serde(default, deserialize_with = "lenient_enum")]
    #[param(value_type = Option<String>, example = "student")]
    pub participant_type: ParticipantTypeFilter,

    /// all | present | absent
    #[serde(default, deserialize_with = "lenient_enum")]
    #[param(value_type = Option<String>, example = "present")]
    pub attendance: AttendanceFilter,

    /// Case-insensitive text matched against every field of a row
    #[serde(default, rename = "search")]
    #[param(example = "smith")]
    pub search_term: String,
}

/// Blank or missing values fall back to the default ("all").
fn lenient_enum<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr + Default,
    T::Err: Display,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(T::default()),
        Some(s) => s
            .parse()
            .map_err(|e| de::Error::custom(format!("invalid filter value '{s}': {e}"))),
    }
}

impl FilterCriteria {
    /// `needle` is the lowercased search term
    fn matches(&self, view: &AttendeeView, needle: &str) -> bool {
        self.matches_gender(view)
            && self.matches_participant_type(view)
            && self.matches_attendance(view)
            && matches_search(view, needle)
    }

    fn matches_gender(&self, view: &AttendeeView) -> bool {
        if self.gender == GenderFilter::All {
            return true;
        }
        view.record
            .gender
            .as_deref()
            .is_some_and(|g| g.to_lowercase() == self.gender.as_ref())
    }

    fn matches_participant_type(&self, view: &AttendeeView) -> bool {
        if self.participant_type == ParticipantTypeFilter::All {
            return true;
        }
        view.participant_type.as_ref().to_lowercase() == self.participant_type.as_ref()
    }

    fn matches_attendance(&self, view: &AttendeeView) -> bool {
        match self.attendance {
            AttendanceFilter::All => true,
            AttendanceFilter::Present => view.is_present,
            AttendanceFilter::Absent => !view.is_present,
        }
    }
}

fn matches_search(view: &AttendeeView, needle: &str) -> bool {
    if needle.is_empty() {
        return true;
    }
    view.searchable_values()
        .iter()
        .any(|value| value.to_lowercase().contains(needle))
}

/// Keeps the rows satisfying every active criterion, in their original order.
pub fn filter(views: Vec<AttendeeView>, criteria: &FilterCriteria) -> Vec<AttendeeView> {
    let needle = criteria.search_term.to_lowercase();
    views
        .into_iter()
        .filter(|view| criteria.matches(view, &needle))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::attendee::AttendeeRecord;
    use crate::stats::classify::{ParticipantType, classify};
    use serde_json::json;

    fn views(rows: serde_json::Value) -> Vec<AttendeeView> {
        let rows: Vec<AttendeeRecord> = serde_json::from_value(rows).unwrap();
        classify(rows)
    }

    fn uids(views: &[AttendeeView]) -> Vec<&str> {
        views.iter().map(|v| v.record.uid.as_str()).collect()
    }

    fn sample() -> Vec<AttendeeView> {
        views(json!([
            { "uid": "1", "gender": "Female", "Participants Type": "student", "entry_time": "2024-01-01T10:00:00Z" },
            { "uid": "2", "gender": "male", "Participants Type": "Student" },
            { "uid": "3", "gender": "MALE", "Participants Type": "Professional", "entry_time": "2024-01-01T11:00:00Z" },
            { "uid": "4", "Participants Type": "STUDENT", "entry_time": "2024-01-01T12:00:00Z" },
            { "uid": "5", "gender": "female" }
        ]))
    }

    #[test]
    fn test_default_criteria_keep_everything() {
        let all = sample();
        let result = filter(all.clone(), &FilterCriteria::default());
        assert_eq!(result, all);
    }

    #[test]
    fn test_gender_filter_ignores_case_and_skips_missing() {
        let criteria = FilterCriteria {
            gender: GenderFilter::Male,
            ..Default::default()
        };
        assert_eq!(uids(&filter(sample(), &criteria)), vec!["2", "3"]);

        let criteria = FilterCriteria {
            gender: GenderFilter::Female,
            ..Default::default()
        };
        assert_eq!(uids(&filter(sample(), &criteria)), vec!["1", "5"]);
    }

    #[test]
    fn test_participant_type_filter() {
        let criteria = FilterCriteria {
            participant_type: ParticipantTypeFilter::Student,
            ..Default::default()
        };
        assert_eq!(uids(&filter(sample(), &criteria)), vec!["1", "2", "4"]);

        let criteria = FilterCriteria {
            participant_type: ParticipantTypeFilter::Professional,
            ..Default::default()
        };
        assert_eq!(uids(&filter(sample(), &criteria)), vec!["3", "5"]);
    }

    #[test]
    fn test_attendance_filter() {
        let present = FilterCriteria {
            attendance: AttendanceFilter::Present,
            ..Default::default()
        };
        let absent = FilterCriteria {
            attendance: AttendanceFilter::Absent,
            ..Default::default()
        };
        assert_eq!(uids(&filter(sample(), &present)), vec!["1", "3", "4"]);
        assert_eq!(uids(&filter(sample(), &absent)), vec!["2", "5"]);
    }

    #[test]
    fn test_compound_student_present() {
        let mut rows = Vec::new();
        for i in 0..10 {
            let student = i % 2 == 0;
            let present = i < 6;
            rows.push(json!({
                "uid": i.to_string(),
                "Participants Type": if student { "Student" } else { "Professional" },
                "entry_time": if present { json!("2024-01-01T10:00:00Z") } else { json!(null) },
            }));
        }
        let criteria = FilterCriteria {
            participant_type: ParticipantTypeFilter::Student,
            attendance: AttendanceFilter::Present,
            ..Default::default()
        };

        let result = filter(views(json!(rows)), &criteria);
        assert_eq!(uids(&result), vec!["0", "2", "4"]);
        assert!(
            result
                .iter()
                .all(|v| v.is_present && v.participant_type == ParticipantType::Student)
        );
    }

    #[test]
    fn test_search_matches_any_field() {
        let rows = views(json!([
            { "uid": "a", "name": "John Smith" },
            { "uid": "b", "name": "Mary Jones", "Team Name": "Smithsonian Builders" },
            { "uid": "c", "name": "Li Wei", "Team Name": "Rocket" }
        ]));
        let criteria = FilterCriteria {
            search_term: "SMITH".to_string(),
            ..Default::default()
        };
        assert_eq!(uids(&filter(rows, &criteria)), vec!["a", "b"]);
    }

    #[test]
    fn test_search_covers_derived_fields() {
        let rows = views(json!([
            { "uid": "a", "Team Leader/Member": "Team Leader" },
            { "uid": "b" }
        ]));
        let criteria = FilterCriteria {
            search_term: "mentor".to_string(),
            ..Default::default()
        };
        assert_eq!(uids(&filter(rows, &criteria)), vec!["b"]);
    }

    #[test]
    fn test_filter_is_idempotent() {
        let criteria = FilterCriteria {
            gender: GenderFilter::Female,
            search_term: "1".to_string(),
            ..Default::default()
        };
        let once = filter(sample(), &criteria);
        let twice = filter(once.clone(), &criteria);
        assert_eq!(once, twice);
        assert!(once.len() <= sample().len());
    }

    #[test]
    fn test_no_match_is_empty() {
        let criteria = FilterCriteria {
            search_term: "nobody-has-this".to_string(),
            ..Default::default()
        };
        assert!(filter(sample(), &criteria).is_empty());
    }

    #[test]
    fn test_query_parsing_is_case_insensitive() {
        let criteria: FilterCriteria = serde_json::from_value(json!({
            "gender": "FEMALE",
            "participant_type": "Student",
            "attendance": "",
            "search": "smith"
        }))
        .unwrap();

        assert_eq!(criteria.gender, GenderFilter::Female);
        assert_eq!(criteria.participant_type, ParticipantTypeFilter::Student);
        assert_eq!(criteria.attendance, AttendanceFilter::All);
        assert_eq!(criteria.search_term, "smith");
    }

    #[test]
    fn test_query_parsing_rejects_unknown_values() {
        let result: Result<FilterCriteria, _> =
            serde_json::from_value(json!({ "attendance": "late" }));
        assert!(result.is_err());
    }
}
