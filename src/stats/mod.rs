//! Classification and filtering behind the statistics view.
//!
//! Every request runs [`pipeline`] on its own snapshot of the attendee table:
//! classify the raw rows, keep the ones matching the criteria, then count
//! over what is left. Nothing here does I/O or keeps state between calls.

pub mod classify;
pub mod filter;
pub mod summary;

use serde::Serialize;

use crate::model::attendee::AttendeeRecord;
use classify::{AttendeeView, classify};
use filter::{FilterCriteria, filter};
use summary::{StatisticsSummary, summarize};

#[derive(Debug, Serialize)]
pub struct StatisticsView {
    pub summary: StatisticsSummary,
    pub data: Vec<AttendeeView>,
}

pub fn pipeline(rows: Vec<AttendeeRecord>, criteria: &FilterCriteria) -> StatisticsView {
    let data = filter(classify(rows), criteria);
    let summary = summarize(&data);
    StatisticsView { summary, data }
}

#[cfg(test)]
mod tests {
    use super::*;
    use filter::{AttendanceFilter, ParticipantTypeFilter};
    use serde_json::json;

    fn ten_rows() -> Vec<AttendeeRecord> {
        (0..10)
            .map(|i| {
                serde_json::from_value(json!({
                    "id": i,
                    "uid": format!("U{i}"),
                    "Participants Type": if i < 5 { "Student" } else { "Professional" },
                    "entry_time": if i % 3 == 0 { json!("2024-01-01T10:00:00Z") } else { json!(null) },
                }))
                .unwrap()
            })
            .collect()
    }

    #[test]
    fn test_summary_covers_filtered_rows_only() {
        // students present: ids 0 and 3; professionals present: 6 and 9
        let criteria = FilterCriteria {
            participant_type: ParticipantTypeFilter::Student,
            attendance: AttendanceFilter::Present,
            ..Default::default()
        };
        let view = pipeline(ten_rows(), &criteria);

        assert_eq!(view.data.len(), 2);
        assert_eq!(view.summary.total, 2);
        assert_eq!(view.summary.present, 2);
        assert_eq!(view.summary.students, 2);
        assert_eq!(view.summary.professionals, 0);
    }

    #[test]
    fn test_three_matching_rows() {
        let mut rows = ten_rows();
        rows[1].entry_time = rows[0].entry_time;
        let criteria = FilterCriteria {
            participant_type: ParticipantTypeFilter::Student,
            attendance: AttendanceFilter::Present,
            ..Default::default()
        };

        let view = pipeline(rows, &criteria);
        assert_eq!(view.data.len(), 3);
        assert_eq!(view.summary.total, 3);
    }

    #[test]
    fn test_empty_collection() {
        let view = pipeline(Vec::new(), &FilterCriteria::default());
        assert!(view.data.is_empty());
        assert_eq!(view.summary, StatisticsSummary::default());
    }

    #[test]
    fn test_response_shape() {
        let view = pipeline(ten_rows(), &FilterCriteria::default());
        let value = serde_json::to_value(&view).unwrap();
        assert_eq!(value["summary"]["total"], 10);
        assert_eq!(value["data"].as_array().map(Vec::len), Some(10));
        assert_eq!(value["data"][0]["uid"], "U0");
    }
}
