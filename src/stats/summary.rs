use serde::Serialize;
use utoipa::ToSchema;

use super::classify::{AttendeeView, ParticipantType, TeamRole};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StatisticsSummary {
    #[schema(example = 120)]
    pub total: usize,
    #[schema(example = 80)]
    pub present: usize,
    #[schema(example = 40)]
    pub absent: usize,
    #[schema(example = 90)]
    pub students: usize,
    #[schema(example = 30)]
    pub professionals: usize,
    #[schema(example = 30)]
    pub team_leaders: usize,
    #[schema(example = 75)]
    pub team_members: usize,
    #[schema(example = 15)]
    pub mentors: usize,
}

/// Counts over the rows that survived filtering.
pub fn summarize(views: &[AttendeeView]) -> StatisticsSummary {
    let mut summary = StatisticsSummary {
        total: views.len(),
        ..Default::default()
    };

    for view in views {
        if view.is_present {
            summary.present += 1;
        }
        match view.participant_type {
            ParticipantType::Student => summary.students += 1,
            ParticipantType::Professional => summary.professionals += 1,
        }
        match view.role {
            TeamRole::TeamLeader => summary.team_leaders += 1,
            TeamRole::TeamMember => summary.team_members += 1,
            TeamRole::Mentor => summary.mentors += 1,
        }
    }

    summary.absent = summary.total - summary.present;
    summary
}
