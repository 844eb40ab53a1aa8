use serde::Serialize;
use utoipa::ToSchema;

#[derive(Debug, Serialize, ToSchema)]
pub struct SlotResponse {
    /// Label of the most recent upload, null when nothing was uploaded yet
    #[schema(example = "Day 1 - Morning", nullable = true)]
    pub label: Option<String>,
}
