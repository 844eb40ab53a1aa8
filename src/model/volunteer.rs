use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Serialize, sqlx::FromRow, ToSchema)]
pub struct VolunteerResponse {
    #[schema(example = 4)]
    pub id: u64,
    #[schema(example = "Asha Rao")]
    pub name: String,
    #[schema(example = "asha@example.com", format = "email")]
    pub email: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateVolunteer {
    #[schema(example = "Asha Rao")]
    pub name: String,
    #[schema(example = "asha@example.com", format = "email")]
    pub email: String,
    #[schema(example = "s3cret", format = "password")]
    pub password: String,
}
