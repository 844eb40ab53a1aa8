use actix_web::{HttpResponse, web};
use sqlx::MySqlPool;
use tracing::{debug, instrument};

use crate::{
    api::{attendee::fetch_attendees, xlsx_response},
    auth::auth::AuthUser,
    error::ApiError,
    sheet,
    stats::{StatisticsView, filter::FilterCriteria, pipeline},
};

async fn load_view(pool: &MySqlPool, criteria: &FilterCriteria) -> Result<StatisticsView, ApiError> {
    let rows = fetch_attendees(pool)
        .await
        .map_err(ApiError::internal("Failed to fetch data. Please try again."))?;

    let view = pipeline(rows, criteria);
    debug!(
        total = view.summary.total,
        present = view.summary.present,
        "Statistics computed"
    );
    Ok(view)
}

/// Classified attendees with counts, narrowed by the given filters
#[utoipa::path(
    get,
    path = "/api/statistics",
    params(FilterCriteria),
    responses(
        (status = 200, description = "Summary and matching attendees", body = Object, example = json!({
            "summary": {
                "total": 1,
                "present": 1,
                "absent": 0,
                "students": 1,
                "professionals": 0,
                "teamLeaders": 1,
                "teamMembers": 0,
                "mentors": 0
            },
            "data": [{
                "id": 1,
                "name": "John Smith",
                "uid": "U-001",
                "Participants Type": "student",
                "Team Leader/Member": "Team Leader",
                "gender": "male",
                "entry_time": "2024-01-01T10:00:00Z",
                "participantType": "Student",
                "teamRole": "Team Leader",
                "isPresent": true
            }]
        })),
        (status = 400, description = "Malformed query"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 500, description = "Failed to fetch data. Please try again.")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Statistics"
)]
#[instrument(
    name = "statistics",
    skip(auth, pool, criteria),
    fields(user_id = auth.user_id, search = %criteria.search_term)
)]
pub async fn statistics(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    criteria: web::Query<FilterCriteria>,
) -> Result<HttpResponse, ApiError> {
    auth.require_admin()?;

    let view = load_view(pool.get_ref(), &criteria).await?;
    Ok(HttpResponse::Ok().json(view))
}

/// Download the filtered statistics table as `statistics.xlsx`
#[utoipa::path(
    get,
    path = "/api/statistics/export",
    params(FilterCriteria),
    responses(
        (status = 200, description = "Workbook", content_type = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 500, description = "Failed to fetch data. Please try again.")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Statistics"
)]
pub async fn export_statistics(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    criteria: web::Query<FilterCriteria>,
) -> Result<HttpResponse, ApiError> {
    auth.require_admin()?;

    let view = load_view(pool.get_ref(), &criteria).await?;
    let bytes =
        sheet::write_views(&view.data).map_err(ApiError::internal("Failed to build spreadsheet"))?;

    Ok(xlsx_response(bytes, "statistics.xlsx"))
}
