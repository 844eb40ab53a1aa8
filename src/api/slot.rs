use actix_web::{HttpResponse, web};
use sqlx::MySqlPool;

use crate::{auth::auth::AuthUser, error::ApiError, model::slot::SlotResponse};

/// Label of the most recently inserted slot. Older labels stay in the table
/// but are never read.
pub(crate) async fn latest_label(pool: &MySqlPool) -> Result<Option<String>, sqlx::Error> {
    sqlx::query_scalar::<_, String>("SELECT label FROM slot_details ORDER BY id DESC LIMIT 1")
        .fetch_optional(pool)
        .await
}

/// Current slot label
#[utoipa::path(
    get,
    path = "/api/slot",
    responses(
        (status = 200, description = "Label of the latest upload", body = SlotResponse),
        (status = 401, description = "Unauthorized"),
        (status = 500, description = "Internal server error")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Attendees"
)]
pub async fn current_slot(
    _auth: AuthUser,
    pool: web::Data<MySqlPool>,
) -> Result<HttpResponse, ApiError> {
    let label = latest_label(pool.get_ref())
        .await
        .map_err(ApiError::internal("Failed to fetch slot label"))?;

    Ok(HttpResponse::Ok().json(SlotResponse { label }))
}
