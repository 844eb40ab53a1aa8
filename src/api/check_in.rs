use crate::{auth::auth::AuthUser, error::ApiError};
use actix_web::{HttpResponse, web};
use chrono::{DateTime, Utc};
use serde_json::json;
use sqlx::MySqlPool;
use tracing::info;

/// `Some(entry_time)` when the uid exists
async fn current_entry_time(
    uid: &str,
    pool: &MySqlPool,
) -> Result<Option<Option<DateTime<Utc>>>, ApiError> {
    sqlx::query_scalar::<_, Option<DateTime<Utc>>>(
        "SELECT entry_time FROM attendee_details WHERE uid = ? LIMIT 1",
    )
    .bind(uid)
    .fetch_optional(pool)
    .await
    .map_err(ApiError::internal("Failed to look up attendee"))
}

/// Error for a check-in that updated no row, given the stored entry time
/// (`None` when the uid is unknown).
fn rejected_check_in(existing: Option<Option<DateTime<Utc>>>) -> ApiError {
    match existing {
        None => ApiError::NotFound("Attendee not found".into()),
        Some(_) => ApiError::BadRequest("Already checked in".into()),
    }
}

/// Record the entry time of an attendee
#[utoipa::path(
    put,
    path = "/api/attendees/{uid}/check-in",
    params(
        ("uid" = String, Path, description = "Attendee uid")
    ),
    responses(
        (status = 200, description = "Checked in successfully", body = Object, example = json!({
            "message": "Checked in successfully"
        })),
        (status = 400, description = "Already checked in", body = Object, example = json!({
            "message": "Already checked in"
        })),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Attendee not found"),
        (status = 500, description = "Internal server error")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Attendees"
)]
pub async fn check_in(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    uid: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let uid = uid.into_inner();

    let result = sqlx::query(
        r#"
        UPDATE attendee_details
        SET entry_time = UTC_TIMESTAMP()
        WHERE uid = ?
        AND entry_time IS NULL
        "#,
    )
    .bind(&uid)
    .execute(pool.get_ref())
    .await
    .map_err(ApiError::internal("Check-in failed"))?;

    if result.rows_affected() == 0 {
        let existing = current_entry_time(&uid, pool.get_ref()).await?;
        return Err(rejected_check_in(existing));
    }

    info!(uid = %uid, user_id = auth.user_id, "Attendee checked in");

    Ok(HttpResponse::Ok().json(json!({
        "message": "Checked in successfully"
    })))
}

/// Undo a check-in
#[utoipa::path(
    delete,
    path = "/api/attendees/{uid}/check-in",
    params(
        ("uid" = String, Path, description = "Attendee uid")
    ),
    responses(
        (status = 200, description = "Check-in cleared", body = Object, example = json!({
            "message": "Check-in cleared"
        })),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Attendee not found"),
        (status = 500, description = "Internal server error")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Attendees"
)]
pub async fn clear_check_in(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    uid: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let uid = uid.into_inner();

    // clearing an absent attendee is a no-op, so only a missing uid fails
    if current_entry_time(&uid, pool.get_ref()).await?.is_none() {
        return Err(ApiError::NotFound("Attendee not found".into()));
    }

    sqlx::query("UPDATE attendee_details SET entry_time = NULL WHERE uid = ?")
        .bind(&uid)
        .execute(pool.get_ref())
        .await
        .map_err(ApiError::internal("Failed to clear check-in"))?;

    info!(uid = %uid, user_id = auth.user_id, "Check-in cleared");

    Ok(HttpResponse::Ok().json(json!({
        "message": "Check-in cleared"
    })))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_unknown_uid_is_not_found() {
        assert!(matches!(rejected_check_in(None), ApiError::NotFound(_)));
    }

    #[test]
    fn test_repeat_check_in_is_rejected() {
        let at = Utc.with_ymd_and_hms(2024, 1, 1, 10, 0, 0).unwrap();
        let err = rejected_check_in(Some(Some(at)));
        assert!(matches!(err, ApiError::BadRequest(_)));
        assert_eq!(err.to_string(), "Already checked in");
    }
}
