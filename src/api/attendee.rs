use actix_web::{HttpResponse, web};
use serde::{Deserialize, Serialize};
use serde_json::json;
use sqlx::MySqlPool;
use tracing::{debug, info, instrument};
use utoipa::{IntoParams, ToSchema};

use crate::{
    api::{slot::latest_label, xlsx_response},
    auth::auth::AuthUser,
    error::ApiError,
    model::attendee::{ATTENDEE_COLUMNS, AttendeePreview, AttendeeRecord, SELECT_ATTENDEES},
    sheet::{self, AttendeeImport},
    utils::db_utils::{SqlValue, build_bulk_insert, execute_insert},
};

/// Rows per INSERT statement during an upload
const INSERT_CHUNK: usize = 500;

const SELECT_PREVIEW: &str = r#"
    SELECT name, email, uid, entry_time
    FROM attendee_details
    ORDER BY id
"#;

/// Whole attendee table as stored, in insertion order
pub(crate) async fn fetch_attendees(pool: &MySqlPool) -> Result<Vec<AttendeeRecord>, sqlx::Error> {
    sqlx::query_as::<_, AttendeeRecord>(SELECT_ATTENDEES)
        .fetch_all(pool)
        .await
}

async fn fetch_preview(pool: &MySqlPool) -> Result<Vec<AttendeePreview>, ApiError> {
    sqlx::query_as::<_, AttendeePreview>(SELECT_PREVIEW)
        .fetch_all(pool)
        .await
        .map_err(ApiError::internal("Failed to fetch attendees"))
}

#[derive(Serialize, ToSchema)]
pub struct AttendeeListResponse {
    /// Label of the latest upload
    #[schema(example = "Day 1 - Morning", nullable = true)]
    pub label: Option<String>,
    pub data: Vec<AttendeePreview>,
}

#[derive(Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct UploadQuery {
    /// Slot label for this upload
    #[param(example = "Day 1 - Morning")]
    pub label: Option<String>,
}

/// Upload preview: every attendee with the current slot label
#[utoipa::path(
    get,
    path = "/api/attendees",
    responses(
        (status = 200, description = "Attendee preview", body = AttendeeListResponse),
        (status = 401, description = "Unauthorized"),
        (status = 500, description = "Internal server error")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Attendees"
)]
pub async fn list_attendees(
    _auth: AuthUser,
    pool: web::Data<MySqlPool>,
) -> Result<HttpResponse, ApiError> {
    let data = fetch_preview(pool.get_ref()).await?;
    let label = latest_label(pool.get_ref())
        .await
        .map_err(ApiError::internal("Failed to fetch slot label"))?;

    Ok(HttpResponse::Ok().json(AttendeeListResponse { label, data }))
}

/// Replace all attendees with the rows of an uploaded `.xlsx` file
///
/// The request body is the raw workbook. The file is parsed before anything
/// is written, so a broken file leaves the stored attendees untouched.
#[utoipa::path(
    post,
    path = "/api/attendees/upload",
    params(UploadQuery),
    request_body(
        content = Vec<u8>,
        description = "Workbook bytes",
        content_type = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"
    ),
    responses(
        (status = 200, description = "Attendees replaced", body = Object, example = json!({
            "message": "Upload complete",
            "label": "Day 1 - Morning",
            "inserted": 120
        })),
        (status = 400, description = "Missing label or file, or unreadable spreadsheet"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 500, description = "Internal server error")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Attendees"
)]
#[instrument(
    name = "attendee_upload",
    skip(auth, pool, query, body),
    fields(user_id = auth.user_id, bytes = body.len())
)]
pub async fn upload_attendees(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    query: web::Query<UploadQuery>,
    body: web::Bytes,
) -> Result<HttpResponse, ApiError> {
    auth.require_admin()?;

    let label = query.label.as_deref().map(str::trim).unwrap_or_default();
    if label.is_empty() || body.is_empty() {
        return Err(ApiError::BadRequest(
            "Please upload a file and enter a label first!".into(),
        ));
    }

    let rows = sheet::read_rows(&body).map_err(|e| {
        info!(error = %e, "Rejected spreadsheet");
        ApiError::BadRequest(format!("Could not read spreadsheet: {}", e))
    })?;
    let imports: Vec<AttendeeImport> = rows.iter().filter_map(AttendeeImport::from_row).collect();
    debug!(rows = rows.len(), attendees = imports.len(), "Spreadsheet parsed");

    let mut tx = pool
        .begin()
        .await
        .map_err(ApiError::internal("Failed to start upload"))?;

    sqlx::query("INSERT INTO slot_details (label) VALUES (?)")
        .bind(label)
        .execute(&mut *tx)
        .await
        .map_err(ApiError::internal("Failed to save slot label"))?;

    // uploads replace the collection; uids are not merged
    let removed = sqlx::query("DELETE FROM attendee_details")
        .execute(&mut *tx)
        .await
        .map_err(ApiError::internal("Failed to clear attendees"))?
        .rows_affected();

    let mut inserted = 0u64;
    for chunk in imports.chunks(INSERT_CHUNK) {
        let values: Vec<Vec<SqlValue>> = chunk.iter().map(AttendeeImport::to_sql_values).collect();
        let insert = build_bulk_insert("attendee_details", &ATTENDEE_COLUMNS, &values)
            .map_err(ApiError::internal("Failed to build attendee insert"))?;
        debug!(rows = insert.rows, "Inserting attendee chunk");

        inserted += execute_insert(&mut *tx, insert)
            .await
            .map_err(ApiError::internal("Failed to insert attendees"))?;
    }

    tx.commit()
        .await
        .map_err(ApiError::internal("Failed to commit upload"))?;

    info!(label, removed, inserted, "Attendee upload complete");

    Ok(HttpResponse::Ok().json(json!({
        "message": "Upload complete",
        "label": label,
        "inserted": inserted
    })))
}

/// Delete every attendee
#[utoipa::path(
    delete,
    path = "/api/attendees",
    responses(
        (status = 200, description = "All attendees deleted", body = Object, example = json!({
            "message": "All attendee data deleted",
            "deleted": 120
        })),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 500, description = "Internal server error")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Attendees"
)]
pub async fn delete_all_attendees(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
) -> Result<HttpResponse, ApiError> {
    auth.require_admin()?;

    let deleted = sqlx::query("DELETE FROM attendee_details")
        .execute(pool.get_ref())
        .await
        .map_err(ApiError::internal("Failed to delete attendees"))?
        .rows_affected();

    info!(user_id = auth.user_id, deleted, "Deleted all attendees");

    Ok(HttpResponse::Ok().json(json!({
        "message": "All attendee data deleted",
        "deleted": deleted
    })))
}

/// Download the preview table as `download.xlsx`
#[utoipa::path(
    get,
    path = "/api/attendees/export",
    responses(
        (status = 200, description = "Workbook", content_type = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 500, description = "Internal server error")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Attendees"
)]
pub async fn export_attendees(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
) -> Result<HttpResponse, ApiError> {
    auth.require_admin()?;

    let rows = fetch_preview(pool.get_ref()).await?;
    let bytes =
        sheet::write_preview(&rows).map_err(ApiError::internal("Failed to build spreadsheet"))?;

    Ok(xlsx_response(bytes, "download.xlsx"))
}

/// Download an empty upload template
#[utoipa::path(
    get,
    path = "/api/attendees/template",
    responses(
        (status = 200, description = "Workbook", content_type = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Attendees"
)]
pub async fn download_template(auth: AuthUser) -> Result<HttpResponse, ApiError> {
    auth.require_admin()?;

    let bytes = sheet::write_template().map_err(ApiError::internal("Failed to build template"))?;
    Ok(xlsx_response(bytes, "template.xlsx"))
}
