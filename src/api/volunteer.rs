use crate::{
    auth::{auth::AuthUser, password::hash_password},
    config::Config,
    error::{ApiError, is_duplicate_key},
    model::{
        role::Role,
        volunteer::{CreateVolunteer, VolunteerResponse},
    },
};
use actix_web::{HttpResponse, web};
use serde_json::json;
use sqlx::MySqlPool;
use tracing::{info, instrument};

fn is_protected(email: &str, protected: Option<&str>) -> bool {
    protected.is_some_and(|p| email.eq_ignore_ascii_case(p))
}

/// List volunteer accounts
#[utoipa::path(
    get,
    path = "/api/volunteers",
    responses(
        (status = 200, description = "Volunteer accounts", body = [VolunteerResponse]),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 500, description = "Internal server error")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Volunteers"
)]
pub async fn list_volunteers(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    config: web::Data<Config>,
) -> Result<HttpResponse, ApiError> {
    auth.require_admin()?;

    let volunteers = sqlx::query_as::<_, VolunteerResponse>(
        "SELECT id, name, email FROM volunteer_login ORDER BY id",
    )
    .fetch_all(pool.get_ref())
    .await
    .map_err(ApiError::internal("Failed to fetch volunteers"))?;

    let protected = config.protected_volunteer_email.as_deref();
    let visible: Vec<VolunteerResponse> = volunteers
        .into_iter()
        .filter(|v| !is_protected(&v.email, protected))
        .collect();

    Ok(HttpResponse::Ok().json(visible))
}

/// Create a volunteer account
#[utoipa::path(
    post,
    path = "/api/volunteers",
    request_body = CreateVolunteer,
    responses(
        (status = 201, description = "Volunteer created", body = VolunteerResponse),
        (status = 400, description = "Name, email or password missing"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 409, description = "Email already registered", body = Object, example = json!({
            "message": "Volunteer with this email already exists"
        })),
        (status = 500, description = "Internal server error")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Volunteers"
)]
#[instrument(
    name = "volunteer_create",
    skip(auth, pool, payload),
    fields(user_id = auth.user_id, email = %payload.email.trim())
)]
pub async fn create_volunteer(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    payload: web::Json<CreateVolunteer>,
) -> Result<HttpResponse, ApiError> {
    auth.require_admin()?;

    let name = payload.name.trim();
    let email = payload.email.trim();
    let password = payload.password.trim();
    if name.is_empty() || email.is_empty() || password.is_empty() {
        return Err(ApiError::BadRequest(
            "Name, email and password are required".into(),
        ));
    }

    let hash = hash_password(password).map_err(ApiError::internal("Failed to hash password"))?;

    let result = sqlx::query("INSERT INTO volunteer_login (name, email, password) VALUES (?, ?, ?)")
        .bind(name)
        .bind(email)
        .bind(&hash)
        .execute(pool.get_ref())
        .await;

    let id = match result {
        Ok(done) => done.last_insert_id(),
        Err(e) if is_duplicate_key(&e) => {
            info!("Duplicate volunteer email");
            return Err(ApiError::Conflict(
                "Volunteer with this email already exists".into(),
            ));
        }
        Err(e) => return Err(ApiError::internal("Failed to create volunteer")(e)),
    };

    info!(volunteer_id = id, "Volunteer created");

    Ok(HttpResponse::Created().json(VolunteerResponse {
        id,
        name: name.to_string(),
        email: email.to_string(),
    }))
}

/// Delete a volunteer account
#[utoipa::path(
    delete,
    path = "/api/volunteers/{id}",
    params(
        ("id" = u64, Path, description = "Volunteer id")
    ),
    responses(
        (status = 200, description = "Volunteer deleted", body = Object, example = json!({
            "message": "Volunteer deleted"
        })),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Protected account or not an admin"),
        (status = 404, description = "Volunteer not found"),
        (status = 500, description = "Internal server error")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Volunteers"
)]
pub async fn delete_volunteer(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    config: web::Data<Config>,
    id: web::Path<u64>,
) -> Result<HttpResponse, ApiError> {
    auth.require_admin()?;
    let id = id.into_inner();

    let email = sqlx::query_scalar::<_, String>("SELECT email FROM volunteer_login WHERE id = ?")
        .bind(id)
        .fetch_optional(pool.get_ref())
        .await
        .map_err(ApiError::internal("Failed to look up volunteer"))?
        .ok_or_else(|| ApiError::NotFound("Volunteer not found".into()))?;

    if is_protected(&email, config.protected_volunteer_email.as_deref()) {
        return Err(ApiError::Forbidden(
            "This volunteer account cannot be deleted".into(),
        ));
    }

    sqlx::query("DELETE FROM volunteer_login WHERE id = ?")
        .bind(id)
        .execute(pool.get_ref())
        .await
        .map_err(ApiError::internal("Failed to delete volunteer"))?;

    // open sessions of the account stop refreshing
    sqlx::query("UPDATE refresh_tokens SET revoked = TRUE WHERE subject_id = ? AND role_id = ?")
        .bind(id)
        .bind(Role::Volunteer.id())
        .execute(pool.get_ref())
        .await
        .map_err(ApiError::internal("Failed to revoke volunteer sessions"))?;

    info!(volunteer_id = id, user_id = auth.user_id, "Volunteer deleted");

    Ok(HttpResponse::Ok().json(json!({
        "message": "Volunteer deleted"
    })))
}
