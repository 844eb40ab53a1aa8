use crate::{
    auth::{
        auth::AuthUser,
        jwt::{generate_access_token, generate_refresh_token, verify_token},
        password::verify_password,
        revocation,
    },
    config::Config,
    error::ApiError,
    model::{account::AccountSql, role::Role},
    models::{LoginReqDto, TokenPair, TokenType},
};
use actix_web::{HttpRequest, HttpResponse, web};
use serde_json::json;
use sqlx::MySqlPool;
use tracing::{debug, info, instrument};

/// Admins take precedence when the same email exists in both tables
async fn find_account(
    email: &str,
    pool: &MySqlPool,
) -> Result<Option<(Role, AccountSql)>, ApiError> {
    for role in [Role::Admin, Role::Volunteer] {
        let sql = format!(
            "SELECT id, email, password FROM {} WHERE email = ?",
            role.account_table()
        );

        let account = sqlx::query_as::<_, AccountSql>(&sql)
            .bind(email)
            .fetch_optional(pool)
            .await
            .map_err(ApiError::internal("Failed to look up account"))?;

        if let Some(account) = account {
            debug!(user_id = account.id, role = %role, "Account found");
            return Ok(Some((role, account)));
        }
    }

    Ok(None)
}

/// Issues an access/refresh pair and stores the refresh token id
async fn issue_tokens(
    user_id: u64,
    email: &str,
    role: Role,
    pool: &MySqlPool,
    config: &Config,
) -> Result<TokenPair, ApiError> {
    let (access_token, _) = generate_access_token(
        user_id,
        email.to_string(),
        role.id(),
        &config.jwt_secret,
        config.access_token_ttl,
    )
    .map_err(ApiError::internal("Failed to issue token"))?;

    let (refresh_token, refresh_claims) = generate_refresh_token(
        user_id,
        email.to_string(),
        role.id(),
        &config.jwt_secret,
        config.refresh_token_ttl,
    )
    .map_err(ApiError::internal("Failed to issue token"))?;

    debug!(user_id, jti = %refresh_claims.jti, "Storing refresh token");

    sqlx::query(
        r#"
        INSERT INTO refresh_tokens (subject_id, role_id, jti, expires_at)
        VALUES (?, ?, ?, FROM_UNIXTIME(?))
        "#,
    )
    .bind(user_id)
    .bind(role.id())
    .bind(&refresh_claims.jti)
    .bind(refresh_claims.exp as i64)
    .execute(pool)
    .await
    .map_err(ApiError::internal("Failed to store refresh token"))?;

    Ok(TokenPair {
        access_token,
        refresh_token,
    })
}

/// Log in as an admin or volunteer
#[utoipa::path(
    post,
    path = "/auth/login",
    request_body = LoginReqDto,
    responses(
        (status = 200, description = "Session opened", body = TokenPair),
        (status = 400, description = "Email or password missing"),
        (status = 401, description = "Invalid email or password")
    ),
    tag = "Auth"
)]
#[instrument(
    name = "auth_login",
    skip(pool, config, user),
    fields(email = %user.email)
)]
pub async fn login(
    user: web::Json<LoginReqDto>,
    pool: web::Data<MySqlPool>,
    config: web::Data<Config>,
) -> Result<HttpResponse, ApiError> {
    info!("Login request received");

    let email = user.email.trim();
    if email.is_empty() || user.password.is_empty() {
        info!("Validation failed: empty email or password");
        return Err(ApiError::BadRequest("Email and password are required".into()));
    }

    let Some((role, account)) = find_account(email, pool.get_ref()).await? else {
        info!("Invalid credentials: account not found");
        return Err(ApiError::Unauthorized("Invalid email or password".into()));
    };

    if let Err(e) = verify_password(&user.password, &account.password) {
        info!(error = %e, "Invalid credentials: password mismatch");
        return Err(ApiError::Unauthorized("Invalid email or password".into()));
    }

    let tokens = issue_tokens(account.id, &account.email, role, pool.get_ref(), &config).await?;

    info!(role = %role, "Login successful");
    Ok(HttpResponse::Ok().json(tokens))
}

/// Exchange a refresh token for a new token pair
#[utoipa::path(
    post,
    path = "/auth/refresh",
    responses(
        (status = 200, description = "New token pair", body = TokenPair),
        (status = 401, description = "Refresh token missing, expired or already used")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Auth"
)]
pub async fn refresh_token(
    req: HttpRequest,
    pool: web::Data<MySqlPool>,
    config: web::Data<Config>,
) -> Result<HttpResponse, ApiError> {
    let token = req
        .headers()
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .ok_or_else(|| ApiError::Unauthorized("No token".into()))?;

    let claims = verify_token(token, &config.jwt_secret)
        .map_err(|_| ApiError::Unauthorized("Invalid token".into()))?;

    if claims.token_type != TokenType::Refresh {
        return Err(ApiError::Unauthorized("Refresh token required".into()));
    }

    let role = Role::from_id(claims.role)
        .ok_or_else(|| ApiError::Unauthorized("Invalid role".into()))?;

    // revoke old refresh token; zero rows means unknown or already used
    let revoked = sqlx::query(
        r#"
        UPDATE refresh_tokens
        SET revoked = TRUE
        WHERE jti = ?
        AND revoked = FALSE
        AND expires_at > UTC_TIMESTAMP()
        "#,
    )
    .bind(&claims.jti)
    .execute(pool.get_ref())
    .await
    .map_err(ApiError::internal("Failed to rotate refresh token"))?;

    if revoked.rows_affected() == 0 {
        info!(user_id = claims.user_id, "Refresh token unknown or already used");
        return Err(ApiError::Unauthorized("Invalid token".into()));
    }

    let tokens = issue_tokens(claims.user_id, &claims.sub, role, pool.get_ref(), &config).await?;
    Ok(HttpResponse::Ok().json(tokens))
}

/// End the current session
#[utoipa::path(
    post,
    path = "/api/logout",
    responses(
        (status = 204, description = "Session ended"),
        (status = 401, description = "Unauthorized"),
        (status = 500, description = "Session could not be ended")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Auth"
)]
pub async fn logout(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
) -> Result<HttpResponse, ApiError> {
    // refresh tokens first so a failed logout leaves the session intact
    sqlx::query(
        r#"
        UPDATE refresh_tokens
        SET revoked = TRUE
        WHERE subject_id = ?
        AND role_id = ?
        "#,
    )
    .bind(auth.user_id)
    .bind(auth.role.id())
    .execute(pool.get_ref())
    .await
    .map_err(ApiError::internal("Failed to end session"))?;

    revocation::revoke(&auth.jti, auth.exp).await;

    info!(user_id = auth.user_id, role = %auth.role, "Logged out");
    Ok(HttpResponse::NoContent().finish())
}

/// Who the current session belongs to
#[utoipa::path(
    get,
    path = "/api/session",
    responses(
        (status = 200, description = "Current session", body = Object, example = json!({
            "user_id": 1,
            "email": "admin@example.com",
            "role": "admin"
        })),
        (status = 401, description = "Unauthorized")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Auth"
)]
pub async fn session(auth: AuthUser) -> HttpResponse {
    HttpResponse::Ok().json(json!({
        "user_id": auth.user_id,
        "email": auth.email,
        "role": auth.role.to_string(),
    }))
}
