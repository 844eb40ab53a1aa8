use crate::auth::auth::AuthUser;
use crate::auth::jwt::verify_token;
use crate::auth::revocation;
use crate::config::Config;
use crate::model::role::Role;
use crate::models::TokenType;
use actix_web::middleware::Next;
use actix_web::{
    Error, HttpMessage, HttpResponse,
    body::BoxBody,
    dev::{ServiceRequest, ServiceResponse},
    web::Data,
};
use serde_json::json;

fn reject(req: ServiceRequest, body: serde_json::Value) -> Result<ServiceResponse<BoxBody>, Error> {
    let resp = HttpResponse::Unauthorized().json(body);
    Ok(req.into_response(resp.map_into_boxed_body()))
}

pub async fn auth_middleware(
    req: ServiceRequest,
    next: Next<BoxBody>,
) -> Result<ServiceResponse<BoxBody>, Error> {
    let config = req
        .app_data::<Data<Config>>()
        .ok_or_else(|| actix_web::error::ErrorInternalServerError("App config missing"))?
        .clone();

    let header_value = match req.headers().get("Authorization") {
        Some(h) => match h.to_str() {
            Ok(v) => v.to_string(),
            Err(_) => {
                return reject(req, json!({"message": "Invalid Authorization header encoding"}));
            }
        },
        None => return reject(req, json!({"message": "Missing Authorization header"})),
    };

    let token = match header_value.strip_prefix("Bearer ") {
        Some(t) => t,
        None => {
            return reject(
                req,
                json!({"message": "Authorization header must start with Bearer"}),
            );
        }
    };

    let claims = match verify_token(token, &config.jwt_secret) {
        Ok(c) => c,
        Err(e) => {
            return reject(req, json!({"message": "Invalid or expired token", "details": e}));
        }
    };

    if claims.token_type != TokenType::Access {
        return reject(req, json!({"message": "Access token required"}));
    }

    if revocation::is_revoked(&claims.jti).await {
        return reject(req, json!({"message": "Session has ended"}));
    }

    let role = match Role::from_id(claims.role) {
        Some(role) => role,
        None => return reject(req, json!({"message": "Invalid role"})),
    };

    let auth_user = AuthUser {
        user_id: claims.user_id,
        email: claims.sub,
        role,
        jti: claims.jti,
        exp: claims.exp,
    };

    req.extensions_mut().insert(auth_user);

    next.call(req).await
}
