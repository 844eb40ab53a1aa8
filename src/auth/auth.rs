use crate::{error::ApiError, model::role::Role};
use actix_web::{FromRequest, HttpMessage, HttpRequest, dev::Payload};
use futures::future::{Ready, ready};

/// Session context of an authenticated request.
///
/// Inserted by `auth_middleware`; handlers outside the protected scope never
/// see one.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: u64,
    pub email: String,
    pub role: Role,

    /// Id and expiry of the access token, needed to revoke it on logout
    pub jti: String,
    pub exp: usize,
}

impl FromRequest for AuthUser {
    type Error = ApiError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        ready(
            req.extensions()
                .get::<AuthUser>()
                .cloned()
                .ok_or_else(|| ApiError::Unauthorized("Missing session".into())),
        )
    }
}

impl AuthUser {
    pub fn require_admin(&self) -> Result<(), ApiError> {
        if self.role == Role::Admin {
            Ok(())
        } else {
            Err(ApiError::Forbidden("Admin only".into()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::test::TestRequest;

    fn user(role: Role) -> AuthUser {
        AuthUser {
            user_id: 1,
            email: "desk@example.com".into(),
            role,
            jti: "jti".into(),
            exp: 0,
        }
    }

    #[test]
    fn test_require_admin() {
        assert!(user(Role::Admin).require_admin().is_ok());
        assert!(matches!(
            user(Role::Volunteer).require_admin(),
            Err(ApiError::Forbidden(_))
        ));
    }

    #[actix_web::test]
    async fn test_extractor_without_session_is_unauthorized() {
        let (req, mut payload) = TestRequest::default().to_http_parts();
        let result = AuthUser::from_request(&req, &mut payload).await;
        assert!(matches!(result, Err(ApiError::Unauthorized(_))));
    }
}
