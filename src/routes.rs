use crate::{
    api::{attendee, check_in, slot, statistics, volunteer},
    auth::{handlers, middleware::auth_middleware},
    config::Config,
};
use actix_governor::{
    Governor, GovernorConfigBuilder, PeerIpKeyExtractor, governor::middleware::NoOpMiddleware,
};
use actix_web::{middleware::from_fn, web};
use anyhow::{Context, Result};
use std::sync::Arc;

type Limiter = Arc<Governor<PeerIpKeyExtractor, NoOpMiddleware>>;

/// Per-peer-IP rate limiters, built once and shared by every worker
#[derive(Clone)]
pub struct Limiters {
    login: Limiter,
    refresh: Limiter,
    protected: Limiter,
}

impl Limiters {
    pub fn from_config(config: &Config) -> Result<Self> {
        Ok(Self {
            login: build_limiter(config.rate_login_per_min)?,
            refresh: build_limiter(config.rate_refresh_per_min)?,
            protected: build_limiter(config.rate_protected_per_min)?,
        })
    }
}

fn build_limiter(requests_per_min: u32) -> Result<Limiter> {
    let burst = requests_per_min.max(1);
    let per_ms = 60_000 / burst as u64;

    let cfg = GovernorConfigBuilder::default()
        .milliseconds_per_request(per_ms.max(1))
        .burst_size(burst)
        .key_extractor(PeerIpKeyExtractor)
        .finish()
        .with_context(|| format!("Invalid rate limit: {} per minute", requests_per_min))?;

    Ok(Arc::new(Governor::new(&cfg)))
}

pub fn configure(cfg: &mut web::ServiceConfig, config: &Config, limiters: &Limiters) {
    // Public routes
    cfg.service(
        web::scope("/auth")
            .service(
                web::resource("/login")
                    .wrap(limiters.login.clone())
                    .route(web::post().to(handlers::login)),
            )
            .service(
                web::resource("/refresh")
                    .wrap(limiters.refresh.clone())
                    .route(web::post().to(handlers::refresh_token)),
            ),
    );

    // Protected routes
    cfg.service(
        web::scope(&config.api_prefix)
            .wrap(from_fn(auth_middleware)) // authentication
            .wrap(limiters.protected.clone()) // rate limiting
            .route("/logout", web::post().to(handlers::logout))
            .route("/session", web::get().to(handlers::session))
            .route("/slot", web::get().to(slot::current_slot))
            .service(
                web::scope("/attendees")
                    // /attendees
                    .service(
                        web::resource("")
                            .route(web::get().to(attendee::list_attendees))
                            .route(web::delete().to(attendee::delete_all_attendees)),
                    )
                    // /attendees/upload
                    .service(
                        web::resource("/upload")
                            .app_data(web::PayloadConfig::new(config.max_upload_bytes))
                            .route(web::post().to(attendee::upload_attendees)),
                    )
                    .service(
                        web::resource("/export").route(web::get().to(attendee::export_attendees)),
                    )
                    .service(
                        web::resource("/template")
                            .route(web::get().to(attendee::download_template)),
                    )
                    // /attendees/{uid}/check-in
                    .service(
                        web::resource("/{uid}/check-in")
                            .route(web::put().to(check_in::check_in))
                            .route(web::delete().to(check_in::clear_check_in)),
                    ),
            )
            .service(
                web::scope("/statistics")
                    .service(web::resource("").route(web::get().to(statistics::statistics)))
                    .service(
                        web::resource("/export")
                            .route(web::get().to(statistics::export_statistics)),
                    ),
            )
            .service(
                web::scope("/volunteers")
                    // /volunteers
                    .service(
                        web::resource("")
                            .route(web::get().to(volunteer::list_volunteers))
                            .route(web::post().to(volunteer::create_volunteer)),
                    )
                    // /volunteers/{id}
                    .service(
                        web::resource("/{id}").route(web::delete().to(volunteer::delete_volunteer)),
                    ),
            ),
    );
}

// LOGIN (admin or volunteer)
//  ├─ access_token (15 min)
//  └─ refresh_token (7 days)

// API REQUEST
//  └─ Authorization: Bearer access_token

// ACCESS EXPIRED
//  └─ POST /auth/refresh with refresh_token
//       └─ returns a new pair, old refresh token revoked
