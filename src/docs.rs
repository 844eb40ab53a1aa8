use crate::api::attendee::AttendeeListResponse;
use crate::model::attendee::AttendeePreview;
use crate::model::slot::SlotResponse;
use crate::model::volunteer::{CreateVolunteer, VolunteerResponse};
use crate::models::{LoginReqDto, TokenPair};
use crate::stats::summary::StatisticsSummary;
use utoipa::Modify;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{OpenApi, openapi};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Registration Console API",
        version = "1.0.0",
        description = r#"
## Event Registration Console

Backend for the registration desk of an event: attendee import, check-in at
the door and live attendance statistics.

### Key Features
- **Attendee import**
  - Replace the attendee list from an `.xlsx` upload tagged with a slot label
  - Export the current list or download an empty template
- **Check-in**
  - Mark or clear the entry time of an attendee by uid
- **Statistics**
  - Classified attendees narrowed by gender, participant type, attendance
    and free-text search, with counts over the narrowed set
  - Export the filtered table as `.xlsx`
- **Volunteers**
  - Admins manage the volunteer accounts that staff the door

### Security
Every `/api` endpoint requires a **JWT Bearer** access token from
`/auth/login`. Volunteers may view the attendee preview and check people in;
everything else is admin only.
"#,
    ),
    paths(
        crate::auth::handlers::login,
        crate::auth::handlers::refresh_token,
        crate::auth::handlers::logout,
        crate::auth::handlers::session,

        crate::api::attendee::list_attendees,
        crate::api::attendee::upload_attendees,
        crate::api::attendee::delete_all_attendees,
        crate::api::attendee::export_attendees,
        crate::api::attendee::download_template,
        crate::api::slot::current_slot,

        crate::api::check_in::check_in,
        crate::api::check_in::clear_check_in,

        crate::api::statistics::statistics,
        crate::api::statistics::export_statistics,

        crate::api::volunteer::list_volunteers,
        crate::api::volunteer::create_volunteer,
        crate::api::volunteer::delete_volunteer
    ),
    components(
        schemas(
            LoginReqDto,
            TokenPair,
            AttendeePreview,
            AttendeeListResponse,
            SlotResponse,
            StatisticsSummary,
            VolunteerResponse,
            CreateVolunteer
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Auth", description = "Login, token refresh and logout"),
        (name = "Attendees", description = "Attendee import, export and check-in"),
        (name = "Statistics", description = "Filtered attendance statistics"),
        (name = "Volunteers", description = "Volunteer account management"),
    )
)]
pub struct ApiDoc;

pub struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_lists_every_route() {
        let doc = ApiDoc::openapi();
        let paths = &doc.paths.paths;

        for path in [
            "/auth/login",
            "/api/attendees/upload",
            "/api/attendees/{uid}/check-in",
            "/api/statistics/export",
            "/api/volunteers/{id}",
            "/api/slot",
        ] {
            assert!(paths.contains_key(path), "{} missing", path);
        }

        let schemes = &doc.components.as_ref().unwrap().security_schemes;
        assert!(schemes.contains_key("bearer_auth"));
    }
}
