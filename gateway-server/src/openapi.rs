use crate::api::{flows, health, resources};
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

pub(crate) const HEALTH_TAG: &str = "Health API";
pub(crate) const FLOWS_TAG: &str = "Flow API";
pub(crate) const RESOURCES_TAG: &str = "Resource API";

#[derive(OpenApi)]
#[openapi(
    paths(
        health::handlers::health_check,
        health::handlers::ready_check,
        health::handlers::healthy_check,
        flows::handlers::login_request_handler,
        flows::handlers::accept_login_handler,
        flows::handlers::reject_login_handler,
        flows::handlers::consent_request_handler,
        flows::handlers::accept_consent_handler,
        flows::handlers::reject_consent_handler,
        flows::handlers::logout_request_handler,
        flows::handlers::accept_logout_handler,
        flows::handlers::reject_logout_handler,
        flows::handlers::introspect_handler,
        resources::handlers::userinfo_handler,
        resources::handlers::balance_handler,
        resources::handlers::usage_handler,
        resources::handlers::list_tokens_handler,
        resources::handlers::create_token_handler,
        resources::handlers::delete_token_handler,
    ),
    modifiers(&BearerSecurity),
    tags(
        (name = HEALTH_TAG, description = "Health check endpoints"),
        (name = FLOWS_TAG, description = "Login, consent and logout handshakes for the login UI"),
        (name = RESOURCES_TAG, description = "Scope-gated resource endpoints for OAuth2 clients"),
    ),
    info(
        title = "OAuth2 Gateway API",
        description = "Authorization server front for a resource server",
        version = "0.1.0"
    )
)]
pub(crate) struct ApiDoc;

/// Declares the `bearer` scheme the resource paths refer to
struct BearerSecurity;

impl Modify for BearerSecurity {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer",
            SecurityScheme::Http(HttpBuilder::new().scheme(HttpAuthScheme::Bearer).build()),
        );
    }
}
