//! OpenAPI document for the registration API.
//!
//! [`ApiDoc`] lists every HTTP path and the schema wrappers from
//! [`crate::inbound::http::schemas`]. The server serves it at `/api-docs`
//! with Swagger UI under `/docs/`, and `openapi-dump` prints it.

use crate::inbound::http::auth::{LoginRequest, LoginResponse};
use crate::inbound::http::schemas::{ErrorCodeSchema, ErrorSchema, UserSchema};
use crate::inbound::http::users::{
    CreateUserRequest, DeleteResult, DeleteUserRequest, InsertResult, RenameUserRequest,
    UpdateResult,
};
use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::{Modify, OpenApi};

/// Registers the session cookie security scheme.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            "SessionCookie",
            SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::with_description(
                "session",
                "Session cookie issued by POST /login.",
            ))),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "Registration Management API",
        version = "1.0.0",
        description = "Register users, look them up by email, and let signed-in users rename or delete their own record."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    security(("SessionCookie" = [])),
    paths(
        crate::inbound::http::health::index,
        crate::inbound::http::users::list_users,
        crate::inbound::http::users::find_user_by_email,
        crate::inbound::http::users::create_user,
        crate::inbound::http::users::rename_user,
        crate::inbound::http::users::delete_user,
        crate::inbound::http::auth::login,
        crate::inbound::http::auth::logout,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        UserSchema,
        ErrorSchema,
        ErrorCodeSchema,
        CreateUserRequest,
        InsertResult,
        RenameUserRequest,
        UpdateResult,
        DeleteUserRequest,
        DeleteResult,
        LoginRequest,
        LoginResponse,
    )),
    tags(
        (name = "users", description = "Register, look up, rename, and delete users"),
        (name = "auth", description = "Session login and logout"),
        (name = "health", description = "Banner and orchestration probes")
    )
)]
pub struct ApiDoc;
