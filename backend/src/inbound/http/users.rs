//! Users API handlers.
//!
//! ```text
//! GET    /users
//! GET    /user?email=a@x.com
//! POST   /users {"name":"Ahnaf","email":"a@x.com","password":"p1"}
//! PUT    /users {"id":"…","name":"X","upsert":false}
//! DELETE /users {"id":"…"}
//! ```
//!
//! Reads and registration are public. Rename and delete need a session whose
//! user owns the target record; their bodies are decoded only after the
//! session check so anonymous callers always see 401.

use actix_web::{delete, get, post, put, web};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::json;
use utoipa::{IntoParams, ToSchema};

use crate::domain::{
    DisplayName, Email, Error, NewUser, NewUserValidationError, User, UserId, UserValidationError,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::error::invalid_body;
use crate::inbound::http::schemas::{ErrorSchema, UserSchema};
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;

/// Query string for `GET /user`.
#[derive(Debug, Deserialize, Serialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct UserLookupQuery {
    /// Exact email to look up.
    pub email: Option<String>,
}

/// Registration body for `POST /users`.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserRequest {
    #[serde(alias = "displayName")]
    #[schema(example = "Ahnaf")]
    pub name: String,
    #[schema(example = "a@x.com")]
    pub email: String,
    #[schema(example = "secret#73")]
    pub password: String,
}

/// Result of `POST /users`.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct InsertResult {
    pub acknowledged: bool,
    pub inserted_id: String,
    #[schema(value_type = UserSchema)]
    pub user: User,
}

/// Rename body for `PUT /users`.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RenameUserRequest {
    #[schema(example = "3fa85f64-5717-4562-b3fc-2c963f66afa6")]
    pub id: String,
    #[serde(alias = "displayName")]
    #[schema(example = "Ahnaf Tahmid")]
    pub name: String,
    /// Create a name-only record when `id` is unknown.
    #[serde(default)]
    pub upsert: bool,
}

/// Result of `PUT /users`.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateResult {
    pub acknowledged: bool,
    pub matched_count: u64,
    pub modified_count: u64,
    pub upserted_count: u64,
    pub upserted_id: Option<String>,
}

/// Delete body for `DELETE /users`.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DeleteUserRequest {
    #[schema(example = "3fa85f64-5717-4562-b3fc-2c963f66afa6")]
    pub id: String,
}

/// Result of `DELETE /users`.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DeleteResult {
    pub acknowledged: bool,
    pub deleted_count: u64,
}

fn field_error(message: impl Into<String>, field: &str, code: &str) -> Error {
    Error::invalid_request(message).with_details(json!({ "field": field, "code": code }))
}

fn map_new_user_error(err: NewUserValidationError) -> Error {
    field_error(err.to_string(), err.field(), err.code())
}

fn parse_user_id(raw: &str) -> Result<UserId, Error> {
    UserId::new(raw).map_err(|err| field_error(err.to_string(), "id", "invalid_id"))
}

fn parse_display_name(raw: String) -> Result<DisplayName, Error> {
    DisplayName::new(raw).map_err(|err| {
        let code = match err {
            UserValidationError::DisplayNameTooLong { .. } => "name_too_long",
            _ => "empty_name",
        };
        field_error(err.to_string(), "name", code)
    })
}

/// List every user.
#[utoipa::path(
    get,
    path = "/users",
    responses(
        (status = 200, description = "All users in insertion order", body = [UserSchema]),
        (status = 503, description = "User store unavailable", body = ErrorSchema)
    ),
    tags = ["users"],
    operation_id = "listUsers",
    security([])
)]
#[get("/users")]
pub async fn list_users(state: web::Data<HttpState>) -> ApiResult<web::Json<Vec<User>>> {
    let users = state.users.list_users().await?;
    Ok(web::Json(users))
}

/// Look up a single user by email; responds with `null` when absent.
#[utoipa::path(
    get,
    path = "/user",
    params(UserLookupQuery),
    responses(
        (status = 200, description = "Matching user or null", body = Option<UserSchema>),
        (status = 400, description = "Missing email", body = ErrorSchema),
        (status = 503, description = "User store unavailable", body = ErrorSchema)
    ),
    tags = ["users"],
    operation_id = "findUserByEmail",
    security([])
)]
#[get("/user")]
pub async fn find_user_by_email(
    state: web::Data<HttpState>,
    query: web::Query<UserLookupQuery>,
) -> ApiResult<web::Json<Option<User>>> {
    let raw = query.into_inner().email.unwrap_or_default();
    let email = match Email::new(raw) {
        Ok(email) => email,
        Err(UserValidationError::EmptyEmail) => {
            return Err(field_error(
                "email query parameter is required",
                "email",
                "missing_email",
            ));
        }
        // Nothing malformed can ever have been stored.
        Err(_) => return Ok(web::Json(None)),
    };
    let user = state.users.find_by_email(&email).await?;
    Ok(web::Json(user))
}

/// Register a new user.
#[utoipa::path(
    post,
    path = "/users",
    request_body = CreateUserRequest,
    responses(
        (status = 200, description = "User created", body = InsertResult),
        (status = 400, description = "Invalid field", body = ErrorSchema),
        (status = 503, description = "User store unavailable", body = ErrorSchema)
    ),
    tags = ["users"],
    operation_id = "createUser",
    security([])
)]
#[post("/users")]
pub async fn create_user(
    state: web::Data<HttpState>,
    payload: web::Json<CreateUserRequest>,
) -> ApiResult<web::Json<InsertResult>> {
    let CreateUserRequest {
        name,
        email,
        password,
    } = payload.into_inner();
    let new_user = NewUser::try_from_parts(&name, &email, &password).map_err(map_new_user_error)?;
    let user = state.users_command.create_user(&new_user).await?;
    Ok(web::Json(InsertResult {
        acknowledged: true,
        inserted_id: user.id().to_string(),
        user,
    }))
}

fn decode_body<T: DeserializeOwned>(body: &web::Bytes) -> Result<T, Error> {
    serde_json::from_slice(body).map_err(invalid_body)
}

/// Rename the caller's own record.
///
/// With `upsert: true` an unknown id creates a record holding only the name.
#[utoipa::path(
    put,
    path = "/users",
    request_body = RenameUserRequest,
    responses(
        (status = 200, description = "Update result", body = UpdateResult),
        (status = 400, description = "Invalid id or name", body = ErrorSchema),
        (status = 401, description = "Login required", body = ErrorSchema),
        (status = 403, description = "Not the caller's record", body = ErrorSchema),
        (status = 503, description = "User store unavailable", body = ErrorSchema)
    ),
    tags = ["users"],
    operation_id = "renameUser"
)]
#[put("/users")]
pub async fn rename_user(
    state: web::Data<HttpState>,
    session: SessionContext,
    body: web::Bytes,
) -> ApiResult<web::Json<UpdateResult>> {
    let actor = session.require_user_id()?;
    let RenameUserRequest { id, name, upsert } = decode_body(&body)?;
    let id = parse_user_id(&id)?;
    let display_name = parse_display_name(name)?;

    let outcome = if upsert {
        state
            .users_command
            .create_or_replace(&actor, &id, display_name)
            .await?
    } else {
        state
            .users_command
            .rename_existing(&actor, &id, display_name)
            .await?
    };

    let upserted_id = outcome.upserted_id().map(ToString::to_string);
    Ok(web::Json(UpdateResult {
        acknowledged: true,
        matched_count: outcome.matched_count(),
        modified_count: outcome.modified_count(),
        upserted_count: u64::from(upserted_id.is_some()),
        upserted_id,
    }))
}

/// Delete the caller's own record and end their session.
#[utoipa::path(
    delete,
    path = "/users",
    request_body = DeleteUserRequest,
    responses(
        (status = 200, description = "Delete result", body = DeleteResult),
        (status = 400, description = "Invalid id", body = ErrorSchema),
        (status = 401, description = "Login required", body = ErrorSchema),
        (status = 403, description = "Not the caller's record", body = ErrorSchema),
        (status = 503, description = "User store unavailable", body = ErrorSchema)
    ),
    tags = ["users"],
    operation_id = "deleteUser"
)]
#[delete("/users")]
pub async fn delete_user(
    state: web::Data<HttpState>,
    session: SessionContext,
    body: web::Bytes,
) -> ApiResult<web::Json<DeleteResult>> {
    let actor = session.require_user_id()?;
    let DeleteUserRequest { id } = decode_body(&body)?;
    let id = parse_user_id(&id)?;
    let deleted_count = state.users_command.delete_user(&actor, &id).await?;
    session.purge();
    Ok(web::Json(DeleteResult {
        acknowledged: true,
        deleted_count,
    }))
}
