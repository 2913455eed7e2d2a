//! Tests for HTTP error mapping.

use super::*;
use crate::domain::Error;
use actix_web::ResponseError;
use actix_web::body::to_bytes;
use actix_web::http::StatusCode;
use actix_web::test::TestRequest;
use rstest::{fixture, rstest};
use rstest_bdd_macros::{given, then, when};
use serde_json::json;

const TRACE_ID: &str = "00000000-0000-0000-0000-000000000000";

#[fixture]
fn expected_trace_id() -> String {
    TRACE_ID.to_owned()
}

#[rstest]
#[case(Error::invalid_request("bad"), StatusCode::BAD_REQUEST)]
#[case(Error::unauthorized("no auth"), StatusCode::UNAUTHORIZED)]
#[case(Error::forbidden("denied"), StatusCode::FORBIDDEN)]
#[case(Error::not_found("missing"), StatusCode::NOT_FOUND)]
#[case(Error::service_unavailable("user store unavailable"), StatusCode::SERVICE_UNAVAILABLE)]
#[case(Error::internal("boom"), StatusCode::INTERNAL_SERVER_ERROR)]
fn status_code_matches_error_code(#[case] err: Error, #[case] status: StatusCode) {
    assert_eq!(ResponseError::status_code(&err), status);
}

async fn body_of(response: HttpResponse) -> Error {
    let bytes = to_bytes(response.into_body())
        .await
        .expect("reading response body succeeds");
    serde_json::from_slice(&bytes).expect("Error JSON deserialisation succeeds")
}

#[rstest]
#[actix_web::test]
async fn internal_errors_keep_trace_id_but_lose_details(expected_trace_id: String) {
    let error = Error::internal("db password is hunter2")
        .with_trace_id(expected_trace_id.clone())
        .with_details(json!({"secret": "x"}));

    let response = ResponseError::error_response(&error);
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let header = response
        .headers()
        .get(TRACE_ID_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::to_owned);
    assert_eq!(header.as_deref(), Some(expected_trace_id.as_str()));

    let payload = body_of(response).await;
    assert_eq!(payload.code(), ErrorCode::InternalError);
    assert_eq!(payload.message(), REDACTED_MESSAGE);
    assert_eq!(payload.trace_id(), Some(TRACE_ID));
    assert!(payload.details().is_none());
}

#[rstest]
#[actix_web::test]
async fn client_errors_are_returned_verbatim_without_trace_header() {
    let error = Error::invalid_request("name must not be empty")
        .with_details(json!({"field": "name", "code": "empty_name"}));

    let response = ResponseError::error_response(&error);
    assert!(response.headers().get(TRACE_ID_HEADER).is_none());

    let payload = body_of(response).await;
    assert_eq!(payload.code(), ErrorCode::InvalidRequest);
    assert_eq!(payload.message(), "name must not be empty");
    assert_eq!(
        payload.details(),
        Some(&json!({"field": "name", "code": "empty_name"}))
    );
}

#[given("a forbidden error code")]
fn a_forbidden_error_code() -> ErrorCode {
    ErrorCode::Forbidden
}

#[when("the adapter maps the code to an HTTP status")]
fn the_adapter_maps_the_code_to_http_status(code: ErrorCode) -> StatusCode {
    status_for(code)
}

#[then("the status is 403 Forbidden")]
fn the_status_is_403_forbidden(status: StatusCode) {
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[given("a store outage")]
fn a_store_outage() -> Error {
    Error::service_unavailable("user store unavailable")
}

#[when("the adapter redacts the client payload")]
fn the_adapter_redacts_the_client_payload(error: Error) -> Error {
    redact_if_internal(&error)
}

#[then("clients see the generic store message")]
fn clients_see_the_generic_store_message(error: Error) {
    assert_eq!(error.code(), ErrorCode::ServiceUnavailable);
    assert_eq!(error.message(), "user store unavailable");
}

#[rstest]
fn forbidden_maps_to_403() {
    let code = a_forbidden_error_code();
    let status = the_adapter_maps_the_code_to_http_status(code);
    the_status_is_403_forbidden(status);
}

#[rstest]
fn store_outages_are_not_redacted() {
    let error = a_store_outage();
    let visible = the_adapter_redacts_the_client_payload(error);
    clients_see_the_generic_store_message(visible);
}

#[test]
fn from_actix_error_is_redacted_internal_error() {
    let actix_err = actix_web::error::ErrorBadRequest("boom");
    let err: Error = actix_err.into();

    assert_eq!(err.code(), ErrorCode::InternalError);
    assert_eq!(err.message(), REDACTED_MESSAGE);
    assert_eq!(err.details(), None);
}

#[rstest]
#[actix_web::test]
async fn malformed_json_becomes_invalid_request() {
    let req = TestRequest::default().to_http_request();
    let err = json_error_handler(JsonPayloadError::ContentType, &req);
    let response = err.error_response();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let payload = body_of(response).await;
    assert_eq!(payload.code(), ErrorCode::InvalidRequest);
    assert_eq!(
        payload.details().and_then(|d| d.get("code")),
        Some(&json!("content_type"))
    );
}
