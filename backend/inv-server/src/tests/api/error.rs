use crate::ApiError;

use inv_core::CoreError;
use inv_db::DbError;

use std::panic::Location;

use axum::http::StatusCode;
use axum::response::IntoResponse;
use error_location::ErrorLocation;
use http_body_util::BodyExt;

async fn body_json(error: ApiError) -> (StatusCode, serde_json::Value) {
    let response = error.into_response();
    let status = response.status();
    let body = response.into_body().collect().await.unwrap().to_bytes();
    (status, serde_json::from_slice(&body).unwrap())
}

#[tokio::test]
async fn given_not_found_when_rendered_then_returns_404_with_json_body() {
    let (status, json) = body_json(ApiError::not_found("Item 7 not found")).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["error"]["code"], "NOT_FOUND");
    assert_eq!(json["error"]["message"], "Item 7 not found");
    assert!(json["error"].get("field").is_none());
}

#[tokio::test]
async fn given_validation_error_when_rendered_then_returns_400_with_field() {
    let error = ApiError::Validation {
        message: "Quantity must not be negative".into(),
        field: Some("quantity".into()),
        location: ErrorLocation::from(Location::caller()),
    };

    let (status, json) = body_json(error).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"]["code"], "VALIDATION_ERROR");
    assert_eq!(json["error"]["field"], "quantity");
}

#[tokio::test]
async fn given_internal_error_when_rendered_then_returns_500() {
    let error = ApiError::Internal {
        message: "Database operation failed".into(),
        location: ErrorLocation::from(Location::caller()),
    };

    let (status, json) = body_json(error).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json["error"]["code"], "INTERNAL_ERROR");
}

#[test]
fn given_core_validation_error_when_converted_then_keeps_field() {
    let core = CoreError::Validation {
        field: "name",
        message: "Name cannot be empty".into(),
        location: ErrorLocation::from(Location::caller()),
    };

    let api: ApiError = core.into();

    match api {
        ApiError::Validation { field, message, .. } => {
            assert_eq!(field.as_deref(), Some("name"));
            assert_eq!(message, "Name cannot be empty");
        }
        other => panic!("expected validation error, got {other:?}"),
    }
}

#[tokio::test]
async fn given_sqlx_error_when_converted_then_hides_details() {
    let db = DbError::from(sqlx::Error::PoolTimedOut);

    let (status, json) = body_json(db.into()).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json["error"]["message"], "Database operation failed");
}
