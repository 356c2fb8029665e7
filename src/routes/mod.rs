use rocket::http::Status;
use rocket::response::status::Custom;
use rocket::serde::json::Json;
use serde_json::{json, Value};

pub mod admin;
pub mod auth;
pub mod blogs;
pub mod contact;
pub mod newsletter;
pub mod service_requests;
pub mod visitors;

/// Standard result shape for API handlers: a JSON body on success, a
/// status + `{"error": ...}` body on failure.
pub type ApiResult<T> = Result<T, Custom<Json<Value>>>;

pub fn api_error(status: Status, msg: &str) -> Custom<Json<Value>> {
    Custom(status, Json(json!({ "error": msg })))
}

pub fn bad_request(msg: &str) -> Custom<Json<Value>> {
    api_error(Status::BadRequest, msg)
}

pub fn not_found(msg: &str) -> Custom<Json<Value>> {
    api_error(Status::NotFound, msg)
}

/// Store/runtime failures: log the detail, return a generic message.
pub fn internal(context: &str, detail: &str) -> Custom<Json<Value>> {
    log::error!("{}: {}", context, detail);
    api_error(Status::InternalServerError, "Internal server error")
}

/// Everything mounted under /api.
pub fn routes() -> Vec<rocket::Route> {
    let mut r = blogs::routes();
    r.extend(contact::routes());
    r.extend(newsletter::routes());
    r.extend(service_requests::routes());
    r.extend(visitors::routes());
    r.extend(admin::routes());
    r.extend(auth::routes());
    r
}
