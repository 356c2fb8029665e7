use rocket::http::Status;
use rocket::response::status::Custom;
use rocket::serde::json::Json;
use rocket::State;
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;

use crate::auth::AdminSession;
use crate::email;
use crate::models::service_request::{RequestStatus, ServiceRequestForm};
use crate::routes::{bad_request, internal, not_found, ApiResult};
use crate::store::Store;

#[post("/service-requests", format = "json", data = "<form>")]
pub fn submit_service_request(
    store: &State<Arc<dyn Store>>,
    form: Json<ServiceRequestForm>,
) -> ApiResult<Custom<Json<Value>>> {
    let s: &dyn Store = &**store.inner();
    form.validate().map_err(|e| bad_request(&e))?;

    s.service_request_create(&form)
        .map_err(|e| internal("Service request creation failed", &e))?;

    email::send_service_request_confirmation(
        store.inner().clone(),
        form.email.trim().to_string(),
        form.name.trim().to_string(),
        form.service.clone(),
    );

    Ok(Custom(
        Status::Created,
        Json(json!({ "message": "Service request submitted successfully" })),
    ))
}

#[get("/service-requests")]
pub fn list_service_requests(_admin: AdminSession, store: &State<Arc<dyn Store>>) -> Json<Value> {
    let s: &dyn Store = &**store.inner();
    Json(json!({ "requests": s.service_request_list() }))
}

#[derive(Debug, Deserialize)]
pub struct StatusPatch {
    pub status: String,
}

/// Free-form status write: any status can be set from any other.
#[patch("/service-requests/<id>", format = "json", data = "<body>")]
pub fn patch_service_request(
    _admin: AdminSession,
    store: &State<Arc<dyn Store>>,
    id: i64,
    body: Json<StatusPatch>,
) -> ApiResult<Json<Value>> {
    let s: &dyn Store = &**store.inner();
    let status = RequestStatus::parse(&body.status)
        .ok_or_else(|| bad_request(&format!("Unknown status: {}", body.status)))?;
    let updated = s
        .service_request_set_status(id, status)
        .map_err(|e| internal("Service request update failed", &e))?;
    if !updated {
        return Err(not_found("Service request not found"));
    }
    Ok(Json(json!({ "success": true })))
}

pub fn routes() -> Vec<rocket::Route> {
    routes![submit_service_request, list_service_requests, patch_service_request]
}
