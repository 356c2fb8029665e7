use rocket::http::Status;
use rocket::response::status::Custom;
use rocket::serde::json::Json;
use rocket::State;
use serde_json::{json, Value};
use std::sync::Arc;

use crate::auth::{AdminSession, ClientIp};
use crate::email;
use crate::models::contact::ContactForm;
use crate::rate_limit::RateLimiter;
use crate::routes::{api_error, bad_request, internal, not_found, ApiResult};
use crate::store::Store;

#[post("/contact", format = "json", data = "<form>")]
pub fn submit_contact(
    store: &State<Arc<dyn Store>>,
    limiter: &State<RateLimiter>,
    client_ip: ClientIp,
    form: Json<ContactForm>,
) -> ApiResult<Custom<Json<Value>>> {
    let s: &dyn Store = &**store.inner();
    form.validate().map_err(bad_request)?;

    let rate_key = format!("contact:{}", crate::auth::hash_ip(&client_ip.0));
    if !limiter.check_and_record(&rate_key, 5, std::time::Duration::from_secs(15 * 60)) {
        return Err(api_error(
            Status::TooManyRequests,
            "Too many submissions. Please wait before trying again.",
        ));
    }

    s.contact_create(&form)
        .map_err(|e| internal("Contact creation failed", &e))?;

    email::send_contact_confirmation(
        store.inner().clone(),
        form.email.trim().to_string(),
        form.name.trim().to_string(),
    );

    Ok(Custom(
        Status::Created,
        Json(json!({ "message": "Message sent successfully" })),
    ))
}

#[get("/contact")]
pub fn list_contacts(_admin: AdminSession, store: &State<Arc<dyn Store>>) -> Json<Value> {
    let s: &dyn Store = &**store.inner();
    Json(json!({ "contacts": s.contact_list() }))
}

#[delete("/contact/<id>")]
pub fn delete_contact(
    _admin: AdminSession,
    store: &State<Arc<dyn Store>>,
    id: i64,
) -> ApiResult<Json<Value>> {
    let s: &dyn Store = &**store.inner();
    let deleted = s
        .contact_delete(id)
        .map_err(|e| internal("Contact deletion failed", &e))?;
    if !deleted {
        return Err(not_found("Message not found"));
    }
    Ok(Json(json!({ "success": true })))
}

pub fn routes() -> Vec<rocket::Route> {
    routes![submit_contact, list_contacts, delete_contact]
}
