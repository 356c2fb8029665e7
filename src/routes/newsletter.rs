use rocket::http::Status;
use rocket::response::status::Custom;
use rocket::serde::json::Json;
use rocket::State;
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;

use crate::auth::AdminSession;
use crate::email;
use crate::models::newsletter::SubscribeForm;
use crate::routes::{bad_request, internal, not_found, ApiResult};
use crate::store::Store;

/// Subscribe. A previously-unsubscribed address is re-activated in place;
/// an already-active one is rejected.
#[post("/newsletter", format = "json", data = "<form>")]
pub fn subscribe(
    store: &State<Arc<dyn Store>>,
    form: Json<SubscribeForm>,
) -> ApiResult<Custom<Json<Value>>> {
    let s: &dyn Store = &**store.inner();
    let email_addr = form.normalized_email();
    if email_addr.is_empty() {
        return Err(bad_request("Email is required"));
    }

    if let Some(existing) = s.newsletter_find_by_email(&email_addr) {
        if existing.subscribed {
            return Err(bad_request("Email already subscribed"));
        }
        s.newsletter_set_subscribed(existing.id, true)
            .map_err(|e| internal("Newsletter update failed", &e))?;
        return Ok(Custom(
            Status::Ok,
            Json(json!({ "message": "Resubscribed successfully" })),
        ));
    }

    s.newsletter_create(&email_addr, form.name.as_deref())
        .map_err(|e| internal("Newsletter subscription failed", &e))?;

    email::send_newsletter_welcome(store.inner().clone(), email_addr, form.name.clone());

    Ok(Custom(
        Status::Created,
        Json(json!({ "message": "Subscribed successfully" })),
    ))
}

#[get("/newsletter")]
pub fn list_subscribers(_admin: AdminSession, store: &State<Arc<dyn Store>>) -> Json<Value> {
    let s: &dyn Store = &**store.inner();
    Json(json!({ "subscribers": s.newsletter_list() }))
}

#[derive(Debug, Deserialize)]
pub struct SubscriberPatch {
    pub subscribed: bool,
}

/// Admin toggle, used to unsubscribe an address from the dashboard.
#[patch("/newsletter/<id>", format = "json", data = "<body>")]
pub fn patch_subscriber(
    _admin: AdminSession,
    store: &State<Arc<dyn Store>>,
    id: i64,
    body: Json<SubscriberPatch>,
) -> ApiResult<Json<Value>> {
    let s: &dyn Store = &**store.inner();
    let updated = s
        .newsletter_set_subscribed(id, body.subscribed)
        .map_err(|e| internal("Newsletter update failed", &e))?;
    if !updated {
        return Err(not_found("Subscriber not found"));
    }
    Ok(Json(json!({ "success": true })))
}

pub fn routes() -> Vec<rocket::Route> {
    routes![subscribe, list_subscribers, patch_subscriber]
}
