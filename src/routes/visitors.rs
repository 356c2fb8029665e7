use rocket::serde::json::Json;
use rocket::State;
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;

use crate::auth::{ClientIp, UserAgent};
use crate::models::visitor::NewVisitor;
use crate::routes::{bad_request, internal, ApiResult};
use crate::store::Store;

#[derive(Debug, Deserialize)]
pub struct TrackForm {
    pub page: String,
    pub referrer: Option<String>,
}

/// Fire-and-forget page-view logging. Device and browser are derived from
/// the User-Agent header, the session id from the client IP.
#[post("/track-visitor", format = "json", data = "<form>")]
pub fn track_visitor(
    store: &State<Arc<dyn Store>>,
    client_ip: ClientIp,
    user_agent: UserAgent,
    form: Json<TrackForm>,
) -> ApiResult<Json<Value>> {
    let s: &dyn Store = &**store.inner();
    if form.page.trim().is_empty() {
        return Err(bad_request("Page is required"));
    }

    let visitor = NewVisitor::from_request(
        client_ip.0,
        &user_agent.0,
        form.page.trim(),
        form.referrer.as_deref(),
    );
    s.visitor_record(&visitor)
        .map_err(|e| internal("Visitor tracking failed", &e))?;

    Ok(Json(json!({ "success": true })))
}

pub fn routes() -> Vec<rocket::Route> {
    routes![track_visitor]
}
