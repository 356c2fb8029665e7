use rocket::http::{CookieJar, Status};
use rocket::serde::json::Json;
use rocket::State;
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;

use crate::auth::{self, ClientIp, UserAgent};
use crate::config::{AdminCredentials, Config};
use crate::rate_limit::RateLimiter;
use crate::routes::{api_error, internal, ApiResult};
use crate::store::Store;

#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

/// Exchange the admin credential pair for a session cookie.
#[post("/admin/login", format = "json", data = "<form>")]
pub fn login(
    store: &State<Arc<dyn Store>>,
    config: &State<Config>,
    credentials: &State<Option<AdminCredentials>>,
    limiter: &State<RateLimiter>,
    cookies: &CookieJar<'_>,
    client_ip: ClientIp,
    user_agent: UserAgent,
    form: Json<LoginForm>,
) -> ApiResult<Json<Value>> {
    let s: &dyn Store = &**store.inner();

    let rate_key = format!("login:{}", auth::hash_ip(&client_ip.0));
    let window = std::time::Duration::from_secs(15 * 60);
    if !limiter.check_and_record(&rate_key, config.login_rate_limit, window) {
        return Err(api_error(
            Status::TooManyRequests,
            "Too many login attempts. Please try again in 15 minutes.",
        ));
    }

    let creds = match credentials.inner() {
        Some(c) => c,
        None => {
            log::warn!("Login attempt but no admin credentials are configured");
            return Err(api_error(Status::Unauthorized, "Invalid credentials"));
        }
    };

    if !creds.verify(&form.email, &form.password) {
        return Err(api_error(Status::Unauthorized, "Invalid credentials"));
    }

    let token = auth::create_session(s, config, Some(&client_ip.0), Some(&user_agent.0))
        .map_err(|e| internal("Session creation failed", &e))?;
    auth::set_session_cookie(cookies, &token);

    Ok(Json(json!({ "success": true })))
}

#[post("/admin/logout")]
pub fn logout(
    store: &State<Arc<dyn Store>>,
    cookies: &CookieJar<'_>,
    session: Option<crate::auth::AdminSession>,
) -> Json<Value> {
    let s: &dyn Store = &**store.inner();
    if let Some(session) = session {
        if let Err(e) = auth::destroy_session(s, &session.token) {
            log::warn!("Session deletion failed: {}", e);
        }
    }
    auth::clear_session_cookie(cookies);
    Json(json!({ "success": true }))
}

pub fn routes() -> Vec<rocket::Route> {
    routes![login, logout]
}
