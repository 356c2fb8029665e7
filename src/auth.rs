use chrono::{Duration, Utc};
use rocket::http::{Cookie, CookieJar, Status};
use rocket::request::{FromRequest, Outcome, Request};
use sha2::{Digest, Sha256};
use std::sync::Arc;

use crate::config::Config;
use crate::store::Store;

const SESSION_COOKIE: &str = "folium_session";

// ── Client IP request guard ──

/// Extracts the real client IP from the request.
/// Checks headers in priority order:
///   1. X-Real-IP (nginx proxy_set_header)
///   2. X-Forwarded-For (first IP in the chain = original client)
///   3. Rocket's client_ip() (socket peer address)
pub struct ClientIp(pub String);

#[rocket::async_trait]
impl<'r> FromRequest<'r> for ClientIp {
    type Error = ();

    async fn from_request(request: &'r Request<'_>) -> Outcome<Self, Self::Error> {
        let headers = request.headers();

        if let Some(ip) = headers.get_one("X-Real-IP") {
            let ip = ip.trim();
            if !ip.is_empty() {
                return Outcome::Success(ClientIp(ip.to_string()));
            }
        }

        // X-Forwarded-For: client, proxy1, proxy2 — take the first (leftmost)
        if let Some(forwarded) = headers.get_one("X-Forwarded-For") {
            if let Some(ip) = forwarded.split(',').next() {
                let ip = ip.trim();
                if !ip.is_empty() {
                    return Outcome::Success(ClientIp(ip.to_string()));
                }
            }
        }

        let ip = request
            .client_ip()
            .map(|ip| ip.to_string())
            .unwrap_or_else(|| "unknown".to_string());
        Outcome::Success(ClientIp(ip))
    }
}

// ── User-Agent request guard ──

pub struct UserAgent(pub String);

#[rocket::async_trait]
impl<'r> FromRequest<'r> for UserAgent {
    type Error = ();

    async fn from_request(request: &'r Request<'_>) -> Outcome<Self, Self::Error> {
        let ua = request.headers().get_one("User-Agent").unwrap_or("");
        Outcome::Success(UserAgent(ua.to_string()))
    }
}

// ── Admin session guard ──

/// Guard: a valid, unexpired admin session. Gates every admin endpoint;
/// failure surfaces as 401 through the JSON catcher.
pub struct AdminSession {
    pub token: String,
}

#[rocket::async_trait]
impl<'r> FromRequest<'r> for AdminSession {
    type Error = ();

    async fn from_request(request: &'r Request<'_>) -> Outcome<Self, Self::Error> {
        let store = match request.rocket().state::<Arc<dyn Store>>() {
            Some(s) => s,
            None => return Outcome::Error((Status::InternalServerError, ())),
        };
        let cookies = request.cookies();
        let token = match cookies.get_private(SESSION_COOKIE) {
            Some(c) => c.value().to_string(),
            None => return Outcome::Error((Status::Unauthorized, ())),
        };

        if store.session_validate(&token) {
            Outcome::Success(AdminSession { token })
        } else {
            cookies.remove_private(Cookie::from(SESSION_COOKIE));
            Outcome::Error((Status::Unauthorized, ()))
        }
    }
}

// ── Session management ──

pub fn create_session(
    store: &dyn Store,
    config: &Config,
    ip: Option<&str>,
    user_agent: Option<&str>,
) -> Result<String, String> {
    let token = uuid::Uuid::new_v4().to_string();
    let now = Utc::now().naive_utc();
    let expires = now + Duration::hours(config.session_expiry_hours.max(1));
    let expires_str = expires.format("%Y-%m-%d %H:%M:%S").to_string();

    store.session_create(&token, &expires_str, ip, user_agent)?;
    // Drop any stale rows while we are here
    store.session_cleanup_expired();

    Ok(token)
}

pub fn destroy_session(store: &dyn Store, token: &str) -> Result<(), String> {
    store.session_delete(token)
}

pub fn set_session_cookie(cookies: &CookieJar<'_>, token: &str) {
    let mut cookie = Cookie::new(SESSION_COOKIE, token.to_string());
    cookie.set_http_only(true);
    cookie.set_same_site(rocket::http::SameSite::Strict);
    cookie.set_path("/");
    cookies.add_private(cookie);
}

pub fn clear_session_cookie(cookies: &CookieJar<'_>) {
    cookies.remove_private(Cookie::from(SESSION_COOKIE));
}

/// IPs are hashed before being used as rate-limit keys.
pub fn hash_ip(ip: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(ip.as_bytes());
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_ip_is_stable_and_hex() {
        let a = hash_ip("1.2.3.4");
        let b = hash_ip("1.2.3.4");
        let c = hash_ip("4.3.2.1");
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(a.len(), 64);
        assert!(a.chars().all(|ch| ch.is_ascii_hexdigit()));
    }
}
