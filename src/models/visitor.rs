use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// One page-visit event. Write-once, never updated.
#[derive(Debug, Serialize, Deserialize)]
pub struct VisitorEvent {
    pub id: i64,
    pub ip: String,
    pub user_agent: String,
    pub page: String,
    pub referrer: Option<String>,
    pub device: String,
    pub browser: String,
    pub session_id: String,
    pub created_at: NaiveDateTime,
}

#[derive(Debug)]
pub struct NewVisitor {
    pub ip: String,
    pub user_agent: String,
    pub page: String,
    pub referrer: Option<String>,
    pub device: String,
    pub browser: String,
    pub session_id: String,
}

impl NewVisitor {
    pub fn from_request(ip: String, user_agent: &str, page: &str, referrer: Option<&str>) -> Self {
        let (device, browser) = parse_user_agent(user_agent);
        let session_id = format!("{}-{}", ip, chrono::Utc::now().timestamp_millis());
        NewVisitor {
            ip,
            user_agent: user_agent.to_string(),
            page: page.to_string(),
            referrer: referrer
                .filter(|r| !r.is_empty())
                .map(extract_domain),
            device: device.to_string(),
            browser: browser.to_string(),
            session_id,
        }
    }
}

/// Classify device and browser from a raw User-Agent string.
/// Tablet strings are checked after mobile markers, so Android phones land
/// in `mobile` and iPads in `tablet`.
pub fn parse_user_agent(ua: &str) -> (&'static str, &'static str) {
    let device = if ua.contains("Mobile") || ua.contains("Android") {
        "mobile"
    } else if ua.contains("Tablet") || ua.contains("iPad") {
        "tablet"
    } else {
        "desktop"
    };

    let browser = if ua.contains("Firefox") {
        "Firefox"
    } else if ua.contains("Edg/") || ua.contains("Edge") {
        "Edge"
    } else if ua.contains("OPR") || ua.contains("Opera") {
        "Opera"
    } else if ua.contains("Chrome") {
        "Chrome"
    } else if ua.contains("Safari") {
        "Safari"
    } else {
        "Other"
    };

    (device, browser)
}

/// Reduce a referrer URL to its host, so aggregation groups by site
/// rather than by full path. Non-URL referrers pass through unchanged.
pub fn extract_domain(referrer: &str) -> String {
    url::Url::parse(referrer)
        .ok()
        .and_then(|u| u.host_str().map(|h| h.to_string()))
        .unwrap_or_else(|| referrer.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    const CHROME_DESKTOP: &str = "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";
    const ANDROID_PHONE: &str = "Mozilla/5.0 (Linux; Android 13; Pixel 7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Mobile Safari/537.36";
    const IPAD: &str = "Mozilla/5.0 (iPad; CPU OS 16_0 like Mac OS X) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/16.0 Safari/604.1";
    const FIREFOX: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:120.0) Gecko/20100101 Firefox/120.0";

    #[test]
    fn test_parse_user_agent() {
        assert_eq!(parse_user_agent(CHROME_DESKTOP), ("desktop", "Chrome"));
        assert_eq!(parse_user_agent(ANDROID_PHONE), ("mobile", "Chrome"));
        assert_eq!(parse_user_agent(IPAD), ("tablet", "Safari"));
        assert_eq!(parse_user_agent(FIREFOX), ("desktop", "Firefox"));
        assert_eq!(parse_user_agent("curl/8.0"), ("desktop", "Other"));
    }

    #[test]
    fn test_extract_domain() {
        assert_eq!(extract_domain("https://news.ycombinator.com/item?id=1"), "news.ycombinator.com");
        assert_eq!(extract_domain("not a url"), "not a url");
    }

    #[test]
    fn test_from_request_session_id() {
        let v = NewVisitor::from_request("1.2.3.4".to_string(), CHROME_DESKTOP, "/blog/hello", Some("https://google.com/search"));
        assert!(v.session_id.starts_with("1.2.3.4-"));
        assert_eq!(v.referrer.as_deref(), Some("google.com"));
        assert_eq!(v.device, "desktop");
    }
}
