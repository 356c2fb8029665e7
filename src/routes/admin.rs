use chrono::{Duration, NaiveTime, Utc};
use rocket::serde::json::Json;
use rocket::State;
use std::sync::Arc;

use crate::auth::AdminSession;
use crate::models::analytics::{AnalyticsReport, Overview};
use crate::models::settings::{SettingsUpdate, SiteSettings};
use crate::routes::{internal, ApiResult};
use crate::store::Store;

/// Singleton settings record, created with defaults on first read.
#[get("/admin/settings")]
pub fn get_settings(
    _admin: AdminSession,
    store: &State<Arc<dyn Store>>,
) -> ApiResult<Json<SiteSettings>> {
    let s: &dyn Store = &**store.inner();
    let settings = s
        .settings_get()
        .map_err(|e| internal("Settings read failed", &e))?;
    Ok(Json(settings))
}

#[put("/admin/settings", format = "json", data = "<update>")]
pub fn put_settings(
    _admin: AdminSession,
    store: &State<Arc<dyn Store>>,
    update: Json<SettingsUpdate>,
) -> ApiResult<Json<SiteSettings>> {
    let s: &dyn Store = &**store.inner();
    let settings = s
        .settings_update(&update)
        .map_err(|e| internal("Settings update failed", &e))?;
    Ok(Json(settings))
}

/// Read-only aggregate report. Every figure is recomputed per request from
/// the visitor log and the other collections; there are no rollup tables.
#[get("/admin/analytics")]
pub fn get_analytics(_admin: AdminSession, store: &State<Arc<dyn Store>>) -> Json<AnalyticsReport> {
    let s: &dyn Store = &**store.inner();

    let now = Utc::now().naive_utc();
    let midnight = now.date().and_time(NaiveTime::MIN);
    let thirty_days_ago = now - Duration::days(30);

    let overview = Overview {
        total_visitors: s.visitor_count(None),
        today_visitors: s.visitor_count(Some(midnight)),
        monthly_visitors: s.visitor_count(Some(thirty_days_ago)),
        unique_visitors: s.visitor_unique_count(None),
        unique_today: s.visitor_unique_count(Some(midnight)),
        total_blogs: s.blog_count(),
        published_blogs: s.blog_count_published(),
        total_contacts: s.contact_count(),
        total_service_requests: s.service_request_count(),
        total_newsletter_subs: s.newsletter_count(),
    };

    Json(AnalyticsReport {
        overview,
        top_pages: s.visitor_top_pages(10),
        top_referrers: s.visitor_top_referrers(10),
        device_stats: s.visitor_device_counts(),
        browser_stats: s.visitor_browser_counts(),
        daily_visitors: s.visitor_daily_counts(thirty_days_ago),
    })
}

pub fn routes() -> Vec<rocket::Route> {
    routes![get_settings, put_settings, get_analytics]
}
