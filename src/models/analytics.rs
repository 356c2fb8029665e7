use serde::Serialize;

/// Headline figures for the admin dashboard. Every number is recomputed
/// from the underlying collections on each request.
#[derive(Debug, Serialize)]
pub struct Overview {
    pub total_visitors: i64,
    pub today_visitors: i64,
    pub monthly_visitors: i64,
    pub unique_visitors: i64,
    pub unique_today: i64,
    pub total_blogs: i64,
    pub published_blogs: i64,
    pub total_contacts: i64,
    pub total_service_requests: i64,
    pub total_newsletter_subs: i64,
}

#[derive(Debug, Serialize, PartialEq)]
pub struct LabelCount {
    pub label: String,
    pub count: i64,
}

#[derive(Debug, Serialize, PartialEq)]
pub struct DailyCount {
    pub date: String,
    pub count: i64,
}

#[derive(Debug, Serialize)]
pub struct AnalyticsReport {
    pub overview: Overview,
    pub top_pages: Vec<LabelCount>,
    pub top_referrers: Vec<LabelCount>,
    pub device_stats: Vec<LabelCount>,
    pub browser_stats: Vec<LabelCount>,
    pub daily_visitors: Vec<DailyCount>,
}
