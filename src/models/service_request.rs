use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Offered service lines, as shown on the public request form.
pub const SERVICES: &[&str] = &[
    "Full-Stack Development",
    "SaaS Platform",
    "Mobile App",
    "Microservices",
    "Performance Optimization",
    "Security & Auth",
];

pub const BUDGETS: &[&str] = &[
    "< $5,000",
    "$5,000 - $15,000",
    "$15,000 - $50,000",
    "$50,000+",
];

pub const TIMELINES: &[&str] = &["< 1 month", "1-3 months", "3-6 months", "6+ months"];

/// Admin-set progress marker. Any status can be set from any other;
/// there is deliberately no transition machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RequestStatus {
    #[serde(rename = "pending")]
    Pending,
    #[serde(rename = "in-progress")]
    InProgress,
    #[serde(rename = "completed")]
    Completed,
    #[serde(rename = "cancelled")]
    Cancelled,
}

impl RequestStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RequestStatus::Pending => "pending",
            RequestStatus::InProgress => "in-progress",
            RequestStatus::Completed => "completed",
            RequestStatus::Cancelled => "cancelled",
        }
    }

    pub fn parse(s: &str) -> Option<RequestStatus> {
        match s {
            "pending" => Some(RequestStatus::Pending),
            "in-progress" => Some(RequestStatus::InProgress),
            "completed" => Some(RequestStatus::Completed),
            "cancelled" => Some(RequestStatus::Cancelled),
            _ => None,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ServiceRequest {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub company: Option<String>,
    pub service: String,
    pub budget: String,
    pub timeline: String,
    pub description: String,
    pub status: RequestStatus,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Debug, Deserialize)]
pub struct ServiceRequestForm {
    pub name: String,
    pub email: String,
    pub company: Option<String>,
    pub service: String,
    pub budget: String,
    pub timeline: String,
    pub description: String,
}

impl ServiceRequestForm {
    pub fn validate(&self) -> Result<(), String> {
        if self.name.trim().is_empty()
            || self.email.trim().is_empty()
            || self.service.is_empty()
            || self.budget.is_empty()
            || self.timeline.is_empty()
            || self.description.trim().is_empty()
        {
            return Err("Missing required fields".to_string());
        }
        if !SERVICES.contains(&self.service.as_str()) {
            return Err(format!("Unknown service: {}", self.service));
        }
        if !BUDGETS.contains(&self.budget.as_str()) {
            return Err(format!("Unknown budget range: {}", self.budget));
        }
        if !TIMELINES.contains(&self.timeline.as_str()) {
            return Err(format!("Unknown timeline: {}", self.timeline));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_form() -> ServiceRequestForm {
        ServiceRequestForm {
            name: "Ada".to_string(),
            email: "ada@example.com".to_string(),
            company: None,
            service: "SaaS Platform".to_string(),
            budget: "$5,000 - $15,000".to_string(),
            timeline: "1-3 months".to_string(),
            description: "A platform.".to_string(),
        }
    }

    #[test]
    fn test_validate_accepts_closed_list_values() {
        assert!(valid_form().validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_unknown_enum_values() {
        let mut f = valid_form();
        f.budget = "one million".to_string();
        assert!(f.validate().is_err());

        let mut f = valid_form();
        f.service = "Gardening".to_string();
        assert!(f.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_missing_fields() {
        let mut f = valid_form();
        f.description = "   ".to_string();
        assert!(f.validate().is_err());
    }

    #[test]
    fn test_status_round_trip() {
        for s in ["pending", "in-progress", "completed", "cancelled"] {
            assert_eq!(RequestStatus::parse(s).map(|v| v.as_str()), Some(s));
        }
        assert_eq!(RequestStatus::parse("done"), None);
    }
}
