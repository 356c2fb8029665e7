use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize)]
pub struct Subscriber {
    pub id: i64,
    pub email: String,
    pub name: Option<String>,
    pub subscribed: bool,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Debug, Deserialize)]
pub struct SubscribeForm {
    pub email: String,
    pub name: Option<String>,
}

impl SubscribeForm {
    /// Addresses are stored trimmed and lowercased, matching the unique index.
    pub fn normalized_email(&self) -> String {
        self.email.trim().to_lowercase()
    }
}
