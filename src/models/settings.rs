use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SocialLinks {
    pub github: String,
    pub linkedin: String,
    pub twitter: String,
    pub instagram: String,
    pub email: String,
    pub phone: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeoSettings {
    pub google_analytics_id: String,
    pub google_search_console_id: String,
    pub meta_robots: String,
}

impl Default for SeoSettings {
    fn default() -> Self {
        SeoSettings {
            google_analytics_id: String::new(),
            google_search_console_id: String::new(),
            meta_robots: "index, follow".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmailSettings {
    pub smtp_host: String,
    pub smtp_port: u16,
    pub smtp_user: String,
    pub smtp_password: String,
    pub from_email: String,
    pub from_name: String,
}

impl Default for EmailSettings {
    fn default() -> Self {
        EmailSettings {
            smtp_host: "smtp.gmail.com".to_string(),
            smtp_port: 587,
            smtp_user: String::new(),
            smtp_password: String::new(),
            from_email: String::new(),
            from_name: String::new(),
        }
    }
}

/// The site-wide configuration record. A single mutable document,
/// created with these defaults the first time anything reads it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteSettings {
    pub site_name: String,
    pub site_description: String,
    pub site_keywords: String,
    pub site_url: String,
    pub logo_url: String,
    pub favicon_url: String,
    pub social: SocialLinks,
    pub seo: SeoSettings,
    pub email: EmailSettings,
    pub maintenance_mode: bool,
    pub blog_enabled: bool,
    pub updated_at: NaiveDateTime,
}

impl Default for SiteSettings {
    fn default() -> Self {
        SiteSettings {
            site_name: "Portfolio".to_string(),
            site_description: "Professional portfolio and blog".to_string(),
            site_keywords: "full stack developer, web development, portfolio".to_string(),
            site_url: "http://localhost:8000".to_string(),
            logo_url: String::new(),
            favicon_url: String::new(),
            social: SocialLinks::default(),
            seo: SeoSettings::default(),
            email: EmailSettings::default(),
            maintenance_mode: false,
            blog_enabled: true,
            updated_at: chrono::Utc::now().naive_utc(),
        }
    }
}

/// Partial update with named optional fields — fields absent from the
/// request body are left untouched. Sub-records replace wholesale.
#[derive(Debug, Default, Deserialize)]
pub struct SettingsUpdate {
    pub site_name: Option<String>,
    pub site_description: Option<String>,
    pub site_keywords: Option<String>,
    pub site_url: Option<String>,
    pub logo_url: Option<String>,
    pub favicon_url: Option<String>,
    pub social: Option<SocialLinks>,
    pub seo: Option<SeoSettings>,
    pub email: Option<EmailSettings>,
    pub maintenance_mode: Option<bool>,
    pub blog_enabled: Option<bool>,
}

impl SiteSettings {
    pub fn apply(&mut self, update: &SettingsUpdate) {
        if let Some(v) = &update.site_name {
            self.site_name = v.clone();
        }
        if let Some(v) = &update.site_description {
            self.site_description = v.clone();
        }
        if let Some(v) = &update.site_keywords {
            self.site_keywords = v.clone();
        }
        if let Some(v) = &update.site_url {
            self.site_url = v.clone();
        }
        if let Some(v) = &update.logo_url {
            self.logo_url = v.clone();
        }
        if let Some(v) = &update.favicon_url {
            self.favicon_url = v.clone();
        }
        if let Some(v) = &update.social {
            self.social = v.clone();
        }
        if let Some(v) = &update.seo {
            self.seo = v.clone();
        }
        if let Some(v) = &update.email {
            self.email = v.clone();
        }
        if let Some(v) = update.maintenance_mode {
            self.maintenance_mode = v;
        }
        if let Some(v) = update.blog_enabled {
            self.blog_enabled = v;
        }
        self.updated_at = chrono::Utc::now().naive_utc();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_apply_patches_named_fields_only() {
        let mut settings = SiteSettings::default();
        let before_desc = settings.site_description.clone();

        let update = SettingsUpdate {
            site_name: Some("New Name".to_string()),
            maintenance_mode: Some(true),
            ..Default::default()
        };
        settings.apply(&update);

        assert_eq!(settings.site_name, "New Name");
        assert!(settings.maintenance_mode);
        assert_eq!(settings.site_description, before_desc);
    }

    #[test]
    fn test_apply_replaces_sub_records_wholesale() {
        let mut settings = SiteSettings::default();
        let update = SettingsUpdate {
            social: Some(SocialLinks {
                github: "https://github.com/someone".to_string(),
                ..Default::default()
            }),
            ..Default::default()
        };
        settings.apply(&update);
        assert_eq!(settings.social.github, "https://github.com/someone");
        assert_eq!(settings.social.linkedin, "");
    }
}
