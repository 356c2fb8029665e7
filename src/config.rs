use serde::Deserialize;

/// Runtime configuration, read once at boot from `folium.toml` (if present)
/// with environment-variable overrides. Secrets only ever arrive through the
/// environment — nothing sensitive is compiled in or required on disk.
#[derive(Debug, Clone)]
pub struct Config {
    /// "sqlite" (default) or "mongodb"
    pub db_backend: String,
    pub sqlite_path: String,
    pub mongo_uri: String,
    pub mongo_db: String,
    pub admin_email: String,
    /// Plaintext admin password; hashed at boot. When unset, admin login
    /// is disabled entirely.
    pub admin_password: Option<String>,
    pub session_expiry_hours: i64,
    pub login_rate_limit: u64,
}

#[derive(Debug, Default, Deserialize)]
struct FileConfig {
    #[serde(default)]
    database: FileDatabase,
    #[serde(default)]
    admin: FileAdmin,
}

#[derive(Debug, Default, Deserialize)]
struct FileDatabase {
    backend: Option<String>,
    sqlite_path: Option<String>,
    uri: Option<String>,
    name: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct FileAdmin {
    email: Option<String>,
    session_expiry_hours: Option<i64>,
    login_rate_limit: Option<u64>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            db_backend: "sqlite".to_string(),
            sqlite_path: "data/folium.db".to_string(),
            mongo_uri: "mongodb://localhost:27017".to_string(),
            mongo_db: "folium".to_string(),
            admin_email: "admin@localhost".to_string(),
            admin_password: None,
            session_expiry_hours: 24,
            login_rate_limit: 5,
        }
    }
}

impl Config {
    /// Load `folium.toml`, then apply environment overrides.
    pub fn load() -> Config {
        let file: FileConfig = std::fs::read_to_string("folium.toml")
            .ok()
            .and_then(|raw| match toml::from_str(&raw) {
                Ok(parsed) => Some(parsed),
                Err(e) => {
                    log::warn!("Ignoring malformed folium.toml: {}", e);
                    None
                }
            })
            .unwrap_or_default();

        let mut config = Config::default();
        if let Some(v) = file.database.backend {
            config.db_backend = v;
        }
        if let Some(v) = file.database.sqlite_path {
            config.sqlite_path = v;
        }
        if let Some(v) = file.database.uri {
            config.mongo_uri = v;
        }
        if let Some(v) = file.database.name {
            config.mongo_db = v;
        }
        if let Some(v) = file.admin.email {
            config.admin_email = v;
        }
        if let Some(v) = file.admin.session_expiry_hours {
            config.session_expiry_hours = v.max(1);
        }
        if let Some(v) = file.admin.login_rate_limit {
            config.login_rate_limit = v.max(1);
        }

        if let Ok(v) = std::env::var("FOLIUM_DB_BACKEND") {
            config.db_backend = v;
        }
        if let Ok(v) = std::env::var("FOLIUM_SQLITE_PATH") {
            config.sqlite_path = v;
        }
        if let Ok(v) = std::env::var("MONGODB_URI") {
            config.mongo_uri = v;
        }
        if let Ok(v) = std::env::var("MONGODB_DB") {
            config.mongo_db = v;
        }
        if let Ok(v) = std::env::var("FOLIUM_ADMIN_EMAIL") {
            config.admin_email = v;
        }
        if let Ok(v) = std::env::var("FOLIUM_ADMIN_PASSWORD") {
            if !v.is_empty() {
                config.admin_password = Some(v);
            }
        }

        config
    }
}

/// The single credential pair that gates session issuance. Built at boot
/// from the injected configuration; the plaintext is dropped immediately
/// after hashing.
pub struct AdminCredentials {
    pub email: String,
    pub password_hash: String,
}

impl AdminCredentials {
    pub fn from_config(config: &Config) -> Option<AdminCredentials> {
        let password = config.admin_password.as_ref()?;
        let hash = match bcrypt::hash(password, bcrypt::DEFAULT_COST) {
            Ok(h) => h,
            Err(e) => {
                log::error!("Failed to hash admin password: {}", e);
                return None;
            }
        };
        Some(AdminCredentials {
            email: config.admin_email.trim().to_lowercase(),
            password_hash: hash,
        })
    }

    pub fn verify(&self, email: &str, password: &str) -> bool {
        if email.trim().to_lowercase() != self.email {
            return false;
        }
        bcrypt::verify(password, &self.password_hash).unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_credentials() -> AdminCredentials {
        AdminCredentials {
            email: "admin@example.com".to_string(),
            // cost 4 keeps the test fast
            password_hash: bcrypt::hash("hunter2", 4).unwrap(),
        }
    }

    #[test]
    fn test_verify_accepts_correct_pair() {
        let creds = test_credentials();
        assert!(creds.verify("admin@example.com", "hunter2"));
        assert!(creds.verify("  Admin@Example.COM ", "hunter2"));
    }

    #[test]
    fn test_verify_rejects_wrong_password_or_email() {
        let creds = test_credentials();
        assert!(!creds.verify("admin@example.com", "wrong"));
        assert!(!creds.verify("other@example.com", "hunter2"));
    }

    #[test]
    fn test_no_password_means_no_credentials() {
        let config = Config::default();
        assert!(AdminCredentials::from_config(&config).is_none());
    }
}
