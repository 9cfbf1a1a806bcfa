use std::net::SocketAddr;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

/// Cloudinary account used for image uploads.
#[derive(Clone)]
pub struct CloudinaryConfig {
    pub cloud_name: String,
    pub api_key: String,
    pub api_secret: String,
}

#[derive(Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub env: Environment,
    pub bind_addr: SocketAddr,
    pub log_level: String,
    pub jwt_secret: String,
    pub admin_user: String,
    pub admin_pass: String,
    pub cors_origins: Vec<String>,
    pub cloudinary: Option<CloudinaryConfig>,
    pub courier_sync_cron: Option<String>,
    pub db_max_connections: u32,
    pub db_min_connections: u32,
    pub db_acquire_timeout_secs: u64,
    pub http_timeout_secs: u64,
}

impl AppConfig {
    #[must_use]
    pub fn is_production(&self) -> bool {
        self.env == Environment::Production
    }
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("env", &self.env)
            .field("bind_addr", &self.bind_addr)
            .field("log_level", &self.log_level)
            .field("database_url", &"[redacted]")
            .field("jwt_secret", &"[redacted]")
            .field("admin_user", &self.admin_user)
            .field("admin_pass", &"[redacted]")
            .field("cors_origins", &self.cors_origins)
            .field(
                "cloudinary",
                &self.cloudinary.as_ref().map(|c| c.cloud_name.as_str()),
            )
            .field("courier_sync_cron", &self.courier_sync_cron)
            .field("db_max_connections", &self.db_max_connections)
            .field("db_min_connections", &self.db_min_connections)
            .field("db_acquire_timeout_secs", &self.db_acquire_timeout_secs)
            .field("http_timeout_secs", &self.http_timeout_secs)
            .finish()
    }
}
