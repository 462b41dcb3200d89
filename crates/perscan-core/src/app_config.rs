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

/// Settings consumed by the platform fetchers.
///
/// Kept separate from [`AppConfig`] so a scan can run without a database.
#[derive(Clone)]
pub struct SourcesConfig {
    pub default_review_count: usize,
    pub max_review_count: usize,
    pub request_timeout_secs: u64,
    pub google_play_language: String,
    pub google_play_country: String,
    pub ios_app_store_country: String,
    pub reddit_user_agent: String,
    pub youtube_api_key: Option<String>,
    pub product_hunt_api_token: Option<String>,
}

impl Default for SourcesConfig {
    fn default() -> Self {
        Self {
            default_review_count: 100,
            max_review_count: 1000,
            request_timeout_secs: 30,
            google_play_language: "en".to_string(),
            google_play_country: "us".to_string(),
            ios_app_store_country: "us".to_string(),
            reddit_user_agent: "PerceptionScanner/1.0".to_string(),
            youtube_api_key: None,
            product_hunt_api_token: None,
        }
    }
}

impl std::fmt::Debug for SourcesConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SourcesConfig")
            .field("default_review_count", &self.default_review_count)
            .field("max_review_count", &self.max_review_count)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("google_play_language", &self.google_play_language)
            .field("google_play_country", &self.google_play_country)
            .field("ios_app_store_country", &self.ios_app_store_country)
            .field("reddit_user_agent", &self.reddit_user_agent)
            .field(
                "youtube_api_key",
                &self.youtube_api_key.as_ref().map(|_| "[redacted]"),
            )
            .field(
                "product_hunt_api_token",
                &self.product_hunt_api_token.as_ref().map(|_| "[redacted]"),
            )
            .finish()
    }
}

#[derive(Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub env: Environment,
    pub bind_addr: SocketAddr,
    pub log_level: String,
    pub cors_origins: Vec<String>,
    pub db_max_connections: u32,
    pub db_min_connections: u32,
    pub db_acquire_timeout_secs: u64,
    pub cache_max_age_hours: i64,
    pub sources: SourcesConfig,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("env", &self.env)
            .field("bind_addr", &self.bind_addr)
            .field("log_level", &self.log_level)
            .field("cors_origins", &self.cors_origins)
            .field("database_url", &"[redacted]")
            .field("db_max_connections", &self.db_max_connections)
            .field("db_min_connections", &self.db_min_connections)
            .field("db_acquire_timeout_secs", &self.db_acquire_timeout_secs)
            .field("cache_max_age_hours", &self.cache_max_age_hours)
            .field("sources", &self.sources)
            .finish()
    }
}
