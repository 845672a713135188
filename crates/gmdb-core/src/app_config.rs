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

#[derive(Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub env: Environment,
    pub bind_addr: SocketAddr,
    pub log_level: String,
    pub db_max_connections: u32,
    pub db_min_connections: u32,
    pub db_acquire_timeout_secs: u64,
    pub scraper_request_timeout_secs: u64,
    pub scraper_user_agent: String,
    pub scraper_inter_request_delay_ms: u64,
    pub scraper_max_retries: u32,
    pub scraper_retry_delay_secs: u64,
    /// Tag index of the weekly sales bulletins; page N lives at `{base}/page/N`.
    pub bulletin_base_url: String,
    /// Sleep before the single refetch when a polling crawl finds nothing new.
    pub bulletin_caught_up_backoff_secs: u64,
    /// Cron expression for the scheduled polling crawl. `None` disables it.
    pub bulletin_cron: Option<String>,
    pub review_base_url: String,
    pub review_max_pages: u32,
    pub review_year_min: Option<i32>,
    pub review_year_max: Option<i32>,
    pub report_window_days: u32,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("env", &self.env)
            .field("bind_addr", &self.bind_addr)
            .field("log_level", &self.log_level)
            .field("database_url", &"[redacted]")
            .field("db_max_connections", &self.db_max_connections)
            .field("db_min_connections", &self.db_min_connections)
            .field("db_acquire_timeout_secs", &self.db_acquire_timeout_secs)
            .field(
                "scraper_request_timeout_secs",
                &self.scraper_request_timeout_secs,
            )
            .field("scraper_user_agent", &self.scraper_user_agent)
            .field(
                "scraper_inter_request_delay_ms",
                &self.scraper_inter_request_delay_ms,
            )
            .field("scraper_max_retries", &self.scraper_max_retries)
            .field("scraper_retry_delay_secs", &self.scraper_retry_delay_secs)
            .field("bulletin_base_url", &self.bulletin_base_url)
            .field(
                "bulletin_caught_up_backoff_secs",
                &self.bulletin_caught_up_backoff_secs,
            )
            .field("bulletin_cron", &self.bulletin_cron)
            .field("review_base_url", &self.review_base_url)
            .field("review_max_pages", &self.review_max_pages)
            .field("review_year_min", &self.review_year_min)
            .field("review_year_max", &self.review_year_max)
            .field("report_window_days", &self.report_window_days)
            .finish()
    }
}
