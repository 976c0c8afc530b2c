use std::path::PathBuf;

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
    pub env: Environment,
    pub log_level: String,
    pub detectors_path: PathBuf,
    pub http_timeout_secs: u64,
    pub http_connect_timeout_secs: u64,
    pub user_agent: String,
    /// Upper bound for one availability lookup, across all of its HTTP calls.
    pub lookup_timeout_secs: u64,
    pub chargeprice_api_key: Option<String>,
    pub fronyx_api_key: Option<String>,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("env", &self.env)
            .field("log_level", &self.log_level)
            .field("detectors_path", &self.detectors_path)
            .field("http_timeout_secs", &self.http_timeout_secs)
            .field("http_connect_timeout_secs", &self.http_connect_timeout_secs)
            .field("user_agent", &self.user_agent)
            .field("lookup_timeout_secs", &self.lookup_timeout_secs)
            .field(
                "chargeprice_api_key",
                &self.chargeprice_api_key.as_ref().map(|_| "[redacted]"),
            )
            .field(
                "fronyx_api_key",
                &self.fronyx_api_key.as_ref().map(|_| "[redacted]"),
            )
            .finish()
    }
}
