use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::env;

#[derive(Debug, Clone, Deserialize)]
pub struct IgdbConfig {
    pub client_id: String,
    pub client_secret: String,
    #[serde(default = "default_auth_url")]
    pub auth_url: String,
    #[serde(default = "default_api_url")]
    pub api_url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SteamConfig {
    #[serde(default = "default_store_api_url")]
    pub store_api_url: String,
    /// Pause before every store request, even without a 429.
    #[serde(default = "default_cooldown_ms")]
    pub cooldown_ms: u64,
    /// First wait after a 429; doubles on each consecutive 429.
    #[serde(default = "default_backoff_base_ms")]
    pub backoff_base_ms: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GooglePlayConfig {
    pub raccoon_path: String,
    #[serde(default = "default_java_path")]
    pub java_path: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_level")]
    pub level: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ReportConfig {
    #[serde(default = "default_report_path")]
    pub path: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub igdb: IgdbConfig,
    #[serde(default)]
    pub steam: SteamConfig,
    pub google_play: GooglePlayConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub report: ReportConfig,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

fn default_auth_url() -> String {
    "https://id.twitch.tv/oauth2/token".into()
}

fn default_api_url() -> String {
    "https://api.igdb.com/v4/games/".into()
}

fn default_store_api_url() -> String {
    "https://store.steampowered.com/api/appdetails".into()
}

fn default_cooldown_ms() -> u64 {
    3_000
}

fn default_backoff_base_ms() -> u64 {
    120_000
}

fn default_java_path() -> String {
    "java".into()
}

fn default_level() -> String {
    "info".into()
}

fn default_report_path() -> String {
    "report.csv".into()
}

fn default_user_agent() -> String {
    concat!("cloudsave-report/", env!("CARGO_PKG_VERSION")).into()
}

impl Default for SteamConfig {
    fn default() -> Self {
        Self {
            store_api_url: default_store_api_url(),
            cooldown_ms: default_cooldown_ms(),
            backoff_base_ms: default_backoff_base_ms(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
        }
    }
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            path: default_report_path(),
        }
    }
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        let environment = env::var("RUN_ENV").unwrap_or_else(|_| "development".into());

        let config_file = match environment.as_str() {
            "production" => "prod",
            _ => "dev",
        };

        let s = Config::builder()
            .add_source(File::with_name("config/default.yaml").required(false))
            .add_source(File::with_name(&format!("config/{}.yaml", config_file)).required(false))
            .add_source(File::with_name("config/local.yaml").required(false))
            .add_source(Environment::with_prefix("APP").separator("__"))
            .build()?;

        s.try_deserialize()
    }
}
