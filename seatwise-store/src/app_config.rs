use serde::Deserialize;
use std::env;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub redis: RedisConfig,
    pub kafka: KafkaConfig,
    pub auth: AuthConfig,
    pub services: ServicesConfig,
    pub worker: WorkerConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub port: u16,
}

#[derive(Debug, Deserialize, Clone)]
pub struct RedisConfig {
    pub url: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct KafkaConfig {
    pub brokers: String,
    pub topic: String,
    pub group_id: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AuthConfig {
    /// HS256 signing secret. When absent, token verification is disabled and
    /// requests run with a permissive development identity.
    pub jwt_secret: Option<String>,
}

/// Base URLs of the downstream services the orchestrator and the gateway
/// proxy talk to. `notification_url` is optional; without it notifications
/// are logged instead of dispatched.
#[derive(Debug, Deserialize, Clone)]
pub struct ServicesConfig {
    pub booking_url: String,
    pub payment_url: String,
    #[serde(default)]
    pub notification_url: Option<String>,
    #[serde(default)]
    pub admin_url: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct WorkerConfig {
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    #[serde(default = "default_worker_enabled")]
    pub enabled: bool,
}

fn default_max_attempts() -> u32 {
    3
}

fn default_worker_enabled() -> bool {
    true
}

impl Config {
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let s = config::Config::builder()
            .add_source(config::File::with_name("config/default"))
            .add_source(config::File::with_name(&format!("config/{}", run_mode)).required(false))
            .add_source(config::File::with_name("config/local").required(false))
            .add_source(config::Environment::with_prefix("SEATWISE").separator("__"))
            .build()?;

        s.try_deserialize()
    }
}
