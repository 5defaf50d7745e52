use clap::Parser;
use config::{Config, Environment, File, FileFormat};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Config file path
    #[arg(short, long, env = "CONFIG_FILE")]
    pub config: Option<String>,

    /// Port to listen on
    #[arg(long, env = "PORT")]
    pub port: Option<u16>,

    /// Base URL of the finance REST API
    #[arg(long, env = "FINANCE_API_URL")]
    pub finance_api_url: Option<String>,

    /// Emit logs as JSON
    #[arg(long, env = "LOG_JSON")]
    pub log_json: Option<bool>,

    /// Disable timeout middleware
    #[arg(long, env = "TIMEOUT_DISABLED")]
    pub timeout_disabled: Option<bool>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub finance_api: FinanceApiConfig,
    pub display: DisplayConfig,
    pub cache: CacheConfig,
    pub resilience: ResilienceConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub port: u16,
    pub host: String,
    /// Directory served under `/static`.
    pub static_dir: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct FinanceApiConfig {
    pub base_url: String,
    pub timeout_secs: u64,
    #[serde(default)]
    pub bearer_token: Option<String>,
}

impl FinanceApiConfig {
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct DisplayConfig {
    /// Currency used when a payload names none.
    pub currency: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct CacheConfig {
    pub enabled: bool,
    pub ttl_secs: u64,
}

impl CacheConfig {
    #[must_use]
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_secs)
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct ResilienceConfig {
    pub timeout_disabled: bool,
    pub request_timeout_secs: u64,
}

impl ResilienceConfig {
    /// Request timeout, or a year when timeouts are disabled so the layer
    /// stack keeps one type.
    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        if self.timeout_disabled {
            Duration::from_secs(365 * 24 * 60 * 60)
        } else {
            Duration::from_secs(self.request_timeout_secs)
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    pub json: bool,
}

impl AppConfig {
    pub fn load() -> Result<Self, config::ConfigError> {
        Self::load_from_args(std::env::args())
    }

    /// Precedence: defaults < config file < `FINAPP_*` environment < CLI.
    pub fn load_from_args<I, T>(args: I) -> Result<Self, config::ConfigError>
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        let cli =
            Cli::try_parse_from(args).map_err(|e| config::ConfigError::Message(e.to_string()))?;

        let mut builder = Config::builder()
            .set_default("server.port", 3000)?
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.static_dir", "static")?
            .set_default("finance_api.base_url", "http://127.0.0.1:8080")?
            .set_default("finance_api.timeout_secs", 10)?
            .set_default("display.currency", "BHD")?
            .set_default("cache.enabled", true)?
            .set_default("cache.ttl_secs", 30)?
            .set_default("resilience.timeout_disabled", false)?
            .set_default("resilience.request_timeout_secs", 30)?
            .set_default("logging.json", false)?;

        // An explicit file must exist; ./config.yaml is picked up when present.
        match cli.config.as_deref() {
            Some(path) => builder = builder.add_source(File::with_name(path).required(true)),
            None if Path::new("config.yaml").exists() => {
                builder = builder.add_source(File::new("config.yaml", FileFormat::Yaml));
            }
            None => {}
        }

        // e.g. FINAPP_SERVER__PORT=8000
        builder = builder.add_source(
            Environment::with_prefix("FINAPP")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        if let Some(port) = cli.port {
            builder = builder.set_override("server.port", port)?;
        }
        if let Some(url) = cli.finance_api_url {
            builder = builder.set_override("finance_api.base_url", url)?;
        }
        if let Some(json) = cli.log_json {
            builder = builder.set_override("logging.json", json)?;
        }
        if let Some(td) = cli.timeout_disabled {
            builder = builder.set_override("resilience.timeout_disabled", td)?;
        }

        builder.build()?.try_deserialize()
    }
}
