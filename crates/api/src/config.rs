use domain::models::PlanType;
use serde::Deserialize;
use shared::jwt::{JwtConfig, JwtError};
use std::net::{AddrParseError, SocketAddr};

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub logging: LoggingConfig,
    pub security: SecurityConfig,
    pub jwt: JwtAuthConfig,
    #[serde(default)]
    pub cookies: CookieConfig,
    #[serde(default)]
    pub stripe: StripeConfig,
    #[serde(default)]
    pub seo: SeoConfig,
    #[serde(default)]
    pub jobs: JobsConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    #[serde(default = "default_max_body_size")]
    pub max_body_size: usize,

    /// Public URL of the web app; checkout redirects are built from it.
    #[serde(default = "default_app_base_url")]
    pub app_base_url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,

    #[serde(default = "default_max_connections")]
    pub max_connections: u32,

    #[serde(default = "default_min_connections")]
    pub min_connections: u32,

    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,

    #[serde(default = "default_idle_timeout")]
    pub idle_timeout_secs: u64,
}

impl From<&DatabaseConfig> for persistence::db::DatabaseConfig {
    fn from(config: &DatabaseConfig) -> Self {
        Self {
            url: config.url.clone(),
            max_connections: config.max_connections,
            min_connections: config.min_connections,
            connect_timeout_secs: config.connect_timeout_secs,
            idle_timeout_secs: config.idle_timeout_secs,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    /// `json` or `pretty`
    #[serde(default = "default_log_format")]
    pub format: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SecurityConfig {
    #[serde(default)]
    pub cors_origins: Vec<String>,

    /// Per-user request budget on authenticated routes. 0 disables limiting.
    #[serde(default = "default_rate_limit")]
    pub rate_limit_per_minute: u32,

    /// Only enable behind TLS termination.
    #[serde(default)]
    pub hsts_enabled: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct JwtAuthConfig {
    /// RSA private key in PEM format. When empty, `secret` is used with HS256.
    #[serde(default)]
    pub private_key: String,

    /// RSA public key in PEM format
    #[serde(default)]
    pub public_key: String,

    /// Shared HS256 secret, at least 32 bytes
    #[serde(default)]
    pub secret: String,

    #[serde(default = "default_access_token_expiry")]
    pub access_token_expiry_secs: i64,

    #[serde(default = "default_refresh_token_expiry")]
    pub refresh_token_expiry_secs: i64,

    /// Clock skew tolerance
    #[serde(default = "default_jwt_leeway")]
    pub leeway_secs: u64,
}

impl JwtAuthConfig {
    /// Builds the signing configuration, preferring RS256 when keys are set.
    pub fn build(&self) -> Result<JwtConfig, JwtError> {
        if !self.private_key.is_empty() {
            JwtConfig::rs256(
                &self.private_key,
                &self.public_key,
                self.access_token_expiry_secs,
                self.refresh_token_expiry_secs,
                self.leeway_secs,
            )
        } else {
            JwtConfig::hs256(
                &self.secret,
                self.access_token_expiry_secs,
                self.refresh_token_expiry_secs,
                self.leeway_secs,
            )
        }
    }
}

/// httpOnly session cookie settings.
#[derive(Debug, Clone, Deserialize)]
pub struct CookieConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,

    #[serde(default = "default_true")]
    pub secure: bool,

    /// `Strict`, `Lax` or `None`
    #[serde(default = "default_same_site")]
    pub same_site: String,

    #[serde(default)]
    pub domain: String,

    #[serde(default = "default_access_cookie_path")]
    pub access_token_path: String,

    #[serde(default = "default_refresh_cookie_path")]
    pub refresh_token_path: String,

    #[serde(default = "default_access_cookie_name")]
    pub access_token_name: String,

    #[serde(default = "default_refresh_cookie_name")]
    pub refresh_token_name: String,
}

impl Default for CookieConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            secure: true,
            same_site: default_same_site(),
            domain: String::new(),
            access_token_path: default_access_cookie_path(),
            refresh_token_path: default_refresh_cookie_path(),
            access_token_name: default_access_cookie_name(),
            refresh_token_name: default_refresh_cookie_name(),
        }
    }
}

/// Stripe integration. Billing endpoints answer 503 while disabled.
#[derive(Debug, Clone, Deserialize)]
pub struct StripeConfig {
    #[serde(default)]
    pub enabled: bool,

    #[serde(default)]
    pub secret_key: String,

    #[serde(default)]
    pub webhook_secret: String,

    #[serde(default)]
    pub price_basic: String,

    #[serde(default)]
    pub price_premium: String,

    #[serde(default)]
    pub price_master: String,

    #[serde(default = "default_stripe_api_base_url")]
    pub api_base_url: String,

    #[serde(default = "default_stripe_timeout_ms")]
    pub timeout_ms: u64,

    #[serde(default = "default_webhook_tolerance")]
    pub webhook_tolerance_secs: i64,
}

impl Default for StripeConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            secret_key: String::new(),
            webhook_secret: String::new(),
            price_basic: String::new(),
            price_premium: String::new(),
            price_master: String::new(),
            api_base_url: default_stripe_api_base_url(),
            timeout_ms: default_stripe_timeout_ms(),
            webhook_tolerance_secs: default_webhook_tolerance(),
        }
    }
}

impl StripeConfig {
    /// Configured price for a plan, if any.
    pub fn price_for(&self, plan: PlanType) -> Option<&str> {
        let price = match plan {
            PlanType::Basic => &self.price_basic,
            PlanType::Premium => &self.price_premium,
            PlanType::Master => &self.price_master,
        };
        Some(price.as_str()).filter(|p| !p.is_empty())
    }
}

/// robots.txt and sitemap.xml content.
#[derive(Debug, Clone, Deserialize)]
pub struct SeoConfig {
    #[serde(default = "default_app_base_url")]
    pub site_url: String,

    #[serde(default = "default_public_paths")]
    pub public_paths: Vec<String>,

    #[serde(default = "default_disallowed_paths")]
    pub disallowed_paths: Vec<String>,
}

impl Default for SeoConfig {
    fn default() -> Self {
        Self {
            site_url: default_app_base_url(),
            public_paths: default_public_paths(),
            disallowed_paths: default_disallowed_paths(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct JobsConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Days past `current_period_end` before a subscription is expired.
    #[serde(default = "default_grace_days")]
    pub subscription_grace_days: i64,
}

impl Default for JobsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            subscription_grace_days: default_grace_days(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}
fn default_port() -> u16 {
    8080
}
fn default_request_timeout() -> u64 {
    30
}
fn default_max_body_size() -> usize {
    1_048_576
}
fn default_app_base_url() -> String {
    "http://localhost:3000".to_string()
}
fn default_max_connections() -> u32 {
    20
}
fn default_min_connections() -> u32 {
    5
}
fn default_connect_timeout() -> u64 {
    10
}
fn default_idle_timeout() -> u64 {
    600
}
fn default_log_level() -> String {
    "info".to_string()
}
fn default_log_format() -> String {
    "json".to_string()
}
fn default_rate_limit() -> u32 {
    120
}
fn default_access_token_expiry() -> i64 {
    3600
}
fn default_refresh_token_expiry() -> i64 {
    2_592_000
}
fn default_jwt_leeway() -> u64 {
    shared::jwt::DEFAULT_LEEWAY_SECS
}
fn default_true() -> bool {
    true
}
fn default_same_site() -> String {
    "Lax".to_string()
}
fn default_access_cookie_path() -> String {
    "/".to_string()
}
fn default_refresh_cookie_path() -> String {
    "/api/v1/auth".to_string()
}
fn default_access_cookie_name() -> String {
    "cm_access_token".to_string()
}
fn default_refresh_cookie_name() -> String {
    "cm_refresh_token".to_string()
}
fn default_stripe_api_base_url() -> String {
    "https://api.stripe.com".to_string()
}
fn default_stripe_timeout_ms() -> u64 {
    10_000
}
fn default_webhook_tolerance() -> i64 {
    300
}
fn default_public_paths() -> Vec<String> {
    ["/", "/pricing", "/login", "/signup"]
        .iter()
        .map(|p| p.to_string())
        .collect()
}
fn default_disallowed_paths() -> Vec<String> {
    ["/api/", "/dashboard", "/checkout/"]
        .iter()
        .map(|p| p.to_string())
        .collect()
}
fn default_grace_days() -> i64 {
    3
}

/// Configuration validation error
#[derive(Debug, thiserror::Error)]
pub enum ConfigValidationError {
    #[error("Missing required configuration: {0}")]
    MissingRequired(String),

    #[error("Invalid configuration value: {0}")]
    InvalidValue(String),
}

impl Config {
    /// Load configuration from files and environment variables.
    ///
    /// Loading order (later sources override earlier):
    /// 1. config/default.toml
    /// 2. config/local.toml (optional, not in git)
    /// 3. Environment variables with the CM__ prefix, e.g. `CM__DATABASE__URL`
    pub fn load() -> Result<Self, config::ConfigError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name("config/local").required(false))
            .add_source(
                config::Environment::with_prefix("CM")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true)
                    .list_separator(",")
                    .with_list_parse_key("security.cors_origins")
                    .with_list_parse_key("seo.public_paths")
                    .with_list_parse_key("seo.disallowed_paths"),
            )
            .build()?;

        let cfg: Self = config.try_deserialize()?;
        cfg.validate()
            .map_err(|e| config::ConfigError::Message(e.to_string()))?;
        Ok(cfg)
    }

    /// Builds a config from embedded defaults plus overrides, without
    /// touching the filesystem or environment.
    pub fn load_for_test(overrides: &[(&str, &str)]) -> Result<Self, config::ConfigError> {
        let defaults = r#"
            [server]
            host = "127.0.0.1"
            port = 8080

            [database]
            url = ""

            [logging]
            level = "info"
            format = "json"

            [security]
            cors_origins = []
            rate_limit_per_minute = 0

            [jwt]
            secret = "test-secret-that-is-at-least-32-bytes-long"

            [cookies]
            secure = false

            [jobs]
            enabled = false
        "#;

        let mut builder = config::Config::builder()
            .add_source(config::File::from_str(defaults, config::FileFormat::Toml));

        for (key, value) in overrides {
            builder = builder.set_override(*key, *value)?;
        }

        builder.build()?.try_deserialize()
    }

    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        if self.database.url.is_empty() {
            return Err(ConfigValidationError::MissingRequired(
                "CM__DATABASE__URL environment variable must be set".to_string(),
            ));
        }

        if self.server.port == 0 {
            return Err(ConfigValidationError::InvalidValue(
                "Server port cannot be 0".to_string(),
            ));
        }

        if self.database.min_connections > self.database.max_connections {
            return Err(ConfigValidationError::InvalidValue(
                "min_connections cannot exceed max_connections".to_string(),
            ));
        }

        if self.jwt.private_key.is_empty() && self.jwt.secret.is_empty() {
            return Err(ConfigValidationError::MissingRequired(
                "either jwt.private_key/jwt.public_key or jwt.secret must be set".to_string(),
            ));
        }

        if self.stripe.enabled {
            if self.stripe.secret_key.is_empty() || self.stripe.webhook_secret.is_empty() {
                return Err(ConfigValidationError::MissingRequired(
                    "stripe.secret_key and stripe.webhook_secret are required when Stripe is enabled"
                        .to_string(),
                ));
            }
            for plan in [PlanType::Basic, PlanType::Premium, PlanType::Master] {
                if self.stripe.price_for(plan).is_none() {
                    return Err(ConfigValidationError::MissingRequired(format!(
                        "stripe.price_{} must be set when Stripe is enabled",
                        plan
                    )));
                }
            }
        }

        Ok(())
    }

    pub fn socket_addr(&self) -> Result<SocketAddr, AddrParseError> {
        format!("{}:{}", self.server.host, self.server.port).parse()
    }
}
