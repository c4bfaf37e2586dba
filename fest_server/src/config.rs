use std::{env, time::Duration};

use fest_common::{
    helpers::{env_parse, parse_boolean_flag},
    Secret,
};
use log::*;
use rand::{distributions::Alphanumeric, thread_rng, Rng};
use razorpay_tools::RazorpayConfig;

const DEFAULT_FEST_HOST: &str = "127.0.0.1";
const DEFAULT_FEST_PORT: u16 = 3000;
const DEFAULT_DATABASE_URL: &str = "sqlite://data/fest_registrations.db";
const DEFAULT_DB_MAX_CONNECTIONS: u32 = 10;
const DEFAULT_DB_CONNECT_TIMEOUT: Duration = Duration::from_secs(60);
const DEFAULT_TOKEN_TTL_MINUTES: i64 = 720;
const MAX_TOKEN_TTL_MINUTES: i64 = 60 * 24 * 30;
const DEFAULT_SMTP_HOST: &str = "smtp.gmail.com";
const DEFAULT_SMTP_PORT: u16 = 587;
const DEFAULT_MAIL_FROM_NAME: &str = "Discovery ADCET 2025";
const DEFAULT_PERSIST_RETRY_DELAY: Duration = Duration::from_millis(1000);
const DEFAULT_NOTIFY_RETRY_DELAY: Duration = Duration::from_millis(2000);
const DEFAULT_REDELIVERY_DELAY: Duration = Duration::from_secs(300);

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    pub db_max_connections: u32,
    pub db_connect_timeout: Duration,
    /// Apply the embedded migrations before accepting requests.
    pub run_migrations: bool,
    pub razorpay: RazorpayConfig,
    pub auth: AuthConfig,
    pub mail: MailConfig,
    pub retry: RetryConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_FEST_HOST.to_string(),
            port: DEFAULT_FEST_PORT,
            database_url: DEFAULT_DATABASE_URL.to_string(),
            db_max_connections: DEFAULT_DB_MAX_CONNECTIONS,
            db_connect_timeout: DEFAULT_DB_CONNECT_TIMEOUT,
            run_migrations: true,
            razorpay: RazorpayConfig::default(),
            auth: AuthConfig::default(),
            mail: MailConfig::default(),
            retry: RetryConfig::default(),
        }
    }
}

impl ServerConfig {
    pub fn new(host: &str, port: u16) -> Self {
        Self { host: host.to_string(), port, ..Default::default() }
    }

    pub fn from_env_or_default() -> Self {
        let host = env::var("FEST_HOST").ok().unwrap_or_else(|| DEFAULT_FEST_HOST.into());
        let port = env_or("FEST_PORT", DEFAULT_FEST_PORT);
        let database_url = env::var("FEST_DATABASE_URL").ok().unwrap_or_else(|| {
            warn!("🪛️ FEST_DATABASE_URL is not set. Using {DEFAULT_DATABASE_URL}");
            DEFAULT_DATABASE_URL.to_string()
        });
        let db_max_connections = env_or("FEST_DB_MAX_CONNECTIONS", DEFAULT_DB_MAX_CONNECTIONS);
        let db_connect_timeout =
            Duration::from_secs(env_or("FEST_DB_CONNECT_TIMEOUT", DEFAULT_DB_CONNECT_TIMEOUT.as_secs()));
        let run_migrations = parse_boolean_flag(env::var("FEST_RUN_MIGRATIONS").ok(), true);
        let razorpay = RazorpayConfig::new_from_env_or_default();
        Self {
            host,
            port,
            database_url,
            db_max_connections,
            db_connect_timeout,
            run_migrations,
            razorpay,
            auth: AuthConfig::from_env_or_default(),
            mail: MailConfig::from_env_or_default(),
            retry: RetryConfig::from_env_or_default(),
        }
    }
}

/// Reads `name` from the environment, falling back to `default` (with a log message) if it is missing or invalid.
fn env_or<T>(name: &str, default: T) -> T
where
    T: std::str::FromStr + std::fmt::Display,
    T::Err: std::fmt::Display,
{
    match env_parse::<T>(name) {
        Ok(Some(v)) => v,
        Ok(None) => {
            debug!("🪛️ {name} is not set. Using the default, {default}.");
            default
        },
        Err(e) => {
            error!("🪛️ {e} Using the default, {default}, instead.");
            default
        },
    }
}

//-------------------------------------------------  AuthConfig  -------------------------------------------------------
#[derive(Clone, Debug)]
pub struct AuthConfig {
    /// The shared password the organisers log in with. When blank, every login attempt fails.
    pub admin_password: Secret<String>,
    /// HMAC key for the HS256 admin access tokens.
    pub jwt_secret: Secret<String>,
    pub token_ttl: chrono::Duration,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            admin_password: Secret::default(),
            jwt_secret: random_jwt_secret(),
            token_ttl: chrono::Duration::minutes(DEFAULT_TOKEN_TTL_MINUTES),
        }
    }
}

impl AuthConfig {
    pub fn new(admin_password: &str, jwt_secret: &str) -> Self {
        Self {
            admin_password: Secret::new(admin_password.to_string()),
            jwt_secret: Secret::new(jwt_secret.to_string()),
            token_ttl: chrono::Duration::minutes(DEFAULT_TOKEN_TTL_MINUTES),
        }
    }

    pub fn from_env_or_default() -> Self {
        let admin_password = env::var("FEST_ADMIN_PASSWORD").ok().filter(|s| !s.trim().is_empty()).unwrap_or_else(|| {
            error!("🪛️ FEST_ADMIN_PASSWORD is not set. Nobody will be able to log in to the admin dashboard.");
            String::default()
        });
        let jwt_secret = match env::var("FEST_JWT_SECRET").ok().filter(|s| !s.trim().is_empty()) {
            Some(s) => Secret::new(s),
            None => random_jwt_secret(),
        };
        let token_ttl = token_ttl(env_or("FEST_ADMIN_TOKEN_TTL_MINUTES", DEFAULT_TOKEN_TTL_MINUTES));
        Self { admin_password: Secret::new(admin_password), jwt_secret, token_ttl }
    }
}

/// Admin tokens live for between one minute and thirty days. Anything else falls back to the default.
fn token_ttl(minutes: i64) -> chrono::Duration {
    match chrono::Duration::try_minutes(minutes).filter(|_| (1..=MAX_TOKEN_TTL_MINUTES).contains(&minutes)) {
        Some(ttl) => ttl,
        None => {
            error!(
                "🪛️ FEST_ADMIN_TOKEN_TTL_MINUTES must be between 1 and {MAX_TOKEN_TTL_MINUTES}, not {minutes}. Using \
                 {DEFAULT_TOKEN_TTL_MINUTES} minutes."
            );
            chrono::Duration::minutes(DEFAULT_TOKEN_TTL_MINUTES)
        },
    }
}

fn random_jwt_secret() -> Secret<String> {
    warn!(
        "🚨️🚨️🚨️ FEST_JWT_SECRET has not been set. I'm using a random value for this session. Admin tokens will not \
         survive a restart, and will not be accepted by other instances. 🚨️🚨️🚨️"
    );
    let secret = thread_rng().sample_iter(&Alphanumeric).take(48).map(char::from).collect::<String>();
    Secret::new(secret)
}

//-------------------------------------------------  MailConfig  -------------------------------------------------------
#[derive(Clone, Debug)]
pub struct MailConfig {
    pub smtp_host: String,
    pub smtp_port: u16,
    /// The account on the relay. It is also the sender address.
    pub smtp_user: String,
    pub smtp_password: Secret<String>,
    pub from_name: String,
}

impl Default for MailConfig {
    fn default() -> Self {
        Self {
            smtp_host: DEFAULT_SMTP_HOST.to_string(),
            smtp_port: DEFAULT_SMTP_PORT,
            smtp_user: String::default(),
            smtp_password: Secret::default(),
            from_name: DEFAULT_MAIL_FROM_NAME.to_string(),
        }
    }
}

impl MailConfig {
    pub fn from_env_or_default() -> Self {
        let smtp_host = env::var("FEST_SMTP_HOST").ok().unwrap_or_else(|| DEFAULT_SMTP_HOST.to_string());
        let smtp_port = env_or("FEST_SMTP_PORT", DEFAULT_SMTP_PORT);
        let smtp_user = env::var("FEST_SMTP_USER").ok().unwrap_or_else(|| {
            error!("🪛️ FEST_SMTP_USER is not set. Confirmation mails cannot be sent.");
            String::default()
        });
        let smtp_password = env::var("FEST_SMTP_PASSWORD").ok().unwrap_or_else(|| {
            error!("🪛️ FEST_SMTP_PASSWORD is not set. Confirmation mails cannot be sent.");
            String::default()
        });
        let from_name = env::var("FEST_MAIL_FROM_NAME").ok().unwrap_or_else(|| DEFAULT_MAIL_FROM_NAME.to_string());
        Self { smtp_host, smtp_port, smtp_user, smtp_password: Secret::new(smtp_password), from_name }
    }

    pub fn is_configured(&self) -> bool {
        !self.smtp_user.trim().is_empty() && !self.smtp_password.is_blank() && !self.smtp_host.trim().is_empty()
    }
}

//-------------------------------------------------  RetryConfig  ------------------------------------------------------
#[derive(Clone, Copy, Debug)]
pub struct RetryConfig {
    pub persist_base_delay: Duration,
    pub notify_base_delay: Duration,
    /// How long to wait before one last attempt at a confirmation mail that could not be delivered.
    pub redelivery_delay: Duration,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            persist_base_delay: DEFAULT_PERSIST_RETRY_DELAY,
            notify_base_delay: DEFAULT_NOTIFY_RETRY_DELAY,
            redelivery_delay: DEFAULT_REDELIVERY_DELAY,
        }
    }
}

impl RetryConfig {
    pub fn from_env_or_default() -> Self {
        let ms = |name: &str, default: Duration| {
            #[allow(clippy::cast_possible_truncation)]
            let default_ms = default.as_millis() as u64;
            Duration::from_millis(env_or(name, default_ms))
        };
        Self {
            persist_base_delay: ms("FEST_RETRY_BASE_DELAY_MS", DEFAULT_PERSIST_RETRY_DELAY),
            notify_base_delay: ms("FEST_NOTIFY_RETRY_BASE_DELAY_MS", DEFAULT_NOTIFY_RETRY_DELAY),
            redelivery_delay: Duration::from_secs(env_or(
                "FEST_MAIL_REDELIVERY_DELAY_SECS",
                DEFAULT_REDELIVERY_DELAY.as_secs(),
            )),
        }
    }
}
