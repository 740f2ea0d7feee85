use std::{env, io::Write, time::Duration as StdDuration};

use chrono::Duration;
use jardim_common::{parse_boolean_flag, Centavos, Secret};
use jardim_engine::jp_api::{account_objects::Registration, order_flow_api::DEFAULT_MIN_ORDER_VALUE};
use log::*;
use rand::{distributions::Alphanumeric, thread_rng, Rng};
use serde_json::json;
use tempfile::NamedTempFile;

use crate::errors::ServerError;

const DEFAULT_JP_HOST: &str = "127.0.0.1";
const DEFAULT_JP_PORT: u16 = 8460;
const DEFAULT_TOKEN_EXPIRY: Duration = Duration::hours(24);
const DEFAULT_OVERDUE_SWEEP_INTERVAL: StdDuration = StdDuration::from_secs(3600);
pub const DEFAULT_WEBHOOK_HMAC_HEADER: &str = "X-Signature";

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    pub auth: AuthConfig,
    /// Orders with a smaller subtotal are refused
    pub min_order_value: Centavos,
    pub webhook: WebhookConfig,
    /// Time between runs of the overdue payment sweep
    pub overdue_sweep_interval: StdDuration,
    /// If true, the X-Forwarded-For header will be used to determine the client's IP address, rather than the
    /// connection's remote address.
    pub use_x_forwarded_for: bool,
    /// If true, the Forwarded header will be used to determine the client's IP address, rather than the connection's
    /// remote address.
    pub use_forwarded: bool,
    /// The admin account to create at startup, if any
    pub admin: Option<AdminAccount>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_JP_HOST.to_string(),
            port: DEFAULT_JP_PORT,
            database_url: String::default(),
            auth: AuthConfig::default(),
            min_order_value: DEFAULT_MIN_ORDER_VALUE,
            webhook: WebhookConfig::default(),
            overdue_sweep_interval: DEFAULT_OVERDUE_SWEEP_INTERVAL,
            use_x_forwarded_for: false,
            use_forwarded: false,
            admin: None,
        }
    }
}

impl ServerConfig {
    pub fn new(host: &str, port: u16) -> Self {
        Self { host: host.to_string(), port, ..Default::default() }
    }

    pub fn from_env_or_default() -> Self {
        let host = env::var("JP_HOST").ok().unwrap_or_else(|| DEFAULT_JP_HOST.into());
        let port = env::var("JP_PORT")
            .map(|s| {
                s.parse::<u16>().unwrap_or_else(|e| {
                    error!("🪛️ {s} is not a valid port for JP_PORT. {e} Using the default, {DEFAULT_JP_PORT}, instead.");
                    DEFAULT_JP_PORT
                })
            })
            .ok()
            .unwrap_or(DEFAULT_JP_PORT);
        let database_url = env::var("JP_DATABASE_URL").ok().unwrap_or_else(|| {
            error!("🪛️ JP_DATABASE_URL is not set. Please set it to the URL for the Jardim Privé database.");
            String::default()
        });
        let auth = AuthConfig::try_from_env().unwrap_or_else(|e| {
            warn!(
                "🪛️ Could not load the authentication configuration from environment variables. {e}. Reverting to the \
                 default configuration."
            );
            AuthConfig::default()
        });
        let min_order_value = parse_min_order_value(env::var("JP_MIN_ORDER_VALUE").ok());
        let webhook = WebhookConfig::from_env_or_defaults();
        let overdue_sweep_interval = parse_sweep_interval(env::var("JP_OVERDUE_SWEEP_INTERVAL").ok());
        let use_x_forwarded_for = parse_boolean_flag(env::var("JP_USE_X_FORWARDED_FOR").ok(), false);
        let use_forwarded = parse_boolean_flag(env::var("JP_USE_FORWARDED").ok(), false);
        let admin = AdminAccount::from_env();
        Self {
            host,
            port,
            database_url,
            auth,
            min_order_value,
            webhook,
            overdue_sweep_interval,
            use_x_forwarded_for,
            use_forwarded,
            admin,
        }
    }
}

fn parse_min_order_value(value: Option<String>) -> Centavos {
    let Some(s) = value else {
        info!("🪛️ JP_MIN_ORDER_VALUE is not set. Using the default value of {DEFAULT_MIN_ORDER_VALUE}.");
        return DEFAULT_MIN_ORDER_VALUE;
    };
    match s.trim().parse::<i64>() {
        Ok(v) if v >= 0 => Centavos::from(v),
        Ok(v) => {
            warn!("🪛️ JP_MIN_ORDER_VALUE cannot be negative ({v}). Using the default value of {DEFAULT_MIN_ORDER_VALUE}.");
            DEFAULT_MIN_ORDER_VALUE
        },
        Err(e) => {
            warn!("🪛️ Invalid configuration value for JP_MIN_ORDER_VALUE. {e}");
            DEFAULT_MIN_ORDER_VALUE
        },
    }
}

fn parse_sweep_interval(value: Option<String>) -> StdDuration {
    value
        .ok_or_else(|| {
            info!(
                "🪛️ JP_OVERDUE_SWEEP_INTERVAL is not set. Using the default value of {} s.",
                DEFAULT_OVERDUE_SWEEP_INTERVAL.as_secs()
            )
        })
        .and_then(|s| {
            s.trim()
                .parse::<u64>()
                .map_err(|e| warn!("🪛️ Invalid configuration value for JP_OVERDUE_SWEEP_INTERVAL. {e}"))
        })
        .and_then(|secs| {
            if secs == 0 {
                warn!("🪛️ JP_OVERDUE_SWEEP_INTERVAL must be at least one second.");
                Err(())
            } else {
                Ok(StdDuration::from_secs(secs))
            }
        })
        .unwrap_or(DEFAULT_OVERDUE_SWEEP_INTERVAL)
}

fn parse_token_expiry(value: Option<String>) -> Duration {
    value
        .and_then(|s| {
            s.trim()
                .parse::<i64>()
                .ok()
                .filter(|h| *h > 0)
                .or_else(|| {
                    warn!("🪛️ Invalid configuration value for JP_JWT_EXPIRY_HOURS: {s}");
                    None
                })
        })
        .map(Duration::hours)
        .unwrap_or(DEFAULT_TOKEN_EXPIRY)
}

impl ServerConfig {
    pub fn proxy_config(&self) -> ProxyConfig {
        ProxyConfig { use_x_forwarded_for: self.use_x_forwarded_for, use_forwarded: self.use_forwarded }
    }
}

/// How the client's address is determined behind a reverse proxy
#[derive(Clone, Copy, Debug, Default)]
pub struct ProxyConfig {
    pub use_x_forwarded_for: bool,
    pub use_forwarded: bool,
}

//-------------------------------------------------  WebhookConfig  ----------------------------------------------------
#[derive(Clone, Debug)]
pub struct WebhookConfig {
    /// The secret shared with the payment gateway, used to sign the webhook body
    pub hmac_secret: Secret<String>,
    /// The header carrying the base64-encoded HMAC-SHA256 signature of the body
    pub hmac_header: String,
    /// If false, webhook calls are accepted without checking the signature. **DANGER**
    pub hmac_checks: bool,
}

impl Default for WebhookConfig {
    fn default() -> Self {
        Self { hmac_secret: Secret::default(), hmac_header: DEFAULT_WEBHOOK_HMAC_HEADER.into(), hmac_checks: true }
    }
}

impl WebhookConfig {
    pub fn from_env_or_defaults() -> Self {
        let hmac_secret = env::var("JP_WEBHOOK_SECRET").ok().unwrap_or_else(|| {
            error!("🪛️ JP_WEBHOOK_SECRET is not set. Please set it to the webhook secret of the payment gateway.");
            String::default()
        });
        let hmac_header =
            env::var("JP_WEBHOOK_HMAC_HEADER").ok().unwrap_or_else(|| DEFAULT_WEBHOOK_HMAC_HEADER.to_string());
        let hmac_checks = parse_boolean_flag(env::var("JP_WEBHOOK_HMAC_CHECKS").ok(), true);
        if !hmac_checks {
            warn!("🚨️ Webhook signature checks are disabled. Anyone can mark orders as paid. 🚨️");
        }
        Self { hmac_secret: Secret::new(hmac_secret), hmac_header, hmac_checks }
    }
}

//-------------------------------------------------  AuthConfig  -------------------------------------------------------
#[derive(Clone, Debug)]
pub struct AuthConfig {
    /// The HS256 secret used to sign and verify access tokens
    pub jwt_secret: Secret<String>,
    /// How long an access token stays valid
    pub token_expiry: Duration,
}

impl Default for AuthConfig {
    fn default() -> Self {
        let mut tmpfile = NamedTempFile::new().ok().and_then(|f| f.keep().ok());
        warn!(
            "🚨️🚨️🚨️ The JWT signing secret has not been set. I'm using a random value for this session. DO NOT operate \
             on production like this since every user is logged out when the server restarts. 🚨️🚨️🚨️"
        );
        let secret = thread_rng().sample_iter(&Alphanumeric).take(64).map(char::from).collect::<String>();
        match &mut tmpfile {
            Some((f, p)) => {
                let key_data = json!({ "jwt_secret": secret }).to_string();
                match writeln!(f, "{key_data}") {
                    Ok(()) => warn!(
                        "🚨️🚨️🚨️ The JWT secret for this session was written to {}. If this is a production instance, \
                         you are doing it wrong! Set the JP_JWT_SECRET environment variable instead. 🚨️🚨️🚨️",
                        p.to_str().unwrap_or("???")
                    ),
                    Err(e) => warn!("🪛️ Could not write the JWT secret to the temporary file. {e}"),
                }
            },
            None => {
                warn!("🪛️ Could not create a temporary file to store the JWT secret. ");
            },
        }
        Self { jwt_secret: Secret::new(secret), token_expiry: DEFAULT_TOKEN_EXPIRY }
    }
}

impl AuthConfig {
    pub fn new<S: Into<String>>(secret: S, token_expiry: Duration) -> Self {
        Self { jwt_secret: Secret::new(secret.into()), token_expiry }
    }

    pub fn try_from_env() -> Result<Self, ServerError> {
        let secret =
            env::var("JP_JWT_SECRET").map_err(|e| ServerError::ConfigurationError(format!("{e} [JP_JWT_SECRET]")))?;
        if secret.len() < 32 {
            return Err(ServerError::ConfigurationError(
                "JP_JWT_SECRET must be at least 32 characters long".to_string(),
            ));
        }
        let token_expiry = parse_token_expiry(env::var("JP_JWT_EXPIRY_HOURS").ok());
        Ok(Self::new(secret, token_expiry))
    }
}

//-------------------------------------------------  AdminAccount  -----------------------------------------------------
/// The bootstrap admin account
#[derive(Clone, Debug)]
pub struct AdminAccount {
    pub name: String,
    pub email: String,
    pub cpf: String,
    pub password: Secret<String>,
}

impl AdminAccount {
    pub fn from_env() -> Option<Self> {
        let vars = ["JP_ADMIN_NAME", "JP_ADMIN_EMAIL", "JP_ADMIN_CPF", "JP_ADMIN_PASSWORD"].map(|v| env::var(v).ok());
        match vars {
            [Some(name), Some(email), Some(cpf), Some(password)] => {
                Some(Self { name, email, cpf, password: Secret::new(password) })
            },
            [None, None, None, None] => {
                info!("🪛️ No bootstrap admin is configured.");
                None
            },
            _ => {
                warn!(
                    "🪛️ The bootstrap admin needs all of JP_ADMIN_NAME, JP_ADMIN_EMAIL, JP_ADMIN_CPF and \
                     JP_ADMIN_PASSWORD. No admin account will be created."
                );
                None
            },
        }
    }

    pub fn registration(&self) -> Registration {
        Registration {
            name: self.name.clone(),
            email: self.email.clone(),
            cpf: self.cpf.clone(),
            phone: None,
            password: self.password.reveal().clone(),
            pix_key: None,
        }
    }
}
