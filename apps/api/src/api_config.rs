use std::env;
use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;

use attenthive_core::AppError;
use ipnet::IpNet;
use tracing_subscriber::EnvFilter;

const SESSION_SECRET_MIN_LENGTH: usize = 32;
const DEFAULT_FRONTEND_URL: &str = "http://localhost:3000";
const DEFAULT_API_PORT: u16 = 3001;
const DEFAULT_DATABASE_MAX_CONNECTIONS: u32 = 10;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SmtpRuntimeConfig {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    pub from_address: String,
}

/// Where invite notifications are delivered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EmailProviderConfig {
    Console,
    Smtp(SmtpRuntimeConfig),
}

/// Runtime configuration read from the environment (and `.env`).
#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub migrate_only: bool,
    pub database_url: String,
    pub database_max_connections: u32,
    pub frontend_url: String,
    pub bootstrap_token: String,
    pub api_host: String,
    pub api_port: u16,
    pub cookie_secure: bool,
    pub trusted_proxies: Vec<IpNet>,
    pub email_provider: EmailProviderConfig,
}

impl ApiConfig {
    pub fn load() -> Result<Self, AppError> {
        let migrate_only = env::args().nth(1).as_deref() == Some("migrate");
        Self::from_lookup(migrate_only, |name| env::var(name).ok())
    }

    /// Builds the configuration from an arbitrary variable source.
    pub fn from_lookup(
        migrate_only: bool,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, AppError> {
        let vars = Vars(&lookup);

        let session_secret = vars.required("SESSION_SECRET")?;
        if session_secret.chars().count() < SESSION_SECRET_MIN_LENGTH {
            return Err(AppError::Validation(format!(
                "SESSION_SECRET must be at least {SESSION_SECRET_MIN_LENGTH} characters"
            )));
        }

        Ok(Self {
            migrate_only,
            database_url: vars.required("DATABASE_URL")?,
            database_max_connections: vars
                .parsed("DATABASE_MAX_CONNECTIONS")?
                .unwrap_or(DEFAULT_DATABASE_MAX_CONNECTIONS),
            frontend_url: vars
                .optional("FRONTEND_URL")
                .unwrap_or_else(|| DEFAULT_FRONTEND_URL.to_owned())
                .trim_end_matches('/')
                .to_owned(),
            bootstrap_token: vars.required("AUTH_BOOTSTRAP_TOKEN")?,
            api_host: vars
                .optional("API_HOST")
                .unwrap_or_else(|| "127.0.0.1".to_owned()),
            api_port: vars.parsed("API_PORT")?.unwrap_or(DEFAULT_API_PORT),
            cookie_secure: vars
                .optional("SESSION_COOKIE_SECURE")
                .is_some_and(|value| value.eq_ignore_ascii_case("true")),
            trusted_proxies: trusted_proxies(&vars)?,
            email_provider: email_provider(&vars)?,
        })
    }

    pub fn socket_address(&self) -> Result<SocketAddr, AppError> {
        let host = IpAddr::from_str(&self.api_host).map_err(|error| {
            AppError::Validation(format!("invalid API_HOST '{}': {error}", self.api_host))
        })?;
        Ok(SocketAddr::from((host, self.api_port)))
    }
}

/// `TRUSTED_PROXY_CIDRS`: comma-separated networks or bare addresses.
fn trusted_proxies(vars: &Vars<'_>) -> Result<Vec<IpNet>, AppError> {
    let Some(value) = vars.optional("TRUSTED_PROXY_CIDRS") else {
        return Ok(Vec::new());
    };

    value
        .split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(|entry| {
            entry
                .parse::<IpNet>()
                .or_else(|_| entry.parse::<IpAddr>().map(IpNet::from))
                .map_err(|error| {
                    AppError::Validation(format!(
                        "invalid TRUSTED_PROXY_CIDRS entry '{entry}': {error}"
                    ))
                })
        })
        .collect()
}

fn email_provider(vars: &Vars<'_>) -> Result<EmailProviderConfig, AppError> {
    let provider = vars
        .optional("EMAIL_PROVIDER")
        .unwrap_or_else(|| "console".to_owned());

    match provider.to_ascii_lowercase().as_str() {
        "console" => Ok(EmailProviderConfig::Console),
        "smtp" => Ok(EmailProviderConfig::Smtp(SmtpRuntimeConfig {
            host: vars.required("SMTP_HOST")?,
            port: vars
                .parsed("SMTP_PORT")?
                .ok_or_else(|| AppError::Validation("SMTP_PORT is required".to_owned()))?,
            username: vars.required("SMTP_USERNAME")?,
            password: vars.required("SMTP_PASSWORD")?,
            from_address: vars.required("SMTP_FROM_ADDRESS")?,
        })),
        _ => Err(AppError::Validation(format!(
            "EMAIL_PROVIDER must be either 'console' or 'smtp', got '{provider}'"
        ))),
    }
}

/// Variable source with blank values treated as unset.
struct Vars<'a>(&'a dyn Fn(&str) -> Option<String>);

impl Vars<'_> {
    fn optional(&self, name: &str) -> Option<String> {
        (self.0)(name)
            .map(|value| value.trim().to_owned())
            .filter(|value| !value.is_empty())
    }

    fn required(&self, name: &str) -> Result<String, AppError> {
        self.optional(name)
            .ok_or_else(|| AppError::Validation(format!("{name} is required")))
    }

    fn parsed<T>(&self, name: &str) -> Result<Option<T>, AppError>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        self.optional(name)
            .map(|value| {
                value
                    .parse::<T>()
                    .map_err(|error| AppError::Validation(format!("invalid {name}: {error}")))
            })
            .transpose()
    }
}

pub fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .compact()
        .init();
}
