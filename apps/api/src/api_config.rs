use std::env;
use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;

use engeserv_application::{BootstrapRequest, DEFAULT_INVITATION_TTL_DAYS};
use engeserv_core::AppError;
use engeserv_domain::{INVITATION_MAX_TTL_DAYS, RoleBaseTable};
use tracing_subscriber::EnvFilter;
use url::Url;

/// What the binary does after loading configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiCommand {
    Serve,
    Migrate,
    Bootstrap,
}

impl ApiCommand {
    fn from_arg(arg: Option<&str>) -> Result<Self, AppError> {
        match arg {
            None | Some("serve") => Ok(Self::Serve),
            Some("migrate") => Ok(Self::Migrate),
            Some("bootstrap") => Ok(Self::Bootstrap),
            Some(other) => Err(AppError::Validation(format!(
                "unknown command '{other}', expected 'serve', 'migrate' or 'bootstrap'"
            ))),
        }
    }
}

#[derive(Debug, Clone)]
pub struct SmtpRuntimeConfig {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    pub from_address: String,
}

#[derive(Debug, Clone)]
pub enum EmailProviderConfig {
    Console,
    Smtp(SmtpRuntimeConfig),
}

#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub command: ApiCommand,
    pub database_url: String,
    pub frontend_url: String,
    pub allowed_origin: String,
    pub api_host: String,
    pub api_port: u16,
    pub cookie_secure: bool,
    pub session_inactivity_minutes: i64,
    pub invitation_ttl_days: u32,
    pub role_table: RoleBaseTable,
    pub email_provider: EmailProviderConfig,
}

impl ApiConfig {
    pub fn load() -> Result<Self, AppError> {
        let command = ApiCommand::from_arg(env::args().nth(1).as_deref())?;

        let database_url = required_env("DATABASE_URL")?;
        let frontend_url = env::var("FRONTEND_URL")
            .unwrap_or_else(|_| "http://localhost:3000".to_owned())
            .trim_end_matches('/')
            .to_owned();
        let allowed_origin = origin_of(&frontend_url)?;

        let session_secret = required_env("SESSION_SECRET")?;
        if session_secret.len() < 32 {
            return Err(AppError::Validation(
                "SESSION_SECRET must be at least 32 characters".to_owned(),
            ));
        }

        let api_host = env::var("API_HOST").unwrap_or_else(|_| "127.0.0.1".to_owned());
        let api_port = env::var("API_PORT")
            .ok()
            .and_then(|value| value.parse::<u16>().ok())
            .unwrap_or(3001);
        let cookie_secure = env::var("SESSION_COOKIE_SECURE")
            .unwrap_or_else(|_| "false".to_owned())
            .eq_ignore_ascii_case("true");
        let session_inactivity_minutes = parse_env("SESSION_INACTIVITY_MINUTES", 30_i64)?;
        if session_inactivity_minutes <= 0 {
            return Err(AppError::Validation(
                "SESSION_INACTIVITY_MINUTES must be greater than zero".to_owned(),
            ));
        }

        let invitation_ttl_days = parse_env("INVITATION_TTL_DAYS", DEFAULT_INVITATION_TTL_DAYS)?;
        if invitation_ttl_days == 0 || invitation_ttl_days > INVITATION_MAX_TTL_DAYS {
            return Err(AppError::Validation(format!(
                "INVITATION_TTL_DAYS must be between 1 and {INVITATION_MAX_TTL_DAYS}"
            )));
        }

        let role_table = match env::var("ROLE_TABLE_PATH")
            .ok()
            .filter(|value| !value.trim().is_empty())
        {
            Some(path) => load_role_table(&path)?,
            None => RoleBaseTable::standard(),
        };

        let email_provider = match env::var("EMAIL_PROVIDER")
            .unwrap_or_else(|_| "console".to_owned())
            .as_str()
        {
            "console" => EmailProviderConfig::Console,
            "smtp" => {
                let port = required_non_empty_env("SMTP_PORT")?
                    .parse::<u16>()
                    .map_err(|error| AppError::Validation(format!("invalid SMTP_PORT: {error}")))?;
                EmailProviderConfig::Smtp(SmtpRuntimeConfig {
                    host: required_non_empty_env("SMTP_HOST")?,
                    port,
                    username: required_non_empty_env("SMTP_USERNAME")?,
                    password: required_non_empty_env("SMTP_PASSWORD")?,
                    from_address: required_non_empty_env("SMTP_FROM_ADDRESS")?,
                })
            }
            other => {
                return Err(AppError::Validation(format!(
                    "EMAIL_PROVIDER must be either 'console' or 'smtp', got '{other}'"
                )));
            }
        };

        Ok(Self {
            command,
            database_url,
            frontend_url,
            allowed_origin,
            api_host,
            api_port,
            cookie_secure,
            session_inactivity_minutes,
            invitation_ttl_days,
            role_table,
            email_provider,
        })
    }

    pub fn socket_address(&self) -> Result<SocketAddr, AppError> {
        let host = IpAddr::from_str(&self.api_host).map_err(|error| {
            AppError::Internal(format!("invalid API_HOST '{}': {error}", self.api_host))
        })?;
        Ok(SocketAddr::from((host, self.api_port)))
    }

    /// Reads the first-run superadmin seed. Only the `bootstrap` command
    /// needs these variables.
    pub fn bootstrap_request() -> Result<BootstrapRequest, AppError> {
        Ok(BootstrapRequest {
            company_name: env::var("BOOTSTRAP_COMPANY_NAME")
                .unwrap_or_else(|_| "Engeserv".to_owned()),
            branch_name: env::var("BOOTSTRAP_BRANCH_NAME").unwrap_or_else(|_| "Matriz".to_owned()),
            email: required_non_empty_env("BOOTSTRAP_SUPERADMIN_EMAIL")?,
            password: required_non_empty_env("BOOTSTRAP_SUPERADMIN_PASSWORD")?,
            display_name: env::var("BOOTSTRAP_SUPERADMIN_NAME")
                .ok()
                .filter(|value| !value.trim().is_empty()),
        })
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

fn load_role_table(path: &str) -> Result<RoleBaseTable, AppError> {
    let contents = std::fs::read_to_string(path).map_err(|error| {
        AppError::Validation(format!("failed to read ROLE_TABLE_PATH '{path}': {error}"))
    })?;

    parse_role_table(&contents)
        .map_err(|error| AppError::Validation(format!("invalid role table in '{path}': {error}")))
}

fn parse_role_table(contents: &str) -> Result<RoleBaseTable, serde_json::Error> {
    serde_json::from_str::<RoleBaseTable>(contents)
}

/// Reduces a URL to its `scheme://host[:port]` origin.
fn origin_of(frontend_url: &str) -> Result<String, AppError> {
    let url = Url::parse(frontend_url)
        .map_err(|error| AppError::Validation(format!("invalid FRONTEND_URL: {error}")))?;

    let origin = url.origin();
    if !origin.is_tuple() {
        return Err(AppError::Validation(format!(
            "FRONTEND_URL '{frontend_url}' has no usable origin"
        )));
    }

    Ok(origin.ascii_serialization())
}

fn parse_env<T>(name: &str, default: T) -> Result<T, AppError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(name) {
        Ok(value) if !value.trim().is_empty() => value
            .trim()
            .parse::<T>()
            .map_err(|error| AppError::Validation(format!("invalid {name}: {error}"))),
        _ => Ok(default),
    }
}

fn required_env(name: &str) -> Result<String, AppError> {
    env::var(name).map_err(|_| AppError::Validation(format!("{name} is required")))
}

fn required_non_empty_env(name: &str) -> Result<String, AppError> {
    let value = required_env(name)?;
    if value.trim().is_empty() {
        return Err(AppError::Validation(format!("{name} must not be empty")));
    }

    Ok(value)
}
