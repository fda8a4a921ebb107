use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use dialoguer::{Input, Password};
use std::path::PathBuf;
use std::time::Duration;

use crate::session::{BootstrapMode, SessionSettings};

/// Translation Hub command-line client
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct CliArgs {
    /// Backend base URL
    #[arg(short = 'u', long, env = "API_URL", default_value = "http://localhost:8000")]
    pub api_url: String,

    /// Path to the session database
    #[arg(short = 'd', long, env = "SESSION_DB_FILE")]
    pub db_file: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "LOG_LEVEL", default_value = "info")]
    pub log_level: String,

    /// HTTP connect timeout in seconds
    #[arg(long, env = "HTTP_CONNECT_TIMEOUT", default_value = "10")]
    pub http_connect_timeout: u64,

    /// HTTP request timeout in seconds
    #[arg(long, env = "HTTP_REQUEST_TIMEOUT", default_value = "30")]
    pub http_timeout: u64,

    /// Background token refresh interval in seconds
    #[arg(long, env = "TOKEN_REFRESH_INTERVAL", default_value = "600")]
    pub refresh_interval: u64,

    /// Re-fetch the user profile at startup instead of trusting the stored one
    #[arg(long, env = "VALIDATE_SESSION_ON_START")]
    pub validate_session: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// Log in with email and password (prompts for missing values)
    Login {
        #[arg(short, long)]
        email: Option<String>,

        #[arg(long, env = "HUB_PASSWORD", hide_env_values = true)]
        password: Option<String>,
    },

    /// Log in with a Google identity credential
    GoogleLogin { credential: String },

    /// Clear the stored session
    Logout,

    /// Print the current session
    Status,

    /// List projects visible to the signed-in user
    Projects,

    /// Show one project with its documents and comments
    Project { id: String },

    /// Confirm an email address from an activation link
    Verify { uid: String, token: String },

    /// Keep the session alive and print session changes until interrupted
    Watch,
}

#[derive(Clone, Debug)]
pub struct Config {
    // Backend
    pub api_url: String,

    // Session storage
    pub session_db_file: PathBuf,

    // Timeouts
    pub http_connect_timeout: u64,
    pub http_request_timeout: u64,
    pub token_refresh_interval: u64,

    // Session bootstrap
    pub bootstrap_mode: BootstrapMode,

    // Logging
    pub log_level: String,
}

impl Config {
    /// Load configuration from all sources with priority: CLI > ENV > defaults
    pub fn load() -> Result<(Self, Command)> {
        // Load .env file if it exists
        dotenvy::dotenv().ok();

        let args = CliArgs::parse();
        Self::from_args(args)
    }

    /// Build the configuration from parsed arguments
    pub fn from_args(args: CliArgs) -> Result<(Self, Command)> {
        let session_db_file = match args.db_file {
            Some(path) => expand_tilde(&path),
            None => default_session_db_path()
                .context("Cannot determine a data directory, set SESSION_DB_FILE")?,
        };

        let config = Config {
            api_url: args.api_url,
            session_db_file,
            http_connect_timeout: args.http_connect_timeout,
            http_request_timeout: args.http_timeout,
            token_refresh_interval: args.refresh_interval,
            bootstrap_mode: if args.validate_session {
                BootstrapMode::Eager
            } else {
                BootstrapMode::Lazy
            },
            log_level: args.log_level,
        };

        Ok((config, args.command))
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        let url = reqwest::Url::parse(&self.api_url)
            .with_context(|| format!("API_URL is not a valid URL: {}", self.api_url))?;
        if url.scheme() != "http" && url.scheme() != "https" {
            anyhow::bail!("API_URL must use http or https: {}", self.api_url);
        }

        if self.token_refresh_interval == 0 {
            anyhow::bail!("TOKEN_REFRESH_INTERVAL must be greater than zero");
        }
        if self.http_request_timeout == 0 {
            anyhow::bail!("HTTP_REQUEST_TIMEOUT must be greater than zero");
        }

        Ok(())
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.http_connect_timeout)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.http_request_timeout)
    }

    pub fn session_settings(&self) -> SessionSettings {
        SessionSettings {
            refresh_interval: Duration::from_secs(self.token_refresh_interval),
            bootstrap_mode: self.bootstrap_mode,
        }
    }
}

/// Expand tilde (~) in file paths to user's home directory
fn expand_tilde(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest);
        }
    }
    PathBuf::from(path)
}

/// `<data dir>/translation-hub/session.db`
fn default_session_db_path() -> Option<PathBuf> {
    dirs::data_local_dir().map(|dir| dir.join("translation-hub").join("session.db"))
}

// === Interactive Login ===

/// Ask for whichever login credentials were not given on the command line
pub fn prompt_credentials(
    email: Option<String>,
    password: Option<String>,
) -> Result<(String, String)> {
    let email = match email {
        Some(email) => email,
        None => Input::new()
            .with_prompt("Email")
            .interact_text()
            .context("Failed to read email")?,
    };

    let password = match password {
        Some(password) => password,
        None => Password::new()
            .with_prompt("Password")
            .interact()
            .context("Failed to read password")?,
    };

    if email.trim().is_empty() || password.is_empty() {
        anyhow::bail!("Email and password cannot be empty");
    }

    Ok((email.trim().to_string(), password))
}
