use clap::Parser;
use serde::Deserialize;

use crate::error::Result;

const DEFAULT_CONFIG_PATH: &str = "config/zenfolio.toml";

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Durable scope: remote endpoint + service key survive restarts here.
    pub credentials_path: String,
    /// Session scope: the authenticated identity lives here.
    pub session_path: String,
    pub log_path: String,
    /// Region selected at startup (India, US, Europe, Japan).
    pub region: String,
    /// Username prefilled on the login prompt.
    pub username: String,
    /// light, dark or dim.
    pub theme: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            credentials_path: "config/credentials.json".to_string(),
            session_path: "config/session.json".to_string(),
            log_path: "config/zenfolio.log".to_string(),
            region: "India".to_string(),
            username: String::new(),
            theme: "dark".to_string(),
        }
    }
}

#[derive(Debug, Parser)]
#[command(name = "zenfolio", disable_version_flag = true)]
struct Args {
    /// Optional config file path (TOML).
    #[arg(long)]
    config: Option<String>,
    /// Override the durable credentials file path.
    #[arg(long)]
    credentials_path: Option<String>,
    /// Override the session file path.
    #[arg(long)]
    session_path: Option<String>,
    /// Override the log file path.
    #[arg(long)]
    log_path: Option<String>,
    /// Override the startup region.
    #[arg(long)]
    region: Option<String>,
    /// Override username (password is never read from CLI).
    #[arg(long)]
    username: Option<String>,
    /// Override theme (light, dark, dim).
    #[arg(long)]
    theme: Option<String>,
}

pub fn load() -> Result<AppConfig> {
    let args = Args::parse();

    let config_path = args.config.as_deref().unwrap_or(DEFAULT_CONFIG_PATH);
    let mut builder = config::Config::builder();
    builder = builder.add_source(config::File::with_name(config_path).required(false));
    builder = builder.add_source(config::Environment::with_prefix("ZENFOLIO_TUI"));
    let mut settings: AppConfig = builder.build()?.try_deserialize()?;

    if let Some(credentials_path) = args.credentials_path {
        settings.credentials_path = credentials_path;
    }
    if let Some(session_path) = args.session_path {
        settings.session_path = session_path;
    }
    if let Some(log_path) = args.log_path {
        settings.log_path = log_path;
    }
    if let Some(region) = args.region {
        settings.region = region;
    }
    if let Some(username) = args.username {
        settings.username = username;
    }
    if let Some(theme) = args.theme {
        settings.theme = theme;
    }

    Ok(settings)
}
