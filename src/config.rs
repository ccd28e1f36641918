use std::time::Duration;

use chrono::NaiveTime;
use clap::{ArgAction, Parser};

use crate::collectors::{CollectorSettings, linkedin, naukri};

const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36";

#[derive(Parser, Debug, Clone)]
#[command(name = "jobboard", about = "Job board backend with scheduled listing scrapers")]
pub struct Config {
    /// Database connection URL
    #[arg(long, env = "DATABASE_URL")]
    pub database_url: String,

    /// Run database migrations on startup
    #[arg(long, env = "RUN_MIGRATIONS", default_value = "true", action = ArgAction::Set)]
    pub run_migrations: bool,

    /// Emit logs as JSON lines
    #[arg(long, env = "LOG_JSON", default_value = "false", action = ArgAction::Set)]
    pub log_json: bool,

    /// Per-request timeout for source pages, in seconds
    #[arg(long, env = "FETCH_TIMEOUT_SECS", default_value = "30")]
    pub fetch_timeout_secs: u64,

    /// User-Agent sent to job sites
    #[arg(long, env = "SCRAPER_USER_AGENT", default_value = DEFAULT_USER_AGENT)]
    pub user_agent: String,

    #[arg(long, env = "NAUKRI_BASE_URL", default_value = naukri::DEFAULT_BASE_URL)]
    pub naukri_base_url: String,

    #[arg(long, env = "LINKEDIN_BASE_URL", default_value = linkedin::DEFAULT_BASE_URL)]
    pub linkedin_base_url: String,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(clap::Subcommand, Debug, Clone)]
pub enum Command {
    /// Start the web server and the daily refresh (default when no subcommand given)
    Serve(ServeArgs),
    /// Crawl and save one keyword, then exit
    Refresh {
        #[arg(long, value_parser = parse_keyword)]
        keyword: String,
    },
}

/// Same rule as the refresh endpoint: a blank keyword never reaches the crawl.
fn parse_keyword(raw: &str) -> Result<String, String> {
    let keyword = raw.trim();
    if keyword.is_empty() {
        return Err("Keyword is required".to_string());
    }
    Ok(keyword.to_string())
}

#[derive(Parser, Debug, Clone)]
pub struct ServeArgs {
    /// Listen address
    #[arg(long, env = "LISTEN_ADDR", default_value = "0.0.0.0:5000")]
    pub listen_addr: String,

    /// Origins allowed by CORS
    #[arg(
        long,
        env = "CORS_ORIGINS",
        value_delimiter = ',',
        default_value = "http://localhost:3000"
    )]
    pub cors_origins: Vec<String>,

    /// Keywords crawled by the daily refresh
    #[arg(
        long,
        env = "REFRESH_KEYWORDS",
        value_delimiter = ',',
        default_value = "software engineer,product manager,data scientist"
    )]
    pub refresh_keywords: Vec<String>,

    /// Local time of day for the daily refresh
    #[arg(long, env = "REFRESH_AT", default_value = "00:00:00")]
    pub refresh_at: NaiveTime,

    /// Run the daily refresh
    #[arg(long, env = "SCHEDULER_ENABLED", default_value = "true", action = ArgAction::Set)]
    pub scheduler_enabled: bool,

    /// Also refresh once at startup
    #[arg(long, env = "REFRESH_ON_STARTUP", default_value = "false", action = ArgAction::Set)]
    pub refresh_on_startup: bool,
}

impl Config {
    /// Resolve the command, defaulting to Serve if none specified.
    pub fn resolved_command(&self) -> Command {
        self.command.clone().unwrap_or_else(|| {
            Command::Serve(ServeArgs::parse_from(["serve"]))
        })
    }

    pub fn collector_settings(&self) -> CollectorSettings {
        CollectorSettings {
            user_agent: self.user_agent.clone(),
            timeout: Duration::from_secs(self.fetch_timeout_secs),
            naukri_base_url: self.naukri_base_url.clone(),
            linkedin_base_url: self.linkedin_base_url.clone(),
        }
    }
}
