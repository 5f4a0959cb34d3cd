use std::path::PathBuf;

use anyhow::bail;
use clap::Parser;
use timeline_engine::Credentials;

use crate::config::AppConfig;

#[derive(Debug, Parser)]
#[command(
    name = "timeline-harvest",
    version,
    about = "Collect every post on a public profile timeline into a text file"
)]
pub struct Cli {
    /// Profile handle, with or without the leading `@`
    pub subject: String,
    /// Run the browser without a window
    #[arg(long)]
    pub headless: bool,
    /// Directory for the output file
    #[arg(long, value_name = "DIR")]
    pub output_dir: Option<PathBuf>,
    /// RON settings file
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,
    /// Consecutive non-progressing attempts before stopping
    #[arg(long, value_name = "N")]
    pub retry_ceiling: Option<u32>,
    /// Account to sign in with before harvesting
    #[arg(long, env = "TIMELINE_LOGIN_USER", value_name = "USER")]
    pub login_user: Option<String>,
    #[arg(
        long,
        env = "TIMELINE_LOGIN_PASSWORD",
        value_name = "PASSWORD",
        hide_env_values = true
    )]
    pub login_password: Option<String>,
    #[arg(long, value_name = "FILE", default_value = "timeline_harvest.log")]
    pub log_file: PathBuf,
    /// Debug-level logging
    #[arg(long, short)]
    pub verbose: bool,
}

impl Cli {
    /// Flags win over the settings file.
    pub fn apply_overrides(&self, config: &mut AppConfig) {
        if self.headless {
            config.session.headless = true;
        }
        if let Some(dir) = &self.output_dir {
            config.harvest.output_dir = dir.clone();
        }
        if let Some(ceiling) = self.retry_ceiling {
            config.harvest.retry_ceiling = ceiling;
        }
    }

    pub fn credentials(&self) -> anyhow::Result<Option<Credentials>> {
        match (&self.login_user, &self.login_password) {
            (Some(username), Some(password)) => Ok(Some(Credentials {
                username: username.clone(),
                password: password.clone(),
            })),
            (None, None) => Ok(None),
            (Some(_), None) => bail!("--login-user given without --login-password"),
            (None, Some(_)) => bail!("--login-password given without --login-user"),
        }
    }
}
