//! Command-line interface definition.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use gymtrack_infrastructure::ClientConfig;
use gymtrack_infrastructure::config::{BASE_URL_VAR, ConfigError, DATA_DIR_VAR};

#[derive(Debug, Parser)]
#[command(
    name = "gymtrack",
    version,
    about = "GymTrack client",
    long_about = "Signs in to a GymTrack backend and browses exercises and training history."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Backend base URL (overrides GYMTRACK_BASE_URL)
    #[arg(long, global = true)]
    pub base_url: Option<String>,

    /// Directory holding the stored session (overrides GYMTRACK_DATA_DIR)
    #[arg(long, global = true)]
    pub data_dir: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,
}

#[derive(Debug, Subcommand, PartialEq, Eq)]
pub enum Command {
    /// Sign in and store the session
    SignIn {
        /// Account e-mail
        #[arg(long)]
        email: String,

        /// Account password
        #[arg(long, env = "GYMTRACK_PASSWORD", hide_env_values = true)]
        password: String,
    },

    /// Create an account, then sign in with it
    SignUp {
        /// Display name
        #[arg(long)]
        name: String,

        /// Account e-mail
        #[arg(long)]
        email: String,

        /// Initial password
        #[arg(long, env = "GYMTRACK_PASSWORD", hide_env_values = true)]
        password: String,
    },

    /// Forget the stored session
    SignOut,

    /// Show the signed-in user
    Whoami,

    /// List muscle groups
    Groups,

    /// List the exercises of a muscle group
    Exercises {
        /// Muscle group, as listed by `groups`
        group: String,
    },

    /// Show the signed-in user's training history
    History,

    /// Update the signed-in user's profile
    Profile {
        /// New display name
        #[arg(long)]
        name: String,

        /// Current password, required to set a new one
        #[arg(long, requires = "password")]
        old_password: Option<String>,

        /// New password
        #[arg(long, requires = "old_password")]
        password: Option<String>,
    },
}

impl Cli {
    /// Builds the client configuration, letting flags override the
    /// environment.
    pub fn config(&self) -> Result<ClientConfig, ConfigError> {
        let base_url = self.base_url.clone();
        let data_dir = self
            .data_dir
            .as_ref()
            .map(|dir| dir.to_string_lossy().into_owned());

        ClientConfig::from_lookup(|name| match name {
            BASE_URL_VAR if base_url.is_some() => base_url.clone(),
            DATA_DIR_VAR if data_dir.is_some() => data_dir.clone(),
            other => std::env::var(other).ok(),
        })
    }

    /// Default log filter when `RUST_LOG` is unset.
    pub const fn log_filter(&self) -> &'static str {
        if self.verbose { "debug" } else { "info" }
    }
}
