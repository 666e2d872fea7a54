//! Command execution.

use std::sync::Arc;

use gymtrack_application::{ApiClient, ApiError, AuthSession, TransportError};
use gymtrack_domain::{NewUser, ProfileUpdate, UserDto, total_entries};
use gymtrack_infrastructure::{
    ClientConfig, ConfigError, FileTokenStore, FileUserStore, ReqwestTransport,
    SerializationError, TokioFileSystem, to_json_pretty,
};
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info};

use crate::cli::Command;

/// Errors reported to the user before exiting.
#[derive(Debug, Error)]
pub enum CliError {
    /// Configuration could not be loaded.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The HTTP client could not be created.
    #[error("could not create HTTP client: {0}")]
    Transport(#[from] TransportError),

    /// The backend call failed.
    #[error(transparent)]
    Api(#[from] ApiError),

    /// The command needs a stored session.
    #[error("not signed in; run `gymtrack sign-in` first")]
    NotSignedIn,

    /// Output could not be rendered.
    #[error("could not render output: {0}")]
    Output(#[from] SerializationError),

    /// Nothing to update.
    #[error("nothing changed")]
    NothingChanged,
}

/// Wires the adapters for `config` into a session.
///
/// # Errors
///
/// Returns an error if the HTTP client cannot be created.
pub fn connect(config: &ClientConfig) -> Result<AuthSession, CliError> {
    let transport = Arc::new(ReqwestTransport::from_config(config)?);
    let tokens = Arc::new(FileTokenStore::new(TokioFileSystem::new(), &config.data_dir));
    let users = Arc::new(FileUserStore::new(TokioFileSystem::new(), &config.data_dir));
    let client = ApiClient::new(transport, tokens.clone());
    Ok(AuthSession::new(client, tokens, users))
}

/// Runs one command against a loaded session and returns what to print.
///
/// # Errors
///
/// Returns the failure to report. When the failure ended the session, the
/// stored session has already been erased.
pub async fn execute(session: &AuthSession, command: Command) -> Result<String, CliError> {
    let result = dispatch(session, command).await;
    if let Err(CliError::Api(error)) = &result
        && error.ended_session()
    {
        info!("session ended by the backend");
        session.sign_out().await?;
    }
    result
}

async fn dispatch(session: &AuthSession, command: Command) -> Result<String, CliError> {
    let user = session.load().await;
    debug!(signed_in = user.is_some(), "session loaded");

    match command {
        Command::SignIn { email, password } => {
            let user = session.sign_in(&email, &password).await?;
            render(&user)
        }
        Command::SignUp {
            name,
            email,
            password,
        } => {
            let new_user = NewUser {
                name,
                email,
                password,
            };
            session.client().create_user(&new_user).await?;
            let user = session.sign_in(&new_user.email, &new_user.password).await?;
            render(&user)
        }
        Command::SignOut => {
            session.sign_out().await?;
            Ok("signed out".to_string())
        }
        Command::Whoami => render(&signed_in(user)?),
        Command::Groups => render(&session.client().groups().await?),
        Command::Exercises { group } => {
            let exercises = session.client().exercises_by_group(&group).await?;
            debug!(group = %group, count = exercises.len(), "exercises listed");
            render(&exercises)
        }
        Command::History => {
            let user = signed_in(user)?;
            let sections = session.client().history(&user.id).await?;
            debug!(entries = total_entries(&sections), "history loaded");
            render(&sections)
        }
        Command::Profile {
            name,
            old_password,
            password,
        } => {
            let user = signed_in(user)?;
            let mut update = ProfileUpdate::rename(&user.id, name);
            if let (Some(old), Some(new)) = (old_password, password) {
                update = update.with_password(old, new);
            } else if update.name == user.name {
                return Err(CliError::NothingChanged);
            }
            let updated = session.update_profile(&update).await?;
            render(&updated.unwrap_or(user))
        }
    }
}

fn signed_in(user: Option<UserDto>) -> Result<UserDto, CliError> {
    user.ok_or(CliError::NotSignedIn)
}

fn render<T: Serialize>(value: &T) -> Result<String, CliError> {
    Ok(to_json_pretty(value)?)
}
