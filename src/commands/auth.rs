//! Authentication commands for the SiteSync CLI.
//!
//! Provides login, logout, and status commands backed by the session file.

use clap::{Args, Subcommand};
use std::io::{self, Write};

use sitesync_core::{ApiClient, NetworkError, Session, SessionError, SessionStore};

use crate::config::Config;

/// Authentication commands
#[derive(Args)]
pub struct AuthCommand {
    #[command(subcommand)]
    command: AuthSubcommand,
}

#[derive(Subcommand)]
enum AuthSubcommand {
    /// Log in with username and password
    Login {
        /// Username (prompted if omitted)
        #[arg(long, short)]
        username: Option<String>,
    },
    /// Log out (remove the stored session)
    Logout,
    /// Show authentication status
    Status,
}

impl AuthCommand {
    pub async fn run(&self, config: &Config) -> Result<(), AuthError> {
        let mut session = Session::new(config.session_store());
        match &self.command {
            AuthSubcommand::Login { username } => {
                let client = ApiClient::new(config.api_options())?;
                login(&client, &mut session, username.clone()).await
            }
            AuthSubcommand::Logout => logout(&mut session),
            AuthSubcommand::Status => status(&session),
        }
    }
}

/// Errors that can occur during authentication
#[derive(Debug)]
pub enum AuthError {
    /// I/O error
    IoError(io::Error),
    /// The server rejected the login or could not be reached
    Network(NetworkError),
    /// Session file error
    Session(SessionError),
    /// Required input was empty
    EmptyInput(&'static str),
    /// Hidden terminal input failed
    Prompt(dialoguer::Error),
}

impl std::fmt::Display for AuthError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AuthError::IoError(e) => write!(f, "I/O error: {}", e),
            AuthError::Network(e) => write!(f, "Login failed: {}", e),
            AuthError::Session(e) => write!(f, "Session error: {}", e),
            AuthError::EmptyInput(what) => write!(f, "{} cannot be empty", what),
            AuthError::Prompt(e) => write!(f, "Prompt failed: {}", e),
        }
    }
}

impl std::error::Error for AuthError {}

impl From<io::Error> for AuthError {
    fn from(e: io::Error) -> Self {
        AuthError::IoError(e)
    }
}

impl From<NetworkError> for AuthError {
    fn from(e: NetworkError) -> Self {
        AuthError::Network(e)
    }
}

impl From<dialoguer::Error> for AuthError {
    fn from(e: dialoguer::Error) -> Self {
        AuthError::Prompt(e)
    }
}

impl From<SessionError> for AuthError {
    fn from(e: SessionError) -> Self {
        AuthError::Session(e)
    }
}

fn prompt(label: &'static str) -> Result<String, AuthError> {
    print!("{}: ", label);
    io::stdout().flush()?;
    let mut input = String::new();
    io::stdin().read_line(&mut input)?;
    let input = input.trim().to_string();
    if input.is_empty() {
        return Err(AuthError::EmptyInput(label));
    }
    Ok(input)
}

/// Interactive login flow
async fn login<S: SessionStore>(
    client: &ApiClient,
    session: &mut Session<S>,
    username: Option<String>,
) -> Result<(), AuthError> {
    let username = match username {
        Some(name) if !name.trim().is_empty() => name.trim().to_string(),
        _ => prompt("Username")?,
    };
    let password = dialoguer::Password::new()
        .with_prompt("Password")
        .interact()?;

    let response = client.login(&username, &password).await?;
    session.sign_in(&response.token, &response.user)?;
    tracing::debug!(user = %response.user.id, "signed in");

    println!("Logged in as {}", response.user.display_name());
    Ok(())
}

fn logout<S: SessionStore>(session: &mut Session<S>) -> Result<(), AuthError> {
    if !session.is_signed_in()? {
        println!("Already logged out.");
        return Ok(());
    }
    session.sign_out()?;
    println!("Logged out.");
    Ok(())
}

/// Keeps the first and last four characters of a token.
fn mask_token(token: &str) -> String {
    let chars: Vec<char> = token.chars().collect();
    if chars.len() > 8 {
        let head: String = chars[..4].iter().collect();
        let tail: String = chars[chars.len() - 4..].iter().collect();
        format!("{}...{}", head, tail)
    } else {
        "****".to_string()
    }
}

fn status<S: SessionStore>(session: &Session<S>) -> Result<(), AuthError> {
    match (session.token()?, session.user()?) {
        (Some(token), user) => {
            let masked = mask_token(&token);
            match user {
                Some(user) => println!(
                    "Logged in as {} ({}) (token: {})",
                    user.display_name(),
                    user.role.as_deref().unwrap_or("no role"),
                    masked
                ),
                None => println!("Logged in (token: {})", masked),
            }
        }
        (None, _) => println!("Not logged in. Run 'sitesync auth login' to authenticate."),
    }
    Ok(())
}
