//! User management commands.
//!
//! # Usage
//!
//! ```bash
//! # Create an admin account
//! crewdesk-cli user create -e admin@example.com -n "Site Admin" -p <password> -r admin
//!
//! # Create an employee account
//! crewdesk-cli user create -e worker@example.com -n "A. Worker" -p <password>
//! ```
//!
//! # Environment Variables
//!
//! - `CREWDESK_DATABASE_URL` - `PostgreSQL` connection string

use secrecy::SecretString;
use thiserror::Error;

use crewdesk_core::{Email, Role};
use crewdesk_server::auth::{self, AuthError};
use crewdesk_server::db::{self, RepositoryError, users};

/// Errors that can occur during user management.
#[derive(Debug, Error)]
pub enum UserError {
    /// Required environment variable is missing.
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(&'static str),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] RepositoryError),

    /// Connection error.
    #[error("Connection error: {0}")]
    Connection(#[from] sqlx::Error),

    /// Invalid role.
    #[error("Invalid role: {0}. Valid roles: admin, employee")]
    InvalidRole(String),

    /// Invalid email.
    #[error("Invalid email: {0}")]
    InvalidEmail(String),

    /// Password hashing failed.
    #[error("Hashing error: {0}")]
    Hashing(#[from] AuthError),
}

/// Create a new user account.
///
/// # Errors
///
/// Returns a [`UserError`] if the input is invalid, the email is
/// already registered, or the database is unreachable.
pub async fn create(email: &str, name: &str, password: &str, role: &str) -> Result<(), UserError> {
    dotenvy::dotenv().ok();

    let email = Email::parse(email).map_err(|e| UserError::InvalidEmail(e.to_string()))?;
    let role = match role {
        "admin" => Role::Admin,
        "employee" => Role::Employee,
        other => return Err(UserError::InvalidRole(other.to_owned())),
    };

    let database_url = std::env::var("CREWDESK_DATABASE_URL")
        .map_err(|_| UserError::MissingEnvVar("CREWDESK_DATABASE_URL"))?;

    tracing::info!("Connecting to database...");
    let pool = db::create_pool(&SecretString::from(database_url)).await?;

    let password_hash = auth::hash_password(password).await?;
    let user = users::create_user(&pool, email.as_str(), &password_hash, name, role).await?;

    tracing::info!(
        "User created successfully! ID: {}, Email: {}, Role: {:?}",
        user.id,
        user.email,
        user.role
    );
    Ok(())
}
