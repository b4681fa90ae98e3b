//! Auth service
//!
//! Registration, login, and profile lookup built on the credential
//! store and the token issuer.

use std::sync::Arc;

use argon2::Argon2;
use argon2::password_hash::{
    PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng,
};
use chrono::Utc;

use crate::auth::issue_access_token;
use crate::data::{Database, EntityId, User, UserSummary};
use crate::error::AppError;
use crate::metrics::USERS_TOTAL;

const MIN_PASSWORD_CHARS: usize = 6;

/// A single failed field check
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: &'static str,
    pub message: &'static str,
}

fn field_error(field: &'static str, message: &'static str) -> FieldError {
    FieldError { field, message }
}

/// Basic email shape check: one `@`, word/dot/dash parts, dotted domain
/// with an alphabetic top-level label.
fn is_valid_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.is_empty() {
        return false;
    }

    let valid_part = |part: &str| {
        !part.starts_with('.')
            && !part.ends_with('.')
            && !part.contains("..")
            && part
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_'))
    };
    if !valid_part(local) || !valid_part(domain) {
        return false;
    }

    let Some((_, tld)) = domain.rsplit_once('.') else {
        return false;
    };
    tld.len() >= 2 && tld.chars().all(|c| c.is_ascii_alphabetic())
}

/// Validate a registration request field by field
///
/// Returns every failed field so the caller can join them into a single
/// human-readable message.
pub fn validate_registration(
    username: &str,
    email: &str,
    password: &str,
) -> Result<(), Vec<FieldError>> {
    let mut errors = Vec::new();

    if username.is_empty() {
        errors.push(field_error("username", "Please provide a username"));
    }

    if email.is_empty() {
        errors.push(field_error("email", "Please provide an email"));
    } else if !is_valid_email(email) {
        errors.push(field_error("email", "Please provide a valid email"));
    }

    if password.is_empty() {
        errors.push(field_error("password", "Please provide a password"));
    } else if password.chars().count() < MIN_PASSWORD_CHARS {
        errors.push(field_error(
            "password",
            "Password must be at least 6 characters long",
        ));
    }

    if errors.is_empty() { Ok(()) } else { Err(errors) }
}

fn join_field_errors(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(|e| e.message)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Hash a password with Argon2 on a blocking worker thread
async fn hash_password(password: String) -> Result<String, AppError> {
    tokio::task::spawn_blocking(move || -> Result<String, AppError> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| AppError::Encryption(e.to_string()))?;
        Ok(hash.to_string())
    })
    .await
    .map_err(|e| AppError::Internal(e.into()))?
}

/// Verify a password against a stored Argon2 hash
///
/// An unparseable stored hash counts as a mismatch.
async fn verify_password(password: String, hash: String) -> Result<bool, AppError> {
    tokio::task::spawn_blocking(move || -> Result<bool, AppError> {
        let parsed_hash = match PasswordHash::new(&hash) {
            Ok(p) => p,
            Err(_) => return Ok(false),
        };
        Ok(Argon2::default()
            .verify_password(password.as_bytes(), &parsed_hash)
            .is_ok())
    })
    .await
    .map_err(|e| AppError::Internal(e.into()))?
}

/// Auth service
pub struct AuthService {
    db: Arc<Database>,
    token_secret: String,
    token_max_age: i64,
}

impl AuthService {
    /// Create new auth service
    pub fn new(db: Arc<Database>, token_secret: String, token_max_age: i64) -> Self {
        Self {
            db,
            token_secret,
            token_max_age,
        }
    }

    /// Register a new user
    ///
    /// # Steps
    /// 1. Validate fields (username, email shape, password length)
    /// 2. Probe for an existing user on either unique field
    /// 3. Hash the password and insert the user
    /// 4. Issue an access token
    ///
    /// # Errors
    /// Validation failure joins the per-field messages; a collision
    /// reports which field collided, preferring the email message when
    /// both do.
    pub async fn register(
        &self,
        username: &str,
        email: &str,
        password: &str,
    ) -> Result<(UserSummary, String), AppError> {
        let username = username.trim();
        let email = email.trim().to_lowercase();

        validate_registration(username, &email, password)
            .map_err(|errors| AppError::Validation(join_field_errors(&errors)))?;

        if let Some(existing) = self.db.find_conflicting_user(&email, username).await? {
            let message = if existing.email == email {
                "Email already in use."
            } else {
                "Username already taken."
            };
            return Err(AppError::Duplicate(message.to_string()));
        }

        let password_hash = hash_password(password.to_string()).await?;

        let user = User {
            id: EntityId::new().0,
            username: username.to_string(),
            email,
            password_hash,
            created_at: Utc::now(),
        };
        self.db.insert_user(&user).await?;
        USERS_TOTAL.inc();

        tracing::info!(username = %user.username, "User registered");

        let token = issue_access_token(&user.id, &self.token_secret, self.token_max_age)?;

        Ok((user.into(), token))
    }

    /// Authenticate a user and issue a token
    ///
    /// Looks the identifier up as an email (lowercased) or a username.
    /// An unknown identifier and a wrong password both produce the same
    /// generic error; the unknown-identifier path still burns a hash so
    /// the two take comparable time.
    pub async fn login(
        &self,
        identifier: &str,
        password: &str,
    ) -> Result<(UserSummary, String), AppError> {
        if identifier.trim().is_empty() || password.is_empty() {
            return Err(AppError::Validation(
                "Please provide email/username and password".to_string(),
            ));
        }

        let Some(user) = self.db.find_user_by_identifier(identifier).await? else {
            let _ = hash_password(password.to_string()).await;
            return Err(AppError::InvalidCredentials);
        };

        if !verify_password(password.to_string(), user.password_hash.clone()).await? {
            return Err(AppError::InvalidCredentials);
        }

        let token = issue_access_token(&user.id, &self.token_secret, self.token_max_age)?;

        Ok((user.into(), token))
    }

    /// Get a user's profile summary
    pub async fn get_profile(&self, user_id: &str) -> Result<UserSummary, AppError> {
        let user = self
            .db
            .get_user(user_id)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

        Ok(user.into())
    }
}
