use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::error::AuthError;
use crate::storage::Store;

/// A signed-in admin session, persisted next to the data files.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Session {
    pub email: String,
    pub signed_in_at: DateTime<Utc>,
}

/// Signs in with email and password against the configured admin account.
pub fn sign_in(store: &Store, config: &Config, email: &str, password: &str) -> Result<Session, AuthError> {
    let email = email.trim();
    if !email.eq_ignore_ascii_case(&config.admin_email) || password != config.admin_password {
        tracing::warn!(email, "rejected sign-in");
        return Err(AuthError::InvalidCredentials);
    }

    let session = Session {
        email: config.admin_email.clone(),
        signed_in_at: Utc::now(),
    };
    store.write_json(&store.session_path(), &session, "session")?;
    tracing::info!(email = %session.email, "signed in");
    Ok(session)
}

/// Returns the current session, if any.
pub fn current_session(store: &Store) -> Result<Option<Session>, AuthError> {
    Ok(store.read_json(&store.session_path())?)
}

/// Like [`current_session`] but fails when nobody is signed in.
pub fn require_session(store: &Store) -> Result<Session, AuthError> {
    current_session(store)?.ok_or(AuthError::AuthenticationRequired)
}

/// Ends the current session. Signing out twice is not an error.
pub fn sign_out(store: &Store) -> Result<(), AuthError> {
    let path = store.session_path();
    if path.exists() {
        std::fs::remove_file(&path).map_err(crate::error::StoreError::from)?;
        tracing::info!("signed out");
    }
    Ok(())
}
