//! Local sign-in session.
//!
//! A session is a small JSON file next to the diary. It exists while the
//! user is signed in and stops counting once it expires. Reading it is
//! synchronous so the login guard can consult it from the input handler.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Duration, Utc};
use color_eyre::Result;
use color_eyre::eyre::{WrapErr, eyre};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::config::AuthConfig;
use crate::overlay::AuthStatus;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub username: String,
    pub signed_in_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl Session {
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}

#[derive(Debug, Clone)]
pub struct SessionStore {
    path: PathBuf,
    auth: AuthConfig,
}

impl SessionStore {
    pub fn new(path: impl Into<PathBuf>, auth: AuthConfig) -> Self {
        Self {
            path: path.into(),
            auth,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The live session, if any.
    ///
    /// A missing or expired session is `None`. A file that cannot be read or
    /// parsed is an error; the caller decides how to treat it.
    pub fn current(&self) -> Result<Option<Session>> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(err) => {
                return Err(err).wrap_err_with(|| {
                    format!("Failed to read session at {}", self.path.display())
                });
            }
        };
        let session: Session = serde_json::from_str(&content)
            .wrap_err_with(|| format!("Failed to parse session at {}", self.path.display()))?;

        if session.is_expired_at(Utc::now()) {
            debug!(username = %session.username, "Session expired");
            return Ok(None);
        }
        Ok(Some(session))
    }

    /// Check the credentials and start a new session.
    pub async fn sign_in(&self, username: &str, password: &str) -> Result<Session> {
        let username = username.trim();
        if username.is_empty() || password.is_empty() {
            return Err(eyre!("Username and password are required"));
        }
        if let (Some(expected_user), Some(expected_password)) =
            (&self.auth.username, &self.auth.password)
            && (username != expected_user || password != expected_password)
        {
            return Err(eyre!("Invalid username or password"));
        }

        let now = Utc::now();
        let hours = self.auth.session_hours.max(1);
        let expires_at = Duration::try_hours(hours)
            .and_then(|length| now.checked_add_signed(length))
            .ok_or_else(|| eyre!("Session length of {hours} hours is out of range"))?;
        let session = Session {
            username: username.to_string(),
            signed_in_at: now,
            expires_at,
        };

        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&self.path, serde_json::to_string_pretty(&session)?)
            .await
            .wrap_err_with(|| format!("Failed to write session at {}", self.path.display()))?;

        info!(username = %session.username, expires_at = %session.expires_at, "Signed in");
        Ok(session)
    }

    /// End the session. Signing out while signed out is a no-op.
    pub async fn sign_out(&self) -> Result<()> {
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => {
                info!("Signed out");
                Ok(())
            }
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err)
                .wrap_err_with(|| format!("Failed to remove session at {}", self.path.display())),
        }
    }
}

impl AuthStatus for SessionStore {
    fn is_authenticated(&self) -> Result<bool> {
        Ok(self.current()?.is_some())
    }
}
