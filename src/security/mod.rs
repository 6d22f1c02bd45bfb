use crate::config::{SecurityConfig, PLACEHOLDER_ADMIN_TOKEN};
use crate::error::Error;
use log::warn;

pub mod auth;

/// Shared-secret check in front of every admin route
#[derive(Debug, Clone)]
pub struct AdminGate {
    config: SecurityConfig,
}

impl AdminGate {
    /// Create a new admin gate
    pub fn new(config: SecurityConfig) -> Self {
        Self { config }
    }

    /// Whether the configured secret is empty or still the shipped default
    pub fn is_placeholder(&self) -> bool {
        self.config.admin_token.is_empty() || self.config.admin_token == PLACEHOLDER_ADMIN_TOKEN
    }

    /// Compare the supplied token with the configured secret.
    ///
    /// A missing token is compared as the empty string. Running with the placeholder
    /// secret is allowed but warned about on every call.
    pub fn check(&self, supplied: Option<&str>) -> Result<(), Error> {
        if self.is_placeholder() {
            warn!("ADMIN_TOKEN is not set or left as default. Set ADMIN_TOKEN in environment for security.");
        }

        if supplied.unwrap_or("") != self.config.admin_token {
            return Err(Error::Unauthorized);
        }

        Ok(())
    }
}
