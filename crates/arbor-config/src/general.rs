//! General application configuration.

use serde::{Deserialize, Serialize};

use crate::ConfigError;

/// Default result limit.
const fn default_limit() -> u32 {
    20
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GeneralConfig {
    /// Identifier recorded in the usage log (e.g., an email address).
    #[serde(default)]
    pub user: String,

    /// Default result limit for list/search commands.
    #[serde(default = "default_limit")]
    pub default_limit: u32,
}

impl GeneralConfig {
    #[must_use]
    pub fn has_user(&self) -> bool {
        !self.user.trim().is_empty()
    }

    /// The configured user identifier.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::NotConfigured` if no user is set.
    pub fn require_user(&self) -> Result<&str, ConfigError> {
        if self.has_user() {
            Ok(self.user.trim())
        } else {
            Err(ConfigError::NotConfigured {
                section: "general.user".into(),
            })
        }
    }
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            user: String::new(),
            default_limit: default_limit(),
        }
    }
}
