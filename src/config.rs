//! Credential configuration.
//!
//! The account key is read from the environment exactly once, at startup,
//! and handed to the server state explicitly. Nothing else reads
//! `LTA_ACCOUNT_KEY`, so the missing-credential branch can be tested
//! without mutating process state.

/// DataMall credential configuration.
#[derive(Debug, Clone, Default)]
pub struct ProxyConfig {
    /// The `AccountKey` value attached to upstream requests. `None` when
    /// the variable is unset; the traffic endpoint then answers 500.
    pub account_key: Option<String>,
}

impl ProxyConfig {
    /// Load the credential from `LTA_ACCOUNT_KEY`.
    ///
    /// An empty value counts as unset.
    pub fn from_env() -> Self {
        let account_key = std::env::var("LTA_ACCOUNT_KEY")
            .ok()
            .filter(|v| !v.is_empty());

        Self { account_key }
    }

    /// Create a config with an explicit account key.
    pub fn with_account_key(key: impl Into<String>) -> Self {
        Self {
            account_key: Some(key.into()),
        }
    }
}
