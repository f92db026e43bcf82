//! Discord profile client
//!
//! Fetches the external Discord profile attached to a user. Lookups are
//! best-effort from the registry's point of view: enrichment paths log and
//! continue when a fetch fails.

use std::time::Duration;

use reqwest::Client;

use crate::domain::user::{DiscordProfile, UserId};
use crate::domain::RegistryError;

/// Discord API configuration
#[derive(Debug, Clone)]
pub struct DiscordClientConfig {
    /// Base URL of the Discord API
    pub api_base: String,
    /// Bot token used for profile lookups
    pub bot_token: String,
}

impl Default for DiscordClientConfig {
    fn default() -> Self {
        Self {
            api_base: "https://discord.com/api/v10".to_string(),
            bot_token: String::new(),
        }
    }
}

/// HTTP client for Discord profile lookups
#[derive(Debug, Clone)]
pub struct DiscordClient {
    http: Client,
    api_base: String,
    bot_token: String,
}

impl DiscordClient {
    /// Create a new client from configuration
    pub fn new(config: DiscordClientConfig) -> Self {
        let http = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            http,
            api_base: config.api_base.trim_end_matches('/').to_string(),
            bot_token: config.bot_token,
        }
    }

    /// Fetch a user's Discord profile
    pub async fn fetch(&self, id: UserId) -> Result<DiscordProfile, RegistryError> {
        let url = format!("{}/users/{}", self.api_base, id);

        let response = self
            .http
            .get(&url)
            .header("Authorization", format!("Bot {}", self.bot_token))
            .send()
            .await
            .map_err(|e| RegistryError::storage(format!("Discord request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(RegistryError::storage(format!(
                "Discord returned status {} for user '{}'",
                response.status(),
                id
            )));
        }

        response
            .json::<DiscordProfile>()
            .await
            .map_err(|e| RegistryError::storage(format!("Invalid Discord profile payload: {}", e)))
    }
}
