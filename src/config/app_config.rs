use serde::Deserialize;

use crate::infrastructure::storage::PostgresConfig;
use crate::infrastructure::user::DiscordClientConfig;

/// Application configuration
#[derive(Debug, Clone, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub discord: DiscordConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DiscordConfig {
    pub api_base: String,
    pub bot_token: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        let postgres = PostgresConfig::default();

        Self {
            url: postgres.url,
            max_connections: postgres.max_connections,
            min_connections: postgres.min_connections,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::default(),
        }
    }
}

impl Default for DiscordConfig {
    fn default() -> Self {
        let client = DiscordClientConfig::default();

        Self {
            api_base: client.api_base,
            bot_token: client.bot_token,
        }
    }
}

impl DatabaseConfig {
    /// Pool configuration for the storage layer
    pub fn postgres(&self) -> PostgresConfig {
        PostgresConfig::new(&self.url)
            .with_max_connections(self.max_connections)
            .with_min_connections(self.min_connections)
    }
}

impl DiscordConfig {
    /// Client configuration for the Discord profile client
    pub fn client(&self) -> DiscordClientConfig {
        DiscordClientConfig {
            api_base: self.api_base.clone(),
            bot_token: self.bot_token.clone(),
        }
    }
}

impl AppConfig {
    pub fn load() -> Result<Self, config::ConfigError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name("config/local").required(false))
            .add_source(
                config::Environment::with_prefix("APP")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();

        assert_eq!(config.logging.level, "info");
        assert_eq!(config.database.max_connections, 10);
        assert!(config.discord.api_base.starts_with("https://discord.com"));
        assert!(config.discord.bot_token.is_empty());
    }

    #[test]
    fn test_database_to_postgres_config() {
        let database = DatabaseConfig {
            url: "postgres://db/registry".to_string(),
            max_connections: 4,
            min_connections: 2,
        };

        let postgres = database.postgres();
        assert_eq!(postgres.url, "postgres://db/registry");
        assert_eq!(postgres.max_connections, 4);
        assert_eq!(postgres.min_connections, 2);
    }
}
