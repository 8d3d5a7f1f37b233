use crate::error::ConfigError;

const DEFAULT_KEEPALIVE_PORT: u16 = 8080;

pub struct Config {
    pub token: String,
    pub keepalive_port: u16,
    pub keepalive_url: Option<String>,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        let token = std::env::var("DISCORD_TOKEN")
            .map_err(|_| ConfigError::MissingEnvVar("DISCORD_TOKEN".to_string()))?;

        let keepalive_port = match std::env::var("KEEPALIVE_PORT") {
            Ok(raw) => raw.parse().map_err(|_| {
                ConfigError::InvalidEnvVar(
                    "KEEPALIVE_PORT".to_string(),
                    format!("`{raw}` is not a port number"),
                )
            })?,
            Err(_) => DEFAULT_KEEPALIVE_PORT,
        };

        Ok(Self {
            token,
            keepalive_port,
            keepalive_url: std::env::var("KEEPALIVE_URL").ok(),
        })
    }
}
