use crate::error::PlanError;

pub const SERVER_ENV: &str = "IMMICH_SERVER";
pub const TOKEN_ENV: &str = "IMMICH_TOKEN";

/// Connection settings for the Immich server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub server: String,
    pub api_key: String,
}

impl Config {
    /// Validate the settings gathered from flags or the environment. Empty
    /// values count as missing; the token is checked first.
    pub fn new(server: Option<String>, api_key: Option<String>) -> Result<Self, PlanError> {
        let api_key = api_key
            .filter(|v| !v.is_empty())
            .ok_or(PlanError::MissingSetting(TOKEN_ENV))?;
        let server = server
            .filter(|v| !v.is_empty())
            .ok_or(PlanError::MissingSetting(SERVER_ENV))?;
        Ok(Config {
            server: server.trim_end_matches('/').to_owned(),
            api_key,
        })
    }
}
