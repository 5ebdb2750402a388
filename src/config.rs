use std::env;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub backend_url: String,
    pub backend_api_key: String,
    pub bind_addr: String,
}

#[derive(Debug, thiserror::Error)]
#[error("missing required environment variable {0}")]
pub struct MissingVar(&'static str);

impl AppConfig {
    pub fn from_env() -> Result<Self, MissingVar> {
        Ok(AppConfig {
            backend_url: require("BACKEND_URL")?,
            backend_api_key: require("BACKEND_API_KEY")?,
            bind_addr: env::var("BIND_ADDR").unwrap_or_else(|_| "127.0.0.1:8080".to_string()),
        })
    }
}

fn require(name: &'static str) -> Result<String, MissingVar> {
    env::var(name).map_err(|_| MissingVar(name))
}
