use anyhow::{Context, Result};
use platform_db::DatabaseSettings;

#[derive(Clone, Debug, Default)]
pub struct AppConfig {
    pub database: DatabaseSettings,
    /// Empty means any origin.
    pub cors_allowed_origins: Vec<String>,
}

impl AppConfig {
    pub fn load() -> Result<Self> {
        let database = DatabaseSettings::from_env().context("loading MongoDB settings")?;
        let cors_allowed_origins = parse_origins(
            &std::env::var("CORS_ALLOWED_ORIGINS").unwrap_or_else(|_| "http://localhost:5173".into()),
        );
        Ok(Self {
            database,
            cors_allowed_origins,
        })
    }
}

fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .filter_map(|s| {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                None
            } else {
                Some(trimmed.to_string())
            }
        })
        .collect()
}
