use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub database_url: String,
}

impl AppConfig {
    /// `DATABASE_URL` wins; otherwise the URL is composed from the individual
    /// `DB_*` variables.
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = match std::env::var("DATABASE_URL") {
            Ok(url) => url,
            Err(_) => {
                let host = std::env::var("DB_HOST").unwrap_or_else(|_| "localhost".into());
                let port = std::env::var("DB_PORT").unwrap_or_else(|_| "5432".into());
                let user = std::env::var("DB_USER").unwrap_or_else(|_| "postgres".into());
                let password = std::env::var("DB_PASSWORD").unwrap_or_default();
                let name = std::env::var("DB_NAME").unwrap_or_else(|_| "postgres".into());
                format!("postgres://{user}:{password}@{host}:{port}/{name}")
            }
        };
        Ok(Self { database_url })
    }
}
