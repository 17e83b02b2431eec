//! Postgres pool and schema setup for the `postgres` storage backend.

use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use std::time::Duration;

/// Pool settings, filled from the `[database]` config section.
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub connect_timeout_secs: u64,
    pub idle_timeout_secs: u64,
}

impl DatabaseConfig {
    /// Connection URL with any password replaced, for logging.
    pub fn redacted_url(&self) -> String {
        match (self.url.find("://"), self.url.rfind('@')) {
            (Some(scheme_end), Some(at)) if at > scheme_end => {
                let credentials = &self.url[scheme_end + 3..at];
                let user = credentials.split(':').next().unwrap_or_default();
                format!("{}{}:***{}", &self.url[..scheme_end + 3], user, &self.url[at..])
            }
            _ => self.url.clone(),
        }
    }
}

/// Opens the pool and applies the bundled migrations.
pub async fn connect(config: &DatabaseConfig) -> Result<PgPool, sqlx::Error> {
    tracing::info!(
        url = %config.redacted_url(),
        max_connections = config.max_connections,
        "Connecting to Postgres"
    );
    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .acquire_timeout(Duration::from_secs(config.connect_timeout_secs))
        .idle_timeout(Duration::from_secs(config.idle_timeout_secs))
        .connect(&config.url)
        .await?;

    sqlx::migrate!("./src/migrations").run(&pool).await?;
    tracing::info!("Schema migrations applied");

    Ok(pool)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(url: &str) -> DatabaseConfig {
        DatabaseConfig {
            url: url.to_string(),
            max_connections: 5,
            min_connections: 1,
            connect_timeout_secs: 10,
            idle_timeout_secs: 600,
        }
    }

    #[test]
    fn test_redacted_url_hides_password() {
        assert_eq!(
            config("postgres://loop:s3cret@db:5432/loop").redacted_url(),
            "postgres://loop:***@db:5432/loop"
        );
    }

    #[test]
    fn test_redacted_url_without_credentials() {
        assert_eq!(
            config("postgres://db/loop").redacted_url(),
            "postgres://db/loop"
        );
    }
}
