//! Configuration module.
//!
//! Loads configuration from environment variables.

use std::env;

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Address the HTTP listener binds to.
    pub bind_addr: String,

    // MongoDB
    pub mongodb_uri: String,
    pub mongodb_database: String,

    /// Quarantine window per severity level, in seconds.
    /// Must be strictly increasing; invalid tables fall back to defaults.
    pub quarantine_levels: Vec<i64>,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// # Panics
    /// Panics if required environment variables are not set.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let quarantine_levels = env::var("QUARANTINE_LEVELS")
            .map(|s| parse_levels(&s))
            .unwrap_or_default();

        Self {
            bind_addr: env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:8080".to_string()),
            mongodb_uri: env::var("MONGODB_URI").expect("MONGODB_URI must be set"),
            mongodb_database: env::var("MONGODB_DATABASE")
                .unwrap_or_else(|_| "pairwatch".to_string()),
            quarantine_levels,
        }
    }
}

/// Parse a comma-separated seconds table ("3600,21600,86400").
/// Non-numeric entries are skipped; validity is checked by the policy.
fn parse_levels(raw: &str) -> Vec<i64> {
    raw.split(',')
        .filter_map(|s| s.trim().parse::<i64>().ok())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_csv_tables() {
        assert_eq!(parse_levels("300,600,1200"), vec![300, 600, 1200]);
        assert_eq!(parse_levels(" 300 , 600 "), vec![300, 600]);
        assert_eq!(parse_levels("300,abc,600"), vec![300, 600]);
        assert!(parse_levels("").is_empty());
    }
}
