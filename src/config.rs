const DEFAULT_MONGODB_URI: &str = "mongodb://localhost:27017";
const DEFAULT_DATABASE: &str = "test";
const DEFAULT_COLLECTION: &str = "rustExample";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub mongodb_uri: String,
    pub database: String,
    pub collection: String,
}

impl Config {
    /// Read settings from the environment, falling back to a local server.
    pub fn from_env() -> Self {
        Self {
            mongodb_uri: std::env::var("MONGODB_URI")
                .unwrap_or_else(|_| DEFAULT_MONGODB_URI.to_string()),
            database: std::env::var("MONGODB_DATABASE")
                .unwrap_or_else(|_| DEFAULT_DATABASE.to_string()),
            collection: std::env::var("MONGODB_COLLECTION")
                .unwrap_or_else(|_| DEFAULT_COLLECTION.to_string()),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            mongodb_uri: DEFAULT_MONGODB_URI.to_string(),
            database: DEFAULT_DATABASE.to_string(),
            collection: DEFAULT_COLLECTION.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_points_at_local_server() {
        let config = Config::default();
        assert_eq!(config.mongodb_uri, "mongodb://localhost:27017");
        assert_eq!(config.database, "test");
        assert_eq!(config.collection, "rustExample");
    }
}
