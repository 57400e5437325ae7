pub mod models;
pub mod queries;

use anyhow::{Result, Context};
use mongodb::{Client, Database, bson::doc};

/// Create MongoDB connection
pub async fn create_client(uri: &str) -> Result<Client> {
    let client = Client::with_uri_str(uri)
        .await
        .context("Failed to connect to MongoDB")?;

    // Ping to verify connection
    client
        .database("admin")
        .run_command(doc! {"ping": 1})
        .await
        .context("Failed to ping MongoDB")?;

    tracing::info!("Successfully connected to MongoDB at {}", uri);
    Ok(client)
}

/// Get database handle
pub fn get_database(client: &Client, db_name: &str) -> Database {
    client.database(db_name)
}

/// Version string the server reports through `buildInfo`, if any.
pub async fn server_version(client: &Client) -> Result<Option<String>> {
    let info = client
        .database("admin")
        .run_command(doc! {"buildInfo": 1})
        .await
        .context("Failed to run buildInfo")?;

    Ok(info.get_str("version").ok().map(|v| v.to_string()))
}
