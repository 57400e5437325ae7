use anyhow::{Result, Context};
use mongodb::bson;

use crate::config::Config;
use crate::db_mongo::{self, models::*, queries};
use crate::version;

pub const INSERTED_STATION: &str = "Station 44025 - LLNR - 830";
pub const UPSERTED_STATION: &str = "Station 44026 - LLNR - 831";

/// Walk through connect, reset, index, insert, lookup and upserts against one collection.
pub async fn run(config: &Config) -> Result<()> {
    let client = db_mongo::create_client(&config.mongodb_uri).await?;
    version::ensure_compatible(&client).await?;

    let db = db_mongo::get_database(&client, &config.database);
    let collection = queries::stations(&db, &config.collection);

    queries::reset_collection(&collection).await?;
    queries::create_name_index(&collection).await?;

    let buoy = Station::new(INSERTED_STATION);
    queries::insert_station(&collection, &buoy).await?;

    let found = queries::find_station(&collection, &station_id(INSERTED_STATION)).await?;
    println!("Found buoy: {}", describe(found.as_ref())?);

    let wind_10 = Reading::new("wind", "10");
    let outcome = queries::upsert_reading(&collection, UPSERTED_STATION, &wind_10).await?;
    log_outcome("first upsert", &outcome);

    // Same reading again, only lastUpdate moves
    let outcome = queries::upsert_reading(&collection, UPSERTED_STATION, &wind_10).await?;
    log_outcome("repeated upsert", &outcome);

    let wind_20 = Reading::new("wind", "20");
    let outcome = queries::upsert_reading(&collection, UPSERTED_STATION, &wind_20).await?;
    log_outcome("new reading", &outcome);

    if let Some(station) = queries::find_station(&collection, &station_id(UPSERTED_STATION)).await? {
        tracing::info!("{} now holds {} readings", station.name, station.readings().len());
    }

    let total = queries::count_stations(&collection).await?;
    tracing::info!("Collection {} holds {} stations", config.collection, total);
    for station in queries::list_stations(&collection).await? {
        tracing::debug!("{} -> {:?}", station.id, station);
    }

    Ok(())
}

fn log_outcome(step: &str, outcome: &queries::UpsertOutcome) {
    tracing::info!(
        "{} on {}: matched={} modified={} inserted={}",
        step,
        UPSERTED_STATION,
        outcome.matched,
        outcome.modified,
        outcome.inserted
    );
}

/// Render a fetched station the way the server stores it.
fn describe(station: Option<&Station>) -> Result<String> {
    match station {
        Some(station) => {
            let doc = bson::to_document(station).context("Failed to encode station")?;
            Ok(doc.to_string())
        }
        None => Ok("None".to_string()),
    }
}
