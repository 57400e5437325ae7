use anyhow::{Result, Context};
use futures_util::TryStreamExt;
use mongodb::{
    Collection, Database, IndexModel,
    bson::{self, DateTime, doc},
    options::IndexOptions,
    results::UpdateResult,
};
use super::models::*;

/// What a single upsert did to the collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UpsertOutcome {
    pub matched: u64,
    pub modified: u64,
    pub inserted: bool,
}

impl From<UpdateResult> for UpsertOutcome {
    fn from(result: UpdateResult) -> Self {
        Self {
            matched: result.matched_count,
            modified: result.modified_count,
            inserted: result.upserted_id.is_some(),
        }
    }
}

pub fn stations(db: &Database, collection_name: &str) -> Collection<Station> {
    db.collection::<Station>(collection_name)
}

/// Drop the collection so every run starts from nothing.
pub async fn reset_collection(collection: &Collection<Station>) -> Result<()> {
    collection
        .drop()
        .await
        .with_context(|| format!("Failed to drop collection {}", collection.name()))?;

    tracing::info!("Dropped collection {}", collection.name());
    Ok(())
}

/// Descending index on `name`. Returns the index name the server assigned.
pub async fn create_name_index(collection: &Collection<Station>) -> Result<String> {
    let index = IndexModel::builder()
        .keys(doc! { "name": -1 })
        .options(IndexOptions::builder().name("name_-1".to_string()).build())
        .build();

    let result = collection
        .create_index(index)
        .await
        .context("Failed to create index on name")?;

    tracing::info!("Created index {}", result.index_name);
    Ok(result.index_name)
}

pub async fn insert_station(collection: &Collection<Station>, station: &Station) -> Result<()> {
    collection
        .insert_one(station)
        .await
        .with_context(|| format!("Failed to insert station {}", station.name))?;

    tracing::debug!("Inserted station {} as {}", station.name, station.id);
    Ok(())
}

pub async fn find_station(
    collection: &Collection<Station>,
    station_id: &str,
) -> Result<Option<Station>> {
    let station = collection
        .find_one(doc! { "_id": station_id })
        .await
        .with_context(|| format!("Failed to look up station {}", station_id))?;

    Ok(station)
}

/// Create the station if missing, refresh its name and timestamp, and add
/// `reading` to its `data` set.
pub async fn upsert_reading(
    collection: &Collection<Station>,
    name: &str,
    reading: &Reading,
) -> Result<UpsertOutcome> {
    let reading = bson::to_bson(reading).context("Failed to encode reading")?;

    let result = collection
        .update_one(
            doc! { "_id": station_id(name) },
            doc! {
                "$set": {
                    "name": name,
                    "lastUpdate": DateTime::now(),
                },
                "$addToSet": { "data": reading },
            },
        )
        .upsert(true)
        .await
        .with_context(|| format!("Failed to upsert station {}", name))?;

    Ok(result.into())
}

/// All stations, newest name first (served by the `name` index).
pub async fn list_stations(collection: &Collection<Station>) -> Result<Vec<Station>> {
    let cursor = collection
        .find(doc! {})
        .sort(doc! { "name": -1 })
        .await
        .context("Failed to list stations")?;

    let stations: Vec<Station> = cursor
        .try_collect()
        .await
        .context("Failed to read stations cursor")?;

    Ok(stations)
}

pub async fn count_stations(collection: &Collection<Station>) -> Result<u64> {
    let count = collection
        .count_documents(doc! {})
        .await
        .context("Failed to count stations")?;

    Ok(count)
}
