use serde::{Deserialize, Serialize};
use mongodb::bson::DateTime;

/// Derive a station's `_id` from its human-readable name.
///
/// Lowercase hex MD5 of the name, so the same name always lands on the same document.
pub fn station_id(name: &str) -> String {
    format!("{:x}", md5::compute(name.as_bytes()))
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reading {
    #[serde(rename = "readingType")]
    pub reading_type: String,
    pub value: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Station {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    #[serde(rename = "lastUpdate")]
    pub last_update: DateTime,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Vec<Reading>>,
}

impl Reading {
    pub fn new(reading_type: &str, value: &str) -> Self {
        Self {
            reading_type: reading_type.to_string(),
            value: value.to_string(),
        }
    }
}

impl Station {
    pub fn new(name: &str) -> Self {
        Self {
            id: station_id(name),
            name: name.to_string(),
            last_update: DateTime::now(),
            data: None,
        }
    }

    pub fn readings(&self) -> &[Reading] {
        self.data.as_deref().unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mongodb::bson;

    #[test]
    fn test_station_id_is_deterministic() {
        let first = station_id("Station 44025 - LLNR - 830");
        let second = station_id("Station 44025 - LLNR - 830");
        assert_eq!(first, second);
        assert_eq!(first.len(), 32);
        assert!(first.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }

    #[test]
    fn test_station_id_differs_per_name() {
        assert_ne!(
            station_id("Station 44025 - LLNR - 830"),
            station_id("Station 44026 - LLNR - 831")
        );
    }

    #[test]
    fn test_station_id_known_digest() {
        // md5("") is a fixed, well-known value
        assert_eq!(station_id(""), "d41d8cd98f00b204e9800998ecf8427e");
    }

    #[test]
    fn test_station_serializes_field_names() {
        let station = Station::new("Station 44025 - LLNR - 830");
        let doc = bson::to_document(&station).unwrap();

        assert_eq!(doc.get_str("_id").unwrap(), station_id("Station 44025 - LLNR - 830"));
        assert_eq!(doc.get_str("name").unwrap(), "Station 44025 - LLNR - 830");
        assert!(doc.get_datetime("lastUpdate").is_ok());
        assert!(!doc.contains_key("data"));
    }

    #[test]
    fn test_reading_field_order() {
        let doc = bson::to_document(&Reading::new("wind", "10")).unwrap();
        let keys: Vec<&str> = doc.keys().map(|k| k.as_str()).collect();
        assert_eq!(keys, vec!["readingType", "value"]);
        assert_eq!(doc.get_str("value").unwrap(), "10");
    }

    #[test]
    fn test_station_without_data_has_no_readings() {
        let doc = bson::doc! {
            "_id": "abc",
            "name": "Station",
            "lastUpdate": DateTime::now(),
        };
        let station: Station = bson::from_document(doc).unwrap();
        assert!(station.data.is_none());
        assert!(station.readings().is_empty());
    }
}
