//! Development seeding.
//!
//! Reads a JSON data file and inserts clients, then subscriptions (assigned
//! round-robin across the created clients), then devices. Individual
//! failures are logged and skipped so one bad record does not abort the
//! whole seed run.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::Args;
use mongodb::bson::{doc, Bson, Document};
use serde::Deserialize;
use simtrack_store::error::is_duplicate_key;
use simtrack_store::{Database, StoreError};
use tracing::{error, info};

#[derive(Args, Debug)]
pub struct PopulateArgs {
    /// JSON seed data file
    #[arg(long, default_value = "seed-data.json")]
    pub data: PathBuf,
}

#[derive(Debug, Deserialize, Default)]
struct SeedFile {
    #[serde(default)]
    clients: Vec<serde_json::Value>,
    #[serde(default)]
    devices: Vec<serde_json::Value>,
    #[serde(default)]
    subscriptions: Vec<serde_json::Value>,
}

pub async fn run(config_path: Option<&Path>, args: PopulateArgs) -> Result<()> {
    let config = simtrack_core::config::load_config(config_path)?;
    let raw = std::fs::read_to_string(&args.data)
        .with_context(|| format!("failed to read {}", args.data.display()))?;
    let seed: SeedFile = serde_json::from_str(&raw).context("malformed seed data")?;

    let mut database = Database::new(&config);
    database.connect_all().await.context("failed to connect to the store")?;

    let client_ids = populate_clients(&database, seed.clients).await?;
    populate_subscriptions(&database, &client_ids, seed.subscriptions).await?;
    populate_devices(&database, seed.devices).await?;

    database.disconnect_all().await;
    Ok(())
}

async fn populate_clients(database: &Database, records: Vec<serde_json::Value>) -> Result<Vec<String>> {
    let Some(clients) = database.clients() else {
        bail!("clients collection is not connected");
    };

    let mut ids = Vec::new();
    let total = records.len();
    for record in records {
        let mut properties = match to_document(record) {
            Ok(doc) => doc,
            Err(err) => {
                error!(error = %err, "skipping malformed client record");
                continue;
            }
        };
        let Some(email) = properties.remove("email").and_then(string_field) else {
            error!("skipping client record without an email");
            continue;
        };
        match clients.add_client(&email, properties).await {
            Ok(doc) => {
                if let Ok(id) = doc.get_object_id("_id") {
                    ids.push(id.to_hex());
                }
            }
            Err(err) if is_duplicate(&err) => {
                info!(email = %email, "client already present, reusing");
                if let Ok(existing) =
                    clients.get_client_by_email(&email, Some(doc! { "_id": 1 })).await
                {
                    if let Ok(id) = existing.get_object_id("_id") {
                        ids.push(id.to_hex());
                    }
                }
            }
            Err(err) => error!(email = %email, error = %err, "failed to seed client"),
        }
    }
    info!(created = ids.len(), total, "seeded clients");
    Ok(ids)
}

async fn populate_subscriptions(
    database: &Database,
    client_ids: &[String],
    records: Vec<serde_json::Value>,
) -> Result<()> {
    if records.is_empty() {
        return Ok(());
    }
    if client_ids.is_empty() {
        bail!("no clients were created; cannot seed subscriptions");
    }
    let Some(subscriptions) = database.subscriptions() else {
        bail!("subscriptions collection is not connected");
    };

    let mut created = 0usize;
    let total = records.len();
    for (index, record) in records.into_iter().enumerate() {
        let mut properties = match to_document(record) {
            Ok(doc) => doc,
            Err(err) => {
                error!(error = %err, "skipping malformed subscription record");
                continue;
            }
        };
        let client_id = &client_ids[index % client_ids.len()];

        let platform = properties.remove("platform").and_then(string_field);
        let platform_id = properties.remove("platform_id").and_then(string_field);
        let name = properties.remove("name").and_then(string_field);
        let price = properties.remove("price").and_then(numeric_field);
        let frequency = properties
            .remove("charge_interval_frequency")
            .and_then(numeric_field);
        let unit = properties.remove("charge_interval_unit").and_then(string_field);

        let (Some(platform), Some(platform_id), Some(name), Some(price), Some(frequency), Some(unit)) =
            (platform, platform_id, name, price, frequency, unit)
        else {
            error!("skipping subscription record with missing billing fields");
            continue;
        };

        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let frequency = frequency.max(0.0) as u32;
        match subscriptions
            .add_subscription(client_id, &platform, &platform_id, &name, price, frequency, &unit, properties)
            .await
        {
            Ok(_) => created += 1,
            Err(err) if is_duplicate(&err) => {
                info!(platform_id = %platform_id, "subscription already present, skipping");
            }
            Err(err) => {
                error!(platform_id = %platform_id, error = %err, "failed to seed subscription");
            }
        }
    }
    info!(created, total, "seeded subscriptions");
    Ok(())
}

async fn populate_devices(database: &Database, records: Vec<serde_json::Value>) -> Result<()> {
    if records.is_empty() {
        return Ok(());
    }
    let Some(devices) = database.devices() else {
        bail!("devices collection is not connected");
    };

    let mut created = 0usize;
    let total = records.len();
    for record in records {
        let mut properties = match to_document(record) {
            Ok(doc) => doc,
            Err(err) => {
                error!(error = %err, "skipping malformed device record");
                continue;
            }
        };
        let imei = properties.remove("imei").and_then(string_field);
        let iccid = properties.remove("iccid").and_then(string_field);
        let model = properties.remove("model").and_then(string_field);
        let image_url = properties
            .remove("image_url")
            .and_then(string_field)
            .unwrap_or_default();

        let (Some(imei), Some(iccid), Some(model)) = (imei, iccid, model) else {
            error!("skipping device record with missing identifiers");
            continue;
        };
        match devices.add_device(&imei, &iccid, &model, &image_url, properties).await {
            Ok(_) => created += 1,
            Err(err) if is_duplicate(&err) => {
                info!(imei = %imei, "device already present, skipping");
            }
            Err(err) => error!(imei = %imei, error = %err, "failed to seed device"),
        }
    }
    info!(created, total, "seeded devices");
    Ok(())
}

fn to_document(value: serde_json::Value) -> Result<Document> {
    match Bson::try_from(value)? {
        Bson::Document(doc) => Ok(doc),
        _ => bail!("seed records must be JSON objects"),
    }
}

/// Re-running the seeder against an already-populated database is normal;
/// unique-index rejections are skips, not failures.
fn is_duplicate(err: &StoreError) -> bool {
    matches!(err, StoreError::Database(db_err) if is_duplicate_key(db_err))
}

fn string_field(value: Bson) -> Option<String> {
    match value {
        Bson::String(s) => Some(s),
        _ => None,
    }
}

#[allow(clippy::cast_precision_loss)]
fn numeric_field(value: Bson) -> Option<f64> {
    match value {
        Bson::Double(n) => Some(n),
        Bson::Int32(n) => Some(f64::from(n)),
        Bson::Int64(n) => Some(n as f64),
        _ => None,
    }
}

#[cfg(test)]
#[allow(clippy::panic, clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn seed_file_tolerates_missing_sections() {
        let seed: SeedFile = serde_json::from_str("{}").unwrap();
        assert!(seed.clients.is_empty());
        assert!(seed.devices.is_empty());
        assert!(seed.subscriptions.is_empty());
    }

    #[test]
    fn json_objects_become_documents() {
        let doc = to_document(serde_json::json!({ "imei": "123", "num": 2 })).unwrap();
        assert_eq!(doc.get_str("imei").unwrap(), "123");
        assert!(to_document(serde_json::json!([1, 2])).is_err());
    }

    #[test]
    fn numeric_fields_accept_integers_and_doubles() {
        assert_eq!(numeric_field(Bson::Int32(3)), Some(3.0));
        assert_eq!(numeric_field(Bson::Double(9.99)), Some(9.99));
        assert_eq!(numeric_field(Bson::String("x".into())), None);
    }
}
