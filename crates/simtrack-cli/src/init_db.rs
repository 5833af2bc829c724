//! Store provisioning: one role and one user per collection.
//!
//! The data-access layer connects to every collection under its own
//! credential principal; this command creates those principals. Each role
//! grants the collection-level actions the portal needs (reads, writes,
//! index management, stats) on exactly one collection — no cross-collection
//! access, no admin actions.

use std::collections::HashMap;
use std::fmt::Write as _;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use mongodb::bson::{doc, Bson};
use ring::rand::{SecureRandom, SystemRandom};
use tracing::{info, warn};

/// Actions granted to each per-collection handler role.
const COLLECTION_ACTIONS: &[&str] = &[
    "find",
    "insert",
    "remove",
    "update",
    "bypassDocumentValidation",
    "useUUID",
    "dropIndex",
    "reIndex",
    "collStats",
    "connPoolStats",
    "dbHash",
    "dbStats",
    "indexStats",
    "createIndex",
    "listIndexes",
    "validate",
];

/// Physical collections that get a principal each.
const COLLECTIONS: &[&str] = &[
    "clients",
    "devices",
    "subscriptions",
    "stripe_customers",
    "woocommerce_customers",
    "wialon_users",
    "users",
];

#[derive(Args, Debug)]
pub struct InitDbArgs {
    /// Admin connection URI (must be allowed to create roles and users)
    #[arg(long, env = "SIMTRACK_ADMIN_URI")]
    pub admin_uri: String,

    /// Database to provision
    #[arg(long, default_value = "simtrack")]
    pub db: String,

    /// JSON file mapping collection name to handler password; missing
    /// entries get a generated password (printed once)
    #[arg(long)]
    pub passwords: Option<PathBuf>,
}

pub async fn run(args: InitDbArgs) -> Result<()> {
    let client = mongodb::Client::with_uri_str(&args.admin_uri)
        .await
        .context("invalid admin URI")?;
    let database = client.database(&args.db);

    let mut passwords: HashMap<String, String> = match &args.passwords {
        Some(path) => {
            let raw = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read {}", path.display()))?;
            serde_json::from_str(&raw).context("passwords file must be a JSON string map")?
        }
        None => HashMap::new(),
    };

    for collection in COLLECTIONS {
        let role = format!("{}-handler", collection.replace('_', "-"));
        create_role(&database, &args.db, collection, &role).await?;

        let username = format!("{collection}_handler");
        let generated = !passwords.contains_key(*collection);
        let password = match passwords.remove(*collection) {
            Some(p) => p,
            None => generate_password()?,
        };
        create_user(&database, &args.db, &username, &password, &role).await?;

        if generated {
            // Logged exactly once; there is no way to recover it later.
            info!(
                collection = %collection,
                username = %username,
                password = %password,
                "generated handler credentials"
            );
        }
    }

    client.shutdown().await;
    Ok(())
}

async fn create_role(
    database: &mongodb::Database,
    db_name: &str,
    collection: &str,
    role: &str,
) -> Result<()> {
    let actions: Vec<Bson> = COLLECTION_ACTIONS.iter().map(|a| Bson::from(*a)).collect();
    let command = doc! {
        "createRole": role,
        "privileges": [{
            "resource": { "db": db_name, "collection": collection },
            "actions": actions,
        }],
        "roles": [],
    };

    match database.run_command(command).await {
        Ok(_) => {
            info!(role = %role, collection = %collection, "created role");
            Ok(())
        }
        Err(err) if already_exists(&err) => {
            warn!(role = %role, "role already exists, leaving it untouched");
            Ok(())
        }
        Err(err) => Err(err).with_context(|| format!("failed to create role {role}")),
    }
}

async fn create_user(
    database: &mongodb::Database,
    db_name: &str,
    username: &str,
    password: &str,
    role: &str,
) -> Result<()> {
    let command = doc! {
        "createUser": username,
        "pwd": password,
        "roles": [{ "role": role, "db": db_name }],
    };

    match database.run_command(command).await {
        Ok(_) => {
            info!(username = %username, role = %role, "created user");
            Ok(())
        }
        Err(err) if already_exists(&err) => {
            warn!(username = %username, "user already exists, leaving it untouched");
            Ok(())
        }
        Err(err) => Err(err).with_context(|| format!("failed to create user {username}")),
    }
}

fn already_exists(err: &mongodb::error::Error) -> bool {
    err.to_string().contains("already exists")
}

fn generate_password() -> Result<String> {
    let rng = SystemRandom::new();
    let mut bytes = [0u8; 18];
    rng.fill(&mut bytes)
        .map_err(|_| anyhow::anyhow!("failed to generate a password"))?;
    let mut out = String::with_capacity(bytes.len() * 2);
    for b in bytes {
        let _ = write!(out, "{b:02x}");
    }
    Ok(out)
}

#[cfg(test)]
#[allow(clippy::panic, clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn generated_passwords_are_long_and_distinct() {
        let a = generate_password().unwrap();
        let b = generate_password().unwrap();
        assert_eq!(a.len(), 36);
        assert_ne!(a, b);
    }

    #[test]
    fn every_collection_gets_a_distinct_role_name() {
        let mut roles: Vec<String> = COLLECTIONS
            .iter()
            .map(|c| format!("{}-handler", c.replace('_', "-")))
            .collect();
        roles.sort();
        roles.dedup();
        assert_eq!(roles.len(), COLLECTIONS.len());
    }
}
