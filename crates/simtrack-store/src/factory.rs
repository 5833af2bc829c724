//! Per-entity collection construction.
//!
//! Every logical collection gets its own driver client so each one can
//! authenticate as a distinct least-privilege principal (the provisioning
//! side of that contract lives in `simtrack-cli init-db`). Built
//! collections are flyweights: the first accessor call connects and
//! caches, later calls hand back the cached instance. One entity's
//! connection failure leaves only that entity's slot empty.

use mongodb::bson::{doc, Document};
use mongodb::Client as DriverClient;
use simtrack_core::config::{CollectionEndpoint, StoreConfig};
use tokio::sync::Mutex;
use tracing::{info, warn};

use crate::clients::Clients;
use crate::collection::Handle;
use crate::devices::Devices;
use crate::error::Result;
use crate::platform_identities::{StripeCustomers, WcCustomers, WialonUsers};
use crate::subscriptions::Subscriptions;
use crate::users::Users;

type Slot<T> = Mutex<Option<(DriverClient, T)>>;

/// Flyweight factory for the entity collections.
pub struct CollectionFactory {
    store: StoreConfig,
    max_login_attempts: u32,
    clients: Slot<Clients>,
    devices: Slot<Devices>,
    subscriptions: Slot<Subscriptions>,
    stripe_customers: Slot<StripeCustomers>,
    wc_customers: Slot<WcCustomers>,
    wialon_users: Slot<WialonUsers>,
    users: Slot<Users>,
}

impl CollectionFactory {
    pub fn new(store: StoreConfig, max_login_attempts: u32) -> Self {
        Self {
            store,
            max_login_attempts,
            clients: Mutex::new(None),
            devices: Mutex::new(None),
            subscriptions: Mutex::new(None),
            stripe_customers: Mutex::new(None),
            wc_customers: Mutex::new(None),
            wialon_users: Mutex::new(None),
            users: Mutex::new(None),
        }
    }

    pub async fn get_clients_collection(&self) -> Result<Clients> {
        let max_attempts = self.max_login_attempts;
        get_or_connect(
            &self.clients,
            &self.store.clients,
            &self.store.db_name,
            "clients",
            |handle| Clients::new(handle, max_attempts),
        )
        .await
    }

    pub async fn get_devices_collection(&self) -> Result<Devices> {
        get_or_connect(&self.devices, &self.store.devices, &self.store.db_name, "devices", Devices::new)
            .await
    }

    pub async fn get_subscriptions_collection(&self) -> Result<Subscriptions> {
        get_or_connect(
            &self.subscriptions,
            &self.store.subscriptions,
            &self.store.db_name,
            "subscriptions",
            Subscriptions::new,
        )
        .await
    }

    pub async fn get_stripe_customers_collection(&self) -> Result<StripeCustomers> {
        get_or_connect(
            &self.stripe_customers,
            &self.store.stripe_customers,
            &self.store.db_name,
            "stripe_customers",
            StripeCustomers::new,
        )
        .await
    }

    pub async fn get_wc_customers_collection(&self) -> Result<WcCustomers> {
        get_or_connect(
            &self.wc_customers,
            &self.store.wc_customers,
            &self.store.db_name,
            "wc_customers",
            WcCustomers::new,
        )
        .await
    }

    pub async fn get_wialon_users_collection(&self) -> Result<WialonUsers> {
        get_or_connect(
            &self.wialon_users,
            &self.store.wialon_users,
            &self.store.db_name,
            "wialon_users",
            WialonUsers::new,
        )
        .await
    }

    pub async fn get_users_collection(&self) -> Result<Users> {
        get_or_connect(&self.users, &self.store.users, &self.store.db_name, "users", Users::new)
            .await
    }

    /// Shut down every cached driver client and empty the cache.
    pub async fn shutdown(&self) {
        shutdown_slot(&self.clients, "clients").await;
        shutdown_slot(&self.devices, "devices").await;
        shutdown_slot(&self.subscriptions, "subscriptions").await;
        shutdown_slot(&self.stripe_customers, "stripe_customers").await;
        shutdown_slot(&self.wc_customers, "wc_customers").await;
        shutdown_slot(&self.wialon_users, "wialon_users").await;
        shutdown_slot(&self.users, "users").await;
    }
}

/// Return the cached collection or connect, verify with a ping, build and
/// cache it. Holding the slot lock across the connect keeps concurrent
/// first-callers from opening duplicate clients.
async fn get_or_connect<T, F>(
    slot: &Slot<T>,
    endpoint: &CollectionEndpoint,
    db_name: &str,
    label: &'static str,
    build: F,
) -> Result<T>
where
    T: Clone,
    F: FnOnce(Handle) -> T,
{
    let mut guard = slot.lock().await;
    if let Some((_, existing)) = guard.as_ref() {
        return Ok(existing.clone());
    }

    let client = match DriverClient::with_uri_str(&endpoint.uri).await {
        Ok(client) => client,
        Err(err) => {
            warn!(collection = label, error = %err, "failed to connect");
            return Err(err.into());
        }
    };
    let database = client.database(db_name);
    // The driver connects lazily; a ping turns "bad endpoint" into a
    // connect-time failure instead of a first-query surprise.
    if let Err(err) = database.run_command(doc! { "ping": 1 }).await {
        warn!(collection = label, error = %err, "failed to connect");
        return Err(err.into());
    }

    let handle = database.collection::<Document>(&endpoint.collection);
    let built = build(handle);
    *guard = Some((client, built.clone()));
    info!(collection = label, "connected");
    Ok(built)
}

async fn shutdown_slot<T>(slot: &Slot<T>, label: &'static str) {
    let taken = slot.lock().await.take();
    if let Some((client, _)) = taken {
        client.shutdown().await;
        info!(collection = label, "disconnected");
    }
}
