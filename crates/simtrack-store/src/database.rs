//! The application-wide store context.
//!
//! One `Database` is constructed at process start and passed by reference
//! to whatever needs data access. `connect_all` must complete before the
//! accessors are useful; an accessor returning `None` means that entity's
//! connection is not (or no longer) established, and callers are expected
//! to treat it as "not ready" rather than panic.

use simtrack_core::Config;

use crate::clients::Clients;
use crate::devices::Devices;
use crate::error::Result;
use crate::factory::CollectionFactory;
use crate::platform_identities::{StripeCustomers, WcCustomers, WialonUsers};
use crate::subscriptions::Subscriptions;
use crate::users::Users;

/// Store lifecycle and entity accessors.
pub struct Database {
    factory: CollectionFactory,
    clients: Option<Clients>,
    devices: Option<Devices>,
    subscriptions: Option<Subscriptions>,
    stripe_customers: Option<StripeCustomers>,
    wc_customers: Option<WcCustomers>,
    wialon_users: Option<WialonUsers>,
    users: Option<Users>,
}

impl Database {
    pub fn new(config: &Config) -> Self {
        Self {
            factory: CollectionFactory::new(
                config.store.clone(),
                config.server.max_login_attempts,
            ),
            clients: None,
            devices: None,
            subscriptions: None,
            stripe_customers: None,
            wc_customers: None,
            wialon_users: None,
            users: None,
        }
    }

    /// Establish every entity connection. Idempotent: slots that are
    /// already populated are skipped, so a retry after a partial failure
    /// only connects what is still missing. Returns the first failure;
    /// slots connected before it stay connected, slots after it stay
    /// `None`.
    pub async fn connect_all(&mut self) -> Result<()> {
        if self.clients.is_none() {
            self.clients = Some(self.factory.get_clients_collection().await?);
        }
        if self.devices.is_none() {
            self.devices = Some(self.factory.get_devices_collection().await?);
        }
        if self.subscriptions.is_none() {
            self.subscriptions = Some(self.factory.get_subscriptions_collection().await?);
        }
        if self.stripe_customers.is_none() {
            self.stripe_customers = Some(self.factory.get_stripe_customers_collection().await?);
        }
        if self.wc_customers.is_none() {
            self.wc_customers = Some(self.factory.get_wc_customers_collection().await?);
        }
        if self.wialon_users.is_none() {
            self.wialon_users = Some(self.factory.get_wialon_users_collection().await?);
        }
        if self.users.is_none() {
            self.users = Some(self.factory.get_users_collection().await?);
        }
        Ok(())
    }

    /// Drop every driver connection and return to the pre-connect state.
    pub async fn disconnect_all(&mut self) {
        self.factory.shutdown().await;
        self.clients = None;
        self.devices = None;
        self.subscriptions = None;
        self.stripe_customers = None;
        self.wc_customers = None;
        self.wialon_users = None;
        self.users = None;
    }

    pub fn clients(&self) -> Option<&Clients> {
        self.clients.as_ref()
    }

    pub fn devices(&self) -> Option<&Devices> {
        self.devices.as_ref()
    }

    pub fn subscriptions(&self) -> Option<&Subscriptions> {
        self.subscriptions.as_ref()
    }

    pub fn stripe_customers(&self) -> Option<&StripeCustomers> {
        self.stripe_customers.as_ref()
    }

    pub fn wc_customers(&self) -> Option<&WcCustomers> {
        self.wc_customers.as_ref()
    }

    pub fn wialon_users(&self) -> Option<&WialonUsers> {
        self.wialon_users.as_ref()
    }

    pub fn users(&self) -> Option<&Users> {
        self.users.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn accessors_are_none_before_connect_all() {
        let database = Database::new(&Config::default());
        assert!(database.clients().is_none());
        assert!(database.devices().is_none());
        assert!(database.subscriptions().is_none());
        assert!(database.stripe_customers().is_none());
        assert!(database.wc_customers().is_none());
        assert!(database.wialon_users().is_none());
        assert!(database.users().is_none());
    }
}
