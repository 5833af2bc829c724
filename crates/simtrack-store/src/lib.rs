//! Simtrack Store
//!
//! The queued-collection data-access layer for the Simtrack backend.
//! Every logical collection (clients, devices, subscriptions, the
//! external-platform identity mappings, internal users) owns a private
//! FIFO queue; all operations against a collection are dispatched and
//! completed in submission order, which is the layer's whole answer to
//! read-modify-write races within one collection. Cross-collection
//! sequences have no atomicity — callers own that trade-off.
//!
//! Connections are established once, per collection, under per-collection
//! credentials, through [`CollectionFactory`]; [`Database`] carries the
//! resulting context through the application.

pub mod clients;
pub mod collection;
pub mod database;
pub mod devices;
pub mod error;
pub mod factory;
pub mod models;
pub mod password;
pub mod platform_identities;
mod queue;
pub mod subscriptions;
pub mod users;

pub use clients::Clients;
pub use collection::{Page, PageRequest, UpdateOpts};
pub use database::Database;
pub use devices::Devices;
pub use error::{Result, StoreError};
pub use factory::CollectionFactory;
pub use platform_identities::{StripeCustomers, WcCustomers, WialonUsers};
pub use subscriptions::Subscriptions;
pub use users::Users;
