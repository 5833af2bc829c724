//! Typed document models.
//!
//! Query paths deal in raw BSON documents (filters and projections pass
//! through verbatim), so these types exist for the places that need typed
//! access: authentication, seeding, and callers that want to deserialize a
//! returned document with `bson::from_document`.

use mongodb::bson::oid::ObjectId;
use mongodb::bson::{Binary, DateTime};
use serde::{Deserialize, Serialize};

/// A portal customer account.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Client {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub email: String,
    /// PBKDF2-derived key; never the plaintext.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<Binary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub salt: Option<Binary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_logged_in: Option<DateTime>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_login_attempt: Option<DateTime>,
    #[serde(default)]
    pub failed_login_attempts: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub locked_until: Option<DateTime>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password_reset_token: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password_reset_expiration: Option<DateTime>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_updated: Option<DateTime>,
}

impl Client {
    /// Full name assembled from the optional name parts, `None` when both
    /// are missing.
    pub fn name(&self) -> Option<String> {
        match (&self.first_name, &self.last_name) {
            (None, None) => None,
            (first, last) => {
                let mut full = String::new();
                if let Some(f) = first {
                    full.push_str(f);
                }
                if let Some(l) = last {
                    if !full.is_empty() {
                        full.push(' ');
                    }
                    full.push_str(l);
                }
                Some(full)
            }
        }
    }
}

/// A SIM-connected tracker.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Device {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    /// Subscription the device is activated under, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subscription: Option<ObjectId>,
    /// Owning client while activated.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client: Option<ObjectId>,
    pub imei: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub iccid: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nickname: Option<String>,
    #[serde(default)]
    pub image_url: String,
    pub model: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub manufacturer: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    #[serde(default)]
    pub num_network_checks: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_updated: Option<DateTime>,
}

/// Lifecycle of a subscription as the portal models it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubscriptionStatus {
    Pending,
    Active,
    Inactive,
}

impl SubscriptionStatus {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Active => "active",
            Self::Inactive => "inactive",
        }
    }
}

/// A billing subscription on an external commerce platform.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Subscription {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub client: ObjectId,
    #[serde(default)]
    pub activated: bool,
    /// Commerce platform that owns the billing relationship.
    pub platform: String,
    /// Platform-assigned identifier; unique together with `platform`.
    pub platform_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<SubscriptionStatus>,
    pub name: String,
    pub price: f64,
    pub charge_interval_frequency: u32,
    pub charge_interval_unit: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_updated: Option<DateTime>,
}

/// Stripe identity mapping, one per client.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StripeCustomer {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub client_id: ObjectId,
    pub stripe_customer_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_updated: Option<DateTime>,
}

/// WooCommerce identity mapping, one per client.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WcCustomer {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub client_id: ObjectId,
    pub wc_customer_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_updated: Option<DateTime>,
}

/// Telematics-platform identity mapping, one per client.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WialonUser {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub client_id: ObjectId,
    pub wialon_user_id: String,
    pub wialon_account_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_updated: Option<DateTime>,
}

/// Internal admin credential pair, distinct from portal clients.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub user: String,
    pub pwd: String,
}

#[cfg(test)]
#[allow(clippy::panic, clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;
    use mongodb::bson;

    #[test]
    fn client_name_assembles_from_parts() {
        let mut client = Client { first_name: Some("Ada".into()), ..Client::default() };
        assert_eq!(client.name().as_deref(), Some("Ada"));
        client.last_name = Some("Lovelace".into());
        assert_eq!(client.name().as_deref(), Some("Ada Lovelace"));
        client.first_name = None;
        assert_eq!(client.name().as_deref(), Some("Lovelace"));
        client.last_name = None;
        assert_eq!(client.name(), None);
    }

    #[test]
    fn subscription_status_round_trips_lowercase() {
        let bson = bson::to_bson(&SubscriptionStatus::Pending).unwrap();
        assert_eq!(bson, bson::Bson::String("pending".into()));
        let back: SubscriptionStatus = bson::from_bson(bson).unwrap();
        assert_eq!(back, SubscriptionStatus::Pending);
    }

    #[test]
    fn client_document_omits_unset_fields() {
        let client = Client { email: "a@x.com".into(), ..Client::default() };
        let doc = bson::to_document(&client).unwrap();
        assert!(!doc.contains_key("_id"));
        assert!(!doc.contains_key("password"));
        assert_eq!(doc.get_str("email").unwrap(), "a@x.com");
    }
}
