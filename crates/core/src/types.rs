//! Wire types exchanged with the marketplace backend.
//!
//! The backend speaks camelCase JSON with MongoDB-style `_id` keys. Most
//! fields are optional on the wire, so the structs default generously
//! rather than failing on a partially populated document.

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::roles;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;

/// The identity cached alongside the tokens after login.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthUser {
    pub email: String,
    #[serde(default)]
    pub roles: Vec<String>,
}

impl AuthUser {
    pub fn has_role(&self, role: &str) -> bool {
        self.roles.iter().any(|r| r == role)
    }

    pub fn is_admin(&self) -> bool {
        roles::grants_admin(&self.roles)
    }

    pub fn is_super_admin(&self) -> bool {
        roles::grants_super_admin(&self.roles)
    }
}

/// Persisted authentication state.
///
/// `access_token` and `user` are always written together by login, so a
/// present access token implies a present user.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<AuthUser>,
}

impl Session {
    pub fn is_empty(&self) -> bool {
        self.access_token.is_none() && self.refresh_token.is_none() && self.user.is_none()
    }
}

/// Moderation lifecycle of a listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ItemStatus {
    Pending,
    Approved,
    Rejected,
    Sold,
    /// Any status string this client does not know about.
    #[serde(other)]
    Unknown,
}

/// The seller reference on a listing: either a bare id or the populated
/// seller document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SellerRef {
    Id(String),
    Profile(SellerProfile),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SellerProfile {
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub firstname: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lastname: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

/// A classified ad.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(default)]
    pub item_name: String,
    #[serde(default)]
    pub item_price: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub item_description: Option<String>,
    #[serde(default)]
    pub item_category: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub item_sub_category: Option<String>,
    #[serde(default)]
    pub item_images: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<ItemStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub views: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seller_id: Option<SellerRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seller_phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<Timestamp>,
    /// Relevance in `[0, 1]`, only set on AI search results.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
}

impl Item {
    /// Listings without a status are still awaiting moderation.
    pub fn effective_status(&self) -> ItemStatus {
        self.status.unwrap_or(ItemStatus::Pending)
    }

    /// Only approved listings are shown on the public storefront.
    pub fn is_publicly_visible(&self) -> bool {
        self.effective_status() == ItemStatus::Approved
    }

    /// Best-effort contact number, preferring the populated seller document.
    pub fn contact_phone(&self) -> Option<&str> {
        match &self.seller_id {
            Some(SellerRef::Profile(SellerProfile { phone: Some(p), .. })) => Some(p),
            _ => self.seller_phone.as_deref(),
        }
    }
}

/// A user record as listed in the admin panel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserAccount {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(default)]
    pub firstname: String,
    #[serde(default)]
    pub lastname: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub roles: Vec<String>,
}

impl UserAccount {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.firstname, self.lastname).trim().to_string()
    }
}

/// The standard `{ success, message, data, total }` response wrapper.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Envelope<T> {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub success: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default = "Option::default", skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total: Option<u64>,
}

/// A list endpoint's body: some endpoints return a bare array, others wrap
/// it in an [`Envelope`]. A wrapper without `data` reads as empty.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ListPayload<T> {
    Bare(Vec<T>),
    Wrapped(Envelope<Vec<T>>),
}

impl<T> ListPayload<T> {
    /// Reported total when the backend paginates, else the page length.
    pub fn total(&self) -> u64 {
        match self {
            ListPayload::Bare(items) => items.len() as u64,
            ListPayload::Wrapped(env) => env
                .total
                .unwrap_or_else(|| env.data.as_ref().map_or(0, |d| d.len() as u64)),
        }
    }

    pub fn into_items(self) -> Vec<T> {
        match self {
            ListPayload::Bare(items) => items,
            ListPayload::Wrapped(env) => env.data.unwrap_or_default(),
        }
    }
}

/// A single-document body: either `{ data: T }` or `T` itself.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum SinglePayload<T> {
    Wrapped { data: T },
    Bare(T),
}

impl<T> SinglePayload<T> {
    pub fn into_inner(self) -> T {
        match self {
            SinglePayload::Wrapped { data } | SinglePayload::Bare(data) => data,
        }
    }
}

/// Credentials for `POST /auth/login`.
#[derive(Debug, Clone, Serialize, Validate)]
pub struct LoginRequest {
    #[validate(email(message = "Invalid email address"))]
    pub email: String,

    #[validate(length(min = 2, message = "Password must be at least 2 characters"))]
    pub password: String,
}

/// Body of `POST /auth/register`.
#[derive(Debug, Clone, Serialize, Validate)]
pub struct RegisterRequest {
    #[validate(email(message = "Invalid email address"))]
    pub email: String,

    #[validate(length(min = 2, message = "First name must be at least 2 characters"))]
    pub firstname: String,

    #[validate(length(min = 2, message = "Last name must be at least 2 characters"))]
    pub lastname: String,

    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    pub password: String,

    #[validate(length(min = 10, message = "Phone number must be at least 10 digits"))]
    pub phone: String,
}

/// The `data` payload of a login response.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginData {
    #[serde(default)]
    pub access_token: Option<String>,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub roles: Vec<String>,
}

/// Response of the AI search endpoint.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AskResponse {
    #[serde(default)]
    pub results: Vec<Item>,
}

/// Text fields of the create/edit listing form.
///
/// Images travel separately as multipart file parts. The sub-category is
/// checked against the catalogue only once the category itself is known.
#[derive(Debug, Clone, Default, PartialEq, Validate)]
#[validate(schema(
    function = "crate::validation::validate_sub_category",
    skip_on_field_errors = false
))]
pub struct ListingForm {
    #[validate(length(min = 1, message = "required"))]
    pub item_name: String,

    #[validate(custom(function = "crate::validation::validate_price"))]
    pub item_price: String,

    pub item_description: String,

    #[validate(custom(function = "crate::validation::validate_category"))]
    pub item_category: String,

    #[validate(length(min = 1, message = "required"))]
    pub item_sub_category: String,

    pub location: String,
    pub condition: String,
}

impl ListingForm {
    /// Field name/value pairs in the order the backend expects them.
    pub fn fields(&self) -> [(&'static str, &str); 7] {
        [
            ("itemName", &self.item_name),
            ("itemPrice", &self.item_price),
            ("itemDescription", &self.item_description),
            ("itemCategory", &self.item_category),
            ("itemSubCategory", &self.item_sub_category),
            ("location", &self.location),
            ("condition", &self.condition),
        ]
    }
}
