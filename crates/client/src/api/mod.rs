//! Typed wrappers for the backend's endpoint groups.
//!
//! Each wrapper only shapes requests and decodes responses; authentication
//! and refresh are handled by the [`ApiClient`](crate::ApiClient) pipeline
//! they hold.

mod admin;
mod ask;
mod auth;
mod items;
mod seller;

pub use admin::AdminApi;
pub use ask::AskApi;
pub use auth::AuthApi;
pub use items::{ImageUpload, ItemApi};
pub use seller::SellerApi;
