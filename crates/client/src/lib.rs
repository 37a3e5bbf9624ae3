//! Authenticated REST client for the Bazaar marketplace backend.
//!
//! [`ApiClient`] is the request pipeline: it attaches the stored access
//! token to every authenticated request and hands authorization failures
//! to the [`RefreshCoordinator`](refresh::RefreshCoordinator), which
//! performs a single token refresh for any number of concurrently failing
//! requests and replays them with the new token. The typed domain clients
//! under [`api`] shape requests for the auth, item, seller, admin and AI
//! search endpoints.

pub mod api;
pub mod config;
pub mod error;
pub mod navigator;
pub mod pipeline;
pub mod refresh;
pub mod request;
pub mod session;

pub use config::ClientConfig;
pub use error::{ClientError, RefreshError};
pub use navigator::{LogNavigator, LoginNavigator};
pub use pipeline::ApiClient;
pub use request::{ApiRequest, FormPart};
pub use session::{FileTokenStore, MemoryTokenStore, TokenStore};
